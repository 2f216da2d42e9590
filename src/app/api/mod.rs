pub mod accounts;
pub mod activities;
pub mod assignments;
pub mod client;
pub mod endpoints;
pub mod family;
pub mod paging;
pub mod sos;
pub mod stations;
