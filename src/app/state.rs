use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use crate::app::api::client::LinkClient;
use crate::app::api::paging::ActivityPager;
use crate::app::config::{load_config, ApiSettings};
use crate::app::error::AppError;
use crate::app::session::SessionStore;

/// Process-wide state managed by the Tauri runtime. The session store and
/// each list's pager are behind their own locks; neither lock is ever held
/// across a network call.
pub struct AppState {
    pub sessions: Mutex<SessionStore>,
    pub pagers: Mutex<HashMap<String, ActivityPager>>,
    client: RwLock<Arc<LinkClient>>,
}

impl AppState {
    pub fn new() -> Self {
        let settings = load_config().map(|config| config.api).unwrap_or_default();
        let client = LinkClient::from_settings(&settings)
            .or_else(|_| LinkClient::from_settings(&ApiSettings::default()))
            .expect("default API settings always produce a client");
        Self {
            sessions: Mutex::new(SessionStore::open_default()),
            pagers: Mutex::new(HashMap::new()),
            client: RwLock::new(Arc::new(client)),
        }
    }

    pub fn client(&self) -> Arc<LinkClient> {
        self.client.read().expect("client lock poisoned").clone()
    }

    /// Swaps the HTTP client after the API settings changed; in-flight
    /// requests finish against the old client.
    pub fn rebuild_client(&self, settings: &ApiSettings, trace_id: &str) -> Result<(), AppError> {
        let client = LinkClient::from_settings(settings)
            .map_err(|failure| failure.into_app_error(trace_id))?;
        *self.client.write().expect("client lock poisoned") = Arc::new(client);
        Ok(())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
