use reqwest::Url;

use crate::app::api::client::ApiFailure;

pub const LOGIN: &str = "login.php";
pub const REGISTER: &str = "register.php";
pub const VERIFY_DEVICE: &str = "verify_device.php";
pub const CHANGE_PASSWORD: &str = "change_password.php";
pub const UPDATE_PROFILE: &str = "update_profile.php";
pub const DEVICE_ACTIVITIES: &str = "get_device_activities.php";
pub const ACTIVE_CUSTOMERS: &str = "get_active_customers.php";
pub const DEVICES: &str = "get_devices.php";
pub const ASSIGN_DEVICE: &str = "assign_device.php";
pub const END_ASSIGNMENT: &str = "end_assignment.php";
pub const RESOLVED_SOS: &str = "get_resolved_sos.php";
pub const RESOLVE_SOS_BY_QR: &str = "resolve_sos_by_qr.php";
pub const BASE_STATIONS: &str = "get_base_stations.php";
pub const ADD_FAMILY_MEMBER: &str = "add_family_members.php";
pub const GET_FAMILY_MEMBERS: &str = "get_family_members.php";
pub const UPDATE_FAMILY_MEMBER: &str = "update_family_members.php";
pub const DELETE_FAMILY_MEMBER: &str = "delete_family_members.php";

/// Joins the configured API root with the individual PHP endpoints. The root
/// must keep its trailing slash or `Url::join` would swallow the last path
/// segment.
#[derive(Debug, Clone)]
pub struct ApiEndpoints {
    base: Url,
}

impl ApiEndpoints {
    pub fn new(base_url: &str) -> Result<Self, ApiFailure> {
        let mut normalized = base_url.trim().to_string();
        if normalized.is_empty() {
            return Err(ApiFailure::parse("API base URL is empty"));
        }
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        let base = Url::parse(&normalized)
            .map_err(|err| ApiFailure::parse(format!("Invalid API base URL: {err}")))?;
        Ok(Self { base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn url(&self, endpoint: &str) -> Url {
        self.base
            .join(endpoint)
            .expect("endpoint names are static and valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_endpoint_onto_base() {
        let endpoints = ApiEndpoints::new("http://192.168.1.5/LinkApi/").expect("base");
        assert_eq!(
            endpoints.url(LOGIN).as_str(),
            "http://192.168.1.5/LinkApi/login.php"
        );
        assert_eq!(
            endpoints.url(DEVICE_ACTIVITIES).as_str(),
            "http://192.168.1.5/LinkApi/get_device_activities.php"
        );
    }

    #[test]
    fn missing_trailing_slash_is_repaired() {
        let endpoints = ApiEndpoints::new("https://cbhms.ucc-bsit.org/LinkApi").expect("base");
        assert_eq!(
            endpoints.url(RESOLVED_SOS).as_str(),
            "https://cbhms.ucc-bsit.org/LinkApi/get_resolved_sos.php"
        );
    }

    #[test]
    fn rejects_garbage_base() {
        assert!(ApiEndpoints::new("not a url").is_err());
        assert!(ApiEndpoints::new("   ").is_err());
    }
}
