use serde::{Deserialize, Serialize};

/// Staff access level, mapped from the `permission` column the server
/// returns at login. An unknown or missing value falls back to full access,
/// matching the server's default for legacy accounts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    FullAccess,
    /// "map-only" in the database: may watch the map and answer SOS alerts.
    SosMonitor,
    /// "logs-only" in the database: history and activity log, nothing else.
    LogsAccess,
}

impl Role {
    pub fn from_permission(permission: &str) -> Self {
        match permission {
            "map-only" => Role::SosMonitor,
            "logs-only" => Role::LogsAccess,
            _ => Role::FullAccess,
        }
    }

    pub fn as_permission(&self) -> &'static str {
        match self {
            Role::FullAccess => "full-access",
            Role::SosMonitor => "map-only",
            Role::LogsAccess => "logs-only",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Role::FullAccess => "Full Access",
            Role::SosMonitor => "SOS Monitor",
            Role::LogsAccess => "Logs Access",
        }
    }

    pub fn accent_color(&self) -> &'static str {
        match self {
            Role::FullAccess => "#059669",
            Role::SosMonitor => "#DC2626",
            Role::LogsAccess => "#2563EB",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Role::FullAccess => {
                "Full system access including device assignment, map viewing, \
                 SOS response, and log viewing"
            }
            Role::SosMonitor => {
                "Can view map and respond to SOS alerts, but cannot assign devices"
            }
            Role::LogsAccess => "Can view history and activity logs only",
        }
    }

    pub fn can_assign_devices(&self) -> bool {
        matches!(self, Role::FullAccess)
    }

    pub fn can_view_map(&self) -> bool {
        matches!(self, Role::FullAccess | Role::SosMonitor)
    }

    pub fn can_acknowledge_sos(&self) -> bool {
        matches!(self, Role::FullAccess | Role::SosMonitor)
    }

    pub fn can_view_history(&self) -> bool {
        true
    }

    pub fn can_view_activities(&self) -> bool {
        true
    }

    pub fn can_view_customers(&self) -> bool {
        matches!(self, Role::FullAccess)
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::FullAccess
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_database_permission_values() {
        assert_eq!(Role::from_permission("full-access"), Role::FullAccess);
        assert_eq!(Role::from_permission("map-only"), Role::SosMonitor);
        assert_eq!(Role::from_permission("logs-only"), Role::LogsAccess);
        assert_eq!(Role::from_permission(""), Role::FullAccess);
        assert_eq!(Role::from_permission("anything-else"), Role::FullAccess);
    }

    #[test]
    fn logs_access_is_read_only() {
        let role = Role::LogsAccess;
        assert!(!role.can_assign_devices());
        assert!(!role.can_view_map());
        assert!(!role.can_acknowledge_sos());
        assert!(!role.can_view_customers());
        assert!(role.can_view_history());
        assert!(role.can_view_activities());
    }

    #[test]
    fn sos_monitor_may_answer_but_not_assign() {
        let role = Role::SosMonitor;
        assert!(role.can_view_map());
        assert!(role.can_acknowledge_sos());
        assert!(!role.can_assign_devices());
        assert!(!role.can_view_customers());
    }

    #[test]
    fn permission_round_trip() {
        for role in [Role::FullAccess, Role::SosMonitor, Role::LogsAccess] {
            assert_eq!(Role::from_permission(role.as_permission()), role);
        }
    }
}
