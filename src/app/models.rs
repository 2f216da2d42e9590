use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub const TEXT_NOT_AVAILABLE: &str = "N/A";
pub const TEXT_NOT_ASSIGNED: &str = "Not Assigned";
pub const TEXT_NEVER: &str = "Never";
pub const TEXT_UNKNOWN_CUSTOMER: &str = "Unknown Customer";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommandResponse<T> {
    pub trace_id: String,
    pub data: T,
}

/// One row of the remote device activity log. Only `id` is guaranteed by the
/// server; every other field may be absent and is rendered through the
/// display helpers instead of raw `Option`s.
///
/// Coordinates stay as strings on purpose: the server reports them at full
/// precision and the client never does arithmetic on them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceActivity {
    pub id: i64,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_contact: Option<String>,
    #[serde(default)]
    pub latitude: Option<String>,
    #[serde(default)]
    pub longitude: Option<String>,
    #[serde(default)]
    pub recorded_at: Option<String>,
    #[serde(default)]
    pub battery_percent: Option<i32>,
    #[serde(default)]
    pub device_owner: Option<String>,
    #[serde(default)]
    pub assigned_by: Option<i64>,
    #[serde(default)]
    pub assigned_by_name: Option<String>,
    #[serde(default)]
    pub assigned_at: Option<String>,
}

impl DeviceActivity {
    pub fn serial_display(&self) -> &str {
        non_empty(&self.serial_number).unwrap_or(TEXT_NOT_AVAILABLE)
    }

    pub fn customer_display(&self) -> &str {
        non_empty(&self.customer_name).unwrap_or(TEXT_NOT_ASSIGNED)
    }

    pub fn latitude_display(&self) -> &str {
        non_empty(&self.latitude).unwrap_or(TEXT_NOT_AVAILABLE)
    }

    pub fn longitude_display(&self) -> &str {
        non_empty(&self.longitude).unwrap_or(TEXT_NOT_AVAILABLE)
    }

    pub fn recorded_display(&self) -> String {
        match non_empty(&self.recorded_at) {
            Some(raw) => format_timestamp(raw),
            None => TEXT_NEVER.to_string(),
        }
    }

    pub fn assigned_by_display(&self) -> &str {
        non_empty(&self.assigned_by_name).unwrap_or(TEXT_NOT_ASSIGNED)
    }

    pub fn assigned_at_display(&self) -> String {
        match non_empty(&self.assigned_at) {
            Some(raw) => format_timestamp(raw),
            None => TEXT_NEVER.to_string(),
        }
    }
}

/// Presenter-facing projection of one activity row with all placeholders
/// already applied.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivityRow {
    pub id: i64,
    pub serial: String,
    pub customer: String,
    pub latitude: String,
    pub longitude: String,
    pub recorded: String,
}

impl From<&DeviceActivity> for ActivityRow {
    fn from(activity: &DeviceActivity) -> Self {
        Self {
            id: activity.id,
            serial: activity.serial_display().to_string(),
            customer: activity.customer_display().to_string(),
            latitude: activity.latitude_display().to_string(),
            longitude: activity.longitude_display().to_string(),
            recorded: activity.recorded_display(),
        }
    }
}

/// Tracked transmitter currently assigned to a customer, as reported by the
/// active-customers endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomerDevice {
    pub serial_number: String,
    pub device_name: String,
    pub status: String,
    pub battery_percent: i32,
    pub customer_name: String,
    #[serde(default)]
    pub customer_contact: String,
    pub assignment_id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub last_update: String,
    pub minutes_ago: i64,
}

impl CustomerDevice {
    /// The map and the dashboard both drop devices that never reported a fix;
    /// the server encodes those as 0.0/0.0.
    pub fn has_valid_location(&self) -> bool {
        self.latitude != 0.0 && self.longitude != 0.0
    }

    pub fn formatted_location(&self) -> String {
        format!("{:.5}, {:.5}", self.latitude, self.longitude)
    }

    pub fn formatted_last_update(&self) -> String {
        match self.minutes_ago {
            0 => "Just now".to_string(),
            1 => "1 minute ago".to_string(),
            m if m < 60 => format!("{m} minutes ago"),
            m if m / 60 == 1 => "1 hour ago".to_string(),
            m => format!("{} hours ago", m / 60),
        }
    }
}

/// Per-staff device board: availability counters plus one entry per owned
/// transmitter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceBoard {
    #[serde(default)]
    pub available_count: i64,
    #[serde(default)]
    pub active_count: i64,
    #[serde(default)]
    pub devices: Vec<BoardDevice>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoardDevice {
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub device_name: Option<String>,
    #[serde(default)]
    pub device_status: Option<String>,
    #[serde(default)]
    pub assigned_name: Option<String>,
    #[serde(default)]
    pub assigned_contact: Option<String>,
    #[serde(default)]
    pub assigned_by: Option<String>,
    #[serde(default)]
    pub assignment_id: Option<i64>,
}

impl BoardDevice {
    pub fn display_name(&self) -> &str {
        non_empty(&self.device_name)
            .or_else(|| non_empty(&self.serial_number))
            .unwrap_or(TEXT_NOT_AVAILABLE)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SosAlert {
    pub id: i64,
    pub transmitter_serial: String,
    pub assignment_id: i64,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_contact: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub battery_percent: i32,
    pub rssi: i32,
    pub alert_time: String,
    #[serde(default)]
    pub acknowledged_at: Option<String>,
    #[serde(default)]
    pub acknowledged_by_name: Option<String>,
    #[serde(default)]
    pub resolved_at: Option<String>,
    #[serde(default)]
    pub resolved_by_name: Option<String>,
    #[serde(default)]
    pub resolution_notes: Option<String>,
}

impl SosAlert {
    pub fn customer_display(&self) -> &str {
        non_empty(&self.customer_name).unwrap_or(TEXT_UNKNOWN_CUSTOMER)
    }

    pub fn formatted_location(&self) -> String {
        format!("{:.6}, {:.6}", self.latitude, self.longitude)
    }

    /// For resolved alerts the resolution time wins over the alert time. The
    /// upstream database sometimes stores the literal string "null".
    fn effective_timestamp(&self) -> &str {
        match non_empty(&self.resolved_at) {
            Some(resolved) if resolved != "null" => resolved,
            _ => &self.alert_time,
        }
    }

    pub fn formatted_date(&self) -> String {
        match NaiveDateTime::parse_from_str(self.effective_timestamp(), "%Y-%m-%d %H:%M:%S") {
            Ok(dt) => dt.format("%-m/%-d/%Y").to_string(),
            Err(_) => TEXT_NOT_AVAILABLE.to_string(),
        }
    }

    pub fn formatted_time(&self) -> String {
        match NaiveDateTime::parse_from_str(self.effective_timestamp(), "%Y-%m-%d %H:%M:%S") {
            Ok(dt) => dt.format("%-I:%M %p").to_string(),
            Err(_) => TEXT_NOT_AVAILABLE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BaseStation {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub station_name: String,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub online_devices: i64,
    #[serde(default)]
    pub total_devices: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FamilyMember {
    pub id: i64,
    pub full_name: String,
    pub relationship: String,
    pub contact_number: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
}

/// `user` object of a successful login response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub user_type: String,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub staff_id: Option<i64>,
    #[serde(default)]
    pub staff_name: Option<String>,
    #[serde(default)]
    pub permission: Option<String>,
    #[serde(default)]
    pub added_by: Option<i64>,
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.is_empty())
}

/// Timestamps arrive in a handful of shapes depending on which PHP endpoint
/// produced them; unparseable input is shown verbatim.
pub fn format_timestamp(raw: &str) -> String {
    let parsed = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(|date| date.and_hms_opt(0, 0, 0).expect("midnight is valid"))
        });
    match parsed {
        Ok(dt) => dt.format("%m/%d/%Y %I:%M %p").to_string(),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_with_only_id_renders_placeholders() {
        let activity: DeviceActivity = serde_json::from_value(serde_json::json!({"id": 7}))
            .expect("id-only record must decode");

        assert_eq!(activity.id, 7);
        assert_eq!(activity.serial_display(), "N/A");
        assert_eq!(activity.customer_display(), "Not Assigned");
        assert_eq!(activity.latitude_display(), "N/A");
        assert_eq!(activity.longitude_display(), "N/A");
        assert_eq!(activity.recorded_display(), "Never");
        assert_eq!(activity.assigned_at_display(), "Never");
    }

    #[test]
    fn activity_decodes_all_fields_and_keeps_raw_coordinates() {
        let activity: DeviceActivity = serde_json::from_value(serde_json::json!({
            "id": 12,
            "serial_number": "LINK-0042",
            "latitude": "14.599512345",
            "longitude": "120.984219876",
            "recorded_at": "2025-03-01 14:30:00",
            "customer_name": "Maria Cruz",
            "battery_percent": 87
        }))
        .expect("decode");

        assert_eq!(activity.latitude_display(), "14.599512345");
        assert_eq!(activity.longitude_display(), "120.984219876");
        assert_eq!(activity.recorded_display(), "03/01/2025 02:30 PM");
        assert_eq!(activity.battery_percent, Some(87));
    }

    #[test]
    fn activity_without_id_fails_to_decode() {
        let result: Result<DeviceActivity, _> =
            serde_json::from_value(serde_json::json!({"serial_number": "LINK-1"}));
        assert!(result.is_err());
    }

    #[test]
    fn blank_strings_fall_back_to_placeholders() {
        let activity: DeviceActivity = serde_json::from_value(serde_json::json!({
            "id": 3,
            "serial_number": "",
            "customer_name": ""
        }))
        .expect("decode");
        assert_eq!(activity.serial_display(), "N/A");
        assert_eq!(activity.customer_display(), "Not Assigned");
    }

    #[test]
    fn unparseable_timestamp_is_shown_verbatim() {
        assert_eq!(format_timestamp("yesterday-ish"), "yesterday-ish");
        assert_eq!(format_timestamp("2025-03-01"), "03/01/2025 12:00 AM");
    }

    #[test]
    fn customer_device_last_update_buckets() {
        let mut device = CustomerDevice {
            serial_number: "LINK-1".into(),
            device_name: "Tracker".into(),
            status: "active".into(),
            battery_percent: 50,
            customer_name: "Ana".into(),
            customer_contact: String::new(),
            assignment_id: 1,
            latitude: 14.6,
            longitude: 121.0,
            last_update: "2025-03-01 10:00:00".into(),
            minutes_ago: 0,
        };
        assert_eq!(device.formatted_last_update(), "Just now");
        device.minutes_ago = 1;
        assert_eq!(device.formatted_last_update(), "1 minute ago");
        device.minutes_ago = 45;
        assert_eq!(device.formatted_last_update(), "45 minutes ago");
        device.minutes_ago = 60;
        assert_eq!(device.formatted_last_update(), "1 hour ago");
        device.minutes_ago = 150;
        assert_eq!(device.formatted_last_update(), "2 hours ago");
    }

    #[test]
    fn zero_coordinates_are_not_a_valid_location() {
        let device = CustomerDevice {
            serial_number: "LINK-2".into(),
            device_name: "Tracker".into(),
            status: "active".into(),
            battery_percent: 10,
            customer_name: "Ben".into(),
            customer_contact: String::new(),
            assignment_id: 2,
            latitude: 0.0,
            longitude: 0.0,
            last_update: String::new(),
            minutes_ago: 5,
        };
        assert!(!device.has_valid_location());
    }

    #[test]
    fn sos_alert_prefers_resolution_time() {
        let alert: SosAlert = serde_json::from_value(serde_json::json!({
            "id": 9,
            "transmitter_serial": "LINK-9",
            "assignment_id": 4,
            "latitude": 14.5995,
            "longitude": 120.9842,
            "battery_percent": 22,
            "rssi": -71,
            "alert_time": "2025-02-28 08:15:00",
            "resolved_at": "2025-02-28 09:05:00"
        }))
        .expect("decode");

        assert_eq!(alert.customer_display(), "Unknown Customer");
        assert_eq!(alert.formatted_location(), "14.599500, 120.984200");
        assert_eq!(alert.formatted_date(), "2/28/2025");
        assert_eq!(alert.formatted_time(), "9:05 AM");
    }

    #[test]
    fn sos_alert_with_literal_null_resolution_uses_alert_time() {
        let alert: SosAlert = serde_json::from_value(serde_json::json!({
            "id": 10,
            "transmitter_serial": "LINK-10",
            "assignment_id": 5,
            "latitude": 1.0,
            "longitude": 2.0,
            "battery_percent": 90,
            "rssi": -60,
            "alert_time": "2025-02-28 23:59:59",
            "resolved_at": "null"
        }))
        .expect("decode");
        assert_eq!(alert.formatted_time(), "11:59 PM");
    }
}
