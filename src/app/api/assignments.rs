use serde_json::{json, Value};

use crate::app::api::client::{decode_field, envelope_message, ApiFailure, LinkClient};
use crate::app::api::endpoints;
use crate::app::models::{CustomerDevice, DeviceBoard};

impl LinkClient {
    /// Devices currently out with customers, for the dashboard and the map.
    /// `staff_id` narrows the board to one staff member's assignments.
    pub async fn active_customers(
        &self,
        user_id: i64,
        staff_id: Option<i64>,
    ) -> Result<Vec<CustomerDevice>, ApiFailure> {
        let mut query = vec![("user_id", user_id.to_string())];
        if let Some(staff_id) = staff_id.filter(|id| *id > 0) {
            query.push(("staff_id", staff_id.to_string()));
        }
        let value = self.get(endpoints::ACTIVE_CUSTOMERS, &query).await?;
        decode_field(&value, "devices")
    }

    /// Availability counters plus the per-device assignment list for one
    /// staff member.
    pub async fn device_board(&self, staff_id: i64) -> Result<DeviceBoard, ApiFailure> {
        let query = [("staff_id", staff_id.to_string())];
        let value = self.get(endpoints::DEVICES, &query).await?;
        serde_json::from_value(value)
            .map_err(|err| ApiFailure::parse(format!("Unexpected device board shape: {err}")))
    }

    pub async fn assign_device(
        &self,
        serial_number: &str,
        assigned_name: &str,
        assigned_contact: &str,
        staff_id: i64,
    ) -> Result<String, ApiFailure> {
        let body = json!({
            "serial_number": serial_number,
            "assigned_name": assigned_name,
            "assigned_contact": assigned_contact,
            "staff_id": staff_id,
        });
        let value = self.post_json(endpoints::ASSIGN_DEVICE, &body).await?;
        Ok(reply_message(&value, "Device assigned"))
    }

    pub async fn end_assignment(
        &self,
        assignment_id: i64,
        staff_id: i64,
    ) -> Result<String, ApiFailure> {
        let body = json!({
            "assignment_id": assignment_id,
            "staff_id": staff_id,
        });
        let value = self.post_json(endpoints::END_ASSIGNMENT, &body).await?;
        Ok(reply_message(&value, "Assignment ended successfully"))
    }
}

fn reply_message(value: &Value, fallback: &str) -> String {
    envelope_message(value).unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use crate::app::models::DeviceBoard;

    #[test]
    fn device_board_decodes_counters_and_devices() {
        let board: DeviceBoard = serde_json::from_value(serde_json::json!({
            "success": true,
            "available_count": 3,
            "active_count": 2,
            "devices": [
                {
                    "serial_number": "LINK-0001",
                    "device_name": "Tracker A",
                    "device_status": "active",
                    "assigned_name": "Maria Cruz",
                    "assigned_contact": "0917-555-0001",
                    "assigned_by": "J. Doe",
                    "assignment_id": 11
                },
                { "serial_number": "LINK-0002" }
            ]
        }))
        .expect("decode");

        assert_eq!(board.available_count, 3);
        assert_eq!(board.active_count, 2);
        assert_eq!(board.devices.len(), 2);
        assert_eq!(board.devices[0].display_name(), "Tracker A");
        assert_eq!(board.devices[1].display_name(), "LINK-0002");
        assert_eq!(board.devices[1].assignment_id, None);
    }
}
