use serde_json::{json, Value};

use crate::app::api::client::{decode_field, envelope_message, ApiFailure, LinkClient};
use crate::app::api::endpoints;
use crate::app::models::SosAlert;

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSosHistory {
    pub count: i64,
    pub alerts: Vec<SosAlert>,
}

impl LinkClient {
    pub async fn resolved_sos_history(
        &self,
        user_id: i64,
    ) -> Result<ResolvedSosHistory, ApiFailure> {
        let query = [("user_id", user_id.to_string())];
        let value = self.get(endpoints::RESOLVED_SOS, &query).await?;
        let count: i64 = decode_field(&value, "count")?;
        let alerts: Vec<SosAlert> = decode_field(&value, "alerts")?;
        Ok(ResolvedSosHistory { count, alerts })
    }

    /// Closes an open SOS for the transmitter whose QR code was scanned.
    pub async fn resolve_sos_by_qr(
        &self,
        transmitter_serial: &str,
        staff_id: i64,
        resolution_notes: &str,
    ) -> Result<String, ApiFailure> {
        let body = json!({
            "transmitter_serial": transmitter_serial,
            "staff_id": staff_id,
            "resolution_notes": resolution_notes,
        });
        let value = self.post_json(endpoints::RESOLVE_SOS_BY_QR, &body).await?;
        Ok(envelope_message(&value).unwrap_or_else(|| "SOS resolved".to_string()))
    }
}

/// QR labels on the transmitters come in two generations: bare serial text,
/// or a JSON blob whose serial key was renamed twice. Accept all of them.
pub fn serial_from_qr(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        for key in ["serial_number", "serialNumber", "serial"] {
            if let Some(serial) = value.get(key).and_then(Value::as_str) {
                let serial = serial.trim();
                if !serial.is_empty() {
                    return Some(serial.to_string());
                }
            }
        }
        // JSON without a known key is some other QR code, not a transmitter.
        if value.is_object() {
            return None;
        }
    }
    Some(trimmed.to_string())
}
