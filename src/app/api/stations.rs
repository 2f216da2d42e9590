use crate::app::api::client::{decode_field, ApiFailure, LinkClient};
use crate::app::api::endpoints;
use crate::app::models::BaseStation;

impl LinkClient {
    /// Receiver stations drawn on the map layer, with per-station device
    /// counters.
    pub async fn base_stations(&self) -> Result<Vec<BaseStation>, ApiFailure> {
        let value = self.get(endpoints::BASE_STATIONS, &[]).await?;
        decode_field(&value, "stations")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn stations_payload_decodes_with_defaults() {
        let value: Value = serde_json::from_str(
            r#"{
                "success": true,
                "stations": [
                    {
                        "id": 1,
                        "station_name": "North Tower",
                        "latitude": 14.676,
                        "longitude": 121.043,
                        "status": "online",
                        "address": "Quezon City",
                        "online_devices": 4,
                        "total_devices": 5
                    },
                    { "station_name": "Bare Station" }
                ]
            }"#,
        )
        .unwrap();

        let stations: Vec<BaseStation> = decode_field(&value, "stations").expect("stations");
        assert_eq!(stations.len(), 2);
        assert_eq!(stations[0].online_devices, 4);
        assert_eq!(stations[1].id, 0);
        assert_eq!(stations[1].status, "");
    }
}
