use async_trait::async_trait;
use serde_json::Value;

use crate::app::api::client::{decode_field, ApiFailure, LinkClient};
use crate::app::api::endpoints;
use crate::app::api::paging::PageRequest;
use crate::app::models::DeviceActivity;

/// Fixed page size of the activity log; the server caps at this too.
pub const PAGE_LIMIT: u32 = 5;

/// One decoded slice of the remote activity log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityPage {
    pub items: Vec<DeviceActivity>,
    pub total_items: u32,
    /// Server-side explanation shown when the filtered list comes back empty.
    pub filter_status: Option<String>,
}

/// Seam between the pagination controller and the network; the production
/// implementation is `LinkClient`, tests substitute scripted pages.
#[async_trait]
pub trait ActivityPageFetcher: Send + Sync {
    async fn fetch_page(
        &self,
        user_id: i64,
        request: &PageRequest,
    ) -> Result<ActivityPage, ApiFailure>;
}

#[async_trait]
impl ActivityPageFetcher for LinkClient {
    async fn fetch_page(
        &self,
        user_id: i64,
        request: &PageRequest,
    ) -> Result<ActivityPage, ApiFailure> {
        let query = [
            ("user_id", user_id.to_string()),
            (
                "filter_by_me",
                if request.filter_by_me { "1" } else { "0" }.to_string(),
            ),
            ("page", request.page.to_string()),
            ("limit", request.limit.to_string()),
        ];
        let value = self.get(endpoints::DEVICE_ACTIVITIES, &query).await?;
        decode_activity_page(&value)
    }
}

/// Decodes the payload of a successful envelope. Each record is permissive
/// (only `id` is required), but `total_items` must accompany a non-empty page
/// or the controller could not compute has-more.
pub fn decode_activity_page(value: &Value) -> Result<ActivityPage, ApiFailure> {
    let items: Vec<DeviceActivity> = decode_field(value, "data")?;
    let total_items = if items.is_empty() {
        value
            .get("total_items")
            .and_then(Value::as_u64)
            .unwrap_or(0) as u32
    } else {
        decode_field::<u64>(value, "total_items")? as u32
    };
    let filter_status = value
        .get("filter_status")
        .and_then(Value::as_str)
        .map(|s| s.to_string());
    Ok(ActivityPage {
        items,
        total_items,
        filter_status,
    })
}
