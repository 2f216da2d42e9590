use crate::app::api::activities::{ActivityPage, PAGE_LIMIT};
use crate::app::api::client::ApiFailure;
use crate::app::models::{ActivityRow, DeviceActivity};

/// Phase of the pagination state machine. `Error` is deliberately sticky
/// until the user re-triggers a fetch; there is no automatic retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerPhase {
    Idle,
    Loading,
    Error,
}

/// Everything the fetcher needs for one page call. `generation` ties the
/// eventual completion back to the reset epoch it was issued under, so a
/// response that arrives after a filter toggle (or after the view went away)
/// is dropped instead of merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
    pub filter_by_me: bool,
    pub generation: u64,
}

/// How a successful page was folded into the accumulated list. The presenter
/// keys its scroll behavior off this: replace resets to the top, append
/// leaves the position alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageMerge {
    Replaced { count: usize },
    Appended { start: usize, count: usize },
    Empty { hint: Option<String> },
}

/// Owns the full pagination state of one activity-log view: current page,
/// in-flight flag, has-more flag, filter flag, and the accumulated items.
/// All mutation goes through the request/apply pairs below; the fetch itself
/// happens elsewhere, between `request_*` and `apply_*`.
///
/// Items are only ever appended (page > 1) or replaced wholesale (page 1).
/// The client does not deduplicate across pages; if the remote list shifts
/// between fetches, rows can repeat or be skipped. That mirrors the server
/// contract, which offers no stable cursor to do better against.
#[derive(Debug)]
pub struct ActivityPager {
    phase: PagerPhase,
    /// Last page merged successfully; 0 before anything loaded.
    loaded_page: u32,
    has_more: bool,
    filter_by_me: bool,
    generation: u64,
    items: Vec<DeviceActivity>,
}

impl ActivityPager {
    pub fn new() -> Self {
        Self {
            phase: PagerPhase::Idle,
            loaded_page: 0,
            has_more: true,
            filter_by_me: false,
            generation: 0,
            items: Vec::new(),
        }
    }

    pub fn items(&self) -> &[DeviceActivity] {
        &self.items
    }

    pub fn rows(&self) -> Vec<ActivityRow> {
        self.items.iter().map(ActivityRow::from).collect()
    }

    pub fn phase(&self) -> PagerPhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == PagerPhase::Loading
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn filter_by_me(&self) -> bool {
        self.filter_by_me
    }

    pub fn loaded_page(&self) -> u32 {
        self.loaded_page
    }

    /// Scroll reached the end (or the list just mounted): fetch the page
    /// after the last merged one. Returns `None` (request dropped, not
    /// queued) while a fetch is in flight or when the list is exhausted,
    /// which keeps at most one fetch outstanding. Allowed from `Error` so
    /// the user can retry the same page by scrolling again.
    pub fn request_next_page(&mut self) -> Option<PageRequest> {
        if self.phase == PagerPhase::Loading || !self.has_more {
            return None;
        }
        self.phase = PagerPhase::Loading;
        Some(self.make_request(self.loaded_page + 1))
    }

    /// Full reset back to page 1: items cleared, has-more restored, and the
    /// generation bumped so any in-flight completion becomes a no-op.
    pub fn request_refresh(&mut self) -> PageRequest {
        self.generation += 1;
        self.items.clear();
        self.loaded_page = 0;
        self.has_more = true;
        self.phase = PagerPhase::Loading;
        self.make_request(1)
    }

    pub fn toggle_filter(&mut self) -> PageRequest {
        self.filter_by_me = !self.filter_by_me;
        self.request_refresh()
    }

    /// Folds a successful fetch into the list. Returns `None` when the
    /// request is from a superseded generation (stale completion, dropped).
    pub fn apply_success(
        &mut self,
        request: &PageRequest,
        page: ActivityPage,
    ) -> Option<PageMerge> {
        if request.generation != self.generation {
            return None;
        }
        self.phase = PagerPhase::Idle;

        if page.items.is_empty() {
            self.has_more = false;
            if request.page == 1 {
                self.items.clear();
                return Some(PageMerge::Empty {
                    hint: page.filter_status,
                });
            }
            return Some(PageMerge::Appended {
                start: self.items.len(),
                count: 0,
            });
        }

        let merge = if request.page == 1 {
            self.items = page.items;
            PageMerge::Replaced {
                count: self.items.len(),
            }
        } else {
            let start = self.items.len();
            let count = page.items.len();
            self.items.extend(page.items);
            PageMerge::Appended { start, count }
        };
        self.loaded_page = request.page;
        self.has_more = (self.items.len() as u32) < page.total_items;
        Some(merge)
    }

    /// Records a failed fetch. Has-more is left untouched so the next scroll
    /// retries the same page. Returns whether this was a first-page failure
    /// (which forces the empty state), or `None` for stale completions.
    pub fn apply_failure(&mut self, request: &PageRequest, _failure: &ApiFailure) -> Option<bool> {
        if request.generation != self.generation {
            return None;
        }
        self.phase = PagerPhase::Error;
        Some(request.page == 1)
    }

    fn make_request(&self, page: u32) -> PageRequest {
        PageRequest {
            page,
            limit: PAGE_LIMIT,
            filter_by_me: self.filter_by_me,
            generation: self.generation,
        }
    }
}

impl Default for ActivityPager {
    fn default() -> Self {
        Self::new()
    }
}

/// Rendering contract of the activity-log view. The implementation must keep
/// the scroll position on `Appended` merges and reset it to the top on
/// `Replaced`; `Empty` swaps the list for the placeholder.
pub trait ActivityListView {
    fn render(&self, rows: &[ActivityRow], merge: &PageMerge);
    fn show_empty_state(&self, hint: Option<&str>);
    fn hide_empty_state(&self);
}

/// Drives a view from one merge outcome.
pub fn present(view: &dyn ActivityListView, rows: &[ActivityRow], merge: &PageMerge) {
    match merge {
        PageMerge::Empty { hint } => {
            view.render(rows, merge);
            view.show_empty_state(hint.as_deref());
        }
        _ => {
            view.hide_empty_state();
            view.render(rows, merge);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn activity(id: i64) -> DeviceActivity {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "serial_number": format!("LINK-{id:04}")
        }))
        .expect("activity")
    }

    fn page(ids: std::ops::Range<i64>, total: u32) -> ActivityPage {
        ActivityPage {
            items: ids.map(activity).collect(),
            total_items: total,
            filter_status: None,
        }
    }

    #[test]
    fn pages_accumulate_in_order_until_exhausted() {
        // 12 items at 5 per page: 5, 5, 2 with has-more true, true, false.
        let mut pager = ActivityPager::new();

        let req = pager.request_next_page().expect("page 1");
        assert_eq!(req.page, 1);
        pager.apply_success(&req, page(1..6, 12)).expect("merge 1");
        assert_eq!(pager.items().len(), 5);
        assert!(pager.has_more());

        let req = pager.request_next_page().expect("page 2");
        assert_eq!(req.page, 2);
        pager.apply_success(&req, page(6..11, 12)).expect("merge 2");
        assert_eq!(pager.items().len(), 10);
        assert!(pager.has_more());

        let req = pager.request_next_page().expect("page 3");
        assert_eq!(req.page, 3);
        let merge = pager.apply_success(&req, page(11..13, 12)).expect("merge 3");
        assert_eq!(merge, PageMerge::Appended { start: 10, count: 2 });
        assert_eq!(pager.items().len(), 12);
        assert!(!pager.has_more());

        // Exhausted: further scroll triggers are dropped.
        assert!(pager.request_next_page().is_none());

        let ids: Vec<i64> = pager.items().iter().map(|a| a.id).collect();
        assert_eq!(ids, (1..13).collect::<Vec<_>>());
    }

    #[test]
    fn appending_leaves_the_existing_prefix_untouched() {
        let mut pager = ActivityPager::new();
        let req = pager.request_next_page().expect("page 1");
        pager.apply_success(&req, page(1..6, 10)).expect("merge");
        let prefix: Vec<i64> = pager.items().iter().map(|a| a.id).collect();

        let req = pager.request_next_page().expect("page 2");
        pager.apply_success(&req, page(6..11, 10)).expect("merge");
        let all: Vec<i64> = pager.items().iter().map(|a| a.id).collect();
        assert_eq!(&all[..5], prefix.as_slice());
    }

    #[test]
    fn only_one_fetch_in_flight() {
        let mut pager = ActivityPager::new();
        let first = pager.request_next_page();
        assert!(first.is_some());
        assert!(pager.request_next_page().is_none());
        assert!(pager.is_loading());
    }

    #[test]
    fn empty_first_page_shows_empty_state_and_stops_paging() {
        let mut pager = ActivityPager::new();
        let req = pager.request_next_page().expect("page 1");
        let merge = pager
            .apply_success(
                &req,
                ActivityPage {
                    items: Vec::new(),
                    total_items: 0,
                    filter_status: Some("assigned to you".into()),
                },
            )
            .expect("merge");

        assert_eq!(
            merge,
            PageMerge::Empty {
                hint: Some("assigned to you".into())
            }
        );
        assert!(!pager.has_more());
        assert!(!pager.is_loading());
        assert!(pager.request_next_page().is_none());
    }

    #[test]
    fn empty_later_page_just_closes_the_list() {
        let mut pager = ActivityPager::new();
        let req = pager.request_next_page().expect("page 1");
        // Server over-reported the total; page 2 comes back empty.
        pager.apply_success(&req, page(1..6, 20)).expect("merge");

        let req = pager.request_next_page().expect("page 2");
        let merge = pager
            .apply_success(&req, page(6..6, 20))
            .expect("merge");
        assert_eq!(merge, PageMerge::Appended { start: 5, count: 0 });
        assert_eq!(pager.items().len(), 5);
        assert!(!pager.has_more());
    }

    #[test]
    fn failure_keeps_items_and_has_more_so_scroll_can_retry() {
        let mut pager = ActivityPager::new();
        let req = pager.request_next_page().expect("page 1");
        pager.apply_success(&req, page(1..6, 12)).expect("merge");

        let req = pager.request_next_page().expect("page 2");
        let first_page = pager
            .apply_failure(&req, &ApiFailure::api("unauthorized"))
            .expect("failure");
        assert!(!first_page);
        assert_eq!(pager.phase(), PagerPhase::Error);
        assert_eq!(pager.items().len(), 5);
        assert!(pager.has_more());

        // Retry fetches the page that failed, not the one after it.
        let retry = pager.request_next_page().expect("retry");
        assert_eq!(retry.page, 2);
    }

    #[test]
    fn first_page_failure_is_flagged_for_the_empty_state() {
        let mut pager = ActivityPager::new();
        let req = pager.request_next_page().expect("page 1");
        let first_page = pager
            .apply_failure(&req, &ApiFailure::api("unauthorized"))
            .expect("failure");
        assert!(first_page);
        assert!(pager.items().is_empty());
    }

    #[test]
    fn toggle_filter_resets_everything_and_flips_the_flag() {
        let mut pager = ActivityPager::new();
        let req = pager.request_next_page().expect("page 1");
        pager.apply_success(&req, page(1..6, 12)).expect("merge");

        let req = pager.toggle_filter();
        assert!(pager.filter_by_me());
        assert_eq!(req.page, 1);
        assert!(req.filter_by_me);
        assert!(pager.items().is_empty());
        assert!(pager.has_more());
        assert!(pager.is_loading());

        pager.apply_success(&req, page(20..23, 3)).expect("merge");
        let req = pager.toggle_filter();
        assert!(!pager.filter_by_me());
        assert_eq!(req.page, 1);
    }

    #[test]
    fn stale_completion_after_reset_is_dropped() {
        let mut pager = ActivityPager::new();
        let stale_req = pager.request_next_page().expect("page 1");

        // Filter toggled while that fetch was still in flight.
        let fresh_req = pager.toggle_filter();

        assert!(pager.apply_success(&stale_req, page(1..6, 12)).is_none());
        assert!(pager.items().is_empty());
        assert!(pager.is_loading());

        // The fresh fetch still lands normally.
        let merge = pager
            .apply_success(&fresh_req, page(50..52, 2))
            .expect("merge");
        assert_eq!(merge, PageMerge::Replaced { count: 2 });
        assert!(!pager.has_more());
    }

    #[test]
    fn stale_failure_is_dropped_too() {
        let mut pager = ActivityPager::new();
        let stale_req = pager.request_next_page().expect("page 1");
        let _fresh = pager.request_refresh();

        assert!(pager
            .apply_failure(&stale_req, &ApiFailure::network("timeout"))
            .is_none());
        assert!(pager.is_loading());
    }

    #[test]
    fn replace_recomputes_has_more_from_the_new_total() {
        let mut pager = ActivityPager::new();
        let req = pager.request_next_page().expect("page 1");
        pager.apply_success(&req, page(1..6, 5)).expect("merge");
        assert!(!pager.has_more());

        let req = pager.request_refresh();
        pager.apply_success(&req, page(1..6, 30)).expect("merge");
        assert!(pager.has_more());
        assert_eq!(pager.loaded_page(), 1);
    }

    struct RecordingView {
        calls: RefCell<Vec<String>>,
    }

    impl ActivityListView for RecordingView {
        fn render(&self, rows: &[ActivityRow], merge: &PageMerge) {
            let kind = match merge {
                PageMerge::Replaced { .. } => "replace",
                PageMerge::Appended { .. } => "append",
                PageMerge::Empty { .. } => "empty",
            };
            self.calls
                .borrow_mut()
                .push(format!("render:{kind}:{}", rows.len()));
        }

        fn show_empty_state(&self, hint: Option<&str>) {
            self.calls
                .borrow_mut()
                .push(format!("show_empty:{}", hint.unwrap_or("-")));
        }

        fn hide_empty_state(&self) {
            self.calls.borrow_mut().push("hide_empty".to_string());
        }
    }

    #[test]
    fn presenter_sees_empty_state_only_for_empty_merges() {
        let view = RecordingView {
            calls: RefCell::new(Vec::new()),
        };
        let mut pager = ActivityPager::new();

        let req = pager.request_next_page().expect("page 1");
        let merge = pager.apply_success(&req, page(1..6, 12)).expect("merge");
        present(&view, &pager.rows(), &merge);

        let req = pager.request_refresh();
        let merge = pager
            .apply_success(
                &req,
                ActivityPage {
                    items: Vec::new(),
                    total_items: 0,
                    filter_status: None,
                },
            )
            .expect("merge");
        present(&view, &pager.rows(), &merge);

        assert_eq!(
            view.calls.borrow().as_slice(),
            &[
                "hide_empty".to_string(),
                "render:replace:5".to_string(),
                "render:empty:0".to_string(),
                "show_empty:-".to_string(),
            ]
        );
    }
}
