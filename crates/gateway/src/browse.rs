use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::debug;

use claimdesk_core::domain::claim::{Claim, ClaimStatus};
use claimdesk_core::paging::{Page, PageRequest};

use crate::error::GatewayResult;
use crate::traits::{ClaimFilter, ClaimsGateway, SearchScope};

/// Trailing-edge delay applied to keyword input before a search fires.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(400);

/// Forwards only the last value of each input burst. A value is emitted once
/// `delay` passes with no newer value arriving; intermediate keystrokes are
/// dropped. The loop ends when the input channel closes, flushing any value
/// still pending.
pub async fn debounce_keystrokes(
    mut input: mpsc::Receiver<String>,
    delay: Duration,
    output: mpsc::Sender<String>,
) {
    let mut pending: Option<String> = None;

    loop {
        match pending.take() {
            None => match input.recv().await {
                Some(value) => pending = Some(value),
                None => return,
            },
            Some(latest) => match timeout(delay, input.recv()).await {
                Ok(Some(newer)) => pending = Some(newer),
                Ok(None) => {
                    let _ = output.send(latest).await;
                    return;
                }
                Err(_) => {
                    if output.send(latest).await.is_err() {
                        return;
                    }
                }
            },
        }
    }
}

#[derive(Debug)]
struct ViewState {
    keyword: Option<String>,
    status: Option<ClaimStatus>,
    page_num: u32,
    current: Option<Page<Claim>>,
    // Sequence number of the response currently shown. Guarded by the same
    // mutex as `current` so the newest-wins check and the write are one
    // atomic step.
    applied_seq: u64,
}

/// What a refresh produced. A response that lost the race to a newer request
/// is reported as stale and must not be rendered.
#[derive(Debug)]
pub enum RefreshOutcome {
    Applied(Page<Claim>),
    Stale,
}

/// Drives a paginated, filterable claim list. Every refresh carries a
/// sequence number; a response only lands if no newer response landed first,
/// so slow requests can never overwrite fresh results.
pub struct ClaimBrowser<G> {
    gateway: Arc<G>,
    scope: SearchScope,
    page_size: u32,
    state: Mutex<ViewState>,
    issued: AtomicU64,
}

impl<G: ClaimsGateway> ClaimBrowser<G> {
    pub fn new(gateway: Arc<G>, scope: SearchScope, page_size: u32) -> Self {
        Self {
            gateway,
            scope,
            page_size: page_size.max(1),
            state: Mutex::new(ViewState {
                keyword: None,
                status: None,
                page_num: 1,
                current: None,
                applied_seq: 0,
            }),
            issued: AtomicU64::new(0),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, ViewState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Changing the keyword returns the view to the first page.
    pub fn set_keyword(&self, keyword: Option<String>) {
        let mut state = self.lock_state();
        let keyword = keyword.filter(|word| !word.trim().is_empty());
        if state.keyword != keyword {
            state.keyword = keyword;
            state.page_num = 1;
        }
    }

    /// Changing the status filter returns the view to the first page.
    pub fn set_status(&self, status: Option<ClaimStatus>) {
        let mut state = self.lock_state();
        if state.status != status {
            state.status = status;
            state.page_num = 1;
        }
    }

    pub fn goto_page(&self, page_num: u32) {
        self.lock_state().page_num = page_num.max(1);
    }

    pub fn page_num(&self) -> u32 {
        self.lock_state().page_num
    }

    /// The last applied page, if any refresh has landed yet.
    pub fn current_page(&self) -> Option<Page<Claim>> {
        self.lock_state().current.clone()
    }

    /// Runs one search against the current filters and applies the result
    /// unless a newer refresh already landed.
    pub async fn refresh(&self) -> GatewayResult<RefreshOutcome> {
        let (seq, filter, page) = self.begin();
        let result = self.gateway.search_claims(&self.scope, &filter, page).await?;
        Ok(self.apply(seq, result))
    }

    /// Issues a sequence number and snapshots the filters for one request.
    /// Split from `apply` so tests can interleave responses out of order.
    pub fn begin(&self) -> (u64, ClaimFilter, PageRequest) {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let state = self.lock_state();
        let filter =
            ClaimFilter { keyword: state.keyword.clone(), status: state.status };
        let page = PageRequest { page_num: state.page_num, page_size: self.page_size };
        (seq, filter, page)
    }

    /// Drives the keyword filter from a raw keystroke stream. Keystrokes are
    /// debounced, then each settled value becomes the keyword and triggers a
    /// refresh. Returns when the input stream closes.
    pub async fn follow_keystrokes(
        &self,
        input: mpsc::Receiver<String>,
        delay: Duration,
    ) -> GatewayResult<()> {
        let (tx, mut debounced) = mpsc::channel(16);
        let worker = tokio::spawn(debounce_keystrokes(input, delay, tx));

        while let Some(keyword) = debounced.recv().await {
            self.set_keyword(Some(keyword));
            self.refresh().await?;
        }

        let _ = worker.await;
        Ok(())
    }

    /// Applies a response for request `seq`. Only the newest response wins;
    /// anything older is discarded. The check and the write happen under one
    /// lock so an older response can never land after a newer one passed the
    /// check.
    pub fn apply(&self, seq: u64, page: Page<Claim>) -> RefreshOutcome {
        let mut state = self.lock_state();
        if seq <= state.applied_seq {
            debug!(seq, newest = state.applied_seq, "discarding stale search response");
            return RefreshOutcome::Stale;
        }

        state.applied_seq = seq;
        state.current = Some(page.clone());
        RefreshOutcome::Applied(page)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;
    use tokio::sync::mpsc;

    use claimdesk_core::domain::claim::{Claim, ClaimId, ClaimStatus};
    use claimdesk_core::domain::project::ProjectId;
    use claimdesk_core::domain::user::UserId;
    use claimdesk_core::paging::Page;

    use super::{debounce_keystrokes, ClaimBrowser, RefreshOutcome, SEARCH_DEBOUNCE};
    use crate::memory::InMemoryGateway;
    use crate::traits::SearchScope;

    fn claim(id: &str, name: &str, status: ClaimStatus) -> Claim {
        let now = Utc::now();
        Claim {
            id: ClaimId(id.to_string()),
            staff_id: UserId("u-claimer".to_string()),
            approval_id: UserId("u-approver".to_string()),
            updated_by: None,
            claim_name: name.to_string(),
            project_id: ProjectId("P-1".to_string()),
            claim_start_date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            claim_end_date: NaiveDate::from_ymd_opt(2025, 1, 12).unwrap(),
            total_work_time: Decimal::new(8, 0),
            remark: None,
            status,
            audit_trail: Vec::new(),
            staff_name: None,
            staff_email: None,
            project_name: Some("Payments Revamp".to_string()),
            approver_name: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn browser_with_claims(claims: Vec<Claim>, page_size: u32) -> ClaimBrowser<InMemoryGateway> {
        let gateway = InMemoryGateway::new();
        for claim in claims {
            gateway.insert_claim(claim);
        }
        ClaimBrowser::new(
            Arc::new(gateway),
            SearchScope::Claimer(UserId("u-claimer".to_string())),
            page_size,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn debounce_emits_only_the_last_keystroke_of_a_burst() {
        let (tx, rx) = mpsc::channel(16);
        let (out_tx, mut out_rx) = mpsc::channel(16);
        let worker = tokio::spawn(debounce_keystrokes(rx, SEARCH_DEBOUNCE, out_tx));

        for value in ["o", "ov", "ove", "over"] {
            tx.send(value.to_string()).await.unwrap();
            tokio::time::advance(Duration::from_millis(100)).await;
        }
        tokio::time::advance(SEARCH_DEBOUNCE).await;

        assert_eq!(out_rx.recv().await.unwrap(), "over");
        drop(tx);
        worker.await.unwrap();
        assert!(out_rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn debounce_flushes_the_pending_value_when_input_closes() {
        let (tx, rx) = mpsc::channel(16);
        let (out_tx, mut out_rx) = mpsc::channel(16);
        let worker = tokio::spawn(debounce_keystrokes(rx, SEARCH_DEBOUNCE, out_tx));

        tx.send("overtime".to_string()).await.unwrap();
        drop(tx);

        worker.await.unwrap();
        assert_eq!(out_rx.recv().await.unwrap(), "overtime");
    }

    #[tokio::test]
    async fn changing_a_filter_resets_to_the_first_page() {
        let browser = browser_with_claims(Vec::new(), 10);
        browser.goto_page(4);
        assert_eq!(browser.page_num(), 4);

        browser.set_keyword(Some("overtime".to_string()));
        assert_eq!(browser.page_num(), 1);

        browser.goto_page(3);
        browser.set_status(Some(ClaimStatus::Approved));
        assert_eq!(browser.page_num(), 1);
    }

    #[tokio::test]
    async fn repeating_the_same_filter_keeps_the_page() {
        let browser = browser_with_claims(Vec::new(), 10);
        browser.set_status(Some(ClaimStatus::Approved));
        browser.goto_page(2);

        browser.set_status(Some(ClaimStatus::Approved));
        assert_eq!(browser.page_num(), 2);
    }

    #[tokio::test]
    async fn refresh_applies_filters_and_pagination() {
        let browser = browser_with_claims(
            vec![
                claim("C-1", "January overtime", ClaimStatus::Approved),
                claim("C-2", "February travel", ClaimStatus::Draft),
                claim("C-3", "March overtime", ClaimStatus::Approved),
            ],
            10,
        );
        browser.set_keyword(Some("overtime".to_string()));
        browser.set_status(Some(ClaimStatus::Approved));

        let outcome = browser.refresh().await.unwrap();
        let page = match outcome {
            RefreshOutcome::Applied(page) => page,
            RefreshOutcome::Stale => panic!("first refresh cannot be stale"),
        };
        assert_eq!(page.page_data.len(), 2);
        assert_eq!(page.page_info.total_items, 2);
        assert!(page.page_data.iter().all(|claim| claim.status == ClaimStatus::Approved));
    }

    #[tokio::test]
    async fn a_late_response_never_overwrites_a_newer_one() {
        let browser = browser_with_claims(Vec::new(), 10);

        let (old_seq, _, _) = browser.begin();
        let (new_seq, _, _) = browser.begin();

        let newer: Page<Claim> =
            Page { page_data: vec![claim("C-2", "newer", ClaimStatus::Draft)], ..Page::empty() };
        assert!(matches!(browser.apply(new_seq, newer), RefreshOutcome::Applied(_)));

        let older: Page<Claim> =
            Page { page_data: vec![claim("C-1", "older", ClaimStatus::Draft)], ..Page::empty() };
        assert!(matches!(browser.apply(old_seq, older), RefreshOutcome::Stale));

        let current = browser.current_page().unwrap();
        assert_eq!(current.page_data[0].claim_name, "newer");
    }

    #[tokio::test]
    async fn concurrent_responses_settle_on_the_newest_sequence() {
        let browser = browser_with_claims(Vec::new(), 10);

        let mut seqs = Vec::new();
        for _ in 0..8 {
            let (seq, _, _) = browser.begin();
            seqs.push(seq);
        }
        let newest = *seqs.last().unwrap();

        // Responses land from parallel threads in no particular order; the
        // view must still end on the newest one.
        std::thread::scope(|scope| {
            for seq in seqs.iter().rev().copied() {
                let browser = &browser;
                scope.spawn(move || {
                    let page: Page<Claim> = Page {
                        page_data: vec![claim(
                            &format!("C-{seq}"),
                            &format!("response {seq}"),
                            ClaimStatus::Draft,
                        )],
                        ..Page::empty()
                    };
                    browser.apply(seq, page);
                });
            }
        });

        let current = browser.current_page().unwrap();
        assert_eq!(current.page_data[0].claim_name, format!("response {newest}"));
    }

    #[tokio::test(start_paused = true)]
    async fn keystroke_burst_triggers_one_search_with_the_final_keyword() {
        let gateway = Arc::new(InMemoryGateway::new());
        gateway.insert_claim(claim("C-1", "January overtime", ClaimStatus::Draft));
        gateway.insert_claim(claim("C-2", "February travel", ClaimStatus::Draft));
        let browser = Arc::new(ClaimBrowser::new(
            Arc::clone(&gateway),
            SearchScope::Claimer(UserId("u-claimer".to_string())),
            10,
        ));

        let (tx, rx) = mpsc::channel(16);
        let worker = {
            let browser = Arc::clone(&browser);
            tokio::spawn(async move { browser.follow_keystrokes(rx, SEARCH_DEBOUNCE).await })
        };

        // Four keystrokes, each well inside the debounce window.
        for value in ["o", "ov", "ove", "over"] {
            tx.send(value.to_string()).await.unwrap();
            tokio::time::advance(Duration::from_millis(100)).await;
        }
        drop(tx);
        worker.await.unwrap().unwrap();

        // Exactly one search went out, carrying the final keyword.
        assert_eq!(gateway.request_count(), 1);
        let page = browser.current_page().unwrap();
        assert_eq!(page.page_data.len(), 1);
        assert_eq!(page.page_data[0].claim_name, "January overtime");
    }
}
