//! Polling watchers for the campaign list and for a single campaign.
//!
//! Each watcher owns at most one background task. The task fetches, then keeps
//! re-fetching every `refresh_interval` for as long as the latest snapshot
//! contains an active campaign. Any change of filters aborts the running task
//! before a new one is spawned, and dropping the watcher aborts it as well, so
//! no timer outlives its watcher or overlaps with another for the same watcher.
//!
//! A failed fetch keeps the previously loaded data for the same query. Polling
//! therefore carries on at the same fixed interval when the last successful
//! load still showed an active campaign. Data loaded under a different query
//! is discarded before the new fetch starts.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::dto::campaign_dto::CampaignListQuery;
use crate::models::campaign::{Campaign, CampaignDetails, CampaignStatus, RecipientStatus};
use crate::services::campaign_service::CampaignSource;

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(5000);
pub const LIST_ERROR_MESSAGE: &str = "Failed to load campaigns. Please try again.";
pub const DETAIL_ERROR_MESSAGE: &str = "Failed to load campaign details. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOptions {
    pub auto_refresh: bool,
    pub refresh_interval: Duration,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            auto_refresh: true,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    Idle,
    Loading,
    Loaded,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CampaignListSnapshot {
    pub state: FetchState,
    pub query: CampaignListQuery,
    pub campaigns: Vec<Campaign>,
    pub total_pages: u32,
    pub total_items: u64,
    pub error: Option<String>,
}

impl CampaignListSnapshot {
    fn new(query: CampaignListQuery) -> Self {
        Self {
            state: FetchState::Idle,
            query,
            campaigns: Vec::new(),
            total_pages: 0,
            total_items: 0,
            error: None,
        }
    }

    pub fn has_active(&self) -> bool {
        self.campaigns.iter().any(Campaign::is_active)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CampaignDetailSnapshot {
    pub state: FetchState,
    pub campaign_id: String,
    pub recipient_status: Option<RecipientStatus>,
    pub campaign: Option<CampaignDetails>,
    pub error: Option<String>,
}

impl CampaignDetailSnapshot {
    pub fn is_active(&self) -> bool {
        self.campaign.as_ref().is_some_and(CampaignDetails::is_active)
    }
}

fn spawn_poller<S, F, Fut>(
    tx: Arc<watch::Sender<S>>,
    options: WatchOptions,
    fetch_first: bool,
    fetch: F,
    should_poll: fn(&S) -> bool,
) -> JoinHandle<()>
where
    S: Send + Sync + 'static,
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        if fetch_first {
            fetch().await;
        }
        loop {
            let keep_polling = options.auto_refresh && should_poll(&tx.borrow());
            if !keep_polling {
                break;
            }
            tokio::time::sleep(options.refresh_interval).await;
            fetch().await;
        }
        debug!("Polling stopped, nothing active");
    })
}

async fn fetch_list(
    source: &dyn CampaignSource,
    query: &CampaignListQuery,
    tx: &watch::Sender<CampaignListSnapshot>,
) {
    tx.send_modify(|s| {
        // Campaigns loaded under another filter or page must not survive a failed reload.
        if s.query != *query {
            s.campaigns.clear();
            s.total_pages = 0;
            s.total_items = 0;
            s.query = query.clone();
        }
        s.state = FetchState::Loading;
    });

    match source.list_campaigns(query).await {
        Ok(page) => tx.send_modify(|s| {
            s.campaigns = page.campaigns;
            s.total_pages = page.total_pages;
            s.total_items = page.total_items;
            s.error = None;
            s.state = FetchState::Loaded;
        }),
        Err(e) => {
            warn!(error = %e, page = query.page, "Failed to fetch campaigns");
            tx.send_modify(|s| {
                s.error = Some(LIST_ERROR_MESSAGE.to_string());
                s.state = FetchState::Failed;
            });
        }
    }
}

async fn fetch_detail(
    source: &dyn CampaignSource,
    id: &str,
    recipient_status: Option<RecipientStatus>,
    tx: &watch::Sender<CampaignDetailSnapshot>,
) {
    tx.send_modify(|s| {
        if s.recipient_status != recipient_status {
            s.campaign = None;
            s.recipient_status = recipient_status.clone();
        }
        s.state = FetchState::Loading;
    });

    match source.get_campaign(id, recipient_status).await {
        Ok(details) => tx.send_modify(|s| {
            s.campaign = Some(details);
            s.error = None;
            s.state = FetchState::Loaded;
        }),
        Err(e) => {
            warn!(error = %e, campaign_id = id, "Failed to fetch campaign details");
            tx.send_modify(|s| {
                s.error = Some(DETAIL_ERROR_MESSAGE.to_string());
                s.state = FetchState::Failed;
            });
        }
    }
}

pub struct CampaignListWatcher {
    source: Arc<dyn CampaignSource>,
    options: WatchOptions,
    query: CampaignListQuery,
    tx: Arc<watch::Sender<CampaignListSnapshot>>,
    task: Option<JoinHandle<()>>,
}

impl CampaignListWatcher {
    pub fn new(source: Arc<dyn CampaignSource>, query: CampaignListQuery, options: WatchOptions) -> Self {
        let (tx, _rx) = watch::channel(CampaignListSnapshot::new(query.clone()));
        Self {
            source,
            options,
            query,
            tx: Arc::new(tx),
            task: None,
        }
    }

    /// Creates the watcher and immediately starts the first fetch.
    pub fn spawn(source: Arc<dyn CampaignSource>, query: CampaignListQuery, options: WatchOptions) -> Self {
        let mut watcher = Self::new(source, query, options);
        watcher.start();
        watcher
    }

    pub fn subscribe(&self) -> watch::Receiver<CampaignListSnapshot> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> CampaignListSnapshot {
        self.tx.borrow().clone()
    }

    pub fn query(&self) -> &CampaignListQuery {
        &self.query
    }

    pub fn is_polling(&self) -> bool {
        self.task.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn start(&mut self) {
        self.restart(true);
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.task.take() {
            handle.abort();
        }
    }

    /// Fetches now, then resumes polling if anything is still active.
    pub async fn refetch(&mut self) {
        self.stop();
        fetch_list(self.source.as_ref(), &self.query, &self.tx).await;
        self.restart(false);
    }

    pub fn set_page(&mut self, page: u32) {
        self.query.page = page.max(1);
        self.restart(true);
    }

    /// Changing the filter always goes back to the first page.
    pub fn set_status(&mut self, status: Option<CampaignStatus>) {
        self.query.status = status;
        self.query.page = 1;
        self.restart(true);
    }

    pub fn set_limit(&mut self, limit: u32) {
        self.query.limit = limit.max(1);
        self.query.page = 1;
        self.restart(true);
    }

    fn restart(&mut self, fetch_first: bool) {
        self.stop();

        let source = self.source.clone();
        let query = self.query.clone();
        let tx = self.tx.clone();
        let fetch = move || {
            let source = source.clone();
            let query = query.clone();
            let tx = tx.clone();
            async move { fetch_list(source.as_ref(), &query, &tx).await }
        };

        self.task = Some(spawn_poller(
            self.tx.clone(),
            self.options,
            fetch_first,
            fetch,
            CampaignListSnapshot::has_active,
        ));
    }
}

impl Drop for CampaignListWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

pub struct CampaignDetailWatcher {
    source: Arc<dyn CampaignSource>,
    options: WatchOptions,
    campaign_id: String,
    recipient_status: Option<RecipientStatus>,
    tx: Arc<watch::Sender<CampaignDetailSnapshot>>,
    task: Option<JoinHandle<()>>,
}

impl CampaignDetailWatcher {
    pub fn new(source: Arc<dyn CampaignSource>, campaign_id: impl Into<String>, options: WatchOptions) -> Self {
        let campaign_id = campaign_id.into();
        let (tx, _rx) = watch::channel(CampaignDetailSnapshot {
            state: FetchState::Idle,
            campaign_id: campaign_id.clone(),
            recipient_status: None,
            campaign: None,
            error: None,
        });
        Self {
            source,
            options,
            campaign_id,
            recipient_status: None,
            tx: Arc::new(tx),
            task: None,
        }
    }

    pub fn spawn(source: Arc<dyn CampaignSource>, campaign_id: impl Into<String>, options: WatchOptions) -> Self {
        let mut watcher = Self::new(source, campaign_id, options);
        watcher.start();
        watcher
    }

    pub fn subscribe(&self) -> watch::Receiver<CampaignDetailSnapshot> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> CampaignDetailSnapshot {
        self.tx.borrow().clone()
    }

    pub fn is_polling(&self) -> bool {
        self.task.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn start(&mut self) {
        self.restart(true);
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.task.take() {
            handle.abort();
        }
    }

    pub async fn refetch(&mut self) {
        self.stop();
        fetch_detail(
            self.source.as_ref(),
            &self.campaign_id,
            self.recipient_status.clone(),
            &self.tx,
        )
        .await;
        self.restart(false);
    }

    pub fn set_recipient_status(&mut self, status: Option<RecipientStatus>) {
        self.recipient_status = status;
        self.restart(true);
    }

    fn restart(&mut self, fetch_first: bool) {
        self.stop();

        let source = self.source.clone();
        let id = self.campaign_id.clone();
        let recipient_status = self.recipient_status.clone();
        let tx = self.tx.clone();
        let fetch = move || {
            let source = source.clone();
            let id = id.clone();
            let recipient_status = recipient_status.clone();
            let tx = tx.clone();
            async move { fetch_detail(source.as_ref(), &id, recipient_status, &tx).await }
        };

        self.task = Some(spawn_poller(
            self.tx.clone(),
            self.options,
            fetch_first,
            fetch,
            CampaignDetailSnapshot::is_active,
        ));
    }
}

impl Drop for CampaignDetailWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}
