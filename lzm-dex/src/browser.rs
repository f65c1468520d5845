//! Dex browser: filtered list fetch, local edit layer, status reporting
//!
//! Filter changes are debounced with a generation counter: only the last
//! change within the debounce window fetches. Every fetch takes a sequence
//! number and a response older than the last applied one is discarded, so a
//! slow earlier request can never overwrite a newer list.

use crate::card;
use crate::merge::apply_dex_overrides;
use crate::store::{DexEntry, DexStore};
use lzm_common::client::SpeciesListQuery;
use lzm_common::events::{EventBus, UiEvent, UiEventKind};
use lzm_common::models::{fields, SpeciesRecord};
use lzm_common::{ApiClient, ApiError, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, warn};

pub const LOADING_MESSAGE: &str = "불러오는 중...";
pub const LIST_FAILED_MESSAGE: &str = "도감 데이터를 불러오지 못했습니다.";
pub const LIST_NOT_DEPLOYED_MESSAGE: &str = "도감 목록 API가 아직 백엔드에 배포되지 않았습니다. 백엔드를 최신 버전으로 재배포한 후 다시 시도해 주세요.";

/// Active search text and difficulty filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DexFilter {
    pub query: String,
    pub difficulty: String,
}

impl DexFilter {
    pub fn new(query: &str, difficulty: &str) -> Self {
        Self {
            query: query.trim().to_string(),
            difficulty: difficulty.trim().to_string(),
        }
    }

    pub fn is_active(&self) -> bool {
        !self.query.is_empty() || !self.difficulty.is_empty()
    }

    fn to_query(&self, limit: u32) -> SpeciesListQuery {
        SpeciesListQuery {
            q: Some(self.query.clone()),
            difficulty: Some(self.difficulty.clone()),
            limit,
        }
    }
}

/// Status line above the grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DexStatus {
    Hidden,
    Loading,
    Error(String),
}

impl DexStatus {
    pub fn message(&self) -> &str {
        match self {
            DexStatus::Hidden => "",
            DexStatus::Loading => LOADING_MESSAGE,
            DexStatus::Error(msg) => msg,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, DexStatus::Error(_))
    }
}

/// The dex page's visible surface
pub trait DexView: Send {
    fn set_status(&mut self, status: &DexStatus);
    fn render_grid(&mut self, items: &[SpeciesRecord]);
}

/// View that keeps the latest status and grid markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridView {
    pub status: DexStatus,
    pub html: String,
    pub card_count: usize,
    pub renders: usize,
}

impl Default for GridView {
    fn default() -> Self {
        Self {
            status: DexStatus::Hidden,
            html: String::new(),
            card_count: 0,
            renders: 0,
        }
    }
}

impl DexView for GridView {
    fn set_status(&mut self, status: &DexStatus) {
        self.status = status.clone();
    }

    fn render_grid(&mut self, items: &[SpeciesRecord]) {
        self.html = card::render_grid(items);
        self.card_count = items.len();
        self.renders += 1;
    }
}

/// User-facing message for a failed list fetch
pub fn list_error_message(err: &ApiError) -> String {
    match err {
        ApiError::Http {
            status: 404,
            code: Some(code),
            message,
            ..
        } if code == "SPECIES_NOT_FOUND" && message.contains("list") => LIST_NOT_DEPLOYED_MESSAGE.to_string(),
        ApiError::Http { status, body, .. } => {
            format!("도감 데이터를 불러오지 못했습니다 ({}): {}", status, body)
        }
        other => {
            let msg = other.user_message();
            if msg.trim().is_empty() {
                LIST_FAILED_MESSAGE.to_string()
            } else {
                msg
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    Create,
    Edit,
}

/// Result of one list fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied { items: usize },
    /// A newer response was already applied
    Stale,
    Failed(String),
}

#[derive(Debug, Clone, Copy)]
pub struct DexSettings {
    pub debounce: Duration,
    pub list_limit: u32,
}

impl Default for DexSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(200),
            list_limit: 500,
        }
    }
}

#[derive(Default)]
struct BrowserState {
    base_items: Vec<SpeciesRecord>,
    last_filter: DexFilter,
    applied_seq: u64,
}

pub struct DexBrowser<V> {
    client: ApiClient,
    store: DexStore,
    view: Arc<Mutex<V>>,
    settings: DexSettings,
    state: Mutex<BrowserState>,
    next_seq: AtomicU64,
    generation: AtomicU64,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<V: DexView> DexBrowser<V> {
    pub fn new(client: ApiClient, store: DexStore, view: Arc<Mutex<V>>, settings: DexSettings) -> Self {
        Self {
            client,
            store,
            view,
            settings,
            state: Mutex::new(BrowserState::default()),
            next_seq: AtomicU64::new(0),
            generation: AtomicU64::new(0),
        }
    }

    pub fn store(&self) -> &DexStore {
        &self.store
    }

    /// Fetch the list for `filter` and render it merged with local edits
    pub async fn refresh(&self, filter: DexFilter) -> RefreshOutcome {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        lock(&self.state).last_filter = filter.clone();
        lock(&self.view).set_status(&DexStatus::Loading);

        let result = self
            .client
            .species_list(&filter.to_query(self.settings.list_limit))
            .await;

        let mut state = lock(&self.state);
        if seq < state.applied_seq {
            debug!(seq, applied = state.applied_seq, "Discarding stale dex list response");
            return RefreshOutcome::Stale;
        }
        state.applied_seq = seq;

        match result {
            Ok(list) => {
                state.base_items = list.items;
                let merged = self.merged(&state.base_items);
                drop(state);

                let mut view = lock(&self.view);
                view.set_status(&DexStatus::Hidden);
                view.render_grid(&merged);
                RefreshOutcome::Applied { items: merged.len() }
            }
            Err(e) => {
                state.base_items.clear();
                drop(state);
                warn!(error = %e, "Dex list fetch failed");
                let message = list_error_message(&e);

                let mut view = lock(&self.view);
                view.render_grid(&[]);
                view.set_status(&DexStatus::Error(message.clone()));
                RefreshOutcome::Failed(message)
            }
        }
    }

    /// Debounced refresh; returns `None` when a later change superseded this one
    pub async fn filter_changed(&self, filter: DexFilter) -> Option<RefreshOutcome> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.settings.debounce).await;

        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "Filter change superseded");
            return None;
        }
        Some(self.refresh(filter).await)
    }

    /// Persist a create or edit, then refresh the visible grid
    pub async fn save_entry(&self, entry: &DexEntry, mode: EditMode) -> Result<()> {
        match mode {
            EditMode::Create => self.store.add_custom(entry)?,
            EditMode::Edit => self.store.save_override(entry)?,
        }
        self.after_local_edit().await;
        Ok(())
    }

    /// Re-render from cached base items; re-fetch if a filter is active
    pub async fn after_local_edit(&self) {
        let (merged, filter) = {
            let state = lock(&self.state);
            (self.merged(&state.base_items), state.last_filter.clone())
        };
        lock(&self.view).render_grid(&merged);

        if filter.is_active() {
            self.refresh(filter).await;
        }
    }

    /// Current merged record for `name`, used to prefill the edit form
    pub async fn record_for_edit(&self, name: &str) -> SpeciesRecord {
        let cached = {
            let state = lock(&self.state);
            self.merged(&state.base_items)
                .into_iter()
                .find(|r| r.name() == Some(name))
        };
        if let Some(record) = cached {
            return record;
        }

        let mut record = match self.client.species_detail(name).await {
            Ok(record) => record,
            Err(e) => {
                warn!(species = %name, error = %e, "No backend record to edit");
                let mut blank = SpeciesRecord::new();
                blank.set(fields::NAME, name);
                blank
            }
        };
        if let Some(patch) = self.store.overrides().get(name) {
            record.apply_patch(patch);
        }
        record
    }

    fn merged(&self, base: &[SpeciesRecord]) -> Vec<SpeciesRecord> {
        apply_dex_overrides(base, &self.store.custom_entries(), &self.store.overrides())
    }
}

impl<V: DexView + 'static> DexBrowser<V> {
    /// Subscribe to filter changes and saved entries
    ///
    /// Filter changes run on their own task so a newer change can supersede
    /// one still waiting out the debounce.
    pub fn register(self: Arc<Self>, bus: &EventBus) {
        let browser = Arc::clone(&self);
        bus.on(UiEventKind::FilterChanged, move |event| {
            let browser = Arc::clone(&browser);
            async move {
                if let UiEvent::FilterChanged { query, difficulty } = event {
                    let filter = DexFilter::new(&query, &difficulty);
                    tokio::spawn(async move {
                        browser.filter_changed(filter).await;
                    });
                }
            }
        });

        let browser = self;
        bus.on(UiEventKind::EntrySaved, move |event| {
            let browser = Arc::clone(&browser);
            async move {
                if let UiEvent::EntrySaved { name } = event {
                    debug!(species = %name, "Dex entry saved");
                }
                browser.after_local_edit().await;
            }
        });
    }
}
