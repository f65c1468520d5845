//! Per-page answer persistence and survey navigation
//!
//! Answers for page N live under `page{N}` in the session-scoped store. The
//! `surveyInProgress` flag tells a fresh first-page visit (discard earlier
//! answers) apart from a back/forward revisit (keep them).

use crate::form::{self, Form, RestoreReport};
use lzm_common::models::{PageAnswers, RecommendationResponse};
use lzm_common::storage::{load_json, save_json};
use lzm_common::{KeyValueStore, Result};
use std::sync::Arc;
use tracing::{debug, info};

/// Number of survey pages
pub const PAGE_COUNT: u8 = 4;

pub const IN_PROGRESS_KEY: &str = "surveyInProgress";
pub const RESULTS_KEY: &str = "recommendationResults";

/// Navigation target for "start over"
pub const RESET_TARGET: &str = "index.html?reset=true";

pub fn page_key(page: u8) -> String {
    format!("page{}", page)
}

/// Navigation context of the current page load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavContext {
    /// `reset=true` was present in the query string
    pub reset: bool,
}

impl NavContext {
    /// Parse a query string such as `?reset=true&x=1`
    pub fn from_query(query: &str) -> Self {
        let reset = query
            .trim_start_matches('?')
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .any(|(k, v)| k == "reset" && v == "true");
        Self { reset }
    }
}

/// Page after `page`, if any
pub fn next_page(page: u8) -> Option<u8> {
    (page < PAGE_COUNT).then_some(page + 1)
}

/// Page before `page`, if any
pub fn previous_page(page: u8) -> Option<u8> {
    (page > 1).then(|| page - 1)
}

/// Progress indicator for one page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub page: u8,
    pub total: u8,
    pub percent: u32,
}

impl Progress {
    pub fn for_page(page: u8) -> Self {
        let page = page.clamp(1, PAGE_COUNT);
        let percent = ((page as f64 / PAGE_COUNT as f64) * 100.0).round() as u32;
        Self {
            page,
            total: PAGE_COUNT,
            percent,
        }
    }

    pub fn text(&self) -> String {
        format!("질문 {} / {}", self.page, self.total)
    }
}

/// What happened when a page tried to restore its answers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// `reset=true` suppressed restoration
    SkippedForReset,
    /// Nothing (usable) was stored for the page
    NothingStored,
    Restored(RestoreReport),
}

/// Session-scoped survey state
#[derive(Clone)]
pub struct PageStore {
    store: Arc<dyn KeyValueStore>,
}

impl PageStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Write one page's answers; also marks the survey in progress
    pub fn save(&self, page: u8, answers: &PageAnswers) -> Result<()> {
        self.store.set(IN_PROGRESS_KEY, "true")?;
        save_json(self.store.as_ref(), &page_key(page), answers)?;
        debug!(page, fields = answers.len(), "Saved page answers");
        Ok(())
    }

    /// Collect the form and save it, returning what was stored
    pub fn save_form(&self, page: u8, form: &Form) -> Result<PageAnswers> {
        let answers = form::collect(form);
        self.save(page, &answers)?;
        Ok(answers)
    }

    /// Stored answers for a page; malformed data counts as absent
    pub fn load(&self, page: u8) -> Option<PageAnswers> {
        load_json(self.store.as_ref(), &page_key(page))
    }

    /// Re-apply stored answers to the page's form
    pub fn restore(&self, page: u8, form: &mut Form, nav: &NavContext) -> RestoreOutcome {
        if nav.reset {
            return RestoreOutcome::SkippedForReset;
        }

        match self.load(page) {
            Some(answers) => {
                let report = form::restore(form, &answers);
                if !report.skipped.is_empty() {
                    debug!(page, skipped = ?report.skipped, "Skipped fields missing from form");
                }
                RestoreOutcome::Restored(report)
            }
            None => RestoreOutcome::NothingStored,
        }
    }

    /// Page-load bookkeeping
    ///
    /// A first-page visit that is forced (`reset=true`) or not part of a
    /// running survey discards earlier answers. Returns true if it did.
    pub fn init_session(&self, page: u8, nav: &NavContext) -> Result<bool> {
        if page != 1 {
            self.store.set(IN_PROGRESS_KEY, "true")?;
            return Ok(false);
        }

        if nav.reset || !self.is_in_progress() {
            self.clear_survey()?;
            self.store.set(IN_PROGRESS_KEY, "true")?;
            info!(forced = nav.reset, "Starting a fresh survey");
            return Ok(true);
        }

        Ok(false)
    }

    pub fn is_in_progress(&self) -> bool {
        self.store.get(IN_PROGRESS_KEY).as_deref() == Some("true")
    }

    /// Drop all page answers and the in-progress flag; stored results stay
    pub fn clear_survey(&self) -> Result<()> {
        for page in 1..=PAGE_COUNT {
            self.store.remove(&page_key(page))?;
        }
        self.store.remove(IN_PROGRESS_KEY)
    }

    /// Drop the whole session, results included; returns the navigation target
    pub fn reset_survey(&self) -> Result<&'static str> {
        self.store.clear()?;
        info!("Survey session reset");
        Ok(RESET_TARGET)
    }

    /// Union of all pages' answers; later pages win on repeated fields
    pub fn collect_all(&self) -> PageAnswers {
        let mut combined = PageAnswers::new();
        for page in 1..=PAGE_COUNT {
            if let Some(answers) = self.load(page) {
                combined.merge(&answers);
            }
        }
        combined
    }

    /// Persist the recommendation response body as received
    pub fn store_results(&self, raw: &str) -> Result<()> {
        self.store.set(RESULTS_KEY, raw)
    }

    pub fn load_results(&self) -> Option<RecommendationResponse> {
        load_json(self.store.as_ref(), RESULTS_KEY)
    }
}
