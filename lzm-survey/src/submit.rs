//! Final-page submission
//!
//! Collect stored pages, assemble preferences, POST them, then either store
//! the response and move to the results view, or alert and leave the submit
//! control usable for a retry.

use crate::preferences::PreferenceAssembler;
use crate::session::PageStore;
use lzm_common::client::Recommendation;
use lzm_common::events::{EventBus, UiEventKind};
use lzm_common::models::{RecommendOptions, RecommendRequest};
use lzm_common::{ApiClient, Result};
use std::sync::Arc;
use tracing::{error, info};

/// Submit label while a request is in flight
pub const BUSY_LABEL: &str = "처리 중...";

/// Submit label at rest
pub const SUBMIT_LABEL: &str = "추천 받기";

/// Navigation target after a successful submission
pub const RESULTS_TARGET: &str = "results.html";

/// User-facing text for a failed submission
pub fn failure_alert(message: &str) -> String {
    format!("오류가 발생했습니다: {}", message)
}

/// The survey page's interactive surface
pub trait SurveyView: Send {
    fn set_submit_enabled(&mut self, enabled: bool, label: &str);
    fn set_busy(&mut self, busy: bool);
    fn alert(&mut self, message: &str);
    fn navigate(&mut self, target: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted { results: usize },
    Failed { message: String },
}

pub struct SubmissionController {
    pages: PageStore,
    client: ApiClient,
    assembler: PreferenceAssembler,
    options: RecommendOptions,
}

impl SubmissionController {
    pub fn new(
        pages: PageStore,
        client: ApiClient,
        assembler: PreferenceAssembler,
        options: RecommendOptions,
    ) -> Self {
        Self {
            pages,
            client,
            assembler,
            options,
        }
    }

    /// Request body built from the currently stored pages
    pub fn build_request(&self) -> RecommendRequest {
        RecommendRequest {
            preferences: self.assembler.assemble(&self.pages.collect_all()),
            options: self.options,
        }
    }

    /// Run one submission against the view
    pub async fn submit<V: SurveyView + ?Sized>(&self, view: &mut V) -> SubmitOutcome {
        view.set_submit_enabled(false, BUSY_LABEL);
        view.set_busy(true);

        match self.send().await {
            Ok(recommendation) => {
                let results = recommendation.response.results.len();
                info!(results, "Survey submitted");
                view.navigate(RESULTS_TARGET);
                SubmitOutcome::Submitted { results }
            }
            Err(e) => {
                let message = e.user_message();
                error!(error = %e, "Survey submission failed");
                view.alert(&failure_alert(&message));
                view.set_submit_enabled(true, SUBMIT_LABEL);
                view.set_busy(false);
                SubmitOutcome::Failed { message }
            }
        }
    }

    async fn send(&self) -> Result<Recommendation> {
        let request = self.build_request();
        let recommendation = self.client.recommend(&request).await?;

        self.pages.store_results(&recommendation.raw)?;
        self.pages.clear_survey()?;

        Ok(recommendation)
    }

    /// Wire the submit and reset events to this controller
    pub fn register<V>(self: Arc<Self>, bus: &EventBus, view: Arc<tokio::sync::Mutex<V>>)
    where
        V: SurveyView + 'static,
    {
        let pages = self.pages.clone();
        let controller = self;
        let submit_view = Arc::clone(&view);
        bus.on(UiEventKind::Submit, move |_| {
            let controller = Arc::clone(&controller);
            let view = Arc::clone(&submit_view);
            async move {
                let mut view = view.lock().await;
                controller.submit(&mut *view).await;
            }
        });

        bus.on(UiEventKind::Reset, move |_| {
            let pages = pages.clone();
            let view = Arc::clone(&view);
            async move {
                match pages.reset_survey() {
                    Ok(target) => view.lock().await.navigate(target),
                    Err(e) => error!(error = %e, "Failed to reset survey"),
                }
            }
        });
    }
}
