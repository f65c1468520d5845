//! # LizardMatch survey client
//!
//! The multi-page survey pipeline:
//! - [`form`]: read page controls into answers and restore them
//! - [`session`]: per-page persistence, session flag and navigation
//! - [`preferences`]: weighted request assembly
//! - [`submit`]: final submission and its UI state
//! - [`detail_cache`] and [`render`]: results enrichment and markup
//! - [`import`]: command-line answer input

pub mod detail_cache;
pub mod form;
pub mod import;
pub mod preferences;
pub mod render;
pub mod session;
pub mod submit;

pub use detail_cache::{DetailCache, LookupState};
pub use preferences::{PreferenceAssembler, WeightProfile};
pub use render::{ResultsLayout, ResultsRenderer, ResultsView};
pub use session::{NavContext, PageStore};
pub use submit::{SubmissionController, SubmitOutcome, SurveyView};
