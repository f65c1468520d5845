//! # LizardMatch dex
//!
//! Species browser over the backend list endpoint with a local-only edit
//! layer (custom entries and per-name override patches) merged at render
//! time.

pub mod browser;
pub mod card;
pub mod merge;
pub mod store;

pub use browser::{DexBrowser, DexFilter, DexSettings, DexStatus, DexView, EditMode, GridView, RefreshOutcome};
pub use merge::apply_dex_overrides;
pub use store::{DexEntry, DexStore};
