//! # LizardMatch Common Library
//!
//! Shared code for the survey and dex clients including:
//! - Survey answer, preference and species models
//! - Browser-style key-value storage
//! - Backend HTTP client
//! - Configuration loading
//! - UI event dispatch
//! - Image URL and markup helpers

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod html;
pub mod images;
pub mod models;
pub mod storage;

pub use client::{ApiClient, ApiError};
pub use error::{Error, Result};
pub use storage::{KeyValueStore, MemoryStore, JsonFileStore};
