//! Memoizing species detail lookups
//!
//! The first lookup for a name starts the request and stores its shared
//! future; later lookups (including concurrent ones) await that same future.
//! Failures are cached as `None` for the cache's lifetime, so a render pass
//! never retries a missing species.

use futures::future::{BoxFuture, FutureExt, Shared};
use lzm_common::models::SpeciesRecord;
use lzm_common::ApiClient;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, warn};

type DetailFuture = Shared<BoxFuture<'static, Option<SpeciesRecord>>>;

/// Lifecycle of one cached lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupState {
    NotRequested,
    InFlight,
    Resolved,
    Failed,
}

/// Per-species detail cache over [`ApiClient::species_detail`]
pub struct DetailCache {
    client: ApiClient,
    slots: Mutex<HashMap<String, DetailFuture>>,
}

impl DetailCache {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Detail record for `name`, or `None` if it could not be fetched
    pub async fn get(&self, name: &str) -> Option<SpeciesRecord> {
        if name.is_empty() {
            return None;
        }

        let pending = {
            let mut slots = self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            match slots.get(name) {
                Some(existing) => {
                    debug!(species = %name, "Species detail cache hit");
                    existing.clone()
                }
                None => {
                    let fut = Self::fetch(self.client.clone(), name.to_string());
                    slots.insert(name.to_string(), fut.clone());
                    fut
                }
            }
        };

        pending.await
    }

    fn fetch(client: ApiClient, name: String) -> DetailFuture {
        async move {
            match client.species_detail(&name).await {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(species = %name, error = %e, "Species detail unavailable");
                    None
                }
            }
        }
        .boxed()
        .shared()
    }

    pub fn state(&self, name: &str) -> LookupState {
        let slots = self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        match slots.get(name).map(|fut| fut.peek()) {
            None => LookupState::NotRequested,
            Some(None) => LookupState::InFlight,
            Some(Some(Some(_))) => LookupState::Resolved,
            Some(Some(None)) => LookupState::Failed,
        }
    }

    /// Number of distinct names requested so far
    pub fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
