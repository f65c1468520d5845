//! UI event subscription
//!
//! Components register async handlers against named UI events; `dispatch`
//! runs the handlers for an event one after another in registration order.
//! Nothing beyond registration order is guaranteed.

use futures::future::BoxFuture;
use futures::FutureExt;
use std::future::Future;
use std::sync::{Arc, Mutex};

/// Events raised by the survey and dex views
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// Final survey page submitted
    Submit,

    /// Dex search text or difficulty filter changed
    FilterChanged { query: String, difficulty: String },

    /// Dex entry created or edited locally
    EntrySaved { name: String },

    /// "Start over" requested
    Reset,
}

/// Discriminant used for handler registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiEventKind {
    Submit,
    FilterChanged,
    EntrySaved,
    Reset,
}

impl UiEvent {
    pub fn kind(&self) -> UiEventKind {
        match self {
            UiEvent::Submit => UiEventKind::Submit,
            UiEvent::FilterChanged { .. } => UiEventKind::FilterChanged,
            UiEvent::EntrySaved { .. } => UiEventKind::EntrySaved,
            UiEvent::Reset => UiEventKind::Reset,
        }
    }
}

type Handler = Arc<dyn Fn(UiEvent) -> BoxFuture<'static, ()> + Send + Sync>;

/// Handler registry and dispatcher
///
/// # Examples
///
/// ```
/// use lzm_common::events::{EventBus, UiEvent, UiEventKind};
///
/// let bus = EventBus::new();
/// bus.on(UiEventKind::Submit, |_event| async move {
///     // start submission
/// });
/// assert_eq!(bus.handler_count(UiEventKind::Submit), 1);
/// ```
#[derive(Default)]
pub struct EventBus {
    handlers: Mutex<Vec<(UiEventKind, Handler)>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for one event kind
    pub fn on<F, Fut>(&self, kind: UiEventKind, handler: F)
    where
        F: Fn(UiEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handler: Handler = Arc::new(move |event| handler(event).boxed());
        self.handlers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((kind, handler));
    }

    /// Run every handler registered for the event's kind, in registration order
    ///
    /// Returns the number of handlers run.
    pub async fn dispatch(&self, event: UiEvent) -> usize {
        let kind = event.kind();
        let matching: Vec<Handler> = self
            .handlers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, h)| Arc::clone(h))
            .collect();

        tracing::debug!(?kind, handlers = matching.len(), "Dispatching UI event");

        for handler in &matching {
            handler(event.clone()).await;
        }

        matching.len()
    }

    pub fn handler_count(&self, kind: UiEventKind) -> usize {
        self.handlers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .filter(|(k, _)| *k == kind)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dispatch_in_registration_order() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        for i in 0..3 {
            let log = Arc::clone(&log);
            bus.on(UiEventKind::Submit, move |_| {
                let log = Arc::clone(&log);
                async move {
                    tokio::task::yield_now().await;
                    log.lock().unwrap().push(i);
                }
            });
        }

        let ran = bus.dispatch(UiEvent::Submit).await;
        assert_eq!(ran, 3);
        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_dispatch_only_matching_kind() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let s = Arc::clone(&seen);
        bus.on(UiEventKind::FilterChanged, move |event| {
            let s = Arc::clone(&s);
            async move {
                s.lock().unwrap().push(event);
            }
        });

        assert_eq!(bus.dispatch(UiEvent::Submit).await, 0);
        let event = UiEvent::FilterChanged {
            query: "게코".into(),
            difficulty: String::new(),
        };
        assert_eq!(bus.dispatch(event.clone()).await, 1);
        assert_eq!(*seen.lock().unwrap(), vec![event]);
    }
}
