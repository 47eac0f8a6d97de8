//! Change listeners with per-listener failure isolation.

use std::panic::{AssertUnwindSafe, catch_unwind};

use storefront_core::LineItem;

/// Error a listener may return to report that it could not handle a change.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

type Listener = Box<dyn FnMut(&[LineItem]) -> Result<(), ListenerError>>;

/// Handle returned by [`ListenerRegistry::add`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// Ordered set of cart change listeners.
///
/// Listeners run in subscription order. A listener that returns an error or
/// panics is logged and skipped; the remaining listeners still run.
#[derive(Default)]
pub struct ListenerRegistry {
    next_id: u64,
    listeners: Vec<(ListenerId, Listener)>,
}

impl ListenerRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `listener`, returning its id.
    pub fn add<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&[LineItem]) -> Result<(), ListenerError> + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Unsubscribe a listener. Returns `false` if it was not registered.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Returns `true` if nobody is listening.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Invoke every listener with `items`. Returns how many failed.
    pub fn notify(&mut self, items: &[LineItem]) -> usize {
        let mut failures = 0;
        for (id, listener) in &mut self.listeners {
            match catch_unwind(AssertUnwindSafe(|| listener(items))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    failures += 1;
                    tracing::error!(listener = %id, error = %e, "cart listener failed");
                }
                Err(payload) => {
                    failures += 1;
                    let message = payload
                        .downcast_ref::<&str>()
                        .map(|s| (*s).to_string())
                        .or_else(|| payload.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "unknown panic".to_string());
                    tracing::error!(listener = %id, panic = %message, "cart listener panicked");
                }
            }
        }
        failures
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}
