// ── Reactive remote query ──
//
// Binds a remote fetch to a reactive input value. Every change of the
// input re-invokes the fetch; only the most recently started invocation
// may apply its outcome, so a slow response to an old input can never
// overwrite a newer one. Superseded outcomes are dropped before they are
// queued, and receivers re-check the generation when they apply one.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use futures_util::future::BoxFuture;
use tokio::sync::{mpsc, watch};
use tracing::{debug, trace};

use crate::error::CoreError;

/// The fetch operation a query is bound to.
pub type Fetcher<P, T> = Arc<dyn Fn(P) -> BoxFuture<'static, Result<T, CoreError>> + Send + Sync>;

/// Outcome of one completed invocation, tagged with the generation that
/// started it.
///
/// An outcome can be superseded while it sits in the channel. Receivers
/// must check [`ReactiveQuery::is_current()`] at the moment they apply it,
/// under the same lock that guards the state they update.
#[derive(Debug)]
pub struct QueryEvent<T> {
    pub generation: u64,
    pub result: Result<T, CoreError>,
}

/// A remote fetch re-run whenever its input parameter changes.
///
/// Outcomes are delivered on the receiver returned by [`new()`](Self::new).
/// Invocations run as Tokio tasks, so the owner stays responsive while a
/// fetch is suspended. Cheap to clone.
pub struct ReactiveQuery<P, T> {
    inner: Arc<QueryInner<P, T>>,
}

struct QueryInner<P, T> {
    name: &'static str,
    fetch: Fetcher<P, T>,
    /// Last-known input. `None` until first set, or after `clear()`.
    params: watch::Sender<Option<P>>,
    /// Bumped on every invocation and on `clear()`.
    generation: AtomicU64,
    /// Generation whose outcome has been delivered (or discarded by `clear()`).
    settled: AtomicU64,
    /// Whether any invocation has ever delivered an outcome.
    completed: AtomicBool,
    events: mpsc::UnboundedSender<QueryEvent<T>>,
}

impl<P, T> Clone for ReactiveQuery<P, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P, T> fmt::Debug for ReactiveQuery<P, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveQuery")
            .field("name", &self.inner.name)
            .field("generation", &self.inner.generation.load(Ordering::Acquire))
            .field("settled", &self.inner.settled.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

impl<P, T> ReactiveQuery<P, T>
where
    P: Clone + PartialEq + Send + Sync + 'static,
    T: Send + 'static,
{
    /// Create an idle query. Nothing is fetched until the first
    /// [`set_params()`](Self::set_params).
    pub fn new(
        name: &'static str,
        fetch: Fetcher<P, T>,
    ) -> (Self, mpsc::UnboundedReceiver<QueryEvent<T>>) {
        let (params, _) = watch::channel(None);
        let (events, rx) = mpsc::unbounded_channel();
        let query = Self {
            inner: Arc::new(QueryInner {
                name,
                fetch,
                params,
                generation: AtomicU64::new(0),
                settled: AtomicU64::new(0),
                completed: AtomicBool::new(false),
                events,
            }),
        };
        (query, rx)
    }

    /// Update the input. Fetches only if the value actually changed;
    /// returns whether a fetch was started.
    ///
    /// Must be called within a Tokio runtime.
    pub fn set_params(&self, params: P) -> bool {
        let mut started = None;
        self.inner.params.send_if_modified(|current| {
            if current.as_ref() == Some(&params) {
                return false;
            }
            *current = Some(params.clone());
            // Bumped under the watch lock so generation order matches
            // input order even if two callers race.
            started = Some(self.inner.generation.fetch_add(1, Ordering::AcqRel) + 1);
            true
        });

        match started {
            Some(generation) => {
                self.spawn_invocation(params, generation);
                true
            }
            None => {
                trace!(query = self.inner.name, "input unchanged, not refetching");
                false
            }
        }
    }

    /// Re-run the fetch with the last-known input.
    ///
    /// Skipped (returns `false`) if no invocation has ever completed or the
    /// query has been cleared.
    pub fn refresh(&self) -> bool {
        if !self.has_completed() {
            debug!(query = self.inner.name, "refresh skipped: nothing fetched yet");
            return false;
        }
        self.refetch()
    }

    /// Re-run the fetch with the last-known input, superseding any
    /// invocation still in flight. Unlike [`refresh()`](Self::refresh) this
    /// does not wait for a first completion.
    ///
    /// Returns `false` if there is no input.
    pub fn refetch(&self) -> bool {
        let mut started = None;
        self.inner.params.send_if_modified(|current| {
            if let Some(params) = current.as_ref() {
                let generation = self.inner.generation.fetch_add(1, Ordering::AcqRel) + 1;
                started = Some((params.clone(), generation));
            }
            false
        });

        match started {
            Some((params, generation)) => {
                debug!(query = self.inner.name, generation, "refreshing");
                self.spawn_invocation(params, generation);
                true
            }
            None => {
                debug!(query = self.inner.name, "refresh skipped: no input");
                false
            }
        }
    }

    /// Forget the input and discard any in-flight result.
    pub fn clear(&self) {
        self.inner.params.send_if_modified(|current| {
            let generation = self.inner.generation.fetch_add(1, Ordering::AcqRel) + 1;
            self.inner.settled.store(generation, Ordering::Release);
            current.take().is_some()
        });
        debug!(query = self.inner.name, "cleared");
    }

    /// The last-known input value.
    pub fn params(&self) -> Option<P> {
        self.inner.params.borrow().clone()
    }

    /// Whether any invocation has ever delivered an outcome.
    pub fn has_completed(&self) -> bool {
        self.inner.completed.load(Ordering::Acquire)
    }

    /// Whether an outcome of `generation` may still be applied, i.e. no
    /// newer invocation or `clear()` has happened since it started.
    pub fn is_current(&self, generation: u64) -> bool {
        self.inner.generation.load(Ordering::Acquire) == generation
    }

    /// Whether the most recent invocation is still outstanding.
    pub fn is_pending(&self) -> bool {
        self.inner.generation.load(Ordering::Acquire) != self.inner.settled.load(Ordering::Acquire)
    }

    fn spawn_invocation(&self, params: P, generation: u64) {
        let inner = Arc::clone(&self.inner);
        let fut = (inner.fetch)(params);
        debug!(query = inner.name, generation, "fetch started");

        tokio::spawn(async move {
            let result = fut.await;

            if inner.generation.load(Ordering::Acquire) != generation {
                debug!(query = inner.name, generation, "discarding superseded result");
                return;
            }

            inner.settled.store(generation, Ordering::Release);
            inner.completed.store(true, Ordering::Release);
            match &result {
                Ok(_) => trace!(query = inner.name, generation, "fetch succeeded"),
                Err(e) => debug!(query = inner.name, generation, error = %e, "fetch failed"),
            }
            let _ = inner.events.send(QueryEvent { generation, result });
        });
    }
}
