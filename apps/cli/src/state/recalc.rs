//! # Recalculator
//!
//! Debounced, cancellable recompute of the form.
//!
//! ## Generations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  submit(A) ── gen 1 ── sleep(debounce) ──X aborted                      │
//! │  submit(B) ── gen 2 ── sleep(debounce) ──X aborted                      │
//! │  submit(C) ── gen 3 ── sleep(debounce) ── evaluate ── publish gen 3     │
//! │                                                                         │
//! │  A result is published only if its generation is still the latest      │
//! │  when it is ready. Subscribers read the latest value from a watch      │
//! │  channel, so a slow reader never sees a stale result after a new one.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tco_core::{CoreResult, InputRecord, TcoResult};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use super::form::evaluate;

/// One published recompute.
#[derive(Debug, Clone, PartialEq)]
pub struct Recalculation {
    pub generation: u64,
    /// The snapshot that was evaluated.
    pub input: InputRecord,
    pub outcome: CoreResult<TcoResult>,
}

impl Recalculation {
    pub fn result(&self) -> Option<&TcoResult> {
        self.outcome.as_ref().ok()
    }
}

pub struct Recalculator {
    debounce: Duration,
    generation: Arc<AtomicU64>,
    tx: Arc<watch::Sender<Option<Recalculation>>>,
    pending: Option<JoinHandle<()>>,
}

impl Recalculator {
    pub fn new(debounce: Duration) -> Self {
        let (tx, _rx) = watch::channel(None);
        Recalculator {
            debounce,
            generation: Arc::new(AtomicU64::new(0)),
            tx: Arc::new(tx),
            pending: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Recalculation>> {
        self.tx.subscribe()
    }

    /// The most recent published recompute, if any.
    pub fn latest(&self) -> Option<Recalculation> {
        self.tx.borrow().clone()
    }

    /// Generation of the most recent submission.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Schedules a recompute of `input`, superseding any pending one.
    ///
    /// Returns the generation assigned to this submission.
    pub fn submit(&mut self, input: InputRecord) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.abort_pending();

        let latest = Arc::clone(&self.generation);
        let tx = Arc::clone(&self.tx);
        let debounce = self.debounce;

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if latest.load(Ordering::SeqCst) != generation {
                return;
            }

            let outcome = evaluate(&input);

            // Checked again under the channel lock: a newer submission
            // may have arrived while evaluating.
            let published = tx.send_if_modified(|slot| {
                if latest.load(Ordering::SeqCst) != generation {
                    return false;
                }
                *slot = Some(Recalculation {
                    generation,
                    input,
                    outcome,
                });
                true
            });

            if published {
                debug!(generation, "Recompute published");
            }
        }));

        generation
    }

    /// Drops any pending recompute without publishing.
    pub fn cancel(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.abort_pending();
    }

    fn abort_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Drop for Recalculator {
    fn drop(&mut self) {
        self.abort_pending();
    }
}
