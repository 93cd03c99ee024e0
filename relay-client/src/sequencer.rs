//! Rate-limited, capped sequence of control values.
//!
//! State machine: `Idle -> Dispatching(i) -> Waiting(i) -> Dispatching(i+1)
//! -> ... -> Done`. No wait follows the last dispatch. Cancellation is
//! checked before each dispatch and raced against each wait.

use relay_core::{DispatchRecord, SequenceReport};
use tokio_util::sync::CancellationToken;

use crate::config::SequencerConfig;
use crate::dispatcher::Dispatcher;

/// Drives a bounded list of values through a [`Dispatcher`] with a fixed
/// pause between commands.
///
/// A failed dispatch is logged and the sequence moves on; the run never
/// aborts early except on cancellation.
///
/// # Cancel Safety
/// Cancel safe. Dropping the future between dispatches leaves nothing
/// half-sent; the in-flight dispatch, if any, is bounded by the client
/// timeout.
pub struct CommandSequencer<D: Dispatcher> {
    dispatcher: D,
    config: SequencerConfig,
    cancel: CancellationToken,
}

impl<D: Dispatcher> CommandSequencer<D> {
    /// Create a sequencer that can only be stopped through
    /// [`CommandSequencer::cancellation_token`].
    #[must_use]
    pub fn new(dispatcher: D, config: SequencerConfig) -> Self {
        Self::with_cancellation(dispatcher, config, CancellationToken::new())
    }

    /// Create a sequencer that stops when `cancel` fires.
    #[must_use]
    pub fn with_cancellation(dispatcher: D, config: SequencerConfig, cancel: CancellationToken) -> Self {
        Self { dispatcher, config, cancel }
    }

    /// A handle that stops the current and any later run.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// The cap and delay in effect.
    #[must_use]
    pub fn config(&self) -> SequencerConfig {
        self.config
    }

    /// Dispatch at most `cap` leading `values` for `entity_id`, in order.
    ///
    /// The returned report's [`completed`](SequenceReport::completed) is
    /// `true` whenever the run was not cancelled, regardless of how many
    /// values the hub accepted.
    pub async fn run(
        &self,
        url: &str,
        entity_id: &str,
        token: Option<&str>,
        values: &[f64],
    ) -> SequenceReport {
        let selected = &values[..values.len().min(self.config.cap)];
        if selected.len() < values.len() {
            tracing::debug!(
                %entity_id,
                given = values.len(),
                cap = self.config.cap,
                "control sequence truncated to cap"
            );
        }

        let mut report = SequenceReport::start(entity_id);

        for (index, &value) in selected.iter().enumerate() {
            if self.cancel.is_cancelled() {
                tracing::info!(%entity_id, index, "control sequence cancelled");
                return report.finish(true);
            }

            tracing::info!(%entity_id, value, index, "setting entity value");
            let outcome = self.dispatcher.dispatch(url, entity_id, token, value).await;
            if outcome.is_accepted() {
                tracing::info!(%entity_id, value, "control value dispatched");
            } else {
                tracing::warn!(%entity_id, value, %outcome, "control value failed; continuing");
            }
            report.records.push(DispatchRecord::new(value, outcome));

            if index + 1 < selected.len() {
                tracing::debug!(delay = ?self.config.delay, "waiting before next control value");
                tokio::select! {
                    () = self.cancel.cancelled() => {
                        tracing::info!(%entity_id, index, "control sequence cancelled");
                        return report.finish(true);
                    }
                    () = tokio::time::sleep(self.config.delay) => {}
                }
            }
        }

        report.finish(false)
    }
}
