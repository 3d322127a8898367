// run.rs — Monitor: one fetch → compare → notify → persist pass.
//
// Phases of a run:
//
//   Fetching → LoadingPrevious → BaselineInit → Done
//                              ↘ Comparing → [Notifying] → Persisting → Done
//
// - Fetch failure ends the run immediately; state is neither read nor written.
// - No previous state: the current snapshot is saved as the baseline and no
//   notification is sent.
// - Compare failure counts as "no changes"; delivery failure is logged.
//   Either way the current snapshot is persisted so the next run compares
//   against it and does not re-alert.
// - A failed save is logged; the next run compares against the old state.

use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use pm_notify::{Clock, NotificationFormatter, NotificationTransport};
use pm_snapshot::{Change, ChangeDetector, DataSource, Snapshot};
use pm_state::{SaveOutcome, StateStore};

use crate::config::MonitorConfig;
use crate::error::ConfigError;

/// A phase of the run state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Fetching,
    LoadingPrevious,
    BaselineInit,
    Comparing,
    Notifying,
    Persisting,
    Done,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunPhase::Fetching => write!(f, "fetching"),
            RunPhase::LoadingPrevious => write!(f, "loading_previous"),
            RunPhase::BaselineInit => write!(f, "baseline_init"),
            RunPhase::Comparing => write!(f, "comparing"),
            RunPhase::Notifying => write!(f, "notifying"),
            RunPhase::Persisting => write!(f, "persisting"),
            RunPhase::Done => write!(f, "done"),
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    /// The data source failed; nothing else happened.
    FetchFailed { reason: String },
    /// First run: the snapshot was stored as the baseline.
    Baseline,
    /// Compared, nothing changed.
    NoChanges,
    /// Changes found and the notification was delivered.
    Notified,
    /// Changes found but delivery failed.
    DeliveryFailed { reason: String },
    /// Comparison failed; treated as no changes.
    CompareFailed { reason: String },
}

/// Summary of one pass.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    /// Phases entered, in order.
    pub phases: Vec<RunPhase>,
    pub outcome: RunOutcome,
    pub changes: Vec<Change>,
    /// True when a notification went out.
    pub delivered: bool,
    /// Whether the current snapshot was written to the state store.
    pub persisted: bool,
}

struct PhaseLog {
    phases: Vec<RunPhase>,
}

impl PhaseLog {
    fn new() -> Self {
        Self { phases: Vec::new() }
    }

    fn enter(&mut self, phase: RunPhase) {
        tracing::info!(%phase, "entering phase");
        self.phases.push(phase);
    }
}

/// Sequences one monitor pass over its collaborators.
///
/// Generic over the data source, the notification transport and the clock
/// so tests can drive it with in-memory fakes.
pub struct Monitor<D, T, C> {
    source: D,
    transport: T,
    clock: C,
    store: StateStore,
    detector: ChangeDetector,
    formatter: NotificationFormatter,
}

impl<D, T, C> Monitor<D, T, C>
where
    D: DataSource,
    T: NotificationTransport,
    C: Clock,
{
    /// Build a monitor from validated configuration.
    pub fn new(
        config: &MonitorConfig,
        source: D,
        transport: T,
        clock: C,
    ) -> Result<Self, ConfigError> {
        let formatter = NotificationFormatter::new(config.layout, config.tz()?, &config.unit);
        Ok(Self::from_parts(
            source,
            transport,
            clock,
            StateStore::new(&config.state_dir),
            ChangeDetector::new(config.layout),
            formatter,
        ))
    }

    pub fn from_parts(
        source: D,
        transport: T,
        clock: C,
        store: StateStore,
        detector: ChangeDetector,
        formatter: NotificationFormatter,
    ) -> Self {
        Self {
            source,
            transport,
            clock,
            store,
            detector,
            formatter,
        }
    }

    /// Run one pass. Never fails; see [`RunReport::outcome`].
    pub fn run_once(&self) -> RunReport {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("monitor_run", %run_id);
        let _guard = span.enter();

        let mut log = PhaseLog::new();
        let (outcome, changes, persisted) = self.run_phases(&mut log);
        log.enter(RunPhase::Done);

        tracing::info!(?outcome, changes = changes.len(), persisted, "run finished");
        RunReport {
            run_id,
            phases: log.phases,
            delivered: outcome == RunOutcome::Notified,
            outcome,
            changes,
            persisted,
        }
    }

    fn run_phases(&self, log: &mut PhaseLog) -> (RunOutcome, Vec<Change>, bool) {
        log.enter(RunPhase::Fetching);
        let current = match self.source.fetch() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::error!(
                    source = self.source.source_id(),
                    error = %e,
                    "fetch failed, leaving state untouched"
                );
                return (
                    RunOutcome::FetchFailed {
                        reason: e.to_string(),
                    },
                    Vec::new(),
                    false,
                );
            }
        };

        log.enter(RunPhase::LoadingPrevious);
        let Some(previous) = self.store.load() else {
            log.enter(RunPhase::BaselineInit);
            let persisted = self.persist(&current);
            return (RunOutcome::Baseline, Vec::new(), persisted);
        };

        log.enter(RunPhase::Comparing);
        let (changes, mut outcome) = match self.detector.detect(Some(&previous), &current) {
            Ok(changes) => (changes, RunOutcome::NoChanges),
            Err(e) => {
                tracing::warn!(error = %e, "comparison failed, treating as no changes");
                (
                    Vec::new(),
                    RunOutcome::CompareFailed {
                        reason: e.to_string(),
                    },
                )
            }
        };

        if !changes.is_empty() {
            log.enter(RunPhase::Notifying);
            outcome = self.notify(&changes, &current);
        }

        log.enter(RunPhase::Persisting);
        let persisted = self.persist(&current);
        (outcome, changes, persisted)
    }

    fn notify(&self, changes: &[Change], current: &Snapshot) -> RunOutcome {
        let message = self.formatter.render(changes, current, self.clock.now());
        match self.transport.deliver(&message) {
            Ok(()) => {
                tracing::info!(transport = self.transport.name(), "notification delivered");
                RunOutcome::Notified
            }
            Err(e) => {
                tracing::warn!(
                    transport = self.transport.name(),
                    error = %e,
                    "notification failed, state will still be saved"
                );
                RunOutcome::DeliveryFailed {
                    reason: e.to_string(),
                }
            }
        }
    }

    fn persist(&self, current: &Snapshot) -> bool {
        match self.store.save(current) {
            Ok(SaveOutcome::Saved) => true,
            Ok(SaveOutcome::Skipped { .. }) => false,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    "failed to save state, next run compares against the old state"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_names() {
        assert_eq!(RunPhase::LoadingPrevious.to_string(), "loading_previous");
        assert_eq!(RunPhase::BaselineInit.to_string(), "baseline_init");
        assert_eq!(RunPhase::Done.to_string(), "done");
    }

    #[test]
    fn outcome_serializes_with_tag() {
        let json = serde_json::to_string(&RunOutcome::DeliveryFailed {
            reason: "HTTP 500".into(),
        })
        .unwrap();
        assert_eq!(json, r#"{"outcome":"delivery_failed","reason":"HTTP 500"}"#);
    }

    #[test]
    fn report_json_carries_delivered_flag() {
        let report = RunReport {
            run_id: Uuid::nil(),
            phases: vec![RunPhase::Fetching, RunPhase::Done],
            outcome: RunOutcome::NoChanges,
            changes: Vec::new(),
            delivered: false,
            persisted: true,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["delivered"], serde_json::json!(false));
        assert_eq!(json["persisted"], serde_json::json!(true));
        assert_eq!(json["outcome"]["outcome"], "no_changes");
    }
}
