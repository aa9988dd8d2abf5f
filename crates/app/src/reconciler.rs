//! Reconciliation engine — drives observed state toward desired state.
//!
//! One reconciler owns one device. Each pass snapshots the strip once, then
//! applies the same per-outlet decision procedure whether it was invoked as
//! a batch pass or for a single outlet — the two entry points share
//! [`Reconciler::reconcile_one`], so their decisions cannot diverge.

use std::collections::HashMap;

use serde::Serialize;

use plughub_domain::device::Device;
use plughub_domain::error::PlugHubError;
use plughub_domain::outlet::Outlet;
use plughub_domain::state::OutletState;
use plughub_domain::time::Timestamp;
use plughub_domain::tracker::AuditRecord;

use crate::evaluator::Evaluator;
use crate::ports::{AuditLog, StripClient, TrackerStore};

/// What the engine did about one outlet during a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Observed state already matched desired state; nothing issued.
    None,
    TurnedOn,
    TurnedOff,
    /// A command was needed but could not be confirmed; the next pass
    /// corrects it.
    Failed,
    /// The strip's snapshot did not include this outlet.
    Skipped,
}

/// Per-outlet outcome of a reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OutletReport {
    /// State observed before any command, absent when the strip did not
    /// report the outlet.
    pub previous_state: Option<OutletState>,
    pub desired_state: OutletState,
    pub action: Action,
}

/// Reconciles one device's outlets against their schedules.
pub struct Reconciler<S, T, A> {
    device: Device,
    strip: S,
    evaluator: Evaluator<T>,
    audit: A,
}

impl<S, T, A> Reconciler<S, T, A>
where
    S: StripClient,
    T: TrackerStore,
    A: AuditLog,
{
    /// Create a reconciler for `device` over the given ports.
    pub fn new(device: Device, strip: S, tracker: T, audit: A) -> Self {
        Self {
            device,
            strip,
            evaluator: Evaluator::new(tracker),
            audit,
        }
    }

    /// The device this reconciler owns.
    #[must_use]
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Fresh observed snapshot of every outlet the strip reports.
    ///
    /// # Errors
    ///
    /// Returns [`PlugHubError::Actuator`] when the strip cannot be read.
    pub async fn snapshot(&self) -> Result<HashMap<String, OutletState>, PlugHubError> {
        Ok(self.strip.read_states().await?)
    }

    /// Observed state of one configured outlet.
    ///
    /// # Errors
    ///
    /// Returns [`PlugHubError::UnknownOutlet`] for outlets absent from
    /// configuration, and [`PlugHubError::Actuator`] when the strip cannot
    /// be read or does not report the outlet.
    pub async fn observed_state(&self, outlet: &str) -> Result<OutletState, PlugHubError> {
        let outlet = self.device.outlet_or_err(outlet)?;
        let observed = self.strip.read_states().await?;
        observed.get(&outlet.name).copied().ok_or_else(|| {
            plughub_domain::error::ActuatorError::MissingOutlet {
                device: self.device.name.clone(),
                outlet: outlet.name.clone(),
            }
            .into()
        })
    }

    /// Manually drive one configured outlet, bypassing its schedule for
    /// this instant. The transition is audited like any other command.
    ///
    /// # Errors
    ///
    /// Returns [`PlugHubError::UnknownOutlet`] for outlets absent from
    /// configuration, and [`PlugHubError::Actuator`] when the command
    /// cannot be confirmed.
    #[tracing::instrument(skip(self), fields(device = %self.device.name))]
    pub async fn override_state(
        &self,
        outlet: &str,
        state: OutletState,
        now: Timestamp,
    ) -> Result<(), PlugHubError> {
        let outlet = self.device.outlet_or_err(outlet)?;
        self.strip.set_state(&outlet.name, state).await?;
        tracing::info!(outlet = %outlet.name, state = %state, "manual override applied");
        self.append_audit(outlet, state, now).await;
        Ok(())
    }

    /// Run a full reconciliation pass over every configured outlet.
    ///
    /// Per-outlet failures are isolated: one outlet's actuator error never
    /// blocks its siblings, and at most one corrective command is issued
    /// per outlet per pass.
    ///
    /// # Errors
    ///
    /// Returns [`PlugHubError::Actuator`] only when the initial snapshot
    /// cannot be read at all.
    #[tracing::instrument(skip(self), fields(device = %self.device.name))]
    pub async fn reconcile(
        &self,
        now: Timestamp,
    ) -> Result<HashMap<String, OutletReport>, PlugHubError> {
        let observed = self.strip.read_states().await?;
        let mut reports = HashMap::with_capacity(self.device.outlets.len());
        for outlet in &self.device.outlets {
            let report = self.reconcile_one(outlet, &observed, now).await;
            reports.insert(outlet.name.clone(), report);
        }
        Ok(reports)
    }

    /// Reconcile a single outlet, e.g. in response to an external trigger.
    ///
    /// Produces the same decision the batch pass would have produced for
    /// this outlet at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`PlugHubError::UnknownOutlet`] for outlets absent from
    /// configuration, and [`PlugHubError::Actuator`] when the snapshot
    /// cannot be read.
    #[tracing::instrument(skip(self), fields(device = %self.device.name))]
    pub async fn reconcile_outlet(
        &self,
        outlet: &str,
        now: Timestamp,
    ) -> Result<OutletReport, PlugHubError> {
        let outlet = self.device.outlet_or_err(outlet)?;
        let observed = self.strip.read_states().await?;
        Ok(self.reconcile_one(outlet, &observed, now).await)
    }

    /// The per-outlet decision procedure shared by both entry points.
    async fn reconcile_one(
        &self,
        outlet: &Outlet,
        observed: &HashMap<String, OutletState>,
        now: Timestamp,
    ) -> OutletReport {
        let desired = self.evaluator.evaluate(&self.device, outlet, now).await;
        let Some(previous) = observed.get(&outlet.name).copied() else {
            tracing::warn!(outlet = %outlet.name, "outlet not reported by strip, skipping");
            return OutletReport {
                previous_state: None,
                desired_state: desired,
                action: Action::Skipped,
            };
        };

        if previous == desired {
            tracing::debug!(outlet = %outlet.name, state = %desired, "no action needed");
            return OutletReport {
                previous_state: Some(previous),
                desired_state: desired,
                action: Action::None,
            };
        }

        let action = match self.strip.set_state(&outlet.name, desired).await {
            Ok(()) => {
                tracing::info!(
                    outlet = %outlet.name,
                    previous = %previous,
                    desired = %desired,
                    "corrected outlet state"
                );
                self.append_audit(outlet, desired, now).await;
                if desired.is_on() {
                    Action::TurnedOn
                } else {
                    Action::TurnedOff
                }
            }
            Err(err) => {
                tracing::warn!(
                    outlet = %outlet.name,
                    error = %err,
                    "command not confirmed, deferring to next pass"
                );
                Action::Failed
            }
        };

        OutletReport {
            previous_state: Some(previous),
            desired_state: desired,
            action,
        }
    }

    /// Record an issued transition. Audit failures are logged, never fatal.
    async fn append_audit(&self, outlet: &Outlet, state: OutletState, now: Timestamp) {
        let record = AuditRecord {
            outlet_key: outlet.key(&self.device.name),
            resulting_state: state,
            recorded_at: now,
        };
        if let Err(err) = self.audit.append(record).await {
            tracing::error!(
                outlet = %outlet.name,
                error = %err,
                "failed to append audit record"
            );
        }
    }
}
