//! Bounded reactive scaler — replica count as a clamped function of a
//! synthetic metric.
//!
//! Every operation is a synchronous state transition that may return a
//! newly scheduled action. The caller runs the clock: when an action's
//! delay elapses it passes the id back to `complete`, which ignores ids
//! that were cancelled or replaced in the meantime.

use tracing::{debug, info};

use kubesim_core::{Bounds, ScalerSnapshot, UtilizationBand};

use crate::deferred::{ActionId, DeferredSlot, ScheduledAction};
use crate::policy::{
    ClusterDemandPolicy, CpuTargetPolicy, Decision, DeferredEffect, Direction, Observation,
    ScalingPolicy, Trigger,
};

/// Scaler for the cluster-autoscaler demo.
pub type ClusterScaler = BoundedScaler<ClusterDemandPolicy>;

/// Scaler for the horizontal-pod-autoscaler demo.
pub type PodScaler = BoundedScaler<CpuTargetPolicy>;

/// One simulated autoscaler instance.
///
/// `current_replicas` and `desired_replicas` are always inside `bounds`.
#[derive(Debug)]
pub struct BoundedScaler<P: ScalingPolicy> {
    policy: P,
    bounds: Bounds,
    target_utilization: Option<u32>,
    current_replicas: u32,
    desired_replicas: u32,
    metric: u32,
    auto_mode: bool,
    slot: DeferredSlot,
}

impl<P: ScalingPolicy + Default> Default for BoundedScaler<P> {
    fn default() -> Self {
        Self::new(P::default())
    }
}

impl<P: ScalingPolicy> BoundedScaler<P> {
    /// Create a scaler in the policy's default state, auto-mode off.
    pub fn new(policy: P) -> Self {
        let profile = policy.profile();
        let bounds = profile.bounds();
        let initial = bounds.clamp(profile.initial_replicas);
        let (target_utilization, metric) = (profile.target_utilization, profile.initial_metric);
        Self {
            bounds,
            target_utilization,
            current_replicas: initial,
            desired_replicas: initial,
            metric,
            auto_mode: false,
            slot: DeferredSlot::new(),
            policy,
        }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn current_replicas(&self) -> u32 {
        self.current_replicas
    }

    pub fn desired_replicas(&self) -> u32 {
        self.desired_replicas
    }

    pub fn metric_value(&self) -> u32 {
        self.metric
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn target_utilization(&self) -> Option<u32> {
        self.target_utilization
    }

    pub fn is_auto(&self) -> bool {
        self.auto_mode
    }

    /// The deferred transition waiting on its delay, if any.
    pub fn pending(&self) -> Option<&ScheduledAction> {
        self.slot.pending()
    }

    pub fn utilization_percent(&self) -> u32 {
        self.policy
            .utilization_percent(self.metric, self.current_replicas)
    }

    pub fn snapshot(&self) -> ScalerSnapshot {
        let utilization = self.utilization_percent();
        ScalerSnapshot {
            kind: self.policy.kind(),
            current_replicas: self.current_replicas,
            desired_replicas: self.desired_replicas,
            metric_value: self.metric,
            utilization_percent: utilization,
            band: UtilizationBand::from_percent(utilization),
            auto_mode: self.auto_mode,
            bounds: self.bounds,
            target_utilization: self.target_utilization,
            scale_pending: self.slot.pending().is_some(),
        }
    }

    // ── Load generator ──────────────────────────────────────────

    pub fn increase_load(&mut self) -> Option<ScheduledAction> {
        self.metric = self.policy.raise_metric(self.metric);
        self.react(Trigger::LoadChanged)
    }

    pub fn decrease_load(&mut self) -> Option<ScheduledAction> {
        self.metric = self.policy.lower_metric(self.metric, self.bounds);
        self.react(Trigger::LoadChanged)
    }

    // ── Mode and manual control ─────────────────────────────────

    /// Flip auto-mode. Leaving auto-mode cancels any pending transition
    /// and keeps the current count.
    pub fn toggle_auto_mode(&mut self) -> Option<ScheduledAction> {
        self.auto_mode = !self.auto_mode;
        info!(
            scaler = %self.policy.kind(),
            enabled = self.auto_mode,
            "auto-mode toggled"
        );

        if self.auto_mode {
            self.react(Trigger::AutoEnabled)
        } else {
            if self.slot.cancel() {
                debug!(scaler = %self.policy.kind(), "pending transition cancelled");
            }
            None
        }
    }

    /// Manual override. Ignored while auto-mode is on.
    pub fn set_desired_replicas(&mut self, n: u32) {
        if self.auto_mode {
            debug!(
                scaler = %self.policy.kind(),
                requested = n,
                "manual desired count ignored in auto-mode"
            );
            return;
        }
        let n = self.bounds.clamp(n);
        self.desired_replicas = n;
        self.current_replicas = n;
    }

    pub fn set_min_replicas(&mut self, min: u32) -> Option<ScheduledAction> {
        self.replace_bounds(self.bounds.with_min(min))
    }

    pub fn set_max_replicas(&mut self, max: u32) -> Option<ScheduledAction> {
        self.replace_bounds(self.bounds.with_max(max))
    }

    /// Replace both bounds. `min` lands in `[1, 20]`, then `max` in
    /// `[min, 20]`.
    pub fn set_bounds(&mut self, min: u32, max: u32) -> Option<ScheduledAction> {
        self.replace_bounds(Bounds::new(min, max))
    }

    /// Set the CPU target. Only scalers that have a target accept one.
    pub fn set_target_utilization(&mut self, percent: u32) -> Option<ScheduledAction> {
        if self.target_utilization.is_none() {
            debug!(
                scaler = %self.policy.kind(),
                percent,
                "target utilization not used by this scaler"
            );
            return None;
        }
        let (lo, hi) = kubesim_core::input::TARGET_UTILIZATION_RANGE;
        self.target_utilization = Some(percent.clamp(lo, hi));
        self.react(Trigger::TargetChanged)
    }

    /// Restore the policy's defaults and cancel any pending transition.
    pub fn reset(&mut self) {
        self.slot.cancel();
        let profile = self.policy.profile();
        self.bounds = profile.bounds();
        self.target_utilization = profile.target_utilization;
        self.current_replicas = self.bounds.clamp(profile.initial_replicas);
        self.desired_replicas = self.current_replicas;
        self.metric = profile.initial_metric;
        self.auto_mode = false;
        info!(scaler = %self.policy.kind(), "scaler reset");
    }

    // ── Deferred transitions ────────────────────────────────────

    /// Apply the action with `id` if it is still the armed one.
    ///
    /// Returns the follow-up action the policy schedules in response, if
    /// any. Stale ids are a no-op.
    pub fn complete(&mut self, id: ActionId) -> Option<ScheduledAction> {
        let Some(effect) = self.slot.take_if_current(id) else {
            debug!(
                scaler = %self.policy.kind(),
                action = id.get(),
                "stale transition discarded"
            );
            return None;
        };

        let from = self.current_replicas;
        let to = match effect {
            DeferredEffect::ScaleTo(n) => self.bounds.clamp(n),
            DeferredEffect::Step(Direction::Up) => self.bounds.clamp(from.saturating_add(1)),
            DeferredEffect::Step(Direction::Down) => self.bounds.clamp(from.saturating_sub(1)),
        };
        self.current_replicas = to;
        self.desired_replicas = to;
        debug!(
            scaler = %self.policy.kind(),
            from,
            to,
            metric = self.metric,
            "deferred transition applied"
        );

        self.react(Trigger::StepApplied)
    }

    // ── Internals ───────────────────────────────────────────────

    fn replace_bounds(&mut self, bounds: Bounds) -> Option<ScheduledAction> {
        self.bounds = bounds;
        self.current_replicas = bounds.clamp(self.current_replicas);
        self.desired_replicas = bounds.clamp(self.desired_replicas);
        self.react(Trigger::BoundsChanged)
    }

    fn react(&mut self, trigger: Trigger) -> Option<ScheduledAction> {
        if !self.auto_mode || !self.policy.reacts_to(trigger) {
            return None;
        }

        let obs = Observation {
            metric: self.metric,
            current: self.current_replicas,
            bounds: self.bounds,
            target_utilization: self.target_utilization,
        };

        match self.policy.evaluate(&obs) {
            Decision::Hold => {
                self.slot.cancel();
                None
            }
            Decision::Apply(n) => {
                self.slot.cancel();
                let to = self.bounds.clamp(n);
                if to != self.current_replicas {
                    debug!(
                        scaler = %self.policy.kind(),
                        from = self.current_replicas,
                        to,
                        metric = self.metric,
                        "scaling immediately"
                    );
                }
                self.current_replicas = to;
                self.desired_replicas = to;
                None
            }
            Decision::Defer { effect, delay } => {
                let action = self.slot.arm(delay, effect);
                debug!(
                    scaler = %self.policy.kind(),
                    action = action.id.get(),
                    current = self.current_replicas,
                    metric = self.metric,
                    delay_ms = delay.as_millis() as u64,
                    ?effect,
                    "transition deferred"
                );
                Some(action)
            }
        }
    }
}
