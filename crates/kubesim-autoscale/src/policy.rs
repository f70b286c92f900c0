//! Scaling policies — the strategy half of the bounded scaler.
//!
//! A policy is pure: it owns the tuning constants for one demo and maps
//! an `Observation` to a `Decision`. It never touches scaler state.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use kubesim_core::{Bounds, ScalerKind, ScalerProfile};

/// Direction of a single-replica step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
}

/// What a deferred transition does when its delay elapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeferredEffect {
    /// Move to an absolute count, re-clamped to the bounds at fire time.
    ScaleTo(u32),
    /// Move one replica in the given direction, clamped.
    Step(Direction),
}

/// Outcome of evaluating a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Nothing to do. Any pending transition is cancelled.
    Hold,
    /// Apply this count synchronously, cancelling any pending transition.
    Apply(u32),
    /// Replace any pending transition with this one.
    Defer {
        effect: DeferredEffect,
        delay: Duration,
    },
}

/// State change that may prompt a re-evaluation while auto-mode is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    LoadChanged,
    BoundsChanged,
    TargetChanged,
    AutoEnabled,
    StepApplied,
}

/// Inputs a policy decides from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    pub metric: u32,
    pub current: u32,
    pub bounds: Bounds,
    pub target_utilization: Option<u32>,
}

/// Capacity formula, threshold policy and response timing for one scaler.
pub trait ScalingPolicy: Send + 'static {
    fn kind(&self) -> ScalerKind;

    /// Defaults the scaler starts from and returns to on reset.
    fn profile(&self) -> &ScalerProfile;

    /// Metric after one load increase.
    fn raise_metric(&self, metric: u32) -> u32;

    /// Metric after one load decrease under the given bounds.
    fn lower_metric(&self, metric: u32, bounds: Bounds) -> u32;

    /// Utilization percentage for display. Not clamped at 100.
    fn utilization_percent(&self, metric: u32, current: u32) -> u32;

    /// Whether `trigger` causes an evaluation while auto-mode is on.
    fn reacts_to(&self, trigger: Trigger) -> bool;

    fn evaluate(&self, obs: &Observation) -> Decision;
}

// ── Cluster ─────────────────────────────────────────────────────

/// Nominal capacity of one node, in resource-request units.
pub const NODE_CAPACITY_UNITS: u32 = 100;

/// Share of nominal capacity a node is assumed to deliver.
pub const NODE_EFFICIENCY: f64 = 0.8;

/// Node count tracking aggregate pod resource requests.
///
/// Scale-up (or holding steady) applies at once. Scale-down waits for the
/// profile's cooldown.
#[derive(Debug, Clone)]
pub struct ClusterDemandPolicy {
    profile: ScalerProfile,
}

impl ClusterDemandPolicy {
    pub fn from_profile(profile: ScalerProfile) -> Self {
        Self { profile }
    }

    fn effective_capacity(&self) -> f64 {
        NODE_CAPACITY_UNITS as f64 * NODE_EFFICIENCY
    }

    /// Nodes needed to serve `requests`, before clamping.
    pub fn required_nodes(&self, requests: u32) -> u32 {
        (requests as f64 / self.effective_capacity()).ceil() as u32
    }
}

impl Default for ClusterDemandPolicy {
    fn default() -> Self {
        Self::from_profile(ScalerProfile::cluster())
    }
}

impl ScalingPolicy for ClusterDemandPolicy {
    fn kind(&self) -> ScalerKind {
        ScalerKind::Cluster
    }

    fn profile(&self) -> &ScalerProfile {
        &self.profile
    }

    fn raise_metric(&self, metric: u32) -> u32 {
        metric
            .saturating_add(self.profile.load_step)
            .min(self.profile.metric_cap)
    }

    /// Requests never fall below one load step per minimum node.
    fn lower_metric(&self, metric: u32, bounds: Bounds) -> u32 {
        let floor = bounds.min().saturating_mul(self.profile.load_step);
        metric.saturating_sub(self.profile.load_step).max(floor)
    }

    fn utilization_percent(&self, metric: u32, current: u32) -> u32 {
        let capacity = current.max(1) as f64 * self.effective_capacity();
        (metric as f64 / capacity * 100.0).round() as u32
    }

    fn reacts_to(&self, trigger: Trigger) -> bool {
        matches!(trigger, Trigger::LoadChanged)
    }

    fn evaluate(&self, obs: &Observation) -> Decision {
        let required = obs.bounds.clamp(self.required_nodes(obs.metric));
        if required >= obs.current {
            Decision::Apply(required)
        } else {
            Decision::Defer {
                effect: DeferredEffect::ScaleTo(required),
                delay: self.profile.scale_down_delay(),
            }
        }
    }
}

// ── Horizontal pod ──────────────────────────────────────────────

/// Fraction of the target below which pods are removed.
pub const SCALE_DOWN_RATIO: f64 = 0.5;

/// Pod count tracking CPU utilization against a target.
///
/// Re-evaluates on every input change, including its own steps, so a
/// sustained breach walks the count one replica per delay until a bound
/// or the dead band is reached.
#[derive(Debug, Clone)]
pub struct CpuTargetPolicy {
    profile: ScalerProfile,
}

impl CpuTargetPolicy {
    pub fn from_profile(profile: ScalerProfile) -> Self {
        Self { profile }
    }
}

impl Default for CpuTargetPolicy {
    fn default() -> Self {
        Self::from_profile(ScalerProfile::pod())
    }
}

impl ScalingPolicy for CpuTargetPolicy {
    fn kind(&self) -> ScalerKind {
        ScalerKind::Pod
    }

    fn profile(&self) -> &ScalerProfile {
        &self.profile
    }

    fn raise_metric(&self, metric: u32) -> u32 {
        metric
            .saturating_add(self.profile.load_step)
            .min(self.profile.metric_cap)
    }

    fn lower_metric(&self, metric: u32, _bounds: Bounds) -> u32 {
        metric.saturating_sub(self.profile.load_step)
    }

    fn utilization_percent(&self, metric: u32, _current: u32) -> u32 {
        metric
    }

    fn reacts_to(&self, _trigger: Trigger) -> bool {
        true
    }

    fn evaluate(&self, obs: &Observation) -> Decision {
        let Some(target) = obs.target_utilization else {
            return Decision::Hold;
        };
        let usage = obs.metric as f64;

        if usage > target as f64 && obs.current < obs.bounds.max() {
            Decision::Defer {
                effect: DeferredEffect::Step(Direction::Up),
                delay: self.profile.scale_up_delay(),
            }
        } else if usage < target as f64 * SCALE_DOWN_RATIO && obs.current > obs.bounds.min() {
            Decision::Defer {
                effect: DeferredEffect::Step(Direction::Down),
                delay: self.profile.scale_down_delay(),
            }
        } else {
            Decision::Hold
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(metric: u32, current: u32, min: u32, max: u32, target: Option<u32>) -> Observation {
        Observation {
            metric,
            current,
            bounds: Bounds::new(min, max),
            target_utilization: target,
        }
    }

    #[test]
    fn required_nodes_uses_effective_capacity() {
        let p = ClusterDemandPolicy::default();
        assert_eq!(p.required_nodes(0), 0);
        assert_eq!(p.required_nodes(70), 1);
        assert_eq!(p.required_nodes(80), 1);
        assert_eq!(p.required_nodes(81), 2);
        assert_eq!(p.required_nodes(1000), 13);
    }

    #[test]
    fn cluster_applies_when_demand_grows() {
        let p = ClusterDemandPolicy::default();
        // 400 units → 5 nodes.
        assert_eq!(p.evaluate(&obs(400, 3, 2, 10, None)), Decision::Apply(5));
    }

    #[test]
    fn cluster_apply_respects_max() {
        let p = ClusterDemandPolicy::default();
        assert_eq!(p.evaluate(&obs(1000, 3, 2, 10, None)), Decision::Apply(10));
    }

    #[test]
    fn cluster_defers_scale_down() {
        let p = ClusterDemandPolicy::default();
        let decision = p.evaluate(&obs(70, 3, 2, 10, None));
        assert_eq!(
            decision,
            Decision::Defer {
                effect: DeferredEffect::ScaleTo(2),
                delay: Duration::from_millis(1500),
            }
        );
    }

    #[test]
    fn cluster_holding_steady_counts_as_apply() {
        let p = ClusterDemandPolicy::default();
        // 200 units → 3 nodes, same as current.
        assert_eq!(p.evaluate(&obs(200, 3, 2, 10, None)), Decision::Apply(3));
    }

    #[test]
    fn cluster_metric_step_cap_and_floor() {
        let p = ClusterDemandPolicy::default();
        assert_eq!(p.raise_metric(40), 70);
        assert_eq!(p.raise_metric(990), 1000);
        assert_eq!(p.lower_metric(100, Bounds::new(2, 10)), 70);
        assert_eq!(p.lower_metric(70, Bounds::new(2, 10)), 60);
        assert_eq!(p.lower_metric(40, Bounds::new(1, 10)), 30);
    }

    #[test]
    fn cluster_floor_saturates_with_huge_step() {
        let profile = ScalerProfile {
            load_step: 300_000_000,
            metric_cap: u32::MAX,
            ..ScalerProfile::cluster()
        };
        let p = ClusterDemandPolicy::from_profile(profile);
        assert_eq!(p.lower_metric(40, Bounds::new(20, 20)), u32::MAX);
        assert_eq!(p.lower_metric(40, Bounds::new(1, 20)), 300_000_000);
    }

    #[test]
    fn cluster_utilization_can_exceed_full() {
        let p = ClusterDemandPolicy::default();
        assert_eq!(p.utilization_percent(40, 3), 17);
        assert_eq!(p.utilization_percent(400, 2), 250);
    }

    #[test]
    fn cluster_only_reacts_to_load() {
        let p = ClusterDemandPolicy::default();
        assert!(p.reacts_to(Trigger::LoadChanged));
        assert!(!p.reacts_to(Trigger::BoundsChanged));
        assert!(!p.reacts_to(Trigger::AutoEnabled));
        assert!(!p.reacts_to(Trigger::StepApplied));
    }

    #[test]
    fn pod_steps_up_above_target() {
        let p = CpuTargetPolicy::default();
        assert_eq!(
            p.evaluate(&obs(80, 3, 1, 10, Some(70))),
            Decision::Defer {
                effect: DeferredEffect::Step(Direction::Up),
                delay: Duration::from_millis(1000),
            }
        );
    }

    #[test]
    fn pod_steps_down_below_half_target() {
        let p = CpuTargetPolicy::default();
        assert_eq!(
            p.evaluate(&obs(30, 3, 1, 10, Some(70))),
            Decision::Defer {
                effect: DeferredEffect::Step(Direction::Down),
                delay: Duration::from_millis(2500),
            }
        );
    }

    #[test]
    fn pod_dead_band_holds() {
        let p = CpuTargetPolicy::default();
        assert_eq!(p.evaluate(&obs(35, 3, 1, 10, Some(70))), Decision::Hold);
        assert_eq!(p.evaluate(&obs(50, 3, 1, 10, Some(70))), Decision::Hold);
        assert_eq!(p.evaluate(&obs(70, 3, 1, 10, Some(70))), Decision::Hold);
    }

    #[test]
    fn pod_holds_at_bounds() {
        let p = CpuTargetPolicy::default();
        assert_eq!(p.evaluate(&obs(100, 10, 1, 10, Some(70))), Decision::Hold);
        assert_eq!(p.evaluate(&obs(0, 1, 1, 10, Some(70))), Decision::Hold);
    }

    #[test]
    fn pod_without_target_holds() {
        let p = CpuTargetPolicy::default();
        assert_eq!(p.evaluate(&obs(100, 3, 1, 10, None)), Decision::Hold);
    }

    #[test]
    fn pod_usage_range() {
        let p = CpuTargetPolicy::default();
        assert_eq!(p.raise_metric(95), 100);
        assert_eq!(p.lower_metric(5, Bounds::new(1, 10)), 0);
        assert_eq!(p.utilization_percent(64, 7), 64);
    }
}
