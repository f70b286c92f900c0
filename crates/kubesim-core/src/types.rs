//! Shared types used across kubesim crates.

use serde::{Deserialize, Serialize};

/// Lowest value any replica bound may take.
pub const MIN_REPLICA_FLOOR: u32 = 1;

/// Highest value any replica bound may take.
pub const MAX_REPLICA_LIMIT: u32 = 20;

/// Which simulated controller a scaler models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalerKind {
    /// Node count tracking aggregate pod resource requests.
    Cluster,
    /// Pod replica count tracking CPU utilization.
    Pod,
}

impl ScalerKind {
    pub fn label(&self) -> &'static str {
        match self {
            ScalerKind::Cluster => "cluster",
            ScalerKind::Pod => "pod",
        }
    }

    /// Name of the controlled unit, for display.
    pub fn unit(&self) -> &'static str {
        match self {
            ScalerKind::Cluster => "nodes",
            ScalerKind::Pod => "pods",
        }
    }
}

impl std::fmt::Display for ScalerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Inclusive `[min, max]` range for a replica count.
///
/// Every constructor and mutator keeps `1 <= min <= max <= 20`, so a
/// `Bounds` value can never describe an empty range. Deserialization goes
/// through [`Bounds::new`] as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawBounds")]
pub struct Bounds {
    min: u32,
    max: u32,
}

#[derive(Deserialize)]
struct RawBounds {
    min: u32,
    max: u32,
}

impl From<RawBounds> for Bounds {
    fn from(raw: RawBounds) -> Self {
        Bounds::new(raw.min, raw.max)
    }
}

impl Bounds {
    /// Build bounds from both ends at once. `min` is clamped into
    /// `[1, 20]` first, then `max` into `[min, 20]`.
    pub fn new(min: u32, max: u32) -> Self {
        let min = min.clamp(MIN_REPLICA_FLOOR, MAX_REPLICA_LIMIT);
        let max = max.clamp(min, MAX_REPLICA_LIMIT);
        Self { min, max }
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    /// Replace the lower bound, clamped against the current upper bound.
    pub fn with_min(self, min: u32) -> Self {
        Self {
            min: min.clamp(MIN_REPLICA_FLOOR, self.max),
            max: self.max,
        }
    }

    /// Replace the upper bound, clamped against the current lower bound.
    pub fn with_max(self, max: u32) -> Self {
        Self {
            min: self.min,
            max: max.clamp(self.min, MAX_REPLICA_LIMIT),
        }
    }

    pub fn clamp(&self, n: u32) -> u32 {
        n.clamp(self.min, self.max)
    }

    pub fn contains(&self, n: u32) -> bool {
        (self.min..=self.max).contains(&n)
    }
}

/// Coarse utilization bucket used to colour gauges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UtilizationBand {
    /// Below 50%.
    Low,
    /// 50% up to (not including) 80%.
    Elevated,
    /// 80% and above, including overload past 100%.
    Critical,
}

impl UtilizationBand {
    pub fn from_percent(percent: u32) -> Self {
        match percent {
            0..50 => UtilizationBand::Low,
            50..80 => UtilizationBand::Elevated,
            _ => UtilizationBand::Critical,
        }
    }
}

/// Read-only view of a scaler, handed to the presentation layer after
/// every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalerSnapshot {
    pub kind: ScalerKind,
    pub current_replicas: u32,
    pub desired_replicas: u32,
    /// Resource-request units (cluster) or CPU percent (pod).
    pub metric_value: u32,
    /// Derived utilization; may exceed 100 to signal overload.
    pub utilization_percent: u32,
    pub band: UtilizationBand,
    pub auto_mode: bool,
    pub bounds: Bounds,
    pub target_utilization: Option<u32>,
    /// Whether a deferred transition is waiting on its cooldown.
    pub scale_pending: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_new_orders_min_and_max() {
        let b = Bounds::new(12, 4);
        assert_eq!((b.min(), b.max()), (12, 12));

        let b = Bounds::new(0, 50);
        assert_eq!((b.min(), b.max()), (1, 20));
    }

    #[test]
    fn with_min_is_capped_by_current_max() {
        let b = Bounds::new(2, 10).with_min(15);
        assert_eq!((b.min(), b.max()), (10, 10));

        let b = Bounds::new(2, 10).with_min(0);
        assert_eq!(b.min(), 1);
    }

    #[test]
    fn with_max_is_raised_to_current_min() {
        let b = Bounds::new(4, 10).with_max(2);
        assert_eq!((b.min(), b.max()), (4, 4));

        let b = Bounds::new(4, 10).with_max(99);
        assert_eq!(b.max(), 20);
    }

    #[test]
    fn clamp_and_contains() {
        let b = Bounds::new(2, 10);
        assert_eq!(b.clamp(0), 2);
        assert_eq!(b.clamp(7), 7);
        assert_eq!(b.clamp(30), 10);
        assert!(b.contains(2));
        assert!(b.contains(10));
        assert!(!b.contains(11));
    }

    #[test]
    fn deserialized_bounds_are_clamped() {
        let b: Bounds = serde_json::from_str(r#"{"min":12,"max":4}"#).unwrap();
        assert_eq!((b.min(), b.max()), (12, 12));

        let b: Bounds = serde_json::from_str(r#"{"min":0,"max":50}"#).unwrap();
        assert_eq!((b.min(), b.max()), (1, 20));

        let b: Bounds = serde_json::from_str(r#"{"min":2,"max":10}"#).unwrap();
        assert_eq!(b, Bounds::new(2, 10));
    }

    #[test]
    fn utilization_bands() {
        assert_eq!(UtilizationBand::from_percent(0), UtilizationBand::Low);
        assert_eq!(UtilizationBand::from_percent(49), UtilizationBand::Low);
        assert_eq!(UtilizationBand::from_percent(50), UtilizationBand::Elevated);
        assert_eq!(UtilizationBand::from_percent(79), UtilizationBand::Elevated);
        assert_eq!(UtilizationBand::from_percent(80), UtilizationBand::Critical);
        assert_eq!(UtilizationBand::from_percent(250), UtilizationBand::Critical);
    }

    #[test]
    fn snapshot_serializes_snake_case_kind() {
        let snap = ScalerSnapshot {
            kind: ScalerKind::Cluster,
            current_replicas: 3,
            desired_replicas: 3,
            metric_value: 40,
            utilization_percent: 17,
            band: UtilizationBand::Low,
            auto_mode: false,
            bounds: Bounds::new(2, 10),
            target_utilization: None,
            scale_pending: false,
        };
        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.contains(r#""kind":"cluster""#));
        assert!(json.contains(r#""band":"low""#));
    }
}
