//! kubesim-autoscale — a bounded reactive scaler for demonstrations.
//!
//! One state machine, `BoundedScaler`, drives both the cluster (node
//! count) and the horizontal pod (replica count) demos. The difference
//! between them lives entirely in a `ScalingPolicy`:
//!
//! ```text
//! ClusterDemandPolicy
//!   required = ceil(requests / (100 * 0.8)), clamped to [min, max]
//!   required >= current  → apply now
//!   required <  current  → ScaleTo(required) after the scale-down cooldown
//!
//! CpuTargetPolicy
//!   usage > target        → Step(Up)   after the short delay
//!   usage < target * 0.5  → Step(Down) after the long delay
//!   otherwise             → hold
//! ```
//!
//! At most one deferred transition is outstanding per scaler. Scheduling
//! another replaces it and a replaced transition can never apply: every
//! `ScheduledAction` carries a generation id that `complete` checks.
//!
//! Nothing here sleeps. Callers own the clock and hand expired actions
//! back through `BoundedScaler::complete`.

pub mod command;
pub mod deferred;
pub mod policy;
pub mod scaler;

pub use command::ScalerCommand;
pub use deferred::{ActionId, DeferredSlot, ScheduledAction};
pub use policy::{
    ClusterDemandPolicy, CpuTargetPolicy, Decision, DeferredEffect, Direction, Observation,
    ScalingPolicy, Trigger,
};
pub use scaler::{BoundedScaler, ClusterScaler, PodScaler};
