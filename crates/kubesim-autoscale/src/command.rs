//! Commands a presentation layer forwards into a scaler.
//!
//! Field edits arrive as the raw text the user typed and are parsed
//! defensively here, so the view never has to validate anything.

use kubesim_core::input;

use crate::deferred::ScheduledAction;
use crate::policy::ScalingPolicy;
use crate::scaler::BoundedScaler;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalerCommand {
    IncreaseLoad,
    DecreaseLoad,
    ToggleAutoMode,
    /// Raw manual desired-count entry.
    SetDesiredReplicas(String),
    /// Raw min-bound entry.
    SetMinReplicas(String),
    /// Raw max-bound entry.
    SetMaxReplicas(String),
    /// Both bounds at once, already numeric.
    SetBounds { min: u32, max: u32 },
    /// Raw target-utilization entry.
    SetTargetUtilization(String),
    Reset,
}

impl<P: ScalingPolicy> BoundedScaler<P> {
    /// Apply one command and return any newly scheduled action.
    pub fn apply(&mut self, command: ScalerCommand) -> Option<ScheduledAction> {
        match command {
            ScalerCommand::IncreaseLoad => self.increase_load(),
            ScalerCommand::DecreaseLoad => self.decrease_load(),
            ScalerCommand::ToggleAutoMode => self.toggle_auto_mode(),
            ScalerCommand::SetDesiredReplicas(raw) => {
                self.set_desired_replicas(input::desired_replicas(&raw));
                None
            }
            ScalerCommand::SetMinReplicas(raw) => {
                self.set_min_replicas(input::min_replicas(&raw))
            }
            ScalerCommand::SetMaxReplicas(raw) => {
                self.set_max_replicas(input::max_replicas(&raw))
            }
            ScalerCommand::SetBounds { min, max } => self.set_bounds(min, max),
            ScalerCommand::SetTargetUtilization(raw) => {
                self.set_target_utilization(input::target_utilization(&raw))
            }
            ScalerCommand::Reset => {
                self.reset();
                None
            }
        }
    }
}
