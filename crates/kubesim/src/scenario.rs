//! Scenario files — a scripted list of presenter actions.
//!
//! ```toml
//! [[step]]
//! target = "cluster"
//! command = "toggle_auto"
//!
//! [[step]]
//! target = "pod"
//! set_target = "60"
//!
//! [[step]]
//! wait_ms = 1600
//! ```
//!
//! Field edits (`set_*`) take the raw text a user would type, so the
//! scalers' defensive parsing is exercised exactly as in the UI.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context};
use serde::Deserialize;

use kubesim_autoscale::ScalerCommand;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    Cluster,
    Pod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepCommand {
    IncreaseLoad,
    DecreaseLoad,
    ToggleAuto,
    Reset,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Step {
    pub target: Option<Target>,
    pub command: Option<StepCommand>,
    pub set_desired: Option<String>,
    pub set_min: Option<String>,
    pub set_max: Option<String>,
    pub set_target: Option<String>,
    pub wait_ms: Option<u64>,
}

/// A validated step.
#[derive(Debug, Clone, PartialEq)]
pub enum StepAction {
    Apply {
        target: Target,
        command: ScalerCommand,
    },
    Wait(Duration),
}

impl Step {
    pub fn action(&self) -> anyhow::Result<StepAction> {
        let mut commands = Vec::new();
        if let Some(c) = self.command {
            commands.push(match c {
                StepCommand::IncreaseLoad => ScalerCommand::IncreaseLoad,
                StepCommand::DecreaseLoad => ScalerCommand::DecreaseLoad,
                StepCommand::ToggleAuto => ScalerCommand::ToggleAutoMode,
                StepCommand::Reset => ScalerCommand::Reset,
            });
        }
        if let Some(raw) = &self.set_desired {
            commands.push(ScalerCommand::SetDesiredReplicas(raw.clone()));
        }
        if let Some(raw) = &self.set_min {
            commands.push(ScalerCommand::SetMinReplicas(raw.clone()));
        }
        if let Some(raw) = &self.set_max {
            commands.push(ScalerCommand::SetMaxReplicas(raw.clone()));
        }
        if let Some(raw) = &self.set_target {
            commands.push(ScalerCommand::SetTargetUtilization(raw.clone()));
        }

        match (self.wait_ms, commands.len()) {
            (Some(ms), 0) => {
                if self.target.is_some() {
                    bail!("wait_ms does not take a target");
                }
                Ok(StepAction::Wait(Duration::from_millis(ms)))
            }
            (None, 1) => {
                let Some(target) = self.target else {
                    bail!("step needs a target (\"cluster\" or \"pod\")");
                };
                Ok(StepAction::Apply {
                    target,
                    command: commands.remove(0),
                })
            }
            (None, 0) => bail!("step has no command"),
            _ => bail!("step must contain exactly one command or wait_ms"),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Validate every step up front so a bad line fails before anything
    /// is replayed.
    pub fn actions(&self) -> anyhow::Result<Vec<StepAction>> {
        self.steps
            .iter()
            .enumerate()
            .map(|(i, step)| step.action().with_context(|| format!("step {}", i + 1)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mixed_steps() {
        let scenario = Scenario::from_toml_str(
            r#"
[[step]]
target = "cluster"
command = "toggle_auto"

[[step]]
target = "pod"
set_target = "60"

[[step]]
wait_ms = 1600
"#,
        )
        .unwrap();

        let actions = scenario.actions().unwrap();
        assert_eq!(
            actions,
            vec![
                StepAction::Apply {
                    target: Target::Cluster,
                    command: ScalerCommand::ToggleAutoMode,
                },
                StepAction::Apply {
                    target: Target::Pod,
                    command: ScalerCommand::SetTargetUtilization("60".to_string()),
                },
                StepAction::Wait(Duration::from_millis(1600)),
            ]
        );
    }

    #[test]
    fn empty_scenario_has_no_actions() {
        let scenario = Scenario::from_toml_str("").unwrap();
        assert!(scenario.actions().unwrap().is_empty());
    }

    #[test]
    fn command_without_target_rejected() {
        let scenario = Scenario::from_toml_str("[[step]]\ncommand = \"reset\"\n").unwrap();
        let err = scenario.actions().unwrap_err();
        assert!(format!("{err:#}").contains("step 1"));
        assert!(format!("{err:#}").contains("needs a target"));
    }

    #[test]
    fn two_commands_in_one_step_rejected() {
        let step = Step {
            target: Some(Target::Pod),
            command: Some(StepCommand::IncreaseLoad),
            set_max: Some("4".to_string()),
            ..Default::default()
        };
        assert!(step.action().is_err());
    }

    #[test]
    fn wait_with_target_rejected() {
        let step = Step {
            target: Some(Target::Cluster),
            wait_ms: Some(10),
            ..Default::default()
        };
        assert!(step.action().is_err());
    }

    #[test]
    fn bundled_demo_scenarios_validate() {
        for content in [
            include_str!("../../../demos/scenarios/cluster-cooldown.toml"),
            include_str!("../../../demos/scenarios/hpa-walk.toml"),
        ] {
            let scenario = Scenario::from_toml_str(content).unwrap();
            assert!(!scenario.actions().unwrap().is_empty());
        }
    }

    #[test]
    fn bundled_demo_config_validates() {
        let config =
            kubesim_core::SimConfig::from_toml_str(include_str!("../../../demos/kubesim.toml"))
                .unwrap();
        assert_eq!(config.cluster.scale_down_delay_ms, 3000);
    }

    #[test]
    fn unknown_command_is_a_parse_error() {
        assert!(Scenario::from_toml_str("[[step]]\ntarget = \"pod\"\ncommand = \"explode\"\n").is_err());
    }
}
