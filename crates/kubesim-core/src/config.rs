//! kubesim.toml simulation defaults.
//!
//! Both demos start from compiled-in profiles. A config file may override
//! any field of either profile; omitted fields keep the compiled value.
//!
//! ```toml
//! [cluster]
//! min_replicas = 3
//! scale_down_delay_ms = 3000
//!
//! [pod]
//! target_utilization = 60
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::input::TARGET_UTILIZATION_RANGE;
use crate::types::{Bounds, MAX_REPLICA_LIMIT, MIN_REPLICA_FLOOR};

/// Starting point and tuning for one simulated scaler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerProfile {
    pub min_replicas: u32,
    pub max_replicas: u32,
    pub initial_replicas: u32,
    pub initial_metric: u32,
    /// Only meaningful for the CPU-driven pod scaler.
    pub target_utilization: Option<u32>,
    /// Amount one load click adds or removes.
    pub load_step: u32,
    /// Ceiling for the synthetic metric.
    pub metric_cap: u32,
    pub scale_up_delay_ms: u64,
    pub scale_down_delay_ms: u64,
}

impl ScalerProfile {
    /// Node-count scaler driven by pod resource requests.
    pub fn cluster() -> Self {
        Self {
            min_replicas: 2,
            max_replicas: 10,
            initial_replicas: 3,
            initial_metric: 40,
            target_utilization: None,
            load_step: 30,
            metric_cap: 1000,
            scale_up_delay_ms: 0,
            scale_down_delay_ms: 1500,
        }
    }

    /// Pod-count scaler driven by CPU utilization.
    pub fn pod() -> Self {
        Self {
            min_replicas: 1,
            max_replicas: 10,
            initial_replicas: 3,
            initial_metric: 50,
            target_utilization: Some(70),
            load_step: 10,
            metric_cap: 100,
            scale_up_delay_ms: 1000,
            scale_down_delay_ms: 2500,
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.min_replicas, self.max_replicas)
    }

    pub fn scale_up_delay(&self) -> Duration {
        Duration::from_millis(self.scale_up_delay_ms)
    }

    pub fn scale_down_delay(&self) -> Duration {
        Duration::from_millis(self.scale_down_delay_ms)
    }

    fn apply(&mut self, o: ProfileOverrides) {
        if let Some(v) = o.min_replicas {
            self.min_replicas = v;
        }
        if let Some(v) = o.max_replicas {
            self.max_replicas = v;
        }
        if let Some(v) = o.initial_replicas {
            self.initial_replicas = v;
        }
        if let Some(v) = o.initial_metric {
            self.initial_metric = v;
        }
        if o.target_utilization.is_some() {
            self.target_utilization = o.target_utilization;
        }
        if let Some(v) = o.load_step {
            self.load_step = v;
        }
        if let Some(v) = o.metric_cap {
            self.metric_cap = v;
        }
        if let Some(v) = o.scale_up_delay_ms {
            self.scale_up_delay_ms = v;
        }
        if let Some(v) = o.scale_down_delay_ms {
            self.scale_down_delay_ms = v;
        }
    }

    /// Reject profiles that could start a scaler outside its own bounds.
    pub fn validate(&self, section: &'static str) -> ConfigResult<()> {
        let invalid = |reason: String| ConfigError::Invalid { section, reason };

        if self.min_replicas < MIN_REPLICA_FLOOR {
            return Err(invalid(format!(
                "min_replicas must be at least {MIN_REPLICA_FLOOR}"
            )));
        }
        if self.max_replicas > MAX_REPLICA_LIMIT {
            return Err(invalid(format!(
                "max_replicas must be at most {MAX_REPLICA_LIMIT}"
            )));
        }
        if self.min_replicas > self.max_replicas {
            return Err(invalid(format!(
                "min_replicas ({}) exceeds max_replicas ({})",
                self.min_replicas, self.max_replicas
            )));
        }
        if !self.bounds().contains(self.initial_replicas) {
            return Err(invalid(format!(
                "initial_replicas ({}) outside [{}, {}]",
                self.initial_replicas, self.min_replicas, self.max_replicas
            )));
        }
        if self.load_step == 0 {
            return Err(invalid("load_step must be positive".to_string()));
        }
        if self.initial_metric > self.metric_cap {
            return Err(invalid(format!(
                "initial_metric ({}) exceeds metric_cap ({})",
                self.initial_metric, self.metric_cap
            )));
        }
        if let Some(target) = self.target_utilization {
            let (lo, hi) = TARGET_UTILIZATION_RANGE;
            if !(lo..=hi).contains(&target) {
                return Err(invalid(format!(
                    "target_utilization ({target}) outside [{lo}, {hi}]"
                )));
            }
        }
        Ok(())
    }
}

/// Partial profile as written in a config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileOverrides {
    pub min_replicas: Option<u32>,
    pub max_replicas: Option<u32>,
    pub initial_replicas: Option<u32>,
    pub initial_metric: Option<u32>,
    pub target_utilization: Option<u32>,
    pub load_step: Option<u32>,
    pub metric_cap: Option<u32>,
    pub scale_up_delay_ms: Option<u64>,
    pub scale_down_delay_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SimConfigFile {
    cluster: Option<ProfileOverrides>,
    pod: Option<ProfileOverrides>,
}

/// Resolved defaults for both demos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    pub cluster: ScalerProfile,
    pub pod: ScalerProfile,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            cluster: ScalerProfile::cluster(),
            pod: ScalerProfile::pod(),
        }
    }
}

impl SimConfig {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Layer the overrides in `content` over the compiled-in profiles.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let file: SimConfigFile = toml::from_str(content)?;
        let mut config = SimConfig::default();
        if let Some(o) = file.cluster {
            config.cluster.apply(o);
        }
        if let Some(o) = file.pod {
            config.pod.apply(o);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.cluster.validate("cluster")?;
        validate_cluster_only(&self.cluster)?;
        self.pod.validate("pod")
    }

    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Constraints specific to the demand-driven node scaler.
///
/// Scale-ups apply at once and nothing reads a CPU target, so those fields
/// must stay at their compiled values. The request floor (`min × load_step`)
/// must fit under the cap for every reachable minimum.
fn validate_cluster_only(profile: &ScalerProfile) -> ConfigResult<()> {
    let invalid = |reason: String| ConfigError::Invalid {
        section: "cluster",
        reason,
    };

    if profile.target_utilization.is_some() {
        return Err(invalid(
            "target_utilization is not used by the cluster scaler".to_string(),
        ));
    }
    if profile.scale_up_delay_ms != 0 {
        return Err(invalid(
            "scale_up_delay_ms must be 0; cluster scale-ups apply immediately".to_string(),
        ));
    }
    match profile.load_step.checked_mul(MAX_REPLICA_LIMIT) {
        Some(floor) if floor <= profile.metric_cap => Ok(()),
        _ => Err(invalid(format!(
            "load_step ({}) times {MAX_REPLICA_LIMIT} exceeds metric_cap ({})",
            profile.load_step, profile.metric_cap
        ))),
    }
}
