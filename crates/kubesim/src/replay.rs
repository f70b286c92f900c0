//! Scenario replay against live scaler sessions.

use serde::Serialize;
use tracing::debug;

use kubesim_autoscale::{ClusterDemandPolicy, ClusterScaler, CpuTargetPolicy, PodScaler};
use kubesim_core::{ScalerSnapshot, SimConfig};
use kubesim_session::ScalerSession;

use crate::scenario::{StepAction, Target};

/// State observed after one step.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayFrame {
    pub step: usize,
    pub snapshot: ScalerSnapshot,
}

/// Run `actions` in order. A command step yields one frame for its
/// target; a wait yields a frame for each scaler once the wait is over.
pub async fn replay(config: &SimConfig, actions: &[StepAction]) -> anyhow::Result<Vec<ReplayFrame>> {
    let cluster = ScalerSession::spawn(ClusterScaler::new(ClusterDemandPolicy::from_profile(
        config.cluster.clone(),
    )));
    let pod = ScalerSession::spawn(PodScaler::new(CpuTargetPolicy::from_profile(
        config.pod.clone(),
    )));
    let (cluster_handle, pod_handle) = (cluster.handle(), pod.handle());

    let mut frames = Vec::with_capacity(actions.len());
    for (i, action) in actions.iter().enumerate() {
        let step = i + 1;
        match action {
            StepAction::Apply { target, command } => {
                debug!(step, ?target, ?command, "applying step");
                let handle = match target {
                    Target::Cluster => &cluster_handle,
                    Target::Pod => &pod_handle,
                };
                let snapshot = handle.send(command.clone()).await?;
                frames.push(ReplayFrame { step, snapshot });
            }
            StepAction::Wait(duration) => {
                debug!(step, wait_ms = duration.as_millis() as u64, "waiting");
                tokio::time::sleep(*duration).await;
                for handle in [&cluster_handle, &pod_handle] {
                    frames.push(ReplayFrame {
                        step,
                        snapshot: handle.poll().await?,
                    });
                }
            }
        }
    }

    cluster.shutdown().await;
    pod.shutdown().await;
    Ok(frames)
}

/// One-line human rendering of a snapshot.
pub fn render(snapshot: &ScalerSnapshot) -> String {
    let mut line = format!(
        "{:<7} {}={}/{} [{}..{}] metric={} util={}% ({:?}) auto={}",
        snapshot.kind.label(),
        snapshot.kind.unit(),
        snapshot.current_replicas,
        snapshot.desired_replicas,
        snapshot.bounds.min(),
        snapshot.bounds.max(),
        snapshot.metric_value,
        snapshot.utilization_percent,
        snapshot.band,
        if snapshot.auto_mode { "on" } else { "off" },
    );
    if let Some(target) = snapshot.target_utilization {
        line.push_str(&format!(" target={target}%"));
    }
    if snapshot.scale_pending {
        line.push_str(" cooling-down");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::Scenario;
    use kubesim_core::ScalerKind;

    #[tokio::test(start_paused = true)]
    async fn replays_cluster_cooldown() {
        let scenario = Scenario::from_toml_str(
            r#"
[[step]]
target = "cluster"
command = "toggle_auto"

[[step]]
target = "cluster"
command = "increase_load"

[[step]]
wait_ms = 1600
"#,
        )
        .unwrap();

        let frames = replay(&SimConfig::default(), &scenario.actions().unwrap())
            .await
            .unwrap();

        assert_eq!(frames.len(), 4);
        assert_eq!(frames[1].snapshot.current_replicas, 3);
        assert!(frames[1].snapshot.scale_pending);

        let after_wait = &frames[2];
        assert_eq!(after_wait.step, 3);
        assert_eq!(after_wait.snapshot.kind, ScalerKind::Cluster);
        assert_eq!(after_wait.snapshot.current_replicas, 2);
        assert_eq!(frames[3].snapshot.kind, ScalerKind::Pod);
    }

    #[tokio::test(start_paused = true)]
    async fn replay_uses_configured_profiles() {
        let config = SimConfig::from_toml_str("[pod]\ninitial_replicas = 5\n").unwrap();
        let scenario = Scenario::from_toml_str(
            "[[step]]\ntarget = \"pod\"\nset_max = \"4\"\n",
        )
        .unwrap();

        let frames = replay(&config, &scenario.actions().unwrap()).await.unwrap();
        assert_eq!(frames[0].snapshot.current_replicas, 4);
    }

    #[test]
    fn render_includes_pending_and_target() {
        let mut pod = PodScaler::default();
        pod.toggle_auto_mode();
        for _ in 0..3 {
            pod.increase_load();
        }
        let line = render(&pod.snapshot());
        assert!(line.starts_with("pod"));
        assert!(line.contains("pods=3/3"));
        assert!(line.contains("target=70%"));
        assert!(line.contains("cooling-down"));
        assert!(line.contains("auto=on"));
    }
}
