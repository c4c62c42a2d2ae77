use crate::error::{Result, SchedulerError};
use crate::score::score_nodes;
use crate::select::select_node;
use crate::snapshot::build_snapshot;
use crate::types::{CandidatePod, ClusterSnapshot, NodeScore};
use k8s_openapi::api::core::v1::{Binding, Node, ObjectReference, Pod};
use kube::api::{Api, ListParams, PostParams};
use kube::Client;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Scheduler identity claimed by pods via `spec.schedulerName`, unless
/// overridden in the configuration.
pub const DEFAULT_SCHEDULER_NAME: &str = "threadspread";

/// Configuration for the scheduler
#[derive(Clone)]
pub struct SchedulerConfig {
    /// Value of `spec.schedulerName` that marks a pod as ours
    pub scheduler_name: String,
    /// Interval between scheduling cycles
    pub poll_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            scheduler_name: DEFAULT_SCHEDULER_NAME.to_string(),
            poll_interval: Duration::from_secs(5),
        }
    }
}

/// True when a pod claims this scheduler and has not been bound to a node.
pub fn is_candidate(pod: &Pod, scheduler_name: &str) -> bool {
    let spec = match &pod.spec {
        Some(spec) => spec,
        None => return false,
    };

    if spec.scheduler_name.as_deref() != Some(scheduler_name) {
        return false;
    }

    // An empty node name counts as unbound, as does a missing one.
    !matches!(spec.node_name.as_deref(), Some(name) if !name.is_empty())
}

/// The pure decision pipeline: score every node, then pick the winner.
///
/// Invoked at most once per pod per cycle. `None` is the "no eligible node"
/// outcome; the pod stays pending and is retried next cycle.
pub fn decide(candidate: &CandidatePod, snapshot: &ClusterSnapshot) -> Option<NodeScore> {
    let scores = score_nodes(candidate, snapshot);
    select_node(&scores).cloned()
}

/// Pod scheduler: polls for pending pods that claim this scheduler and binds
/// each to the node chosen by the spread-scoring decision.
pub struct Scheduler {
    client: Client,
    config: SchedulerConfig,
}

impl Scheduler {
    /// Create a new scheduler
    pub fn new(client: Client, config: SchedulerConfig) -> Self {
        Self { client, config }
    }

    /// Run the scheduler loop until the token is cancelled
    pub async fn run(&self, token: CancellationToken) -> Result<()> {
        info!("Starting scheduler '{}'", self.config.scheduler_name);

        loop {
            if let Err(e) = self.schedule_cycle().await {
                error!("Scheduling cycle failed: {}", e);
            }

            tokio::select! {
                _ = token.cancelled() => {
                    info!("Scheduler shutting down");
                    return Ok(());
                }
                _ = sleep(self.config.poll_interval) => {}
            }
        }
    }

    /// Run a single scheduling cycle
    async fn schedule_cycle(&self) -> Result<()> {
        debug!("Running scheduling cycle");

        let pods: Api<Pod> = Api::all(self.client.clone());
        let pod_list = pods.list(&ListParams::default()).await?;

        let candidates: Vec<&Pod> = pod_list
            .items
            .iter()
            .filter(|pod| is_candidate(pod, &self.config.scheduler_name))
            .collect();

        if candidates.is_empty() {
            debug!("No pending pods claim this scheduler");
            return Ok(());
        }

        info!("Found {} pending pods to schedule", candidates.len());

        // One decision per pod; a failure for one never blocks the others.
        for pod in candidates {
            let namespace = pod.metadata.namespace.as_deref().unwrap_or("unknown");
            let pod_name = pod.metadata.name.as_deref().unwrap_or("unknown");

            info!("Attempting to schedule pod {}/{}", namespace, pod_name);

            match self.schedule_pod(pod).await {
                Ok(node_name) => {
                    info!(
                        "Pod {}/{} successfully scheduled on node {}",
                        namespace, pod_name, node_name
                    );
                }
                Err(e @ SchedulerError::NoEligibleNode { .. }) => {
                    warn!("{}; pod {}/{} left pending", e, namespace, pod_name);
                }
                Err(e) => {
                    error!("Failed to schedule pod {}/{}: {}", namespace, pod_name, e);
                }
            }
        }

        Ok(())
    }

    /// Make and apply the scheduling decision for one pod
    async fn schedule_pod(&self, pod: &Pod) -> Result<String> {
        let pod_name = pod
            .metadata
            .name
            .as_deref()
            .ok_or_else(|| SchedulerError::internal("Pod has no name"))?;
        let namespace = pod
            .metadata
            .namespace
            .as_deref()
            .ok_or_else(|| SchedulerError::internal("Pod has no namespace"))?;

        let candidate = CandidatePod::from_pod(namespace, pod);

        // A listing failure degrades to an empty subset for this decision;
        // the decision is still attempted with whatever was retrieved.
        let nodes = match self.list_nodes().await {
            Ok(nodes) => nodes,
            Err(e) => {
                warn!("Failed to list nodes, continuing with none: {}", e);
                Vec::new()
            }
        };
        let namespace_pods = match self.list_namespace_pods(namespace).await {
            Ok(pods) => pods,
            Err(e) => {
                warn!(
                    "Failed to list pods in namespace {}, continuing with none: {}",
                    namespace, e
                );
                Vec::new()
            }
        };

        let snapshot = build_snapshot(namespace, &nodes, &namespace_pods);

        let winner = decide(&candidate, &snapshot).ok_or_else(|| {
            SchedulerError::no_eligible_node(
                pod_name,
                "every node is zero-capacity or over-subscribed on CPU requests",
            )
        })?;

        debug!(
            "Selected node {} for pod {}/{} (limit_ratio {:.3}, {} namespace pods)",
            winner.node_name, namespace, pod_name, winner.limit_ratio, winner.pod_count
        );

        self.bind_pod(namespace, pod_name, &winner.node_name).await?;

        Ok(winner.node_name)
    }

    async fn list_nodes(&self) -> Result<Vec<Node>> {
        let nodes: Api<Node> = Api::all(self.client.clone());
        Ok(nodes.list(&ListParams::default()).await?.items)
    }

    async fn list_namespace_pods(&self, namespace: &str) -> Result<Vec<Pod>> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        Ok(pods.list(&ListParams::default()).await?.items)
    }

    /// Bind a pod to a node via the pods/binding subresource
    async fn bind_pod(&self, namespace: &str, pod_name: &str, node_name: &str) -> Result<()> {
        info!("Binding pod {}/{} to node {}", namespace, pod_name, node_name);

        let mut binding = Binding::default();
        binding.metadata.name = Some(pod_name.to_string());
        binding.target = ObjectReference {
            kind: Some("Node".to_string()),
            name: Some(node_name.to_string()),
            ..Default::default()
        };

        let data = serde_json::to_vec(&binding)
            .map_err(|e| SchedulerError::internal(format!("Failed to serialize binding: {}", e)))?;

        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        // The subresource answers with a bare Status object, not the Binding.
        pods.create_subresource::<serde_json::Value>(
            "binding",
            pod_name,
            &PostParams::default(),
            data,
        )
        .await?;

        Ok(())
    }
}
