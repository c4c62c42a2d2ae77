use crate::types::{ClusterSnapshot, NodeAggregate, NodeCapacity};
use k8s_openapi::api::core::v1::{Node, Pod};
use std::collections::BTreeMap;
use threadspread_core::{parse_cpu, pod_cpu_totals};
use tracing::{debug, warn};

/// Build the per-decision cluster snapshot for one candidate namespace.
///
/// Every listed node gets exactly one capacity entry and one aggregate. A
/// node whose CPU capacity is missing or unparsable is kept with capacity 0
/// rather than omitted, so downstream logic marks it unschedulable
/// explicitly. Pods are filtered to the candidate's namespace here even when
/// the caller passes a cluster-wide list.
pub fn build_snapshot(namespace: &str, nodes: &[Node], pods: &[Pod]) -> ClusterSnapshot {
    let mut capacities = Vec::with_capacity(nodes.len());
    let mut aggregates: BTreeMap<String, NodeAggregate> = BTreeMap::new();

    for node in nodes {
        let node_name = match &node.metadata.name {
            Some(name) => name.clone(),
            None => {
                warn!("Skipping node without a name");
                continue;
            }
        };

        // One capacity entry and one aggregate per node.
        if aggregates.contains_key(&node_name) {
            continue;
        }

        let cpu_quantity = node
            .status
            .as_ref()
            .and_then(|s| s.capacity.as_ref())
            .and_then(|c| c.get("cpu"));

        let cpu_capacity_milli = match cpu_quantity {
            Some(quantity) => match parse_cpu(&quantity.0) {
                Ok(milli) => milli,
                Err(e) => {
                    warn!(
                        "Node {} reports unparsable CPU capacity, marking unschedulable: {}",
                        node_name, e
                    );
                    0
                }
            },
            None => {
                warn!(
                    "Node {} does not report CPU capacity, marking unschedulable",
                    node_name
                );
                0
            }
        };

        aggregates.insert(node_name.clone(), NodeAggregate::default());
        capacities.push(NodeCapacity {
            node_name,
            cpu_capacity_milli,
        });
    }

    for pod in pods {
        // Pods from other namespaces never contribute.
        if pod.metadata.namespace.as_deref() != Some(namespace) {
            continue;
        }

        // A pod with no bound node is still pending and contributes nothing.
        let node_name = match pod.spec.as_ref().and_then(|s| s.node_name.as_deref()) {
            Some(name) if !name.is_empty() => name,
            _ => continue,
        };

        // A pod bound to a node that vanished between lists is ignored.
        let aggregate = match aggregates.get_mut(node_name) {
            Some(aggregate) => aggregate,
            None => continue,
        };

        let totals = pod_cpu_totals(pod);
        aggregate.namespace_limit_milli += totals.limit_milli;
        aggregate.namespace_request_milli += totals.request_milli;
        aggregate.namespace_pod_count += 1;
    }

    debug!(
        "Built snapshot for namespace {}: {} nodes",
        namespace,
        capacities.len()
    );

    ClusterSnapshot {
        nodes: capacities,
        aggregates,
    }
}
