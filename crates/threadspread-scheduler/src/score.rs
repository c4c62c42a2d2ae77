use crate::types::{CandidatePod, ClusterSnapshot, NodeScore};
use tracing::debug;

/// Score every node in the snapshot for one candidate pod.
///
/// Admission is gated on CPU *requests* against node capacity — requests are
/// what the cluster actually reserves. The spread score divides the projected
/// namespace CPU *limit* footprint by capacity, so nodes of differing size
/// fill proportionally rather than by raw pod count. Lower ratio is better.
pub fn score_nodes(candidate: &CandidatePod, snapshot: &ClusterSnapshot) -> Vec<NodeScore> {
    let mut scores = Vec::with_capacity(snapshot.nodes.len());

    for capacity in &snapshot.nodes {
        let aggregate = snapshot.aggregate(&capacity.node_name);

        let projected_request_milli =
            aggregate.namespace_request_milli + candidate.cpu_request_milli;
        let admissible = capacity.cpu_capacity_milli > 0
            && projected_request_milli <= capacity.cpu_capacity_milli;

        // Zero-capacity nodes never reach the division.
        let limit_ratio = if admissible {
            let projected_limit_milli =
                aggregate.namespace_limit_milli + candidate.cpu_limit_milli;
            projected_limit_milli as f64 / capacity.cpu_capacity_milli as f64
        } else {
            f64::INFINITY
        };

        debug!(
            "Node {}: admissible={}, limit_ratio={:.3}, pod_count={}",
            capacity.node_name, admissible, limit_ratio, aggregate.namespace_pod_count
        );

        scores.push(NodeScore {
            node_name: capacity.node_name.clone(),
            admissible,
            limit_ratio,
            // Not projected: the candidate itself is not counted.
            pod_count: aggregate.namespace_pod_count,
        });
    }

    scores
}
