use crate::types::NodeScore;

/// Pick the winning node from a set of scores.
///
/// The tie-break order is strict and total: lowest limit ratio, then lowest
/// namespace pod count, then lexicographically smallest node name. The final
/// rule exists so repeated runs on identical input choose the same node
/// instead of depending on iteration order.
///
/// Returns `None` when no node is admissible — the "no eligible node"
/// outcome, which is expected and non-fatal.
pub fn select_node(scores: &[NodeScore]) -> Option<&NodeScore> {
    scores
        .iter()
        .filter(|score| score.admissible)
        .min_by(|a, b| {
            a.limit_ratio
                .total_cmp(&b.limit_ratio)
                .then_with(|| a.pod_count.cmp(&b.pod_count))
                .then_with(|| a.node_name.cmp(&b.node_name))
        })
}
