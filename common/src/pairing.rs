//! Topology pairing: which node pairs get tested under each connectivity
//! policy.
//!
//! Pure functions over a node slice, returning index pairs in a
//! deterministic iteration order. Managers turn indices back into nodes;
//! keeping indices here makes the counting properties easy to test.

use indexmap::IndexMap;

use crate::model::Node;

/// Groups node indices by attached switch id, in first-seen order.
///
/// Nodes with no switch all land in the single shared `None` bucket; the
/// absence of a switch is itself a valid group key, never one bucket per
/// node.
pub fn group_by_switch(nodes: &[Node]) -> IndexMap<Option<String>, Vec<usize>> {
    let mut groups: IndexMap<Option<String>, Vec<usize>> = IndexMap::new();
    for (idx, node) in nodes.iter().enumerate() {
        groups
            .entry(node.switch_id().map(str::to_owned))
            .or_default()
            .push(idx);
    }
    groups
}

/// Every ordered pair `(a, b)` with `a != b`: `n * (n - 1)` pairs. Direction
/// matters, a->b and b->a are distinct tests.
pub fn all_to_all(nodes: &[Node]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for a in 0..nodes.len() {
        for b in 0..nodes.len() {
            if a != b {
                pairs.push((a, b));
            }
        }
    }
    pairs
}

/// Ordered pairs whose endpoints sit in different switch groups, iterating
/// every ordered pair of distinct groups and then every member pair across
/// them.
pub fn inter_group(nodes: &[Node]) -> Vec<(usize, usize)> {
    let groups = group_by_switch(nodes);
    let mut pairs = Vec::new();
    for (source_key, source_members) in &groups {
        for (target_key, target_members) in &groups {
            if source_key == target_key {
                continue;
            }
            for &a in source_members {
                for &b in target_members {
                    pairs.push((a, b));
                }
            }
        }
    }
    pairs
}

/// Unordered pairs within each switch group, lower-ordered node first:
/// `C(k, 2)` pairs per group of size k. No pair is tested twice.
pub fn intra_group(nodes: &[Node]) -> Vec<(usize, usize)> {
    let groups = group_by_switch(nodes);
    let mut pairs = Vec::new();
    for members in groups.values() {
        for i in 0..members.len() {
            for j in (i + 1)..members.len() {
                pairs.push((members[i], members[j]));
            }
        }
    }
    pairs
}
