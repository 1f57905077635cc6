use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use crate::ir::Edge;

/// Nodes re-indexed densely in declaration order, so "earliest declared" is
/// simply the smallest index.
struct RankGraph<'a> {
    ids: Vec<&'a str>,
    succ: Vec<Vec<usize>>,
    indegree: Vec<usize>,
}

impl<'a> RankGraph<'a> {
    fn new(node_ids: &'a [String], edges: &'a [Edge], node_order: &HashMap<String, usize>) -> Self {
        let mut ids: Vec<&str> = node_ids.iter().map(String::as_str).collect();
        ids.sort_by_key(|id| node_order.get(*id).copied().unwrap_or(usize::MAX));
        let index: HashMap<&str, usize> = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();

        let mut succ = vec![Vec::new(); ids.len()];
        let mut indegree = vec![0; ids.len()];
        for edge in edges {
            if let (Some(&from), Some(&to)) = (index.get(edge.from.as_str()), index.get(edge.to.as_str())) {
                succ[from].push(to);
                indegree[to] += 1;
            }
        }
        Self { ids, succ, indegree }
    }

    /// Kahn order with a min-heap on declaration index. A stalled queue means
    /// a cycle; the earliest unvisited node is then released as a source.
    fn topological_order(&self) -> Vec<usize> {
        let n = self.ids.len();
        let mut indegree = self.indegree.clone();
        let mut visited = vec![false; n];
        let mut ready: BinaryHeap<Reverse<usize>> =
            (0..n).filter(|&i| indegree[i] == 0).map(Reverse).collect();
        let mut order = Vec::with_capacity(n);
        let mut cursor = 0;

        while order.len() < n {
            let Some(Reverse(node)) = ready.pop() else {
                while visited[cursor] {
                    cursor += 1;
                }
                tracing::trace!(node = self.ids[cursor], "breaking cycle");
                ready.push(Reverse(cursor));
                continue;
            };
            if visited[node] {
                continue;
            }
            visited[node] = true;
            order.push(node);
            for &next in &self.succ[node] {
                if visited[next] {
                    continue;
                }
                indegree[next] = indegree[next].saturating_sub(1);
                if indegree[next] == 0 {
                    ready.push(Reverse(next));
                }
            }
        }
        order
    }
}

/// Longest-path layering over a topological order.
///
/// Edges that point backwards in the order (the ones left over when a cycle
/// was broken) never raise a rank.
pub(super) fn compute_ranks(
    node_ids: &[String],
    edges: &[Edge],
    node_order: &HashMap<String, usize>,
) -> HashMap<String, usize> {
    let graph = RankGraph::new(node_ids, edges, node_order);
    let order = graph.topological_order();
    let mut seq = vec![0; order.len()];
    for (pos, &node) in order.iter().enumerate() {
        seq[node] = pos;
    }

    let mut rank = vec![0usize; order.len()];
    for &node in &order {
        for &next in &graph.succ[node] {
            if seq[next] > seq[node] {
                rank[next] = rank[next].max(rank[node] + 1);
            }
        }
    }

    graph
        .ids
        .iter()
        .zip(rank)
        .map(|(id, r)| (id.to_string(), r))
        .collect()
}

/// Median-heuristic sweeps, downwards then upwards, to reduce crossings.
pub(super) fn order_rank_nodes(
    rank_nodes: &mut [Vec<String>],
    edges: &[Edge],
    node_order: &HashMap<String, usize>,
    passes: usize,
) {
    if rank_nodes.len() <= 1 || passes == 0 {
        return;
    }
    let mut above: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut below: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in edges {
        above.entry(edge.to.as_str()).or_default().push(edge.from.as_str());
        below.entry(edge.from.as_str()).or_default().push(edge.to.as_str());
    }

    let mut slot: HashMap<String, usize> = HashMap::new();
    for bucket in rank_nodes.iter() {
        for (idx, id) in bucket.iter().enumerate() {
            slot.insert(id.clone(), idx);
        }
    }

    let last = rank_nodes.len() - 1;
    for _ in 0..passes {
        for bucket in rank_nodes[1..].iter_mut() {
            reorder(bucket, &above, &mut slot, node_order);
        }
        for bucket in rank_nodes[..last].iter_mut().rev() {
            reorder(bucket, &below, &mut slot, node_order);
        }
    }
}

/// Sort one rank by the median slot of its neighbours in the adjacent rank.
/// Nodes without placed neighbours keep their own slot as the score.
fn reorder(
    bucket: &mut Vec<String>,
    neighbors: &HashMap<&str, Vec<&str>>,
    slot: &mut HashMap<String, usize>,
    node_order: &HashMap<String, usize>,
) {
    if bucket.len() <= 1 {
        return;
    }
    let mut keyed: Vec<(f32, usize, usize, String)> = bucket
        .drain(..)
        .enumerate()
        .map(|(own, id)| {
            let score = median_slot(neighbors.get(id.as_str()), slot).unwrap_or(own as f32);
            let declared = node_order.get(&id).copied().unwrap_or(usize::MAX);
            (score, own, declared, id)
        })
        .collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));
    for (idx, (_, _, _, id)) in keyed.into_iter().enumerate() {
        slot.insert(id.clone(), idx);
        bucket.push(id);
    }
}

fn median_slot(neighbors: Option<&Vec<&str>>, slot: &HashMap<String, usize>) -> Option<f32> {
    let mut slots: Vec<usize> = neighbors?
        .iter()
        .filter_map(|id| slot.get(*id).copied())
        .collect();
    if slots.is_empty() {
        return None;
    }
    slots.sort_unstable();
    let mid = slots.len() / 2;
    Some(if slots.len() % 2 == 1 {
        slots[mid] as f32
    } else {
        (slots[mid - 1] + slots[mid]) as f32 / 2.0
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn order(list: &[&str]) -> HashMap<String, usize> {
        list.iter().enumerate().map(|(i, s)| (s.to_string(), i)).collect()
    }

    fn edges(pairs: &[(&str, &str)]) -> Vec<Edge> {
        pairs
            .iter()
            .enumerate()
            .map(|(i, (a, b))| Edge::new(format!("e-{i}"), *a, *b))
            .collect()
    }

    #[test]
    fn ranks_follow_longest_path_from_sources() {
        let nodes = ["a", "b", "c", "d", "lonely"];
        let ranks = compute_ranks(
            &ids(&nodes),
            &edges(&[("a", "b"), ("b", "c"), ("a", "c"), ("c", "d")]),
            &order(&nodes),
        );
        assert_eq!(ranks["a"], 0);
        assert_eq!(ranks["b"], 1);
        assert_eq!(ranks["c"], 2);
        assert_eq!(ranks["d"], 3);
        assert_eq!(ranks["lonely"], 0);
    }

    #[test]
    fn cycles_are_broken_at_the_earliest_declared_node() {
        let nodes = ["x", "y", "z"];
        let ranks = compute_ranks(
            &ids(&nodes),
            &edges(&[("x", "y"), ("y", "z"), ("z", "x"), ("z", "z")]),
            &order(&nodes),
        );
        assert_eq!(ranks["x"], 0);
        assert_eq!(ranks["y"], 1);
        assert_eq!(ranks["z"], 2);
    }

    #[test]
    fn median_sweep_uncrosses_simple_pair() {
        // a->d and b->c cross when rank 1 is [c, d]; the sweep swaps them.
        let nodes = ["a", "b", "c", "d"];
        let mut buckets = vec![ids(&["a", "b"]), ids(&["c", "d"])];
        order_rank_nodes(&mut buckets, &edges(&[("a", "d"), ("b", "c")]), &order(&nodes), 2);
        let a_pos = buckets[0].iter().position(|n| n == "a").unwrap();
        let d_pos = buckets[1].iter().position(|n| n == "d").unwrap();
        assert_eq!(a_pos, d_pos);
    }

    #[test]
    fn declaration_order_beats_input_order() {
        // "b" is declared first, so it is the source released to break the cycle
        let ranks = compute_ranks(
            &ids(&["a", "b"]),
            &edges(&[("a", "b"), ("b", "a")]),
            &order(&["b", "a"]),
        );
        assert_eq!(ranks["b"], 0);
        assert_eq!(ranks["a"], 1);
    }

    #[test]
    fn zero_passes_keeps_declaration_order() {
        let nodes = ["a", "b", "c", "d"];
        let mut buckets = vec![ids(&["a", "b"]), ids(&["c", "d"])];
        order_rank_nodes(&mut buckets, &edges(&[("a", "d"), ("b", "c")]), &order(&nodes), 0);
        assert_eq!(buckets[1], ids(&["c", "d"]));
    }
}
