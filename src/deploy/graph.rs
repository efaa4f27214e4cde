// src/deploy/graph.rs
// DOCUMENTATION: Dependency ordering for services and pipeline jobs
// PURPOSE: Kahn's algorithm with cycle and dangling-reference reporting

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("'{from}' depends on unknown '{missing}'")]
    UnknownNode { from: String, missing: String },

    #[error("dependency cycle between: {}", .0.join(", "))]
    Cycle(Vec<String>),
}

/// Order `nodes` so every node comes after everything it depends on
///
/// `edges` are `(dependent, dependency)` pairs. Ties are broken by the
/// order of `nodes`, so the result is deterministic.
pub fn topological_order(
    nodes: &[String],
    edges: &[(String, String)],
) -> Result<Vec<String>, GraphError> {
    let index: BTreeMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.as_str(), i))
        .collect();

    let mut in_degree = vec![0usize; nodes.len()];
    let mut dependents: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); nodes.len()];

    for (from, to) in edges {
        let from_idx = *index.get(from.as_str()).ok_or_else(|| GraphError::UnknownNode {
            from: to.clone(),
            missing: from.clone(),
        })?;
        let to_idx = *index.get(to.as_str()).ok_or_else(|| GraphError::UnknownNode {
            from: from.clone(),
            missing: to.clone(),
        })?;

        if dependents[to_idx].insert(from_idx) {
            in_degree[from_idx] += 1;
        }
    }

    let mut ready: VecDeque<usize> = (0..nodes.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(nodes.len());

    while let Some(i) = ready.pop_front() {
        order.push(i);
        for &d in &dependents[i] {
            in_degree[d] -= 1;
            if in_degree[d] == 0 {
                ready.push_back(d);
            }
        }
    }

    if order.len() < nodes.len() {
        return Err(GraphError::Cycle(cycle_members(nodes, &dependents, &in_degree)));
    }

    Ok(order.into_iter().map(|i| nodes[i].clone()).collect())
}

/// Nodes left after Kahn's pass, minus the ones that merely hang off a cycle
fn cycle_members(
    nodes: &[String],
    dependents: &[BTreeSet<usize>],
    in_degree: &[usize],
) -> Vec<String> {
    let mut remaining: BTreeSet<usize> = (0..nodes.len()).filter(|&i| in_degree[i] > 0).collect();

    // Peel off nodes nothing else in the remainder depends on
    loop {
        let leaves: Vec<usize> = remaining
            .iter()
            .copied()
            .filter(|&i| !dependents[i].iter().any(|d| remaining.contains(d)))
            .collect();
        if leaves.is_empty() {
            break;
        }
        for leaf in leaves {
            remaining.remove(&leaf);
        }
    }

    remaining.into_iter().map(|i| nodes[i].clone()).collect()
}
