//! Task adjacency index built on petgraph.
//!
//! The index is derived from a store snapshot and never mutated afterwards.
//! Edges point from a dependency's `from` task to its `to` task and carry the
//! dependency id, so parallel links between the same pair are kept apart.
//!
//! Dangling endpoints (tasks deleted while still referenced) still get a
//! node, which keeps every lookup infallible.

use crate::domain::{DependencyId, TaskId};
use crate::store::Store;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};

/// Directed multigraph of tasks and dependency links.
#[derive(Debug, Default)]
pub struct TaskGraph {
    /// Nodes hold task ids, edges hold dependency ids
    graph: DiGraph<TaskId, DependencyId>,

    /// Task id to node index
    node_map: HashMap<TaskId, NodeIndex>,
}

impl TaskGraph {
    /// Index every task and dependency in the store.
    pub fn build(store: &Store) -> Self {
        let mut index = Self::default();
        for task in store.tasks() {
            index.ensure_node(task.id);
        }
        for dep in store.dependencies() {
            let from = index.ensure_node(dep.from_task_id);
            let to = index.ensure_node(dep.to_task_id);
            index.graph.add_edge(from, to, dep.id);
        }
        index
    }

    fn ensure_node(&mut self, task: TaskId) -> NodeIndex {
        if let Some(&node) = self.node_map.get(&task) {
            return node;
        }
        let node = self.graph.add_node(task);
        self.node_map.insert(task, node);
        node
    }

    /// Tasks linked to `task` in either direction.
    pub fn neighbors(&self, task: TaskId) -> HashSet<TaskId> {
        let Some(&node) = self.node_map.get(&task) else {
            return HashSet::new();
        };
        self.graph
            .neighbors_undirected(node)
            .map(|n| self.graph[n])
            .filter(|&other| other != task)
            .collect()
    }
}
