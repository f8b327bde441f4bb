//! Target dependency graph.
//!
//! Nodes are targets, edges run from a dependency to its dependent. Planning a
//! target yields its dependency closure in topological order.

use std::collections::{BTreeSet, HashMap, HashSet};

use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

use super::types::{BuildTarget, OrchestrateError, TargetSet};

pub struct TargetDag {
  graph: DiGraph<BuildTarget, ()>,

  /// Map from target name to node index.
  nodes: HashMap<String, NodeIndex>,
}

impl TargetDag {
  /// Build the graph, rejecting duplicate names, unknown dependencies and cycles.
  pub fn new(set: &TargetSet) -> Result<Self, OrchestrateError> {
    let mut graph = DiGraph::new();
    let mut nodes = HashMap::new();

    // First pass: one node per target, in declaration order
    for target in &set.targets {
      if nodes.contains_key(&target.name) {
        return Err(OrchestrateError::DuplicateTarget(target.name.clone()));
      }
      let idx = graph.add_node(target.clone());
      nodes.insert(target.name.clone(), idx);
    }

    // Second pass: edges from dependency to dependent
    for target in &set.targets {
      let dependent_idx = nodes[&target.name];
      for dep in &target.dependencies {
        let Some(&dep_idx) = nodes.get(dep) else {
          return Err(OrchestrateError::UnknownDependency {
            target: target.name.clone(),
            dependency: dep.clone(),
          });
        };
        graph.update_edge(dep_idx, dependent_idx, ());
      }
    }

    let dag = Self { graph, nodes };
    dag.verify_acyclic()?;
    Ok(dag)
  }

  fn verify_acyclic(&self) -> Result<(), OrchestrateError> {
    toposort(&self.graph, None).map_err(|_| OrchestrateError::CycleDetected)?;
    Ok(())
  }

  pub fn target_names(&self) -> impl Iterator<Item = &str> {
    self.graph.node_indices().map(|idx| self.graph[idx].name.as_str())
  }

  /// `name` and everything it transitively depends on.
  fn closure(&self, root: NodeIndex) -> HashSet<NodeIndex> {
    let mut seen = HashSet::new();
    let mut stack = vec![root];
    while let Some(idx) = stack.pop() {
      if seen.insert(idx) {
        stack.extend(self.graph.neighbors_directed(idx, Direction::Incoming));
      }
    }
    seen
  }

  /// Targets to run for `name`, dependencies first, each exactly once.
  ///
  /// Among targets whose dependencies are all satisfied, the one declared first
  /// runs first, so plans are deterministic.
  pub fn plan(&self, name: &str) -> Result<Vec<&BuildTarget>, OrchestrateError> {
    let &root = self
      .nodes
      .get(name)
      .ok_or_else(|| OrchestrateError::UnknownTarget(name.to_string()))?;

    let members = self.closure(root);

    let mut in_degree: HashMap<NodeIndex, usize> = members
      .iter()
      .map(|&idx| {
        let deps = self
          .graph
          .neighbors_directed(idx, Direction::Incoming)
          .filter(|dep| members.contains(dep))
          .count();
        (idx, deps)
      })
      .collect();

    // NodeIndex order is declaration order
    let mut ready: BTreeSet<NodeIndex> = in_degree
      .iter()
      .filter(|&(_, &deg)| deg == 0)
      .map(|(&idx, _)| idx)
      .collect();

    let mut order = Vec::with_capacity(members.len());
    while let Some(idx) = ready.pop_first() {
      order.push(&self.graph[idx]);
      for dependent in self.graph.neighbors_directed(idx, Direction::Outgoing) {
        if let Some(deg) = in_degree.get_mut(&dependent) {
          *deg -= 1;
          if *deg == 0 {
            ready.insert(dependent);
          }
        }
      }
    }

    if order.len() != members.len() {
      return Err(OrchestrateError::CycleDetected);
    }

    Ok(order)
  }
}
