//! Transform dependency graph and colour-space conversion graph.
//!
//! [`TransformGraph`] holds one node per transform and one edge from each
//! dependency to its dependent. The dependency relation must be acyclic;
//! a cycle is reported starting from its lexicographically smallest member.
//!
//! [`ConversionGraph`] is derived from it: its nodes are colour-space labels
//! and each edge is a transform converting its source to its target. That
//! graph is allowed to cycle (`ACEScc_to_ACES` and `ACES_to_ACEScc`).
//!
//! # Example
//!
//! ```ignore
//! use aces_ctl::{discover_ctl_transforms, DiscoveryOptions, TransformGraph};
//!
//! let set = discover_ctl_transforms("transforms/ctl", &DiscoveryOptions::new())?;
//! let graph = TransformGraph::build(set)?;
//! for step in graph.conversion_path("ACEScct", "ACEScg")? {
//!     println!("{}", step.name());
//! }
//! ```

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use petgraph::Direction;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Bfs, EdgeRef, Reversed};
use tracing::{debug, warn};

use crate::ctl::CtlTransform;
use crate::error::{GraphError, GraphResult};

/// Directed graph of colour-space labels; edge weights are transform nodes.
#[derive(Debug, Clone, Default)]
pub struct ConversionGraph {
    graph: DiGraph<String, NodeIndex>,
    index: BTreeMap<String, NodeIndex>,
}

impl ConversionGraph {
    fn build(transforms: &DiGraph<CtlTransform, ()>, order: &[NodeIndex]) -> Self {
        let labels: BTreeSet<&str> = order
            .iter()
            .filter_map(|&i| {
                let t = &transforms[i];
                t.source().zip(t.target())
            })
            .flat_map(|(s, d)| [s, d])
            .collect();

        let mut graph = DiGraph::new();
        let mut index = BTreeMap::new();
        for label in labels {
            index.insert(label.to_string(), graph.add_node(label.to_string()));
        }

        let mut by_name: Vec<NodeIndex> = order.to_vec();
        by_name.sort_by(|&a, &b| transforms[a].name().cmp(transforms[b].name()));
        for node in by_name {
            let t = &transforms[node];
            if let (Some(s), Some(d)) = (t.source(), t.target()) {
                if let (Some(&a), Some(&b)) = (index.get(s), index.get(d)) {
                    graph.add_edge(a, b, node);
                }
            }
        }

        Self { graph, index }
    }

    /// Number of colour-space labels.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Whether no transform converts anything.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Colour-space labels, sorted.
    pub fn colorspaces(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    /// Whether a label takes part in any conversion.
    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    /// Labels reachable from `label` in one step, sorted.
    pub fn successors(&self, label: &str) -> Vec<&str> {
        let Some(&node) = self.index.get(label) else {
            return Vec::new();
        };
        let set: BTreeSet<&str> = self
            .graph
            .neighbors_directed(node, Direction::Outgoing)
            .map(|n| self.graph[n].as_str())
            .collect();
        set.into_iter().collect()
    }

    /// Shortest path as transform nodes; `None` when unreachable.
    ///
    /// Breadth first, visiting neighbours in label order and parallel edges
    /// in transform-name order, so equal-length paths resolve the same way
    /// on every run.
    fn path(
        &self,
        transforms: &DiGraph<CtlTransform, ()>,
        from: NodeIndex,
        to: NodeIndex,
    ) -> Option<Vec<NodeIndex>> {
        let mut parent: BTreeMap<NodeIndex, (NodeIndex, NodeIndex)> = BTreeMap::new();
        let mut seen = BTreeSet::from([from]);
        let mut queue = VecDeque::from([from]);

        while let Some(current) = queue.pop_front() {
            if current == to {
                break;
            }
            let mut edges: Vec<(NodeIndex, NodeIndex)> = self
                .graph
                .edges_directed(current, Direction::Outgoing)
                .map(|e| (e.target(), *e.weight()))
                .collect();
            edges.sort_by(|a, b| {
                self.graph[a.0]
                    .cmp(&self.graph[b.0])
                    .then_with(|| transforms[a.1].name().cmp(transforms[b.1].name()))
            });
            for (next, via) in edges {
                if seen.insert(next) {
                    parent.insert(next, (current, via));
                    queue.push_back(next);
                }
            }
        }

        if !seen.contains(&to) {
            return None;
        }
        let mut steps = Vec::new();
        let mut current = to;
        while current != from {
            let &(previous, via) = parent.get(&current)?;
            steps.push(via);
            current = previous;
        }
        steps.reverse();
        Some(steps)
    }
}

/// Dependency graph of discovered transforms.
#[derive(Debug, Clone)]
pub struct TransformGraph {
    graph: DiGraph<CtlTransform, ()>,
    index: BTreeMap<String, NodeIndex>,
    order: Vec<NodeIndex>,
    conversions: ConversionGraph,
}

impl TransformGraph {
    /// Builds the graph from discovered transforms.
    ///
    /// # Errors
    ///
    /// - [`GraphError::UnresolvedDependency`] for an import outside the input
    /// - [`GraphError::Cycle`] when imports form a cycle
    pub fn build(transforms: impl IntoIterator<Item = CtlTransform>) -> GraphResult<Self> {
        let mut sorted: BTreeMap<String, CtlTransform> = BTreeMap::new();
        for transform in transforms {
            let name = transform.name().to_string();
            if sorted.contains_key(&name) {
                warn!(name = %name, path = %transform.path().display(), "Duplicate transform ignored");
                continue;
            }
            sorted.insert(name, transform);
        }

        let mut graph: DiGraph<CtlTransform, ()> = DiGraph::with_capacity(sorted.len(), 0);
        let mut index = BTreeMap::new();
        for (name, transform) in sorted {
            index.insert(name, graph.add_node(transform));
        }

        let mut edges = Vec::new();
        for (name, &node) in &index {
            for dependency in graph[node].dependencies() {
                let &from = index.get(dependency).ok_or_else(|| GraphError::UnresolvedDependency {
                    transform: name.clone(),
                    dependency: dependency.clone(),
                })?;
                edges.push((from, node));
            }
        }
        for (from, to) in edges {
            graph.add_edge(from, to, ());
        }

        if let Some(cycle) = find_cycle(&graph) {
            return Err(GraphError::Cycle { cycle });
        }
        let order = topological_order(&graph);
        let conversions = ConversionGraph::build(&graph, &order);

        debug!(
            transforms = graph.node_count(),
            dependencies = graph.edge_count(),
            colorspaces = conversions.len(),
            "Built transform graph"
        );

        Ok(Self {
            graph,
            index,
            order,
            conversions,
        })
    }

    /// Number of transforms.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Whether the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Looks a transform up by name.
    pub fn get(&self, name: &str) -> Option<&CtlTransform> {
        self.index.get(name).map(|&i| &self.graph[i])
    }

    fn node(&self, name: &str) -> GraphResult<NodeIndex> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| GraphError::UnknownTransform {
                name: name.to_string(),
            })
    }

    /// Transforms in topological order: dependencies first, ties by name.
    pub fn transforms(&self) -> impl Iterator<Item = &CtlTransform> {
        self.order.iter().map(|&i| &self.graph[i])
    }

    /// Direct dependencies of `name`, sorted by name.
    pub fn dependencies(&self, name: &str) -> GraphResult<Vec<&CtlTransform>> {
        let node = self.node(name)?;
        Ok(self.sorted(self.graph.neighbors_directed(node, Direction::Incoming)))
    }

    /// Direct dependents of `name`, sorted by name.
    pub fn dependents(&self, name: &str) -> GraphResult<Vec<&CtlTransform>> {
        let node = self.node(name)?;
        Ok(self.sorted(self.graph.neighbors_directed(node, Direction::Outgoing)))
    }

    /// Everything `name` depends on, directly or not, sorted by name.
    pub fn transitive_dependencies(&self, name: &str) -> GraphResult<Vec<&CtlTransform>> {
        let node = self.node(name)?;
        let reversed = Reversed(&self.graph);
        let mut bfs = Bfs::new(reversed, node);
        let mut found = Vec::new();
        while let Some(n) = bfs.next(reversed) {
            if n != node {
                found.push(n);
            }
        }
        Ok(self.sorted(found))
    }

    /// Everything that depends on `name`, directly or not, sorted by name.
    pub fn transitive_dependents(&self, name: &str) -> GraphResult<Vec<&CtlTransform>> {
        let node = self.node(name)?;
        let mut bfs = Bfs::new(&self.graph, node);
        let mut found = Vec::new();
        while let Some(n) = bfs.next(&self.graph) {
            if n != node {
                found.push(n);
            }
        }
        Ok(self.sorted(found))
    }

    fn sorted(&self, nodes: impl IntoIterator<Item = NodeIndex>) -> Vec<&CtlTransform> {
        let mut out: Vec<&CtlTransform> = nodes.into_iter().map(|i| &self.graph[i]).collect();
        out.sort_by(|a, b| a.name().cmp(b.name()));
        out.dedup_by(|a, b| a.name() == b.name());
        out
    }

    /// Colour-space conversion graph.
    pub fn conversion_graph(&self) -> &ConversionGraph {
        &self.conversions
    }

    /// Shortest chain of transforms converting `source` to `target`.
    ///
    /// Identical labels give an empty chain.
    ///
    /// # Errors
    ///
    /// - [`GraphError::UnknownColorSpace`] when a label is not in the graph
    /// - [`GraphError::NoPath`] when the labels are not connected
    pub fn conversion_path(&self, source: &str, target: &str) -> GraphResult<Vec<&CtlTransform>> {
        let lookup = |label: &str| {
            self.conversions
                .index
                .get(label)
                .copied()
                .ok_or_else(|| GraphError::UnknownColorSpace {
                    name: label.to_string(),
                })
        };
        let from = lookup(source)?;
        let to = lookup(target)?;
        if from == to {
            return Ok(Vec::new());
        }

        let steps = self
            .conversions
            .path(&self.graph, from, to)
            .ok_or_else(|| GraphError::NoPath {
                source_space: source.to_string(),
                target_space: target.to_string(),
            })?;
        Ok(steps.into_iter().map(|i| &self.graph[i]).collect())
    }
}

/// Kahn's algorithm with a name-ordered ready set.
fn topological_order(graph: &DiGraph<CtlTransform, ()>) -> Vec<NodeIndex> {
    let mut in_degree: Vec<usize> = graph
        .node_indices()
        .map(|n| graph.neighbors_directed(n, Direction::Incoming).count())
        .collect();
    let mut ready: BTreeSet<(&str, NodeIndex)> = graph
        .node_indices()
        .filter(|n| in_degree[n.index()] == 0)
        .map(|n| (graph[n].name(), n))
        .collect();

    let mut order = Vec::with_capacity(graph.node_count());
    while let Some((_, node)) = ready.pop_first() {
        order.push(node);
        for next in graph.neighbors_directed(node, Direction::Outgoing) {
            let degree = &mut in_degree[next.index()];
            *degree -= 1;
            if *degree == 0 {
                ready.insert((graph[next].name(), next));
            }
        }
    }
    order
}

/// Names along one dependency cycle, or `None` when the graph is acyclic.
///
/// The cycle starts and ends at the smallest name of the strongly connected
/// component holding the smallest cyclic transform.
fn find_cycle(graph: &DiGraph<CtlTransform, ()>) -> Option<Vec<String>> {
    let components: Vec<Vec<NodeIndex>> = tarjan_scc(graph)
        .into_iter()
        .filter(|c| c.len() > 1 || graph.contains_edge(c[0], c[0]))
        .collect();

    let component = components
        .iter()
        .min_by(|a, b| smallest(graph, a).cmp(smallest(graph, b)))?;
    let members: BTreeSet<NodeIndex> = component.iter().copied().collect();
    let start = component
        .iter()
        .copied()
        .min_by(|&a, &b| graph[a].name().cmp(graph[b].name()))?;

    if graph.contains_edge(start, start) {
        let name = graph[start].name().to_string();
        return Some(vec![name.clone(), name]);
    }

    // Shortest way back to `start` inside the component.
    let mut parent: BTreeMap<NodeIndex, NodeIndex> = BTreeMap::new();
    let mut queue = VecDeque::from([start]);
    let mut last = None;
    'search: while let Some(current) = queue.pop_front() {
        let mut next: Vec<NodeIndex> = graph
            .neighbors_directed(current, Direction::Outgoing)
            .filter(|n| members.contains(n))
            .collect();
        next.sort_by(|&a, &b| graph[a].name().cmp(graph[b].name()));
        for n in next {
            if n == start {
                last = Some(current);
                break 'search;
            }
            if !parent.contains_key(&n) {
                parent.insert(n, current);
                queue.push_back(n);
            }
        }
    }

    let mut current = last?;
    let mut walk = vec![current];
    while current != start {
        current = *parent.get(&current)?;
        walk.push(current);
    }
    walk.reverse();
    walk.push(start);
    Some(walk.into_iter().map(|n| graph[n].name().to_string()).collect())
}

fn smallest<'a>(graph: &'a DiGraph<CtlTransform, ()>, nodes: &[NodeIndex]) -> &'a str {
    nodes.iter().map(|&n| graph[n].name()).min().unwrap_or_default()
}
