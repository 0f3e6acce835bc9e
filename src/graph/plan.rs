//! Execution plans: a dependency-respecting linear order over a graph.
use std::collections::HashSet;
use std::ops::ControlFlow;

use crate::error::PlanError;

use super::render::render_tree;
use super::unit::{Unit, UnitGraph, UnitId};
use super::walk::{self, Cursor, Enter, Visitor};

/// Post-order collector with cycle detection.
///
/// `stack` mirrors the units currently being descended into (with
/// `on_stack` for membership checks); `done` holds units already appended
/// to `order`.
struct Planner<'g, A> {
    graph: &'g UnitGraph<A>,
    stack: Vec<UnitId>,
    on_stack: HashSet<UnitId>,
    done: HashSet<UnitId>,
    order: Vec<UnitId>,
}

impl<'g, A> Planner<'g, A> {
    fn new(graph: &'g UnitGraph<A>) -> Self {
        Self {
            graph,
            stack: Vec::new(),
            on_stack: HashSet::new(),
            done: HashSet::new(),
            order: Vec::with_capacity(graph.len()),
        }
    }

    /// Names from the first occurrence of `node` on the stack to the top,
    /// closed with `node` again.
    fn cycle_through(&self, node: UnitId) -> Vec<String> {
        self.stack
            .iter()
            .skip_while(|&&id| id != node)
            .chain(std::iter::once(&node))
            .map(|&id| self.graph[id].name().to_string())
            .collect()
    }
}

impl<A> Visitor for Planner<'_, A> {
    type Break = PlanError;

    fn enter(&mut self, cursor: &Cursor) -> ControlFlow<PlanError, Enter> {
        // Second path into an already-planned unit.
        if self.done.contains(&cursor.node) {
            return ControlFlow::Continue(Enter::Prune);
        }
        if self.on_stack.contains(&cursor.node) {
            return ControlFlow::Break(PlanError::DependencyCycle {
                cycle: self.cycle_through(cursor.node),
            });
        }
        self.stack.push(cursor.node);
        self.on_stack.insert(cursor.node);
        ControlFlow::Continue(Enter::Descend)
    }

    fn exit(&mut self, cursor: &Cursor) -> ControlFlow<PlanError> {
        if !self.done.insert(cursor.node) {
            return ControlFlow::Continue(());
        }
        debug_assert_eq!(self.stack.last(), Some(&cursor.node));
        self.stack.pop();
        self.on_stack.remove(&cursor.node);
        self.order.push(cursor.node);
        ControlFlow::Continue(())
    }
}

/// A linear order over every unit reachable from a start node, such that
/// each unit comes after all of its dependencies.
///
/// The plan borrows the graph it was built from and reflects the graph at
/// build time. The start node (normally the root) is always last.
///
/// # Examples
///
/// ```
/// use carthage::graph::{ExecutionPlan, UnitGraph};
///
/// let mut graph: UnitGraph<()> = UnitGraph::new();
/// let root = graph.root();
/// let a = graph.add_unit("a").unwrap();
/// let b = graph.add_unit("b").unwrap();
/// graph.add_dependency(root, a);
/// graph.add_dependency(root, b);
/// graph.add_dependency(a, b);
///
/// let plan = ExecutionPlan::build(&graph).unwrap();
/// assert_eq!(plan.names(), ["b", "a", "root"]);
/// ```
#[derive(Debug, Clone)]
pub struct ExecutionPlan<'g, A> {
    graph: &'g UnitGraph<A>,
    start: UnitId,
    order: Vec<UnitId>,
}

impl<'g, A> ExecutionPlan<'g, A> {
    /// Plan every unit reachable from the graph's root.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::DependencyCycle`] if a unit is reachable from
    /// itself, including a unit that lists itself as a dependency.
    pub fn build(graph: &'g UnitGraph<A>) -> Result<Self, PlanError> {
        Self::build_from(graph, graph.root())
    }

    /// Plan every unit reachable from `start`.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::DependencyCycle`] if a unit is reachable from
    /// itself.
    pub fn build_from(graph: &'g UnitGraph<A>, start: UnitId) -> Result<Self, PlanError> {
        let mut planner = Planner::new(graph);
        match walk::visit(graph, start, &mut planner) {
            ControlFlow::Continue(()) => Ok(Self {
                graph,
                start,
                order: planner.order,
            }),
            ControlFlow::Break(err) => Err(err),
        }
    }

    /// The graph this plan was built from.
    #[must_use]
    pub const fn graph(&self) -> &'g UnitGraph<A> {
        self.graph
    }

    /// The unit the plan was built from.
    #[must_use]
    pub const fn start(&self) -> UnitId {
        self.start
    }

    /// Number of planned units, start node included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the plan is empty. A built plan always holds its start node.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Planned unit handles in execution order.
    #[must_use]
    pub fn ids(&self) -> &[UnitId] {
        &self.order
    }

    /// Planned units in execution order.
    pub fn iter(&self) -> impl Iterator<Item = &'g Unit<A>> + '_ {
        let graph = self.graph;
        self.order.iter().map(move |&id| &graph[id])
    }

    /// Planned units that carry an action, in execution order.
    pub fn actions(&self) -> impl Iterator<Item = (&'g Unit<A>, &'g A)> + '_ {
        self.iter()
            .filter_map(|unit| unit.action().map(|action| (unit, action)))
    }

    /// Planned unit names in execution order.
    #[must_use]
    pub fn names(&self) -> Vec<&'g str> {
        self.iter().map(Unit::name).collect()
    }

    /// Index of the named unit in the plan.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        let id = self.graph.lookup(name)?;
        self.order.iter().position(|&planned| planned == id)
    }

    /// Whether `id` is part of the plan.
    #[must_use]
    pub fn contains(&self, id: UnitId) -> bool {
        self.order.contains(&id)
    }

    /// Render the dependency tree below the plan's start node.
    ///
    /// See [`render_tree`].
    #[must_use]
    pub fn render(&self) -> String {
        render_tree(self.graph, self.start)
    }
}
