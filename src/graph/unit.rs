//! Units and the name-keyed registry that owns them.
use std::collections::HashMap;
use std::fmt;
use std::ops::Index;

use crate::error::GraphError;

/// Name of the synthetic root unit every graph starts with.
pub const ROOT_NAME: &str = "root";

/// Handle to a unit inside a [`UnitGraph`].
///
/// Handles are only minted by [`UnitGraph::add_unit`] and friends, so two
/// handles are equal exactly when they refer to the same unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(usize);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A named node in the dependency graph.
///
/// `A` is the action handle carried by the unit. The graph never looks at
/// it; it is only handed back to whoever executes the plan.
#[derive(Debug, Clone)]
pub struct Unit<A> {
    name: String,
    deps: Vec<UnitId>,
    rdeps: Vec<UnitId>,
    action: Option<A>,
}

impl<A> Unit<A> {
    const fn new(name: String, action: Option<A>) -> Self {
        Self {
            name,
            deps: Vec::new(),
            rdeps: Vec::new(),
            action,
        }
    }

    /// Unique name of the unit.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Units that must complete before this one, in insertion order.
    #[must_use]
    pub fn dependencies(&self) -> &[UnitId] {
        &self.deps
    }

    /// Units that depend on this one, in insertion order.
    #[must_use]
    pub fn dependents(&self) -> &[UnitId] {
        &self.rdeps
    }

    /// The action handle, if the unit carries one.
    #[must_use]
    pub const fn action(&self) -> Option<&A> {
        self.action.as_ref()
    }
}

/// Append `id` unless it is already present. Returns `true` on insert.
fn insert_unique(set: &mut Vec<UnitId>, id: UnitId) -> bool {
    if set.contains(&id) {
        return false;
    }
    set.push(id);
    true
}

/// Registry of units keyed by name, plus their dependency edges.
///
/// A fresh graph holds only the root unit ([`ROOT_NAME`]). Every other
/// unit is registered through [`add_unit`](Self::add_unit) or
/// [`add_unit_with`](Self::add_unit_with), which reject duplicate names, so
/// one logical name always maps to one node.
///
/// # Examples
///
/// ```
/// use carthage::graph::UnitGraph;
///
/// let mut graph: UnitGraph<()> = UnitGraph::new();
/// let a = graph.add_unit("a").unwrap();
/// let b = graph.add_unit("b").unwrap();
/// graph.add_dependency(a, b);
///
/// assert_eq!(graph[a].dependencies(), &[b]);
/// assert_eq!(graph[b].dependents(), &[a]);
/// ```
#[derive(Debug, Clone)]
pub struct UnitGraph<A> {
    units: Vec<Unit<A>>,
    index: HashMap<String, UnitId>,
}

impl<A> Default for UnitGraph<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> UnitGraph<A> {
    /// Create a graph containing only the root unit.
    #[must_use]
    pub fn new() -> Self {
        let root = UnitId(0);
        Self {
            units: vec![Unit::new(ROOT_NAME.to_string(), None)],
            index: HashMap::from([(ROOT_NAME.to_string(), root)]),
        }
    }

    /// The synthetic root unit.
    #[must_use]
    pub const fn root(&self) -> UnitId {
        UnitId(0)
    }

    /// Whether `id` is the root unit.
    #[must_use]
    pub fn is_root(&self, id: UnitId) -> bool {
        id == self.root()
    }

    /// Register a unit without an action.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateUnit`] if the name is already taken.
    pub fn add_unit(&mut self, name: impl Into<String>) -> Result<UnitId, GraphError> {
        self.register(name.into(), None)
    }

    /// Register a unit carrying `action`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateUnit`] if the name is already taken.
    pub fn add_unit_with(
        &mut self,
        name: impl Into<String>,
        action: A,
    ) -> Result<UnitId, GraphError> {
        self.register(name.into(), Some(action))
    }

    fn register(&mut self, name: String, action: Option<A>) -> Result<UnitId, GraphError> {
        if self.index.contains_key(&name) {
            return Err(GraphError::DuplicateUnit(name));
        }
        let id = UnitId(self.units.len());
        self.index.insert(name.clone(), id);
        self.units.push(Unit::new(name, action));
        Ok(id)
    }

    /// Record that `unit` depends on `dependency`.
    ///
    /// Idempotent: the forward and reverse sets are scanned for `dependency`
    /// and `unit` before appending. Self-dependencies are accepted here and
    /// surface as a cycle when planning.
    ///
    /// Returns `true` if the edge was new.
    pub fn add_dependency(&mut self, unit: UnitId, dependency: UnitId) -> bool {
        let inserted = insert_unique(&mut self.unit_mut(unit).deps, dependency);
        insert_unique(&mut self.unit_mut(dependency).rdeps, unit);
        inserted
    }

    /// Look up a unit by name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<UnitId> {
        self.index.get(name).copied()
    }

    /// Borrow a unit, or `None` if the handle belongs to another graph.
    #[must_use]
    pub fn get(&self, id: UnitId) -> Option<&Unit<A>> {
        self.units.get(id.0)
    }

    /// Number of units, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether the graph holds nothing but the root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.len() == 1
    }

    /// All units in registration order, root first.
    pub fn iter(&self) -> impl Iterator<Item = (UnitId, &Unit<A>)> {
        self.units.iter().enumerate().map(|(i, u)| (UnitId(i), u))
    }

    #[allow(clippy::indexing_slicing)]
    fn unit_mut(&mut self, id: UnitId) -> &mut Unit<A> {
        &mut self.units[id.0]
    }
}

impl<A> Index<UnitId> for UnitGraph<A> {
    type Output = Unit<A>;

    /// # Panics
    ///
    /// Panics if `id` was minted by a different graph.
    #[allow(clippy::indexing_slicing)]
    fn index(&self, id: UnitId) -> &Unit<A> {
        &self.units[id.0]
    }
}
