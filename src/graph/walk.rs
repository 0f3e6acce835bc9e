//! Depth-first traversal with entry and exit hooks.
//!
//! [`visit`] walks forward edges in insertion order starting from any unit
//! and hands each visited position to a [`Visitor`] as a [`Cursor`].
//!
//! Two rules shape every walk:
//!
//! - [`Visitor::enter`] returning [`Enter::Prune`] skips the node's children
//!   **and** its [`Visitor::exit`] call. Only descended nodes are exited.
//! - Either hook may return [`ControlFlow::Break`], which stops the walk at
//!   once and is handed back unchanged from [`visit`].
//!
//! Nothing here remembers visited nodes: a unit reachable along two paths
//! is offered to the visitor twice, and a cycle recurses until the visitor
//! prunes or breaks.
use std::convert::Infallible;
use std::ops::ControlFlow;

use super::unit::{UnitGraph, UnitId};

/// Position of a visited node within the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// The node being visited.
    pub node: UnitId,
    /// The node whose edge led here; `None` for the start node.
    pub parent: Option<UnitId>,
    /// Distance from the start node (start = 0).
    pub depth: usize,
    /// Whether this is the last dependency of its parent. Always `true` for
    /// the start node.
    pub last_at_depth: bool,
}

/// What [`Visitor::enter`] wants done with the current node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enter {
    /// Visit the children, then call [`Visitor::exit`].
    Descend,
    /// Skip the children and the exit hook.
    Prune,
}

/// Callbacks driven by [`visit`].
pub trait Visitor {
    /// Value carried out of the walk when a hook breaks.
    type Break;

    /// Called when the walk arrives at a node.
    fn enter(&mut self, cursor: &Cursor) -> ControlFlow<Self::Break, Enter>;

    /// Called once every child has been fully visited. Never called for a
    /// node whose `enter` pruned.
    fn exit(&mut self, _cursor: &Cursor) -> ControlFlow<Self::Break> {
        ControlFlow::Continue(())
    }
}

/// Walk `graph` depth-first from `start`.
///
/// Returns the first [`ControlFlow::Break`] produced by the visitor, or
/// `Continue` once the walk is complete.
pub fn visit<A, V>(graph: &UnitGraph<A>, start: UnitId, visitor: &mut V) -> ControlFlow<V::Break>
where
    V: Visitor + ?Sized,
{
    let cursor = Cursor {
        node: start,
        parent: None,
        depth: 0,
        last_at_depth: true,
    };
    visit_at(graph, cursor, visitor)
}

fn visit_at<A, V>(graph: &UnitGraph<A>, cursor: Cursor, visitor: &mut V) -> ControlFlow<V::Break>
where
    V: Visitor + ?Sized,
{
    if visitor.enter(&cursor)? == Enter::Prune {
        return ControlFlow::Continue(());
    }

    let deps = graph[cursor.node].dependencies();
    let count = deps.len();
    for (i, &next) in deps.iter().enumerate() {
        let child = Cursor {
            node: next,
            parent: Some(cursor.node),
            depth: cursor.depth + 1,
            last_at_depth: i + 1 == count,
        };
        visit_at(graph, child, visitor)?;
    }

    visitor.exit(&cursor)
}

/// Adapter running a closure as a never-pruning entry hook.
struct EntryOnly<F>(F);

impl<F: FnMut(&Cursor)> Visitor for EntryOnly<F> {
    type Break = Infallible;

    fn enter(&mut self, cursor: &Cursor) -> ControlFlow<Infallible, Enter> {
        (self.0)(cursor);
        ControlFlow::Continue(Enter::Descend)
    }
}

/// Call `f` for every position reachable from `start`, following every
/// edge. A node with several parents is reported once per parent.
///
/// The graph must be acyclic along the walked edges; a cycle recurses
/// without bound.
pub fn walk<A>(graph: &UnitGraph<A>, start: UnitId, f: impl FnMut(&Cursor)) {
    if let ControlFlow::Break(never) = visit(graph, start, &mut EntryOnly(f)) {
        match never {}
    }
}
