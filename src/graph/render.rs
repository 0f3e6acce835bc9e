//! Box-drawing rendering of a dependency graph.
use super::unit::{UnitGraph, UnitId};
use super::walk;

const BAR: &str = "│ ";
const BLANK: &str = "  ";
const TEE: &str = "├─";
const CORNER: &str = "└─";

/// Render every edge reachable from `start` as an indented tree.
///
/// Unlike planning, nothing is deduplicated: a unit depended on by two
/// parents is drawn under each of them.
///
/// The graph must be acyclic below `start`; a cycle recurses without bound.
/// [`ExecutionPlan::render`](super::ExecutionPlan::render) is only reachable
/// once planning has rejected cycles, so prefer it over calling this directly.
///
/// ```text
/// └─root
///   ├─a
///   │ └─c
///   └─b
///     └─c
/// ```
#[must_use]
pub fn render_tree<A>(graph: &UnitGraph<A>, start: UnitId) -> String {
    let mut out = String::new();
    let mut prefix: Vec<&str> = Vec::new();
    let mut prev_depth = 0;
    let mut prev_last = false;

    walk::walk(graph, start, |cursor| {
        if cursor.depth > prev_depth {
            // The previous node is our parent; continue its sibling bar
            // unless it was the last child.
            prefix.push(if prev_last { BLANK } else { BAR });
        } else {
            prefix.truncate(cursor.depth);
        }

        for segment in &prefix {
            out.push_str(segment);
        }
        out.push_str(if cursor.last_at_depth { CORNER } else { TEE });
        out.push_str(graph[cursor.node].name());
        out.push('\n');

        prev_depth = cursor.depth;
        prev_last = cursor.last_at_depth;
    });

    out
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn link(graph: &mut UnitGraph<()>, from: &str, to: &str) {
        let from = graph.lookup(from).unwrap();
        let to = graph.lookup(to).unwrap();
        graph.add_dependency(from, to);
    }

    fn graph_with(names: &[&str]) -> UnitGraph<()> {
        let mut graph = UnitGraph::new();
        for name in names {
            graph.add_unit(*name).unwrap();
        }
        graph
    }

    #[test]
    fn root_only() {
        let graph: UnitGraph<()> = UnitGraph::new();
        assert_eq!(render_tree(&graph, graph.root()), "└─root\n");
    }

    #[test]
    fn nested_chain_with_sibling() {
        let mut graph = graph_with(&["a", "b"]);
        link(&mut graph, "root", "a");
        link(&mut graph, "root", "b");
        link(&mut graph, "a", "b");
        assert_eq!(
            render_tree(&graph, graph.root()),
            "└─root\n  ├─a\n  │ └─b\n  └─b\n"
        );
    }

    #[test]
    fn diamond_is_drawn_under_each_parent() {
        let mut graph = graph_with(&["a", "b", "c"]);
        link(&mut graph, "root", "a");
        link(&mut graph, "root", "b");
        link(&mut graph, "a", "c");
        link(&mut graph, "b", "c");
        let tree = render_tree(&graph, graph.root());
        assert_eq!(tree, "└─root\n  ├─a\n  │ └─c\n  └─b\n    └─c\n");
        assert_eq!(tree.matches("c\n").count(), 2);
    }

    #[test]
    fn prefix_shrinks_by_several_levels() {
        let mut graph = graph_with(&["a", "b", "c", "d"]);
        link(&mut graph, "root", "a");
        link(&mut graph, "root", "d");
        link(&mut graph, "a", "b");
        link(&mut graph, "b", "c");
        assert_eq!(
            render_tree(&graph, graph.root()),
            "└─root\n  ├─a\n  │ └─b\n  │   └─c\n  └─d\n"
        );
    }

    #[test]
    fn bar_continues_past_deep_subtree() {
        let mut graph = graph_with(&["a", "b", "c", "d"]);
        link(&mut graph, "root", "a");
        link(&mut graph, "a", "b");
        link(&mut graph, "a", "d");
        link(&mut graph, "b", "c");
        assert_eq!(
            render_tree(&graph, graph.root()),
            "└─root\n  └─a\n    ├─b\n    │ └─c\n    └─d\n"
        );
    }
}
