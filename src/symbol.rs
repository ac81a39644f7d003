//! Arena-indexed symbol trees.
//!
//! A [`SymbolTree`] is an immutable snapshot of a file's structural outline at
//! a point in time. Nodes live in a flat arena and refer to their children by
//! index, which keeps qualified-name resolution a cheap recursive descent
//! instead of repeated string scans. Two snapshots of the same file are never
//! mutated in place; diffing always compares two distinct trees.

use serde::{Deserialize, Serialize};

/// Index of a node within its tree's arena.
pub type NodeId = usize;

/// A line/column location, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

/// An inclusive span of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRange {
    pub start_line: u32,
    pub end_line: u32,
}

impl LineRange {
    /// Number of lines spanned beyond the first.
    pub fn height(&self) -> u32 {
        self.end_line.saturating_sub(self.start_line)
    }
}

/// The structural kind of an outline symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Function,
    Method,
    Class,
    Struct,
    Enum,
    Interface,
    Field,
    Variable,
    Module,
    Other,
}

impl SymbolKind {
    /// Lowercase display name, used in intent details.
    pub fn label(&self) -> &'static str {
        match self {
            SymbolKind::Function => "function",
            SymbolKind::Method => "method",
            SymbolKind::Class => "class",
            SymbolKind::Struct => "struct",
            SymbolKind::Enum => "enum",
            SymbolKind::Interface => "interface",
            SymbolKind::Field => "field",
            SymbolKind::Variable => "variable",
            SymbolKind::Module => "module",
            SymbolKind::Other => "symbol",
        }
    }
}

/// One symbol in a file outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolNode {
    pub name: String,
    pub kind: SymbolKind,
    /// Position of the symbol's identifier, where rename and reference
    /// queries are anchored.
    pub selection: Position,
    /// Full extent of the symbol, body included.
    pub range: LineRange,
    /// Child nodes, by arena index.
    pub children: Vec<NodeId>,
}

impl SymbolNode {
    pub fn new(
        name: impl Into<String>,
        kind: SymbolKind,
        selection: Position,
        range: LineRange,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            selection,
            range,
            children: Vec::new(),
        }
    }
}

/// A per-file symbol snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolTree {
    nodes: Vec<SymbolNode>,
    parents: Vec<Option<NodeId>>,
    roots: Vec<NodeId>,
}

impl SymbolTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a top-level symbol.
    pub fn add_root(&mut self, node: SymbolNode) -> NodeId {
        let id = self.push(node, None);
        self.roots.push(id);
        id
    }

    /// Add a symbol nested under `parent`.
    pub fn add_child(&mut self, parent: NodeId, node: SymbolNode) -> NodeId {
        let id = self.push(node, Some(parent));
        self.nodes[parent].children.push(id);
        id
    }

    fn push(&mut self, node: SymbolNode, parent: Option<NodeId>) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(node);
        self.parents.push(parent);
        id
    }

    pub fn node(&self, id: NodeId) -> &SymbolNode {
        &self.nodes[id]
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every node id in the tree, in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        0..self.nodes.len()
    }

    /// Dotted path of a node through its ancestor chain, e.g. `Parent.child`.
    pub fn qualified_name(&self, id: NodeId) -> String {
        let mut segments = vec![self.nodes[id].name.as_str()];
        let mut current = id;
        while let Some(parent) = self.parents[current] {
            segments.push(self.nodes[parent].name.as_str());
            current = parent;
        }
        segments.reverse();
        segments.join(".")
    }

    /// Exact-name lookup among top-level symbols only.
    pub fn resolve_top_level(&self, name: &str) -> Option<NodeId> {
        self.roots
            .iter()
            .copied()
            .find(|&id| self.nodes[id].name == name)
    }

    /// Resolve a possibly dotted qualified name by descending one segment at
    /// a time. Non-dotted names match top-level symbols directly.
    pub fn resolve_qualified(&self, qualified: &str) -> Option<NodeId> {
        let mut segments = qualified.split('.');
        let first = segments.next()?;
        let mut current = self.resolve_top_level(first)?;
        for segment in segments {
            current = self.nodes[current]
                .children
                .iter()
                .copied()
                .find(|&child| self.nodes[child].name == segment)?;
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> SymbolTree {
        let mut tree = SymbolTree::new();
        let outer = tree.add_root(SymbolNode::new(
            "Outer",
            SymbolKind::Class,
            Position { line: 1, column: 7 },
            LineRange {
                start_line: 1,
                end_line: 20,
            },
        ));
        let inner = tree.add_child(
            outer,
            SymbolNode::new(
                "inner",
                SymbolKind::Method,
                Position { line: 3, column: 3 },
                LineRange {
                    start_line: 3,
                    end_line: 8,
                },
            ),
        );
        tree.add_child(
            inner,
            SymbolNode::new(
                "deep",
                SymbolKind::Function,
                Position { line: 5, column: 5 },
                LineRange {
                    start_line: 5,
                    end_line: 6,
                },
            ),
        );
        tree.add_root(SymbolNode::new(
            "standalone",
            SymbolKind::Function,
            Position {
                line: 22,
                column: 10,
            },
            LineRange {
                start_line: 22,
                end_line: 30,
            },
        ));
        tree
    }

    #[test]
    fn resolve_top_level_matches_exact_name() {
        let tree = sample_tree();
        assert!(tree.resolve_top_level("Outer").is_some());
        assert!(tree.resolve_top_level("standalone").is_some());
        assert!(tree.resolve_top_level("inner").is_none());
    }

    #[test]
    fn resolve_qualified_descends_nested_segments() {
        let tree = sample_tree();
        let id = tree.resolve_qualified("Outer.inner.deep").unwrap();
        assert_eq!(tree.node(id).name, "deep");
        assert_eq!(tree.node(id).selection.line, 5);
    }

    #[test]
    fn resolve_qualified_fails_on_wrong_path() {
        let tree = sample_tree();
        assert!(tree.resolve_qualified("Outer.deep").is_none());
        assert!(tree.resolve_qualified("Missing.inner").is_none());
        assert!(tree.resolve_qualified("").is_none());
    }

    #[test]
    fn qualified_name_walks_ancestor_chain() {
        let tree = sample_tree();
        let id = tree.resolve_qualified("Outer.inner.deep").unwrap();
        assert_eq!(tree.qualified_name(id), "Outer.inner.deep");

        let top = tree.resolve_top_level("standalone").unwrap();
        assert_eq!(tree.qualified_name(top), "standalone");
    }
}
