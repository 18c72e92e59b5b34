use std::fmt::{self, Display};
use std::ops::Index;

use super::{fmt_word, Label, Movement, Word};

/// Index of a node in a [`StrictTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrictLeaf {
    pub label: Label,
    pub word: Word,
    /// Scope index of the binding site this leaf heads, if any.
    pub binding: Option<usize>,
    pub coindex: Option<String>,
    pub movement: Option<Movement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrictBranch {
    pub label: Label,
    pub left: NodeId,
    pub right: NodeId,
    pub binding: Option<usize>,
    pub coindex: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrictNode {
    Leaf(StrictLeaf),
    Branch(StrictBranch),
}

impl StrictNode {
    pub fn label(&self) -> Label {
        match self {
            StrictNode::Leaf(l) => l.label,
            StrictNode::Branch(b) => b.label,
        }
    }

    pub fn binding(&self) -> Option<usize> {
        match self {
            StrictNode::Leaf(l) => l.binding,
            StrictNode::Branch(b) => b.binding,
        }
    }
}

/// Append-only node store used while building a [`StrictTree`].
#[derive(Debug, Clone, Default)]
pub struct StrictArena {
    nodes: Vec<StrictNode>,
}

impl StrictArena {
    pub fn push(&mut self, node: StrictNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn leaf(&mut self, label: Label, word: Word) -> NodeId {
        self.push(StrictNode::Leaf(StrictLeaf {
            label,
            word,
            binding: None,
            coindex: None,
            movement: None,
        }))
    }

    pub fn branch(&mut self, label: Label, left: NodeId, right: NodeId) -> NodeId {
        self.push(StrictNode::Branch(StrictBranch {
            label,
            left,
            right,
            binding: None,
            coindex: None,
        }))
    }

    pub fn get(&self, id: NodeId) -> Option<&StrictNode> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut StrictNode> {
        self.nodes.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn finish(self, root: NodeId) -> StrictTree {
        StrictTree {
            nodes: self.nodes,
            root,
        }
    }
}

/// A fully binary tree with every quantifier and focus in its scope position.
///
/// Nodes live in an arena and refer to each other by [`NodeId`]; a restrictor
/// shared between a DP and the quantifier phrase that binds it is one node
/// referenced from both places.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrictTree {
    nodes: Vec<StrictNode>,
    root: NodeId,
}

impl StrictTree {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&StrictNode> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn label(&self, id: NodeId) -> Label {
        self[id].label()
    }

    pub fn children(&self, id: NodeId) -> Option<(NodeId, NodeId)> {
        match &self[id] {
            StrictNode::Branch(b) => Some((b.left, b.right)),
            StrictNode::Leaf(_) => None,
        }
    }

    pub fn effective_label(&self, id: NodeId) -> Label {
        match &self[id] {
            StrictNode::Branch(b) if b.label == Label::AndP => self.effective_label(b.left),
            StrictNode::Branch(b) if b.label == Label::FocusP => self.effective_label(b.right),
            node => node.label(),
        }
    }

    /// Nodes reachable from `id` in pre-order; shared nodes appear once per path.
    pub fn preorder(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            if let Some((left, right)) = self.children(next) {
                stack.push(right);
                stack.push(left);
            }
        }
        out
    }

    pub fn find_all(&self, label: Label) -> Vec<NodeId> {
        self.preorder(self.root)
            .into_iter()
            .filter(|id| self.label(*id) == label)
            .collect()
    }

    pub fn display(&self, id: NodeId) -> DisplayNode<'_> {
        DisplayNode { tree: self, id }
    }
}

impl Index<NodeId> for StrictTree {
    type Output = StrictNode;

    fn index(&self, id: NodeId) -> &StrictNode {
        &self.nodes[id.0]
    }
}

pub struct DisplayNode<'a> {
    tree: &'a StrictTree,
    id: NodeId,
}

impl Display for DisplayNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tree[self.id] {
            StrictNode::Leaf(l) => {
                write!(f, "[{}", l.label)?;
                fmt_word(f, &l.word)?;
                if let Some(binding) = l.binding {
                    write!(f, " @{}", binding)?;
                }
                write!(f, "]")
            }
            StrictNode::Branch(b) => write!(
                f,
                "[{} {} {}]",
                b.label,
                self.tree.display(b.left),
                self.tree.display(b.right)
            ),
        }
    }
}

impl Display for StrictTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.display(self.root).fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::CovertValue;

    #[test]
    fn test_shared_nodes() {
        let mut arena = StrictArena::default();
        let n = arena.leaf(Label::LittleNP, Word::Covert(CovertValue::Null));
        let q = arena.leaf(Label::Q, Word::Covert(CovertValue::Exists));
        let qp = arena.branch(Label::QP, q, n);
        let d = arena.leaf(Label::D, Word::Covert(CovertValue::Null));
        let dp = arena.branch(Label::DP, d, n);
        let root = arena.branch(Label::VP, qp, dp);
        let tree = arena.finish(root);

        assert_eq!(tree.len(), 6);
        assert_eq!(tree.preorder(root).len(), 7);
        assert_eq!(tree.children(qp).map(|c| c.1), tree.children(dp).map(|c| c.1));
        assert_eq!(tree.to_string(), "[VP [QP [Q {∃}] [𝘯P]] [DP [D] [𝘯P]]]");
    }
}
