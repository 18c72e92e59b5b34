//! Compositional semantics: typed logical forms for strict trees.

pub mod bindings;
mod compose;
pub mod data;
mod denote;
pub mod expr;
pub mod frame;
pub mod operations;
pub mod render;
pub mod types;

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde_json::{json, Value};

pub use bindings::{Binding, BindingKey, Bindings};
pub use compose::Rule;
pub use denote::{denote, Composer};
pub use expr::{Context, Expr, ExprKind};
pub use types::ExprType;

use crate::error::{PipelineError, Result};
use crate::tree::{NodeId, StrictNode, StrictTree, Word};

/// Meaning of one node: a logical form (absent for semantically empty heads)
/// and the bindings that identify its free variables.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Denotation {
    pub expr: Option<Expr>,
    pub bindings: Bindings,
}

impl Denotation {
    pub fn new(expr: Expr, bindings: Bindings) -> Self {
        Denotation {
            expr: Some(expr),
            bindings,
        }
    }

    /// A denotation with no bindings.
    pub fn of(expr: Expr) -> Self {
        Denotation::new(expr, Bindings::new())
    }

    pub fn empty() -> Self {
        Denotation::default()
    }

    pub fn expr_or(&self, action: &str) -> Result<&Expr> {
        self.expr
            .as_ref()
            .ok_or_else(|| PipelineError::impossible(format!("can't {} an empty denotation", action)))
    }
}

/// A strict tree annotated with a denotation at every node.
#[derive(Debug, Clone)]
pub struct DTree {
    tree: StrictTree,
    denotations: BTreeMap<NodeId, Denotation>,
}

impl DTree {
    pub(crate) fn new(tree: StrictTree, denotations: BTreeMap<NodeId, Denotation>) -> Self {
        DTree { tree, denotations }
    }

    pub fn tree(&self) -> &StrictTree {
        &self.tree
    }

    pub fn denotation(&self, id: NodeId) -> Option<&Denotation> {
        self.denotations.get(&id)
    }

    /// Logical form of the whole sentence.
    pub fn expr(&self) -> Option<&Expr> {
        self.denotation(self.tree.root()).and_then(|d| d.expr.as_ref())
    }

    pub fn to_json(&self) -> Value {
        self.node_json(self.tree.root())
    }

    fn node_json(&self, id: NodeId) -> Value {
        let denotation = self.denotation(id);
        let expr = denotation.and_then(|d| d.expr.as_ref());
        let mut node = json!({
            "label": self.tree.label(id).as_str(),
            "denotation": expr.map(ToString::to_string),
            "type": expr.map(|e| e.ty().to_string()),
            "bindings": denotation.map(|d| &d.bindings),
        });
        match &self.tree[id] {
            StrictNode::Leaf(leaf) => {
                node["word"] = match &leaf.word {
                    Word::Covert(value) => json!({ "covert": value.as_str() }),
                    Word::Overt(word) => json!({
                        "text": word.text,
                        "bare": word.bare,
                        "gloss": word.entry.as_ref().map(|e| e.gloss.clone()),
                    }),
                };
                if let Some(binding) = leaf.binding {
                    node["binding"] = json!(binding);
                }
            }
            StrictNode::Branch(branch) => {
                node["children"] = json!([
                    self.node_json(branch.left),
                    self.node_json(branch.right)
                ]);
            }
        }
        node
    }

    fn fmt_node(&self, f: &mut fmt::Formatter<'_>, id: NodeId) -> fmt::Result {
        write!(f, "[{}", self.tree.label(id))?;
        match &self.tree[id] {
            StrictNode::Leaf(leaf) => match &leaf.word {
                Word::Overt(word) => write!(f, " {}", word.text)?,
                Word::Covert(value) => write!(f, " {{{}}}", value)?,
            },
            StrictNode::Branch(branch) => {
                write!(f, " ")?;
                self.fmt_node(f, branch.left)?;
                write!(f, " ")?;
                self.fmt_node(f, branch.right)?;
            }
        }
        if let Some(e) = self.denotation(id).and_then(|d| d.expr.as_ref()) {
            write!(f, " : {}", e)?;
        }
        write!(f, "]")
    }
}

impl Display for DTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(f, self.tree.root())
    }
}
