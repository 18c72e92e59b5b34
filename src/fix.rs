//! Scope resolution: turn a raw [`Tree`] into a [`StrictTree`].
//!
//! Quantified DPs, focused phrases and coordinated DPs are binding sites. Each
//! one gets a binding index and is registered in the scope of its clause; when
//! the clause is complete its core is wrapped in one phrase per site, the
//! first registered site outermost.

use slog::{debug, o, Logger};

use crate::error::{PipelineError, Result};
use crate::lexicon::{in_tone, Tone};
use crate::serial::{fix_serial, pro, SerialContext};
use crate::tree::{
    Branch, CovertValue, Label, NodeId, StrictArena, StrictBranch, StrictLeaf, StrictNode,
    StrictTree, Tree, Word,
};

pub(crate) fn quantifier(toaq: &str) -> Option<CovertValue> {
    let value = match in_tone(toaq, Tone::T2).as_str() {
        "sá" => CovertValue::Exists,
        "sía" => CovertValue::NotExists,
        "tútu" => CovertValue::Every,
        "tú" => CovertValue::EverySingular,
        "túq" => CovertValue::EveryCumulative,
        "báq" => CovertValue::Generic,
        "ké" => CovertValue::Exophoric,
        "hú" => CovertValue::Endophoric,
        "ní" => CovertValue::Demonstrative,
        "níjuı" => CovertValue::Proximal,
        "níjao" => CovertValue::Distal,
        _ => return None,
    };
    Some(value)
}

pub(crate) fn focus_adverb(toaq: &str) -> Option<CovertValue> {
    match toaq {
        "tó" => Some(CovertValue::Only),
        "máo" => Some(CovertValue::Also),
        "júaq" => Some(CovertValue::Even),
        _ => None,
    }
}

pub(crate) fn conjunction(toaq: &str) -> Option<CovertValue> {
    match toaq {
        "rú" => Some(CovertValue::And),
        "rá" => Some(CovertValue::Or),
        "ró" => Some(CovertValue::Xor),
        "rí" => Some(CovertValue::OrQuestion),
        "kéo" => Some(CovertValue::But),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SiteKind {
    Quantification,
    Focus,
    Conjunction,
}

/// A structure that must take scope at its clause edge.
#[derive(Debug, Clone, Copy)]
enum BindingSite {
    Quantification {
        quantifier: CovertValue,
        n_p: NodeId,
    },
    Focus {
        adverb: CovertValue,
        focus: NodeId,
    },
    Conjunction {
        left: NodeId,
        conjunction: CovertValue,
        right: NodeId,
    },
}

/// Binding sites of one clause, in registration order.
///
/// Indices are reserved on the way down and the sites filled in once their
/// subtrees are fixed.
#[derive(Debug, Default)]
struct Scope {
    sites: Vec<(usize, Option<BindingSite>)>,
}

impl Scope {
    fn reserve(&mut self, index: usize) -> usize {
        self.sites.push((index, None));
        self.sites.len() - 1
    }

    fn fill(&mut self, slot: usize, site: BindingSite) -> Result<()> {
        match self.sites.get_mut(slot) {
            Some((_, entry @ None)) => {
                *entry = Some(site);
                Ok(())
            }
            _ => Err(PipelineError::impossible("binding site filled twice")),
        }
    }

    /// Wrap a clause core in this scope's sites; the first site ends up outermost.
    fn wrap(self, core: NodeId, ctx: &mut ResolutionContext, logger: &Logger) -> Result<NodeId> {
        let mut tree = core;
        for (index, site) in self.sites.into_iter().rev() {
            let site = site.ok_or_else(|| PipelineError::impossible("unfilled binding site"))?;
            let arena = &mut ctx.arena;
            let left = match site {
                BindingSite::Quantification { quantifier, n_p } => {
                    let q = bound_leaf(arena, Label::Q, quantifier, index);
                    arena.branch(Label::QP, q, n_p)
                }
                BindingSite::Focus { adverb, focus } => {
                    let adv = bound_leaf(arena, Label::FocAdv, adverb, index);
                    arena.branch(Label::FocAdvP, adv, focus)
                }
                BindingSite::Conjunction {
                    left,
                    conjunction,
                    right,
                } => {
                    let and = bound_leaf(arena, Label::AndQ, conjunction, index);
                    let bar = arena.branch(Label::AndQBar, and, right);
                    arena.branch(Label::AndQP, left, bar)
                }
            };
            set_binding(arena, left, index)?;
            let label = arena
                .get(tree)
                .map(StrictNode::label)
                .ok_or_else(|| PipelineError::impossible("dangling node id"))?;
            debug!(logger, "wrapping binding site"; "index" => index, "core" => label.as_str());
            tree = arena.branch(label, left, tree);
        }
        Ok(tree)
    }
}

fn bound_leaf(arena: &mut StrictArena, label: Label, value: CovertValue, index: usize) -> NodeId {
    arena.push(StrictNode::Leaf(StrictLeaf {
        label,
        word: Word::Covert(value),
        binding: Some(index),
        coindex: None,
        movement: None,
    }))
}

fn set_binding(arena: &mut StrictArena, id: NodeId, index: usize) -> Result<()> {
    match arena.get_mut(id) {
        Some(StrictNode::Leaf(leaf)) => leaf.binding = Some(index),
        Some(StrictNode::Branch(branch)) => branch.binding = Some(index),
        None => return Err(PipelineError::impossible("dangling node id")),
    }
    Ok(())
}

/// Counters and node storage for one top-level resolution call.
#[derive(Debug, Default)]
pub struct ResolutionContext {
    arena: StrictArena,
    next_binding: usize,
    serial: SerialContext,
}

impl ResolutionContext {
    fn new_binding(&mut self) -> usize {
        let index = self.next_binding;
        self.next_binding += 1;
        index
    }
}

fn head_word(tree: &Tree) -> Option<&Word> {
    match tree {
        Tree::Leaf(leaf) => Some(&leaf.word),
        _ => None,
    }
}

/// Decide whether a branch is a binding site before its children are fixed.
fn site_kind(branch: &Branch) -> Result<Option<SiteKind>> {
    if branch.effective_label() != Label::DP {
        return Ok(None);
    }
    let kind = match branch.label {
        Label::DP => head_word(&branch.left)
            .and_then(Word::entry)
            .and_then(|e| quantifier(&e.toaq))
            .map(|_| SiteKind::Quantification),
        Label::FocusP => match head_word(&branch.left) {
            Some(Word::Covert(_)) => return Err(PipelineError::impossible("Covert Focus")),
            word => word
                .and_then(Word::entry)
                .and_then(|e| focus_adverb(&e.toaq))
                .map(|_| SiteKind::Focus),
        },
        Label::AndP => {
            let and = match branch.right.as_ref() {
                Tree::Branch(bar) => head_word(&bar.left),
                _ => return Err(PipelineError::impossible("&P without &'")),
            };
            match and {
                Some(Word::Covert(_)) => return Err(PipelineError::impossible("Covert &")),
                word => word
                    .and_then(Word::entry)
                    .and_then(|e| conjunction(&e.toaq))
                    .map(|_| SiteKind::Conjunction),
            }
        }
        _ => None,
    };
    Ok(kind)
}

fn leaf_value(arena: &StrictArena, id: NodeId) -> Option<&str> {
    match arena.get(id) {
        Some(StrictNode::Leaf(leaf)) => leaf.word.entry().map(|e| e.toaq.as_str()),
        _ => None,
    }
}

/// Build the binding site for a fixed DP, FocusP or &P and stamp its head.
fn make_site(
    kind: SiteKind,
    fixed: NodeId,
    index: usize,
    arena: &mut StrictArena,
) -> Result<BindingSite> {
    let missing = || PipelineError::impossible("binding site lost its shape");
    let (left, right) = match arena.get(fixed) {
        Some(StrictNode::Branch(b)) => (b.left, b.right),
        _ => return Err(missing()),
    };
    match kind {
        SiteKind::Quantification => {
            let quantifier = leaf_value(arena, left)
                .and_then(quantifier)
                .ok_or_else(missing)?;
            set_binding(arena, left, index)?;
            Ok(BindingSite::Quantification {
                quantifier,
                n_p: right,
            })
        }
        SiteKind::Focus => {
            let adverb = leaf_value(arena, left)
                .and_then(focus_adverb)
                .ok_or_else(missing)?;
            set_binding(arena, left, index)?;
            Ok(BindingSite::Focus {
                adverb,
                focus: right,
            })
        }
        SiteKind::Conjunction => {
            let (and, right) = match arena.get(right) {
                Some(StrictNode::Branch(b)) => (b.left, b.right),
                _ => return Err(missing()),
            };
            let conjunction = leaf_value(arena, and)
                .and_then(conjunction)
                .ok_or_else(missing)?;
            set_binding(arena, and, index)?;
            Ok(BindingSite::Conjunction {
                left,
                conjunction,
                right,
            })
        }
    }
}

/// The innermost VP on the right spine of a resolved 𝘷P.
fn extract_vp(tree: Tree) -> Result<Tree> {
    match tree {
        Tree::Branch(b) if b.label == Label::VP => Ok(Tree::Branch(b)),
        Tree::Branch(b) => extract_vp(*b.right),
        _ => Err(PipelineError::impossible("resolved serial has no VP")),
    }
}

fn fix_node(
    tree: Tree,
    ctx: &mut ResolutionContext,
    mut scope: Option<&mut Scope>,
    logger: &Logger,
) -> Result<NodeId> {
    let branch = match tree {
        Tree::Leaf(leaf) => {
            return Ok(ctx.arena.push(StrictNode::Leaf(StrictLeaf {
                label: leaf.label,
                word: leaf.word,
                binding: None,
                coindex: leaf.coindex,
                movement: leaf.movement,
            })));
        }
        Tree::Rose(rose) if rose.label == Label::LittleVPStar => {
            let mut children = rose.children.into_iter();
            let serial = children
                .next()
                .ok_or_else(|| PipelineError::impossible("*𝘷P without children"))?;
            if serial.label() != Label::SerialStar {
                return Err(PipelineError::impossible(format!(
                    "*𝘷P without *Serial, instead: {}",
                    serial.label()
                )));
            }
            let vp = fix_serial(serial, children.collect(), &mut ctx.serial)?;
            debug!(logger, "resolved serial"; "vP" => %vp);
            return fix_node(vp, ctx, scope, logger);
        }
        Tree::Rose(rose) => {
            return Err(PipelineError::impossible(format!(
                "unexpected non-binary tree: {}",
                rose.label
            )))
        }
        Tree::Branch(branch) => branch,
    };

    if branch.label == Label::VP && branch.left.label() == Label::SerialStar {
        let vp = fix_serial(*branch.left, vec![pro(), *branch.right], &mut ctx.serial)?;
        return fix_node(extract_vp(vp)?, ctx, None, logger);
    }

    // subclauses open a new scope
    if branch.label.is_clause_boundary() {
        let left = fix_node(*branch.left, ctx, scope, logger)?;
        let mut inner = Scope::default();
        let right = fix_node(*branch.right, ctx, Some(&mut inner), logger)?;
        let right = inner.wrap(right, ctx, logger)?;
        return Ok(push_branch(ctx, branch.label, left, right, branch.coindex));
    }

    // conjoined clauses get a scope each
    if branch.label == Label::AndP && branch.effective_label() != Label::DP {
        let bar = match *branch.right {
            Tree::Branch(bar) => bar,
            _ => return Err(PipelineError::impossible("&P without &'")),
        };
        let mut left_scope = Scope::default();
        let left = fix_node(*branch.left, ctx, Some(&mut left_scope), logger)?;
        let left = left_scope.wrap(left, ctx, logger)?;
        let and = fix_node(*bar.left, ctx, scope, logger)?;
        let mut right_scope = Scope::default();
        let right = fix_node(*bar.right, ctx, Some(&mut right_scope), logger)?;
        let right = right_scope.wrap(right, ctx, logger)?;
        let bar = push_branch(ctx, bar.label, and, right, bar.coindex);
        return Ok(push_branch(ctx, branch.label, left, bar, branch.coindex));
    }

    let reserved = match (scope.as_deref_mut(), site_kind(&branch)?) {
        (Some(scope), Some(kind)) => {
            let index = ctx.new_binding();
            debug!(logger, "registered binding site"; "index" => index, "kind" => ?kind);
            Some((kind, index, scope.reserve(index)))
        }
        _ => None,
    };
    let left = fix_node(*branch.left, ctx, scope.as_deref_mut(), logger)?;
    let right = fix_node(*branch.right, ctx, scope.as_deref_mut(), logger)?;
    let fixed = push_branch(ctx, branch.label, left, right, branch.coindex);

    if let (Some((kind, index, slot)), Some(scope)) = (reserved, scope) {
        let site = make_site(kind, fixed, index, &mut ctx.arena)?;
        scope.fill(slot, site)?;
    }
    Ok(fixed)
}

fn push_branch(
    ctx: &mut ResolutionContext,
    label: Label,
    left: NodeId,
    right: NodeId,
    coindex: Option<String>,
) -> NodeId {
    ctx.arena.push(StrictNode::Branch(StrictBranch {
        label,
        left,
        right,
        binding: None,
        coindex,
    }))
}

/// Resolve serials and scope, producing a strict tree with indexed binding sites.
///
/// Binding indices and coindex labels start from zero on every call.
pub fn fix(tree: Tree, logger: &Logger) -> Result<StrictTree> {
    let logger = logger.new(o!("phase" => "fix"));
    let mut ctx = ResolutionContext::default();
    let root = fix_node(tree, &mut ctx, None, &logger)?;
    debug!(logger, "fixed tree"; "nodes" => ctx.arena.len(), "bindings" => ctx.next_binding);
    Ok(ctx.arena.finish(root))
}
