//! Composition rules for branching nodes.

use std::fmt::{self, Display};

use super::bindings::{Binding, BindingKey, Bindings};
use super::data;
use super::expr::{app, context, presuppose, Expr};
use super::frame::mentions;
use super::operations::{
    filter_presuppositions, make_world_explicit, reduce, rewrite_context, split_presuppositions,
    unify,
};
use super::types::ExprType;
use super::Denotation;
use crate::error::{PipelineError, Result};
use crate::tree::Label;

/// How the denotations of two sisters combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// one side is semantically empty
    PassThrough,
    FunctionalApplication,
    ReverseFunctionalApplication,
    EventIdentification,
    PredicateModification,
    AdjectiveModification,
    /// a complementizer turns a clause into a proposition
    PropositionAbstraction,
    RelativeClause,
    Determiner,
    /// a scope-taking phrase binds its index in the clause it wraps
    PredicateAbstraction,
    Topic,
}

impl Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Rule::PassThrough => "pass-through",
            Rule::FunctionalApplication => "FA",
            Rule::ReverseFunctionalApplication => "reverse FA",
            Rule::EventIdentification => "event identification",
            Rule::PredicateModification => "predicate modification",
            Rule::AdjectiveModification => "adjective modification",
            Rule::PropositionAbstraction => "proposition abstraction",
            Rule::RelativeClause => "cRel",
            Rule::Determiner => "D",
            Rule::PredicateAbstraction => "predicate abstraction",
            Rule::Topic => "topic",
        };
        f.write_str(name)
    }
}

/// What a rule may look at besides the two denotations.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Site {
    pub left: Label,
    pub right: Label,
    /// binding index carried by the left child, for scope-taking phrases
    pub left_binding: Option<usize>,
}

fn accepts(func: &Expr, arg: &Expr) -> bool {
    match func.ty().domain() {
        Some(domain) => {
            arg.ty().is_subtype_of(domain)
                || (*domain == ExprType::pred(ExprType::S) && *arg.ty() == ExprType::T)
        }
        None => false,
    }
}

fn application(left: &Expr, right: &Expr) -> Result<Rule> {
    if accepts(left, right) {
        Ok(Rule::FunctionalApplication)
    } else if accepts(right, left) {
        Ok(Rule::ReverseFunctionalApplication)
    } else {
        Err(PipelineError::impossible(format!(
            "can't combine {} with {}",
            left.ty(),
            right.ty()
        )))
    }
}

/// Pick a rule from the labels of the two sisters and their types.
pub(crate) fn select_rule(site: &Site, left: &Denotation, right: &Denotation) -> Result<Rule> {
    match site.left {
        Label::C => return Ok(Rule::PropositionAbstraction),
        Label::Crel => return Ok(Rule::RelativeClause),
        Label::D => return Ok(Rule::Determiner),
        Label::QP | Label::FocAdvP | Label::AndQP => return Ok(Rule::PredicateAbstraction),
        _ => {}
    }
    let (l, r) = match (&left.expr, &right.expr) {
        (Some(l), Some(r)) => (l, r),
        _ => return Ok(Rule::PassThrough),
    };
    match (site.left, site.right) {
        (_, Label::TopicBar) => Ok(Rule::Topic),
        (_, Label::AdjectiveP) => Ok(Rule::AdjectiveModification),
        (Label::AdjunctP, _) | (_, Label::AdjunctP) => Ok(Rule::PredicateModification),
        (Label::LittleV, _)
            if *l.ty() == ExprType::func(ExprType::E, ExprType::pred(ExprType::V))
                && *r.ty() == ExprType::pred(ExprType::V) =>
        {
            Ok(Rule::EventIdentification)
        }
        (_, Label::LittleVBar | Label::VBar | Label::AndBar | Label::AndQBar | Label::SA) => {
            Ok(Rule::ReverseFunctionalApplication)
        }
        (Label::T, _) if *l.ty() == ExprType::I => Ok(Rule::ReverseFunctionalApplication),
        _ => application(l, r),
    }
}

/// Apply `func` to `arg`, giving `arg` an explicit world if `func` wants a proposition.
fn apply(func: &Denotation, arg: &Denotation, func_on_left: bool, right: Label) -> Result<Denotation> {
    let f = func.expr_or("apply")?;
    let a = arg.expr_or("apply to")?;
    let arg = if f.ty().domain() == Some(&ExprType::pred(ExprType::S)) && *a.ty() == ExprType::T {
        make_world_explicit(arg)?
    } else {
        arg.clone()
    };
    let (f, a, bindings) = if func_on_left {
        let (f, a, bindings) = unify(func, &arg, right)?;
        (f, a, bindings)
    } else {
        let (a, f, bindings) = unify(&arg, func, right)?;
        (f, a, bindings)
    };
    Ok(Denotation::new(reduce(&app(f, a)?)?, bindings))
}

/// Move slot `k` of `e`'s context to the front and bind it with a lambda.
fn abstract_slot(d: &Denotation, k: usize, drop_presuppositions: bool) -> Result<Denotation> {
    let e = d.expr_or("abstract over")?;
    let ty = e
        .context()
        .get(k)
        .cloned()
        .ok_or_else(|| PipelineError::impossible(format!("no slot {} to abstract over", k)))?;
    let inner: Vec<ExprType> = std::iter::once(ty)
        .chain(
            e.context()
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != k)
                .map(|(_, t)| t.clone()),
        )
        .collect();
    let moved = rewrite_context(e, &context(inner), &|i| {
        Ok(match i {
            i if i == k => 0,
            i if i < k => i + 1,
            i => i,
        })
    })?;
    let moved = reduce(&moved)?;
    // the binder's own restriction already says what these say
    let moved = if drop_presuppositions {
        filter_presuppositions(&moved, |p| !mentions(p, 0))?
    } else {
        moved
    };
    let bindings = d
        .bindings
        .filter_map(|b| (b.index != k).then(|| b.remap(|i| if i > k { i - 1 } else { i })));
    Ok(Denotation::new(Expr::abstract_over(moved, None)?, bindings))
}

/// `λx. e` for an `x` that `e` doesn't mention.
fn abstract_vacuously(d: &Denotation) -> Result<Denotation> {
    let e = d.expr_or("abstract over")?;
    let inner: Vec<ExprType> = std::iter::once(ExprType::E)
        .chain(e.context().iter().cloned())
        .collect();
    let moved = rewrite_context(e, &context(inner), &|i| Ok(i + 1))?;
    let bindings = d.bindings.filter_map(|b| Some(b.remap(|i| i + 1)));
    let abstracted = Denotation::new(moved, bindings);
    abstract_slot(&abstracted, 0, false)
}

fn subordinate(bindings: &Bindings) -> Bindings {
    bindings.filter_map(|b| {
        Some(Binding {
            subordinate: true,
            ..b.clone()
        })
    })
}

/// Combine two sisters by `rule`.
pub(crate) fn compose(
    rule: Rule,
    site: &Site,
    left: &Denotation,
    right: &Denotation,
) -> Result<Denotation> {
    match rule {
        Rule::PassThrough => Ok(if left.expr.is_some() {
            left.clone()
        } else {
            right.clone()
        }),
        Rule::FunctionalApplication => apply(left, right, true, site.right),
        Rule::ReverseFunctionalApplication => {
            let mut result = apply(right, left, false, site.right)?;
            if site.left == Label::T {
                result.bindings = with_interval(&result.bindings, left)?;
            }
            Ok(result)
        }
        Rule::EventIdentification => {
            let (l, r, bindings) = unify(left, right, site.right)?;
            let template = data::event_identification(l.context())?;
            let e = app(app(template, l)?, r)?;
            Ok(Denotation::new(reduce(&e)?, bindings))
        }
        Rule::PredicateModification => {
            let (l, r, bindings) = unify(left, right, site.right)?;
            // the narrower domain wins, so events stay events
            let domain = [l.ty().domain(), r.ty().domain()]
                .into_iter()
                .flatten()
                .find(|d| **d == ExprType::V)
                .or_else(|| l.ty().domain())
                .cloned()
                .ok_or_else(|| {
                    PipelineError::impossible(format!("can't modify a {}", l.ty()))
                })?;
            let template = data::predicate_modification(&domain, l.context())?;
            let e = app(app(template, l)?, r)?;
            Ok(Denotation::new(reduce(&e)?, bindings))
        }
        Rule::AdjectiveModification => {
            let (l, r, bindings) = unify(left, right, site.right)?;
            let template = data::adjective_modification(l.ty(), l.context())?;
            let e = app(app(template, l)?, r)?;
            Ok(Denotation::new(reduce(&e)?, bindings))
        }
        Rule::PropositionAbstraction => {
            let proposition = make_world_explicit(right)?;
            Ok(Denotation {
                bindings: subordinate(&proposition.bindings),
                ..proposition
            })
        }
        Rule::RelativeClause => {
            let predicate = match right.bindings.resumptive() {
                Some(resumptive) => abstract_slot(right, resumptive.index, false)?,
                None => abstract_vacuously(right)?,
            };
            let mut bindings = subordinate(&predicate.bindings);
            bindings.remove(&BindingKey::Resumptive);
            bindings.remove(&BindingKey::CovertResumptive);
            Ok(Denotation {
                bindings,
                ..predicate
            })
        }
        Rule::Determiner => {
            let mut result = apply(left, right, true, site.right)?;
            result.bindings.remove(&BindingKey::CovertResumptive);
            Ok(result)
        }
        Rule::PredicateAbstraction => {
            let index = site.left_binding.ok_or_else(|| {
                PipelineError::impossible(format!("{} without a binding index", site.left))
            })?;
            let slot = right.bindings.get(&BindingKey::Index(index)).map(|b| b.index);
            let predicate = match slot {
                Some(k) => abstract_slot(right, k, true)?,
                None => abstract_vacuously(right)?,
            };
            apply(left, &predicate, true, site.right)
        }
        Rule::Topic => {
            let (l, r, bindings) = unify(left, right, site.right)?;
            let (_, presuppositions) = split_presuppositions(&l);
            let e = presuppositions.into_iter().try_fold(r, presuppose)?;
            Ok(Denotation::new(reduce(&e)?, bindings))
        }
    }
}

/// Associate every binding with the reference time a pronominal tense introduced.
fn with_interval(bindings: &Bindings, tense: &Denotation) -> Result<Bindings> {
    let e = tense.expr_or("read the tense of")?;
    // the tense is the left sister, so its slots keep their positions
    let slot = match e.kind() {
        super::expr::ExprKind::Variable(i) => *i,
        _ => return Ok(bindings.clone()),
    };
    Ok(bindings.filter_map(|b| {
        let mut b = b.clone();
        if b.index != slot && !b.time_intervals.contains(&slot) {
            b.time_intervals.push(slot);
        }
        Some(b)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantics::expr::{constant, v, Animacy, Constant};

    fn site(left: Label, right: Label) -> Site {
        Site {
            left,
            right,
            left_binding: None,
        }
    }

    #[test]
    fn test_rule_selection() {
        let cause = Denotation::of(data::cause().unwrap());
        let vp = Denotation::of(data::verb_template("kuaı", &[]).unwrap());
        assert_eq!(
            select_rule(&site(Label::LittleV, Label::VP), &cause, &vp).unwrap(),
            Rule::EventIdentification
        );

        let tense = Denotation::of(data::reference_time().unwrap());
        let aspect = Denotation::of(data::aspect(data::Aspect::Tam).unwrap());
        assert_eq!(
            select_rule(&site(Label::T, Label::AspP), &tense, &aspect).unwrap(),
            Rule::ReverseFunctionalApplication
        );
        assert_eq!(
            select_rule(&site(Label::Asp, Label::LittleVP), &aspect, &vp).unwrap(),
            Rule::FunctionalApplication
        );
        assert_eq!(
            select_rule(&site(Label::LittleV, Label::VP), &Denotation::empty(), &vp).unwrap(),
            Rule::PassThrough
        );
        assert!(select_rule(&site(Label::VP, Label::DP), &tense, &tense).is_err());
    }

    #[test]
    fn test_relative_clause_abstracts_resumptive() {
        // poq.w(x)(e) with x the covert resumptive
        let clause = data::verb_template("poq", &[ExprType::E]).unwrap();
        let x = data::free_individual().unwrap();
        let right = apply(
            &Denotation::of(clause),
            &Denotation::new(
                x,
                Bindings::new().with(BindingKey::CovertResumptive, Binding::new(0)),
            ),
            true,
            Label::DP,
        )
        .unwrap();
        let rel = compose(
            Rule::RelativeClause,
            &site(Label::Crel, Label::VP),
            &Denotation::empty(),
            &right,
        )
        .unwrap();
        let e = rel.expr.unwrap();
        assert_eq!(e.ty().to_string(), "⟨e,⟨v,t⟩⟩");
        assert!(rel.bindings.resumptive().is_none());
        assert_eq!(e.to_string(), "λa. λe. poq.w(a)(e)");
    }

    #[test]
    fn test_predicate_abstraction_drops_restating_presuppositions() {
        // x | animate(x), bound by index 4
        let c = context(vec![ExprType::E]);
        let x = presuppose(
            v(0, &c).unwrap(),
            app(constant(Constant::Animacy(Animacy::Animate), &c), v(0, &c).unwrap()).unwrap(),
        )
        .unwrap();
        let right = Denotation::new(
            x,
            Bindings::new().with(BindingKey::Index(4), Binding::new(0)),
        );
        let abstracted = abstract_slot(&right, 0, true).unwrap();
        assert_eq!(abstracted.expr.unwrap().to_string(), "λa. a");
        assert!(abstracted.bindings.is_empty());
    }
}
