//! Context rewriting, β-reduction and context unification.

use super::bindings::{Binding, Bindings};
use super::expr::{
    app, bind, constant, infix, polarizer, presuppose, v, verb, Context, Expr, ExprKind,
};
use super::frame::mentions;
use super::types::ExprType;
use super::Denotation;
use crate::error::{PipelineError, Result};
use crate::tree::Label;

type VariableMap<'a> = &'a dyn Fn(usize, &Context) -> Result<Expr>;
type BodyMap<'a> = &'a dyn Fn(&Expr, &Context) -> Result<Expr>;

/// Rebuild `e` over `new_context`, replacing variables with `map_variable`
/// and binder bodies with `map_body` (which receives the extended context).
fn map_variables(
    e: &Expr,
    new_context: &Context,
    map_variable: VariableMap<'_>,
    map_body: BodyMap<'_>,
) -> Result<Expr> {
    let sub = |x: &Expr| map_variables(x, new_context, map_variable, map_body);
    let binder = |body: &Expr, restriction: Option<&Expr>| -> Result<(Expr, Option<Expr>)> {
        let domain = body
            .context()
            .first()
            .cloned()
            .ok_or_else(|| PipelineError::impossible("binder body has an empty context"))?;
        let inner = bind(domain, new_context);
        let body = map_body(body, &inner)?;
        let restriction = restriction.map(|r| map_body(r, &inner)).transpose()?;
        Ok((body, restriction))
    };

    match e.kind() {
        ExprKind::Variable(index) => map_variable(*index, new_context),
        ExprKind::Verb {
            name,
            args,
            event,
            world,
        } => verb(
            name.clone(),
            args.iter().map(|a| sub(a)).collect::<Result<Vec<_>>>()?,
            sub(event)?,
            sub(world)?,
        ),
        ExprKind::Lambda { body, restriction } => {
            let (body, restriction) = binder(body, restriction.as_deref())?;
            Expr::abstract_over(body, restriction)
        }
        ExprKind::Apply { func, arg } => app(sub(func)?, sub(arg)?),
        ExprKind::Presuppose {
            body,
            presupposition,
        } => presuppose(sub(body)?, sub(presupposition)?),
        ExprKind::Quantifier {
            quantifier,
            body,
            restriction,
        } => {
            let (body, restriction) = binder(body, restriction.as_deref())?;
            Expr::quantify(*quantifier, body, restriction)
        }
        ExprKind::Infix { op, left, right } => infix(*op, sub(left)?, sub(right)?),
        ExprKind::Polarizer { polarizer: p, body } => polarizer(*p, sub(body)?),
        ExprKind::Constant(c) => Ok(constant(*c, new_context)),
    }
}

/// Move an expression into another context, sending each free index through
/// `mapping`. This renumbers variables; it never substitutes values.
pub fn rewrite_context(
    e: &Expr,
    new_context: &Context,
    mapping: &dyn Fn(usize) -> Result<usize>,
) -> Result<Expr> {
    map_variables(
        e,
        new_context,
        &|index: usize, c: &Context| v(mapping(index)?, c),
        &|body: &Expr, c: &Context| {
            rewrite_context(body, c, &|i| match i {
                0 => Ok(0),
                i => mapping(i - 1).map(|j| j + 1),
            })
        },
    )
}

/// Replace variable `index` with `target`, whose context is the part of
/// `e.context()` after `index`. The slot disappears from the result's context.
pub fn substitute(index: usize, target: &Expr, e: &Expr) -> Result<Expr> {
    let new_context: Context = e
        .context()
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, ty)| ty.clone())
        .collect();

    map_variables(
        e,
        &new_context,
        &|i: usize, c: &Context| {
            if i == index {
                rewrite_context(target, c, &|j| Ok(j + index))
            } else if i < index {
                v(i, c)
            } else {
                v(i - 1, c)
            }
        },
        &|body: &Expr, _: &Context| substitute(index + 1, target, body),
    )
}

/// Split off the chain of presuppositions wrapping `e`, outermost last.
pub fn split_presuppositions(e: &Expr) -> (Expr, Vec<Expr>) {
    let mut presuppositions = Vec::new();
    let mut core = e;
    while let ExprKind::Presuppose {
        body,
        presupposition,
    } = core.kind()
    {
        presuppositions.push(presupposition.as_ref().clone());
        core = body;
    }
    presuppositions.reverse();
    (core.clone(), presuppositions)
}

fn attach(core: Expr, presuppositions: Vec<Expr>) -> Result<Expr> {
    presuppositions.into_iter().try_fold(core, presuppose)
}

/// Drop top-level presuppositions for which `keep` is false.
pub fn filter_presuppositions(e: &Expr, keep: impl Fn(&Expr) -> bool) -> Result<Expr> {
    let (core, presuppositions) = split_presuppositions(e);
    attach(core, presuppositions.into_iter().filter(|p| keep(p)).collect())
}

fn lift(e: &Expr, floated: &mut Vec<Expr>) -> Result<Expr> {
    let (core, presuppositions) = reduce_split(e)?;
    floated.extend(presuppositions);
    Ok(core)
}

/// Reduce the body of a binder, floating out presuppositions that don't
/// mention the bound variable.
fn lift_binder(body: &Expr, outer: &Context, floated: &mut Vec<Expr>) -> Result<Expr> {
    let (core, presuppositions) = reduce_split(body)?;
    let mut kept = Vec::new();
    for p in presuppositions {
        if mentions(&p, 0) {
            kept.push(p);
        } else {
            floated.push(rewrite_context(&p, outer, &|i| {
                i.checked_sub(1)
                    .ok_or_else(|| PipelineError::impossible("floated a bound variable"))
            })?);
        }
    }
    attach(core, kept)
}

fn reduce_split(e: &Expr) -> Result<(Expr, Vec<Expr>)> {
    let mut floated = Vec::new();
    let core = match e.kind() {
        ExprKind::Variable(_) | ExprKind::Constant(_) => e.clone(),
        ExprKind::Verb {
            name,
            args,
            event,
            world,
        } => {
            let args = args
                .iter()
                .map(|a| lift(a, &mut floated))
                .collect::<Result<Vec<_>>>()?;
            let event = lift(event, &mut floated)?;
            let world = lift(world, &mut floated)?;
            verb(name.clone(), args, event, world)?
        }
        ExprKind::Lambda { body, restriction } => {
            let body = lift_binder(body, e.context(), &mut floated)?;
            let restriction = restriction
                .as_deref()
                .map(|r| lift_binder(r, e.context(), &mut floated))
                .transpose()?;
            Expr::abstract_over(body, restriction)?
        }
        ExprKind::Quantifier {
            quantifier,
            body,
            restriction,
        } => {
            let body = lift_binder(body, e.context(), &mut floated)?;
            let restriction = restriction
                .as_deref()
                .map(|r| lift_binder(r, e.context(), &mut floated))
                .transpose()?;
            Expr::quantify(*quantifier, body, restriction)?
        }
        ExprKind::Apply { func, arg } => {
            let func = lift(func, &mut floated)?;
            let arg = lift(arg, &mut floated)?;
            match func.kind() {
                ExprKind::Lambda { body, restriction } => {
                    let mut result = substitute(0, &arg, body)?;
                    if let Some(r) = restriction {
                        result = presuppose(result, substitute(0, &arg, r)?)?;
                    }
                    lift(&result, &mut floated)?
                }
                _ => app(func, arg)?,
            }
        }
        ExprKind::Presuppose {
            body,
            presupposition,
        } => {
            let body = lift(body, &mut floated)?;
            let presupposition = lift(presupposition, &mut floated)?;
            floated.push(presupposition);
            body
        }
        ExprKind::Infix { op, left, right } => {
            let left = lift(left, &mut floated)?;
            let right = lift(right, &mut floated)?;
            infix(*op, left, right)?
        }
        ExprKind::Polarizer { polarizer: p, body } => {
            let body = lift(body, &mut floated)?;
            polarizer(*p, body)?
        }
    };

    let mut unique: Vec<Expr> = Vec::with_capacity(floated.len());
    for p in floated {
        if !unique.contains(&p) {
            unique.push(p);
        }
    }
    Ok((core, unique))
}

/// β-reduce to normal form, floating presuppositions as far out as the
/// variables they mention allow.
pub fn reduce(e: &Expr) -> Result<Expr> {
    let (core, presuppositions) = reduce_split(e)?;
    attach(core, presuppositions)
}

/// Bring two sibling denotations into one shared context.
///
/// Variables the right side shares with the left (by binding key) are mapped
/// onto the left's slots; the right's world variable joins the left's. Every
/// other right variable gets a fresh slot after the left's context. The
/// mapping is injective, so no two right variables collapse into one.
pub fn unify(
    left: &Denotation,
    right: &Denotation,
    right_label: Label,
) -> Result<(Expr, Expr, Bindings)> {
    let l = left.expr_or("unify the left of")?;
    let r = right.expr_or("unify the right of")?;

    let mut bindings = left.bindings.clone();
    let mut context: Vec<ExprType> = l.context().to_vec();
    let right_subordinate = right_label.is_clause_boundary();
    let mut mapping: Vec<Option<usize>> = vec![None; r.context().len()];
    let taken = |mapping: &[Option<usize>], slot: usize| mapping.contains(&Some(slot));

    for (key, rb) in right.bindings.iter() {
        let right_type = r.context().get(rb.index).ok_or_else(|| {
            PipelineError::impossible(format!("binding {} points outside its context", key))
        })?;
        if let Some(slot) = mapping[rb.index] {
            if left.bindings.get(key).is_none() {
                bindings.insert(
                    key.clone(),
                    Binding {
                        index: slot,
                        subordinate: right_subordinate || rb.subordinate,
                        time_intervals: Vec::new(),
                    },
                );
            }
            continue;
        }
        let shared = left.bindings.get(key).filter(|lb| {
            !taken(&mapping, lb.index)
                && context
                    .get(lb.index)
                    .map_or(false, |t| t.is_subtype_of(right_type) || right_type.is_subtype_of(t))
        });
        match shared {
            Some(lb) => {
                mapping[rb.index] = Some(lb.index);
                bindings.insert(
                    key.clone(),
                    Binding {
                        index: lb.index,
                        subordinate: lb.subordinate && rb.subordinate,
                        time_intervals: lb.time_intervals.clone(),
                    },
                );
            }
            None => {
                mapping[rb.index] = Some(context.len());
                bindings.insert(
                    key.clone(),
                    Binding {
                        index: context.len(),
                        subordinate: right_subordinate || rb.subordinate,
                        time_intervals: Vec::new(),
                    },
                );
                context.push(right_type.clone());
            }
        }
    }

    let left_world = l.context().iter().position(|t| *t == ExprType::S);
    for (i, ty) in r.context().iter().enumerate() {
        if mapping[i].is_some() {
            continue;
        }
        mapping[i] = match left_world {
            Some(world) if *ty == ExprType::S && !taken(&mapping, world) => Some(world),
            _ => {
                context.push(ty.clone());
                Some(context.len() - 1)
            }
        };
    }

    let mapping: Vec<usize> = mapping
        .into_iter()
        .map(|m| m.ok_or_else(|| PipelineError::impossible("unmapped variable")))
        .collect::<Result<_>>()?;

    // right-side interval associations follow their variables
    for (key, rb) in right.bindings.iter() {
        if let Some(b) = bindings.get(key).cloned() {
            let mut intervals = b.time_intervals;
            for i in &rb.time_intervals {
                if let Some(mapped) = mapping.get(*i) {
                    if !intervals.contains(mapped) {
                        intervals.push(*mapped);
                    }
                }
            }
            bindings.insert(
                key.clone(),
                Binding {
                    time_intervals: intervals,
                    ..b
                },
            );
        }
    }

    let context: Context = context.into();
    let lookup = |i: usize| {
        mapping
            .get(i)
            .copied()
            .ok_or_else(|| PipelineError::impossible("variable outside its context"))
    };
    Ok((
        rewrite_context(l, &context, &|i| Ok(i))?,
        rewrite_context(r, &context, &lookup)?,
        bindings,
    ))
}

/// Turn an expression with a free world variable into a function taking the
/// world as its final argument: `P` becomes `λa. … λw'. P[w/w'](a)…`.
pub fn make_world_explicit(denotation: &Denotation) -> Result<Denotation> {
    let e = denotation.expr_or("make the world explicit in")?;
    let world = e
        .context()
        .iter()
        .position(|t| *t == ExprType::S)
        .ok_or_else(|| PipelineError::impossible("no world variable to make explicit"))?;

    let arguments: Vec<ExprType> = e.ty().arguments().into_iter().cloned().collect();
    let n = arguments.len();
    let mut inner: Vec<ExprType> = vec![ExprType::S];
    inner.extend(arguments.iter().rev().cloned());
    inner.extend(
        e.context()
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != world)
            .map(|(_, t)| t.clone()),
    );
    let inner: Context = inner.into();

    let mut result = rewrite_context(e, &inner, &|i| {
        Ok(if i == world {
            0
        } else if i > world {
            i + n
        } else {
            i + 1 + n
        })
    })?;
    for i in 0..n {
        result = app(result, v(n - i, &inner)?)?;
    }
    // λw' first, then the explicit arguments from the innermost out
    for _ in 0..=n {
        result = Expr::abstract_over(result, None)?;
    }

    let bindings = denotation.bindings.filter_map(|b| {
        (b.index != world).then(|| b.remap(|i| if i > world { i - 1 } else { i }))
    });
    Ok(Denotation::new(reduce(&result)?, bindings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantics::bindings::BindingKey;
    use crate::semantics::expr::{
        and, context, equals, lambda, lambda_restricted, some, Animacy, Constant, Infix, Pronoun,
    };
    use crate::semantics::frame::free_variables;
    use std::collections::BTreeSet;

    fn animate(x: Expr) -> Result<Expr> {
        app(constant(Constant::Animacy(Animacy::Animate), x.context()), x)
    }

    #[test]
    fn test_beta_reduction() {
        // (λx. animate(x))(jí)
        let c = context(vec![]);
        let f = lambda(ExprType::E, &c, |c| animate(v(0, c)?)).unwrap();
        let ji = constant(Constant::Pronoun(Pronoun::Ji), &c);
        let reduced = reduce(&app(f, ji).unwrap()).unwrap();
        assert_eq!(reduced.to_string(), "animate(jí)");
    }

    #[test]
    fn test_restriction_becomes_presupposition() {
        // (λx : animate(x). x = x)(a) floats animate(a) to the top
        let c = context(vec![ExprType::E]);
        let f = lambda_restricted(
            ExprType::E,
            &c,
            |c| equals(v(0, c)?, v(0, c)?),
            |c| animate(v(0, c)?),
        )
        .unwrap();
        let reduced = reduce(&app(f, v(0, &c).unwrap()).unwrap()).unwrap();
        let (core, presuppositions) = split_presuppositions(&reduced);
        assert_eq!(presuppositions.len(), 1);
        assert_eq!(core.to_string(), "a=a");
        assert_eq!(presuppositions[0].to_string(), "animate(a)");
    }

    #[test]
    fn test_presupposition_stays_under_its_binder() {
        // ∃e. (τ(e) ⊆ t | animate(e)) keeps the presupposition inside
        let c = context(vec![ExprType::I]);
        let e = some(ExprType::V, &c, |c| {
            let trace = app(constant(Constant::TemporalTrace, c), v(0, c)?)?;
            let body = infix(Infix::Subinterval, trace, v(1, c)?)?;
            presuppose(body, animate(v(0, c)?)?)
        })
        .unwrap();
        let reduced = reduce(&e).unwrap();
        assert!(matches!(reduced.kind(), ExprKind::Quantifier { .. }));
        assert_eq!(reduce(&reduced).unwrap(), reduced);
    }

    #[test]
    fn test_substitute_shifts_outer_variables() {
        // in [e, i, e], substituting slot 0 with the slot-1 individual of the rest
        let c = context(vec![ExprType::E, ExprType::I, ExprType::E]);
        let body = and(animate(v(0, &c).unwrap()).unwrap(), animate(v(2, &c).unwrap()).unwrap())
            .unwrap();
        let target = v(1, &context(vec![ExprType::I, ExprType::E])).unwrap();
        let result = substitute(0, &target, &body).unwrap();
        assert_eq!(result.context().as_ref(), &[ExprType::I, ExprType::E]);
        assert_eq!(free_variables(&result), BTreeSet::from([1]));
    }

    #[test]
    fn test_unify_shares_bound_and_world_slots() {
        let left_ctx = context(vec![ExprType::S, ExprType::E]);
        let left = Denotation::new(
            animate(v(1, &left_ctx).unwrap()).unwrap(),
            Bindings::new().with(BindingKey::Animacy(Animacy::Animate), Binding::new(1)),
        );
        let right_ctx = context(vec![ExprType::E, ExprType::S, ExprType::E]);
        let right = Denotation::new(
            and(
                animate(v(0, &right_ctx).unwrap()).unwrap(),
                animate(v(2, &right_ctx).unwrap()).unwrap(),
            )
            .unwrap(),
            Bindings::new().with(BindingKey::Animacy(Animacy::Animate), Binding::new(0)),
        );
        let (l, r, bindings) = unify(&left, &right, Label::VP).unwrap();
        // slot 0 joins the left's animate variable, the world joins the left's
        // world and the unbound individual gets a fresh slot
        assert_eq!(
            r.context().as_ref(),
            &[ExprType::S, ExprType::E, ExprType::E]
        );
        assert_eq!(l.context(), r.context());
        assert_eq!(
            bindings.get(&BindingKey::Animacy(Animacy::Animate)).map(|b| b.index),
            Some(1)
        );
        assert_eq!(free_variables(&r), BTreeSet::from([1, 2]));
    }

    #[test]
    fn test_make_world_explicit() {
        // kuaı.w(e) over [v, s] becomes λw'. kuaı.w'(e) over [v]
        let c = context(vec![ExprType::V, ExprType::S]);
        let e = verb("kuaı", vec![], v(0, &c).unwrap(), v(1, &c).unwrap()).unwrap();
        let explicit = make_world_explicit(&Denotation::new(e, Bindings::new())).unwrap();
        let expr = explicit.expr.unwrap();
        assert_eq!(expr.ty(), &ExprType::pred(ExprType::S));
        assert_eq!(expr.context().as_ref(), &[ExprType::V]);
    }
}
