//! Fixed denotations of functional heads and pronouns.

use super::expr::{
    and, app, constant, context, equals, indeed, infix, lambda, lambda_restricted, not, or,
    presuppose, quantifier, some, v, verb, Animacy, Constant, Context, Expr, Infix, Pronoun,
    Quantifier, SpeechAct,
};
use super::types::ExprType::{self, E, I, S, T, V};
use crate::error::Result;

fn empty() -> Context {
    context(Vec::new())
}

fn pred(ty: ExprType) -> ExprType {
    ExprType::pred(ty)
}

/// `λx_n. … λx_1. λe. name.w(x_1, …, x_n)(e)` over a free world; the first
/// slot is bound innermost so the last one is saturated first.
pub fn verb_template(name: &str, slots: &[ExprType]) -> Result<Expr> {
    let n = slots.len();
    let mut types = vec![V];
    types.extend(slots.iter().cloned());
    types.push(S);
    let c = context(types);
    let args = (1..=n).map(|i| v(i, &c)).collect::<Result<Vec<_>>>()?;
    let mut result = verb(name, args, v(0, &c)?, v(n + 1, &c)?)?;
    for _ in 0..=n {
        result = Expr::abstract_over(result, None)?;
    }
    Ok(result)
}

pub fn pronoun(toaq: &str) -> Option<Pronoun> {
    let pronoun = match toaq {
        "jí" => Pronoun::Ji,
        "súq" => Pronoun::Suq,
        "nháo" => Pronoun::Nhao,
        "súna" => Pronoun::Suna,
        "nhána" => Pronoun::Nhana,
        "úmo" => Pronoun::Umo,
        "íme" => Pronoun::Ime,
        "súo" => Pronoun::Suo,
        "áma" => Pronoun::Ama,
        _ => return None,
    };
    Some(pronoun)
}

pub fn anaphor(toaq: &str) -> Option<Animacy> {
    let animacy = match toaq {
        "hó" => Animacy::Animate,
        "máq" => Animacy::Inanimate,
        "hóq" => Animacy::Abstract,
        "tá" => Animacy::Descriptive,
        _ => return None,
    };
    Some(animacy)
}

pub fn pronoun_constant(p: Pronoun) -> Expr {
    constant(Constant::Pronoun(p), &empty())
}

/// A free individual, restricted to its class: `x | animate(x)`.
pub fn anaphor_variable(animacy: Animacy) -> Result<Expr> {
    let c = context(vec![E]);
    let x = v(0, &c)?;
    match animacy.predicate() {
        Some(p) => presuppose(x.clone(), app(constant(p, &c), x)?),
        None => Ok(x),
    }
}

/// A free individual with no restriction, for PRO and hóa.
pub fn free_individual() -> Result<Expr> {
    v(0, &context(vec![E]))
}

/// `λP. x | P(x)`
pub fn determiner() -> Result<Expr> {
    lambda(pred(E), &context(vec![E]), |c| {
        presuppose(v(1, c)?, app(v(0, c)?, v(1, c)?)?)
    })
}

/// `λP. λx : animate(x). P(x)`, unrestricted for descriptive nouns. A noun
/// that still takes its event has it closed off: `∃e. P(x)(e)`.
pub fn little_n(animacy: Option<Animacy>, verbal: bool) -> Result<Expr> {
    let restriction = animacy.and_then(Animacy::predicate);
    let noun = if verbal {
        ExprType::func(E, pred(V))
    } else {
        pred(E)
    };
    lambda(noun, &empty(), |c| {
        let body = |c: &Context| {
            if verbal {
                some(V, c, |c| app(app(v(2, c)?, v(1, c)?)?, v(0, c)?))
            } else {
                app(v(1, c)?, v(0, c)?)
            }
        };
        match restriction {
            Some(p) => lambda_restricted(E, c, body, |c| app(constant(p, c), v(0, c)?)),
            None => lambda(E, c, body),
        }
    })
}

/// `λa. λe. AGENT(e)(w) = a`
pub fn cause() -> Result<Expr> {
    lambda(E, &context(vec![S]), |c| {
        lambda(V, c, |c| {
            let agent = app(app(constant(Constant::Agent, c), v(0, c)?)?, v(2, c)?)?;
            equals(agent, v(1, c)?)
        })
    })
}

/// `λP. λe. ∃e'. P(e)(e')`
pub fn adjunct() -> Result<Expr> {
    lambda(ExprType::func(V, pred(V)), &empty(), |c| {
        lambda(V, c, |c| some(V, c, |c| app(app(v(2, c)?, v(1, c)?)?, v(0, c)?)))
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aspect {
    Tam,
    Chum,
    Luı,
    Za,
}

impl Aspect {
    pub fn from_toaq(toaq: &str) -> Option<Self> {
        match toaq {
            "tam" => Some(Aspect::Tam),
            "chum" => Some(Aspect::Chum),
            "luı" => Some(Aspect::Luı),
            "za" => Some(Aspect::Za),
            _ => None,
        }
    }
}

/// `λP. λt. ∃e. τ(e) ⊆ t ∧ P(e)` and its relatives.
pub fn aspect(aspect: Aspect) -> Result<Expr> {
    lambda(pred(V), &empty(), |c| {
        lambda(I, c, |c| {
            some(V, c, |c| {
                let trace = app(constant(Constant::TemporalTrace, c), v(0, c)?)?;
                let t = v(1, c)?;
                let relation = match aspect {
                    Aspect::Tam => infix(Infix::Subinterval, trace, t)?,
                    Aspect::Chum => infix(Infix::Subinterval, t, trace)?,
                    Aspect::Luı => infix(Infix::Before, trace, t)?,
                    Aspect::Za => infix(Infix::After, trace, t)?,
                };
                and(relation, app(v(2, c)?, v(0, c)?)?)
            })
        })
    })
}

/// A free reference time, for a covert tense.
pub fn reference_time() -> Result<Expr> {
    v(0, &context(vec![I]))
}

pub fn speech_time() -> Expr {
    constant(Constant::SpeechTime, &empty())
}

/// `λP. ∃t. t < t0 ∧ P(t)` and its relatives; `None` means no relation.
pub fn existential_tense(relation: Option<Infix>) -> Result<Expr> {
    lambda(pred(I), &empty(), |c| {
        some(I, c, |c| {
            let applied = app(v(1, c)?, v(0, c)?)?;
            match relation {
                Some(op) => and(
                    infix(op, v(0, c)?, constant(Constant::SpeechTime, c))?,
                    applied,
                ),
                None => Ok(applied),
            }
        })
    })
}

/// `λp. ¬p` or `λp. †p`
pub fn polarity(negative: bool) -> Result<Expr> {
    lambda(T, &empty(), |c| {
        let p = v(0, c)?;
        if negative {
            not(p)
        } else {
            indeed(p)
        }
    })
}

pub fn speech_act(act: SpeechAct) -> Expr {
    constant(Constant::SpeechAct(act), &empty())
}

/// How a quantifier phrase binds its variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantifierMeaning {
    Quantifier(Quantifier),
    NoneOf,
}

/// `λP. λQ. ∃x : P(x). Q(x)`
pub fn quantifier_template(meaning: QuantifierMeaning) -> Result<Expr> {
    let (q, negated) = match meaning {
        QuantifierMeaning::Quantifier(q) => (q, false),
        QuantifierMeaning::NoneOf => (Quantifier::Some, true),
    };
    lambda(pred(E), &empty(), |c| {
        lambda(pred(E), c, |c| {
            let restriction = |c: &Context| app(v(2, c)?, v(0, c)?);
            let quantified = quantifier(
                q,
                E,
                c,
                |c| app(v(1, c)?, v(0, c)?),
                Some(&restriction),
            )?;
            if negated {
                not(quantified)
            } else {
                Ok(quantified)
            }
        })
    })
}

/// How a conjunction combines its two halves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    And,
    Or,
    /// exclusive or: `(p ∨ q) ∧ ¬(p ∧ q)`
    Xor,
}

fn connect(connective: Connective, p: Expr, q: Expr) -> Result<Expr> {
    match connective {
        Connective::And => and(p, q),
        Connective::Or => or(p, q),
        Connective::Xor => and(or(p.clone(), q.clone())?, not(and(p, q)?)?),
    }
}

/// `λq. λp. λx… p(x…) ∧ q(x…)` for any type ending in a truth value.
pub fn clausal_conjunction(connective: Connective, ty: &ExprType) -> Result<Expr> {
    let arguments: Vec<ExprType> = ty.arguments().into_iter().cloned().collect();
    let mut result = ty;
    while let ExprType::Fn(_, range) = result {
        result = range.as_ref();
    }
    if *result != T {
        return Err(crate::error::PipelineError::unimplemented(format!(
            "coordination of {}",
            ty
        )));
    }
    lambda(ty.clone(), &empty(), |c| {
        lambda(ty.clone(), c, |c| conjoin_applied(connective, &arguments, 0, c))
    })
}

fn conjoin_applied(
    connective: Connective,
    arguments: &[ExprType],
    bound: usize,
    c: &Context,
) -> Result<Expr> {
    match arguments.split_first() {
        Some((first, rest)) => lambda(first.clone(), c, |c| {
            conjoin_applied(connective, rest, bound + 1, c)
        }),
        None => {
            let saturate = |f: Expr| (0..bound).rev().try_fold(f, |f, i| app(f, v(i, c)?));
            connect(
                connective,
                saturate(v(bound, c)?)?,
                saturate(v(bound + 1, c)?)?,
            )
        }
    }
}

/// `λy. λx. z`: a coordinated DP in place stands for its bound variable.
pub fn argument_conjunction() -> Result<Expr> {
    lambda(E, &context(vec![E]), |c| lambda(E, c, |c| v(2, c)))
}

/// `λy. λx. x & y`
pub fn plural_coordination() -> Result<Expr> {
    lambda(E, &empty(), |c| lambda(E, c, |c| infix(Infix::Roi, v(0, c)?, v(1, c)?)))
}

/// `λy. λx. λP. P(x) ∧ P(y)`
pub fn conjunction_quantifier(connective: Connective) -> Result<Expr> {
    lambda(E, &empty(), |c| {
        lambda(E, c, |c| {
            lambda(pred(E), c, |c| {
                connect(
                    connective,
                    app(v(0, c)?, v(1, c)?)?,
                    app(v(0, c)?, v(2, c)?)?,
                )
            })
        })
    })
}

/// `λx. y`: a focused DP in place stands for its bound variable.
pub fn focus() -> Result<Expr> {
    lambda(E, &context(vec![E]), |c| v(1, c))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusAdverb {
    Only,
    Also,
    Even,
}

/// `λx. λP. …` for each focus adverb.
pub fn focus_adverb(adverb: FocusAdverb) -> Result<Expr> {
    lambda(E, &empty(), |c| {
        lambda(pred(E), c, |c| {
            let focused = app(v(0, c)?, v(1, c)?)?;
            match adverb {
                // P(x) ∧ ∀y. ¬P(y) ∨ y = x
                FocusAdverb::Only => {
                    let others = quantifier(
                        Quantifier::Every,
                        E,
                        c,
                        |c| or(not(app(v(1, c)?, v(0, c)?)?)?, equals(v(0, c)?, v(2, c)?)?),
                        None,
                    )?;
                    and(focused, others)
                }
                // P(x) | ∃y. ¬(y = x) ∧ P(y)
                FocusAdverb::Also => {
                    let others = some(E, c, |c| {
                        and(not(equals(v(0, c)?, v(2, c)?)?)?, app(v(1, c)?, v(0, c)?)?)
                    })?;
                    presuppose(focused, others)
                }
                FocusAdverb::Even => indeed(focused),
            }
        })
    })
}

/// `λp. λq. ∀w' : SHE(w)(w') ∧ p(w'). q(w')` and its relatives.
pub fn modal(force: Quantifier, accessibility: Constant) -> Result<Expr> {
    lambda(pred(S), &context(vec![S]), |c| {
        lambda(pred(S), c, |c| {
            let restriction = |c: &Context| {
                let accessible = app(app(constant(accessibility, c), v(3, c)?)?, v(0, c)?)?;
                and(accessible, app(v(2, c)?, v(0, c)?)?)
            };
            quantifier(force, S, c, |c| app(v(1, c)?, v(0, c)?), Some(&restriction))
        })
    })
}

/// `λP. λQ. λe. λe'. P(e)(e') ∧ Q(e')`
pub fn event_identification(c: &Context) -> Result<Expr> {
    lambda(ExprType::func(E, pred(V)), c, |c| {
        lambda(pred(V), c, |c| {
            lambda(E, c, |c| {
                lambda(V, c, |c| {
                    and(
                        app(app(v(3, c)?, v(1, c)?)?, v(0, c)?)?,
                        app(v(2, c)?, v(0, c)?)?,
                    )
                })
            })
        })
    })
}

/// `λP. λQ. λx. P(x) ∧ Q(x)`
pub fn predicate_modification(ty: &ExprType, c: &Context) -> Result<Expr> {
    lambda(pred(ty.clone()), c, |c| {
        lambda(pred(ty.clone()), c, |c| {
            lambda(ty.clone(), c, |c| {
                and(app(v(2, c)?, v(0, c)?)?, app(v(1, c)?, v(0, c)?)?)
            })
        })
    })
}

/// `λP. λA. λx… λe. P(x…)(e) ∧ A(e)`: a serial adjective describes the event.
pub fn adjective_modification(verbal: &ExprType, c: &Context) -> Result<Expr> {
    let arguments: Vec<ExprType> = verbal.arguments().into_iter().cloned().collect();
    if arguments.last() != Some(&V) {
        return Err(crate::error::PipelineError::impossible(format!(
            "adjective on a non-verbal {}",
            verbal
        )));
    }
    lambda(verbal.clone(), c, |c| {
        lambda(pred(V), c, |c| modify_event(&arguments, 0, c))
    })
}

fn modify_event(arguments: &[ExprType], bound: usize, c: &Context) -> Result<Expr> {
    match arguments.split_first() {
        Some((first, rest)) => lambda(first.clone(), c, |c| modify_event(rest, bound + 1, c)),
        None => {
            let verbal = (0..bound)
                .rev()
                .try_fold(v(bound + 1, c)?, |f, i| app(f, v(i, c)?))?;
            and(verbal, app(v(bound, c)?, v(0, c)?)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verb_template_binds_last_slot_first() {
        let e = verb_template("do", &[E, E]).unwrap();
        assert_eq!(e.ty().to_string(), "⟨e,⟨e,⟨v,t⟩⟩⟩");
        assert_eq!(e.context().as_ref(), &[S]);
        assert_eq!(e.to_string(), "λa. λb. λe. do.w(b, a)(e)");
    }

    #[test]
    fn test_templates_are_well_typed() {
        assert_eq!(cause().unwrap().ty().to_string(), "⟨e,⟨v,t⟩⟩");
        assert_eq!(aspect(Aspect::Tam).unwrap().ty().to_string(), "⟨⟨v,t⟩,⟨i,t⟩⟩");
        assert_eq!(
            quantifier_template(QuantifierMeaning::NoneOf)
                .unwrap()
                .ty()
                .to_string(),
            "⟨⟨e,t⟩,⟨⟨e,t⟩,t⟩⟩"
        );
        assert_eq!(
            clausal_conjunction(Connective::Xor, &pred(S)).unwrap().ty().to_string(),
            "⟨⟨s,t⟩,⟨⟨s,t⟩,⟨s,t⟩⟩⟩"
        );
        assert_eq!(
            focus_adverb(FocusAdverb::Only).unwrap().ty().to_string(),
            "⟨e,⟨⟨e,t⟩,t⟩⟩"
        );
        assert_eq!(
            modal(Quantifier::Every, Constant::She).unwrap().ty().to_string(),
            "⟨⟨s,t⟩,⟨⟨s,t⟩,t⟩⟩"
        );
    }

    #[test]
    fn test_adjective_modification_keeps_arguments() {
        let verbal = ExprType::func(E, pred(V));
        let e = adjective_modification(&verbal, &empty()).unwrap();
        assert_eq!(e.ty().to_string(), "⟨⟨e,⟨v,t⟩⟩,⟨⟨v,t⟩,⟨e,⟨v,t⟩⟩⟩⟩");
        assert!(adjective_modification(&pred(E), &empty()).is_err());
    }

    #[test]
    fn test_aspect_renders() {
        assert_eq!(
            aspect(Aspect::Tam).unwrap().to_string(),
            "λP. λt. ∃e. τ(e)⊆t ∧ P(e)"
        );
    }
}
