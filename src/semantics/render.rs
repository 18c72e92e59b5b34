//! Plain-text rendering of logical forms.
//!
//! Variables get names from an alphabet chosen by their type. Free variables
//! are named first, outermost context slot first; every binder then takes the
//! next unused name of its alphabet, with primes once an alphabet runs out.

use std::collections::HashMap;

use itertools::Itertools;

use super::expr::{Context, Expr, ExprKind, Infix};
use super::frame::free_variables;
use super::types::ExprType;

const INDIVIDUALS: &[&str] = &["a", "b", "c", "d", "x", "y", "z"];
const EVENTS: &[&str] = &["e"];
const INTERVALS: &[&str] = &["t"];
const WORLDS: &[&str] = &["w"];
const TRUTH_VALUES: &[&str] = &["p", "q", "r"];
const FUNCTIONS: &[&str] = &["P", "Q", "R", "F", "G", "H"];

fn alphabet(ty: &ExprType) -> &'static [&'static str] {
    match ty {
        ExprType::E => INDIVIDUALS,
        ExprType::V => EVENTS,
        ExprType::I => INTERVALS,
        ExprType::S => WORLDS,
        ExprType::T => TRUTH_VALUES,
        ExprType::Fn(..) => FUNCTIONS,
    }
}

#[derive(Default)]
struct Names {
    used: HashMap<&'static str, usize>,
}

impl Names {
    fn fresh(&mut self, ty: &ExprType) -> String {
        let letters = alphabet(ty);
        let key = letters[0];
        let n = self.used.entry(key).or_insert(0);
        let name = format!("{}{}", letters[*n % letters.len()], "'".repeat(*n / letters.len()));
        *n += 1;
        name
    }
}

/// Binding strength of an expression's outermost operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Level {
    Binder,
    Presupposition,
    Or,
    And,
    Relation,
    Prefix,
    Atom,
}

fn level(e: &Expr) -> Level {
    match e.kind() {
        ExprKind::Lambda { .. } | ExprKind::Quantifier { .. } => Level::Binder,
        ExprKind::Presuppose { .. } => Level::Presupposition,
        ExprKind::Infix { op: Infix::Or, .. } => Level::Or,
        ExprKind::Infix { op: Infix::And, .. } => Level::And,
        ExprKind::Infix { .. } => Level::Relation,
        ExprKind::Polarizer { .. } => Level::Prefix,
        ExprKind::Variable(_)
        | ExprKind::Verb { .. }
        | ExprKind::Apply { .. }
        | ExprKind::Constant(_) => Level::Atom,
    }
}

struct Renderer {
    names: Names,
}

impl Renderer {
    /// Render `e` with `scope` naming its context, parenthesized below `min`.
    fn render_at(&mut self, e: &Expr, scope: &[String], min: Level) -> String {
        let text = self.render(e, scope);
        if level(e) < min {
            format!("({})", text)
        } else {
            text
        }
    }

    fn binder(&mut self, e: &Expr, scope: &[String]) -> (String, Vec<String>) {
        let name = match e.bound_type() {
            Some(ty) => self.names.fresh(ty),
            None => "_".to_string(),
        };
        let inner = std::iter::once(name.clone())
            .chain(scope.iter().cloned())
            .collect();
        (name, inner)
    }

    fn render(&mut self, e: &Expr, scope: &[String]) -> String {
        match e.kind() {
            ExprKind::Variable(i) => scope.get(*i).cloned().unwrap_or_else(|| format!("#{}", i)),
            ExprKind::Constant(c) => c.symbol().to_string(),
            ExprKind::Verb {
                name,
                args,
                event,
                world,
            } => {
                let world = self.render_at(world, scope, Level::Atom);
                let event = self.render(event, scope);
                if args.is_empty() {
                    format!("{}.{}({})", name, world, event)
                } else {
                    let args: Vec<String> = args.iter().map(|a| self.render(a, scope)).collect();
                    let args: String = Itertools::intersperse(args.iter().map(String::as_str), ", ").collect();
                    format!("{}.{}({})({})", name, world, args, event)
                }
            }
            ExprKind::Apply { func, arg } => {
                let func = self.render_at(func, scope, Level::Atom);
                let arg = self.render(arg, scope);
                format!("{}({})", func, arg)
            }
            ExprKind::Lambda { body, restriction } => {
                let (name, inner) = self.binder(e, scope);
                let restriction = restriction
                    .as_deref()
                    .map(|r| format!(" : {}", self.render_at(r, &inner, Level::Or)));
                let body = self.render(body, &inner);
                format!("λ{}{}. {}", name, restriction.unwrap_or_default(), body)
            }
            ExprKind::Quantifier {
                quantifier,
                body,
                restriction,
            } => {
                let symbol = quantifier.symbol();
                let (name, inner) = self.binder(e, scope);
                let restriction = restriction
                    .as_deref()
                    .map(|r| format!(" : {}", self.render_at(r, &inner, Level::Or)));
                let body = self.render(body, &inner);
                let gap = if symbol.chars().count() == 1 { "" } else { " " };
                format!(
                    "{}{}{}{}. {}",
                    symbol,
                    gap,
                    name,
                    restriction.unwrap_or_default(),
                    body
                )
            }
            ExprKind::Presuppose {
                body,
                presupposition,
            } => {
                let body = self.render_at(body, scope, Level::Presupposition);
                let presupposition = self.render_at(presupposition, scope, Level::Or);
                format!("{} | {}", body, presupposition)
            }
            ExprKind::Infix { op, left, right } => {
                let min = match op {
                    Infix::And | Infix::Or => level(e),
                    _ => Level::Prefix,
                };
                let mut side = |child: &Expr| {
                    // ∧ inside ∧ and ∨ inside ∨ need no brackets
                    if level(child) == min && min < Level::Relation {
                        self.render(child, scope)
                    } else {
                        let floor = if min < Level::Relation {
                            Level::Relation
                        } else {
                            min
                        };
                        self.render_at(child, scope, floor)
                    }
                };
                let left = side(&**left);
                let right = side(&**right);
                if op.is_relation() {
                    format!("{}{}{}", left, op.symbol(), right)
                } else {
                    format!("{} {} {}", left, op.symbol(), right)
                }
            }
            ExprKind::Polarizer { polarizer, body } => {
                let body = self.render_at(body, scope, Level::Prefix);
                format!("{}{}", polarizer.symbol(), body)
            }
        }
    }
}

/// Names for the free variables of `e`, indexed like its context.
fn free_names(e: &Expr, names: &mut Names) -> Vec<String> {
    let context: &Context = e.context();
    let free = free_variables(e);
    let mut scope = vec![String::new(); context.len()];
    for i in (0..context.len()).rev() {
        if free.contains(&i) {
            scope[i] = names.fresh(&context[i]);
        }
    }
    scope
}

pub fn to_plain_text(e: &Expr) -> String {
    let mut names = Names::default();
    let scope = free_names(e, &mut names);
    Renderer { names }.render(e, &scope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantics::expr::{
        and, app, constant, context, infix, lambda, not, or, presuppose, quantifier, some, v,
        verb, Animacy, Constant, Quantifier,
    };

    #[test]
    fn test_free_variables_named_first() {
        let c = context(vec![ExprType::S, ExprType::I]);
        let e = some(ExprType::V, &c, |c| {
            let trace = app(constant(Constant::TemporalTrace, c), v(0, c)?)?;
            and(
                infix(Infix::Subinterval, trace, v(2, c)?)?,
                verb("kuaı", vec![], v(0, c)?, v(1, c)?)?,
            )
        })
        .unwrap();
        assert_eq!(to_plain_text(&e), "∃e. τ(e)⊆t ∧ kuaı.w(e)");
    }

    #[test]
    fn test_primes_on_reuse() {
        let c = context(vec![ExprType::V]);
        let e = some(ExprType::V, &c, |c| {
            let animate = |x| app(constant(Constant::Animacy(Animacy::Animate), c), x);
            and(animate(v(0, c)?)?, animate(v(1, c)?)?)
        })
        .unwrap();
        assert_eq!(to_plain_text(&e), "∃e'. animate(e') ∧ animate(e)");
    }

    #[test]
    fn test_brackets() {
        let c = context(vec![ExprType::T, ExprType::T, ExprType::T]);
        let p = |i| v(i, &c).unwrap();
        let mixed = and(or(p(2), p(1)).unwrap(), not(and(p(1), p(0)).unwrap()).unwrap()).unwrap();
        assert_eq!(to_plain_text(&mixed), "(p ∨ q) ∧ ¬(q ∧ r)");

        let presupposed = presuppose(and(p(2), p(1)).unwrap(), p(0)).unwrap();
        assert_eq!(to_plain_text(&presupposed), "p ∧ q | r");
    }

    #[test]
    fn test_restricted_quantifier() {
        let c = context(vec![]);
        let restriction =
            |c: &Context| app(constant(Constant::Animacy(Animacy::Animate), c), v(0, c)?);
        let e = quantifier(
            Quantifier::EverySingular,
            ExprType::E,
            &c,
            |c| lambda(ExprType::E, c, |c| crate::semantics::expr::equals(v(0, c)?, v(1, c)?)),
            Some(&restriction),
        );
        // a quantifier's body must be a truth value
        assert!(e.is_err());

        let e = quantifier(
            Quantifier::EverySingular,
            ExprType::E,
            &c,
            |c| crate::semantics::expr::equals(v(0, c)?, v(0, c)?),
            Some(&restriction),
        )
        .unwrap();
        assert_eq!(to_plain_text(&e), "∀.SING a : animate(a). a=a");
    }
}
