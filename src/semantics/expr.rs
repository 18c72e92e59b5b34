use std::fmt;
use std::sync::Arc;

use super::types::ExprType;
use crate::error::{PipelineError, Result};

/// Types of the free variables visible at a node, innermost binder first.
pub type Context = Arc<[ExprType]>;

pub fn context(types: Vec<ExprType>) -> Context {
    Arc::from(types)
}

/// The context seen under a binder of type `ty`.
pub fn bind(ty: ExprType, outer: &Context) -> Context {
    std::iter::once(ty).chain(outer.iter().cloned()).collect()
}

pub(crate) fn fmt_context(c: &Context) -> String {
    let types: Vec<String> = c.iter().map(ToString::to_string).collect();
    format!("[{}]", types.join(", "))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantifier {
    Some,
    Every,
    EverySingular,
    EveryCumulative,
    Generic,
}

impl Quantifier {
    pub fn symbol(self) -> &'static str {
        match self {
            Quantifier::Some => "∃",
            Quantifier::Every => "∀",
            Quantifier::EverySingular => "∀.SING",
            Quantifier::EveryCumulative => "∀.CUML",
            Quantifier::Generic => "GEN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Infix {
    And,
    Or,
    Equals,
    Subinterval,
    Before,
    After,
    BeforeNear,
    AfterNear,
    /// plural coordination of individuals
    Roi,
}

impl Infix {
    pub fn symbol(self) -> &'static str {
        match self {
            Infix::And => "∧",
            Infix::Or => "∨",
            Infix::Equals => "=",
            Infix::Subinterval => "⊆",
            Infix::Before => "<",
            Infix::After => ">",
            Infix::BeforeNear => "<.near",
            Infix::AfterNear => ">.near",
            Infix::Roi => "&",
        }
    }

    /// Relations print without surrounding spaces.
    pub fn is_relation(self) -> bool {
        !matches!(self, Infix::And | Infix::Or | Infix::Roi)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Polarizer {
    Not,
    Indeed,
}

impl Polarizer {
    pub fn symbol(self) -> &'static str {
        match self {
            Polarizer::Not => "¬",
            Polarizer::Indeed => "†",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Pronoun {
    Ji,
    Suq,
    Nhao,
    Suna,
    Nhana,
    Umo,
    Ime,
    Suo,
    Ama,
}

impl Pronoun {
    pub fn symbol(self) -> &'static str {
        match self {
            Pronoun::Ji => "jí",
            Pronoun::Suq => "súq",
            Pronoun::Nhao => "nháo",
            Pronoun::Suna => "súna",
            Pronoun::Nhana => "nhána",
            Pronoun::Umo => "úmo",
            Pronoun::Ime => "íme",
            Pronoun::Suo => "súo",
            Pronoun::Ama => "áma",
        }
    }
}

/// Pronominal class of a noun, as tracked by the anaphors hó, máq, hóq and tá.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Animacy {
    Animate,
    Inanimate,
    Abstract,
    /// picked up only by tá; no predicate restricts it
    Descriptive,
}

impl Animacy {
    pub fn symbol(self) -> &'static str {
        match self {
            Animacy::Animate => "animate",
            Animacy::Inanimate => "inanimate",
            Animacy::Abstract => "abstract",
            Animacy::Descriptive => "descriptive",
        }
    }

    /// The restricting predicate, if this class has one.
    pub fn predicate(self) -> Option<Constant> {
        match self {
            Animacy::Descriptive => None,
            other => Some(Constant::Animacy(other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpeechAct {
    Assert,
    Command,
    Promise,
    Permit,
    Warn,
    Wish,
}

impl SpeechAct {
    pub fn symbol(self) -> &'static str {
        match self {
            SpeechAct::Assert => "ASSERT",
            SpeechAct::Command => "COMMAND",
            SpeechAct::Promise => "PROMISE",
            SpeechAct::Permit => "PERMIT",
            SpeechAct::Warn => "WARN",
            SpeechAct::Wish => "WISH",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constant {
    Pronoun(Pronoun),
    /// thematic role: event → world → individual
    Agent,
    /// modal accessibility relations
    She,
    Ao,
    RealWorld,
    InertiaWorlds,
    TemporalTrace,
    ExpectedStart,
    ExpectedEnd,
    SpeechTime,
    SpeechAct(SpeechAct),
    Animacy(Animacy),
}

impl Constant {
    pub fn ty(self) -> ExprType {
        use ExprType::*;
        match self {
            Constant::Pronoun(_) => E,
            Constant::Agent => ExprType::func(V, ExprType::func(S, E)),
            Constant::She | Constant::Ao => ExprType::func(S, ExprType::pred(S)),
            Constant::RealWorld => S,
            Constant::InertiaWorlds => {
                ExprType::func(S, ExprType::func(S, ExprType::pred(I)))
            }
            Constant::TemporalTrace | Constant::ExpectedStart | Constant::ExpectedEnd => {
                ExprType::func(V, I)
            }
            Constant::SpeechTime => I,
            Constant::SpeechAct(_) => ExprType::pred(ExprType::pred(S)),
            Constant::Animacy(_) => ExprType::pred(E),
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Constant::Pronoun(p) => p.symbol(),
            Constant::Agent => "AGENT",
            Constant::She => "SHE",
            Constant::Ao => "AO",
            Constant::RealWorld => "w0",
            Constant::InertiaWorlds => "IW",
            Constant::TemporalTrace => "τ",
            Constant::ExpectedStart => "ExpStart",
            Constant::ExpectedEnd => "ExpEnd",
            Constant::SpeechTime => "t0",
            Constant::SpeechAct(act) => act.symbol(),
            Constant::Animacy(a) => a.symbol(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    /// de Bruijn index into the context
    Variable(usize),
    Verb {
        name: String,
        args: Vec<Expr>,
        event: Box<Expr>,
        world: Box<Expr>,
    },
    /// Binds a variable of the body's first context type.
    Lambda {
        body: Box<Expr>,
        restriction: Option<Box<Expr>>,
    },
    Apply {
        func: Box<Expr>,
        arg: Box<Expr>,
    },
    Presuppose {
        body: Box<Expr>,
        presupposition: Box<Expr>,
    },
    Quantifier {
        quantifier: Quantifier,
        body: Box<Expr>,
        restriction: Option<Box<Expr>>,
    },
    Infix {
        op: Infix,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Polarizer {
        polarizer: Polarizer,
        body: Box<Expr>,
    },
    Constant(Constant),
}

/// A typed logical expression over a de Bruijn context.
///
/// Every constructor checks types and contexts, so an `Expr` that exists is
/// well-formed: each variable index is in range and children agree on the
/// context of their parent (extended by one for binder bodies).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    context: Context,
    ty: ExprType,
    kind: ExprKind,
}

impl Expr {
    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn ty(&self) -> &ExprType {
        &self.ty
    }

    pub fn kind(&self) -> &ExprKind {
        &self.kind
    }

    /// Type of the variable bound by a lambda or quantifier.
    pub fn bound_type(&self) -> Option<&ExprType> {
        match &self.kind {
            ExprKind::Lambda { body, .. } | ExprKind::Quantifier { body, .. } => {
                body.context.first()
            }
            _ => None,
        }
    }

    /// Rebuild a lambda from a body whose context starts with the bound type.
    pub fn abstract_over(body: Expr, restriction: Option<Expr>) -> Result<Expr> {
        let (domain, outer) = split_binder(&body)?;
        if let Some(r) = &restriction {
            check_type(&r.ty, &ExprType::T, "lambda restriction")?;
            check_context(&r.context, &body.context)?;
        }
        Ok(Expr {
            context: outer,
            ty: ExprType::func(domain, body.ty.clone()),
            kind: ExprKind::Lambda {
                body: Box::new(body),
                restriction: restriction.map(Box::new),
            },
        })
    }

    /// Rebuild a quantifier from a body whose context starts with the bound type.
    pub fn quantify(
        quantifier: Quantifier,
        body: Expr,
        restriction: Option<Expr>,
    ) -> Result<Expr> {
        let (domain, outer) = split_binder(&body)?;
        if domain == ExprType::T || domain.is_function() {
            return Err(PipelineError::impossible(format!(
                "can't quantify over {}",
                domain
            )));
        }
        check_type(&body.ty, &ExprType::T, "quantifier body")?;
        if let Some(r) = &restriction {
            check_type(&r.ty, &ExprType::T, "quantifier restriction")?;
            check_context(&r.context, &body.context)?;
        }
        Ok(Expr {
            context: outer,
            ty: ExprType::T,
            kind: ExprKind::Quantifier {
                quantifier,
                body: Box::new(body),
                restriction: restriction.map(Box::new),
            },
        })
    }
}

fn split_binder(body: &Expr) -> Result<(ExprType, Context)> {
    match body.context.split_first() {
        Some((domain, outer)) => Ok((domain.clone(), Arc::from(outer))),
        None => Err(PipelineError::impossible("binder body has an empty context")),
    }
}

fn check_context(a: &Context, b: &Context) -> Result<()> {
    if a == b {
        Ok(())
    } else {
        Err(PipelineError::impossible(format!(
            "contexts {} and {} are not equal",
            fmt_context(a),
            fmt_context(b)
        )))
    }
}

fn check_type(actual: &ExprType, expected: &ExprType, what: &str) -> Result<()> {
    if actual.is_subtype_of(expected) {
        Ok(())
    } else {
        Err(PipelineError::impossible(format!(
            "{} has type {}, expected {}",
            what, actual, expected
        )))
    }
}

pub fn v(index: usize, context: &Context) -> Result<Expr> {
    let ty = context.get(index).cloned().ok_or_else(|| {
        PipelineError::impossible(format!(
            "index {} out of bounds for context {}",
            index,
            fmt_context(context)
        ))
    })?;
    Ok(Expr {
        context: context.clone(),
        ty,
        kind: ExprKind::Variable(index),
    })
}

pub fn lambda(
    domain: ExprType,
    context: &Context,
    body: impl FnOnce(&Context) -> Result<Expr>,
) -> Result<Expr> {
    let inner = bind(domain, context);
    let body = body(&inner)?;
    check_context(&body.context, &inner)?;
    Expr::abstract_over(body, None)
}

/// `λx : R(x). B(x)`
pub fn lambda_restricted(
    domain: ExprType,
    context: &Context,
    body: impl FnOnce(&Context) -> Result<Expr>,
    restriction: impl FnOnce(&Context) -> Result<Expr>,
) -> Result<Expr> {
    let inner = bind(domain, context);
    let body = body(&inner)?;
    check_context(&body.context, &inner)?;
    let restriction = restriction(&inner)?;
    Expr::abstract_over(body, Some(restriction))
}

pub fn quantifier(
    quantifier: Quantifier,
    domain: ExprType,
    context: &Context,
    body: impl FnOnce(&Context) -> Result<Expr>,
    restriction: Option<&dyn Fn(&Context) -> Result<Expr>>,
) -> Result<Expr> {
    let inner = bind(domain, context);
    let body = body(&inner)?;
    check_context(&body.context, &inner)?;
    let restriction = restriction.map(|r| r(&inner)).transpose()?;
    Expr::quantify(quantifier, body, restriction)
}

pub fn some(
    domain: ExprType,
    context: &Context,
    body: impl FnOnce(&Context) -> Result<Expr>,
) -> Result<Expr> {
    quantifier(Quantifier::Some, domain, context, body, None)
}

pub fn app(func: Expr, arg: Expr) -> Result<Expr> {
    let (domain, range) = match &func.ty {
        ExprType::Fn(domain, range) => (domain.as_ref().clone(), range.as_ref().clone()),
        other => {
            return Err(PipelineError::impossible(format!(
                "can't apply an expression of type {}",
                other
            )))
        }
    };
    check_type(&arg.ty, &domain, "argument")?;
    check_context(&func.context, &arg.context)?;
    Ok(Expr {
        context: func.context.clone(),
        ty: range,
        kind: ExprKind::Apply {
            func: Box::new(func),
            arg: Box::new(arg),
        },
    })
}

pub fn verb(name: impl Into<String>, args: Vec<Expr>, event: Expr, world: Expr) -> Result<Expr> {
    check_type(&event.ty, &ExprType::V, "verb event")?;
    check_type(&world.ty, &ExprType::S, "verb world")?;
    check_context(&event.context, &world.context)?;
    for arg in &args {
        check_context(&arg.context, &event.context)?;
    }
    Ok(Expr {
        context: event.context.clone(),
        ty: ExprType::T,
        kind: ExprKind::Verb {
            name: name.into(),
            args,
            event: Box::new(event),
            world: Box::new(world),
        },
    })
}

pub fn presuppose(body: Expr, presupposition: Expr) -> Result<Expr> {
    check_type(&presupposition.ty, &ExprType::T, "presupposition")?;
    check_context(&body.context, &presupposition.context)?;
    Ok(Expr {
        context: body.context.clone(),
        ty: body.ty.clone(),
        kind: ExprKind::Presuppose {
            body: Box::new(body),
            presupposition: Box::new(presupposition),
        },
    })
}

pub fn infix(op: Infix, left: Expr, right: Expr) -> Result<Expr> {
    check_context(&left.context, &right.context)?;
    let ty = match op {
        Infix::And | Infix::Or => {
            check_type(&left.ty, &ExprType::T, "conjunct")?;
            check_type(&right.ty, &ExprType::T, "conjunct")?;
            ExprType::T
        }
        Infix::Equals => {
            if !left.ty.is_subtype_of(&right.ty) && !right.ty.is_subtype_of(&left.ty) {
                return Err(PipelineError::impossible(format!(
                    "can't equate {} with {}",
                    left.ty, right.ty
                )));
            }
            ExprType::T
        }
        Infix::Roi => {
            check_type(&left.ty, &ExprType::E, "plural coordinand")?;
            check_type(&right.ty, &ExprType::E, "plural coordinand")?;
            ExprType::E
        }
        _ => {
            check_type(&left.ty, &ExprType::I, "time relation")?;
            check_type(&right.ty, &ExprType::I, "time relation")?;
            ExprType::T
        }
    };
    Ok(Expr {
        context: left.context.clone(),
        ty,
        kind: ExprKind::Infix {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
    })
}

pub fn and(left: Expr, right: Expr) -> Result<Expr> {
    infix(Infix::And, left, right)
}

pub fn or(left: Expr, right: Expr) -> Result<Expr> {
    infix(Infix::Or, left, right)
}

pub fn equals(left: Expr, right: Expr) -> Result<Expr> {
    infix(Infix::Equals, left, right)
}

pub fn polarizer(polarizer: Polarizer, body: Expr) -> Result<Expr> {
    check_type(&body.ty, &ExprType::T, "polarized expression")?;
    Ok(Expr {
        context: body.context.clone(),
        ty: ExprType::T,
        kind: ExprKind::Polarizer {
            polarizer,
            body: Box::new(body),
        },
    })
}

pub fn not(body: Expr) -> Result<Expr> {
    polarizer(Polarizer::Not, body)
}

pub fn indeed(body: Expr) -> Result<Expr> {
    polarizer(Polarizer::Indeed, body)
}

pub fn constant(constant: Constant, context: &Context) -> Expr {
    Expr {
        context: context.clone(),
        ty: constant.ty(),
        kind: ExprKind::Constant(constant),
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", super::render::to_plain_text(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_check_types() {
        let c = context(vec![ExprType::E, ExprType::S]);
        assert!(v(2, &c).is_err());

        let x = v(0, &c).unwrap();
        let w = v(1, &c).unwrap();
        // an individual is not an event
        assert!(verb("poq", vec![], x.clone(), w.clone()).is_err());
        assert!(app(x.clone(), w).is_err());

        let pred = lambda(ExprType::V, &c, |c| {
            let w = v(2, c)?;
            verb("kuaı", vec![], v(0, c)?, w)
        })
        .unwrap();
        assert_eq!(pred.ty(), &ExprType::pred(ExprType::V));
        assert!(app(pred, x).is_err());
    }

    #[test]
    fn test_events_are_individuals() {
        let c = context(vec![ExprType::V]);
        let animate = constant(Constant::Animacy(Animacy::Animate), &c);
        let applied = app(animate, v(0, &c).unwrap()).unwrap();
        assert_eq!(applied.ty(), &ExprType::T);
    }

    #[test]
    fn test_binder_contexts() {
        let c = context(vec![ExprType::I]);
        let e = some(ExprType::V, &c, |c| {
            let trace = app(constant(Constant::TemporalTrace, c), v(0, c)?)?;
            infix(Infix::Subinterval, trace, v(1, c)?)
        })
        .unwrap();
        assert_eq!(e.context().as_ref(), &[ExprType::I]);
        assert_eq!(e.bound_type(), Some(&ExprType::V));
    }
}
