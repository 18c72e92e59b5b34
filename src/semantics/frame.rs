use std::collections::BTreeSet;

use recursion::{Collapsible, CollapsibleExt, MappableFrame, PartiallyApplied};

use super::expr::{Expr, ExprKind};

/// short-lived single layer of a borrowed [`Expr`], used for expressing folds
/// over an expression without writing the traversal by hand
pub enum ExprFrame<X> {
    Variable(usize),
    Verb { args: Vec<X>, event: X, world: X },
    /// lambda or quantifier: the body sees one more variable
    Binder { body: X, restriction: Option<X> },
    Pair(X, X),
    Unary(X),
    Constant,
}

impl MappableFrame for ExprFrame<PartiallyApplied> {
    type Frame<X> = ExprFrame<X>;

    fn map_frame<A, B>(input: Self::Frame<A>, mut f: impl FnMut(A) -> B) -> Self::Frame<B> {
        use ExprFrame::*;
        match input {
            Variable(i) => Variable(i),
            Verb { args, event, world } => Verb {
                args: args.into_iter().map(&mut f).collect(),
                event: f(event),
                world: f(world),
            },
            Binder { body, restriction } => Binder {
                body: f(body),
                restriction: restriction.map(&mut f),
            },
            Pair(a, b) => Pair(f(a), f(b)),
            Unary(a) => Unary(f(a)),
            Constant => Constant,
        }
    }
}

impl<'a> Collapsible for &'a Expr {
    type FrameToken = ExprFrame<PartiallyApplied>;

    fn into_frame(self) -> ExprFrame<Self> {
        match self.kind() {
            ExprKind::Variable(i) => ExprFrame::Variable(*i),
            ExprKind::Verb {
                args, event, world, ..
            } => ExprFrame::Verb {
                args: args.iter().collect(),
                event: &**event,
                world: &**world,
            },
            ExprKind::Lambda { body, restriction }
            | ExprKind::Quantifier {
                body, restriction, ..
            } => ExprFrame::Binder {
                body: &**body,
                restriction: restriction.as_deref(),
            },
            ExprKind::Apply { func, arg } => ExprFrame::Pair(&**func, &**arg),
            ExprKind::Presuppose {
                body,
                presupposition,
            } => ExprFrame::Pair(&**body, &**presupposition),
            ExprKind::Infix { left, right, .. } => ExprFrame::Pair(&**left, &**right),
            ExprKind::Polarizer { body, .. } => ExprFrame::Unary(&**body),
            ExprKind::Constant(_) => ExprFrame::Constant,
        }
    }
}

/// Indices of the context variables an expression actually uses.
pub fn free_variables(e: &Expr) -> BTreeSet<usize> {
    e.collapse_frames(|frame: ExprFrame<BTreeSet<usize>>| match frame {
        ExprFrame::Variable(i) => BTreeSet::from([i]),
        ExprFrame::Verb {
            args,
            mut event,
            mut world,
        } => {
            for arg in args {
                event.extend(arg);
            }
            event.append(&mut world);
            event
        }
        ExprFrame::Binder { body, restriction } => body
            .into_iter()
            .chain(restriction.into_iter().flatten())
            .filter_map(|i| i.checked_sub(1))
            .collect(),
        ExprFrame::Pair(mut a, mut b) => {
            a.append(&mut b);
            a
        }
        ExprFrame::Unary(a) => a,
        ExprFrame::Constant => BTreeSet::new(),
    })
}

pub fn mentions(e: &Expr, index: usize) -> bool {
    free_variables(e).contains(&index)
}

/// Number of nodes, for logging.
pub fn size(e: &Expr) -> usize {
    e.collapse_frames(|frame| match frame {
        ExprFrame::Variable(_) | ExprFrame::Constant => 1,
        ExprFrame::Verb { args, event, world } => 1 + args.iter().sum::<usize>() + event + world,
        ExprFrame::Binder { body, restriction } => 1 + body + restriction.unwrap_or(0),
        ExprFrame::Pair(a, b) => 1 + a + b,
        ExprFrame::Unary(a) => 1 + a,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantics::expr::{app, constant, context, lambda, v, Constant};
    use crate::semantics::types::ExprType;

    #[test]
    fn test_free_variables_skip_bound() {
        let c = context(vec![ExprType::E, ExprType::V]);
        // λe. τ(e1) uses only the outer event
        let e = lambda(ExprType::V, &c, |c| {
            app(constant(Constant::TemporalTrace, c), v(2, c)?)
        })
        .unwrap();
        assert_eq!(free_variables(&e), BTreeSet::from([1]));
        assert!(!mentions(&e, 0));
        assert_eq!(size(&e), 4);
    }
}
