use std::fmt::{self, Display};

use serde::{Serialize, Serializer};

/// Semantic type of an expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExprType {
    /// individual
    E,
    /// event
    V,
    /// time interval
    I,
    /// truth value
    T,
    /// world
    S,
    Fn(Box<ExprType>, Box<ExprType>),
}

impl ExprType {
    pub fn func(domain: ExprType, range: ExprType) -> Self {
        ExprType::Fn(Box::new(domain), Box::new(range))
    }

    /// `⟨domain,t⟩`
    pub fn pred(domain: ExprType) -> Self {
        ExprType::func(domain, ExprType::T)
    }

    pub fn domain(&self) -> Option<&ExprType> {
        match self {
            ExprType::Fn(domain, _) => Some(domain),
            _ => None,
        }
    }

    pub fn range(&self) -> Option<&ExprType> {
        match self {
            ExprType::Fn(_, range) => Some(range),
            _ => None,
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(self, ExprType::Fn(..))
    }

    /// Events are individuals; functions are contravariant in their domain.
    pub fn is_subtype_of(&self, other: &ExprType) -> bool {
        match (self, other) {
            (ExprType::V, ExprType::E) => true,
            (ExprType::Fn(d1, r1), ExprType::Fn(d2, r2)) => {
                d2.is_subtype_of(d1) && r1.is_subtype_of(r2)
            }
            (a, b) => a == b,
        }
    }

    /// Types of the explicit arguments a function of this type takes, outermost first.
    pub fn arguments(&self) -> Vec<&ExprType> {
        let mut args = Vec::new();
        let mut ty = self;
        while let ExprType::Fn(domain, range) = ty {
            args.push(domain.as_ref());
            ty = range.as_ref();
        }
        args
    }
}

impl Display for ExprType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprType::E => write!(f, "e"),
            ExprType::V => write!(f, "v"),
            ExprType::I => write!(f, "i"),
            ExprType::T => write!(f, "t"),
            ExprType::S => write!(f, "s"),
            ExprType::Fn(domain, range) => write!(f, "⟨{},{}⟩", domain, range),
        }
    }
}

impl Serialize for ExprType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtyping() {
        let vt = ExprType::pred(ExprType::V);
        let et = ExprType::pred(ExprType::E);
        assert!(ExprType::V.is_subtype_of(&ExprType::E));
        assert!(!ExprType::E.is_subtype_of(&ExprType::V));
        // a predicate of individuals also applies to events
        assert!(et.is_subtype_of(&vt));
        assert!(!vt.is_subtype_of(&et));
    }

    #[test]
    fn test_display() {
        let ty = ExprType::func(ExprType::E, ExprType::pred(ExprType::V));
        assert_eq!(ty.to_string(), "⟨e,⟨v,t⟩⟩");
        assert_eq!(ty.arguments(), vec![&ExprType::E, &ExprType::V]);
    }
}
