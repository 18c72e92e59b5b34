use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Serialize, Serializer};

use super::expr::Animacy;

/// What makes two free variables in different subtrees the same variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BindingKey {
    /// a DP whose noun is this verb
    Variable(String),
    Animacy(Animacy),
    /// binding index assigned during scope resolution
    Index(usize),
    /// explicit resumptive pronoun `hóa`
    Resumptive,
    /// placeholder subject of a relative clause or noun phrase
    CovertResumptive,
}

impl Display for BindingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingKey::Variable(verb) => write!(f, "variable:{}", verb),
            BindingKey::Animacy(animacy) => write!(f, "animacy:{}", animacy.symbol()),
            BindingKey::Index(index) => write!(f, "index:{}", index),
            BindingKey::Resumptive => write!(f, "resumptive"),
            BindingKey::CovertResumptive => write!(f, "covert_resumptive"),
        }
    }
}

/// Position of a bound variable in a denotation's context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Binding {
    pub index: usize,
    /// set once the variable has crossed a clause boundary
    pub subordinate: bool,
    pub time_intervals: Vec<usize>,
}

impl Binding {
    pub fn new(index: usize) -> Self {
        Binding {
            index,
            subordinate: false,
            time_intervals: Vec::new(),
        }
    }

    /// Move this binding and its intervals through a context rewrite.
    pub fn remap(&self, mapping: impl Fn(usize) -> usize) -> Binding {
        Binding {
            index: mapping(self.index),
            subordinate: self.subordinate,
            time_intervals: self.time_intervals.iter().map(|i| mapping(*i)).collect(),
        }
    }
}

/// Bindings visible at a node, keyed by what identifies them.
///
/// Values are never shared between nodes: every operation returns a new map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings(BTreeMap<BindingKey, Binding>);

impl Bindings {
    pub fn new() -> Self {
        Bindings::default()
    }

    pub fn with(mut self, key: BindingKey, binding: Binding) -> Self {
        self.0.insert(key, binding);
        self
    }

    pub fn get(&self, key: &BindingKey) -> Option<&Binding> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: BindingKey, binding: Binding) {
        self.0.insert(key, binding);
    }

    pub fn remove(&mut self, key: &BindingKey) -> Option<Binding> {
        self.0.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BindingKey, &Binding)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The relativized variable: an explicit `hóa` wins over the covert one.
    pub fn resumptive(&self) -> Option<&Binding> {
        self.get(&BindingKey::Resumptive)
            .or_else(|| self.get(&BindingKey::CovertResumptive))
    }

    /// Rewrite every binding, dropping those mapped to `None`.
    pub fn filter_map(&self, f: impl Fn(&Binding) -> Option<Binding>) -> Bindings {
        Bindings(
            self.0
                .iter()
                .filter_map(|(k, b)| f(b).map(|b| (k.clone(), b)))
                .collect(),
        )
    }
}

impl Serialize for Bindings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(k, b)| (k.to_string(), b)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resumptive_prefers_explicit() {
        let bindings = Bindings::new()
            .with(BindingKey::CovertResumptive, Binding::new(0))
            .with(BindingKey::Resumptive, Binding::new(2));
        assert_eq!(bindings.resumptive().map(|b| b.index), Some(2));

        let dropped = bindings.filter_map(|b| (b.index != 2).then(|| b.clone()));
        assert_eq!(dropped.resumptive().map(|b| b.index), Some(0));
        assert_eq!(dropped.len(), 1);
    }

    #[test]
    fn test_serializes_with_readable_keys() {
        let bindings = Bindings::new().with(BindingKey::Index(3), Binding::new(1));
        let json = serde_json::to_value(&bindings).unwrap();
        assert_eq!(json["index:3"]["index"], 1);
    }
}
