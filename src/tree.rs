mod strict;

use std::fmt::{self, Display};
use std::str::FromStr;

use crate::lexicon::{bare, tone_of, Entry, Lexicon, Tone};

pub use strict::{NodeId, StrictArena, StrictBranch, StrictLeaf, StrictNode, StrictTree};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLabel(pub String);

macro_rules! labels {
    ($($variant:ident => $text:literal $(| $alias:literal)*),* $(,)?) => {
        /// Syntactic category of a tree node.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Label {
            $($variant),*
        }

        impl Label {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Label::$variant => $text),*
                }
            }
        }

        impl FromStr for Label {
            type Err = UnknownLabel;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text $(| $alias)* => Ok(Label::$variant),)*
                    _ => Err(UnknownLabel(s.to_string())),
                }
            }
        }
    };
}

labels! {
    SerialStar => "*Serial",
    LittleVPStar => "*𝘷P" | "*vP",
    And => "&",
    AndBar => "&'",
    AndP => "&P",
    AndQ => "&Q",
    AndQBar => "&Q'",
    AndQP => "&QP",
    Adjective => "𝘢" | "a",
    AdjectiveP => "𝘢P" | "aP",
    Adjunct => "Adjunct",
    AdjunctP => "AdjunctP",
    Asp => "Asp",
    AspP => "AspP",
    C => "C",
    Crel => "Crel",
    CP => "CP",
    CPrel => "CPrel",
    D => "D",
    DP => "DP",
    FocAdv => "FocAdv",
    FocAdvP => "FocAdvP",
    Focus => "Focus",
    FocusP => "FocusP",
    Modal => "Modal",
    ModalP => "ModalP",
    LittleN => "𝘯" | "n",
    LittleNP => "𝘯P" | "nP",
    Q => "Q",
    QP => "QP",
    SA => "SA",
    SAP => "SAP",
    Sigma => "Σ" | "Sigma",
    SigmaP => "ΣP" | "SigmaP",
    T => "T",
    TP => "TP",
    Topic => "Topic",
    TopicBar => "Topic'",
    TopicP => "TopicP",
    LittleV => "𝘷" | "v",
    LittleVBar => "𝘷'" | "v'",
    LittleVP => "𝘷P" | "vP",
    V => "V",
    VBar => "V'",
    VP => "VP",
}

impl Label {
    /// Labels of not-yet-structured constituents, which parse as rose nodes.
    pub fn is_rose(&self) -> bool {
        matches!(self, Label::SerialStar | Label::LittleVPStar)
    }

    /// Clause boundaries open a fresh binding scope.
    pub fn is_clause_boundary(&self) -> bool {
        matches!(self, Label::CP | Label::CPrel)
    }
}

impl Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Symbolic content of a word with no surface form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CovertValue {
    Null,
    Be,
    Cause,
    Pro,
    Exists,
    NotExists,
    Every,
    EverySingular,
    EveryCumulative,
    Generic,
    Exophoric,
    Endophoric,
    Demonstrative,
    Proximal,
    Distal,
    Only,
    Also,
    Even,
    And,
    Or,
    Xor,
    OrQuestion,
    But,
}

impl CovertValue {
    pub fn as_str(&self) -> &'static str {
        match self {
            CovertValue::Null => "∅",
            CovertValue::Be => "BE",
            CovertValue::Cause => "CAUSE",
            CovertValue::Pro => "PRO",
            CovertValue::Exists => "∃",
            CovertValue::NotExists => "¬∃",
            CovertValue::Every => "∀",
            CovertValue::EverySingular => "∀.SING",
            CovertValue::EveryCumulative => "∀.CUML",
            CovertValue::Generic => "GEN",
            CovertValue::Exophoric => "EXO",
            CovertValue::Endophoric => "ENDO",
            CovertValue::Demonstrative => "DEM",
            CovertValue::Proximal => "PROX",
            CovertValue::Distal => "DIST",
            CovertValue::Only => "[only]",
            CovertValue::Also => "[also]",
            CovertValue::Even => "[even]",
            CovertValue::And => "[and]",
            CovertValue::Or => "[or]",
            CovertValue::Xor => "[xor]",
            CovertValue::OrQuestion => "[or?]",
            CovertValue::But => "[but]",
        }
    }
}

impl FromStr for CovertValue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = match s {
            "∅" | "null" => CovertValue::Null,
            "BE" => CovertValue::Be,
            "CAUSE" => CovertValue::Cause,
            "PRO" => CovertValue::Pro,
            "∃" => CovertValue::Exists,
            "¬∃" => CovertValue::NotExists,
            "∀" => CovertValue::Every,
            "∀.SING" => CovertValue::EverySingular,
            "∀.CUML" => CovertValue::EveryCumulative,
            "GEN" => CovertValue::Generic,
            "EXO" => CovertValue::Exophoric,
            "ENDO" => CovertValue::Endophoric,
            "DEM" => CovertValue::Demonstrative,
            "PROX" => CovertValue::Proximal,
            "DIST" => CovertValue::Distal,
            "[only]" => CovertValue::Only,
            "[also]" => CovertValue::Also,
            "[even]" => CovertValue::Even,
            "[and]" => CovertValue::And,
            "[or]" => CovertValue::Or,
            "[xor]" => CovertValue::Xor,
            "[or?]" => CovertValue::OrQuestion,
            "[but]" => CovertValue::But,
            other => return Err(other.to_string()),
        };
        Ok(value)
    }
}

impl Display for CovertValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OvertWord {
    pub text: String,
    pub bare: String,
    pub tone: Tone,
    pub entry: Option<Entry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Word {
    Covert(CovertValue),
    Overt(OvertWord),
}

impl Word {
    /// Normalize a surface word and resolve it against the lexicon.
    pub fn overt(text: &str, lexicon: &dyn Lexicon) -> Self {
        Word::Overt(OvertWord {
            text: text.to_string(),
            bare: bare(text),
            tone: tone_of(text),
            entry: Some(lexicon.resolve(text)),
        })
    }

    pub fn is_covert(&self) -> bool {
        matches!(self, Word::Covert(_))
    }

    pub fn entry(&self) -> Option<&Entry> {
        match self {
            Word::Overt(w) => w.entry.as_ref(),
            Word::Covert(_) => None,
        }
    }

    /// Surface text; covert words have none.
    pub fn text(&self) -> &str {
        match self {
            Word::Overt(w) => &w.text,
            Word::Covert(_) => "",
        }
    }
}

/// Head movement record attached to a leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Movement {
    pub id: usize,
    /// Id of the leaf this one moved to.
    pub moved_to: Option<usize>,
    /// Pronounced content at this position after movement.
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    pub label: Label,
    pub word: Word,
    pub coindex: Option<String>,
    pub movement: Option<Movement>,
}

impl Leaf {
    pub fn text(&self) -> &str {
        self.word.text()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub label: Label,
    pub left: Box<Tree>,
    pub right: Box<Tree>,
    pub coindex: Option<String>,
}

impl Branch {
    /// Category a coordinated or focused phrase behaves as.
    pub fn effective_label(&self) -> Label {
        match self.label {
            Label::AndP => self.left.effective_label(),
            Label::FocusP => self.right.effective_label(),
            label => label,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rose {
    pub label: Label,
    pub children: Vec<Tree>,
}

/// A constituent tree as produced by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tree {
    Leaf(Leaf),
    Branch(Branch),
    Rose(Rose),
}

impl Tree {
    pub fn leaf(label: Label, word: Word) -> Self {
        Tree::Leaf(Leaf {
            label,
            word,
            coindex: None,
            movement: None,
        })
    }

    pub fn covert(label: Label, value: CovertValue) -> Self {
        Tree::leaf(label, Word::Covert(value))
    }

    /// A covert leaf with no content.
    pub fn null(label: Label) -> Self {
        Tree::covert(label, CovertValue::Null)
    }

    pub fn branch(label: Label, left: Tree, right: Tree) -> Self {
        Tree::Branch(Branch {
            label,
            left: Box::new(left),
            right: Box::new(right),
            coindex: None,
        })
    }

    pub fn rose(label: Label, children: Vec<Tree>) -> Self {
        Tree::Rose(Rose { label, children })
    }

    pub fn label(&self) -> Label {
        match self {
            Tree::Leaf(l) => l.label,
            Tree::Branch(b) => b.label,
            Tree::Rose(r) => r.label,
        }
    }

    pub fn coindex(&self) -> Option<&str> {
        match self {
            Tree::Leaf(l) => l.coindex.as_deref(),
            Tree::Branch(b) => b.coindex.as_deref(),
            Tree::Rose(_) => None,
        }
    }

    /// Set the coindex label unless one is already present; returns the label in effect.
    pub fn coindex_or_insert(&mut self, fresh: impl FnOnce() -> String) -> Option<String> {
        let slot = match self {
            Tree::Leaf(l) => &mut l.coindex,
            Tree::Branch(b) => &mut b.coindex,
            Tree::Rose(_) => return None,
        };
        Some(slot.get_or_insert_with(fresh).clone())
    }

    pub fn set_coindex(&mut self, coindex: String) {
        match self {
            Tree::Leaf(l) => l.coindex = Some(coindex),
            Tree::Branch(b) => b.coindex = Some(coindex),
            Tree::Rose(_) => {}
        }
    }

    pub fn effective_label(&self) -> Label {
        match self {
            Tree::Branch(b) => b.effective_label(),
            other => other.label(),
        }
    }

    /// Overt words of this subtree, in order.
    pub fn source(&self) -> String {
        let mut words = Vec::new();
        self.collect_words(&mut words);
        words.join(" ")
    }

    fn collect_words<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Tree::Leaf(l) => {
                if !l.word.is_covert() {
                    out.push(l.word.text());
                }
            }
            Tree::Branch(b) => {
                b.left.collect_words(out);
                b.right.collect_words(out);
            }
            Tree::Rose(r) => r.children.iter().for_each(|c| c.collect_words(out)),
        }
    }
}

pub(crate) fn fmt_word(f: &mut fmt::Formatter<'_>, word: &Word) -> fmt::Result {
    match word {
        Word::Covert(CovertValue::Null) => Ok(()),
        Word::Covert(value) => write!(f, " {{{}}}", value),
        Word::Overt(w) => write!(f, " {}", w.text),
    }
}

impl Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tree::Leaf(l) => {
                write!(f, "[{}", l.label)?;
                fmt_word(f, &l.word)?;
                write!(f, "]")
            }
            Tree::Branch(b) => write!(f, "[{} {} {}]", b.label, b.left, b.right),
            Tree::Rose(r) => {
                write!(f, "[{}", r.label)?;
                for child in &r.children {
                    write!(f, " {}", child)?;
                }
                write!(f, "]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_aliases() {
        assert_eq!("vP".parse::<Label>(), Ok(Label::LittleVP));
        assert_eq!("𝘷P".parse::<Label>(), Ok(Label::LittleVP));
        assert_eq!("*vP".parse::<Label>(), Ok(Label::LittleVPStar));
        assert_eq!("Sigma".parse::<Label>(), Ok(Label::Sigma));
        assert!("XP".parse::<Label>().is_err());
        assert_eq!(Label::LittleNP.to_string(), "𝘯P");
    }

    #[test]
    fn test_effective_label() {
        let dp = Tree::null(Label::DP);
        let focused = Tree::branch(Label::FocusP, Tree::null(Label::Focus), dp.clone());
        let coordinated = Tree::branch(
            Label::AndP,
            focused,
            Tree::branch(Label::AndBar, Tree::null(Label::And), dp),
        );
        assert_eq!(coordinated.effective_label(), Label::DP);
    }

    #[test]
    fn test_display() {
        let tree = Tree::branch(
            Label::VP,
            Tree::covert(Label::DP, CovertValue::Pro),
            Tree::null(Label::V),
        );
        assert_eq!(tree.to_string(), "[VP [DP {PRO}] [V]]");
    }
}
