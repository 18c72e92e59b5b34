use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use super::raw::Rule;

/// Error reading a bracket tree or a verb frame
#[allow(dead_code)] // Fields are used by miette's derive macros
#[derive(Debug, Clone, Diagnostic, Error)]
pub enum ParseError {
    #[error("Syntax error at line {line}, column {col}")]
    #[diagnostic(code(toaq::syntax))]
    Syntax {
        #[source_code]
        src: String,
        #[label("{expected_msg}")]
        span: SourceSpan,
        #[help]
        help: Option<String>,
        expected_msg: String,
        line: usize,
        col: usize,
    },

    #[error("Unknown label: {label}")]
    #[diagnostic(
        code(toaq::unknown_label),
        help("Labels are categories like DP, VP, 𝘷P (or vP), TP, CP, *Serial")
    )]
    UnknownLabel {
        label: String,
        #[label("unknown label")]
        span: SourceSpan,
        #[source_code]
        src: String,
    },

    #[error("Unknown covert value: {{{value}}}")]
    #[diagnostic(
        code(toaq::unknown_covert_value),
        help("Covert values include ∅, PRO, BE, CAUSE, ∃, ∀, [only], [and]")
    )]
    UnknownCovertValue {
        value: String,
        #[label("unknown covert value")]
        span: SourceSpan,
        #[source_code]
        src: String,
    },

    #[error("{label} node has the wrong shape: {reason}")]
    #[diagnostic(code(toaq::shape))]
    Shape {
        label: String,
        reason: String,
        #[label("{reason}")]
        span: SourceSpan,
        #[source_code]
        src: String,
    },

    #[error("Internal parser error: {message}")]
    #[diagnostic(code(toaq::internal))]
    Internal {
        message: String,
        #[source_code]
        src: String,
    },
}

pub trait SpanExt {
    fn to_source_span(&self) -> SourceSpan;
}

impl SpanExt for pest::Span<'_> {
    #[inline]
    fn to_source_span(&self) -> SourceSpan {
        (self.start(), self.end() - self.start()).into()
    }
}

fn rule_to_friendly_name(rule: &Rule) -> &'static str {
    match rule {
        Rule::tree => "tree",
        Rule::node => "bracketed node",
        Rule::label => "label",
        Rule::word => "word",
        Rule::covert => "covert value in braces",
        Rule::covert_value => "covert value",
        Rule::frame => "frame",
        Rule::core_slot => "core slot (c)",
        Rule::serial_slot => "serial slot (e.g. 1i)",
        Rule::marker => "coindex marker (i, j, x)",
        Rule::EOI => "end of input",
        _ => "input",
    }
}

fn generate_help_text(positives: &[Rule], found_eoi: bool) -> Option<String> {
    if positives.is_empty() {
        return None;
    }

    if positives.contains(&Rule::label) {
        return Some("Every node starts with a label, like: [DP jí]".to_string());
    }

    if positives.contains(&Rule::node) && found_eoi {
        return Some("Tree is incomplete. Check for unbalanced brackets.".to_string());
    }

    if positives.contains(&Rule::EOI) {
        return Some("Unexpected input after the tree. Check for unbalanced brackets.".to_string());
    }

    None
}

impl ParseError {
    pub fn from_pest(pest_err: Box<pest::error::Error<Rule>>, src: String) -> Self {
        use pest::error::{ErrorVariant, InputLocation};

        // miette needs a non-zero width to draw an arrow
        let span = match pest_err.location {
            InputLocation::Pos(pos) => {
                if pos >= src.len() && pos > 0 {
                    (pos - 1, 1).into()
                } else if pos < src.len() {
                    (pos, 1).into()
                } else {
                    (0, 0).into()
                }
            }
            InputLocation::Span((start, end)) => {
                let width = end.saturating_sub(start).max(1);
                (start, width).into()
            }
        };

        let (line, col) = match pest_err.line_col {
            pest::error::LineColLocation::Pos((line, col)) => (line, col),
            pest::error::LineColLocation::Span((line, col), _) => (line, col),
        };

        let (expected_msg, help) = match &pest_err.variant {
            ErrorVariant::ParsingError { positives, .. } => {
                let found_eoi = match pest_err.location {
                    InputLocation::Pos(p) => p >= src.len(),
                    InputLocation::Span((_, end)) => end >= src.len(),
                };

                let expected_msg = match positives.as_slice() {
                    [] => "Unexpected input".to_string(),
                    [only] => format!("Expected {}", rule_to_friendly_name(only)),
                    many => {
                        let names: Vec<&str> = many.iter().map(rule_to_friendly_name).collect();
                        format!("Expected one of: {}", names.join(", "))
                    }
                };

                (expected_msg, generate_help_text(positives, found_eoi))
            }
            ErrorVariant::CustomError { message } => (message.clone(), None),
        };

        ParseError::Syntax {
            src,
            span,
            help,
            expected_msg,
            line,
            col,
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ParseError::Internal {
            message: msg.into(),
            src: String::new(),
        }
    }
}
