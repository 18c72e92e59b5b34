use pest::{iterators::Pair, Parser};
use pest_derive::Parser;

use super::error::{ParseError, SpanExt};
use crate::lexicon::Lexicon;
use crate::serial::{Frame, Marker, Slot};
use crate::tree::{CovertValue, Label, Tree, Word};

#[derive(Parser)]
#[grammar = "parser/grammar.pest"]
pub struct TreeParser;

impl TreeParser {
    /// Read a labeled-bracket tree, resolving overt words against the lexicon.
    pub fn parse_tree(input: &str, lexicon: &dyn Lexicon) -> Result<Tree, ParseError> {
        let mut pairs = Self::parse(Rule::tree, input)
            .map_err(|e| ParseError::from_pest(Box::new(e), input.to_string()))?;

        let tree_pair = pairs
            .next()
            .ok_or_else(|| ParseError::internal("Grammar guarantees tree exists"))?;

        let node_pair = tree_pair
            .into_inner()
            .next()
            .ok_or_else(|| ParseError::internal("Grammar guarantees tree contains node"))?;

        Self::parse_node(node_pair, input, lexicon)
    }

    fn parse_node(
        pair: Pair<'_, Rule>,
        src: &str,
        lexicon: &dyn Lexicon,
    ) -> Result<Tree, ParseError> {
        let span = pair.as_span();
        let mut inner = pair.into_inner();

        let label_pair = inner
            .next()
            .ok_or_else(|| ParseError::internal("Grammar guarantees node has label"))?;
        let label: Label = label_pair
            .as_str()
            .parse()
            .map_err(|_| ParseError::UnknownLabel {
                label: label_pair.as_str().to_string(),
                span: label_pair.as_span().to_source_span(),
                src: src.to_string(),
            })?;

        let shape_error = |reason: String| ParseError::Shape {
            label: label.to_string(),
            reason,
            span: span.to_source_span(),
            src: src.to_string(),
        };

        let rest: Vec<Pair<'_, Rule>> = inner.collect();
        let word = match rest.first().map(|p| p.as_rule()) {
            Some(Rule::word) => Some(Word::overt(rest[0].as_str(), lexicon)),
            Some(Rule::covert) => Some(Word::Covert(Self::parse_covert(rest[0].clone(), src)?)),
            _ => None,
        };

        if label.is_rose() {
            if word.is_some() {
                return Err(shape_error("a rose node cannot hold a word".to_string()));
            }
            let children = rest
                .into_iter()
                .map(|p| Self::parse_node(p, src, lexicon))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Tree::rose(label, children));
        }

        if let Some(word) = word {
            return Ok(Tree::leaf(label, word));
        }

        match rest.len() {
            0 => Ok(Tree::null(label)),
            2 => {
                let mut children = rest.into_iter();
                let (left, right) = match (children.next(), children.next()) {
                    (Some(left), Some(right)) => (left, right),
                    _ => return Err(ParseError::internal("Branch lost its children")),
                };
                Ok(Tree::branch(
                    label,
                    Self::parse_node(left, src, lexicon)?,
                    Self::parse_node(right, src, lexicon)?,
                ))
            }
            n => Err(shape_error(format!("expected 2 children, found {}", n))),
        }
    }

    fn parse_covert(pair: Pair<'_, Rule>, src: &str) -> Result<CovertValue, ParseError> {
        let value = pair
            .into_inner()
            .next()
            .ok_or_else(|| ParseError::internal("Grammar guarantees covert has a value"))?;
        value
            .as_str()
            .trim()
            .parse()
            .map_err(|_| ParseError::UnknownCovertValue {
                value: value.as_str().to_string(),
                span: value.as_span().to_source_span(),
                src: src.to_string(),
            })
    }

    /// Read a frame string such as `c c 1i`.
    pub fn parse_frame(input: &str) -> Result<Frame, ParseError> {
        let mut pairs = Self::parse(Rule::frame, input)
            .map_err(|e| ParseError::from_pest(Box::new(e), input.to_string()))?;

        let frame_pair = pairs
            .next()
            .ok_or_else(|| ParseError::internal("Grammar guarantees frame exists"))?;

        let mut slots = Vec::new();
        for slot in frame_pair.into_inner() {
            match slot.as_rule() {
                Rule::core_slot => slots.push(Slot::Core),
                Rule::serial_slot => {
                    let text = slot.as_str();
                    let pros = text
                        .chars()
                        .next()
                        .and_then(|c| c.to_digit(10))
                        .ok_or_else(|| ParseError::internal("Serial slot without a count"))?;
                    let markers = slot
                        .into_inner()
                        .map(|m| match m.as_str() {
                            "i" => Marker::I,
                            "j" => Marker::J,
                            _ => Marker::X,
                        })
                        .collect();
                    slots.push(Slot::Serial {
                        pros: pros as usize,
                        markers,
                    });
                }
                Rule::EOI => {}
                rule => {
                    return Err(ParseError::internal(format!(
                        "Unexpected frame rule: {:?}",
                        rule
                    )))
                }
            }
        }
        Ok(Frame::new(slots))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::MemoryLexicon;

    #[test]
    fn test_parse_leaf_kinds() {
        let lexicon = MemoryLexicon::default();
        let tree = TreeParser::parse_tree("[VP [V kuaı] [DP {PRO}]]", &lexicon).unwrap();
        assert_eq!(tree.label(), Label::VP);
        assert_eq!(tree.to_string(), "[VP [V kuaı] [DP {PRO}]]");

        let null = TreeParser::parse_tree("[ T ]", &lexicon).unwrap();
        assert_eq!(null, Tree::null(Label::T));
    }

    #[test]
    fn test_parse_rose() {
        let lexicon = MemoryLexicon::default();
        let tree =
            TreeParser::parse_tree("[*vP [*Serial [V du] [V rua]] [DP jí]]", &lexicon).unwrap();
        match tree {
            Tree::Rose(rose) => {
                assert_eq!(rose.label, Label::LittleVPStar);
                assert_eq!(rose.children.len(), 2);
            }
            other => panic!("expected rose, got {}", other),
        }
    }

    #[test]
    fn test_parse_errors() {
        let lexicon = MemoryLexicon::default();
        assert!(matches!(
            TreeParser::parse_tree("[XP foo]", &lexicon),
            Err(ParseError::UnknownLabel { .. })
        ));
        assert!(matches!(
            TreeParser::parse_tree("[DP {FOO}]", &lexicon),
            Err(ParseError::UnknownCovertValue { .. })
        ));
        assert!(matches!(
            TreeParser::parse_tree("[VP [V] [DP] [DP]]", &lexicon),
            Err(ParseError::Shape { .. })
        ));
        assert!(matches!(
            TreeParser::parse_tree("[VP [V]", &lexicon),
            Err(ParseError::Syntax { .. })
        ));
    }

    #[test]
    fn test_parse_frame() {
        let frame = TreeParser::parse_frame("c c 1i").unwrap();
        assert_eq!(
            frame.slots(),
            &[
                Slot::Core,
                Slot::Core,
                Slot::Serial {
                    pros: 1,
                    markers: vec![Marker::I]
                }
            ]
        );
        assert_eq!(TreeParser::parse_frame("").unwrap().arity(), 0);
        assert_eq!(TreeParser::parse_frame("a 0").unwrap().to_string(), "c 0");
        assert!(TreeParser::parse_frame("c q").is_err());
    }
}
