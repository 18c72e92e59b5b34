//! Leaf denotations and the memoized walk over a strict tree.

use std::collections::BTreeMap;

use slog::{debug, o, Logger};

use super::bindings::{Binding, BindingKey, Bindings};
use super::compose::{compose, select_rule, Site};
use super::data::{self, Aspect, Connective, FocusAdverb, QuantifierMeaning};
use super::expr::{context, v, Animacy, Constant, Infix, Quantifier, SpeechAct};
use super::frame::size;
use super::types::ExprType;
use super::{DTree, Denotation};
use crate::error::{PipelineError, Result};
use crate::fix::conjunction;
use crate::lexicon::{Category, Entry, PronominalClass};
use crate::serial::{Frame, Slot};
use crate::tree::{CovertValue, Label, NodeId, StrictLeaf, StrictNode, StrictTree, Word};

fn animacy(class: PronominalClass) -> Animacy {
    match class {
        PronominalClass::Ho => Animacy::Animate,
        PronominalClass::Maq => Animacy::Inanimate,
        PronominalClass::Hoq => Animacy::Abstract,
        PronominalClass::Ta => Animacy::Descriptive,
    }
}

/// Argument types of a verb, agent excluded: 𝘷 introduces that one.
fn verb_slots(entry: &Entry) -> Result<Vec<ExprType>> {
    let frame = Frame::parse(entry.frame())?;
    let mut slots: Vec<ExprType> = frame
        .slots()
        .iter()
        .map(|slot| match slot {
            Slot::Core => ExprType::E,
            Slot::Serial { .. } => ExprType::pred(ExprType::V),
        })
        .collect();
    if entry.is_agentive() && !slots.is_empty() {
        slots.remove(0);
    }
    Ok(slots)
}

/// The verb heading a noun phrase, without looking inside its arguments.
fn verb_word(tree: &StrictTree, id: NodeId) -> Option<&Entry> {
    match &tree[id] {
        StrictNode::Leaf(leaf) if matches!(leaf.label, Label::V | Label::VP) => leaf.word.entry(),
        StrictNode::Leaf(_) => None,
        StrictNode::Branch(b) if b.label == Label::DP => None,
        StrictNode::Branch(b) => verb_word(tree, b.left).or_else(|| verb_word(tree, b.right)),
    }
}

fn entry_of<'a>(leaf: &'a StrictLeaf) -> Result<&'a Entry> {
    leaf.word.entry().ok_or_else(|| {
        PipelineError::impossible(format!("overt {} without a lexical entry", leaf.label))
    })
}

fn unrecognized(leaf: &StrictLeaf) -> PipelineError {
    let word = match &leaf.word {
        Word::Covert(value) => value.as_str().to_string(),
        Word::Overt(w) => w.text.clone(),
    };
    PipelineError::unrecognized(format!("{}: {}", leaf.label, word))
}

fn bound_at_zero(key: BindingKey) -> Bindings {
    Bindings::new().with(key, Binding::new(0))
}

/// Memoized denotation of every node of one tree.
///
/// Nodes shared between a DP and the phrase that binds it are composed once.
pub struct Composer<'t> {
    tree: &'t StrictTree,
    cache: BTreeMap<NodeId, Denotation>,
    logger: Logger,
}

impl<'t> Composer<'t> {
    pub fn new(tree: &'t StrictTree, logger: &Logger) -> Self {
        Composer {
            tree,
            cache: BTreeMap::new(),
            logger: logger.clone(),
        }
    }

    /// Denotation of `id`; `c_command` is its sister, which some leaves read
    /// to pick their meaning.
    pub fn denote_node(&mut self, id: NodeId, c_command: Option<NodeId>) -> Result<Denotation> {
        let tree = self.tree;
        if let Some(cached) = self.cache.get(&id) {
            debug!(self.logger, "cache hit"; "node" => id.index(), "label" => tree.label(id).as_str());
            return Ok(cached.clone());
        }
        let denotation = match &tree[id] {
            StrictNode::Leaf(leaf) => self.denote_leaf(id, leaf, c_command)?,
            StrictNode::Branch(branch) => {
                let left = self.denote_node(branch.left, Some(branch.right))?;
                let right = self.denote_node(branch.right, Some(branch.left))?;
                let site = Site {
                    left: tree.label(branch.left),
                    right: tree.label(branch.right),
                    left_binding: tree[branch.left].binding(),
                };
                let rule = select_rule(&site, &left, &right)?;
                let logger = self.logger.new(o!("node" => id.index(), "label" => branch.label.as_str()));
                debug!(logger, "composing"; "rule" => %rule, "left" => site.left.as_str(), "right" => site.right.as_str());
                let composed = compose(rule, &site, &left, &right)?;
                if let Some(e) = &composed.expr {
                    debug!(logger, "composed"; "type" => %e.ty(), "size" => size(e), "bindings" => composed.bindings.len());
                }
                composed
            }
        };
        self.cache.insert(id, denotation.clone());
        Ok(denotation)
    }

    /// Type of the sister of `id`. The sister is denoted in its own position,
    /// with `id` as its c-commander, so the cached entry is the one the walk
    /// itself would produce.
    fn sister_type(&mut self, id: NodeId, c_command: Option<NodeId>, of: Label) -> Result<ExprType> {
        let sister = c_command
            .ok_or_else(|| PipelineError::impossible(format!("{} without a sister", of)))?;
        let d = self.denote_node(sister, Some(id))?;
        Ok(d.expr_or("read the type of")?.ty().clone())
    }

    fn denote_leaf(
        &mut self,
        id: NodeId,
        leaf: &StrictLeaf,
        c_command: Option<NodeId>,
    ) -> Result<Denotation> {
        let tree = self.tree;
        let d = match leaf.label {
            Label::V | Label::VP => match &leaf.word {
                // covert raı after a determiner
                Word::Covert(_) => Denotation::of(data::verb_template("raı", &[ExprType::E])?),
                Word::Overt(_) => {
                    let entry = entry_of(leaf)?;
                    match entry.category {
                        Category::Predicate => {
                            Denotation::of(data::verb_template(&entry.toaq, &verb_slots(entry)?)?)
                        }
                        Category::Predicatizer => {
                            return Err(PipelineError::unimplemented(format!(
                                "predicatizer {}",
                                entry.toaq
                            )))
                        }
                        _ => return Err(unrecognized(leaf)),
                    }
                }
            },
            Label::DP => self.denote_pronoun(id, leaf, c_command)?,
            Label::LittleV => match leaf.word {
                Word::Covert(CovertValue::Cause) => Denotation::of(data::cause()?),
                Word::Covert(CovertValue::Be) | Word::Covert(CovertValue::Null) => {
                    Denotation::empty()
                }
                _ => return Err(unrecognized(leaf)),
            },
            Label::Asp => {
                let aspect = match &leaf.word {
                    Word::Covert(_) => Some(Aspect::Tam),
                    Word::Overt(_) => Aspect::from_toaq(&entry_of(leaf)?.toaq),
                };
                Denotation::of(data::aspect(aspect.ok_or_else(|| unrecognized(leaf))?)?)
            }
            Label::T => {
                let toaq = match &leaf.word {
                    Word::Covert(_) => return Ok(Denotation::of(data::reference_time()?)),
                    Word::Overt(_) => entry_of(leaf)?.toaq.as_str(),
                };
                let relation = match toaq {
                    "naı" => return Ok(Denotation::of(data::speech_time())),
                    "pu" => Some(Infix::Before),
                    "jıa" => Some(Infix::After),
                    "pujuı" => Some(Infix::BeforeNear),
                    "jıajuı" => Some(Infix::AfterNear),
                    "sula" => None,
                    _ => return Err(unrecognized(leaf)),
                };
                Denotation::of(data::existential_tense(relation)?)
            }
            Label::Sigma => match &leaf.word {
                Word::Covert(_) => Denotation::empty(),
                Word::Overt(_) => match entry_of(leaf)?.toaq.as_str() {
                    "bu" => Denotation::of(data::polarity(true)?),
                    "jeo" => Denotation::of(data::polarity(false)?),
                    "mä" => return Err(PipelineError::unimplemented("polar question mä")),
                    _ => return Err(unrecognized(leaf)),
                },
            },
            Label::SA => {
                let act = match &leaf.word {
                    Word::Covert(_) => SpeechAct::Assert,
                    Word::Overt(_) => match entry_of(leaf)?.toaq.as_str() {
                        "da" => SpeechAct::Assert,
                        "ba" => SpeechAct::Command,
                        "ka" => SpeechAct::Promise,
                        "nha" => SpeechAct::Permit,
                        "doa" => SpeechAct::Warn,
                        "ꝡo" => SpeechAct::Wish,
                        "móq" => return Err(PipelineError::unimplemented("question móq")),
                        _ => return Err(unrecognized(leaf)),
                    },
                };
                Denotation::of(data::speech_act(act))
            }
            Label::C => {
                if let Word::Overt(_) = leaf.word {
                    if entry_of(leaf)?.category != Category::Complementizer {
                        return Err(unrecognized(leaf));
                    }
                }
                Denotation::empty()
            }
            Label::Crel | Label::Adjective | Label::Topic => Denotation::empty(),
            Label::Modal => {
                let (force, accessibility) = match entry_of(leaf)?.toaq.as_str() {
                    "shê" => (Quantifier::Every, Constant::She),
                    "âo" => (Quantifier::Every, Constant::Ao),
                    "dâı" => (Quantifier::Some, Constant::She),
                    _ => return Err(unrecognized(leaf)),
                };
                Denotation::of(data::modal(force, accessibility)?)
            }
            Label::D => {
                let noun = c_command.and_then(|n| verb_word(tree, n));
                let mut bindings = Bindings::new();
                if let Some(index) = leaf.binding {
                    bindings.insert(BindingKey::Index(index), Binding::new(0));
                }
                if let Some(noun) = noun {
                    bindings.insert(BindingKey::Variable(noun.toaq.clone()), Binding::new(0));
                    if let Some(class) = noun.pronominal_class {
                        bindings.insert(BindingKey::Animacy(animacy(class)), Binding::new(0));
                    }
                }
                Denotation::new(data::determiner()?, bindings)
            }
            Label::LittleN => {
                let class = c_command
                    .and_then(|n| verb_word(tree, n))
                    .and_then(|e| e.pronominal_class)
                    .map(animacy);
                let verbal = self.sister_type(id, c_command, leaf.label)?
                    == ExprType::func(ExprType::E, ExprType::pred(ExprType::V));
                Denotation::of(data::little_n(class, verbal)?)
            }
            Label::Q => {
                let meaning = match leaf.word {
                    Word::Covert(CovertValue::Exists) | Word::Covert(CovertValue::Exophoric) => {
                        QuantifierMeaning::Quantifier(Quantifier::Some)
                    }
                    Word::Covert(CovertValue::NotExists) => QuantifierMeaning::NoneOf,
                    Word::Covert(CovertValue::Every) => {
                        QuantifierMeaning::Quantifier(Quantifier::Every)
                    }
                    Word::Covert(CovertValue::EverySingular) => {
                        QuantifierMeaning::Quantifier(Quantifier::EverySingular)
                    }
                    Word::Covert(CovertValue::EveryCumulative) => {
                        QuantifierMeaning::Quantifier(Quantifier::EveryCumulative)
                    }
                    Word::Covert(CovertValue::Generic) => {
                        QuantifierMeaning::Quantifier(Quantifier::Generic)
                    }
                    Word::Covert(
                        value @ (CovertValue::Endophoric
                        | CovertValue::Demonstrative
                        | CovertValue::Proximal
                        | CovertValue::Distal),
                    ) => {
                        return Err(PipelineError::unimplemented(format!(
                            "quantifier {}",
                            value
                        )))
                    }
                    _ => return Err(unrecognized(leaf)),
                };
                Denotation::of(data::quantifier_template(meaning)?)
            }
            Label::Focus => match leaf.binding {
                Some(index) => Denotation::new(data::focus()?, bound_at_zero(BindingKey::Index(index))),
                None => Denotation::empty(),
            },
            Label::FocAdv => {
                let adverb = match leaf.word {
                    Word::Covert(CovertValue::Only) => FocusAdverb::Only,
                    Word::Covert(CovertValue::Also) => FocusAdverb::Also,
                    Word::Covert(CovertValue::Even) => FocusAdverb::Even,
                    _ => return Err(unrecognized(leaf)),
                };
                Denotation::of(data::focus_adverb(adverb)?)
            }
            Label::And => self.denote_conjunction(id, leaf, c_command)?,
            Label::AndQ => {
                let connective = match leaf.word {
                    Word::Covert(value) => connective(value)?,
                    Word::Overt(_) => return Err(unrecognized(leaf)),
                };
                Denotation::of(data::conjunction_quantifier(connective)?)
            }
            Label::Adjunct => Denotation::of(data::adjunct()?),
            label => {
                return Err(PipelineError::unimplemented(format!(
                    "denoting a {} leaf",
                    label
                )))
            }
        };
        Ok(d)
    }

    fn denote_pronoun(
        &mut self,
        id: NodeId,
        leaf: &StrictLeaf,
        c_command: Option<NodeId>,
    ) -> Result<Denotation> {
        let entry = match &leaf.word {
            Word::Covert(CovertValue::Pro) | Word::Covert(CovertValue::Null) => {
                // an unfilled event-predicate slot of a serial verb
                if let Some(verb) = c_command.filter(|n| matches!(self.tree.label(*n), Label::V | Label::VP)) {
                    let d = self.denote_node(verb, Some(id))?;
                    if let Some(domain) = d.expr_or("read the type of")?.ty().domain() {
                        if *domain == ExprType::pred(ExprType::V) {
                            return Ok(Denotation::of(v(0, &context(vec![domain.clone()]))?));
                        }
                    }
                }
                return Ok(Denotation::new(
                    data::free_individual()?,
                    bound_at_zero(BindingKey::CovertResumptive),
                ));
            }
            Word::Covert(_) => return Err(unrecognized(leaf)),
            Word::Overt(_) => entry_of(leaf)?,
        };
        if entry.category == Category::Predicate {
            // a verb standing in for the DP it heads elsewhere
            return Ok(Denotation::new(
                data::free_individual()?,
                bound_at_zero(BindingKey::Variable(entry.toaq.clone())),
            ));
        }
        if entry.category != Category::Pronoun {
            return Err(unrecognized(leaf));
        }
        if let Some(p) = data::pronoun(&entry.toaq) {
            return Ok(Denotation::of(data::pronoun_constant(p)));
        }
        if let Some(class) = data::anaphor(&entry.toaq) {
            return Ok(Denotation::new(
                data::anaphor_variable(class)?,
                bound_at_zero(BindingKey::Animacy(class)),
            ));
        }
        if entry.toaq == "hóa" {
            return Ok(Denotation::new(
                data::free_individual()?,
                bound_at_zero(BindingKey::Resumptive),
            ));
        }
        Err(unrecognized(leaf))
    }

    fn denote_conjunction(
        &mut self,
        id: NodeId,
        leaf: &StrictLeaf,
        c_command: Option<NodeId>,
    ) -> Result<Denotation> {
        if let Some(index) = leaf.binding {
            return Ok(Denotation::new(
                data::argument_conjunction()?,
                bound_at_zero(BindingKey::Index(index)),
            ));
        }
        let entry = entry_of(leaf)?;
        if entry.toaq == "róı" {
            return Ok(Denotation::of(data::plural_coordination()?));
        }
        let value = conjunction(&entry.toaq).ok_or_else(|| unrecognized(leaf))?;
        let ty = self.sister_type(id, c_command, leaf.label)?;
        Ok(Denotation::of(data::clausal_conjunction(connective(value)?, &ty)?))
    }

    pub fn into_denotations(self) -> BTreeMap<NodeId, Denotation> {
        self.cache
    }
}

fn connective(value: CovertValue) -> Result<Connective> {
    match value {
        CovertValue::And | CovertValue::But => Ok(Connective::And),
        CovertValue::Or => Ok(Connective::Or),
        CovertValue::Xor => Ok(Connective::Xor),
        CovertValue::OrQuestion => Err(PipelineError::unimplemented("question coordination rí")),
        other => Err(PipelineError::unrecognized(format!("conjunction {}", other))),
    }
}

/// Compose a denotation for every node of `tree`.
pub fn denote(tree: StrictTree, logger: &Logger) -> Result<DTree> {
    let logger = logger.new(o!("phase" => "denote"));
    let denotations = {
        let mut composer = Composer::new(&tree, &logger);
        let root = composer.denote_node(tree.root(), None)?;
        if let Some(e) = &root.expr {
            debug!(logger, "denoted tree"; "type" => %e.ty(), "nodes" => tree.len());
        }
        composer.into_denotations()
    };
    Ok(DTree::new(tree, denotations))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::MemoryLexicon;

    #[test]
    fn test_agent_is_not_a_verb_argument() {
        let lexicon = MemoryLexicon::builtin().unwrap();
        use crate::lexicon::Lexicon;
        assert_eq!(verb_slots(&lexicon.resolve("chuq")).unwrap(), vec![ExprType::E]);
        assert_eq!(
            verb_slots(&lexicon.resolve("do")).unwrap(),
            vec![ExprType::E, ExprType::E]
        );
        assert_eq!(
            verb_slots(&lexicon.resolve("jeq")).unwrap(),
            vec![ExprType::E]
        );
        assert_eq!(
            verb_slots(&lexicon.resolve("leo")).unwrap(),
            vec![ExprType::pred(ExprType::V)]
        );
        assert!(verb_slots(&lexicon.resolve("kuaı")).unwrap().is_empty());
    }

    #[test]
    fn test_cached_entries_match_their_position() {
        use crate::fix::fix;
        use crate::parser::parse_tree;
        use slog::Discard;

        let lexicon = MemoryLexicon::builtin().unwrap();
        // 𝘯 and & both read their sister's type before the walk reaches it
        let tree = parse_tree(
            "[&P [TP [T] [AspP [Asp] [*vP [*Serial [V poq]] [DP [D sá] [nP [n] [V rua]]]]]] \
             [&' [& rú] [TP [T] [AspP [Asp] [*vP [*Serial [V kuaı]]]]]]]",
            &lexicon,
        )
        .unwrap();
        let logger = Logger::root(Discard, o!());
        let strict = fix(tree, &logger).unwrap();
        let dtree = denote(strict.clone(), &logger).unwrap();

        for parent in strict.preorder(strict.root()) {
            if let Some((left, right)) = strict.children(parent) {
                for (node, sister) in [(left, right), (right, left)] {
                    let mut fresh = Composer::new(&strict, &logger);
                    let alone = fresh.denote_node(node, Some(sister)).unwrap();
                    assert_eq!(Some(&alone), dtree.denotation(node), "{}", strict.label(node));
                }
            }
        }
    }

    #[test]
    fn test_connectives() {
        assert_eq!(connective(CovertValue::But), Ok(Connective::And));
        assert!(matches!(
            connective(CovertValue::OrQuestion),
            Err(PipelineError::Unimplemented { .. })
        ));
    }
}
