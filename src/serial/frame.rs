use std::fmt::{self, Display};

use itertools::Itertools;

use crate::error::{PipelineError, Result};
use crate::lexicon::Category;
use crate::parser::parse_frame;
use crate::tree::{Label, Tree};

/// Which outer argument a serial slot's placeholder is coindexed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// first argument
    I,
    /// second argument
    J,
    /// not coindexed
    X,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    Core,
    /// Embedded serial verb taking `pros` placeholder arguments.
    Serial { pros: usize, markers: Vec<Marker> },
}

impl Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Core => write!(f, "c"),
            Slot::Serial { pros, markers } => {
                write!(f, "{}", pros)?;
                for marker in markers {
                    let m = match marker {
                        Marker::I => 'i',
                        Marker::J => 'j',
                        Marker::X => 'x',
                    };
                    write!(f, "{}", m)?;
                }
                Ok(())
            }
        }
    }
}

/// A verb's valence: its argument slots in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    slots: Vec<Slot>,
}

impl Frame {
    pub fn new(slots: Vec<Slot>) -> Self {
        Frame { slots }
    }

    pub fn parse(text: &str) -> Result<Self> {
        parse_frame(text)
            .map_err(|e| PipelineError::impossible(format!("malformed frame {:?}: {}", text, e)))
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn arity(&self) -> usize {
        self.slots.len()
    }

    pub fn last(&self) -> Option<&Slot> {
        self.slots.last()
    }

    pub fn ends_in_core(&self) -> bool {
        matches!(self.last(), Some(Slot::Core))
    }

    /// Remove the final slot, as object incorporation does.
    pub fn without_last(&self) -> Option<Frame> {
        match self.slots.split_last() {
            Some((_, rest)) if !rest.is_empty() => Some(Frame::new(rest.to_vec())),
            _ => None,
        }
    }
}

impl Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for slot in &self.slots {
            if !first {
                write!(f, " ")?;
            }
            first = false;
            write!(f, "{}", slot)?;
        }
        Ok(())
    }
}

/// Frame of one element of a serial: a verb, or the kı- marker opening an adjective.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerialFrame {
    Verb(Frame),
    Ki,
}

impl SerialFrame {
    pub fn verb(&self) -> Option<&Frame> {
        match self {
            SerialFrame::Verb(frame) => Some(frame),
            SerialFrame::Ki => None,
        }
    }
}

/// Frame of a verbal subtree inside a serial.
pub fn get_frame(verb: &Tree) -> Result<SerialFrame> {
    match verb {
        Tree::Leaf(leaf) => {
            if leaf.label == Label::Adjective {
                return Ok(SerialFrame::Ki);
            }
            let entry = match leaf.word.entry() {
                // covert raı after a determiner
                None => return Ok(SerialFrame::Verb(Frame::new(vec![Slot::Core]))),
                Some(entry) => entry,
            };
            match entry.category {
                Category::Predicate => Frame::parse(entry.frame()).map(SerialFrame::Verb),
                Category::Predicatizer => {
                    Frame::parse(&format!("{} c", entry.frame())).map(SerialFrame::Verb)
                }
                Category::AdjectiveMarker => Ok(SerialFrame::Ki),
                _ => Err(PipelineError::impossible(format!(
                    "{} is not a verb",
                    leaf.word.text()
                ))),
            }
        }
        Tree::Branch(branch) => match branch.label {
            Label::AndP => get_frame(&branch.left),
            Label::FocusP => get_frame(&branch.right),
            Label::V => {
                // the incorporated object can sit on either side
                let host = if branch.left.label() == Label::DP {
                    &branch.right
                } else {
                    &branch.left
                };
                let frame = match get_frame(host)? {
                    SerialFrame::Verb(frame) => frame,
                    SerialFrame::Ki => {
                        return Err(PipelineError::impossible("kı- with an incorporated object"))
                    }
                };
                frame
                    .without_last()
                    .map(SerialFrame::Verb)
                    .ok_or_else(|| PipelineError::ungrammatical("Verb is not transitive"))
            }
            label => Err(PipelineError::unimplemented(format!(
                "Can't get frame of {}",
                label
            ))),
        },
        Tree::Rose(rose) => Err(PipelineError::unimplemented(format!(
            "Can't get frame of {}",
            rose.label
        ))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialSlot {
    pub verb_index: usize,
    pub slot_index: usize,
}

/// Effective slot structure of a serial: each group is filled by one argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialDescription {
    pub slots: Vec<Vec<SerialSlot>>,
    pub did_serialize: bool,
}

impl SerialDescription {
    /// Render as e.g. `nue1=do1 nue2 do2 do3`, naming verbs by `names`.
    pub fn render(&self, names: &[&str]) -> String {
        self.slots
            .iter()
            .map(|group| {
                group
                    .iter()
                    .map(|s| {
                        let name = names.get(s.verb_index).copied().unwrap_or("?");
                        format!("{}{}", name, s.slot_index + 1)
                    })
                    .join("=")
            })
            .join(" ")
    }
}

fn own_slots(verb_index: usize, count: usize) -> Vec<Vec<SerialSlot>> {
    (0..count)
        .map(|slot_index| {
            vec![SerialSlot {
                verb_index,
                slot_index,
            }]
        })
        .collect()
}

pub fn describe_serial(verbs: &[Tree]) -> Result<SerialDescription> {
    let frames = verbs.iter().map(get_frame).collect::<Result<Vec<_>>>()?;
    let (last, init) = match frames.split_last() {
        Some(split) => split,
        None => return Err(PipelineError::impossible("zero-length serial")),
    };

    let mut slots = match last {
        SerialFrame::Verb(frame) => own_slots(init.len(), frame.arity()),
        SerialFrame::Ki => Vec::new(),
    };
    let mut did_serialize = false;

    for (i, frame) in init.iter().enumerate().rev() {
        let frame = match frame {
            // everything after kı- is an adjective
            SerialFrame::Ki => {
                slots = Vec::new();
                continue;
            }
            SerialFrame::Verb(frame) => frame,
        };
        match frame.last() {
            Some(Slot::Serial { pros, markers }) => {
                did_serialize = true;
                let mut new_slots = own_slots(i, frame.arity() - 1);
                for (x, marker) in markers.iter().enumerate() {
                    let target = match marker {
                        Marker::I => 0,
                        Marker::J => 1,
                        Marker::X => continue,
                    };
                    if let (Some(merged), Some(group)) =
                        (slots.get(x).cloned(), new_slots.get_mut(target))
                    {
                        group.extend(merged);
                    }
                }
                new_slots.extend(slots.into_iter().skip(*pros));
                slots = new_slots;
            }
            // a core-final verb followed by more verbs: the rest was an adjective
            _ => slots = own_slots(i, frame.arity()),
        }
    }

    Ok(SerialDescription {
        slots,
        did_serialize,
    })
}
