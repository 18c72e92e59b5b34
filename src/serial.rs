//! Serial verb resolution.
//!
//! The parser leaves a verbal complex as a flat `*Serial` rose followed by its
//! terms (arguments and adjuncts). Here the serial is split into segments (a
//! serial verb, then serial adjectives), each segment is expanded into a proper
//! 𝘷P using the frames of its verbs, and the adjectives and adjuncts are attached.

mod frame;

use crate::error::{PipelineError, Result};
use crate::tree::{CovertValue, Label, Leaf, Movement, Tree, Word};

pub use frame::{
    describe_serial, get_frame, Frame, Marker, SerialDescription, SerialFrame, SerialSlot, Slot,
};

/// Coindex and movement counters, scoped to one resolution call.
#[derive(Debug, Default)]
pub struct SerialContext {
    next_coindex: u32,
    next_movement: usize,
}

impl SerialContext {
    /// Mint a fresh coindex label: 𝑖, 𝑗, 𝑘, ...
    pub fn new_coindex(&mut self) -> String {
        let label = char::from_u32('𝑖' as u32 + self.next_coindex)
            .map(String::from)
            .unwrap_or_else(|| format!("𝑖{}", self.next_coindex));
        self.next_coindex += 1;
        label
    }

    pub fn new_movement(&mut self) -> Movement {
        let id = self.next_movement;
        self.next_movement += 1;
        Movement {
            id,
            moved_to: None,
            text: None,
        }
    }
}

/// A covert placeholder argument.
pub fn pro() -> Tree {
    Tree::covert(Label::DP, CovertValue::Pro)
}

/// Move the head `source` up into `target`, which now pronounces both.
pub fn move_up(source: &mut Leaf, target: &mut Leaf, ctx: &mut SerialContext) {
    let source_movement = source
        .movement
        .get_or_insert_with(|| ctx.new_movement())
        .clone();
    let target_id = target
        .movement
        .get_or_insert_with(|| ctx.new_movement())
        .id;

    let source_text = source_movement
        .text
        .unwrap_or_else(|| source.text().to_string());
    let text = format!("{} {}", target.text(), source_text).trim().to_string();

    if let Some(m) = source.movement.as_mut() {
        m.moved_to = Some(target_id);
        m.text = None;
    }
    if let Some(m) = target.movement.as_mut() {
        m.text = Some(text);
    }
}

fn agentive(verb: &Tree) -> Result<bool> {
    match verb {
        Tree::Leaf(leaf) => Ok(leaf.word.entry().map_or(false, |e| e.is_agentive())),
        Tree::Branch(b) if b.label == Label::AndP => agentive(&b.left),
        Tree::Branch(b) if b.label == Label::FocusP => agentive(&b.right),
        _ => Err(PipelineError::unrecognized("verb shape")),
    }
}

fn relabel_leaf(verb: Tree, label: Label) -> Result<Tree> {
    match verb {
        Tree::Leaf(leaf) => Ok(Tree::Leaf(Leaf { label, ..leaf })),
        other => Err(PipelineError::impossible(format!(
            "{} can't head a verb phrase on its own",
            other.label()
        ))),
    }
}

/// Build a 𝘷P around `verb` and its saturated argument list.
///
/// Argument order is subject, then indirect object, then direct object.
fn make_vp(verb: Tree, args: Vec<Tree>, ctx: &mut SerialContext) -> Result<Tree> {
    let agent = agentive(&verb)?;
    let mut v = Leaf {
        label: Label::LittleV,
        word: Word::Covert(if agent {
            CovertValue::Cause
        } else {
            CovertValue::Be
        }),
        coindex: None,
        movement: None,
    };

    let verb = match verb {
        Tree::Leaf(mut leaf) => {
            move_up(&mut leaf, &mut v, ctx);
            Tree::Leaf(leaf)
        }
        // coordinated and focused verbs stay in place
        other => other,
    };
    let v = Tree::Leaf(v);

    let count = args.len();
    let mut args = args.into_iter();
    match (args.next(), args.next(), args.next()) {
        (None, _, _) => Ok(Tree::branch(
            Label::LittleVP,
            v,
            relabel_leaf(verb, Label::VP)?,
        )),
        (Some(subject), None, _) if agent => Ok(Tree::branch(
            Label::LittleVP,
            subject,
            Tree::branch(Label::LittleVBar, v, relabel_leaf(verb, Label::VP)?),
        )),
        (Some(subject), None, _) => Ok(Tree::branch(
            Label::LittleVP,
            v,
            Tree::branch(Label::VP, verb, subject),
        )),
        (Some(subject), Some(object), None) => Ok(Tree::branch(
            Label::LittleVP,
            subject,
            Tree::branch(Label::LittleVBar, v, Tree::branch(Label::VP, verb, object)),
        )),
        (Some(subject), Some(indirect), Some(direct)) if count == 3 => Ok(Tree::branch(
            Label::LittleVP,
            subject,
            Tree::branch(
                Label::LittleVBar,
                v,
                Tree::branch(
                    Label::VP,
                    indirect,
                    Tree::branch(Label::VBar, verb, direct),
                ),
            ),
        )),
        _ => Err(PipelineError::impossible(format!("Bad arity {}", count))),
    }
}

fn light_verb_mut(vp: &mut Tree) -> Result<&mut Leaf> {
    let missing = || PipelineError::impossible("serialized 𝘷P has no light verb");
    let branch = match vp {
        Tree::Branch(b) => b,
        _ => return Err(missing()),
    };
    let slot = if branch.left.label() == Label::LittleV {
        &mut branch.left
    } else {
        match branch.right.as_mut() {
            Tree::Branch(bar) => &mut bar.left,
            _ => return Err(missing()),
        }
    };
    match slot.as_mut() {
        Tree::Leaf(leaf) => Ok(leaf),
        _ => Err(missing()),
    }
}

/// Expand one segment of a serial into a 𝘷P, padding missing arguments.
fn serial_to_vp(mut verbs: Vec<Tree>, mut args: Vec<Tree>, ctx: &mut SerialContext) -> Result<Tree> {
    let first = match verbs.first() {
        Some(first) => first,
        None => return Err(PipelineError::impossible("zero-length serial")),
    };
    let frame = match get_frame(first)? {
        SerialFrame::Verb(frame) => frame,
        SerialFrame::Ki => return Err(PipelineError::impossible("kı- inside a segment")),
    };

    if verbs.len() == 1 {
        let verb = verbs.remove(0);
        let arity = frame.arity();
        if args.len() > arity {
            return Err(PipelineError::ungrammatical(format!(
                "{} takes {} argument(s), but {} were given",
                verb.source(),
                arity,
                args.len()
            )));
        }
        args.resize_with(arity, || Tree::null(Label::DP));

        return match verb {
            Tree::Branch(b) if b.label == Label::V && b.left.label() == Label::V => {
                args.push(*b.right);
                make_vp(*b.left, args, ctx)
            }
            verb => make_vp(verb, args, ctx),
        };
    }

    let cant_serialize = || PipelineError::ungrammatical(format!("frame can't serialize: {}", frame));
    let (pro_count, markers) = match frame.slots().split_last() {
        Some((Slot::Serial { pros, markers }, core))
            if core.iter().all(|s| *s == Slot::Core) =>
        {
            (*pros, markers)
        }
        _ => return Err(cant_serialize()),
    };
    let core_count = frame.arity() - 1;

    let mut pros: Vec<Tree> = (0..pro_count).map(|_| pro()).collect();
    for (pro, marker) in pros.iter_mut().zip(markers) {
        let target = match marker {
            Marker::I => 0,
            Marker::J => 1,
            Marker::X => continue,
        };
        if let Some(arg) = args.get_mut(target) {
            if let Some(coindex) = arg.coindex_or_insert(|| ctx.new_coindex()) {
                pro.set_coindex(coindex);
            }
        }
    }

    if args.len() < core_count {
        args.resize_with(core_count, || Tree::null(Label::DP));
    }
    let rest = args.split_off(core_count);
    let inner_args = pros.into_iter().chain(rest).collect();

    let mut head = match verbs.remove(0) {
        Tree::Leaf(leaf) => leaf,
        other => {
            return Err(PipelineError::unimplemented(format!(
                "serializing a complex {}",
                other.label()
            )))
        }
    };
    let mut inner = serial_to_vp(verbs, inner_args, ctx)?;
    move_up(light_verb_mut(&mut inner)?, &mut head, ctx);

    args.push(inner);
    make_vp(Tree::Leaf(head), args, ctx)
}

/// Split the children of a `*Serial` into a serial verb and serial adjectives.
pub fn segment_serial(children: &[Tree]) -> Result<Vec<&[Tree]>> {
    let frames = children.iter().map(get_frame).collect::<Result<Vec<_>>>()?;
    let mut segments = Vec::new();
    let mut end = children.len();
    for i in (0..children.len().saturating_sub(1)).rev() {
        match &frames[i] {
            SerialFrame::Ki => {
                segments.push(&children[i..end]);
                end = i;
            }
            SerialFrame::Verb(frame) => {
                // everything after a core-final verb describes it
                if frame.ends_in_core() && i + 1 != end {
                    segments.push(&children[i + 1..end]);
                    end = i + 1;
                }
            }
        }
    }
    if end != 0 {
        segments.push(&children[..end]);
    }
    segments.reverse();
    Ok(segments)
}

fn segment_to_ki_vp(
    mut segment: Vec<Tree>,
    args: Vec<Tree>,
    ctx: &mut SerialContext,
) -> Result<(Option<Tree>, Tree)> {
    if segment.first().map(Tree::label) == Some(Label::Adjective) {
        let ki = segment.remove(0);
        if segment.is_empty() {
            return Err(PipelineError::ungrammatical("kı- must be followed by a verb"));
        }
        return Ok((Some(ki), serial_to_vp(segment, args, ctx)?));
    }
    Ok((None, serial_to_vp(segment, args, ctx)?))
}

/// Wrap a serial adjective's 𝘷P as a relative clause modifying `vp`.
fn attach_adjective(vp: Tree, ki: Option<Tree>, adjective: Tree) -> Tree {
    let clause = Tree::branch(
        Label::CPrel,
        Tree::null(Label::Crel),
        Tree::branch(
            Label::TP,
            Tree::null(Label::T),
            Tree::branch(Label::AspP, Tree::null(Label::Asp), adjective),
        ),
    );
    Tree::branch(
        Label::VP,
        vp,
        Tree::branch(
            Label::AdjectiveP,
            ki.unwrap_or_else(|| Tree::null(Label::Adjective)),
            clause,
        ),
    )
}

fn attach_at_vp(tree: &mut Tree, ki: Option<Tree>, adjective: Tree) -> Result<()> {
    match tree {
        Tree::Branch(b) if b.right.label() == Label::VP => {
            let vp = std::mem::replace(b.right.as_mut(), Tree::null(Label::VP));
            *b.right = attach_adjective(vp, ki, adjective);
            Ok(())
        }
        Tree::Branch(b) => attach_at_vp(&mut b.right, ki, adjective),
        _ => Err(PipelineError::impossible(
            "serial has no VP to attach an adjective to",
        )),
    }
}

/// Turn a `*Serial` and its terms into a proper 𝘷P.
pub fn fix_serial(serial: Tree, terms: Vec<Tree>, ctx: &mut SerialContext) -> Result<Tree> {
    let children = match serial {
        Tree::Rose(rose) if rose.label == Label::SerialStar => rose.children,
        other => {
            return Err(PipelineError::impossible(format!(
                "expected *Serial, found {}",
                other.label()
            )))
        }
    };
    if children.is_empty() {
        return Err(PipelineError::impossible("zero-length serial"));
    }

    let mut segments = segment_serial(&children)?
        .into_iter()
        .map(<[Tree]>::to_vec)
        .collect::<Vec<_>>()
        .into_iter();

    let mut early_adjuncts = Vec::new();
    let mut args = Vec::new();
    let mut late_adjuncts = Vec::new();
    for term in terms {
        match term.effective_label() {
            Label::DP | Label::LittleNP => args.push(term),
            _ if !args.is_empty() => late_adjuncts.push(term),
            _ => early_adjuncts.push(term),
        }
    }

    let head = segments
        .next()
        .ok_or_else(|| PipelineError::impossible("serial without segments"))?;
    let (ki, mut vp) = segment_to_ki_vp(head, args, ctx)?;
    if ki.is_some() {
        return Err(PipelineError::ungrammatical("Serial can't start with kı-"));
    }

    for segment in segments {
        let (ki, adjective) = segment_to_ki_vp(segment, vec![pro()], ctx)?;
        attach_at_vp(&mut vp, ki, adjective)?;
    }

    for adjunct in late_adjuncts {
        vp = Tree::branch(Label::LittleVP, vp, adjunct);
    }
    for adjunct in early_adjuncts.into_iter().rev() {
        vp = Tree::branch(Label::LittleVP, adjunct, vp);
    }
    Ok(vp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::MemoryLexicon;

    fn verbs(words: &[&str]) -> Vec<Tree> {
        let lexicon = MemoryLexicon::builtin().unwrap();
        words
            .iter()
            .map(|w| Tree::leaf(Label::V, Word::overt(w, &lexicon)))
            .collect()
    }

    #[test]
    fn test_coindex_labels() {
        let mut ctx = SerialContext::default();
        assert_eq!(ctx.new_coindex(), "𝑖");
        assert_eq!(ctx.new_coindex(), "𝑗");
        assert_eq!(ctx.new_coindex(), "𝑘");
    }

    #[test]
    fn test_move_up_chains_text() {
        let mut ctx = SerialContext::default();
        let lexicon = MemoryLexicon::builtin().unwrap();
        let leaf = |w: &str| Leaf {
            label: Label::V,
            word: Word::overt(w, &lexicon),
            coindex: None,
            movement: None,
        };
        let mut inner = leaf("do");
        let mut outer = leaf("nue");
        move_up(&mut inner, &mut outer, &mut ctx);

        let inner_movement = inner.movement.unwrap();
        let outer_movement = outer.movement.unwrap();
        assert_eq!(inner_movement.moved_to, Some(outer_movement.id));
        assert_eq!(inner_movement.text, None);
        assert_eq!(outer_movement.text.as_deref(), Some("nue do"));
    }

    #[test]
    fn test_intransitive_vp() {
        let mut ctx = SerialContext::default();
        let vp = serial_to_vp(verbs(&["poq"]), vec![pro()], &mut ctx).unwrap();
        assert_eq!(vp.to_string(), "[𝘷P [𝘷 {BE}] [VP [V poq] [DP {PRO}]]]");
    }

    #[test]
    fn test_too_many_arguments() {
        let mut ctx = SerialContext::default();
        let err = serial_to_vp(verbs(&["poq"]), vec![pro(), pro()], &mut ctx).unwrap_err();
        assert_eq!(
            err,
            PipelineError::ungrammatical("poq takes 1 argument(s), but 2 were given")
        );
    }

    #[test]
    fn test_non_serializing_frame() {
        let mut ctx = SerialContext::default();
        let err = serial_to_vp(verbs(&["chuq", "poq"]), vec![], &mut ctx).unwrap_err();
        assert!(matches!(err, PipelineError::Ungrammatical { .. }));
    }
}
