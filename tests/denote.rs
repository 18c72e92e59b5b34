use slog::{o, Discard, Logger};
use toaq_semantics::lexicon::MemoryLexicon;
use toaq_semantics::semantics::{ExprType, Rule};
use toaq_semantics::tree::{Label, Tree};
use toaq_semantics::{first_interpretation, interpret, parse_tree, PipelineError};

fn discard() -> Logger {
    Logger::root(Discard, o!())
}

fn tree(input: &str) -> Tree {
    let lexicon = MemoryLexicon::builtin().unwrap();
    parse_tree(input, &lexicon).unwrap()
}

fn sentence(clause: &str) -> String {
    format!("[SAP [CP [C] {}] [SA]]", clause)
}

fn logical_form(input: &str) -> Result<String, PipelineError> {
    let dtree = first_interpretation(vec![tree(input)], &discard())?;
    Ok(dtree.expr().map(ToString::to_string).unwrap_or_default())
}

#[test]
fn test_nullary_verb() {
    let input = sentence("[TP [T] [AspP [Asp] [*vP [*Serial [V kuaı]]]]]");
    assert_eq!(
        logical_form(&input).unwrap(),
        "ASSERT(λw. ∃e. τ(e)⊆t ∧ kuaı.w(e))"
    );
}

#[test]
fn test_transitive_verb_with_pronouns() {
    let input = sentence("[TP [T] [AspP [Asp] [*vP [*Serial [V chuq]] [DP jí] [DP hó]]]]");
    assert_eq!(
        logical_form(&input).unwrap(),
        "ASSERT(λw. ∃e. τ(e)⊆t ∧ AGENT(e)(w)=jí ∧ chuq.w(a)(e)) | animate(a)"
    );
}

#[test]
fn test_quantified_subject() {
    let input = sentence(
        "[TP [T] [AspP [Asp] [*vP [*Serial [V chuq]] \
         [DP [D tú] [nP [n] [V poq]]] [DP hó]]]]",
    );
    assert_eq!(
        logical_form(&input).unwrap(),
        "ASSERT(λw. ∀.SING a : ((∃e. poq.w(a)(e)) | animate(a)). \
         ∃e'. τ(e')⊆t ∧ AGENT(e')(w)=a ∧ chuq.w(a)(e'))"
    );
}

#[test]
fn test_event_subject_with_padded_argument() {
    let input = sentence("[TP [T] [AspP [Asp] [*vP [*Serial [V jeq]]]]]");
    assert_eq!(
        logical_form(&input).unwrap(),
        "ASSERT(λw. ∃e. τ(e)⊆t ∧ jeq.w(a)(e))"
    );
}

#[test]
fn test_event_subject_with_overt_argument() {
    let input = sentence("[TP [T] [AspP [Asp] [*vP [*Serial [V mıu]] [DP jí]]]]");
    assert_eq!(
        logical_form(&input).unwrap(),
        "ASSERT(λw. ∃e. τ(e)⊆t ∧ mıu.w(jí)(e))"
    );
}

#[test]
fn test_focus_only() {
    let input = sentence(
        "[TP [T] [AspP [Asp] [*vP [*Serial [V poq]] [FocusP [Focus tó] [DP jí]]]]]",
    );
    assert_eq!(
        logical_form(&input).unwrap(),
        "ASSERT(λw. (∃e. τ(e)⊆t ∧ poq.w(jí)(e)) ∧ \
         (∀a. ¬(∃e'. τ(e')⊆t ∧ poq.w(a)(e')) ∨ a=jí))"
    );
}

#[test]
fn test_argument_conjunction_takes_scope() {
    let input = sentence(
        "[TP [T] [AspP [Asp] [*vP [*Serial [V poq]] \
         [&P [DP jí] [&' [& rú] [DP súq]]]]]]",
    );
    assert_eq!(
        logical_form(&input).unwrap(),
        "ASSERT(λw. (∃e. τ(e)⊆t ∧ poq.w(jí)(e)) ∧ (∃e'. τ(e')⊆t ∧ poq.w(súq)(e')))"
    );
}

#[test]
fn test_plural_coordination_stays_in_place() {
    let input = sentence(
        "[TP [T] [AspP [Asp] [*vP [*Serial [V poq]] \
         [&P [DP jí] [&' [& róı] [DP súq]]]]]]",
    );
    assert_eq!(
        logical_form(&input).unwrap(),
        "ASSERT(λw. ∃e. τ(e)⊆t ∧ poq.w(jí & súq)(e))"
    );
}

#[test]
fn test_clausal_conjunction() {
    let input = sentence(
        "[&P [TP [T] [AspP [Asp] [*vP [*Serial [V kuaı]]]]] \
         [&' [& rú] [TP [T] [AspP [Asp] [*vP [*Serial [V poq]] [DP jí]]]]]]",
    );
    // each conjunct keeps its own reference time
    assert_eq!(
        logical_form(&input).unwrap(),
        "ASSERT(λw. (∃e. τ(e)⊆t' ∧ kuaı.w(e)) ∧ (∃e'. τ(e')⊆t ∧ poq.w(jí)(e')))"
    );
}

#[test]
fn test_relative_clause_with_covert_resumptive() {
    let input = sentence(
        "[TP [T] [AspP [Asp] [*vP [*Serial [V poq]] \
         [DP [D sá] [nP [n] [CPrel [Crel] [TP [T] [AspP [Asp] [*vP [*Serial [V rua]]]]]]]]]]]",
    );
    assert_eq!(
        logical_form(&input).unwrap(),
        "ASSERT(λw. ∃a : ((∃e. τ(e)⊆t' ∧ rua.w(a)(e)) | inanimate(a)). \
         ∃e'. τ(e')⊆t ∧ poq.w(a)(e'))"
    );
}

#[test]
fn test_relative_clause_with_hoa() {
    let input = sentence(
        "[TP [T] [AspP [Asp] [*vP [*Serial [V poq]] \
         [DP [D sá] [nP [n] [CPrel [Crel] \
         [TP [T] [AspP [Asp] [*vP [*Serial [V cho]] [DP jí] [DP hóa]]]]]]]]]]",
    );
    assert_eq!(
        logical_form(&input).unwrap(),
        "ASSERT(λw. ∃a : ((∃e. τ(e)⊆t' ∧ cho.w(jí, a)(e)) | abstract(a)). \
         ∃e'. τ(e')⊆t ∧ poq.w(a)(e'))"
    );
}

#[test]
fn test_modal_adjunct() {
    let input = sentence(
        "[TP [ModalP [Modal shê] [CP [C] [TP [T] [AspP [Asp] [*vP [*Serial [V kuaı]]]]]]] \
         [TP [T] [AspP [Asp] [*vP [*Serial [V poq]] [DP jí]]]]]",
    );
    assert_eq!(
        logical_form(&input).unwrap(),
        "ASSERT(λw. ∀w' : SHE(w)(w') ∧ (∃e. τ(e)⊆t' ∧ kuaı.w'(e)). \
         ∃e'. τ(e')⊆t ∧ poq.w'(jí)(e'))"
    );
}

#[test]
fn test_serial_verb_embeds_its_complement() {
    let input = sentence("[TP [T] [AspP [Asp] [*vP [*Serial [V du] [V rua]] [DP jí]]]]");
    assert_eq!(
        logical_form(&input).unwrap(),
        "ASSERT(λw. ∃e. τ(e)⊆t ∧ du.w(jí, λe'. rua.w(a)(e'))(e))"
    );
}

#[test]
fn test_serial_adjective_describes_the_event() {
    let input = sentence("[TP [T] [AspP [Asp] [*vP [*Serial [V rua] [V de]] [DP jí]]]]");
    assert_eq!(
        logical_form(&input).unwrap(),
        "ASSERT(λw. ∃e. τ(e)⊆t' ∧ rua.w(jí)(e) ∧ (∃e'. τ(e')⊆t ∧ de.w(e)(e')))"
    );
}

#[test]
fn test_late_adjunct() {
    let input = sentence(
        "[TP [T] [AspP [Asp] [*vP [*Serial [V poq]] [DP jí] \
         [AdjunctP [Adjunct] [VP [*Serial [V cho]] [DP súq]]]]]]",
    );
    assert_eq!(
        logical_form(&input).unwrap(),
        "ASSERT(λw. ∃e. τ(e)⊆t ∧ poq.w(jí)(e) ∧ (∃e'. cho.w(e, súq)(e')))"
    );
}

#[test]
fn test_negation() {
    let input = sentence("[ΣP [Σ bu] [TP [T] [AspP [Asp] [*vP [*Serial [V kuaı]]]]]]");
    let form = logical_form(&input).unwrap();
    assert!(form.contains('¬'), "{}", form);
    assert!(form.contains("kuaı.w(e)"), "{}", form);
}

#[test]
fn test_past_tense_is_existential() {
    let input = sentence("[TP [T pu] [AspP [Asp] [*vP [*Serial [V kuaı]]]]]");
    let form = logical_form(&input).unwrap();
    assert!(form.contains("∃t"), "{}", form);
    assert!(form.contains("<t0"), "{}", form);
}

#[test]
fn test_polar_question_is_unimplemented() {
    let input = sentence("[ΣP [Σ mä] [TP [T] [AspP [Asp] [*vP [*Serial [V kuaı]]]]]]");
    let err = logical_form(&input).unwrap_err();
    assert!(matches!(err, PipelineError::Unimplemented { .. }));
    assert!(!err.is_internal());
}

#[test]
fn test_unknown_tense_is_unrecognized() {
    let input = sentence("[TP [T poq] [AspP [Asp] [*vP [*Serial [V kuaı]]]]]");
    let err = logical_form(&input).unwrap_err();
    assert!(matches!(err, PipelineError::Unrecognized { .. }));
}

#[test]
fn test_every_candidate_is_interpreted() {
    let good = sentence("[TP [T] [AspP [Asp] [*vP [*Serial [V kuaı]]]]]");
    let bad = sentence("[TP [T poq] [AspP [Asp] [*vP [*Serial [V kuaı]]]]]");
    let results = interpret(vec![tree(&bad), tree(&good)], &discard());
    assert_eq!(results.len(), 2);
    assert!(results[0].is_err());
    assert!(results[1].is_ok());

    let dtree = first_interpretation(vec![tree(&bad), tree(&good)], &discard()).unwrap();
    assert_eq!(dtree.tree().label(dtree.tree().root()), Label::SAP);
}

#[test]
fn test_no_candidates() {
    let err = first_interpretation(vec![], &discard()).unwrap_err();
    assert_eq!(err, PipelineError::ungrammatical("no parse"));
}

#[test]
fn test_every_node_is_annotated() {
    let input = sentence("[TP [T] [AspP [Asp] [*vP [*Serial [V chuq]] [DP jí] [DP hó]]]]");
    let dtree = first_interpretation(vec![tree(&input)], &discard()).unwrap();
    let strict = dtree.tree();
    for id in strict.preorder(strict.root()) {
        assert!(dtree.denotation(id).is_some(), "{} has no denotation", strict.label(id));
    }
    let root = dtree.expr().unwrap();
    assert_eq!(root.ty(), &ExprType::T);

    let json = dtree.to_json();
    assert_eq!(json["label"], "SAP");
    assert_eq!(json["type"], "t");
    assert_eq!(json["children"].as_array().map(Vec::len), Some(2));
}

#[test]
fn test_rule_names() {
    assert_eq!(Rule::FunctionalApplication.to_string(), "FA");
    assert_eq!(Rule::EventIdentification.to_string(), "event identification");
}
