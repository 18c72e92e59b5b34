use slog::{o, Discard, Logger};
use toaq_semantics::lexicon::MemoryLexicon;
use toaq_semantics::tree::{Label, NodeId, StrictTree};
use toaq_semantics::{fix, parse_tree, PipelineError};

fn discard() -> Logger {
    Logger::root(Discard, o!())
}

fn fixed(input: &str) -> StrictTree {
    let lexicon = MemoryLexicon::builtin().unwrap();
    let tree = parse_tree(input, &lexicon).unwrap();
    fix(tree, &discard()).unwrap()
}

fn descendants(tree: &StrictTree, id: NodeId) -> Vec<NodeId> {
    let mut out = vec![id];
    if let Some((left, right)) = tree.children(id) {
        out.extend(descendants(tree, left));
        out.extend(descendants(tree, right));
    }
    out
}

const QUANTIFIED_CLAUSE: &str =
    "[TP [T] [AspP [Asp] [*vP [*Serial [V poq]] [DP [D sá] [nP [n] [V poq]]]]]]";

#[test]
fn test_conjoined_clauses_scope_independently() {
    let input = format!(
        "[&P {} [&' [& rú] {}]]",
        QUANTIFIED_CLAUSE, QUANTIFIED_CLAUSE
    );
    let tree = fixed(&input);
    let (left, bar) = tree.children(tree.root()).unwrap();
    let (_, right) = tree.children(bar).unwrap();

    let qps = tree.find_all(Label::QP);
    assert_eq!(qps.len(), 2);
    let left_nodes = descendants(&tree, left);
    let right_nodes = descendants(&tree, right);
    let left_qp = qps.iter().find(|q| left_nodes.contains(q)).unwrap();
    let right_qp = qps.iter().find(|q| right_nodes.contains(q)).unwrap();
    assert!(!right_nodes.contains(left_qp));
    assert!(!left_nodes.contains(right_qp));

    let left_index = tree[*left_qp].binding().unwrap();
    let right_index = tree[*right_qp].binding().unwrap();
    assert_ne!(left_index, right_index);
    assert!(left_index < right_index);
}

#[test]
fn test_first_registered_site_is_outermost() {
    let tree = fixed(
        "[CP [C] [TP [T] [AspP [Asp] [*vP [*Serial [V cho]] \
         [DP [D tú] [nP [n] [V poq]]] [DP [D sá] [nP [n] [V rua]]]]]]]",
    );
    let (_, tp) = tree.children(tree.root()).unwrap();
    let (outer, inner_tp) = tree.children(tp).unwrap();
    let (inner, core) = tree.children(inner_tp).unwrap();
    assert_eq!(tree.label(outer), Label::QP);
    assert_eq!(tree.label(inner), Label::QP);
    assert_eq!(tree.label(core), Label::TP);
    assert_eq!(tree[outer].binding(), Some(0));
    assert_eq!(tree[inner].binding(), Some(1));
}

#[test]
fn test_indices_restart_on_every_call() {
    let input = format!("[CP [C] {}]", QUANTIFIED_CLAUSE);
    let first = fixed(&input);
    let second = fixed(&input);
    assert_eq!(first, second);
    let qp = first.find_all(Label::QP)[0];
    assert_eq!(first[qp].binding(), Some(0));
}

#[test]
fn test_subclause_arity_is_checked() {
    let lexicon = MemoryLexicon::builtin().unwrap();
    let tree = parse_tree(
        "[CP [C] [TP [T] [AspP [Asp] [*vP [*Serial [V poq]] [DP jí] [DP hó]]]]]",
        &lexicon,
    )
    .unwrap();
    let err = fix(tree, &discard()).unwrap_err();
    assert!(matches!(err, PipelineError::Ungrammatical { .. }));
}
