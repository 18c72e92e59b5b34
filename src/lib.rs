pub mod error;
pub mod fix;
pub mod lexicon;
pub mod parser;
pub mod semantics;
pub mod serial;
pub mod tree;

use slog::{debug, o, Logger};

pub use error::{PipelineError, Result};
pub use fix::fix;
pub use lexicon::{Lexicon, MemoryLexicon};
pub use parser::{parse_tree, ParseError};
pub use semantics::{denote, DTree};
pub use tree::{StrictTree, Tree};

/// Resolve scope in `tree` and compose its meaning.
pub fn interpret_one(tree: Tree, logger: &Logger) -> Result<DTree> {
    let strict = fix(tree, logger)?;
    denote(strict, logger)
}

/// Interpret every candidate parse of one sentence, independently.
pub fn interpret(candidates: Vec<Tree>, logger: &Logger) -> Vec<Result<DTree>> {
    let logger = logger.new(o!("phase" => "interpret"));
    candidates
        .into_iter()
        .enumerate()
        .map(|(i, tree)| {
            let logger = logger.new(o!("candidate" => i));
            let result = interpret_one(tree, &logger);
            if let Err(e) = &result {
                debug!(logger, "candidate failed"; "error" => %e, "internal" => e.is_internal());
            }
            result
        })
        .collect()
}

/// The first candidate that interprets, or the last failure.
pub fn first_interpretation(candidates: Vec<Tree>, logger: &Logger) -> Result<DTree> {
    let mut last = PipelineError::ungrammatical("no parse");
    for result in interpret(candidates, logger) {
        match result {
            Ok(dtree) => return Ok(dtree),
            Err(e) => last = e,
        }
    }
    Err(last)
}
