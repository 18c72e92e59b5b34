use miette::Diagnostic;
use thiserror::Error;

/// Failure of the resolution or composition pipeline for one candidate parse.
///
/// Only `Impossible` signals a defect in the pipeline itself; the other kinds
/// describe the input and are reported to the user.
#[derive(Debug, Clone, PartialEq, Eq, Diagnostic, Error)]
pub enum PipelineError {
    #[error("Ungrammatical: {message}")]
    #[diagnostic(
        code(toaq::ungrammatical),
        help("The sentence is not well-formed; check argument counts and serial verb order")
    )]
    Ungrammatical { message: String },

    #[error("Don't know how to interpret {what}")]
    #[diagnostic(
        code(toaq::unrecognized),
        help("Add the word to the lexicon or use a word with a known meaning")
    )]
    Unrecognized { what: String },

    #[error("Internal error: {message}")]
    #[diagnostic(
        code(toaq::impossible),
        help("No valid input should reach this state; please report it as a bug")
    )]
    Impossible { message: String },

    #[error("Not supported yet: {construction}")]
    #[diagnostic(code(toaq::unimplemented))]
    Unimplemented { construction: String },
}

impl PipelineError {
    pub fn ungrammatical(message: impl Into<String>) -> Self {
        PipelineError::Ungrammatical {
            message: message.into(),
        }
    }

    pub fn unrecognized(what: impl Into<String>) -> Self {
        PipelineError::Unrecognized { what: what.into() }
    }

    pub fn impossible(message: impl Into<String>) -> Self {
        PipelineError::Impossible {
            message: message.into(),
        }
    }

    pub fn unimplemented(construction: impl Into<String>) -> Self {
        PipelineError::Unimplemented {
            construction: construction.into(),
        }
    }

    /// True for errors that indicate a bug rather than bad input.
    pub fn is_internal(&self) -> bool {
        matches!(self, PipelineError::Impossible { .. })
    }
}

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;
