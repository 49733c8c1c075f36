//! Acyclic word-form automaton: incremental minimal construction (Daciuk &
//! Watson) for dictionary compilation, and a compact read-only form for
//! analysis.

pub mod builder;
pub mod compact;

use std::io;

use thiserror::Error;

pub use self::builder::AutomatonBuilder;
pub use self::compact::CompactAutomaton;

#[derive(Debug, Error)]
pub enum AutomatonError {
    #[error("automaton io error")]
    Io(#[from] io::Error),
    #[error("malformed automaton file: {0}")]
    Malformed(String),
}

/// One string accepted by the automaton below the recognized prefix of a
/// query word.
#[derive(Debug, Clone)]
pub struct AutomatonOutput {
    pub text: String,
    /// How many characters of the query the automaton walked before the
    /// output was collected.
    pub prefix_len: usize,
    pub is_prediction: bool,
}
