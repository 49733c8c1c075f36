/*! Multilingual morphological analysis and phrase search.

Dictionaries ship as text morphological bases (an `.mrd` file with stems,
flexion models and prefix sets, plus a grammar table) and are compiled into
minimal acyclic automata over reversed word forms, built with the
incremental algorithm of [`Daciuk & Watson`]. Documents are indexed as the
concatenation of per-word descriptions with a suffix array on top, so a
phrase is found in any of its inflections in logarithmic time per probe.

The top-level entry point is [`Morph`](crate::engine::Morph): load the
dictionaries once, then score or test documents against newline-separated
search phrases, or normalize free text into lemmas.

Further usage examples can be found in `admorph-bin` in the same
repository.

[`Daciuk & Watson`]: (https://aclanthology.org/J00-1002/)

*/

pub mod automaton;
pub mod constants;
pub mod dictionary;
pub mod document;
pub mod engine;
pub mod paths;
pub mod tokenizer;
pub mod types;

pub use crate::engine::{Morph, MorphConfig};
