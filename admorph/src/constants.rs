/// Word stems and inflection rules, one per dictionary folder.
pub const DICTIONARY_MRD_FILE: &str = "morphs.mrd";
/// Grammar table mapping ancodes to part-of-speech data.
pub const DICTIONARY_GRAMMAR_FILE: &str = "gramtab.tab";
/// Compiled word-form automaton, generated from the MRD base when missing.
pub const DICTIONARY_AUTOMAT_FILE: &str = "automat.save";

/// Separates the reversed word form from its packed annotation inside the
/// automaton language.
pub const ANNOTATION_DELIMITER: char = '|';

/// Terminates every lemma in a word description (`"lemma.lemma.original."`).
pub const DESCRIPTION_TERMINATOR: char = '.';

/// Minimum number of characters the automaton must recognize before
/// word-form prediction is attempted.
pub const MIN_MATCH_FOR_PREDICTION: usize = 4;
/// Minimum stem length acceptable for a predicted word form.
pub const MIN_BASE_LENGTH: usize = 3;
/// Longest path the automaton walks while collecting outputs.
pub const MAX_AUTOMAT_OUTPUT_SIZE: usize = 255;

/// Query phrases in a multi-intersection request are separated by newlines.
pub const MULTI_INTERSECTION_SPLITTER: char = '\n';
/// Prefixing a query phrase with this character requests exact-form search.
pub const EXACT_INTERSECTION_FLAG: char = '!';
/// Separates a forced language code from the query phrase (`"ru|..."`).
pub const LANGUAGE_INTERSECTION_SPLITTER: char = '|';

/// Default capacity of the per-dictionary word description cache.
pub const DEFAULT_DESCRIPTION_CACHE_SIZE: usize = 150;
