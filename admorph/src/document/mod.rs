//! Indexed documents. A document stores the concatenated descriptions of
//! its words with a suffix array over them, so phrases can be matched by
//! lemma in O(log n) per probe regardless of inflection.

pub mod suffix;

use std::collections::BTreeSet;

use itertools::Itertools;

use crate::constants::{
    DESCRIPTION_TERMINATOR, EXACT_INTERSECTION_FLAG, LANGUAGE_INTERSECTION_SPLITTER,
    MULTI_INTERSECTION_SPLITTER,
};
use crate::dictionary::multilang::MultiMorphology;
use crate::dictionary::Dictionary;
use crate::tokenizer::Tokenize;

/// Where one word's description landed in the index text. `start..=end`
/// spans the description including its surrounding terminators;
/// `original_start + 1..end` holds the word as it appeared in the document.
#[derive(Debug, Clone, Copy)]
pub struct WordRange {
    pub start: usize,
    pub end: usize,
    pub original_start: usize,
    pub word_index: usize,
}

pub struct Document {
    text: String,
    suffix_array: Vec<i32>,
    ranges: Vec<WordRange>,
    original_len: usize,
}

impl Document {
    /// Indexes `text`: every word is described through `morphology` and the
    /// descriptions are concatenated into one searchable string. Language
    /// detection carries over from word to word.
    pub fn new(text: &str, morphology: &MultiMorphology) -> Document {
        let original_len = text.len();
        let normalized = crate::tokenizer::case_handling::normalize_text(text);
        let mut index_text = String::with_capacity(normalized.len() * 2);
        let mut ranges = Vec::new();
        let mut suggested: Option<&Dictionary> = None;
        for (_, token) in normalized.words() {
            let (description, detected) = morphology.word_description(suggested, token);
            suggested = detected.or(suggested);
            let cursor = index_text.len();
            let (start, description) = if ranges.is_empty() {
                let mut first = String::with_capacity(description.len() + 1);
                first.push(DESCRIPTION_TERMINATOR);
                first.push_str(&description);
                (cursor, first)
            } else {
                (cursor - 1, description)
            };
            index_text.push_str(&description);
            let end = cursor + description.len() - 1;
            ranges.push(WordRange {
                start,
                end,
                original_start: end - token.len() - 1,
                word_index: ranges.len(),
            });
        }
        let suffix_array = suffix::text_to_suffix_array(index_text.as_bytes());
        Document {
            text: index_text,
            suffix_array,
            ranges,
            original_len,
        }
    }

    /// Byte length of the original document text, before normalization.
    pub fn original_len(&self) -> usize {
        self.original_len
    }

    pub fn word_count(&self) -> usize {
        self.ranges.len()
    }

    /// The range covering text position `pos`, if any.
    fn range_at(&self, pos: usize) -> Option<usize> {
        use std::cmp::Ordering;
        self.ranges
            .binary_search_by(|range| {
                if pos < range.start {
                    Ordering::Greater
                } else if pos > range.end - 1 {
                    Ordering::Less
                } else {
                    Ordering::Equal
                }
            })
            .ok()
    }

    /// Searches every `.`-separated lemma of `description` and records the
    /// successor index of each hit range. For the first phrase token every
    /// hit counts; for later tokens only hits inside a range allowed by the
    /// previous token survive.
    fn find_lemmas(&self, description: &str, allowed: &[usize], result: &mut Vec<usize>) {
        let first_token = allowed.is_empty();
        let mut pattern = String::new();
        for segment in description
            .split(DESCRIPTION_TERMINATOR)
            .filter(|s| !s.is_empty())
        {
            pattern.clear();
            pattern.push(DESCRIPTION_TERMINATOR);
            pattern.push_str(segment);
            pattern.push(DESCRIPTION_TERMINATOR);
            for &pos in
                &suffix::find_all(pattern.as_bytes(), self.text.as_bytes(), &self.suffix_array)
            {
                if let Some(index) = self.range_at(pos as usize) {
                    if first_token || allowed.contains(&index) {
                        result.push(index + 1);
                    }
                }
            }
        }
    }

    /// Finds every occurrence of `phrase` in the document, matching word by
    /// word on lemmas (or on the exact forms with `exact`), and inserts the
    /// original text of each occurrence into `found`.
    pub fn find_intersection<'a>(
        &self,
        morphology: &'a MultiMorphology,
        mut suggested: Option<&'a Dictionary>,
        phrase: &str,
        exact: bool,
        found: &mut BTreeSet<String>,
    ) {
        let mut allowed: Vec<usize> = Vec::new();
        let mut next_allowed: Vec<usize> = Vec::new();
        let mut tokens_count = 0;
        for (_, token) in phrase.words() {
            if tokens_count > 0 && allowed.is_empty() {
                return;
            }
            let (description, detected) = morphology.word_description(suggested, token);
            suggested = detected.or(suggested);
            let description = if exact {
                // only the trailing ".word." part, the form as written
                &description[description.len() - token.len() - 1..]
            } else {
                &description[..]
            };
            next_allowed.clear();
            self.find_lemmas(description, &allowed, &mut next_allowed);
            std::mem::swap(&mut allowed, &mut next_allowed);
            tokens_count += 1;
        }
        if tokens_count == 0 {
            return;
        }
        for &next in &allowed {
            if next < tokens_count || next > self.ranges.len() {
                continue;
            }
            let original = self.ranges[next - tokens_count..next]
                .iter()
                .map(|range| &self.text[range.original_start + 1..range.end])
                .join(" ");
            found.insert(original);
        }
    }

    /// Runs one intersection per `\n`-separated phrase of `phrases` and
    /// joins the union of the found occurrences, each followed by `\n`.
    pub fn find_multi_intersection(&self, morphology: &MultiMorphology, phrases: &str) -> String {
        let mut found = BTreeSet::new();
        for line in phrases.split(MULTI_INTERSECTION_SPLITTER) {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let (phrase, language, exact) = parse_phrase(line, morphology);
            if !phrase.is_empty() {
                self.find_intersection(morphology, language, phrase, exact, &mut found);
            }
        }
        let mut joined = String::new();
        for original in &found {
            joined.push_str(original);
            joined.push(MULTI_INTERSECTION_SPLITTER);
        }
        joined
    }
}

/// Splits one search phrase into its text and modifiers: an optional
/// `language|` selector and an optional leading `!` demanding exact forms.
fn parse_phrase<'a, 'm>(
    phrase: &'a str,
    morphology: &'m MultiMorphology,
) -> (&'a str, Option<&'m Dictionary>, bool) {
    let (language, rest) = match phrase.find(LANGUAGE_INTERSECTION_SPLITTER) {
        Some(pos) => (morphology.dictionary(&phrase[..pos]), &phrase[pos + 1..]),
        None => (None, phrase),
    };
    match rest.strip_prefix(EXACT_INTERSECTION_FLAG) {
        Some(rest) => (rest, language, true),
        None => (rest, language, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::testutil::{test_multi_morphology, test_same_script_morphology};

    fn intersect(document_text: &str, phrases: &str) -> String {
        let multi = test_multi_morphology();
        let document = Document::new(document_text, &multi);
        document.find_multi_intersection(&multi, phrases)
    }

    #[test]
    fn index_text_concatenates_descriptions() {
        let multi = test_multi_morphology();
        let document = Document::new("stolu pila", &multi);
        // "stolu" analyzes to "stol", "pila" has no analysis
        assert_eq!(document.text, ".stol.stolu.pila.");
        assert_eq!(document.word_count(), 2);
        assert_eq!(document.original_len(), 10);
        let second = document.ranges[1];
        assert_eq!(&document.text[second.original_start + 1..second.end], "pila");
    }

    #[test]
    fn finds_words_by_any_inflection() {
        // searching the lemma finds the inflected occurrence
        assert_eq!(intersect("stolu pila", "stol"), "stolu\n");
        // and searching one inflection finds another
        assert_eq!(intersect("stolu pila", "stola"), "stolu\n");
        assert_eq!(intersect("stolu pila", "doma"), "");
    }

    #[test]
    fn multi_word_phrases_must_be_adjacent() {
        let found = intersect("stola pila doma", "stolu pila");
        assert_eq!(found, "stola pila\n");
        assert_eq!(intersect("stola pila doma", "stolu doma"), "");
        assert_eq!(intersect("stola pila doma", "stolu pila domu"), "stola pila doma\n");
    }

    #[test]
    fn exact_phrases_match_only_the_written_form() {
        assert_eq!(intersect("stolu pila", "!stolu"), "stolu\n");
        assert_eq!(intersect("stolu pila", "!stola"), "");
    }

    #[test]
    fn phrases_union_and_deduplicate() {
        let found = intersect("stolu pila stola", "stol\npila");
        assert_eq!(found, "pila\nstola\nstolu\n");
        // both phrases hit the same occurrences once
        let found = intersect("stolu pila", "stol\nstola");
        assert_eq!(found, "stolu\n");
    }

    #[test]
    fn language_selector_routes_the_phrase() {
        let found = intersect("столе книгы", "ru|стол");
        assert_eq!(found, "столе\n");
        // an unknown selector falls back to language detection
        assert_eq!(intersect("столе книгы", "de|стол"), "столе\n");
    }

    #[test]
    fn indexing_describes_words_in_their_detected_language() {
        let multi = test_same_script_morphology();
        // "mostola" is exact in the secondary language, so its lemma lands
        // in the index and the lemma search finds the document
        let document = Document::new("mostola", &multi);
        assert_eq!(document.find_multi_intersection(&multi, "mostolo"), "mostola\n");
    }

    #[test]
    fn empty_inputs_find_nothing() {
        assert_eq!(intersect("", "stol"), "");
        assert_eq!(intersect("stolu", ""), "");
        assert_eq!(intersect("stolu", "   \n  "), "");
    }
}
