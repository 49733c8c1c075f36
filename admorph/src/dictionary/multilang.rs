//! Analysis across several loaded dictionaries. The first dictionary in
//! folder order is the main language; an unknown word is routed to the
//! language whose automaton recognizes the longest tail of it.

use std::path::Path;

use super::morphology::WordForm;
use super::{load_dictionaries, Dictionary, DictionaryError};
use crate::tokenizer::case_handling::is_garbage_word;

pub struct MultiMorphology {
    languages: Vec<Dictionary>,
}

impl MultiMorphology {
    /// `languages` must not be empty; the first entry becomes the main
    /// language.
    pub fn new(languages: Vec<Dictionary>) -> MultiMorphology {
        debug_assert!(!languages.is_empty());
        MultiMorphology { languages }
    }

    pub fn from_root(root: &Path, cache_size: usize) -> Result<MultiMorphology, DictionaryError> {
        Ok(MultiMorphology::new(load_dictionaries(root, cache_size)?))
    }

    pub fn languages(&self) -> &[Dictionary] {
        &self.languages
    }

    pub fn main_language(&self) -> &Dictionary {
        &self.languages[0]
    }

    pub fn dictionary(&self, name: &str) -> Option<&Dictionary> {
        self.languages
            .iter()
            .find(|dictionary| dictionary.name() == name)
    }

    /// The language whose automaton recognizes the longest tail of `word`.
    /// A full match wins outright; a word nothing recognizes, or a garbage
    /// word, has no language.
    pub fn detect_language(&self, word: &str) -> Option<&Dictionary> {
        if is_garbage_word(word) {
            return None;
        }
        let word_len = word.chars().count();
        let mut best: Option<&Dictionary> = None;
        let mut best_len = 0;
        for dictionary in &self.languages {
            let known = dictionary.morphology().known_part_of_word(word);
            if known == word_len {
                return Some(dictionary);
            }
            if known > best_len {
                best_len = known;
                best = Some(dictionary);
            }
        }
        best
    }

    /// Analyzes `word` in the suggested language, falling back to the
    /// detected one and finally to the main language. Returns the forms and
    /// the language detection carried over to the next word of a phrase.
    pub fn word_forms<'a>(
        &'a self,
        suggested: Option<&'a Dictionary>,
        word: &str,
    ) -> (Vec<WordForm>, Option<&'a Dictionary>) {
        if let Some(suggested) = suggested {
            let forms = suggested.morphology().forms(word);
            if !forms.is_empty() {
                return (forms, Some(suggested));
            }
        }
        let mut detected = self.detect_language(word);
        let language = detected.unwrap_or_else(|| self.main_language());
        let forms = language.morphology().forms(word);
        if forms.is_empty() {
            detected = None;
        }
        (forms, detected)
    }

    /// The description of `word`. A suggested language is tried first
    /// without imitation; otherwise, and when the suggestion has no answer,
    /// the word is described in the detected or main language. Always
    /// yields a description; the returned language is only set when
    /// detection moved away from the suggestion.
    pub fn word_description<'a>(
        &'a self,
        suggested: Option<&'a Dictionary>,
        word: &str,
    ) -> (String, Option<&'a Dictionary>) {
        if let Some(suggested) = suggested {
            let (description, garbage) = suggested.morphology().word_description(word, true);
            if let Some(description) = description {
                return (description, None);
            }
            let mut detected = if garbage { None } else { self.detect_language(word) };
            let language = detected.unwrap_or_else(|| self.main_language());
            let (description, garbage) = language.morphology().word_description(word, false);
            if !garbage {
                if let Some(detected_language) = detected {
                    if std::ptr::eq(detected_language, suggested) {
                        detected = None;
                    }
                }
            }
            return (description.unwrap_or_default(), detected);
        }
        let detected = self.detect_language(word);
        let language = detected.unwrap_or_else(|| self.main_language());
        let (description, _) = language.morphology().word_description(word, false);
        (description.unwrap_or_default(), detected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::testutil::{test_multi_morphology, test_same_script_morphology};

    #[test]
    fn main_language_is_the_first_one() {
        let multi = test_multi_morphology();
        assert_eq!(multi.main_language().name(), "en");
        assert_eq!(multi.dictionary("ru").unwrap().name(), "ru");
        assert!(multi.dictionary("de").is_none());
    }

    #[test]
    fn full_matches_decide_the_language() {
        let multi = test_multi_morphology();
        assert_eq!(multi.detect_language("stola").unwrap().name(), "en");
        assert_eq!(multi.detect_language("книгы").unwrap().name(), "ru");
    }

    #[test]
    fn partial_matches_rank_by_recognized_tail() {
        let multi = test_multi_morphology();
        // "мостолы" ends like "столы", which only the ru automaton knows
        assert_eq!(multi.detect_language("мостолы").unwrap().name(), "ru");
        assert!(multi.detect_language("qqq").is_none());
        assert!(multi.detect_language("r2d2").is_none());
    }

    #[test]
    fn descriptions_fall_back_to_the_detected_language() {
        let multi = test_multi_morphology();
        let (description, detected) = multi.word_description(None, "книгы");
        assert_eq!(description, "книг.книгы.");
        assert_eq!(detected.unwrap().name(), "ru");
    }

    #[test]
    fn suggested_language_answers_without_detection() {
        let multi = test_multi_morphology();
        let ru = multi.dictionary("ru").unwrap();
        let (description, detected) = multi.word_description(Some(ru), "книгы");
        assert_eq!(description, "книг.книгы.");
        assert!(detected.is_none());
    }

    #[test]
    fn detection_outranks_a_main_language_prediction() {
        let multi = test_same_script_morphology();
        // the main language can only predict a lemma for "mostola"; the
        // second language knows the word form exactly and must win
        let (description, detected) = multi.word_description(None, "mostola");
        assert_eq!(description, "mostolo.mostola.");
        assert_eq!(detected.unwrap().name(), "la");
    }

    #[test]
    fn unknown_words_imitate_in_the_main_language() {
        let multi = test_multi_morphology();
        let (description, detected) = multi.word_description(None, "qqq");
        assert_eq!(description, "qqq.");
        assert!(detected.is_none());
    }

    #[test]
    fn forms_carry_the_detected_language_forward() {
        let multi = test_multi_morphology();
        let (forms, detected) = multi.word_forms(None, "столы");
        assert!(!forms.is_empty());
        assert_eq!(detected.unwrap().name(), "ru");
        let (forms, detected) = multi.word_forms(detected, "книге");
        assert!(!forms.is_empty());
        assert_eq!(detected.unwrap().name(), "ru");
    }
}
