//! Morphological analysis of single words: lemmatization and word-form
//! generation over the compiled automaton, with a small description cache
//! in front of the hot path.

use std::collections::VecDeque;

use hashbrown::HashMap;
use parking_lot::Mutex;
use serde::Serialize;
use smol_str::SmolStr;

use super::mrd::{decode_annotation, Annotation, Grammar, MorphologyBase};
use crate::automaton::{AutomatonOutput, CompactAutomaton};
use crate::constants::{
    ANNOTATION_DELIMITER, DESCRIPTION_TERMINATOR, MIN_BASE_LENGTH, MIN_MATCH_FOR_PREDICTION,
};
use crate::tokenizer::case_handling::is_garbage_word;
use crate::types::{FlexModelIndex, Label};

/// One analysis result: a generated word form with the split into base and
/// flexion that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct WordForm {
    pub word: SmolStr,
    pub flexion_len: usize,
    pub base_len: usize,
    pub flex_model_index: FlexModelIndex,
    pub ancode: SmolStr,
    /// How many equivalent analyses produced this form.
    pub frequency: u32,
}

struct ParsedOutput {
    annotation: Annotation,
    /// Characters the automaton walked past the end of the query word,
    /// excluding the annotation. Empty for exact matches.
    completion_len: usize,
    matched_len: usize,
    known_prefix_len: usize,
    is_prediction: bool,
}

fn parse_output(output: &AutomatonOutput) -> Option<ParsedOutput> {
    let (completion, annotation) = output.text.split_once(ANNOTATION_DELIMITER)?;
    let annotation = decode_annotation(annotation)?;
    Some(ParsedOutput {
        annotation,
        completion_len: completion.chars().count(),
        matched_len: output.prefix_len,
        known_prefix_len: 0,
        is_prediction: output.is_prediction,
    })
}

pub struct Morphology {
    base: MorphologyBase,
    automaton: CompactAutomaton,
    cache: Mutex<DescriptionCache>,
}

impl Morphology {
    pub fn new(base: MorphologyBase, automaton: CompactAutomaton, cache_size: usize) -> Morphology {
        Morphology {
            base,
            automaton,
            cache: Mutex::new(DescriptionCache::new(cache_size)),
        }
    }

    pub fn base(&self) -> &MorphologyBase {
        &self.base
    }

    pub fn grammar(&self, form: &WordForm) -> Option<&Grammar> {
        self.base.grammar(&form.ancode)
    }

    /// The lemma of every analysis of `word`.
    pub fn lemmas(&self, word: &str) -> Vec<WordForm> {
        self.analyze(word, true, false)
    }

    /// Every form of every analysis of `word`.
    pub fn forms(&self, word: &str) -> Vec<WordForm> {
        self.analyze(word, false, false)
    }

    /// How many characters at the end of `word` the automaton recognizes.
    /// Equals the word length when the whole word is a known form; used to
    /// pick a language for an unknown word.
    pub fn known_part_of_word(&self, word: &str) -> usize {
        let reversed: Vec<Label> = word.chars().rev().collect();
        self.automaton.recognized_prefix_len(&reversed)
    }

    /// Full analysis. `only_lemmas` keeps the first form of every paradigm;
    /// `distinct_ancodes` keeps identically written forms apart when their
    /// grammar differs.
    pub fn analyze(&self, word: &str, only_lemmas: bool, distinct_ancodes: bool) -> Vec<WordForm> {
        let chars: Vec<Label> = word.chars().collect();
        let reversed: Vec<Label> = chars.iter().rev().copied().collect();
        let raw = self.automaton.outputs(&reversed, MIN_MATCH_FOR_PREDICTION);
        let mut outputs: Vec<ParsedOutput> = raw.iter().filter_map(parse_output).collect();
        self.filter_productive_outputs(&mut outputs, &chars);

        let mut forms: Vec<WordForm> = Vec::new();
        let mut analyzed_models: Vec<FlexModelIndex> = Vec::new();
        for output in &outputs {
            if analyzed_models.contains(&output.annotation.flex_model_index) {
                continue;
            }
            analyzed_models.push(output.annotation.flex_model_index);
            let base_len = if output.is_prediction {
                match chars.len().checked_sub(output.annotation.flexion_len) {
                    Some(base_len) if base_len >= MIN_BASE_LENGTH => base_len,
                    _ => continue,
                }
            } else {
                output.known_prefix_len + output.annotation.base_len
            };
            for variation in self.word_variations(&chars, output, base_len, only_lemmas) {
                match forms.iter_mut().find(|form| {
                    form.word == variation.word
                        && (!distinct_ancodes || form.ancode == variation.ancode)
                }) {
                    Some(form) => form.frequency += 1,
                    None => forms.push(variation),
                }
            }
        }
        forms.sort_by(|a, b| b.frequency.cmp(&a.frequency));
        forms
    }

    /// Reclassifies predictions that only failed to match because of an
    /// unknown-to-the-automaton but dictionary-listed prefix chain. When any
    /// prediction converts, the remaining true predictions are discarded.
    fn filter_productive_outputs(&self, outputs: &mut Vec<ParsedOutput>, word: &[Label]) {
        let mut converted = false;
        for output in outputs.iter_mut() {
            if !output.is_prediction || output.completion_len != 0 {
                continue;
            }
            let prefix_len = word.len() - output.matched_len;
            if self.base.has_known_prefix(word, prefix_len) {
                output.is_prediction = false;
                output.known_prefix_len = prefix_len;
                converted = true;
            }
        }
        if converted {
            outputs.retain(|output| !output.is_prediction);
        }
    }

    /// All forms the flexion model of `output` generates from the base
    /// hidden in `word`. `base_len` counts characters before the flexion.
    fn word_variations(
        &self,
        word: &[Label],
        output: &ParsedOutput,
        base_len: usize,
        only_lemma: bool,
    ) -> Vec<WordForm> {
        let model = match self.base.flex_model(output.annotation.flex_model_index) {
            Some(model) => model,
            None => return Vec::new(),
        };
        let base_start = match word
            .len()
            .checked_sub(output.annotation.flexion_len)
            .and_then(|end| end.checked_sub(base_len))
        {
            Some(start) => start,
            None => return Vec::new(),
        };
        let word_base: String = word[base_start..base_start + base_len].iter().collect();

        let count = if only_lemma { 1 } else { model.len() };
        let mut variations = Vec::with_capacity(count);
        for variance in model.iter().take(count) {
            let mut text = String::new();
            if let Some(prefix) = &variance.prefix {
                text.push_str(prefix);
            }
            text.push_str(&word_base);
            let mut flexion_len = 0;
            if let Some(flexion) = &variance.flexion {
                text.push_str(flexion);
                flexion_len = flexion.chars().count();
            }
            variations.push(WordForm {
                word: SmolStr::new(text),
                flexion_len,
                base_len,
                flex_model_index: output.annotation.flex_model_index,
                ancode: variance.ancode.clone(),
                frequency: 0,
            });
        }
        variations
    }

    /// The `.`-terminated description of `word`: every lemma that differs
    /// from the word, then the word itself. Garbage words and words without
    /// analyses imitate a description from the word alone; with
    /// `dont_imitate` those return `None` instead. The second value flags a
    /// garbage word.
    pub fn word_description(&self, word: &str, dont_imitate: bool) -> (Option<String>, bool) {
        {
            let cache = self.cache.lock();
            if let Some(description) = cache.get(word) {
                if dont_imitate {
                    return (None, false);
                }
                return (Some(description.clone()), false);
            }
        }
        if is_garbage_word(word) {
            if dont_imitate {
                return (None, true);
            }
            let mut description = String::with_capacity(word.len() + 1);
            description.push_str(word);
            description.push(DESCRIPTION_TERMINATOR);
            return (Some(description), true);
        }
        let lemmas = self.lemmas(word);
        if lemmas.is_empty() && dont_imitate {
            return (None, false);
        }
        let mut description = String::new();
        for lemma in &lemmas {
            if lemma.word != word {
                description.push_str(&lemma.word);
                description.push(DESCRIPTION_TERMINATOR);
            }
        }
        description.push_str(word);
        description.push(DESCRIPTION_TERMINATOR);
        self.cache
            .lock()
            .put(SmolStr::new(word), description.clone());
        (Some(description), false)
    }
}

/// FIFO cache of word descriptions. Lookups during document indexing repeat
/// heavily, so even a small capacity pays off.
struct DescriptionCache {
    entries: HashMap<SmolStr, String>,
    order: VecDeque<SmolStr>,
    capacity: usize,
}

impl DescriptionCache {
    fn new(capacity: usize) -> DescriptionCache {
        DescriptionCache {
            entries: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    fn get(&self, word: &str) -> Option<&String> {
        self.entries.get(word)
    }

    fn put(&mut self, word: SmolStr, description: String) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.insert(word.clone(), description).is_none() {
            self.order.push_back(word);
            if self.order.len() > self.capacity {
                if let Some(oldest) = self.order.pop_front() {
                    self.entries.remove(&oldest);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::testutil::test_morphology;

    fn words(forms: &[WordForm]) -> Vec<&str> {
        forms.iter().map(|form| form.word.as_str()).collect()
    }

    #[test]
    fn exact_match_finds_the_lemma() {
        let morphology = test_morphology();
        let lemmas = morphology.lemmas("stola");
        assert_eq!(words(&lemmas), ["stol"]);
        assert_eq!(lemmas[0].base_len, 4);
        assert_eq!(lemmas[0].flexion_len, 0);
        assert_eq!(morphology.grammar(&lemmas[0]).unwrap().part_of_speech, "S");
    }

    #[test]
    fn all_forms_follow_the_model() {
        let morphology = test_morphology();
        let forms = morphology.forms("stola");
        assert_eq!(words(&forms), ["stol", "stola", "stolu"]);
    }

    #[test]
    fn unknown_word_with_known_ending_is_predicted() {
        let morphology = test_morphology();
        // "mostola" is not in the base but ends like "stola"
        let lemmas = morphology.lemmas("mostola");
        assert_eq!(words(&lemmas), ["mostol"]);
    }

    #[test]
    fn short_bases_are_not_predicted() {
        let morphology = test_morphology();
        // "ilsa" ends like "pilsa", but stripping the flexion leaves a
        // two-character base
        assert!(morphology.lemmas("ilsa").is_empty());
    }

    #[test]
    fn known_prefix_makes_the_match_exact() {
        let morphology = test_morphology();
        let lemmas = morphology.lemmas("kvazistola");
        assert_eq!(words(&lemmas), ["kvazistol"]);
        // a chained prefix works too
        let lemmas = morphology.lemmas("kvazisuperstola");
        assert_eq!(words(&lemmas), ["kvazisuperstol"]);
    }

    #[test]
    fn known_part_ranks_whole_words_highest() {
        let morphology = test_morphology();
        assert_eq!(morphology.known_part_of_word("stola"), 5);
        assert!(morphology.known_part_of_word("mostola") < 7);
        assert_eq!(morphology.known_part_of_word("xyz"), 0);
    }

    #[test]
    fn descriptions_list_lemmas_then_the_word() {
        let morphology = test_morphology();
        let (description, garbage) = morphology.word_description("stola", false);
        assert_eq!(description.as_deref(), Some("stol.stola."));
        assert!(!garbage);
    }

    #[test]
    fn unanalyzable_words_are_imitated_or_dropped() {
        let morphology = test_morphology();
        let (description, garbage) = morphology.word_description("pila", false);
        assert_eq!(description.as_deref(), Some("pila."));
        assert!(!garbage);
        let (description, _) = morphology.word_description("zzz", true);
        assert_eq!(description, None);
    }

    #[test]
    fn garbage_words_bypass_analysis() {
        let morphology = test_morphology();
        let (description, garbage) = morphology.word_description("r2d2", false);
        assert_eq!(description.as_deref(), Some("r2d2."));
        assert!(garbage);
        let (description, garbage) = morphology.word_description("429", true);
        assert_eq!(description, None);
        assert!(garbage);
    }

    #[test]
    fn cached_descriptions_suppress_reimitation() {
        let morphology = test_morphology();
        let (first, _) = morphology.word_description("stola", false);
        assert!(first.is_some());
        // a cache hit with dont_imitate reports the word as already seen
        let (second, _) = morphology.word_description("stola", true);
        assert_eq!(second, None);
    }

    #[test]
    fn cache_evicts_in_insertion_order() {
        let mut cache = DescriptionCache::new(2);
        cache.put("a".into(), "a.".into());
        cache.put("b".into(), "b.".into());
        cache.put("c".into(), "c.".into());
        assert!(cache.get("a").is_none());
        assert_eq!(cache.get("b").map(String::as_str), Some("b."));
        assert_eq!(cache.get("c").map(String::as_str), Some("c."));
    }
}
