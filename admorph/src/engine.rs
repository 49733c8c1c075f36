//! The top-level analysis engine: dictionaries loaded once, then documents
//! indexed and searched against phrase lists.

use std::path::{Path, PathBuf};

use crate::constants::DEFAULT_DESCRIPTION_CACHE_SIZE;
use crate::dictionary::multilang::MultiMorphology;
use crate::dictionary::DictionaryError;
use crate::document::Document;
use crate::paths::default_dictionary_root;
use crate::tokenizer::case_handling::normalize_text;
use crate::tokenizer::Tokenize;

#[derive(Debug, Clone)]
pub struct MorphConfig {
    /// Per-dictionary capacity of the word description cache.
    pub description_cache_size: usize,
}

impl Default for MorphConfig {
    fn default() -> MorphConfig {
        MorphConfig {
            description_cache_size: DEFAULT_DESCRIPTION_CACHE_SIZE,
        }
    }
}

pub struct Morph {
    morphology: MultiMorphology,
}

impl Morph {
    /// Loads every dictionary under `dictionary_root`, or under the default
    /// root (honoring its environment override) when none is given.
    pub fn new(dictionary_root: Option<&Path>, config: &MorphConfig) -> Result<Morph, DictionaryError> {
        let root: PathBuf = match dictionary_root {
            Some(root) => root.to_path_buf(),
            None => default_dictionary_root(),
        };
        log::info!("loading dictionaries from {:?}", root);
        let morphology = MultiMorphology::from_root(&root, config.description_cache_size)?;
        Ok(Morph { morphology })
    }

    pub fn from_morphology(morphology: MultiMorphology) -> Morph {
        Morph { morphology }
    }

    pub fn morphology(&self) -> &MultiMorphology {
        &self.morphology
    }

    /// Indexes `text` for repeated searches.
    pub fn document(&self, text: &str) -> Document {
        Document::new(text, &self.morphology)
    }

    /// How much of `text` the words of `search` cover, in `0.0..=1.0`.
    /// Returns `0.0` outright when the search is longer than the text.
    pub fn intersect(&self, text: &str, search: &str) -> f64 {
        self.intersection_ratio(text, search, true)
    }

    /// Like [`intersect`](Self::intersect), without the length guard; a
    /// search longer than the text can still score.
    pub fn intersect_any(&self, text: &str, search: &str) -> f64 {
        self.intersection_ratio(text, search, false)
    }

    fn intersection_ratio(&self, text: &str, search: &str, bounded: bool) -> f64 {
        let document = self.document(text);
        if bounded && search.len() > document.original_len() {
            return 0.0;
        }
        let normalized = normalize_text(search);
        let mut matched = 0;
        for part in normalized.split(' ').filter(|part| !part.is_empty()) {
            matched += document
                .find_multi_intersection(&self.morphology, part)
                .len();
        }
        if matched >= document.original_len() {
            1.0
        } else {
            matched as f64 / document.original_len() as f64
        }
    }

    /// Whether any phrase of `search` occurs in `text`, in any inflection.
    pub fn contains(&self, text: &str, search: &str) -> bool {
        let document = self.document(text);
        let normalized = normalize_text(search);
        !document
            .find_multi_intersection(&self.morphology, &normalized)
            .is_empty()
    }

    /// Rewrites `text` word by word into lemmas, lowercased and joined with
    /// single spaces. Unanalyzable words stay as they are.
    pub fn normalize_phrase(&self, text: &str) -> String {
        let normalized = normalize_text(text);
        let mut result = String::with_capacity(normalized.len());
        let mut suggested = None;
        for (_, token) in normalized.words() {
            let (description, detected) = self.morphology.word_description(suggested, token);
            suggested = detected.or(suggested);
            if let Some(lemma) = description
                .split(crate::constants::DESCRIPTION_TERMINATOR)
                .find(|segment| !segment.is_empty())
            {
                if !result.is_empty() {
                    result.push(' ');
                }
                result.push_str(lemma);
            }
        }
        result
    }
}
