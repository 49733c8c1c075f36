//! Dictionary loading: one dictionary per folder under the dictionary root,
//! each holding a morphological base, a grammar table and the compiled
//! word-form automaton. The automaton is compiled on first use when the
//! folder only ships the text base.

pub mod morphology;
pub mod mrd;
pub mod multilang;

#[cfg(test)]
pub(crate) mod testutil;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::automaton::{AutomatonBuilder, AutomatonError, CompactAutomaton};
use crate::constants::{DICTIONARY_AUTOMAT_FILE, DICTIONARY_GRAMMAR_FILE, DICTIONARY_MRD_FILE};

pub use self::morphology::{Morphology, WordForm};
pub use self::mrd::{MorphologyBase, MrdError};
pub use self::multilang::MultiMorphology;

#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("dictionary io error")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Mrd(#[from] MrdError),
    #[error(transparent)]
    Automaton(#[from] AutomatonError),
    #[error("folder name {0:?} does not name a dictionary")]
    BadFolderName(String),
    #[error("no dictionaries found under {0:?}")]
    NoDictionaries(PathBuf),
}

/// One loaded language: its name, folder and analysis machinery.
pub struct Dictionary {
    name: String,
    path: PathBuf,
    morphology: Morphology,
}

impl Dictionary {
    /// Loads the dictionary from `root/folder`, compiling the automaton
    /// file first when it is missing.
    pub fn load(root: &Path, folder: &str, cache_size: usize) -> Result<Dictionary, DictionaryError> {
        let name = extract_dictionary_name(folder)
            .ok_or_else(|| DictionaryError::BadFolderName(folder.to_string()))?;
        let path = root.join(folder);
        let mrd_path = path.join(DICTIONARY_MRD_FILE);
        let grammar_path = path.join(DICTIONARY_GRAMMAR_FILE);
        let automat_path = path.join(DICTIONARY_AUTOMAT_FILE);

        if !automat_path.exists() {
            log::info!("compiling word-form automaton for dictionary {}", name);
            let base = MorphologyBase::from_files(&mrd_path, &grammar_path, true)?;
            let builder = compile_automaton(&base)?;
            builder.write_to_file(&automat_path)?;
        }

        let base = MorphologyBase::from_files(&mrd_path, &grammar_path, false)?;
        let automaton = CompactAutomaton::from_file(&automat_path)?;
        Ok(Dictionary {
            name: name.to_string(),
            path,
            morphology: Morphology::new(base, automaton, cache_size),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn morphology(&self) -> &Morphology {
        &self.morphology
    }
}

/// Compiles the word-form automaton from a base loaded with lemmas.
pub fn compile_automaton(base: &MorphologyBase) -> Result<AutomatonBuilder, MrdError> {
    let mut words = base.generate_all_words()?;
    words.sort_unstable();
    words.dedup();
    let mut builder = AutomatonBuilder::new();
    for word in &words {
        builder.add_word(word);
    }
    builder.finish();
    Ok(builder)
}

/// Dictionary folders are named by an optional numeric ordering prefix
/// followed by the language name, like `01ru`. Anything else is not a
/// dictionary folder.
pub fn extract_dictionary_name(folder: &str) -> Option<&str> {
    let digits_end = folder
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(folder.len());
    let name = &folder[digits_end..];
    if !name.is_empty() && name.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(name)
    } else {
        None
    }
}

/// Loads every dictionary folder under `root` in folder name order. Folders
/// that fail to load are skipped with a warning; an empty result is an
/// error since analysis needs at least a main language.
pub fn load_dictionaries(root: &Path, cache_size: usize) -> Result<Vec<Dictionary>, DictionaryError> {
    let mut folders: Vec<String> = fs::read_dir(root)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|folder| extract_dictionary_name(folder).is_some())
        .collect();
    folders.sort_unstable();

    let mut dictionaries = Vec::with_capacity(folders.len());
    for folder in &folders {
        match Dictionary::load(root, folder, cache_size) {
            Ok(dictionary) => {
                log::info!("loaded dictionary {} from {:?}", dictionary.name(), folder);
                dictionaries.push(dictionary);
            }
            Err(error) => {
                log::warn!("skipping dictionary folder {:?}: {}", folder, error);
            }
        }
    }
    if dictionaries.is_empty() {
        return Err(DictionaryError::NoDictionaries(root.to_path_buf()));
    }
    Ok(dictionaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::testutil;

    #[test]
    fn folder_names() {
        assert_eq!(extract_dictionary_name("01ru"), Some("ru"));
        assert_eq!(extract_dictionary_name("en"), Some("en"));
        assert_eq!(extract_dictionary_name("02"), None);
        assert_eq!(extract_dictionary_name("ru2"), None);
        assert_eq!(extract_dictionary_name(""), None);
        assert_eq!(extract_dictionary_name("01_ru"), None);
    }

    #[test]
    fn loads_and_compiles_a_dictionary_folder() {
        let root = tempfile::tempdir().unwrap();
        testutil::write_test_dictionary(root.path(), "01en");
        let dictionary = Dictionary::load(root.path(), "01en", 16).unwrap();
        assert_eq!(dictionary.name(), "en");
        // the automaton file was compiled next to the base
        assert!(root.path().join("01en").join("automat.save").exists());
        assert_eq!(dictionary.morphology().lemmas("stola").len(), 1);
    }

    #[test]
    fn discovery_skips_foreign_folders() {
        let root = tempfile::tempdir().unwrap();
        testutil::write_test_dictionary(root.path(), "02ru");
        testutil::write_test_dictionary(root.path(), "01en");
        std::fs::create_dir(root.path().join("not-a-dict")).unwrap();
        std::fs::create_dir(root.path().join("03broken")).unwrap();
        let dictionaries = load_dictionaries(root.path(), 16).unwrap();
        let names: Vec<&str> = dictionaries.iter().map(|d| d.name()).collect();
        assert_eq!(names, ["en", "ru"]);
    }

    #[test]
    fn empty_root_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_dictionaries(root.path(), 16),
            Err(DictionaryError::NoDictionaries(_))
        ));
    }
}
