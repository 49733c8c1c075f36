//! Small in-memory dictionaries shared by the dictionary, document and
//! engine tests.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use super::morphology::Morphology;
use super::mrd::MorphologyBase;
use super::multilang::MultiMorphology;
use super::{compile_automaton, Dictionary};
use crate::automaton::CompactAutomaton;
use crate::constants::{DICTIONARY_GRAMMAR_FILE, DICTIONARY_MRD_FILE};

/// Three lemmas over two flexion models, with two prefix sets. "stol"
/// inflects as stol/stola/stolu, "pil" as pil/pilsa, "dom" as dom/doma/domu.
pub(crate) const TEST_MRD: &str = "\
2
%*aa%a*ab%u*ac
%*ba%sa*bb
0
0
2
kvazi, mega
super
3
stol 0 0 - - -
pil 1 0 - - -
dom 0 0 - - 0
";

pub(crate) const TEST_GRAMMAR: &str = "\
// test grammar table
aa 1 S sg,nom
ab 1 S sg,gen
ac 1 S sg,dat
ba 1 V inf
";

/// A second language: "книг" and "стол" inflecting with Cyrillic flexions.
pub(crate) const TEST_MRD_RU: &str = "\
1
%*ca%ы*cb%е*cc
0
0
0
2
книг 0 0 - - -
стол 0 0 - - -
";

pub(crate) const TEST_GRAMMAR_RU: &str = "\
ca 1 S sg,nom
cb 1 S pl,nom
cc 1 S sg,dat
";

/// A Latin-script language sharing its alphabet with [`TEST_MRD`]:
/// "mostol" inflects as mostolo/mostola.
pub(crate) const TEST_MRD_LA: &str = "\
1
%o*da%a*db
0
0
0
1
mostol 0 0 - - -
";

pub(crate) const TEST_GRAMMAR_LA: &str = "\
da 1 S sg
db 1 S pl
";

pub(crate) fn base_from(mrd: &str, grammar: &str, load_lemmas: bool) -> MorphologyBase {
    MorphologyBase::from_readers(Cursor::new(mrd), Cursor::new(grammar), load_lemmas).unwrap()
}

pub(crate) fn test_base(load_lemmas: bool) -> MorphologyBase {
    base_from(TEST_MRD, TEST_GRAMMAR, load_lemmas)
}

pub(crate) fn morphology_from(mrd: &str, grammar: &str) -> Morphology {
    let full = base_from(mrd, grammar, true);
    let builder = compile_automaton(&full).unwrap();
    let mut buffer = Vec::new();
    builder.write(&mut buffer).unwrap();
    let automaton = CompactAutomaton::from_bytes(&buffer).unwrap();
    Morphology::new(base_from(mrd, grammar, false), automaton, 64)
}

pub(crate) fn test_morphology() -> Morphology {
    morphology_from(TEST_MRD, TEST_GRAMMAR)
}

fn test_dictionary(name: &str, mrd: &str, grammar: &str) -> Dictionary {
    Dictionary {
        name: name.to_string(),
        path: PathBuf::from(name),
        morphology: morphology_from(mrd, grammar),
    }
}

/// Two languages, "en" first, so "en" is the main one.
pub(crate) fn test_multi_morphology() -> MultiMorphology {
    MultiMorphology::new(vec![
        test_dictionary("en", TEST_MRD, TEST_GRAMMAR),
        test_dictionary("ru", TEST_MRD_RU, TEST_GRAMMAR_RU),
    ])
}

/// Two languages over the same alphabet, "en" as the main one.
pub(crate) fn test_same_script_morphology() -> MultiMorphology {
    MultiMorphology::new(vec![
        test_dictionary("en", TEST_MRD, TEST_GRAMMAR),
        test_dictionary("la", TEST_MRD_LA, TEST_GRAMMAR_LA),
    ])
}

/// Writes the Latin test base into `root/folder` without a compiled
/// automaton.
pub(crate) fn write_test_dictionary(root: &Path, folder: &str) {
    write_dictionary(root, folder, TEST_MRD, TEST_GRAMMAR);
}

pub(crate) fn write_test_dictionary_ru(root: &Path, folder: &str) {
    write_dictionary(root, folder, TEST_MRD_RU, TEST_GRAMMAR_RU);
}

fn write_dictionary(root: &Path, folder: &str, mrd: &str, grammar: &str) {
    let path = root.join(folder);
    fs::create_dir_all(&path).unwrap();
    fs::write(path.join(DICTIONARY_MRD_FILE), mrd).unwrap();
    fs::write(path.join(DICTIONARY_GRAMMAR_FILE), grammar).unwrap();
}
