//! Parsing of the morphological base: the `.mrd` file with flexion models,
//! prefix sets and lemmas, and the `.tab` grammar table mapping ancodes to
//! parts of speech and grammemes.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use hashbrown::HashMap;
use serde::Serialize;
use smol_str::SmolStr;
use thiserror::Error;

use crate::tokenizer::case_handling::lower_case;
use crate::types::{FlexModelIndex, Label};

/// Inline comments in flexion model lines, a remnant of hand-edited bases.
const MRD_COMMENT_MARKER: &str = "q//q";
const GRAMMAR_COMMENT_MARKER: &str = "//";
const EMPTY_BASE_MARKER: &str = "#";
const NO_VALUE_MARKER: &str = "-";

#[derive(Debug, Error)]
pub enum MrdError {
    #[error("morphological base io error")]
    Io(#[from] io::Error),
    #[error("malformed morphological base: {0}")]
    Malformed(String),
}

/// One grammar table entry. The ancode is the key shared with the `.mrd`
/// flexion models.
#[derive(Debug, Clone, Serialize)]
pub struct Grammar {
    pub ancode: SmolStr,
    pub part_of_speech: SmolStr,
    pub grammemes: Option<SmolStr>,
}

/// One way a lemma base can be inflected: an optional flexion appended after
/// the base and an optional prefix before it, tagged with an ancode.
#[derive(Debug, Clone)]
pub struct FlexVariance {
    pub flexion: Option<SmolStr>,
    pub ancode: SmolStr,
    pub prefix: Option<SmolStr>,
}

/// All inflections of one paradigm. The first variance produces the lemma.
pub type FlexModel = Vec<FlexVariance>;

#[derive(Debug, Clone)]
pub struct Lemma {
    pub base: Option<SmolStr>,
    pub flex_model_no: usize,
    pub ancode: Option<SmolStr>,
    pub prefix_set_no: Option<usize>,
}

/// In-memory form of one dictionary's `.mrd` and `.tab` files. Lemmas are
/// only kept when the base is loaded for automaton compilation; analysis
/// needs the models and prefixes alone.
pub struct MorphologyBase {
    grammars: HashMap<SmolStr, Grammar>,
    flex_models: Vec<FlexModel>,
    prefix_sets: Vec<Vec<SmolStr>>,
    all_prefixes: Vec<SmolStr>,
    lemmas: Option<Vec<Lemma>>,
}

impl MorphologyBase {
    pub fn from_files(
        mrd_path: &Path,
        grammar_path: &Path,
        load_lemmas: bool,
    ) -> Result<MorphologyBase, MrdError> {
        let mrd = BufReader::new(File::open(mrd_path)?);
        let grammar = BufReader::new(File::open(grammar_path)?);
        MorphologyBase::from_readers(mrd, grammar, load_lemmas)
    }

    pub fn from_readers<M: BufRead, G: BufRead>(
        mrd: M,
        grammar: G,
        load_lemmas: bool,
    ) -> Result<MorphologyBase, MrdError> {
        let grammars = read_grammar_table(grammar)?;

        let mut lines = mrd.lines();
        let flex_models = read_section(&mut lines, parse_flex_model)?;
        skip_section(&mut lines)?; // accent models
        skip_section(&mut lines)?; // session log
        let prefix_sets = read_section(&mut lines, parse_prefix_set)?;
        let lemmas = if load_lemmas {
            let lemmas = read_section(&mut lines, |line| parse_lemma(line, flex_models.len()))?;
            Some(lemmas)
        } else {
            None
        };

        let mut all_prefixes: Vec<SmolStr> = prefix_sets.iter().flatten().cloned().collect();
        all_prefixes.sort_unstable();

        Ok(MorphologyBase {
            grammars,
            flex_models,
            prefix_sets,
            all_prefixes,
            lemmas,
        })
    }

    pub fn grammar(&self, ancode: &str) -> Option<&Grammar> {
        self.grammars.get(ancode)
    }

    pub fn flex_model(&self, index: FlexModelIndex) -> Option<&FlexModel> {
        self.flex_models.get(index as usize)
    }

    pub fn flex_model_count(&self) -> usize {
        self.flex_models.len()
    }

    pub fn prefix_set(&self, index: usize) -> Option<&[SmolStr]> {
        self.prefix_sets.get(index).map(|set| set.as_slice())
    }

    pub fn lemmas(&self) -> &[Lemma] {
        self.lemmas.as_deref().unwrap_or(&[])
    }

    /// Whether the first `prefix_len` characters of `word` decompose into a
    /// chain of prefixes from the base's prefix sets.
    pub fn has_known_prefix(&self, word: &[Label], prefix_len: usize) -> bool {
        for prefix in &self.all_prefixes {
            let len = prefix.chars().count();
            if len == 0 || len > prefix_len || len > word.len() {
                continue;
            }
            if prefix.chars().zip(word.iter()).all(|(a, &b)| a == b) {
                if len == prefix_len {
                    return true;
                }
                return self.has_known_prefix(&word[len..], prefix_len - len);
            }
        }
        false
    }

    /// Every word form the base generates, as automaton input: the reversed
    /// form followed by `|` and the annotation. The list is not sorted.
    pub fn generate_all_words(&self) -> Result<Vec<String>, MrdError> {
        let mut words = Vec::new();
        for lemma in self.lemmas() {
            let model = self.flex_models.get(lemma.flex_model_no).ok_or_else(|| {
                MrdError::Malformed(format!("flexion model {} out of range", lemma.flex_model_no))
            })?;
            let base = lemma.base.as_deref().unwrap_or("");
            let base_len = base.chars().count();
            for variance in model {
                let mut form = String::new();
                if let Some(prefix) = &variance.prefix {
                    form.push_str(prefix);
                }
                form.push_str(base);
                let mut flexion_len = 0;
                if let Some(flexion) = &variance.flexion {
                    form.push_str(flexion);
                    flexion_len = flexion.chars().count();
                }
                let mut word: String = form.chars().rev().collect();
                word.push(crate::constants::ANNOTATION_DELIMITER);
                word.push_str(&encode_annotation(
                    lemma.flex_model_no as FlexModelIndex,
                    flexion_len,
                    base_len,
                ));
                words.push(word);
            }
        }
        Ok(words)
    }
}

/// A form annotation, packed after the `|` delimiter of every automaton
/// word: flexion model in the high bits, then the flexion and base lengths
/// in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Annotation {
    pub flex_model_index: FlexModelIndex,
    pub flexion_len: usize,
    pub base_len: usize,
}

const BASE36_DIGITS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

pub fn encode_annotation(
    flex_model_index: FlexModelIndex,
    flexion_len: usize,
    base_len: usize,
) -> String {
    let mut code =
        ((flex_model_index as u32) << 16) | ((flexion_len as u32) << 8) | base_len as u32;
    if code == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while code > 0 {
        digits.push(BASE36_DIGITS[(code % 36) as usize]);
        code /= 36;
    }
    digits.iter().rev().map(|&d| d as char).collect()
}

pub fn decode_annotation(text: &str) -> Option<Annotation> {
    let code = u32::from_str_radix(text, 36).ok()?;
    Some(Annotation {
        flex_model_index: (code >> 16) as FlexModelIndex,
        flexion_len: ((code >> 8) & 0xff) as usize,
        base_len: (code & 0xff) as usize,
    })
}

/// Reads the count line of a section; a missing or non-numeric count reads
/// as zero, matching lenient hand-edited bases.
fn read_section_size<B: BufRead>(lines: &mut io::Lines<B>) -> Result<usize, MrdError> {
    match lines.next() {
        Some(line) => {
            let line = line?;
            let digits: String = line
                .trim()
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            Ok(digits.parse().unwrap_or(0))
        }
        None => Ok(0),
    }
}

fn read_section<B, T, F>(lines: &mut io::Lines<B>, parse: F) -> Result<Vec<T>, MrdError>
where
    B: BufRead,
    F: Fn(&str) -> Result<T, MrdError>,
{
    let size = read_section_size(lines)?;
    let mut entries = Vec::with_capacity(size);
    for _ in 0..size {
        match lines.next() {
            Some(line) => entries.push(parse(line?.trim())?),
            None => return Err(MrdError::Malformed("truncated section".into())),
        }
    }
    Ok(entries)
}

fn skip_section<B: BufRead>(lines: &mut io::Lines<B>) -> Result<(), MrdError> {
    let size = read_section_size(lines)?;
    for _ in 0..size {
        if let Some(line) = lines.next() {
            line?;
        }
    }
    Ok(())
}

/// A flexion model line is `%`-separated variances, each
/// `flexion*ancode[*prefix]` with an empty flexion for the bare base.
fn parse_flex_model(line: &str) -> Result<FlexModel, MrdError> {
    let mut model = Vec::new();
    for token in line.split('%').filter(|t| !t.is_empty()) {
        let token = match token.find(MRD_COMMENT_MARKER) {
            Some(pos) => &token[..pos],
            None => token,
        };
        let mut parts = token.split('*');
        let flexion = match parts.next() {
            Some("") | None => None,
            Some(flexion) => Some(lower_case(flexion)),
        };
        let ancode = parts
            .next()
            .filter(|a| !a.is_empty())
            .map(SmolStr::new)
            .ok_or_else(|| MrdError::Malformed(format!("flexion variance without ancode: {}", token)))?;
        let prefix = parts.next().filter(|p| !p.is_empty()).map(lower_case);
        model.push(FlexVariance {
            flexion,
            ancode,
            prefix,
        });
    }
    if model.is_empty() {
        return Err(MrdError::Malformed(format!("empty flexion model: {}", line)));
    }
    Ok(model)
}

fn parse_prefix_set(line: &str) -> Result<Vec<SmolStr>, MrdError> {
    Ok(line
        .split(|c| c == ',' || c == ' ')
        .filter(|p| !p.is_empty())
        .map(lower_case)
        .collect())
}

/// A lemma line is `base flex_model accent session ancode prefix_set`, with
/// `#` for an empty base and `-` for absent fields.
fn parse_lemma(line: &str, flex_model_count: usize) -> Result<Lemma, MrdError> {
    let mut fields = line.split_whitespace();
    let mut next = |name: &str| {
        fields
            .next()
            .ok_or_else(|| MrdError::Malformed(format!("lemma without {}: {}", name, line)))
    };
    let base = next("base")?;
    let base = if base == EMPTY_BASE_MARKER {
        None
    } else {
        Some(lower_case(base))
    };
    let flex_model_no: usize = next("flexion model")?
        .parse()
        .map_err(|_| MrdError::Malformed(format!("bad flexion model number: {}", line)))?;
    if flex_model_no >= flex_model_count {
        return Err(MrdError::Malformed(format!(
            "flexion model {} out of range: {}",
            flex_model_no, line
        )));
    }
    next("accent")?;
    next("session")?;
    let ancode = match next("ancode")? {
        NO_VALUE_MARKER => None,
        ancode => Some(SmolStr::new(ancode)),
    };
    let prefix_set_no = match next("prefix set")? {
        NO_VALUE_MARKER => None,
        number => Some(number.parse().map_err(|_| {
            MrdError::Malformed(format!("bad prefix set number: {}", line))
        })?),
    };
    Ok(Lemma {
        base,
        flex_model_no,
        ancode,
        prefix_set_no,
    })
}

/// Grammar table lines are `ancode xcode part_of_speech [grammemes]`; blank
/// and `//` lines are skipped and the first entry per ancode wins.
fn read_grammar_table<G: BufRead>(reader: G) -> Result<HashMap<SmolStr, Grammar>, MrdError> {
    let mut grammars = HashMap::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with(GRAMMAR_COMMENT_MARKER) {
            continue;
        }
        let mut fields = line.split_whitespace();
        let ancode = fields
            .next()
            .map(SmolStr::new)
            .ok_or_else(|| MrdError::Malformed(format!("grammar line without ancode: {}", line)))?;
        let _xcode = fields.next();
        let part_of_speech = fields
            .next()
            .map(SmolStr::new)
            .ok_or_else(|| {
                MrdError::Malformed(format!("grammar line without part of speech: {}", line))
            })?;
        let grammemes = fields.next().map(SmolStr::new);
        grammars.entry(ancode.clone()).or_insert(Grammar {
            ancode,
            part_of_speech,
            grammemes,
        });
    }
    Ok(grammars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::testutil::test_base;

    #[test]
    fn parses_the_sections() {
        let base = test_base(true);
        assert_eq!(base.flex_model_count(), 2);
        let noun = base.flex_model(0).unwrap();
        assert_eq!(noun.len(), 3);
        assert_eq!(noun[0].flexion, None);
        assert_eq!(noun[1].flexion.as_deref(), Some("a"));
        assert_eq!(noun[1].ancode, "ab");
        assert_eq!(base.flex_model(1).unwrap()[1].flexion.as_deref(), Some("sa"));
        assert_eq!(base.prefix_set(0).unwrap(), ["kvazi", "mega"]);
        assert_eq!(base.lemmas().len(), 3);
        assert_eq!(base.lemmas()[0].base.as_deref(), Some("stol"));
        assert_eq!(base.lemmas()[2].prefix_set_no, Some(0));
        assert_eq!(base.grammar("aa").unwrap().part_of_speech, "S");
        assert_eq!(base.grammar("ba").unwrap().grammemes.as_deref(), Some("inf"));
    }

    #[test]
    fn lemmas_are_skipped_unless_requested() {
        let base = test_base(false);
        assert!(base.lemmas().is_empty());
        assert_eq!(base.flex_model_count(), 2);
    }

    #[test]
    fn annotation_round_trip() {
        // "stola": model 0, one-character flexion, four-character base
        assert_eq!(encode_annotation(0, 1, 4), "78");
        let ann = decode_annotation("78").unwrap();
        assert_eq!(ann.flex_model_index, 0);
        assert_eq!(ann.flexion_len, 1);
        assert_eq!(ann.base_len, 4);

        let text = encode_annotation(7, 3, 12);
        assert_eq!(decode_annotation(&text).unwrap().flex_model_index, 7);
    }

    #[test]
    fn generates_annotated_reversed_forms() {
        let base = test_base(true);
        let words = base.generate_all_words().unwrap();
        assert!(words.contains(&"lots|4".to_string()));
        assert!(words.contains(&"alots|78".to_string()));
        assert!(words.contains(&"ulots|78".to_string()));
        assert!(words.contains(&"lip|1EKJ".to_string()));
        assert!(words.contains(&"aslip|1EYR".to_string()));
        assert!(words.contains(&"amod|77".to_string()));
        // 3 lemmas, models of 3, 2 and 3 variances
        assert_eq!(words.len(), 8);
    }

    #[test]
    fn known_prefix_chains() {
        let base = test_base(false);
        let word: Vec<char> = "kvazisuperstol".chars().collect();
        assert!(base.has_known_prefix(&word, 5));
        assert!(base.has_known_prefix(&word, 10));
        assert!(!base.has_known_prefix(&word, 7));
        assert!(!base.has_known_prefix(&word, 0));
    }
}
