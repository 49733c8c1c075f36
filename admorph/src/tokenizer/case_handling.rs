use smol_str::SmolStr;
use unic_ucd_category::GeneralCategory;

/// Characters tolerated in a lemmatizable word besides letters.
const NON_GARBAGE_EXTRA_CHARS: &[char] = &['-', '\'', '`'];

#[inline(always)]
pub fn lower_case(s: &str) -> SmolStr {
    s.chars().flat_map(|c| c.to_lowercase()).collect::<SmolStr>()
}

/// Locale-independent normalization applied to every document and query
/// before analysis.
#[inline(always)]
pub fn normalize_text(s: &str) -> String {
    s.chars().flat_map(|c| c.to_lowercase()).collect()
}

#[inline(always)]
fn is_letter(ch: char) -> bool {
    GeneralCategory::of(ch).is_letter()
}

/// A garbage word contains anything besides letters, `-`, `'` and `` ` ``
/// (numbers, identifiers with digits). Garbage words are never lemmatized.
pub fn is_garbage_word(word: &str) -> bool {
    word.chars()
        .any(|ch| !is_letter(ch) && !NON_GARBAGE_EXTRA_CHARS.contains(&ch))
}
