/// Characters that may occur inside a word but never start or end one.
const WORD_EXTRA_CHARS: &[char] = &['-', '\'', '`', '_'];

#[inline(always)]
fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric()
}

#[inline(always)]
fn is_word_extra_char(ch: char) -> bool {
    WORD_EXTRA_CHARS.contains(&ch)
}

/// Iterator over the words of a string, yielding `(byte_offset, word)`.
///
/// A word is a maximal run of alphanumeric characters; `-`, `'`, `` ` ``
/// and `_` join two runs into a single word but are dropped at word edges.
pub struct Words<'a> {
    text: &'a str,
    cursor: usize,
}

impl<'a> Words<'a> {
    pub fn new(text: &'a str) -> Words<'a> {
        Words { text, cursor: 0 }
    }
}

impl<'a> Iterator for Words<'a> {
    type Item = (usize, &'a str);

    fn next(&mut self) -> Option<(usize, &'a str)> {
        let rest = &self.text[self.cursor..];
        let (skip, first) = rest.char_indices().find(|&(_, ch)| is_word_char(ch))?;

        let start = self.cursor + skip;
        let mut pos = start + first.len_utf8();

        loop {
            let mut chars = self.text[pos..].chars();
            match chars.next() {
                Some(ch) if is_word_char(ch) => {
                    pos += ch.len_utf8();
                }
                // a joiner stays in the word only when a word character follows
                Some(ch) if is_word_extra_char(ch) => match chars.next() {
                    Some(next) if is_word_char(next) => {
                        pos += ch.len_utf8() + next.len_utf8();
                    }
                    _ => break,
                },
                _ => break,
            }
        }

        self.cursor = pos;
        Some((start, &self.text[start..pos]))
    }
}
