use word::Words;

pub mod case_handling;
pub mod word;

pub trait Tokenize {
    fn words(&self) -> Words;
}

impl Tokenize for str {
    fn words(&self) -> Words {
        Words::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(s: &str) -> Vec<(usize, &str)> {
        s.words().collect()
    }

    #[test]
    fn basic() {
        assert_eq!(
            tokens("this is an ordinary sentence!"),
            vec![(0, "this"), (5, "is"), (8, "an"), (11, "ordinary"), (20, "sentence")]
        );
    }

    #[test]
    fn inner_punctuation_stays_inside() {
        assert_eq!(tokens("don't"), vec![(0, "don't")]);
        assert_eq!(tokens("как-нибудь"), vec![(0, "как-нибудь")]);
        assert_eq!(tokens("foo_bar baz"), vec![(0, "foo_bar"), (8, "baz")]);
    }

    #[test]
    fn edge_punctuation_stays_outside() {
        assert_eq!(tokens("-foo- 'bar'"), vec![(1, "foo"), (7, "bar")]);
        assert_eq!(tokens("a--b"), vec![(0, "a"), (3, "b")]);
        assert_eq!(tokens("trailing-"), vec![(0, "trailing")]);
    }

    #[test]
    fn digits_are_tokens() {
        assert_eq!(tokens("429 ответов"), vec![(0, "429"), (4, "ответов")]);
    }

    #[test]
    fn empty_and_garbage_only() {
        assert_eq!(tokens(""), Vec::<(usize, &str)>::new());
        assert_eq!(tokens("... !!! ---"), Vec::<(usize, &str)>::new());
    }
}
