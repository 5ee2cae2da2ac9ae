//! Content filtering for chat text
//!
//! The router only asks whether a piece of text must be rejected; how
//! that is decided lives behind `ContentFilter`.

/// Decides whether chat text may be broadcast
pub trait ContentFilter: Send {
    /// Returns `true` when the text must be rejected
    fn check(&self, text: &str) -> bool;
}

/// Accepts everything
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAll;

impl ContentFilter for AllowAll {
    fn check(&self, _text: &str) -> bool {
        false
    }
}

/// Rejects text containing any listed word
///
/// Matching is case-insensitive and whole-word: text is split on every
/// non-alphanumeric character, so "class" does not trip a filter on "ass".
#[derive(Debug, Clone, Default)]
pub struct WordFilter {
    words: Vec<String>,
}

impl WordFilter {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl ContentFilter for WordFilter {
    fn check(&self, text: &str) -> bool {
        if self.words.is_empty() {
            return false;
        }
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|token| !token.is_empty())
            .any(|token| {
                let token = token.to_lowercase();
                self.words.iter().any(|w| *w == token)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_all() {
        assert!(!AllowAll.check("anything at all"));
    }

    #[test]
    fn test_word_filter_case_insensitive() {
        let filter = WordFilter::new(["darn"]);
        assert!(filter.check("oh DARN it"));
        assert!(filter.check("darn!"));
        assert!(!filter.check("hello there"));
    }

    #[test]
    fn test_word_filter_whole_words_only() {
        let filter = WordFilter::new(["ass"]);
        assert!(!filter.check("first class passage"));
        assert!(filter.check("you ass"));
    }

    #[test]
    fn test_word_filter_ignores_blank_entries() {
        let filter = WordFilter::new(["", "  "]);
        assert!(filter.is_empty());
        assert!(!filter.check(""));
    }
}
