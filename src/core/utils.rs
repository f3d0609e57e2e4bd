use std::borrow::Cow;

pub trait NormalizeTerm {
    /// Lowercased, trimmed, inner whitespace collapsed to single spaces.
    fn normalize_term(&self) -> Cow<'_, str>;
}

impl NormalizeTerm for str {
    fn normalize_term(&self) -> Cow<'_, str> {
        let trimmed = self.trim();
        let already_clean = !trimmed.chars().any(|c| c.is_uppercase())
            && !trimmed.contains(|c: char| c.is_whitespace() && c != ' ')
            && !trimmed.contains("  ");
        if already_clean {
            return Cow::Borrowed(trimmed);
        }
        Cow::Owned(trimmed.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase())
    }
}

impl NormalizeTerm for String {
    fn normalize_term(&self) -> Cow<'_, str> {
        self.as_str().normalize_term()
    }
}

pub fn is_alphabetic_word(text: &str) -> bool {
    !text.is_empty() && text.chars().all(char::is_alphabetic)
}

/// Length in characters, which is what the minimum-length filters compare.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

pub fn is_multi_word(text: &str) -> bool {
    text.split_whitespace().nth(1).is_some()
}
