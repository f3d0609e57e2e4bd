use std::sync::LazyLock;

use regex::Regex;

use super::api::Note;
use crate::core::{
    settings::AnkiSettings,
    utils::{
        char_len,
        NormalizeTerm,
    },
};

static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static LATIN_OR_DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{Latin}0-9]").unwrap());
static LETTER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\p{L}").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Front,
    Back,
}

pub fn strip_html(text: &str) -> String {
    HTML_TAG.replace_all(text, " ").into_owned()
}

/// Share of Latin letters and digits among all letters, after tag stripping.
/// Can exceed 1.0 when digits are present.
pub fn latin_ratio(text: &str) -> f32 {
    let clean = strip_html(text);
    let letters = LETTER.find_iter(&clean).count();
    if letters == 0 {
        return 0.0;
    }
    LATIN_OR_DIGIT.find_iter(&clean).count() as f32 / letters as f32
}

/// The side holding the target-language text. Front wins ties.
pub fn target_side(front: &str, back: &str) -> Side {
    if latin_ratio(front) >= latin_ratio(back) {
        Side::Front
    } else {
        Side::Back
    }
}

/// A whole card field as one known term: tags stripped, whitespace collapsed,
/// lowercased. Never split into words.
pub fn extract_term(text: &str, min_word_length: usize) -> Option<String> {
    let stripped = strip_html(text);
    let term = stripped.normalize_term();
    if term.is_empty() || char_len(&term) < min_word_length {
        return None;
    }
    Some(term.into_owned())
}

pub fn note_term(note: &Note, settings: &AnkiSettings, min_word_length: usize) -> Option<String> {
    let front = note.first_field(&settings.front_fields).unwrap_or_default();
    let back = note.first_field(&settings.back_fields).unwrap_or_default();
    if front.is_empty() && back.is_empty() {
        return None;
    }

    let text = match target_side(front, back) {
        Side::Front => front,
        Side::Back => back,
    };
    extract_term(text, min_word_length)
}
