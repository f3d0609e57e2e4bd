use std::fmt;

use serde::{
    Deserialize,
    Serialize,
};

use super::settings::ArticleSettings;
use crate::segmentation::pos::POS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Gender {
    Masc,
    Fem,
    Unknown,
}

impl Gender {
    pub fn is_explicit(&self) -> bool {
        matches!(self, Gender::Masc | Gender::Fem)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Masc => "Masc",
            Gender::Fem => "Fem",
            Gender::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for Gender {
    fn from(value: &str) -> Self {
        match value.trim() {
            "Masc" | "masc" | "M" => Gender::Masc,
            "Fem" | "fem" | "F" => Gender::Fem,
            _ => Gender::Unknown,
        }
    }
}

impl From<String> for Gender {
    fn from(value: String) -> Self {
        Gender::from(value.as_str())
    }
}

impl From<Gender> for String {
    fn from(gender: Gender) -> Self {
        gender.as_str().to_string()
    }
}

/// One token as handed over by the tagger. Missing fields are tolerated here and
/// rejected by the normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    #[serde(default)]
    pub lemma: Option<String>,
    #[serde(default)]
    pub pos: Option<POS>,
    #[serde(default)]
    pub gender: Option<Gender>,
}

impl Token {
    pub fn new(text: &str, lemma: &str, pos: POS) -> Self {
        Token {
            text: text.to_string(),
            lemma: Some(lemma.to_string()),
            pos: Some(pos),
            gender: None,
        }
    }

    /// A token the tagger only gave a surface form and tag for.
    pub fn bare(text: &str, pos: POS) -> Self {
        Token { text: text.to_string(), lemma: None, pos: Some(pos), gender: None }
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedToken {
    pub text: String,
    pub lemma: String,
    pub pos: POS,
    pub gender: Option<Gender>,
}

impl NormalizedToken {
    pub fn key(&self) -> ConsolidationKey {
        let gender = match self.pos {
            POS::Noun => self.gender.unwrap_or(Gender::Unknown),
            _ => Gender::Unknown,
        };
        ConsolidationKey::new(&self.lemma, self.pos, gender)
    }
}

/// Identity of an aggregation bucket. Gender is only meaningful for nouns and is
/// `Unknown` for every other part of speech.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConsolidationKey {
    pub lemma: String,
    pub pos: POS,
    pub gender: Gender,
}

impl ConsolidationKey {
    pub fn new(lemma: &str, pos: POS, gender: Gender) -> Self {
        ConsolidationKey { lemma: lemma.to_string(), pos, gender }
    }

    pub fn is_noun(&self) -> bool {
        self.pos == POS::Noun
    }

    pub fn has_explicit_gender(&self) -> bool {
        self.gender.is_explicit()
    }

    /// "el coche" for a masculine noun, the bare lemma otherwise.
    pub fn display_form(&self, articles: &ArticleSettings) -> String {
        if !self.is_noun() {
            return self.lemma.clone();
        }
        match articles.article_for(self.gender) {
            Some(article) => format!("{} {}", article, self.lemma),
            None => self.lemma.clone(),
        }
    }
}

impl fmt::Display for ConsolidationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.lemma, self.pos.tag(), self.gender)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyEntry {
    pub key: ConsolidationKey,
    pub display_key: String,
    pub count: u64,
}

/// Last-seen presentation data for a bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenDetails {
    pub display_form: String,
    pub pos_label: String,
    pub original_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyRow {
    #[serde(rename = "Word")]
    pub word: String,
    #[serde(rename = "Lemma")]
    pub lemma: String,
    #[serde(rename = "Part of Speech")]
    pub pos_label: String,
    #[serde(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "Frequency")]
    pub relative_frequency: String,
    #[serde(rename = "Count")]
    pub count: u64,
    #[serde(rename = "Comments")]
    pub comment: String,
    #[serde(skip)]
    pub pos: POS,
}

impl VocabularyRow {
    pub const HEADERS: [&'static str; 7] =
        ["Word", "Lemma", "Part of Speech", "Gender", "Frequency", "Count", "Comments"];

    pub fn to_record(&self) -> [String; 7] {
        [
            self.word.clone(),
            self.lemma.clone(),
            self.pos_label.clone(),
            self.gender.clone(),
            self.relative_frequency.clone(),
            self.count.to_string(),
            self.comment.clone(),
        ]
    }
}
