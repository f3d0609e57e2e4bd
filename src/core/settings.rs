use std::{
    env,
    path::Path,
};

use log::warn;
use serde::{
    Deserialize,
    Serialize,
};

use super::{
    models::Gender,
    LexiconError,
};
use crate::{
    persistence::{
        get_data_file_path,
        load_json_from,
        load_json_or_default,
        save_json_to,
    },
    segmentation::pos::{
        DEFAULT_MINOR_POS,
        POS,
    },
};

const SETTINGS_FILE: &str = "settings.json";

/// Article lexicon used for display keys, gender recovery and row gender.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticleSettings {
    pub masculine: String,
    pub feminine: String,
    pub masculine_forms: Vec<String>,
    pub feminine_forms: Vec<String>,
}

impl Default for ArticleSettings {
    fn default() -> Self {
        Self {
            masculine: "el".to_string(),
            feminine: "la".to_string(),
            masculine_forms: vec!["el".to_string(), "los".to_string()],
            feminine_forms: vec!["la".to_string(), "las".to_string()],
        }
    }
}

impl ArticleSettings {
    pub fn article_for(&self, gender: Gender) -> Option<&str> {
        match gender {
            Gender::Masc => Some(self.masculine.as_str()),
            Gender::Fem => Some(self.feminine.as_str()),
            Gender::Unknown => None,
        }
    }

    /// Gender signalled by a definite article such as "los" or "La".
    pub fn gender_of_article(&self, word: &str) -> Option<Gender> {
        let word = word.trim().to_lowercase();
        if self.masculine_forms.iter().any(|form| *form == word) {
            Some(Gender::Masc)
        } else if self.feminine_forms.iter().any(|form| *form == word) {
            Some(Gender::Fem)
        } else {
            None
        }
    }

    /// Gender read off the article prefix of a display word ("el coche" -> Masc).
    pub fn gender_of_display(&self, word: &str) -> Option<Gender> {
        let (first, rest) = word.split_once(' ')?;
        if rest.is_empty() {
            return None;
        }
        if self.masculine_forms.iter().any(|form| form == first) {
            Some(Gender::Masc)
        } else if self.feminine_forms.iter().any(|form| form == first) {
            Some(Gender::Fem)
        } else {
            None
        }
    }
}

/// spaCy-style reflexive lemma repair: "detenerse" is lemmatized as "detener él".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReflexiveSettings {
    pub suffix: String,
    pub lemma_artifact: String,
}

impl Default for ReflexiveSettings {
    fn default() -> Self {
        Self { suffix: "se".to_string(), lemma_artifact: " él".to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnkiSettings {
    pub url: String,
    pub deck_pattern: String,
    pub front_fields: Vec<String>,
    pub back_fields: Vec<String>,
    pub batch_size: usize,
}

impl Default for AnkiSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:8765".to_string(),
            deck_pattern: "Spanish".to_string(),
            front_fields: vec!["FrontText".to_string(), "Front".to_string()],
            back_fields: vec!["BackText".to_string(), "Back".to_string()],
            batch_size: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub min_word_length: usize,
    pub lemma_aware_known: bool,
    pub frequency_decimal_places: usize,
    pub minor_pos: Vec<POS>,
    pub consolidation_threshold: f64,
    pub skip_non_alphabetic: bool,
    pub articles: ArticleSettings,
    pub reflexive: ReflexiveSettings,
    pub anki: AnkiSettings,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            min_word_length: 3,
            lemma_aware_known: true,
            frequency_decimal_places: 2,
            minor_pos: DEFAULT_MINOR_POS.to_vec(),
            consolidation_threshold: 0.33,
            skip_non_alphabetic: true,
            articles: ArticleSettings::default(),
            reflexive: ReflexiveSettings::default(),
            anki: AnkiSettings::default(),
        }
    }
}

impl EngineSettings {
    /// Clamps recoverable values and rejects the rest.
    pub fn validated(mut self) -> Result<Self, LexiconError> {
        if self.min_word_length < 1 {
            warn!("min_word_length < 1, clamping to 1");
            self.min_word_length = 1;
        }

        if !(0.0..1.0).contains(&self.consolidation_threshold) {
            return Err(LexiconError::InvalidSettings(format!(
                "consolidation_threshold must be in [0, 1), got {}",
                self.consolidation_threshold
            )));
        }

        if self.articles.masculine.trim().is_empty() || self.articles.feminine.trim().is_empty() {
            return Err(LexiconError::InvalidSettings("articles must not be empty".to_string()));
        }

        if self.anki.batch_size == 0 {
            warn!("anki.batch_size is 0, using 100");
            self.anki.batch_size = 100;
        }

        Ok(self)
    }

    pub fn is_minor_pos(&self, pos: POS) -> bool {
        pos != POS::Noun && self.minor_pos.contains(&pos)
    }

    pub fn load_from(path: &Path) -> Result<Self, LexiconError> {
        load_json_from::<Self>(path)?.validated()
    }

    pub fn save_to(&self, path: &Path) -> Result<(), LexiconError> {
        save_json_to(self, path)
    }

    /// Settings from the app data directory, falling back to defaults.
    pub fn load() -> Self {
        let settings: Self = load_json_or_default(SETTINGS_FILE);
        match settings.apply_env_overrides().validated() {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Invalid settings: {}. Using defaults.", e);
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<(), LexiconError> {
        save_json_to(self, &get_data_file_path(SETTINGS_FILE))
    }

    pub fn apply_env_overrides(mut self) -> Self {
        if let Some(value) = env_parse::<usize>("LEXMINE_MIN_WORD_LENGTH") {
            self.min_word_length = value;
        }
        if let Some(value) = env_parse::<bool>("LEXMINE_LEMMA_AWARE_KNOWN") {
            self.lemma_aware_known = value;
        }
        if let Some(value) = env_parse::<usize>("LEXMINE_DECIMAL_PLACES") {
            self.frequency_decimal_places = value;
        }
        if let Ok(url) = env::var("LEXMINE_ANKI_URL") {
            self.anki.url = url;
        }
        if let Ok(pattern) = env::var("LEXMINE_DECK_PATTERN") {
            self.anki.deck_pattern = pattern;
        }
        self
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring unparsable {}={:?}", name, raw);
            None
        }
    }
}
