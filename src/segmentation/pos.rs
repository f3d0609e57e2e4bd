use std::fmt;

use serde::{
    Deserialize,
    Serialize,
};

/// Closed part-of-speech set, parsed from Universal Dependencies tags.
#[derive(PartialEq, Clone, Copy, Debug, Default, Hash, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum POS {
    Noun,
    ProperNoun,
    Verb,
    AuxVerb,
    Adjective,
    Adverb,
    Pronoun,
    Determiner,
    Adposition,
    Numeral,
    Conjunction,
    CoordConjunction,
    SubordConjunction,
    Particle,
    Interjection,
    Punctuation,
    Symbol,
    Other,
    Space,
    #[default]
    Unknown,
}

/// Low-information tags that get absorbed into a dominant noun sense.
pub const DEFAULT_MINOR_POS: &[POS] =
    &[POS::Interjection, POS::Numeral, POS::Punctuation, POS::Symbol, POS::Particle, POS::Other];

impl POS {
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_uppercase().as_str() {
            "NOUN" => POS::Noun,
            "PROPN" => POS::ProperNoun,
            "VERB" => POS::Verb,
            "AUX" => POS::AuxVerb,
            "ADJ" => POS::Adjective,
            "ADV" => POS::Adverb,
            "PRON" => POS::Pronoun,
            "DET" => POS::Determiner,
            "ADP" => POS::Adposition,
            "NUM" => POS::Numeral,
            "CONJ" => POS::Conjunction,
            "CCONJ" => POS::CoordConjunction,
            "SCONJ" => POS::SubordConjunction,
            "PART" => POS::Particle,
            "INTJ" => POS::Interjection,
            "PUNCT" => POS::Punctuation,
            "SYM" => POS::Symbol,
            "X" => POS::Other,
            "SPACE" => POS::Space,
            _ => POS::Unknown,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            POS::Noun => "NOUN",
            POS::ProperNoun => "PROPN",
            POS::Verb => "VERB",
            POS::AuxVerb => "AUX",
            POS::Adjective => "ADJ",
            POS::Adverb => "ADV",
            POS::Pronoun => "PRON",
            POS::Determiner => "DET",
            POS::Adposition => "ADP",
            POS::Numeral => "NUM",
            POS::Conjunction => "CONJ",
            POS::CoordConjunction => "CCONJ",
            POS::SubordConjunction => "SCONJ",
            POS::Particle => "PART",
            POS::Interjection => "INTJ",
            POS::Punctuation => "PUNCT",
            POS::Symbol => "SYM",
            POS::Other => "X",
            POS::Space => "SPACE",
            POS::Unknown => "UNKNOWN",
        }
    }

    pub fn is_noun(&self) -> bool {
        matches!(self, POS::Noun | POS::ProperNoun)
    }

    pub fn is_verb(&self) -> bool {
        matches!(self, POS::Verb | POS::AuxVerb)
    }

    /// Higher is more worth studying first.
    pub fn learning_priority(&self) -> u8 {
        match self {
            POS::Noun | POS::ProperNoun => 10,
            POS::Verb | POS::AuxVerb => 9,
            POS::Adjective => 8,
            POS::Adverb => 7,
            POS::Pronoun => 6,
            POS::Determiner => 5,
            POS::Adposition => 4,
            POS::Numeral => 3,
            POS::Conjunction | POS::CoordConjunction | POS::SubordConjunction => 2,
            POS::Interjection => 1,
            _ => 0,
        }
    }
}

impl fmt::Display for POS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let readable = match self {
            POS::Noun => "Noun",
            POS::ProperNoun => "Proper Noun",
            POS::Verb => "Verb",
            POS::AuxVerb => "Auxiliary Verb",
            POS::Adjective => "Adjective",
            POS::Adverb => "Adverb",
            POS::Pronoun => "Pronoun",
            POS::Determiner => "Determiner",
            POS::Adposition => "Adposition",
            POS::Numeral => "Numeral",
            POS::Conjunction => "Conjunction",
            POS::CoordConjunction => "Coordinating Conjunction",
            POS::SubordConjunction => "Subordinating Conjunction",
            POS::Particle => "Particle",
            POS::Interjection => "Interjection",
            POS::Punctuation => "Punctuation",
            POS::Symbol => "Symbol",
            POS::Other => "Other",
            POS::Space => "Space",
            POS::Unknown => "Unknown",
        };
        write!(f, "{}", readable)
    }
}

impl From<&str> for POS {
    fn from(tag: &str) -> Self {
        POS::from_tag(tag)
    }
}

impl From<String> for POS {
    fn from(tag: String) -> Self {
        POS::from_tag(&tag)
    }
}

impl From<POS> for String {
    fn from(pos: POS) -> Self {
        pos.tag().to_string()
    }
}
