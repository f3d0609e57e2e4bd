use std::{
    ops::Bound,
    sync::atomic::{
        AtomicBool,
        Ordering,
    },
};

use log::warn;

use super::known_index::KnownWordIndex;
use crate::{
    core::{
        settings::EngineSettings,
        utils::{
            char_len,
            NormalizeTerm,
        },
    },
    segmentation::pos::POS,
};

const MAX_PREFIX_SUGGESTIONS: usize = 3;
const MAX_REFLEXIVE_SUGGESTIONS: usize = 2;
// a reflexive lemma needs at least two letters before the suffix
const MIN_REFLEXIVE_LEN: usize = 3;

/// Decides whether a candidate row is already in the learner's collection.
///
/// An empty index classifies everything as unknown. Hiding a new word is worse
/// than showing a known one.
#[derive(Debug)]
pub struct KnownWordClassifier {
    index: KnownWordIndex,
    lemma_aware: bool,
    reflexive_suffix: String,
    warned_unavailable: AtomicBool,
}

impl KnownWordClassifier {
    pub fn new(index: KnownWordIndex, settings: &EngineSettings) -> Self {
        KnownWordClassifier {
            index,
            lemma_aware: settings.lemma_aware_known,
            reflexive_suffix: settings.reflexive.suffix.clone(),
            warned_unavailable: AtomicBool::new(false),
        }
    }

    /// Classifier for a run where the card store could not be read. The caller
    /// has already reported that, so `is_known` stays quiet.
    pub fn unavailable(settings: &EngineSettings) -> Self {
        let classifier = Self::new(KnownWordIndex::empty(), settings);
        classifier.warned_unavailable.store(true, Ordering::Relaxed);
        classifier
    }

    pub fn is_available(&self) -> bool {
        !self.index.is_empty()
    }

    pub fn index(&self) -> &KnownWordIndex {
        &self.index
    }

    /// First match wins: exact word, exact phrase, then lemma lookup. A word
    /// inside a known phrase is not known by that alone.
    pub fn is_known(
        &self,
        display_word: &str,
        phrase: Option<&str>,
        lemma: Option<&str>,
        pos: Option<POS>,
    ) -> bool {
        if !self.is_available() {
            if !self.warned_unavailable.swap(true, Ordering::Relaxed) {
                warn!("Known-word index is empty, every word will be exported as new");
            }
            return false;
        }

        if self.index.contains_token(&display_word.normalize_term()) {
            return true;
        }

        if let Some(phrase) = phrase {
            if self.index.contains_phrase(&phrase.normalize_term()) {
                return true;
            }
        }

        if !self.lemma_aware {
            return false;
        }
        let (Some(lemma), Some(pos)) = (lemma, pos) else {
            return false;
        };
        let lemma = lemma.normalize_term();
        if pos.is_noun() {
            self.index.contains_noun_lemma(&lemma)
        } else {
            self.index.contains_lemma(&lemma, pos)
        }
    }

    /// Known words that look related to `lemma`. Advisory only; every
    /// suggestion is a real entry of the index.
    ///
    /// Stops at the first tier with a hit: the lemma itself, then words it
    /// prefixes, then the base of a reflexive lemma.
    pub fn suggest_similar(&self, lemma: &str) -> Vec<String> {
        let lemma = lemma.normalize_term();
        if lemma.is_empty() {
            return Vec::new();
        }

        if self.index.contains_token(&lemma) {
            return vec![lemma.to_string()];
        }

        let mut suggestions = self.prefixed_by(&lemma);
        if !suggestions.is_empty() {
            suggestions.truncate(MAX_PREFIX_SUGGESTIONS);
            return suggestions;
        }

        if char_len(&lemma) <= MIN_REFLEXIVE_LEN {
            return Vec::new();
        }
        let Some(base) = self.reflexive_base(&lemma) else {
            return Vec::new();
        };
        if self.index.contains_token(base) {
            return vec![base.to_string()];
        }
        let mut suggestions = self.prefixed_by(base);
        suggestions.truncate(MAX_REFLEXIVE_SUGGESTIONS);
        suggestions
    }

    fn reflexive_base<'a>(&self, lemma: &'a str) -> Option<&'a str> {
        if self.reflexive_suffix.is_empty() {
            return None;
        }
        lemma.strip_suffix(self.reflexive_suffix.as_str()).filter(|base| !base.is_empty())
    }

    /// Known words starting with `prefix` (excluding `prefix` itself), shortest
    /// first, ties alphabetical.
    fn prefixed_by(&self, prefix: &str) -> Vec<String> {
        let mut matches: Vec<&String> = self
            .index
            .known_tokens()
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|word| word.starts_with(prefix))
            .filter(|word| word.as_str() != prefix)
            .collect();
        matches.sort_by(|a, b| char_len(a).cmp(&char_len(b)).then_with(|| a.cmp(b)));
        matches.into_iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::Gender,
        segmentation::tagger::fake::LexiconTagger,
    };

    fn classifier_with(strings: &[&str], settings: &EngineSettings) -> KnownWordClassifier {
        let tagger = LexiconTagger::new()
            .word("el", "el", POS::Determiner)
            .noun("coche", "coche", Some(Gender::Masc))
            .noun("capital", "capital", Some(Gender::Fem))
            .word("comer", "comer", POS::Verb)
            .word("comida", "comida", POS::Noun)
            .word("comedor", "comedor", POS::Noun)
            .word("comercio", "comercio", POS::Noun)
            .word("comerciante", "comerciante", POS::Noun)
            .word("detener", "detener", POS::Verb)
            .word("bonito", "bonito", POS::Adjective);
        let index = KnownWordIndex::build(strings.iter(), &tagger, settings).unwrap();
        KnownWordClassifier::new(index, settings)
    }

    fn classifier(strings: &[&str]) -> KnownWordClassifier {
        classifier_with(strings, &EngineSettings::default())
    }

    #[test]
    fn exact_word_is_known() {
        let classifier = classifier(&["comer"]);
        assert!(classifier.is_known("Comer", None, None, None));
        assert!(!classifier.is_known("beber", None, None, None));
    }

    #[test]
    fn exact_phrase_is_known() {
        let classifier = classifier(&["el coche"]);
        assert!(classifier.is_known("el coche", Some("el coche"), None, None));
    }

    #[test]
    fn words_inside_phrases_are_not_known() {
        let classifier = classifier(&["comer bonito"]);
        assert!(!classifier.is_known("comer", Some("comer"), Some("comer"), Some(POS::Verb)));
        assert!(!classifier.is_known("bonito", None, Some("bonito"), Some(POS::Adjective)));
    }

    #[test]
    fn any_gender_of_a_known_noun_counts() {
        let classifier = classifier(&["capital"]);
        // known as feminine, seen with the masculine article
        assert!(classifier.is_known(
            "el capital",
            Some("el capital"),
            Some("capital"),
            Some(POS::Noun)
        ));
    }

    #[test]
    fn non_nouns_need_matching_pos() {
        let classifier = classifier(&["bonito"]);
        assert!(classifier.is_known("bonitos", None, Some("bonito"), Some(POS::Adjective)));
        assert!(!classifier.is_known("bonitos", None, Some("bonito"), Some(POS::Adverb)));
    }

    #[test]
    fn lemma_tier_can_be_disabled() {
        let settings = EngineSettings { lemma_aware_known: false, ..Default::default() };
        let classifier = classifier_with(&["bonito"], &settings);
        assert!(!classifier.is_known("bonitos", None, Some("bonito"), Some(POS::Adjective)));
        assert!(classifier.is_known("bonito", None, None, None));
    }

    #[test]
    fn empty_index_fails_open() {
        let classifier = KnownWordClassifier::unavailable(&EngineSettings::default());
        assert!(!classifier.is_available());
        assert!(!classifier.is_known("comer", Some("comer"), Some("comer"), Some(POS::Verb)));
        assert!(!classifier.is_known("casa", None, Some("casa"), Some(POS::Noun)));
    }

    #[test]
    fn exact_match_ends_the_search() {
        let classifier =
            classifier(&["comer", "comerciante", "comercio", "comida", "comedor"]);
        assert_eq!(classifier.suggest_similar("comer"), vec!["comer"]);
    }

    #[test]
    fn prefix_matches_are_shortest_first() {
        let classifier =
            classifier(&["comer", "comerciante", "comercio", "comida", "comedor"]);
        assert_eq!(classifier.suggest_similar("com"), vec!["comer", "comida", "comedor"]);
        assert_eq!(classifier.suggest_similar("comerc"), vec!["comercio", "comerciante"]);
    }

    #[test]
    fn reflexive_lemma_suggests_base() {
        let classifier = classifier(&["detener", "comer"]);
        assert_eq!(classifier.suggest_similar("detenerse"), vec!["detener"]);
    }

    #[test]
    fn prefix_matches_win_over_reflexive_base() {
        let tagger = LexiconTagger::new()
            .word("comer", "comer", POS::Verb)
            .word("comercio", "comercio", POS::Noun)
            .word("detener", "detener", POS::Verb)
            .word("detenerselo", "detenerselo", POS::Verb);
        let settings = EngineSettings::default();
        let index = KnownWordIndex::build(
            ["comer", "comercio", "detener", "detenerselo"],
            &tagger,
            &settings,
        )
        .unwrap();
        let classifier = KnownWordClassifier::new(index, &settings);

        assert_eq!(classifier.suggest_similar("comer"), vec!["comer"]);
        assert_eq!(classifier.suggest_similar("detenerse"), vec!["detenerselo"]);
    }

    #[test]
    fn short_lemmas_skip_the_reflexive_step() {
        let classifier = classifier(&["comer"]);
        // "cse" would strip to "c", which prefixes "comer"
        assert!(classifier.suggest_similar("cse").is_empty());
    }

    #[test]
    fn unavailable_classifier_does_not_warn_again() {
        let classifier = KnownWordClassifier::unavailable(&EngineSettings::default());
        assert!(classifier.warned_unavailable.load(Ordering::Relaxed));

        let empty = KnownWordClassifier::new(KnownWordIndex::empty(), &EngineSettings::default());
        assert!(!empty.warned_unavailable.load(Ordering::Relaxed));
        assert!(!empty.is_known("comer", None, None, None));
        assert!(empty.warned_unavailable.load(Ordering::Relaxed));
    }

    #[test]
    fn suggestions_never_invent_words() {
        let classifier = classifier(&["comida"]);
        assert!(classifier.suggest_similar("casa").is_empty());
        assert!(classifier.suggest_similar("").is_empty());
        for suggestion in classifier.suggest_similar("com") {
            assert!(classifier.index().contains_token(&suggestion));
        }
    }
}
