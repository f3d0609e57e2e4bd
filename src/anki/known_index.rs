use std::collections::{
    BTreeSet,
    HashSet,
};

use log::{
    debug,
    info,
};

use crate::{
    core::{
        settings::EngineSettings,
        utils::{
            is_multi_word,
            NormalizeTerm,
        },
        Gender,
        LexiconError,
        NormalizedToken,
        Token,
    },
    segmentation::{
        normalizer::normalize,
        pos::POS,
        tagger::Tagger,
    },
};

/// What the learner already has in their card collection, built once per run.
#[derive(Debug, Clone, Default)]
pub struct KnownWordIndex {
    known_tokens: BTreeSet<String>,
    known_phrases: BTreeSet<String>,
    known_noun_index: HashSet<(String, Gender)>,
    known_other_index: HashSet<(String, POS)>,
}

#[derive(Debug, Default)]
struct RetagTally {
    attempts: usize,
    failures: usize,
    empty: usize,
    first_empty: Option<String>,
}

impl KnownWordIndex {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Splits card strings into single words and phrases, then re-tags each one
    /// once to fill the lemma indexes.
    ///
    /// Fails only when the tagger is unusable for the whole collection: every call
    /// erroring (`IndexCorrupted`) or every call coming back empty
    /// (`EmptyTaggerOutput`).
    pub fn build<I, S, T>(
        strings: I,
        tagger: &T,
        settings: &EngineSettings,
    ) -> Result<Self, LexiconError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        T: Tagger + ?Sized,
    {
        let mut index = Self::default();
        for string in strings {
            let term = string.as_ref().normalize_term();
            if term.is_empty() {
                continue;
            }
            if is_multi_word(&term) {
                index.known_phrases.insert(term.into_owned());
            } else {
                index.known_tokens.insert(term.into_owned());
            }
        }

        let mut tally = RetagTally::default();
        let words: Vec<String> = index.known_tokens.iter().cloned().collect();
        for word in &words {
            if let Some(tokens) = retag(tagger, word, &mut tally) {
                for token in normalize_all(&tokens, settings) {
                    index.insert_lemma(&token);
                }
            }
        }

        let phrases: Vec<String> = index.known_phrases.iter().cloned().collect();
        for phrase in &phrases {
            if let Some(tokens) = retag(tagger, phrase, &mut tally) {
                if let Some(headword) = article_headword(&tokens, settings) {
                    index.insert_lemma(&headword);
                }
            }
        }

        if tally.attempts > 0 && tally.failures == tally.attempts {
            return Err(LexiconError::IndexCorrupted(format!(
                "tagger failed on all {} known strings",
                tally.attempts
            )));
        }
        if tally.attempts > 0 && tally.empty + tally.failures == tally.attempts {
            return Err(LexiconError::EmptyTaggerOutput {
                input: tally.first_empty.unwrap_or_default(),
            });
        }

        info!(
            "Known-word index: {} words, {} phrases, {} noun lemmas, {} other lemmas ({} re-tag failures)",
            index.known_tokens.len(),
            index.known_phrases.len(),
            index.known_noun_index.len(),
            index.known_other_index.len(),
            tally.failures
        );
        Ok(index)
    }

    fn insert_lemma(&mut self, token: &NormalizedToken) {
        if token.pos == POS::Noun {
            let gender = token.gender.unwrap_or(Gender::Unknown);
            self.known_noun_index.insert((token.lemma.clone(), gender));
        } else {
            self.known_other_index.insert((token.lemma.clone(), token.pos));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.known_tokens.is_empty() && self.known_phrases.is_empty()
    }

    pub fn contains_token(&self, word: &str) -> bool {
        self.known_tokens.contains(word)
    }

    pub fn contains_phrase(&self, phrase: &str) -> bool {
        self.known_phrases.contains(phrase)
    }

    /// Any gender, including `Unknown`, counts.
    pub fn contains_noun_lemma(&self, lemma: &str) -> bool {
        [Gender::Masc, Gender::Fem, Gender::Unknown]
            .into_iter()
            .any(|gender| self.known_noun_index.contains(&(lemma.to_string(), gender)))
    }

    pub fn contains_lemma(&self, lemma: &str, pos: POS) -> bool {
        self.known_other_index.contains(&(lemma.to_string(), pos))
    }

    pub fn known_tokens(&self) -> &BTreeSet<String> {
        &self.known_tokens
    }

    pub fn token_count(&self) -> usize {
        self.known_tokens.len()
    }

    pub fn phrase_count(&self) -> usize {
        self.known_phrases.len()
    }
}

fn retag<T: Tagger + ?Sized>(tagger: &T, text: &str, tally: &mut RetagTally) -> Option<Vec<Token>> {
    tally.attempts += 1;
    match tagger.tag(text) {
        Ok(tokens) if tokens.is_empty() => {
            tally.empty += 1;
            tally.first_empty.get_or_insert_with(|| text.to_string());
            None
        }
        Ok(tokens) => Some(tokens),
        Err(e) => {
            debug!("Re-tagging '{}' failed: {}", text, e);
            tally.failures += 1;
            None
        }
    }
}

fn normalize_all(tokens: &[Token], settings: &EngineSettings) -> Vec<NormalizedToken> {
    (0..tokens.len())
        .filter_map(|i| {
            let prev = i.checked_sub(1).and_then(|p| tokens.get(p));
            normalize(&tokens[i], prev, tokens.get(i + 1), settings).accepted()
        })
        .collect()
}

/// "el coche" style cards: leading determiners followed by exactly one token.
/// Anything longer is a phrase and stays whole.
fn article_headword(tokens: &[Token], settings: &EngineSettings) -> Option<NormalizedToken> {
    let articles = tokens.iter().take_while(|t| t.pos == Some(POS::Determiner)).count();
    if articles == 0 || tokens.len() != articles + 1 {
        return None;
    }
    normalize(&tokens[articles], tokens.get(articles - 1), None, settings).accepted()
}
