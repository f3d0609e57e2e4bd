use std::collections::BTreeMap;

use log::debug;

use super::pos::POS;
use crate::core::{
    settings::{
        ArticleSettings,
        EngineSettings,
        ReflexiveSettings,
    },
    utils::{
        char_len,
        is_alphabetic_word,
    },
    Gender,
    NormalizedToken,
    Token,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DropReason {
    /// Lemma or part of speech missing.
    TaggingGap,
    /// A real word the tagger labelled as a symbol.
    SymbolNoise,
    Symbol,
    NonAlphabetic,
    TooShort,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    Accepted(NormalizedToken),
    Dropped(DropReason),
}

impl Normalized {
    pub fn accepted(self) -> Option<NormalizedToken> {
        match self {
            Normalized::Accepted(token) => Some(token),
            Normalized::Dropped(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentStats {
    pub accepted: usize,
    pub dropped: BTreeMap<DropReason, usize>,
}

impl DocumentStats {
    pub fn total_dropped(&self) -> usize {
        self.dropped.values().sum()
    }

    pub fn merge(&mut self, other: &DocumentStats) {
        self.accepted += other.accepted;
        for (reason, count) in &other.dropped {
            *self.dropped.entry(*reason).or_insert(0) += count;
        }
    }
}

/// A token with its immediate neighbours.
#[derive(Debug, Clone, Copy)]
pub struct TokenWindow<'a> {
    pub prev: Option<&'a Token>,
    pub current: &'a Token,
    pub next: Option<&'a Token>,
}

impl<'a> TokenWindow<'a> {
    pub fn at(tokens: &'a [Token], index: usize) -> Option<Self> {
        let current = tokens.get(index)?;
        let prev = index.checked_sub(1).and_then(|i| tokens.get(i));
        Some(TokenWindow { prev, current, next: tokens.get(index + 1) })
    }
}

/// Gender implied by an adjacent definite article; the previous token wins over the
/// next one.
pub fn recover_gender(window: &TokenWindow<'_>, articles: &ArticleSettings) -> Option<Gender> {
    window
        .prev
        .and_then(|token| article_gender(token, articles))
        .or_else(|| window.next.and_then(|token| article_gender(token, articles)))
}

fn article_gender(token: &Token, articles: &ArticleSettings) -> Option<Gender> {
    if token.pos != Some(POS::Determiner) {
        return None;
    }
    // taggers lemmatize "la" to "el", so the surface form decides
    articles
        .gender_of_article(&token.text)
        .or_else(|| token.lemma.as_deref().and_then(|lemma| articles.gender_of_article(lemma)))
}

/// Undo the "detener él" artifact on reflexive verbs.
fn repair_reflexive(text: &str, lemma: String, reflexive: &ReflexiveSettings) -> String {
    if reflexive.lemma_artifact.is_empty() {
        return lemma;
    }
    let Some(stripped) = lemma.strip_suffix(reflexive.lemma_artifact.as_str()) else {
        return lemma;
    };
    let surface = text.to_lowercase();
    if !reflexive.suffix.is_empty() && surface.ends_with(reflexive.suffix.as_str()) {
        surface
    } else {
        stripped.to_string()
    }
}

pub fn normalize(
    token: &Token,
    prev: Option<&Token>,
    next: Option<&Token>,
    settings: &EngineSettings,
) -> Normalized {
    let (Some(lemma), Some(mut pos)) = (token.lemma.as_deref(), token.pos) else {
        return Normalized::Dropped(DropReason::TaggingGap);
    };
    let lemma = lemma.trim().to_lowercase();
    if lemma.is_empty() || token.text.trim().is_empty() {
        return Normalized::Dropped(DropReason::TaggingGap);
    }

    if pos == POS::ProperNoun {
        pos = POS::Noun;
    }

    if pos == POS::Symbol {
        if is_alphabetic_word(&token.text) && char_len(&token.text) > 2 {
            return Normalized::Dropped(DropReason::SymbolNoise);
        }
        return Normalized::Dropped(DropReason::Symbol);
    }

    if settings.skip_non_alphabetic && !is_alphabetic_word(&token.text) {
        return Normalized::Dropped(DropReason::NonAlphabetic);
    }

    let lemma = if pos.is_verb() {
        repair_reflexive(&token.text, lemma, &settings.reflexive)
    } else {
        lemma
    };

    if char_len(&lemma) < settings.min_word_length {
        return Normalized::Dropped(DropReason::TooShort);
    }

    let mut gender = token.gender.filter(Gender::is_explicit);
    if pos == POS::Noun && gender.is_none() {
        let window = TokenWindow { prev, current: token, next };
        gender = recover_gender(&window, &settings.articles);
    }

    Normalized::Accepted(NormalizedToken { text: token.text.clone(), lemma, pos, gender })
}

/// Normalizes a whole document, giving each token its ±1 neighbour window.
pub fn normalize_document(
    tokens: &[Token],
    settings: &EngineSettings,
) -> (Vec<NormalizedToken>, DocumentStats) {
    let mut accepted = Vec::with_capacity(tokens.len());
    let mut stats = DocumentStats::default();

    for index in 0..tokens.len() {
        let Some(window) = TokenWindow::at(tokens, index) else {
            continue;
        };
        match normalize(window.current, window.prev, window.next, settings) {
            Normalized::Accepted(token) => {
                accepted.push(token);
                stats.accepted += 1;
            }
            Normalized::Dropped(reason) => {
                debug!("Dropped token '{}': {:?}", window.current.text, reason);
                *stats.dropped.entry(reason).or_insert(0) += 1;
            }
        }
    }

    (accepted, stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> EngineSettings {
        EngineSettings::default()
    }

    fn accept(token: &Token) -> NormalizedToken {
        normalize(token, None, None, &settings()).accepted().expect("token should be accepted")
    }

    #[test]
    fn proper_nouns_become_nouns() {
        let token = Token::new("Madrid", "Madrid", POS::ProperNoun);
        let normalized = accept(&token);
        assert_eq!(normalized.pos, POS::Noun);
        assert_eq!(normalized.lemma, "madrid");
    }

    #[test]
    fn symbols_are_dropped() {
        let noisy = Token::new("hola", "hola", POS::Symbol);
        assert_eq!(
            normalize(&noisy, None, None, &settings()),
            Normalized::Dropped(DropReason::SymbolNoise)
        );
        let real = Token::new("%", "%", POS::Symbol);
        assert_eq!(
            normalize(&real, None, None, &settings()),
            Normalized::Dropped(DropReason::Symbol)
        );
    }

    #[test]
    fn missing_fields_are_a_tagging_gap() {
        let no_lemma = Token::bare("casa", POS::Noun);
        assert_eq!(
            normalize(&no_lemma, None, None, &settings()),
            Normalized::Dropped(DropReason::TaggingGap)
        );
        let no_pos =
            Token { text: "casa".into(), lemma: Some("casa".into()), ..Default::default() };
        assert_eq!(
            normalize(&no_pos, None, None, &settings()),
            Normalized::Dropped(DropReason::TaggingGap)
        );
    }

    #[test]
    fn reflexive_verbs_keep_surface_form() {
        let token = Token::new("detenerse", "detener él", POS::Verb);
        assert_eq!(accept(&token).lemma, "detenerse");
    }

    #[test]
    fn reflexive_artifact_stripped_when_surface_is_conjugated() {
        let token = Token::new("detuvo", "detener él", POS::AuxVerb);
        assert_eq!(accept(&token).lemma, "detener");
    }

    #[test]
    fn artifact_left_alone_on_nouns() {
        let token = Token::new("casa", "casa", POS::Noun);
        assert_eq!(accept(&token).lemma, "casa");
    }

    #[test]
    fn short_lemmas_are_dropped() {
        // "vamos" is long enough but its lemma is not
        let token = Token::new("vamos", "ir", POS::Verb);
        assert_eq!(
            normalize(&token, None, None, &settings()),
            Normalized::Dropped(DropReason::TooShort)
        );
    }

    #[test]
    fn punctuation_is_non_alphabetic() {
        let token = Token::new("...", "...", POS::Punctuation);
        assert_eq!(
            normalize(&token, None, None, &settings()),
            Normalized::Dropped(DropReason::NonAlphabetic)
        );
    }

    #[test]
    fn gender_from_previous_article() {
        let article = Token::bare("Las", POS::Determiner);
        let noun = Token::new("mesas", "mesa", POS::Noun);
        let window = TokenWindow { prev: Some(&article), current: &noun, next: None };
        assert_eq!(recover_gender(&window, &ArticleSettings::default()), Some(Gender::Fem));
    }

    #[test]
    fn gender_from_next_article_when_previous_is_not_one() {
        let adjective = Token::new("grande", "grande", POS::Adjective);
        let noun = Token::new("coche", "coche", POS::Noun);
        let article = Token::new("el", "el", POS::Determiner);
        let window = TokenWindow { prev: Some(&adjective), current: &noun, next: Some(&article) };
        assert_eq!(recover_gender(&window, &ArticleSettings::default()), Some(Gender::Masc));
    }

    #[test]
    fn article_surface_wins_over_its_lemma() {
        let article = Token::new("la", "el", POS::Determiner);
        let noun = Token::new("capital", "capital", POS::Noun);
        let window = TokenWindow { prev: Some(&article), current: &noun, next: None };
        assert_eq!(recover_gender(&window, &ArticleSettings::default()), Some(Gender::Fem));
    }

    #[test]
    fn indefinite_determiners_do_not_signal_gender() {
        let article = Token::new("una", "uno", POS::Determiner);
        let noun = Token::new("mesa", "mesa", POS::Noun);
        let window = TokenWindow { prev: Some(&article), current: &noun, next: None };
        assert_eq!(recover_gender(&window, &ArticleSettings::default()), None);
    }

    #[test]
    fn tagger_gender_is_kept() {
        let article = Token::new("el", "el", POS::Determiner);
        let noun = Token::new("mano", "mano", POS::Noun).with_gender(Gender::Fem);
        let normalized = normalize(&noun, Some(&article), None, &settings()).accepted().unwrap();
        assert_eq!(normalized.gender, Some(Gender::Fem));
    }

    #[test]
    fn window_at_document_edges() {
        let tokens =
            vec![Token::bare("El", POS::Determiner), Token::new("gato", "gato", POS::Noun)];
        let first = TokenWindow::at(&tokens, 0).unwrap();
        assert!(first.prev.is_none());
        let last = TokenWindow::at(&tokens, 1).unwrap();
        assert!(last.next.is_none());
        assert!(TokenWindow::at(&tokens, 2).is_none());
    }

    #[test]
    fn document_stats_count_every_token() {
        let tokens = vec![
            Token::bare("El", POS::Determiner),
            Token::new("niños", "niño", POS::Noun),
            Token::new("comen", "comer", POS::Verb),
            Token::new(".", ".", POS::Punctuation),
        ];
        let (accepted, stats) = normalize_document(&tokens, &settings());

        assert_eq!(accepted.len(), 2);
        assert_eq!(accepted[0].gender, Some(Gender::Masc));
        assert_eq!(stats.accepted, 2);
        assert_eq!(stats.total_dropped(), 2);
        assert_eq!(stats.dropped.get(&DropReason::TaggingGap), Some(&1));
    }
}
