use crate::core::{
    LexiconError,
    Token,
};

/// The tagging/lemmatization engine. Implementations wrap whatever model the host
/// application runs; the engine only ever sees its ordered token output.
pub trait Tagger {
    fn tag(&self, text: &str) -> Result<Vec<Token>, LexiconError>;
}

impl<T: Tagger + ?Sized> Tagger for &T {
    fn tag(&self, text: &str) -> Result<Vec<Token>, LexiconError> {
        (**self).tag(text)
    }
}

/// Parses tagger output delivered as a JSON array of tokens.
pub fn tokens_from_json(json: &str) -> Result<Vec<Token>, LexiconError> {
    Ok(serde_json::from_str(json)?)
}
