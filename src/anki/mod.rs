use std::{
    collections::BTreeSet,
    time::{
        Duration,
        Instant,
    },
};

use log::{
    info,
    warn,
};
use rayon::iter::{
    IntoParallelRefIterator,
    ParallelIterator,
};
use tokio::time::sleep;

use crate::{
    core::{
        settings::{
            AnkiSettings,
            EngineSettings,
        },
        LexiconError,
    },
    segmentation::tagger::Tagger,
};

pub mod api;
pub mod classifier;
pub mod fields;
pub mod known_index;

pub use api::AnkiConnect;
pub use classifier::KnownWordClassifier;
pub use known_index::KnownWordIndex;

/// Target-language terms from a batch of notes, one per note at most.
pub fn terms_from_notes(
    notes: &[api::Note],
    settings: &AnkiSettings,
    min_word_length: usize,
) -> BTreeSet<String> {
    notes
        .par_iter()
        .filter_map(|note| fields::note_term(note, settings, min_word_length))
        .collect()
}

/// Every known term in the decks matching `deck_pattern`.
pub async fn get_known_strings(
    settings: &AnkiSettings,
    min_word_length: usize,
) -> Result<BTreeSet<String>, LexiconError> {
    let start = Instant::now();
    let client = AnkiConnect::new(&settings.url);

    let query = format!("deck:{}*", settings.deck_pattern);
    let note_ids = client.get_note_ids(&query).await?;
    if note_ids.is_empty() {
        warn!("No notes found for query {}", query);
        return Ok(BTreeSet::new());
    }

    let notes = client.get_notes_batched(&note_ids, settings.batch_size).await?;
    let terms = terms_from_notes(&notes, settings, min_word_length);
    info!(
        "Loaded {} known terms from {} notes ({:.1}s)",
        terms.len(),
        notes.len(),
        start.elapsed().as_secs_f32()
    );
    Ok(terms)
}

/// Reads the card store and builds the classifier for this run. An unreachable
/// or empty store gives a classifier that treats everything as new; only a
/// tagger that cannot process the collection at all is an error.
pub async fn load_classifier<T: Tagger + ?Sized>(
    tagger: &T,
    settings: &EngineSettings,
) -> Result<KnownWordClassifier, LexiconError> {
    let strings = match get_known_strings(&settings.anki, settings.min_word_length).await {
        Ok(strings) => strings,
        Err(e) => {
            let unavailable = LexiconError::ClassificationUnavailable(e.to_string());
            warn!("{}. Exporting every word as new.", unavailable);
            return Ok(KnownWordClassifier::unavailable(settings));
        }
    };

    let index = KnownWordIndex::build(&strings, tagger, settings)?;
    Ok(KnownWordClassifier::new(index, settings))
}

pub async fn wait_awake(
    client: &AnkiConnect,
    wait_time: u64,
    max_attempts: u32,
) -> Result<bool, reqwest::Error> {
    for attempt in 1..=max_attempts {
        match client.get_version().await {
            Ok(version) => {
                info!("AnkiConnect is online. Version: {}", version);
                return Ok(true);
            }
            Err(err) => {
                warn!(
                    "AnkiConnect attempt {} of {} failed. Retrying in {} seconds... Error: {}",
                    attempt, max_attempts, wait_time, err
                );
                if attempt < max_attempts {
                    sleep(Duration::from_secs(wait_time)).await;
                }
            }
        }
    }
    Ok(false)
}
