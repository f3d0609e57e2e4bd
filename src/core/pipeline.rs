use std::sync::{
    Arc,
    Mutex,
};

use log::{
    debug,
    info,
};

use super::{
    settings::EngineSettings,
    FrequencyEntry,
    LexiconError,
    Token,
    VocabularyRow,
};
use crate::{
    anki::KnownWordClassifier,
    export::{
        RowBuilder,
        RowReport,
    },
    frequency::{
        consolidate,
        FrequencyAggregator,
    },
    segmentation::{
        normalizer::{
            normalize_document,
            DocumentStats,
        },
        tagger::Tagger,
    },
};

/// A pipeline shared between threads. The engine has no internal locking, so
/// every caller goes through the mutex.
pub type SharedPipeline = Arc<Mutex<VocabularyPipeline>>;

/// Owns the running counts for one mining session. Documents are added one at
/// a time and counts keep accumulating until `reset`.
#[derive(Debug)]
pub struct VocabularyPipeline {
    settings: EngineSettings,
    aggregator: FrequencyAggregator,
    stats: DocumentStats,
}

impl VocabularyPipeline {
    pub fn new(settings: EngineSettings) -> Self {
        let aggregator = FrequencyAggregator::new(settings.articles.clone());
        VocabularyPipeline { settings, aggregator, stats: DocumentStats::default() }
    }

    pub fn shared(settings: EngineSettings) -> SharedPipeline {
        Arc::new(Mutex::new(Self::new(settings)))
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn aggregator(&self) -> &FrequencyAggregator {
        &self.aggregator
    }

    /// Totals over every document since the last reset.
    pub fn stats(&self) -> &DocumentStats {
        &self.stats
    }

    /// Adds one document's tagger output.
    pub fn add_tokens(&mut self, tokens: &[Token]) -> DocumentStats {
        let (accepted, stats) = normalize_document(tokens, &self.settings);
        self.aggregator.accumulate(&accepted);
        self.stats.merge(&stats);
        debug!("Document: {} tokens accepted, {} dropped", stats.accepted, stats.total_dropped());
        stats
    }

    pub fn analyze_document<T: Tagger + ?Sized>(
        &mut self,
        tagger: &T,
        text: &str,
    ) -> Result<DocumentStats, LexiconError> {
        if text.trim().is_empty() {
            return Ok(DocumentStats::default());
        }
        let tokens = tagger.tag(text)?;
        if tokens.is_empty() {
            return Err(LexiconError::EmptyTaggerOutput { input: text.to_string() });
        }
        Ok(self.add_tokens(&tokens))
    }

    pub fn consolidated(&self) -> Vec<FrequencyEntry> {
        consolidate(&self.aggregator.snapshot(), &self.settings)
    }

    pub fn export_rows(&self, classifier: &KnownWordClassifier) -> RowReport {
        let entries = self.consolidated();
        info!(
            "Exporting {} consolidated entries from {} buckets",
            entries.len(),
            self.aggregator.snapshot().len()
        );
        RowBuilder::new(&self.settings, classifier, &self.aggregator).build(&entries)
    }

    /// Unknown rows in study order: most frequent first, then the more useful
    /// part of speech, then alphabetical.
    pub fn learning_queue(&self, classifier: &KnownWordClassifier) -> Vec<VocabularyRow> {
        let mut rows = self.export_rows(classifier).rows;
        rows.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| b.pos.learning_priority().cmp(&a.pos.learning_priority()))
                .then_with(|| a.word.cmp(&b.word))
        });
        rows
    }

    /// The `n` most frequent consolidated entries, optionally leaving out the
    /// ones the classifier already knows.
    pub fn top_words(
        &self,
        n: usize,
        classifier: &KnownWordClassifier,
        exclude_known: bool,
    ) -> Vec<FrequencyEntry> {
        self.consolidated()
            .into_iter()
            .filter(|entry| {
                !exclude_known
                    || !classifier.is_known(
                        &entry.display_key,
                        Some(&entry.display_key),
                        Some(&entry.key.lemma),
                        Some(entry.key.pos),
                    )
            })
            .take(n)
            .collect()
    }

    pub fn reset(&mut self) {
        self.aggregator.reset();
        self.stats = DocumentStats::default();
    }
}
