use log::{
    info,
    warn,
};

use crate::{
    anki::KnownWordClassifier,
    core::{
        settings::EngineSettings,
        utils::char_len,
        FrequencyEntry,
        LexiconError,
        VocabularyRow,
    },
    frequency::FrequencyAggregator,
};

pub const NEW_WORD: &str = "New word";
pub const ANKI_UNAVAILABLE: &str = "Anki unavailable";

/// Rows ready for the exporter plus what was left out and why.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowReport {
    pub rows: Vec<VocabularyRow>,
    pub known: usize,
    pub too_short: usize,
    pub failed: usize,
    pub duplicates: usize,
}

enum RowOutcome {
    Row(VocabularyRow),
    Known,
    TooShort,
}

pub struct RowBuilder<'a> {
    settings: &'a EngineSettings,
    classifier: &'a KnownWordClassifier,
    aggregator: &'a FrequencyAggregator,
}

impl<'a> RowBuilder<'a> {
    pub fn new(
        settings: &'a EngineSettings,
        classifier: &'a KnownWordClassifier,
        aggregator: &'a FrequencyAggregator,
    ) -> Self {
        RowBuilder { settings, classifier, aggregator }
    }

    /// Turns consolidated entries into unknown-word rows, one per distinct word,
    /// most frequent first. A row that fails to build is logged and skipped.
    pub fn build(&self, entries: &[FrequencyEntry]) -> RowReport {
        let mut report = RowReport::default();
        let mut rows = Vec::with_capacity(entries.len());

        for entry in entries {
            match self.build_row(entry) {
                Ok(RowOutcome::Row(row)) => rows.push(row),
                Ok(RowOutcome::Known) => report.known += 1,
                Ok(RowOutcome::TooShort) => report.too_short += 1,
                Err(e) => {
                    warn!("{}", e);
                    report.failed += 1;
                }
            }
        }

        let before = rows.len();
        let rows = deduplicate(rows);
        report.duplicates = before - rows.len();
        info!(
            "Built {} rows ({} known, {} too short, {} failed, {} duplicates)",
            rows.len(),
            report.known,
            report.too_short,
            report.failed,
            report.duplicates
        );
        report.rows = rows;
        report
    }

    fn build_row(&self, entry: &FrequencyEntry) -> Result<RowOutcome, LexiconError> {
        let word = entry.display_key.trim();
        let lemma = entry.key.lemma.as_str();
        if word.is_empty() || lemma.is_empty() {
            return Err(LexiconError::RowBuild {
                word: entry.display_key.clone(),
                reason: format!("entry {} has no display word", entry.key),
            });
        }

        if self.classifier.is_known(word, Some(word), Some(lemma), Some(entry.key.pos)) {
            return Ok(RowOutcome::Known);
        }
        if char_len(lemma) < self.settings.min_word_length {
            return Ok(RowOutcome::TooShort);
        }

        let total = self.aggregator.total_accepted();
        if total == 0 {
            return Err(LexiconError::RowBuild {
                word: word.to_string(),
                reason: "no accepted tokens to compute a frequency against".to_string(),
            });
        }
        let relative = entry.count as f64 / total as f64 * 100.0;

        let gender = match self.settings.articles.gender_of_display(word) {
            Some(gender) => gender.to_string(),
            None => "-".to_string(),
        };
        let pos_label = match self.aggregator.details(&entry.key) {
            Some(details) => details.pos_label.clone(),
            None => entry.key.pos.to_string(),
        };

        Ok(RowOutcome::Row(VocabularyRow {
            word: word.to_string(),
            lemma: lemma.to_string(),
            pos_label,
            gender,
            relative_frequency: format!(
                "{:.*}%",
                self.settings.frequency_decimal_places,
                relative
            ),
            count: entry.count,
            comment: self.comment_for(lemma),
            pos: entry.key.pos,
        }))
    }

    fn comment_for(&self, lemma: &str) -> String {
        if !self.classifier.is_available() {
            return ANKI_UNAVAILABLE.to_string();
        }
        let similar = self.classifier.suggest_similar(lemma);
        if similar.is_empty() {
            NEW_WORD.to_string()
        } else {
            format!("Similar in Anki: {}", similar.join(", "))
        }
    }
}

/// One row per word, keeping the highest count, then sorted by count.
pub fn deduplicate(mut rows: Vec<VocabularyRow>) -> Vec<VocabularyRow> {
    rows.sort_by(|a, b| a.word.cmp(&b.word).then_with(|| b.count.cmp(&a.count)));
    rows.dedup_by(|later, first| later.word == first.word);
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows
}
