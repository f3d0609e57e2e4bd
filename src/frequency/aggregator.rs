use std::collections::{
    BTreeMap,
    HashMap,
};

use crate::core::{
    settings::ArticleSettings,
    ConsolidationKey,
    FrequencyEntry,
    NormalizedToken,
    TokenDetails,
};

/// Coarse frequency classes for reporting, by raw count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FrequencyBand {
    /// More than 100 occurrences.
    VeryFrequent,
    /// 51 to 100.
    Frequent,
    /// 21 to 50.
    Medium,
    /// 6 to 20.
    Rare,
    /// 5 or fewer.
    VeryRare,
}

impl FrequencyBand {
    pub fn of(count: u64) -> Self {
        match count {
            101.. => FrequencyBand::VeryFrequent,
            51..=100 => FrequencyBand::Frequent,
            21..=50 => FrequencyBand::Medium,
            6..=20 => FrequencyBand::Rare,
            _ => FrequencyBand::VeryRare,
        }
    }
}

/// Running counts per `(lemma, pos, gender)` bucket.
///
/// Counts accumulate across every document fed in until `reset` is called. The
/// aggregator holds no lock of its own: share it between threads only behind a
/// mutex (see `core::pipeline::SharedPipeline`).
#[derive(Debug, Default)]
pub struct FrequencyAggregator {
    counts: HashMap<ConsolidationKey, u64>,
    details: HashMap<ConsolidationKey, TokenDetails>,
    total_accepted: u64,
    articles: ArticleSettings,
}

impl FrequencyAggregator {
    pub fn new(articles: ArticleSettings) -> Self {
        FrequencyAggregator { articles, ..Default::default() }
    }

    pub fn accumulate(&mut self, tokens: &[NormalizedToken]) {
        for token in tokens {
            let key = token.key();
            let display_form = key.display_form(&self.articles);
            *self.counts.entry(key.clone()).or_insert(0) += 1;
            self.details.insert(
                key,
                TokenDetails {
                    display_form,
                    pos_label: token.pos.to_string(),
                    original_text: token.text.clone(),
                },
            );
        }
        self.total_accepted += tokens.len() as u64;
    }

    /// Ordered copy of the counts.
    pub fn snapshot(&self) -> BTreeMap<ConsolidationKey, u64> {
        self.counts.iter().map(|(key, count)| (key.clone(), *count)).collect()
    }

    pub fn reset(&mut self) {
        self.counts.clear();
        self.details.clear();
        self.total_accepted = 0;
    }

    pub fn total_accepted(&self) -> u64 {
        self.total_accepted
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn frequency_of(&self, key: &ConsolidationKey) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn details(&self, key: &ConsolidationKey) -> Option<&TokenDetails> {
        self.details.get(key)
    }

    /// All buckets, count descending then key ascending.
    pub fn entries(&self) -> Vec<FrequencyEntry> {
        let mut entries: Vec<FrequencyEntry> = self
            .snapshot()
            .into_iter()
            .map(|(key, count)| FrequencyEntry {
                display_key: key.display_form(&self.articles),
                key,
                count,
            })
            .collect();
        // stable, so equal counts keep the snapshot's key order
        entries.sort_by(|a, b| b.count.cmp(&a.count));
        entries
    }

    /// The `n` largest buckets, count descending then display key ascending.
    pub fn most_common(&self, n: usize) -> Vec<FrequencyEntry> {
        let mut entries = self.entries();
        entries.sort_by(|a, b| {
            b.count.cmp(&a.count).then_with(|| a.display_key.cmp(&b.display_key))
        });
        entries.truncate(n);
        entries
    }

    /// Buckets with at least `min_frequency` occurrences, grouped by band. Each
    /// band keeps the `most_common` order.
    pub fn categorize(&self, min_frequency: u64) -> BTreeMap<FrequencyBand, Vec<FrequencyEntry>> {
        let mut bands: BTreeMap<FrequencyBand, Vec<FrequencyEntry>> = BTreeMap::new();
        for entry in self.most_common(usize::MAX) {
            if entry.count < min_frequency {
                continue;
            }
            bands.entry(FrequencyBand::of(entry.count)).or_default().push(entry);
        }
        bands
    }
}
