//! Merges the tagger's fragmented readings of a headword into display rows.
//!
//! Two passes run per lemma. The first absorbs low-information readings
//! (numerals, interjections, stray symbols) into a dominant noun sense. The second
//! folds any leftover ungendered noun into its gendered counterpart. Nouns of
//! different explicit genders are never merged, so homonyms like "el capital" and
//! "la capital" survive as separate rows.

use std::collections::BTreeMap;

use log::debug;

use crate::core::{
    settings::{
        ArticleSettings,
        EngineSettings,
    },
    ConsolidationKey,
    FrequencyEntry,
};

/// Runs both passes and returns the surviving buckets, count descending then
/// display key ascending.
pub fn consolidate(
    counts: &BTreeMap<ConsolidationKey, u64>,
    settings: &EngineSettings,
) -> Vec<FrequencyEntry> {
    let absorbed = absorb_minor_pos(counts, settings);
    let folded = fold_gender_variants(absorbed, &settings.articles);

    let mut entries: Vec<FrequencyEntry> = folded
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .map(|(key, count)| FrequencyEntry {
            display_key: key.display_form(&settings.articles),
            key,
            count,
        })
        .collect();
    entries.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.display_key.cmp(&b.display_key))
            .then_with(|| a.key.cmp(&b.key))
    });
    entries
}

/// Display key to count. A display key shared by several buckets (an ungendered
/// noun and an adjective both showing as "capital") keeps the larger count.
pub fn to_display_map(entries: &[FrequencyEntry]) -> BTreeMap<String, u64> {
    let mut map = BTreeMap::new();
    for entry in entries {
        let count = map.entry(entry.display_key.clone()).or_insert(0);
        *count = (*count).max(entry.count);
    }
    map
}

fn group_by_lemma(
    counts: &BTreeMap<ConsolidationKey, u64>,
) -> BTreeMap<&str, Vec<(&ConsolidationKey, u64)>> {
    let mut groups: BTreeMap<&str, Vec<(&ConsolidationKey, u64)>> = BTreeMap::new();
    for (key, count) in counts {
        groups.entry(key.lemma.as_str()).or_default().push((key, *count));
    }
    groups
}

/// Highest count wins; equal counts go to the lexicographically smallest display
/// key, then the smallest key.
fn heaviest<'k>(
    candidates: &[(&'k ConsolidationKey, u64)],
    articles: &ArticleSettings,
) -> Option<&'k ConsolidationKey> {
    let mut ranked: Vec<(&ConsolidationKey, u64, String)> = candidates
        .iter()
        .map(|(key, count)| (*key, *count, key.display_form(articles)))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.2.cmp(&b.2)).then_with(|| a.0.cmp(b.0)));

    if let [first, second, ..] = ranked.as_slice() {
        if first.1 == second.1 {
            debug!(
                "Consolidation ambiguity for '{}': {} and {} both at {}, keeping {}",
                first.0.lemma, first.2, second.2, first.1, first.2
            );
        }
    }
    ranked.first().map(|(key, _, _)| *key)
}

fn absorb_minor_pos(
    counts: &BTreeMap<ConsolidationKey, u64>,
    settings: &EngineSettings,
) -> BTreeMap<ConsolidationKey, u64> {
    let mut result = BTreeMap::new();

    for (lemma, group) in group_by_lemma(counts) {
        let total: u64 = group.iter().map(|(_, count)| count).sum();
        let noun_total: u64 =
            group.iter().filter(|(key, _)| key.is_noun()).map(|(_, count)| count).sum();
        let dominant =
            total > 0 && noun_total as f64 / total as f64 > settings.consolidation_threshold;

        let target = if dominant { pick_target(&group, &settings.articles) } else { None };
        let Some(target) = target else {
            for (key, count) in group {
                *result.entry(key.clone()).or_insert(0) += count;
            }
            continue;
        };

        let gendered_target = target.has_explicit_gender();
        let mut merged = 0;
        for (key, count) in &group {
            let absorbed = *key == target
                || settings.is_minor_pos(key.pos)
                || (key.is_noun() && key.has_explicit_gender() != gendered_target);
            if absorbed {
                merged += count;
            } else {
                *result.entry((*key).clone()).or_insert(0) += count;
            }
        }

        let own = group.iter().find(|(key, _)| *key == target).map_or(0, |(_, count)| *count);
        if merged > own {
            debug!("Absorbed {} fragments of '{}' into {}", merged - own, lemma, target);
        }
        *result.entry(target.clone()).or_insert(0) += merged;
    }

    result
}

/// Gendered nouns take precedence over the ungendered reading.
fn pick_target<'k>(
    group: &[(&'k ConsolidationKey, u64)],
    articles: &ArticleSettings,
) -> Option<&'k ConsolidationKey> {
    let gendered: Vec<(&ConsolidationKey, u64)> = group
        .iter()
        .filter(|(key, _)| key.is_noun() && key.has_explicit_gender())
        .copied()
        .collect();
    if !gendered.is_empty() {
        return heaviest(&gendered, articles);
    }

    let ungendered: Vec<(&ConsolidationKey, u64)> =
        group.iter().filter(|(key, _)| key.is_noun()).copied().collect();
    heaviest(&ungendered, articles)
}

fn fold_gender_variants(
    counts: BTreeMap<ConsolidationKey, u64>,
    articles: &ArticleSettings,
) -> BTreeMap<ConsolidationKey, u64> {
    let mut folds: Vec<(ConsolidationKey, ConsolidationKey)> = Vec::new();

    for (_, group) in group_by_lemma(&counts) {
        let gendered: Vec<(&ConsolidationKey, u64)> = group
            .iter()
            .filter(|(key, _)| key.is_noun() && key.has_explicit_gender())
            .copied()
            .collect();
        let Some(target) = heaviest(&gendered, articles) else {
            continue;
        };
        for (key, _) in group.iter().filter(|(key, _)| key.is_noun() && !key.has_explicit_gender())
        {
            folds.push(((*key).clone(), target.clone()));
        }
    }

    let mut result = counts;
    for (from, into) in folds {
        if let Some(count) = result.remove(&from) {
            debug!("Folded {} ({}) into {}", from, count, into);
            *result.entry(into).or_insert(0) += count;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::Gender,
        segmentation::pos::POS,
    };

    fn counts(entries: &[(&str, POS, Gender, u64)]) -> BTreeMap<ConsolidationKey, u64> {
        entries
            .iter()
            .map(|(lemma, pos, gender, count)| {
                (ConsolidationKey::new(lemma, *pos, *gender), *count)
            })
            .collect()
    }

    fn rows(entries: &[FrequencyEntry]) -> Vec<(&str, POS, u64)> {
        entries.iter().map(|e| (e.display_key.as_str(), e.key.pos, e.count)).collect()
    }

    fn settings() -> EngineSettings {
        EngineSettings::default()
    }

    #[test]
    fn homonyms_with_different_genders_survive() {
        let input = counts(&[
            ("capital", POS::Noun, Gender::Fem, 5),
            ("capital", POS::Noun, Gender::Masc, 3),
        ]);
        let output = consolidate(&input, &settings());
        assert_eq!(rows(&output), vec![("la capital", POS::Noun, 5), ("el capital", POS::Noun, 3)]);
    }

    #[test]
    fn minor_readings_are_absorbed_into_dominant_noun() {
        let input = counts(&[
            ("capital", POS::Numeral, Gender::Unknown, 2),
            ("capital", POS::Interjection, Gender::Unknown, 1),
            ("capital", POS::Noun, Gender::Masc, 7),
        ]);
        let output = consolidate(&input, &settings());
        assert_eq!(rows(&output), vec![("el capital", POS::Noun, 10)]);
    }

    #[test]
    fn adjective_reading_stays_standalone() {
        let input = counts(&[
            ("capital", POS::Numeral, Gender::Unknown, 2),
            ("capital", POS::Adjective, Gender::Unknown, 1),
            ("capital", POS::Noun, Gender::Masc, 7),
        ]);
        let output = consolidate(&input, &settings());
        assert_eq!(
            rows(&output),
            vec![("el capital", POS::Noun, 9), ("capital", POS::Adjective, 1)]
        );
    }

    #[test]
    fn no_merge_without_dominant_noun() {
        // 2 of 7 is below a third
        let input = counts(&[
            ("cerca", POS::Adverb, Gender::Unknown, 4),
            ("cerca", POS::Numeral, Gender::Unknown, 1),
            ("cerca", POS::Noun, Gender::Fem, 2),
        ]);
        let output = consolidate(&input, &settings());
        assert_eq!(output.len(), 3);
        assert_eq!(output.iter().map(|e| e.count).sum::<u64>(), 7);
    }

    #[test]
    fn threshold_is_strict() {
        let mut settings = settings();
        settings.consolidation_threshold = 0.5;
        let input = counts(&[
            ("bajo", POS::Numeral, Gender::Unknown, 1),
            ("bajo", POS::Noun, Gender::Masc, 1),
        ]);
        assert_eq!(consolidate(&input, &settings).len(), 2);
    }

    #[test]
    fn ungendered_noun_folds_into_gendered_target() {
        let input = counts(&[
            ("mesa", POS::Noun, Gender::Unknown, 4),
            ("mesa", POS::Noun, Gender::Fem, 6),
            ("mesa", POS::Verb, Gender::Unknown, 1),
        ]);
        let output = consolidate(&input, &settings());
        assert_eq!(rows(&output), vec![("la mesa", POS::Noun, 10), ("mesa", POS::Verb, 1)]);
    }

    #[test]
    fn ungendered_target_absorbs_minor_readings() {
        let input = counts(&[
            ("euro", POS::Noun, Gender::Unknown, 3),
            ("euro", POS::Symbol, Gender::Unknown, 1),
        ]);
        let output = consolidate(&input, &settings());
        assert_eq!(rows(&output), vec![("euro", POS::Noun, 4)]);
    }

    #[test]
    fn gender_folding_runs_without_dominant_noun() {
        let input = counts(&[
            ("orden", POS::Verb, Gender::Unknown, 10),
            ("orden", POS::Noun, Gender::Unknown, 1),
            ("orden", POS::Noun, Gender::Fem, 1),
        ]);
        let output = consolidate(&input, &settings());
        assert_eq!(rows(&output), vec![("orden", POS::Verb, 10), ("la orden", POS::Noun, 2)]);
    }

    #[test]
    fn three_way_tie_goes_to_masculine() {
        let input = counts(&[
            ("cometa", POS::Noun, Gender::Masc, 3),
            ("cometa", POS::Noun, Gender::Fem, 3),
            ("cometa", POS::Noun, Gender::Unknown, 3),
        ]);
        let output = consolidate(&input, &settings());
        assert_eq!(
            rows(&output),
            vec![("el cometa", POS::Noun, 6), ("la cometa", POS::Noun, 3)]
        );
    }

    #[test]
    fn consolidation_is_idempotent() {
        let input = counts(&[
            ("capital", POS::Numeral, Gender::Unknown, 2),
            ("capital", POS::Adjective, Gender::Unknown, 1),
            ("capital", POS::Noun, Gender::Masc, 7),
            ("capital", POS::Noun, Gender::Fem, 7),
            ("capital", POS::Noun, Gender::Unknown, 2),
            ("orden", POS::Verb, Gender::Unknown, 10),
            ("orden", POS::Noun, Gender::Unknown, 1),
            ("orden", POS::Particle, Gender::Unknown, 1),
        ]);
        let once = consolidate(&input, &settings());
        let again_input: BTreeMap<ConsolidationKey, u64> =
            once.iter().map(|e| (e.key.clone(), e.count)).collect();
        let twice = consolidate(&again_input, &settings());
        assert_eq!(once, twice);
    }

    #[test]
    fn counts_are_conserved() {
        let input = counts(&[
            ("banco", POS::Noun, Gender::Masc, 8),
            ("banco", POS::Noun, Gender::Unknown, 3),
            ("banco", POS::Other, Gender::Unknown, 2),
            ("bancar", POS::Verb, Gender::Unknown, 1),
            ("bello", POS::Adjective, Gender::Unknown, 5),
        ]);
        let output = consolidate(&input, &settings());
        assert_eq!(output.iter().map(|e| e.count).sum::<u64>(), input.values().sum::<u64>());
    }

    #[test]
    fn output_is_deterministic() {
        let input = counts(&[
            ("gato", POS::Noun, Gender::Masc, 2),
            ("perro", POS::Noun, Gender::Masc, 2),
            ("azul", POS::Adjective, Gender::Unknown, 2),
        ]);
        let first = consolidate(&input, &settings());
        for _ in 0..5 {
            assert_eq!(consolidate(&input, &settings()), first);
        }
        let keys: Vec<&str> = first.iter().map(|e| e.display_key.as_str()).collect();
        assert_eq!(keys, vec!["azul", "el gato", "el perro"]);
    }

    #[test]
    fn display_map_keeps_larger_count_on_collision() {
        let input = counts(&[
            ("capital", POS::Adjective, Gender::Unknown, 1),
            ("capital", POS::Verb, Gender::Unknown, 4),
        ]);
        let output = consolidate(&input, &settings());
        assert_eq!(to_display_map(&output).get("capital"), Some(&4));
    }
}
