use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::{LanguageBytes, LanguageShare};

/// Sum per-repository byte counts into one mapping.
///
/// Languages keep the order in which they were first seen, so ties in the
/// final distribution are broken by discovery order.
pub fn merge_language_bytes<I>(per_repository: I) -> LanguageBytes
where
    I: IntoIterator<Item = LanguageBytes>,
{
    let mut totals: LanguageBytes = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for bytes in per_repository {
        for (language, count) in bytes {
            match index.get(&language) {
                Some(&i) => totals[i].1 += count,
                None => {
                    index.insert(language.clone(), totals.len());
                    totals.push((language, count));
                }
            }
        }
    }

    totals
}

/// Percentage share of each language, highest first.
///
/// Percentages are rounded to one decimal. The sort is stable, so languages
/// with equal rounded shares stay in discovery order. An empty mapping or a
/// zero byte total yields an empty distribution.
pub fn distribution(totals: &LanguageBytes) -> Vec<LanguageShare> {
    let total_bytes: u64 = totals.iter().map(|(_, count)| count).sum();
    if total_bytes == 0 {
        return Vec::new();
    }

    let mut shares: Vec<LanguageShare> = totals
        .iter()
        .map(|(language, count)| LanguageShare {
            language: language.clone(),
            percentage: round_one_decimal(*count as f64 * 100.0 / total_bytes as f64),
        })
        .collect();

    shares.sort_by(|a, b| {
        b.percentage
            .partial_cmp(&a.percentage)
            .unwrap_or(Ordering::Equal)
    });

    shares
}

/// Distribution over the byte maps of every repository
pub fn language_distribution<I>(per_repository: I) -> Vec<LanguageShare>
where
    I: IntoIterator<Item = LanguageBytes>,
{
    distribution(&merge_language_bytes(per_repository))
}

/// Stand-in byte map for a repository whose language breakdown is unavailable.
///
/// Weighs the primary language as a single byte; these entries are not
/// comparable with real byte counts.
pub fn fallback_bytes(primary_language: Option<&str>) -> LanguageBytes {
    primary_language
        .map(|language| vec![(language.to_string(), 1)])
        .unwrap_or_default()
}

#[inline]
fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
