use std::collections::{HashMap, HashSet};

use crate::models::{ChartSeries, DeviceStat};

/// Bucket label for records whose grouping key is empty.
pub const UNKNOWN_BUCKET: &str = "unknown";

/// Group records by `key_fn`, summing `open_count` per group. Empty keys
/// land in the unknown bucket instead of being dropped, so the grouped
/// totals always add up to the total opens of the input. Groups come back
/// in first-encountered order.
pub fn sum_by_key<F>(stats: &[DeviceStat], key_fn: F) -> Vec<(String, f64)>
where
    F: Fn(&DeviceStat) -> String,
{
    let mut groups: Vec<(String, f64)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for stat in stats {
        let mut key = key_fn(stat);
        if key.is_empty() {
            key = UNKNOWN_BUCKET.to_string();
        }
        match index.get(&key) {
            Some(&i) => groups[i].1 += stat.open_count,
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, stat.open_count));
            }
        }
    }

    groups
}

/// The `n` highest-sum groups as an index-aligned chart series. The sort
/// is stable and descending, so ties keep first-encountered order.
pub fn top_n(groups: &[(String, f64)], n: usize) -> ChartSeries {
    let mut ranked: Vec<(String, f64)> = groups.to_vec();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(n);
    ChartSeries::from_pairs(ranked)
}

/// Count unique non-empty key values.
pub fn count_distinct<F>(stats: &[DeviceStat], key_fn: F) -> usize
where
    F: Fn(&DeviceStat) -> String,
{
    stats
        .iter()
        .map(key_fn)
        .filter(|key| !key.is_empty())
        .collect::<HashSet<_>>()
        .len()
}

/// Sum of opens across the input.
pub fn total_opens(stats: &[DeviceStat]) -> f64 {
    stats.iter().map(|stat| stat.open_count).sum()
}

/// Per-day opens in ascending date order, ready for bar and line charts.
pub fn daily_series(stats: &[DeviceStat]) -> ChartSeries {
    let mut groups = sum_by_key(stats, |stat| stat.date.to_string());
    groups.sort_by(|a, b| a.0.cmp(&b.0));
    ChartSeries::from_pairs(groups)
}

/// Geographic grouping key: country, region, and city joined with `|`,
/// each empty component replaced by the unknown bucket.
pub fn geo_key(stat: &DeviceStat) -> String {
    let part = |value: &str| {
        if value.is_empty() {
            UNKNOWN_BUCKET
        } else {
            value
        }
        .to_string()
    };
    format!(
        "{}|{}|{}",
        part(&stat.country),
        part(&stat.region),
        part(&stat.city)
    )
}
