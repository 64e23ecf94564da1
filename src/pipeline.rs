use std::collections::BTreeSet;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::info;

use crate::aggregate::{count_distinct, daily_series, geo_key, sum_by_key, top_n, total_opens};
use crate::decode::decode_stats;
use crate::error::PipelineError;
use crate::fetch::fetch_feed;
use crate::filter::{apply_filter, StatFilter};
use crate::models::{ChartSeries, DeviceStat, FilterOptions};

/// Chart and legend cardinality cap.
pub const TOP_GROUPS: usize = 5;
/// Table feed cap, newest rows first.
pub const RECENT_ROWS: usize = 100;

/// The device model with the highest summed opens in the active subset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopDevice {
    pub model: String,
    pub opens: f64,
}

/// Everything the rendering collaborator needs for one paint: summary
/// counters, chart series, the table feed, and map markers. Built fresh
/// from the active subset on every call and never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub total_opens: f64,
    pub unique_devices: usize,
    pub android_version_count: usize,
    pub location_count: usize,
    pub today_opens: f64,
    pub today_devices: usize,
    pub top_device: Option<TopDevice>,
    pub daily: ChartSeries,
    pub top_models: ChartSeries,
    pub top_versions: ChartSeries,
    pub top_locations: ChartSeries,
    pub recent: Vec<DeviceStat>,
    pub markers: Vec<DeviceStat>,
}

/// Pipeline context: the immutable full record set from the last
/// successful load plus the currently active filter. Owned by the
/// embedding application; every derived value is recomputed from scratch,
/// so there is no shared aggregate state to keep consistent.
#[derive(Debug, Default)]
pub struct StatsPipeline {
    stats: Vec<DeviceStat>,
    filter: StatFilter,
}

impl StatsPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the feed and replace the full record set. The previous set
    /// stays in place when the load fails.
    pub async fn load(&mut self, url: &str) -> Result<usize, PipelineError> {
        let text = fetch_feed(url).await?;
        self.load_text(&text)
    }

    /// Decode already-fetched feed text and replace the full record set.
    pub fn load_text(&mut self, text: &str) -> Result<usize, PipelineError> {
        let stats = decode_stats(text)?;
        info!(records = stats.len(), "device stats loaded");
        self.stats = stats;
        Ok(self.stats.len())
    }

    pub fn stats(&self) -> &[DeviceStat] {
        &self.stats
    }

    pub fn filter(&self) -> &StatFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: StatFilter) {
        self.filter = filter;
    }

    /// Dropdown options over the FULL record set, independent of the
    /// active filter.
    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions {
            device_models: distinct_sorted(&self.stats, |s| &s.device_model),
            android_versions: distinct_sorted(&self.stats, |s| &s.android_version),
            countries: distinct_sorted(&self.stats, |s| &s.country),
            regions: distinct_sorted(&self.stats, |s| &s.region),
            cities: distinct_sorted(&self.stats, |s| &s.city),
        }
    }

    /// Records currently passing the active filter.
    pub fn active_subset(&self) -> Vec<DeviceStat> {
        self.active_subset_at(Utc::now().date_naive())
    }

    pub fn active_subset_at(&self, today: NaiveDate) -> Vec<DeviceStat> {
        apply_filter(&self.stats, &self.filter, today)
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        self.snapshot_at(Utc::now().date_naive())
    }

    pub fn snapshot_at(&self, today: NaiveDate) -> DashboardSnapshot {
        let subset = self.active_subset_at(today);

        let model_groups = sum_by_key(&subset, |s| s.device_model.clone());
        let version_groups = sum_by_key(&subset, |s| s.android_version.clone());
        let geo_groups = sum_by_key(&subset, geo_key);

        let today_subset: Vec<DeviceStat> = subset
            .iter()
            .filter(|s| s.date == today)
            .cloned()
            .collect();

        let top_device = {
            let best = top_n(&model_groups, 1);
            best.labels.first().map(|model| TopDevice {
                model: model.clone(),
                opens: best.values[0],
            })
        };

        let mut recent = subset.clone();
        recent.sort_by(|a, b| b.date.cmp(&a.date));
        recent.truncate(RECENT_ROWS);

        let markers: Vec<DeviceStat> = subset
            .iter()
            .filter(|s| s.has_coordinates())
            .cloned()
            .collect();

        DashboardSnapshot {
            total_opens: total_opens(&subset),
            unique_devices: count_distinct(&subset, |s| s.device_id.clone()),
            android_version_count: version_groups.len(),
            location_count: geo_groups.len(),
            today_opens: total_opens(&today_subset),
            today_devices: count_distinct(&today_subset, |s| s.device_id.clone()),
            top_device,
            daily: daily_series(&subset),
            top_models: top_n(&model_groups, TOP_GROUPS),
            top_versions: top_n(&version_groups, TOP_GROUPS),
            top_locations: top_n(&geo_groups, TOP_GROUPS),
            recent,
            markers,
        }
    }
}

fn distinct_sorted<F>(stats: &[DeviceStat], value_fn: F) -> Vec<String>
where
    F: Fn(&DeviceStat) -> &str,
{
    let values: BTreeSet<&str> = stats
        .iter()
        .map(|stat| value_fn(stat))
        .filter(|value| !value.is_empty())
        .collect();
    values.into_iter().map(str::to_string).collect()
}
