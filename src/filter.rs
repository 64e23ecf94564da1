use chrono::{Duration, NaiveDate};

use crate::models::DeviceStat;

/// The user-selected filter predicate. `None` on any constraint means
/// "all"; the search term matches case-insensitively against device id
/// or IP address.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatFilter {
    pub since_days: Option<i64>,
    pub device_model: Option<String>,
    pub android_version: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub search: Option<String>,
}

impl StatFilter {
    pub fn matches(&self, stat: &DeviceStat, today: NaiveDate) -> bool {
        if let Some(days) = self.since_days {
            if stat.date < cutoff_date(days, today) {
                return false;
            }
        }
        if let Some(model) = &self.device_model {
            if stat.device_model != *model {
                return false;
            }
        }
        if let Some(version) = &self.android_version {
            if stat.android_version != *version {
                return false;
            }
        }
        if let Some(country) = &self.country {
            if stat.country != *country {
                return false;
            }
        }
        if let Some(region) = &self.region {
            if stat.region != *region {
                return false;
            }
        }
        if let Some(city) = &self.city {
            if stat.city != *city {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            if !needle.is_empty()
                && !stat.device_id.to_lowercase().contains(&needle)
                && !stat.ip_address.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        true
    }
}

/// Lower bound for a day-window filter. Both the cutoff and record dates
/// are calendar days, so the comparison never drifts with time of day.
pub fn cutoff_date(since_days: i64, today: NaiveDate) -> NaiveDate {
    today - Duration::days(since_days.max(1))
}

/// Recompute the active subset from scratch. Pure: neither input is
/// touched, and the same predicate over the result returns it unchanged.
pub fn apply_filter(stats: &[DeviceStat], filter: &StatFilter, today: NaiveDate) -> Vec<DeviceStat> {
    stats
        .iter()
        .filter(|stat| filter.matches(stat, today))
        .cloned()
        .collect()
}
