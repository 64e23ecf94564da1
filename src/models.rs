use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One decoded row of the device telemetry feed.
///
/// `date`, `device_id`, and `open_count` are guaranteed present by the
/// decoder; every other field is best-effort and may be empty (strings)
/// or zero (numbers) when the feed omits or mangles it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceStat {
    pub date: NaiveDate,
    pub device_id: String,
    pub open_count: f64,
    pub device_model: String,
    pub android_version: String,
    pub manufacturer: String,
    pub sdk_version: f64,
    pub country: String,
    pub region: String,
    pub city: String,
    pub ip_address: String,
    pub isp: String,
    pub latitude: f64,
    pub longitude: f64,
    pub report_time: String,
}

impl DeviceStat {
    /// True when the record carries usable map coordinates.
    /// Zero is the coercion default for unparsable values, so it is
    /// treated as "no coordinate" rather than a point on the equator.
    pub fn has_coordinates(&self) -> bool {
        self.latitude != 0.0 && self.longitude != 0.0
    }
}

/// Index-aligned label/value pairs for one chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl ChartSeries {
    pub fn from_pairs(pairs: Vec<(String, f64)>) -> Self {
        let mut series = ChartSeries::default();
        for (label, value) in pairs {
            series.labels.push(label);
            series.values.push(value);
        }
        series
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Sorted distinct values per filterable dimension, computed over the full
/// record set so the embedding UI can populate its dropdowns.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub device_models: Vec<String>,
    pub android_versions: Vec<String>,
    pub countries: Vec<String>,
    pub regions: Vec<String>,
    pub cities: Vec<String>,
}

/// Recency bucket for a record's report date, midnight-truncated on both
/// sides so the current hour never shifts a record between buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    Today,
    PastWeek,
    PastMonth,
    Historical,
}

impl ActivityStatus {
    pub fn for_date(date: NaiveDate, today: NaiveDate) -> Self {
        let days = (today - date).num_days();
        if days == 0 {
            ActivityStatus::Today
        } else if days <= 7 {
            ActivityStatus::PastWeek
        } else if days <= 30 {
            ActivityStatus::PastMonth
        } else {
            ActivityStatus::Historical
        }
    }
}
