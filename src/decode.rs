use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use crate::error::PipelineError;
use crate::models::DeviceStat;

/// Best-effort numeric policy for the feed: anything that does not parse
/// as a number becomes zero, never an error.
pub fn coerce_numeric_or_zero(raw: &str) -> f64 {
    raw.trim().parse::<f64>().unwrap_or(0.0)
}

/// Column positions resolved once from the header row. The feed is
/// positional, so unknown extra columns simply never get looked up.
struct Columns {
    date: Option<usize>,
    device_id: Option<usize>,
    open_count: Option<usize>,
    device_model: Option<usize>,
    android_version: Option<usize>,
    manufacturer: Option<usize>,
    sdk_version: Option<usize>,
    country: Option<usize>,
    region: Option<usize>,
    city: Option<usize>,
    ip_address: Option<usize>,
    isp: Option<usize>,
    latitude: Option<usize>,
    longitude: Option<usize>,
    report_time: Option<usize>,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Self {
        let position = |name: &str| headers.iter().position(|h| h == name);
        Columns {
            date: position("date"),
            device_id: position("device_id"),
            open_count: position("open_count"),
            device_model: position("device_model"),
            android_version: position("android_version"),
            manufacturer: position("manufacturer"),
            sdk_version: position("sdk_version"),
            country: position("country"),
            region: position("region"),
            city: position("city"),
            ip_address: position("ip_address"),
            isp: position("isp"),
            latitude: position("latitude"),
            longitude: position("longitude"),
            report_time: position("report_time"),
        }
    }
}

fn field<'a>(record: &'a StringRecord, column: Option<usize>) -> &'a str {
    column.and_then(|i| record.get(i)).unwrap_or("")
}

/// Decode the raw CSV feed into telemetry records.
///
/// The first non-blank line is the header; blank lines are skipped. Rows
/// degrade silently: missing trailing fields read as empty, unparsable
/// numbers coerce to zero. A row is kept only when its raw `date`,
/// `device_id`, and `open_count` fields are all non-empty and the date
/// parses as a calendar day; everything else is dropped without error.
pub fn decode_stats(text: &str) -> Result<Vec<DeviceStat>, PipelineError> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let columns = Columns::resolve(&headers);

    let mut stats = Vec::new();
    let mut dropped = 0usize;

    for result in reader.records() {
        let record = result?;

        let raw_date = field(&record, columns.date);
        let device_id = field(&record, columns.device_id);
        let raw_open_count = field(&record, columns.open_count);

        // Required-field check happens on the raw values, before numeric
        // coercion: a present-but-unparsable open_count survives as zero,
        // an absent one drops the row.
        if raw_date.is_empty() || device_id.is_empty() || raw_open_count.is_empty() {
            dropped += 1;
            continue;
        }

        let date = match NaiveDate::parse_from_str(raw_date, "%Y-%m-%d") {
            Ok(date) => date,
            Err(_) => {
                dropped += 1;
                continue;
            }
        };

        stats.push(DeviceStat {
            date,
            device_id: device_id.to_string(),
            open_count: coerce_numeric_or_zero(raw_open_count),
            device_model: field(&record, columns.device_model).to_string(),
            android_version: field(&record, columns.android_version).to_string(),
            manufacturer: field(&record, columns.manufacturer).to_string(),
            sdk_version: coerce_numeric_or_zero(field(&record, columns.sdk_version)),
            country: field(&record, columns.country).to_string(),
            region: field(&record, columns.region).to_string(),
            city: field(&record, columns.city).to_string(),
            ip_address: field(&record, columns.ip_address).to_string(),
            isp: field(&record, columns.isp).to_string(),
            latitude: coerce_numeric_or_zero(field(&record, columns.latitude)),
            longitude: coerce_numeric_or_zero(field(&record, columns.longitude)),
            report_time: field(&record, columns.report_time).to_string(),
        });
    }

    debug!(kept = stats.len(), dropped, "decoded device stats feed");
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_minimal_rows() {
        let text = "date,device_id,open_count\n2025-04-13,abc123,5\n2025-04-13,def456,3\n";
        let stats = decode_stats(text).unwrap();

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].device_id, "abc123");
        assert_eq!(stats[0].open_count, 5.0);
        assert_eq!(stats[0].date.to_string(), "2025-04-13");
        assert_eq!(stats[1].open_count, 3.0);
    }

    #[test]
    fn strips_quotes_from_quoted_fields() {
        let text = "date,device_id,open_count,device_model\n\
                    \"2025-04-13\",\"abc123\",\"5\",\"Pixel 8\"\n";
        let stats = decode_stats(text).unwrap();

        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].device_model, "Pixel 8");
        assert_eq!(stats[0].open_count, 5.0);
    }

    #[test]
    fn unparsable_open_count_coerces_to_zero_and_row_survives() {
        let text = "date,device_id,open_count\n2025-04-13,abc123,N/A\n";
        let stats = decode_stats(text).unwrap();

        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].open_count, 0.0);
    }

    #[test]
    fn missing_required_fields_drops_the_row() {
        let text = "date,device_id,open_count\n\
                    2025-04-13,,5\n\
                    ,abc123,5\n\
                    2025-04-13,abc123,\n\
                    2025-04-13,abc123,5\n";
        let stats = decode_stats(text).unwrap();

        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].device_id, "abc123");
    }

    #[test]
    fn short_rows_decode_missing_trailing_fields_as_empty() {
        // open_count is the third column, so a two-field row fails the
        // required-field check rather than erroring.
        let text = "date,device_id,open_count,country\n\
                    2025-04-13,abc123\n\
                    2025-04-13,def456,2\n";
        let stats = decode_stats(text).unwrap();

        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].device_id, "def456");
        assert_eq!(stats[0].country, "");
    }

    #[test]
    fn blank_lines_are_ignored() {
        let text = "date,device_id,open_count\n\n2025-04-13,abc123,5\n\n";
        let stats = decode_stats(text).unwrap();
        assert_eq!(stats.len(), 1);
    }

    #[test]
    fn unknown_columns_are_decoded_but_unused() {
        let text = "date,mystery,device_id,open_count\n2025-04-13,??,abc123,5\n";
        let stats = decode_stats(text).unwrap();

        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].device_id, "abc123");
        assert_eq!(stats[0].open_count, 5.0);
    }

    #[test]
    fn unparsable_date_drops_the_row() {
        let text = "date,device_id,open_count\nnot-a-date,abc123,5\n";
        let stats = decode_stats(text).unwrap();
        assert!(stats.is_empty());
    }

    #[test]
    fn optional_numeric_fields_coerce_best_effort() {
        let text = "date,device_id,open_count,latitude,longitude,sdk_version\n\
                    2025-04-13,abc123,5,39.9042,garbage,33\n";
        let stats = decode_stats(text).unwrap();

        assert_eq!(stats[0].latitude, 39.9042);
        assert_eq!(stats[0].longitude, 0.0);
        assert_eq!(stats[0].sdk_version, 33.0);
    }

    #[test]
    fn required_fields_round_trip() {
        let text = "date,device_id,open_count,city\n\
                    2025-04-13,abc123,5,Beijing\n\
                    2025-04-14,def456,3,\n";
        let first = decode_stats(text).unwrap();

        let mut encoded = String::from("date,device_id,open_count\n");
        for stat in &first {
            encoded.push_str(&format!(
                "{},{},{}\n",
                stat.date, stat.device_id, stat.open_count
            ));
        }
        let second = decode_stats(&encoded).unwrap();

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.date, b.date);
            assert_eq!(a.device_id, b.device_id);
            assert_eq!(a.open_count, b.open_count);
        }
    }

    #[test]
    fn coercion_handles_common_shapes() {
        assert_eq!(coerce_numeric_or_zero("5"), 5.0);
        assert_eq!(coerce_numeric_or_zero("39.9042"), 39.9042);
        assert_eq!(coerce_numeric_or_zero(" 7 "), 7.0);
        assert_eq!(coerce_numeric_or_zero("N/A"), 0.0);
        assert_eq!(coerce_numeric_or_zero(""), 0.0);
    }
}
