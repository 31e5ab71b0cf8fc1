//! Terminal presentation of lookup results.

use std::fmt::Write as _;
use std::time::Duration;

use chrono::{DateTime, Utc};
use colored::Colorize;

use crate::models::LocationRecord;
use crate::session::RecordSource;

const REGIONAL_INDICATOR_OFFSET: u32 = 127397;

/// Flag emoji for a two-letter country code, or an empty string.
///
/// ```
/// use ipeed::display::flag_emoji;
///
/// assert_eq!(flag_emoji("us"), "\u{1F1FA}\u{1F1F8}");
/// assert_eq!(flag_emoji("U1"), "");
/// ```
pub fn flag_emoji(code: &str) -> String {
    let bytes = code.as_bytes();
    if bytes.len() != 2 || !bytes.iter().all(u8::is_ascii_alphabetic) {
        return String::new();
    }
    bytes
        .iter()
        .filter_map(|b| char::from_u32(REGIONAL_INDICATOR_OFFSET + u32::from(b.to_ascii_uppercase())))
        .collect()
}

pub fn or_unknown(field: Option<&str>) -> &str {
    match field {
        Some(value) if !value.is_empty() => value,
        _ => "Unknown",
    }
}

/// Human-readable age such as `"42s ago"`, `"3h 5m ago"` or `"2d ago"`.
pub fn format_cache_age(age: Duration) -> String {
    let seconds = age.as_secs();
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    if seconds < 60 {
        format!("{}s ago", seconds)
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if hours < 24 {
        match minutes % 60 {
            0 => format!("{}h ago", hours),
            m => format!("{}h {}m ago", hours, m),
        }
    } else {
        match hours % 24 {
            0 => format!("{}d ago", days),
            h => format!("{}d {}h ago", days, h),
        }
    }
}

/// Optional detail rows, in display order. Rows for unreported fields are
/// omitted.
pub fn detail_rows(record: &LocationRecord) -> Vec<(&'static str, String)> {
    let mut rows = Vec::new();

    if record.asn.is_some() || record.as_name.is_some() {
        let value = match &record.as_name {
            Some(name) => format!("{} ({})", or_unknown(record.asn.as_deref()), name),
            None => or_unknown(record.asn.as_deref()).to_string(),
        };
        rows.push(("ASN", value));
    }
    if let Some(postal) = &record.postal {
        rows.push(("Postal Code", postal.clone()));
    }
    if let Some(currency) = &record.currency {
        rows.push(("Currency", currency.clone()));
    }
    if let Some(languages) = &record.languages {
        rows.push(("Languages", languages.clone()));
    }

    let connection: Vec<&str> = [
        (record.mobile, "Mobile"),
        (record.proxy, "Proxy"),
        (record.hosting, "Hosting"),
    ]
    .into_iter()
    .filter(|(flag, _)| *flag == Some(true))
    .map(|(_, label)| label)
    .collect();
    if !connection.is_empty() {
        rows.push(("Connection", connection.join(", ")));
    }

    if let Some(threat) = &record.threat {
        rows.push(("Threat Level", threat.clone()));
    }
    rows
}

/// Provider and cache status, e.g. `"ipinfo.io • 🗄️ Cached 5m ago"`.
pub fn source_line(record: &LocationRecord, source: &RecordSource) -> String {
    source_line_at(record, source, Utc::now())
}

pub fn source_line_at(
    record: &LocationRecord,
    source: &RecordSource,
    now: DateTime<Utc>,
) -> String {
    let status = match source {
        RecordSource::Fresh => "🔄 Fresh lookup".to_string(),
        RecordSource::Cached { cached_at } => {
            let age = (now - *cached_at).to_std().unwrap_or_default();
            format!("🗄️ Cached {}", format_cache_age(age))
        }
    };
    if record.provider.is_empty() {
        status
    } else {
        format!("{} • {}", record.provider, status)
    }
}

/// Multi-line colored rendering of a record.
pub fn render(record: &LocationRecord, source: &RecordSource) -> String {
    let flag = record
        .country_code
        .as_deref()
        .map(flag_emoji)
        .unwrap_or_default();
    let country = format!("{} {}", flag, or_unknown(record.country_name.as_deref()));

    let mut rows: Vec<(&str, String)> = vec![
        ("IP Address", record.ip.clone()),
        ("Country", country.trim_start().to_string()),
        ("Region", or_unknown(record.region.as_deref()).to_string()),
        ("City", or_unknown(record.city.as_deref()).to_string()),
        ("ISP", or_unknown(record.org.as_deref()).to_string()),
        ("Timezone", or_unknown(record.timezone.as_deref()).to_string()),
    ];
    if let Some((lat, lon)) = record.coordinates() {
        rows.push(("Coordinates", format!("{}, {}", lat, lon)));
    }
    rows.extend(detail_rows(record));

    let mut out = String::new();
    for (label, value) in rows {
        let _ = writeln!(out, "{:>13} {}", format!("{}:", label).bold(), value);
    }
    let _ = write!(out, "{}", source_line(record, source).dimmed());
    out
}

/// One-line summary used by batch output.
pub fn summary_line(record: &LocationRecord) -> String {
    let flag = record
        .country_code
        .as_deref()
        .map(flag_emoji)
        .unwrap_or_default();
    let place = [
        record.city.as_deref(),
        record.region.as_deref(),
        record.country_name.as_deref(),
    ]
    .into_iter()
    .flatten()
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join(", ");
    let place = if place.is_empty() { "Unknown" } else { place.as_str() };
    let flag = if flag.is_empty() { String::new() } else { format!("{} ", flag) };
    format!("{}\t{}{}\t{}", record.ip, flag, place, record.provider)
}

/// Error line for a failed lookup.
pub fn render_error(message: &str) -> String {
    format!("{} {}", "Error:".red().bold(), message)
}
