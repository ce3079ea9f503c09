//! Helpers for `YYYYMM` period keys.

/// Format a period key as a short month label.
/// Example: "202503" -> "Mar 2025"
pub fn month_label(period: &str) -> String {
    if period.len() != 6 {
        return period.to_string();
    }
    let (year, month) = period.split_at(4);
    let name = match month {
        "01" => "Jan",
        "02" => "Feb",
        "03" => "Mar",
        "04" => "Apr",
        "05" => "May",
        "06" => "Jun",
        "07" => "Jul",
        "08" => "Aug",
        "09" => "Sep",
        "10" => "Oct",
        "11" => "Nov",
        "12" => "Dec",
        _ => return period.to_string(),
    };
    format!("{} {}", name, year)
}

/// Whether a string is a plausible period key.
pub fn is_period_key(s: &str) -> bool {
    if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    matches!(s[4..].parse::<u32>(), Ok(m) if (1..=12).contains(&m))
}

/// Every period of the anchor's calendar year up to and including the
/// anchor, ascending. Used to populate the period selector.
pub fn periods_through(anchor: &str) -> Vec<String> {
    if !is_period_key(anchor) {
        return Vec::new();
    }
    let year = &anchor[..4];
    let last: u32 = anchor[4..].parse().unwrap_or(12);
    (1..=last).map(|m| format!("{}{:02}", year, m)).collect()
}
