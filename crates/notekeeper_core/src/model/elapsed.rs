//! Relative "posted N ago" labels for note cards.

const MS_PER_MINUTE: f64 = 60_000.0;

/// Formats the time between `posted_at_ms` and `now_ms`.
///
/// Each unit is rounded half-up from the previous one, so 90 seconds reads as
/// "2 mins ago" and 30 hours as "1 days ago".
pub fn format_elapsed(posted_at_ms: i64, now_ms: i64) -> String {
    let mins = round_half_up(now_ms.saturating_sub(posted_at_ms) as f64 / MS_PER_MINUTE);
    let hours = round_half_up(mins as f64 / 60.0);
    let days = round_half_up(hours as f64 / 24.0);

    if mins < 1 {
        "Just now".to_string()
    } else if mins < 60 {
        format!("{mins} mins ago")
    } else if hours < 24 {
        format!("{hours} hours ago")
    } else {
        format!("{days} days ago")
    }
}

fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}
