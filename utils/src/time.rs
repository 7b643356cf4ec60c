//! Time formatting helpers.

/// Format a duration in seconds to a human-readable string.
pub fn format_duration(secs: u64) -> String {
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs < 86400 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else {
        format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
    }
}

/// How long ago `then` was, relative to `now` (both UNIX seconds).
pub fn format_age(then: u64, now: u64) -> String {
    match now.checked_sub(then) {
        Some(secs) => format!("{} ago", format_duration(secs)),
        None => "in the future".to_string(),
    }
}
