pub mod message;
pub mod presence;
pub mod thread;

pub use message::*;
pub use presence::*;
pub use thread::*;

use time::format_description::FormatItem;
use time::macros::format_description;
use time::OffsetDateTime;

// Fixed-width subsecond digits so lexicographic order on stored timestamps
// matches chronological order.
const TIMESTAMP_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]Z");

/// Current UTC time as an RFC 3339 string, the storage format for every
/// timestamp in this crate.
pub fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00.000000Z"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_is_fixed_width() {
        let ts = now_rfc3339();
        assert_eq!(ts.len(), "2026-08-30T12:00:00.000000Z".len());
        assert!(ts.ends_with('Z'));
    }

    #[test]
    fn test_timestamps_sort_chronologically() {
        let a = now_rfc3339();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = now_rfc3339();
        assert!(a < b);
    }
}
