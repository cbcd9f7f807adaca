//! Recognition of bare timestamp lines in transcript text.
//!
//! Interview transcripts mark section positions with lines that contain
//! nothing but an `H:MM:SS` offset. A line with any surrounding text is not
//! a timestamp line; no partial extraction is attempted.

/// Outcome of scanning a single transcript line for a bare timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampScan {
    /// The line is not shaped like a bare timestamp.
    None,
    /// The line is timestamp-shaped but numeric conversion failed
    /// (e.g. an hour field too large to represent).
    Malformed,
    /// A valid timestamp, converted to a total offset in seconds.
    Seconds(u32),
}

impl TimestampScan {
    /// The parsed offset, if the scan produced one.
    pub fn seconds(self) -> Option<u32> {
        match self {
            TimestampScan::Seconds(s) => Some(s),
            _ => None,
        }
    }
}

/// Scan a transcript line for a bare `H+:MM:SS` timestamp.
///
/// The entire stripped line must match: hours are one or more digits,
/// minutes and seconds exactly two digits each. Anything else on the line
/// disqualifies it. Overflow while converting reports
/// [`TimestampScan::Malformed`] rather than failing the caller; segmentation
/// treats both `None` and `Malformed` as "no timestamp here".
pub fn scan_line(line: &str) -> TimestampScan {
    let stripped = line.trim();

    let mut parts = stripped.split(':');
    let (Some(hours), Some(minutes), Some(seconds), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return TimestampScan::None;
    };

    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(hours) || minutes.len() != 2 || seconds.len() != 2 {
        return TimestampScan::None;
    }
    if !all_digits(minutes) || !all_digits(seconds) {
        return TimestampScan::None;
    }

    let Ok(h) = hours.parse::<u32>() else {
        return TimestampScan::Malformed;
    };
    // Two-digit fields always fit; the hour product can still overflow.
    let m: u32 = minutes.parse().unwrap_or(0);
    let s: u32 = seconds.parse().unwrap_or(0);

    match h.checked_mul(3600).and_then(|hs| hs.checked_add(m * 60 + s)) {
        Some(total) => TimestampScan::Seconds(total),
        None => TimestampScan::Malformed,
    }
}

/// Format a second offset back into the canonical `H:MM:SS` display form.
pub fn format_offset(total_seconds: u32) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{}:{:02}:{:02}", hours, minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_valid_timestamps() {
        assert_eq!(scan_line("0:00:00"), TimestampScan::Seconds(0));
        assert_eq!(scan_line("0:01:00"), TimestampScan::Seconds(60));
        assert_eq!(scan_line("1:00:00"), TimestampScan::Seconds(3600));
        assert_eq!(scan_line("0:02:02"), TimestampScan::Seconds(122));
        assert_eq!(scan_line("12:34:56"), TimestampScan::Seconds(45296));
        // Multi-digit hours are allowed
        assert_eq!(scan_line("100:00:01"), TimestampScan::Seconds(360001));
    }

    #[test]
    fn test_scan_tolerates_surrounding_whitespace() {
        assert_eq!(scan_line("  0:00:19  "), TimestampScan::Seconds(19));
        assert_eq!(scan_line("\t0:00:19\n"), TimestampScan::Seconds(19));
    }

    #[test]
    fn test_scan_rejects_lines_with_extra_text() {
        assert_eq!(scan_line("at 0:00:19 she said"), TimestampScan::None);
        assert_eq!(scan_line("0:00:19 hello"), TimestampScan::None);
        assert_eq!(scan_line("hello 0:00:19"), TimestampScan::None);
    }

    #[test]
    fn test_scan_rejects_wrong_shapes() {
        assert_eq!(scan_line(""), TimestampScan::None);
        assert_eq!(scan_line("hello"), TimestampScan::None);
        assert_eq!(scan_line("0:00"), TimestampScan::None);
        assert_eq!(scan_line("0:00:00:00"), TimestampScan::None);
        assert_eq!(scan_line("0:0:00"), TimestampScan::None);
        assert_eq!(scan_line("0:000:00"), TimestampScan::None);
        assert_eq!(scan_line("0:00:0"), TimestampScan::None);
        assert_eq!(scan_line(":00:00"), TimestampScan::None);
        assert_eq!(scan_line("-1:00:00"), TimestampScan::None);
        assert_eq!(scan_line("1:a0:00"), TimestampScan::None);
    }

    #[test]
    fn test_scan_reports_overflow_as_malformed() {
        // Hour field too large for u32
        assert_eq!(scan_line("99999999999:00:00"), TimestampScan::Malformed);
        // Parses as u32 but the seconds product overflows
        assert_eq!(scan_line("4000000000:00:00"), TimestampScan::Malformed);
    }

    #[test]
    fn test_offset_ordering_follows_string_order() {
        let inputs = ["0:00:00", "0:00:19", "0:01:00", "0:02:02", "1:00:00"];
        let offsets: Vec<u32> = inputs
            .iter()
            .map(|s| scan_line(s).seconds().unwrap())
            .collect();
        assert!(offsets.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_format_offset_round_trip() {
        for s in [0, 19, 60, 122, 3600, 3661, 45296] {
            assert_eq!(scan_line(&format_offset(s)), TimestampScan::Seconds(s));
        }
        assert_eq!(format_offset(3661), "1:01:01");
        assert_eq!(format_offset(59), "0:00:59");
    }
}
