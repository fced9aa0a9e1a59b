const MS_PER_SECOND: u64 = 1_000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: u64 = 24 * MS_PER_HOUR;
const MS_PER_WEEK: u64 = 7 * MS_PER_DAY;

/// Parse a compact duration like `30s`, `10m`, `2h`, `1d`, `1w`, or a
/// combination (`1h 30m`) into milliseconds.
///
/// Every segment needs an explicit unit suffix. Returns `None` for anything
/// outside that grammar, including empty input, signs, and unknown units.
pub fn parse_duration_ms(raw: &str) -> Option<u64> {
    let compact: String = raw.chars().filter(|ch| !ch.is_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }

    let bytes = compact.as_bytes();
    let mut cursor = 0;
    let mut total_ms = 0_u64;

    while cursor < bytes.len() {
        let number_start = cursor;
        while cursor < bytes.len() && bytes[cursor].is_ascii_digit() {
            cursor += 1;
        }

        if number_start == cursor || cursor == bytes.len() {
            return None;
        }

        let magnitude = compact[number_start..cursor].parse::<u64>().ok()?;
        let unit = bytes[cursor] as char;
        cursor += 1;

        let multiplier = match unit {
            's' | 'S' => MS_PER_SECOND,
            'm' | 'M' => MS_PER_MINUTE,
            'h' | 'H' => MS_PER_HOUR,
            'd' | 'D' => MS_PER_DAY,
            'w' | 'W' => MS_PER_WEEK,
            _ => return None,
        };

        let part_ms = magnitude.checked_mul(multiplier)?;
        total_ms = total_ms.checked_add(part_ms)?;
    }

    Some(total_ms)
}

/// Format milliseconds back into the grammar `parse_duration_ms` accepts.
///
/// Every non-zero component is rendered largest-first ("1h 30m"), so the
/// output parses back to the same value. Zero renders as "0s"; sub-second
/// remainders are floored away.
pub fn format_duration_ms(total_ms: u64) -> String {
    let total_seconds = total_ms / MS_PER_SECOND;

    let weeks = total_seconds / (MS_PER_WEEK / MS_PER_SECOND);
    let days = (total_seconds % (MS_PER_WEEK / MS_PER_SECOND)) / 86_400;
    let hours = (total_seconds % 86_400) / 3_600;
    let minutes = (total_seconds % 3_600) / 60;
    let seconds = total_seconds % 60;

    let mut parts = Vec::new();
    if weeks > 0 {
        parts.push(format!("{}w", weeks));
    }
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 {
        parts.push(format!("{}m", minutes));
    }
    if seconds > 0 {
        parts.push(format!("{}s", seconds));
    }

    if parts.is_empty() {
        return "0s".to_owned();
    }

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::{format_duration_ms, parse_duration_ms};

    #[test]
    fn parses_single_units() {
        assert_eq!(parse_duration_ms("30s"), Some(30_000));
        assert_eq!(parse_duration_ms("10m"), Some(600_000));
        assert_eq!(parse_duration_ms("2h"), Some(7_200_000));
        assert_eq!(parse_duration_ms("1d"), Some(86_400_000));
        assert_eq!(parse_duration_ms("1w"), Some(604_800_000));
    }

    #[test]
    fn parsing_is_case_insensitive() {
        assert_eq!(parse_duration_ms("5M"), Some(300_000));
        assert_eq!(parse_duration_ms("1H"), parse_duration_ms("1h"));
        assert_eq!(parse_duration_ms("2W"), parse_duration_ms("2w"));
    }

    #[test]
    fn parses_combined_segments() {
        assert_eq!(parse_duration_ms("1h30m"), Some(5_400_000));
        assert_eq!(parse_duration_ms("1h 30m"), Some(5_400_000));
        assert_eq!(parse_duration_ms("1d 2h 3m 4s"), Some(93_784_000));
    }

    #[test]
    fn zero_magnitude_is_valid() {
        assert_eq!(parse_duration_ms("0s"), Some(0));
        assert_eq!(parse_duration_ms("0m"), Some(0));
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(parse_duration_ms(""), None);
        assert_eq!(parse_duration_ms("   "), None);
        assert_eq!(parse_duration_ms("abc"), None);
        assert_eq!(parse_duration_ms("5"), None);
        assert_eq!(parse_duration_ms("5x"), None);
        assert_eq!(parse_duration_ms("-5s"), None);
        assert_eq!(parse_duration_ms("s5"), None);
        assert_eq!(parse_duration_ms("5m3"), None);
    }

    #[test]
    fn formats_compact_strings() {
        assert_eq!(format_duration_ms(0), "0s");
        assert_eq!(format_duration_ms(500), "0s");
        assert_eq!(format_duration_ms(59_000), "59s");
        assert_eq!(format_duration_ms(60_000), "1m");
        assert_eq!(format_duration_ms(5_400_000), "1h 30m");
        assert_eq!(format_duration_ms(90_000_000), "1d 1h");
        assert_eq!(format_duration_ms(604_800_000), "1w");
        assert_eq!(format_duration_ms(694_861_000), "1w 1d 1h 1m 1s");
    }

    #[test]
    fn parse_format_round_trip() {
        for raw in ["45s", "10m", "90m", "1h 30m", "2d", "1w 6d 23h 59m 59s", "0s"] {
            let parsed = parse_duration_ms(raw).unwrap();
            assert_eq!(parse_duration_ms(&format_duration_ms(parsed)), Some(parsed));
        }
    }
}
