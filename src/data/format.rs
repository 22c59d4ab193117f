//! Human-readable listening-time display.

const MS_PER_HOUR: f64 = 3.6e6;

/// Table/tooltip form: `"12.34h"`.
pub fn format_hours(ms: u64) -> String {
    format!("{:.2}h", ms as f64 / MS_PER_HOUR)
}

/// Axis form with one decimal, taking the raw axis value.
pub fn format_hours_axis(ms: f64) -> String {
    format!("{:.1}h", ms / MS_PER_HOUR)
}

/// Timedelta form: `"3d 4h"`, `"4h 12m"`, `"12m"`.
pub fn format_duration(ms: u64) -> String {
    let minutes = ms / 60_000;
    let hours = minutes / 60;
    let days = hours / 24;
    if days > 0 {
        format!("{days}d {}h", hours % 24)
    } else if hours > 0 {
        format!("{hours}h {}m", minutes % 60)
    } else {
        format!("{minutes}m")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hours_keep_two_decimals() {
        assert_eq!(format_hours(3_600_000), "1.00h");
        assert_eq!(format_hours(5_400_000), "1.50h");
        assert_eq!(format_hours(0), "0.00h");
    }

    #[test]
    fn axis_form_keeps_one_decimal() {
        assert_eq!(format_hours_axis(1_800_000.0), "0.5h");
    }

    #[test]
    fn duration_picks_the_two_largest_units() {
        assert_eq!(format_duration(30_000), "0m");
        assert_eq!(format_duration(12 * 60_000), "12m");
        assert_eq!(format_duration(4 * 3_600_000 + 12 * 60_000), "4h 12m");
        assert_eq!(format_duration(76 * 3_600_000), "3d 4h");
    }
}
