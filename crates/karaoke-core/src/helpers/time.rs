// crates/karaoke-core/src/helpers/time.rs
//
// Time formatting for the seek row ("1:07 / 3:45").

/// Format seconds as `M:SS`, or `H:MM:SS` from one hour up.
/// Negative and non-finite input renders as `0:00`.
///
/// ```
/// use karaoke_core::helpers::time::format_clock;
/// assert_eq!(format_clock(0.0),    "0:00");
/// assert_eq!(format_clock(67.9),   "1:07");
/// assert_eq!(format_clock(3875.0), "1:04:35");
/// ```
pub fn format_clock(secs: f64) -> String {
    let total = if secs.is_finite() && secs > 0.0 { secs as u64 } else { 0 };
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}

/// `position / duration` pair shown next to the seek slider.
pub fn format_progress(position: f64, duration: f64) -> String {
    format!("{} / {}", format_clock(position), format_clock(duration))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_input_is_zero() {
        assert_eq!(format_clock(-4.0), "0:00");
        assert_eq!(format_clock(f64::NAN), "0:00");
        assert_eq!(format_clock(f64::INFINITY), "0:00");
    }

    #[test]
    fn minutes_are_not_padded_below_an_hour() {
        assert_eq!(format_clock(599.0), "9:59");
        assert_eq!(format_clock(3599.0), "59:59");
        assert_eq!(format_clock(3600.0), "1:00:00");
    }

    #[test]
    fn progress_pairs_both_clocks() {
        assert_eq!(format_progress(5.0, 225.0), "0:05 / 3:45");
    }
}
