// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

/// Formats a duration in milliseconds into a human-readable `MM:SS` string.
///
/// This is used primarily for displaying chapter positions and total
/// durations in the player interface.
///
/// # Examples
///
/// ```
/// use waha_player::util::format::format_time;
///
/// assert_eq!(format_time(65_400), "01:05");
/// assert_eq!(format_time(3_600_000), "60:00");
/// ```
pub fn format_time(total_ms: u64) -> String {
    let total_seconds = total_ms / 1000;
    let mins = total_seconds / 60;
    let secs = total_seconds % 60;
    format!("{:02}:{:02}", mins, secs)
}

/// Formats a played or downloaded fraction as a whole percentage.
pub fn format_percent(fraction: f64) -> String {
    format!("{:.0}%", (fraction.clamp(0.0, 1.0) * 100.0).floor())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_rounds_down() {
        assert_eq!(format_percent(0.999), "99%");
        assert_eq!(format_percent(1.5), "100%");
        assert_eq!(format_percent(0.0), "0%");
    }
}
