//! Calendar command: a month of tracked time as a heat-map.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::Datelike;
use pt_core::calendar::Week;
use pt_core::{DailyTotals, Intensity, Month, format_minutes, month_grid};

const CELL_WIDTH: usize = 6;
const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Renders the month grid.
///
/// Each week is two lines: day numbers prefixed with an intensity shade, then
/// whole minutes tracked. Days from adjacent months are left blank.
pub fn render(month: Month, totals: &DailyTotals) -> Result<String> {
    let first = month
        .first_day()
        .with_context(|| format!("month out of range: {}-{:02}", month.year, month.month))?;
    let weeks = month_grid(month, totals).context("month out of range")?;

    let mut out = String::new();
    writeln!(out, "{}", first.format("%B %Y"))?;
    let header: String = WEEKDAYS.iter().map(|d| format!("{d:>CELL_WIDTH$}")).collect();
    writeln!(out, "{header}")?;
    for week in &weeks {
        writeln!(out, "{}", day_line(week).trim_end())?;
        let minutes = minutes_line(week);
        if !minutes.trim().is_empty() {
            writeln!(out, "{}", minutes.trim_end())?;
        }
    }
    writeln!(
        out,
        "{} ≤1h  {} ≤4h  {} ≤8h  {} >8h",
        Intensity::Low.glyph(),
        Intensity::Medium.glyph(),
        Intensity::High.glyph(),
        Intensity::VeryHigh.glyph()
    )?;
    Ok(out)
}

fn day_line(week: &Week) -> String {
    week.iter()
        .map(|cell| {
            if cell.in_month {
                format!("  {}{:>3}", cell.intensity.glyph(), cell.day.date().day())
            } else {
                " ".repeat(CELL_WIDTH)
            }
        })
        .collect()
}

fn minutes_line(week: &Week) -> String {
    week.iter()
        .map(|cell| {
            if cell.in_month && cell.total_ms > 0 {
                format!("{:>CELL_WIDTH$}", format_minutes(cell.total_ms))
            } else {
                " ".repeat(CELL_WIDTH)
            }
        })
        .collect()
}

pub fn run<W: Write>(writer: &mut W, month: Month, totals: &DailyTotals) -> Result<()> {
    write!(writer, "{}", render(month, totals)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use pt_core::DayKey;

    fn key(s: &str) -> DayKey {
        s.parse().unwrap()
    }

    #[test]
    fn renders_february_with_shaded_days() {
        let totals = DailyTotals::from([
            (key("2024-02-01"), 30 * 60_000),
            (key("2024-02-14"), 5 * 3_600_000),
            // Outside the month: not shown.
            (key("2024-01-31"), 3_600_000),
        ]);

        let output = render("2024-02".parse().unwrap(), &totals).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines[0], "February 2024");
        assert_eq!(lines[1], "   Sun   Mon   Tue   Wed   Thu   Fri   Sat");
        assert_eq!(
            lines[2],
            "                          ░  1     2     3"
        );
        assert_eq!(lines[3], "                           30m");
        assert_eq!(
            lines[4],
            "     4     5     6     7     8     9    10"
        );
        assert_eq!(
            lines[5],
            "    11    12    13  ▓ 14    15    16    17"
        );
        assert_eq!(lines[6], "                    300m");
        assert_eq!(lines[8], "    25    26    27    28    29");
        assert_eq!(lines[9], "░ ≤1h  ▒ ≤4h  ▓ ≤8h  █ >8h");
        assert_eq!(lines.len(), 10);
    }
}
