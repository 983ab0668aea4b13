//! Nagios check for orgbackup.
//!
//! Scans the system log for the line written at the end of a completed
//! backup session and reports OK when it is from today or yesterday.

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{DateTime, Datelike, Local, NaiveDate};
use clap::Parser;

/// Text following the syslog prefix on a completed session's summary line.
const SUMMARY_MARKER: &str = "session is now completed, ";

/// Syslog identifier of the backup process.
const IDENTIFIER: &str = "orgbackup";

const DEFAULT_LOGS: [&str; 2] = ["/var/log/syslog", "/var/log/syslog.1"];

/// Nagios plugin exit code for CRITICAL.
const EXIT_CRITICAL: u8 = 2;

#[derive(Parser)]
#[command(name = "orgbackup-check")]
#[command(version)]
#[command(about = "Check that an orgbackup session completed today or yesterday")]
struct Cli {
    /// Syslog file to scan, newest first (default: /var/log/syslog, /var/log/syslog.1)
    #[arg(short, long = "log", value_name = "FILE")]
    logs: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let logs = if cli.logs.is_empty() {
        DEFAULT_LOGS.iter().map(PathBuf::from).collect()
    } else {
        cli.logs
    };

    let today = Local::now().date_naive();
    let found = logs.iter().find_map(|path| {
        // Rotated or unreadable files simply contribute nothing.
        let contents = std::fs::read(path).ok()?;
        find_summary(&String::from_utf8_lossy(&contents), today)
    });

    match found {
        Some(stats) => {
            println!("OK - orgbackup, {stats}");
            ExitCode::SUCCESS
        }
        None => {
            println!("CRITICAL - orgbackup failed");
            ExitCode::from(EXIT_CRITICAL)
        }
    }
}

/// Statistics of the most recent summary line dated today or yesterday.
fn find_summary(contents: &str, today: NaiveDate) -> Option<String> {
    let yesterday = today.pred_opt()?;
    contents.lines().rev().find_map(|line| {
        let stats = summary_stats(line)?;
        let date = line_date(line, today)?;
        (date == today || date == yesterday).then(|| stats.to_string())
    })
}

/// The statistics part of a summary line written by orgbackup.
fn summary_stats(line: &str) -> Option<&str> {
    let (prefix, message) = line.split_once(SUMMARY_MARKER)?;
    if !prefix.contains(IDENTIFIER) {
        return None;
    }
    Some(message.trim_end())
}

/// Date of a syslog line, in classic (`Oct 18 03:00:01`) or RFC 3339 format.
///
/// Classic timestamps carry no year: a date after `today` belongs to the
/// previous year.
fn line_date(line: &str, today: NaiveDate) -> Option<NaiveDate> {
    let mut fields = line.split_whitespace();
    let first = fields.next()?;

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(first) {
        return Some(timestamp.with_timezone(&Local).date_naive());
    }

    let day = fields.next()?;
    let date = NaiveDate::parse_from_str(&format!("{} {first} {day}", today.year()), "%Y %b %d")
        .ok()?;
    if date > today {
        date.with_year(today.year() - 1)
    } else {
        Some(date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const LINE: &str = "Oct 18 03:12:44 backup01 orgbackup[4242]: session is now completed, 12 public and 3 private repositories backed up";

    #[test]
    fn test_summary_stats_extracts_counts() {
        assert_eq!(
            summary_stats(LINE),
            Some("12 public and 3 private repositories backed up")
        );
    }

    #[test]
    fn test_summary_stats_ignores_other_programs() {
        let line = "Oct 18 03:12:44 backup01 cron[1]: session is now completed, 1 public and 1 private repositories backed up";
        assert_eq!(summary_stats(line), None);
    }

    #[test]
    fn test_classic_date_uses_current_year() {
        assert_eq!(line_date(LINE, date(2026, 10, 18)), Some(date(2026, 10, 18)));
    }

    #[test]
    fn test_classic_date_with_padded_day() {
        let line = "Oct  8 03:12:44 backup01 orgbackup[1]: x";
        assert_eq!(line_date(line, date(2026, 10, 9)), Some(date(2026, 10, 8)));
    }

    #[test]
    fn test_classic_date_in_future_is_last_year() {
        let line = "Dec 31 23:59:59 backup01 orgbackup[1]: x";
        assert_eq!(line_date(line, date(2027, 1, 1)), Some(date(2026, 12, 31)));
    }

    #[test]
    fn test_rfc3339_date() {
        let line = "2026-10-18T12:00:00+00:00 backup01 orgbackup[1]: x";
        let expected = DateTime::parse_from_rfc3339("2026-10-18T12:00:00+00:00")
            .unwrap()
            .with_timezone(&Local)
            .date_naive();
        assert_eq!(line_date(line, date(2026, 10, 18)), Some(expected));
    }

    #[test]
    fn test_find_summary_accepts_today_and_yesterday() {
        assert!(find_summary(LINE, date(2026, 10, 18)).is_some());
        assert!(find_summary(LINE, date(2026, 10, 19)).is_some());
        assert!(find_summary(LINE, date(2026, 10, 20)).is_none());
    }

    #[test]
    fn test_find_summary_prefers_latest_line() {
        let log = format!(
            "{}\n{LINE}\nOct 18 04:00:00 backup01 sshd[9]: accepted\n",
            LINE.replace("12 public", "11 public").replace("Oct 18", "Oct 17")
        );
        assert_eq!(
            find_summary(&log, date(2026, 10, 18)).as_deref(),
            Some("12 public and 3 private repositories backed up")
        );
    }

    #[test]
    fn test_incomplete_session_is_not_a_summary() {
        let line = "Oct 18 03:12:44 backup01 orgbackup[1]: session is incomplete, 1 repository listings failed, 2 public and 0 private repositories backed up";
        assert!(find_summary(line, date(2026, 10, 18)).is_none());
    }

    #[test]
    fn test_interrupted_session_is_not_a_summary() {
        let line = "Oct 18 03:12:44 backup01 orgbackup[1]: session was interrupted, 1 public and 0 private repositories backed up";
        assert!(find_summary(line, date(2026, 10, 18)).is_none());
    }
}
