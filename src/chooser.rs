//! External chooser boundary. Candidate lines go out over stdin; what comes
//! back is only ever parsed for its index and tag, never for content. The
//! index re-enters the candidate list to recover the raw match text.

use std::io::Write;
use std::process::{Command, Stdio};

use lazy_static::lazy_static;
use regex::Regex;

use crate::capture;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::open::split_words;

/// Exit code fuzzy finders document for a user abort.
const CANCEL_EXIT_CODE: i32 = 130;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Picked(Vec<String>),
    /// A normal, silent end of the run; never reported as an error.
    Cancelled,
}

lazy_static! {
    static ref SELECTION_LINE: Regex =
        Regex::new(r"^\s*(?P<idx>\d+)\s*-\s*\[(?P<tag>.+?)\]\s*-\s*(?P<text>.+)$").unwrap();
}

/// A parsed selection line: 1-based candidate index and the tag shown to
/// the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub index: usize,
    pub tag: String,
}

pub fn parse_selection(line: &str) -> Result<Selection> {
    let caps = SELECTION_LINE
        .captures(line)
        .ok_or_else(|| Error::Protocol(line.to_string()))?;
    let index: usize = caps["idx"]
        .parse()
        .map_err(|_| Error::Protocol(line.to_string()))?;
    if index == 0 {
        return Err(Error::Protocol(line.to_string()));
    }
    Ok(Selection {
        index,
        tag: caps["tag"].to_string(),
    })
}

/// Hand the display lines to the chooser and block until it answers.
pub fn choose(lines: &[String], config: &Config) -> Result<Outcome> {
    let mut user_args = split_words(&config.chooser_args)?;
    let maxnum = take_maxnum(&mut user_args)?;

    let mut height = lines.len();
    if let Some(maxnum) = maxnum {
        height = height.min(maxnum).max(1);
    }

    let mut cmd = Command::new(&config.chooser);
    // Four extra rows for the chooser border. User arguments come last so
    // they take precedence.
    cmd.arg("-h")
        .arg((height + 4).to_string())
        .arg("--no-sort")
        .args(&user_args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = cmd.spawn().map_err(|e| Error::ChooserFailed {
        code: -1,
        stderr: format!("failed to spawn {}: {e}", config.chooser),
    })?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(lines.join("\n").as_bytes())?;
    }
    let output = child.wait_with_output()?;
    outcome(
        output.status.code(),
        &output.stdout,
        &output.stderr,
    )
}

fn outcome(code: Option<i32>, stdout: &[u8], stderr: &[u8]) -> Result<Outcome> {
    match code {
        Some(0) => {
            let text = String::from_utf8_lossy(stdout);
            Ok(Outcome::Picked(
                text.lines()
                    .filter(|l| !l.trim().is_empty())
                    .map(str::to_string)
                    .collect(),
            ))
        }
        Some(CANCEL_EXIT_CODE) => Ok(Outcome::Cancelled),
        Some(code) => Err(Error::ChooserFailed {
            code,
            stderr: String::from_utf8_lossy(stderr).trim().to_string(),
        }),
        // Killed by a signal: not the documented cancellation path.
        None => Err(Error::ChooserFailed {
            code: -1,
            stderr: "terminated by a signal".to_string(),
        }),
    }
}

/// Consume the `--maxnum-displayed` pseudo-option from the user's chooser
/// arguments. Accepts a line count or a percentage of the pane height.
fn take_maxnum(args: &mut Vec<String>) -> Result<Option<usize>> {
    let Some(pos) = args.iter().position(|a| a == "--maxnum-displayed") else {
        return Ok(None);
    };
    if pos + 1 >= args.len() {
        return Err(Error::Config(
            "option '--maxnum-displayed' is missing its value".to_string(),
        ));
    }
    args.remove(pos);
    let value = args.remove(pos);
    let maxnum = if let Some(percent) = value.strip_suffix('%') {
        let percent: usize = percent.parse().map_err(|_| {
            Error::Config(format!("invalid value for '--maxnum-displayed': {value}"))
        })?;
        capture::pane_height()? * percent / 100
    } else {
        value.parse().map_err(|_| {
            Error::Config(format!("invalid value for '--maxnum-displayed': {value}"))
        })?
    };
    Ok(Some(maxnum))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_lines_round_trip_index_and_tag() {
        let sel = parse_selection("   3 - [code-err] - job.py, line 17").unwrap();
        assert_eq!(sel.index, 3);
        assert_eq!(sel.tag, "code-err");
    }

    #[test]
    fn padded_tags_parse_cleanly() {
        let sel = parse_selection("  12 - [url]      - https://example.com").unwrap();
        assert_eq!(sel.index, 12);
        assert_eq!(sel.tag, "url");
    }

    #[test]
    fn garbage_lines_are_protocol_errors() {
        assert!(matches!(
            parse_selection("not a selection"),
            Err(Error::Protocol(_))
        ));
        assert!(matches!(
            parse_selection("x - [url] - text"),
            Err(Error::Protocol(_))
        ));
        assert!(matches!(
            parse_selection("0 - [url] - text"),
            Err(Error::Protocol(_))
        ));
    }

    #[test]
    fn exit_zero_returns_the_chosen_lines() {
        let out = outcome(Some(0), b"1 - [url] - a\n2 - [git] - b\n", b"").unwrap();
        assert_eq!(
            out,
            Outcome::Picked(vec![
                "1 - [url] - a".to_string(),
                "2 - [git] - b".to_string()
            ])
        );
    }

    #[test]
    fn exit_zero_with_nothing_chosen_is_an_empty_pick() {
        assert_eq!(outcome(Some(0), b"", b"").unwrap(), Outcome::Picked(vec![]));
    }

    #[test]
    fn exit_130_is_a_silent_cancellation() {
        assert_eq!(outcome(Some(130), b"", b"").unwrap(), Outcome::Cancelled);
    }

    #[test]
    fn other_exit_codes_are_failures_with_diagnostics() {
        let err = outcome(Some(2), b"", b"unknown option\n").unwrap_err();
        match err {
            Error::ChooserFailed { code, stderr } => {
                assert_eq!(code, 2);
                assert_eq!(stderr, "unknown option");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn signal_death_is_not_a_cancellation() {
        assert!(matches!(
            outcome(None, b"", b""),
            Err(Error::ChooserFailed { .. })
        ));
    }

    #[test]
    fn maxnum_is_consumed_from_the_argument_list() {
        let mut args = vec![
            "--ansi".to_string(),
            "--maxnum-displayed".to_string(),
            "25".to_string(),
            "--cycle".to_string(),
        ];
        let maxnum = take_maxnum(&mut args).unwrap();
        assert_eq!(maxnum, Some(25));
        assert_eq!(args, ["--ansi", "--cycle"]);
    }

    #[test]
    fn maxnum_without_a_value_is_a_config_error() {
        let mut args = vec!["--maxnum-displayed".to_string()];
        assert!(matches!(take_maxnum(&mut args), Err(Error::Config(_))));
    }

    #[test]
    fn maxnum_rejects_non_numeric_values() {
        let mut args = vec!["--maxnum-displayed".to_string(), "lots".to_string()];
        assert!(matches!(take_maxnum(&mut args), Err(Error::Config(_))));
    }
}
