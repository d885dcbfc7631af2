//! Screen-source boundary: pull pane text out of tmux and strip the escape
//! sequences it embeds.

use std::io::Read;
use std::process::Command;

use lazy_static::lazy_static;
use regex::Regex;

use crate::config::Config;
use crate::error::{Error, Result};

lazy_static! {
    static ref CSI_SEQUENCE: Regex = Regex::new(r"\x1b\[[0-9;]*[mK]").unwrap();
}

/// Remove ANSI CSI color/erase sequences before pattern matching.
pub fn strip_escape_sequences(text: &str) -> String {
    CSI_SEQUENCE.replace_all(text, "").into_owned()
}

/// The text blob to scan: the pane plus requested scrollback, joined across
/// wrapped lines, or stdin when configured.
pub fn screen_text(config: &Config) -> Result<String> {
    let raw = if config.read_stdin {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        let output = Command::new("tmux")
            .args([
                "capture-pane",
                "-J",
                "-p",
                "-e",
                "-S",
                &format!("-{}", config.history_lines),
            ])
            .output()
            .map_err(|e| Error::Capture(format!("failed to run tmux capture-pane: {e}")))?;
        if !output.status.success() {
            return Err(Error::Capture(format!(
                "tmux capture-pane exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        String::from_utf8_lossy(&output.stdout).into_owned()
    };
    Ok(strip_escape_sequences(&raw))
}

/// Switch to the pane's directory so relative paths resolve the same way
/// they did for the shell that printed them.
pub fn enter_pane_dir() -> Result<()> {
    let dir = display_message("#{pane_current_path}")?;
    std::env::set_current_dir(dir.trim())
        .map_err(|e| Error::Capture(format!("could not change to the pane directory: {e}")))
}

pub fn pane_height() -> Result<usize> {
    let out = display_message("#{pane_height}")?;
    out.trim()
        .parse()
        .map_err(|_| Error::Capture(format!("tmux returned a non-numeric pane height: {out}")))
}

fn display_message(format: &str) -> Result<String> {
    let output = Command::new("tmux")
        .args(["display", "-p", format])
        .output()
        .map_err(|e| Error::Capture(format!("failed to run tmux display: {e}")))?;
    if !output.status.success() {
        return Err(Error::Capture(format!(
            "tmux display exited with {}",
            output.status
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
