use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::config::{self, Config};

#[derive(Parser, Debug)]
#[command(
    name = "linkpick",
    version,
    about = "Pick links, paths and traces out of terminal output and open them"
)]
pub struct Cli {
    /// Scrollback lines to scan beyond the visible pane
    #[arg(long, value_name = "LINES", default_value_t = 0)]
    pub history: u32,

    /// Editor command template; %file and %line are substituted
    #[arg(long, value_name = "CMD")]
    pub editor_cmd: Option<String>,

    /// Browser command template; %url is substituted
    #[arg(long, value_name = "CMD")]
    pub browser_cmd: Option<String>,

    /// Chooser program fed the candidate lines (default: fzf-tmux)
    #[arg(long, value_name = "CMD", default_value = "fzf-tmux")]
    pub chooser: String,

    /// Extra arguments passed through to the chooser; supports the
    /// pseudo-option `--maxnum-displayed <n|p%>`
    #[arg(long, value_name = "ARGS", default_value = "")]
    pub chooser_args: String,

    /// User scheme definitions (default: ~/.config/linkpick/schemes.toml)
    #[arg(long, value_name = "FILE")]
    pub schemes: Option<PathBuf>,

    /// Directory prepended to PATH before opener lookup
    #[arg(long, value_name = "DIR")]
    pub path_extension: Option<PathBuf>,

    /// Read the text to scan from stdin instead of tmux
    #[arg(long)]
    pub stdin: bool,

    /// Log level when RUST_LOG is not set (error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Append logs to this file instead of stderr
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn into_config(self) -> Result<Config> {
        let schemes_path = match self.schemes {
            Some(path) => Some(path),
            None => default_schemes_path()?,
        };
        Ok(Config {
            history_lines: self.history,
            editor_cmd: none_if_blank(self.editor_cmd),
            browser_cmd: none_if_blank(self.browser_cmd),
            chooser: self.chooser,
            chooser_args: self.chooser_args,
            schemes_path,
            path_extension: self.path_extension,
            read_stdin: self.stdin,
            binary_probe: config::null_byte_probe,
        })
    }
}

// tmux plugin wrappers pass unset options through as empty strings.
fn none_if_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn default_schemes_path() -> Result<Option<PathBuf>> {
    let dir = dirs::config_dir().context("could not determine the user configuration directory")?;
    let path = dir.join("linkpick").join("schemes.toml");
    Ok(path.exists().then_some(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_overrides_are_dropped() {
        assert_eq!(none_if_blank(Some("  ".to_string())), None);
        assert_eq!(none_if_blank(None), None);
        assert_eq!(
            none_if_blank(Some("hx %file".to_string())),
            Some("hx %file".to_string())
        );
    }

    #[test]
    fn explicit_schemes_path_survives_into_config() {
        let cli = Cli::parse_from([
            "linkpick",
            "--stdin",
            "--schemes",
            "/tmp/my-schemes.toml",
            "--editor-cmd",
            "",
        ]);
        let config = cli.into_config().unwrap();
        assert_eq!(
            config.schemes_path,
            Some(PathBuf::from("/tmp/my-schemes.toml"))
        );
        assert_eq!(config.editor_cmd, None);
        assert!(config.read_stdin);
    }
}
