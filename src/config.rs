use std::{fs::File, io::Read, path::Path, path::PathBuf};

/// Decides whether a resolved file should go to the system opener instead
/// of the editor. Swappable so platforms with better type detection can
/// plug in their own check.
pub type BinaryProbe = fn(&Path) -> bool;

/// Everything the pipeline needs, assembled once from the CLI and passed by
/// reference into each stage.
#[derive(Debug, Clone)]
pub struct Config {
    /// Scrollback lines included beyond the visible pane.
    pub history_lines: u32,
    /// Editor command template; `%file` and `%line` are substituted.
    pub editor_cmd: Option<String>,
    /// Browser command template; `%url` is substituted.
    pub browser_cmd: Option<String>,
    /// Program handed the candidate lines on stdin.
    pub chooser: String,
    /// Extra chooser arguments, split shell-style before use.
    pub chooser_args: String,
    /// User scheme file; `None` means defaults only.
    pub schemes_path: Option<PathBuf>,
    /// Directory prepended to `PATH` before opener lookup.
    pub path_extension: Option<PathBuf>,
    /// Read the text to scan from stdin instead of tmux.
    pub read_stdin: bool,
    pub binary_probe: BinaryProbe,
}

/// A file counts as binary when its first kilobyte contains a null byte.
/// Unreadable files count as binary.
pub fn null_byte_probe(path: &Path) -> bool {
    let Ok(mut file) = File::open(path) else {
        return true;
    };
    let mut chunk = [0u8; 1024];
    let Ok(n) = file.read(&mut chunk) else {
        return true;
    };
    chunk[..n].contains(&0)
}

#[cfg(test)]
pub fn for_tests() -> Config {
    Config {
        history_lines: 0,
        editor_cmd: None,
        browser_cmd: None,
        chooser: "fzf-tmux".to_string(),
        chooser_args: String::new(),
        schemes_path: None,
        path_extension: None,
        read_stdin: true,
        binary_probe: null_byte_probe,
    }
}
