use thiserror::Error;

/// Everything that can go wrong between capturing pane text and handing a
/// selection to an external program. Registry and capture failures abort the
/// run; the selection-level variants are reported per item so one bad choice
/// does not stop the rest of a multi-select batch.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Config(String),

    #[error("screen capture failed: {0}")]
    Capture(String),

    #[error("chooser failed with exit code {code}: {stderr}")]
    ChooserFailed { code: i32, stderr: String },

    #[error("malformed selection: {0}")]
    Protocol(String),

    #[error("pattern did not match the selected text again")]
    PatternNotMatching,

    #[error("no suitable app was found to open the link")]
    NoSuitableApp,

    #[error("command exited with code {code}: {stderr}")]
    CommandFailed { code: i32, stderr: String },

    #[error("could not resolve the path of: {0}")]
    PathResolve(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
