use std::fmt;

use regex::{Captures, Regex};

use crate::config::Config;
use crate::error::Result;

/// Program-resolution policy applied after the user picks a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenerKind {
    Editor,
    Browser,
    /// The post-handler supplies the full command, program included.
    Custom,
}

impl fmt::Display for OpenerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpenerKind::Editor => write!(f, "editor"),
            OpenerKind::Browser => write!(f, "browser"),
            OpenerKind::Custom => write!(f, "custom"),
        }
    }
}

/// What a pre-handler computes at extraction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreHandled {
    pub display_text: String,
    pub tag: String,
}

/// Command material produced after selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandPayload {
    /// Ready-made argument tokens; the first token is the program for
    /// `Custom` schemes.
    Args(Vec<String>),
    /// Named fields substituted for `%key` placeholders in the resolved
    /// program's command template.
    Fields(Vec<(String, String)>),
}

pub type PreHandlerFn = fn(&Captures<'_>, &Config) -> Option<PreHandled>;
pub type PostHandlerFn = fn(&Captures<'_>, &Config) -> Result<CommandPayload>;

/// A literal string with `%name` placeholders resolved from the pattern's
/// named capture groups. `%0` stands for the whole match; capture groups
/// that did not participate render as empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template(String);

impl Template {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Placeholder names referenced by the template.
    pub fn placeholders(&self) -> Vec<String> {
        let mut names = Vec::new();
        let mut chars = self.0.chars().peekable();
        while let Some(ch) = chars.next() {
            if ch != '%' {
                continue;
            }
            let mut name = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_ascii_alphanumeric() || c == '_' {
                    name.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            if !name.is_empty() {
                names.push(name);
            }
        }
        names
    }

    pub fn fill(&self, caps: &Captures<'_>) -> String {
        let mut out = String::with_capacity(self.0.len());
        let mut chars = self.0.chars().peekable();
        while let Some(ch) = chars.next() {
            if ch != '%' {
                out.push(ch);
                continue;
            }
            let mut name = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_ascii_alphanumeric() || c == '_' {
                    name.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            if name.is_empty() {
                out.push('%');
            } else if name == "0" {
                if let Some(m) = caps.get(0) {
                    out.push_str(m.as_str());
                }
            } else if let Some(m) = caps.name(&name) {
                out.push_str(m.as_str());
            }
        }
        out
    }
}

/// Extraction-time hook: compute display text and tag, or drop the match.
#[derive(Debug)]
pub enum PreHandler {
    Builtin(PreHandlerFn),
    /// Render a `%group` template; the scheme's first tag is kept.
    Display(Template),
}

impl PreHandler {
    pub fn apply(
        &self,
        caps: &Captures<'_>,
        config: &Config,
        first_tag: &str,
    ) -> Option<PreHandled> {
        match self {
            PreHandler::Builtin(handler) => handler(caps, config),
            PreHandler::Display(template) => Some(PreHandled {
                display_text: template.fill(caps),
                tag: first_tag.to_string(),
            }),
        }
    }
}

/// Selection-time hook: turn the re-matched captures into a command payload.
#[derive(Debug)]
pub enum PostHandler {
    Builtin(PostHandlerFn),
    /// One `%group` template per command token.
    Command(Vec<Template>),
}

impl PostHandler {
    pub fn apply(&self, caps: &Captures<'_>, config: &Config) -> Result<CommandPayload> {
        match self {
            PostHandler::Builtin(handler) => handler(caps, config),
            PostHandler::Command(templates) => Ok(CommandPayload::Args(
                templates.iter().map(|t| t.fill(caps)).collect(),
            )),
        }
    }
}

/// A named pattern: what to look for, how to label it, and what to do with
/// a selected match.
#[derive(Debug)]
pub struct Scheme {
    /// Non-empty; the first tag is the default label when no pre-handler
    /// overrides it.
    pub tags: Vec<String>,
    pub opener: OpenerKind,
    pub pattern: Regex,
    pub pre: Option<PreHandler>,
    pub post: Option<PostHandler>,
}
