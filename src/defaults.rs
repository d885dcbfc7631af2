//! Built-in schemes: URLs, file paths, git remotes, code error traces and
//! IPv4 addresses. User schemes merged on top can shadow or remove any of
//! them by tag.

use std::path::{Path, PathBuf};

use regex::{Captures, Regex};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::open::split_words;
use crate::scheme::{CommandPayload, OpenerKind, PostHandler, PreHandled, PreHandler, Scheme};

pub fn default_schemes() -> Vec<Scheme> {
    vec![
        url_scheme(),
        file_scheme(),
        git_scheme(),
        code_error_scheme(),
        ipv4_scheme(),
    ]
}

fn url_scheme() -> Scheme {
    Scheme {
        tags: vec!["url".to_string()],
        opener: OpenerKind::Browser,
        pattern: Regex::new(
            r"https?://(?:www\.)?[-a-zA-Z0-9@:%._\+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b[-a-zA-Z0-9()@:%_\+.~#?&//=]*",
        )
        .unwrap(),
        pre: None,
        post: None,
    }
}

fn file_scheme() -> Scheme {
    Scheme {
        tags: vec!["file".to_string(), "dir".to_string()],
        opener: OpenerKind::Custom,
        pattern: Regex::new(r"'(?P<quoted>~?[a-zA-Z0-9_/\-:. ]+)'|(?P<bare>~?[a-zA-Z0-9_/\-:.]+)")
            .unwrap(),
        pre: Some(PreHandler::Builtin(file_pre)),
        post: Some(PostHandler::Builtin(file_post)),
    }
}

fn git_scheme() -> Scheme {
    Scheme {
        tags: vec!["git".to_string()],
        opener: OpenerKind::Browser,
        pattern: Regex::new(r#"(ssh://)?git@(?P<repo>[^ \t\n"'\)\]\}]*)"#).unwrap(),
        pre: None,
        post: Some(PostHandler::Builtin(git_post)),
    }
}

fn code_error_scheme() -> Scheme {
    Scheme {
        tags: vec!["code-err".to_string(), "python".to_string()],
        opener: OpenerKind::Editor,
        pattern: Regex::new(r#"File "(?P<file>[^"\n]+)", line (?P<line>[0-9]+)"#).unwrap(),
        pre: Some(PreHandler::Builtin(code_error_pre)),
        post: Some(PostHandler::Builtin(code_error_post)),
    }
}

fn ipv4_scheme() -> Scheme {
    Scheme {
        tags: vec!["ipv4".to_string()],
        opener: OpenerKind::Browser,
        pattern: Regex::new(
            r#"['" \t\{\[\(~](?P<ip>[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}[^ \t\)\]\}"'\n]*)"#,
        )
        .unwrap(),
        pre: Some(PreHandler::Builtin(ipv4_pre)),
        post: Some(PostHandler::Builtin(ipv4_post)),
    }
}

fn git_post(caps: &Captures<'_>, _config: &Config) -> Result<CommandPayload> {
    let repo = caps.name("repo").map(|m| m.as_str()).unwrap_or_default();
    Ok(CommandPayload::Fields(vec![(
        "url".to_string(),
        format!("https://github.com/{repo}"),
    )]))
}

fn ipv4_pre(caps: &Captures<'_>, _config: &Config) -> Option<PreHandled> {
    Some(PreHandled {
        display_text: caps.name("ip")?.as_str().to_string(),
        tag: "ipv4".to_string(),
    })
}

fn ipv4_post(caps: &Captures<'_>, _config: &Config) -> Result<CommandPayload> {
    let ip = caps.name("ip").map(|m| m.as_str()).unwrap_or_default();
    Ok(CommandPayload::Fields(vec![(
        "url".to_string(),
        format!("https://{ip}"),
    )]))
}

fn code_error_pre(caps: &Captures<'_>, _config: &Config) -> Option<PreHandled> {
    let file = caps.name("file")?.as_str();
    let line = caps.name("line")?.as_str();
    let resolved = resolve_path(file)?;
    let tag = match resolved.extension().and_then(|e| e.to_str()) {
        Some("py") => "python",
        _ => "code-err",
    };
    Some(PreHandled {
        display_text: format!("{file}, line {line}"),
        tag: tag.to_string(),
    })
}

fn code_error_post(caps: &Captures<'_>, _config: &Config) -> Result<CommandPayload> {
    let file = caps.name("file").map(|m| m.as_str()).unwrap_or_default();
    let line = caps.name("line").map(|m| m.as_str()).unwrap_or("1");
    let resolved = resolve_path(file).ok_or_else(|| Error::PathResolve(file.to_string()))?;
    Ok(CommandPayload::Fields(vec![
        ("file".to_string(), resolved.to_string_lossy().into_owned()),
        ("line".to_string(), line.to_string()),
    ]))
}

fn file_pre(caps: &Captures<'_>, _config: &Config) -> Option<PreHandled> {
    let raw = caps
        .name("quoted")
        .or_else(|| caps.name("bare"))?
        .as_str();
    let resolved = resolve_path(raw)?;
    let tag = if resolved.is_dir() { "dir" } else { "file" };
    Some(PreHandled {
        display_text: resolved.to_string_lossy().into_owned(),
        tag: tag.to_string(),
    })
}

/// Directories and binaries go to the system opener; text files go to the
/// editor at line 1.
fn file_post(caps: &Captures<'_>, config: &Config) -> Result<CommandPayload> {
    let raw = caps
        .name("quoted")
        .or_else(|| caps.name("bare"))
        .map(|m| m.as_str())
        .unwrap_or_default();
    let resolved = resolve_path(raw).ok_or_else(|| Error::PathResolve(raw.to_string()))?;
    let path = resolved.to_string_lossy().into_owned();

    if resolved.is_dir() || (config.binary_probe)(&resolved) {
        let mut argv: Vec<String> = if cfg!(target_os = "macos") {
            vec!["open".to_string(), "-R".to_string()]
        } else if cfg!(windows) {
            vec!["explorer".to_string()]
        } else {
            vec!["xdg-open".to_string()]
        };
        argv.push(path);
        return Ok(CommandPayload::Args(argv));
    }

    editor_invocation(config, &path, "1").map(CommandPayload::Args)
}

/// Editor argv from the configured %file/%line template, falling back to
/// `$EDITOR <path>` when no template is set.
pub fn editor_invocation(config: &Config, file: &str, line: &str) -> Result<Vec<String>> {
    if let Some(cmd) = &config.editor_cmd {
        let filled = cmd.replace("%file", file).replace("%line", line);
        return split_words(&filled);
    }
    match std::env::var("EDITOR") {
        Ok(editor) if !editor.trim().is_empty() => Ok(vec![editor, file.to_string()]),
        _ => Err(Error::NoSuitableApp),
    }
}

/// Tilde-expanded existence check. Relative paths resolve against the
/// current directory, which is the pane's directory once capture has run.
pub fn resolve_path(raw: &str) -> Option<PathBuf> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let expanded = if let Some(rest) = trimmed.strip_prefix("~/") {
        Path::new(&std::env::var_os("HOME")?).join(rest)
    } else if trimmed == "~" {
        PathBuf::from(std::env::var_os("HOME")?)
    } else {
        PathBuf::from(trimmed)
    };
    if !expanded.exists() {
        return None;
    }
    expanded.canonicalize().ok()
}
