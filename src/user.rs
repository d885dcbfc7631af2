//! User scheme definitions loaded from a TOML file.
//!
//! ```toml
//! remove = ["ipv4"]
//!
//! [[schemes]]
//! tags = ["jira"]
//! opener = "browser"
//! pattern = '(?P<key>[A-Z][A-Z0-9]+-[0-9]+)'
//! display = "%key"
//! action = ["https://jira.example.com/browse/%key"]
//! ```
//!
//! `display` renders the candidate line; `action` produces the command
//! tokens after selection, one template per token. A `custom` opener must
//! provide `action`, and its first token names the program to run. Any
//! shape problem aborts the load before the merge, so a half-broken file
//! never reaches matching.

use std::collections::HashSet;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::scheme::{OpenerKind, PostHandler, PreHandler, Scheme, Template};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemesFile {
    #[serde(default)]
    schemes: Vec<SchemeDef>,
    /// Default tags suppressed without replacement.
    #[serde(default)]
    remove: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemeDef {
    tags: Vec<String>,
    opener: String,
    pattern: String,
    display: Option<String>,
    action: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct UserSchemes {
    pub schemes: Vec<Scheme>,
    pub remove: Vec<String>,
}

pub fn load(path: Option<&Path>) -> Result<UserSchemes> {
    let Some(path) = path else {
        return Ok(UserSchemes {
            schemes: Vec::new(),
            remove: Vec::new(),
        });
    };
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
    parse(&content).map_err(|e| Error::Config(format!("{}: {e}", path.display())))
}

fn parse(content: &str) -> Result<UserSchemes> {
    let file: SchemesFile =
        toml::from_str(content).map_err(|e| Error::Config(format!("invalid TOML: {e}")))?;
    let schemes = file
        .schemes
        .into_iter()
        .map(build_scheme)
        .collect::<Result<Vec<_>>>()?;
    Ok(UserSchemes {
        schemes,
        remove: file.remove,
    })
}

fn build_scheme(def: SchemeDef) -> Result<Scheme> {
    if def.tags.is_empty() || def.tags.iter().any(|t| t.trim().is_empty()) {
        return Err(Error::Config(format!(
            "scheme /{}/ must declare at least one non-empty tag",
            def.pattern
        )));
    }
    let opener = match def.opener.as_str() {
        "editor" => OpenerKind::Editor,
        "browser" => OpenerKind::Browser,
        "custom" => OpenerKind::Custom,
        other => {
            return Err(Error::Config(format!(
                "unknown opener '{other}' for scheme tagged {:?}",
                def.tags
            )));
        }
    };
    let pattern = Regex::new(&def.pattern).map_err(|e| {
        Error::Config(format!("invalid pattern for scheme tagged {:?}: {e}", def.tags))
    })?;
    let groups: HashSet<&str> = pattern.capture_names().flatten().collect();

    let pre = match def.display {
        Some(raw) => {
            let template = Template::new(raw);
            check_placeholders(&template, &groups, &def.tags)?;
            Some(PreHandler::Display(template))
        }
        None => None,
    };

    let post = match def.action {
        Some(tokens) => {
            if tokens.is_empty() {
                return Err(Error::Config(format!(
                    "empty action for scheme tagged {:?}",
                    def.tags
                )));
            }
            let templates: Vec<Template> = tokens.into_iter().map(Template::new).collect();
            for template in &templates {
                check_placeholders(template, &groups, &def.tags)?;
            }
            Some(PostHandler::Command(templates))
        }
        None => None,
    };

    if opener == OpenerKind::Custom && post.is_none() {
        return Err(Error::Config(format!(
            "a custom opener requires an action for scheme tagged {:?}",
            def.tags
        )));
    }

    Ok(Scheme {
        tags: def.tags,
        opener,
        pattern,
        pre,
        post,
    })
}

fn check_placeholders(
    template: &Template,
    groups: &HashSet<&str>,
    tags: &[String],
) -> Result<()> {
    for name in template.placeholders() {
        if name != "0" && !groups.contains(name.as_str()) {
            return Err(Error::Config(format!(
                "placeholder %{name} does not name a capture group of the pattern for scheme tagged {tags:?}"
            )));
        }
    }
    Ok(())
}
