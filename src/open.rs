//! Resolve which program opens a selection and spawn it without a shell, so
//! metacharacters in matched text never reach one.

use std::process::{Command, Stdio};

use which::which;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::scheme::{CommandPayload, OpenerKind};

pub fn open(payload: CommandPayload, kind: OpenerKind, config: &Config) -> Result<()> {
    let program = resolve_program(kind, config)?;
    let argv = build_argv(payload, program)?;

    let output = Command::new(&argv[0])
        .args(&argv[1..])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| Error::CommandFailed {
            code: -1,
            stderr: format!("failed to spawn '{}': {e}", argv[0]),
        })?;

    if !output.status.success() {
        return Err(Error::CommandFailed {
            code: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(())
}

/// First match wins: category override, custom payload, a generic opener on
/// PATH, then the environment's default program for the category.
fn resolve_program(kind: OpenerKind, config: &Config) -> Result<Option<String>> {
    let (override_cmd, env_var) = match kind {
        OpenerKind::Editor => (config.editor_cmd.as_ref(), "EDITOR"),
        OpenerKind::Browser => (config.browser_cmd.as_ref(), "BROWSER"),
        OpenerKind::Custom => return Ok(None),
    };
    if let Some(cmd) = override_cmd {
        return Ok(Some(cmd.clone()));
    }
    for utility in ["xdg-open", "open"] {
        if which(utility).is_ok() {
            return Ok(Some(utility.to_string()));
        }
    }
    if let Ok(program) = std::env::var(env_var)
        && !program.trim().is_empty()
    {
        return Ok(Some(program));
    }
    Err(Error::NoSuitableApp)
}

/// Turn the payload and the resolved program into the final argument
/// vector. Field values whose `%key` never appears in the program template
/// are appended as trailing arguments, in field order.
fn build_argv(payload: CommandPayload, program: Option<String>) -> Result<Vec<String>> {
    let argv = match payload {
        CommandPayload::Args(args) => {
            let mut argv = match program {
                Some(template) => split_words(&template)?,
                None => Vec::new(),
            };
            argv.extend(args);
            argv
        }
        CommandPayload::Fields(fields) => {
            let Some(template) = program else {
                return Err(Error::NoSuitableApp);
            };
            let mut filled = template;
            let mut trailing: Vec<String> = Vec::new();
            for (key, value) in fields {
                let placeholder = format!("%{key}");
                if filled.contains(&placeholder) {
                    filled = filled.replace(&placeholder, &value);
                } else {
                    trailing.push(value);
                }
            }
            let mut argv = split_words(&filled)?;
            argv.extend(trailing);
            argv
        }
    };
    if argv.is_empty() {
        return Err(Error::NoSuitableApp);
    }
    Ok(argv)
}

/// Split a command template into tokens, honoring single and double quotes
/// and backslash escapes.
pub fn split_words(line: &str) -> Result<Vec<String>> {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Mode {
        Normal,
        SingleQuoted,
        DoubleQuoted,
    }

    let mut out = Vec::new();
    let mut current = String::new();
    let mut mode = Mode::Normal;
    let mut chars = line.chars();

    while let Some(ch) = chars.next() {
        match mode {
            Mode::Normal => match ch {
                '\'' => mode = Mode::SingleQuoted,
                '"' => mode = Mode::DoubleQuoted,
                '\\' => {
                    if let Some(next) = chars.next() {
                        current.push(next);
                    }
                }
                c if c.is_whitespace() => {
                    if !current.is_empty() {
                        out.push(std::mem::take(&mut current));
                    }
                }
                _ => current.push(ch),
            },
            Mode::SingleQuoted => {
                if ch == '\'' {
                    mode = Mode::Normal;
                } else {
                    current.push(ch);
                }
            }
            Mode::DoubleQuoted => {
                if ch == '"' {
                    mode = Mode::Normal;
                } else if ch == '\\' {
                    if let Some(next) = chars.next() {
                        current.push(next);
                    }
                } else {
                    current.push(ch);
                }
            }
        }
    }

    if mode != Mode::Normal {
        return Err(Error::Config(format!("unterminated quote in command: {line}")));
    }
    if !current.is_empty() {
        out.push(current);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;

    #[test]
    fn split_words_honors_quotes_and_escapes() {
        assert_eq!(
            split_words(r#"code -g "my file.txt" a\ b"#).unwrap(),
            ["code", "-g", "my file.txt", "a b"]
        );
        assert_eq!(split_words("").unwrap(), Vec::<String>::new());
        assert_eq!(split_words("  hx  ").unwrap(), ["hx"]);
    }

    #[test]
    fn split_words_rejects_unterminated_quotes() {
        assert!(matches!(
            split_words("open 'dangling"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn token_payloads_get_the_program_prepended() {
        let argv = build_argv(
            CommandPayload::Args(vec!["https://example.com".to_string()]),
            Some("firefox --new-tab".to_string()),
        )
        .unwrap();
        assert_eq!(argv, ["firefox", "--new-tab", "https://example.com"]);
    }

    #[test]
    fn custom_payloads_carry_their_own_program() {
        let argv = build_argv(
            CommandPayload::Args(vec!["xdg-open".to_string(), "/tmp".to_string()]),
            None,
        )
        .unwrap();
        assert_eq!(argv, ["xdg-open", "/tmp"]);
    }

    #[test]
    fn field_payloads_fill_template_placeholders() {
        let argv = build_argv(
            CommandPayload::Fields(vec![
                ("file".to_string(), "/tmp/a.rs".to_string()),
                ("line".to_string(), "12".to_string()),
            ]),
            Some("code -g %file:%line".to_string()),
        )
        .unwrap();
        assert_eq!(argv, ["code", "-g", "/tmp/a.rs:12"]);
    }

    #[test]
    fn unconsumed_fields_become_trailing_arguments() {
        let argv = build_argv(
            CommandPayload::Fields(vec![(
                "url".to_string(),
                "https://example.com".to_string(),
            )]),
            Some("xdg-open".to_string()),
        )
        .unwrap();
        assert_eq!(argv, ["xdg-open", "https://example.com"]);
    }

    #[test]
    fn empty_commands_have_no_suitable_app() {
        assert!(matches!(
            build_argv(CommandPayload::Args(vec![]), None),
            Err(Error::NoSuitableApp)
        ));
    }

    #[test]
    fn overrides_win_program_resolution() {
        let mut config = config::for_tests();
        config.editor_cmd = Some("hx %file".to_string());
        config.browser_cmd = Some("firefox".to_string());
        assert_eq!(
            resolve_program(OpenerKind::Editor, &config).unwrap(),
            Some("hx %file".to_string())
        );
        assert_eq!(
            resolve_program(OpenerKind::Browser, &config).unwrap(),
            Some("firefox".to_string())
        );
    }

    #[test]
    fn custom_schemes_skip_program_resolution() {
        assert_eq!(
            resolve_program(OpenerKind::Custom, &config::for_tests()).unwrap(),
            None
        );
    }
}
