//! Re-derive ground truth from a selection: find the scheme by tag, run its
//! pattern over the stored raw text again so named groups come back, then
//! let the post-handler build the command payload.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::registry::Registry;
use crate::scheme::{CommandPayload, OpenerKind};

pub fn resolve(
    raw: &str,
    tag: &str,
    registry: &Registry,
    config: &Config,
) -> Result<(CommandPayload, OpenerKind)> {
    let scheme = registry
        .by_tag(tag)
        .ok_or_else(|| Error::Protocol(format!("unknown tag '{tag}'")))?;

    // The raw text matched this pattern during extraction; a miss here
    // breaks that invariant.
    let caps = scheme
        .pattern
        .captures(raw)
        .ok_or(Error::PatternNotMatching)?;

    let payload = match &scheme.post {
        Some(post) => post.apply(&caps, config)?,
        None => CommandPayload::Args(vec![
            caps.get(0).map(|m| m.as_str()).unwrap_or(raw).to_string(),
        ]),
    };
    Ok((payload, scheme.opener))
}

#[cfg(test)]
mod tests {
    use regex::Regex;

    use super::*;
    use crate::config;
    use crate::defaults;
    use crate::extract;
    use crate::scheme::{OpenerKind as Kind, Scheme};

    fn default_registry() -> Registry {
        Registry::merge(defaults::default_schemes(), vec![], &[])
    }

    #[test]
    fn url_selection_resolves_to_the_exact_match() {
        let registry = default_registry();
        let (payload, kind) = resolve(
            "https://example.com/a?b=1",
            "url",
            &registry,
            &config::for_tests(),
        )
        .unwrap();
        assert_eq!(kind, Kind::Browser);
        assert_eq!(
            payload,
            CommandPayload::Args(vec!["https://example.com/a?b=1".to_string()])
        );
    }

    #[test]
    fn git_selection_rebuilds_the_repo_url() {
        let registry = default_registry();
        let (payload, kind) = resolve(
            "git@github.com:org/repo.git",
            "git",
            &registry,
            &config::for_tests(),
        )
        .unwrap();
        assert_eq!(kind, Kind::Browser);
        assert_eq!(
            payload,
            CommandPayload::Fields(vec![(
                "url".to_string(),
                "https://github.com/github.com:org/repo.git".to_string()
            )])
        );
    }

    #[test]
    fn unknown_tags_are_protocol_errors() {
        let registry = default_registry();
        let err = resolve("anything", "nope", &registry, &config::for_tests()).unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[test]
    fn rematch_failure_is_an_invariant_violation() {
        let registry = Registry::merge(
            vec![Scheme {
                tags: vec!["strict".to_string()],
                opener: Kind::Browser,
                pattern: Regex::new(r"zzz[0-9]+").unwrap(),
                pre: None,
                post: None,
            }],
            vec![],
            &[],
        );
        let err = resolve("unrelated", "strict", &registry, &config::for_tests()).unwrap_err();
        assert!(matches!(err, Error::PatternNotMatching));
    }

    #[test]
    fn extracted_candidates_always_rematch_with_equal_groups() {
        let registry = default_registry();
        let text = "https://example.com/x git@gitlab.com:a/b.git (10.1.2.3:443/path)";
        let config = config::for_tests();
        for candidate in extract::extract(text, &registry, &config) {
            let scheme = registry.by_tag(&candidate.tag).unwrap();
            let caps = scheme.pattern.captures(&candidate.raw).unwrap();
            assert_eq!(caps.get(0).unwrap().as_str(), candidate.raw);
        }
    }
}
