use std::collections::HashSet;

use tracing::warn;

use crate::config::Config;
use crate::registry::Registry;
use crate::scheme::PreHandled;

/// One deduplicated match offered for selection. `raw` is the ground truth
/// that survives the chooser round trip; the display text never does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub raw: String,
    pub display_text: String,
    pub tag: String,
    pub scheme_index: usize,
}

/// Run every scheme over `text`, keeping the first appearance of each raw
/// match. The returned list is reversed so the most recently printed text
/// sits on top of the chooser.
pub fn extract(text: &str, registry: &Registry, config: &Config) -> Vec<Candidate> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut found: Vec<Candidate> = Vec::new();

    for (scheme_index, scheme) in registry.schemes().iter().enumerate() {
        for caps in scheme.pattern.captures_iter(text) {
            let raw = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
            if seen.contains(raw) {
                continue;
            }
            let handled = match &scheme.pre {
                Some(pre) => match pre.apply(&caps, config, &scheme.tags[0]) {
                    Some(handled) => handled,
                    // Dropped matches stay out of the seen set so a later
                    // scheme can still claim the same raw text.
                    None => continue,
                },
                None => PreHandled {
                    display_text: raw.to_string(),
                    tag: scheme.tags[0].clone(),
                },
            };
            if !scheme.tags.contains(&handled.tag) {
                warn!(
                    "tag '{}' returned by the pre-handler is not among {:?}",
                    handled.tag, scheme.tags
                );
                continue;
            }
            seen.insert(raw.to_string());
            found.push(Candidate {
                raw: raw.to_string(),
                display_text: handled.display_text,
                tag: handled.tag,
                scheme_index,
            });
        }
    }

    found.reverse();
    found
}

/// Chooser input lines: 1-based index, bracketed tag padded to the widest
/// tag for columnar alignment, then the display text.
pub fn display_lines(candidates: &[Candidate]) -> Vec<String> {
    let width = candidates.iter().map(|c| c.tag.len()).max().unwrap_or(0) + 2;
    candidates
        .iter()
        .enumerate()
        .map(|(i, c)| {
            format!(
                "{:4} - {:<width$} - {}",
                i + 1,
                format!("[{}]", c.tag),
                c.display_text,
                width = width
            )
        })
        .collect()
}
