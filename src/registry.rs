use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::scheme::Scheme;

/// Merged, ordered scheme table with O(1) tag lookup.
pub struct Registry {
    schemes: Vec<Scheme>,
    tag_index: HashMap<String, usize>,
}

impl Registry {
    /// Merge user schemes over the defaults. A scheme survives only if none
    /// of its tags is already claimed and none is listed in `remove_tags`;
    /// user schemes are considered first, so they win every collision.
    pub fn merge(defaults: Vec<Scheme>, user: Vec<Scheme>, remove_tags: &[String]) -> Self {
        let mut claimed: HashSet<String> = HashSet::new();
        let mut schemes: Vec<Scheme> = Vec::new();

        for scheme in user.into_iter().chain(defaults) {
            let keep = scheme
                .tags
                .iter()
                .all(|tag| !claimed.contains(tag) && !remove_tags.contains(tag));
            if !keep {
                debug!(tags = ?scheme.tags, "scheme shadowed or removed");
                continue;
            }
            claimed.extend(scheme.tags.iter().cloned());
            schemes.push(scheme);
        }

        let tag_index = schemes
            .iter()
            .enumerate()
            .flat_map(|(index, scheme)| scheme.tags.iter().map(move |tag| (tag.clone(), index)))
            .collect();

        Self { schemes, tag_index }
    }

    pub fn schemes(&self) -> &[Scheme] {
        &self.schemes
    }

    pub fn by_tag(&self, tag: &str) -> Option<&Scheme> {
        self.tag_index.get(tag).map(|&index| &self.schemes[index])
    }
}
