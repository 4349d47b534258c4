use std::collections::{BTreeMap, BTreeSet, HashMap};

use regex::Regex;

use crate::errors::{Error, Result};
use crate::registry::{Registry, RegistryNode};

/// Registry path of the read-only, game-defined filters.
const RKEY_GAME_FILTERS: &str = "game/filtersystem//filter";
/// Registry path of the user-defined filters.
const RKEY_USER_FILTERS: &str = "user/ui/filtersystem//filter";

/// A single filter criterion: items of the given kind whose name matches
/// the pattern are shown or hidden.
#[derive(Clone, Debug)]
pub struct FilterRule {
    pub kind: String,
    pub pattern: Regex,
    pub show: bool,
}

impl FilterRule {
    pub fn new(kind: &str, pattern: &str, show: bool) -> Result<FilterRule> {
        let pattern = Regex::new(pattern).map_err(|source| Error::InvalidPattern {
            pattern: pattern.to_owned(),
            source,
        })?;
        Ok(FilterRule {
            kind: kind.to_owned(),
            pattern,
            show,
        })
    }
}

/// A named list of rules. Game-defined filters are read-only; filters
/// the user created can be removed again.
#[derive(Clone, Debug)]
pub struct Filter {
    name: String,
    read_only: bool,
    rules: Vec<FilterRule>,
}

impl Filter {
    pub fn new(name: &str, read_only: bool) -> Filter {
        Filter {
            name: name.to_owned(),
            read_only,
            rules: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn add_rule(&mut self, rule: FilterRule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[FilterRule] {
        &self.rules
    }

    /// Visibility of an item under this filter alone. The last rule
    /// matching both kind and name wins; items no rule matches stay
    /// visible.
    pub fn is_visible(&self, kind: &str, item: &str) -> bool {
        let mut visible = true;
        for rule in &self.rules {
            if rule.kind == kind && rule.pattern.is_match(item) {
                visible = rule.show;
            }
        }
        visible
    }
}

/// Holds every loaded filter and evaluates visibility against the
/// currently active set, memoising results per item name until the
/// active set changes.
#[derive(Debug, Default)]
pub struct FilterSystem {
    available: BTreeMap<String, Filter>,
    active: BTreeSet<String>,
    visibility_cache: HashMap<String, bool>,
}

impl FilterSystem {
    pub fn new() -> FilterSystem {
        FilterSystem::default()
    }

    /// Load filters from the game descriptor (read-only) and the user
    /// settings tree (editable).
    pub fn load(&mut self, game: &Registry, user: &Registry) -> Result<()> {
        let game_nodes = game.find_path(RKEY_GAME_FILTERS);
        let user_nodes = user.find_path(RKEY_USER_FILTERS);

        log::info!(
            "[filters] Loaded {} filters from registry",
            game_nodes.len() + user_nodes.len()
        );

        self.add_from_nodes(&game_nodes, true)?;
        self.add_from_nodes(&user_nodes, false)?;
        Ok(())
    }

    fn add_from_nodes(&mut self, nodes: &[&RegistryNode], read_only: bool) -> Result<()> {
        for node in nodes {
            let name = node.attribute("name").unwrap_or_default();
            let mut filter = Filter::new(name, read_only);

            for criterion in node.children_named("filterCriterion") {
                filter.add_rule(FilterRule::new(
                    criterion.attribute("type").unwrap_or_default(),
                    criterion.attribute("match").unwrap_or_default(),
                    criterion.attribute("action") == Some("show"),
                )?);
            }

            self.available.insert(name.to_owned(), filter);
        }
        Ok(())
    }

    /// Define a filter directly, replacing any previous one of the same
    /// name.
    pub fn add_filter(&mut self, filter: Filter) {
        self.available.insert(filter.name().to_owned(), filter);
        self.visibility_cache.clear();
    }

    pub fn filter_names(&self) -> impl Iterator<Item = &str> {
        self.available.keys().map(String::as_str)
    }

    pub fn rules(&self, name: &str) -> Option<&[FilterRule]> {
        self.available.get(name).map(Filter::rules)
    }

    /// Unknown filters report read-only.
    pub fn is_read_only(&self, name: &str) -> bool {
        self.available
            .get(name)
            .map(Filter::is_read_only)
            .unwrap_or(true)
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.active.contains(name)
    }

    /// Activate or deactivate a filter, invalidating cached visibility.
    pub fn set_state(&mut self, name: &str, active: bool) {
        if !self.available.contains_key(name) {
            return;
        }
        if active {
            self.active.insert(name.to_owned());
        } else {
            self.active.remove(name);
        }
        self.visibility_cache.clear();
    }

    /// Remove a user-defined filter. Read-only and unknown filters are
    /// refused.
    pub fn remove(&mut self, name: &str) -> bool {
        match self.available.get(name) {
            Some(filter) if !filter.is_read_only() => {
                self.available.remove(name);
                self.active.remove(name);
                self.visibility_cache.clear();
                true
            }
            _ => false,
        }
    }

    /// Whether an item is visible under the active filters. Hidden as
    /// soon as any active filter hides it.
    pub fn is_visible(&mut self, kind: &str, item: &str) -> bool {
        if let Some(&visible) = self.visibility_cache.get(item) {
            return visible;
        }

        let mut visible = true;
        for name in &self.active {
            if let Some(filter) = self.available.get(name) {
                if !filter.is_visible(kind, item) {
                    visible = false;
                    break;
                }
            }
        }

        self.visibility_cache.insert(item.to_owned(), visible);
        visible
    }
}
