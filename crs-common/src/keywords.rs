//! Keyword group registry
//!
//! Holds the weighted keyword taxonomy and the equivalency map. Loaded once
//! per process and passed by reference into scoring; never mutated after
//! load, so it can be shared across rayon workers without locking.
//!
//! **Group file:** `{ "<group_name>[-<weight>]": ["entry", "part a, part b"] }`
//!
//! **Equivalency file:** `{ "<canonical>": ["synonym", ...] }`

use crate::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

static WEIGHT_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-([0-9]+)$").expect("weight suffix regex"));

/// Weight encoded in a trailing `-<digits>` suffix of a group name
///
/// Missing suffix or a value that does not fit yields weight 1.
pub fn parse_group_weight(name: &str) -> u32 {
    WEIGHT_SUFFIX
        .captures(name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .unwrap_or(1)
}

/// One named, weighted cluster of keyword entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordGroup {
    name: String,
    weight: u32,
    entries: Vec<String>,
}

impl KeywordGroup {
    pub fn new(name: impl Into<String>, entries: Vec<String>) -> Self {
        let name = name.into();
        let weight = parse_group_weight(&name);
        Self { name, weight, entries }
    }

    /// Full configured name, weight suffix included
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn weight(&self) -> u32 {
        self.weight
    }

    /// Configured entries, each possibly a comma-separated set of parts
    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

/// Canonical term → synonym surface forms, in file order
///
/// Only used to collapse frequency counts for reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EquivalencyMap {
    terms: Vec<(String, Vec<String>)>,
}

impl EquivalencyMap {
    pub fn new(terms: Vec<(String, Vec<String>)>) -> Self {
        Self { terms }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// First canonical term whose synonym set contains `part`, else `part`
    pub fn canonical_term<'a>(&'a self, part: &'a str) -> &'a str {
        self.terms
            .iter()
            .find(|(_, synonyms)| synonyms.iter().any(|s| s == part))
            .map(|(canonical, _)| canonical.as_str())
            .unwrap_or(part)
    }

    /// Re-key a frequency map by canonical term, summing counts
    pub fn collapse<'a, I>(&self, frequencies: I) -> BTreeMap<String, u64>
    where
        I: IntoIterator<Item = (&'a String, &'a u64)>,
    {
        let mut collapsed = BTreeMap::new();
        for (part, count) in frequencies {
            *collapsed
                .entry(self.canonical_term(part).to_string())
                .or_insert(0) += *count;
        }
        collapsed
    }
}

/// Immutable keyword taxonomy plus equivalency map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordGroupRegistry {
    groups: Vec<KeywordGroup>,
    equivalencies: EquivalencyMap,
}

impl KeywordGroupRegistry {
    pub fn new(groups: Vec<KeywordGroup>, equivalencies: EquivalencyMap) -> Self {
        Self { groups, equivalencies }
    }

    /// Load both configuration files
    ///
    /// Either file missing or malformed is [`Error::Config`].
    pub fn load(groups_path: &Path, equivalency_path: &Path) -> Result<Self> {
        let groups_json = read_config_file(groups_path, "keyword group")?;
        let equivalency_json = read_config_file(equivalency_path, "equivalency")?;

        let registry = Self::from_json_str(&groups_json, &equivalency_json)?;
        info!(
            groups = registry.groups.len(),
            equivalencies = registry.equivalencies.len(),
            "Loaded keyword registry from {}",
            groups_path.display()
        );
        Ok(registry)
    }

    /// Build a registry from in-memory JSON documents
    pub fn from_json_str(groups_json: &str, equivalency_json: &str) -> Result<Self> {
        let groups = parse_string_list_map(groups_json, "keyword group")?
            .into_iter()
            .map(|(name, entries)| KeywordGroup::new(name, entries))
            .collect::<Vec<_>>();

        for group in &groups {
            debug!(group = %group.name(), weight = group.weight(), entries = group.entries().len(), "Keyword group");
        }

        let equivalencies = EquivalencyMap::new(parse_string_list_map(equivalency_json, "equivalency")?);

        Ok(Self::new(groups, equivalencies))
    }

    /// Groups in configuration order
    pub fn groups(&self) -> &[KeywordGroup] {
        &self.groups
    }

    pub fn equivalencies(&self) -> &EquivalencyMap {
        &self.equivalencies
    }

    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.name())
    }

    pub fn group(&self, name: &str) -> Option<&KeywordGroup> {
        self.groups.iter().find(|g| g.name() == name)
    }
}

fn read_config_file(path: &Path, label: &str) -> Result<String> {
    if !path.exists() {
        return Err(Error::Config(format!(
            "{} file not found: {}",
            label,
            path.display()
        )));
    }
    std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} file {} failed: {}", label, path.display(), e)))
}

/// Parse `{ "name": ["a", "b"], ... }` preserving key order
fn parse_string_list_map(json: &str, label: &str) -> Result<Vec<(String, Vec<String>)>> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| Error::Config(format!("{} config is not valid JSON: {}", label, e)))?;

    let object = value
        .as_object()
        .ok_or_else(|| Error::Config(format!("{} config must be a JSON object", label)))?;

    object
        .iter()
        .map(|(name, list)| {
            let items = list.as_array().ok_or_else(|| {
                Error::Config(format!("{} '{}' must map to a list of strings", label, name))
            })?;
            let strings = items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        Error::Config(format!("{} '{}' contains a non-string entry", label, name))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok((name.clone(), strings))
        })
        .collect()
}
