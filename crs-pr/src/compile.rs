//! Keyword sheet compiler
//!
//! Turns the curated phrase sheet (CSV export, one column per keyword group,
//! cells holding comma-separated phrases) into the two JSON files the
//! registry loads:
//! - groups: normalized column header → every phrase in the column
//! - equivalencies: first phrase of a multi-phrase cell → all its phrases

use crs_common::output::write_string_atomic;
use crs_common::{KeywordGroupRegistry, Result};
use serde_json::{Map, Value};
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Compiled configuration documents, in sheet order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledKeywords {
    pub groups: Map<String, Value>,
    pub equivalencies: Map<String, Value>,
}

impl CompiledKeywords {
    pub fn groups_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.groups)?)
    }

    pub fn equivalencies_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.equivalencies)?)
    }

    /// Load the compiled documents as a registry (validates the output)
    pub fn to_registry(&self) -> Result<KeywordGroupRegistry> {
        KeywordGroupRegistry::from_json_str(&self.groups_json()?, &self.equivalencies_json()?)
    }
}

/// Group name from a sheet column header
pub fn normalize_group_name(header: &str) -> String {
    header
        .trim()
        .to_lowercase()
        .replace(' ', "_")
        .replace('&', "and")
}

/// Trimmed, non-empty comma-separated phrases of one cell
pub fn split_phrases(cell: &str) -> Vec<String> {
    cell.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

fn string_array(items: &[String]) -> Value {
    Value::Array(items.iter().cloned().map(Value::String).collect())
}

/// Compile a phrase sheet read from `reader`
///
/// Columns are visited left to right and cells top to bottom. A repeated
/// group name or equivalency head keeps its first position and the later
/// value.
pub fn compile_sheet<R: Read>(reader: R) -> Result<CompiledKeywords> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();

    let mut columns: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for record in csv_reader.records() {
        let record = record?;
        for (index, cell) in record.iter().enumerate().take(headers.len()) {
            columns[index].push(cell.to_string());
        }
    }

    let mut compiled = CompiledKeywords::default();
    for (header, cells) in headers.iter().zip(&columns) {
        let mut entries = Vec::new();
        for cell in cells {
            let phrases = split_phrases(cell);
            if phrases.len() > 1 {
                compiled
                    .equivalencies
                    .insert(phrases[0].clone(), string_array(&phrases));
            }
            entries.extend(phrases);
        }
        compiled
            .groups
            .insert(normalize_group_name(header), string_array(&entries));
    }

    Ok(compiled)
}

/// Compile `sheet` and atomically write both JSON files
pub fn compile_file(sheet: &Path, groups_out: &Path, equivalencies_out: &Path) -> Result<CompiledKeywords> {
    let file = std::fs::File::open(sheet)?;
    let compiled = compile_sheet(file)?;

    // Refuse to write anything the registry could not load back
    compiled.to_registry()?;

    write_string_atomic(equivalencies_out, &compiled.equivalencies_json()?)?;
    info!(
        terms = compiled.equivalencies.len(),
        "Wrote equivalencies to {}",
        equivalencies_out.display()
    );

    write_string_atomic(groups_out, &compiled.groups_json()?)?;
    info!(
        groups = compiled.groups.len(),
        "Wrote keyword groups to {}",
        groups_out.display()
    );

    Ok(compiled)
}
