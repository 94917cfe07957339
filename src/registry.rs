use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::domain::BarcodeEntry;
use crate::error::EnteroError;

/// Ordered `name -> barcode` list read from a two-column TSV file.
///
/// A repeated name keeps the position of its first line and the barcode of
/// its last one.
#[derive(Debug, Clone, Default)]
pub struct BarcodeRegistry {
    entries: Vec<BarcodeEntry>,
    index: HashMap<String, usize>,
}

impl BarcodeRegistry {
    pub fn load(path: &Path) -> Result<Self, EnteroError> {
        let content =
            fs::read_to_string(path).map_err(|_| EnteroError::InputRead(path.to_path_buf()))?;
        let registry = Self::parse(&content)?;
        debug!(path = %path.display(), entries = registry.len(), "loaded barcode list");
        Ok(registry)
    }

    pub fn parse(content: &str) -> Result<Self, EnteroError> {
        let mut registry = Self::default();
        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            let malformed = || EnteroError::MalformedBarcodeLine {
                line: idx + 1,
                content: raw.to_string(),
            };
            let mut columns = line.split('\t');
            let (Some(name), Some(barcode), None) = (columns.next(), columns.next(), columns.next())
            else {
                return Err(malformed());
            };
            let (name, barcode) = (name.trim(), barcode.trim());
            if name.is_empty() || barcode.is_empty() {
                return Err(malformed());
            }
            let entry = BarcodeEntry::new(name, barcode);
            if !entry.is_path_safe() {
                return Err(malformed());
            }
            registry.insert(entry);
        }
        Ok(registry)
    }

    pub fn insert(&mut self, entry: BarcodeEntry) {
        match self.index.get(&entry.name) {
            Some(&pos) => self.entries[pos].barcode = entry.barcode,
            None => {
                self.index.insert(entry.name.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.index
            .get(name)
            .map(|&pos| self.entries[pos].barcode.as_str())
    }

    pub fn entries(&self) -> &[BarcodeEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &BarcodeEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
