//! Reader for the contig catalog (`.ids`) file.
//!
//! ```text
//! tig00015093     46912
//! tig00035238     46779   recover
//! tig00030900     119291
//! ```
//!
//! Contigs are indexed in file order. The optional third column marks
//! contigs that were recovered into the group with less confidence.

use crate::error::{Result, ScaffoldError};
use crate::io::open_input;
use std::io::BufRead;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRecord {
    pub name: String,
    pub size: u64,
    pub tag: Option<String>,
}

/// Parse catalog lines, skipping blank, comment and malformed lines
pub fn parse_catalog<R: BufRead>(reader: R) -> std::io::Result<Vec<CatalogRecord>> {
    let mut records = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut words = line.split_whitespace();
        let (name, size) = match (words.next(), words.next()) {
            (Some(name), Some(size)) => (name, size),
            _ => {
                warn!("Catalog line {}: expected `name size`, skipped", i + 1);
                continue;
            }
        };
        let size = match size.parse::<u64>() {
            Ok(size) => size,
            Err(_) => {
                warn!("Catalog line {}: invalid size `{}`, skipped", i + 1, size);
                continue;
            }
        };
        records.push(CatalogRecord {
            name: name.to_string(),
            size,
            tag: words.next().map(str::to_string),
        });
    }
    Ok(records)
}

/// Read a catalog file; a missing file is fatal
pub fn read_catalog(path: &Path) -> Result<Vec<CatalogRecord>> {
    info!("Parse idsfile `{}`", path.display());
    let reader = open_input(path)?;
    parse_catalog(reader).map_err(|e| ScaffoldError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_catalog_with_tags_and_junk() {
        let text = "tig1\t46912\n# comment\n\ntig2\t46779\trecover\nbroken\ntig3\tabc\ntig4 119291\n";
        let records = parse_catalog(Cursor::new(text)).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].name, "tig1");
        assert_eq!(records[1].tag.as_deref(), Some("recover"));
        assert_eq!(records[2].size, 119291);
    }
}
