//! Append-only tour trace.
//!
//! ```text
//! >INIT
//! tig00030676+ tig00077819- tig00046211+
//! >GA1-500-4.10251
//! tig00077819+ tig00030676- tig00046211+
//! ```
//!
//! Each snapshot is a `>LABEL` header and one line of contig names, each
//! suffixed with its orientation, in tour order. The last snapshot is the
//! current state of the run.

use crate::error::{Result, ScaffoldError};
use crate::graph::contacts::ContactStore;
use crate::graph::orientation::{Orientation, Signs};
use crate::graph::tour::Tour;
use crate::io::open_input;
use std::fs::{self, File};
use std::io::{BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// `name+` / `name-` tokens for the contigs of `tour`
pub fn tour_tokens(store: &ContactStore, tour: &Tour, signs: &Signs) -> Vec<String> {
    tour.tigs()
        .iter()
        .map(|t| format!("{}{}", store.contig(t.index).name, signs.get(t.index)))
        .collect()
}

pub struct TourWriter {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl TourWriter {
    /// Start a fresh trace, truncating any existing file
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|e| ScaffoldError::io(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a snapshot and flush it to disk
    pub fn write_snapshot(&mut self, label: &str, tokens: &[String]) -> Result<()> {
        writeln!(self.writer, ">{}", label)
            .and_then(|_| writeln!(self.writer, "{}", tokens.join(" ")))
            .and_then(|_| self.writer.flush())
            .map_err(|e| ScaffoldError::io(&self.path, e))
    }

    pub fn write_tour(
        &mut self,
        label: &str,
        store: &ContactStore,
        tour: &Tour,
        signs: &Signs,
    ) -> Result<()> {
        self.write_snapshot(label, &tour_tokens(store, tour, signs))
    }
}

/// The last snapshot of a trace file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub label: String,
    pub tigs: Vec<(String, Orientation)>,
}

/// Split `name+` into its name and orientation
pub fn parse_token(token: &str) -> Option<(String, Orientation)> {
    let mut chars = token.chars();
    let orientation = chars.next_back().and_then(Orientation::from_char)?;
    let name = chars.as_str();
    if name.is_empty() {
        None
    } else {
        Some((name.to_string(), orientation))
    }
}

/// Parse the trace into its last snapshot. A token without an orientation
/// suffix is taken as `+`.
pub fn parse_last_snapshot<R: BufRead>(reader: R) -> std::io::Result<Option<Snapshot>> {
    let mut label = String::new();
    let mut last: Option<Snapshot> = None;
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(header) = line.strip_prefix('>') {
            label = header.to_string();
            continue;
        }
        let tigs = line
            .split_whitespace()
            .map(|token| match parse_token(token) {
                Some(tig) => tig,
                None => {
                    warn!("Tour token `{}` has no orientation, assuming +", token);
                    (token.to_string(), Orientation::Forward)
                }
            })
            .collect();
        last = Some(Snapshot {
            label: label.clone(),
            tigs,
        });
    }
    Ok(last)
}

/// Read the last snapshot of an existing trace file
pub fn read_last_snapshot(path: &Path) -> Result<Snapshot> {
    let reader = open_input(path)?;
    match parse_last_snapshot(reader).map_err(|e| ScaffoldError::io(path, e))? {
        Some(snapshot) => {
            info!(
                "Resume from `{}` snapshot {} ({} tigs)",
                path.display(),
                snapshot.label,
                snapshot.tigs.len()
            );
            Ok(snapshot)
        }
        None => Err(ScaffoldError::Resume {
            path: path.to_path_buf(),
            reason: "no tour snapshot found".into(),
        }),
    }
}

/// Move an old trace aside to `<path>.sav`
pub fn backup_trace(path: &Path) -> Result<PathBuf> {
    let mut backup = path.as_os_str().to_owned();
    backup.push(".sav");
    let backup = PathBuf::from(backup);
    fs::rename(path, &backup).map_err(|e| ScaffoldError::io(path, e))?;
    info!("Backup `{}` to `{}`", path.display(), backup.display());
    Ok(backup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_token() {
        assert_eq!(parse_token("tig1-"), Some(("tig1".to_string(), Orientation::Reverse)));
        assert_eq!(parse_token("+"), None);
        assert_eq!(parse_token("tig1"), None);
    }

    #[test]
    fn test_last_snapshot_wins() {
        let trace = ">INIT\na+ b+ c+\n>GA1-10-0.50000\nb- a+ c+\n\n";
        let snapshot = parse_last_snapshot(Cursor::new(trace)).unwrap().unwrap();
        assert_eq!(snapshot.label, "GA1-10-0.50000");
        assert_eq!(
            snapshot.tigs,
            vec![
                ("b".to_string(), Orientation::Reverse),
                ("a".to_string(), Orientation::Forward),
                ("c".to_string(), Orientation::Forward),
            ]
        );
        assert_eq!(parse_last_snapshot(Cursor::new(">INIT\n")).unwrap(), None);
    }

    #[test]
    fn test_writer_round_trip_and_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("groups.tour");
        let mut writer = TourWriter::create(&path).unwrap();
        writer
            .write_snapshot("INIT", &["a+".to_string(), "b-".to_string()])
            .unwrap();
        writer.write_snapshot("FLIPONE1", &["b+".to_string()]).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, ">INIT\na+ b-\n>FLIPONE1\nb+\n");
        let snapshot = read_last_snapshot(&path).unwrap();
        assert_eq!(snapshot.tigs, vec![("b".to_string(), Orientation::Forward)]);

        let backup = backup_trace(&path).unwrap();
        assert!(!path.exists());
        assert_eq!(backup, dir.path().join("groups.tour.sav"));
        assert_eq!(fs::read_to_string(&backup).unwrap(), text);
    }

    #[test]
    fn test_empty_trace_cannot_resume() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.tour");
        File::create(&path).unwrap();
        assert!(matches!(read_last_snapshot(&path), Err(ScaffoldError::Resume { .. })));
    }
}
