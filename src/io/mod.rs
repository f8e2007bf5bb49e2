pub mod catalog;
pub mod clm;
pub mod tourfile;

use crate::error::{Result, ScaffoldError};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Open a text input for reading, handles gzipped files automatically
pub fn open_input(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path).map_err(|e| ScaffoldError::io(path, e))?;
    if path.extension().map_or(false, |ext| ext == "gz") {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Swap the extension of `path`, looking through a trailing `.gz`.
///
/// `sample.clm.gz` with `ids` gives `sample.ids`.
pub fn sibling_with_extension(path: &Path, extension: &str) -> PathBuf {
    let stripped = if path.extension().map_or(false, |ext| ext == "gz") {
        path.with_extension("")
    } else {
        path.to_path_buf()
    };
    stripped.with_extension(extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn test_sibling_paths() {
        assert_eq!(
            sibling_with_extension(Path::new("out/groups.clm"), "ids"),
            PathBuf::from("out/groups.ids")
        );
        assert_eq!(
            sibling_with_extension(Path::new("groups.clm.gz"), "tour"),
            PathBuf::from("groups.tour")
        );
    }

    #[test]
    fn test_open_input_reads_gzip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lines.txt.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        writeln!(encoder, "tig1\t1000").unwrap();
        encoder.finish().unwrap();

        let lines: Vec<String> = open_input(&path).unwrap().lines().map(|l| l.unwrap()).collect();
        assert_eq!(lines, vec!["tig1\t1000".to_string()]);
    }

    #[test]
    fn test_open_input_missing_file_is_fatal() {
        let err = open_input(Path::new("/nonexistent/contacts.clm")).err().unwrap();
        assert!(matches!(err, ScaffoldError::Io { .. }));
    }
}
