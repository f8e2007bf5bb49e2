//! Reader for the pairwise contact (`.clm`) file.
//!
//! ```text
//! tig00046211+ tig00063795+       1       53173
//! tig00046211+ tig00063795-       1       116050
//! tig00030676+ tig00077819+       7       136407 87625 87625 106905 102218 169660 169660
//! tig00030676+ tig00077819-       7       126178 152952 152952 35680 118923 98367 98367
//! ```
//!
//! Every orientation combination of a contig pair gets its own line; the
//! distances are the link distances implied by that combination.

use crate::graph::orientation::Orientation;
use serde::Serialize;
use thiserror::Error;

/// One parsed line of a contact file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRecord {
    pub a: String,
    pub a_orient: Orientation,
    pub b: String,
    pub b_orient: Orientation,
    pub distances: Vec<u64>,
}

impl ContactRecord {
    pub fn link_count(&self) -> usize {
        self.distances.len()
    }
}

/// Why a contact line was skipped
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedLine {
    #[error("expected 3 tab-separated fields, found {0}")]
    FieldCount(usize),
    #[error("expected two contig tokens in `{0}`")]
    PairField(String),
    #[error("contig token `{0}` does not end in + or -")]
    Orientation(String),
    #[error("invalid link count `{0}`")]
    LinkCount(String),
    #[error("invalid distance `{0}`")]
    Distance(String),
    #[error("link count {expected} disagrees with {found} distances")]
    CountMismatch { expected: usize, found: usize },
    #[error("record carries no links")]
    NoLinks,
}

/// Outcome of loading a contact file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Records stored in the contact model
    pub processed: usize,
    /// Lines skipped because they could not be parsed
    pub malformed: usize,
    /// Well-formed lines naming a contig absent from the catalog
    pub unknown_contig: usize,
}

fn split_token(token: &str) -> Result<(&str, Orientation), MalformedLine> {
    let mut chars = token.chars();
    let last = chars.next_back();
    match last.and_then(Orientation::from_char) {
        Some(orient) if !chars.as_str().is_empty() => Ok((chars.as_str(), orient)),
        _ => Err(MalformedLine::Orientation(token.to_string())),
    }
}

pub fn parse_contact_line(line: &str) -> Result<ContactRecord, MalformedLine> {
    let fields: Vec<&str> = line.trim_end_matches(|c: char| c == '\r' || c == '\n').split('\t').collect();
    if fields.len() != 3 {
        return Err(MalformedLine::FieldCount(fields.len()));
    }

    let tokens: Vec<&str> = fields[0].split_whitespace().collect();
    if tokens.len() != 2 {
        return Err(MalformedLine::PairField(fields[0].to_string()));
    }
    let (a, a_orient) = split_token(tokens[0])?;
    let (b, b_orient) = split_token(tokens[1])?;

    let link_count: usize = fields[1]
        .trim()
        .parse()
        .map_err(|_| MalformedLine::LinkCount(fields[1].to_string()))?;

    let distances = fields[2]
        .split_whitespace()
        .map(|d| d.parse::<u64>().map_err(|_| MalformedLine::Distance(d.to_string())))
        .collect::<Result<Vec<u64>, _>>()?;

    if link_count != distances.len() {
        return Err(MalformedLine::CountMismatch {
            expected: link_count,
            found: distances.len(),
        });
    }
    if distances.is_empty() {
        return Err(MalformedLine::NoLinks);
    }

    Ok(ContactRecord {
        a: a.to_string(),
        a_orient,
        b: b.to_string(),
        b_orient,
        distances,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_contact_line() {
        let rec = parse_contact_line("tig1+ tig2-\t3\t100 200 300").unwrap();
        assert_eq!(rec.a, "tig1");
        assert_eq!(rec.a_orient, Orientation::Forward);
        assert_eq!(rec.b, "tig2");
        assert_eq!(rec.b_orient, Orientation::Reverse);
        assert_eq!(rec.distances, vec![100, 200, 300]);
        assert_eq!(rec.link_count(), 3);
    }

    #[test]
    fn test_malformed_lines() {
        assert_eq!(
            parse_contact_line("tig1+ tig2-\t3\t100 200"),
            Err(MalformedLine::CountMismatch { expected: 3, found: 2 })
        );
        assert!(matches!(
            parse_contact_line("tig1+ tig2-\t3"),
            Err(MalformedLine::FieldCount(2))
        ));
        assert!(matches!(
            parse_contact_line("tig1 tig2-\t1\t100"),
            Err(MalformedLine::Orientation(_))
        ));
        assert!(matches!(
            parse_contact_line("+ tig2-\t1\t100"),
            Err(MalformedLine::Orientation(_))
        ));
        assert!(matches!(
            parse_contact_line("tig1+ tig2-\tx\t100"),
            Err(MalformedLine::LinkCount(_))
        ));
        assert!(matches!(
            parse_contact_line("tig1+ tig2-\t1\t-5"),
            Err(MalformedLine::Distance(_))
        ));
        assert_eq!(parse_contact_line("tig1+ tig2-\t0\t"), Err(MalformedLine::NoLinks));
    }
}
