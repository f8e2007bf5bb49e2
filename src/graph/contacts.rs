use crate::error::{Result, ScaffoldError};
use crate::graph::orientation::Orientation;
use crate::io::catalog::{read_catalog, CatalogRecord};
use crate::io::clm::{parse_contact_line, ContactRecord, LoadReport};
use crate::io::open_input;
use crate::stats::{clamped_harmonic_mean, GoldenArray};
use ahash::AHashMap;
use ndarray::Array2;
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A contig from the catalog. The index is its position in the catalog
/// and never changes after loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contig {
    pub index: usize,
    pub name: String,
    pub size: u64,
    pub tag: Option<String>,
}

/// Unordered contig pair, stored with the smaller index first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pair {
    pub a: usize,
    pub b: usize,
}

impl Pair {
    pub fn new(a: usize, b: usize) -> Self {
        if a <= b {
            Pair { a, b }
        } else {
            Pair { a: b, b: a }
        }
    }
}

/// Canonical contact between two contigs: the orientation combination
/// with the tightest harmonic-mean link distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    /// +1 when both contigs were read in the same orientation, -1 otherwise
    pub strandedness: i8,
    pub links: u32,
    pub mean_dist: u64,
}

/// Ordered contig pair with an orientation for each side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrientedPair {
    pub a: usize,
    pub b: usize,
    pub a_orient: Orientation,
    pub b_orient: Orientation,
}

impl OrientedPair {
    /// The same contact read from the other strand: `(b, a, ~ob, ~oa)`
    pub fn reverse_complement(&self) -> Self {
        OrientedPair {
            a: self.b,
            b: self.a,
            a_orient: self.b_orient.flip(),
            b_orient: self.a_orient.flip(),
        }
    }
}

/// Aggregated contact model built from a catalog and a contact file.
///
/// Read-only once loaded. The active flags of contigs live in
/// [`crate::graph::prune::ActiveSet`], keyed by contig index.
#[derive(Debug, Default)]
pub struct ContactStore {
    contigs: Vec<Contig>,
    name_to_index: AHashMap<String, usize>,
    contacts: AHashMap<Pair, Contact>,
    oriented: AHashMap<OrientedPair, Arc<GoldenArray>>,
    report: LoadReport,
}

impl ContactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the catalog and then the contact file. Both must exist.
    pub fn from_files(ids_path: &Path, clm_path: &Path) -> Result<Self> {
        let mut store = ContactStore::new();
        store.load_catalog(read_catalog(ids_path)?);
        if store.is_empty() {
            return Err(ScaffoldError::EmptyCatalog {
                path: ids_path.to_path_buf(),
            });
        }
        store.load_contacts(clm_path)?;
        Ok(store)
    }

    /// Assign dense indices to catalog records in the order given
    pub fn load_catalog(&mut self, records: Vec<CatalogRecord>) {
        for record in records {
            if self.name_to_index.contains_key(&record.name) {
                warn!("Duplicate contig `{}` in catalog, keeping the first", record.name);
                continue;
            }
            let index = self.contigs.len();
            self.name_to_index.insert(record.name.clone(), index);
            self.contigs.push(Contig {
                index,
                name: record.name,
                size: record.size,
                tag: record.tag,
            });
        }
        let total: u64 = self.contigs.iter().map(|c| c.size).sum();
        info!("Catalog: {} contigs (length={})", self.contigs.len(), total);
    }

    pub fn load_contacts(&mut self, path: &Path) -> Result<LoadReport> {
        info!("Parse clmfile `{}`", path.display());
        let reader = open_input(path)?;
        self.load_contacts_from_reader(reader)
            .map_err(|e| ScaffoldError::io(path, e))
    }

    /// Parse contact lines, skipping (and counting) malformed ones
    pub fn load_contacts_from_reader<R: BufRead>(&mut self, reader: R) -> std::io::Result<LoadReport> {
        let mut report = LoadReport::default();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            match parse_contact_line(&line) {
                Ok(record) => {
                    if self.add_record(&record) {
                        report.processed += 1;
                    } else {
                        report.unknown_contig += 1;
                    }
                }
                Err(e) => {
                    warn!("Malformed line {}: {} ({})", i + 1, line, e);
                    report.malformed += 1;
                }
            }
        }
        info!(
            "Loaded {} contact records ({} malformed, {} with unknown contigs)",
            report.processed, report.malformed, report.unknown_contig
        );
        self.report.processed += report.processed;
        self.report.malformed += report.malformed;
        self.report.unknown_contig += report.unknown_contig;
        Ok(report)
    }

    /// Fold one record into the model. Returns false when either contig is
    /// not in the catalog (or the record pairs a contig with itself).
    pub fn add_record(&mut self, record: &ContactRecord) -> bool {
        let (ai, bi) = match (self.index_of(&record.a), self.index_of(&record.b)) {
            (Some(ai), Some(bi)) if ai != bi => (ai, bi),
            _ => return false,
        };

        let histogram = Arc::new(GoldenArray::from_distances(&record.distances));
        let mean_dist = clamped_harmonic_mean(&record.distances);
        let strandedness = if record.a_orient == record.b_orient { 1 } else { -1 };
        let contact = Contact {
            strandedness,
            links: record.link_count() as u32,
            mean_dist,
        };

        self.contacts
            .entry(Pair::new(ai, bi))
            .and_modify(|existing| {
                if mean_dist < existing.mean_dist {
                    *existing = contact;
                }
            })
            .or_insert(contact);

        let key = OrientedPair {
            a: ai,
            b: bi,
            a_orient: record.a_orient,
            b_orient: record.b_orient,
        };
        self.oriented.insert(key.reverse_complement(), Arc::clone(&histogram));
        self.oriented.insert(key, histogram);
        debug!("Stored contact {}-{} mean_dist={}", record.a, record.b, mean_dist);
        true
    }

    pub fn len(&self) -> usize {
        self.contigs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contigs.is_empty()
    }

    pub fn contigs(&self) -> &[Contig] {
        &self.contigs
    }

    pub fn contig(&self, index: usize) -> &Contig {
        &self.contigs[index]
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    /// Cumulative load report over every contact file read so far
    pub fn report(&self) -> LoadReport {
        self.report
    }

    pub fn contact(&self, a: usize, b: usize) -> Option<&Contact> {
        self.contacts.get(&Pair::new(a, b))
    }

    pub fn contacts(&self) -> impl Iterator<Item = (&Pair, &Contact)> {
        self.contacts.iter()
    }

    pub fn oriented_histogram(
        &self,
        a: usize,
        b: usize,
        a_orient: Orientation,
        b_orient: Orientation,
    ) -> Option<&Arc<GoldenArray>> {
        self.oriented.get(&OrientedPair {
            a,
            b,
            a_orient,
            b_orient,
        })
    }

    pub fn oriented_histograms(&self) -> impl Iterator<Item = (&OrientedPair, &Arc<GoldenArray>)> {
        self.oriented.iter()
    }

    /// Symmetric link-count matrix over every contig in the catalog
    pub fn link_matrix(&self) -> Array2<u32> {
        let n = self.len();
        let mut m = Array2::zeros((n, n));
        for (pair, contact) in &self.contacts {
            m[[pair.a, pair.b]] = contact.links;
            m[[pair.b, pair.a]] = contact.links;
        }
        m
    }

    /// Strandedness-weighted link matrix `O[i][j] = s(i,j) * links(i,j)`
    /// restricted to `members`; row `k` corresponds to `members[k]`.
    pub fn orientation_matrix(&self, members: &[usize]) -> Array2<f64> {
        let n = members.len();
        let mut o = Array2::zeros((n, n));
        for i in 0..n {
            for j in (i + 1)..n {
                if let Some(c) = self.contact(members[i], members[j]) {
                    let score = c.strandedness as f64 * c.links as f64;
                    o[[i, j]] = score;
                    o[[j, i]] = score;
                }
            }
        }
        o
    }
}
