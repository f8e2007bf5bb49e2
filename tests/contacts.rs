use hicorder::graph::contacts::ContactStore;
use hicorder::graph::orientation::Orientation::{Forward, Reverse};
use hicorder::graph::prune::{prune_by_density, ActiveSet};
use hicorder::ScaffoldError;
use std::fs;
use tempfile::TempDir;

fn write_group(dir: &TempDir, ids: &str, clm: &str) -> (std::path::PathBuf, std::path::PathBuf) {
    let ids_path = dir.path().join("g.ids");
    let clm_path = dir.path().join("g.clm");
    fs::write(&ids_path, ids).unwrap();
    fs::write(&clm_path, clm).unwrap();
    (ids_path, clm_path)
}

#[test]
fn test_load_from_files() {
    let dir = TempDir::new().unwrap();
    let (ids, clm) = write_group(
        &dir,
        "# group 1\ntig1\t46912\ntig2\t46779\trecover\ntig3\n",
        "tig1+ tig2+\t2\t53173 60000\ntig1+ tig2-\t1\t116050\n\ntig2- tig1+\t1\t9000\n",
    );
    let store = ContactStore::from_files(&ids, &clm).unwrap();
    // tig3 has no size and is skipped
    assert_eq!(store.len(), 2);
    assert_eq!(store.contig(1).tag.as_deref(), Some("recover"));
    assert_eq!(store.report().processed, 3);

    // The single 9000 link is the tightest, reading tig2- tig1+
    let contact = store.contact(0, 1).unwrap();
    assert_eq!(contact.links, 1);
    assert_eq!(contact.mean_dist, 9000);
    assert_eq!(contact.strandedness, -1);

    let forward = store.oriented_histogram(1, 0, Reverse, Forward).unwrap();
    let complement = store.oriented_histogram(0, 1, Reverse, Forward).unwrap();
    assert_eq!(forward.counts(), complement.counts());
    assert!(store.oriented_histogram(0, 1, Forward, Forward).is_some());
}

#[test]
fn test_empty_catalog_is_fatal() {
    let dir = TempDir::new().unwrap();
    let (ids, clm) = write_group(&dir, "# nothing here\n", "");
    let err = ContactStore::from_files(&ids, &clm).unwrap_err();
    assert!(matches!(err, ScaffoldError::EmptyCatalog { .. }));
}

#[test]
fn test_missing_contact_file_is_fatal() {
    let dir = TempDir::new().unwrap();
    let (ids, _) = write_group(&dir, "tig1\t1000\n", "");
    let err = ContactStore::from_files(&ids, &dir.path().join("absent.clm")).unwrap_err();
    assert!(matches!(err, ScaffoldError::Io { .. }));
}

#[test]
fn test_density_prune_with_isolated_contig() {
    let dir = TempDir::new().unwrap();
    let mut ids = String::new();
    let mut clm = String::new();
    for i in 0..10 {
        ids.push_str(&format!("t{}\t40000\n", i));
    }
    ids.push_str("lonely\t40000\n");
    for i in 0..10 {
        let j = (i + 1) % 10;
        let n = 30 + 2 * i;
        let d = vec!["8000"; n].join(" ");
        clm.push_str(&format!("t{}+ t{}+\t{}\t{}\n", i, j, n, d));
    }
    let (ids, clm) = write_group(&dir, &ids, &clm);
    let store = ContactStore::from_files(&ids, &clm).unwrap();

    let mut active = ActiveSet::all(store.len());
    prune_by_density(&store, &mut active);
    // No links at all gives log10(0), below any finite bound
    assert!(!active.is_active(store.index_of("lonely").unwrap()));
    assert_eq!(active.count(), 10);
}
