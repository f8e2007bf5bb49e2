use hicorder::graph::contacts::ContactStore;
use hicorder::graph::orientation::{spectral_signs, Orientation};
use hicorder::graph::prune::ActiveSet;
use hicorder::io::catalog::CatalogRecord;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Cursor;

/// Contigs with random true strands, linked along `edges` with 10 links
/// each. The contact lines are written in the true orientations.
fn oriented_group(n: usize, edges: &[(usize, usize)], seed: u64) -> (ContactStore, Vec<Orientation>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let truth: Vec<Orientation> = (0..n)
        .map(|_| {
            if rng.gen_bool(0.5) {
                Orientation::Forward
            } else {
                Orientation::Reverse
            }
        })
        .collect();

    let mut store = ContactStore::new();
    store.load_catalog(
        (0..n)
            .map(|i| CatalogRecord {
                name: format!("tig{}", i),
                size: 50_000,
                tag: None,
            })
            .collect(),
    );
    let distances = vec!["20000"; 10].join(" ");
    let mut lines = String::new();
    for &(a, b) in edges {
        lines.push_str(&format!(
            "tig{}{} tig{}{}\t10\t{}\n",
            a,
            truth[a],
            b,
            truth[b],
            distances
        ));
    }
    let report = store.load_contacts_from_reader(Cursor::new(lines)).unwrap();
    assert_eq!(report.processed, edges.len());
    (store, truth)
}

/// Signs equal the truth, possibly all flipped
fn matches_up_to_global_flip(store: &ContactStore, truth: &[Orientation]) -> bool {
    let signs = spectral_signs(store, &ActiveSet::all(truth.len()));
    let same = (0..truth.len()).all(|i| signs.get(i) == truth[i]);
    let flipped = (0..truth.len()).all(|i| signs.get(i) == truth[i].flip());
    same || flipped
}

#[test]
fn test_spectral_signs_on_long_chains() {
    for (n, seed) in [(20, 1), (200, 2), (400, 3)] {
        let edges: Vec<(usize, usize)> = (0..n - 1).map(|i| (i, i + 1)).collect();
        let (store, truth) = oriented_group(n, &edges, seed);
        assert!(matches_up_to_global_flip(&store, &truth), "chain of {}", n);
    }
}

#[test]
fn test_spectral_signs_on_random_tree() {
    let n = 300;
    let mut rng = StdRng::seed_from_u64(11);
    let edges: Vec<(usize, usize)> = (1..n).map(|i| (rng.gen_range(0..i), i)).collect();
    let (store, truth) = oriented_group(n, &edges, 12);
    assert!(matches_up_to_global_flip(&store, &truth));
}
