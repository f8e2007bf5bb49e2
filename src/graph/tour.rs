use crate::config::{GR, LIMIT};
use crate::graph::contacts::ContactStore;
use crate::graph::orientation::Signs;
use crate::graph::prune::ActiveSet;
use ndarray::Array2;
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;

/// A contig placed in a tour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tig {
    pub index: usize,
    pub size: u64,
}

/// Which permutation operator a mutation event applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Swap,
    Splice,
    Insertion,
    Inversion,
}

/// An ordering of active contigs plus the link-count matrix used to score it.
///
/// The matrix covers every contig in the catalog, so it is shared (not
/// rebuilt) when the active set shrinks and a new tour is derived.
#[derive(Debug, Clone)]
pub struct Tour {
    tigs: Vec<Tig>,
    matrix: Arc<Array2<u32>>,
}

impl Tour {
    pub fn new(tigs: Vec<Tig>, matrix: Arc<Array2<u32>>) -> Self {
        Self { tigs, matrix }
    }

    /// Tour over the active contigs in catalog order
    pub fn from_active(store: &ContactStore, active: &ActiveSet, matrix: Arc<Array2<u32>>) -> Self {
        let tigs = active
            .active_indices()
            .map(|i| Tig {
                index: i,
                size: store.contig(i).size,
            })
            .collect();
        Self::new(tigs, matrix)
    }

    pub fn tigs(&self) -> &[Tig] {
        &self.tigs
    }

    pub fn len(&self) -> usize {
        self.tigs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tigs.is_empty()
    }

    pub fn indices(&self) -> Vec<usize> {
        self.tigs.iter().map(|t| t.index).collect()
    }

    pub fn matrix(&self) -> &Arc<Array2<u32>> {
        &self.matrix
    }

    /// New tour with other contigs but the same matrix
    pub fn with_tigs(&self, tigs: Vec<Tig>) -> Tour {
        Tour::new(tigs, Arc::clone(&self.matrix))
    }

    /// Midpoint of every contig when laid end to end in tour order
    pub fn midpoints(&self) -> Vec<f64> {
        let mut cum = 0.0;
        self.tigs
            .iter()
            .map(|t| {
                let size = t.size as f64;
                let mid = cum + size / 2.0;
                cum += size;
                mid
            })
            .collect()
    }

    /// Sum of `links(i, j) / (mid[j] - mid[i])` over pairs in tour order.
    /// Larger is better.
    ///
    /// Midpoints increase along the tour, so the inner scan stops at the
    /// first partner further away than `LIMIT`.
    pub fn evaluate(&self) -> f64 {
        let mid = self.midpoints();
        let n = self.tigs.len();
        let mut score = 0.0;
        for i in 0..n {
            let a = self.tigs[i].index;
            for j in (i + 1)..n {
                let dist = mid[j] - mid[i];
                if dist > LIMIT {
                    break;
                }
                if dist <= 0.0 {
                    continue;
                }
                let links = self.matrix[[a, self.tigs[j].index]];
                if links > 0 {
                    score += links as f64 / dist;
                }
            }
        }
        score
    }

    /// GA fitness, minimised
    pub fn fitness(&self) -> f64 {
        -self.evaluate()
    }

    /// Score that depends on contig orientations.
    ///
    /// For each pair in tour order with an oriented histogram under the
    /// current signs, every bin contributes `count / (GR[k] + gap)` where
    /// `gap` is the total length of the contigs between the two.
    pub fn evaluate_oriented(&self, store: &ContactStore, signs: &Signs) -> f64 {
        let n = self.tigs.len();
        let mut start = Vec::with_capacity(n);
        let mut cum = 0u64;
        for t in &self.tigs {
            start.push(cum);
            cum += t.size;
        }

        let mut score = 0.0;
        for i in 0..n {
            let a = self.tigs[i].index;
            let end_i = start[i] + self.tigs[i].size;
            for j in (i + 1)..n {
                let gap = start[j] - end_i;
                if gap as f64 > LIMIT {
                    break;
                }
                let b = self.tigs[j].index;
                if let Some(hist) = store.oriented_histogram(a, b, signs.get(a), signs.get(b)) {
                    for (k, &count) in hist.counts().iter().enumerate() {
                        if count > 0 {
                            score += count as f64 / (GR[k] + gap) as f64;
                        }
                    }
                }
            }
        }
        score
    }

    /// Copy of the tour with the contig at `pos` removed
    pub fn without(&self, pos: usize) -> Tour {
        let mut tigs = self.tigs.clone();
        tigs.remove(pos);
        self.with_tigs(tigs)
    }

    /// Copy of the tour keeping only contigs that are still active
    pub fn retain_active(&self, active: &ActiveSet) -> Tour {
        let tigs = self
            .tigs
            .iter()
            .copied()
            .filter(|t| active.is_active(t.index))
            .collect();
        self.with_tigs(tigs)
    }

    pub fn reversed(&self) -> Tour {
        let mut tigs = self.tigs.clone();
        tigs.reverse();
        self.with_tigs(tigs)
    }

    pub fn swap(&mut self, i: usize, j: usize) {
        self.tigs.swap(i, j);
    }

    pub fn slice(&self, a: usize, b: usize) -> Tour {
        self.with_tigs(self.tigs[a..b].to_vec())
    }

    pub fn split(&self, k: usize) -> (Tour, Tour) {
        (self.slice(0, k), self.slice(k, self.len()))
    }

    pub fn append(&mut self, other: &Tour) {
        self.tigs.extend_from_slice(&other.tigs);
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.tigs.shuffle(rng);
    }

    /// Apply one randomly chosen mutation operator: swap 20%, splice 20%,
    /// insertion 30%, inversion 30%. Tours shorter than two are untouched.
    pub fn mutate<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Mutation> {
        if self.tigs.len() < 2 {
            return None;
        }
        let roll: f64 = rng.gen();
        let op = if roll < 0.2 {
            Mutation::Swap
        } else if roll < 0.4 {
            Mutation::Splice
        } else if roll < 0.7 {
            Mutation::Insertion
        } else {
            Mutation::Inversion
        };
        self.apply(op, rng);
        Some(op)
    }

    pub fn apply<R: Rng + ?Sized>(&mut self, op: Mutation, rng: &mut R) {
        let n = self.tigs.len();
        if n < 2 {
            return;
        }
        match op {
            Mutation::Swap => {
                let (p, q) = two_points(n, rng);
                self.tigs.swap(p, q);
            }
            Mutation::Splice => {
                let k = rng.gen_range(1..n);
                self.tigs.rotate_left(k);
            }
            Mutation::Insertion => {
                let (p, q) = two_points(n, rng);
                let tig = self.tigs.remove(q);
                self.tigs.insert(p, tig);
            }
            Mutation::Inversion => {
                let (p, q) = two_points(n, rng);
                let (p, q) = (p.min(q), p.max(q));
                self.tigs[p..=q].reverse();
            }
        }
    }

    /// Recombination does nothing; only mutation changes offspring.
    pub fn crossover<R: Rng + ?Sized>(&mut self, _other: &Tour, _rng: &mut R) {}
}

/// Two distinct positions in `0..n`, `n >= 2`
fn two_points<R: Rng + ?Sized>(n: usize, rng: &mut R) -> (usize, usize) {
    let picked = rand::seq::index::sample(rng, n, 2);
    (picked.index(0), picked.index(1))
}
