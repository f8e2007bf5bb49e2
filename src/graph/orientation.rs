use crate::error::Result;
use crate::graph::contacts::ContactStore;
use crate::graph::prune::ActiveSet;
use crate::graph::tour::Tour;
use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::{Array1, Array2};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

/// Strand of a contig as it is laid into the scaffold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Orientation {
    #[serde(rename = "+")]
    Forward,
    #[serde(rename = "-")]
    Reverse,
}

impl Orientation {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Orientation::Forward),
            '-' => Some(Orientation::Reverse),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Orientation::Forward => '+',
            Orientation::Reverse => '-',
        }
    }

    pub fn flip(self) -> Self {
        match self {
            Orientation::Forward => Orientation::Reverse,
            Orientation::Reverse => Orientation::Forward,
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// One orientation per catalog contig, indexed by contig index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signs(Vec<Orientation>);

impl Signs {
    pub fn all_forward(n: usize) -> Self {
        Signs(vec![Orientation::Forward; n])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Orientation {
        self.0[index]
    }

    pub fn set(&mut self, index: usize, orientation: Orientation) {
        self.0[index] = orientation;
    }

    pub fn flip(&mut self, index: usize) {
        self.0[index] = self.0[index].flip();
    }

    /// Flip the contigs placed in `tour`
    pub fn flip_tour(&mut self, tour: &Tour) {
        for tig in tour.tigs() {
            self.flip(tig.index);
        }
    }

}

/// Outcome of a flip pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipTag {
    Accept,
    Reject,
}

impl fmt::Display for FlipTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlipTag::Accept => write!(f, "ACCEPT"),
            FlipTag::Reject => write!(f, "REJECT"),
        }
    }
}

/// Eigenvector of the largest (algebraic) eigenvalue of a symmetric matrix.
///
/// Solved exactly with a symmetric eigendecomposition. The sign is fixed so
/// that the component of largest magnitude is positive. A matrix with no
/// entries gives the all-ones vector.
pub fn dominant_eigenvector(o: &Array2<f64>) -> Array1<f64> {
    let n = o.nrows();
    if n == 0 {
        return Array1::zeros(0);
    }
    if o.iter().all(|&x| x == 0.0) {
        return Array1::ones(n);
    }

    let eigen = SymmetricEigen::new(DMatrix::from_fn(n, n, |i, j| o[[i, j]]));
    let top = eigen
        .eigenvalues
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map_or(0, |(i, _)| i);
    debug!(
        "Largest eigenvalue {:.5} of {} x {} orientation matrix",
        eigen.eigenvalues[top], n, n
    );
    let mut v: Array1<f64> = eigen.eigenvectors.column(top).iter().copied().collect();
    let anchor = v
        .iter()
        .copied()
        .fold(0.0, |best: f64, x| if x.abs() > best.abs() { x } else { best });
    if anchor < 0.0 {
        v.mapv_inplace(|x| -x);
    }
    v
}

/// Signs from the dominant eigenvector of the strandedness-weighted link
/// matrix over the active contigs. Inactive contigs stay `+`.
pub fn spectral_signs(store: &ContactStore, active: &ActiveSet) -> Signs {
    let mut signs = Signs::all_forward(store.len());
    let members: Vec<usize> = active.active_indices().collect();
    if members.is_empty() {
        return signs;
    }
    let v = dominant_eigenvector(&store.orientation_matrix(&members));
    for (&index, &component) in members.iter().zip(v.iter()) {
        if component < 0.0 {
            signs.set(index, Orientation::Reverse);
        }
    }
    let reversed = members
        .iter()
        .filter(|&&i| signs.get(i) == Orientation::Reverse)
        .count();
    info!(
        "Spectral init: {} of {} active contigs reversed",
        reversed,
        members.len()
    );
    signs
}

/// Flip every contig in the tour at once; keep it only on strict improvement
pub fn flip_whole(tour: &Tour, store: &ContactStore, signs: &mut Signs) -> FlipTag {
    let before = tour.evaluate_oriented(store, signs);
    signs.flip_tour(tour);
    let after = tour.evaluate_oriented(store, signs);
    let tag = if after > before {
        FlipTag::Accept
    } else {
        signs.flip_tour(tour);
        FlipTag::Reject
    };
    debug!("FLIPWHOLE: {:.5} -> {:.5} {}", before, after, tag);
    tag
}

/// Try flipping each contig in turn, skipping the first tour position.
/// Accepts if at least one flip strictly improved the score.
pub fn flip_one(tour: &Tour, store: &ContactStore, signs: &mut Signs) -> FlipTag {
    let mut score = tour.evaluate_oriented(store, signs);
    let mut tag = FlipTag::Reject;
    for tig in tour.tigs().iter().skip(1) {
        signs.flip(tig.index);
        let new_score = tour.evaluate_oriented(store, signs);
        if new_score > score {
            debug!("FLIPONE: tig {} {:.5} -> {:.5}", tig.index, score, new_score);
            score = new_score;
            tag = FlipTag::Accept;
        } else {
            signs.flip(tig.index);
        }
    }
    tag
}

/// Where the orientation search currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrientationState {
    SpectralInit,
    LocalRefine { phase: usize },
    Converged { phases: usize },
}

/// Two-state orientation search: one spectral initialisation followed by
/// rounds of whole-tour and single-contig flips.
#[derive(Debug, Clone)]
pub struct OrientationOptimizer {
    state: OrientationState,
    max_phases: usize,
}

impl OrientationOptimizer {
    pub fn new(max_phases: usize) -> Self {
        Self {
            state: OrientationState::SpectralInit,
            max_phases,
        }
    }

    /// Start in local refinement with the given signs (hot start)
    pub fn resumed(max_phases: usize) -> Self {
        Self {
            state: OrientationState::LocalRefine { phase: 1 },
            max_phases,
        }
    }

    pub fn state(&self) -> OrientationState {
        self.state
    }

    pub fn initialize(&mut self, store: &ContactStore, active: &ActiveSet) -> Signs {
        let signs = spectral_signs(store, active);
        self.state = OrientationState::LocalRefine { phase: 1 };
        signs
    }

    /// One refinement phase. `on_pass` receives the trace label after each
    /// flip pass. Returns the new state.
    pub fn refine_phase<F>(
        &mut self,
        tour: &Tour,
        store: &ContactStore,
        signs: &mut Signs,
        mut on_pass: F,
    ) -> Result<OrientationState>
    where
        F: FnMut(&str, &Signs) -> Result<()>,
    {
        let phase = match self.state {
            OrientationState::LocalRefine { phase } => phase,
            other => return Ok(other),
        };

        let whole = flip_whole(tour, store, signs);
        on_pass(&format!("FLIPWHOLE{}", phase), signs)?;
        let one = flip_one(tour, store, signs);
        on_pass(&format!("FLIPONE{}", phase), signs)?;
        info!("Orientation phase {}: FLIPWHOLE {} FLIPONE {}", phase, whole, one);

        self.state = if whole == FlipTag::Reject && one == FlipTag::Reject {
            OrientationState::Converged { phases: phase }
        } else if phase >= self.max_phases {
            info!("Orientation search stopped at the {} phase cap", self.max_phases);
            OrientationState::Converged { phases: phase }
        } else {
            OrientationState::LocalRefine { phase: phase + 1 }
        };
        Ok(self.state)
    }

    /// Refine until both passes reject or the phase cap is reached.
    /// Returns the number of phases run.
    pub fn refine<F>(
        &mut self,
        tour: &Tour,
        store: &ContactStore,
        signs: &mut Signs,
        mut on_pass: F,
    ) -> Result<usize>
    where
        F: FnMut(&str, &Signs) -> Result<()>,
    {
        loop {
            match self.refine_phase(tour, store, signs, &mut on_pass)? {
                OrientationState::Converged { phases } => return Ok(phases),
                OrientationState::SpectralInit => return Ok(0),
                OrientationState::LocalRefine { .. } => {}
            }
        }
    }
}
