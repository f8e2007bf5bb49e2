use crate::config::{DENSITY_SIZE_CAP, MINSIZE};
use crate::dist::runner::ParallelRunner;
use crate::graph::contacts::ContactStore;
use crate::graph::tour::Tour;
use crate::stats::outlier_cutoff;
use tracing::info;

/// Which contigs are currently eligible for placement, by contig index.
///
/// Inactive contigs stay in the contact model; they are only left out of
/// tours and scores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSet {
    flags: Vec<bool>,
}

impl ActiveSet {
    pub fn all(n: usize) -> Self {
        Self { flags: vec![true; n] }
    }

    pub fn none(n: usize) -> Self {
        Self { flags: vec![false; n] }
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.flags[index]
    }

    pub fn activate(&mut self, index: usize) {
        self.flags[index] = true;
    }

    /// Returns true if the contig was active before
    pub fn deactivate(&mut self, index: usize) -> bool {
        std::mem::replace(&mut self.flags[index], false)
    }

    pub fn active_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.flags
            .iter()
            .enumerate()
            .filter(|(_, &active)| active)
            .map(|(i, _)| i)
    }

    pub fn count(&self) -> usize {
        self.flags.iter().filter(|&&a| a).count()
    }

    /// Log and return the number and total length of active contigs
    pub fn report(&self, store: &ContactStore) -> (usize, u64) {
        let (count, length) = self
            .active_indices()
            .fold((0, 0u64), |(n, len), i| (n + 1, len + store.contig(i).size));
        info!("Active contigs: {} (length={})", count, length);
        (count, length)
    }
}

/// log10 of links to other active contigs per base (size capped at 500 kb),
/// for every active contig. Returns the densities and the matching indices.
pub fn link_densities(store: &ContactStore, active: &ActiveSet) -> (Vec<f64>, Vec<usize>) {
    let mut links = vec![0u64; store.len()];
    for (pair, contact) in store.contacts() {
        if active.is_active(pair.a) && active.is_active(pair.b) {
            links[pair.a] += contact.links as u64;
            links[pair.b] += contact.links as u64;
        }
    }

    active
        .active_indices()
        .map(|i| {
            let size = store.contig(i).size.clamp(1, DENSITY_SIZE_CAP) as f64;
            ((links[i] as f64 / size).log10(), i)
        })
        .unzip()
}

/// Deactivate small contigs whose link density is a low outlier, repeating
/// until a pass removes nothing. Returns how many were deactivated.
pub fn prune_by_density(store: &ContactStore, active: &mut ActiveSet) -> usize {
    let mut total = 0;
    loop {
        let (densities, indices) = link_densities(store, active);
        let (lb, ub) = match outlier_cutoff(&densities) {
            Some(bounds) => bounds,
            None => {
                info!("Log10(link_densities) has no spread, nothing to prune");
                break;
            }
        };
        info!("Log10(link_densities) ~ [{:.5}, {:.5}]", lb, ub);

        let mut invalid = 0;
        for (&density, &i) in densities.iter().zip(&indices) {
            if density < lb && store.contig(i).size < MINSIZE * 10 {
                active.deactivate(i);
                invalid += 1;
            }
        }
        if invalid == 0 {
            break;
        }
        info!("Inactivated {} tigs with log10_density < {:.5}", invalid, lb);
        total += invalid;
    }
    total
}

/// Deactivate every contig shorter than `min_size`
pub fn prune_by_size(store: &ContactStore, active: &mut ActiveSet, min_size: u64) -> usize {
    let mut invalid = 0;
    for contig in store.contigs() {
        if contig.size < min_size && active.deactivate(contig.index) {
            invalid += 1;
        }
    }
    if invalid > 0 {
        info!("Inactivated {} tigs with size < {}", invalid, min_size);
    }
    invalid
}

/// log10 of the score lost by deleting each tour position, floored at -9
/// when removal costs nothing (or helps).
pub fn tour_log_deltas(tour: &Tour, runner: &ParallelRunner) -> Vec<f64> {
    let score = tour.evaluate();
    let positions: Vec<usize> = (0..tour.len()).collect();
    runner.run(&positions, |_, &pos| {
        let delta = score - tour.without(pos).evaluate();
        if delta > 1e-9 {
            delta.log10()
        } else {
            -9.0
        }
    })
}

/// Drop contigs that contribute unusually little to the tour score,
/// rebuilding the tour after every pass until nothing is removed.
pub fn prune_tour(
    store: &ContactStore,
    mut tour: Tour,
    active: &mut ActiveSet,
    runner: &ParallelRunner,
) -> Tour {
    loop {
        if tour.len() < 2 {
            break;
        }
        info!("Starting score: {:.5}", tour.evaluate());
        let log10ds = tour_log_deltas(&tour, runner);
        let (lb, ub) = match outlier_cutoff(&log10ds) {
            Some(bounds) => bounds,
            None => {
                info!("Log10(delta_score) has no spread, nothing to prune");
                break;
            }
        };
        info!("Log10(delta_score) ~ [{:.5}, {:.5}]", lb, ub);

        let mut invalid = 0;
        for (tig, &ld) in tour.tigs().iter().zip(&log10ds) {
            if ld < lb {
                active.deactivate(tig.index);
                invalid += 1;
            }
        }
        if invalid == 0 {
            break;
        }
        info!("Inactivated {} tigs with log10ds < {:.5}", invalid, lb);
        active.report(store);
        tour = tour.retain_active(active);
    }
    tour
}
