use crate::config::{OptimizerConfig, MINSIZE};
use crate::dist::runner::ParallelRunner;
use crate::error::{Result, ScaffoldError};
use crate::graph::contacts::ContactStore;
use crate::graph::genetic::GeneticOptimizer;
use crate::graph::orientation::{Orientation, OrientationOptimizer, Signs};
use crate::graph::prune::{prune_by_density, prune_by_size, prune_tour, ActiveSet};
use crate::graph::tour::{Tig, Tour};
use crate::io::clm::LoadReport;
use crate::io::sibling_with_extension;
use crate::io::tourfile::{backup_trace, read_last_snapshot, Snapshot, TourWriter};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// What a finished run produced
#[derive(Debug, Clone, Serialize)]
pub struct OptimizeSummary {
    pub trace_path: PathBuf,
    /// Final tour as `(contig name, orientation)`
    pub tour: Vec<(String, Orientation)>,
    /// Plain objective of the final order
    pub score: f64,
    /// Orientation-aware objective of the final order and signs
    pub oriented_score: f64,
    /// Contigs still active at the end
    pub active: usize,
    /// GA generations summed over all phases
    pub generations: usize,
    pub load: LoadReport,
    /// Settings the run used
    pub config: OptimizerConfig,
}

impl OptimizeSummary {
    /// `name+ name- ...` as written to the trace
    pub fn tokens(&self) -> Vec<String> {
        self.tour
            .iter()
            .map(|(name, o)| format!("{}{}", name, o))
            .collect()
    }

    /// Write the summary as pretty-printed JSON
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|e| ScaffoldError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)
            .map_err(|e| ScaffoldError::io(path, e.into()))?;
        writeln!(writer)
            .and_then(|_| writer.flush())
            .map_err(|e| ScaffoldError::io(path, e))?;
        info!("Run summary written to `{}`", path.display());
        Ok(())
    }
}

/// End-to-end order and orientation run over one contig group
pub struct Optimizer {
    config: OptimizerConfig,
    ids_path: Option<PathBuf>,
}

/// Mutable run state owned by the controlling thread
struct RunState {
    active: ActiveSet,
    tour: Tour,
    signs: Signs,
    orientation: OrientationOptimizer,
}

impl Optimizer {
    pub fn new(config: OptimizerConfig) -> Self {
        Self {
            config,
            ids_path: None,
        }
    }

    /// Use this catalog instead of the `.ids` sibling of the contact file
    pub fn with_ids(mut self, ids_path: impl Into<PathBuf>) -> Self {
        self.ids_path = Some(ids_path.into());
        self
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn trace_path(&self, clm_path: &Path) -> PathBuf {
        self.config
            .tour_file
            .clone()
            .unwrap_or_else(|| sibling_with_extension(clm_path, "tour"))
    }

    pub fn run(&self, clm_path: &Path) -> Result<OptimizeSummary> {
        let start = Instant::now();
        let config = &self.config;
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let runner = ParallelRunner::new(config.threads)?;
        info!("Random seed: {}, {} worker threads", config.seed, runner.threads());

        let ids_path = self
            .ids_path
            .clone()
            .unwrap_or_else(|| sibling_with_extension(clm_path, "ids"));
        let store = ContactStore::from_files(&ids_path, clm_path)?;
        let matrix = Arc::new(store.link_matrix());
        let trace_path = self.trace_path(clm_path);

        let resume = config.resume && trace_path.exists();
        if config.resume && !resume {
            warn!("Trace `{}` not found, starting fresh", trace_path.display());
        }
        let mut state = if resume {
            let snapshot = read_last_snapshot(&trace_path)?;
            let state = self.restore(&store, &snapshot, matrix, &trace_path)?;
            backup_trace(&trace_path)?;
            state
        } else {
            self.fresh_start(&store, matrix, &mut rng)
        };

        let mut writer = TourWriter::create(&trace_path)?;
        writer.write_tour("INIT", &store, &state.tour, &state.signs)?;
        info!("Initial score: {:.5}", state.tour.evaluate());

        let mut generations = 0;
        if config.run_ga {
            for phase in 1..=config.ga_phases {
                let evolution = GeneticOptimizer::new(config, &runner).evolve(
                    &state.tour,
                    phase,
                    &mut rng,
                    |label, best| writer.write_tour(label, &store, best, &state.signs),
                )?;
                generations += evolution.generations;
                state.tour = evolution.best;
                if config.prune_tour {
                    state.tour = prune_tour(&store, state.tour, &mut state.active, &runner);
                }
            }
        }

        let RunState {
            active,
            tour,
            mut signs,
            mut orientation,
        } = state;
        orientation.refine(&tour, &store, &mut signs, |label, s| {
            writer.write_tour(label, &store, &tour, s)
        })?;

        let summary = OptimizeSummary {
            trace_path: writer.path().to_path_buf(),
            tour: tour
                .tigs()
                .iter()
                .map(|t| (store.contig(t.index).name.clone(), signs.get(t.index)))
                .collect(),
            score: tour.evaluate(),
            oriented_score: tour.evaluate_oriented(&store, &signs),
            active: active.count(),
            generations,
            load: store.report(),
            config: config.clone(),
        };
        info!(
            "FINAL: {} tigs, score {:.5}, oriented score {:.5} ({:.2}s)",
            summary.tour.len(),
            summary.score,
            summary.oriented_score,
            start.elapsed().as_secs_f32()
        );
        Ok(summary)
    }

    /// Prune, lay out the active contigs and seed orientations spectrally
    fn fresh_start(&self, store: &ContactStore, matrix: Arc<Array2<u32>>, rng: &mut StdRng) -> RunState {
        let mut active = ActiveSet::all(store.len());
        prune_by_density(store, &mut active);
        if self.config.prune_by_size {
            prune_by_size(store, &mut active, MINSIZE);
        }
        active.report(store);

        let mut tour = Tour::from_active(store, &active, matrix);
        if self.config.shuffle {
            tour.shuffle(rng);
        }
        let mut orientation = OrientationOptimizer::new(self.config.max_orientation_phases);
        let signs = orientation.initialize(store, &active);
        RunState {
            active,
            tour,
            signs,
            orientation,
        }
    }

    /// Rebuild active set, order and signs from a trace snapshot
    fn restore(
        &self,
        store: &ContactStore,
        snapshot: &Snapshot,
        matrix: Arc<Array2<u32>>,
        trace_path: &Path,
    ) -> Result<RunState> {
        let mut active = ActiveSet::none(store.len());
        let mut signs = Signs::all_forward(store.len());
        let mut tigs = Vec::with_capacity(snapshot.tigs.len());
        for (name, orientation) in &snapshot.tigs {
            let index = match store.index_of(name) {
                Some(index) => index,
                None => {
                    warn!("Contig `{}` in tour is not in the catalog, skipped", name);
                    continue;
                }
            };
            if active.is_active(index) {
                warn!("Contig `{}` appears twice in tour, keeping the first", name);
                continue;
            }
            active.activate(index);
            signs.set(index, *orientation);
            tigs.push(Tig {
                index,
                size: store.contig(index).size,
            });
        }
        if tigs.is_empty() {
            return Err(ScaffoldError::Resume {
                path: trace_path.to_path_buf(),
                reason: "no contig of the last snapshot is in the catalog".into(),
            });
        }
        active.report(store);
        Ok(RunState {
            active,
            tour: Tour::new(tigs, matrix),
            signs,
            orientation: OrientationOptimizer::resumed(self.config.max_orientation_phases),
        })
    }
}
