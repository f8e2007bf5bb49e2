use crate::error::{Result, ScaffoldError};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Lower exponent of the golden-ratio histogram (phi^18 ~ 5778)
pub const LB: i64 = 18;
/// Upper exponent of the golden-ratio histogram (phi^29 ~ 1149851)
pub const UB: i64 = 29;
/// Number of bins in a golden-ratio histogram
pub const BINS: usize = (UB - LB + 1) as usize;
/// Natural log of the golden ratio
pub const PHI: f64 = 0.481_211_825_059_668_4;

/// Representative distance of each golden-ratio bin, phi^LB .. phi^UB
pub const GR: [u64; BINS] = [
    5778, 9349, 15127, 24476, 39603, 64079, 103682, 167761, 271443, 439204, 710647, 1149851,
];
/// Harmonic-mean clamp, lower side
pub const GRLB: u64 = GR[0];
/// Harmonic-mean clamp, upper side
pub const GRUB: u64 = GR[BINS - 1];

/// How many scaled MADs away from the median counts as an outlier
pub const OUTLIER_THRESHOLD: f64 = 3.5;
/// Consistency constant relating MAD to a normal standard deviation
pub const MAD_SCALE: f64 = 0.6745;

/// Minimum contig size considered by the size prune
pub const MINSIZE: u64 = 10_000;
/// Contig sizes above this are capped when computing link density
pub const DENSITY_SIZE_CAP: u64 = 500_000;

/// Pairs further apart than this contribute nothing to a tour score
pub const LIMIT: f64 = 10_000_000.0;

/// Tunables for a single order-and-orientation run.
///
/// Every field has a default, so a JSON file only needs the keys it
/// wants to override.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Seed for the run's random number generator
    pub seed: u64,
    /// GA population size
    pub npop: usize,
    /// Generations without improvement before a GA phase stops
    pub ngen: usize,
    /// Hard cap on generations per GA phase
    pub max_generations: usize,
    /// Per-offspring mutation probability
    pub mutation_rate: f64,
    /// Per-offspring crossover probability (crossover is a no-op)
    pub crossover_rate: f64,
    /// Number of GA phases, each followed by a tour prune
    pub ga_phases: usize,
    /// Run the ordering GA at all
    pub run_ga: bool,
    /// Shuffle the initial tour before the first GA phase
    pub shuffle: bool,
    /// Hot start from the last snapshot of an existing tour file
    pub resume: bool,
    /// Prune weak contigs from the tour after every GA phase
    pub prune_tour: bool,
    /// Also drop contigs shorter than MINSIZE before optimization
    pub prune_by_size: bool,
    /// Hard cap on orientation refinement phases
    pub max_orientation_phases: usize,
    /// Worker threads for parallel evaluation
    pub threads: usize,
    /// Generations between trace snapshots, defaults to ngen / 10
    pub trace_interval: Option<usize>,
    /// Where to write the tour trace, defaults to `<clm stem>.tour`
    pub tour_file: Option<PathBuf>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            npop: 100,
            ngen: 5000,
            max_generations: 100_000,
            mutation_rate: 0.2,
            crossover_rate: 0.7,
            ga_phases: 2,
            run_ga: true,
            shuffle: true,
            resume: false,
            prune_tour: true,
            prune_by_size: false,
            max_orientation_phases: 100,
            threads: num_cpus::get(),
            trace_interval: None,
            tour_file: None,
        }
    }
}

impl OptimizerConfig {
    /// Load a (possibly partial) configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| ScaffoldError::io(path, e))?;
        let config: OptimizerConfig = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.npop == 0 {
            return Err(ScaffoldError::Config("npop must be positive".into()));
        }
        if self.ngen == 0 {
            return Err(ScaffoldError::Config("ngen must be positive".into()));
        }
        if self.max_generations == 0 {
            return Err(ScaffoldError::Config("max_generations must be positive".into()));
        }
        if self.threads == 0 {
            return Err(ScaffoldError::Config("threads must be positive".into()));
        }
        for (name, rate) in [
            ("mutation_rate", self.mutation_rate),
            ("crossover_rate", self.crossover_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(ScaffoldError::Config(format!(
                    "{} must be within [0, 1], got {}",
                    name, rate
                )));
            }
        }
        if self.trace_interval == Some(0) {
            return Err(ScaffoldError::Config("trace_interval must be positive".into()));
        }
        Ok(())
    }

    /// Generations between GA trace snapshots
    pub fn trace_every(&self) -> usize {
        self.trace_interval.unwrap_or(self.ngen / 10).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_golden_bounds_match_table() {
        assert_eq!(BINS, 12);
        assert_eq!(GRLB, 5778);
        assert_eq!(GRUB, 1149851);
        // phi^k rounds to the table entry
        for (i, &g) in GR.iter().enumerate() {
            let expected = (PHI * (LB + i as i64) as f64).exp().round() as u64;
            assert_eq!(expected, g);
        }
    }

    #[test]
    fn test_partial_json_overrides_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "npop": 12, "seed": 7, "shuffle": false }}"#).unwrap();

        let config = OptimizerConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.npop, 12);
        assert_eq!(config.seed, 7);
        assert!(!config.shuffle);
        assert_eq!(config.ngen, 5000);
        assert_eq!(config.trace_every(), 500);
    }

    #[test]
    fn test_validate_rejects_bad_rates() {
        let config = OptimizerConfig {
            mutation_rate: 1.5,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ScaffoldError::Config(_))));
    }
}
