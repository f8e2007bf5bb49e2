use crate::config::OptimizerConfig;
use crate::dist::runner::ParallelRunner;
use crate::error::Result;
use crate::graph::tour::Tour;
use rand::Rng;
use tracing::{debug, info};

/// Contestants drawn per tournament
pub const TOURNAMENT_SIZE: usize = 3;

/// Result of one GA phase
#[derive(Debug, Clone)]
pub struct Evolution {
    pub best: Tour,
    /// Objective of `best` (larger is better)
    pub score: f64,
    pub generations: usize,
}

/// Generational GA over tour permutations.
///
/// Fitness is the negated tour objective and is minimised. Offspring are
/// evaluated on the worker pool; selection, bookkeeping and trace output
/// stay on the calling thread.
pub struct GeneticOptimizer<'a> {
    config: &'a OptimizerConfig,
    runner: &'a ParallelRunner,
}

impl<'a> GeneticOptimizer<'a> {
    pub fn new(config: &'a OptimizerConfig, runner: &'a ParallelRunner) -> Self {
        Self { config, runner }
    }

    /// Evolve from `start` until the best tour has not improved for `ngen`
    /// generations or `max_generations` is hit. `on_trace` is called with
    /// the label `GA{phase}-{gen}-{score}` and the best tour every
    /// `trace_every()` generations.
    pub fn evolve<R, F>(&self, start: &Tour, phase: usize, rng: &mut R, mut on_trace: F) -> Result<Evolution>
    where
        R: Rng + ?Sized,
        F: FnMut(&str, &Tour) -> Result<()>,
    {
        let start_score = start.evaluate();
        if start.len() < 2 {
            return Ok(Evolution {
                best: start.clone(),
                score: start_score,
                generations: 0,
            });
        }

        let npop = self.config.npop;
        info!(
            "GA{} setup: npop={} ngen={} mutpb={} cxpb={} tigs={}",
            phase,
            npop,
            self.config.ngen,
            self.config.mutation_rate,
            self.config.crossover_rate,
            start.len()
        );

        let mut population: Vec<Tour> = Vec::with_capacity(npop);
        population.push(start.clone());
        while population.len() < npop {
            let mut t = start.clone();
            t.mutate(rng);
            population.push(t);
        }
        let mut fitness = self.evaluate(&population);

        let (mut best, mut best_fitness) = match argmin(&fitness) {
            Some(i) => (population[i].clone(), fitness[i]),
            None => (start.clone(), start.fitness()),
        };
        let trace_every = self.config.trace_every();
        let mut last_improved = 0;
        let mut generation = 0;

        loop {
            generation += 1;

            let mut offspring: Vec<Tour> = (0..npop)
                .map(|_| population[tournament(&fitness, rng)].clone())
                .collect();
            for i in (1..offspring.len()).step_by(2) {
                if rng.gen::<f64>() < self.config.crossover_rate {
                    let (left, right) = offspring.split_at_mut(i);
                    left[i - 1].crossover(&right[0], rng);
                }
            }
            for t in offspring.iter_mut() {
                if rng.gen::<f64>() < self.config.mutation_rate {
                    t.mutate(rng);
                }
            }

            fitness = self.evaluate(&offspring);
            population = offspring;

            if let Some(i) = argmin(&fitness) {
                if fitness[i] < best_fitness {
                    best_fitness = fitness[i];
                    best = population[i].clone();
                    last_improved = generation;
                    debug!("GA{} gen {}: new best {:.5}", phase, generation, -best_fitness);
                }
            }

            if generation % trace_every == 0 {
                let label = format!("GA{}-{}-{:.5}", phase, generation, -best_fitness);
                info!("{}", label);
                on_trace(&label, &best)?;
            }

            if generation - last_improved > self.config.ngen {
                info!(
                    "GA{} converged: no improvement for {} generations (gen {})",
                    phase, self.config.ngen, generation
                );
                break;
            }
            if generation >= self.config.max_generations {
                info!("GA{} stopped at the {} generation cap", phase, generation);
                break;
            }
        }

        Ok(Evolution {
            score: -best_fitness,
            best,
            generations: generation,
        })
    }

    fn evaluate(&self, population: &[Tour]) -> Vec<f64> {
        self.runner.run(population, |_, t| t.fitness())
    }
}

fn argmin(values: &[f64]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
}

/// Index of the fittest of `TOURNAMENT_SIZE` draws with replacement
fn tournament<R: Rng + ?Sized>(fitness: &[f64], rng: &mut R) -> usize {
    let mut winner = rng.gen_range(0..fitness.len());
    for _ in 1..TOURNAMENT_SIZE {
        let challenger = rng.gen_range(0..fitness.len());
        if fitness[challenger] < fitness[winner] {
            winner = challenger;
        }
    }
    winner
}
