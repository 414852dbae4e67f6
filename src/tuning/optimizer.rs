use std::time::{Duration, Instant};

use anyhow::{Result, bail};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

#[cfg(debug_assertions)]
use crate::config::DEBUG_FLAGS;
use crate::config::tuner::{AcquisitionSettings, SearchSpace, SurrogateSettings, TunerConfig};
use crate::tuning::acquisition::{Acquisition, AcquisitionKind};
use crate::tuning::params::{HyperParams, N_DIMS, Point, point_from_unit, point_to_unit};
use crate::tuning::surrogate::GaussianProcess;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum TrialPhase {
    Random,
    Guided,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    /// 1-based position in the run
    pub index: usize,
    pub phase: TrialPhase,
    /// Raw proposal in original units (what the surrogate is fit on)
    pub point: Point,
    pub params: HyperParams,
    /// Objective value; higher is better
    pub score: f64,
    pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct TuneResult {
    pub best: Trial,
    pub trials: Vec<Trial>,
}

pub struct BayesianOptimizer<'a> {
    space: &'a SearchSpace,
    surrogate: &'a SurrogateSettings,
    acquisition: &'a AcquisitionSettings,
    kind: AcquisitionKind,
    init_points: usize,
    n_iter: usize,
    rng: StdRng,
}

impl<'a> BayesianOptimizer<'a> {
    pub fn new(config: &'a TunerConfig, kind: AcquisitionKind) -> Self {
        Self {
            space: &config.space,
            surrogate: &config.surrogate,
            acquisition: &config.acquisition,
            kind,
            init_points: config.init_points,
            n_iter: config.n_iter,
            rng: StdRng::seed_from_u64(config.random_state),
        }
    }

    /// Overrides the number of random and guided trials.
    pub fn with_budget(mut self, init_points: usize, n_iter: usize) -> Self {
        self.init_points = init_points;
        self.n_iter = n_iter;
        self
    }

    pub fn total_trials(&self) -> usize {
        self.init_points + self.n_iter
    }

    fn random_unit(&mut self) -> Point {
        let mut p = [0.0; N_DIMS];
        for v in p.iter_mut() {
            *v = self.rng.r#gen::<f64>();
        }
        p
    }

    fn is_duplicate(candidate: &Point, seen: &[Point]) -> bool {
        seen.iter().any(|s| {
            s.iter()
                .zip(candidate)
                .all(|(a, b)| (a - b).abs() < 1e-9)
        })
    }

    /// Best unit-cube point for the current surrogate: many random candidates
    /// scored in parallel, then the top few refined by a bounded pattern search.
    fn suggest(&mut self, trials: &[Trial]) -> Result<Point> {
        let x: Vec<Point> = trials
            .iter()
            .map(|t| point_to_unit(&t.point, self.space))
            .collect();
        let y: Vec<f64> = trials.iter().map(|t| t.score).collect();
        let best_y = y.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let gp = GaussianProcess::fit(&x, &y, self.surrogate)?;
        let acq = Acquisition::new(
            self.kind,
            &gp,
            self.acquisition.kappa,
            self.acquisition.xi,
            best_y,
        );

        // Candidates are drawn sequentially so the seeded sequence is reproducible
        let candidates: Vec<Point> = (0..self.acquisition.n_warmup)
            .map(|_| self.random_unit())
            .collect();
        let mut scored: Vec<(f64, Point)> = candidates
            .into_par_iter()
            .map(|p| (acq.score(&p), p))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        let refine_iters = self.acquisition.refine_iters;
        let best = scored
            .iter()
            .take(self.acquisition.n_refine_seeds)
            .map(|&(score, seed)| pattern_search(&acq, seed, score, refine_iters))
            .max_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, p)| p);

        let Some(mut unit) = best else {
            bail!("Acquisition search produced no candidates");
        };
        if Self::is_duplicate(&unit, &x) {
            log::info!("Proposal duplicates an earlier trial, using a random point instead");
            unit = self.random_unit();
        }
        Ok(unit)
    }

    /// Maximises `objective` over the search space.
    /// `on_trial` sees every trial as soon as it is scored.
    pub fn maximize<F, C>(&mut self, mut objective: F, mut on_trial: C) -> Result<TuneResult>
    where
        F: FnMut(&HyperParams) -> Result<f64>,
        C: FnMut(&Trial),
    {
        let total = self.total_trials();
        if total == 0 {
            bail!("Tuner budget must allow at least one trial");
        }
        let mut trials: Vec<Trial> = Vec::with_capacity(total);

        for index in 1..=total {
            let (phase, unit) = if index <= self.init_points || trials.is_empty() {
                (TrialPhase::Random, self.random_unit())
            } else {
                (TrialPhase::Guided, self.suggest(&trials)?)
            };
            let point = point_from_unit(&unit, self.space);
            let params = HyperParams::from_point(&point, self.space);

            let start = Instant::now();
            let score = objective(&params)?;
            if !score.is_finite() {
                bail!(
                    "Objective returned a non-finite score ({}) for trial {}",
                    score,
                    index
                );
            }
            let trial = Trial {
                index,
                phase,
                point,
                params,
                score,
                elapsed: start.elapsed(),
            };

            #[cfg(debug_assertions)]
            if DEBUG_FLAGS.print_trials {
                log::info!(
                    "Trial {:>2}/{} [{}] hidden={} layers={} lr={:.5} → score {:.6} ({:.1}s)",
                    index,
                    total,
                    trial.phase,
                    params.hidden_dim,
                    params.num_layers,
                    params.learning_rate,
                    score,
                    trial.elapsed.as_secs_f64()
                );
            }

            on_trial(&trial);
            trials.push(trial);
        }

        let best = trials
            .iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
            .cloned();
        let Some(best) = best else {
            bail!("No trials were run");
        };
        Ok(TuneResult { best, trials })
    }
}

/// Coordinate pattern search inside the unit cube: try ±step on each
/// dimension, move on improvement, halve the step otherwise.
fn pattern_search(acq: &Acquisition, start: Point, start_score: f64, iters: usize) -> (f64, Point) {
    let (mut best, mut best_score) = (start, start_score);
    let mut step = 0.1;
    for _ in 0..iters {
        let mut improved = false;
        for dim in 0..N_DIMS {
            for dir in [1.0, -1.0] {
                let mut candidate = best;
                candidate[dim] = (candidate[dim] + dir * step).clamp(0.0, 1.0);
                let score = acq.score(&candidate);
                if score > best_score {
                    best = candidate;
                    best_score = score;
                    improved = true;
                }
            }
        }
        if !improved {
            step *= 0.5;
            if step < 1e-6 {
                break;
            }
        }
    }
    (best_score, best)
}
