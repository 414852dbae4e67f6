//! Gaussian-process regression surrogate with an ARD Matérn 5/2 kernel.
//!
//! Inputs are expected in unit-cube coordinates. Targets are standardised
//! before fitting; predictions come back in the original units.

use anyhow::{Result, bail};
use itertools::iproduct;
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

#[cfg(debug_assertions)]
use crate::config::DEBUG_FLAGS;
use crate::config::tuner::SurrogateSettings;
use crate::tuning::params::Point;
use crate::utils::maths_utils::mean_std;

const SQRT_5: f64 = 2.236_067_977_499_79;

fn matern52(a: &Point, b: &Point, length_scales: &Point) -> f64 {
    let r = a
        .iter()
        .zip(b)
        .zip(length_scales)
        .map(|((x, y), l)| ((x - y) / l).powi(2))
        .sum::<f64>()
        .sqrt();
    (1.0 + SQRT_5 * r + 5.0 * r * r / 3.0) * (-SQRT_5 * r).exp()
}

#[derive(Debug, Clone)]
pub struct GaussianProcess {
    x: Vec<Point>,
    length_scales: Point,
    /// Lower Cholesky factor of K + alpha·I
    chol_l: DMatrix<f64>,
    /// (K + alpha·I)⁻¹ · y_standardised
    weights: DVector<f64>,
    y_mean: f64,
    y_std: f64,
    log_likelihood: f64,
}

impl GaussianProcess {
    /// Fits one GP per length-scale combination on the grid and keeps the one
    /// with the highest log marginal likelihood.
    pub fn fit(x: &[Point], y: &[f64], settings: &SurrogateSettings) -> Result<Self> {
        if x.is_empty() || x.len() != y.len() {
            bail!(
                "Surrogate needs matching, non-empty inputs (got {} points, {} targets)",
                x.len(),
                y.len()
            );
        }
        if y.iter().any(|v| !v.is_finite()) {
            bail!("Surrogate targets must be finite");
        }

        let grid = settings.length_scale_grid;
        let candidates: Vec<Point> = iproduct!(grid, grid, grid)
            .map(|(&a, &b, &c)| [a, b, c])
            .collect();

        let best = candidates
            .par_iter()
            .filter_map(|scales| Self::fit_with_scales(x, y, *scales, settings.alpha))
            .max_by(|a, b| a.log_likelihood.total_cmp(&b.log_likelihood));

        let Some(gp) = best else {
            bail!("Surrogate kernel matrix was not positive definite for any length scale");
        };

        #[cfg(debug_assertions)]
        if DEBUG_FLAGS.print_surrogate {
            log::info!(
                "GP fit on {} points: length scales {:?}, log likelihood {:.3}",
                x.len(),
                gp.length_scales,
                gp.log_likelihood
            );
        }
        Ok(gp)
    }

    pub fn fit_with_scales(x: &[Point], y: &[f64], length_scales: Point, alpha: f64) -> Option<Self> {
        let n = x.len();
        let (y_mean, y_std) = mean_std(y);
        let y_std = if y_std > 0.0 { y_std } else { 1.0 };
        let y_norm = DVector::from_iterator(n, y.iter().map(|v| (v - y_mean) / y_std));

        let k = DMatrix::from_fn(n, n, |i, j| {
            matern52(&x[i], &x[j], &length_scales) + if i == j { alpha } else { 0.0 }
        });
        let chol = k.cholesky()?;
        let weights = chol.solve(&y_norm);
        let chol_l = chol.unpack();

        let log_det_half: f64 = chol_l.diagonal().iter().map(|d| d.ln()).sum();
        let log_likelihood = -0.5 * y_norm.dot(&weights)
            - log_det_half
            - 0.5 * n as f64 * (2.0 * std::f64::consts::PI).ln();

        log_likelihood.is_finite().then(|| Self {
            x: x.to_vec(),
            length_scales,
            chol_l,
            weights,
            y_mean,
            y_std,
            log_likelihood,
        })
    }

    /// Posterior (mean, standard deviation) at `point`, in target units.
    pub fn predict(&self, point: &Point) -> (f64, f64) {
        let k_star = DVector::from_iterator(
            self.x.len(),
            self.x.iter().map(|xi| matern52(xi, point, &self.length_scales)),
        );
        let mean = k_star.dot(&self.weights);
        let var = match self.chol_l.solve_lower_triangular(&k_star) {
            Some(v) => (1.0 - v.dot(&v)).max(0.0),
            None => 0.0,
        };
        (mean * self.y_std + self.y_mean, var.sqrt() * self.y_std)
    }

    pub fn length_scales(&self) -> Point {
        self.length_scales
    }

    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }
}
