use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use statrs::function::erf::erfc;
use strum_macros::{Display, EnumIter};

use crate::tuning::params::Point;
use crate::tuning::surrogate::GaussianProcess;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumIter, ValueEnum, Serialize, Deserialize,
)]
pub enum AcquisitionKind {
    /// Upper confidence bound: μ + κσ
    #[default]
    #[strum(to_string = "UCB")]
    Ucb,
    /// Expected improvement over the best score so far
    #[strum(to_string = "EI")]
    Ei,
}

/// Scores candidate points for one surrogate. Higher is more promising.
pub struct Acquisition<'a> {
    pub kind: AcquisitionKind,
    pub gp: &'a GaussianProcess,
    pub kappa: f64,
    pub xi: f64,
    pub best_y: f64,
}

fn std_normal_cdf(z: f64) -> f64 {
    0.5 * erfc(-z / std::f64::consts::SQRT_2)
}

fn std_normal_pdf(z: f64) -> f64 {
    (-0.5 * z * z).exp() / (2.0 * std::f64::consts::PI).sqrt()
}

impl<'a> Acquisition<'a> {
    pub fn new(kind: AcquisitionKind, gp: &'a GaussianProcess, kappa: f64, xi: f64, best_y: f64) -> Self {
        Self {
            kind,
            gp,
            kappa,
            xi,
            best_y,
        }
    }

    pub fn score(&self, point: &Point) -> f64 {
        let (mean, std) = self.gp.predict(point);
        match self.kind {
            AcquisitionKind::Ucb => mean + self.kappa * std,
            AcquisitionKind::Ei => {
                let improvement = mean - self.best_y - self.xi;
                if std <= 0.0 {
                    return improvement.max(0.0);
                }
                let z = improvement / std;
                improvement * std_normal_cdf(z) + std * std_normal_pdf(z)
            }
        }
    }
}
