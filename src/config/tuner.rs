//! Bayesian optimisation configuration

/// Inclusive search range for one hyperparameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    pub low: f64,
    pub high: f64,
}

impl Bound {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn width(&self) -> f64 {
        self.high - self.low
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.low, self.high)
    }

    /// Maps `value` into [0, 1] relative to this bound.
    pub fn to_unit(&self, value: f64) -> f64 {
        (value - self.low) / self.width()
    }

    pub fn from_unit(&self, unit: f64) -> f64 {
        self.low + unit * self.width()
    }
}

/// The three tunable dimensions
pub struct SearchSpace {
    pub hidden_dim: Bound,
    pub num_layers: Bound,
    pub learning_rate: Bound,
}

/// Gaussian-process surrogate settings
pub struct SurrogateSettings {
    /// Noise added to the kernel diagonal
    pub alpha: f64,
    /// Candidate length scales (in unit-cube coordinates) searched per dimension
    pub length_scale_grid: &'static [f64],
}

/// Acquisition maximisation settings
pub struct AcquisitionSettings {
    /// Exploration weight for the upper confidence bound
    pub kappa: f64,
    /// Exploration margin for expected improvement
    pub xi: f64,
    /// Random candidates scored before local refinement
    pub n_warmup: usize,
    /// Best warm-up candidates refined by pattern search
    pub n_refine_seeds: usize,
    /// Pattern search iterations per seed
    pub refine_iters: usize,
}

pub struct TunerConfig {
    pub init_points: usize,
    pub n_iter: usize,
    pub random_state: u64,
    pub space: SearchSpace,
    pub surrogate: SurrogateSettings,
    pub acquisition: AcquisitionSettings,
}

pub const TUNER: TunerConfig = TunerConfig {
    init_points: 10,
    n_iter: 30,
    random_state: 1,
    space: SearchSpace {
        hidden_dim: Bound::new(1.0, 100.0),
        num_layers: Bound::new(1.0, 5.0),
        learning_rate: Bound::new(0.0001, 0.01),
    },
    surrogate: SurrogateSettings {
        alpha: 1e-6,
        length_scale_grid: &[0.05, 0.1, 0.2, 0.4, 0.8, 1.6, 3.2],
    },
    acquisition: AcquisitionSettings {
        kappa: 2.576,
        xi: 0.0,
        n_warmup: 10_000,
        n_refine_seeds: 10,
        refine_iters: 30,
    },
};
