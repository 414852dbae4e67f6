//! Stacked LSTM with a linear head on the final time step.

use candle_core::{IndexOp, Result, Tensor};
use candle_nn::rnn::{LSTM, LSTMConfig, RNN, lstm};
use candle_nn::{Linear, Module, VarBuilder, linear};

/// Shape of one forecaster. `output_dim` always equals `input_dim` here
/// (the model predicts the next full feature row).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelConfig {
    pub input_dim: usize,
    pub hidden_dim: usize,
    pub num_layers: usize,
    pub output_dim: usize,
}

impl ModelConfig {
    pub fn new(input_dim: usize, hidden_dim: usize, num_layers: usize) -> Self {
        Self {
            input_dim,
            hidden_dim,
            num_layers,
            output_dim: input_dim,
        }
    }
}

pub struct LstmForecaster {
    layers: Vec<LSTM>,
    head: Linear,
    config: ModelConfig,
}

impl LstmForecaster {
    pub fn new(config: ModelConfig, vb: VarBuilder) -> Result<Self> {
        let layers = (0..config.num_layers)
            .map(|i| {
                let in_dim = if i == 0 {
                    config.input_dim
                } else {
                    config.hidden_dim
                };
                lstm(
                    in_dim,
                    config.hidden_dim,
                    LSTMConfig::default(),
                    vb.pp(format!("layer_{i}")),
                )
            })
            .collect::<Result<Vec<_>>>()?;
        let head = linear(config.hidden_dim, config.output_dim, vb.pp("head"))?;
        Ok(Self {
            layers,
            head,
            config,
        })
    }

    pub fn config(&self) -> ModelConfig {
        self.config
    }
}

impl Module for LstmForecaster {
    /// `xs`: (batch, seq_len, input_dim) → (batch, output_dim)
    fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        let mut hidden = xs.clone();
        for layer in &self.layers {
            let states = layer.seq(&hidden)?;
            hidden = layer.states_to_tensor(&states)?;
        }
        let seq_len = hidden.dim(1)?;
        let last = hidden.i((.., seq_len - 1, ..))?.contiguous()?;
        self.head.forward(&last)
    }
}
