use candle_core::Device;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// Where tensors live. Chosen once per run and passed explicitly.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumIter, ValueEnum, Serialize, Deserialize,
)]
pub enum ComputeDevice {
    #[default]
    #[strum(to_string = "CPU")]
    Cpu,
    #[strum(to_string = "CUDA")]
    Cuda,
}

impl ComputeDevice {
    /// CUDA falls back to the CPU when no GPU is present.
    pub fn to_candle(self) -> candle_core::Result<Device> {
        match self {
            ComputeDevice::Cpu => Ok(Device::Cpu),
            ComputeDevice::Cuda => {
                let device = Device::cuda_if_available(0)?;
                if device.is_cpu() {
                    log::warn!("⚠️  CUDA requested but unavailable, using CPU");
                }
                Ok(device)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_device() {
        assert!(ComputeDevice::Cpu.to_candle().unwrap().is_cpu());
        assert_eq!(ComputeDevice::default(), ComputeDevice::Cpu);
        assert_eq!(ComputeDevice::Cuda.to_string(), "CUDA");
    }
}
