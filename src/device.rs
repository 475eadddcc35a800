use serde::{Deserialize, Serialize};
use std::fmt;

/// Compute device a generator and its recurrent state are placed on.
///
/// All arithmetic in this crate runs on the CPU. [`Device::Cuda`] exists so
/// callers carrying a `use_cuda` flag can express their intent; asking for
/// it is reported as [`crate::error::GeneratorError::DeviceUnavailable`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    #[default]
    Cpu,
    Cuda,
}

impl Device {
    pub fn from_use_cuda(use_cuda: bool) -> Self {
        if use_cuda {
            Device::Cuda
        } else {
            Device::Cpu
        }
    }

    /// Whether this build can execute on the device.
    pub fn is_available(&self) -> bool {
        matches!(self, Device::Cpu)
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => write!(f, "cpu"),
            Device::Cuda => write!(f, "cuda"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_maps_to_device() {
        assert_eq!(Device::from_use_cuda(false), Device::Cpu);
        assert_eq!(Device::from_use_cuda(true), Device::Cuda);
        assert!(Device::Cpu.is_available());
        assert!(!Device::Cuda.is_available());
        assert_eq!(Device::Cuda.to_string(), "cuda");
    }
}
