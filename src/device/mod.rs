//! Moving tensor leaves of a batch to a compute device.
//!
//! The tensor runtime is an external capability, modelled by the [`Tensor`]
//! trait. [`move_batch_to_device`] is [`apply_to_collection`] with "tensor of
//! type `T`" as the leaf predicate and "copy to `device`, non-blocking when
//! the memory allows it" as the function.
//!
//! [`HostTensor`] is a small in-memory implementation, useful for tests and
//! for callers without a real accelerator runtime.
//!
//! # Examples
//!
//! ```rust
//! use nestmap::collection::{Mapping, Value};
//! use nestmap::device::{move_batch_to_device, Device, HostTensor, Tensor};
//!
//! let batch = Value::from(
//!     Mapping::dict()
//!         .with("pixels", HostTensor::zeros(&[2, 3]).unwrap())
//!         .with("ids", vec![7_i64, 8]),
//! );
//!
//! let target: Device = "cuda:0".parse().unwrap();
//! let moved = move_batch_to_device::<HostTensor>(batch, &target).unwrap();
//!
//! let pixels = moved
//!     .as_mapping()
//!     .and_then(|mapping| mapping.get("pixels"))
//!     .and_then(Value::downcast_ref::<HostTensor>)
//!     .unwrap();
//! assert_eq!(pixels.device(), target);
//! ```
//!
//! [`apply_to_collection`]: crate::collection::apply_to_collection

mod error;
mod tensor;
mod transfer;

use std::fmt;
use std::str::FromStr;

pub use error::{DeviceParseError, TransferError};
pub use tensor::{HostTensor, Tensor, Transfer};
pub use transfer::{move_batch_to_device, transfer_batch_to_device};

/// A compute device a tensor can live on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Device {
    /// Host memory.
    #[default]
    Cpu,
    /// A CUDA device, by ordinal.
    Cuda(usize),
    /// A Metal device, by ordinal.
    Metal(usize),
}

impl Device {
    /// Returns `true` for devices other than the host.
    #[inline]
    #[must_use]
    pub const fn is_accelerator(&self) -> bool {
        !matches!(self, Self::Cpu)
    }

    /// Returns the device ordinal; the host has none.
    #[inline]
    #[must_use]
    pub const fn ordinal(&self) -> Option<usize> {
        match self {
            Self::Cpu => None,
            Self::Cuda(ordinal) | Self::Metal(ordinal) => Some(*ordinal),
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu => formatter.write_str("cpu"),
            Self::Cuda(ordinal) => write!(formatter, "cuda:{ordinal}"),
            Self::Metal(ordinal) => write!(formatter, "metal:{ordinal}"),
        }
    }
}

impl FromStr for Device {
    type Err = DeviceParseError;

    /// Parses `cpu`, `cuda`, `cuda:N`, `metal` or `metal:N` (case-insensitive).
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let error = || DeviceParseError {
            input: input.to_string(),
        };
        let normalized = input.trim().to_ascii_lowercase();
        let (backend, ordinal) = match normalized.split_once(':') {
            Some((backend, ordinal)) => (backend, Some(ordinal)),
            None => (normalized.as_str(), None),
        };
        let ordinal = ordinal
            .map(|ordinal| ordinal.parse::<usize>().map_err(|_| error()))
            .transpose()?;

        match (backend, ordinal) {
            ("cpu", None) => Ok(Self::Cpu),
            ("cuda", ordinal) => Ok(Self::Cuda(ordinal.unwrap_or(0))),
            ("metal", ordinal) => Ok(Self::Metal(ordinal.unwrap_or(0))),
            _ => Err(error()),
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Device {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Device {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
