//! Error types for device handling.

use std::fmt;

use super::Device;

/// A device string could not be parsed.
///
/// # Examples
///
/// ```rust
/// use nestmap::device::Device;
///
/// let error = "tpu:0".parse::<Device>().unwrap_err();
/// assert_eq!(format!("{error}"), "invalid device `tpu:0`: expected cpu, cuda[:N] or metal[:N]");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceParseError {
    /// The rejected input.
    pub input: String,
}

impl fmt::Display for DeviceParseError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "invalid device `{}`: expected cpu, cuda[:N] or metal[:N]",
            self.input
        )
    }
}

impl std::error::Error for DeviceParseError {}

/// A tensor could not be created or moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    /// The runtime cannot reach the requested device.
    Unavailable(Device),
    /// The element count does not match the shape.
    ShapeMismatch {
        /// The element count implied by the shape.
        expected: usize,
        /// The element count supplied.
        actual: usize,
    },
    /// The element count of the shape does not fit in `usize`.
    ShapeOverflow {
        /// The rejected shape.
        shape: Vec<usize>,
    },
}

impl fmt::Display for TransferError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(device) => write!(formatter, "device {device} is not available"),
            Self::ShapeMismatch { expected, actual } => write!(
                formatter,
                "shape holds {expected} elements but {actual} were supplied"
            ),
            Self::ShapeOverflow { shape } => {
                write!(formatter, "shape {shape:?} holds more than usize::MAX elements")
            }
        }
    }
}

impl std::error::Error for TransferError {}
