//! The tensor capability and a host-memory implementation.

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use super::{Device, TransferError};

/// How a copy between devices should be carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Transfer {
    /// Return once the copy has finished.
    #[default]
    Blocking,
    /// Return immediately; the runtime finishes the copy asynchronously.
    NonBlocking,
}

impl fmt::Display for Transfer {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blocking => formatter.write_str("blocking"),
            Self::NonBlocking => formatter.write_str("non-blocking"),
        }
    }
}

/// A tensor as seen by the batch helpers.
///
/// Implementations wrap whatever runtime owns the memory. The supertraits
/// make every `Tensor` a valid collection leaf.
pub trait Tensor: Clone + fmt::Debug + PartialEq + Send + Sync + 'static {
    /// The device holding the tensor's memory.
    fn device(&self) -> Device;

    /// Whether a non-blocking copy away from the current device is possible.
    fn supports_non_blocking(&self) -> bool;

    /// Returns a copy of the tensor on `device`.
    ///
    /// A `Transfer::NonBlocking` request is a permission, not a demand:
    /// implementations fall back to a blocking copy when the memory does not
    /// support asynchronous transfer.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError`] if the runtime cannot perform the copy.
    fn to_device(&self, device: &Device, transfer: Transfer) -> Result<Self, TransferError>;
}

/// A dense `f32` tensor in process memory that tracks a nominal device.
///
/// The data buffer is shared between copies; moving only changes the device
/// tag and records the transfer mode that was used.
#[derive(Debug, Clone, PartialEq)]
pub struct HostTensor {
    shape: SmallVec<[usize; 4]>,
    data: Arc<[f32]>,
    device: Device,
    pinned: bool,
    last_transfer: Option<Transfer>,
}

impl HostTensor {
    /// Creates a tensor on the host.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::ShapeOverflow`] if the element count of
    /// `shape` does not fit in `usize`, and [`TransferError::ShapeMismatch`]
    /// if `data.len()` differs from it.
    pub fn new(shape: &[usize], data: impl Into<Arc<[f32]>>) -> Result<Self, TransferError> {
        let data = data.into();
        let expected = element_count(shape)?;
        if data.len() != expected {
            return Err(TransferError::ShapeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            shape: SmallVec::from_slice(shape),
            data,
            device: Device::Cpu,
            pinned: false,
            last_transfer: None,
        })
    }

    /// Creates a zero-filled tensor on the host.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::ShapeOverflow`] if the element count of
    /// `shape` does not fit in `usize`.
    pub fn zeros(shape: &[usize]) -> Result<Self, TransferError> {
        let length = element_count(shape)?;
        Ok(Self {
            shape: SmallVec::from_slice(shape),
            data: vec![0.0; length].into(),
            device: Device::Cpu,
            pinned: false,
            last_transfer: None,
        })
    }

    /// Marks host memory as page-locked, enabling non-blocking copies.
    /// Has no effect on tensors that are not on the host.
    #[must_use]
    pub fn pin_memory(mut self) -> Self {
        self.pinned = self.device == Device::Cpu;
        self
    }

    /// Returns the shape.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Returns the elements in row-major order.
    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Returns `true` if the host memory is pinned.
    #[must_use]
    pub const fn is_pinned(&self) -> bool {
        self.pinned
    }

    /// Returns the mode of the copy that produced this tensor, if any.
    #[must_use]
    pub const fn last_transfer(&self) -> Option<Transfer> {
        self.last_transfer
    }
}

impl Tensor for HostTensor {
    fn device(&self) -> Device {
        self.device
    }

    fn supports_non_blocking(&self) -> bool {
        self.pinned || self.device.is_accelerator()
    }

    fn to_device(&self, device: &Device, transfer: Transfer) -> Result<Self, TransferError> {
        if self.device == *device {
            return Ok(self.clone());
        }
        let mode = match transfer {
            Transfer::NonBlocking if self.supports_non_blocking() => Transfer::NonBlocking,
            Transfer::NonBlocking | Transfer::Blocking => Transfer::Blocking,
        };
        Ok(Self {
            shape: self.shape.clone(),
            data: Arc::clone(&self.data),
            device: *device,
            pinned: false,
            last_transfer: Some(mode),
        })
    }
}

fn element_count(shape: &[usize]) -> Result<usize, TransferError> {
    shape
        .iter()
        .try_fold(1_usize, |count, &dimension| count.checked_mul(dimension))
        .ok_or_else(|| TransferError::ShapeOverflow {
            shape: shape.to_vec(),
        })
}

crate::leaf_value!(HostTensor);

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_new_checks_element_count() {
        assert!(HostTensor::new(&[2, 2], vec![1.0_f32, 2.0, 3.0, 4.0]).is_ok());
        assert_eq!(
            HostTensor::new(&[2, 3], vec![1.0_f32]),
            Err(TransferError::ShapeMismatch {
                expected: 6,
                actual: 1,
            })
        );
    }

    #[rstest]
    #[case(&[usize::MAX, 2])]
    #[case(&[1 << 63, 2])]
    #[case(&[1 << 32, 1 << 32, 1])]
    fn test_overflowing_shape_is_rejected(#[case] shape: &[usize]) {
        let expected: Result<HostTensor, TransferError> = Err(TransferError::ShapeOverflow {
            shape: shape.to_vec(),
        });
        assert_eq!(HostTensor::new(shape, Vec::<f32>::new()), expected);
        assert_eq!(HostTensor::zeros(shape), expected);
    }

    #[rstest]
    fn test_empty_shape_is_a_scalar() {
        let scalar = HostTensor::zeros(&[]).unwrap();
        assert_eq!(scalar.data().len(), 1);
        assert!(HostTensor::new(&[0, usize::MAX], Vec::<f32>::new()).is_ok());
    }

    #[rstest]
    fn test_zeros() {
        let tensor = HostTensor::zeros(&[2, 3]).unwrap();
        assert_eq!(tensor.shape(), &[2, 3]);
        assert_eq!(tensor.data().len(), 6);
        assert_eq!(tensor.device(), Device::Cpu);
    }

    #[rstest]
    #[case(false, Transfer::NonBlocking, Transfer::Blocking)]
    #[case(true, Transfer::NonBlocking, Transfer::NonBlocking)]
    #[case(true, Transfer::Blocking, Transfer::Blocking)]
    fn test_non_blocking_requires_pinned_host_memory(
        #[case] pinned: bool,
        #[case] requested: Transfer,
        #[case] expected: Transfer,
    ) {
        let tensor = HostTensor::zeros(&[4]).unwrap();
        let tensor = if pinned { tensor.pin_memory() } else { tensor };

        let moved = tensor.to_device(&Device::Cuda(0), requested).unwrap();
        assert_eq!(moved.device(), Device::Cuda(0));
        assert_eq!(moved.last_transfer(), Some(expected));
    }

    #[rstest]
    fn test_accelerator_to_host_is_non_blocking() {
        let on_gpu = HostTensor::zeros(&[1])
            .unwrap()
            .to_device(&Device::Cuda(0), Transfer::Blocking)
            .unwrap();
        let back = on_gpu.to_device(&Device::Cpu, Transfer::NonBlocking).unwrap();
        assert_eq!(back.device(), Device::Cpu);
        assert_eq!(back.last_transfer(), Some(Transfer::NonBlocking));
    }

    #[rstest]
    fn test_same_device_is_a_plain_copy() {
        let tensor = HostTensor::zeros(&[1]).unwrap();
        let moved = tensor.to_device(&Device::Cpu, Transfer::NonBlocking).unwrap();
        assert_eq!(moved, tensor);
    }

    #[rstest]
    fn test_move_shares_data() {
        let tensor = HostTensor::new(&[2], vec![1.0_f32, 2.0]).unwrap();
        let moved = tensor.to_device(&Device::Metal(0), Transfer::Blocking).unwrap();
        assert_eq!(moved.data(), tensor.data());
    }

    #[rstest]
    fn test_pin_memory_only_applies_on_host() {
        let on_gpu = HostTensor::zeros(&[1])
            .unwrap()
            .to_device(&Device::Cuda(0), Transfer::Blocking)
            .unwrap()
            .pin_memory();
        assert!(!on_gpu.is_pinned());
        assert!(HostTensor::zeros(&[1]).unwrap().pin_memory().is_pinned());
    }
}
