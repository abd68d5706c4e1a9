//! Batch transfer: every tensor leaf of a collection to one device.

use crate::collection::{ApplyError, LeafTypes, Value, apply_to_collection};

use super::{Device, Tensor, Transfer, TransferError};

/// Moves every `T` leaf of `batch` to `device`.
///
/// A copy is requested as [`Transfer::NonBlocking`] when the tensor reports
/// [`Tensor::supports_non_blocking`], and as [`Transfer::Blocking`]
/// otherwise. Every other node stays unchanged and in place.
///
/// # Errors
///
/// Returns [`ApplyError::Function`] with the first [`TransferError`] raised
/// by a tensor, in depth-first order.
pub fn move_batch_to_device<T: Tensor>(
    batch: Value,
    device: &Device,
) -> Result<Value, ApplyError<TransferError>> {
    let span = tracing::debug_span!(
        "move_batch_to_device",
        device = %device,
        tensor = std::any::type_name::<T>()
    );
    let _guard = span.enter();

    let mut moved = 0_usize;
    let result: Result<Value, ApplyError<TransferError>> =
        apply_to_collection(batch, &LeafTypes::of::<T>(), |leaf| {
            let tensor = match leaf.into_leaf::<T>() {
                Ok(tensor) => tensor,
                Err(other) => return Ok(other),
            };
            let from = tensor.device();
            let transfer = transfer_mode(&tensor);
            let relocated = tensor.to_device(device, transfer)?;
            tracing::trace!(%from, to = %device, %transfer, "moved tensor");
            moved += 1;
            Ok(Value::leaf(relocated))
        });

    match &result {
        Ok(_) => tracing::debug!(moved, "batch transfer finished"),
        Err(error) => tracing::debug!(moved, error = %error, "batch transfer failed"),
    }
    result
}

fn transfer_mode<T: Tensor>(tensor: &T) -> Transfer {
    if tensor.supports_non_blocking() {
        Transfer::NonBlocking
    } else {
        Transfer::Blocking
    }
}

/// Alias of [`move_batch_to_device`].
///
/// # Errors
///
/// See [`move_batch_to_device`].
#[inline]
pub fn transfer_batch_to_device<T: Tensor>(
    batch: Value,
    device: &Device,
) -> Result<Value, ApplyError<TransferError>> {
    move_batch_to_device::<T>(batch, device)
}
