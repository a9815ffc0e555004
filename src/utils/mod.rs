//! Internal utility functions for imageops-expand.
//!
//! This module contains common functionality used across different image operations.

use crate::error::ExpandError;

/// Truncates a floating-point channel value into the `u8` range.
///
/// Values are clamped to `[0, 255]` first, then the fractional part is
/// dropped (no rounding).
///
/// # Arguments
///
/// * `value` - The channel value to convert
///
/// # Returns
///
/// The truncated channel value
#[inline]
pub fn truncate_channel(value: f64) -> u8 {
    value.clamp(0.0, 255.0) as u8
}

/// Validates that an image has non-zero dimensions.
///
/// # Arguments
///
/// * `width` - The width of the image
/// * `height` - The height of the image
///
/// # Returns
///
/// `Ok(())` if the dimensions are valid, otherwise [`ExpandError::EmptySource`]
pub fn validate_non_empty_image(width: u32, height: u32) -> Result<(), ExpandError> {
    if width == 0 || height == 0 {
        Err(ExpandError::EmptySource { width, height })
    } else {
        Ok(())
    }
}

/// Computes the dimensions of an image grown by the given margins.
///
/// Fails if either dimension no longer fits in `u32`, or if an RGBA8
/// buffer of that size cannot be addressed.
///
/// # Arguments
///
/// * `size` - The source dimensions (width, height)
/// * `horizontal` - Total columns added (`left + right`)
/// * `vertical` - Total rows added (`top + bottom`)
///
/// # Returns
///
/// The expanded dimensions (width, height)
pub fn expanded_dimensions(
    size: (u32, u32),
    horizontal: u64,
    vertical: u64,
) -> Result<(u32, u32), ExpandError> {
    let (width, height) = size;
    let too_large = ExpandError::CanvasTooLarge {
        width,
        height,
        horizontal,
        vertical,
    };

    let new_width = u64::from(width)
        .checked_add(horizontal)
        .and_then(|w| u32::try_from(w).ok())
        .ok_or_else(|| too_large.clone())?;
    let new_height = u64::from(height)
        .checked_add(vertical)
        .and_then(|h| u32::try_from(h).ok())
        .ok_or_else(|| too_large.clone())?;

    (new_width as usize)
        .checked_mul(new_height as usize)
        .and_then(|pixels| pixels.checked_mul(4))
        .ok_or(too_large)?;

    Ok((new_width, new_height))
}
