//! Validation utilities for the Inventory Management System

use rust_decimal::Decimal;

/// Maximum accepted upload size for images (5 MiB).
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Content types the media center accepts.
pub const ALLOWED_IMAGE_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

/// Validate the content type of an uploaded image.
pub fn validate_image_content_type(content_type: &str) -> Result<(), &'static str> {
    if ALLOWED_IMAGE_TYPES.contains(&content_type) {
        Ok(())
    } else {
        Err("Only JPEG and PNG images are allowed")
    }
}

/// Validate the byte size of an uploaded image.
pub fn validate_image_size(size: usize) -> Result<(), &'static str> {
    if size == 0 {
        return Err("Uploaded file is empty");
    }
    if size > MAX_IMAGE_BYTES {
        return Err("File size exceeds 5MB limit");
    }
    Ok(())
}

/// Validate that a monetary amount is non-negative.
pub fn validate_amount(amount: Decimal) -> Result<(), &'static str> {
    if amount < Decimal::ZERO {
        Err("Amount cannot be negative")
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_jpeg_and_png_only() {
        assert!(validate_image_content_type("image/jpeg").is_ok());
        assert!(validate_image_content_type("image/png").is_ok());
        assert!(validate_image_content_type("image/gif").is_err());
        assert!(validate_image_content_type("application/pdf").is_err());
    }

    #[test]
    fn rejects_oversized_and_empty_uploads() {
        assert!(validate_image_size(1).is_ok());
        assert!(validate_image_size(MAX_IMAGE_BYTES).is_ok());
        assert!(validate_image_size(MAX_IMAGE_BYTES + 1).is_err());
        assert!(validate_image_size(0).is_err());
    }

    #[test]
    fn negative_amounts_are_rejected() {
        assert!(validate_amount(Decimal::new(-1, 2)).is_err());
        assert!(validate_amount(Decimal::ZERO).is_ok());
        assert!(validate_amount(Decimal::new(45000, 2)).is_ok());
    }
}
