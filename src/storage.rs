//! Store-by-key file storage for purchase bill images.

use crate::error::AppError;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Persist an uploaded bill image and return its storage key.
/// Keys look like `purchase-bills/<uuid>.<ext>` relative to the upload dir.
pub fn store_bill_image(
    upload_dir: &str,
    original_name: &str,
    bytes: &[u8],
) -> Result<String, AppError> {
    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("bin");

    let key = format!("purchase-bills/{}.{}", Uuid::new_v4(), ext);
    let full_path: PathBuf = Path::new(upload_dir).join(&key);

    if let Some(dir) = full_path.parent() {
        std::fs::create_dir_all(dir)
            .map_err(|e| AppError::Dependency(format!("Bill image upload failed: {}", e)))?;
    }
    std::fs::write(&full_path, bytes)
        .map_err(|e| AppError::Dependency(format!("Bill image upload failed: {}", e)))?;

    Ok(key)
}
