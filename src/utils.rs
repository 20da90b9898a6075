//! Utility functions

use crate::constants::APP_NAME;
use std::path::PathBuf;

/// Get the app data directory path
pub fn get_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Get the cache directory path
pub fn get_cache_dir() -> PathBuf {
    get_data_dir().join("cache")
}

/// Remove cached photos so the next pass fetches fresh copies
pub fn clear_image_cache(cache_dir: &std::path::Path) {
    let images = cache_dir.join("images");
    if images.exists() {
        if let Err(e) = std::fs::remove_dir_all(&images) {
            tracing::warn!(error = %e, "Failed to clear image cache");
        }
    }
}

/// Format a photo count for status lines
pub fn format_count(count: usize) -> String {
    match count {
        1 => "1 photo".to_string(),
        n => format!("{} photos", n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0 photos");
        assert_eq!(format_count(1), "1 photo");
        assert_eq!(format_count(12), "12 photos");
    }

    #[test]
    fn test_clear_image_cache() {
        let dir = tempfile::tempdir().unwrap();
        let images = dir.path().join("images");
        std::fs::create_dir_all(&images).unwrap();
        std::fs::write(images.join("l1.jpg"), b"x").unwrap();
        clear_image_cache(dir.path());
        assert!(!images.exists());
        // Second call on a missing dir is a no-op
        clear_image_cache(dir.path());
    }
}
