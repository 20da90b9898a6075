//! Application constants and configuration

pub const DEFAULT_HOST: &str = "https://www.explorerselc.co.nz";
pub const DEFAULT_GALLERY_ROOT: &str = "gallery";
pub const MANIFEST_FILE: &str = "manifest.json";
pub const IMAGE_EXTENSION: &str = "jpg";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "Explorers Gallery";

/// Upper bound on sequence numbers probed per category
pub const DEFAULT_MAX_PER_CATEGORY: u32 = 60;
/// Consecutive misses that end a category scan
pub const DEFAULT_MISS_STREAK_LIMIT: u32 = 5;
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 10;

/// Decorative tilt is drawn from [-ROTATION_RANGE_DEG, ROTATION_RANGE_DEG]
pub const ROTATION_RANGE_DEG: f32 = 4.0;

/// Concurrent full-image downloads for the grid
pub const IMAGE_FETCH_CONCURRENCY: usize = 8;
