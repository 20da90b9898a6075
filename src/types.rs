//! Common types and data structures

use crate::constants::*;
use crate::error::GalleryError;
use serde::{Deserialize, Serialize};

/// Age group a photo belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Little,
    Early,
    Junior,
}

impl Category {
    /// Scan order
    pub const ALL: [Category; 3] = [Category::Little, Category::Early, Category::Junior];

    /// Short code used in image file names
    pub fn code(self) -> char {
        match self {
            Category::Little => 'l',
            Category::Early => 'e',
            Category::Junior => 'j',
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Little => "Little Explorers",
            Category::Early => "Early Explorers",
            Category::Junior => "Junior Explorers",
        }
    }

    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'l' => Some(Category::Little),
            'e' => Some(Category::Early),
            'j' => Some(Category::Junior),
            _ => None,
        }
    }
}

/// Active category filter in the gallery view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    /// Filter tabs in display order
    pub const TABS: [CategoryFilter; 4] = [
        CategoryFilter::All,
        CategoryFilter::Only(Category::Little),
        CategoryFilter::Only(Category::Early),
        CategoryFilter::Only(Category::Junior),
    ];

    pub fn matches(self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => c == category,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CategoryFilter::All => "All",
            CategoryFilter::Only(c) => c.label(),
        }
    }
}

/// One discovered photo
#[derive(Debug, Clone, PartialEq)]
pub struct ImageDescriptor {
    /// Host-relative path, e.g. `/gallery/l3.jpg`
    pub path: String,
    pub category: Category,
    pub sequence_number: u32,
    /// Decorative tilt in degrees, reassigned on every resolution pass
    pub display_rotation: f32,
}

impl ImageDescriptor {
    pub fn new(gallery_root: &str, category: Category, sequence_number: u32) -> Self {
        Self {
            path: gallery_path(gallery_root, category, sequence_number),
            category,
            sequence_number,
            display_rotation: 0.0,
        }
    }

    /// Unique across the whole gallery
    pub fn key(&self) -> String {
        format!("{}-{}", self.category.code(), self.sequence_number)
    }

    pub fn file_name(&self) -> String {
        image_file_name(self.category, self.sequence_number)
    }

    pub fn alt_text(&self) -> String {
        format!("{} photo {}", self.category.label(), self.sequence_number)
    }
}

/// `<code><n>.jpg`
pub fn image_file_name(category: Category, sequence_number: u32) -> String {
    format!("{}{}.{}", category.code(), sequence_number, IMAGE_EXTENSION)
}

/// `/<root>/<code><n>.jpg`
pub fn gallery_path(gallery_root: &str, category: Category, sequence_number: u32) -> String {
    let root = gallery_root.trim_matches('/');
    let file = image_file_name(category, sequence_number);
    if root.is_empty() {
        format!("/{}", file)
    } else {
        format!("/{}/{}", root, file)
    }
}

/// How errored probes count toward a category's miss streak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MissPolicy {
    /// Errored probes are ordinary misses
    #[default]
    CountErrorsAsMisses,
    /// Errored probes consume their sequence number but leave the streak alone
    IgnoreErrors,
}

/// Parameters for one resolution pass
#[derive(Debug, Clone, PartialEq)]
pub struct ResolveOptions {
    pub gallery_root: String,
    pub max_per_category: u32,
    pub miss_streak_limit: u32,
    pub miss_policy: MissPolicy,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            gallery_root: DEFAULT_GALLERY_ROOT.to_string(),
            max_per_category: DEFAULT_MAX_PER_CATEGORY,
            miss_streak_limit: DEFAULT_MISS_STREAK_LIMIT,
            miss_policy: MissPolicy::default(),
        }
    }
}

impl ResolveOptions {
    pub fn validate(&self) -> Result<(), GalleryError> {
        if self.max_per_category == 0 {
            return Err(GalleryError::InvalidOptions(
                "max_per_category must be at least 1".into(),
            ));
        }
        if self.miss_streak_limit == 0 {
            return Err(GalleryError::InvalidOptions(
                "miss_streak_limit must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Where a resolved image list came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoverySource {
    Manifest,
    Probe,
}

impl DiscoverySource {
    pub fn label(self) -> &'static str {
        match self {
            DiscoverySource::Manifest => "manifest",
            DiscoverySource::Probe => "probe",
        }
    }
}

/// Result of a discovery pass
#[derive(Debug, Clone)]
pub struct Discovery {
    pub images: Vec<ImageDescriptor>,
    pub source: DiscoverySource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for c in Category::ALL {
            assert_eq!(Category::from_code(c.code()), Some(c));
        }
        assert_eq!(Category::from_code('x'), None);
    }

    #[test]
    fn test_category_order_follows_scan_order() {
        let mut shuffled = vec![Category::Junior, Category::Little, Category::Early];
        shuffled.sort();
        assert_eq!(shuffled, Category::ALL.to_vec());
    }

    #[test]
    fn test_gallery_path_normalizes_root() {
        assert_eq!(gallery_path("gallery", Category::Little, 3), "/gallery/l3.jpg");
        assert_eq!(gallery_path("/gallery/", Category::Junior, 12), "/gallery/j12.jpg");
        assert_eq!(gallery_path("", Category::Early, 1), "/e1.jpg");
    }

    #[test]
    fn test_descriptor_derived_fields() {
        let d = ImageDescriptor::new("gallery", Category::Early, 7);
        assert_eq!(d.key(), "e-7");
        assert_eq!(d.file_name(), "e7.jpg");
        assert_eq!(d.alt_text(), "Early Explorers photo 7");
    }

    #[test]
    fn test_zero_options_rejected() {
        let mut opts = ResolveOptions::default();
        assert!(opts.validate().is_ok());
        opts.max_per_category = 0;
        assert!(matches!(opts.validate(), Err(GalleryError::InvalidOptions(_))));
        opts.max_per_category = 10;
        opts.miss_streak_limit = 0;
        assert!(matches!(opts.validate(), Err(GalleryError::InvalidOptions(_))));
    }

    #[test]
    fn test_filter_matches() {
        assert!(CategoryFilter::All.matches(Category::Junior));
        assert!(CategoryFilter::Only(Category::Little).matches(Category::Little));
        assert!(!CategoryFilter::Only(Category::Little).matches(Category::Early));
    }
}
