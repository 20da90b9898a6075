//! Build-time image index (`manifest.json`) published next to the photos.
//!
//! When a host serves a manifest, discovery reads it instead of probing
//! numbered paths one by one.

use crate::constants::*;
use crate::error::{GalleryError, Result};
use crate::probe::join_url;
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub version: String,
    /// File names such as `l1.jpg`
    pub images: Vec<String>,
}

/// Split `l12.jpg` into its category and sequence number
pub fn parse_image_name(name: &str) -> Option<(Category, u32)> {
    let stem = name.strip_suffix(&format!(".{}", IMAGE_EXTENSION))?;
    let mut chars = stem.chars();
    let category = Category::from_code(chars.next()?)?;
    let digits = chars.as_str();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    match digits.parse::<u32>() {
        Ok(0) | Err(_) => None,
        Ok(n) => Some((category, n)),
    }
}

impl Manifest {
    /// Descriptors in category order, then sequence order.
    /// Malformed, duplicate and out-of-range entries are skipped.
    pub fn descriptors(&self, options: &ResolveOptions) -> Vec<ImageDescriptor> {
        let mut seen = HashSet::new();
        let mut entries: Vec<(Category, u32)> = Vec::with_capacity(self.images.len());

        for name in &self.images {
            match parse_image_name(name) {
                Some((category, n)) if n <= options.max_per_category => {
                    if seen.insert((category, n)) {
                        entries.push((category, n));
                    }
                }
                Some(_) => debug!(name = %name, "Manifest entry above max_per_category"),
                None => debug!(name = %name, "Skipping malformed manifest entry"),
            }
        }

        entries.sort();
        entries
            .into_iter()
            .map(|(c, n)| ImageDescriptor::new(&options.gallery_root, c, n))
            .collect()
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Index a local gallery directory the way the deploy step does
pub fn build_from_dir(dir: &Path) -> Result<Manifest> {
    let mut found: Vec<(Category, u32, String)> = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if let Some((category, n)) = parse_image_name(&name) {
            found.push((category, n, name));
        }
    }

    found.sort_by_key(|(c, n, _)| (*c, *n));

    info!(dir = %dir.display(), count = found.len(), "Built gallery manifest");
    Ok(Manifest {
        version: chrono::Local::now().format("%Y-%m-%d").to_string(),
        images: found.into_iter().map(|(_, _, name)| name).collect(),
    })
}

/// `/<root>/manifest.json`
pub fn manifest_path(gallery_root: &str) -> String {
    let root = gallery_root.trim_matches('/');
    if root.is_empty() {
        format!("/{}", MANIFEST_FILE)
    } else {
        format!("/{}/{}", root, MANIFEST_FILE)
    }
}

pub async fn fetch_http(client: &reqwest::Client, host: &str, gallery_root: &str) -> Result<Manifest> {
    let url = join_url(host, &manifest_path(gallery_root));
    let response = client
        .get(&url)
        .header(reqwest::header::CACHE_CONTROL, "no-cache")
        .send()
        .await?;
    if !response.status().is_success() {
        return Err(GalleryError::ManifestStatus(response.status().as_u16()));
    }
    Ok(response.json::<Manifest>().await?)
}

pub async fn read_local(root: &Path, gallery_root: &str) -> Result<Manifest> {
    let path = root.join(manifest_path(gallery_root).trim_start_matches('/'));
    let text = tokio::fs::read_to_string(&path).await?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_image_name() {
        assert_eq!(parse_image_name("l1.jpg"), Some((Category::Little, 1)));
        assert_eq!(parse_image_name("j42.jpg"), Some((Category::Junior, 42)));
        assert_eq!(parse_image_name("e0.jpg"), None);
        assert_eq!(parse_image_name("x1.jpg"), None);
        assert_eq!(parse_image_name("l1.png"), None);
        assert_eq!(parse_image_name("l.jpg"), None);
        assert_eq!(parse_image_name("l1a.jpg"), None);
        assert_eq!(parse_image_name("l+1.jpg"), None);
    }

    #[test]
    fn test_descriptors_skip_bad_entries() {
        let manifest = Manifest {
            version: "1".into(),
            images: vec![
                "j2.jpg".into(),
                "l3.jpg".into(),
                "l1.jpg".into(),
                "l1.jpg".into(),
                "e99.jpg".into(),
                "readme.txt".into(),
                "e5.jpg".into(),
            ],
        };
        let options = ResolveOptions { max_per_category: 60, ..Default::default() };
        let keys: Vec<String> = manifest.descriptors(&options).iter().map(|d| d.key()).collect();
        assert_eq!(keys, vec!["l-1", "l-3", "e-5", "j-2"]);
    }

    #[test]
    fn test_manifest_tolerates_missing_version() {
        let manifest: Manifest = serde_json::from_str(r#"{"images":["l1.jpg"]}"#).unwrap();
        assert_eq!(manifest.version, "");
        assert_eq!(manifest.images, vec!["l1.jpg"]);
    }

    #[test]
    fn test_build_from_dir_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let gallery = dir.path().join("gallery");
        std::fs::create_dir_all(gallery.join("j9.jpg")).unwrap();
        for name in ["e2.jpg", "l10.jpg", "l2.jpg", "notes.txt", "l3.png"] {
            std::fs::write(gallery.join(name), b"x").unwrap();
        }

        let manifest = build_from_dir(&gallery).unwrap();
        assert_eq!(manifest.images, vec!["l2.jpg", "l10.jpg", "e2.jpg"]);

        manifest.write_to(&gallery.join(MANIFEST_FILE)).unwrap();
        let rt = tokio::runtime::Runtime::new().unwrap();
        let read = rt.block_on(read_local(dir.path(), "gallery")).unwrap();
        assert_eq!(read, manifest);
    }

    #[test]
    fn test_manifest_path() {
        assert_eq!(manifest_path("gallery"), "/gallery/manifest.json");
        assert_eq!(manifest_path("/"), "/manifest.json");
    }
}
