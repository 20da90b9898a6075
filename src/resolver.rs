//! Gallery resolution: discover numbered photos per category, then shuffle
//! and tilt them for display.

use crate::constants::*;
use crate::error::Result;
use crate::manifest;
use crate::probe::{is_http_host, probe_for_host, ExistenceProbe, ProbeOutcome};
use crate::types::*;
use rand::seq::SliceRandom;
use rand::Rng;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Outcome of scanning one category
#[derive(Debug, Clone)]
pub struct CategoryScan {
    pub category: Category,
    /// In probe order
    pub found: Vec<ImageDescriptor>,
    pub probed: u32,
    pub errors: u32,
}

/// Probe `<code>1`, `<code>2`, ... until `max_per_category` is passed or
/// `miss_streak_limit` consecutive misses accumulate.
pub async fn scan_category(
    probe: &dyn ExistenceProbe,
    category: Category,
    options: &ResolveOptions,
) -> CategoryScan {
    let mut scan = CategoryScan {
        category,
        found: Vec::new(),
        probed: 0,
        errors: 0,
    };
    let mut consecutive_misses = 0u32;

    for n in 1..=options.max_per_category {
        let descriptor = ImageDescriptor::new(&options.gallery_root, category, n);
        scan.probed += 1;

        match probe.probe(&descriptor.path).await {
            ProbeOutcome::Found => {
                scan.found.push(descriptor);
                consecutive_misses = 0;
            }
            ProbeOutcome::Missing => consecutive_misses += 1,
            ProbeOutcome::Failed(e) => {
                scan.errors += 1;
                debug!(path = %descriptor.path, error = %e, "Probe failed");
                if options.miss_policy == MissPolicy::CountErrorsAsMisses {
                    consecutive_misses += 1;
                }
            }
        }

        if consecutive_misses >= options.miss_streak_limit {
            break;
        }
    }

    debug!(
        category = category.label(),
        found = scan.found.len(),
        probed = scan.probed,
        errors = scan.errors,
        "Category scan finished"
    );
    scan
}

/// Scan every category. Categories run concurrently; each category's own
/// probes stay sequential so its miss streak only sees its own outcomes.
pub async fn scan_all(probe: &dyn ExistenceProbe, options: &ResolveOptions) -> Vec<CategoryScan> {
    futures::future::join_all(
        Category::ALL
            .iter()
            .map(|&category| scan_category(probe, category, options)),
    )
    .await
}

/// Uniform shuffle, then a fresh tilt in [-ROTATION_RANGE_DEG, ROTATION_RANGE_DEG]
pub fn shuffle_and_tilt<R: Rng>(images: &mut [ImageDescriptor], rng: &mut R) {
    images.shuffle(rng);
    for image in images.iter_mut() {
        image.display_rotation = rng.random_range(-ROTATION_RANGE_DEG..=ROTATION_RANGE_DEG);
    }
}

/// One full resolution pass by probing
pub async fn resolve_gallery<R: Rng>(
    probe: &dyn ExistenceProbe,
    options: &ResolveOptions,
    rng: &mut R,
) -> Result<Vec<ImageDescriptor>> {
    options.validate()?;

    let scans = scan_all(probe, options).await;
    let errors: u32 = scans.iter().map(|s| s.errors).sum();
    let counts: Vec<(char, usize)> = scans
        .iter()
        .map(|s| (s.category.code(), s.found.len()))
        .collect();

    let mut images: Vec<ImageDescriptor> = scans.into_iter().flat_map(|s| s.found).collect();
    shuffle_and_tilt(&mut images, rng);

    info!(total = images.len(), per_category = ?counts, probe_errors = errors, "Gallery resolved");
    Ok(images)
}

/// Where photos are looked up: an HTTP host or a local directory
pub struct GallerySource {
    host: String,
    timeout: Duration,
}

impl GallerySource {
    pub fn new(host: impl Into<String>, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            timeout,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    async fn fetch_manifest(&self, gallery_root: &str) -> Result<manifest::Manifest> {
        if is_http_host(&self.host) {
            let client = reqwest::Client::builder().timeout(self.timeout).build()?;
            manifest::fetch_http(&client, &self.host, gallery_root).await
        } else {
            manifest::read_local(Path::new(&self.host), gallery_root).await
        }
    }

    fn probe(&self) -> Result<Box<dyn ExistenceProbe>> {
        probe_for_host(&self.host, self.timeout)
    }
}

/// Prefer the published manifest, fall back to probing numbered paths
pub async fn discover<R: Rng>(
    source: &GallerySource,
    options: &ResolveOptions,
    use_manifest: bool,
    rng: &mut R,
) -> Result<Discovery> {
    options.validate()?;

    if use_manifest {
        match source.fetch_manifest(&options.gallery_root).await {
            Ok(manifest) => {
                let mut images = manifest.descriptors(options);
                shuffle_and_tilt(&mut images, rng);
                info!(
                    host = %source.host(),
                    version = %manifest.version,
                    total = images.len(),
                    "Gallery resolved from manifest"
                );
                return Ok(Discovery {
                    images,
                    source: DiscoverySource::Manifest,
                });
            }
            Err(crate::error::GalleryError::Json(e)) => {
                warn!(error = %e, "Manifest is malformed, falling back to probing");
            }
            Err(e) => {
                info!(error = %e, "No manifest available, probing instead");
            }
        }
    }

    let probe = source.probe()?;
    let images = resolve_gallery(probe.as_ref(), options, rng).await?;
    Ok(Discovery {
        images,
        source: DiscoverySource::Probe,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    /// In-memory host: `existing` paths answer Found, `failing` paths error
    #[derive(Default)]
    struct FakeProbe {
        existing: HashSet<String>,
        failing: HashSet<String>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeProbe {
        fn with(mut self, category: Category, numbers: &[u32]) -> Self {
            for &n in numbers {
                self.existing.insert(gallery_path("gallery", category, n));
            }
            self
        }

        fn failing(mut self, category: Category, numbers: &[u32]) -> Self {
            for &n in numbers {
                self.failing.insert(gallery_path("gallery", category, n));
            }
            self
        }

        fn calls_for(&self, category: Category) -> usize {
            let prefix = format!("/gallery/{}", category.code());
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|p| p.starts_with(&prefix))
                .count()
        }
    }

    #[async_trait]
    impl ExistenceProbe for FakeProbe {
        async fn probe(&self, path: &str) -> ProbeOutcome {
            self.calls.lock().unwrap().push(path.to_string());
            if self.failing.contains(path) {
                ProbeOutcome::Failed("connection reset".into())
            } else if self.existing.contains(path) {
                ProbeOutcome::Found
            } else {
                ProbeOutcome::Missing
            }
        }
    }

    fn numbers(scan: &CategoryScan) -> Vec<u32> {
        scan.found.iter().map(|d| d.sequence_number).collect()
    }

    fn options(max: u32, streak: u32) -> ResolveOptions {
        ResolveOptions {
            max_per_category: max,
            miss_streak_limit: streak,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_single_gap_is_skipped_over() {
        let probe = FakeProbe::default().with(Category::Little, &[1, 2, 3, 5, 6]);
        let scan = scan_category(&probe, Category::Little, &options(60, 5)).await;

        assert_eq!(numbers(&scan), vec![1, 2, 3, 5, 6]);
        // 7..=11 are the five misses that end the scan
        assert_eq!(scan.probed, 11);
        assert_eq!(probe.calls_for(Category::Little), 11);
    }

    #[tokio::test]
    async fn test_gap_of_streak_length_stops_scan() {
        let probe = FakeProbe::default().with(Category::Early, &[1, 2, 8, 9]);
        let scan = scan_category(&probe, Category::Early, &options(60, 5)).await;

        assert_eq!(numbers(&scan), vec![1, 2]);
        assert_eq!(scan.probed, 7);
    }

    #[tokio::test]
    async fn test_missing_first_with_streak_of_one() {
        let probe = FakeProbe::default().with(Category::Junior, &[2, 3]);
        let scan = scan_category(&probe, Category::Junior, &options(60, 1)).await;

        assert!(scan.found.is_empty());
        assert_eq!(scan.probed, 1);
    }

    #[tokio::test]
    async fn test_missing_first_is_not_enough_alone() {
        let probe = FakeProbe::default().with(Category::Junior, &[2, 3]);
        let scan = scan_category(&probe, Category::Junior, &options(60, 5)).await;

        assert_eq!(numbers(&scan), vec![2, 3]);
    }

    #[tokio::test]
    async fn test_scan_bounded_by_max() {
        let all: Vec<u32> = (1..=80).collect();
        let probe = FakeProbe::default().with(Category::Little, &all);
        let scan = scan_category(&probe, Category::Little, &options(60, 5)).await;

        assert_eq!(scan.found.len(), 60);
        assert_eq!(scan.probed, 60);
        assert_eq!(scan.found.last().unwrap().sequence_number, 60);
    }

    #[tokio::test]
    async fn test_errors_count_as_misses_by_default() {
        let probe = FakeProbe::default()
            .with(Category::Little, &[1, 2, 9])
            .failing(Category::Little, &[3, 4, 5, 6, 7]);
        let scan = scan_category(&probe, Category::Little, &options(60, 5)).await;

        assert_eq!(numbers(&scan), vec![1, 2]);
        assert_eq!(scan.errors, 5);
        assert_eq!(scan.probed, 7);
    }

    #[tokio::test]
    async fn test_ignore_errors_policy_keeps_scanning() {
        let probe = FakeProbe::default()
            .with(Category::Little, &[1, 2, 9])
            .failing(Category::Little, &[3, 4, 5, 6, 7]);
        let opts = ResolveOptions {
            miss_policy: MissPolicy::IgnoreErrors,
            ..options(60, 5)
        };
        let scan = scan_category(&probe, Category::Little, &opts).await;

        assert_eq!(numbers(&scan), vec![1, 2, 9]);
        assert_eq!(scan.errors, 5);
    }

    #[tokio::test]
    async fn test_categories_are_independent() {
        let probe = FakeProbe::default()
            .with(Category::Early, &[1, 2, 3])
            .with(Category::Junior, &[1]);
        let scans = scan_all(&probe, &options(60, 5)).await;

        let by_cat: HashMap<Category, Vec<u32>> =
            scans.iter().map(|s| (s.category, numbers(s))).collect();
        assert_eq!(by_cat[&Category::Little], Vec::<u32>::new());
        assert_eq!(by_cat[&Category::Early], vec![1, 2, 3]);
        assert_eq!(by_cat[&Category::Junior], vec![1]);
        assert_eq!(probe.calls_for(Category::Little), 5);
        assert_eq!(probe.calls_for(Category::Early), 8);
        assert_eq!(probe.calls_for(Category::Junior), 6);
    }

    #[tokio::test]
    async fn test_resolve_same_set_across_passes() {
        let probe = FakeProbe::default()
            .with(Category::Little, &[1, 2, 3, 5, 6])
            .with(Category::Early, &[1, 2])
            .with(Category::Junior, &[1, 2, 3, 4]);
        let opts = options(60, 5);

        let first = resolve_gallery(&probe, &opts, &mut StdRng::seed_from_u64(1)).await.unwrap();
        let second = resolve_gallery(&probe, &opts, &mut StdRng::seed_from_u64(2)).await.unwrap();

        let keys = |v: &[ImageDescriptor]| v.iter().map(|d| d.key()).collect::<HashSet<_>>();
        assert_eq!(first.len(), 11);
        assert_eq!(keys(&first), keys(&second));
        for d in first.iter().chain(second.iter()) {
            assert!(d.display_rotation >= -ROTATION_RANGE_DEG);
            assert!(d.display_rotation <= ROTATION_RANGE_DEG);
        }
    }

    #[tokio::test]
    async fn test_resolve_is_reproducible_with_seed() {
        let probe = FakeProbe::default().with(Category::Little, &(1..=20).collect::<Vec<_>>());
        let opts = options(60, 5);

        let a = resolve_gallery(&probe, &opts, &mut StdRng::seed_from_u64(7)).await.unwrap();
        let b = resolve_gallery(&probe, &opts, &mut StdRng::seed_from_u64(7)).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_resolve_empty_host() {
        let probe = FakeProbe::default();
        let images = resolve_gallery(&probe, &options(60, 5), &mut StdRng::seed_from_u64(0))
            .await
            .unwrap();
        assert!(images.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_rejects_zero_streak() {
        let probe = FakeProbe::default();
        let result = resolve_gallery(&probe, &options(60, 0), &mut StdRng::seed_from_u64(0)).await;
        assert!(result.is_err());
        assert!(probe.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_discover_prefers_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let gallery = dir.path().join("gallery");
        std::fs::create_dir_all(&gallery).unwrap();
        std::fs::write(gallery.join("l1.jpg"), b"x").unwrap();
        std::fs::write(
            gallery.join(MANIFEST_FILE),
            r#"{"version":"t","images":["l1.jpg","e4.jpg"]}"#,
        )
        .unwrap();

        let source = GallerySource::new(dir.path().to_string_lossy(), Duration::from_secs(1));
        let mut rng = StdRng::seed_from_u64(3);

        let found = discover(&source, &options(60, 5), true, &mut rng).await.unwrap();
        assert_eq!(found.source, DiscoverySource::Manifest);
        assert_eq!(found.images.len(), 2);

        let probed = discover(&source, &options(60, 5), false, &mut rng).await.unwrap();
        assert_eq!(probed.source, DiscoverySource::Probe);
        assert_eq!(probed.images.len(), 1);
        assert_eq!(probed.images[0].path, "/gallery/l1.jpg");
    }

    #[tokio::test]
    async fn test_discover_falls_back_without_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let gallery = dir.path().join("gallery");
        std::fs::create_dir_all(&gallery).unwrap();
        for name in ["l1.jpg", "l2.jpg", "j1.jpg"] {
            std::fs::write(gallery.join(name), b"x").unwrap();
        }

        let source = GallerySource::new(dir.path().to_string_lossy(), Duration::from_secs(1));
        let found = discover(&source, &options(60, 5), true, &mut StdRng::seed_from_u64(3))
            .await
            .unwrap();
        assert_eq!(found.source, DiscoverySource::Probe);
        assert_eq!(found.images.len(), 3);
    }
}
