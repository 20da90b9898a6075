//! Photo loading: download to the cache, decode into textures

use super::App;
use crate::error::GalleryError;
use crate::probe::{is_http_host, join_url, DirProbe};
use crate::types::ImageDescriptor;
use eframe::egui;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

async fn fetch_image(client: &reqwest::Client, url: &str, dest: &Path) -> Result<(), GalleryError> {
    let response = client.get(url).send().await?.error_for_status()?;
    let bytes = response.bytes().await?;
    store_photo(dest, &bytes).await
}

/// Write through a `.part` sibling so `dest` only ever holds a complete file
async fn store_photo(dest: &Path, bytes: &[u8]) -> Result<(), GalleryError> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let partial = dest.with_extension("part");
    if let Err(e) = tokio::fs::write(&partial, bytes).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(e.into());
    }
    tokio::fs::rename(&partial, dest).await?;
    Ok(())
}

fn decode_texture(ctx: &egui::Context, name: &str, path: &Path) -> Option<egui::TextureHandle> {
    match image::open(path) {
        Ok(img) => {
            let rgba = img.to_rgba8();
            let size = [rgba.width() as usize, rgba.height() as usize];
            let pixels = rgba.into_raw();
            Some(ctx.load_texture(
                name,
                egui::ColorImage::from_rgba_unmultiplied(size, &pixels),
                egui::TextureOptions::LINEAR,
            ))
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to decode photo");
            None
        }
    }
}

impl App {
    /// Where a photo lives on disk: the cache for HTTP hosts, the host
    /// directory itself otherwise
    pub fn local_photo_path(&self, image: &ImageDescriptor) -> PathBuf {
        if is_http_host(&self.settings.host) {
            self.cache_dir.join("images").join(image.file_name())
        } else {
            DirProbe::new(&self.settings.host).file_for(&image.path)
        }
    }

    pub fn photo_url(&self, image: &ImageDescriptor) -> Option<String> {
        if is_http_host(&self.settings.host) {
            Some(join_url(&self.settings.host, &image.path))
        } else {
            None
        }
    }

    /// Texture for a photo, starting a download if needed
    pub fn load_texture(
        &mut self,
        ctx: &egui::Context,
        image: &ImageDescriptor,
    ) -> Option<egui::TextureHandle> {
        let key = image.key();
        if let Some(cached) = self.textures.get(&key) {
            return cached.clone();
        }

        let path = self.local_photo_path(image);
        if path.exists() && !self.fetching.lock().unwrap().contains(&key) {
            let texture = decode_texture(ctx, &key, &path);
            self.textures.insert(key, texture.clone());
            return texture;
        }

        if self.fetch_failed.lock().unwrap().contains(&key) {
            self.textures.insert(key, None);
            return None;
        }

        match self.photo_url(image) {
            Some(url) => self.start_fetch(ctx, key, url, path),
            None => {
                warn!(path = %path.display(), "Photo missing from local folder");
                self.textures.insert(key, None);
            }
        }
        None
    }

    fn start_fetch(&mut self, ctx: &egui::Context, key: String, url: String, dest: PathBuf) {
        if !self.fetching.lock().unwrap().insert(key.clone()) {
            return;
        }

        let client = self.http_client.clone();
        let semaphore = self.fetch_semaphore.clone();
        let fetching = self.fetching.clone();
        let failed = self.fetch_failed.clone();
        let token = self.cancel_token.clone().unwrap_or_default();
        let ctx = ctx.clone();

        self.runtime.spawn(async move {
            let _permit = semaphore.acquire().await.ok();
            if token.is_cancelled() {
                fetching.lock().unwrap().remove(&key);
                return;
            }

            match fetch_image(&client, &url, &dest).await {
                Ok(()) => debug!(url = %url, "Photo cached"),
                Err(e) => {
                    warn!(url = %url, error = %e, "Photo download failed");
                    failed.lock().unwrap().insert(key.clone());
                }
            }
            fetching.lock().unwrap().remove(&key);
            ctx.request_repaint();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_photo_leaves_no_partial() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("images").join("l1.jpg");

        store_photo(&dest, b"jpeg").await.unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"jpeg");
        assert!(!dest.with_extension("part").exists());
    }

    #[tokio::test]
    async fn test_store_photo_failed_write_keeps_dest_absent() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("l2.jpg");
        // A directory in the way of the partial file makes the write fail
        std::fs::create_dir_all(dest.with_extension("part")).unwrap();

        assert!(store_photo(&dest, b"jpeg").await.is_err());
        assert!(!dest.exists());
    }
}
