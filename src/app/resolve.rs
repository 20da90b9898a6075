//! Background gallery resolution and delivery of results to the view

use super::App;
use crate::error::GalleryError;
use crate::resolver::{discover, GallerySource};
use crate::types::Discovery;
use crate::utils::clear_image_cache;
use eframe::egui;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Result of one pass, tagged with the generation that started it
pub struct ResolveMessage {
    pub generation: u64,
    pub result: Result<Discovery, String>,
}

impl App {
    /// Start a resolution pass, superseding any pass still running
    pub fn start_resolve(&mut self, ctx: &egui::Context) {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        let generation = self.generation.begin();
        let token = CancellationToken::new();
        self.cancel_token = Some(token.clone());
        self.loading = true;
        self.status_error = None;

        let source = GallerySource::new(self.settings.host.clone(), self.settings.probe_timeout());
        let options = self.settings.resolve_options();
        let use_manifest = self.settings.use_manifest;
        let inbox = self.resolve_inbox.clone();
        let ctx = ctx.clone();

        info!(
            generation,
            host = %self.settings.host,
            max_per_category = options.max_per_category,
            miss_streak_limit = options.miss_streak_limit,
            "Starting gallery resolution"
        );

        self.runtime.spawn(async move {
            let mut rng = StdRng::from_os_rng();
            let result = tokio::select! {
                _ = token.cancelled() => Err(GalleryError::Cancelled),
                r = discover(&source, &options, use_manifest, &mut rng) => r,
            };

            if matches!(result, Err(GalleryError::Cancelled)) {
                debug!(generation, "Resolution cancelled");
                return;
            }

            inbox.lock().unwrap().push(ResolveMessage {
                generation,
                result: result.map_err(|e| e.to_string()),
            });
            ctx.request_repaint();
        });
    }

    /// Refresh: new shuffle, fresh tilts, and fresh photo downloads
    pub fn refresh(&mut self, ctx: &egui::Context) {
        self.textures.clear();
        self.fetching.lock().unwrap().clear();
        self.fetch_failed.lock().unwrap().clear();
        clear_image_cache(&self.cache_dir);
        self.start_resolve(ctx);
    }

    /// Apply finished passes. Anything from a superseded pass is dropped.
    pub fn poll_resolve(&mut self) {
        let messages: Vec<ResolveMessage> = std::mem::take(&mut *self.resolve_inbox.lock().unwrap());

        for message in messages {
            if !self.generation.accept(message.generation) {
                debug!(
                    generation = message.generation,
                    current = self.generation.current(),
                    "Discarding stale or duplicate gallery result"
                );
                continue;
            }

            self.loading = false;
            match message.result {
                Ok(discovery) => {
                    info!(
                        count = discovery.images.len(),
                        source = discovery.source.label(),
                        "Gallery ready"
                    );
                    self.source = Some(discovery.source);
                    self.last_refreshed = Some(chrono::Local::now());
                    self.view.set_images(discovery.images);
                }
                Err(e) => {
                    error!(error = %e, "Gallery resolution failed");
                    self.status_error = Some(e);
                    self.view.set_images(Vec::new());
                }
            }
        }
    }
}
