//! App module - contains the main application state and logic

mod images;
mod modals;
mod resolve;
mod views;

use crate::settings::Settings;
use crate::theme;
use crate::types::*;
use crate::utils::get_cache_dir;
use crate::view::{GalleryView, ResolveGeneration};
use eframe::egui;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

pub use resolve::ResolveMessage;

// ============================================================================
// APP STATE
// ============================================================================

pub struct App {
    pub(crate) settings: Settings,
    pub(crate) data_dir: PathBuf,
    pub(crate) cache_dir: PathBuf,
    pub(crate) runtime: tokio::runtime::Runtime,
    // Gallery
    pub(crate) view: GalleryView,
    pub(crate) generation: ResolveGeneration,
    pub(crate) resolve_inbox: Arc<Mutex<Vec<ResolveMessage>>>,
    pub(crate) cancel_token: Option<CancellationToken>,
    pub(crate) loading: bool,
    pub(crate) resolve_started: bool,
    pub(crate) source: Option<DiscoverySource>,
    pub(crate) last_refreshed: Option<chrono::DateTime<chrono::Local>>,
    pub(crate) status_error: Option<String>,
    // Photo textures keyed by descriptor key; None = failed to load
    pub(crate) textures: HashMap<String, Option<egui::TextureHandle>>,
    pub(crate) fetching: Arc<Mutex<HashSet<String>>>,
    pub(crate) fetch_failed: Arc<Mutex<HashSet<String>>>,
    pub(crate) http_client: reqwest::Client,
    pub(crate) fetch_semaphore: Arc<tokio::sync::Semaphore>,
    // Settings panel
    pub(crate) show_settings: bool,
    pub(crate) settings_draft: Settings,
    // Window
    pub(crate) window_pos: Option<egui::Pos2>,
    pub(crate) window_size: Option<egui::Vec2>,
    pub(crate) needs_center: bool,
}

/// Client for photo downloads; falls back to defaults if the builder fails
fn photo_client(timeout: std::time::Duration) -> reqwest::Client {
    match reqwest::Client::builder().timeout(timeout).build() {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to build HTTP client, using defaults");
            reqwest::Client::new()
        }
    }
}

// ============================================================================
// APP INITIALIZATION & HELPERS
// ============================================================================

impl App {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        settings: Settings,
        data_dir: PathBuf,
        runtime: tokio::runtime::Runtime,
    ) -> Self {
        // Force dark theme
        cc.egui_ctx.set_theme(egui::Theme::Dark);

        // Add Phosphor icons font
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        theme::apply_visuals(&cc.egui_ctx);

        let cache_dir = get_cache_dir();
        std::fs::create_dir_all(&cache_dir).ok();

        let http_client = photo_client(settings.probe_timeout() * 3);

        Self {
            view: GalleryView::new(settings.last_filter),
            settings_draft: settings.clone(),
            settings,
            data_dir,
            cache_dir,
            runtime,
            generation: ResolveGeneration::default(),
            resolve_inbox: Arc::new(Mutex::new(Vec::new())),
            cancel_token: None,
            loading: false,
            resolve_started: false,
            source: None,
            last_refreshed: None,
            status_error: None,
            textures: HashMap::new(),
            fetching: Arc::new(Mutex::new(HashSet::new())),
            fetch_failed: Arc::new(Mutex::new(HashSet::new())),
            http_client,
            fetch_semaphore: Arc::new(tokio::sync::Semaphore::new(
                crate::constants::IMAGE_FETCH_CONCURRENCY,
            )),
            show_settings: false,
            window_pos: None,
            window_size: None,
            needs_center: false,
        }
    }

    pub fn save_settings(&mut self) {
        self.settings.window_x = self.window_pos.map(|p| p.x);
        self.settings.window_y = self.window_pos.map(|p| p.y);
        self.settings.window_w = self.window_size.map(|s| s.x);
        self.settings.window_h = self.window_size.map(|s| s.y);
        self.settings.last_filter = self.view.filter();
        self.settings.save(&self.data_dir);
    }

    pub fn set_filter(&mut self, filter: CategoryFilter) {
        if self.view.filter() != filter {
            tracing::debug!(filter = filter.label(), "Filter changed");
            self.view.set_filter(filter);
        }
    }

    /// Discard in-flight work; results that still arrive are dropped
    pub fn tear_down(&mut self) {
        self.generation.tear_down();
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
        self.loading = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_photo_client_applies_timeout() {
        // Accepts connections and never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/gallery/l1.jpg", listener.local_addr().unwrap());

        let client = photo_client(Duration::from_millis(200));
        let result = tokio::time::timeout(Duration::from_secs(5), client.get(&url).send())
            .await
            .expect("configured timeout should fire first");
        assert!(result.unwrap_err().is_timeout());
        drop(listener);
    }
}
