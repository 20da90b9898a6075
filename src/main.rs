#![windows_subsystem = "windows"]
//! Explorers Gallery - Main entry point

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

mod app;
mod constants;
mod error;
mod manifest;
mod probe;
mod resolver;
mod settings;
mod theme;
mod types;
mod ui;
mod utils;
mod view;

use app::App;
use clap::Parser;
use constants::*;
use eframe::egui;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "explorers-gallery", version, about = "Photo gallery for the Explorers centre")]
struct Args {
    /// Write manifest.json for a local gallery folder and exit
    #[arg(long, value_name = "DIR")]
    write_manifest: Option<PathBuf>,

    /// Site to load photos from (URL or local folder); remembered for next launch
    #[arg(long)]
    host: Option<String>,
}

/// Initialize file logging. Returns a guard that must be held for the app lifetime.
fn init_logging(data_dir: &std::path::Path) -> tracing_appender::non_blocking::WorkerGuard {
    use tracing_subscriber::{fmt, EnvFilter, prelude::*};

    let logs_dir = data_dir.join("logs");
    std::fs::create_dir_all(&logs_dir).ok();

    let file_appender = tracing_appender::rolling::daily(&logs_dir, "explorers-gallery.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,explorers_gallery=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    guard
}

fn write_manifest(dir: &std::path::Path) -> error::Result<PathBuf> {
    let manifest = manifest::build_from_dir(dir)?;
    let path = dir.join(MANIFEST_FILE);
    manifest.write_to(&path)?;
    info!(path = %path.display(), count = manifest.images.len(), "Manifest written");
    Ok(path)
}

fn main() -> eframe::Result<()> {
    let args = Args::parse();
    let data_dir = utils::get_data_dir();

    std::fs::create_dir_all(&data_dir).ok();

    // Initialize logging - guard must live for entire app lifetime
    let _log_guard = init_logging(&data_dir);

    info!(version = APP_VERSION, "Explorers Gallery starting");

    if let Some(dir) = args.write_manifest {
        match write_manifest(&dir) {
            Ok(path) => println!("Wrote {}", path.display()),
            Err(e) => {
                error!(error = %e, dir = %dir.display(), "Failed to write manifest");
                eprintln!("Failed to write manifest: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "Failed to start async runtime");
            panic!("Failed to start async runtime: {}", e);
        }
    };

    // Load saved settings and window position/size
    let mut settings = settings::Settings::load(&data_dir);
    if let Some(host) = args.host {
        settings.host = host;
    }
    let win_pos = match (settings.window_x, settings.window_y) {
        (Some(x), Some(y)) => Some(egui::pos2(x, y)),
        _ => None,
    };
    let win_size = match (settings.window_w, settings.window_h) {
        (Some(w), Some(h)) => Some(egui::vec2(w, h)),
        _ => None,
    };

    let mut viewport = egui::ViewportBuilder::default()
        .with_inner_size(win_size.unwrap_or(egui::vec2(1280.0, 820.0)))
        .with_min_inner_size([720.0, 520.0])
        .with_title(APP_NAME);

    let needs_center = win_pos.is_none();

    if let Some(pos) = win_pos {
        viewport = viewport.with_position(pos);
    }

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        APP_NAME,
        options,
        Box::new(move |cc| {
            let mut app = App::new(cc, settings, data_dir, runtime);
            app.needs_center = needs_center;
            Ok(Box::new(app))
        }),
    )
}

// ============================================================================
// MAIN UPDATE LOOP
// ============================================================================

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Track window position/size for saving on exit
        ctx.input(|i| {
            if let Some(rect) = i.viewport().outer_rect {
                self.window_pos = Some(rect.min);
            }
            if let Some(rect) = i.viewport().inner_rect {
                self.window_size = Some(rect.size());
            }
        });

        // Resolve once when the gallery first shows
        if !self.resolve_started {
            self.resolve_started = true;
            self.start_resolve(ctx);
        }

        // Center window on first launch
        if self.needs_center {
            self.needs_center = false;
            if let Some(cmd) = egui::ViewportCommand::center_on_screen(ctx) {
                ctx.send_viewport_cmd(cmd);
            }
        }

        self.poll_resolve();

        egui::TopBottomPanel::top("header")
            .frame(theme::header_frame())
            .show(ctx, |ui| {
                self.render_header(ui, ctx);
            });

        egui::CentralPanel::default()
            .frame(
                egui::Frame::new()
                    .fill(theme::BG_BASE)
                    .inner_margin(egui::Margin::same(theme::SPACING_XL as i8)),
            )
            .show(ctx, |ui| {
                self.render_grid(ui, ctx);
            });

        self.render_viewer(ctx);
        self.render_settings(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("Application shutting down");
        self.tear_down();
        self.save_settings();
    }
}
