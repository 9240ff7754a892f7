//! Windows XP styled media player with audio-reactive visualizations.
//!
//! The player runs in the browser on an `eframe` canvas. Playback goes through
//! a single `<audio>` element whose output is routed through a Web Audio
//! analyser; every frame the analyser's magnitudes are painted as bars, a
//! waveform or a particle field.

pub mod app;
pub mod audio;
pub mod backend;
pub mod config;
pub mod controller;
pub mod error;
pub mod render;
pub mod render_loop;
mod ui;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use app::PlayerApp;
pub use audio::{FrequencySampler, FrequencySnapshot};
pub use backend::{MediaBackend, MediaEvent, PickedFile};
pub use config::VisualizerConfig;
pub use controller::{PlaybackController, PlaybackState, StatusKind, StatusLine};
pub use error::PlayerError;
pub use render::{Renderer, VisualizationMode};
pub use render_loop::RenderLoop;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Canvas the player mounts on.
pub const CANVAS_ID: &str = "winxp_visualizer_canvas";

// WASM entry point
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    if let Err(err) = eframe::WebLogger::init(log::LevelFilter::Debug) {
        web_sys::console::error_1(&format!("logger already set: {err}").into());
    }

    wasm_bindgen_futures::spawn_local(async {
        if let Err(err) = web::run(CANVAS_ID).await {
            log::error!("failed to start player: {err}");
        }
    });

    Ok(())
}
