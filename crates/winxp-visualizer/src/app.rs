use web_time::{SystemTime, UNIX_EPOCH};

use crate::audio::FrequencySampler;
use crate::backend::MediaBackend;
use crate::config::VisualizerConfig;
use crate::controller::PlaybackController;
use crate::render::{Renderer, VisualizationMode};
use crate::render_loop::RenderLoop;

/// The whole widget: playback, visualization and the XP shell around them.
pub struct PlayerApp<B: MediaBackend> {
    pub(crate) config: VisualizerConfig,
    pub(crate) controller: PlaybackController<B>,
    pub(crate) sampler: FrequencySampler,
    pub(crate) renderer: Renderer,
    pub(crate) render_loop: RenderLoop,
    pub(crate) mode: VisualizationMode,
    pub(crate) url_input: String,
    shut_down: bool,
}

impl<B: MediaBackend> PlayerApp<B> {
    pub fn new(backend: B, config: VisualizerConfig, seed: u64) -> Self {
        let controller = PlaybackController::new(backend, &config);
        let sampler = FrequencySampler::new(config.frequency_bin_count());
        let renderer = Renderer::new(&config, seed);
        let mut render_loop = RenderLoop::new();
        render_loop.start();

        Self {
            config,
            controller,
            sampler,
            renderer,
            render_loop,
            mode: VisualizationMode::default(),
            url_input: String::new(),
            shut_down: false,
        }
    }

    pub fn controller(&self) -> &PlaybackController<B> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut PlaybackController<B> {
        &mut self.controller
    }

    pub fn mode(&self) -> VisualizationMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: VisualizationMode) {
        if self.mode != mode {
            log::debug!("visualization mode -> {}", mode.label());
        }
        self.mode = mode;
    }

    pub fn render_loop(&self) -> &RenderLoop {
        &self.render_loop
    }

    pub fn url_input_mut(&mut self) -> &mut String {
        &mut self.url_input
    }

    /// Hand the URL field to the controller. The field is cleared only when
    /// something was submitted.
    pub fn submit_url(&mut self) {
        let input = std::mem::take(&mut self.url_input);
        self.controller.load_from_url(&input);
        if input.trim().is_empty() {
            self.url_input = input;
        }
    }

    /// One frame: apply media events, then lay out the shell and paint.
    pub fn show(&mut self, ctx: &egui::Context) {
        let now = ctx.input(|i| i.time);
        self.controller.poll(now);

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE.fill(crate::ui::DESKTOP_BLUE))
            .show(ctx, |ui| self.draw_window(ui));
    }

    /// Paint the visualization into `rect` if the render loop is running.
    pub(crate) fn paint_canvas(&mut self, ui: &egui::Ui, rect: egui::Rect) {
        let painter = ui.painter_at(rect);
        let time = wall_clock_seconds();
        let mode = self.mode;
        let controller = &mut self.controller;
        let sampler = &mut self.sampler;
        let renderer = &mut self.renderer;

        self.render_loop.tick(ui.ctx(), || {
            let snapshot = if controller.is_playing() {
                sampler.sample(controller.backend_mut())
            } else {
                None
            };
            renderer.render_frame(&painter, rect, mode, snapshot, time);
        });
    }

    /// Stop the render loop and release the audio graph. Safe to call more
    /// than once; also runs on drop.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        self.render_loop.stop();
        self.controller.release();
        log::info!("player shut down");
    }
}

impl<B: MediaBackend> Drop for PlayerApp<B> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(target_arch = "wasm32")]
impl<B: MediaBackend> eframe::App for PlayerApp<B> {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.show(ctx);
    }
}

/// Seconds since the Unix epoch, 0.0 if the clock is unavailable.
pub fn wall_clock_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}

/// Seed for the particle field, taken from the wall clock.
pub fn clock_seed() -> u64 {
    (wall_clock_seconds() * 1_000_000.0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::fake::FakeBackend;
    use crate::backend::MediaEvent;
    use crate::controller::StatusKind;
    use egui::{Context, RawInput};

    fn app() -> PlayerApp<FakeBackend> {
        PlayerApp::new(
            FakeBackend::with_spectrum(vec![128; 128]),
            VisualizerConfig::default(),
            9,
        )
    }

    fn frame(ctx: &Context, app: &mut PlayerApp<FakeBackend>, time: f64) {
        let input = RawInput {
            time: Some(time),
            ..RawInput::default()
        };
        let _ = ctx.run(input, |ctx| app.show(ctx));
    }

    #[test]
    fn frames_tick_while_mounted() {
        let ctx = Context::default();
        let mut app = app();
        for i in 0..5 {
            frame(&ctx, &mut app, f64::from(i) / 60.0);
        }
        assert!(app.render_loop().is_running());
        assert!(app.render_loop().frames() >= 5);
    }

    #[test]
    fn switching_mode_keeps_play_state() {
        let ctx = Context::default();
        let mut app = app();
        app.controller_mut().toggle_play();
        frame(&ctx, &mut app, 0.0);

        for mode in VisualizationMode::ALL {
            app.set_mode(mode);
            frame(&ctx, &mut app, 0.1);
            assert_eq!(app.mode(), mode);
            assert!(app.controller().is_playing());
        }
        assert_eq!(app.controller().backend().graph_builds(), 1);
        assert!(app.renderer.particles().is_allocated());
    }

    #[test]
    fn paused_app_paints_idle_without_sampling() {
        let ctx = Context::default();
        let mut app = app();
        app.set_mode(VisualizationMode::Particles);
        frame(&ctx, &mut app, 0.0);
        // particles are only allocated when frequency data is drawn
        assert!(!app.renderer.particles().is_allocated());
    }

    #[test]
    fn empty_url_submission_keeps_field_and_clears_status() {
        let ctx = Context::default();
        let mut app = app();
        frame(&ctx, &mut app, 1.0);
        *app.url_input_mut() = "   ".into();
        app.submit_url();
        assert_eq!(app.url_input, "   ");
        assert_eq!(app.controller().status().unwrap().kind, StatusKind::Info);

        frame(&ctx, &mut app, 2.5);
        assert!(app.controller().status().is_some());
        frame(&ctx, &mut app, 3.1);
        assert!(app.controller().status().is_none());
    }

    #[test]
    fn url_submission_clears_field_and_reports_failure() {
        let ctx = Context::default();
        let mut app = app();
        frame(&ctx, &mut app, 1.0);
        *app.url_input_mut() = "https://blocked.example/tune.mp3".into();
        app.submit_url();
        assert!(app.url_input.is_empty());
        assert_eq!(app.controller().state().track_label, "tune");

        app.controller_mut()
            .backend_mut()
            .push_event(MediaEvent::LoadFailed("network".into()));
        frame(&ctx, &mut app, 1.5);
        let status = app.controller().status().unwrap();
        assert_eq!(status.kind, StatusKind::Error);
        assert!(status.text.contains("CORS"));
        frame(&ctx, &mut app, 7.6);
        assert!(app.controller().status().is_none());
    }

    #[test]
    fn shutdown_stops_loop_and_releases_backend() {
        let mut app = app();
        app.controller_mut().toggle_play();
        app.shutdown();
        app.shutdown();
        assert!(!app.render_loop().is_running());
        assert!(!app.controller().is_playing());
        assert!(app.controller().backend().released);
    }
}
