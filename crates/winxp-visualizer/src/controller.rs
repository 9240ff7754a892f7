use crate::backend::{MediaBackend, MediaEvent, PickedFile};
use crate::config::VisualizerConfig;

const MSG_EMPTY_URL: &str = "Please enter a URL";
const MSG_LOADING: &str = "Loading...";
const MSG_LOADED: &str = "✓ Loaded successfully! Click Play to start.";
const MSG_CORS: &str = "✗ CORS Error: This server doesn't allow audio playback from other sites. \
                        Try soundhelix.com URLs or host your file elsewhere.";
const MSG_BAD_FILE: &str = "✗ Could not decode this file. Try another audio format.";
const FALLBACK_URL_LABEL: &str = "Custom Track";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

/// Transient message shown under the URL bar.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusLine {
    pub text: String,
    pub kind: StatusKind,
    /// Frame-clock second after which the line disappears; `None` stays until
    /// replaced.
    pub expires_at: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub volume: u8,
    pub source_uri: String,
    pub track_label: String,
    pub status: Option<StatusLine>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LoadOrigin {
    File,
    Url,
}

/// Owns play/pause, volume, the status line and the audio source.
pub struct PlaybackController<B: MediaBackend> {
    backend: B,
    state: PlaybackState,
    graph_initialized: bool,
    released: bool,
    pending_load: Option<LoadOrigin>,
    fft_size: u32,
    now: f64,
    validation_secs: f64,
    loaded_secs: f64,
    failure_secs: f64,
}

impl<B: MediaBackend> PlaybackController<B> {
    pub fn new(mut backend: B, config: &VisualizerConfig) -> Self {
        let volume = config.default_volume.min(100);
        backend.set_source(&config.default_source);
        backend.set_volume(f64::from(volume) / 100.0);

        Self {
            backend,
            state: PlaybackState {
                is_playing: false,
                volume,
                source_uri: config.default_source.clone(),
                track_label: config.default_track_label.clone(),
                status: None,
            },
            graph_initialized: false,
            released: false,
            pending_load: None,
            fft_size: config.fft_size,
            now: 0.0,
            validation_secs: config.validation_status_secs,
            loaded_secs: config.loaded_status_secs,
            failure_secs: config.failure_status_secs,
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing
    }

    pub fn status(&self) -> Option<&StatusLine> {
        self.state.status.as_ref()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn graph_initialized(&self) -> bool {
        self.graph_initialized
    }

    /// Advance the frame clock, apply queued media events and drop an expired
    /// status line. Call once per frame before reading state.
    pub fn poll(&mut self, now: f64) {
        self.now = now;

        for event in self.backend.drain_events() {
            self.handle_event(event);
        }

        let expired = self
            .state
            .status
            .as_ref()
            .and_then(|s| s.expires_at)
            .is_some_and(|deadline| self.now >= deadline);
        if expired {
            self.state.status = None;
        }
    }

    pub fn toggle_play(&mut self) {
        if self.released {
            log::warn!("toggle_play after release ignored");
            return;
        }
        if !self.ensure_graph() {
            return;
        }

        if self.state.is_playing {
            self.backend.pause();
            self.state.is_playing = false;
            log::debug!("playback paused");
            return;
        }

        match self.backend.play() {
            Ok(()) => {
                self.state.is_playing = true;
                log::debug!("playback started: {}", self.state.track_label);
            }
            Err(err) => {
                self.state.is_playing = false;
                log::warn!("could not start playback: {err}");
                self.set_status(format!("✗ {err}"), StatusKind::Error, Some(self.failure_secs));
            }
        }
    }

    pub fn set_volume(&mut self, volume: i32) {
        let volume = volume.clamp(0, 100) as u8;
        self.state.volume = volume;
        self.apply_volume();
    }

    pub fn load_from_file(&mut self, file: &PickedFile) {
        log::info!("loading local file {}", file.name);
        self.stop_for_load();
        // A URL load this file replaces will never report back.
        if self.pending_load == Some(LoadOrigin::Url) {
            self.state.status = None;
        }

        self.swap_source(&file.object_url);
        self.state.track_label = track_label_from_file_name(&file.name);
        self.pending_load = Some(LoadOrigin::File);

        self.backend.reload();
        self.apply_volume();
    }

    pub fn load_from_url(&mut self, input: &str) {
        let uri = input.trim();
        if uri.is_empty() {
            self.set_status(MSG_EMPTY_URL, StatusKind::Info, Some(self.validation_secs));
            return;
        }

        log::info!("loading remote source {uri}");
        self.set_status(MSG_LOADING, StatusKind::Info, None);
        self.stop_for_load();

        self.swap_source(uri);
        self.state.track_label = track_label_from_url(uri);
        self.pending_load = Some(LoadOrigin::Url);

        self.backend.reload();
    }

    pub fn open_file_picker(&mut self) {
        self.backend.open_file_picker();
    }

    /// Stop playback and tear down the audio graph. The element cannot be
    /// rewired afterwards, so later `toggle_play` calls are ignored.
    pub fn release(&mut self) {
        if self.state.is_playing {
            self.backend.pause();
            self.state.is_playing = false;
        }
        self.backend.release();
        self.released = true;
        self.pending_load = None;
    }

    fn ensure_graph(&mut self) -> bool {
        if self.graph_initialized {
            return true;
        }
        match self.backend.build_graph(self.fft_size) {
            Ok(()) => {
                self.graph_initialized = true;
                log::info!("audio graph ready (fft size {})", self.fft_size);
                true
            }
            Err(err) => {
                log::error!("{err}");
                self.set_status(format!("✗ {err}"), StatusKind::Error, Some(self.failure_secs));
                false
            }
        }
    }

    fn stop_for_load(&mut self) {
        if self.state.is_playing {
            self.backend.pause();
            self.state.is_playing = false;
        }
    }

    fn swap_source(&mut self, uri: &str) {
        self.backend.set_source(uri);
        self.state.source_uri = uri.to_string();
    }

    fn apply_volume(&mut self) {
        self.backend.set_volume(f64::from(self.state.volume) / 100.0);
    }

    fn handle_event(&mut self, event: MediaEvent) {
        match event {
            MediaEvent::LoadedData => {
                if self.pending_load.take() == Some(LoadOrigin::Url) {
                    self.set_status(MSG_LOADED, StatusKind::Success, Some(self.loaded_secs));
                }
                self.apply_volume();
            }
            MediaEvent::LoadFailed(reason) => {
                log::error!("audio load error: {reason}");
                match self.pending_load.take() {
                    Some(LoadOrigin::Url) => {
                        self.set_status(MSG_CORS, StatusKind::Error, Some(self.failure_secs));
                    }
                    Some(LoadOrigin::File) => {
                        self.set_status(MSG_BAD_FILE, StatusKind::Error, Some(self.failure_secs));
                    }
                    None => {}
                }
                if self.state.is_playing {
                    self.backend.pause();
                    self.state.is_playing = false;
                }
            }
            MediaEvent::PlayRejected(reason) => {
                log::warn!("playback rejected: {reason}");
                self.state.is_playing = false;
                self.set_status(
                    format!("✗ Playback was blocked: {reason}"),
                    StatusKind::Error,
                    Some(self.failure_secs),
                );
            }
            MediaEvent::FilePicked(file) => self.load_from_file(&file),
        }
    }

    fn set_status(&mut self, text: impl Into<String>, kind: StatusKind, lifetime: Option<f64>) {
        self.state.status = Some(StatusLine {
            text: text.into(),
            kind,
            expires_at: lifetime.map(|secs| self.now + secs),
        });
    }
}

/// File name without its last extension: `"song.final.mp3"` -> `"song.final"`.
pub fn track_label_from_file_name(name: &str) -> String {
    strip_extension(name).to_string()
}

/// Last path segment of `uri` without query string and extension, or
/// "Custom Track" when nothing is left.
pub fn track_label_from_url(uri: &str) -> String {
    let segment = uri.rsplit('/').next().unwrap_or_default();
    let segment = segment.split('?').next().unwrap_or_default();
    let label = strip_extension(segment);
    if label.is_empty() {
        FALLBACK_URL_LABEL.to_string()
    } else {
        label.to_string()
    }
}

fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        // Needs at least one character after the dot and no path separator in
        // the extension.
        Some(dot) if dot + 1 < name.len() && !name[dot + 1..].contains('/') => &name[..dot],
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::fake::{Call, FakeBackend};

    fn controller() -> PlaybackController<FakeBackend> {
        PlaybackController::new(FakeBackend::default(), &VisualizerConfig::default())
    }

    fn picked(name: &str) -> PickedFile {
        PickedFile {
            name: name.to_string(),
            object_url: format!("blob:local/{name}"),
        }
    }

    #[test]
    fn initial_state_mirrors_config() {
        let c = controller();
        let cfg = VisualizerConfig::default();
        assert!(!c.is_playing());
        assert_eq!(c.state().volume, 70);
        assert_eq!(c.state().track_label, "Demo Track");
        assert_eq!(c.backend().source, cfg.default_source);
        assert!((c.backend().volume() - 0.7).abs() < 1e-9);
    }

    #[test]
    fn volume_maps_to_element_for_all_values() {
        let mut c = controller();
        for v in 0..=100 {
            c.set_volume(v);
            assert_eq!(i32::from(c.state().volume), v);
            assert!((c.backend().volume() - f64::from(v) / 100.0).abs() < 1e-12);
        }
    }

    #[test]
    fn volume_is_clamped_and_applied_while_paused() {
        let mut c = controller();
        c.set_volume(150);
        assert_eq!(c.state().volume, 100);
        assert_eq!(c.backend().volume(), 1.0);
        c.set_volume(-5);
        assert_eq!(c.state().volume, 0);
        assert_eq!(c.backend().volume(), 0.0);
        assert!(!c.is_playing());
    }

    #[test]
    fn toggle_twice_restores_state_and_builds_graph_once() {
        let mut c = controller();
        c.toggle_play();
        assert!(c.is_playing());
        c.toggle_play();
        assert!(!c.is_playing());
        for _ in 0..10 {
            c.toggle_play();
        }
        assert!(!c.is_playing());
        assert_eq!(c.backend().graph_builds(), 1);
        assert!(c.graph_initialized());
        assert_eq!(
            c.backend().calls[..2],
            [
                Call::SetSource(c.state().source_uri.clone()),
                Call::SetVolume(0.7)
            ]
        );
        assert_eq!(c.backend().calls[2], Call::BuildGraph(256));
    }

    #[test]
    fn graph_failure_keeps_stopped_and_reports() {
        let mut c = controller();
        c.backend_mut().fail_graph = true;
        c.toggle_play();
        assert!(!c.is_playing());
        assert!(!c.graph_initialized());
        assert_eq!(c.status().unwrap().kind, StatusKind::Error);
        assert!(!c.backend().calls.contains(&Call::Play));

        c.backend_mut().fail_graph = false;
        c.toggle_play();
        assert!(c.is_playing());
        assert_eq!(c.backend().graph_builds(), 2);
    }

    #[test]
    fn synchronous_play_failure_leaves_stopped() {
        let mut c = controller();
        c.backend_mut().reject_play = true;
        c.toggle_play();
        assert!(!c.is_playing());
        let status = c.status().unwrap();
        assert_eq!(status.kind, StatusKind::Error);
        assert_eq!(status.expires_at, Some(6.0));
    }

    #[test]
    fn async_play_rejection_resets_flag() {
        let mut c = controller();
        c.toggle_play();
        assert!(c.is_playing());
        c.backend_mut()
            .push_event(MediaEvent::PlayRejected("NotAllowedError".into()));
        c.poll(1.0);
        assert!(!c.is_playing());
        assert_eq!(c.status().unwrap().kind, StatusKind::Error);
        // The next toggle starts playback again instead of pausing.
        c.toggle_play();
        assert!(c.is_playing());
    }

    #[test]
    fn load_from_file_stops_playback_before_swapping_source() {
        let mut c = controller();
        c.toggle_play();
        c.load_from_file(&picked("My Song.mp3"));

        assert!(!c.is_playing());
        assert_eq!(c.backend().source_swaps_while_audible, 0);
        assert_eq!(c.state().track_label, "My Song");
        assert_eq!(c.state().source_uri, "blob:local/My Song.mp3");

        let calls = &c.backend().calls;
        let pause = calls.iter().rposition(|x| *x == Call::Pause).unwrap();
        let swap = calls
            .iter()
            .rposition(|x| matches!(x, Call::SetSource(_)))
            .unwrap();
        let reload = calls.iter().rposition(|x| *x == Call::Reload).unwrap();
        assert!(pause < swap && swap < reload);
        assert_eq!(calls.last(), Some(&Call::SetVolume(0.7)));
    }

    #[test]
    fn load_from_url_stops_playback_and_reports_loading() {
        let mut c = controller();
        c.toggle_play();
        c.load_from_url("  https://example.com/audio/track01.mp3?token=abc  ");

        assert!(!c.is_playing());
        assert_eq!(c.backend().source_swaps_while_audible, 0);
        assert_eq!(c.state().source_uri, "https://example.com/audio/track01.mp3?token=abc");
        assert_eq!(c.state().track_label, "track01");
        let status = c.status().unwrap();
        assert_eq!(status.text, MSG_LOADING);
        assert_eq!(status.expires_at, None);
        assert_eq!(c.backend().calls.last(), Some(&Call::Reload));
    }

    #[test]
    fn empty_url_shows_validation_message_that_clears() {
        let mut c = controller();
        c.poll(10.0);
        let calls_before = c.backend().calls.len();
        c.load_from_url("   ");

        let status = c.status().unwrap();
        assert_eq!(status.text, MSG_EMPTY_URL);
        assert_eq!(status.kind, StatusKind::Info);
        assert_eq!(c.backend().calls.len(), calls_before);

        c.poll(11.9);
        assert!(c.status().is_some());
        c.poll(12.0);
        assert!(c.status().is_none());
    }

    #[test]
    fn loaded_url_reports_success_then_clears() {
        let mut c = controller();
        c.load_from_url("https://example.com/a.mp3");
        c.backend_mut().push_event(MediaEvent::LoadedData);
        c.poll(5.0);
        let status = c.status().unwrap();
        assert_eq!(status.kind, StatusKind::Success);
        assert_eq!(status.expires_at, Some(8.0));
        c.poll(8.5);
        assert!(c.status().is_none());
    }

    #[test]
    fn cross_origin_failure_reports_hint_then_clears() {
        let mut c = controller();
        c.poll(1.0);
        c.load_from_url("https://no-cors.example.net/song.mp3");
        c.backend_mut()
            .push_event(MediaEvent::LoadFailed("MEDIA_ERR_SRC_NOT_SUPPORTED".into()));
        c.poll(2.0);

        let status = c.status().unwrap();
        assert_eq!(status.kind, StatusKind::Error);
        assert!(status.text.contains("CORS"));
        c.poll(7.9);
        assert!(c.status().is_some());
        c.poll(8.0);
        assert!(c.status().is_none());
    }

    #[test]
    fn failure_without_pending_load_is_silent() {
        let mut c = controller();
        c.backend_mut().push_event(MediaEvent::LoadFailed("network".into()));
        c.poll(1.0);
        assert!(c.status().is_none());
    }

    #[test]
    fn picked_file_event_loads_file() {
        let mut c = controller();
        c.open_file_picker();
        assert!(c.backend().calls.contains(&Call::OpenFilePicker));
        c.backend_mut()
            .push_event(MediaEvent::FilePicked(picked("loop.wav")));
        c.poll(0.5);
        assert_eq!(c.state().track_label, "loop");
        assert_eq!(c.backend().source, "blob:local/loop.wav");
    }

    #[test]
    fn undecodable_file_reports_error() {
        let mut c = controller();
        c.load_from_file(&picked("notes.txt"));
        c.backend_mut().push_event(MediaEvent::LoadFailed("decode".into()));
        c.poll(1.0);
        assert_eq!(c.status().unwrap().text, MSG_BAD_FILE);
    }

    #[test]
    fn newer_status_replaces_deadline() {
        let mut c = controller();
        c.load_from_url("");
        c.load_from_url("https://example.com/x.mp3");
        c.poll(100.0);
        assert_eq!(c.status().unwrap().text, MSG_LOADING);
    }

    #[test]
    fn release_pauses_and_tears_down() {
        let mut c = controller();
        c.toggle_play();
        c.release();
        assert!(!c.is_playing());
        assert!(c.backend().released);

        c.toggle_play();
        assert!(!c.is_playing());
        assert_eq!(c.backend().graph_builds(), 1);
        assert_eq!(c.backend().calls.last(), Some(&Call::Release));
    }

    #[test]
    fn file_replacing_pending_url_clears_loading() {
        let mut c = controller();
        c.load_from_url("https://slow.example/a.mp3");
        c.load_from_file(&picked("b.mp3"));
        c.backend_mut().push_event(MediaEvent::LoadedData);
        c.poll(2.0);
        c.poll(1000.0);
        assert!(c.status().is_none());
        assert_eq!(c.state().track_label, "b");
    }

    #[test]
    fn labels_from_names_and_urls() {
        assert_eq!(track_label_from_file_name("song.final.mp3"), "song.final");
        assert_eq!(track_label_from_file_name("noext"), "noext");
        assert_eq!(track_label_from_file_name(".hidden"), "");
        assert_eq!(track_label_from_url("https://host/path/beat.ogg?x=1"), "beat");
        assert_eq!(track_label_from_url("https://host/path/"), "Custom Track");
        assert_eq!(track_label_from_url("https://host/stream?id=4"), "stream");
    }
}
