use crate::error::Result;

/// A local file chosen through the file picker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PickedFile {
    pub name: String,
    pub object_url: String,
}

/// Asynchronous notifications from the media element, queued by platform
/// callbacks and drained once per frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MediaEvent {
    /// The current source decoded enough data to start playing.
    LoadedData,
    /// The current source could not be fetched or decoded.
    LoadFailed(String),
    /// The platform refused to start playback (autoplay policy, no source...).
    PlayRejected(String),
    /// The user picked a local file.
    FilePicked(PickedFile),
}

/// Whether a rejected `play()` promise was cut short by a later `pause()` or
/// `load()` instead of the platform refusing to start audio.
pub fn is_interrupted_play(error_name: &str) -> bool {
    error_name == "AbortError"
}

/// The platform side of the player: one audio element, its analyser graph
/// and the file picker.
pub trait MediaBackend {
    /// Wire source -> analyser -> destination. Called at most once per
    /// session by the controller.
    fn build_graph(&mut self, fft_size: u32) -> Result<()>;

    /// Start playback. An immediate failure is returned; a later rejection
    /// arrives as [`MediaEvent::PlayRejected`].
    fn play(&mut self) -> Result<()>;

    fn pause(&mut self);

    /// Element volume in 0.0-1.0.
    fn set_volume(&mut self, volume: f64);

    fn volume(&self) -> f64;

    /// Swap the element source, releasing a previously owned object URL.
    fn set_source(&mut self, uri: &str);

    /// Force the element to load its current source.
    fn reload(&mut self);

    /// Bins per frame, or `None` before the graph exists.
    fn frequency_bin_count(&self) -> Option<usize>;

    /// Copy current magnitudes into `out`. Returns false when there is no
    /// analyser to read from.
    fn sample_frequencies(&mut self, out: &mut [u8]) -> bool;

    fn open_file_picker(&mut self);

    fn drain_events(&mut self) -> Vec<MediaEvent>;

    /// Tear down the graph and listeners.
    fn release(&mut self);
}
