use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    AnalyserNode, AudioContext, Document, DomException, Event, HtmlAudioElement,
    HtmlCanvasElement, HtmlInputElement, MediaElementAudioSourceNode, Url,
};

use crate::app::{clock_seed, PlayerApp};
use crate::backend::{is_interrupted_play, MediaBackend, MediaEvent, PickedFile};
use crate::config::VisualizerConfig;
use crate::error::{PlayerError, Result};

const AUDIO_ELEMENT_ID: &str = "winxp_visualizer_audio";
const FILE_INPUT_ID: &str = "winxp_visualizer_file_input";
const CONFIG_ATTRIBUTE: &str = "data-config";

type EventQueue = Rc<RefCell<Vec<MediaEvent>>>;
type Listener = Closure<dyn FnMut(Event)>;

fn describe(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    format!("{value:?}")
}

fn dom_error(err: JsValue) -> PlayerError {
    PlayerError::Dom(describe(&err))
}

fn graph_error(err: JsValue) -> PlayerError {
    PlayerError::AudioGraph(describe(&err))
}

fn media_error_name(code: u16) -> String {
    match code {
        1 => "MEDIA_ERR_ABORTED".to_string(),
        2 => "MEDIA_ERR_NETWORK".to_string(),
        3 => "MEDIA_ERR_DECODE".to_string(),
        4 => "MEDIA_ERR_SRC_NOT_SUPPORTED".to_string(),
        other => format!("media error {other}"),
    }
}

struct AudioGraph {
    context: AudioContext,
    analyser: AnalyserNode,
    _source: MediaElementAudioSourceNode,
}

/// Browser media backend: one `<audio>` element routed through an analyser.
pub struct WebMediaBackend {
    document: Document,
    audio: HtmlAudioElement,
    graph: Option<AudioGraph>,
    events: EventQueue,
    object_url: Option<String>,
    listeners: Vec<(&'static str, Listener)>,
    file_input: Option<(HtmlInputElement, Listener)>,
}

impl WebMediaBackend {
    pub fn new() -> Result<Self> {
        let window = web_sys::window().ok_or(PlayerError::NoWindow)?;
        let document = window.document().ok_or(PlayerError::NoDocument)?;

        let existing = document
            .get_element_by_id(AUDIO_ELEMENT_ID)
            .and_then(|el| el.dyn_into::<HtmlAudioElement>().ok());
        let audio = match existing {
            Some(audio) => audio,
            None => {
                let audio = HtmlAudioElement::new().map_err(dom_error)?;
                audio.set_id(AUDIO_ELEMENT_ID);
                document
                    .body()
                    .ok_or(PlayerError::NoDocument)?
                    .append_child(&audio)
                    .map_err(dom_error)?;
                audio
            }
        };
        audio.set_loop(true);
        // Needed for the analyser to see remote audio at all.
        audio.set_cross_origin(Some("anonymous"));

        let mut backend = Self {
            document,
            audio,
            graph: None,
            events: Rc::default(),
            object_url: None,
            listeners: Vec::new(),
            file_input: None,
        };

        backend.listen("loadeddata", |_, events| {
            events.borrow_mut().push(MediaEvent::LoadedData);
        })?;
        backend.listen("error", |audio, events| {
            let reason = audio
                .error()
                .map_or_else(|| "unknown media error".to_string(), |e| media_error_name(e.code()));
            events.borrow_mut().push(MediaEvent::LoadFailed(reason));
        })?;

        Ok(backend)
    }

    fn listen(
        &mut self,
        name: &'static str,
        handler: impl Fn(&HtmlAudioElement, &EventQueue) + 'static,
    ) -> Result<()> {
        let audio = self.audio.clone();
        let events = self.events.clone();
        let closure = Closure::wrap(Box::new(move |_event: Event| {
            handler(&audio, &events);
        }) as Box<dyn FnMut(Event)>);

        self.audio
            .add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())
            .map_err(dom_error)?;
        self.listeners.push((name, closure));
        Ok(())
    }

    fn create_file_input(&self) -> Result<(HtmlInputElement, Listener)> {
        let existing = self
            .document
            .get_element_by_id(FILE_INPUT_ID)
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok());
        let input = match existing {
            Some(input) => input,
            None => {
                let input = self
                    .document
                    .create_element("input")
                    .map_err(dom_error)?
                    .dyn_into::<HtmlInputElement>()
                    .map_err(|_| PlayerError::Dom("created element is not an <input>".into()))?;
                input.set_type("file");
                input.set_id(FILE_INPUT_ID);
                input.set_accept("audio/*,.mp3,.wav,.ogg,.flac,.aac,.m4a");
                input
                    .style()
                    .set_property("display", "none")
                    .map_err(dom_error)?;
                self.document
                    .body()
                    .ok_or(PlayerError::NoDocument)?
                    .append_child(&input)
                    .map_err(dom_error)?;
                input
            }
        };

        let events = self.events.clone();
        let closure = Closure::wrap(Box::new(move |event: Event| {
            let Some(input) = event
                .target()
                .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
            else {
                return;
            };

            if let Some(file) = input.files().and_then(|files| files.get(0)) {
                match Url::create_object_url_with_blob(&file) {
                    Ok(object_url) => {
                        log::debug!("picked {} as {object_url}", file.name());
                        events.borrow_mut().push(MediaEvent::FilePicked(PickedFile {
                            name: file.name(),
                            object_url,
                        }));
                    }
                    Err(err) => log::error!("could not create object URL: {}", describe(&err)),
                }
            }
            // Reset so picking the same file again still fires `change`.
            input.set_value("");
        }) as Box<dyn FnMut(Event)>);

        input
            .add_event_listener_with_callback("change", closure.as_ref().unchecked_ref())
            .map_err(dom_error)?;
        Ok((input, closure))
    }

    fn revoke_object_url(&mut self) {
        if let Some(url) = self.object_url.take() {
            if let Err(err) = Url::revoke_object_url(&url) {
                log::warn!("could not revoke {url}: {}", describe(&err));
            }
        }
    }
}

impl MediaBackend for WebMediaBackend {
    fn build_graph(&mut self, fft_size: u32) -> Result<()> {
        if self.graph.is_some() {
            return Ok(());
        }

        let context = AudioContext::new().map_err(graph_error)?;
        let analyser = context.create_analyser().map_err(graph_error)?;
        analyser.set_fft_size(fft_size);

        let source = context
            .create_media_element_source(&self.audio)
            .map_err(graph_error)?;
        source.connect_with_audio_node(&analyser).map_err(graph_error)?;
        analyser
            .connect_with_audio_node(&context.destination())
            .map_err(graph_error)?;

        self.graph = Some(AudioGraph {
            context,
            analyser,
            _source: source,
        });
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        if let Some(graph) = &self.graph {
            // Contexts created before a user gesture start suspended.
            if let Err(err) = graph.context.resume() {
                log::warn!("could not resume audio context: {}", describe(&err));
            }
        }

        let promise = self
            .audio
            .play()
            .map_err(|err| PlayerError::PlaybackRejected(describe(&err)))?;

        let events = self.events.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let Err(err) = JsFuture::from(promise).await else {
                return;
            };
            let name = err.dyn_ref::<DomException>().map(DomException::name);
            if name.as_deref().is_some_and(is_interrupted_play) {
                log::debug!("play interrupted: {}", describe(&err));
                return;
            }
            events
                .borrow_mut()
                .push(MediaEvent::PlayRejected(describe(&err)));
        });
        Ok(())
    }

    fn pause(&mut self) {
        if let Err(err) = self.audio.pause() {
            log::warn!("pause failed: {}", describe(&err));
        }
    }

    fn set_volume(&mut self, volume: f64) {
        self.audio.set_volume(volume.clamp(0.0, 1.0));
    }

    fn volume(&self) -> f64 {
        self.audio.volume()
    }

    fn set_source(&mut self, uri: &str) {
        if self.object_url.as_deref() != Some(uri) {
            self.revoke_object_url();
        }
        if uri.starts_with("blob:") {
            self.object_url = Some(uri.to_string());
        }
        self.audio.set_src(uri);
    }

    fn reload(&mut self) {
        self.audio.load();
    }

    fn frequency_bin_count(&self) -> Option<usize> {
        self.graph
            .as_ref()
            .map(|graph| graph.analyser.frequency_bin_count() as usize)
    }

    fn sample_frequencies(&mut self, out: &mut [u8]) -> bool {
        match &self.graph {
            Some(graph) => {
                graph.analyser.get_byte_frequency_data(out);
                true
            }
            None => false,
        }
    }

    fn open_file_picker(&mut self) {
        if self.file_input.is_none() {
            match self.create_file_input() {
                Ok(pair) => self.file_input = Some(pair),
                Err(err) => {
                    log::error!("file picker unavailable: {err}");
                    return;
                }
            }
        }
        if let Some((input, _)) = &self.file_input {
            input.click();
        }
    }

    fn drain_events(&mut self) -> Vec<MediaEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    fn release(&mut self) {
        self.pause();

        for (name, listener) in self.listeners.drain(..) {
            if let Err(err) = self
                .audio
                .remove_event_listener_with_callback(name, listener.as_ref().unchecked_ref())
            {
                log::warn!("could not remove {name} listener: {}", describe(&err));
            }
        }

        if let Some((input, listener)) = self.file_input.take() {
            let removed = input
                .remove_event_listener_with_callback("change", listener.as_ref().unchecked_ref());
            if let Err(err) = removed {
                log::warn!("could not remove file input listener: {}", describe(&err));
            }
        }

        if let Some(graph) = self.graph.take() {
            if let Err(err) = graph.analyser.disconnect() {
                log::warn!("could not disconnect analyser: {}", describe(&err));
            }
            if let Err(err) = graph.context.close() {
                log::warn!("could not close audio context: {}", describe(&err));
            }
        }

        self.revoke_object_url();
    }
}

fn find_canvas(document: &Document, canvas_id: &str) -> Result<HtmlCanvasElement> {
    document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| PlayerError::Dom(format!("no canvas element with id '{canvas_id}'")))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| PlayerError::Dom(format!("element with id '{canvas_id}' is not a canvas")))
}

/// Mount the player on the canvas with id `canvas_id`.
pub async fn run(canvas_id: &str) -> Result<()> {
    let document = web_sys::window()
        .ok_or(PlayerError::NoWindow)?
        .document()
        .ok_or(PlayerError::NoDocument)?;
    let canvas = find_canvas(&document, canvas_id)?;

    let config = match canvas.get_attribute(CONFIG_ATTRIBUTE) {
        Some(json) => VisualizerConfig::from_json(&json)?,
        None => VisualizerConfig::default(),
    };
    let backend = WebMediaBackend::new()?;
    log::info!("mounting player on #{canvas_id}");

    eframe::WebRunner::new()
        .start(
            canvas,
            eframe::WebOptions::default(),
            Box::new(move |_cc| Ok(Box::new(PlayerApp::new(backend, config, clock_seed())))),
        )
        .await
        .map_err(dom_error)
}
