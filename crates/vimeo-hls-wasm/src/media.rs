//! `<video>` element and fullscreen host behind the core seams

use crate::dom::describe;
use crate::hls::HlsFactory;
use crate::listener::JsListener;
use js_sys::{Function, Promise, Reflect};
use tracing::{debug, warn};
use vimeo_hls_core::{Error, Fullscreen, MediaElement, Result, StreamEngineAdapter};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Document, HtmlElement, HtmlVideoElement};

/// The adapter as the browser build instantiates it
pub type WebAdapter = StreamEngineAdapter<WebMedia, HlsFactory, JsListener>;

const FULLSCREEN_ELEMENT: [&str; 4] = [
    "fullscreenElement",
    "webkitFullscreenElement",
    "mozFullScreenElement",
    "msFullscreenElement",
];
const REQUEST_FULLSCREEN: [&str; 4] = [
    "requestFullscreen",
    "webkitRequestFullscreen",
    "mozRequestFullScreen",
    "msRequestFullscreen",
];
const EXIT_FULLSCREEN: [&str; 4] = [
    "exitFullscreen",
    "webkitExitFullscreen",
    "mozCancelFullScreen",
    "msExitFullscreen",
];

/// Document events that signal a fullscreen transition
pub(crate) const FULLSCREEN_CHANGE_EVENTS: [&str; 4] = [
    "fullscreenchange",
    "webkitfullscreenchange",
    "mozfullscreenchange",
    "MSFullscreenChange",
];

/// Log a promise rejection without surfacing it
fn watch_promise(promise: Promise, what: &'static str) {
    spawn_local(async move {
        if let Err(e) = JsFuture::from(promise).await {
            debug!(error = %describe(&e), "{} rejected", what);
        }
    });
}

/// Call the first method of `names` that exists on `target`
fn call_first(target: &JsValue, names: &[&str], what: &'static str) -> Result<()> {
    for name in names {
        let Ok(method) = Reflect::get(target, &JsValue::from_str(name)) else {
            continue;
        };
        let Some(method) = method.dyn_ref::<Function>() else {
            continue;
        };
        let result = method
            .call0(target)
            .map_err(|e| Error::Fullscreen(describe(&e)))?;
        if let Ok(promise) = result.dyn_into::<Promise>() {
            watch_promise(promise, what);
        }
        return Ok(());
    }
    Err(Error::Fullscreen("fullscreen API not available".to_string()))
}

/// Video element plus the container that goes fullscreen
pub struct WebMedia {
    video: HtmlVideoElement,
    container: HtmlElement,
    document: Document,
}

impl WebMedia {
    pub fn new(video: HtmlVideoElement, container: HtmlElement, document: Document) -> Self {
        Self {
            video,
            container,
            document,
        }
    }

    pub fn video(&self) -> &HtmlVideoElement {
        &self.video
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

impl MediaElement for WebMedia {
    fn play(&self) {
        match self.video.play() {
            Ok(promise) => watch_promise(promise, "play()"),
            Err(e) => warn!(error = %describe(&e), "play() threw"),
        }
    }

    fn pause(&self) {
        if let Err(e) = self.video.pause() {
            warn!(error = %describe(&e), "pause() threw");
        }
    }

    fn is_paused(&self) -> bool {
        self.video.paused()
    }

    fn current_time(&self) -> f64 {
        self.video.current_time()
    }

    fn set_current_time(&self, seconds: f64) {
        self.video.set_current_time(seconds);
    }

    fn duration(&self) -> f64 {
        self.video.duration()
    }

    fn volume(&self) -> f64 {
        self.video.volume()
    }

    fn set_volume(&self, volume: f64) {
        self.video.set_volume(volume);
    }

    fn is_muted(&self) -> bool {
        self.video.muted()
    }

    fn set_muted(&self, muted: bool) {
        self.video.set_muted(muted);
    }

    fn buffered(&self) -> Vec<(f64, f64)> {
        let ranges = self.video.buffered();
        (0..ranges.length())
            .filter_map(|i| Some((ranges.start(i).ok()?, ranges.end(i).ok()?)))
            .collect()
    }

    fn can_play_type(&self, mime: &str) -> bool {
        !self.video.can_play_type(mime).is_empty()
    }

    fn set_src(&self, url: &str) {
        self.video.set_src(url);
    }

    fn clear_src(&self) {
        let _ = self.video.remove_attribute("src");
        self.video.load();
    }
}

impl Fullscreen for WebMedia {
    fn is_fullscreen(&self) -> bool {
        FULLSCREEN_ELEMENT.iter().any(|prop| {
            Reflect::get(&self.document, &JsValue::from_str(prop))
                .map(|element| js_sys::Object::is(&element, &self.container))
                .unwrap_or(false)
        })
    }

    fn request_fullscreen(&self) -> Result<()> {
        call_first(&self.container, &REQUEST_FULLSCREEN, "requestFullscreen()")
    }

    fn exit_fullscreen(&self) -> Result<()> {
        call_first(&self.document, &EXIT_FULLSCREEN, "exitFullscreen()")
    }
}
