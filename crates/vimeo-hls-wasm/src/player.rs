//! Player facade exported to JavaScript
//!
//! ```javascript
//! const player = new Player('#video', { vimeoId: '76979871', controls: true });
//! player.on('timeupdate', (e) => console.log(e.currentTime));
//! ```

use crate::dom::{self, create_element, js_error, set_class, set_style, DomListener};
use crate::hls::HlsFactory;
use crate::listener::JsListener;
use crate::media::{WebAdapter, WebMedia};
use crate::overlay::ControlOverlay;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use tracing::{debug, info, warn};
use vimeo_hls_core::{
    classes, theme::STYLE_ELEMENT_ID, Error, LoadPlan, Loader, MediaEvent, PlaybackOptions,
    PlaybackSurface, PlayerTheme, Result, StreamEngineAdapter, VimeoResolver,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::future_to_promise;
use web_sys::{Document, Element, EventTarget, HtmlElement, HtmlVideoElement};

fn resolve_container(
    document: &Document,
    container: &JsValue,
) -> std::result::Result<Element, JsValue> {
    if let Some(selector) = container.as_string() {
        return document
            .query_selector(&selector)?
            .ok_or_else(|| js_error(&Error::ContainerNotFound { selector }));
    }
    container.dyn_ref::<Element>().cloned().ok_or_else(|| {
        js_error(&Error::InvalidConfig(
            "container must be an element or a CSS selector".into(),
        ))
    })
}

/// Add the player stylesheet unless the document already has it
fn inject_styles(document: &Document) -> std::result::Result<(), JsValue> {
    if document.get_element_by_id(STYLE_ELEMENT_ID).is_some() {
        return Ok(());
    }
    let style = document.create_element("style")?;
    style.set_id(STYLE_ELEMENT_ID);
    style.set_text_content(Some(&PlayerTheme::default().to_css()));

    match document.head() {
        Some(head) => head.append_child(&style)?,
        None => document
            .document_element()
            .ok_or_else(|| dom::js_message("document has no root element"))?
            .append_child(&style)?,
    };
    debug!("Stylesheet injected");
    Ok(())
}

fn parse_options(options: JsValue) -> std::result::Result<PlaybackOptions, JsValue> {
    if options.is_undefined() || options.is_null() {
        return Ok(PlaybackOptions::default());
    }
    serde_wasm_bindgen::from_value(options)
        .map_err(|e| js_error(&Error::InvalidConfig(e.to_string())))
}

struct PlayerInner {
    options: PlaybackOptions,
    adapter: Rc<WebAdapter>,
    loader: Loader<VimeoResolver>,
    document: Document,
    root: HtmlElement,
    error_panel: RefCell<Option<HtmlElement>>,
    overlay: RefCell<Option<ControlOverlay>>,
    native_listeners: RefCell<Vec<DomListener>>,
    destroyed: Cell<bool>,
}

impl PlayerInner {
    fn video(&self) -> &HtmlVideoElement {
        self.adapter.media().video()
    }

    /// Forward the element's own events to adapter listeners
    fn forward_media_events(&self) -> std::result::Result<(), JsValue> {
        let target: EventTarget = self.video().clone().into();
        let mut listeners = Vec::with_capacity(MediaEvent::ALL.len());

        for event in MediaEvent::ALL {
            let adapter: Weak<WebAdapter> = Rc::downgrade(&self.adapter);
            let listener = DomListener::new(&target, event.as_str(), move |_| {
                let Some(adapter) = adapter.upgrade() else {
                    return;
                };
                if event == MediaEvent::Error {
                    let code = adapter.media().video().error().map_or(0, |e| e.code());
                    adapter.emit_error(&Error::MediaElement { code });
                } else {
                    adapter.emit(event);
                }
            })?;
            listeners.push(listener);
        }

        *self.native_listeners.borrow_mut() = listeners;
        Ok(())
    }

    async fn run(self: Rc<Self>, plan: LoadPlan) -> bool {
        if self.destroyed.get() {
            debug!("Load ignored after destroy");
            return false;
        }
        self.loader.load(&*self, &plan).await.is_loaded()
    }
}

impl PlaybackSurface for PlayerInner {
    fn set_loading(&self, loading: bool) {
        set_class(&self.root, classes::LOADING, loading);
    }

    fn load_source(&self, url: &str) -> Result<()> {
        self.adapter.load_source(url).map(|_| ())
    }

    fn apply_resolved_poster(&self, url: &str) {
        if self.options.poster.is_none() {
            self.video().set_poster(url);
        }
    }

    fn show_error(&self, error: &Error) {
        self.clear_error();
        let panel = (|| -> std::result::Result<HtmlElement, JsValue> {
            let panel = create_element(&self.document, "div", classes::ERROR)?;
            let title = create_element(&self.document, "div", classes::ERROR_TITLE)?;
            title.set_text_content(Some(error.panel_title()));
            let message = create_element(&self.document, "div", classes::ERROR_MESSAGE)?;
            message.set_text_content(Some(&error.to_string()));
            panel.append_child(&title)?;
            panel.append_child(&message)?;
            self.root.append_child(&panel)?;
            Ok(panel)
        })();

        match panel {
            Ok(panel) => *self.error_panel.borrow_mut() = Some(panel),
            Err(e) => warn!(error = %dom::describe(&e), "Failed to render error panel"),
        }
    }

    fn clear_error(&self) {
        if let Some(panel) = self.error_panel.borrow_mut().take() {
            dom::remove(&panel);
        }
    }

    fn emit_error(&self, error: &Error) {
        self.adapter.emit_error(error);
    }
}

/// Embeddable HLS / Vimeo player
#[wasm_bindgen]
pub struct Player {
    inner: Rc<PlayerInner>,
}

#[wasm_bindgen]
impl Player {
    /// Build a player inside `container` (element or CSS selector).
    ///
    /// Throws when the container cannot be found or the options are
    /// malformed. Source loading starts in the background.
    #[wasm_bindgen(constructor)]
    pub fn new(container: JsValue, options: JsValue) -> std::result::Result<Player, JsValue> {
        let options = parse_options(options)?;
        let document = dom::document()?;
        let container = resolve_container(&document, &container)?;
        inject_styles(&document)?;

        let root = create_element(&document, "div", classes::PLAYER)?;
        set_style(&root, "padding-top", &options.aspect_ratio().padding_css());

        let video: HtmlVideoElement = create_element(&document, "video", classes::VIDEO)?
            .dyn_into()
            .map_err(|_| dom::js_message("created element is not a video element"))?;
        video.set_attribute("playsinline", "")?;
        video.set_muted(options.muted);
        video.set_default_muted(options.muted);
        video.set_autoplay(options.autoplay);
        if let Some(poster) = &options.poster {
            video.set_poster(poster);
        }
        root.append_child(&video)?;
        container.append_child(&root)?;

        let media = WebMedia::new(video, root.clone(), document.clone());
        let autoplay = options.autoplay;
        let adapter = Rc::new_cyclic(|weak: &Weak<WebAdapter>| {
            StreamEngineAdapter::new(media, HlsFactory::new(weak.clone())).with_autoplay(autoplay)
        });

        let overlay = if options.controls {
            Some(ControlOverlay::new(adapter.clone(), &root, &document)?)
        } else {
            None
        };

        let plan = options.load_plan();
        let inner = Rc::new(PlayerInner {
            options,
            adapter,
            loader: Loader::new(VimeoResolver::new()),
            document,
            root,
            error_panel: RefCell::new(None),
            overlay: RefCell::new(overlay),
            native_listeners: RefCell::new(Vec::new()),
            destroyed: Cell::new(false),
        });
        inner.forward_media_events()?;

        info!(controls = inner.options.controls, "Player created");
        if plan != LoadPlan::Nothing {
            let loading = inner.clone();
            wasm_bindgen_futures::spawn_local(async move {
                loading.run(plan).await;
            });
        }

        Ok(Player { inner })
    }

    pub fn play(&self) {
        self.inner.adapter.play();
    }

    pub fn pause(&self) {
        self.inner.adapter.pause();
    }

    #[wasm_bindgen(js_name = togglePlay)]
    pub fn toggle_play(&self) {
        self.inner.adapter.toggle_play();
    }

    /// Seek to `seconds`, clamped to the duration
    pub fn seek(&self, seconds: f64) {
        self.inner.adapter.seek(seconds);
    }

    #[wasm_bindgen(js_name = setVolume)]
    pub fn set_volume(&self, volume: f64) {
        self.inner.adapter.set_volume(volume);
    }

    #[wasm_bindgen(js_name = getVolume)]
    pub fn get_volume(&self) -> f64 {
        self.inner.adapter.volume()
    }

    #[wasm_bindgen(js_name = toggleMute)]
    pub fn toggle_mute(&self) {
        self.inner.adapter.toggle_mute();
    }

    #[wasm_bindgen(js_name = getCurrentTime)]
    pub fn get_current_time(&self) -> f64 {
        self.inner.adapter.current_time()
    }

    /// NaN until metadata is loaded
    #[wasm_bindgen(js_name = getDuration)]
    pub fn get_duration(&self) -> f64 {
        self.inner.adapter.duration()
    }

    #[wasm_bindgen(js_name = toggleFullscreen)]
    pub fn toggle_fullscreen(&self) {
        if let Err(e) = self.inner.adapter.toggle_fullscreen() {
            warn!(error = %e, "Fullscreen toggle failed");
        }
    }

    /// Subscribe to `play`, `pause`, `ended`, `timeupdate`,
    /// `loadedmetadata` or `error`
    pub fn on(
        &self,
        event: &str,
        callback: js_sys::Function,
    ) -> std::result::Result<(), JsValue> {
        let event: MediaEvent = event.parse().map_err(|e: Error| js_error(&e))?;
        self.inner.adapter.on(event, JsListener::new(callback));
        Ok(())
    }

    /// Remove a callback added with `on`; returns whether it was registered
    pub fn off(&self, event: &str, callback: js_sys::Function) -> bool {
        match event.parse::<MediaEvent>() {
            Ok(event) => self.inner.adapter.off(event, &JsListener::new(callback)),
            Err(_) => false,
        }
    }

    /// Load a manifest URL. Resolves to whether a source was loaded.
    #[wasm_bindgen(js_name = loadHls)]
    pub fn load_hls(&self, url: String) -> js_sys::Promise {
        self.spawn(LoadPlan::Hls(url))
    }

    /// Resolve a Vimeo id or URL and load it. Resolves to whether a
    /// source was loaded; failures render the error panel instead of
    /// rejecting.
    #[wasm_bindgen(js_name = loadVimeo)]
    pub fn load_vimeo(&self, id: String, access_token: Option<String>) -> js_sys::Promise {
        let token = access_token
            .filter(|t| !t.trim().is_empty())
            .or_else(|| self.inner.options.access_token());
        self.spawn(LoadPlan::Vimeo { id, token })
    }

    /// Tear the player down. Idempotent; every other method stays safe to
    /// call afterwards.
    pub fn destroy(&self) {
        let inner = &self.inner;
        if inner.destroyed.replace(true) {
            return;
        }
        inner.loader.cancel();

        let overlay = inner.overlay.borrow_mut().take();
        if let Some(overlay) = overlay {
            overlay.destroy();
        }
        inner.native_listeners.borrow_mut().clear();
        inner.clear_error();
        inner.adapter.destroy();
        dom::remove(&inner.root);
        info!("Player destroyed");
    }
}

impl Player {
    fn spawn(&self, plan: LoadPlan) -> js_sys::Promise {
        let inner = self.inner.clone();
        future_to_promise(async move { Ok(JsValue::from_bool(inner.run(plan).await)) })
    }
}
