//! Control overlay: buttons, scrubber, volume, fullscreen and auto-hide
//!
//! Geometry and the auto-hide state machine live in
//! `vimeo_hls_core::overlay`; this module only wires them to the DOM.

use crate::dom::{self, create_button, create_element, set_class, set_style, DomListener};
use crate::listener::JsListener;
use crate::media::{WebAdapter, FULLSCREEN_CHANGE_EVENTS};
use gloo_timers::callback::Timeout;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::{debug, warn};
use vimeo_hls_core::{
    classes,
    overlay::{bar_fraction, seek_target, slider_volume, ChromeUpdate, TimerCommand, VolumeLevel},
    theme::icons,
    AutoHide, MediaEvent, ProgressView,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Event, EventTarget, HtmlElement, MouseEvent};

/// Document-level listeners alive while the scrubber is dragged
struct DragSession {
    _move: DomListener,
    _up: DomListener,
}

struct OverlayInner {
    adapter: Rc<WebAdapter>,
    document: Document,
    root: HtmlElement,
    controls: HtmlElement,
    big_play: HtmlElement,
    play_button: HtmlElement,
    progress: HtmlElement,
    buffered: HtmlElement,
    played: HtmlElement,
    time: HtmlElement,
    volume: HtmlElement,
    volume_button: HtmlElement,
    volume_slider: HtmlElement,
    volume_fill: HtmlElement,
    fullscreen_button: HtmlElement,
    auto_hide: RefCell<AutoHide>,
    timer: RefCell<Option<Timeout>>,
    drag: RefCell<Option<DragSession>>,
    dom_listeners: RefCell<Vec<DomListener>>,
    media_listeners: RefCell<Vec<(MediaEvent, JsListener)>>,
}

/// Player chrome attached to the player root
pub(crate) struct ControlOverlay {
    inner: Rc<OverlayInner>,
}

fn mouse(event: &Event) -> Option<&MouseEvent> {
    event.dyn_ref::<MouseEvent>()
}

impl ControlOverlay {
    pub(crate) fn new(
        adapter: Rc<WebAdapter>,
        root: &HtmlElement,
        document: &Document,
    ) -> Result<Self, JsValue> {
        let big_play = create_button(document, classes::BIG_PLAY, "Play", icons::PLAY)?;
        let controls_class = format!("{} {}", classes::CONTROLS, classes::CONTROLS_VISIBLE);
        let controls = create_element(document, "div", &controls_class)?;
        let play_button = create_button(document, classes::PLAY, "Play", icons::PLAY)?;

        let progress = create_element(document, "div", classes::PROGRESS)?;
        let buffered = create_element(document, "div", classes::PROGRESS_BUFFERED)?;
        let played = create_element(document, "div", classes::PROGRESS_PLAYED)?;
        progress.append_child(&buffered)?;
        progress.append_child(&played)?;

        let time = create_element(document, "div", classes::TIME)?;
        time.set_text_content(Some(&ProgressView::new(0.0, f64::NAN, 0.0).time_label()));

        let volume = create_element(document, "div", classes::VOLUME)?;
        let volume_button =
            create_button(document, classes::VOLUME_BUTTON, "Mute", icons::VOLUME_HIGH)?;
        let volume_slider = create_element(document, "div", classes::VOLUME_SLIDER)?;
        let volume_fill = create_element(document, "div", classes::VOLUME_FILL)?;
        volume_slider.append_child(&volume_fill)?;
        volume.append_child(&volume_button)?;
        volume.append_child(&volume_slider)?;

        let fullscreen_button = create_button(
            document,
            classes::FULLSCREEN,
            "Fullscreen",
            icons::FULLSCREEN_ENTER,
        )?;

        controls.append_child(&play_button)?;
        controls.append_child(&progress)?;
        controls.append_child(&time)?;
        controls.append_child(&volume)?;
        controls.append_child(&fullscreen_button)?;
        root.append_child(&big_play)?;
        root.append_child(&controls)?;

        let inner = Rc::new(OverlayInner {
            adapter,
            document: document.clone(),
            root: root.clone(),
            controls,
            big_play,
            play_button,
            progress,
            buffered,
            played,
            time,
            volume,
            volume_button,
            volume_slider,
            volume_fill,
            fullscreen_button,
            auto_hide: RefCell::new(AutoHide::new()),
            timer: RefCell::new(None),
            drag: RefCell::new(None),
            dom_listeners: RefCell::new(Vec::new()),
            media_listeners: RefCell::new(Vec::new()),
        });

        OverlayInner::wire(&inner)?;
        inner.refresh_volume();
        inner.refresh_progress();
        debug!("Control overlay attached");
        Ok(Self { inner })
    }

    /// Remove the chrome and release every listener and timer
    pub(crate) fn destroy(&self) {
        let inner = &self.inner;
        for (event, listener) in inner.media_listeners.borrow_mut().drain(..) {
            inner.adapter.off(event, &listener);
        }
        inner.dom_listeners.borrow_mut().clear();
        inner.drag.borrow_mut().take();
        inner.timer.borrow_mut().take();
        dom::remove(&inner.big_play);
        dom::remove(&inner.controls);
        debug!("Control overlay removed");
    }
}

impl OverlayInner {
    fn listen<F>(
        this: &Rc<Self>,
        target: &EventTarget,
        event: &'static str,
        handler: F,
    ) -> Result<(), JsValue>
    where
        F: Fn(&Rc<Self>, &Event) + 'static,
    {
        let weak = Rc::downgrade(this);
        let listener = DomListener::new(target, event, move |e| {
            if let Some(inner) = weak.upgrade() {
                handler(&inner, &e);
            }
        })?;
        this.dom_listeners.borrow_mut().push(listener);
        Ok(())
    }

    fn subscribe(this: &Rc<Self>, event: MediaEvent, handler: fn(&Rc<Self>)) {
        let weak: Weak<Self> = Rc::downgrade(this);
        let listener = JsListener::from_fn(move || {
            if let Some(inner) = weak.upgrade() {
                handler(&inner);
            }
        });
        this.adapter.on(event, listener.clone());
        this.media_listeners.borrow_mut().push((event, listener));
    }

    fn wire(this: &Rc<Self>) -> Result<(), JsValue> {
        let video: EventTarget = this.adapter.media().video().clone().into();

        for button in [&this.play_button, &this.big_play] {
            Self::listen(this, button, "click", |inner, _| inner.toggle_play())?;
        }
        Self::listen(this, &video, "click", |inner, _| inner.toggle_play())?;
        Self::listen(this, &video, "volumechange", |inner, _| inner.refresh_volume())?;
        Self::listen(this, &video, "progress", |inner, _| inner.refresh_progress())?;

        Self::listen(this, &this.progress, "mousedown", |inner, e| {
            if let Some(e) = mouse(e) {
                e.prevent_default();
                inner.seek_to_pointer(e);
                Self::start_drag(inner);
            }
        })?;

        Self::listen(this, &this.volume_button, "click", |inner, _| {
            inner.adapter.toggle_mute();
            inner.refresh_volume();
        })?;
        Self::listen(this, &this.volume_slider, "click", |inner, e| {
            if let Some(e) = mouse(e) {
                let rect = inner.volume_slider.get_bounding_client_rect();
                let volume = slider_volume(e.client_y() as f64, rect.top(), rect.height());
                inner.adapter.set_volume(volume);
                inner.adapter.set_muted(false);
                inner.refresh_volume();
            }
        })?;

        Self::listen(this, &this.fullscreen_button, "click", |inner, _| {
            if let Err(e) = inner.adapter.toggle_fullscreen() {
                warn!(error = %e, "Fullscreen toggle failed");
            }
        })?;
        let document: EventTarget = this.document.clone().into();
        for event in FULLSCREEN_CHANGE_EVENTS {
            Self::listen(this, &document, event, |inner, _| inner.refresh_fullscreen())?;
        }

        Self::listen(this, &this.root, "mousemove", |inner, _| {
            let update = inner.auto_hide.borrow_mut().pointer_moved(inner.is_playing());
            Self::apply_chrome(inner, update);
        })?;
        Self::listen(this, &this.root, "mouseleave", |inner, _| {
            let update = inner.auto_hide.borrow_mut().pointer_left(inner.is_playing());
            Self::apply_chrome(inner, update);
        })?;

        Self::subscribe(this, MediaEvent::Play, |inner| {
            inner.refresh_play_state();
            let update = inner.auto_hide.borrow_mut().playback_started();
            Self::apply_chrome(inner, update);
        });
        for event in [MediaEvent::Pause, MediaEvent::Ended] {
            Self::subscribe(this, event, |inner| {
                inner.refresh_play_state();
                let update = inner.auto_hide.borrow_mut().playback_stopped();
                Self::apply_chrome(inner, update);
            });
        }
        for event in [MediaEvent::TimeUpdate, MediaEvent::LoadedMetadata] {
            Self::subscribe(this, event, |inner| inner.refresh_progress());
        }

        Ok(())
    }

    fn is_playing(&self) -> bool {
        !self.adapter.is_paused()
    }

    fn toggle_play(&self) {
        self.adapter.toggle_play();
    }

    fn seek_to_pointer(&self, event: &MouseEvent) {
        let rect = self.progress.get_bounding_client_rect();
        let fraction = bar_fraction(event.client_x() as f64, rect.left(), rect.width());
        if let Some(target) = seek_target(fraction, self.adapter.duration()) {
            self.adapter.seek(target);
            self.refresh_progress();
        }
    }

    fn start_drag(this: &Rc<Self>) {
        let document: EventTarget = this.document.clone().into();

        let weak = Rc::downgrade(this);
        let on_move = DomListener::new(&document, "mousemove", move |e| {
            if let (Some(inner), Some(e)) = (weak.upgrade(), mouse(&e)) {
                inner.seek_to_pointer(e);
            }
        });
        let weak = Rc::downgrade(this);
        let on_up = DomListener::new(&document, "mouseup", move |_| {
            if let Some(inner) = weak.upgrade() {
                let session = inner.drag.borrow_mut().take();
                drop(session);
            }
        });

        match (on_move, on_up) {
            (Ok(on_move), Ok(on_up)) => {
                *this.drag.borrow_mut() = Some(DragSession {
                    _move: on_move,
                    _up: on_up,
                });
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %dom::describe(&e), "Failed to start scrub drag")
            }
        }
    }

    fn apply_chrome(this: &Rc<Self>, update: ChromeUpdate) {
        set_class(&this.controls, classes::CONTROLS_VISIBLE, update.visible);
        match update.timer {
            TimerCommand::Keep => {}
            TimerCommand::Cancel => {
                this.timer.borrow_mut().take();
            }
            TimerCommand::Restart(delay_ms) => {
                this.timer.borrow_mut().take();
                let weak = Rc::downgrade(this);
                let timeout = Timeout::new(delay_ms, move || {
                    if let Some(inner) = weak.upgrade() {
                        let playing = inner.is_playing();
                        let update = inner.auto_hide.borrow_mut().timer_elapsed(playing);
                        Self::apply_chrome(&inner, update);
                    }
                });
                *this.timer.borrow_mut() = Some(timeout);
            }
        }
    }

    fn refresh_play_state(&self) {
        let playing = self.is_playing();
        set_class(&self.root, classes::PLAYING, playing);
        let (icon, label) = if playing {
            (icons::PAUSE, "Pause")
        } else {
            (icons::PLAY, "Play")
        };
        self.play_button.set_inner_html(icon);
        let _ = self.play_button.set_attribute("aria-label", label);
    }

    fn refresh_progress(&self) {
        let view = ProgressView::new(
            self.adapter.current_time(),
            self.adapter.duration(),
            self.adapter.buffered_percent(),
        );
        set_style(&self.played, "width", &format!("{}%", view.played_percent));
        set_style(&self.buffered, "width", &format!("{}%", view.buffered_percent));
        self.time.set_text_content(Some(&view.time_label()));
    }

    fn refresh_volume(&self) {
        let volume = self.adapter.volume();
        let muted = self.adapter.is_muted();
        let icon = match VolumeLevel::from_state(volume, muted) {
            VolumeLevel::Muted => icons::VOLUME_MUTED,
            VolumeLevel::Low => icons::VOLUME_LOW,
            VolumeLevel::High => icons::VOLUME_HIGH,
        };
        self.volume_button.set_inner_html(icon);
        let _ = self
            .volume_button
            .set_attribute("aria-label", if muted { "Unmute" } else { "Mute" });
        set_class(&self.volume, classes::MUTED, muted);
        set_style(&self.volume_fill, "height", &format!("{}%", volume * 100.0));
    }

    fn refresh_fullscreen(&self) {
        let fullscreen = self.adapter.is_fullscreen();
        set_class(&self.root, classes::IS_FULLSCREEN, fullscreen);
        let icon = if fullscreen {
            icons::FULLSCREEN_EXIT
        } else {
            icons::FULLSCREEN_ENTER
        };
        self.fullscreen_button.set_inner_html(icon);
    }
}
