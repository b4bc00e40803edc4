//! Stream engine adapter
//!
//! Uniform playback-control and event surface over the media element and,
//! when the platform supports it, the adaptive streaming engine. Playback
//! state is always read from the media element; the adapter only owns the
//! engine handle and the listener registry.

use crate::{
    engine::{
        select_path, EngineConfig, EngineFactory, FatalErrorKind, Fullscreen, MediaElement,
        PlaybackPath, RecoveryAction, StreamEngine, HLS_MIME_TYPE,
    },
    events::{dispatch, ErrorDetail, EventDetail, EventRegistry, Listener, ListenerId, MediaEvent},
    Error, Result,
};
use std::cell::{Cell, RefCell};
use tracing::{debug, info, warn};

/// Adapter over a media element `M`, an engine factory `F` and listeners `L`
pub struct StreamEngineAdapter<M, F, L>
where
    F: EngineFactory<M>,
{
    media: M,
    factory: F,
    config: EngineConfig,
    autoplay: bool,
    engine: RefCell<Option<F::Engine>>,
    path: Cell<Option<PlaybackPath>>,
    listeners: RefCell<EventRegistry<L>>,
    destroyed: Cell<bool>,
}

impl<M, F, L> StreamEngineAdapter<M, F, L>
where
    M: MediaElement + Fullscreen,
    F: EngineFactory<M>,
    L: Listener,
{
    pub fn new(media: M, factory: F) -> Self {
        Self {
            media,
            factory,
            config: EngineConfig::default(),
            autoplay: false,
            engine: RefCell::new(None),
            path: Cell::new(None),
            listeners: RefCell::new(EventRegistry::new()),
            destroyed: Cell::new(false),
        }
    }

    /// Start playback once a source is ready
    pub fn with_autoplay(mut self, autoplay: bool) -> Self {
        self.autoplay = autoplay;
        self
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn path(&self) -> Option<PlaybackPath> {
        self.path.get()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }

    fn engine(&self) -> Option<F::Engine> {
        self.engine.borrow().clone()
    }

    fn release_engine(&self) {
        let engine = self.engine.borrow_mut().take();
        if let Some(engine) = engine {
            engine.destroy();
        }
    }

    /// Load a manifest URL through the engine or natively
    pub fn load_source(&self, url: &str) -> Result<PlaybackPath> {
        if self.destroyed.get() {
            return Err(Error::Destroyed);
        }
        self.release_engine();

        let engine_supported = self.factory.is_supported();
        let native_hls = self.media.can_play_type(HLS_MIME_TYPE);
        let path = match select_path(engine_supported, native_hls) {
            Ok(path) => path,
            Err(e) => {
                warn!(url, "No HLS playback path available");
                self.emit_error(&e);
                return Err(e);
            }
        };

        match path {
            PlaybackPath::Engine => {
                let engine = match self.factory.create(&self.config, &self.media) {
                    Ok(engine) => engine,
                    Err(e) => {
                        warn!(url, error = %e, "Failed to create stream engine");
                        self.emit_error(&e);
                        return Err(e);
                    }
                };
                *self.engine.borrow_mut() = Some(engine.clone());
                engine.load_source(url);
            }
            PlaybackPath::Native => {
                self.media.set_src(url);
                if self.autoplay {
                    self.media.play();
                }
            }
        }

        info!(url, ?path, "Source loaded");
        self.path.set(Some(path));
        Ok(path)
    }

    /// Engine callback: the manifest is parsed and playback may start
    pub fn handle_manifest_parsed(&self) {
        debug!("Manifest parsed");
        if self.autoplay && !self.destroyed.get() {
            self.media.play();
        }
    }

    /// Engine callback for error events; returns the remediation taken
    pub fn handle_engine_error(
        &self,
        error_type: &str,
        fatal: bool,
        details: &str,
    ) -> Option<RecoveryAction> {
        if !fatal {
            debug!(error_type, details, "Non-fatal engine error");
            return None;
        }

        let kind = FatalErrorKind::from_engine_type(error_type);
        let action = kind.recovery();
        warn!(%kind, details, ?action, "Fatal engine error");

        match action {
            RecoveryAction::RestartLoad => {
                if let Some(engine) = self.engine() {
                    engine.start_load();
                }
            }
            RecoveryAction::RecoverMedia => {
                if let Some(engine) = self.engine() {
                    engine.recover_media_error();
                }
            }
            RecoveryAction::Teardown => {
                self.release_engine();
                self.emit_error(&Error::EngineFatal {
                    kind: kind.to_string(),
                    details: details.to_string(),
                });
            }
        }

        Some(action)
    }

    pub fn play(&self) {
        if !self.destroyed.get() {
            self.media.play();
        }
    }

    pub fn pause(&self) {
        if !self.destroyed.get() {
            self.media.pause();
        }
    }

    pub fn toggle_play(&self) {
        if self.media.is_paused() {
            self.play();
        } else {
            self.pause();
        }
    }

    pub fn is_paused(&self) -> bool {
        self.media.is_paused()
    }

    /// Seek, clamped to the known duration
    pub fn seek(&self, seconds: f64) {
        if self.destroyed.get() || seconds.is_nan() {
            return;
        }
        let duration = self.media.duration();
        let target = if duration.is_finite() {
            seconds.clamp(0.0, duration.max(0.0))
        } else {
            seconds.max(0.0)
        };
        self.media.set_current_time(target);
    }

    /// Set volume clamped to `[0, 1]`; an audible volume unmutes
    pub fn set_volume(&self, volume: f64) {
        if self.destroyed.get() || volume.is_nan() {
            return;
        }
        let volume = volume.clamp(0.0, 1.0);
        self.media.set_volume(volume);
        if volume > 0.0 && self.media.is_muted() {
            self.media.set_muted(false);
        }
    }

    pub fn volume(&self) -> f64 {
        self.media.volume()
    }

    pub fn set_muted(&self, muted: bool) {
        if !self.destroyed.get() {
            self.media.set_muted(muted);
        }
    }

    pub fn is_muted(&self) -> bool {
        self.media.is_muted()
    }

    pub fn toggle_mute(&self) {
        self.set_muted(!self.media.is_muted());
    }

    pub fn current_time(&self) -> f64 {
        self.media.current_time()
    }

    pub fn duration(&self) -> f64 {
        self.media.duration()
    }

    /// End of the last buffered range as a percentage of the duration
    pub fn buffered_percent(&self) -> f64 {
        let duration = self.media.duration();
        if !duration.is_finite() || duration <= 0.0 {
            return 0.0;
        }
        self.media
            .buffered()
            .last()
            .map_or(0.0, |(_, end)| (end / duration * 100.0).clamp(0.0, 100.0))
    }

    pub fn is_fullscreen(&self) -> bool {
        self.media.is_fullscreen()
    }

    pub fn enter_fullscreen(&self) -> Result<()> {
        if self.destroyed.get() || self.media.is_fullscreen() {
            return Ok(());
        }
        self.media.request_fullscreen()
    }

    pub fn exit_fullscreen(&self) -> Result<()> {
        if !self.media.is_fullscreen() {
            return Ok(());
        }
        self.media.exit_fullscreen()
    }

    pub fn toggle_fullscreen(&self) -> Result<()> {
        if self.media.is_fullscreen() {
            self.exit_fullscreen()
        } else {
            self.enter_fullscreen()
        }
    }

    /// Register `listener` for `event`; a destroyed adapter takes no
    /// new listeners
    pub fn on(&self, event: MediaEvent, listener: L) -> Option<ListenerId> {
        if self.is_destroyed() {
            debug!(event = event.as_str(), "Listener ignored after destroy");
            return None;
        }
        Some(self.listeners.borrow_mut().on(event, listener))
    }

    pub fn off(&self, event: MediaEvent, listener: &L) -> bool {
        self.listeners.borrow_mut().off(event, listener)
    }

    pub fn has_listeners(&self) -> bool {
        !self.listeners.borrow().is_empty()
    }

    fn detail(&self, event: MediaEvent, error: Option<&Error>) -> EventDetail {
        let duration = self.media.duration();
        EventDetail {
            event,
            current_time: self.media.current_time(),
            duration: duration.is_finite().then_some(duration),
            paused: self.media.is_paused(),
            error: error.map(ErrorDetail::from),
        }
    }

    /// Fan a media event out to its listeners; returns the failure count.
    ///
    /// No registry borrow is held while listeners run.
    pub fn emit(&self, event: MediaEvent) -> usize {
        self.emit_detail(self.detail(event, None))
    }

    /// Emit an `error` event carrying `error`
    pub fn emit_error(&self, error: &Error) -> usize {
        self.emit_detail(self.detail(MediaEvent::Error, Some(error)))
    }

    fn emit_detail(&self, detail: EventDetail) -> usize {
        let listeners = self.listeners.borrow().snapshot(detail.event);
        dispatch(&listeners, &detail)
    }

    /// Release the engine, clear the source and drop every listener.
    /// Safe to call repeatedly and before any load.
    pub fn destroy(&self) {
        if self.destroyed.replace(true) {
            return;
        }
        self.release_engine();
        self.media.clear_src();
        self.listeners.borrow_mut().clear();
        self.path.set(None);
        info!("Adapter destroyed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::FnListener;
    use std::rc::Rc;

    #[derive(Default)]
    struct FakeMedia {
        paused: Cell<bool>,
        time: Cell<f64>,
        duration: Cell<f64>,
        volume: Cell<f64>,
        muted: Cell<bool>,
        native_hls: bool,
        src: RefCell<Option<String>>,
        buffered: RefCell<Vec<(f64, f64)>>,
        fullscreen: Cell<bool>,
    }

    impl FakeMedia {
        fn new() -> Self {
            Self {
                paused: Cell::new(true),
                duration: Cell::new(f64::NAN),
                volume: Cell::new(1.0),
                ..Default::default()
            }
        }
    }

    impl MediaElement for FakeMedia {
        fn play(&self) {
            self.paused.set(false)
        }
        fn pause(&self) {
            self.paused.set(true)
        }
        fn is_paused(&self) -> bool {
            self.paused.get()
        }
        fn current_time(&self) -> f64 {
            self.time.get()
        }
        fn set_current_time(&self, seconds: f64) {
            self.time.set(seconds)
        }
        fn duration(&self) -> f64 {
            self.duration.get()
        }
        fn volume(&self) -> f64 {
            self.volume.get()
        }
        fn set_volume(&self, volume: f64) {
            self.volume.set(volume)
        }
        fn is_muted(&self) -> bool {
            self.muted.get()
        }
        fn set_muted(&self, muted: bool) {
            self.muted.set(muted)
        }
        fn buffered(&self) -> Vec<(f64, f64)> {
            self.buffered.borrow().clone()
        }
        fn can_play_type(&self, _mime: &str) -> bool {
            self.native_hls
        }
        fn set_src(&self, url: &str) {
            *self.src.borrow_mut() = Some(url.to_string())
        }
        fn clear_src(&self) {
            *self.src.borrow_mut() = None
        }
    }

    impl Fullscreen for FakeMedia {
        fn is_fullscreen(&self) -> bool {
            self.fullscreen.get()
        }
        fn request_fullscreen(&self) -> Result<()> {
            self.fullscreen.set(true);
            Ok(())
        }
        fn exit_fullscreen(&self) -> Result<()> {
            self.fullscreen.set(false);
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct FakeEngine {
        calls: Rc<RefCell<Vec<String>>>,
    }

    impl StreamEngine for FakeEngine {
        fn load_source(&self, url: &str) {
            self.calls.borrow_mut().push(format!("load {}", url))
        }
        fn start_load(&self) {
            self.calls.borrow_mut().push("start_load".into())
        }
        fn recover_media_error(&self) {
            self.calls.borrow_mut().push("recover".into())
        }
        fn destroy(&self) {
            self.calls.borrow_mut().push("destroy".into())
        }
    }

    struct FakeFactory {
        supported: bool,
        broken: bool,
        engine: FakeEngine,
    }

    impl EngineFactory<FakeMedia> for FakeFactory {
        type Engine = FakeEngine;
        fn is_supported(&self) -> bool {
            self.supported
        }
        fn create(&self, config: &EngineConfig, _media: &FakeMedia) -> Result<FakeEngine> {
            assert!(config.enable_worker);
            if self.broken {
                return Err(Error::EngineFatal {
                    kind: "init".into(),
                    details: "engine constructor threw".into(),
                });
            }
            Ok(self.engine.clone())
        }
    }

    type Adapter = StreamEngineAdapter<FakeMedia, FakeFactory, FnListener>;

    fn adapter(engine_supported: bool, native_hls: bool) -> (Adapter, FakeEngine) {
        let engine = FakeEngine::default();
        let media = FakeMedia { native_hls, ..FakeMedia::new() };
        let factory = FakeFactory {
            supported: engine_supported,
            broken: false,
            engine: engine.clone(),
        };
        (StreamEngineAdapter::new(media, factory), engine)
    }

    fn recorder(adapter: &Adapter, event: MediaEvent) -> Rc<RefCell<Vec<EventDetail>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        adapter.on(
            event,
            FnListener::new(move |d| {
                sink.borrow_mut().push(d.clone());
                Ok(())
            }),
        );
        seen
    }

    #[test]
    fn test_engine_path_preferred() {
        let (adapter, engine) = adapter(true, true);
        assert_eq!(adapter.load_source("https://cdn/m.m3u8").unwrap(), PlaybackPath::Engine);
        assert_eq!(*engine.calls.borrow(), vec!["load https://cdn/m.m3u8"]);
        assert!(adapter.media().src.borrow().is_none());

        // a second load releases the previous engine first
        adapter.load_source("https://cdn/n.m3u8").unwrap();
        assert_eq!(engine.calls.borrow()[1], "destroy");
    }

    #[test]
    fn test_native_path_sets_src() {
        let (adapter, engine) = adapter(false, true);
        assert_eq!(adapter.load_source("https://cdn/m.m3u8").unwrap(), PlaybackPath::Native);
        assert_eq!(adapter.media().src.borrow().as_deref(), Some("https://cdn/m.m3u8"));
        assert!(engine.calls.borrow().is_empty());
    }

    #[test]
    fn test_unsupported_platform_emits_error() {
        let (adapter, _) = adapter(false, false);
        let errors = recorder(&adapter, MediaEvent::Error);

        let err = adapter.load_source("https://cdn/m.m3u8").unwrap_err();
        assert!(matches!(err, Error::UnsupportedPlatform));
        assert_eq!(errors.borrow().len(), 1);
        assert_eq!(errors.borrow()[0].error.as_ref().unwrap().code, "UNSUPPORTED_PLATFORM");
        assert_eq!(adapter.path(), None);
    }

    #[test]
    fn test_engine_creation_failure_emits_error() {
        let factory = FakeFactory {
            supported: true,
            broken: true,
            engine: FakeEngine::default(),
        };
        let adapter: Adapter = StreamEngineAdapter::new(FakeMedia::new(), factory);
        let errors = recorder(&adapter, MediaEvent::Error);

        let err = adapter.load_source("https://cdn/m.m3u8").unwrap_err();
        assert!(matches!(err, Error::EngineFatal { .. }));
        assert_eq!(errors.borrow().len(), 1);
        assert_eq!(errors.borrow()[0].error.as_ref().unwrap().code, "ENGINE_FATAL");
        assert_eq!(adapter.path(), None);
        assert!(adapter.media().src.borrow().is_none());
    }

    #[test]
    fn test_fatal_error_policy() {
        let (adapter, engine) = adapter(true, false);
        let errors = recorder(&adapter, MediaEvent::Error);
        adapter.load_source("u").unwrap();

        assert_eq!(adapter.handle_engine_error("networkError", false, "fragLoadError"), None);
        assert_eq!(
            adapter.handle_engine_error("networkError", true, "manifestLoadError"),
            Some(RecoveryAction::RestartLoad)
        );
        assert_eq!(
            adapter.handle_engine_error("mediaError", true, "bufferStalledError"),
            Some(RecoveryAction::RecoverMedia)
        );
        assert!(errors.borrow().is_empty());

        assert_eq!(
            adapter.handle_engine_error("otherError", true, "internalException"),
            Some(RecoveryAction::Teardown)
        );
        assert_eq!(*engine.calls.borrow(), vec!["load u", "start_load", "recover", "destroy"]);
        assert_eq!(errors.borrow().len(), 1);
        assert_eq!(errors.borrow()[0].error.as_ref().unwrap().code, "ENGINE_FATAL");
    }

    #[test]
    fn test_volume_clamped() {
        let (adapter, _) = adapter(true, false);
        adapter.set_volume(-1.0);
        assert_eq!(adapter.volume(), 0.0);
        adapter.set_volume(2.0);
        assert_eq!(adapter.volume(), 1.0);
        adapter.set_volume(0.4);
        assert_eq!(adapter.volume(), 0.4);
    }

    #[test]
    fn test_audible_volume_unmutes() {
        let (adapter, _) = adapter(true, false);
        adapter.toggle_mute();
        assert!(adapter.is_muted());
        adapter.set_volume(0.0);
        assert!(adapter.is_muted());
        adapter.set_volume(0.5);
        assert!(!adapter.is_muted());
    }

    #[test]
    fn test_seek_clamped_to_duration() {
        let (adapter, _) = adapter(true, false);
        adapter.seek(-5.0);
        assert_eq!(adapter.current_time(), 0.0);
        adapter.seek(1e6);
        assert_eq!(adapter.current_time(), 1e6);

        adapter.media().duration.set(120.0);
        adapter.seek(500.0);
        assert_eq!(adapter.current_time(), 120.0);
        adapter.seek(30.0);
        assert_eq!(adapter.current_time(), 30.0);
    }

    #[test]
    fn test_buffered_percent() {
        let (adapter, _) = adapter(true, false);
        assert_eq!(adapter.buffered_percent(), 0.0);

        adapter.media().duration.set(200.0);
        assert_eq!(adapter.buffered_percent(), 0.0);
        *adapter.media().buffered.borrow_mut() = vec![(0.0, 20.0), (60.0, 100.0)];
        assert_eq!(adapter.buffered_percent(), 50.0);
    }

    #[test]
    fn test_toggles() {
        let (adapter, _) = adapter(true, false);
        adapter.toggle_play();
        assert!(!adapter.is_paused());
        adapter.toggle_play();
        assert!(adapter.is_paused());

        adapter.toggle_fullscreen().unwrap();
        assert!(adapter.is_fullscreen());
        adapter.toggle_fullscreen().unwrap();
        assert!(!adapter.is_fullscreen());
    }

    #[test]
    fn test_autoplay_on_manifest_parsed() {
        let (adapter, _) = adapter(true, false);
        let adapter = adapter.with_autoplay(true);
        adapter.load_source("u").unwrap();
        assert!(adapter.is_paused());
        adapter.handle_manifest_parsed();
        assert!(!adapter.is_paused());
    }

    #[test]
    fn test_listener_may_unsubscribe_during_dispatch() {
        let (adapter, _) = adapter(true, false);
        let adapter = Rc::new(adapter);
        let calls = Rc::new(Cell::new(0));

        let this: Rc<RefCell<Option<FnListener>>> = Rc::new(RefCell::new(None));
        let listener = {
            let adapter = Rc::downgrade(&adapter);
            let this = this.clone();
            let calls = calls.clone();
            FnListener::new(move |_| {
                calls.set(calls.get() + 1);
                if let (Some(adapter), Some(me)) = (adapter.upgrade(), this.borrow().as_ref()) {
                    adapter.off(MediaEvent::Ended, me);
                }
                Ok(())
            })
        };
        *this.borrow_mut() = Some(listener.clone());
        adapter.on(MediaEvent::Ended, listener);
        let later = recorder(&adapter, MediaEvent::Ended);

        adapter.emit(MediaEvent::Ended);
        adapter.emit(MediaEvent::Ended);
        assert_eq!(calls.get(), 1);
        assert_eq!(later.borrow().len(), 2);
    }

    #[test]
    fn test_destroy_is_idempotent_and_safe() {
        let (adapter, engine) = adapter(true, false);
        adapter.destroy();
        adapter.destroy();
        assert!(engine.calls.borrow().is_empty());

        let (adapter, engine) = adapter_loaded();
        recorder(&adapter, MediaEvent::Play);
        adapter.destroy();
        assert_eq!(engine.calls.borrow().last().map(String::as_str), Some("destroy"));
        assert!(adapter.media().src.borrow().is_none());
        assert!(!adapter.has_listeners());
        assert!(adapter.is_destroyed());

        // listeners added after destroy are never retained
        let late = recorder(&adapter, MediaEvent::Error);
        assert!(!adapter.has_listeners());
        adapter.emit_error(&Error::Destroyed);
        assert!(late.borrow().is_empty());

        adapter.play();
        adapter.seek(10.0);
        adapter.set_volume(0.2);
        adapter.toggle_mute();
        adapter.toggle_fullscreen().unwrap();
        assert!(adapter.is_paused());
        assert_eq!(adapter.current_time(), 0.0);
        assert!(matches!(adapter.load_source("u"), Err(Error::Destroyed)));
    }

    fn adapter_loaded() -> (Adapter, FakeEngine) {
        let (adapter, engine) = adapter(true, false);
        adapter.load_source("u").unwrap();
        (adapter, engine)
    }
}
