//! Integration tests for vimeo-hls core

use async_trait::async_trait;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use vimeo_hls_core::{
    engine::EngineConfig, format_time, AspectRatio, EngineFactory, Error, FnListener, Fullscreen,
    LoadOutcome, LoadPlan, Loader, MediaElement, MediaEvent, PlaybackOptions, PlaybackSurface,
    ResolvedSource, Result, SourceResolver, StreamEngine, StreamEngineAdapter,
};

// =============================================================================
// Fakes
// =============================================================================

#[derive(Default)]
struct Media {
    paused: Cell<bool>,
    time: Cell<f64>,
    volume: Cell<f64>,
    muted: Cell<bool>,
    src: RefCell<Option<String>>,
}

impl MediaElement for Media {
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
        60.0
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
        vec![(0.0, 15.0)]
    }
    fn can_play_type(&self, _mime: &str) -> bool {
        true
    }
    fn set_src(&self, url: &str) {
        *self.src.borrow_mut() = Some(url.to_string())
    }
    fn clear_src(&self) {
        *self.src.borrow_mut() = None
    }
}

impl Fullscreen for Media {
    fn is_fullscreen(&self) -> bool {
        false
    }
    fn request_fullscreen(&self) -> Result<()> {
        Ok(())
    }
    fn exit_fullscreen(&self) -> Result<()> {
        Ok(())
    }
}

#[derive(Clone)]
struct NoEngine;

impl StreamEngine for NoEngine {
    fn load_source(&self, _url: &str) {}
    fn start_load(&self) {}
    fn recover_media_error(&self) {}
    fn destroy(&self) {}
}

/// Engine factory whose constructor always throws. Unsupported forces the
/// native path.
struct Factory {
    supported: bool,
}

impl EngineFactory<Media> for Factory {
    type Engine = NoEngine;
    fn is_supported(&self) -> bool {
        self.supported
    }
    fn create(&self, _config: &EngineConfig, _media: &Media) -> Result<NoEngine> {
        Err(Error::EngineFatal {
            kind: "init".into(),
            details: "Hls constructor threw".into(),
        })
    }
}

type Adapter = StreamEngineAdapter<Media, Factory, FnListener>;

fn adapter_with(engine_supported: bool) -> Rc<Adapter> {
    let media = Media {
        paused: Cell::new(true),
        volume: Cell::new(1.0),
        ..Default::default()
    };
    let factory = Factory {
        supported: engine_supported,
    };
    Rc::new(StreamEngineAdapter::new(media, factory))
}

fn new_adapter() -> Rc<Adapter> {
    adapter_with(false)
}

fn error_codes(adapter: &Adapter) -> Rc<RefCell<Vec<Option<String>>>> {
    let codes = Rc::new(RefCell::new(Vec::new()));
    let sink = codes.clone();
    adapter.on(
        MediaEvent::Error,
        FnListener::new(move |d| {
            sink.borrow_mut().push(d.error.clone().map(|e| e.code));
            Ok(())
        }),
    );
    codes
}

/// Surface over a real adapter that records what the facade rendered
struct Surface {
    adapter: Rc<Adapter>,
    loads: RefCell<Vec<String>>,
    panels: RefCell<Vec<(String, String)>>,
    loading: Cell<bool>,
}

impl Surface {
    fn new(adapter: Rc<Adapter>) -> Self {
        Self {
            adapter,
            loads: RefCell::new(Vec::new()),
            panels: RefCell::new(Vec::new()),
            loading: Cell::new(false),
        }
    }
}

impl PlaybackSurface for Surface {
    fn set_loading(&self, loading: bool) {
        self.loading.set(loading);
    }
    fn load_source(&self, url: &str) -> Result<()> {
        self.loads.borrow_mut().push(url.to_string());
        self.adapter.load_source(url).map(|_| ())
    }
    fn apply_resolved_poster(&self, _url: &str) {}
    fn show_error(&self, error: &Error) {
        self.panels
            .borrow_mut()
            .push((error.panel_title().to_string(), error.to_string()));
    }
    fn clear_error(&self) {
        self.panels.borrow_mut().clear();
    }
    fn emit_error(&self, error: &Error) {
        self.adapter.emit_error(error);
    }
}

/// Resolver with scripted outcomes for both paths
struct Scripted {
    public_ok: bool,
    auth_ok: bool,
    public_calls: Cell<u32>,
    auth_calls: Cell<u32>,
}

impl Scripted {
    fn new(public_ok: bool, auth_ok: bool) -> Self {
        Self {
            public_ok,
            auth_ok,
            public_calls: Cell::new(0),
            auth_calls: Cell::new(0),
        }
    }
}

#[async_trait(?Send)]
impl SourceResolver for Scripted {
    async fn resolve_public(&self, id: &str) -> Result<ResolvedSource> {
        self.public_calls.set(self.public_calls.get() + 1);
        tokio::task::yield_now().await;
        if self.public_ok {
            Ok(ResolvedSource {
                hls_url: format!("https://public/{}.m3u8", id),
                poster_url: None,
                title: None,
            })
        } else {
            Err(Error::CorsBlocked {
                url: format!("https://player.vimeo.com/video/{}", id),
            })
        }
    }

    async fn resolve_authenticated(&self, id: &str, token: &str) -> Result<ResolvedSource> {
        self.auth_calls.set(self.auth_calls.get() + 1);
        assert_eq!(token, "secret");
        if self.auth_ok {
            Ok(ResolvedSource {
                hls_url: format!("https://api/{}.m3u8", id),
                poster_url: None,
                title: None,
            })
        } else {
            Err(Error::NoHlsAvailable)
        }
    }
}

// =============================================================================
// Options Tests
// =============================================================================

#[test]
fn test_aspect_ratio_padding_matches_ratio() {
    for w in 1..=32 {
        for h in 1..=32 {
            let ratio: AspectRatio = format!("{}:{}", w, h).parse().unwrap();
            assert_eq!(ratio.padding_percent(), h as f64 / w as f64 * 100.0);
        }
    }
}

#[test]
fn test_options_select_plan() {
    let opts: PlaybackOptions =
        serde_json::from_str(r#"{"hlsUrl": "https://x/m.m3u8", "controls": false}"#).unwrap();
    assert!(!opts.controls);
    assert_eq!(opts.load_plan(), LoadPlan::Hls("https://x/m.m3u8".into()));
}

#[test]
fn test_format_time_boundaries() {
    assert_eq!(format_time(3599.0), "59:59");
    assert_eq!(format_time(3600.0), "1:00:00");
    assert_eq!(format_time(f64::NAN), "0:00");
}

// =============================================================================
// Load Sequence Tests
// =============================================================================

#[tokio::test]
async fn test_authenticated_fallback_loads_once() {
    let adapter = new_adapter();
    let surface = Surface::new(adapter.clone());
    let resolver = Scripted::new(false, true);
    let loader = Loader::new(resolver);

    let outcome = loader.load_vimeo(&surface, "76979871", Some("secret")).await;

    assert!(outcome.is_loaded());
    assert_eq!(*surface.loads.borrow(), vec!["https://api/76979871.m3u8"]);
    assert_eq!(adapter.media().src.borrow().as_deref(), Some("https://api/76979871.m3u8"));
    assert!(surface.panels.borrow().is_empty());
    assert!(!surface.loading.get());
}

#[tokio::test]
async fn test_token_required_panel_without_load() {
    let adapter = new_adapter();
    let errors = error_codes(&adapter);

    let surface = Surface::new(adapter.clone());
    let loader = Loader::new(Scripted::new(false, true));
    let plan = LoadPlan::Vimeo {
        id: "42".into(),
        token: None,
    };
    let outcome = loader.load(&surface, &plan).await;

    assert!(matches!(outcome, LoadOutcome::Failed(Error::AuthRequired)));
    assert!(surface.loads.borrow().is_empty());

    let panels = surface.panels.borrow();
    assert_eq!(panels.len(), 1);
    assert_eq!(panels[0].0, "Authentication required");
    assert!(panels[0].1.contains("access token required"));
    assert_eq!(*errors.borrow(), vec![Some("AUTH_REQUIRED".to_string())]);
}

#[tokio::test]
async fn test_engine_construction_failure_emits_error() {
    let adapter = adapter_with(true);
    let errors = error_codes(&adapter);
    let surface = Surface::new(adapter.clone());
    let loader = Loader::new(Scripted::new(true, false));

    let outcome = loader.load_hls(&surface, "https://x/m.m3u8").await;

    assert!(matches!(outcome, LoadOutcome::Failed(Error::EngineFatal { .. })));
    assert_eq!(surface.panels.borrow().len(), 1);
    assert_eq!(*errors.borrow(), vec![Some("ENGINE_FATAL".to_string())]);
    assert!(adapter.media().src.borrow().is_none());
    assert!(!surface.loading.get());
}

#[tokio::test]
async fn test_both_paths_fail_with_token() {
    let surface = Surface::new(new_adapter());
    let loader = Loader::new(Scripted::new(false, false));
    let outcome = loader.load_vimeo(&surface, "https://vimeo.com/42", Some("secret")).await;

    assert!(matches!(outcome, LoadOutcome::Failed(Error::NoHlsAvailable)));
    assert!(surface.loads.borrow().is_empty());
    assert_eq!(surface.panels.borrow()[0].0, "Stream unavailable");
}

#[tokio::test]
async fn test_newer_load_supersedes_older() {
    let surface = Surface::new(new_adapter());
    let loader = Loader::new(Scripted::new(true, false));

    let (first, second) = tokio::join!(
        loader.load_vimeo(&surface, "1", None),
        loader.load_vimeo(&surface, "2", None),
    );

    assert!(matches!(first, LoadOutcome::Superseded));
    assert!(second.is_loaded());
    assert_eq!(*surface.loads.borrow(), vec!["https://public/2.m3u8"]);
}

#[tokio::test]
async fn test_cancel_discards_in_flight_load() {
    let surface = Surface::new(new_adapter());
    let loader = Loader::new(Scripted::new(true, false));

    let (outcome, _) = tokio::join!(loader.load_vimeo(&surface, "1", None), async {
        loader.cancel();
    });

    assert!(matches!(outcome, LoadOutcome::Superseded));
    assert!(surface.loads.borrow().is_empty());
}

// =============================================================================
// Destroy Tests
// =============================================================================

#[tokio::test]
async fn test_destroy_clears_source_and_listeners() {
    let adapter = new_adapter();
    let surface = Surface::new(adapter.clone());
    let loader = Loader::new(Scripted::new(true, false));
    adapter.on(MediaEvent::TimeUpdate, FnListener::new(|_| Ok(())));

    loader.load_hls(&surface, "https://x/m.m3u8").await;
    assert!(adapter.media().src.borrow().is_some());

    loader.cancel();
    adapter.destroy();

    assert!(adapter.media().src.borrow().is_none());
    assert!(!adapter.has_listeners());

    adapter.play();
    adapter.pause();
    adapter.toggle_play();
    adapter.seek(5.0);
    adapter.set_volume(0.5);
    adapter.toggle_mute();
    let _ = adapter.volume();
    let _ = adapter.current_time();
    let _ = adapter.duration();
    assert_eq!(adapter.emit(MediaEvent::Play), 0);
    adapter.destroy();
}

#[test]
fn test_listeners_added_after_destroy_are_dropped() {
    let adapter = new_adapter();
    adapter.destroy();

    let registered = adapter.on(MediaEvent::Play, FnListener::new(|_| Ok(())));
    assert!(registered.is_none());
    assert!(!adapter.has_listeners());

    let errors = error_codes(&adapter);
    adapter.emit_error(&Error::NoHlsAvailable);
    assert!(errors.borrow().is_empty());
}

#[test]
fn test_buffered_percent_reads_media() {
    let adapter = new_adapter();
    assert_eq!(adapter.buffered_percent(), 25.0);
}
