//! vimeo-hls core - platform-independent logic of the embeddable HLS player
//!
//! This crate holds everything that does not need a browser:
//! - Player options and load planning
//! - Vimeo id extraction and HLS manifest resolution
//! - The stream engine adapter (path selection, fatal-error policy, events)
//! - Control overlay arithmetic and auto-hide state
//! - Load sequencing with generation guards
//! - The CSS class contract and stylesheet
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Player facade                            │
//! │                 (vimeo-hls-wasm, Loader here)                   │
//! ├──────────────────────────┬──────────────────────────────────────┤
//! │                          │                                      │
//! │  ┌──────────────┐   ┌────┴─────────┐   ┌──────────────┐         │
//! │  │    Vimeo     │   │    Stream    │   │   Control    │         │
//! │  │   Resolver   │──▶│    Engine    │◀──│   Overlay    │         │
//! │  └──────┬───────┘   │   Adapter    │   └──────────────┘         │
//! │         │           └──────┬───────┘                            │
//! │  ┌──────┴───────┐   ┌──────┴───────┐   ┌──────────────┐         │
//! │  │    HTTP      │   │    Media     │   │    Event     │         │
//! │  │  Transport   │   │ Element/hls  │   │   Registry   │         │
//! │  └──────────────┘   └──────────────┘   └──────────────┘         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod adapter;
pub mod engine;
pub mod error;
pub mod events;
pub mod loader;
pub mod options;
pub mod overlay;
pub mod theme;
pub mod transport;
pub mod vimeo;

pub use adapter::StreamEngineAdapter;
pub use engine::{
    EngineConfig, EngineFactory, FatalErrorKind, Fullscreen, MediaElement, PlaybackPath,
    RecoveryAction, StreamEngine,
};
pub use error::{Error, Result};
pub use events::{EventDetail, EventRegistry, FnListener, Listener, ListenerId, MediaEvent};
pub use loader::{LoadOutcome, Loader, PlaybackSurface};
pub use options::{AspectRatio, LoadPlan, PlaybackOptions};
pub use overlay::{format_time, AutoHide, ProgressView};
pub use theme::{classes, PlayerTheme};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
pub use vimeo::{extract_video_id, ResolvedSource, SourceResolver, VimeoResolver};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log library startup
pub fn init() {
    tracing::info!(version = VERSION, "vimeo-hls core initialized");
}
