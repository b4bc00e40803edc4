//! Seams to the media element and the adaptive streaming engine

use crate::{Error, Result};
use serde::Serialize;
use std::fmt;

/// MIME type checked for native HLS playback
pub const HLS_MIME_TYPE: &str = "application/vnd.apple.mpegurl";

/// Engine event fired once the manifest is parsed
pub const MANIFEST_PARSED_EVENT: &str = "hlsManifestParsed";
/// Engine error event
pub const ENGINE_ERROR_EVENT: &str = "hlsError";

/// The native media element; the only source of playback state
pub trait MediaElement {
    fn play(&self);
    fn pause(&self);
    fn is_paused(&self) -> bool;
    fn current_time(&self) -> f64;
    fn set_current_time(&self, seconds: f64);
    /// NaN until metadata is loaded
    fn duration(&self) -> f64;
    fn volume(&self) -> f64;
    fn set_volume(&self, volume: f64);
    fn is_muted(&self) -> bool;
    fn set_muted(&self, muted: bool);
    /// Buffered `(start, end)` ranges in seconds
    fn buffered(&self) -> Vec<(f64, f64)>;
    fn can_play_type(&self, mime: &str) -> bool;
    fn set_src(&self, url: &str);
    /// Remove the source and reset the element
    fn clear_src(&self);
}

/// Fullscreen primitives of the hosting surface
pub trait Fullscreen {
    fn is_fullscreen(&self) -> bool;
    fn request_fullscreen(&self) -> Result<()>;
    fn exit_fullscreen(&self) -> Result<()>;
}

/// A live instance of the adaptive streaming engine.
///
/// Implementations are cheap handles; the adapter clones them out of its
/// cell before calling so engine callbacks may re-enter the adapter.
pub trait StreamEngine: Clone {
    fn load_source(&self, url: &str);
    fn start_load(&self);
    fn recover_media_error(&self);
    fn destroy(&self);
}

/// Creates engines bound to a media element
pub trait EngineFactory<M> {
    type Engine: StreamEngine;

    /// Whether the platform can run the engine (Media Source Extensions)
    fn is_supported(&self) -> bool;

    /// Create an engine attached to `media` and subscribed to its
    /// manifest-parsed and error events
    fn create(&self, config: &EngineConfig, media: &M) -> Result<Self::Engine>;
}

/// Engine construction settings, serialized as the hls.js config object
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Parse segments in a web worker
    pub enable_worker: bool,
    /// Seconds of already-played media kept in the buffer
    pub back_buffer_length: f64,
    pub low_latency_mode: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enable_worker: true,
            back_buffer_length: 90.0,
            low_latency_mode: false,
        }
    }
}

/// How a source ended up playing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackPath {
    /// Through the adaptive engine on Media Source Extensions
    Engine,
    /// Through the element's own HLS support
    Native,
}

/// Engine before native; no fallback between the two once chosen
pub fn select_path(engine_supported: bool, native_hls: bool) -> Result<PlaybackPath> {
    if engine_supported {
        Ok(PlaybackPath::Engine)
    } else if native_hls {
        Ok(PlaybackPath::Native)
    } else {
        Err(Error::UnsupportedPlatform)
    }
}

/// Class of a fatal engine error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatalErrorKind {
    Network,
    Media,
    Other,
}

/// Remediation for a fatal engine error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Restart loading
    RestartLoad,
    /// Ask the engine to recover its decoder state
    RecoverMedia,
    /// Destroy the engine and report the error
    Teardown,
}

impl FatalErrorKind {
    /// Classify the engine's `type` field
    pub fn from_engine_type(error_type: &str) -> Self {
        match error_type {
            "networkError" => FatalErrorKind::Network,
            "mediaError" => FatalErrorKind::Media,
            _ => FatalErrorKind::Other,
        }
    }

    pub fn recovery(&self) -> RecoveryAction {
        match self {
            FatalErrorKind::Network => RecoveryAction::RestartLoad,
            FatalErrorKind::Media => RecoveryAction::RecoverMedia,
            FatalErrorKind::Other => RecoveryAction::Teardown,
        }
    }
}

impl fmt::Display for FatalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FatalErrorKind::Network => write!(f, "network"),
            FatalErrorKind::Media => write!(f, "media"),
            FatalErrorKind::Other => write!(f, "other"),
        }
    }
}
