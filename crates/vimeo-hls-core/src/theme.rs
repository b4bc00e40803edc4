//! Styling contract: CSS class names, colors, the injected stylesheet and icons
//!
//! The class names are a stable interface. A page may replace the injected
//! stylesheet entirely as long as it targets these names.
//!
//! ```rust
//! use vimeo_hls_core::theme::{classes, PlayerTheme};
//!
//! let css = PlayerTheme::default().to_css();
//! assert!(css.contains(classes::CONTROLS));
//! ```

use serde::Serialize;

/// Class names shared by the markup and the stylesheet
pub mod classes {
    pub const PLAYER: &str = "vimeo-hls-player";
    pub const VIDEO: &str = "vimeo-hls-video";
    pub const CONTROLS: &str = "vimeo-hls-controls";
    pub const CONTROLS_VISIBLE: &str = "vimeo-hls-controls-visible";
    pub const BIG_PLAY: &str = "vimeo-hls-big-play";
    pub const BUTTON: &str = "vimeo-hls-button";
    pub const PLAY: &str = "vimeo-hls-play";
    pub const PROGRESS: &str = "vimeo-hls-progress";
    pub const PROGRESS_BUFFERED: &str = "vimeo-hls-progress-buffered";
    pub const PROGRESS_PLAYED: &str = "vimeo-hls-progress-played";
    pub const TIME: &str = "vimeo-hls-time";
    pub const VOLUME: &str = "vimeo-hls-volume";
    pub const VOLUME_BUTTON: &str = "vimeo-hls-volume-button";
    pub const VOLUME_SLIDER: &str = "vimeo-hls-volume-slider";
    pub const VOLUME_FILL: &str = "vimeo-hls-volume-fill";
    pub const FULLSCREEN: &str = "vimeo-hls-fullscreen";
    pub const ERROR: &str = "vimeo-hls-error";
    pub const ERROR_TITLE: &str = "vimeo-hls-error-title";
    pub const ERROR_MESSAGE: &str = "vimeo-hls-error-message";

    // State markers
    pub const LOADING: &str = "loading";
    pub const PLAYING: &str = "playing";
    pub const MUTED: &str = "muted";
    pub const IS_FULLSCREEN: &str = "is-fullscreen";

    /// Every class the stylesheet must cover
    pub const ALL: &[&str] = &[
        PLAYER, VIDEO, CONTROLS, CONTROLS_VISIBLE, BIG_PLAY, BUTTON, PLAY, PROGRESS,
        PROGRESS_BUFFERED, PROGRESS_PLAYED, TIME, VOLUME, VOLUME_BUTTON, VOLUME_SLIDER,
        VOLUME_FILL, FULLSCREEN, ERROR, ERROR_TITLE, ERROR_MESSAGE, LOADING, PLAYING,
        MUTED, IS_FULLSCREEN,
    ];
}

/// `id` of the injected `<style>` element, used to inject it once
pub const STYLE_ELEMENT_ID: &str = "vimeo-hls-styles";

/// Player palette
#[derive(Debug, Clone, Serialize)]
pub struct PlayerColors {
    /// Accent for progress and the big play button - #00adef
    pub accent: &'static str,
    /// Video letterbox background
    pub background: &'static str,
    /// Control text and icons
    pub text: &'static str,
    /// Unplayed track
    pub track: &'static str,
    /// Buffered part of the track
    pub buffered: &'static str,
    /// Error panel background
    pub error: &'static str,
}

impl Default for PlayerColors {
    fn default() -> Self {
        Self {
            accent: "#00adef",
            background: "#000000",
            text: "#ffffff",
            track: "rgba(255, 255, 255, 0.2)",
            buffered: "rgba(255, 255, 255, 0.4)",
            error: "rgba(20, 20, 20, 0.92)",
        }
    }
}

/// Complete theme
#[derive(Debug, Clone, Serialize)]
pub struct PlayerTheme {
    pub colors: PlayerColors,
    /// Height of the control bar in pixels
    pub controls_height: u16,
    /// Opacity transition of the auto-hiding chrome, in milliseconds
    pub fade_ms: u16,
}

impl Default for PlayerTheme {
    fn default() -> Self {
        Self {
            colors: PlayerColors::default(),
            controls_height: 44,
            fade_ms: 300,
        }
    }
}

impl PlayerTheme {
    /// CSS custom properties for the theme
    pub fn css_variables(&self) -> String {
        format!(
            r#".vimeo-hls-player {{
  --vimeo-hls-accent: {};
  --vimeo-hls-background: {};
  --vimeo-hls-text: {};
  --vimeo-hls-track: {};
  --vimeo-hls-buffered: {};
  --vimeo-hls-error: {};
  --vimeo-hls-controls-height: {}px;
  --vimeo-hls-fade: {}ms;
}}"#,
            self.colors.accent,
            self.colors.background,
            self.colors.text,
            self.colors.track,
            self.colors.buffered,
            self.colors.error,
            self.controls_height,
            self.fade_ms,
        )
    }

    /// Complete stylesheet injected by the player
    pub fn to_css(&self) -> String {
        format!("{}\n{}", self.css_variables(), PLAYER_CSS)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

const PLAYER_CSS: &str = r#"
.vimeo-hls-player {
  position: relative;
  width: 100%;
  height: 0;
  overflow: hidden;
  background: var(--vimeo-hls-background);
  font-family: system-ui, -apple-system, sans-serif;
  color: var(--vimeo-hls-text);
  user-select: none;
}

.vimeo-hls-player.is-fullscreen {
  height: 100%;
  padding-top: 0 !important;
}

.vimeo-hls-video {
  position: absolute;
  top: 0;
  left: 0;
  width: 100%;
  height: 100%;
  background: var(--vimeo-hls-background);
  cursor: pointer;
}

.vimeo-hls-controls {
  position: absolute;
  left: 0;
  right: 0;
  bottom: 0;
  height: var(--vimeo-hls-controls-height);
  display: flex;
  align-items: center;
  gap: 8px;
  padding: 0 10px;
  background: linear-gradient(transparent, rgba(0, 0, 0, 0.8));
  opacity: 0;
  transition: opacity var(--vimeo-hls-fade) ease;
  z-index: 2;
}

.vimeo-hls-controls.vimeo-hls-controls-visible {
  opacity: 1;
}

.vimeo-hls-button {
  background: none;
  border: none;
  padding: 4px;
  width: 32px;
  height: 32px;
  color: var(--vimeo-hls-text);
  cursor: pointer;
}

.vimeo-hls-button svg {
  width: 100%;
  height: 100%;
  fill: currentColor;
}

.vimeo-hls-play {
  flex: none;
}

.vimeo-hls-big-play {
  position: absolute;
  top: 50%;
  left: 50%;
  width: 72px;
  height: 72px;
  margin: -36px 0 0 -36px;
  border: none;
  border-radius: 50%;
  background: var(--vimeo-hls-accent);
  color: var(--vimeo-hls-text);
  cursor: pointer;
  z-index: 2;
}

.vimeo-hls-player.playing .vimeo-hls-big-play,
.vimeo-hls-player.loading .vimeo-hls-big-play {
  display: none;
}

.vimeo-hls-progress {
  position: relative;
  flex: 1;
  height: 6px;
  border-radius: 3px;
  background: var(--vimeo-hls-track);
  cursor: pointer;
}

.vimeo-hls-progress-buffered,
.vimeo-hls-progress-played {
  position: absolute;
  top: 0;
  left: 0;
  height: 100%;
  width: 0;
  border-radius: 3px;
  pointer-events: none;
}

.vimeo-hls-progress-buffered {
  background: var(--vimeo-hls-buffered);
}

.vimeo-hls-progress-played {
  background: var(--vimeo-hls-accent);
}

.vimeo-hls-time {
  flex: none;
  font-size: 13px;
  font-variant-numeric: tabular-nums;
}

.vimeo-hls-volume {
  position: relative;
  flex: none;
}

.vimeo-hls-volume-button {
  flex: none;
}

.vimeo-hls-volume-slider {
  position: absolute;
  bottom: 36px;
  left: 50%;
  width: 8px;
  height: 80px;
  margin-left: -4px;
  border-radius: 4px;
  background: var(--vimeo-hls-track);
  cursor: pointer;
  display: none;
}

.vimeo-hls-volume:hover .vimeo-hls-volume-slider {
  display: block;
}

.vimeo-hls-volume-fill {
  position: absolute;
  left: 0;
  bottom: 0;
  width: 100%;
  border-radius: 4px;
  background: var(--vimeo-hls-accent);
  pointer-events: none;
}

.vimeo-hls-volume.muted .vimeo-hls-volume-fill {
  opacity: 0.3;
}

.vimeo-hls-fullscreen {
  flex: none;
}

.vimeo-hls-player.loading::after {
  content: "";
  position: absolute;
  top: 50%;
  left: 50%;
  width: 40px;
  height: 40px;
  margin: -20px 0 0 -20px;
  border: 3px solid var(--vimeo-hls-track);
  border-top-color: var(--vimeo-hls-accent);
  border-radius: 50%;
  animation: vimeo-hls-spin 0.8s linear infinite;
  z-index: 3;
}

@keyframes vimeo-hls-spin {
  to { transform: rotate(360deg); }
}

.vimeo-hls-error {
  position: absolute;
  inset: 0;
  display: flex;
  flex-direction: column;
  align-items: center;
  justify-content: center;
  padding: 24px;
  text-align: center;
  background: var(--vimeo-hls-error);
  z-index: 4;
}

.vimeo-hls-error-title {
  font-size: 18px;
  font-weight: 600;
  margin-bottom: 8px;
}

.vimeo-hls-error-message {
  font-size: 14px;
  opacity: 0.8;
  max-width: 480px;
}
"#;

/// Inline SVG icons for the control buttons
pub mod icons {
    pub const PLAY: &str = r#"<svg viewBox="0 0 24 24"><path d="M8 5v14l11-7z"/></svg>"#;
    pub const PAUSE: &str = r#"<svg viewBox="0 0 24 24"><path d="M6 19h4V5H6v14zm8-14v14h4V5h-4z"/></svg>"#;
    pub const VOLUME_HIGH: &str = r#"<svg viewBox="0 0 24 24"><path d="M3 9v6h4l5 5V4L7 9H3zm13.5 3A4.5 4.5 0 0 0 14 8v8a4.5 4.5 0 0 0 2.5-4zM14 3.2v2.1a7 7 0 0 1 0 13.4v2.1a9 9 0 0 0 0-17.6z"/></svg>"#;
    pub const VOLUME_LOW: &str = r#"<svg viewBox="0 0 24 24"><path d="M5 9v6h4l5 5V4L9 9H5zm13.5 3A4.5 4.5 0 0 0 16 8v8a4.5 4.5 0 0 0 2.5-4z"/></svg>"#;
    pub const VOLUME_MUTED: &str = r#"<svg viewBox="0 0 24 24"><path d="M16.5 12A4.5 4.5 0 0 0 14 8v2.2l2.5 2.5V12zM19 12a7 7 0 0 1-.6 2.8l1.5 1.5A9 9 0 0 0 14 3.2v2.1a7 7 0 0 1 5 6.7zM4.3 3 3 4.3 7.7 9H3v6h4l5 5v-6.7l4.3 4.2a7 7 0 0 1-2.3 1.2v2.1a9 9 0 0 0 3.7-1.8l2 2 1.3-1.3L4.3 3zM12 4 9.9 6.1 12 8.2V4z"/></svg>"#;
    pub const FULLSCREEN_ENTER: &str = r#"<svg viewBox="0 0 24 24"><path d="M7 14H5v5h5v-2H7v-3zm-2-4h2V7h3V5H5v5zm12 7h-3v2h5v-5h-2v3zM14 5v2h3v3h2V5h-5z"/></svg>"#;
    pub const FULLSCREEN_EXIT: &str = r#"<svg viewBox="0 0 24 24"><path d="M5 16h3v3h2v-5H5v2zm3-8H5v2h5V5H8v3zm6 11h2v-3h3v-2h-5v5zm2-11V5h-2v5h5V8h-3z"/></svg>"#;
}
