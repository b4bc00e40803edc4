//! Player options and the load plan derived from them

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Aspect ratio used when none is configured
pub const DEFAULT_ASPECT_RATIO: &str = "16:9";

/// Options accepted by the player constructor.
///
/// Keys are camelCase on the JavaScript side (`vimeoId`, `hlsUrl`, ...).
/// Missing keys take their defaults; the struct is never mutated after the
/// player is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlaybackOptions {
    /// Vimeo video id or any supported Vimeo URL
    pub vimeo_id: Option<String>,
    /// Direct HLS manifest URL, takes precedence over `vimeo_id`
    pub hls_url: Option<String>,
    /// Bearer token for the authenticated Vimeo API
    pub vimeo_access_token: Option<String>,
    /// Start playback as soon as the manifest is parsed
    pub autoplay: bool,
    /// Start muted
    pub muted: bool,
    /// Render the custom control overlay
    pub controls: bool,
    /// `"W:H"` ratio of the video box
    pub aspect_ratio: String,
    /// Poster image URL
    pub poster: Option<String>,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self {
            vimeo_id: None,
            hls_url: None,
            vimeo_access_token: None,
            autoplay: false,
            muted: false,
            controls: true,
            aspect_ratio: DEFAULT_ASPECT_RATIO.to_string(),
            poster: None,
        }
    }
}

/// What the player should load after construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadPlan {
    /// Load a manifest URL directly
    Hls(String),
    /// Resolve a Vimeo id first
    Vimeo { id: String, token: Option<String> },
    /// No source configured
    Nothing,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl PlaybackOptions {
    /// Decide which load path the options select
    pub fn load_plan(&self) -> LoadPlan {
        if let Some(url) = non_empty(&self.hls_url) {
            return LoadPlan::Hls(url);
        }
        if let Some(id) = non_empty(&self.vimeo_id) {
            return LoadPlan::Vimeo {
                id,
                token: self.access_token(),
            };
        }
        LoadPlan::Nothing
    }

    /// Access token, if a non-empty one was supplied
    pub fn access_token(&self) -> Option<String> {
        non_empty(&self.vimeo_access_token)
    }

    /// Parsed aspect ratio, falling back to 16:9 when the option is malformed
    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio.parse().unwrap_or_else(|e| {
            tracing::warn!(
                ratio = %self.aspect_ratio,
                error = %e,
                "Invalid aspect ratio, using 16:9"
            );
            AspectRatio::default()
        })
    }
}

/// Width/height pair parsed from `"W:H"`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AspectRatio {
    pub width: f64,
    pub height: f64,
}

impl AspectRatio {
    /// Padding-top percentage for the aspect-ratio box technique
    pub fn padding_percent(&self) -> f64 {
        self.height / self.width * 100.0
    }

    /// CSS value for `padding-top`
    pub fn padding_css(&self) -> String {
        format!("{}%", self.padding_percent())
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self { width: 16.0, height: 9.0 }
    }
}

impl FromStr for AspectRatio {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (w, h) = s
            .split_once(':')
            .ok_or_else(|| Error::InvalidAspectRatio(s.to_string()))?;
        let width: f64 = w.trim().parse().map_err(|_| Error::InvalidAspectRatio(s.to_string()))?;
        let height: f64 = h.trim().parse().map_err(|_| Error::InvalidAspectRatio(s.to_string()))?;

        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(Error::InvalidAspectRatio(s.to_string()));
        }

        Ok(Self { width, height })
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}
