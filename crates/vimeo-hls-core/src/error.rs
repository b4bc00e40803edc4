//! Error types for the vimeo-hls player

use thiserror::Error;

/// Result type alias for player operations
pub type Result<T> = std::result::Result<T, Error>;

/// Player error types
#[derive(Error, Debug)]
pub enum Error {
    // Construction errors
    #[error("Container not found: {selector}")]
    ContainerNotFound { selector: String },

    #[error("Invalid aspect ratio: {0}")]
    InvalidAspectRatio(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Resolution errors
    #[error("Invalid Vimeo video ID or URL: {0}")]
    InvalidIdentifier(String),

    #[error("Request blocked by the browser (likely CORS): {url}")]
    CorsBlocked { url: String },

    #[error("No player configuration found in embed page")]
    ConfigNotFound,

    #[error("Failed to parse player configuration: {0}")]
    ConfigParse(String),

    #[error("No HLS stream available for this video")]
    NoHlsAvailable,

    #[error("Vimeo access token required. This video cannot be resolved without an authenticated API call")]
    AuthRequired,

    #[error("Vimeo API rejected the access token (HTTP {status})")]
    Unauthorized { status: u16 },

    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    #[error("Network error: {0}")]
    Network(String),

    // Playback errors
    #[error("HLS is not supported in this browser")]
    UnsupportedPlatform,

    #[error("Fatal {kind} error: {details}")]
    EngineFatal { kind: String, details: String },

    #[error("Media element error (code {code})")]
    MediaElement { code: u16 },

    #[error("Fullscreen request failed: {0}")]
    Fullscreen(String),

    #[error("Player has been destroyed")]
    Destroyed,

    // Conversion errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

impl Error {
    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Error::Network(msg.into())
    }

    /// Returns true if the resolver should move on to its next strategy
    pub fn is_fallthrough(&self) -> bool {
        matches!(
            self,
            Error::CorsBlocked { .. }
                | Error::ConfigNotFound
                | Error::ConfigParse(_)
                | Error::NoHlsAvailable
                | Error::Http { .. }
                | Error::Network(_)
                | Error::Json(_)
        )
    }

    /// Title shown in the inline error panel
    pub fn panel_title(&self) -> &'static str {
        match self {
            Error::AuthRequired | Error::Unauthorized { .. } => "Authentication required",
            Error::InvalidIdentifier(_) => "Invalid video",
            Error::NoHlsAvailable => "Stream unavailable",
            Error::UnsupportedPlatform => "Unsupported browser",
            Error::EngineFatal { .. } | Error::MediaElement { .. } => "Playback error",
            _ => "Failed to load video",
        }
    }

    /// Returns the stable error code exposed to JavaScript and the CLI
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::ContainerNotFound { .. } => "CONTAINER_NOT_FOUND",
            Error::InvalidAspectRatio(_) => "INVALID_ASPECT_RATIO",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::InvalidIdentifier(_) => "INVALID_IDENTIFIER",
            Error::CorsBlocked { .. } => "CORS_BLOCKED",
            Error::ConfigNotFound => "CONFIG_NOT_FOUND",
            Error::ConfigParse(_) => "CONFIG_PARSE",
            Error::NoHlsAvailable => "NO_HLS",
            Error::AuthRequired => "AUTH_REQUIRED",
            Error::Unauthorized { .. } => "UNAUTHORIZED",
            Error::Http { .. } => "HTTP",
            Error::Network(_) => "NETWORK",
            Error::UnsupportedPlatform => "UNSUPPORTED_PLATFORM",
            Error::EngineFatal { .. } => "ENGINE_FATAL",
            Error::MediaElement { .. } => "MEDIA_ELEMENT",
            Error::Fullscreen(_) => "FULLSCREEN",
            Error::Destroyed => "DESTROYED",
            Error::Json(_) => "JSON",
            Error::Url(_) => "URL",
        }
    }
}
