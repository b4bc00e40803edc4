//! Vimeo id normalization and HLS manifest resolution
//!
//! Resolution walks a fixed chain and stops at the first success:
//!
//! 1. public: oEmbed metadata plus the player config scraped from the embed page
//! 2. authenticated: `api.vimeo.com/videos/{id}` with a bearer token
//!
//! In the browser the public path usually fails on cross-origin rules, which
//! is expected and only moves resolution along.

mod api;
mod embed;

pub use api::{OEmbed, VideoMetadata};
pub use embed::{extract_config_json, select_thumbnail, EmbedConfig, THUMBNAIL_PREFERENCE};

use crate::{
    transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport},
    Error, Result,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Public oEmbed endpoint
pub const OEMBED_ENDPOINT: &str = "https://vimeo.com/api/oembed.json";
/// Embed player page, followed by the video id
pub const PLAYER_ENDPOINT: &str = "https://player.vimeo.com/video/";
/// Authenticated video metadata, followed by the video id
pub const API_ENDPOINT: &str = "https://api.vimeo.com/videos/";
/// Media type pinning the API version
pub const API_ACCEPT: &str = "application/vnd.vimeo.*+json;version=3.4";

/// Output of a successful resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedSource {
    pub hls_url: String,
    pub poster_url: Option<String>,
    pub title: Option<String>,
}

fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Extract the numeric video id from an id or a Vimeo URL.
///
/// Recognized shapes: `vimeo.com/{id}`, `vimeo.com/video/{id}` and
/// `player.vimeo.com/video/{id}`, with or without scheme and `www.`.
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();
    if is_numeric(input) {
        return Some(input.to_string());
    }

    let url = if input.contains("://") {
        Url::parse(input)
    } else {
        Url::parse(&format!("https://{}", input))
    }
    .ok()?;

    let host = url.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());

    let id = match host {
        "vimeo.com" => match segments.next()? {
            "video" => segments.next()?,
            first => first,
        },
        "player.vimeo.com" => {
            if segments.next()? != "video" {
                return None;
            }
            segments.next()?
        }
        _ => return None,
    };

    is_numeric(id).then(|| id.to_string())
}

/// The two resolution strategies, driven separately by the player
#[async_trait(?Send)]
pub trait SourceResolver {
    /// Token-free resolution
    async fn resolve_public(&self, id: &str) -> Result<ResolvedSource>;

    /// Resolution through the authenticated API
    async fn resolve_authenticated(&self, id: &str, token: &str) -> Result<ResolvedSource>;
}

/// Vimeo resolver over an [`HttpTransport`]
#[derive(Debug, Clone, Default)]
pub struct VimeoResolver<T = ReqwestTransport> {
    transport: T,
}

impl VimeoResolver<ReqwestTransport> {
    pub fn new() -> Self {
        Self::with_transport(ReqwestTransport::new())
    }
}

impl<T: HttpTransport> VimeoResolver<T> {
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    /// Resolve an id or URL, falling back from the public path to the
    /// authenticated one.
    #[instrument(skip(self, access_token))]
    pub async fn resolve(
        &self,
        id_or_url: &str,
        access_token: Option<&str>,
    ) -> Result<ResolvedSource> {
        let id = extract_video_id(id_or_url)
            .ok_or_else(|| Error::InvalidIdentifier(id_or_url.to_string()))?;

        match self.resolve_public(&id).await {
            Ok(source) => return Ok(source),
            Err(e) if e.is_fallthrough() => info!(id = %id, error = %e, "Public resolution failed"),
            Err(e) => warn!(id = %id, error = %e, "Public resolution failed unexpectedly"),
        }

        match access_token.filter(|t| !t.is_empty()) {
            Some(token) => self.resolve_authenticated(&id, token).await,
            None => Err(Error::AuthRequired),
        }
    }

    async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse> {
        let url = request.url.to_string();
        let response = self.transport.get(request).await?;
        if !response.is_success() {
            return Err(Error::Http { status: response.status, url });
        }
        Ok(response)
    }

    async fn fetch_oembed(&self, id: &str) -> Result<OEmbed> {
        let video_url = format!("https://vimeo.com/{}", id);
        let url = Url::parse_with_params(OEMBED_ENDPOINT, &[("url", video_url.as_str())])?;
        let response = self.fetch(HttpRequest::get(url)).await?;
        Ok(serde_json::from_str(&response.body)?)
    }

    async fn fetch_embed_config(&self, id: &str) -> Result<EmbedConfig> {
        let url = Url::parse(PLAYER_ENDPOINT)?.join(id)?;
        let response = self.fetch(HttpRequest::get(url)).await?;

        let json = extract_config_json(&response.body).ok_or(Error::ConfigNotFound)?;
        serde_json::from_str(json).map_err(|e| Error::ConfigParse(e.to_string()))
    }
}

#[async_trait(?Send)]
impl<T: HttpTransport> SourceResolver for VimeoResolver<T> {
    #[instrument(skip(self))]
    async fn resolve_public(&self, id: &str) -> Result<ResolvedSource> {
        let oembed = match self.fetch_oembed(id).await {
            Ok(oembed) => Some(oembed),
            Err(e) => {
                debug!(error = %e, "oEmbed lookup failed");
                None
            }
        };

        let config = self.fetch_embed_config(id).await?;
        let hls_url = config.hls_url().ok_or(Error::NoHlsAvailable)?.to_string();

        let (oembed_title, oembed_thumb) = oembed
            .map(|o| (o.title, o.thumbnail_url))
            .unwrap_or_default();

        info!(id, "Resolved via embed page");

        Ok(ResolvedSource {
            hls_url,
            poster_url: config.poster_url().map(str::to_string).or(oembed_thumb),
            title: config.video.title.or(oembed_title),
        })
    }

    #[instrument(skip(self, token))]
    async fn resolve_authenticated(&self, id: &str, token: &str) -> Result<ResolvedSource> {
        let url = Url::parse(API_ENDPOINT)?.join(id)?;
        let request = HttpRequest::get(url.clone())
            .bearer(token)
            .header("Accept", API_ACCEPT);

        let response = self.transport.get(request).await?;
        match response.status {
            401 | 403 => {
                warn!(status = response.status, "Access token rejected");
                return Err(Error::Unauthorized { status: response.status });
            }
            s if !(200..300).contains(&s) => {
                return Err(Error::Http { status: s, url: url.to_string() });
            }
            _ => {}
        }

        let metadata: VideoMetadata = serde_json::from_str(&response.body)?;
        let hls_url = metadata.hls_url().ok_or(Error::NoHlsAvailable)?.to_string();

        info!(id, "Resolved via authenticated API");

        Ok(ResolvedSource {
            hls_url,
            poster_url: metadata.poster_url().map(str::to_string),
            title: metadata.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_extract_known_shapes() {
        assert_eq!(extract_video_id("https://vimeo.com/76979871").as_deref(), Some("76979871"));
        assert_eq!(
            extract_video_id("https://vimeo.com/video/76979871").as_deref(),
            Some("76979871")
        );
        assert_eq!(
            extract_video_id("https://player.vimeo.com/video/76979871?h=abc").as_deref(),
            Some("76979871")
        );
        assert_eq!(extract_video_id("vimeo.com/123").as_deref(), Some("123"));
        assert_eq!(extract_video_id("http://www.vimeo.com/123/").as_deref(), Some("123"));
        assert_eq!(extract_video_id("76979871").as_deref(), Some("76979871"));
    }

    #[test]
    fn test_extract_rejects_other_input() {
        assert_eq!(extract_video_id("not a video"), None);
        assert_eq!(extract_video_id("https://youtube.com/123"), None);
        assert_eq!(extract_video_id("https://vimeo.com/channels/staff"), None);
        assert_eq!(extract_video_id("https://player.vimeo.com/123"), None);
        assert_eq!(extract_video_id(""), None);
        assert_eq!(extract_video_id("12a3"), None);
    }

    /// Transport answering by URL prefix and recording requests
    #[derive(Default)]
    struct RouteTransport {
        routes: Vec<(&'static str, Option<HttpResponse>)>,
        requests: RefCell<Vec<HttpRequest>>,
    }

    impl RouteTransport {
        fn route(mut self, prefix: &'static str, status: u16, body: &str) -> Self {
            self.routes.push((prefix, Some(HttpResponse { status, body: body.to_string() })));
            self
        }

        fn blocked(mut self, prefix: &'static str) -> Self {
            self.routes.push((prefix, None));
            self
        }
    }

    #[async_trait(?Send)]
    impl HttpTransport for RouteTransport {
        async fn get(&self, request: HttpRequest) -> Result<HttpResponse> {
            let url = request.url.to_string();
            self.requests.borrow_mut().push(request);
            match self.routes.iter().find(|(prefix, _)| url.starts_with(prefix)) {
                Some((_, Some(response))) => Ok(response.clone()),
                _ => Err(Error::CorsBlocked { url }),
            }
        }
    }

    const EMBED: &str = r#"<script>window.playerConfig = {"request":{"files":{"hls":{"default_cdn":"a","cdns":{"a":{"url":"https://cdn/a.m3u8"}}}}},"video":{"title":"Embed"}};</script>"#;

    #[tokio::test]
    async fn test_public_path_wins() {
        let transport = RouteTransport::default()
            .route(OEMBED_ENDPOINT, 200, r#"{"title":"OE","thumbnail_url":"https://i/oe.jpg"}"#)
            .route(PLAYER_ENDPOINT, 200, EMBED);
        let resolver = VimeoResolver::with_transport(transport);

        let source = resolver.resolve("https://vimeo.com/42", Some("token")).await.unwrap();
        assert_eq!(source.hls_url, "https://cdn/a.m3u8");
        assert_eq!(source.poster_url.as_deref(), Some("https://i/oe.jpg"));
        assert_eq!(source.title.as_deref(), Some("Embed"));

        let requests = resolver.transport.requests.borrow();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].url.as_str().contains("url=https%3A%2F%2Fvimeo.com%2F42"));
        assert_eq!(requests[1].url.as_str(), "https://player.vimeo.com/video/42");
    }

    #[tokio::test]
    async fn test_falls_back_to_authenticated() {
        let transport = RouteTransport::default()
            .blocked(OEMBED_ENDPOINT)
            .blocked(PLAYER_ENDPOINT)
            .route(
                API_ENDPOINT,
                200,
                r#"{"name":"Api","files":[{"quality":"hls","link":"https://api/master.m3u8"}]}"#,
            );
        let resolver = VimeoResolver::with_transport(transport);

        let source = resolver.resolve("42", Some("tok")).await.unwrap();
        assert_eq!(source.hls_url, "https://api/master.m3u8");

        let requests = resolver.transport.requests.borrow();
        let api = requests.last().unwrap();
        assert_eq!(api.url.as_str(), "https://api.vimeo.com/videos/42");
        assert_eq!(api.header_value("Authorization"), Some("bearer tok"));
        assert_eq!(api.header_value("Accept"), Some(API_ACCEPT));
    }

    #[tokio::test]
    async fn test_auth_required_without_token() {
        let resolver = VimeoResolver::with_transport(RouteTransport::default());
        let err = resolver.resolve("42", None).await.unwrap_err();
        assert!(matches!(err, Error::AuthRequired));

        let err = resolver.resolve("42", Some("")).await.unwrap_err();
        assert!(matches!(err, Error::AuthRequired));
    }

    #[tokio::test]
    async fn test_invalid_identifier_makes_no_requests() {
        let resolver = VimeoResolver::with_transport(RouteTransport::default());
        let err = resolver.resolve("https://example.com/x", Some("t")).await.unwrap_err();
        assert!(matches!(err, Error::InvalidIdentifier(_)));
        assert!(resolver.transport.requests.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_authenticated_errors() {
        let transport = RouteTransport::default().route(API_ENDPOINT, 200, r#"{"files":[]}"#);
        let resolver = VimeoResolver::with_transport(transport);
        let err = resolver.resolve_authenticated("1", "t").await.unwrap_err();
        assert!(matches!(err, Error::NoHlsAvailable));

        let transport = RouteTransport::default().route(API_ENDPOINT, 401, "{}");
        let resolver = VimeoResolver::with_transport(transport);
        let err = resolver.resolve_authenticated("1", "t").await.unwrap_err();
        assert!(matches!(err, Error::Unauthorized { status: 401 }));
    }

    #[tokio::test]
    async fn test_embed_page_without_config() {
        let transport = RouteTransport::default().route(PLAYER_ENDPOINT, 200, "<html></html>");
        let resolver = VimeoResolver::with_transport(transport);
        let err = resolver.resolve_public("1").await.unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound));
        assert!(err.is_fallthrough());
    }
}
