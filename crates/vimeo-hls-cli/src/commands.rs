//! CLI command implementations

use crate::output::{to_json, OutputFormat};
use anyhow::{bail, Context};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;
use vimeo_hls_core::{
    extract_video_id, AspectRatio, PlaybackOptions, PlayerTheme, ResolvedSource, VimeoResolver,
};

#[derive(Serialize)]
struct Resolution<'a> {
    id: &'a str,
    #[serde(flatten)]
    source: &'a ResolvedSource,
}

/// Resolve a Vimeo id or URL and print the manifest
pub async fn resolve(input: &str, token: Option<&str>, format: &str) -> anyhow::Result<()> {
    let id = extract_video_id(input).with_context(|| format!("not a Vimeo id or URL: {}", input))?;
    debug!(id = %id, authenticated = token.is_some(), "Resolving");

    let resolver = VimeoResolver::new();
    let source = match resolver.resolve(&id, token).await {
        Ok(source) => source,
        Err(e) => {
            if OutputFormat::from(format) == OutputFormat::Json {
                let error = json!({ "error": { "code": e.error_code(), "message": e.to_string() } });
                println!("{}", to_json(&error));
            } else {
                eprintln!("{}: {}", e.panel_title(), e);
            }
            std::process::exit(1);
        }
    };

    match OutputFormat::from(format) {
        OutputFormat::Json => println!("{}", to_json(&Resolution { id: &id, source: &source })),
        OutputFormat::Text => {
            println!("Video:  {}", id);
            println!("HLS:    {}", source.hls_url);
            if let Some(title) = &source.title {
                println!("Title:  {}", title);
            }
            if let Some(poster) = &source.poster_url {
                println!("Poster: {}", poster);
            }
        }
    }

    Ok(())
}

/// Print the numeric id of a Vimeo URL
pub fn extract_id(input: &str, format: &str) -> anyhow::Result<()> {
    let Some(id) = extract_video_id(input) else {
        bail!("not a Vimeo id or URL: {}", input);
    };

    match OutputFormat::from(format) {
        OutputFormat::Json => println!("{}", to_json(&json!({ "input": input, "id": id }))),
        OutputFormat::Text => println!("{}", id),
    }
    Ok(())
}

/// Print the stylesheet, or the theme values with `--format json`
pub fn css(format: &str) {
    let theme = PlayerTheme::default();
    match OutputFormat::from(format) {
        OutputFormat::Json => println!("{}", theme.to_json()),
        OutputFormat::Text => println!("{}", theme.to_css()),
    }
}

/// Parameters of the `embed` command
#[derive(Debug, Clone)]
pub struct EmbedRequest {
    pub source: String,
    pub autoplay: bool,
    pub muted: bool,
    pub controls: bool,
    pub aspect_ratio: String,
    pub poster: Option<String>,
    pub module: String,
}

impl EmbedRequest {
    /// Player options for the request. Access tokens never go into a
    /// page snippet.
    pub fn options(&self) -> anyhow::Result<PlaybackOptions> {
        self.aspect_ratio
            .parse::<AspectRatio>()
            .with_context(|| format!("invalid aspect ratio: {}", self.aspect_ratio))?;

        let mut options = PlaybackOptions {
            autoplay: self.autoplay,
            muted: self.muted,
            controls: self.controls,
            aspect_ratio: self.aspect_ratio.clone(),
            poster: self.poster.clone(),
            ..Default::default()
        };

        if let Some(id) = extract_video_id(&self.source) {
            options.vimeo_id = Some(id);
        } else if self.source.starts_with("https://") || self.source.starts_with("http://") {
            options.hls_url = Some(self.source.clone());
        } else {
            bail!("source is neither a Vimeo id/URL nor an HLS URL: {}", self.source);
        }
        Ok(options)
    }
}

/// Options as a JS object literal, without unset keys.
///
/// `<` is written as `\u003c` so no value can close the inline script.
fn options_json(options: &PlaybackOptions) -> anyhow::Result<String> {
    let mut value = serde_json::to_value(options)?;
    if let Value::Object(map) = &mut value {
        map.retain(|_, v| !v.is_null());
    }
    Ok(serde_json::to_string_pretty(&value)?.replace('<', "\\u003c"))
}

/// HTML that loads the wasm module and mounts a player
pub fn embed_snippet(request: &EmbedRequest) -> anyhow::Result<String> {
    let options = options_json(&request.options()?)?;
    Ok(format!(
        r#"<div id="vimeo-hls-player"></div>
<script src="https://cdn.jsdelivr.net/npm/hls.js@1"></script>
<script type="module">
  import init, {{ Player }} from '{module}';

  await init();
  const player = new Player('#vimeo-hls-player', {options});
  player.on('error', (e) => console.error(e.error));
</script>"#,
        module = request.module,
        options = options,
    ))
}

/// Print the embed snippet, or the player options with `--format json`
pub fn embed(request: &EmbedRequest, format: &str) -> anyhow::Result<()> {
    match OutputFormat::from(format) {
        OutputFormat::Json => println!("{}", options_json(&request.options()?)?),
        OutputFormat::Text => println!("{}", embed_snippet(request)?),
    }
    Ok(())
}
