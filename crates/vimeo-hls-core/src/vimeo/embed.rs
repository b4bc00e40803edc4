//! Player configuration embedded in the Vimeo embed page
//!
//! The embed page inlines its configuration as a JavaScript object literal
//! that happens to be valid JSON. It is located textually and then handed to
//! `serde_json`.

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

/// Assignments that introduce the configuration object, in search order
const CONFIG_MARKERS: &[&str] = &[
    "window.playerConfig =",
    "window.playerConfig=",
    "var config =",
    "var config=",
];

/// Thumbnail keys from largest to smallest
pub const THUMBNAIL_PREFERENCE: &[&str] = &["1280", "960", "640", "base"];

/// Locate the configuration object literal in embed-page markup
pub fn extract_config_json(html: &str) -> Option<&str> {
    CONFIG_MARKERS.iter().find_map(|marker| {
        let after = html.find(marker)? + marker.len();
        let open = after + html[after..].find('{')?;
        let len = balanced_object_len(&html[open..])?;
        Some(&html[open..open + len])
    })
}

/// Byte length of the `{...}` object starting at `text[0]`, honouring
/// string literals and escapes
fn balanced_object_len(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Subset of the embed configuration the resolver reads
#[derive(Debug, Default, Deserialize)]
pub struct EmbedConfig {
    #[serde(default)]
    pub request: RequestSection,
    #[serde(default)]
    pub video: VideoSection,
}

#[derive(Debug, Default, Deserialize)]
pub struct RequestSection {
    #[serde(default)]
    pub files: FilesSection,
}

#[derive(Debug, Default, Deserialize)]
pub struct FilesSection {
    pub hls: Option<HlsFiles>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HlsFiles {
    pub default_cdn: Option<String>,
    #[serde(default)]
    pub cdns: BTreeMap<String, CdnEntry>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CdnEntry {
    pub url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VideoSection {
    pub title: Option<String>,
    #[serde(default)]
    pub thumbs: HashMap<String, String>,
}

impl EmbedConfig {
    /// HLS URL on the default CDN, or on any CDN that has one
    pub fn hls_url(&self) -> Option<&str> {
        let hls = self.request.files.hls.as_ref()?;
        let preferred = hls
            .default_cdn
            .as_ref()
            .and_then(|cdn| hls.cdns.get(cdn))
            .and_then(|entry| entry.url.as_deref());

        preferred.or_else(|| hls.cdns.values().find_map(|entry| entry.url.as_deref()))
    }

    /// Largest available thumbnail
    pub fn poster_url(&self) -> Option<&str> {
        select_thumbnail(&self.video.thumbs)
    }
}

/// Pick the largest thumbnail following [`THUMBNAIL_PREFERENCE`]
pub fn select_thumbnail(thumbs: &HashMap<String, String>) -> Option<&str> {
    THUMBNAIL_PREFERENCE
        .iter()
        .find_map(|key| thumbs.get(*key))
        .map(String::as_str)
        .filter(|url| !url.is_empty())
}
