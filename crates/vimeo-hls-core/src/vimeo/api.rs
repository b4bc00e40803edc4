//! Payloads of the public oEmbed endpoint and the authenticated video API

use serde::Deserialize;

/// oEmbed description of a public video
#[derive(Debug, Default, Deserialize)]
pub struct OEmbed {
    pub title: Option<String>,
    pub thumbnail_url: Option<String>,
}

/// `GET /videos/{id}` response (fields used by the resolver)
#[derive(Debug, Default, Deserialize)]
pub struct VideoMetadata {
    pub name: Option<String>,
    #[serde(default)]
    pub files: Vec<VideoFile>,
    pub play: Option<PlaySection>,
    pub pictures: Option<Pictures>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VideoFile {
    pub quality: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PlaySection {
    pub hls: Option<PlayLink>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PlayLink {
    pub link: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Pictures {
    #[serde(default)]
    pub sizes: Vec<PictureSize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PictureSize {
    #[serde(default)]
    pub width: u32,
    pub link: Option<String>,
}

impl VideoMetadata {
    /// Link of the `hls` file entry, then the `play.hls` link
    pub fn hls_url(&self) -> Option<&str> {
        self.files
            .iter()
            .find(|f| f.quality.as_deref() == Some("hls"))
            .and_then(|f| f.link.as_deref())
            .or_else(|| self.play.as_ref()?.hls.as_ref()?.link.as_deref())
    }

    /// Widest picture
    pub fn poster_url(&self) -> Option<&str> {
        self.pictures
            .as_ref()?
            .sizes
            .iter()
            .filter(|p| p.link.is_some())
            .max_by_key(|p| p.width)
            .and_then(|p| p.link.as_deref())
    }
}
