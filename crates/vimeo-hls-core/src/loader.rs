//! Load sequencing for the player facade
//!
//! Every load request takes a new generation number. Results that come back
//! for an older generation are dropped, so overlapping loads cannot race and
//! a destroyed player never renders late results.

use crate::{
    options::LoadPlan,
    vimeo::{extract_video_id, ResolvedSource, SourceResolver},
    Error, Result,
};
use std::cell::Cell;
use tracing::{debug, info, warn};

/// What the loader drives on the page
pub trait PlaybackSurface {
    /// Toggle the `loading` marker
    fn set_loading(&self, loading: bool);

    /// Hand a manifest URL to the adapter. The adapter reports its own
    /// failures as `error` events.
    fn load_source(&self, url: &str) -> Result<()>;

    /// Offer a poster found during resolution
    fn apply_resolved_poster(&self, url: &str);

    /// Render the inline error panel
    fn show_error(&self, error: &Error);

    fn clear_error(&self);

    /// Emit an `error` event to player listeners
    fn emit_error(&self, error: &Error);
}

/// Result of a load call
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(Option<ResolvedSource>),
    Failed(Error),
    /// A newer load (or destroy) took over
    Superseded,
    /// Nothing configured
    Skipped,
}

impl LoadOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded(_))
    }
}

/// Generation-guarded load driver
pub struct Loader<R> {
    resolver: R,
    generation: Cell<u64>,
}

impl<R: SourceResolver> Loader<R> {
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            generation: Cell::new(0),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    /// Invalidate any load in flight
    pub fn cancel(&self) -> u64 {
        self.begin()
    }

    fn begin(&self) -> u64 {
        let next = self.generation.get() + 1;
        self.generation.set(next);
        next
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.get() == generation
    }

    /// Run the load path selected by the options
    pub async fn load<S: PlaybackSurface>(&self, surface: &S, plan: &LoadPlan) -> LoadOutcome {
        match plan {
            LoadPlan::Hls(url) => self.load_hls(surface, url).await,
            LoadPlan::Vimeo { id, token } => self.load_vimeo(surface, id, token.as_deref()).await,
            LoadPlan::Nothing => {
                debug!("No source configured");
                LoadOutcome::Skipped
            }
        }
    }

    /// Load a manifest URL directly
    pub async fn load_hls<S: PlaybackSurface>(&self, surface: &S, url: &str) -> LoadOutcome {
        let generation = self.begin();
        surface.clear_error();
        surface.set_loading(true);

        let result = surface.load_source(url);

        if !self.is_current(generation) {
            return LoadOutcome::Superseded;
        }
        surface.set_loading(false);

        match result {
            Ok(()) => LoadOutcome::Loaded(None),
            Err(e) => {
                warn!(url, error = %e, "Failed to load HLS source");
                surface.show_error(&e);
                LoadOutcome::Failed(e)
            }
        }
    }

    /// Resolve a Vimeo id or URL, then load the resulting manifest
    pub async fn load_vimeo<S: PlaybackSurface>(
        &self,
        surface: &S,
        id_or_url: &str,
        token: Option<&str>,
    ) -> LoadOutcome {
        let generation = self.begin();
        surface.clear_error();
        surface.set_loading(true);

        let resolved = match self.resolve(generation, id_or_url, token).await {
            Some(result) => result,
            None => return LoadOutcome::Superseded,
        };
        surface.set_loading(false);

        let source = match resolved {
            Ok(source) => source,
            Err(e) => {
                warn!(id = id_or_url, error = %e, "Vimeo resolution failed");
                surface.show_error(&e);
                surface.emit_error(&e);
                return LoadOutcome::Failed(e);
            }
        };

        if let Some(poster) = &source.poster_url {
            surface.apply_resolved_poster(poster);
        }

        match surface.load_source(&source.hls_url) {
            Ok(()) => LoadOutcome::Loaded(Some(source)),
            Err(e) => {
                surface.show_error(&e);
                LoadOutcome::Failed(e)
            }
        }
    }

    /// `None` when superseded while awaiting
    async fn resolve(
        &self,
        generation: u64,
        id_or_url: &str,
        token: Option<&str>,
    ) -> Option<Result<ResolvedSource>> {
        let Some(id) = extract_video_id(id_or_url) else {
            return Some(Err(Error::InvalidIdentifier(id_or_url.to_string())));
        };

        let public = self.resolver.resolve_public(&id).await;
        if !self.is_current(generation) {
            debug!(id = %id, "Load superseded during public resolution");
            return None;
        }
        match public {
            Ok(source) => return Some(Ok(source)),
            Err(e) if e.is_fallthrough() => {
                info!(id = %id, error = %e, "Public resolution failed, trying API")
            }
            Err(e) => {
                warn!(id = %id, error = %e, "Public resolution failed unexpectedly, trying API")
            }
        }

        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return Some(Err(Error::AuthRequired));
        };

        let authenticated = self.resolver.resolve_authenticated(&id, token).await;
        if !self.is_current(generation) {
            debug!(id = %id, "Load superseded during authenticated resolution");
            return None;
        }
        Some(authenticated)
    }
}
