//! vimeo-hls WASM - embeddable browser player for Vimeo and HLS streams
//!
//! Wraps `vimeo-hls-core` with DOM rendering, hls.js bindings and the
//! JavaScript API:
//! - `Player`: construct, control playback, subscribe to media events
//! - `registerGlobal(name?)`: opt-in `window[name](container, options)` factory
//!
//! ## Usage
//!
//! ```javascript
//! import init, { Player } from 'vimeo-hls-wasm';
//!
//! await init();
//! const player = new Player('#video', { hlsUrl: 'https://example.com/master.m3u8' });
//! ```
//!
//! hls.js must be available as the global `Hls`; without it playback falls
//! back to native HLS where the browser has it.

use wasm_bindgen::prelude::*;

mod dom;
mod hls;
mod listener;
mod media;
mod overlay;
mod player;

pub use hls::{HlsEngine, HlsFactory};
pub use listener::JsListener;
pub use media::{WebAdapter, WebMedia};
pub use player::Player;

/// Name used by [`register_global`] when none is given
pub const DEFAULT_GLOBAL_NAME: &str = "VimeoHLSPlayer";

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    {
        console_error_panic_hook::set_once();
        tracing_wasm::set_as_global_default();
    }
    vimeo_hls_core::init();
}

/// Library version
#[wasm_bindgen]
pub fn version() -> String {
    vimeo_hls_core::VERSION.to_string()
}

/// Install `window[name]` as a factory: `window[name](container, options)`
/// returns a new `Player`.
#[wasm_bindgen(js_name = registerGlobal)]
pub fn register_global(name: Option<String>) -> Result<(), JsValue> {
    let name = name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_GLOBAL_NAME.to_string());

    let factory = Closure::<dyn Fn(JsValue, JsValue) -> Result<JsValue, JsValue>>::new(
        |container: JsValue, options: JsValue| Player::new(container, options).map(JsValue::from),
    )
    .into_js_value();

    let window = dom::window()?;
    js_sys::Reflect::set(&window, &JsValue::from_str(&name), &factory)?;
    tracing::info!(name = %name, "Registered global player factory");
    Ok(())
}
