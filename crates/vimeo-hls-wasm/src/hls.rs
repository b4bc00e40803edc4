//! hls.js bindings
//!
//! hls.js is expected as the global `Hls` (script tag or bundler shim).
//! When it is missing the adapter falls back to native HLS playback.

use crate::dom::describe;
use crate::media::{WebAdapter, WebMedia};
use js_sys::Reflect;
use std::rc::Weak;
use tracing::debug;
use vimeo_hls_core::{
    engine::{ENGINE_ERROR_EVENT, MANIFEST_PARSED_EVENT},
    EngineConfig, EngineFactory, Error, Result, StreamEngine,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlMediaElement;

#[wasm_bindgen]
extern "C" {
    #[derive(Debug, Clone)]
    pub type Hls;

    #[wasm_bindgen(static_method_of = Hls, js_name = isSupported, catch)]
    fn is_supported() -> std::result::Result<bool, JsValue>;

    #[wasm_bindgen(constructor, catch)]
    fn new(config: &JsValue) -> std::result::Result<Hls, JsValue>;

    #[wasm_bindgen(method, js_name = loadSource)]
    fn load_source(this: &Hls, url: &str);

    #[wasm_bindgen(method, js_name = attachMedia)]
    fn attach_media(this: &Hls, media: &HtmlMediaElement);

    #[wasm_bindgen(method, js_name = startLoad)]
    fn start_load(this: &Hls);

    #[wasm_bindgen(method, js_name = recoverMediaError)]
    fn recover_media_error(this: &Hls);

    #[wasm_bindgen(method)]
    fn destroy(this: &Hls);

    #[wasm_bindgen(method)]
    fn on(this: &Hls, event: &str, callback: &js_sys::Function);
}

/// Live hls.js instance
#[derive(Debug, Clone)]
pub struct HlsEngine(Hls);

impl StreamEngine for HlsEngine {
    fn load_source(&self, url: &str) {
        self.0.load_source(url);
    }

    fn start_load(&self) {
        self.0.start_load();
    }

    fn recover_media_error(&self) {
        self.0.recover_media_error();
    }

    fn destroy(&self) {
        self.0.destroy();
    }
}

fn global_has_hls() -> bool {
    Reflect::has(&js_sys::global(), &JsValue::from_str("Hls")).unwrap_or(false)
}

fn read_string(data: &JsValue, key: &str) -> String {
    Reflect::get(data, &JsValue::from_str(key))
        .ok()
        .and_then(|v| v.as_string())
        .unwrap_or_default()
}

/// Creates hls.js engines wired back to their adapter
pub struct HlsFactory {
    adapter: Weak<WebAdapter>,
}

impl HlsFactory {
    pub(crate) fn new(adapter: Weak<WebAdapter>) -> Self {
        Self { adapter }
    }
}

impl EngineFactory<WebMedia> for HlsFactory {
    type Engine = HlsEngine;

    fn is_supported(&self) -> bool {
        if !global_has_hls() {
            debug!("hls.js not loaded");
            return false;
        }
        Hls::is_supported().unwrap_or(false)
    }

    fn create(&self, config: &EngineConfig, media: &WebMedia) -> Result<HlsEngine> {
        let config = serde_wasm_bindgen::to_value(config)
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        let hls = Hls::new(&config).map_err(|e| Error::EngineFatal {
            kind: "init".to_string(),
            details: describe(&e),
        })?;

        let adapter = self.adapter.clone();
        let on_parsed = Closure::<dyn Fn()>::new(move || {
            if let Some(adapter) = adapter.upgrade() {
                adapter.handle_manifest_parsed();
            }
        })
        .into_js_value();
        hls.on(MANIFEST_PARSED_EVENT, on_parsed.unchecked_ref());

        let adapter = self.adapter.clone();
        let on_error = Closure::<dyn Fn(JsValue, JsValue)>::new(
            move |_event: JsValue, data: JsValue| {
                let Some(adapter) = adapter.upgrade() else {
                    return;
                };
                let fatal = Reflect::get(&data, &JsValue::from_str("fatal"))
                    .ok()
                    .and_then(|v| v.as_bool())
                    .unwrap_or(false);
                let error_type = read_string(&data, "type");
                let details = read_string(&data, "details");
                adapter.handle_engine_error(&error_type, fatal, &details);
            },
        )
        .into_js_value();
        hls.on(ENGINE_ERROR_EVENT, on_error.unchecked_ref());

        hls.attach_media(media.video());
        Ok(HlsEngine(hls))
    }
}
