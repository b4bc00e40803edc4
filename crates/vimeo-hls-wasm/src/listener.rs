//! JS callbacks as adapter listeners

use crate::dom::describe;
use serde::Serialize;
use serde_wasm_bindgen::Serializer;
use vimeo_hls_core::{EventDetail, Listener};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// A JS function registered through `player.on`, compared by identity
#[derive(Clone, Debug)]
pub struct JsListener(js_sys::Function);

impl JsListener {
    pub fn new(callback: js_sys::Function) -> Self {
        Self(callback)
    }

    /// Wrap a Rust closure that ignores the detail payload
    pub(crate) fn from_fn(f: impl Fn() + 'static) -> Self {
        let callback = Closure::<dyn Fn(JsValue)>::new(move |_detail: JsValue| f())
            .into_js_value()
            .unchecked_into();
        Self(callback)
    }
}

impl Listener for JsListener {
    fn invoke(&self, detail: &EventDetail) -> Result<(), String> {
        let value = detail
            .serialize(&Serializer::json_compatible())
            .map_err(|e| e.to_string())?;
        self.0
            .call1(&JsValue::NULL, &value)
            .map(|_| ())
            .map_err(|e| describe(&e))
    }

    fn same_as(&self, other: &Self) -> bool {
        js_sys::Object::is(&self.0, &other.0)
    }
}
