//! DOM helpers shared by the player and the overlay

use vimeo_hls_core::{classes, Error};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, EventTarget, HtmlElement, Window};

pub(crate) fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| js_message("no global window"))
}

pub(crate) fn document() -> Result<Document, JsValue> {
    window()?
        .document()
        .ok_or_else(|| js_message("no document on window"))
}

pub(crate) fn js_message(msg: &str) -> JsValue {
    js_sys::Error::new(msg).into()
}

/// JS `Error` carrying the stable error code as `code`
pub(crate) fn js_error(err: &Error) -> JsValue {
    let js = js_sys::Error::new(&err.to_string());
    let _ = js_sys::Reflect::set(&js, &"code".into(), &err.error_code().into());
    js.into()
}

/// Best-effort text for a thrown JS value
pub(crate) fn describe(value: &JsValue) -> String {
    if let Some(s) = value.as_string() {
        return s;
    }
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    format!("{:?}", value)
}

pub(crate) fn create_element(
    document: &Document,
    tag: &str,
    class: &str,
) -> Result<HtmlElement, JsValue> {
    let element = document.create_element(tag)?;
    element.set_class_name(class);
    element
        .dyn_into::<HtmlElement>()
        .map_err(|_| js_message("created element is not an HtmlElement"))
}

pub(crate) fn create_button(
    document: &Document,
    class: &str,
    label: &str,
    icon: &str,
) -> Result<HtmlElement, JsValue> {
    let button = create_element(document, "button", &format!("{} {}", classes::BUTTON, class))?;
    button.set_attribute("type", "button")?;
    button.set_attribute("aria-label", label)?;
    button.set_inner_html(icon);
    Ok(button)
}

pub(crate) fn set_class(element: &Element, class: &str, on: bool) {
    let _ = element.class_list().toggle_with_force(class, on);
}

pub(crate) fn set_style(element: &HtmlElement, property: &str, value: &str) {
    let _ = element.style().set_property(property, value);
}

pub(crate) fn remove(element: &Element) {
    element.remove();
}

/// Event listener that unregisters itself when dropped.
///
/// The callback is handed to JS ownership, so dropping the guard from
/// inside its own callback is fine.
pub(crate) struct DomListener {
    target: EventTarget,
    event: &'static str,
    callback: js_sys::Function,
}

impl DomListener {
    pub(crate) fn new<F>(
        target: &EventTarget,
        event: &'static str,
        handler: F,
    ) -> Result<Self, JsValue>
    where
        F: Fn(Event) + 'static,
    {
        let callback: js_sys::Function = Closure::<dyn Fn(Event)>::new(handler)
            .into_js_value()
            .unchecked_into();
        target.add_event_listener_with_callback(event, &callback)?;
        Ok(Self {
            target: target.clone(),
            event,
            callback,
        })
    }
}

impl Drop for DomListener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, &self.callback);
    }
}
