use super::{Element, Selectable};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{HtmlElement, HtmlInputElement, HtmlTextAreaElement};

impl Selectable for HtmlInputElement {
    fn select(&self) {
        HtmlInputElement::select(self);
    }
}

impl Selectable for HtmlTextAreaElement {
    fn select(&self) {
        HtmlTextAreaElement::select(self);
    }
}

impl Element for HtmlElement {
    // Must stay alive until the listener is removed.
    type Listener = Closure<dyn Fn()>;

    fn add_event_listener(&self, event: &str, handler: Box<dyn Fn()>) -> Self::Listener {
        let closure = Closure::wrap(handler);
        if let Err(err) =
            self.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        {
            log::warn!("failed to add `{event}` listener: {err:?}");
        }
        closure
    }

    fn remove_event_listener(&self, event: &str, listener: Self::Listener) {
        if let Err(err) =
            self.remove_event_listener_with_callback(event, listener.as_ref().unchecked_ref())
        {
            log::warn!("failed to remove `{event}` listener: {err:?}");
        }
    }

    fn selectable(&self) -> Option<&dyn Selectable> {
        if let Some(input) = self.dyn_ref::<HtmlInputElement>() {
            return Some(input as &dyn Selectable);
        }
        self.dyn_ref::<HtmlTextAreaElement>()
            .map(|area| area as &dyn Selectable)
    }
}
