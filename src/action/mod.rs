//! Element actions.
//!
//! An action attaches behaviour to an element for as long as the element is
//! mounted and hands back a handle that undoes it. Elements are described by
//! the [`Element`] trait; [`VirtualElement`] is a headless implementation and,
//! with the `web` feature, `web_sys::HtmlElement` is another.

mod select_on_focus;
mod virtual_element;
#[cfg(feature = "web")]
mod web;

pub use select_on_focus::{select_on_focus, AttachmentState, FocusSelection};
pub use virtual_element::{VirtualElement, VirtualListener};

/// Event fired when an element gains focus.
pub const FOCUS: &str = "focus";

/// Elements whose content can be selected, such as text inputs.
pub trait Selectable {
    /// Select the element's entire content.
    fn select(&self);
}

/// An element that can carry event listeners.
pub trait Element: Clone + 'static {
    /// Token needed to remove a listener again.
    type Listener;

    fn add_event_listener(&self, event: &str, handler: Box<dyn Fn()>) -> Self::Listener;

    fn remove_event_listener(&self, event: &str, listener: Self::Listener);

    /// The element's selection capability, if it has one.
    fn selectable(&self) -> Option<&dyn Selectable>;
}
