use super::{Element, Selectable};
use std::cell::{Cell, RefCell};
use std::ops::Range;
use std::rc::Rc;

type Handler = Rc<dyn Fn()>;

/// A headless element for running actions outside a browser.
///
/// Events are dispatched synchronously to listeners in the order they were
/// added. Clones refer to the same element.
#[derive(Clone)]
pub struct VirtualElement {
    node: Rc<Node>,
}

struct Node {
    tag: &'static str,
    selectable: bool,
    value: RefCell<String>,
    selection: RefCell<Option<Range<usize>>>,
    select_count: Cell<usize>,
    focused: Cell<bool>,
    next_listener: Cell<u64>,
    listeners: RefCell<Vec<(u64, String, Handler)>>,
}

/// Listener token for a [`VirtualElement`].
#[derive(Debug, PartialEq, Eq)]
pub struct VirtualListener(u64);

impl VirtualElement {
    fn new(tag: &'static str, selectable: bool, value: &str) -> Self {
        Self {
            node: Rc::new(Node {
                tag,
                selectable,
                value: RefCell::new(value.to_string()),
                selection: RefCell::new(None),
                select_count: Cell::new(0),
                focused: Cell::new(false),
                next_listener: Cell::new(0),
                listeners: RefCell::new(Vec::new()),
            }),
        }
    }

    /// A text input holding `value`.
    pub fn input(value: &str) -> Self {
        Self::new("input", true, value)
    }

    /// A multi-line text area holding `value`.
    pub fn textarea(value: &str) -> Self {
        Self::new("textarea", true, value)
    }

    /// A container without a selectable value.
    pub fn div() -> Self {
        Self::new("div", false, "")
    }

    pub fn tag(&self) -> &'static str {
        self.node.tag
    }

    pub fn value(&self) -> String {
        self.node.value.borrow().clone()
    }

    /// Replace the value, clearing any selection.
    pub fn set_value(&self, value: &str) {
        *self.node.value.borrow_mut() = value.to_string();
        self.node.selection.borrow_mut().take();
    }

    /// Selected range in characters.
    pub fn selection(&self) -> Option<Range<usize>> {
        self.node.selection.borrow().clone()
    }

    /// How many times the content has been selected.
    pub fn select_count(&self) -> usize {
        self.node.select_count.get()
    }

    pub fn has_focus(&self) -> bool {
        self.node.focused.get()
    }

    /// Give the element focus and fire `focus` if it did not have it.
    pub fn focus(&self) {
        if !self.node.focused.replace(true) {
            self.dispatch(super::FOCUS);
        }
    }

    /// Take focus away and fire `blur` if it had it.
    pub fn blur(&self) {
        if self.node.focused.replace(false) {
            self.dispatch("blur");
        }
    }

    /// Run every listener registered for `event`.
    pub fn dispatch(&self, event: &str) {
        // Handlers may add or remove listeners while running.
        let handlers: Vec<Handler> = self
            .node
            .listeners
            .borrow()
            .iter()
            .filter(|(_, name, _)| name == event)
            .map(|(_, _, handler)| Rc::clone(handler))
            .collect();
        for handler in handlers {
            handler();
        }
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.node
            .listeners
            .borrow()
            .iter()
            .filter(|(_, name, _)| name == event)
            .count()
    }
}

impl Selectable for Node {
    fn select(&self) {
        let len = self.value.borrow().chars().count();
        *self.selection.borrow_mut() = Some(0..len);
        self.select_count.set(self.select_count.get() + 1);
    }
}

impl Element for VirtualElement {
    type Listener = VirtualListener;

    fn add_event_listener(&self, event: &str, handler: Box<dyn Fn()>) -> VirtualListener {
        let id = self.node.next_listener.get();
        self.node.next_listener.set(id + 1);
        self.node
            .listeners
            .borrow_mut()
            .push((id, event.to_string(), Rc::from(handler)));
        VirtualListener(id)
    }

    fn remove_event_listener(&self, event: &str, listener: VirtualListener) {
        self.node
            .listeners
            .borrow_mut()
            .retain(|(id, name, _)| !(*id == listener.0 && name == event));
    }

    fn selectable(&self) -> Option<&dyn Selectable> {
        if self.node.selectable {
            Some(&*self.node as &dyn Selectable)
        } else {
            None
        }
    }
}

impl std::fmt::Debug for VirtualElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualElement")
            .field("tag", &self.node.tag)
            .field("value", &*self.node.value.borrow())
            .field("focused", &self.node.focused.get())
            .finish_non_exhaustive()
    }
}
