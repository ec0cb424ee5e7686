use super::{Element, FOCUS};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttachmentState {
    Listening,
    Detached,
}

/// Handle for an element that selects its content on focus.
///
/// Dropping the handle detaches the listener, as does [`destroy`](Self::destroy).
/// Once detached it stays detached; attach again with [`select_on_focus`].
#[must_use = "dropping a FocusSelection immediately detaches it"]
pub struct FocusSelection<E: Element> {
    attached: Option<(E, E::Listener)>,
}

impl<E: Element> FocusSelection<E> {
    /// Remove the focus listener. Calling this again does nothing.
    pub fn destroy(&mut self) {
        if let Some((element, listener)) = self.attached.take() {
            element.remove_event_listener(FOCUS, listener);
            log::trace!("select-on-focus detached");
        }
    }

    pub fn state(&self) -> AttachmentState {
        if self.attached.is_some() {
            AttachmentState::Listening
        } else {
            AttachmentState::Detached
        }
    }

    pub fn is_listening(&self) -> bool {
        self.state() == AttachmentState::Listening
    }
}

impl<E: Element> Drop for FocusSelection<E> {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl<E: Element> std::fmt::Debug for FocusSelection<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FocusSelection")
            .field("state", &self.state())
            .finish()
    }
}

/// Select the element's content every time it gains focus.
///
/// Returns `None` without touching the element when there is no element or
/// when it cannot select its content.
///
/// # Examples
///
/// ```
/// use keepsake::action::{select_on_focus, VirtualElement};
///
/// let input = VirtualElement::input("Complete the tutorial");
/// let mut action = select_on_focus(Some(&input)).unwrap();
///
/// input.focus();
/// assert_eq!(input.selection(), Some(0..21));
///
/// action.destroy();
/// assert_eq!(input.listener_count("focus"), 0);
/// ```
pub fn select_on_focus<E: Element>(element: Option<&E>) -> Option<FocusSelection<E>> {
    let element = element?;
    element.selectable()?;

    let target = element.clone();
    let listener = element.add_event_listener(
        FOCUS,
        Box::new(move || {
            if let Some(selectable) = target.selectable() {
                selectable.select();
            }
        }),
    );
    log::trace!("select-on-focus attached");

    Some(FocusSelection {
        attached: Some((element.clone(), listener)),
    })
}
