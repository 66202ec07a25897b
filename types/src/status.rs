//! Status reporting seams.
//!
//! [`StatusItem`] is the raw UI element a host hands out; [`Status`] is the
//! narrow capability an initialization action receives so it can describe what
//! it is doing without knowing anything about the UI.

/// A host-owned status bar element.
///
/// Implementations must tolerate `set_text` before `show` and must treat
/// `dispose` as final.
pub trait StatusItem: Send {
    fn show(&mut self);
    fn set_text(&mut self, text: &str);
    fn dispose(&mut self);
}

/// Progress reporting capability passed to subsystem activators.
pub trait Status: Send + Sync {
    /// Replace the visible message.
    fn update(&self, message: &str);
}
