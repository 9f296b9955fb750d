//! Window events, translated from the windowing system into a small closed set.

use bitflags::bitflags;

/// An event coming from the window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WindowEvent {
    /// The user asked to close the window.
    Close,
    /// The drawable area changed size, in logical pixels.
    Resized(u32, u32),
    /// The ratio between physical and logical pixels changed.
    ScaleFactorChanged(f64),
    /// The cursor moved to the given position, in logical pixels from the top-left corner.
    CursorPos(f64, f64, Modifiers),
    /// A mouse button was pressed or released.
    MouseButton(MouseButton, Action, Modifiers),
    /// The wheel or touchpad scrolled by the given amount.
    ///
    /// Line-based wheels report ten units per notch. Positive `y` scrolls up, away from the user.
    Scroll(f64, f64, Modifiers),
    /// A keyboard key was pressed or released.
    Key(Key, Action, Modifiers),
}

/// Whether a key or button went down or up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// Pressed.
    Press,
    /// Released.
    Release,
}

/// Mouse buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left button.
    Left,
    /// Right button.
    Right,
    /// Middle button (wheel click).
    Middle,
    /// Any other button.
    Other,
}

/// The keys the application reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// The escape key.
    Escape,
    /// Any other key.
    Unknown,
}

bitflags! {
    /// Modifier keys held while an event happened.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u32 {
        /// Either shift key.
        const Shift   = 0b0001;
        /// Either control key.
        const Control = 0b0010;
        /// Either alt key.
        const Alt     = 0b0100;
        /// The super (command, windows) key.
        const Super   = 0b1000;
    }
}
