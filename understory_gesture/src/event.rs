// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input events consumed by recognizers, and the event classes used for
//! interest filtering and delivery delays.

use kurbo::Point;

/// Describes a button of a mouse or tablet stylus.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Usually the left button.
    Primary,
    /// Usually the right button.
    Secondary,
    /// Any other button, numbered from `2`.
    Other(u8),
}

impl MouseButton {
    /// The event class used for events from this button.
    pub const fn class(self) -> EventClass {
        match self {
            Self::Primary => EventClass::PRIMARY_MOUSE,
            Self::Secondary => EventClass::SECONDARY_MOUSE,
            Self::Other(_) => EventClass::OTHER_MOUSE,
        }
    }
}

/// Describes the phase of a trackpad magnify or rotate sequence.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TouchPhase {
    /// First event of the sequence.
    Started,
    /// Intermediate update.
    Moved,
    /// The fingers lifted.
    Ended,
    /// The system stopped tracking the sequence.
    Cancelled,
}

bitflags::bitflags! {
    /// Modifier keys held while an event was generated.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// Shift key.
        const SHIFT    = 0b0000_0001;
        /// Control key.
        const CONTROL  = 0b0000_0010;
        /// Option / Alt key.
        const OPTION   = 0b0000_0100;
        /// Command / Super key.
        const COMMAND  = 0b0000_1000;
        /// Caps lock is engaged.
        const CAPS     = 0b0001_0000;
        /// Function key.
        const FUNCTION = 0b0010_0000;
    }
}

bitflags::bitflags! {
    /// A set of event classes.
    ///
    /// Used in three places:
    /// - [`InputEvent::class`] reports the class of one event.
    /// - [`GestureKind::interest`](crate::GestureKind::interest) names the
    ///   classes a kind consumes.
    /// - [`GestureRecognizer::with_delays`](crate::GestureRecognizer::with_delays)
    ///   names the classes whose view delivery waits for the recognizer.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct EventClass: u16 {
        /// Primary mouse button down/up/dragged.
        const PRIMARY_MOUSE   = 1 << 0;
        /// Secondary mouse button down/up/dragged.
        const SECONDARY_MOUSE = 1 << 1;
        /// Any other mouse button down/up/dragged.
        const OTHER_MOUSE     = 1 << 2;
        /// Key down/up.
        const KEY             = 1 << 3;
        /// Modifier flags changed.
        const FLAGS           = 1 << 4;
        /// Tablet point updates.
        const TABLET          = 1 << 5;
        /// Trackpad magnification.
        const MAGNIFY         = 1 << 6;
        /// Trackpad rotation.
        const ROTATE          = 1 << 7;
        /// Force-touch pressure changes.
        const PRESSURE        = 1 << 8;

        /// Every mouse button.
        const MOUSE = Self::PRIMARY_MOUSE.bits()
            | Self::SECONDARY_MOUSE.bits()
            | Self::OTHER_MOUSE.bits();
        /// Classes a recognizer may delay view delivery for.
        const DELAYABLE = Self::MOUSE.bits()
            | Self::KEY.bits()
            | Self::MAGNIFY.bits()
            | Self::ROTATE.bits();
    }
}

impl EventClass {
    /// Returns `true` if delivery of an event of class `event` must wait for a
    /// recognizer with these delay flags.
    ///
    /// Modifier changes are key events for the purpose of delays.
    pub fn delays(self, event: Self) -> bool {
        let mut event = event;
        if event.contains(Self::FLAGS) {
            event |= Self::KEY;
        }
        self.intersects(event & Self::DELAYABLE)
    }
}

/// What happened.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum EventKind {
    /// A mouse button was pressed.
    MouseDown(MouseButton),
    /// A mouse button was released.
    MouseUp(MouseButton),
    /// The pointer moved while a button was held.
    MouseDragged(MouseButton),
    /// A key was pressed.
    KeyDown {
        /// Hardware-independent key code.
        key_code: u16,
        /// Generated by key auto-repeat.
        repeat: bool,
    },
    /// A key was released.
    KeyUp {
        /// Hardware-independent key code.
        key_code: u16,
    },
    /// The set of held modifiers changed; see [`InputEvent::modifiers`].
    FlagsChanged,
    /// A tablet stylus reported a new sample.
    TabletPoint {
        /// Normalized pressure in `0.0..=1.0`.
        pressure: f32,
    },
    /// Two-finger pinch on a trackpad.
    Magnify {
        /// Magnification change since the previous event; positive zooms in.
        delta: f64,
        /// Sequence phase.
        phase: TouchPhase,
    },
    /// Two-finger rotation on a trackpad.
    Rotate {
        /// Rotation change in degrees since the previous event; positive is
        /// counterclockwise.
        delta: f64,
        /// Sequence phase.
        phase: TouchPhase,
    },
    /// Force-touch pressure changed.
    PressureChange {
        /// Normalized pressure in `0.0..=1.0`.
        pressure: f32,
        /// Click stage reported by the device.
        stage: i64,
    },
}

/// An input event routed to recognizers.
///
/// `location` is in window coordinates; `time` is a monotonic timestamp in
/// milliseconds that the host must keep consistent with the `now` values it
/// passes to [`GestureEngine::tick`](crate::GestureEngine::tick).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct InputEvent {
    /// What happened.
    pub kind: EventKind,
    /// Pointer location in window coordinates.
    pub location: Point,
    /// Monotonic timestamp in milliseconds.
    pub time: u64,
    /// Modifiers held when the event was generated.
    pub modifiers: Modifiers,
}

impl InputEvent {
    /// Build an event with no modifiers.
    pub const fn new(kind: EventKind, location: Point, time: u64) -> Self {
        Self {
            kind,
            location,
            time,
            modifiers: Modifiers::empty(),
        }
    }

    /// Replace the modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Convenience constructor for a mouse-down event.
    pub const fn mouse_down(button: MouseButton, location: Point, time: u64) -> Self {
        Self::new(EventKind::MouseDown(button), location, time)
    }

    /// Convenience constructor for a mouse-up event.
    pub const fn mouse_up(button: MouseButton, location: Point, time: u64) -> Self {
        Self::new(EventKind::MouseUp(button), location, time)
    }

    /// Convenience constructor for a mouse-dragged event.
    pub const fn mouse_dragged(button: MouseButton, location: Point, time: u64) -> Self {
        Self::new(EventKind::MouseDragged(button), location, time)
    }

    /// The class of this event.
    pub const fn class(&self) -> EventClass {
        match self.kind {
            EventKind::MouseDown(b) | EventKind::MouseUp(b) | EventKind::MouseDragged(b) => {
                b.class()
            }
            EventKind::KeyDown { .. } | EventKind::KeyUp { .. } => EventClass::KEY,
            EventKind::FlagsChanged => EventClass::FLAGS,
            EventKind::TabletPoint { .. } => EventClass::TABLET,
            EventKind::Magnify { .. } => EventClass::MAGNIFY,
            EventKind::Rotate { .. } => EventClass::ROTATE,
            EventKind::PressureChange { .. } => EventClass::PRESSURE,
        }
    }

    /// Returns `true` if this event can open a new gesture attempt for
    /// recognizers that are not yet participating.
    pub const fn is_initiating(&self) -> bool {
        match self.kind {
            EventKind::MouseDown(_) | EventKind::FlagsChanged => true,
            EventKind::KeyDown { repeat, .. } => !repeat,
            EventKind::Magnify { phase, .. } | EventKind::Rotate { phase, .. } => {
                matches!(phase, TouchPhase::Started)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mouse_classes_follow_the_button() {
        let at = Point::new(1.0, 2.0);
        assert_eq!(
            InputEvent::mouse_down(MouseButton::Primary, at, 0).class(),
            EventClass::PRIMARY_MOUSE
        );
        assert_eq!(
            InputEvent::mouse_up(MouseButton::Secondary, at, 0).class(),
            EventClass::SECONDARY_MOUSE
        );
        assert_eq!(
            InputEvent::mouse_dragged(MouseButton::Other(4), at, 0).class(),
            EventClass::OTHER_MOUSE
        );
    }

    #[test]
    fn key_delay_covers_modifier_changes() {
        let flags = InputEvent::new(EventKind::FlagsChanged, Point::ZERO, 0);
        assert!(EventClass::KEY.delays(flags.class()));
        assert!(!EventClass::PRIMARY_MOUSE.delays(flags.class()));
    }

    #[test]
    fn non_delayable_classes_never_wait() {
        assert!(!EventClass::all().delays(EventClass::TABLET));
        assert!(!EventClass::all().delays(EventClass::PRESSURE));
        assert!(EventClass::all().delays(EventClass::ROTATE));
    }

    #[test]
    fn repeats_and_moves_do_not_initiate() {
        let repeat = InputEvent::new(
            EventKind::KeyDown {
                key_code: 12,
                repeat: true,
            },
            Point::ZERO,
            0,
        );
        assert!(!repeat.is_initiating());
        let drag = InputEvent::mouse_dragged(MouseButton::Primary, Point::ZERO, 0);
        assert!(!drag.is_initiating());
        let pinch = InputEvent::new(
            EventKind::Magnify {
                delta: 0.1,
                phase: TouchPhase::Started,
            },
            Point::ZERO,
            0,
        );
        assert!(pinch.is_initiating());
    }
}
