//! Wii remote button definitions and sampled input state
//!
//! Bit values follow the Wii remote core button report, so a state read
//! from any backend can be compared against the same masks.

use std::fmt;

/// Bitmask of the buttons currently held on the remote
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Buttons(u16);

impl Buttons {
    pub const NONE: Buttons = Buttons(0);
    pub const TWO: Buttons = Buttons(0x0001);
    pub const ONE: Buttons = Buttons(0x0002);
    pub const B: Buttons = Buttons(0x0004);
    pub const A: Buttons = Buttons(0x0008);
    pub const MINUS: Buttons = Buttons(0x0010);
    pub const HOME: Buttons = Buttons(0x0080);
    pub const LEFT: Buttons = Buttons(0x0100);
    pub const RIGHT: Buttons = Buttons(0x0200);
    pub const DOWN: Buttons = Buttons(0x0400);
    pub const UP: Buttons = Buttons(0x0800);
    pub const PLUS: Buttons = Buttons(0x1000);

    const NAMES: [(Buttons, &'static str); 11] = [
        (Buttons::UP, "UP"),
        (Buttons::DOWN, "DOWN"),
        (Buttons::LEFT, "LEFT"),
        (Buttons::RIGHT, "RIGHT"),
        (Buttons::A, "A"),
        (Buttons::B, "B"),
        (Buttons::ONE, "1"),
        (Buttons::TWO, "2"),
        (Buttons::MINUS, "MINUS"),
        (Buttons::PLUS, "PLUS"),
        (Buttons::HOME, "HOME"),
    ];

    /// Wrap a raw report bitmask
    #[cfg(test)]
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// Raw bitmask
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Check if every bit of `other` is set
    pub const fn contains(self, other: Buttons) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    /// Check if no button is held
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn insert(&mut self, other: Buttons) {
        self.0 |= other.0;
    }
}

impl std::ops::BitOr for Buttons {
    type Output = Buttons;

    fn bitor(self, rhs: Buttons) -> Buttons {
        Buttons(self.0 | rhs.0)
    }
}

impl fmt::Debug for Buttons {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "Buttons(NONE)");
        }
        let held: Vec<&str> = Self::NAMES
            .iter()
            .filter(|(button, _)| self.contains(*button))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "Buttons({})", held.join("|"))
    }
}

/// Accelerometer axes as reported by the remote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Acceleration {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// Instantaneous snapshot of the remote taken once per loop iteration
///
/// Carries no history: two samples with the same buttons held are equal
/// regardless of what happened between them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    /// Buttons held at sample time
    pub buttons: Buttons,
    /// Accelerometer reading, if accelerometer reporting is enabled
    pub acceleration: Option<Acceleration>,
}

impl InputState {
    /// State with the given buttons held and no accelerometer data
    #[cfg(test)]
    pub fn with_buttons(buttons: Buttons) -> Self {
        Self {
            buttons,
            acceleration: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_state() {
        let state = InputState::default();
        assert!(state.buttons.is_empty());
        assert!(!state.buttons.contains(Buttons::UP));
    }

    #[test]
    fn test_contains_combined() {
        let held = Buttons::UP | Buttons::LEFT;
        assert!(held.contains(Buttons::UP));
        assert!(held.contains(Buttons::LEFT));
        assert!(held.contains(Buttons::UP | Buttons::LEFT));
        assert!(!held.contains(Buttons::DOWN));
        assert!(!held.contains(Buttons::UP | Buttons::A));
    }

    #[test]
    fn test_none_is_never_contained() {
        assert!(!Buttons::UP.contains(Buttons::NONE));
    }

    #[test]
    fn test_report_bits() {
        assert_eq!(Buttons::from_bits(0x0808), Buttons::UP | Buttons::A);
        assert_eq!((Buttons::DOWN | Buttons::RIGHT).bits(), 0x0600);
    }

    #[test]
    fn test_debug_lists_held_buttons() {
        assert_eq!(format!("{:?}", Buttons::UP | Buttons::A), "Buttons(UP|A)");
        assert_eq!(format!("{:?}", Buttons::NONE), "Buttons(NONE)");
    }
}
