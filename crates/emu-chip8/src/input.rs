//! Keypad state and the per-frame latch.
//!
//! The frontend delivers plain down/up events for the 16 keys. Once per
//! frame [`Keypad::latch`] derives three bitmasks from them:
//!
//! - `current`: keys down at the latch point;
//! - `previous`: `current` from the prior latch;
//! - `released`: bits that went down-to-up across the latch (plus any
//!   bits consumed by a resolved key-wait, until the next latch).
//!
//! Key-skip instructions test `current & !released`, so a key does not
//! read as pressed on the same frame its release was observed, and a
//! key consumed by a key-wait stays invisible until the next latch.

/// Number of keypad keys.
pub const KEY_COUNT: usize = 16;

#[derive(Debug, Default)]
pub struct Keypad {
    keys: [bool; KEY_COUNT],
    current: u16,
    previous: u16,
    released: u16,
}

impl Keypad {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a raw key transition. Indices outside 0x0..=0xF are
    /// ignored.
    pub fn set_key(&mut self, key: u8, down: bool) {
        if let Some(state) = self.keys.get_mut(usize::from(key)) {
            *state = down;
        }
    }

    /// Derive the frame's bitmasks from the raw key flags.
    pub fn latch(&mut self) {
        self.previous = self.current;
        self.current = self
            .keys
            .iter()
            .enumerate()
            .fold(0, |mask, (i, &down)| if down { mask | (1 << i) } else { mask });
        self.released = self.previous & !self.current;
    }

    /// Whether key `key` counts as pressed for skip instructions.
    #[must_use]
    pub fn is_pressed(&self, key: u8) -> bool {
        (self.current & !self.released) & (1 << (key & 0xF)) != 0
    }

    /// Resolve a pending key-wait: pick the lowest currently-down key
    /// that has not been consumed, mark every such key consumed, and
    /// return the pick. `None` while no qualifying key is down.
    pub fn take_fresh_key(&mut self) -> Option<u8> {
        let fresh = self.current & !self.released;
        if fresh == 0 {
            return None;
        }
        let key = fresh.trailing_zeros() as u8;
        self.released |= fresh;
        Some(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latch_builds_current_mask() {
        let mut pad = Keypad::new();
        pad.set_key(0x3, true);
        pad.set_key(0xA, true);
        pad.latch();
        assert!(pad.is_pressed(0x3));
        assert!(pad.is_pressed(0xA));
        assert!(!pad.is_pressed(0x0));
    }

    #[test]
    fn released_key_is_not_pressed_on_release_frame() {
        let mut pad = Keypad::new();
        pad.set_key(0x5, true);
        pad.latch();
        assert!(pad.is_pressed(0x5));

        pad.set_key(0x5, false);
        pad.latch();
        assert!(!pad.is_pressed(0x5));

        // the release marker clears on the next latch
        pad.latch();
        assert!(!pad.is_pressed(0x5));
    }

    #[test]
    fn take_fresh_key_picks_lowest_and_consumes() {
        let mut pad = Keypad::new();
        pad.set_key(0x7, true);
        pad.set_key(0x2, true);
        pad.latch();

        assert_eq!(pad.take_fresh_key(), Some(0x2));
        // both down keys were consumed; nothing fresh remains
        assert_eq!(pad.take_fresh_key(), None);
        // consumed keys are invisible to skips until the next latch
        assert!(!pad.is_pressed(0x2));
        assert!(!pad.is_pressed(0x7));
    }

    #[test]
    fn take_fresh_key_sees_keys_again_after_relatch() {
        let mut pad = Keypad::new();
        pad.set_key(0x4, true);
        pad.latch();
        assert_eq!(pad.take_fresh_key(), Some(0x4));

        pad.latch();
        assert!(pad.is_pressed(0x4));
    }

    #[test]
    fn out_of_range_keys_are_ignored() {
        let mut pad = Keypad::new();
        pad.set_key(0x10, true);
        pad.set_key(0xFF, true);
        pad.latch();
        assert_eq!(pad.take_fresh_key(), None);
    }
}
