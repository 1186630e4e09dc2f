// crates/karaoke-ui/src/helpers/shortcuts.rs
//
// Keyboard chords for the menu actions. `COMMAND` is Ctrl on Windows/Linux
// and ⌘ on macOS.

use egui::{Key, KeyboardShortcut, Modifiers};

/// File → Exit.
pub const EXIT: KeyboardShortcut = KeyboardShortcut::new(Modifiers::COMMAND, Key::Q);

/// View → Fullscreen.
pub const FULLSCREEN: KeyboardShortcut =
    KeyboardShortcut::new(Modifiers::COMMAND.plus(Modifiers::SHIFT), Key::F);

/// Leaves fullscreen; only consumed while the video is fullscreen.
pub const LEAVE_FULLSCREEN: KeyboardShortcut = KeyboardShortcut::new(Modifiers::NONE, Key::Escape);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_is_command_q() {
        assert_eq!(EXIT.logical_key, Key::Q);
        assert!(EXIT.modifiers.command);
        assert!(!EXIT.modifiers.shift);
    }

    #[test]
    fn fullscreen_needs_shift() {
        assert_eq!(FULLSCREEN.logical_key, Key::F);
        assert!(FULLSCREEN.modifiers.command);
        assert!(FULLSCREEN.modifiers.shift);
        assert!(!FULLSCREEN.modifiers.alt);
    }

    #[test]
    fn escape_leaves_fullscreen_without_modifiers() {
        assert_eq!(LEAVE_FULLSCREEN.logical_key, Key::Escape);
        assert!(LEAVE_FULLSCREEN.modifiers.is_none());
    }
}
