use std::io;

use crossterm::{cursor, terminal, ExecutableCommand};

/// Holds the terminal in raw mode until dropped or deactivated, so every
/// early return out of an interactive loop restores it.
pub(crate) struct RawModeGuard {
    active: bool,
    cursor_hidden: bool,
}

impl RawModeGuard {
    pub(crate) fn activate() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self {
            active: true,
            cursor_hidden: false,
        })
    }

    /// Raw mode plus a hidden cursor, for full-screen menus.
    pub(crate) fn with_hidden_cursor() -> io::Result<Self> {
        let mut guard = Self::activate()?;
        io::stdout().execute(cursor::Hide)?;
        guard.cursor_hidden = true;
        Ok(guard)
    }

    pub(crate) fn deactivate(&mut self) {
        if self.cursor_hidden {
            let _ = io::stdout().execute(cursor::Show);
            self.cursor_hidden = false;
        }
        if self.active {
            let _ = terminal::disable_raw_mode();
            self.active = false;
        }
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        self.deactivate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropping_the_guard_leaves_cooked_mode() {
        // Without a terminal attached activation fails, which is fine here.
        if let Ok(guard) = RawModeGuard::with_hidden_cursor() {
            assert!(terminal::is_raw_mode_enabled().unwrap_or(true));
            drop(guard);
        }
        assert!(!terminal::is_raw_mode_enabled().unwrap_or(false));
    }

    #[test]
    fn deactivating_twice_is_harmless() {
        let mut guard = RawModeGuard {
            active: false,
            cursor_hidden: false,
        };
        guard.deactivate();
        guard.deactivate();
        assert!(!guard.active);
        assert!(!guard.cursor_hidden);
    }
}
