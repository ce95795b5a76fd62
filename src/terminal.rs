use anyhow::{Context, Result};
use crossterm::{
    cursor::Show,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::Write;

/// Raw mode, alternate screen and mouse capture for as long as it lives.
///
/// Dropping it puts the terminal back, so early returns and panics after
/// `enter` leave a usable shell.
pub struct TerminalGuard<W: Write> {
    out: W,
    raw_mode: bool,
}

impl<W: Write> TerminalGuard<W> {
    pub fn enter(out: W) -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        Self::enter_screen(out, true)
    }

    // The guard exists before the screen switch so a failed switch still
    // undoes raw mode.
    fn enter_screen(out: W, raw_mode: bool) -> Result<Self> {
        let mut guard = Self { out, raw_mode };
        execute!(guard.out, EnterAlternateScreen, EnableMouseCapture)
            .context("Failed to setup terminal")?;
        Ok(guard)
    }
}

impl<W: Write> Drop for TerminalGuard<W> {
    fn drop(&mut self) {
        if self.raw_mode {
            let _ = disable_raw_mode();
        }
        let _ = execute!(self.out, LeaveAlternateScreen, DisableMouseCapture, Show);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::panic::{self, AssertUnwindSafe};

    fn restore_sequence() -> Vec<u8> {
        let mut expected = Vec::new();
        execute!(expected, LeaveAlternateScreen, DisableMouseCapture, Show).unwrap();
        expected
    }

    /// Accepts nothing, like a closed terminal.
    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("terminal gone"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn drop_restores_the_screen() {
        let mut out = Vec::new();
        {
            let _guard = TerminalGuard::enter_screen(&mut out, false).unwrap();
        }
        assert!(out.ends_with(&restore_sequence()));
    }

    #[test]
    fn panic_still_restores_the_screen() {
        let mut out = Vec::new();
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let _guard = TerminalGuard::enter_screen(&mut out, false).unwrap();
            panic!("draw failed");
        }));

        assert!(result.is_err());
        assert!(out.ends_with(&restore_sequence()));
    }

    #[test]
    fn failed_screen_switch_is_reported() {
        let err = TerminalGuard::enter_screen(Broken, false).err().unwrap();
        assert!(err.to_string().contains("Failed to setup terminal"));
    }
}
