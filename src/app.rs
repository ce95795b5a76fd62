use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use std::cell::Cell;
use std::process::{Command, Stdio};
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::keys::any_matches;
use crate::panel::{Effect, Panel, PanelSettings};
use crate::ui::{hit_test, page_layout, Target};

// ============================================================================
// APPLICATION STATE
// ============================================================================

pub struct App {
    pub config: Config,
    pub panel: Panel,
    pub focused: usize,
    pub should_quit: bool,
    started: Instant,
    redraw: Rc<Cell<bool>>,
}

impl App {
    pub fn new(config: Config) -> Self {
        let panel = Panel::new(PanelSettings::from_config(&config));
        Self::with_panel(config, panel)
    }

    pub fn with_panel(config: Config, mut panel: Panel) -> Self {
        let redraw = Rc::new(Cell::new(true));
        let flag = Rc::clone(&redraw);
        panel.subscribe(move |_| flag.set(true));

        Self {
            config,
            panel,
            focused: 0,
            should_quit: false,
            started: Instant::now(),
            redraw,
        }
    }

    /// Time since start, drives the glitch and neon animations.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn focused_effect(&self) -> Effect {
        Effect::ALL[self.focused]
    }

    pub fn next(&mut self) {
        self.focused = (self.focused + 1) % Effect::ALL.len();
        self.redraw.set(true);
    }

    pub fn previous(&mut self) {
        if self.focused > 0 {
            self.focused -= 1;
        } else {
            self.focused = Effect::ALL.len() - 1;
        }
        self.redraw.set(true);
    }

    /// Activates a card by position, focusing it too.
    pub fn activate_card(&mut self, index: usize) -> Result<()> {
        if let Some(effect) = Effect::ALL.get(index) {
            self.focused = index;
            self.redraw.set(true);
            self.panel.activate(effect.label())?;
        }
        Ok(())
    }

    pub fn select(&mut self) -> Result<()> {
        self.activate_card(self.focused)
    }

    pub fn open_link(&self) -> Result<()> {
        let link = &self.config.link;
        if link.open_command.is_empty() {
            return Ok(());
        }

        Command::new(&link.open_command)
            .arg(&link.url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("Failed to execute command: {}", link.open_command))?;

        tracing::info!(url = %link.url, "opened link");
        Ok(())
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Whether the screen is stale, clearing the pending flag. Animated
    /// effects keep it stale every frame.
    pub fn take_redraw(&mut self) -> bool {
        let animating =
            self.panel.is_active(Effect::Glitch) || self.panel.is_active(Effect::Shader);
        self.redraw.replace(false) || animating
    }

    pub fn request_redraw(&self) {
        self.redraw.set(true);
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> Result<()> {
        let keys = &self.config.keys;

        if any_matches(&keys.quit, key) {
            self.quit();
        } else if any_matches(&keys.previous, key) {
            self.previous();
        } else if any_matches(&keys.next, key) {
            self.next();
        } else if any_matches(&keys.activate, key) {
            self.select()?;
        } else if any_matches(&keys.open_link, key) {
            self.open_link()?;
        } else if let (KeyCode::Char(c @ '1'..='4'), KeyModifiers::NONE) =
            (key.code, key.modifiers)
        {
            self.activate_card(c as usize - '1' as usize)?;
        }
        Ok(())
    }

    /// Left clicks on a card or the link; `area` is the last drawn frame.
    pub fn handle_mouse(&mut self, mouse: &MouseEvent, area: Rect) -> Result<()> {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return Ok(());
        }

        let layout = page_layout(area, &self.config);
        match hit_test(&layout, mouse.column, mouse.row) {
            Some(Target::Card(index)) => self.activate_card(index)?,
            Some(Target::Link) => self.open_link()?,
            None => {}
        }
        Ok(())
    }
}
