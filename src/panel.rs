use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::effects::{AsciiFrame, SpriteGrid};
use crate::palette::{random_palette, Palette, ThemeColors};
use crate::ticker::Ticker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Effect {
    Glitch,
    Palette,
    Sprite,
    Shader,
}

impl Effect {
    /// Card order, left to right.
    pub const ALL: [Effect; 4] = [Effect::Glitch, Effect::Palette, Effect::Sprite, Effect::Shader];

    pub fn label(self) -> &'static str {
        match self {
            Effect::Glitch => "AI Glitch Art",
            Effect::Palette => "Brutalist CSS Generator",
            Effect::Sprite => "Pixel Sprite Mixer",
            Effect::Shader => "Neon ASCII Shader",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|effect| effect.label() == label)
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What changed, passed to subscribers after every update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelEvent {
    Toggled { effect: Effect, active: bool },
    ThemeApplied(ThemeColors),
    FrameRegenerated,
}

type Listener = Box<dyn FnMut(&PanelEvent)>;

/// Everything the panel needs from configuration.
#[derive(Debug, Clone)]
pub struct PanelSettings {
    pub shader_interval: Duration,
    pub ascii_lines: usize,
    pub ascii_width: usize,
    pub glyphs: Vec<char>,
    pub initial_theme: ThemeColors,
}

impl PanelSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            shader_interval: config.shader_interval(),
            ascii_lines: config.shader.lines,
            ascii_width: config.shader.width,
            glyphs: config.glyphs(),
            initial_theme: config.initial_theme(),
        }
    }
}

/// A running shader: the ticker thread and the channel its ticks arrive on.
struct ShaderClock {
    ticks: Receiver<()>,
    ticker: Ticker,
}

/// Counts itself in a shared tally for as long as it lives. Moved into the
/// ticker task, so the tally is the number of shader threads still running.
struct LiveClock(Arc<AtomicUsize>);

impl LiveClock {
    fn new(tally: &Arc<AtomicUsize>) -> Self {
        tally.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(tally))
    }
}

impl Drop for LiveClock {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct Panel {
    settings: PanelSettings,
    rng: StdRng,

    glitch_active: bool,
    sprite_active: bool,
    shader_active: bool,

    sprite: SpriteGrid,
    ascii: AsciiFrame,
    theme: ThemeColors,
    palette: Option<Palette>,

    shader_clock: Option<ShaderClock>,
    live_clocks: Arc<AtomicUsize>,
    listeners: Vec<Listener>,
}

impl fmt::Debug for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Panel")
            .field("glitch_active", &self.glitch_active)
            .field("sprite_active", &self.sprite_active)
            .field("shader_active", &self.shader_active)
            .field("theme", &self.theme)
            .field("shader_running", &self.shader_running())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Panel {
    pub fn new(settings: PanelSettings) -> Self {
        Self::with_rng(settings, StdRng::from_entropy())
    }

    pub fn with_rng(settings: PanelSettings, rng: StdRng) -> Self {
        let theme = settings.initial_theme;
        Self {
            settings,
            rng,
            glitch_active: false,
            sprite_active: false,
            shader_active: false,
            sprite: SpriteGrid::default(),
            ascii: AsciiFrame::default(),
            theme,
            palette: None,
            shader_clock: None,
            live_clocks: Arc::new(AtomicUsize::new(0)),
            listeners: Vec::new(),
        }
    }

    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&PanelEvent) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Dispatches on a card label. Labels outside the fixed set are ignored.
    pub fn activate(&mut self, label: &str) -> Result<()> {
        match Effect::from_label(label) {
            Some(effect) => self.activate_effect(effect),
            None => {
                tracing::warn!(label, "ignoring unknown card label");
                Ok(())
            }
        }
    }

    pub fn activate_effect(&mut self, effect: Effect) -> Result<()> {
        match effect {
            Effect::Glitch => {
                self.glitch_active = !self.glitch_active;
                self.emit_toggle(effect, self.glitch_active);
            }
            Effect::Palette => self.randomize_theme(),
            Effect::Sprite => {
                if !self.sprite_active {
                    self.sprite = SpriteGrid::random(&mut self.rng);
                }
                self.sprite_active = !self.sprite_active;
                self.emit_toggle(effect, self.sprite_active);
            }
            Effect::Shader => {
                if self.shader_active {
                    self.stop_shader();
                } else {
                    self.start_shader()?;
                }
                self.emit_toggle(effect, self.shader_active);
            }
        }
        Ok(())
    }

    /// Consumes pending shader ticks; at most one new frame per call since
    /// intermediate frames would never be seen. Returns whether a frame was
    /// generated.
    pub fn tick(&mut self) -> bool {
        let Some(clock) = &self.shader_clock else {
            return false;
        };
        if clock.ticks.try_iter().count() == 0 {
            return false;
        }
        self.regenerate_ascii();
        self.emit(PanelEvent::FrameRegenerated);
        true
    }

    /// Teardown: stops the shader and joins its timer thread.
    pub fn shutdown(&mut self) {
        if self.shader_active {
            self.stop_shader();
            self.emit_toggle(Effect::Shader, false);
        }
    }

    pub fn is_active(&self, effect: Effect) -> bool {
        match effect {
            Effect::Glitch => self.glitch_active,
            Effect::Palette => false,
            Effect::Sprite => self.sprite_active,
            Effect::Shader => self.shader_active,
        }
    }

    pub fn theme(&self) -> ThemeColors {
        self.theme
    }

    /// The palette behind the current theme, if it was randomized.
    pub fn palette(&self) -> Option<Palette> {
        self.palette
    }

    pub fn sprite(&self) -> &SpriteGrid {
        &self.sprite
    }

    pub fn ascii(&self) -> &AsciiFrame {
        &self.ascii
    }

    /// Shader threads that have not exited yet; never more than one.
    pub fn live_clocks(&self) -> usize {
        self.live_clocks.load(Ordering::SeqCst)
    }

    /// True while a shader timer thread is alive.
    pub fn shader_running(&self) -> bool {
        self.shader_clock
            .as_ref()
            .is_some_and(|clock| !clock.ticker.is_finished())
    }

    fn randomize_theme(&mut self) {
        // consecutive randomizes never apply the same theme
        let (palette, theme) = loop {
            let palette = random_palette(&mut self.rng);
            let theme = palette.to_theme();
            if theme != self.theme {
                break (palette, theme);
            }
        };
        self.palette = Some(palette);
        self.theme = theme;
        tracing::info!(?palette, "theme randomized");
        self.emit(PanelEvent::ThemeApplied(theme));
    }

    fn start_shader(&mut self) -> Result<()> {
        // never two clocks at once
        self.shader_clock = None;

        self.regenerate_ascii();
        let (tick_tx, ticks) = mpsc::channel();
        let live = LiveClock::new(&self.live_clocks);
        let ticker = Ticker::spawn("ascii-shader", self.settings.shader_interval, move || {
            let _live = &live;
            tick_tx.send(()).is_ok()
        })?;
        self.shader_clock = Some(ShaderClock { ticks, ticker });
        self.shader_active = true;
        Ok(())
    }

    fn stop_shader(&mut self) {
        if let Some(clock) = self.shader_clock.take() {
            clock.ticker.stop();
        }
        self.shader_active = false;
    }

    fn regenerate_ascii(&mut self) {
        self.ascii = AsciiFrame::random(
            &mut self.rng,
            self.settings.ascii_lines,
            self.settings.ascii_width,
            &self.settings.glyphs,
        );
    }

    fn emit_toggle(&mut self, effect: Effect, active: bool) {
        tracing::debug!(%effect, active, "effect toggled");
        self.emit(PanelEvent::Toggled { effect, active });
    }

    fn emit(&mut self, event: PanelEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::thread;

    fn settings(interval_ms: u64) -> PanelSettings {
        let mut config = Config::default();
        config.shader.interval_ms = interval_ms;
        PanelSettings::from_config(&config)
    }

    fn panel() -> Panel {
        Panel::with_rng(settings(100), StdRng::seed_from_u64(42))
    }

    /// Sleeps past a few intervals, then drains.
    fn wait_and_tick(panel: &mut Panel, wait_ms: u64) -> bool {
        thread::sleep(Duration::from_millis(wait_ms));
        panel.tick()
    }

    #[test]
    fn everything_starts_inactive() {
        let panel = panel();
        for effect in Effect::ALL {
            assert!(!panel.is_active(effect), "{effect}");
        }
        assert!(panel.sprite().is_empty());
        assert!(panel.ascii().is_empty());
        assert!(!panel.shader_running());
        assert_eq!(panel.theme(), Config::default().initial_theme());
    }

    #[test]
    fn labels_round_trip() {
        for effect in Effect::ALL {
            assert_eq!(Effect::from_label(effect.label()), Some(effect));
        }
        assert_eq!(Effect::from_label("ai glitch art"), None);
    }

    #[test]
    fn toggles_return_to_start_after_two_clicks() {
        let mut panel = panel();
        for effect in [Effect::Glitch, Effect::Sprite, Effect::Shader] {
            panel.activate(effect.label()).unwrap();
            assert!(panel.is_active(effect), "{effect}");
            panel.activate(effect.label()).unwrap();
            assert!(!panel.is_active(effect), "{effect}");
        }
    }

    #[test]
    fn palette_changes_theme_every_time() {
        let mut panel = panel();
        let initial = panel.theme();

        panel.activate("Brutalist CSS Generator").unwrap();
        let first = panel.theme();
        assert_ne!(first, initial);

        panel.activate("Brutalist CSS Generator").unwrap();
        let second = panel.theme();
        assert_ne!(second, first);
        assert_eq!(panel.palette().unwrap().to_theme(), second);
        assert!(!panel.is_active(Effect::Palette));
    }

    #[test]
    fn sprite_is_kept_while_hidden_and_rerolled_on_show() {
        let mut panel = panel();

        panel.activate("Pixel Sprite Mixer").unwrap();
        let first = panel.sprite().clone();
        assert_eq!(first.cells().len(), 64);

        panel.activate("Pixel Sprite Mixer").unwrap();
        assert!(!panel.is_active(Effect::Sprite));
        assert_eq!(panel.sprite(), &first);

        panel.activate("Pixel Sprite Mixer").unwrap();
        assert!(panel.is_active(Effect::Sprite));
        assert_eq!(panel.sprite().cells().len(), 64);
        assert_ne!(panel.sprite(), &first);
    }

    #[test]
    fn shader_generates_frame_on_activation() {
        let mut panel = panel();
        panel.activate("Neon ASCII Shader").unwrap();

        assert!(panel.shader_running());
        let frame = panel.ascii();
        assert_eq!(frame.lines().len(), 10);
        assert!(frame.lines().iter().all(|line| line.chars().count() == 32));
    }

    #[test]
    fn shader_refreshes_while_active_and_freezes_after() {
        let mut panel = Panel::with_rng(settings(10), StdRng::seed_from_u64(9));
        panel.activate_effect(Effect::Shader).unwrap();
        let first = panel.ascii().clone();

        assert!(wait_and_tick(&mut panel, 60));
        assert_ne!(panel.ascii(), &first);

        panel.activate_effect(Effect::Shader).unwrap();
        assert!(!panel.shader_running());
        let frozen = panel.ascii().clone();

        assert_eq!(panel.live_clocks(), 0);
        assert!(!wait_and_tick(&mut panel, 60));
        assert_eq!(panel.ascii(), &frozen);
    }

    #[test]
    fn rapid_toggling_keeps_one_clock() {
        let mut panel = Panel::with_rng(settings(10), StdRng::seed_from_u64(5));
        for _ in 0..51 {
            panel.activate_effect(Effect::Shader).unwrap();
            assert!(panel.live_clocks() <= 1);
        }
        assert!(panel.is_active(Effect::Shader));
        assert!(panel.shader_running());
        assert_eq!(panel.live_clocks(), 1);

        panel.activate_effect(Effect::Shader).unwrap();
        assert!(!panel.shader_running());
        assert_eq!(panel.live_clocks(), 0);
        assert!(!wait_and_tick(&mut panel, 40));
        assert_eq!(panel.live_clocks(), 0);
    }

    #[test]
    fn shutdown_stops_ticks() {
        let mut panel = Panel::with_rng(settings(10), StdRng::seed_from_u64(6));
        panel.activate_effect(Effect::Shader).unwrap();
        assert_eq!(panel.live_clocks(), 1);

        panel.shutdown();
        assert!(!panel.shader_running());
        assert_eq!(panel.live_clocks(), 0);
        assert!(!wait_and_tick(&mut panel, 40));
    }

    #[test]
    fn dropping_the_panel_ends_the_clock() {
        let mut panel = Panel::with_rng(settings(10), StdRng::seed_from_u64(8));
        panel.activate_effect(Effect::Shader).unwrap();
        let tally = Arc::clone(&panel.live_clocks);
        assert_eq!(tally.load(Ordering::SeqCst), 1);

        drop(panel);
        assert_eq!(tally.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unknown_label_changes_nothing() {
        let mut panel = panel();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        panel.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        panel.activate("Quantum Toaster").unwrap();

        assert!(seen.borrow().is_empty());
        for effect in Effect::ALL {
            assert!(!panel.is_active(effect));
        }
        assert_eq!(panel.theme(), Config::default().initial_theme());
    }

    #[test]
    fn subscribers_hear_every_change() {
        let mut panel = panel();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        panel.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        panel.activate_effect(Effect::Glitch).unwrap();
        panel.activate_effect(Effect::Palette).unwrap();
        panel.activate_effect(Effect::Glitch).unwrap();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 3);
        assert_eq!(
            seen[0],
            PanelEvent::Toggled {
                effect: Effect::Glitch,
                active: true
            }
        );
        assert_eq!(seen[1], PanelEvent::ThemeApplied(panel.theme()));
        assert_eq!(
            seen[2],
            PanelEvent::Toggled {
                effect: Effect::Glitch,
                active: false
            }
        );
    }

    #[test]
    fn effects_do_not_touch_each_other() {
        let mut panel = panel();
        panel.activate_effect(Effect::Sprite).unwrap();
        let sprite = panel.sprite().clone();

        panel.activate_effect(Effect::Glitch).unwrap();
        panel.activate_effect(Effect::Palette).unwrap();
        panel.activate_effect(Effect::Shader).unwrap();

        assert_eq!(panel.sprite(), &sprite);
        assert!(panel.is_active(Effect::Sprite));
        assert!(panel.is_active(Effect::Glitch));
    }
}
