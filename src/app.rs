//! The interactive loop: keys in, frames out.

use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{info, warn};

use crate::engine::{Command, Engine};
use crate::frame::{Cells, Frame as SecondFrame, seconds_value};
use crate::palette::{self, Rgb};
use crate::strip::{self, LED_COUNT, StripPort};
use crate::ui::{self, View};

/// What one redraw puts on the terminal and on the strip.
pub struct Scene {
    pub cells: Cells,
    pub banner: Option<String>,
    pub status: Option<(String, Rgb)>,
    pub strip: [Rgb; LED_COUNT],
}

pub struct App {
    engine: Engine,
    strip: StripPort,
    frame: SecondFrame,
    current_second: i64,
    show_help: bool,
    need_redraw: bool,
    stale: bool,
    quit: bool,
    frame_time: Duration,
}

impl App {
    pub fn new(engine: Engine, strip: StripPort, fps: u32, wall: DateTime<Local>) -> Self {
        let s = engine.settings();
        let frame = SecondFrame::new(seconds_value(wall.naive_local(), s.count_direction), s.bit_order);
        Self {
            engine,
            strip,
            frame,
            current_second: wall.timestamp(),
            show_help: false,
            need_redraw: true,
            stale: false,
            quit: false,
            frame_time: Duration::from_secs(1) / fps.max(1),
        }
    }

    // ─── Key Handling ───────────────────────────────────────────────────────

    fn on_key(&mut self, k: KeyEvent, now: Instant) {
        if k.modifiers.contains(KeyModifiers::CONTROL) && k.code == KeyCode::Char('c') {
            self.quit = true;
            return;
        }

        let key = match k.code {
            KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
            other => other,
        };

        if matches!(key, KeyCode::Esc | KeyCode::Char('q')) {
            if self.show_help {
                self.show_help = false;
                self.need_redraw = true;
            } else {
                self.quit = true;
            }
            return;
        }

        if matches!(key, KeyCode::Char('h') | KeyCode::F(1)) {
            self.show_help = !self.show_help;
            self.need_redraw = true;
            return;
        }
        if self.show_help {
            return;
        }

        let command = match key {
            KeyCode::Char('c') => Command::CycleStandardColor,
            KeyCode::Char('f') => Command::CycleFestiveTheme,
            KeyCode::Char('d') => Command::ToggleCountDirection,
            KeyCode::Char('s') => Command::ToggleStatus,
            KeyCode::Char('l') => Command::CycleLedShape,
            KeyCode::Char('o') => Command::CycleBitOrder,
            KeyCode::Char('+' | '=') => Command::BrightnessUp,
            KeyCode::Char('-') => Command::BrightnessDown,
            _ => return,
        };
        self.engine.apply(command, now);
        if matches!(command, Command::BrightnessUp | Command::BrightnessDown) {
            self.strip.set_brightness(self.engine.settings().brightness);
        }
        self.stale = true;
        self.need_redraw = true;
    }

    // ─── Per-tick Update ────────────────────────────────────────────────────

    /// Strip init, persistence, then the second counter. Returns whether this
    /// tick needs a redraw.
    fn update(&mut self, now: Instant, wall: DateTime<Local>) -> bool {
        if self.strip.poll_init(now, self.engine.settings().brightness) {
            self.need_redraw = true;
        }

        if self.engine.sync(now) {
            self.strip.set_brightness(self.engine.settings().brightness);
            self.stale = true;
            self.need_redraw = true;
        }

        let second = wall.timestamp();
        if second > self.current_second {
            self.current_second = second;
            self.stale = true;
            self.need_redraw = true;
        }

        if std::mem::take(&mut self.stale) {
            let s = self.engine.settings();
            let value = seconds_value(wall.naive_local(), s.count_direction);
            self.frame = SecondFrame::new(value, s.bit_order);
        }

        let animated = !self.show_help && self.engine.is_animated(wall.date_naive());
        std::mem::take(&mut self.need_redraw) || animated
    }

    fn scene(&self, now: Instant, wall: DateTime<Local>) -> Scene {
        let settings = *self.engine.settings();
        let today = wall.date_naive();
        let theme = self.engine.effective_theme(today);
        let t = wall.timestamp_micros() as f64 / 1_000_000.0;
        let second = wall.timestamp();

        let raw = self.frame.cells(theme, t, second, 1.0);
        let cells = self.frame.cells(theme, t, second, settings.brightness);

        let banner = self
            .engine
            .banner_visible(now)
            .then(|| ui::banner_text(&settings, &self.engine.mode_label(today)));
        let status = settings.show_status.then(|| {
            let text = ui::status_text(
                &self.frame,
                settings.count_direction,
                wall.with_timezone(&Utc),
                wall.fixed_offset(),
            );
            let rgb = palette::status_color(theme, &self.frame.matrix, t, second, settings.brightness);
            (text, rgb)
        });

        Scene {
            cells,
            banner,
            status,
            strip: if self.show_help {
                [Rgb::BLACK; LED_COUNT]
            } else {
                strip::strip_pixels(&raw)
            },
        }
    }

    fn render(
        &mut self,
        term: &mut ratatui::DefaultTerminal,
        now: Instant,
        wall: DateTime<Local>,
    ) -> Result<()> {
        let Scene {
            cells,
            banner,
            status,
            strip,
        } = self.scene(now, wall);
        let view = View {
            cells: &cells,
            shape: self.engine.settings().led_shape,
            banner,
            status,
            help: self.show_help,
        };
        term.draw(|f| ui::draw(f, &view))?;
        self.strip.show(&strip);
        Ok(())
    }

    // ─── Main Loop ──────────────────────────────────────────────────────────

    pub fn run(mut self, mut term: ratatui::DefaultTerminal) -> Result<()> {
        let result = self.event_loop(&mut term);
        self.finish();
        result
    }

    fn event_loop(&mut self, term: &mut ratatui::DefaultTerminal) -> Result<()> {
        loop {
            let started = Instant::now();

            while event::poll(Duration::ZERO)? {
                match event::read()? {
                    Event::Key(k) if k.kind == KeyEventKind::Press => self.on_key(k, Instant::now()),
                    Event::Resize(..) => self.need_redraw = true,
                    _ => {}
                }
            }
            if self.quit {
                return Ok(());
            }

            let now = Instant::now();
            let wall = Local::now();
            if self.update(now, wall) {
                self.render(term, now, wall)?;
            }

            let remaining = self.frame_time.saturating_sub(started.elapsed());
            if !remaining.is_zero() {
                // Wakes early on input; the event is read next iteration.
                event::poll(remaining)?;
            }
        }
    }

    /// Exit path, run whether the loop ended by quit or by error.
    fn finish(&mut self) {
        if self.strip.is_ready() {
            self.strip.blank();
        }
        if self.engine.is_dirty() {
            info!("saving pending settings before exit");
        }
        if let Err(e) = self.engine.shutdown() {
            warn!("final settings save failed: {e:#}");
        }
    }
}
