//! Mode/state engine: the one owner of the live settings.
//!
//! Every mutation goes through [`Engine::apply`] or the reload path in
//! [`Engine::sync`], which keep the dirty flag and the banner window in step
//! with the settings themselves.

use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::config::ConfigStore;
use crate::palette::Theme;
use crate::season;
use crate::settings::{BRIGHTNESS_STEP, ColorMode, FestiveMode, Settings, clamp_brightness};
use crate::sync::{ConfigSync, PollOutcome};

/// How long the settings banner stays up after a change.
pub const BANNER: Duration = Duration::from_secs(8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    CycleStandardColor,
    CycleFestiveTheme,
    ToggleCountDirection,
    ToggleStatus,
    CycleLedShape,
    CycleBitOrder,
    BrightnessUp,
    BrightnessDown,
}

pub struct Engine {
    settings: Settings,
    sync: ConfigSync,
    banner_until: Instant,
}

impl Engine {
    pub fn open(store: ConfigStore, now: Instant) -> Self {
        let (sync, settings) = ConfigSync::open(store);
        Self {
            settings,
            sync,
            banner_until: now + BANNER,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_dirty(&self) -> bool {
        self.sync.is_dirty()
    }

    pub fn banner_visible(&self, now: Instant) -> bool {
        now < self.banner_until
    }

    /// Apply one key command. Always marks the state dirty.
    pub fn apply(&mut self, command: Command, now: Instant) {
        let s = &mut self.settings;
        match command {
            Command::CycleStandardColor => s.color_mode = s.color_mode.next_standard(),
            Command::CycleFestiveTheme => s.color_mode = s.color_mode.next_festive(),
            Command::ToggleCountDirection => s.count_direction = s.count_direction.next(),
            Command::ToggleStatus => s.show_status = !s.show_status,
            Command::CycleLedShape => s.led_shape = s.led_shape.next(),
            Command::CycleBitOrder => s.bit_order = s.bit_order.next(),
            Command::BrightnessUp => s.brightness = clamp_brightness(s.brightness + BRIGHTNESS_STEP),
            Command::BrightnessDown => {
                s.brightness = clamp_brightness(s.brightness - BRIGHTNESS_STEP);
            }
        }
        debug!(?command, settings = ?self.settings, "command applied");
        self.sync.mark_dirty(now);
        self.banner_until = now + BANNER;
    }

    /// Debounced flush, then change detection, in that order so a pending
    /// local edit lands on disk before the mtime is compared. Returns whether
    /// the settings were replaced from disk.
    pub fn sync(&mut self, now: Instant) -> bool {
        if let Err(e) = self.sync.flush_if_due(&self.settings, now) {
            warn!("saving settings failed: {e:#}");
        }
        match self.sync.poll(&self.settings) {
            PollOutcome::Reloaded(settings) => {
                self.settings = settings;
                self.banner_until = now + BANNER;
                true
            }
            PollOutcome::Unchanged | PollOutcome::OwnWrite => false,
        }
    }

    /// Final save on the way out.
    pub fn shutdown(&mut self) -> Result<bool> {
        self.sync.flush(&self.settings)
    }

    /// The concrete theme for `today`; `automatic` is resolved by the calendar.
    /// All colour decisions go through here.
    pub fn effective_theme(&self, today: NaiveDate) -> Theme {
        effective_theme(self.settings.color_mode, today)
    }

    pub fn is_animated(&self, today: NaiveDate) -> bool {
        self.effective_theme(today).is_animated()
    }

    /// Colour label for the banner, e.g. `red` or `auto (christmas)`.
    pub fn mode_label(&self, today: NaiveDate) -> String {
        match self.settings.color_mode {
            ColorMode::Festive(FestiveMode::Automatic) => {
                format!("auto ({})", self.effective_theme(today).name())
            }
            mode => mode.name().to_string(),
        }
    }
}

pub fn effective_theme(mode: ColorMode, today: NaiveDate) -> Theme {
    match mode {
        ColorMode::Standard(c) => Theme::Solid(c),
        ColorMode::Festive(f) => match f {
            FestiveMode::Rainbow => Theme::Rainbow,
            FestiveMode::Random => Theme::Random,
            FestiveMode::Christmas => Theme::Christmas,
            FestiveMode::NewYears => Theme::NewYears,
            FestiveMode::Easter => Theme::Easter,
            FestiveMode::Fourth => Theme::Fourth,
            FestiveMode::Thanksgiving => Theme::Thanksgiving,
            FestiveMode::Halloween => Theme::Halloween,
            FestiveMode::Automatic => season::seasonal_theme(today),
        },
    }
}
