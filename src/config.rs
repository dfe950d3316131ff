//! Settings file persistence  (~/.config/nerd-clock/clock_config.toml)
//!
//! The file is plain TOML with two tables. Loading never fails: every field is
//! validated on its own and anything missing or malformed keeps the value the
//! caller passed in. Saving rewrites the whole file through a temp file and a
//! rename, with exactly one copy of the help block at the bottom.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};
use serde::Deserialize;
use toml::Value;
use tracing::warn;

use crate::settings::{
    BitOrder, ColorMode, CountDirection, LedShape, Settings, clamp_brightness,
};

pub const CONFIG_FILE: &str = "clock_config.toml";
pub const LOG_FILE: &str = "nerd-clock.log";

pub const HELP_MARKER: &str = "# How to edit this configuration file";

const HELP_TEXT: &str = r#"# ================================================
# How to edit this configuration file
# ================================================
#
# You can safely edit this file while the clock is running.
# Changes are detected and applied automatically within a frame or two
# (the top settings line briefly appears to confirm the reload).
# Text values are quoted and case-insensitive.
#
# color_mode: the colour theme for the LEDs
#   Standard: white, green, red, blue, yellow, orange, purple, magenta, cyan
#   Festive:  rainbow, random, christmas, newyears, easter, fourth,
#             thanksgiving, halloween, automatic
#   "automatic" switches festive themes with the calendar
#
# brightness: number between 0.2 and 1.0
#   Overall LED brightness (screen and physical LEDs)
#
# count_direction: "up" or "down"
#   down = seconds remaining until New Year
#   up   = seconds elapsed since New Year
#
# bit_order: "normal", "reverse" or "transpose"
#   How the 25-bit number is mapped onto the 5x5 grid
#   - normal:    row-major, MSB top-left
#   - reverse:   rows reversed (MSB bottom-left)
#   - transpose: columns become rows
#
# show_status: true or false
#   Whether the bottom status line is displayed
#
# led_shape: "circle", "square", "triangle", "star" or "x"
#   Shape of the LEDs on screen (physical LEDs are always round)
#
# Edit the values above, save the file, and watch the clock update.
"#;

/// Per-user config directory. Under sudo, the invoking user's home is used.
pub fn config_dir() -> PathBuf {
    let home = std::env::var("SUDO_USER")
        .ok()
        .map(|u| format!("/home/{u}"))
        .or_else(|| std::env::var("HOME").ok())
        .unwrap_or_else(|| "/tmp".into());
    PathBuf::from(home).join(".config").join("nerd-clock")
}

pub fn default_config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE)
}

pub fn default_log_path() -> PathBuf {
    config_dir().join(LOG_FILE)
}

// ─── Raw file shape ─────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawFile {
    general_settings: RawGeneral,
    attached_display_settings: RawDisplay,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawGeneral {
    color_mode: Option<Value>,
    brightness: Option<Value>,
    count_direction: Option<Value>,
    bit_order: Option<Value>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawDisplay {
    show_status: Option<Value>,
    led_shape: Option<Value>,
}

fn text<T>(value: Option<&Value>, parse: fn(&str) -> Option<T>) -> Option<T> {
    value.and_then(Value::as_str).and_then(parse)
}

fn number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Float(f) if f.is_finite() => Some(*f),
        Value::Integer(i) => Some(*i as f64),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// TOML booleans, plus the spellings a hand-edited ini file would use.
fn flag(value: Option<&Value>) -> Option<bool> {
    match value? {
        Value::Boolean(b) => Some(*b),
        Value::Integer(1) => Some(true),
        Value::Integer(0) => Some(false),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

impl RawFile {
    fn apply(&self, base: &Settings) -> Settings {
        let g = &self.general_settings;
        let d = &self.attached_display_settings;
        Settings {
            color_mode: text(g.color_mode.as_ref(), ColorMode::parse).unwrap_or(base.color_mode),
            brightness: number(g.brightness.as_ref())
                .map(clamp_brightness)
                .unwrap_or(base.brightness),
            count_direction: text(g.count_direction.as_ref(), CountDirection::parse)
                .unwrap_or(base.count_direction),
            bit_order: text(g.bit_order.as_ref(), BitOrder::parse).unwrap_or(base.bit_order),
            show_status: flag(d.show_status.as_ref()).unwrap_or(base.show_status),
            led_shape: text(d.led_shape.as_ref(), LedShape::parse).unwrap_or(base.led_shape),
        }
    }
}

/// Settings body in a fixed key order.
pub fn render(settings: &Settings) -> String {
    format!(
        "[general_settings]\n\
         color_mode = \"{}\"\n\
         brightness = {:.2}\n\
         count_direction = \"{}\"\n\
         bit_order = \"{}\"\n\
         \n\
         [attached_display_settings]\n\
         show_status = {}\n\
         led_shape = \"{}\"\n",
        settings.color_mode.name(),
        clamp_brightness(settings.brightness),
        settings.count_direction.name(),
        settings.bit_order.name(),
        settings.show_status,
        settings.led_shape.name(),
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Store
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    pub settings: Settings,
    pub help_present: bool,
}

#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Modification time of the backing file, if it exists and is readable.
    pub fn modified(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).and_then(|m| m.modified()).ok()
    }

    /// Read the file over `base`. Missing, unreadable or broken input keeps
    /// `base` for the affected fields.
    pub fn load(&self, base: &Settings) -> Loaded {
        let Ok(content) = fs::read_to_string(&self.path) else {
            return Loaded {
                settings: *base,
                help_present: false,
            };
        };
        let settings = match toml::from_str::<RawFile>(&content) {
            Ok(raw) => raw.apply(base),
            Err(e) => {
                warn!(path = %self.path.display(), "config not parseable, keeping current settings: {e}");
                *base
            }
        };
        Loaded {
            settings,
            help_present: content.contains(HELP_MARKER),
        }
    }

    /// Rewrite the whole file: the settings tables, then the stock help
    /// block. Anything else a hand edit left in the file is dropped.
    pub fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating config directory {}", dir.display()))?;
        }

        let mut out = render(settings);
        out.push('\n');
        out.push_str(HELP_TEXT);

        let tmp = self.path.with_extension("toml.tmp");
        fs::write(&tmp, out).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{FestiveMode, StandardColor};

    fn store(dir: &tempfile::TempDir) -> ConfigStore {
        ConfigStore::new(dir.path().join(CONFIG_FILE))
    }

    fn sample() -> Settings {
        Settings {
            color_mode: ColorMode::Festive(FestiveMode::Thanksgiving),
            brightness: 0.7,
            count_direction: CountDirection::Up,
            bit_order: BitOrder::Transpose,
            show_status: false,
            led_shape: LedShape::Star,
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        store.save(&sample()).unwrap();

        let loaded = store.load(&Settings::default());
        assert_eq!(loaded.settings, sample());
        assert!(loaded.help_present);
    }

    #[test]
    fn round_trip_after_brightness_steps() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let mut s = Settings::default();
        for _ in 0..3 {
            s.brightness = clamp_brightness(s.brightness - 0.1);
        }
        store.save(&s).unwrap();
        assert_eq!(store.load(&Settings::default()).settings, s);
    }

    #[test]
    fn brightness_is_written_with_two_decimals() {
        let mut s = Settings::default();
        s.brightness = 0.5;
        assert!(render(&s).contains("brightness = 0.50\n"));
    }

    #[test]
    fn missing_file_keeps_base() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = store(&dir).load(&sample());
        assert_eq!(loaded.settings, sample());
        assert!(!loaded.help_present);
    }

    #[test]
    fn broken_file_keeps_base() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        fs::write(store.path(), "[general_settings\ncolor_mode = red").unwrap();
        assert_eq!(store.load(&sample()).settings, sample());
    }

    #[test]
    fn fields_fall_back_independently() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        fs::write(
            store.path(),
            "[general_settings]\n\
             color_mode = \"Purple\"\n\
             brightness = 7\n\
             count_direction = \"sideways\"\n\
             bit_order = 3\n\
             [attached_display_settings]\n\
             show_status = \"off\"\n\
             led_shape = \"hexagon\"\n",
        )
        .unwrap();

        let base = Settings {
            show_status: true,
            ..sample()
        };
        let s = store.load(&base).settings;
        assert_eq!(s.color_mode, ColorMode::Standard(StandardColor::Purple));
        assert_eq!(s.brightness, 1.0);
        assert_eq!(s.count_direction, CountDirection::Up);
        assert_eq!(s.bit_order, BitOrder::Transpose);
        assert!(!s.show_status);
        assert_eq!(s.led_shape, LedShape::Star);
    }

    #[test]
    fn unknown_color_mode_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        fs::write(store.path(), "[general_settings]\ncolor_mode = \"plaid\"\n").unwrap();
        let s = store.load(&Settings::default()).settings;
        assert_eq!(s.color_mode, ColorMode::Standard(StandardColor::White));
    }

    #[test]
    fn low_brightness_is_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        fs::write(store.path(), "[general_settings]\nbrightness = 0.05\n").unwrap();
        assert_eq!(store.load(&Settings::default()).settings.brightness, 0.2);
    }

    #[test]
    fn help_block_is_never_duplicated() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        store.save(&Settings::default()).unwrap();
        store.save(&sample()).unwrap();
        store.save(&Settings::default()).unwrap();

        let content = fs::read_to_string(store.path()).unwrap();
        assert_eq!(content.matches(HELP_MARKER).count(), 1);
        assert!(content.starts_with("[general_settings]"));
    }

    #[test]
    fn keys_left_below_the_help_block_do_not_survive_a_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        store.save(&Settings::default()).unwrap();
        let mut content = fs::read_to_string(store.path()).unwrap();
        content.push_str("show_status = false\n");
        fs::write(store.path(), content).unwrap();

        store.save(&sample()).unwrap();
        let content = fs::read_to_string(store.path()).unwrap();
        assert_eq!(content.matches("show_status").count(), 2); // key + help text
        assert_eq!(content.matches(HELP_MARKER).count(), 1);
        assert!(toml::from_str::<RawFile>(&content).is_ok());
        assert_eq!(store.load(&Settings::default()).settings, sample());

        // Later hand edits still load.
        fs::write(store.path(), content.replace("\"thanksgiving\"", "\"red\"")).unwrap();
        let loaded = store.load(&Settings::default()).settings;
        assert_eq!(loaded.color_mode, ColorMode::Standard(StandardColor::Red));
        assert_eq!(loaded.led_shape, LedShape::Star);
    }

    #[test]
    fn save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        store.save(&sample()).unwrap();
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from(CONFIG_FILE)]);
    }

    #[test]
    fn save_into_missing_directory_creates_it() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("nested").join(CONFIG_FILE));
        store.save(&sample()).unwrap();
        assert!(store.exists());
    }

    #[test]
    fn save_to_unwritable_path_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be makes the rename fail.
        let path = dir.path().join(CONFIG_FILE);
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();
        assert!(ConfigStore::new(path).save(&sample()).is_err());
    }
}
