//! Per-cell colour resolution for every theme.
//!
//! Everything here is a pure function of the theme, the cell position, the
//! wall-clock time `t` (seconds, fractional) and the integer `second`. The
//! "random-looking" themes hash `(second, row, col)` so repeated reads inside
//! one second are identical.

use crate::frame::{GRID, Matrix};
use crate::settings::StandardColor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Multiply each channel, truncating like an integer cast.
    pub fn scale(self, factor: f64) -> Self {
        let f = |c: u8| (f64::from(c) * factor).clamp(0.0, 255.0) as u8;
        Self::new(f(self.r), f(self.g), f(self.b))
    }
}

const VALENTINE: Rgb = Rgb::new(255, 0, 51);
const ST_PATRICK: Rgb = Rgb::new(0, 255, 51);
const GOLD: Rgb = Rgb::new(255, 215, 0);
const WHITE: Rgb = Rgb::new(255, 255, 255);
const FALLBACK_TEXT: Rgb = Rgb::new(200, 200, 200);
const TEXT_DIM: f64 = 0.7;

const RANDOM_PALETTE: &[Rgb] = &[
    Rgb::new(255, 0, 0),
    Rgb::new(0, 255, 0),
    Rgb::new(0, 0, 255),
    Rgb::new(255, 255, 0),
    Rgb::new(255, 0, 255),
    Rgb::new(0, 255, 255),
    Rgb::new(255, 165, 0),
];
const CHRISTMAS_PALETTE: &[Rgb] = &[Rgb::new(255, 0, 0), Rgb::new(0, 255, 0)];
const NEWYEARS_PALETTE: &[Rgb] = &[GOLD, WHITE, Rgb::new(192, 192, 192)];
const EASTER_PALETTE: &[Rgb] = &[
    Rgb::new(255, 182, 193),
    Rgb::new(255, 255, 0),
    Rgb::new(144, 238, 144),
    Rgb::new(173, 216, 230),
    Rgb::new(221, 160, 221),
];
const THANKSGIVING_PALETTE: &[Rgb] = &[
    Rgb::new(255, 140, 0),
    Rgb::new(165, 42, 42),
    Rgb::new(255, 215, 0),
];
const HALLOWEEN_PALETTE: &[Rgb] = &[Rgb::new(255, 165, 0), Rgb::new(128, 0, 128)];

/// A concrete colour scheme: what a colour mode looks like once `automatic`
/// has been resolved against the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Solid(StandardColor),
    Rainbow,
    Random,
    Christmas,
    NewYears,
    Easter,
    Fourth,
    Thanksgiving,
    Halloween,
    Valentine,
    StPatrick,
}

impl Theme {
    pub fn name(self) -> &'static str {
        match self {
            Self::Solid(c) => c.name(),
            Self::Rainbow => "rainbow",
            Self::Random => "random",
            Self::Christmas => "christmas",
            Self::NewYears => "newyears",
            Self::Easter => "easter",
            Self::Fourth => "fourth",
            Self::Thanksgiving => "thanksgiving",
            Self::Halloween => "halloween",
            Self::Valentine => "valentine",
            Self::StPatrick => "stpatrick",
        }
    }

    /// Themes whose colours move continuously with wall-clock time.
    pub fn is_animated(self) -> bool {
        matches!(self, Self::Rainbow | Self::Easter | Self::Fourth)
    }

    fn palette(self) -> Option<&'static [Rgb]> {
        match self {
            Self::Random => Some(RANDOM_PALETTE),
            Self::Christmas => Some(CHRISTMAS_PALETTE),
            Self::NewYears => Some(NEWYEARS_PALETTE),
            Self::Easter => Some(EASTER_PALETTE),
            Self::Thanksgiving => Some(THANKSGIVING_PALETTE),
            Self::Halloween => Some(HALLOWEEN_PALETTE),
            _ => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Deterministic per-cell randomness
// ═══════════════════════════════════════════════════════════════════════════════

/// SplitMix64 finaliser over a key that is unique per (second, cell).
pub fn cell_hash(second: i64, row: usize, col: usize) -> u64 {
    let cell = (row * GRID + col) as u64;
    let mut z = (second as u64)
        .wrapping_mul(32)
        .wrapping_add(cell)
        .wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Map a hash onto `[0, 1)`.
fn unit(hash: u64) -> f64 {
    (hash >> 11) as f64 / (1u64 << 53) as f64
}

pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> Rgb {
    let h = h.rem_euclid(1.0) * 6.0;
    let i = h.floor();
    let f = h - i;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    let (r, g, b) = match i as u8 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    let c = |x: f64| (255.0 * x) as u8;
    Rgb::new(c(r), c(g), c(b))
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Colour resolution
// ═══════════════════════════════════════════════════════════════════════════════

/// Full-intensity colour of a lit cell, as sent to the strip.
pub fn cell_color(theme: Theme, row: usize, col: usize, t: f64, second: i64) -> Rgb {
    lit_color(theme, row, col, t, second, 1.0)
}

/// Colour of a lit cell at `brightness`. Hue-based themes take brightness as
/// the HSV value, so each channel is truncated once.
pub fn lit_color(theme: Theme, row: usize, col: usize, t: f64, second: i64, brightness: f64) -> Rgb {
    let checker = (row + col) % 2 == 0;
    let fixed = match theme {
        Theme::Rainbow => return hsv_to_rgb((t / 60.0).rem_euclid(1.0), 1.0, brightness),
        Theme::Random => return hsv_to_rgb(unit(cell_hash(second, row, col)), 1.0, brightness),
        Theme::Easter => {
            let offset = (row * GRID + col) as f64 / (GRID * GRID) as f64;
            return hsv_to_rgb(t / 20.0 + offset, 0.6, brightness);
        }
        Theme::Solid(c) => c.rgb(),
        Theme::Valentine => VALENTINE,
        Theme::StPatrick => ST_PATRICK,
        Theme::Christmas => CHRISTMAS_PALETTE[usize::from(!checker)],
        Theme::Halloween => HALLOWEEN_PALETTE[usize::from(!checker)],
        Theme::NewYears => {
            if unit(cell_hash(second, row, col)) < 0.15 {
                WHITE
            } else {
                GOLD
            }
        }
        Theme::Fourth => match (t / 2.0).floor().rem_euclid(3.0) as u8 {
            0 => Rgb::new(255, 0, 0),
            1 => WHITE,
            _ => Rgb::new(0, 0, 255),
        },
        Theme::Thanksgiving => {
            let pick = cell_hash(second, row, col) % THANKSGIVING_PALETTE.len() as u64;
            THANKSGIVING_PALETTE[pick as usize]
        }
    };
    fixed.scale(brightness)
}

/// Colour of the bottom status line, derived from the theme.
pub fn status_color(
    theme: Theme,
    matrix: &Matrix,
    t: f64,
    second: i64,
    brightness: f64,
) -> Rgb {
    match theme {
        Theme::Solid(c) => c.rgb().scale(brightness).scale(TEXT_DIM),
        Theme::Rainbow | Theme::Fourth => (0..GRID)
            .flat_map(|row| (0..GRID).map(move |col| (row, col)))
            .find(|&(row, col)| matrix[row][col])
            .map(|(row, col)| {
                lit_color(theme, row, col, t, second, brightness).scale(TEXT_DIM)
            })
            .unwrap_or(FALLBACK_TEXT),
        Theme::Valentine => VALENTINE.scale(TEXT_DIM),
        Theme::StPatrick => ST_PATRICK.scale(TEXT_DIM),
        other => match other.palette() {
            Some(palette) => {
                let idx = (t / 5.0).floor().rem_euclid(palette.len() as f64) as usize;
                palette[idx].scale(TEXT_DIM)
            }
            None => FALLBACK_TEXT,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_cells_are_stable_within_a_second() {
        for row in 0..GRID {
            for col in 0..GRID {
                let a = cell_color(Theme::Random, row, col, 100.1, 42);
                let b = cell_color(Theme::Random, row, col, 100.9, 42);
                assert_eq!(a, b);
            }
        }
    }

    #[test]
    fn neighbouring_seconds_do_not_share_seeds() {
        // Shifting one cell right must not reproduce the previous second.
        assert_ne!(cell_hash(10, 0, 1), cell_hash(11, 0, 0));
        assert_ne!(cell_hash(10, 1, 0), cell_hash(15, 0, 0));
    }

    #[test]
    fn thanksgiving_and_newyears_stay_in_their_palettes() {
        for second in 0..50 {
            let c = cell_color(Theme::Thanksgiving, 2, 3, 0.0, second);
            assert!(THANKSGIVING_PALETTE.contains(&c));
            let n = cell_color(Theme::NewYears, 4, 1, 0.0, second);
            assert!(n == GOLD || n == WHITE);
        }
    }

    #[test]
    fn checkerboards_alternate() {
        assert_eq!(cell_color(Theme::Christmas, 0, 0, 0.0, 0), Rgb::new(255, 0, 0));
        assert_eq!(cell_color(Theme::Christmas, 0, 1, 0.0, 0), Rgb::new(0, 255, 0));
        assert_eq!(cell_color(Theme::Halloween, 1, 1, 0.0, 0), Rgb::new(255, 165, 0));
        assert_eq!(cell_color(Theme::Halloween, 1, 2, 0.0, 0), Rgb::new(128, 0, 128));
    }

    #[test]
    fn fourth_cycles_every_two_seconds() {
        assert_eq!(cell_color(Theme::Fourth, 0, 0, 0.5, 0), Rgb::new(255, 0, 0));
        assert_eq!(cell_color(Theme::Fourth, 0, 0, 2.5, 2), WHITE);
        assert_eq!(cell_color(Theme::Fourth, 0, 0, 4.5, 4), Rgb::new(0, 0, 255));
        assert_eq!(cell_color(Theme::Fourth, 0, 0, 6.5, 6), Rgb::new(255, 0, 0));
    }

    #[test]
    fn hue_themes_truncate_once_when_dimmed() {
        // 255 * 0.5 * 0.8 = 102, where truncating 127.5 first would give 101.
        assert_eq!(lit_color(Theme::Rainbow, 0, 0, 15.0, 15, 0.8), Rgb::new(102, 204, 0));
        assert_eq!(cell_color(Theme::Rainbow, 0, 0, 15.0, 15), Rgb::new(127, 255, 0));
    }

    #[test]
    fn fixed_colours_scale_like_an_integer_cast() {
        assert_eq!(lit_color(Theme::Halloween, 0, 0, 0.0, 0, 0.5), Rgb::new(127, 82, 0));
    }

    #[test]
    fn hsv_primaries() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), Rgb::new(255, 0, 0));
        assert_eq!(hsv_to_rgb(1.0 / 3.0, 1.0, 1.0), Rgb::new(0, 255, 0));
        assert_eq!(hsv_to_rgb(0.5, 0.0, 1.0), WHITE);
    }

    #[test]
    fn status_color_for_solid_is_dimmed_scaled_colour() {
        let matrix = [[false; GRID]; GRID];
        let c = status_color(Theme::Solid(StandardColor::White), &matrix, 0.0, 0, 0.5);
        assert_eq!(c, Rgb::new(88, 88, 88));
    }

    #[test]
    fn status_color_for_rainbow_without_lit_cells_falls_back() {
        let matrix = [[false; GRID]; GRID];
        assert_eq!(status_color(Theme::Rainbow, &matrix, 0.0, 0, 1.0), FALLBACK_TEXT);
    }

    #[test]
    fn status_color_cycles_palette_every_five_seconds() {
        let matrix = [[false; GRID]; GRID];
        let first = status_color(Theme::Halloween, &matrix, 1.0, 1, 1.0);
        let second = status_color(Theme::Halloween, &matrix, 6.0, 6, 1.0);
        assert_eq!(first, Rgb::new(255, 165, 0).scale(TEXT_DIM));
        assert_eq!(second, Rgb::new(128, 0, 128).scale(TEXT_DIM));
    }

    #[test]
    fn animated_set() {
        assert!(Theme::Rainbow.is_animated());
        assert!(Theme::Easter.is_animated());
        assert!(Theme::Fourth.is_animated());
        assert!(!Theme::Random.is_animated());
        assert!(!Theme::Solid(StandardColor::Red).is_animated());
    }
}
