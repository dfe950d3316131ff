//! The persisted settings record and the fixed enumerations it is built from.

use crate::palette::Rgb;

pub const BRIGHTNESS_MIN: f64 = 0.2;
pub const BRIGHTNESS_MAX: f64 = 1.0;
pub const BRIGHTNESS_STEP: f64 = 0.1;

/// Clamp into the valid range and snap to two decimals, the precision the
/// settings file stores. Non-finite input yields full brightness.
pub fn clamp_brightness(value: f64) -> f64 {
    if !value.is_finite() {
        return BRIGHTNESS_MAX;
    }
    let snapped = (value * 100.0).round() / 100.0;
    snapped.clamp(BRIGHTNESS_MIN, BRIGHTNESS_MAX)
}

/// Step to the next entry of `all`, wrapping. Unknown values restart at 0.
fn next_in<T: Copy + PartialEq>(all: &[T], current: T) -> T {
    match all.iter().position(|v| *v == current) {
        Some(i) => all[(i + 1) % all.len()],
        None => all[0],
    }
}

fn parse_in<T: Copy>(all: &[T], name: fn(T) -> &'static str, raw: &str) -> Option<T> {
    let raw = raw.trim();
    all.iter().copied().find(|v| name(*v).eq_ignore_ascii_case(raw))
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Colour modes
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardColor {
    White,
    Green,
    Red,
    Blue,
    Yellow,
    Orange,
    Purple,
    Magenta,
    Cyan,
}

impl StandardColor {
    pub const ALL: [Self; 9] = [
        Self::White,
        Self::Green,
        Self::Red,
        Self::Blue,
        Self::Yellow,
        Self::Orange,
        Self::Purple,
        Self::Magenta,
        Self::Cyan,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Green => "green",
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Yellow => "yellow",
            Self::Orange => "orange",
            Self::Purple => "purple",
            Self::Magenta => "magenta",
            Self::Cyan => "cyan",
        }
    }

    pub fn rgb(self) -> Rgb {
        match self {
            Self::White => Rgb::new(255, 255, 255),
            Self::Green => Rgb::new(0, 255, 0),
            Self::Red => Rgb::new(255, 0, 0),
            Self::Blue => Rgb::new(0, 0, 255),
            Self::Yellow => Rgb::new(255, 255, 0),
            Self::Orange => Rgb::new(255, 165, 0),
            Self::Purple => Rgb::new(128, 0, 128),
            Self::Magenta => Rgb::new(255, 0, 255),
            Self::Cyan => Rgb::new(0, 255, 255),
        }
    }
}

/// Festive themes a user can select. `Automatic` picks one by date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FestiveMode {
    Rainbow,
    Random,
    Christmas,
    NewYears,
    Easter,
    Fourth,
    Thanksgiving,
    Halloween,
    Automatic,
}

impl FestiveMode {
    pub const ALL: [Self; 9] = [
        Self::Rainbow,
        Self::Random,
        Self::Christmas,
        Self::NewYears,
        Self::Easter,
        Self::Fourth,
        Self::Thanksgiving,
        Self::Halloween,
        Self::Automatic,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Rainbow => "rainbow",
            Self::Random => "random",
            Self::Christmas => "christmas",
            Self::NewYears => "newyears",
            Self::Easter => "easter",
            Self::Fourth => "fourth",
            Self::Thanksgiving => "thanksgiving",
            Self::Halloween => "halloween",
            Self::Automatic => "automatic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Standard(StandardColor),
    Festive(FestiveMode),
}

impl Default for ColorMode {
    fn default() -> Self {
        Self::Standard(StandardColor::White)
    }
}

impl ColorMode {
    pub fn name(self) -> &'static str {
        match self {
            Self::Standard(c) => c.name(),
            Self::Festive(f) => f.name(),
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        parse_in(&StandardColor::ALL, StandardColor::name, raw)
            .map(Self::Standard)
            .or_else(|| parse_in(&FestiveMode::ALL, FestiveMode::name, raw).map(Self::Festive))
    }

    /// Next solid colour; entering from a festive mode restarts at the first.
    pub fn next_standard(self) -> Self {
        match self {
            Self::Standard(c) => Self::Standard(next_in(&StandardColor::ALL, c)),
            Self::Festive(_) => Self::Standard(StandardColor::ALL[0]),
        }
    }

    /// Next festive theme; entering from a solid colour restarts at the first.
    pub fn next_festive(self) -> Self {
        match self {
            Self::Festive(f) => Self::Festive(next_in(&FestiveMode::ALL, f)),
            Self::Standard(_) => Self::Festive(FestiveMode::ALL[0]),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Behaviour enumerations
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountDirection {
    #[default]
    Down,
    Up,
}

impl CountDirection {
    pub const ALL: [Self; 2] = [Self::Down, Self::Up];

    pub fn name(self) -> &'static str {
        match self {
            Self::Down => "down",
            Self::Up => "up",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        parse_in(&Self::ALL, Self::name, raw)
    }

    pub fn next(self) -> Self {
        next_in(&Self::ALL, self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BitOrder {
    #[default]
    Normal,
    Reverse,
    Transpose,
}

impl BitOrder {
    pub const ALL: [Self; 3] = [Self::Normal, Self::Reverse, Self::Transpose];

    pub fn name(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Reverse => "reverse",
            Self::Transpose => "transpose",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        parse_in(&Self::ALL, Self::name, raw)
    }

    pub fn next(self) -> Self {
        next_in(&Self::ALL, self)
    }
}

/// On-screen LED outline. The physical strip is always round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LedShape {
    #[default]
    Circle,
    Square,
    Triangle,
    Star,
    X,
}

impl LedShape {
    pub const ALL: [Self; 5] = [
        Self::Circle,
        Self::Square,
        Self::Triangle,
        Self::Star,
        Self::X,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Circle => "circle",
            Self::Square => "square",
            Self::Triangle => "triangle",
            Self::Star => "star",
            Self::X => "x",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Circle => "Circle",
            Self::Square => "Square",
            Self::Triangle => "Triangle",
            Self::Star => "Star",
            Self::X => "X",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        parse_in(&Self::ALL, Self::name, raw)
    }

    pub fn next(self) -> Self {
        next_in(&Self::ALL, self)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Settings record
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    pub color_mode: ColorMode,
    pub brightness: f64,
    pub count_direction: CountDirection,
    pub bit_order: BitOrder,
    pub show_status: bool,
    pub led_shape: LedShape,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color_mode: ColorMode::default(),
            brightness: BRIGHTNESS_MAX,
            count_direction: CountDirection::default(),
            bit_order: BitOrder::default(),
            show_status: true,
            led_shape: LedShape::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn standard_cycle_returns_home_after_nine_steps() {
        for start in StandardColor::ALL {
            let mut mode = ColorMode::Standard(start);
            for _ in 0..StandardColor::ALL.len() {
                mode = mode.next_standard();
            }
            assert_eq!(mode, ColorMode::Standard(start));
        }
    }

    #[test]
    fn festive_cycle_includes_automatic_and_wraps() {
        let mut mode = ColorMode::Festive(FestiveMode::Halloween);
        mode = mode.next_festive();
        assert_eq!(mode, ColorMode::Festive(FestiveMode::Automatic));
        mode = mode.next_festive();
        assert_eq!(mode, ColorMode::Festive(FestiveMode::Rainbow));

        for start in FestiveMode::ALL {
            let mut mode = ColorMode::Festive(start);
            for _ in 0..FestiveMode::ALL.len() {
                mode = mode.next_festive();
            }
            assert_eq!(mode, ColorMode::Festive(start));
        }
    }

    #[test]
    fn switching_family_restarts_the_cycle() {
        let festive = ColorMode::Festive(FestiveMode::Easter);
        assert_eq!(festive.next_standard(), ColorMode::Standard(StandardColor::White));

        let solid = ColorMode::Standard(StandardColor::Cyan);
        assert_eq!(solid.next_festive(), ColorMode::Festive(FestiveMode::Rainbow));
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(
            ColorMode::parse("  Magenta "),
            Some(ColorMode::Standard(StandardColor::Magenta))
        );
        assert_eq!(
            ColorMode::parse("NEWYEARS"),
            Some(ColorMode::Festive(FestiveMode::NewYears))
        );
        assert_eq!(ColorMode::parse("valentine"), None);
        assert_eq!(LedShape::parse("X"), Some(LedShape::X));
        assert_eq!(BitOrder::parse("Transpose"), Some(BitOrder::Transpose));
        assert_eq!(CountDirection::parse("sideways"), None);
    }

    #[test]
    fn small_enums_wrap() {
        assert_eq!(CountDirection::Up.next(), CountDirection::Down);
        assert_eq!(BitOrder::Transpose.next(), BitOrder::Normal);
        assert_eq!(LedShape::X.next(), LedShape::Circle);
    }

    #[test]
    fn clamp_handles_non_finite() {
        assert_eq!(clamp_brightness(f64::NAN), BRIGHTNESS_MAX);
        assert_eq!(clamp_brightness(f64::INFINITY), BRIGHTNESS_MAX);
        assert_eq!(clamp_brightness(-3.0), BRIGHTNESS_MIN);
    }

    proptest! {
        #[test]
        fn clamp_is_total_and_idempotent(v in -10.0f64..10.0) {
            let once = clamp_brightness(v);
            prop_assert!((BRIGHTNESS_MIN..=BRIGHTNESS_MAX).contains(&once));
            prop_assert_eq!(clamp_brightness(once), once);
        }

        #[test]
        fn repeated_steps_stay_in_range(ups in proptest::collection::vec(any::<bool>(), 0..40)) {
            let mut b = BRIGHTNESS_MAX;
            for up in ups {
                let delta = if up { BRIGHTNESS_STEP } else { -BRIGHTNESS_STEP };
                b = clamp_brightness(b + delta);
                prop_assert!((BRIGHTNESS_MIN..=BRIGHTNESS_MAX).contains(&b));
            }
        }
    }
}
