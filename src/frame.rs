//! The second-count and its 5×5 binary encoding.

use chrono::{Datelike, NaiveDate, NaiveDateTime};

use crate::palette::{self, Rgb, Theme};
use crate::settings::{BitOrder, CountDirection};

pub const GRID: usize = 5;
pub const BITS: u32 = (GRID * GRID) as u32;
const MASK: u32 = (1 << BITS) - 1;

pub type Matrix = [[bool; GRID]; GRID];
pub type Cells = [[Option<Rgb>; GRID]; GRID];

fn new_year(year: i32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(year, 1, 1)?.and_hms_opt(0, 0, 0)
}

/// Whole seconds until next New Year (`Down`) or since the last one (`Up`),
/// measured in local wall-clock time.
pub fn seconds_value(now: NaiveDateTime, direction: CountDirection) -> u32 {
    let secs = match direction {
        CountDirection::Down => new_year(now.year() + 1).map(|ny| (ny - now).num_seconds()),
        CountDirection::Up => new_year(now.year()).map(|ny| (now - ny).num_seconds()),
    };
    secs.unwrap_or(0).clamp(0, i64::from(u32::MAX)) as u32
}

/// Lay the low 25 bits of `value` out MSB-first, row-major, then apply the
/// bit order.
pub fn encode(value: u32, order: BitOrder) -> Matrix {
    let value = value & MASK;
    let mut m = [[false; GRID]; GRID];
    for (i, cell) in m.iter_mut().flatten().enumerate() {
        *cell = (value >> (BITS - 1 - i as u32)) & 1 == 1;
    }
    match order {
        BitOrder::Normal => m,
        BitOrder::Reverse => {
            m.reverse();
            m
        }
        BitOrder::Transpose => {
            let mut t = [[false; GRID]; GRID];
            for (r, row) in m.iter().enumerate() {
                for (c, bit) in row.iter().enumerate() {
                    t[c][r] = *bit;
                }
            }
            t
        }
    }
}

/// One encoded second: the raw count and the lit/unlit matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub value: u32,
    pub matrix: Matrix,
}

impl Frame {
    pub fn new(value: u32, order: BitOrder) -> Self {
        Self {
            value,
            matrix: encode(value, order),
        }
    }

    /// Colour at `brightness` for every lit cell; `None` for unlit ones.
    pub fn cells(&self, theme: Theme, t: f64, second: i64, brightness: f64) -> Cells {
        let mut cells = [[None; GRID]; GRID];
        for (row, bits) in self.matrix.iter().enumerate() {
            for (col, lit) in bits.iter().enumerate() {
                if *lit {
                    cells[row][col] = Some(palette::lit_color(theme, row, col, t, second, brightness));
                }
            }
        }
        cells
    }

    pub fn binary(&self) -> String {
        format!("{:025b}", self.value & MASK)
    }
}
