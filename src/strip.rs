//! Physical LED output.
//!
//! The strip is a 25-pixel WLED device driven over DDP. It is optional: with
//! no target, or after a failed first connect, every call is a no-op.

use std::net::UdpSocket;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use ddp_rs::connection::DDPConnection;
use ddp_rs::protocol::{ID, PixelConfig};
use tracing::{info, warn};

use crate::frame::{Cells, GRID};
use crate::palette::Rgb;

pub const LED_COUNT: usize = GRID * GRID;
pub const DDP_PORT: u16 = 4048;
/// Delay between start-up and the one connect attempt.
pub const INIT_DELAY: Duration = Duration::from_secs(3);

pub trait LedStrip {
    fn set_brightness(&mut self, brightness: f64);
    fn show(&mut self, pixels: &[Rgb; LED_COUNT]) -> Result<()>;
}

/// Row-major pixel order, unlit cells black.
pub fn strip_pixels(cells: &Cells) -> [Rgb; LED_COUNT] {
    let mut pixels = [Rgb::BLACK; LED_COUNT];
    for (px, cell) in pixels.iter_mut().zip(cells.iter().flatten()) {
        *px = cell.unwrap_or(Rgb::BLACK);
    }
    pixels
}

fn scale_by_brightness(channel: u8, brightness: f64) -> u8 {
    (f64::from(channel) * brightness).clamp(0.0, 255.0) as u8
}

/// Packed RGB payload for one DDP write.
pub fn encode_pixels(pixels: &[Rgb; LED_COUNT], brightness: f64) -> [u8; LED_COUNT * 3] {
    let mut buf = [0u8; LED_COUNT * 3];
    for (chunk, px) in buf.chunks_exact_mut(3).zip(pixels) {
        chunk[0] = scale_by_brightness(px.r, brightness);
        chunk[1] = scale_by_brightness(px.g, brightness);
        chunk[2] = scale_by_brightness(px.b, brightness);
    }
    buf
}

/// `host` or `host:port`; the DDP port is filled in when missing.
pub fn with_default_port(target: &str) -> String {
    let has_port = target
        .rsplit_once(':')
        .is_some_and(|(host, port)| !host.is_empty() && port.parse::<u16>().is_ok());
    if has_port {
        target.to_string()
    } else {
        format!("{target}:{DDP_PORT}")
    }
}

pub struct DdpStrip {
    conn: DDPConnection,
    brightness: f64,
}

impl DdpStrip {
    pub fn connect(target: &str, brightness: f64) -> Result<Self> {
        let dest = with_default_port(target);
        let socket = UdpSocket::bind("0.0.0.0:0").context("Failed to bind UDP socket")?;
        let conn = DDPConnection::try_new(&dest, PixelConfig::default(), ID::Default, socket)
            .with_context(|| format!("Failed to open DDP connection to {dest}"))?;
        info!(%dest, "LED strip connected");
        Ok(Self { conn, brightness })
    }
}

impl LedStrip for DdpStrip {
    fn set_brightness(&mut self, brightness: f64) {
        self.brightness = brightness;
    }

    fn show(&mut self, pixels: &[Rgb; LED_COUNT]) -> Result<()> {
        let buf = encode_pixels(pixels, self.brightness);
        self.conn
            .write(&buf)
            .context("Failed to push frame to LED strip")?;
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Optional port with deferred, one-shot initialisation
// ═══════════════════════════════════════════════════════════════════════════════

pub type Connector = Box<dyn FnOnce(f64) -> Result<Box<dyn LedStrip>>>;

enum State {
    Absent,
    Pending { at: Instant, connect: Connector },
    Ready { strip: Box<dyn LedStrip>, failing: bool },
    Disabled,
}

pub struct StripPort {
    state: State,
}

impl StripPort {
    pub fn absent() -> Self {
        Self {
            state: State::Absent,
        }
    }

    /// A DDP strip at `target`, connected [`INIT_DELAY`] after `now`.
    pub fn ddp(target: String, now: Instant) -> Self {
        Self::deferred(
            Box::new(move |brightness| {
                let strip = DdpStrip::connect(&target, brightness)?;
                Ok(Box::new(strip) as Box<dyn LedStrip>)
            }),
            now,
        )
    }

    pub fn deferred(connect: Connector, now: Instant) -> Self {
        Self {
            state: State::Pending {
                at: now + INIT_DELAY,
                connect,
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, State::Ready { .. })
    }

    /// Run the connector once its time has come. Returns `true` only on the
    /// tick the strip became ready.
    pub fn poll_init(&mut self, now: Instant, brightness: f64) -> bool {
        if !matches!(self.state, State::Pending { at, .. } if now >= at) {
            return false;
        }
        let State::Pending { connect, .. } = std::mem::replace(&mut self.state, State::Disabled)
        else {
            return false;
        };
        match connect(brightness) {
            Ok(strip) => {
                self.state = State::Ready {
                    strip,
                    failing: false,
                };
                true
            }
            Err(e) => {
                warn!("LED strip unavailable, continuing without it: {e:#}");
                false
            }
        }
    }

    pub fn set_brightness(&mut self, brightness: f64) {
        if let State::Ready { strip, .. } = &mut self.state {
            strip.set_brightness(brightness);
        }
    }

    /// Best effort. Only the first failure of a run of failures is logged.
    pub fn show(&mut self, pixels: &[Rgb; LED_COUNT]) {
        let State::Ready { strip, failing } = &mut self.state else {
            return;
        };
        match strip.show(pixels) {
            Ok(()) => {
                if std::mem::take(failing) {
                    info!("LED strip writes recovered");
                }
            }
            Err(e) => {
                if !*failing {
                    warn!("LED strip write failed: {e:#}");
                }
                *failing = true;
            }
        }
    }

    pub fn blank(&mut self) {
        self.show(&[Rgb::BLACK; LED_COUNT]);
    }
}
