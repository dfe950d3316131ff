//! Terminal rendering: the LED grid, the settings banner, the status line
//! and the help screen.

use chrono::{DateTime, FixedOffset, Utc};
use ratatui::prelude::*;
use ratatui::symbols::Marker;
use ratatui::widgets::canvas::Canvas;
use ratatui::widgets::*;

use crate::frame::{Cells, Frame as SecondFrame, GRID};
use crate::palette::Rgb;
use crate::settings::{CountDirection, LedShape, Settings};
use crate::shape::Led;

struct Theme;

impl Theme {
    const BG: Color = Color::Black;
    const FG: Color = Color::Rgb(200, 200, 200);
    const FG_DIM: Color = Color::Rgb(100, 100, 100);
    const HELP: Color = Color::Rgb(180, 180, 180);
    const BANNER: Color = Color::Rgb(150, 150, 150);
    const UNLIT: Rgb = Rgb::new(20, 20, 20);
}

/// Grid cells per axis, including one cell of margin on each side.
const LAYOUT_CELLS: f64 = GRID as f64 + 2.0;
/// Gap between neighbouring LEDs, as a fraction of the cell.
const LED_GAP: f64 = 0.1;

pub const HELP_LINES: &[(&str, &str)] = &[
    ("C", "Cycle standard colors (white, green, red, ...)"),
    ("F", "Cycle festive themes (rainbow, christmas, newyears, ...)"),
    ("D", "Change count direction (up / down)"),
    ("S", "Toggle status line (on / off)"),
    ("L", "Cycle LED shape (circle / square / triangle / star / x)"),
    ("O", "Cycle bit order (normal / reverse / transpose)"),
    ("+", "Increase brightness"),
    ("-", "Decrease brightness"),
    ("H or F1", "Show / hide this help screen"),
    ("Esc / Q", "Quit the clock"),
];

/// Everything one redraw needs. Colours in `cells` are already scaled by
/// brightness.
pub struct View<'a> {
    pub cells: &'a Cells,
    pub shape: LedShape,
    pub banner: Option<String>,
    pub status: Option<(String, Rgb)>,
    pub help: bool,
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

pub fn banner_text(settings: &Settings, color_label: &str) -> String {
    format!(
        "Color: {} | Direction: {} | Status: {} | Shape: {} | Order: {} | Bright: {:.1}",
        color_label,
        settings.count_direction.name(),
        if settings.show_status { "On" } else { "Off" },
        settings.led_shape.label(),
        settings.bit_order.name(),
        settings.brightness,
    )
}

pub fn status_text(
    frame: &SecondFrame,
    direction: CountDirection,
    utc: DateTime<Utc>,
    local: DateTime<FixedOffset>,
) -> String {
    let label = match direction {
        CountDirection::Down => "Remaining",
        CountDirection::Up => "Elapsed",
    };
    format!(
        "{label}: {} (0b{}) | {} | {}",
        frame.value,
        frame.binary(),
        utc.format("%Y-%m-%d %H:%M:%S UTC"),
        local.format("%Y-%m-%d %I:%M:%S %p %:z"),
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Drawing
// ═══════════════════════════════════════════════════════════════════════════════

pub fn draw(f: &mut Frame, view: &View) {
    f.render_widget(Block::new().style(Style::new().bg(Theme::BG)), f.area());

    if view.help {
        draw_help(f, f.area());
        return;
    }

    let [banner, grid, status] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(f.area());

    if let Some(text) = &view.banner {
        let line = Line::styled(text.as_str(), Style::new().fg(Theme::BANNER)).centered();
        f.render_widget(Paragraph::new(line), banner);
    }

    draw_grid(f, grid, view);

    if let Some((text, rgb)) = &view.status {
        let line = Line::styled(text.as_str(), Style::new().fg(color(*rgb))).centered();
        f.render_widget(Paragraph::new(line), status);
    }
}

// ─── LED Grid ───────────────────────────────────────────────────────────────

fn draw_grid(f: &mut Frame, area: Rect, view: &View) {
    if area.is_empty() {
        return;
    }
    // Half-block pixels: one per column, two per row.
    let width = f64::from(area.width);
    let height = f64::from(area.height) * 2.0;
    let cell = (width / LAYOUT_CELLS).min(height / LAYOUT_CELLS);
    let left = (width - cell * GRID as f64) / 2.0;
    let top = (height - cell * GRID as f64) / 2.0;
    let radius = (cell / 2.0 - cell * LED_GAP).max(0.5);

    let canvas = Canvas::default()
        .background_color(Theme::BG)
        .marker(Marker::HalfBlock)
        .x_bounds([0.0, width - 1.0])
        .y_bounds([0.0, height - 1.0])
        .paint(|ctx| {
            for (row, cells) in view.cells.iter().enumerate() {
                for (col, lit) in cells.iter().enumerate() {
                    ctx.draw(&Led {
                        cx: left + (col as f64 + 0.5) * cell,
                        cy: top + (row as f64 + 0.5) * cell,
                        radius,
                        shape: view.shape,
                        color: color(lit.unwrap_or(Theme::UNLIT)),
                        height,
                    });
                }
            }
        });
    f.render_widget(canvas, area);
}

// ─── Help ───────────────────────────────────────────────────────────────────

fn draw_help(f: &mut Frame, area: Rect) {
    let [_, title, _, body, _, hint] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(HELP_LINES.len() as u16),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(area);

    f.render_widget(
        Paragraph::new(
            Line::styled("5x5 Binary Nerd Clock - Help", Style::new().fg(Theme::FG).bold())
                .centered(),
        ),
        title,
    );

    let lines: Vec<Line> = HELP_LINES
        .iter()
        .map(|(key, what)| {
            Line::from(vec![
                Span::styled(format!("{key:<10} "), Style::new().fg(Theme::FG).bold()),
                Span::styled(format!("- {what}"), Style::new().fg(Theme::HELP)),
            ])
        })
        .collect();
    let [_, column, _] = Layout::horizontal([
        Constraint::Percentage(20),
        Constraint::Min(0),
        Constraint::Percentage(5),
    ])
    .areas(body);
    f.render_widget(Paragraph::new(lines), column);

    f.render_widget(
        Paragraph::new(
            Line::styled(
                "Press H, F1 or Esc to return to clock",
                Style::new().fg(Theme::FG_DIM),
            )
            .centered(),
        ),
        hint,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{BitOrder, ColorMode, StandardColor};
    use chrono::TimeZone;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn buffer_text(term: &Terminal<TestBackend>) -> String {
        let buf = term.backend().buffer();
        let mut out = String::new();
        for y in 0..buf.area.height {
            for x in 0..buf.area.width {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn render(view: &View) -> Terminal<TestBackend> {
        let mut term = Terminal::new(TestBackend::new(120, 30)).unwrap();
        term.draw(|f| draw(f, view)).unwrap();
        term
    }

    #[test]
    fn banner_lists_every_setting() {
        let settings = Settings {
            color_mode: ColorMode::Standard(StandardColor::Red),
            brightness: 0.7,
            bit_order: BitOrder::Transpose,
            ..Settings::default()
        };
        assert_eq!(
            banner_text(&settings, "red"),
            "Color: red | Direction: down | Status: On | Shape: Circle | Order: transpose | Bright: 0.7"
        );
    }

    #[test]
    fn status_line_shows_count_and_both_clocks() {
        let frame = SecondFrame::new(5, BitOrder::Normal);
        let utc = Utc.with_ymd_and_hms(2025, 12, 31, 22, 0, 0).unwrap();
        let local = utc.with_timezone(&FixedOffset::east_opt(3600).unwrap());
        assert_eq!(
            status_text(&frame, CountDirection::Up, utc, local),
            "Elapsed: 5 (0b0000000000000000000000101) | 2025-12-31 22:00:00 UTC \
             | 2025-12-31 11:00:00 PM +01:00"
        );
    }

    #[test]
    fn grid_view_draws_banner_status_and_lit_leds() {
        let mut cells: Cells = [[None; GRID]; GRID];
        cells[2][2] = Some(Rgb::new(255, 0, 0));
        let view = View {
            cells: &cells,
            shape: LedShape::Square,
            banner: Some("Color: red".into()),
            status: Some(("Remaining: 1".into(), Rgb::new(1, 2, 3))),
            help: false,
        };
        let term = render(&view);
        let text = buffer_text(&term);
        assert!(text.contains("Color: red"));
        assert!(text.contains("Remaining: 1"));

        let buf = term.backend().buffer();
        let red = Color::Rgb(255, 0, 0);
        let grey = color(Theme::UNLIT);
        let cells = buf.content();
        assert!(cells.iter().any(|c| c.fg == red || c.bg == red));
        assert!(cells.iter().any(|c| c.fg == grey || c.bg == grey));
    }

    #[test]
    fn hidden_banner_and_status_leave_no_text() {
        let cells: Cells = [[None; GRID]; GRID];
        let view = View {
            cells: &cells,
            shape: LedShape::Circle,
            banner: None,
            status: None,
            help: false,
        };
        let text = buffer_text(&render(&view));
        assert!(!text.contains("Color:"));
        assert!(!text.contains("Remaining"));
    }

    #[test]
    fn help_screen_lists_bindings() {
        let cells: Cells = [[None; GRID]; GRID];
        let view = View {
            cells: &cells,
            shape: LedShape::Circle,
            banner: Some("Color: red".into()),
            status: None,
            help: true,
        };
        let text = buffer_text(&render(&view));
        assert!(text.contains("5x5 Binary Nerd Clock - Help"));
        assert!(text.contains("Quit the clock"));
        assert!(text.contains("Press H, F1 or Esc"));
        assert!(!text.contains("Color: red"));
    }
}
