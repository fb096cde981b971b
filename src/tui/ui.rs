//! Rendering of the week grid and the event form.

use std::ops::Range;
use std::str::FromStr;

use chrono::Days;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use tracing::warn;
use weekcal_core::config::Colors;
use weekcal_core::form::Field;
use weekcal_core::layout::DAYS;
use weekcal_core::{Cell, Position};

use crate::tui::app::{App, Button, Focus, Form, Mode, Target};

const PLACEHOLDER_HEIGHT: u16 = 3;
const CARD_HEIGHT: u16 = 4;
const HELP: &str = "←↓↑→/hjkl move  enter open  f flip  r reload  q quit";
const FORM_HELP: &str = "tab/↓ next  shift+tab/↑ previous  enter confirm  esc cancel";

/// Colors from the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub primary: Color,
    pub warning: Color,
    pub error: Color,
}

impl Theme {
    pub fn from_colors(colors: &Colors) -> Self {
        let defaults = Colors::default();
        Theme {
            primary: parse_color(&colors.primary, &defaults.primary),
            warning: parse_color(&colors.warning, &defaults.warning),
            error: parse_color(&colors.error, &defaults.error),
        }
    }
}

fn parse_color(value: &str, fallback: &str) -> Color {
    Color::from_str(value)
        .or_else(|_| {
            warn!("Unrecognized color {:?}, using {}", value, fallback);
            Color::from_str(fallback)
        })
        .unwrap_or(Color::Reset)
}

pub fn draw(frame: &mut Frame, app: &App, theme: &Theme) {
    match app.mode() {
        Mode::Forms(form) => draw_form(frame, form, theme),
        Mode::Calendar | Mode::Loading => draw_calendar(frame, app, theme),
    }
}

fn draw_calendar(frame: &mut Frame, app: &App, theme: &Theme) {
    let [banner, header, body, status, help] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    frame.render_widget(
        Line::from(vec![
            Span::styled("Current Event: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(app.current_title()),
        ]),
        banner,
    );

    let today = app.grid().today();
    for (x, column) in columns(header).into_iter().enumerate() {
        let day = today + Days::new(x as u64);
        let style = if x == app.cursor().x {
            Style::default().fg(theme.primary)
        } else {
            Style::default()
        };
        frame.render_widget(
            Paragraph::new(day.format("%a").to_string())
                .style(style)
                .alignment(Alignment::Center),
            column,
        );
    }

    draw_grid(frame, app, theme, body);

    let status_line = match (app.mode(), app.status()) {
        (Mode::Loading, _) => Line::styled("Loading...", Style::default().fg(theme.warning)),
        (_, Some(message)) => Line::styled(message.to_string(), Style::default().fg(theme.error)),
        _ => Line::default(),
    };
    frame.render_widget(status_line, status);
    frame.render_widget(
        Line::styled(HELP, Style::default().fg(Color::DarkGray)),
        help,
    );
}

fn draw_grid(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let rows = app.grid().rows();
    let visible = visible_rows(rows.len(), app.cursor().y, area.height);

    let mut y = area.y;
    for row in visible {
        let height = row_height(row);
        let row_area = Rect::new(area.x, y, area.width, height);
        for (x, column) in columns(row_area).into_iter().enumerate() {
            draw_cell(frame, app, theme, &rows[row][x], Position::new(x, row), column);
        }
        y += height;
    }
}

fn draw_cell(frame: &mut Frame, app: &App, theme: &Theme, cell: &Cell, pos: Position, area: Rect) {
    let hovered = app.cursor() == pos;

    let lines = match cell {
        Cell::Empty => return,
        Cell::Placeholder { .. } => vec![Line::raw(cell.title())],
        Cell::Event(event) if hovered && app.flipped() => {
            vec![Line::raw(event.location.clone().unwrap_or_default())]
        }
        Cell::Event(event) if hovered => vec![
            Line::styled(event.summary.clone(), Style::default().add_modifier(Modifier::BOLD)),
            Line::raw(event.time_range()),
        ],
        Cell::Event(event) => vec![Line::raw(event.summary.clone())],
    };

    let border = if hovered {
        Style::default().fg(theme.primary)
    } else if app.is_selected(pos) {
        Style::default().fg(theme.warning)
    } else {
        Style::default()
    };

    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::bordered().border_style(border)),
        area,
    );
}

fn columns(area: Rect) -> [Rect; DAYS] {
    Layout::horizontal([Constraint::Ratio(1, DAYS as u32); DAYS]).areas(area)
}

fn row_height(row: usize) -> u16 {
    if row == 0 { PLACEHOLDER_HEIGHT } else { CARD_HEIGHT }
}

/// The rows that fit in `height`, scrolled just enough to show `cursor_row`.
fn visible_rows(row_count: usize, cursor_row: usize, height: u16) -> Range<usize> {
    let span = |range: Range<usize>| range.map(row_height).sum::<u16>();

    let mut start = 0;
    while start < cursor_row && span(start..cursor_row + 1) > height {
        start += 1;
    }

    let mut end = start;
    let mut used = 0;
    while end < row_count && used + row_height(end) <= height {
        used += row_height(end);
        end += 1;
    }

    start..end
}

fn draw_form(frame: &mut Frame, form: &Form, theme: &Theme) {
    let title = match form.target() {
        Target::New { date } => format!(" New event on {} ", date.format("%a %Y-%m-%d")),
        Target::Existing(_) => " Edit event ".to_string(),
    };
    let block = Block::bordered().title(title);
    let inner = block.inner(frame.area());
    frame.render_widget(block, frame.area());

    let focused = Style::default().fg(theme.primary);
    let mut lines = Vec::new();
    let mut cursor = None;

    for field in Field::ALL {
        let invalid = form.is_invalid(field);
        let label_style = if invalid {
            Style::default().fg(theme.error)
        } else {
            Style::default()
        };
        let mut label = vec![Span::styled(field.label(), label_style)];
        if invalid {
            label.push(Span::styled(" invalid", label_style.add_modifier(Modifier::ITALIC)));
        }
        lines.push(Line::from(label));

        let input = form.input(field);
        let has_focus = form.focus() == Focus::Field(field);
        if has_focus {
            cursor = Some((2 + input.cursor() as u16, lines.len() as u16));
        }
        lines.push(Line::styled(
            format!("> {}", input.value()),
            if has_focus { focused } else { Style::default() },
        ));
    }

    lines.push(Line::default());
    lines.push(Line::from(buttons(form, theme)));
    lines.push(Line::default());
    lines.push(Line::styled(FORM_HELP, Style::default().fg(Color::DarkGray)));

    frame.render_widget(Paragraph::new(lines), inner);

    if let Some((x, y)) = cursor {
        let x = inner.x + x.min(inner.width.saturating_sub(1));
        frame.set_cursor_position((x, inner.y + y));
    }
}

fn buttons(form: &Form, theme: &Theme) -> Vec<Span<'static>> {
    let mut spans = Vec::new();

    for button in Button::ALL {
        let has_focus = form.focus() == Focus::Button(button);
        let (label, style) = match button {
            Button::Delete if !form.can_delete() => {
                (button.label(), Style::default().fg(Color::DarkGray))
            }
            Button::Delete if form.confirm_delete() => {
                ("Are you sure?", Style::default().fg(theme.error).add_modifier(Modifier::BOLD))
            }
            _ if has_focus => (
                button.label(),
                Style::default().fg(theme.primary).add_modifier(Modifier::BOLD),
            ),
            _ => (button.label(), Style::default()),
        };

        let style = if has_focus {
            style.add_modifier(Modifier::REVERSED)
        } else {
            style
        };
        spans.push(Span::styled(format!("[ {} ]", label), style));
        spans.push(Span::raw("  "));
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use weekcal_core::{Event, EventTime, layout};

    fn app() -> App {
        let start = EventTime::parse("2025-03-20T09:00:00Z").unwrap();
        let end = EventTime::parse("2025-03-20T10:00:00Z").unwrap();
        let mut event = Event::new("Standup", start, end);
        event.id = "a".into();
        event.location = Some("Room 4".into());

        let today = NaiveDate::from_ymd_opt(2025, 3, 20).unwrap();
        App::new(layout(&[event], today), FixedOffset::east_opt(0).unwrap())
    }

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        let theme = Theme::from_colors(&Colors::default());
        terminal.draw(|frame| draw(frame, app, &theme)).unwrap();

        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn test_theme_parses_config_colors() {
        let theme = Theme::from_colors(&Colors {
            primary: "#6495ED".into(),
            warning: "yellow".into(),
            error: "not a color".into(),
        });
        assert_eq!(theme.primary, Color::Rgb(0x64, 0x95, 0xED));
        assert_eq!(theme.warning, Color::Yellow);
        assert_eq!(theme.error, Color::Rgb(0xFF, 0, 0));
    }

    #[test]
    fn test_visible_rows_follow_cursor() {
        assert_eq!(visible_rows(1, 0, 30), 0..1);
        assert_eq!(visible_rows(5, 0, 11), 0..3);
        // Row 4 needs rows 2..5 (12 lines) out of 11, so start at 3
        assert_eq!(visible_rows(5, 4, 11), 3..5);
        assert_eq!(visible_rows(5, 0, 0), 0..0);
    }

    #[test]
    fn test_calendar_shows_week_and_banner() {
        let text = render(&app());

        assert!(text.contains("Current Event: +"));
        // 2025-03-20 is a Thursday
        let header = text.lines().nth(1).unwrap();
        let thu = header.find("Thu").unwrap();
        let wed = header.find("Wed").unwrap();
        assert!(thu < wed);
        assert!(text.contains("Standup"));
    }

    #[test]
    fn test_hovered_card_flips_to_location() {
        let mut app = app();
        press(&mut app, KeyCode::Down);

        let text = render(&app);
        assert!(text.contains("Current Event: Standup"));
        assert!(text.contains("09:00-10:00"));

        press(&mut app, KeyCode::Char('f'));
        let text = render(&app);
        assert!(text.contains("Room 4"));
        assert!(!text.contains("09:00-10:00"));
    }

    #[test]
    fn test_form_shows_fields_and_confirmation() {
        let mut app = app();
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);

        let text = render(&app);
        assert!(text.contains("Edit event"));
        assert!(text.contains("> Standup"));
        assert!(text.contains("> 09:00"));
        assert!(text.contains("[ Delete ]"));

        press(&mut app, KeyCode::BackTab);
        press(&mut app, KeyCode::Enter);
        assert!(render(&app).contains("[ Are you sure? ]"));
    }
}
