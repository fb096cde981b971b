//! Week layout: places a flat, start-ordered list of events into a
//! 7-column grid indexed by day offset from today.
//!
//! Row 0 always holds one placeholder per day ("create a new event here").
//! Data rows follow; their count is the number of events on the busiest day
//! of the week, so shorter days leave [`Cell::Empty`] cells at the bottom.

use chrono::{Days, NaiveDate};

use crate::event::Event;

pub const DAYS: usize = 7;

/// Title shown on placeholder cells.
pub const PLACEHOLDER_TITLE: &str = "+";

/// A grid cell position: `x` is the day offset, `y` the row (0 = placeholders).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Position { x, y }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// No event, and not a valid navigation target.
    Empty,
    /// Activate to create an event on `date`.
    Placeholder { date: NaiveDate },
    Event(Event),
}

impl Cell {
    pub fn title(&self) -> &str {
        match self {
            Cell::Empty => "",
            Cell::Placeholder { .. } => PLACEHOLDER_TITLE,
            Cell::Event(event) => &event.summary,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Cell::Placeholder { .. })
    }

    pub fn event(&self) -> Option<&Event> {
        match self {
            Cell::Event(event) => Some(event),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    today: NaiveDate,
    rows: Vec<[Cell; DAYS]>,
}

impl Grid {
    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn rows(&self) -> &[[Cell; DAYS]] {
        &self.rows
    }

    /// Number of rows including the placeholder row.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Number of event rows (the busiest day's event count).
    pub fn row_count(&self) -> usize {
        self.rows.len() - 1
    }

    pub fn get(&self, pos: Position) -> Option<&Cell> {
        self.rows.get(pos.y).and_then(|row| row.get(pos.x))
    }

    /// Whether the cursor may rest on `pos`: inside the grid and not empty.
    pub fn is_navigable(&self, pos: Position) -> bool {
        self.get(pos).is_some_and(|cell| !cell.is_empty())
    }
}

/// Offset in days of `date` from `today`, if it falls in the visible week
/// `[0, 7)`. Earlier and later dates are outside the window, not errors.
pub fn day_index(date: NaiveDate, today: NaiveDate) -> Option<usize> {
    let days = (date - today).num_days();
    (0..DAYS as i64).contains(&days).then_some(days as usize)
}

/// Lay `events` out on the week starting at `today`.
///
/// Events keep their input order within a day, so a start-ordered input
/// gives start-ordered columns. Events outside the week are left out.
pub fn layout(events: &[Event], today: NaiveDate) -> Grid {
    let mut by_day: [Vec<&Event>; DAYS] = Default::default();
    for event in events {
        if let Some(x) = day_index(event.start.date(), today) {
            by_day[x].push(event);
        }
    }

    let row_count = by_day.iter().map(Vec::len).max().unwrap_or(0);

    let mut rows = Vec::with_capacity(row_count + 1);
    rows.push(std::array::from_fn(|x| Cell::Placeholder {
        date: today + Days::new(x as u64),
    }));
    rows.extend((0..row_count).map(|_| std::array::from_fn(|_| Cell::Empty)));

    for (x, day) in by_day.into_iter().enumerate() {
        // A (day, row) slot keeps the first event that reaches it
        for (y, event) in day.into_iter().take(row_count).enumerate() {
            let cell = &mut rows[y + 1][x];
            if cell.is_empty() {
                *cell = Cell::Event(event.clone());
            }
        }
    }

    Grid { today, rows }
}
