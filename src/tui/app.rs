//! Session state machine.
//!
//! Keys and finished operations go in, [`Effect`]s come out. Nothing here
//! touches the network or the terminal; the runner in `tui::run` executes
//! effects and feeds their results back through [`App::saved`] and
//! [`App::loaded`].

use std::collections::HashSet;

use chrono::{FixedOffset, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{debug, info, warn};
use weekcal_core::form::{Field, FormValues};
use weekcal_core::{Cell, Event, Grid, Position, layout};

use crate::tui::input::TextInput;

/// Work the runner should do on behalf of the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Create(Event),
    Update(Event),
    Delete(String),
    Reload,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Submit,
    Cancel,
    Delete,
}

impl Button {
    pub const ALL: [Button; 3] = [Button::Submit, Button::Cancel, Button::Delete];

    pub fn label(self) -> &'static str {
        match self {
            Button::Submit => "Submit",
            Button::Cancel => "Cancel",
            Button::Delete => "Delete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Field(Field),
    Button(Button),
}

const FOCUS_ORDER: [Focus; 8] = [
    Focus::Field(Field::Title),
    Focus::Field(Field::Date),
    Focus::Field(Field::Start),
    Focus::Field(Field::End),
    Focus::Field(Field::Location),
    Focus::Button(Button::Submit),
    Focus::Button(Button::Cancel),
    Focus::Button(Button::Delete),
];

/// What the open form will write to.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    New { date: NaiveDate },
    Existing(Event),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Form {
    target: Target,
    inputs: [TextInput; 5],
    focus: usize,
    invalid: Vec<Field>,
    confirm_delete: bool,
    end_days: u64,
}

impl Form {
    fn new(target: Target, offset: FixedOffset) -> Self {
        let values = match &target {
            Target::New { date } => FormValues::for_new_event(*date),
            Target::Existing(event) => FormValues::from_event(event, offset),
        };

        Form {
            target,
            inputs: Field::ALL.map(|field| TextInput::new(values.get(field))),
            focus: 0,
            invalid: Vec::new(),
            confirm_delete: false,
            end_days: values.end_days,
        }
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn input(&self, field: Field) -> &TextInput {
        &self.inputs[field.index()]
    }

    pub fn focus(&self) -> Focus {
        FOCUS_ORDER[self.focus]
    }

    /// Only existing events can be deleted; the button is disabled otherwise.
    pub fn can_delete(&self) -> bool {
        matches!(self.target, Target::Existing(_))
    }

    pub fn is_invalid(&self, field: Field) -> bool {
        self.invalid.contains(&field)
    }

    /// Delete has been pressed once and the next press deletes.
    pub fn confirm_delete(&self) -> bool {
        self.confirm_delete
    }

    pub fn values(&self) -> FormValues {
        let mut values = FormValues {
            end_days: self.end_days,
            ..Default::default()
        };
        for field in Field::ALL {
            *values.get_mut(field) = self.input(field).value().to_string();
        }
        values
    }

    fn focus_count(&self) -> usize {
        if self.can_delete() {
            FOCUS_ORDER.len()
        } else {
            FOCUS_ORDER.len() - 1
        }
    }

    fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.focus_count();
    }

    fn focus_prev(&mut self) {
        let count = self.focus_count();
        self.focus = (self.focus + count - 1) % count;
    }

    fn focused_input(&mut self) -> Option<&mut TextInput> {
        match self.focus() {
            Focus::Field(field) => Some(&mut self.inputs[field.index()]),
            Focus::Button(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Calendar,
    Forms(Box<Form>),
    /// An operation is in flight; only Ctrl-C is accepted.
    Loading,
}

enum FormAction {
    Close,
    Submit,
    Delete,
}

pub struct App {
    mode: Mode,
    grid: Grid,
    cursor: Position,
    selected: HashSet<Position>,
    flipped: bool,
    status: Option<String>,
    offset: FixedOffset,
}

impl App {
    /// A session over `grid`; form times are read and written in `offset`.
    pub fn new(grid: Grid, offset: FixedOffset) -> Self {
        App {
            mode: Mode::Calendar,
            grid,
            cursor: Position::default(),
            selected: HashSet::new(),
            flipped: false,
            status: None,
            offset,
        }
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn cursor(&self) -> Position {
        self.cursor
    }

    pub fn is_selected(&self, pos: Position) -> bool {
        self.selected.contains(&pos)
    }

    pub fn flipped(&self) -> bool {
        self.flipped
    }

    /// Last failure, shown until the next successful load.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Title of the cell under the cursor.
    pub fn current_title(&self) -> &str {
        self.grid.get(self.cursor).map_or("", Cell::title)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Effect> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Effect::Quit);
        }

        match self.mode {
            Mode::Calendar => self.calendar_key(key),
            Mode::Forms(_) => self.form_key(key),
            Mode::Loading => None,
        }
    }

    /// A create, update or delete finished.
    pub fn saved(&mut self, result: Result<(), String>) -> Option<Effect> {
        match result {
            Ok(()) => {
                self.mode = Mode::Loading;
                Some(Effect::Reload)
            }
            Err(message) => {
                self.fail(message);
                None
            }
        }
    }

    /// A list finished; on success the grid is rebuilt around `today`.
    pub fn loaded(&mut self, result: Result<Vec<Event>, String>, today: NaiveDate) {
        match result {
            Ok(events) => {
                self.grid = layout(&events, today);
                self.selected.clear();
                self.clamp_cursor();
                self.status = None;
                self.mode = Mode::Calendar;
                debug!("Grid rebuilt with {} event rows", self.grid.row_count());
            }
            Err(message) => self.fail(message),
        }
    }

    fn fail(&mut self, message: String) {
        warn!("Operation failed: {}", message);
        self.status = Some(message);
        self.mode = Mode::Calendar;
    }

    fn calendar_key(&mut self, key: KeyEvent) -> Option<Effect> {
        match key.code {
            KeyCode::Char('q') => return Some(Effect::Quit),
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(0, -1),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(0, 1),
            KeyCode::Left | KeyCode::Char('h') => self.move_cursor(-1, 0),
            KeyCode::Right | KeyCode::Char('l') => self.move_cursor(1, 0),
            KeyCode::Char('f') => self.flipped = !self.flipped,
            KeyCode::Char('r') => {
                self.mode = Mode::Loading;
                return Some(Effect::Reload);
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.activate(),
            _ => {}
        }
        None
    }

    /// Move unless the destination is off the grid or an empty cell.
    fn move_cursor(&mut self, dx: isize, dy: isize) {
        let (Some(x), Some(y)) = (
            self.cursor.x.checked_add_signed(dx),
            self.cursor.y.checked_add_signed(dy),
        ) else {
            return;
        };

        let target = Position::new(x, y);
        if self.grid.is_navigable(target) {
            self.cursor = target;
        }
    }

    fn activate(&mut self) {
        if self.selected.remove(&self.cursor) {
            return;
        }

        let target = match self.grid.get(self.cursor) {
            Some(Cell::Placeholder { date }) => Target::New { date: *date },
            Some(Cell::Event(event)) => Target::Existing(event.clone()),
            Some(Cell::Empty) | None => return,
        };

        info!("Opening form for {:?}", self.cursor);
        self.selected.insert(self.cursor);
        self.mode = Mode::Forms(Box::new(Form::new(target, self.offset)));
    }

    fn form_key(&mut self, key: KeyEvent) -> Option<Effect> {
        let Mode::Forms(form) = &mut self.mode else {
            return None;
        };

        // Delete must be pressed twice in a row
        let armed = std::mem::take(&mut form.confirm_delete);

        let action = match key.code {
            KeyCode::Esc => Some(FormAction::Close),
            KeyCode::BackTab | KeyCode::Up => {
                form.focus_prev();
                None
            }
            KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => {
                form.focus_prev();
                None
            }
            KeyCode::Tab | KeyCode::Down => {
                form.focus_next();
                None
            }
            KeyCode::Enter | KeyCode::Char(' ') if matches!(form.focus(), Focus::Button(_)) => {
                match form.focus() {
                    Focus::Button(Button::Submit) => Some(FormAction::Submit),
                    Focus::Button(Button::Cancel) => Some(FormAction::Close),
                    Focus::Button(Button::Delete) if armed => Some(FormAction::Delete),
                    Focus::Button(Button::Delete) => {
                        form.confirm_delete = true;
                        None
                    }
                    Focus::Field(_) => None,
                }
            }
            KeyCode::Enter => {
                form.focus_next();
                None
            }
            code => {
                if let Some(input) = form.focused_input() {
                    edit(input, code, key.modifiers);
                }
                None
            }
        };

        match action? {
            FormAction::Close => {
                debug!("Form cancelled");
                self.mode = Mode::Calendar;
                None
            }
            FormAction::Submit => self.submit(),
            FormAction::Delete => self.delete(),
        }
    }

    fn submit(&mut self) -> Option<Effect> {
        let Mode::Forms(form) = &mut self.mode else {
            return None;
        };

        let mut event = match form.values().to_event(self.offset) {
            Ok(event) => event,
            Err(e) => {
                info!("Form rejected: {}", e);
                form.invalid = e.fields;
                return None;
            }
        };

        let effect = match &form.target {
            Target::New { .. } => Effect::Create(event),
            Target::Existing(existing) => {
                event.id = existing.id.clone();
                Effect::Update(event)
            }
        };

        info!("Submitting form");
        self.mode = Mode::Loading;
        Some(effect)
    }

    fn delete(&mut self) -> Option<Effect> {
        let Mode::Forms(form) = &self.mode else {
            return None;
        };
        let Target::Existing(event) = &form.target else {
            return None;
        };

        let id = event.id.clone();
        info!("Deleting event {}", id);
        self.mode = Mode::Loading;
        Some(Effect::Delete(id))
    }

    /// Keep the cursor on a navigable cell after the grid changed.
    fn clamp_cursor(&mut self) {
        while self.cursor.y > 0 && !self.grid.is_navigable(self.cursor) {
            self.cursor.y -= 1;
        }
    }
}

fn edit(input: &mut TextInput, code: KeyCode, modifiers: KeyModifiers) {
    match code {
        KeyCode::Char(c) if !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
            input.insert(c)
        }
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => input.move_left(),
        KeyCode::Right => input.move_right(),
        KeyCode::Home => input.home(),
        KeyCode::End => input.end(),
        _ => {}
    }
}
