//! Interactive week view.

pub mod app;
pub mod input;
pub mod ui;

use anyhow::Result;
use chrono::Local;
use crossterm::event::{Event as TermEvent, EventStream};
use futures::StreamExt;
use ratatui::DefaultTerminal;
use tokio::sync::mpsc;
use tracing::{error, info};
use weekcal_core::{CalendarClient, Event, ListWindow, layout, with_refresh};

use self::app::{App, Effect};
use self::ui::Theme;

/// Result of an effect, fed back into the session.
#[derive(Debug)]
enum Outcome {
    Saved(Result<(), String>),
    Loaded(Result<Vec<Event>, String>),
}

/// Run the session until the user quits. `events` is the initial listing.
pub async fn run(client: CalendarClient, theme: Theme, events: Vec<Event>) -> Result<()> {
    let now = Local::now();
    let app = App::new(layout(&events, now.date_naive()), *now.offset());

    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, app, &client, &theme).await;
    ratatui::restore();

    result
}

async fn event_loop(
    terminal: &mut DefaultTerminal,
    mut app: App,
    client: &CalendarClient,
    theme: &Theme,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut input = EventStream::new();

    loop {
        terminal.draw(|frame| ui::draw(frame, &app, theme))?;

        let effect = tokio::select! {
            event = input.next() => match event {
                Some(Ok(TermEvent::Key(key))) => app.handle_key(key),
                Some(Ok(_)) => None,
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(()),
            },
            Some(outcome) = rx.recv() => match outcome {
                Outcome::Saved(result) => app.saved(result),
                Outcome::Loaded(result) => {
                    app.loaded(result, Local::now().date_naive());
                    None
                }
            },
        };

        match effect {
            Some(Effect::Quit) => {
                info!("Quitting");
                return Ok(());
            }
            Some(effect) => {
                tokio::spawn(execute(client.clone(), effect, tx.clone()));
            }
            None => {}
        }
    }
}

/// Perform one effect against the calendar, refreshing the token once on 401.
async fn execute(client: CalendarClient, effect: Effect, tx: mpsc::UnboundedSender<Outcome>) {
    let credentials = client.credentials();

    let outcome = match effect {
        Effect::Create(event) => Outcome::Saved(report(
            "Create",
            with_refresh(credentials, || client.create(&event))
                .await
                .map(|_| ()),
        )),
        Effect::Update(event) => Outcome::Saved(report(
            "Update",
            with_refresh(credentials, || client.update(&event)).await,
        )),
        Effect::Delete(id) => Outcome::Saved(report(
            "Delete",
            with_refresh(credentials, || client.delete(&id)).await,
        )),
        Effect::Reload => Outcome::Loaded(report(
            "Reload",
            with_refresh(credentials, || client.list(ListWindow::default())).await,
        )),
        Effect::Quit => return,
    };

    let _ = tx.send(outcome);
}

fn report<T>(op: &str, result: Result<T, weekcal_core::Error>) -> Result<T, String> {
    result.map_err(|e| {
        error!("{} failed: {}", op, e);
        e.to_string()
    })
}
