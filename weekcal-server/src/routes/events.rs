//! Calendar event endpoints, forwarded to the Google Calendar API.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use tracing::info;
use weekcal_core::{Event, ListWindow};

use crate::routes::AppError;
use crate::state::RelayState;

pub fn router() -> Router<RelayState> {
    Router::new().route(
        "/calendar/events",
        get(list_events)
            .post(create_event)
            .patch(update_event)
            .delete(delete_event),
    )
}

#[derive(Deserialize)]
pub struct ListParams {
    pub weeks: Option<i64>,
}

#[derive(Deserialize)]
pub struct DeleteRequest {
    pub id: String,
}

/// GET /calendar/events?weeks=N - Events starting in the next N weeks (default 1)
async fn list_events(
    State(state): State<RelayState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Event>>, AppError> {
    let window = ListWindow::from_weeks(params.weeks)?;
    let events = state.client().list(window).await?;

    info!("GET /calendar/events: {} events", events.len());
    Ok(Json(events))
}

/// POST /calendar/events - Create an event, returning it with its new id
async fn create_event(
    State(state): State<RelayState>,
    Json(event): Json<Event>,
) -> Result<Json<Event>, AppError> {
    check_times(&event)?;
    let created = state.client().create(&event).await?;

    info!("POST /calendar/events: created {}", created.id);
    Ok(Json(created))
}

/// PATCH /calendar/events - Update the event named by the body's `id`
async fn update_event(
    State(state): State<RelayState>,
    Json(event): Json<Event>,
) -> Result<StatusCode, AppError> {
    check_times(&event)?;
    state.client().update(&event).await?;

    info!("PATCH /calendar/events: updated {}", event.id);
    Ok(StatusCode::OK)
}

/// DELETE /calendar/events - Delete the event named by the body's `id`
async fn delete_event(
    State(state): State<RelayState>,
    Json(request): Json<DeleteRequest>,
) -> Result<StatusCode, AppError> {
    state.client().delete(&request.id).await?;

    info!("DELETE /calendar/events: deleted {}", request.id);
    Ok(StatusCode::OK)
}

fn check_times(event: &Event) -> Result<(), AppError> {
    if event.end < event.start {
        return Err(AppError::bad_request("Event ends before it starts"));
    }
    Ok(())
}
