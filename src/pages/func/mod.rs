pub mod appointment;
pub mod lead;
pub mod task;
pub mod ticket;

use axum::Router;

use super::AppState;
use crate::Store;

pub fn func_router<S: Store>() -> Router<AppState<S>> {
    lead::lead_router()
        .merge(task::task_router())
        .merge(appointment::appointment_router())
        .merge(ticket::ticket_router())
}
