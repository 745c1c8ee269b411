use serde_json::Number;
use tracing::info;

use crate::connection::Reply;
use crate::models::{ErrorResponse, Response, StoreError};
use crate::services::TodoStore;

/// Handle `update`: toggle the item, then announce the new state to everyone.
///
/// An id that is missing, negative, fractional or beyond `u64` can never
/// match an item, so it is reported the same way as an id never issued.
pub async fn handle_update_message(store: &TodoStore, id: Option<Number>) -> Reply {
    let toggled = match id.as_ref().and_then(Number::as_u64) {
        Some(id) => store.toggle(id).await,
        None => Err(StoreError::NotFound),
    };

    match toggled {
        Ok(item) => {
            info!("Toggled item id={} status={}", item.id, item.status());
            Reply::broadcast(Response::Item(item.into()))
        }
        Err(e) => {
            info!("Update rejected for id {:?}: {}", id, e);
            Reply::direct(Response::Error(ErrorResponse::from(e)))
        }
    }
}
