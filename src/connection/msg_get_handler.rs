use tracing::debug;

use crate::connection::Reply;
use crate::models::{Response, TodoView};
use crate::services::TodoStore;

/// Handle `get`: the full list, for the originator only
pub async fn handle_get_message(store: &TodoStore) -> Reply {
    let items = store.list().await;
    debug!("Listing {} items", items.len());
    Reply::direct(Response::List(items.into_iter().map(TodoView::from).collect()))
}
