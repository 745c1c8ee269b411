use tracing::info;

use crate::connection::Reply;
use crate::models::{Response, TodoView};
use crate::services::TodoStore;

/// Handle `add`: store the item, then announce it to everyone
pub async fn handle_add_message(store: &TodoStore, description: String) -> Reply {
    let item = store.add(description).await;
    info!("Added item id={} desc={:?}", item.id, item.description);
    Reply::broadcast(Response::Item(item.into()))
}
