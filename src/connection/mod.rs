pub mod handler;
pub mod msg_get_handler;
pub mod msg_add_handler;
pub mod msg_update_handler;

pub use handler::handle_connection;

use crate::models::Response;

/// What a dispatched request produced: the response for the originator and
/// whether the same response goes out to every other session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub response: Response,
    pub broadcast: bool,
}

impl Reply {
    pub fn direct(response: Response) -> Self {
        Self { response, broadcast: false }
    }

    pub fn broadcast(response: Response) -> Self {
        Self { response, broadcast: true }
    }
}
