pub mod todo;
pub mod messages;
pub mod error;

pub use todo::*;
pub use messages::*;
pub use error::*;
