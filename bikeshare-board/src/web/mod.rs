//! Web layer for the station board.
//!
//! Serves the map page, the listing fragment and a JSON snapshot of the
//! latest refresh. Holds no data of its own; everything comes from the
//! scheduler.

mod dto;
mod routes;
mod state;
pub mod templates;

pub use dto::*;
pub use routes::create_router;
pub use state::AppState;
pub use templates::*;
