pub mod engine;
pub mod item_session;
pub mod route;

pub use engine::RouteEngine;
pub use item_session::{COMPLETION_STATUS, ItemSession, NUM_ATTEMPTS, SCORE};
pub use route::{Route, RouteDefinition, RouteStep};
