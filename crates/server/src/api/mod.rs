pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod session;
pub mod tickets;

pub use routes::create_router;
