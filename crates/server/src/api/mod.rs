pub mod algorithms;
pub mod handlers;
pub mod middleware;
pub mod random;
pub mod response;
pub mod routes;

pub use routes::create_router;
