//! REST API layer

pub mod actor;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod mapper;
pub mod routes;

pub use actor::ActingActor;
pub use error::Problem;
pub use routes::register_routes;
