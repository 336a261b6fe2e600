pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use services::TaskService;
