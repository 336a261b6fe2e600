pub mod auth;
pub mod profile;
pub mod service_requests;
pub mod shops;
pub mod tasks;
