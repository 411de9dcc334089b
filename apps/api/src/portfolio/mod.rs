pub mod handlers;
pub mod service;
pub mod store;
pub mod validation;
