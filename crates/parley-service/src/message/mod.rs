//! Message CRUD with sender and participant authorization.

pub mod service;

pub use service::MessageService;
