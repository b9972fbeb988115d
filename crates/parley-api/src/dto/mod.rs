//! Request and response DTOs for the REST API.

pub mod request;
pub mod response;
