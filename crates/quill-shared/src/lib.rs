//! # Quill Shared
//!
//! Wire types shared by the API server and its clients: the response
//! envelope and the request/response DTOs.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse};
