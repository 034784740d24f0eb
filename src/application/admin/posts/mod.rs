mod commands;
mod queries;
mod service;
pub mod types;

pub use service::*;
pub use types::{
    AdminPostError, CreatePostCommand, DEFAULT_AUTHOR, UpdatePostCommand, ensure_non_empty,
};
