//! Application services layer: read path, write path, repository seams.

pub mod admin;
pub mod error;
pub mod posts;
pub mod repos;
