pub mod client;
pub mod git;
pub mod repository;

pub use client::{DEFAULT_API_BASE_URL, GitHubClient};
pub use repository::AuthenticatedUser;
