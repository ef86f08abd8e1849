//! Repositories for the admin auth service

pub mod profile;

pub use profile::{PgProfileStore, ProfileStore, RestProfileStore};
