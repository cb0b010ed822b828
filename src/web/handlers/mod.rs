//! Route handler modules for the campusnet-web REST API.

pub mod connections;
pub mod health;
pub mod marketplace;
pub mod posts;
pub mod reviews;
pub mod users;
