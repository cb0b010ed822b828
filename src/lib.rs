pub mod connections;
pub mod engagement;
pub mod error;
pub mod feed;
pub mod gigs;
pub mod identity;
pub mod logging;
pub mod posts;
pub mod reviews;
pub mod storage;
pub mod web;
