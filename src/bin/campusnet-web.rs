//! campusnet-web: REST server for the campusnet core.
//!
//! Usage:
//!   campusnet-web [--bind 127.0.0.1:8080] [--data-dir ~/.campusnet]

#[tokio::main]
async fn main() {
    campusnet::web::run().await;
}
