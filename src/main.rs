//! Arena Server Binary
//!
//! Runs the battle engine HTTP server on BIND_ADDR against the
//! PostgreSQL instance at DB_URL.

use tactica::*;

#[tokio::main]
async fn main() {
    log();
    interrupt();
    hosting::Server::run().await.unwrap();
}
