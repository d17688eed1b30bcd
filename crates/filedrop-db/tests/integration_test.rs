//! Live-database integration test. Needs a local Postgres with:
//!
//!   CREATE TABLE events (
//!       id          SERIAL PRIMARY KEY,
//!       bucket_name TEXT NOT NULL,
//!       file_name   TEXT NOT NULL
//!   );
//!
//! Run with: cargo test -p filedrop-db -- --ignored

use filedrop_db::{AppConfig, EventRecord, EventStore, PostgresEventStore};

#[tokio::test]
#[ignore]
async fn insert_event_against_local_postgres() {
    let config = AppConfig::from_lookup(|name| {
        let value = match name {
            "GCP_PROJECT" => "local",
            "DB_PASSWORD_SECRET" => "unused",
            "DB_USER" => "postgres",
            "DB_NAME" => "postgres",
            "DB_HOST" => "localhost",
            _ => return None,
        };
        Some(value.to_string())
    })
    .expect("config should resolve");

    let store = PostgresEventStore::new(&config);
    let record = EventRecord {
        bucket_name: "it-bucket".to_string(),
        file_name: "it-report.csv".to_string(),
    };

    store
        .insert_event("postgres", &record)
        .await
        .expect("insert failed");
}
