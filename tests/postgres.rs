//! Runs against a real PostgreSQL server when
//! `AIDEON_LEADS_TEST_DATABASE_URL` is set; otherwise every test returns
//! early.

use std::process;

use aideon_leads::model::{CanonicalRecord, PhoneNumber};
use aideon_leads::store::{PostgresLoader, RecordSink, TargetTable};
use sqlx::{Connection, PgConnection};

const DATABASE_URL: &str = "AIDEON_LEADS_TEST_DATABASE_URL";

async fn connect() -> Option<PgConnection> {
    let url = std::env::var(DATABASE_URL).ok()?;
    Some(
        PgConnection::connect(&url)
            .await
            .expect("test database reachable"),
    )
}

fn lead(name: &str, phone: &str, salary: Option<f64>) -> CanonicalRecord {
    CanonicalRecord {
        email: Some(format!("{}@example.com", name.to_lowercase())),
        name: Some(name.to_string()),
        age: Some(30),
        city: None,
        phone: PhoneNumber::new(phone, "+91"),
        bio: Some("Prefers \"evening\" calls, weekdays".to_string()),
        referral_code: None,
        lead_source: "Manual Excel Import".to_string(),
        user_type: "1".to_string(),
        category_name: "Finance".to_string(),
        salary,
    }
}

async fn create_table(conn: &mut PgConnection, table: &str) {
    sqlx::query(&format!(
        "CREATE TABLE \"{table}\" (
            id BIGSERIAL PRIMARY KEY,
            email TEXT,
            name TEXT,
            age INTEGER,
            city TEXT,
            phone TEXT NOT NULL,
            \"countryCode\" TEXT NOT NULL,
            bio TEXT,
            \"referralCode\" TEXT,
            \"LeadSource\" TEXT,
            type TEXT,
            \"categoryName\" TEXT,
            salary DOUBLE PRECISION,
            UNIQUE (phone, \"countryCode\")
        )"
    ))
    .execute(conn)
    .await
    .expect("table created");
}

async fn drop_table(conn: &mut PgConnection, table: &str) {
    sqlx::query(&format!("DROP TABLE IF EXISTS \"{table}\""))
        .execute(conn)
        .await
        .expect("table dropped");
}

#[tokio::test]
async fn staging_merge_is_idempotent_and_first_write_wins() {
    let Some(mut admin) = connect().await else {
        return;
    };
    let table = format!("leads_merge_{}", process::id());
    create_table(&mut admin, &table).await;

    let loader_conn = connect().await.expect("second connection");
    let target = TargetTable::parse(&table)
        .expect("valid table name")
        .with_salary(true);
    let mut loader = PostgresLoader::from_connection(loader_conn, target)
        .await
        .expect("staging prepared");

    let batch = vec![
        lead("Asha", "9845012345", Some(650000.0)),
        lead("Ravi", "9845099999", None),
        lead("Asha Duplicate", "9845012345", None),
    ];
    let first = loader.load(&batch).await.expect("first load");
    let second = loader.load(&batch).await.expect("second load");
    loader.close().await.expect("loader closed");

    let rows: Vec<(String, Option<String>, Option<f64>)> = sqlx::query_as(&format!(
        "SELECT phone, name, salary FROM \"{table}\" ORDER BY id"
    ))
    .fetch_all(&mut admin)
    .await
    .expect("rows fetched");
    drop_table(&mut admin, &table).await;

    assert_eq!(first, 2);
    assert_eq!(second, 0);
    assert_eq!(
        rows,
        vec![
            ("9845012345".to_string(), Some("Asha".to_string()), Some(650000.0)),
            ("9845099999".to_string(), Some("Ravi".to_string()), None),
        ]
    );
}

#[tokio::test]
async fn empty_batches_do_not_touch_the_database() {
    let Some(mut admin) = connect().await else {
        return;
    };
    let table = format!("leads_empty_{}", process::id());
    create_table(&mut admin, &table).await;

    let loader_conn = connect().await.expect("second connection");
    let target = TargetTable::parse(&table).expect("valid table name");
    let mut loader = PostgresLoader::from_connection(loader_conn, target)
        .await
        .expect("staging prepared");
    let inserted = loader.load(&[]).await.expect("empty load");
    loader.close().await.expect("loader closed");

    let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM \"{table}\""))
        .fetch_one(&mut admin)
        .await
        .expect("row count");
    drop_table(&mut admin, &table).await;

    assert_eq!(inserted, 0);
    assert_eq!(count, 0);
}
