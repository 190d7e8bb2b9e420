use async_trait::async_trait;
use csv::WriterBuilder;
use sqlx::{Connection, PgConnection};
use tracing::{debug, info, instrument};

use crate::aideon::leads::config::DbConfig;
use crate::aideon::leads::error::{IngestError, Result};
use crate::aideon::leads::model::CanonicalRecord;
use crate::aideon::leads::store::{RecordSink, TargetTable};

/// Loads batches into PostgreSQL through a staging merge.
///
/// Each batch is copied into a temporary staging table, merged into the
/// target with `ON CONFLICT (phone, "countryCode") DO NOTHING` in input
/// order, and the staging table is emptied again, all in one transaction.
pub struct PostgresLoader {
    conn: PgConnection,
    target: TargetTable,
    copy_sql: String,
    merge_sql: String,
    truncate_sql: String,
}

impl PostgresLoader {
    /// Opens a connection and prepares the staging table.
    #[instrument(
        level = "info",
        skip_all,
        fields(host = %config.host, database = %config.database)
    )]
    pub async fn connect(config: &DbConfig, target: TargetTable) -> Result<Self> {
        let conn = PgConnection::connect_with(&config.connect_options()).await?;
        info!("connected to database");
        Self::from_connection(conn, target).await
    }

    /// Uses an existing connection. The staging table lives as long as the
    /// connection does.
    pub async fn from_connection(mut conn: PgConnection, target: TargetTable) -> Result<Self> {
        let columns = target.column_list();
        let staging = target.qualified_staging();

        sqlx::query(&format!("DROP TABLE IF EXISTS {staging}"))
            .execute(&mut conn)
            .await?;
        sqlx::query(&format!(
            "CREATE TEMPORARY TABLE {} AS SELECT {columns} FROM {} WITH NO DATA",
            target.quoted_staging(),
            target.quoted()
        ))
        .execute(&mut conn)
        .await?;
        sqlx::query(&format!("ALTER TABLE {staging} ADD COLUMN seq BIGSERIAL"))
            .execute(&mut conn)
            .await?;
        debug!(staging = %staging, "staging table ready");

        Ok(Self {
            copy_sql: format!("COPY {staging} ({columns}) FROM STDIN WITH (FORMAT csv)"),
            merge_sql: format!(
                "INSERT INTO {target} ({columns}) SELECT {columns} FROM {staging} ORDER BY seq \
                 ON CONFLICT (\"phone\", \"countryCode\") DO NOTHING",
                target = target.quoted()
            ),
            truncate_sql: format!("TRUNCATE TABLE {staging}"),
            conn,
            target,
        })
    }

    pub fn target(&self) -> &TargetTable {
        &self.target
    }

    /// Closes the connection, dropping the staging table with it.
    pub async fn close(self) -> Result<()> {
        self.conn.close().await?;
        Ok(())
    }
}

#[async_trait]
impl RecordSink for PostgresLoader {
    async fn load(&mut self, records: &[CanonicalRecord]) -> Result<u64> {
        if records.is_empty() {
            return Ok(0);
        }

        let payload = encode_copy_payload(records, self.target.includes_salary())?;

        let mut tx = self.conn.begin().await?;
        let mut copy = tx.copy_in_raw(&self.copy_sql).await?;
        copy.send(payload).await?;
        let staged = copy.finish().await?;

        let inserted = sqlx::query(&self.merge_sql)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        sqlx::query(&self.truncate_sql).execute(&mut *tx).await?;
        tx.commit().await?;

        debug!(staged, inserted, "merged staging batch");
        Ok(inserted)
    }
}

/// Renders records as headerless CSV in [`TargetTable::columns`] order.
/// Absent values are written as unquoted empty fields, which `COPY` reads as
/// `NULL`.
pub fn encode_copy_payload(records: &[CanonicalRecord], include_salary: bool) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    for record in records {
        let mut row: Vec<String> = vec![
            optional(&record.email),
            optional(&record.name),
            record.age.map(|age| age.to_string()).unwrap_or_default(),
            optional(&record.city),
            record.phone.national.clone(),
            record.phone.country_code.clone(),
            optional(&record.bio),
            optional(&record.referral_code),
            record.lead_source.clone(),
            record.user_type.clone(),
            record.category_name.clone(),
        ];
        if include_salary {
            row.push(record.salary.map(|salary| salary.to_string()).unwrap_or_default());
        }
        writer.write_record(&row)?;
    }

    writer
        .into_inner()
        .map_err(|err| IngestError::from(err.into_error()))
}

fn optional(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}
