use crate::config::DatabaseConfig;
use crate::domain::model::RowRecord;
use crate::domain::ports::RelationalSource;
use crate::utils::error::Result;
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgRow};
use sqlx::{Column, Row, TypeInfo};
use std::collections::HashMap;

/// Runs the one fixed report query against a connection pool.
pub struct PgSource {
    pool: PgPool,
    query: String,
}

impl PgSource {
    pub async fn connect(config: &DatabaseConfig, query: impl Into<String>) -> Result<Self> {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.name);

        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect_with(options)
            .await?;

        Ok(Self {
            pool,
            query: query.into(),
        })
    }
}

#[async_trait]
impl RelationalSource for PgSource {
    async fn fetch_rows(&self) -> Result<Vec<RowRecord>> {
        tracing::debug!("Running query: {}", self.query);
        let rows = sqlx::query(&self.query).fetch_all(&self.pool).await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut data = HashMap::with_capacity(row.columns().len());
            for (idx, column) in row.columns().iter().enumerate() {
                data.insert(column.name().to_lowercase(), column_as_string(row, idx)?);
            }
            records.push(RowRecord { data });
        }
        Ok(records)
    }
}

/// Stringifies a column by its Postgres type. Unsupported types decode as an
/// empty string rather than failing the whole row set.
fn column_as_string(row: &PgRow, idx: usize) -> sqlx::Result<String> {
    let type_name = row.columns()[idx].type_info().name();
    let value = match type_name {
        "TEXT" | "VARCHAR" | "CHAR" | "BPCHAR" | "NAME" => {
            row.try_get::<Option<String>, _>(idx)?.unwrap_or_default()
        }
        "INT2" => display(row.try_get::<Option<i16>, _>(idx)?),
        "INT4" => display(row.try_get::<Option<i32>, _>(idx)?),
        "INT8" => display(row.try_get::<Option<i64>, _>(idx)?),
        "FLOAT4" => display(row.try_get::<Option<f32>, _>(idx)?),
        "FLOAT8" => display(row.try_get::<Option<f64>, _>(idx)?),
        "BOOL" => display(row.try_get::<Option<bool>, _>(idx)?),
        "DATE" => display(row.try_get::<Option<chrono::NaiveDate>, _>(idx)?),
        "TIMESTAMP" => display(row.try_get::<Option<chrono::NaiveDateTime>, _>(idx)?),
        "TIMESTAMPTZ" => display(row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(idx)?),
        other => {
            tracing::debug!("Column type {} has no string mapping, using empty", other);
            String::new()
        }
    };
    Ok(value)
}

fn display<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
