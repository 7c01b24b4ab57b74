//! PostgreSQL implementation of ReportSink.
//!
//! Upserts the reporting caller into `users` and inserts the report into
//! `fraud_reports_raw` in one transaction. The unique
//! `(conversation_id, delivery_id)` constraint makes repeat commits return
//! the id of the row written the first time.
//!
//! Postgres `TEXT` cannot hold NUL, so NUL characters are dropped from every
//! bound string. Without this a report containing one would be rejected on
//! every resend.

use std::borrow::Cow;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::foundation::{DeliveryId, ReportId};
use crate::domain::intake::ReportDraft;
use crate::ports::{PersistError, ReportSink};

/// PostgreSQL implementation of ReportSink.
#[derive(Clone)]
pub struct PostgresReportSink {
    pool: PgPool,
}

impl PostgresReportSink {
    /// Creates a new PostgresReportSink.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportSink for PostgresReportSink {
    async fn commit(
        &self,
        draft: &ReportDraft,
        delivery_id: &DeliveryId,
    ) -> Result<ReportId, PersistError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("start transaction", e))?;

        let conversation_id = text_column(draft.conversation_id.as_str());
        let delivery_id_text = text_column(delivery_id.as_str());
        let description = text_column(&draft.description);

        let user_id = upsert_user(&mut tx, &conversation_id).await?;

        let inserted: Option<(Uuid,)> = sqlx::query_as(
            r#"
            INSERT INTO fraud_reports_raw (
                id, user_id, conversation_id, delivery_id,
                category_main, category_sub, description, occurred_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (conversation_id, delivery_id) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(ReportId::new().as_uuid())
        .bind(user_id)
        .bind(conversation_id.as_ref())
        .bind(delivery_id_text.as_ref())
        .bind(draft.category.main_code())
        .bind(draft.category.sub_code())
        .bind(description.as_ref())
        .bind(draft.occurred_at.as_datetime())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert report", e))?;

        let (report_uuid,) = match inserted {
            Some(row) => row,
            None => sqlx::query_as(
                r#"
                SELECT id FROM fraud_reports_raw
                WHERE conversation_id = $1 AND delivery_id = $2
                "#,
            )
            .bind(conversation_id.as_ref())
            .bind(delivery_id_text.as_ref())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("read existing report", e))?,
        };

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit transaction", e))?;

        let report_id = ReportId::from_uuid(report_uuid);
        tracing::info!(
            conversation_id = %draft.conversation_id,
            delivery_id = %delivery_id,
            report_id = %report_id,
            category = %draft.category,
            "Fraud report stored"
        );

        Ok(report_id)
    }
}

async fn upsert_user(
    tx: &mut Transaction<'_, Postgres>,
    phone_number: &str,
) -> Result<i64, PersistError> {
    let (user_id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO users (phone_number)
        VALUES ($1)
        ON CONFLICT (phone_number)
        DO UPDATE SET last_seen_at = NOW()
        RETURNING id
        "#,
    )
    .bind(phone_number)
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("upsert user", e))?;

    Ok(user_id)
}

/// Drops NUL characters, which Postgres rejects in `TEXT` (SQLSTATE 22021).
fn text_column(value: &str) -> Cow<'_, str> {
    if value.contains('\0') {
        Cow::Owned(value.replace('\0', ""))
    } else {
        Cow::Borrowed(value)
    }
}

/// Classifies a sqlx error. Connection-level problems are transient;
/// anything the database itself rejected is not.
fn map_sqlx_error(action: &str, err: sqlx::Error) -> PersistError {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => {
            PersistError::transient(format!("Failed to {}: {}", action, err))
        }
        sqlx::Error::Database(ref db) if is_transient_sqlstate(db.code().as_deref()) => {
            PersistError::transient(format!("Failed to {}: {}", action, err))
        }
        _ => PersistError::permanent(format!("Failed to {}: {}", action, err)),
    }
}

/// Serialization failures, deadlocks and connection exceptions (class 08).
fn is_transient_sqlstate(code: Option<&str>) -> bool {
    match code {
        Some("40001") | Some("40P01") | Some("57P01") => true,
        Some(code) => code.starts_with("08"),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nul_is_dropped_from_text_columns() {
        assert_eq!(text_column("Paid\0 50\0"), "Paid 50");
        assert!(matches!(text_column("Paid 50"), Cow::Borrowed("Paid 50")));
    }

    #[test]
    fn pool_exhaustion_is_transient() {
        assert!(map_sqlx_error("insert report", sqlx::Error::PoolTimedOut).is_transient());
        assert!(map_sqlx_error("insert report", sqlx::Error::PoolClosed).is_transient());
    }

    #[test]
    fn row_not_found_is_permanent() {
        let err = map_sqlx_error("read existing report", sqlx::Error::RowNotFound);
        assert!(!err.is_transient());
        assert!(err.to_string().contains("read existing report"));
    }

    #[test]
    fn io_error_is_transient() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        assert!(map_sqlx_error("upsert user", sqlx::Error::Io(io)).is_transient());
    }

    #[test]
    fn sqlstate_classification() {
        assert!(is_transient_sqlstate(Some("40001")));
        assert!(is_transient_sqlstate(Some("08006")));
        assert!(!is_transient_sqlstate(Some("23505")));
        assert!(!is_transient_sqlstate(None));
    }
}
