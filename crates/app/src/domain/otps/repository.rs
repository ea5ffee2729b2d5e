//! OTP Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, PgPool, Postgres, Row, postgres::PgRow, query, query_as};

use crate::domain::otps::records::OtpRecord;

const CREATE_OTP_SQL: &str = include_str!("sql/create_otp.sql");
const FIND_OTP_SQL: &str = include_str!("sql/find_otp.sql");
const CONSUME_OTP_SQL: &str = include_str!("sql/consume_otp.sql");
const RELEASE_OTP_SQL: &str = include_str!("sql/release_otp.sql");
const PURGE_EXPIRED_OTPS_SQL: &str = include_str!("sql/purge_expired_otps.sql");

#[derive(Debug, Clone)]
pub(crate) struct PgOtpsRepository {
    pool: PgPool,
}

impl PgOtpsRepository {
    #[must_use]
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert `otp`, replacing a row with the same code only when that row has expired.
    ///
    /// Returns `None` when the code is held by a live entry.
    pub(crate) async fn insert_otp(&self, otp: &OtpRecord) -> Result<Option<OtpRecord>, sqlx::Error> {
        query_as::<Postgres, OtpRecord>(CREATE_OTP_SQL)
            .bind(&otp.code)
            .bind(&otp.label)
            .bind(SqlxTimestamp::from(otp.expires_at))
            .bind(SqlxTimestamp::from(otp.created_at))
            .fetch_optional(&self.pool)
            .await
    }

    pub(crate) async fn find_otp(&self, code: &str) -> Result<Option<OtpRecord>, sqlx::Error> {
        query_as::<Postgres, OtpRecord>(FIND_OTP_SQL)
            .bind(code)
            .fetch_optional(&self.pool)
            .await
    }

    pub(crate) async fn consume_otp(&self, code: &str, now: Timestamp) -> Result<u64, sqlx::Error> {
        let rows_affected = query(CONSUME_OTP_SQL)
            .bind(code)
            .bind(SqlxTimestamp::from(now))
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// Clear a consumption, but only the one stamped at `consumed_at`.
    pub(crate) async fn release_otp(
        &self,
        code: &str,
        consumed_at: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(RELEASE_OTP_SQL)
            .bind(code)
            .bind(SqlxTimestamp::from(consumed_at))
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn purge_expired(&self, now: Timestamp) -> Result<u64, sqlx::Error> {
        let rows_affected = query(PURGE_EXPIRED_OTPS_SQL)
            .bind(SqlxTimestamp::from(now))
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for OtpRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            code: row.try_get("code")?,
            label: row.try_get("label")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            expires_at: row.try_get::<SqlxTimestamp, _>("expires_at")?.to_jiff(),
            consumed_at: row
                .try_get::<Option<SqlxTimestamp>, _>("consumed_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}
