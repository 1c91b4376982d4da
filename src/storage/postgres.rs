use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::Config;
use crate::error::AppError;
use crate::models::rsvp::{NewRsvp, Rsvp, RsvpRow, SubmitOutcome};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects and brings the schema up to date. Failure here is fatal for the process.
    pub async fn connect(config: &Config) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(config.db_acquire_timeout)
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!()
            .run(&pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to run migrations: {e}")))?;

        Ok(Self::new(pool))
    }

    // Dropping an uncommitted transaction rolls it back and returns the
    // connection to the pool, so `?` on any step below is a clean abort.

    pub async fn submit(&self, rsvp: &NewRsvp) -> Result<SubmitOutcome, AppError> {
        let mut tx = self.pool.begin().await?;

        // xmax is zero only for a freshly inserted tuple
        let (id, inserted): (i32, bool) = sqlx::query_as(
            "INSERT INTO rsvps (name, attendance) VALUES ($1, $2)
             ON CONFLICT (name) DO UPDATE
               SET attendance = EXCLUDED.attendance, timestamp = now()
             RETURNING id, (xmax = 0) AS inserted",
        )
        .bind(&rsvp.name)
        .bind(rsvp.attendance.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(if inserted {
            SubmitOutcome::Created(id)
        } else {
            SubmitOutcome::Updated(id)
        })
    }

    pub async fn list_confirmed(&self) -> Result<Vec<String>, AppError> {
        let mut tx = self.pool.begin().await?;

        let names: Vec<String> = sqlx::query_scalar(
            r#"SELECT name FROM rsvps WHERE attendance = 'YES' ORDER BY name COLLATE "C" ASC"#,
        )
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(names)
    }

    pub async fn list_all(&self) -> Result<Vec<Rsvp>, AppError> {
        let mut tx = self.pool.begin().await?;

        let rows = sqlx::query_as::<_, RsvpRow>(
            "SELECT id, name, attendance, timestamp AS recorded_at
             FROM rsvps ORDER BY timestamp DESC, id DESC",
        )
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        rows.into_iter().map(Rsvp::try_from).collect()
    }

    pub async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM rsvps WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn ping(&self) -> Result<(), AppError> {
        let (one,): (i32,) = sqlx::query_as("SELECT 1").fetch_one(&self.pool).await?;
        if one != 1 {
            return Err(AppError::Internal("unexpected health check result".into()));
        }
        Ok(())
    }
}
