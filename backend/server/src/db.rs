//! Database layer: migrations and the SQLite-backed record store.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use fund_me::{
    Address, DonationReceipt, DonationTransition, Error as LedgerError, Project, ProjectMetadata,
    RecordStore,
};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::errors::Result;

/// Establish a SQLite connection pool and run pending migrations.
pub async fn init_pool(database_url: &str, max_connections: u32) -> Result<SqlitePool> {
    let url = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite:{database_url}")
    };

    // Make sure the file is created if it doesn't exist yet.
    let options = SqliteConnectOptions::from_str(&url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations applied successfully");
    Ok(pool)
}

// ─────────────────────────────────────────────────────────
// Row shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, sqlx::FromRow)]
struct ProjectRow {
    owner: String,
    project_id: String,
    title: String,
    description: String,
    image_url: String,
    target_amount: i64,
    current_amount: i64,
    end_time: i64,
    bump: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct ReceiptRow {
    donor: String,
    project: String,
    amount: i64,
    timestamp: i64,
    refunded: bool,
    bump: i64,
}

fn store_err(e: impl std::fmt::Display) -> LedgerError {
    LedgerError::Store(e.to_string())
}

fn parse_address(raw: &str) -> fund_me::Result<Address> {
    raw.parse().map_err(store_err)
}

fn parse_bump(raw: i64) -> fund_me::Result<u8> {
    u8::try_from(raw).map_err(store_err)
}

// u64 amounts round-trip through i64 columns by bit pattern.
fn to_column(amount: u64) -> i64 {
    amount as i64
}

fn from_column(value: i64) -> u64 {
    value as u64
}

impl TryFrom<ProjectRow> for Project {
    type Error = LedgerError;

    fn try_from(row: ProjectRow) -> fund_me::Result<Self> {
        Ok(Project {
            owner: parse_address(&row.owner)?,
            project_id: row.project_id,
            metadata: ProjectMetadata {
                title: row.title,
                description: row.description,
                image_url: row.image_url,
            },
            target_amount: from_column(row.target_amount),
            current_amount: from_column(row.current_amount),
            end_time: row.end_time,
            bump: parse_bump(row.bump)?,
        })
    }
}

impl TryFrom<ReceiptRow> for DonationReceipt {
    type Error = LedgerError;

    fn try_from(row: ReceiptRow) -> fund_me::Result<Self> {
        Ok(DonationReceipt {
            user: parse_address(&row.donor)?,
            project: parse_address(&row.project)?,
            amount: from_column(row.amount),
            timestamp: row.timestamp,
            refunded: row.refunded,
            bump: parse_bump(row.bump)?,
        })
    }
}

const SELECT_PROJECT: &str = r#"
    SELECT owner, project_id, title, description, image_url,
           target_amount, current_amount, end_time, bump
    FROM   projects
    WHERE  address = ?1
"#;

const SELECT_RECEIPT: &str = r#"
    SELECT donor, project, amount, timestamp, refunded, bump
    FROM   donation_receipts
    WHERE  address = ?1
"#;

// ─────────────────────────────────────────────────────────
// Record store
// ─────────────────────────────────────────────────────────

/// [`RecordStore`] persisted in SQLite.
///
/// Primary keys on the address columns make every insert create-if-absent.
/// Writes from this process queue on `write_gate`; the donation unit runs in
/// one transaction whose project update is a compare-and-set on the previous
/// total, so a writer in another process cannot be overwritten silently.
pub struct SqliteStore {
    pool: SqlitePool,
    write_gate: Mutex<()>,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            write_gate: Mutex::new(()),
        }
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn load_project(&self, address: &Address) -> fund_me::Result<Option<Project>> {
        let row: Option<ProjectRow> = sqlx::query_as(SELECT_PROJECT)
            .bind(address.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?;
        row.map(Project::try_from).transpose()
    }

    async fn load_receipt(&self, address: &Address) -> fund_me::Result<Option<DonationReceipt>> {
        let row: Option<ReceiptRow> = sqlx::query_as(SELECT_RECEIPT)
            .bind(address.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?;
        row.map(DonationReceipt::try_from).transpose()
    }

    async fn insert_project(&self, address: &Address, project: &Project) -> fund_me::Result<()> {
        let _gate = self.write_gate.lock().await;

        let rows_affected = sqlx::query(
            r#"
            INSERT OR IGNORE INTO projects
                (address, owner, project_id, title, description, image_url,
                 target_amount, current_amount, end_time, bump)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(address.to_string())
        .bind(project.owner.to_string())
        .bind(&project.project_id)
        .bind(&project.metadata.title)
        .bind(&project.metadata.description)
        .bind(&project.metadata.image_url)
        .bind(to_column(project.target_amount))
        .bind(to_column(project.current_amount))
        .bind(project.end_time)
        .bind(i64::from(project.bump))
        .execute(&self.pool)
        .await
        .map_err(store_err)?
        .rows_affected();

        if rows_affected == 0 {
            return Err(LedgerError::AlreadyExists(*address));
        }
        debug!("sqlite store: project inserted at {address}");
        Ok(())
    }

    async fn apply_donation(
        &self,
        project_address: &Address,
        receipt_address: &Address,
        transition: DonationTransition,
    ) -> fund_me::Result<(Project, DonationReceipt)> {
        let _gate = self.write_gate.lock().await;
        // Dropping `tx` on any early return rolls it back.
        let mut tx = self.pool.begin().await.map_err(store_err)?;

        let row: Option<ProjectRow> = sqlx::query_as(SELECT_PROJECT)
            .bind(project_address.to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(store_err)?;
        let mut project = Project::try_from(row.ok_or(LedgerError::NotFound(*project_address))?)?;
        let previous_amount = project.current_amount;

        let occupied: Option<(i64,)> =
            sqlx::query_as("SELECT 1 FROM donation_receipts WHERE address = ?1")
                .bind(receipt_address.to_string())
                .fetch_optional(&mut *tx)
                .await
                .map_err(store_err)?;
        let occupied = occupied.is_some();

        let receipt = transition(&mut project, occupied)?;
        if occupied {
            return Err(LedgerError::DuplicateDonation(*receipt_address));
        }

        let updated = sqlx::query(
            "UPDATE projects SET current_amount = ?1 WHERE address = ?2 AND current_amount = ?3",
        )
        .bind(to_column(project.current_amount))
        .bind(project_address.to_string())
        .bind(to_column(previous_amount))
        .execute(&mut *tx)
        .await
        .map_err(store_err)?
        .rows_affected();
        if updated != 1 {
            return Err(LedgerError::Store(format!(
                "project {project_address} changed during the donation"
            )));
        }

        let inserted = sqlx::query(
            r#"
            INSERT OR IGNORE INTO donation_receipts
                (address, donor, project, amount, timestamp, refunded, bump)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(receipt_address.to_string())
        .bind(receipt.user.to_string())
        .bind(receipt.project.to_string())
        .bind(to_column(receipt.amount))
        .bind(receipt.timestamp)
        .bind(receipt.refunded)
        .bind(i64::from(receipt.bump))
        .execute(&mut *tx)
        .await
        .map_err(store_err)?
        .rows_affected();
        if inserted != 1 {
            return Err(LedgerError::DuplicateDonation(*receipt_address));
        }

        tx.commit().await.map_err(store_err)?;
        debug!("sqlite store: receipt inserted at {receipt_address}");
        Ok((project, receipt))
    }
}
