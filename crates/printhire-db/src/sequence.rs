//! # Challan Sequences
//!
//! Allocates the per-kind, per-year sequence number behind every challan.
//!
//! ## Why the Upsert Comes First
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Creator A (tx)                       Creator B (tx)                    │
//! │  ─────────────                        ─────────────                     │
//! │  BEGIN                                BEGIN                             │
//! │  UPSERT (rental, 2025) ─► 7           UPSERT (rental, 2025)             │
//! │    └─ holds write lock                  └─ waits (busy_timeout)         │
//! │  INSERT rental "ZC/007/25-26"                │                          │
//! │  UPDATE units ...                            │                          │
//! │  COMMIT ─────────────────────────────────────┘                          │
//! │                                       ─► 8                              │
//! │                                       INSERT rental "AC/008/25-26"      │
//! │                                       COMMIT                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The counter row is written before anything is read, so the transaction
//! owns SQLite's write lock from its first statement. A second creator blocks
//! on the upsert and then sees the committed value. A rolled-back creator
//! also rolls back its bump, so no gap is left behind. Deleting a document
//! does not lower the counter; its number is never handed out again.

use printhire_core::DocumentKind;
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Bumps and returns the sequence for `(kind, year)`, starting at 1.
///
/// Must run inside the caller's transaction, before any read that feeds the
/// document being created.
pub async fn next_challan(
    conn: &mut SqliteConnection,
    kind: DocumentKind,
    year: i32,
) -> DbResult<u32> {
    let seq: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO challan_sequences (kind, year, last_seq)
        VALUES (?1, ?2, 1)
        ON CONFLICT (kind, year) DO UPDATE SET last_seq = last_seq + 1
        RETURNING last_seq
        "#,
    )
    .bind(kind.as_str())
    .bind(year)
    .fetch_one(&mut *conn)
    .await?;

    let seq = u32::try_from(seq)
        .map_err(|_| DbError::Internal(format!("{} sequence for {} overflowed: {}", kind, year, seq)))?;

    debug!(kind = %kind, year, seq, "Allocated challan sequence");
    Ok(seq)
}
