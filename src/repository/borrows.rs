//! Borrow ledger repository for PostgreSQL

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use super::BorrowRepository;
use crate::{
    error::AppResult,
    models::book::is_available,
    models::{Borrow, BorrowOutcome, BorrowSummary, BorrowedBook, NewBorrow},
};

#[derive(Clone)]
pub struct PgBorrowRepository {
    pool: Pool<Postgres>,
}

impl PgBorrowRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BorrowRepository for PgBorrowRepository {
    async fn commit_borrow(&self, borrow: &NewBorrow) -> AppResult<BorrowOutcome> {
        let now = Utc::now();
        // Dropping `tx` without commit rolls the decrement back
        let mut tx = self.pool.begin().await?;

        let remaining: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE books
            SET copies = copies - $2
            WHERE id = $1 AND copies >= $2
            RETURNING copies
            "#,
        )
        .bind(borrow.book)
        .bind(borrow.quantity)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(remaining) = remaining else {
            let current: Option<i32> = sqlx::query_scalar("SELECT copies FROM books WHERE id = $1")
                .bind(borrow.book)
                .fetch_optional(&mut *tx)
                .await?;

            return Ok(match current {
                None => BorrowOutcome::BookMissing,
                Some(available) => BorrowOutcome::Insufficient { available },
            });
        };

        sqlx::query("UPDATE books SET available = $2, updated_at = $3 WHERE id = $1")
            .bind(borrow.book)
            .bind(is_available(remaining))
            .bind(now)
            .execute(&mut *tx)
            .await?;

        let record = sqlx::query_as::<_, Borrow>(
            r#"
            INSERT INTO borrows (id, book_id, quantity, due_date, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(borrow.book)
        .bind(borrow.quantity)
        .bind(borrow.due_date)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(BorrowOutcome::Committed {
            borrow: record,
            remaining,
        })
    }

    async fn summary(&self) -> AppResult<Vec<BorrowSummary>> {
        // Inner join: rows pointing at deleted books are left out
        let rows = sqlx::query(
            r#"
            SELECT b.title, b.isbn, SUM(br.quantity)::bigint AS total_quantity
            FROM borrows br
            JOIN books b ON b.id = br.book_id
            GROUP BY b.id, b.title, b.isbn
            ORDER BY b.title, b.isbn
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| BorrowSummary {
                book: BorrowedBook {
                    title: row.get("title"),
                    isbn: row.get("isbn"),
                },
                total_quantity: row.get("total_quantity"),
            })
            .collect())
    }
}
