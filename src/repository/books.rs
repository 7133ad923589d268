//! Books repository for PostgreSQL

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::{map_unique_violation, BookRepository};
use crate::{
    error::{AppError, AppResult},
    models::book::BookRow,
    models::{Book, BookListQuery, BookPatch, NewBook},
};

#[derive(Clone)]
pub struct PgBookRepository {
    pool: Pool<Postgres>,
}

impl PgBookRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepository for PgBookRepository {
    async fn create(&self, book: &NewBook) -> AppResult<Book> {
        let book = book.clone().into_book(Uuid::new_v4(), Utc::now());

        let row = sqlx::query_as::<_, BookRow>(
            r#"
            INSERT INTO books (id, title, author, genre, isbn, description, copies, available, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING *
            "#,
        )
        .bind(book.id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.genre.as_str())
        .bind(&book.isbn)
        .bind(&book.description)
        .bind(book.copies)
        .bind(book.available)
        .bind(book.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "isbn", &book.isbn))?;

        row.try_into()
    }

    async fn get(&self, id: Uuid) -> AppResult<Book> {
        sqlx::query_as::<_, BookRow>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(AppError::book_not_found)?
            .try_into()
    }

    async fn list(&self, query: &BookListQuery) -> AppResult<Vec<Book>> {
        // Column and direction come from closed enums, never from user text
        let sql = format!(
            "SELECT * FROM books WHERE ($1::text IS NULL OR genre = $1) ORDER BY {col} {dir}, id {dir} LIMIT $2",
            col = query.sort_by.column(),
            dir = query.direction.sql(),
        );

        let rows = sqlx::query_as::<_, BookRow>(&sql)
            .bind(query.genre.map(|g| g.as_str()))
            .bind(query.limit)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Book::try_from).collect()
    }

    async fn update(&self, id: Uuid, patch: &BookPatch) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        // Row lock: a concurrent borrow waits for this merge instead of being overwritten
        let mut book: Book = sqlx::query_as::<_, BookRow>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(AppError::book_not_found)?
            .try_into()?;

        book.apply_patch(patch, Utc::now());

        let row = sqlx::query_as::<_, BookRow>(
            r#"
            UPDATE books
            SET title = $2, author = $3, genre = $4, isbn = $5, description = $6,
                copies = $7, available = $8, updated_at = $9
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.genre.as_str())
        .bind(&book.isbn)
        .bind(&book.description)
        .bind(book.copies)
        .bind(book.available)
        .bind(book.updated_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, "isbn", &book.isbn))?;

        tx.commit().await?;
        row.try_into()
    }

    async fn delete(&self, id: Uuid, cascade_borrows: bool) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::book_not_found());
        }

        if cascade_borrows {
            sqlx::query("DELETE FROM borrows WHERE book_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_many(&self, ids: &[Uuid], cascade_borrows: bool) -> AppResult<u64> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM books WHERE id = ANY($1)")
            .bind(ids)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if cascade_borrows {
            sqlx::query("DELETE FROM borrows WHERE book_id = ANY($1)")
                .bind(ids)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(deleted)
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
