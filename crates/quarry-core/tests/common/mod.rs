#![allow(dead_code)]

use quarry_core::schema::{ColumnDef, SqlType, Table};
use quarry_core::{Column, SqlValue};
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqlitePool, SqlitePoolOptions};
use sqlx::Sqlite;

/// The bookstore schema used across the integration tests.
pub struct Library {
    pub authors: Table,
    pub books: Table,
}

impl Library {
    pub fn author(&self, name: &str) -> Column {
        self.authors
            .col(name)
            .unwrap_or_else(|e| panic!("authors.{name}: {e}"))
    }

    pub fn book(&self, name: &str) -> Column {
        self.books
            .col(name)
            .unwrap_or_else(|e| panic!("books.{name}: {e}"))
    }
}

pub fn library() -> Library {
    let authors = Table::builder("authors")
        .column(ColumnDef::new("id", SqlType::BigInt))
        .column(ColumnDef::new("name", SqlType::Varchar(Some(100))))
        .column(ColumnDef::new("country", SqlType::Text).nullable())
        .build()
        .expect("authors table");
    let books = Table::builder("books")
        .column(ColumnDef::new("id", SqlType::BigInt))
        .column(ColumnDef::new("author_id", SqlType::BigInt))
        .column(ColumnDef::new("title", SqlType::Varchar(Some(200))))
        .column(ColumnDef::new("price", SqlType::Double).nullable())
        .column(ColumnDef::new("pages", SqlType::Integer).default(0))
        .column(ColumnDef::new("in_print", SqlType::Boolean).default(true))
        .column(ColumnDef::new("published", SqlType::Timestamp).nullable())
        .column(ColumnDef::new("tags", SqlType::Json).nullable())
        .build()
        .expect("books table");
    Library { authors, books }
}

const SCHEMA: &[&str] = &[
    "CREATE TABLE authors (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        country TEXT
    )",
    "CREATE TABLE books (
        id INTEGER PRIMARY KEY,
        author_id INTEGER NOT NULL REFERENCES authors(id),
        title TEXT NOT NULL,
        price REAL,
        pages INTEGER NOT NULL DEFAULT 0,
        in_print BOOLEAN NOT NULL DEFAULT 1,
        published TEXT,
        tags TEXT
    )",
];

const SEED: &[&str] = &[
    "INSERT INTO authors (id, name, country) VALUES
        (1, 'Ursula K. Le Guin', 'US'),
        (2, 'Stanislaw Lem', 'PL'),
        (3, 'Anonymous', NULL)",
    "INSERT INTO books (id, author_id, title, price, pages, in_print) VALUES
        (1, 1, 'A Wizard of Earthsea', 9.5, 183, 1),
        (2, 1, 'The Dispossessed', 12.0, 387, 1),
        (3, 2, 'Solaris', 11.25, 204, 1),
        (4, 2, 'The Cyberiad', NULL, 295, 0),
        (5, 3, 'Beowulf', 4.0, 120, 1)",
];

/// A single-connection in-memory database with the schema and seed rows.
pub async fn seeded_pool() -> SqlitePool {
    // One connection: every in-memory connection is its own database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    for statement in SCHEMA.iter().chain(SEED) {
        sqlx::query(statement)
            .execute(&pool)
            .await
            .unwrap_or_else(|e| panic!("setup failed: {e}\n{statement}"));
    }
    pool
}

/// Binds compiled parameters in order.
pub fn bind_params<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    params: Vec<SqlValue>,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for value in params {
        query = match value {
            SqlValue::Null => query.bind(Option::<i64>::None),
            SqlValue::Bool(b) => query.bind(b),
            SqlValue::Int(i) => query.bind(i),
            SqlValue::Float(f) => query.bind(f),
            SqlValue::Text(s) => query.bind(s),
            SqlValue::Blob(b) => query.bind(b),
            SqlValue::Timestamp(t) => query.bind(t),
        };
    }
    query
}
