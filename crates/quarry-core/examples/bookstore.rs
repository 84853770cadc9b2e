//! Builds a few bookstore statements, prints them for two dialects and
//! runs them against an in-memory SQLite database.
//!
//! ```sh
//! cargo run -p quarry-core --example bookstore
//! cargo run -p quarry-core --example bookstore -- --verbose
//! ```

use quarry_core::builder::{Insert, InsertRow, Select, Update};
use quarry_core::dialect::{DialectConfig, DialectKind, PostgresDialect, SqliteDialect};
use quarry_core::expr::{avg, count_all};
use quarry_core::{Column, ColumnDef, Compile, SqlType, SqlValue, Table};
use sqlx::sqlite::{SqliteArguments, SqlitePoolOptions};
use sqlx::{query::Query, Row, Sqlite};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn bind<'q>(
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

fn col(table: &Table, name: &str) -> Result<Column, BoxError> {
    Ok(table.col(name)?)
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let verbose = std::env::args().any(|a| a == "--verbose");
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if verbose { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let books = Table::builder("books")
        .column(ColumnDef::new("id", SqlType::BigInt))
        .column(ColumnDef::new("title", SqlType::Varchar(Some(200))))
        .column(ColumnDef::new("genre", SqlType::Text))
        .column(ColumnDef::new("price", SqlType::Double).nullable())
        .column(ColumnDef::new("stock", SqlType::Integer).default(0))
        .build()?;
    let (id, title, genre, price, stock) = (
        col(&books, "id")?,
        col(&books, "title")?,
        col(&books, "genre")?,
        col(&books, "price")?,
        col(&books, "stock")?,
    );

    let insert = Insert::from_rows(
        &books,
        [
            ("Dune", "sf", 9.99),
            ("Neuromancer", "sf", 8.5),
            ("Emma", "classic", 5.0),
            ("Middlemarch", "classic", 7.25),
        ]
        .into_iter()
        .zip(1_i64..)
        .map(|((t, g, p), n)| {
            InsertRow::new()
                .set(&id, n)
                .set(&title, t)
                .set(&genre, g)
                .set(&price, p)
                .with_defaults(&books)
        }),
    )?;
    let restock = Update::table(&books)
        .set(&stock, stock.add(3)?)?
        .where_clause(genre.eq("sf")?)?;
    let by_genre = Select::from(&books)
        .column(&genre)?
        .expr_as(count_all(), "titles")?
        .expr_as(avg(&price)?, "avg_price")?
        .where_clause(title.ilike("%m%")?.or(stock.gt(0)?)?)?
        .group_by([&genre])?
        .order_by(genre.asc())?;

    for (label, statement) in [
        ("insert", insert.to_query(&PostgresDialect::new())),
        ("update", restock.to_query(&PostgresDialect::new())),
        ("select", by_genre.to_query(&PostgresDialect::new())),
    ] {
        println!("-- {label} (postgres)\n{}", serde_json::to_string_pretty(&statement)?);
    }

    // The same statements, for a dialect picked from configuration.
    let dialect = DialectConfig::new(DialectKind::Sqlite).into_dialect()?;
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    sqlx::query(
        "CREATE TABLE books (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            genre TEXT NOT NULL,
            price REAL,
            stock INTEGER NOT NULL DEFAULT 0
        )",
    )
    .execute(&pool)
    .await?;

    for statement in [&insert as &dyn Compile, &restock] {
        let (sql, params) = statement.compile(&*dialect);
        let done = bind(sqlx::query(&sql), params).execute(&pool).await?;
        info!(rows = done.rows_affected(), "{sql}");
    }

    let (sql, params) = by_genre.compile(&SqliteDialect::new());
    for row in bind(sqlx::query(&sql), params).fetch_all(&pool).await? {
        let genre: String = row.get(0);
        let titles: i64 = row.get(1);
        let avg_price: f64 = row.get(2);
        println!("{genre:<8} {titles} titles, average price {avg_price:.2}");
    }

    Ok(())
}
