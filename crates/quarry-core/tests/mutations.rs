mod common;

use chrono::NaiveDate;
use common::library;
use quarry_core::builder::{Delete, Insert, InsertRow, Select, Update};
use quarry_core::expr::{exists, not_exists};
use quarry_core::dialect::{GenericDialect, MySqlDialect, PostgresDialect, SqliteDialect};
use quarry_core::{BuildError, Compile, Expr, SqlValue};
use serde_json::json;

#[test]
fn test_multi_row_insert_keeps_first_row_column_order() {
    let lib = library();
    let (id, name, country) = (lib.author("id"), lib.author("name"), lib.author("country"));
    let insert = Insert::into_table(&lib.authors)
        .values(InsertRow::new().set(&id, 10).set(&name, "Borges").set(&country, "AR"))
        .unwrap()
        .values(InsertRow::new().set(&country, None::<&str>).set(&name, "Homer").set(&id, 11))
        .unwrap();
    assert_eq!(insert.row_count(), 2);

    let (sql, params) = insert.compile(&PostgresDialect::new());
    assert_eq!(
        sql,
        r#"INSERT INTO "authors" ("id", "name", "country") VALUES ($1, $2, $3), ($4, $5, $6)"#
    );
    assert_eq!(
        params,
        vec![
            SqlValue::Int(10),
            SqlValue::Text(String::from("Borges")),
            SqlValue::Text(String::from("AR")),
            SqlValue::Int(11),
            SqlValue::Text(String::from("Homer")),
            SqlValue::Null,
        ]
    );
}

#[test]
fn test_insert_rejects_mismatched_rows() {
    let lib = library();
    let (id, name) = (lib.author("id"), lib.author("name"));
    let err = Insert::from_rows(
        &lib.authors,
        [
            InsertRow::new().set(&id, 1).set(&name, "a"),
            InsertRow::new().set(&id, 2),
        ],
    )
    .unwrap_err();
    assert_eq!(
        err,
        BuildError::ColumnSetMismatch {
            expected: vec![String::from("id"), String::from("name")],
            found: vec![String::from("id")],
        }
    );

    let err = Insert::from_rows(&lib.authors, Vec::new()).unwrap_err();
    assert!(matches!(err, BuildError::EmptyInsert { .. }));

    let err = Insert::into_table(&lib.authors)
        .values(InsertRow::new().set(&id, 1).set(&id, 2))
        .unwrap_err();
    assert!(matches!(err, BuildError::DuplicateColumn { .. }));
}

#[test]
fn test_insert_value_checks() {
    let lib = library();
    let (id, name) = (lib.author("id"), lib.author("name"));
    let into = || Insert::into_table(&lib.authors);

    assert_eq!(
        into()
            .values(InsertRow::new().set(&id, 1).set(&name, None::<&str>))
            .unwrap_err(),
        BuildError::NotNullable {
            column: String::from("authors.name"),
        }
    );
    assert!(matches!(
        into().values(InsertRow::new().set(&id, "one")).unwrap_err(),
        BuildError::TypeMismatch { .. }
    ));
    assert!(matches!(
        into()
            .values(InsertRow::new().set(&lib.book("id"), 1))
            .unwrap_err(),
        BuildError::UnboundColumn { .. }
    ));
    assert!(matches!(
        into().values(InsertRow::new()).unwrap_err(),
        BuildError::EmptyAssignment { .. }
    ));
}

#[test]
fn test_insert_expression_values_are_checked_like_raw_values() {
    let lib = library();
    let (id, name) = (lib.author("id"), lib.author("name"));
    let into = || Insert::into_table(&lib.authors);

    // An untyped literal is encoded with the column type.
    assert!(matches!(
        into()
            .values(InsertRow::new().set(&id, Expr::value("not a number")))
            .unwrap_err(),
        BuildError::TypeMismatch { .. }
    ));
    assert!(matches!(
        into()
            .values(InsertRow::new().set(&name, Expr::value("x".repeat(101))))
            .unwrap_err(),
        BuildError::ValueOutOfRange { .. }
    ));
    // A computed value must produce the column's type class.
    assert_eq!(
        into()
            .values(InsertRow::new().set(&id, 1).set(&name, Expr::value(1).add(2).unwrap()))
            .unwrap_err(),
        BuildError::TypeMismatch {
            context: String::from("VALUES for authors.name"),
            expected: String::from("text"),
            found: String::from("numeric"),
        }
    );

    let insert = into()
        .values(InsertRow::new().set(&id, Expr::value(7)).set(&name, Expr::value("Ovid")))
        .unwrap();
    assert_eq!(
        insert.compile(&GenericDialect::new()).1,
        vec![SqlValue::Int(7), SqlValue::Text(String::from("Ovid"))]
    );
}

#[test]
fn test_insert_with_defaults_and_rich_values() {
    let lib = library();
    let published = NaiveDate::from_ymd_opt(1961, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap();
    let row = InsertRow::new()
        .set(&lib.book("id"), 6)
        .set(&lib.book("author_id"), 2)
        .set(&lib.book("title"), "Return from the Stars")
        .set(&lib.book("published"), published)
        .set(&lib.book("tags"), json!(["sf", "classic"]))
        .with_defaults(&lib.books);
    let insert = Insert::into_table(&lib.books)
        .values(row)
        .unwrap()
        .returning([&lib.book("id")])
        .unwrap();

    let (sql, params) = insert.compile(&SqliteDialect::new());
    assert_eq!(
        sql,
        concat!(
            r#"INSERT INTO "books" ("id", "author_id", "title", "published", "tags", "pages", "in_print") "#,
            r#"VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING "id""#
        )
    );
    assert_eq!(params[3], SqlValue::Timestamp(published));
    assert_eq!(
        params[4],
        SqlValue::Text(String::from(r#"["sf","classic"]"#))
    );
    assert_eq!(&params[5..], &[SqlValue::Int(0), SqlValue::Bool(true)]);
}

#[test]
fn test_update_with_column_arithmetic() {
    let lib = library();
    let (price, pages, id) = (lib.book("price"), lib.book("pages"), lib.book("id"));
    let update = Update::table(&lib.books)
        .set(&price, price.mul(1.1).unwrap())
        .unwrap()
        .set(&pages, pages.add(10).unwrap())
        .unwrap()
        .where_clause(id.in_list([1, 2]).unwrap())
        .unwrap();
    let (sql, params) = update.compile(&PostgresDialect::new());
    assert_eq!(
        sql,
        r#"UPDATE "books" SET "price" = "price" * $1, "pages" = "pages" + $2 WHERE "id" IN ($3, $4)"#
    );
    assert_eq!(
        params,
        vec![
            SqlValue::Float(1.1),
            SqlValue::Int(10),
            SqlValue::Int(1),
            SqlValue::Int(2),
        ]
    );
}

#[test]
fn test_update_reassignment_keeps_position() {
    let lib = library();
    let (title, pages) = (lib.book("title"), lib.book("pages"));
    let update = Update::table(&lib.books)
        .set(&title, "draft")
        .unwrap()
        .set(&pages, 1)
        .unwrap()
        .set(&title, "final")
        .unwrap();
    let (sql, params) = update.compile(&GenericDialect::new());
    assert_eq!(sql, r#"UPDATE "books" SET "title" = ?, "pages" = ?"#);
    assert_eq!(
        params,
        vec![SqlValue::Text(String::from("final")), SqlValue::Int(1)]
    );
}

#[test]
fn test_update_checks() {
    let lib = library();
    let title = lib.book("title");
    assert!(matches!(
        Update::table(&lib.books)
            .set(&lib.author("name"), "x")
            .unwrap_err(),
        BuildError::UnboundColumn { .. }
    ));
    assert!(matches!(
        Update::table(&lib.books).set(&title, 5).unwrap_err(),
        BuildError::TypeMismatch { .. }
    ));
    assert!(matches!(
        Update::table(&lib.books)
            .set(&title, lib.book("pages").add(1).unwrap())
            .unwrap_err(),
        BuildError::TypeMismatch { .. }
    ));
    assert!(matches!(
        Update::with_assignments(&lib.books, Vec::<(quarry_core::Column, i64)>::new())
            .unwrap_err(),
        BuildError::EmptyAssignment { .. }
    ));
}

#[test]
fn test_update_returning_on_mysql_still_renders() {
    let lib = library();
    let price = lib.book("price");
    let update = Update::with_assignments(&lib.books, [(price.clone(), None::<f64>)])
        .unwrap()
        .where_clause(lib.book("in_print").eq(false).unwrap())
        .unwrap()
        .returning([&lib.book("id")])
        .unwrap();
    let (sql, params) = update.compile(&MySqlDialect::new());
    assert_eq!(
        sql,
        "UPDATE `books` SET `price` = ? WHERE `in_print` = ? RETURNING `id`"
    );
    assert_eq!(params, vec![SqlValue::Null, SqlValue::Bool(false)]);
}

#[test]
fn test_delete_requires_filter_or_confirmation() {
    let lib = library();
    let filtered = Delete::from(&lib.books)
        .where_clause(lib.book("price").is_null())
        .unwrap()
        .where_clause(lib.book("pages").lt(300).unwrap())
        .unwrap();
    let (sql, params) = filtered.compile(&PostgresDialect::new());
    assert_eq!(
        sql,
        r#"DELETE FROM "books" WHERE "price" IS NULL AND "pages" < $1"#
    );
    assert_eq!(params, vec![SqlValue::Int(300)]);

    let everything = Delete::from(&lib.authors).all_rows();
    assert_eq!(
        everything.compile(&GenericDialect::new()).0,
        r#"DELETE FROM "authors""#
    );

    assert!(matches!(
        Delete::from(&lib.books)
            .where_clause(lib.author("id").eq(1).unwrap())
            .unwrap_err(),
        BuildError::UnboundColumn { .. }
    ));
}

#[test]
fn test_mutation_subqueries_must_correlate_with_the_target() {
    let lib = library();
    let written_by_author = |outer: &quarry_core::Table| {
        Select::from(&lib.books)
            .correlate(outer)
            .where_clause(
                lib.book("author_id")
                    .eq(outer.col("id").unwrap())
                    .unwrap(),
            )
            .unwrap()
    };

    let orphans = Delete::from(&lib.authors)
        .where_clause(not_exists(written_by_author(&lib.authors)))
        .unwrap();
    assert_eq!(
        orphans.compile(&GenericDialect::new()).0,
        concat!(
            r#"DELETE FROM "authors" WHERE NOT EXISTS (SELECT "books"."id", "books"."author_id", "#,
            r#""books"."title", "books"."price", "books"."pages", "books"."in_print", "#,
            r#""books"."published", "books"."tags" FROM "books" "#,
            r#"WHERE "books"."author_id" = "authors"."id")"#
        )
    );

    // The subquery reaches for "authors", which an UPDATE of "books" lacks.
    let err = Update::table(&lib.books)
        .set(&lib.book("in_print"), false)
        .unwrap()
        .where_clause(exists(written_by_author(&lib.authors)))
        .unwrap_err();
    assert_eq!(
        err,
        BuildError::UnboundColumn {
            column: String::from("id"),
            table: String::from("authors"),
        }
    );
}

#[test]
fn test_aliased_target_declares_its_alias() {
    let lib = library();
    let mine = lib.books.aliased("mine");
    let other = lib.books.aliased("other");
    let cheaper_elsewhere = Select::from(&other)
        .correlate(&mine)
        .where_clause(
            other
                .col("title")
                .unwrap()
                .eq(mine.col("title").unwrap())
                .unwrap()
                .and(other.col("price").unwrap().lt(mine.col("price").unwrap()).unwrap())
                .unwrap(),
        )
        .unwrap();
    let delete = Delete::from(&mine)
        .where_clause(exists(cheaper_elsewhere))
        .unwrap();
    let sql = delete.compile(&SqliteDialect::new()).0;
    assert!(sql.starts_with(r#"DELETE FROM "books" AS "mine" WHERE EXISTS"#));
    assert!(sql.ends_with(r#""other"."price" < "mine"."price")"#));
}
