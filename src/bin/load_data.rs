// src/bin/load_data.rs
// DOCUMENTATION: Import CSV fixtures into the database
// PURPOSE: `load-data Category Genre Title GenreTitle User Review Comment`

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use csv::StringRecord;
use sqlx::PgPool;
use std::path::{Path, PathBuf};
use yamdb::config::{self, Config};

#[derive(Parser, Debug)]
#[command(author, version, about = "Load CSV fixtures into the yamdb database")]
struct Args {
    /// Models to import, in dependency order
    #[arg(required = true)]
    models: Vec<String>,

    /// Directory with the CSV files (defaults to DATA_DIR)
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

/// A table column fed from one of several CSV headers
struct Column {
    name: &'static str,
    sql_type: &'static str,
    headers: &'static [&'static str],
}

const fn column(
    name: &'static str,
    sql_type: &'static str,
    headers: &'static [&'static str],
) -> Column {
    Column {
        name,
        sql_type,
        headers,
    }
}

struct Model {
    name: &'static str,
    file: &'static str,
    table: &'static str,
    columns: &'static [Column],
}

const MODELS: &[Model] = &[
    Model {
        name: "Category",
        file: "category.csv",
        table: "categories",
        columns: &[
            column("id", "bigint", &["id"]),
            column("name", "text", &["name"]),
            column("slug", "text", &["slug"]),
        ],
    },
    Model {
        name: "Genre",
        file: "genre.csv",
        table: "genres",
        columns: &[
            column("id", "bigint", &["id"]),
            column("name", "text", &["name"]),
            column("slug", "text", &["slug"]),
        ],
    },
    Model {
        name: "Title",
        file: "titles.csv",
        table: "titles",
        columns: &[
            column("id", "bigint", &["id"]),
            column("name", "text", &["name"]),
            column("year", "integer", &["year"]),
            column("description", "text", &["description"]),
            column("category_id", "bigint", &["category", "category_id"]),
        ],
    },
    Model {
        name: "GenreTitle",
        file: "genre_title.csv",
        table: "genre_title",
        columns: &[
            column("id", "bigint", &["id"]),
            column("genre_id", "bigint", &["genre", "genre_id"]),
            column("title_id", "bigint", &["title", "title_id"]),
        ],
    },
    Model {
        name: "User",
        file: "users.csv",
        table: "users",
        columns: &[
            column("id", "bigint", &["id"]),
            column("username", "text", &["username"]),
            column("email", "text", &["email"]),
            column("role", "text", &["role"]),
            column("bio", "text", &["bio"]),
            column("first_name", "text", &["first_name"]),
            column("last_name", "text", &["last_name"]),
        ],
    },
    Model {
        name: "Review",
        file: "review.csv",
        table: "reviews",
        columns: &[
            column("id", "bigint", &["id"]),
            column("title_id", "bigint", &["title", "title_id"]),
            column("author_id", "bigint", &["author", "author_id"]),
            column("text", "text", &["text"]),
            column("score", "smallint", &["score"]),
            column("pub_date", "timestamptz", &["pub_date"]),
        ],
    },
    Model {
        name: "Comment",
        file: "comments.csv",
        table: "comments",
        columns: &[
            column("id", "bigint", &["id"]),
            column("review_id", "bigint", &["review", "review_id"]),
            column("author_id", "bigint", &["author", "author_id"]),
            column("text", "text", &["text"]),
            column("pub_date", "timestamptz", &["pub_date"]),
        ],
    },
];

fn find_model(name: &str) -> Option<&'static Model> {
    MODELS.iter().find(|m| m.name.eq_ignore_ascii_case(name))
}

/// Non-empty cells of a row, keyed by the column they fill
fn row_values<'m>(
    model: &'m Model,
    headers: &StringRecord,
    record: &StringRecord,
) -> Vec<(&'m Column, String)> {
    model
        .columns
        .iter()
        .filter_map(|col| {
            col.headers
                .iter()
                .filter_map(|h| headers.iter().position(|header| header == *h))
                .filter_map(|idx| record.get(idx))
                .map(str::trim)
                .find(|value| !value.is_empty())
                .map(|value| (col, value.to_string()))
        })
        .collect()
}

fn insert_sql(table: &str, values: &[(&Column, String)]) -> String {
    let columns: Vec<&str> = values.iter().map(|(c, _)| c.name).collect();
    let params: Vec<String> = values
        .iter()
        .enumerate()
        .map(|(i, (c, _))| format!("${}::{}", i + 1, c.sql_type))
        .collect();

    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        columns.join(", "),
        params.join(", ")
    )
}

async fn import(pool: &PgPool, model: &Model, path: &Path) -> Result<u64> {
    let mut reader =
        csv::Reader::from_path(path).with_context(|| format!("opening {}", path.display()))?;
    let headers = reader.headers()?.clone();

    let mut tx = pool.begin().await?;
    let mut imported = 0u64;

    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("{} row {}", path.display(), line + 1))?;
        let values = row_values(model, &headers, &record);
        if values.is_empty() {
            continue;
        }

        let sql = insert_sql(model.table, &values);
        let mut query = sqlx::query(&sql);
        for (_, value) in &values {
            query = query.bind(value);
        }
        query
            .execute(&mut *tx)
            .await
            .with_context(|| format!("{} row {}", model.name, line + 1))?;

        log::info!(
            "{}: {}",
            model.name,
            values
                .iter()
                .map(|(c, v)| format!("{}={}", c.name, v))
                .collect::<Vec<_>>()
                .join(", ")
        );
        imported += 1;
    }

    // Explicit ids leave the sequence behind
    let reset = format!(
        "SELECT setval(pg_get_serial_sequence('{table}', 'id'), \
         COALESCE((SELECT MAX(id) FROM {table}), 0) + 1, false)",
        table = model.table
    );
    sqlx::query(&reset).execute(&mut *tx).await?;

    tx.commit().await?;
    Ok(imported)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let args = Args::parse();
    let config = Config::from_env();
    let data_dir = args
        .data_dir
        .unwrap_or_else(|| PathBuf::from(&config.data_dir));

    let models = args
        .models
        .iter()
        .map(|name| find_model(name).ok_or_else(|| anyhow!("Model {} does not exist", name)))
        .collect::<Result<Vec<_>>>()?;

    for model in &models {
        let path = data_dir.join(model.file);
        if !path.is_file() {
            bail!("Data file for {} not found: {}", model.name, path.display());
        }
    }

    let pool = config::init_db_pool(&config)
        .await
        .context("connecting to database")?;
    config::run_migrations(&pool)
        .await
        .context("applying migrations")?;

    for model in models {
        let count = import(&pool, model, &data_dir.join(model.file)).await?;
        log::info!("{} rows written to {}", count, model.table);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_models_resolve_case_insensitively() {
        assert_eq!(find_model("genretitle").map(|m| m.table), Some("genre_title"));
        assert_eq!(find_model("Review").map(|m| m.file), Some("review.csv"));
        assert!(find_model("Place").is_none());
    }

    #[test]
    fn test_row_values_skip_empty_cells_and_map_relations() {
        let model = find_model("User").unwrap();
        let headers = StringRecord::from(vec![
            "id", "username", "email", "role", "bio", "first_name", "last_name",
        ]);
        let record = StringRecord::from(vec![
            "100", "bingobongo", "b@yamdb.fake", "user", "", "", "",
        ]);

        let values = row_values(model, &headers, &record);
        let names: Vec<&str> = values.iter().map(|(c, _)| c.name).collect();
        assert_eq!(names, vec!["id", "username", "email", "role"]);

        let review = find_model("Review").unwrap();
        let headers = StringRecord::from(vec!["id", "title_id", "text", "author", "score"]);
        let record = StringRecord::from(vec!["1", "1", "Good", "100", "8"]);
        let values = row_values(review, &headers, &record);
        assert!(values
            .iter()
            .any(|(c, v)| c.name == "author_id" && v == "100"));
    }

    #[test]
    fn test_insert_sql_casts_parameters() {
        let model = find_model("Category").unwrap();
        let headers = StringRecord::from(vec!["id", "name", "slug"]);
        let record = StringRecord::from(vec!["1", "Movie", "movie"]);
        let values = row_values(model, &headers, &record);

        assert_eq!(
            insert_sql(model.table, &values),
            "INSERT INTO categories (id, name, slug) VALUES ($1::bigint, $2::text, $3::text)"
        );
    }

    #[test]
    fn test_bundled_fixtures_cover_every_model() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("static/data");
        for model in MODELS {
            let path = dir.join(model.file);
            let mut reader = csv::Reader::from_path(&path).unwrap();
            let headers = reader.headers().unwrap().clone();
            let first = reader.records().next().unwrap().unwrap();
            assert!(
                row_values(model, &headers, &first)
                    .iter()
                    .any(|(c, _)| c.name == "id"),
                "{}",
                model.file
            );
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_import_bundled_fixtures_and_reset_sequences(pool: PgPool) {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("static/data");
        for model in MODELS {
            let imported = import(&pool, model, &dir.join(model.file)).await.unwrap();
            assert!(imported > 0, "{}", model.name);
        }

        let (rating,): (Option<i32>,) = sqlx::query_as(
            "SELECT TRUNC(AVG(score))::INTEGER FROM reviews WHERE title_id = 1",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(rating, Some(7));

        let (user_id,): (i64,) = sqlx::query_as(
            "INSERT INTO users (username, email) VALUES ('fresh', 'fresh@yamdb.test') RETURNING id",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(user_id, 103);

        let (category_id,): (i64,) = sqlx::query_as(
            "INSERT INTO categories (name, slug) VALUES ('Poetry', 'poetry') RETURNING id",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(category_id, 4);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_failed_import_rolls_back(pool: PgPool) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("review.csv");
        std::fs::write(&path, "id,title_id,text,author,score\n1,999,Orphan,1,5\n").unwrap();

        let review = find_model("Review").unwrap();
        assert!(import(&pool, review, &path).await.is_err());

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM reviews")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
