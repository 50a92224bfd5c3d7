//! CSV export and import of the trivia tables, used to seed and back up a
//! database. A directory holds `categories.csv` and `questions.csv`.

use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::db::queries::categories::{get_all_categories, import_categories};
use crate::db::queries::questions::{get_all_questions, import_questions};
use crate::db::{Category, Question};

const CATEGORIES_FILE: &str = "categories.csv";
const QUESTIONS_FILE: &str = "questions.csv";

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Cannot create {}", path.display()))?;
    rows.iter().try_for_each(|row| writer.serialize(row))?;
    writer.flush()?;
    Ok(())
}

fn read_csv<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Cannot open {}", path.display()))?;
    reader
        .deserialize::<T>()
        .enumerate()
        .map(|(index, row)| {
            // header is line 1
            row.with_context(|| format!("Bad row at line {} of {}", index + 2, path.display()))
        })
        .collect()
}

pub async fn export_data(pool: &SqlitePool, dir: &Path) -> anyhow::Result<()> {
    let categories = get_all_categories(pool).await?;
    let questions = get_all_questions(pool).await?;
    std::fs::create_dir_all(dir).with_context(|| format!("Cannot create {}", dir.display()))?;
    tracing::info!(
        categories = categories.len(),
        questions = questions.len(),
        "Exporting to {}",
        dir.display()
    );
    write_csv(&dir.join(CATEGORIES_FILE), &categories)?;
    write_csv(&dir.join(QUESTIONS_FILE), &questions)?;
    Ok(())
}

/// Replaces the content of both tables with the CSV files in `dir`.
pub async fn import_data(pool: &SqlitePool, dir: &Path) -> anyhow::Result<()> {
    let categories: Vec<Category> = read_csv(&dir.join(CATEGORIES_FILE))?;
    let questions: Vec<Question> = read_csv(&dir.join(QUESTIONS_FILE))?;
    tracing::info!(
        categories = categories.len(),
        questions = questions.len(),
        "Importing from {}",
        dir.display()
    );
    import_categories(pool, categories).await?;
    import_questions(pool, questions).await?;
    Ok(())
}
