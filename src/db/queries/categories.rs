use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: i64,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
}

pub async fn get_all_categories(pool: &SqlitePool) -> sqlx::Result<Vec<Category>> {
    sqlx::query_as::<_, Category>(
        r#"
        SELECT id, type FROM categories ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
}

/// Makes the table match `categories`: rows missing from the input are
/// removed, the rest are inserted or overwritten by id.
pub async fn import_categories(pool: &SqlitePool, categories: Vec<Category>) -> sqlx::Result<()> {
    let mut tx = pool.begin().await?;

    let existing_ids: HashSet<i64> = sqlx::query_scalar::<_, i64>("SELECT id FROM categories")
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .collect();
    let new_ids: HashSet<i64> = categories.iter().map(|c| c.id).collect();

    for id in existing_ids.difference(&new_ids) {
        sqlx::query("DELETE FROM categories WHERE categories.id = ?1")
            .bind(*id)
            .execute(&mut *tx)
            .await?;
    }
    for category in categories {
        sqlx::query(
            r#"
            INSERT INTO categories (id, type) VALUES (?1, ?2)
            ON CONFLICT (id) DO UPDATE SET type = excluded.type
            "#,
        )
        .bind(category.id)
        .bind(category.kind)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn category(id: i64, kind: &str) -> Category {
        Category {
            id,
            kind: kind.to_owned(),
        }
    }

    #[tokio::test]
    async fn empty_table_lists_nothing() {
        let pool = test_pool().await;
        assert!(get_all_categories(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn import_replaces_existing_rows() {
        let pool = test_pool().await;
        import_categories(&pool, vec![category(3, "Geography"), category(1, "Science")])
            .await
            .unwrap();
        assert_eq!(
            get_all_categories(&pool).await.unwrap(),
            vec![category(1, "Science"), category(3, "Geography")]
        );

        import_categories(&pool, vec![category(3, "Geo"), category(5, "Sports")])
            .await
            .unwrap();
        assert_eq!(
            get_all_categories(&pool).await.unwrap(),
            vec![category(3, "Geo"), category(5, "Sports")]
        );
    }

    #[test]
    fn category_serializes_type_label() {
        let value = serde_json::to_value(category(1, "Science")).unwrap();
        assert_eq!(value, serde_json::json!({"id": 1, "type": "Science"}));
    }
}
