use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub category: i64,
    pub difficulty: i64,
}

pub async fn count_questions(pool: &SqlitePool) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM questions")
        .fetch_one(pool)
        .await
}

pub async fn get_all_questions(pool: &SqlitePool) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty FROM questions ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn get_questions_page(
    pool: &SqlitePool,
    limit: i64,
    offset: i64,
) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty FROM questions
        ORDER BY id LIMIT ?1 OFFSET ?2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn get_questions_for_category_page(
    pool: &SqlitePool,
    category: i64,
    limit: i64,
    offset: i64,
) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty FROM questions
        WHERE questions.category = ?1
        ORDER BY id LIMIT ?2 OFFSET ?3
        "#,
    )
    .bind(category)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn get_question_by_id(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty FROM questions WHERE questions.id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Case-insensitive substring match on the question text, ordered by id.
/// SQLite's `LOWER` and `LIKE` only fold ASCII, so matching happens here.
pub async fn search_questions(pool: &SqlitePool, term: &str) -> sqlx::Result<Vec<Question>> {
    let needle = term.to_lowercase();
    let found = get_all_questions(pool)
        .await?
        .into_iter()
        .filter(|q| q.question.to_lowercase().contains(&needle))
        .collect();
    Ok(found)
}

pub async fn create_question(
    pool: &SqlitePool,
    question: &str,
    answer: &str,
    category: i64,
    difficulty: i64,
) -> sqlx::Result<i64> {
    let id = sqlx::query(
        r#"
        INSERT INTO questions (question, answer, category, difficulty) VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(question)
    .bind(answer)
    .bind(category)
    .bind(difficulty)
    .execute(pool)
    .await?
    .last_insert_rowid();

    Ok(id)
}

/// Returns the number of deleted rows.
pub async fn delete_question(pool: &SqlitePool, id: i64) -> sqlx::Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM questions WHERE questions.id = ?1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

/// Picks one question at random, optionally restricted to `category`, whose
/// id is not in `excluded`.
pub async fn random_question(
    pool: &SqlitePool,
    category: Option<i64>,
    excluded: &[i64],
) -> sqlx::Result<Option<Question>> {
    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT id, question, answer, category, difficulty FROM questions WHERE 1 = 1",
    );
    if let Some(category) = category {
        query.push(" AND questions.category = ").push_bind(category);
    }
    if !excluded.is_empty() {
        query.push(" AND questions.id NOT IN (");
        let mut ids = query.separated(", ");
        for id in excluded {
            ids.push_bind(*id);
        }
        ids.push_unseparated(")");
    }
    query.push(" ORDER BY RANDOM() LIMIT 1");

    query
        .build_query_as::<Question>()
        .fetch_optional(pool)
        .await
}

/// Makes the table match `questions`: rows missing from the input are
/// removed, the rest are inserted or overwritten by id.
pub async fn import_questions(pool: &SqlitePool, questions: Vec<Question>) -> sqlx::Result<()> {
    let mut tx = pool.begin().await?;

    let existing_ids: HashSet<i64> = sqlx::query_scalar::<_, i64>("SELECT id FROM questions")
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .collect();
    let new_ids: HashSet<i64> = questions.iter().map(|q| q.id).collect();

    for id in existing_ids.difference(&new_ids) {
        sqlx::query("DELETE FROM questions WHERE questions.id = ?1")
            .bind(*id)
            .execute(&mut *tx)
            .await?;
    }
    for question in questions {
        sqlx::query(
            r#"
            INSERT INTO questions (id, question, answer, category, difficulty)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (id) DO UPDATE SET
                question = excluded.question,
                answer = excluded.answer,
                category = excluded.category,
                difficulty = excluded.difficulty
            "#,
        )
        .bind(question.id)
        .bind(question.question)
        .bind(question.answer)
        .bind(question.category)
        .bind(question.difficulty)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    async fn seed(pool: &SqlitePool) -> Vec<i64> {
        let rows = [
            ("Whose autobiography is entitled 'I Know Why the Caged Bird Sings'?", "Maya Angelou", 4, 2),
            ("What is the heaviest organ in the human body?", "The Liver", 1, 4),
            ("Which Dutch graphic artist created 'Drawing Hands'?", "Escher", 2, 1),
            ("What boxer's original name is Cassius Clay?", "Muhammad Ali", 4, 1),
            ("Which country won the first ever soccer World Cup in 1930?", "Uruguay", 6, 4),
        ];
        let mut ids = Vec::new();
        for (question, answer, category, difficulty) in rows {
            ids.push(
                create_question(pool, question, answer, category, difficulty)
                    .await
                    .unwrap(),
            );
        }
        ids
    }

    #[tokio::test]
    async fn pages_are_ordered_by_id() {
        let pool = test_pool().await;
        let ids = seed(&pool).await;

        let first = get_questions_page(&pool, 2, 0).await.unwrap();
        let second = get_questions_page(&pool, 2, 2).await.unwrap();
        let beyond = get_questions_page(&pool, 2, 10).await.unwrap();

        assert_eq!(first.iter().map(|q| q.id).collect::<Vec<_>>(), ids[..2]);
        assert_eq!(second.iter().map(|q| q.id).collect::<Vec<_>>(), ids[2..4]);
        assert!(beyond.is_empty());
        assert_eq!(count_questions(&pool).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn category_page_filters_rows() {
        let pool = test_pool().await;
        seed(&pool).await;

        let history = get_questions_for_category_page(&pool, 4, 10, 0)
            .await
            .unwrap();
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|q| q.category == 4));
        assert!(get_questions_for_category_page(&pool, 100, 10, 0)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn search_ignores_case_and_wildcards() {
        let pool = test_pool().await;
        seed(&pool).await;

        let found = search_questions(&pool, "WHICH").await.unwrap();
        assert_eq!(found.len(), 2);
        assert!(search_questions(&pool, "%").await.unwrap().is_empty());
        assert!(search_questions(&pool, "_").await.unwrap().is_empty());
        assert!(search_questions(&pool, "deantosh").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_folds_non_ascii_letters() {
        let pool = test_pool().await;
        seed(&pool).await;
        let id = create_question(&pool, "Who wrote Émile, or On Education?", "Rousseau", 4, 3)
            .await
            .unwrap();

        for term in ["Émile", "émile", "ÉMILE", "mile, OR on"] {
            let found = search_questions(&pool, term).await.unwrap();
            assert_eq!(found.iter().map(|q| q.id).collect::<Vec<_>>(), vec![id], "{term}");
        }
        assert!(search_questions(&pool, "Emile").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_reports_affected_rows() {
        let pool = test_pool().await;
        let ids = seed(&pool).await;

        assert_eq!(delete_question(&pool, ids[0]).await.unwrap(), 1);
        assert_eq!(delete_question(&pool, ids[0]).await.unwrap(), 0);
        assert!(get_question_by_id(&pool, ids[0]).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn created_ids_are_never_reused() {
        let pool = test_pool().await;
        let ids = seed(&pool).await;
        let last = *ids.last().unwrap();

        delete_question(&pool, last).await.unwrap();
        let id = create_question(&pool, "Q", "A", 1, 1).await.unwrap();
        assert!(id > last);
    }

    #[tokio::test]
    async fn random_question_respects_filters() {
        let pool = test_pool().await;
        let ids = seed(&pool).await;

        for _ in 0..10 {
            let picked = random_question(&pool, Some(4), &[ids[0]])
                .await
                .unwrap()
                .unwrap();
            assert_eq!(picked.id, ids[3]);
        }

        let any = random_question(&pool, None, &ids[1..]).await.unwrap().unwrap();
        assert_eq!(any.id, ids[0]);

        assert!(random_question(&pool, None, &ids).await.unwrap().is_none());
        assert!(random_question(&pool, Some(3), &[]).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn import_synchronizes_rows() {
        let pool = test_pool().await;
        let ids = seed(&pool).await;

        let mut kept = get_question_by_id(&pool, ids[1]).await.unwrap().unwrap();
        kept.answer = "Liver".to_owned();
        let added = Question {
            id: 100,
            question: "Hematology is a branch of medicine involving the study of what?".to_owned(),
            answer: "Blood".to_owned(),
            category: 1,
            difficulty: 4,
        };
        import_questions(&pool, vec![kept.clone(), added.clone()])
            .await
            .unwrap();

        assert_eq!(get_all_questions(&pool).await.unwrap(), vec![kept, added]);
    }
}
