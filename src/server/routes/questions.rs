use std::collections::HashMap;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{categories::get_all_categories, questions},
        Category, Question,
    },
    server::{app::AppState, deserializers::deserialize_int, pagination::Pagination},
};

use super::{
    distinct_categories, method_not_allowed, options, success, ApiError, ApiResponse, OrStatus,
};

#[derive(Deserialize)]
struct NewQuestion {
    question: String,
    answer: String,
    #[serde(deserialize_with = "deserialize_int")]
    difficulty: i64,
    #[serde(deserialize_with = "deserialize_int")]
    category: i64,
}

#[derive(Deserialize)]
struct SearchBody {
    #[serde(rename = "searchTerm")]
    search_term: String,
}

#[derive(Serialize)]
struct QuestionsPage {
    questions: Vec<Question>,
    total_questions: i64,
    current_category: Vec<i64>,
    categories: Vec<Category>,
    total_categories: usize,
}

#[derive(Serialize)]
struct Deleted {
    question_deleted: i64,
}

#[derive(Serialize)]
struct Created {
    created: i64,
}

#[derive(Serialize)]
struct SearchResults {
    questions: Vec<Question>,
    total_questions: usize,
    search: String,
    current_categories: Vec<i64>,
}

async fn list_questions(
    State(pool): State<SqlitePool>,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> ApiResponse<QuestionsPage> {
    let Query(params) = query.or_status(ApiError::NotFound)?;
    let (limit, offset) = Pagination::from_query(&params)
        .window()
        .ok_or(ApiError::NotFound)?;

    let total_questions = questions::count_questions(&pool)
        .await
        .or_status(ApiError::NotFound)?;
    let categories = get_all_categories(&pool)
        .await
        .or_status(ApiError::NotFound)?;
    let page = questions::get_questions_page(&pool, limit, offset)
        .await
        .or_status(ApiError::NotFound)?;
    if categories.is_empty() || page.is_empty() {
        return Err(ApiError::NotFound);
    }

    success(QuestionsPage {
        current_category: distinct_categories(&page),
        questions: page,
        total_questions,
        total_categories: categories.len(),
        categories,
    })
}

async fn delete_question(
    State(pool): State<SqlitePool>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResponse<Deleted> {
    let Path(id) = path.or_status(ApiError::NotFound)?;
    questions::get_question_by_id(&pool, id)
        .await
        .or_status(ApiError::NotFound)?
        .ok_or(ApiError::NotFound)?;

    questions::delete_question(&pool, id)
        .await
        .or_status(ApiError::MethodNotAllowed)?;
    tracing::info!(id, "Question deleted");
    success(Deleted {
        question_deleted: id,
    })
}

async fn create_question(
    State(pool): State<SqlitePool>,
    body: Result<Json<NewQuestion>, JsonRejection>,
) -> ApiResponse<Created> {
    let Json(new_question) = body.or_status(ApiError::Unprocessable)?;
    let id = questions::create_question(
        &pool,
        &new_question.question,
        &new_question.answer,
        new_question.category,
        new_question.difficulty,
    )
    .await
    .or_status(ApiError::Unprocessable)?;
    tracing::info!(id, "Question created");
    success(Created { created: id })
}

async fn search_questions(
    State(pool): State<SqlitePool>,
    body: Result<Json<SearchBody>, JsonRejection>,
) -> ApiResponse<SearchResults> {
    let Json(SearchBody { search_term }) = body.or_status(ApiError::Unprocessable)?;
    let found = questions::search_questions(&pool, &search_term)
        .await
        .or_status(ApiError::Unprocessable)?;
    if found.is_empty() {
        return Err(ApiError::NotFound);
    }

    success(SearchResults {
        current_categories: distinct_categories(&found),
        total_questions: found.len(),
        questions: found,
        search: search_term,
    })
}

pub fn questions_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/questions",
            get(list_questions)
                .post(create_question)
                .options(options)
                .fallback(method_not_allowed),
        )
        .route(
            "/questions/search",
            post(search_questions)
                .options(options)
                .fallback(method_not_allowed),
        )
        .route(
            "/questions/{id}",
            delete(delete_question)
                .options(options)
                .fallback(method_not_allowed),
        )
        .with_state(state)
}
