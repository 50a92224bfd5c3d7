use std::collections::HashMap;

use axum::{
    extract::{rejection::PathRejection, rejection::QueryRejection, Path, Query, State},
    routing::get,
    Router,
};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{categories::get_all_categories, questions::get_questions_for_category_page},
        Category, Question,
    },
    server::{app::AppState, pagination::Pagination},
};

use super::{method_not_allowed, options, success, ApiError, ApiResponse, OrStatus};

#[derive(Serialize)]
struct CategoriesPage {
    categories: Vec<Category>,
    total_categories: usize,
}

#[derive(Serialize)]
struct CategoryQuestionsPage {
    questions: Vec<Question>,
    total_questions: usize,
    current_category: i64,
}

async fn get_categories(State(pool): State<SqlitePool>) -> ApiResponse<CategoriesPage> {
    let categories = get_all_categories(&pool)
        .await
        .or_status(ApiError::Unprocessable)?;
    if categories.is_empty() {
        return Err(ApiError::NotFound);
    }
    success(CategoriesPage {
        total_categories: categories.len(),
        categories,
    })
}

async fn get_category_questions(
    State(pool): State<SqlitePool>,
    path: Result<Path<i64>, PathRejection>,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> ApiResponse<CategoryQuestionsPage> {
    let Path(category_id) = path.or_status(ApiError::NotFound)?;
    let Query(params) = query.or_status(ApiError::NotFound)?;
    let (limit, offset) = Pagination::from_query(&params)
        .window()
        .ok_or(ApiError::NotFound)?;

    let questions = get_questions_for_category_page(&pool, category_id, limit, offset)
        .await
        .or_status(ApiError::NotFound)?;
    if questions.is_empty() {
        return Err(ApiError::NotFound);
    }
    success(CategoryQuestionsPage {
        total_questions: questions.len(),
        questions,
        current_category: category_id,
    })
}

pub fn category_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/categories",
            get(get_categories)
                .options(options)
                .fallback(method_not_allowed),
        )
        .route(
            "/categories/{category_id}/questions",
            get(get_category_questions)
                .options(options)
                .fallback(method_not_allowed),
        )
        .with_state(state)
}
