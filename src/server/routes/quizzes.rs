use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{
    db::{queries::questions::random_question, Question},
    server::{
        app::AppState,
        deserializers::{deserialize_ids, deserialize_int},
    },
    telemetry::QUIZ_ROUNDS,
};

use super::{method_not_allowed, options, success, ApiError, ApiResponse, OrStatus};

/// `quiz_category` 0 plays across every category.
const ANY_CATEGORY: i64 = 0;

#[derive(Deserialize)]
struct QuizRound {
    #[serde(deserialize_with = "deserialize_ids")]
    previous_questions: Vec<i64>,
    #[serde(deserialize_with = "deserialize_int")]
    quiz_category: i64,
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(untagged)]
enum PreviousQuestions {
    Asked(Vec<i64>),
    // sent instead of the list once the quiz has run out of questions
    Count(usize),
}

#[derive(Serialize, Debug)]
struct NextQuestion {
    #[serde(skip_serializing_if = "Option::is_none")]
    question: Option<Question>,
    previous_question: PreviousQuestions,
}

async fn next_question(
    State(pool): State<SqlitePool>,
    body: Result<Json<QuizRound>, JsonRejection>,
) -> ApiResponse<NextQuestion> {
    let Json(round) = body.or_status(ApiError::Unprocessable)?;
    let category = (round.quiz_category != ANY_CATEGORY).then_some(round.quiz_category);

    let question = random_question(&pool, category, &round.previous_questions)
        .await
        .or_status(ApiError::Unprocessable)?;

    let next = match question {
        Some(question) => {
            QUIZ_ROUNDS.with_label_values(&["question"]).inc();
            NextQuestion {
                question: Some(question),
                previous_question: PreviousQuestions::Asked(round.previous_questions),
            }
        }
        None => {
            QUIZ_ROUNDS.with_label_values(&["exhausted"]).inc();
            tracing::debug!(?category, "Quiz has no questions left");
            NextQuestion {
                question: None,
                previous_question: PreviousQuestions::Count(round.previous_questions.len()),
            }
        }
    };
    success(next)
}

pub fn quizzes_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/quizzes",
            post(next_question)
                .options(options)
                .fallback(method_not_allowed),
        )
        .with_state(state)
}
