use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{get, post, web, HttpResponse};
use chrono::Utc;
use sqlx::types::Json;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::Quiz;
use crate::openai::{generate_quiz_questions, verify_api_key};
use crate::types::{DocumentQuery, GenerateQuizRequest, GenerateQuizResponse};
use crate::AppState;

const ALLOWED_QUESTION_COUNTS: [u8; 4] = [5, 10, 15, 20];

/// Runs the full generation pipeline: credential preflight, one completion
/// request, parsing, then persistence. A failed store write still returns
/// the parsed quiz so it can be previewed and exported.
#[post("/generate")]
pub async fn generate_quiz(
    app_state: web::Data<Arc<AppState>>,
    authenticated_user: AuthenticatedUser,
    web::Json(request): web::Json<GenerateQuizRequest>,
) -> Result<web::Json<GenerateQuizResponse>, AppError> {
    let topic = request.topic.trim().to_string();
    if topic.is_empty() {
        return Err(AppError::Validation("Please enter a topic".to_string()));
    }
    if !ALLOWED_QUESTION_COUNTS.contains(&request.num_questions) {
        return Err(AppError::Validation(
            "Number of questions must be 5, 10, 15, or 20".to_string(),
        ));
    }

    let client = app_state.oai_client.as_ref().ok_or_else(|| {
        AppError::LlmConfig(
            "OpenAI API key not found. Please check your environment variables.".to_string(),
        )
    })?;

    verify_api_key(client).await?;

    let questions = generate_quiz_questions(
        client,
        &topic,
        request.num_questions,
        &request.difficulty,
        request.additional_instructions.as_deref(),
    )
    .await?;

    match Quiz::insert(
        &app_state.pool,
        &authenticated_user.user_id,
        &topic,
        request.difficulty.clone(),
        &questions,
    )
    .await
    {
        Ok(quiz) => {
            info!("Quiz generated and persisted: {}", quiz.id);
            Ok(web::Json(GenerateQuizResponse {
                quiz,
                persisted: true,
                warning: None,
            }))
        }
        Err(e) => {
            error!("Failed to persist quiz: {:?}", e);
            let quiz = Quiz {
                id: Uuid::new_v4(),
                user_id: authenticated_user.user_id,
                topic,
                difficulty: request.difficulty,
                questions: Json(questions),
                created_at: Utc::now(),
            };
            Ok(web::Json(GenerateQuizResponse {
                quiz,
                persisted: false,
                warning: Some("Quiz generated but could not be saved".to_string()),
            }))
        }
    }
}

#[get("")]
pub async fn list_quizzes(
    app_state: web::Data<Arc<AppState>>,
    user: Option<AuthenticatedUser>,
) -> Result<web::Json<Vec<Quiz>>, AppError> {
    let Some(user) = user else {
        return Ok(web::Json(Vec::new()));
    };

    let quizzes = Quiz::list(&app_state.pool, &user.user_id).await?;
    Ok(web::Json(quizzes))
}

/// Renders one of the three document variants as a downloadable text file.
#[get("/{quiz_id}/document")]
pub async fn quiz_document(
    app_state: web::Data<Arc<AppState>>,
    authenticated_user: AuthenticatedUser,
    quiz_id: web::Path<Uuid>,
    query: web::Query<DocumentQuery>,
) -> Result<HttpResponse, AppError> {
    let quiz = Quiz::get(
        &app_state.pool,
        quiz_id.into_inner(),
        &authenticated_user.user_id,
    )
    .await?
    .ok_or_else(|| AppError::NotFound("Quiz not found".to_string()))?;

    let content = quiz.render_document(
        query.variant.include_answers(),
        query.header,
        query.footer,
    );
    let filename = quiz.document_filename(query.variant);

    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(filename)],
        })
        .body(content))
}
