use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use serde_json::Value;
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::{Difficulty, QuizQuestion};
use crate::prompts::Prompts;

const QUIZ_MODEL: &str = "gpt-3.5-turbo";

pub const QUOTA_REMEDIATION: &str = "Your OpenAI API key needs to be set up with valid billing \
    information. Please visit https://platform.openai.com/account/billing to add a payment method.";

/// Preflight: confirm the provider accepts the configured credential before
/// any generation request is sent.
pub async fn verify_api_key(client: &Client<OpenAIConfig>) -> Result<(), AppError> {
    match client.models().list().await {
        Ok(_) => Ok(()),
        Err(OpenAIError::ApiError(api)) => {
            error!("API key rejected: {}", api.message);
            Err(AppError::LlmConfig(format!(
                "Failed to validate API key: {}",
                api.message
            )))
        }
        Err(e) => {
            error!("API key validation failed: {:?}", e);
            Err(AppError::LlmConfig(
                "Failed to connect to OpenAI API. Please check your internet connection."
                    .to_string(),
            ))
        }
    }
}

/// Sends one chat completion and parses the reply into quiz questions.
pub async fn generate_quiz_questions(
    client: &Client<OpenAIConfig>,
    topic: &str,
    num_questions: u8,
    difficulty: &Difficulty,
    additional_instructions: Option<&str>,
) -> Result<Vec<QuizQuestion>, AppError> {
    let request = CreateChatCompletionRequestArgs::default()
        .model(QUIZ_MODEL)
        .temperature(0.7)
        .messages([
            ChatCompletionRequestSystemMessageArgs::default()
                .content(Prompts::QUIZ_SYSTEM)
                .build()
                .map_err(|e| AppError::Internal(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(Prompts::quiz_request(
                    topic,
                    num_questions,
                    difficulty,
                    additional_instructions,
                ))
                .build()
                .map_err(|e| AppError::Internal(e.to_string()))?
                .into(),
        ])
        .build()
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let response = client
        .chat()
        .create(request)
        .await
        .map_err(map_completion_error)?;

    let content = response
        .choices
        .first()
        .and_then(|choice| choice.message.content.clone())
        .ok_or_else(|| {
            AppError::LlmOutput("No content in response from OpenAI".to_string())
        })?;

    info!("Received {} chars of quiz content", content.len());
    parse_quiz_questions(&content)
}

fn map_completion_error(err: OpenAIError) -> AppError {
    match err {
        OpenAIError::ApiError(api) => {
            error!("OpenAI API error: {}", api.message);
            let code = api.code.as_ref().map(ToString::to_string).unwrap_or_default();
            if code.contains("insufficient_quota") {
                AppError::LlmQuota(QUOTA_REMEDIATION.to_string())
            } else {
                AppError::LlmRequest(api.message)
            }
        }
        other => {
            error!("OpenAI request failed: {:?}", other);
            AppError::LlmRequest("Failed to generate quiz".to_string())
        }
    }
}

/// Strips markdown fences, parses the JSON array, and validates every
/// element. One malformed element rejects the whole batch.
pub fn parse_quiz_questions(content: &str) -> Result<Vec<QuizQuestion>, AppError> {
    let clean = content.replace("```json", "").replace("```", "");
    let clean = clean.trim();

    let value: Value = serde_json::from_str(clean).map_err(|e| {
        error!("Failed to parse quiz content: {}", e);
        AppError::LlmOutput("Failed to generate valid quiz questions. Please try again.".to_string())
    })?;

    let items = value.as_array().ok_or_else(|| {
        AppError::LlmOutput("Invalid quiz format: expected an array of questions".to_string())
    })?;

    for (index, item) in items.iter().enumerate() {
        let valid = non_empty_str(item, "question")
            && item.get("options").map(Value::is_array).unwrap_or(false)
            && non_empty_str(item, "correctAnswer")
            && non_empty_str(item, "explanation");
        if !valid {
            return Err(AppError::LlmOutput(format!(
                "Invalid question format at index {}",
                index
            )));
        }
    }

    serde_json::from_value(value).map_err(|e| {
        error!("Failed to deserialize quiz content: {}", e);
        AppError::LlmOutput("Failed to generate valid quiz questions. Please try again.".to_string())
    })
}

fn non_empty_str(item: &Value, key: &str) -> bool {
    item.get(key)
        .and_then(Value::as_str)
        .map(|s| !s.is_empty())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_QUESTION: &str = r#"{
        "question": "Which pigment drives photosynthesis?",
        "options": ["Chlorophyll", "Keratin", "Melanin", "Hemoglobin"],
        "correctAnswer": "Chlorophyll",
        "explanation": "Chlorophyll absorbs light energy."
    }"#;

    #[test]
    fn parses_plain_json_array() {
        let content = format!("[{}]", VALID_QUESTION);
        let questions = parse_quiz_questions(&content).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].correct_answer, "Chlorophyll");
    }

    #[test]
    fn strips_markdown_fences() {
        let content = format!("```json\n[{}]\n```", VALID_QUESTION);
        let questions = parse_quiz_questions(&content).unwrap();
        assert_eq!(questions.len(), 1);
    }

    #[test]
    fn rejects_non_array_payload() {
        let err = parse_quiz_questions(r#"{"question": "alone"}"#).unwrap_err();
        assert!(matches!(err, AppError::LlmOutput(_)));
    }

    #[test]
    fn one_bad_element_rejects_the_batch() {
        let missing_explanation = r#"{
            "question": "Q2?",
            "options": ["a", "b", "c", "d"],
            "correctAnswer": "a"
        }"#;
        let content = format!("[{}, {}]", VALID_QUESTION, missing_explanation);
        let err = parse_quiz_questions(&content).unwrap_err();
        match err {
            AppError::LlmOutput(msg) => assert!(msg.contains("index 1")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_question_text_is_invalid() {
        let content = r#"[{
            "question": "",
            "options": ["a", "b", "c", "d"],
            "correctAnswer": "a",
            "explanation": "because"
        }]"#;
        assert!(parse_quiz_questions(content).is_err());
    }

    #[test]
    fn options_must_be_an_array() {
        let content = r#"[{
            "question": "Q?",
            "options": "a, b, c, d",
            "correctAnswer": "a",
            "explanation": "because"
        }]"#;
        assert!(parse_quiz_questions(content).is_err());
    }
}
