use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Difficulty, DocumentVariant, Quiz};

#[derive(Deserialize, ToSchema)]
pub struct GenerateQuizRequest {
    pub topic: String,
    /// One of 5, 10, 15 or 20.
    pub num_questions: u8,
    pub difficulty: Difficulty,
    pub additional_instructions: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct GenerateQuizResponse {
    pub quiz: Quiz,
    /// False when generation succeeded but the store write did not; the quiz
    /// is still usable for preview and export.
    pub persisted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize, ToSchema)]
pub struct DocumentQuery {
    pub variant: DocumentVariant,
    #[serde(default = "default_true")]
    pub header: bool,
    #[serde(default = "default_true")]
    pub footer: bool,
}
