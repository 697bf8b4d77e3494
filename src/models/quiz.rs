use anyhow::Result;
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, PgPool, Type};
use std::fmt;
use tracing::debug;
use utoipa::ToSchema;
use uuid::Uuid;

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

#[derive(Clone, Debug, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "difficulty_enum", rename_all = "lowercase")] // SQL value name
#[serde(rename_all = "lowercase")] // JSON value name
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Capitalized form used in the rendered document header.
    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

/// One generated question. The wire shape (camelCase keys) is the one the
/// model is asked to produce and the one stored in the quizzes table.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    /// Must match one of `options` exactly.
    pub correct_answer: String,
    pub explanation: String,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct Quiz {
    pub id: Uuid,
    pub user_id: String,
    pub topic: String,
    pub difficulty: Difficulty,
    #[schema(value_type = Vec<QuizQuestion>)]
    pub questions: Json<Vec<QuizQuestion>>,
    pub created_at: DateTime<Utc>,
}

/// Which rendering of a quiz document to produce.
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DocumentVariant {
    Preview,
    Student,
    AnswerKey,
}

impl DocumentVariant {
    pub fn include_answers(&self) -> bool {
        !matches!(self, DocumentVariant::Student)
    }

    pub fn file_suffix(&self) -> &'static str {
        match self {
            DocumentVariant::Student => "questions",
            DocumentVariant::Preview | DocumentVariant::AnswerKey => "answers",
        }
    }
}

impl Quiz {
    pub async fn insert(
        pool: &PgPool,
        user_id: &str,
        topic: &str,
        difficulty: Difficulty,
        questions: &[QuizQuestion],
    ) -> Result<Self> {
        let quiz = sqlx::query_as::<_, Quiz>(
            r#"
            INSERT INTO quizzes (id, user_id, topic, difficulty, questions, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(topic)
        .bind(difficulty)
        .bind(Json(questions.to_vec()))
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

        debug!("Quiz persisted: {:?}", quiz.id);
        Ok(quiz)
    }

    pub async fn list(pool: &PgPool, user_id: &str) -> Result<Vec<Self>> {
        let quizzes = sqlx::query_as::<_, Quiz>(
            r#"
            SELECT * FROM quizzes
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(quizzes)
    }

    pub async fn get(pool: &PgPool, quiz_id: Uuid, user_id: &str) -> Result<Option<Self>> {
        let quiz = sqlx::query_as::<_, Quiz>(
            r#"
            SELECT * FROM quizzes
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(quiz_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(quiz)
    }

    /// Renders the plain-text document. Same quiz and same toggles always
    /// produce byte-identical output.
    pub fn render_document(
        &self,
        include_answers: bool,
        include_header: bool,
        include_footer: bool,
    ) -> String {
        let mut lines: Vec<String> = Vec::new();

        if include_header {
            lines.push("═".repeat(50));
            lines.push(format!("{}QUIZ", " ".repeat(20)));
            lines.push("═".repeat(50));
            lines.push(format!("Topic: {}", self.topic));
            lines.push(format!("Difficulty Level: {}", self.difficulty.label()));
            lines.push(format!("Total Questions: {}", self.questions.len()));
            lines.push("═".repeat(50));
            lines.push(String::new());
        }

        for (idx, q) in self.questions.iter().enumerate() {
            lines.push(format!("Question {}:", idx + 1));
            lines.push(q.question.clone());
            lines.push(String::new());
            for (opt_idx, opt) in q.options.iter().enumerate() {
                let option_label = (b'A' + opt_idx as u8) as char;
                lines.push(format!("  {}. {}", option_label, opt));
            }

            if include_answers {
                lines.push(String::new());
                lines.push("─".repeat(40));
                lines.push(format!("Correct Answer: {}", q.correct_answer));
                lines.push(String::new());
                lines.push("Explanation:".to_string());
                lines.push(q.explanation.clone());
                lines.push("─".repeat(40));
            }

            lines.push("\n".to_string());
        }

        if include_footer {
            lines.push("═".repeat(50));
            if include_answers {
                lines.push("End of Answer Key".to_string());
            } else {
                lines.push("Good luck!".to_string());
            }
            lines.push("═".repeat(50));
        }

        lines.join("\n")
    }

    /// `{sanitized topic}_{questions|answers}.txt`, whitespace runs collapsed
    /// to underscores.
    pub fn document_filename(&self, variant: DocumentVariant) -> String {
        let sanitized = WHITESPACE_RUN.replace_all(&self.topic, "_");
        format!("{}_{}.txt", sanitized, variant.file_suffix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_quiz(question_count: usize) -> Quiz {
        let questions = (0..question_count)
            .map(|i| QuizQuestion {
                question: format!("What is photosynthesis step {}?", i + 1),
                options: vec![
                    "Light absorption".to_string(),
                    "Carbon fixation".to_string(),
                    "Water splitting".to_string(),
                    "Sugar export".to_string(),
                ],
                correct_answer: "Light absorption".to_string(),
                explanation: "Chlorophyll absorbs light first.".to_string(),
            })
            .collect();

        Quiz {
            id: Uuid::nil(),
            user_id: "user_test".to_string(),
            topic: "Photosynthesis".to_string(),
            difficulty: Difficulty::Medium,
            questions: Json(questions),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    #[test]
    fn rendering_is_deterministic() {
        let quiz = sample_quiz(5);
        let a = quiz.render_document(true, true, true);
        let b = quiz.render_document(true, true, true);
        assert_eq!(a, b);
    }

    #[test]
    fn question_numbering_matches_count() {
        let quiz = sample_quiz(5);
        let doc = quiz.render_document(true, true, true);
        assert!(doc.contains("Question 5:"));
        assert!(!doc.contains("Question 6:"));
    }

    #[test]
    fn header_toggle_removes_only_the_metadata_block() {
        let quiz = sample_quiz(5);
        let with_header = quiz.render_document(true, true, true);
        let without_header = quiz.render_document(true, false, true);

        assert!(with_header.contains("Topic: Photosynthesis"));
        assert!(with_header.contains("Difficulty Level: Medium"));
        assert!(with_header.contains("Total Questions: 5"));
        assert!(!without_header.contains("Topic: Photosynthesis"));
        assert!(!without_header.contains("Difficulty Level:"));

        // Question content is untouched by the toggle.
        for i in 1..=5 {
            assert!(without_header.contains(&format!("Question {}:", i)));
        }
        assert!(without_header.contains("  A. Light absorption"));
        assert!(with_header.ends_with(&without_header));
    }

    #[test]
    fn student_version_hides_answers() {
        let quiz = sample_quiz(5);
        let student = quiz.render_document(false, true, true);
        assert!(!student.contains("Correct Answer:"));
        assert!(!student.contains("Explanation:"));
        assert!(student.contains("Good luck!"));

        let key = quiz.render_document(true, true, true);
        assert!(key.contains("Correct Answer: Light absorption"));
        assert!(key.contains("End of Answer Key"));
    }

    #[test]
    fn filename_is_sanitized_from_topic() {
        let mut quiz = sample_quiz(1);
        quiz.topic = "World  War \tII".to_string();
        assert_eq!(
            quiz.document_filename(DocumentVariant::Student),
            "World_War_II_questions.txt"
        );
        assert_eq!(
            quiz.document_filename(DocumentVariant::AnswerKey),
            "World_War_II_answers.txt"
        );
    }
}
