use crate::models::Difficulty;

pub struct Prompts;

impl Prompts {
    pub const QUIZ_SYSTEM: &'static str =
        "You are an experienced teacher creating educational quiz questions.";

    pub fn quiz_request(
        topic: &str,
        num_questions: u8,
        difficulty: &Difficulty,
        additional_instructions: Option<&str>,
    ) -> String {
        let mut prompt = format!(
            "Generate {} multiple-choice questions about \"{}\" at {} difficulty level.",
            num_questions, topic, difficulty
        );
        if let Some(instructions) = additional_instructions.filter(|s| !s.trim().is_empty()) {
            prompt.push_str(&format!("\nAdditional instructions: {}", instructions));
        }
        prompt.push_str(
            "\nFormat the response as a JSON array with each question object having: question, \
             options (array of 4 choices), correctAnswer (matching one of the options exactly), \
             and explanation.\nMake sure the questions are challenging, educational, and \
             appropriate for classroom use.",
        );
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_includes_parameters() {
        let prompt = Prompts::quiz_request("Photosynthesis", 5, &Difficulty::Medium, None);
        assert!(prompt.contains("Generate 5 multiple-choice questions"));
        assert!(prompt.contains("\"Photosynthesis\""));
        assert!(prompt.contains("at medium difficulty level"));
        assert!(!prompt.contains("Additional instructions:"));
    }

    #[test]
    fn prompt_appends_additional_instructions() {
        let prompt = Prompts::quiz_request(
            "Algebra",
            10,
            &Difficulty::Hard,
            Some("Focus on quadratic equations"),
        );
        assert!(prompt.contains("Additional instructions: Focus on quadratic equations"));
    }
}
