//! Study features built on the latest ingested document.
//!
//! These run whole-document prompts through the generator and sit outside
//! the retrieval core:
//! - course notes shaped by the learner's [`Preferences`]
//! - assessments, parsed from the generator's JSON reply
//! - scoring of an open-ended answer against a model answer

pub mod assessment;

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::llm::collect_stream;
use crate::rag::RagPipeline;
use crate::types::{AppError, Result};

pub use assessment::{parse_assessment, repair_json, Assessment, Question, QuestionKind};

/// How the learner wants material presented.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    /// e.g. "bullet points", "summaries", "diagrams"
    #[serde(default)]
    pub content_format: Vec<String>,
    /// e.g. "multiple choice", "open ended"
    #[serde(default)]
    pub assessment_style: Vec<String>,
}

impl Preferences {
    fn describe(&self) -> String {
        let list = |items: &[String]| {
            if items.is_empty() {
                "no preference".to_string()
            } else {
                items.join(", ")
            }
        };
        format!(
            "content format: {}; assessment style: {}",
            list(&self.content_format),
            list(&self.assessment_style)
        )
    }
}

pub fn notes_prompt(content: &str, preferences: &Preferences) -> String {
    format!(
        "Generate course notes for the following content according to these preferences: {}\n\nContent: {}",
        preferences.describe(),
        content
    )
}

pub fn assessment_prompt(content: &str, preferences: &Preferences) -> String {
    format!(
        "Create an assessment for the following content according to these preferences: {}\n\n\
         Reply with JSON only, in the form \
         {{\"questions\": [{{\"question\": string, \"type\": \"multiple-choice\" | \"open-ended\", \
         \"options\": [string], \"correctAnswer\": string, \"modelAnswer\": string}}]}}. \
         Multiple-choice questions need options and correctAnswer; open-ended questions need modelAnswer.\n\n\
         Content: {}",
        preferences.describe(),
        content
    )
}

pub fn scoring_prompt(model_answer: &str, student_answer: &str) -> String {
    format!(
        "Compare the student answer with the model answer and score it from 0 to 100 \
         for correctness and completeness. Reply with the number only.\n\n\
         Model answer: {}\n\nStudent answer: {}",
        model_answer, student_answer
    )
}

/// First run of ASCII digits in `reply`, clamped to 100.
pub fn extract_score(reply: &str) -> Option<u8> {
    let start = reply.find(|c: char| c.is_ascii_digit())?;
    let digits: String = reply[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    let value = digits.parse::<u64>().unwrap_or(u64::MAX);
    Some(value.min(100) as u8)
}

/// Notes, assessments and scoring over a pipeline's latest document.
pub struct StudyAssistant {
    pipeline: Arc<RagPipeline>,
    latest_notes: RwLock<Option<String>>,
}

impl StudyAssistant {
    pub fn new(pipeline: Arc<RagPipeline>) -> Self {
        Self {
            pipeline,
            latest_notes: RwLock::new(None),
        }
    }

    pub fn pipeline(&self) -> &Arc<RagPipeline> {
        &self.pipeline
    }

    /// Notes from the most recent [`generate_notes`](Self::generate_notes) call.
    pub fn latest_notes(&self) -> Option<String> {
        self.latest_notes.read().clone()
    }

    fn document(&self) -> Result<String> {
        self.pipeline.latest_document().ok_or(AppError::NoDocument)
    }

    #[instrument(skip(self, preferences))]
    pub async fn generate_notes(&self, preferences: &Preferences) -> Result<String> {
        let document = self.document()?;
        let prompt = notes_prompt(&document, preferences);

        let stream = self.pipeline.llm().stream(&prompt).await?;
        let notes = collect_stream(stream).await?;

        info!(chars = notes.len(), "Generated course notes");
        *self.latest_notes.write() = Some(notes.clone());
        Ok(notes)
    }

    #[instrument(skip(self, preferences))]
    pub async fn generate_assessment(&self, preferences: &Preferences) -> Result<Assessment> {
        let document = self.document()?;
        let prompt = assessment_prompt(&document, preferences);

        let reply = self.pipeline.llm().generate(&prompt).await?;
        let assessment = parse_assessment(&reply)?;

        info!(questions = assessment.questions.len(), "Generated assessment");
        Ok(assessment)
    }

    /// Score `student_answer` against `model_answer` on a 0-100 scale.
    #[instrument(skip_all)]
    pub async fn score_answer(&self, model_answer: &str, student_answer: &str) -> Result<u8> {
        if model_answer.trim().is_empty() || student_answer.trim().is_empty() {
            return Err(AppError::InvalidArgument(
                "model answer and student answer are both required".to_string(),
            ));
        }

        let reply = self
            .pipeline
            .llm()
            .generate(&scoring_prompt(model_answer, student_answer))
            .await?;

        let score = extract_score(&reply).ok_or_else(|| {
            AppError::GenerationUnavailable(format!("No score in generator reply: {:?}", reply))
        })?;
        debug!(score, "Scored answer");
        Ok(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("85", Some(85))]
    #[case("Score: 72/100", Some(72))]
    #[case("I'd give it 150.", Some(100))]
    #[case("99999999999999999999999", Some(100))]
    #[case("zero", None)]
    #[case("", None)]
    fn test_extract_score(#[case] reply: &str, #[case] expected: Option<u8>) {
        assert_eq!(extract_score(reply), expected);
    }

    #[test]
    fn test_preferences_wire_names() {
        let prefs: Preferences = serde_json::from_str(
            r#"{"contentFormat": ["bullet points"], "assessmentStyle": ["quiz"]}"#,
        )
        .unwrap();
        assert_eq!(prefs.content_format, vec!["bullet points"]);
        assert_eq!(prefs.assessment_style, vec!["quiz"]);
    }

    #[test]
    fn test_notes_prompt_mentions_preferences_and_content() {
        let prefs = Preferences {
            content_format: vec!["summaries".to_string(), "tables".to_string()],
            assessment_style: vec![],
        };
        let prompt = notes_prompt("Cells divide.", &prefs);
        assert!(prompt.contains("content format: summaries, tables"));
        assert!(prompt.contains("assessment style: no preference"));
        assert!(prompt.ends_with("Content: Cells divide."));
    }
}
