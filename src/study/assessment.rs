//! Assessment types and parsing of model-produced JSON.
//!
//! Generators rarely return clean JSON: replies come wrapped in Markdown
//! fences, surrounded by prose, or with trailing commas. [`repair_json`]
//! cleans those up before parsing.

use serde::{Deserialize, Serialize};

use crate::types::{AppError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionKind {
    #[serde(alias = "multiple_choice", alias = "mcq")]
    MultipleChoice,
    #[default]
    #[serde(alias = "open_ended", alias = "open")]
    OpenEnded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub question: String,

    #[serde(rename = "type", default)]
    pub kind: QuestionKind,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_answer: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub questions: Vec<Question>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AssessmentShape {
    Wrapped(Assessment),
    Bare(Vec<Question>),
}

/// Parse a generator reply into an [`Assessment`].
///
/// Accepts either `{"questions": [...]}` or a bare question array. A
/// question with options and a correct answer but no `type` is treated as
/// multiple choice.
pub fn parse_assessment(raw: &str) -> Result<Assessment> {
    let cleaned = repair_json(raw);
    let shape: AssessmentShape = serde_json::from_str(&cleaned).map_err(|e| {
        AppError::GenerationUnavailable(format!("Assessment is not valid JSON: {}", e))
    })?;

    let mut assessment = match shape {
        AssessmentShape::Wrapped(assessment) => assessment,
        AssessmentShape::Bare(questions) => Assessment { questions },
    };

    for question in &mut assessment.questions {
        if question.kind == QuestionKind::OpenEnded
            && !question.options.is_empty()
            && question.correct_answer.is_some()
        {
            question.kind = QuestionKind::MultipleChoice;
        }
    }

    Ok(assessment)
}

/// Best-effort cleanup of model-produced JSON.
///
/// Strips a Markdown code fence, cuts to the outermost object or array and
/// drops trailing commas before `}` / `]`. Text inside strings is untouched.
pub fn repair_json(raw: &str) -> String {
    let unfenced = strip_code_fence(raw.trim());
    let body = outermost_value(unfenced);
    drop_trailing_commas(body)
}

fn strip_code_fence(text: &str) -> &str {
    let Some(open) = text.find("```") else {
        return text;
    };
    let after_open = &text[open + 3..];
    // Skip the language tag line
    let inner_start = after_open.find('\n').map(|i| i + 1).unwrap_or(0);
    let inner = &after_open[inner_start..];
    match inner.find("```") {
        Some(close) => &inner[..close],
        None => inner,
    }
}

fn outermost_value(text: &str) -> &str {
    let Some(start) = text.find(['{', '[']) else {
        return text;
    };
    let closing = if text[start..].starts_with('{') { '}' } else { ']' };
    match text.rfind(closing) {
        Some(end) if end > start => &text[start..=end],
        _ => &text[start..],
    }
}

fn drop_trailing_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' => {
                let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
                if !matches!(next, Some('}') | Some(']')) {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wrapped_assessment() {
        let raw = r#"{"questions": [
            {"question": "What is ATP?", "type": "open-ended", "modelAnswer": "An energy carrier"},
            {"question": "2+2?", "type": "multiple-choice", "options": ["3", "4"], "correctAnswer": "4"}
        ]}"#;
        let assessment = parse_assessment(raw).unwrap();
        assert_eq!(assessment.questions.len(), 2);
        assert_eq!(assessment.questions[0].kind, QuestionKind::OpenEnded);
        assert_eq!(
            assessment.questions[0].model_answer.as_deref(),
            Some("An energy carrier")
        );
        assert_eq!(assessment.questions[1].kind, QuestionKind::MultipleChoice);
        assert_eq!(assessment.questions[1].options, vec!["3", "4"]);
    }

    #[test]
    fn test_parse_fenced_bare_array_with_trailing_commas() {
        let raw = "Here is your quiz:\n```json\n[\n  {\"question\": \"Define osmosis\", \"type\": \"open_ended\",},\n]\n```\nGood luck!";
        let assessment = parse_assessment(raw).unwrap();
        assert_eq!(assessment.questions.len(), 1);
        assert_eq!(assessment.questions[0].question, "Define osmosis");
        assert_eq!(assessment.questions[0].kind, QuestionKind::OpenEnded);
    }

    #[test]
    fn test_missing_type_inferred_from_options() {
        let raw = r#"[{"question": "Pick one", "options": ["a", "b"], "correctAnswer": "b"}]"#;
        let assessment = parse_assessment(raw).unwrap();
        assert_eq!(assessment.questions[0].kind, QuestionKind::MultipleChoice);
    }

    #[test]
    fn test_unparseable_output() {
        assert!(matches!(
            parse_assessment("I cannot help with that."),
            Err(AppError::GenerationUnavailable(_))
        ));
    }

    #[test]
    fn test_repair_keeps_commas_inside_strings() {
        let raw = r#"{"question": "a, }", "options": ["x", "y",],}"#;
        assert_eq!(
            repair_json(raw),
            r#"{"question": "a, }", "options": ["x", "y"]}"#
        );
    }

    #[test]
    fn test_repair_handles_escaped_quotes() {
        let raw = r#"{"question": "say \"hi\",]",}"#;
        assert_eq!(repair_json(raw), r#"{"question": "say \"hi\",]"}"#);
    }

    #[test]
    fn test_serialized_field_names() {
        let question = Question {
            question: "Q".to_string(),
            kind: QuestionKind::MultipleChoice,
            options: vec!["a".to_string()],
            correct_answer: Some("a".to_string()),
            model_answer: None,
        };
        let json = serde_json::to_value(&question).unwrap();
        assert_eq!(json["type"], "multiple-choice");
        assert_eq!(json["correctAnswer"], "a");
        assert!(json.get("modelAnswer").is_none());
    }
}
