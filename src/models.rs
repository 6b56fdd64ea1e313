use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::error::{Result, TutorError};

/// How the question reached us. Only affects prompt annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    #[default]
    Text,
    Voice,
    Image,
}

impl InputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Voice => "voice",
            Self::Image => "image",
        }
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InputType {
    type Err = TutorError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(Self::Text),
            "voice" => Ok(Self::Voice),
            "image" => Ok(Self::Image),
            other => Err(TutorError::validation(format!(
                "Unknown input type '{other}', expected text, voice or image"
            ))),
        }
    }
}

/// Recognized subject tags. Anything else maps to `General`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subject {
    Algebra,
    Geometry,
    Calculus,
    Trigonometry,
    Statistics,
    ProblemSolving,
    AdvancedMathematics,
    General,
}

impl Subject {
    pub const RECOGNIZED: [Subject; 7] = [
        Subject::Algebra,
        Subject::Geometry,
        Subject::Calculus,
        Subject::Trigonometry,
        Subject::Statistics,
        Subject::ProblemSolving,
        Subject::AdvancedMathematics,
    ];

    /// Case-sensitive exact match on the wire tag.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "algebra" => Self::Algebra,
            "geometry" => Self::Geometry,
            "calculus" => Self::Calculus,
            "trigonometry" => Self::Trigonometry,
            "statistics" => Self::Statistics,
            "problem-solving" => Self::ProblemSolving,
            "advanced-mathematics" => Self::AdvancedMathematics,
            _ => Self::General,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Self::Algebra => "algebra",
            Self::Geometry => "geometry",
            Self::Calculus => "calculus",
            Self::Trigonometry => "trigonometry",
            Self::Statistics => "statistics",
            Self::ProblemSolving => "problem-solving",
            Self::AdvancedMathematics => "advanced-mathematics",
            Self::General => "general-mathematics",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Algebra => "Algebra",
            Self::Geometry => "Geometry",
            Self::Calculus => "Calculus",
            Self::Trigonometry => "Trigonometry",
            Self::Statistics => "Statistics",
            Self::ProblemSolving => "Problem Solving",
            Self::AdvancedMathematics => "Advanced Mathematics",
            Self::General => "Mathematics",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Algebra => "Equations, inequalities, functions and graphs",
            Self::Geometry => "Shapes, angles, areas and transformations",
            Self::Calculus => "Limits, derivatives, integrals and applications",
            Self::Trigonometry => "Angles, triangles, sine, cosine and tangent",
            Self::Statistics => "Data analysis, probability and distributions",
            Self::ProblemSolving => "Word problems, logic and mathematical reasoning",
            Self::AdvancedMathematics => {
                "Higher-level concepts like number theory, abstract algebra, and advanced calculus"
            }
            Self::General => "General mathematics questions",
        }
    }
}

/// A question as the core sees it, after decoding from the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionRequest {
    pub question: String,
    pub subject: String,
    pub input_type: InputType,
    pub is_complex: bool,
}

impl QuestionRequest {
    pub fn new(question: impl Into<String>, subject: impl Into<String>, input_type: InputType) -> Self {
        Self {
            question: question.into(),
            subject: subject.into(),
            input_type,
            is_complex: false,
        }
    }

    pub fn complex(mut self, is_complex: bool) -> Self {
        self.is_complex = is_complex;
        self
    }
}

/// Proxy request body.
///
/// `imageData` repeats `question` for image input. Both are kept on the wire
/// for compatibility with existing clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SolveRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub question: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subject: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub input_type: InputType,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_complex: bool,
    #[serde(default)]
    pub image_data: Option<String>,
}

// Browser clients send `null` for unset fields.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl From<&QuestionRequest> for SolveRequest {
    fn from(req: &QuestionRequest) -> Self {
        Self {
            question: req.question.clone(),
            subject: req.subject.clone(),
            input_type: req.input_type,
            is_complex: req.is_complex,
            image_data: (req.input_type == InputType::Image).then(|| req.question.clone()),
        }
    }
}

impl From<SolveRequest> for QuestionRequest {
    fn from(req: SolveRequest) -> Self {
        // Older clients may only fill imageData for image input.
        let question = match (req.input_type, req.image_data) {
            (InputType::Image, Some(data)) if req.question.trim().is_empty() => data,
            _ => req.question,
        };
        Self {
            question,
            subject: req.subject,
            input_type: req.input_type,
            is_complex: req.is_complex,
        }
    }
}

/// Proxy response body: exactly one of `answer` or `error` is set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SolveResponse {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl SolveResponse {
    pub fn success(answer: impl Into<String>) -> Self {
        Self {
            answer: Some(answer.into()),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            answer: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PracticeRequest {
    #[serde(default)]
    pub topic: Option<String>,
}

// Groq chat message format
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

// Groq API request format
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct GroqRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
}

// Groq API response format
#[derive(Debug, Deserialize, Default)]
pub struct GroqResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl GroqResponse {
    /// Content of the first choice, verbatim, if present and non-empty.
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .filter(|c| !c.is_empty())
    }

    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            choices: vec![Choice {
                message: ResponseMessage {
                    role: Some("assistant".to_string()),
                    content: Some(content.into()),
                },
            }],
        }
    }
}

/// Display-ready result of one question round trip. Owned by the caller.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    pub question: String,
    pub answer: String,
    pub subject: String,
    pub input_type: InputType,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mistake: Option<String>,
}

/// Row appended to a user's history after a successful answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub id: uuid::Uuid,
    pub question: String,
    pub answer: String,
    pub subject: String,
    pub input_type: InputType,
    pub is_correct: Option<bool>,
    pub mistake: Option<String>,
    pub created_at: String,
}

impl From<&AnswerRecord> for HistoryEntry {
    fn from(record: &AnswerRecord) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            question: record.question.clone(),
            answer: record.answer.clone(),
            subject: record.subject.clone(),
            input_type: record.input_type,
            is_correct: record.is_correct,
            mistake: record.mistake.clone(),
            created_at: Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_tags_match_exactly() {
        for subject in Subject::RECOGNIZED {
            assert_eq!(Subject::from_tag(subject.tag()), subject);
        }
        assert_eq!(Subject::from_tag("Algebra"), Subject::General);
        assert_eq!(Subject::from_tag("general-mathematics"), Subject::General);
        assert_eq!(Subject::from_tag(""), Subject::General);
    }

    #[test]
    fn test_solve_request_decodes_camel_case() {
        let body = r#"{"question":"2x + 3 = 7","subject":"algebra","inputType":"voice","isComplex":true,"imageData":null}"#;
        let req: SolveRequest = serde_json::from_str(body).expect("valid request body");
        assert_eq!(req.input_type, InputType::Voice);
        assert!(req.is_complex);
        assert_eq!(req.image_data, None);
    }

    #[test]
    fn test_solve_request_defaults_optional_fields() {
        let req: SolveRequest =
            serde_json::from_str(r#"{"question":"1+1","subject":"x","inputType":"text"}"#)
                .expect("valid request body");
        assert!(!req.is_complex);
        assert_eq!(req.image_data, None);
    }

    #[test]
    fn test_solve_request_treats_null_as_omitted() {
        let body = r#"{"question":"1+1","subject":null,"inputType":null,"isComplex":null,"imageData":null}"#;
        let req: SolveRequest = serde_json::from_str(body).expect("valid request body");
        assert_eq!(req.subject, "");
        assert_eq!(req.input_type, InputType::Text);
        assert!(!req.is_complex);
        assert_eq!(Subject::from_tag(&req.subject), Subject::General);
    }

    #[test]
    fn test_image_requests_duplicate_payload_into_image_data() {
        let q = QuestionRequest::new("data:image/png;base64,AAAA", "algebra", InputType::Image);
        let wire = SolveRequest::from(&q);
        assert_eq!(wire.image_data.as_deref(), Some("data:image/png;base64,AAAA"));

        let text = SolveRequest::from(&QuestionRequest::new("1+1", "algebra", InputType::Text));
        assert_eq!(text.image_data, None);
        let json = serde_json::to_value(&text).expect("serializable");
        assert!(json["imageData"].is_null());
        assert_eq!(json["inputType"], "text");
    }

    #[test]
    fn test_image_data_fills_blank_question() {
        let wire = SolveRequest {
            question: String::new(),
            subject: "geometry".to_string(),
            input_type: InputType::Image,
            is_complex: true,
            image_data: Some("data:image/jpeg;base64,BBBB".to_string()),
        };
        let q = QuestionRequest::from(wire);
        assert_eq!(q.question, "data:image/jpeg;base64,BBBB");
    }

    #[test]
    fn test_solve_response_serializes_one_field() {
        let ok = serde_json::to_string(&SolveResponse::success("x = 2")).expect("serializable");
        assert_eq!(ok, r#"{"answer":"x = 2"}"#);
        let err = serde_json::to_string(&SolveResponse::failure("boom")).expect("serializable");
        assert_eq!(err, r#"{"error":"boom"}"#);
    }

    #[test]
    fn test_first_content_skips_empty_and_null() {
        let null: GroqResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#)
                .expect("valid upstream body");
        assert_eq!(null.first_content(), None);
        assert_eq!(GroqResponse::default().first_content(), None);
        assert_eq!(GroqResponse::with_content("").first_content(), None);
        assert_eq!(GroqResponse::with_content(" \n").first_content(), Some(" \n"));
        assert_eq!(GroqResponse::with_content("x = 2").first_content(), Some("x = 2"));
    }
}
