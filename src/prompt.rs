//! Maps a question to the system and user messages sent upstream.
//!
//! Everything here is pure: same input, same prompt, no I/O.

use crate::models::{InputType, QuestionRequest, Subject};

pub const ADVANCED_SYSTEM_PROMPT: &str = "You are an advanced mathematics tutor specializing in complex mathematical problems. Provide detailed, rigorous solutions with formal mathematical notation. Explore multiple solution approaches when appropriate, discuss mathematical theory behind the solutions, and point out connections to other areas of mathematics. Use latex formatting for advanced equations.";

pub const TUTOR_SYSTEM_PROMPT: &str = "You are a mathematics tutor specialized in helping students solve math problems. Provide clear, step-by-step solutions, identify common mistakes, and explain mathematical concepts. Always check the student's work for errors and explain the correct approach. Include latex-style formatting for equations when appropriate.";

pub const IMAGE_ANNOTATION: &str =
    "[The question is from an image, which appears to show the following math problem: ";

pub const VOICE_ANNOTATION: &str = "[The question was provided via voice and transcribed as: ";

pub const VOICE_CORRECTION_REQUEST: &str =
    "Please correct any potential transcription errors if needed.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Instructional sentence opening the user prompt for a subject.
pub fn subject_prefix(subject: Subject) -> &'static str {
    match subject {
        Subject::Algebra => {
            "Solve this algebra problem step by step, showing all work and explaining each step clearly:"
        }
        Subject::Geometry => {
            "Solve this geometry problem showing all steps, diagrams are described in text:"
        }
        Subject::Calculus => {
            "Solve this calculus problem with all steps and relevant rules/theorems:"
        }
        Subject::Trigonometry => {
            "Solve this trigonometry problem showing all necessary identities and steps:"
        }
        Subject::Statistics => {
            "Solve this statistics problem with the relevant formulas and calculations:"
        }
        Subject::ProblemSolving => {
            "Solve this math word problem by identifying the approach and showing all steps:"
        }
        Subject::AdvancedMathematics => {
            "Solve this advanced mathematics problem with full mathematical rigor, showing all necessary steps and theoretical concepts:"
        }
        Subject::General => "Solve this math problem step by step:",
    }
}

pub fn system_instruction(is_complex: bool) -> &'static str {
    if is_complex {
        ADVANCED_SYSTEM_PROMPT
    } else {
        TUTOR_SYSTEM_PROMPT
    }
}

pub fn user_prompt(question: &str, subject: &str, input_type: InputType) -> String {
    let prefix = subject_prefix(Subject::from_tag(subject));
    match input_type {
        InputType::Image => format!("{prefix} {IMAGE_ANNOTATION}{question}]"),
        InputType::Voice => {
            format!("{prefix} {VOICE_ANNOTATION}{question}]. {VOICE_CORRECTION_REQUEST}")
        }
        InputType::Text => format!("{prefix} {question}"),
    }
}

pub fn build_prompt(req: &QuestionRequest) -> Prompt {
    Prompt {
        system: system_instruction(req.is_complex).to_string(),
        user: user_prompt(&req.question, &req.subject, req.input_type),
    }
}
