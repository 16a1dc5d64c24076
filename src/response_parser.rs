//! Normalization of free-text model output into typed records.
//!
//! Each parser is a pure function of the response text. Roadmap and problem
//! parsing can fail with [`ParseError`]; quiz and validation parsing always
//! produce a value.

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::models::{
    Difficulty, Example, Module, ProblemDraft, QuizQuestion, RoadmapPlan, Section,
    ValidationResult, Verdict, total_modules,
};

pub const DEFAULT_ROADMAP_ICON: &str = "💻";
pub const DEFAULT_ROADMAP_COLOR: &str = "#4285F4";

static PROBLEM_ARRAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[\s*\{.+\}\s*\]").expect("valid problem array pattern"));
static ANALYSIS_SECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)ANALYSIS:(.*?)(?:FEEDBACK:|VERDICT:|SUGGESTIONS:|$)")
        .expect("valid analysis pattern")
});
static FEEDBACK_SECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)FEEDBACK:(.*?)(?:SUGGESTIONS:|ANALYSIS:|VERDICT:|$)")
        .expect("valid feedback pattern")
});
static SUGGESTIONS_SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)SUGGESTIONS:(.*?)$").expect("valid suggestions pattern"));
static VERDICT_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)VERDICT:").expect("valid verdict pattern"));

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Expected a JSON object")]
    NotAnObject,

    #[error("Expected a JSON array")]
    NotAnArray,

    #[error("Required field '{0}' is missing")]
    MissingField(&'static str),

    #[error("No usable entries in response")]
    NoUsableEntries,
}

// ============================================================================
// Roadmap (fenced JSON object)
// ============================================================================

#[derive(Deserialize)]
struct RawRoadmap {
    name: Option<String>,
    icon: Option<String>,
    color: Option<String>,
    description: Option<String>,
    #[serde(default)]
    roadmap: Vec<RawSection>,
}

#[derive(Deserialize)]
struct RawSection {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    modules: Vec<RawModule>,
}

#[derive(Deserialize)]
struct RawModule {
    #[serde(default)]
    name: String,
    #[serde(default)]
    completed: bool,
    #[serde(default)]
    description: String,
}

/// Pull the inner content of a ```json fence, else of any fence, else the text itself
pub fn extract_fenced_block(content: &str) -> &str {
    if let Some((_, rest)) = content.split_once("```json") {
        return rest.split("```").next().unwrap_or_default().trim();
    }
    if let Some((_, rest)) = content.split_once("```") {
        return rest.split("```").next().unwrap_or_default().trim();
    }
    content
}

/// Parse a roadmap object. `lesson_count` is always recomputed from the modules.
pub fn parse_roadmap(content: &str) -> Result<RoadmapPlan, ParseError> {
    let json = extract_fenced_block(content);
    let value: Value = serde_json::from_str(json)?;
    if !value.is_object() {
        return Err(ParseError::NotAnObject);
    }
    let raw: RawRoadmap = serde_json::from_value(value)?;

    let sections: Vec<Section> = raw
        .roadmap
        .into_iter()
        .map(|section| Section {
            title: section.title,
            description: section.description,
            modules: section
                .modules
                .into_iter()
                .map(|m| Module {
                    name: m.name,
                    completed: m.completed,
                    description: m.description,
                })
                .collect(),
        })
        .collect();

    Ok(RoadmapPlan {
        name: raw.name.ok_or(ParseError::MissingField("name"))?,
        icon: raw.icon.unwrap_or_else(|| DEFAULT_ROADMAP_ICON.to_string()),
        color: raw.color.unwrap_or_else(|| DEFAULT_ROADMAP_COLOR.to_string()),
        description: raw
            .description
            .ok_or(ParseError::MissingField("description"))?,
        lesson_count: total_modules(&sections),
        sections,
    })
}

// ============================================================================
// Problems (JSON array of objects)
// ============================================================================

const REQUIRED_PROBLEM_FIELDS: [&str; 4] = ["title", "difficulty", "category", "solution"];

/// Parse a problem array. Entries that lack a required field or are otherwise
/// malformed are dropped; the batch fails only when nothing usable remains.
pub fn parse_problems(content: &str) -> Result<Vec<ProblemDraft>, ParseError> {
    let json = PROBLEM_ARRAY
        .find(content)
        .map(|m| m.as_str())
        .unwrap_or(content);

    let entries = match serde_json::from_str::<Value>(json)? {
        Value::Array(entries) => entries,
        _ => return Err(ParseError::NotAnArray),
    };

    let problems: Vec<ProblemDraft> = entries.iter().filter_map(problem_from_entry).collect();
    if problems.is_empty() {
        return Err(ParseError::NoUsableEntries);
    }

    Ok(problems)
}

fn problem_from_entry(entry: &Value) -> Option<ProblemDraft> {
    let object = entry.as_object()?;
    if !REQUIRED_PROBLEM_FIELDS
        .iter()
        .all(|field| object.contains_key(*field))
    {
        return None;
    }

    let raw_examples = object.get("examplesList").or_else(|| object.get("examples"))?;
    let difficulty = object["difficulty"].as_str()?.parse::<Difficulty>().ok()?;

    let mut seen_ids = HashSet::new();
    let mut examples = Vec::new();
    for (position, raw) in raw_examples.as_array()?.iter().enumerate() {
        let example = example_from_value(raw, position)?;
        if !seen_ids.insert(example.id) {
            return None;
        }
        examples.push(example);
    }
    if examples.is_empty() {
        return None;
    }

    Some(ProblemDraft {
        title: scalar_text(&object["title"]).filter(|t| !t.trim().is_empty())?,
        difficulty,
        category: scalar_text(&object["category"])?,
        solution: scalar_text(&object["solution"])?,
        examples,
    })
}

fn example_from_value(value: &Value, position: usize) -> Option<Example> {
    let object = value.as_object()?;
    let id = match object.get("id") {
        Some(Value::Number(n)) => u32::try_from(n.as_u64()?).ok()?,
        Some(Value::String(s)) => s.trim().parse().ok()?,
        None | Some(Value::Null) => position as u32 + 1,
        Some(_) => return None,
    };

    Some(Example {
        id,
        input: scalar_text(object.get("input")?)?,
        output: scalar_text(object.get("output")?)?,
        explanation: object
            .get("explanation")
            .and_then(scalar_text)
            .unwrap_or_default(),
    })
}

/// Models sometimes emit numbers or arrays where text is expected.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

// ============================================================================
// Quiz (line-delimited key/value blocks)
// ============================================================================

#[derive(Default)]
struct QuestionBuilder {
    question: Option<String>,
    options: Vec<String>,
    correct_answer: Option<i32>,
}

impl QuestionBuilder {
    fn finish(self) -> Option<QuizQuestion> {
        Some(QuizQuestion {
            question: self.question?,
            options: self.options,
            correct_answer: self.correct_answer?,
        })
    }
}

/// Parse `QUESTION:` / `OPTION_n:` / `CORRECT:` blocks. Incomplete blocks are
/// discarded; an empty result is not an error.
pub fn parse_quiz(content: &str) -> Vec<QuizQuestion> {
    let mut questions = Vec::new();
    let mut current = QuestionBuilder::default();

    for line in content.trim().lines().map(str::trim) {
        if line.is_empty() {
            continue;
        }

        if let Some(text) = line.strip_prefix("QUESTION:") {
            let finished = std::mem::take(&mut current);
            questions.extend(finished.finish());
            current.question = Some(text.trim().to_string());
        } else if line.starts_with("OPTION_") {
            if let Some((_, option)) = line.split_once(':') {
                current.options.push(option.trim().to_string());
            }
        } else if let Some(index) = line.strip_prefix("CORRECT:") {
            if let Ok(index) = index.trim().parse::<i32>() {
                current.correct_answer = Some(index);
            }
        }
    }
    questions.extend(current.finish());

    questions
}

// ============================================================================
// Validation (section-delimited verdict)
// ============================================================================

/// Extract verdict and sections from a grading response. Never fails: a
/// response without "VERDICT: CORRECT" is graded incorrect.
pub fn parse_validation(content: &str) -> ValidationResult {
    let verdict = if content.to_uppercase().contains("VERDICT: CORRECT") {
        Verdict::Correct
    } else {
        Verdict::Incorrect
    };

    let analysis = capture_section(&ANALYSIS_SECTION, content).unwrap_or_default();

    let feedback = match capture_section(&FEEDBACK_SECTION, content) {
        Some(feedback) => feedback,
        None => match VERDICT_MARKER.find(content) {
            Some(marker) => content[marker.end()..].trim().to_string(),
            None => content.to_string(),
        },
    };

    let suggestions = capture_section(&SUGGESTIONS_SECTION, content).unwrap_or_default();

    ValidationResult {
        verdict,
        analysis,
        feedback,
        suggestions,
        raw_text: content.to_string(),
    }
}

fn capture_section(pattern: &Regex, content: &str) -> Option<String> {
    pattern
        .captures(content)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
}
