use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub interest: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Public view of a user returned after a successful login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
    pub name: String,
    pub interest: Option<String>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            name: user.name.clone(),
            interest: user.interest.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub score: String, // e.g. "4/5"
    pub created_at: DateTime<Utc>,
}

/// Dashboard rendering of a saved quiz score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSummary {
    pub title: String,
    pub score: String,
    pub icon: String,
    pub bg_color: String,
    pub text_color: String,
    pub time_ago: String,
}

impl QuizRecord {
    pub fn summary(&self, now: DateTime<Utc>) -> QuizSummary {
        let (icon, bg_color, text_color) = match self.title.as_str() {
            "JavaScript" => ("code", "bg-yellow-100", "text-yellow-600"),
            "Python" => ("code", "bg-blue-100", "text-blue-600"),
            "Java" => ("code", "bg-orange-100", "text-orange-600"),
            "C++" => ("code", "bg-purple-100", "text-purple-600"),
            "HTML/CSS" => ("code", "bg-green-100", "text-green-600"),
            "React" => ("code", "bg-blue-100", "text-blue-400"),
            "Node.js" => ("code", "bg-green-100", "text-green-600"),
            "SQL" => ("database", "bg-blue-100", "text-blue-500"),
            _ => ("code", "bg-gray-100", "text-gray-600"),
        };

        let days_ago = (now - self.created_at).num_days();
        let time_ago = if days_ago > 0 {
            format!("{} days ago", days_ago)
        } else {
            "Today".to_string()
        };

        QuizSummary {
            title: self.title.clone(),
            score: self.score.clone(),
            icon: icon.to_string(),
            bg_color: bg_color.to_string(),
            text_color: text_color.to_string(),
            time_ago,
        }
    }
}

// ============================================================================
// Roadmaps
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    pub completed: bool,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub description: String,
    pub modules: Vec<Module>,
}

/// A learning plan for one language, as produced by generation or fallback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadmapPlan {
    pub name: String,
    pub icon: String,
    pub color: String,
    pub description: String,
    pub lesson_count: u32,
    pub sections: Vec<Section>,
}

/// Completion counters derived from the module flags of a roadmap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadmapProgress {
    pub completed_count: u32,
    pub lesson_count: u32,
    pub progress_percent: u32,
}

impl RoadmapProgress {
    /// Full re-scan of every section; never updated incrementally.
    pub fn from_sections(sections: &[Section]) -> Self {
        let mut completed_count = 0u32;
        let mut lesson_count = 0u32;
        for module in sections.iter().flat_map(|s| s.modules.iter()) {
            lesson_count += 1;
            if module.completed {
                completed_count += 1;
            }
        }

        let progress_percent = if lesson_count > 0 {
            completed_count * 100 / lesson_count
        } else {
            0
        };

        Self {
            completed_count,
            lesson_count,
            progress_percent,
        }
    }
}

pub fn total_modules(sections: &[Section]) -> u32 {
    sections.iter().map(|s| s.modules.len() as u32).sum()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Roadmap {
    pub id: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub icon: String,
    pub color: String,
    pub progress: u32,
    pub completed: u32,
    pub lessons: u32,
    pub description: String,
    pub roadmap: Vec<Section>,
    pub created_at: DateTime<Utc>,
}

impl Roadmap {
    pub fn set_module_completed(
        &mut self,
        section_index: i64,
        module_index: i64,
        completed: bool,
    ) -> Result<RoadmapProgress, ModuleIndexError> {
        let section = usize::try_from(section_index)
            .ok()
            .and_then(|i| self.roadmap.get_mut(i))
            .ok_or(ModuleIndexError::Section(section_index))?;
        let module = usize::try_from(module_index)
            .ok()
            .and_then(|i| section.modules.get_mut(i))
            .ok_or(ModuleIndexError::Module(module_index))?;
        module.completed = completed;

        Ok(self.recompute_progress())
    }

    /// Recompute completed/lessons/progress from the module flags
    pub fn recompute_progress(&mut self) -> RoadmapProgress {
        let progress = RoadmapProgress::from_sections(&self.roadmap);
        self.completed = progress.completed_count;
        self.lessons = progress.lesson_count;
        self.progress = progress.progress_percent;
        progress
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModuleIndexError {
    #[error("Invalid section index: {0}")]
    Section(i64),
    #[error("Invalid module index: {0}")]
    Module(i64),
}

/// Echo of a progress update made from a lesson page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadmapProgressUpdate {
    pub id: Uuid,
    pub name: String,
    pub progress: u32,
    pub completed: u32,
    pub lessons: u32,
    pub course: Option<String>,
    pub module: Option<String>,
    pub lesson: Option<String>,
    pub updated_section_index: i64,
    pub updated_module_index: i64,
}

// ============================================================================
// Problems
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(anyhow::anyhow!("Unknown difficulty '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    pub id: u32,
    pub input: String,
    pub output: String,
    pub explanation: String,
}

/// A practice problem before it is assigned to a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemDraft {
    pub title: String,
    pub difficulty: Difficulty,
    pub category: String,
    pub solution: String,
    pub examples: Vec<Example>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub difficulty: Difficulty,
    pub solved: bool,
    pub category: String,
    pub solution: String,
    pub examples: Vec<Example>,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Quiz and validation
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Correct,
    Incorrect,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub verdict: Verdict,
    pub analysis: String,
    pub feedback: String,
    pub suggestions: String,
    pub raw_text: String,
}

impl ValidationResult {
    pub fn is_correct(&self) -> bool {
        self.verdict == Verdict::Correct
    }
}

/// Whether a generated payload came from the model or the built-in defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentSource {
    Model,
    Fallback,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Generated<T> {
    pub value: T,
    pub source: ContentSource,
}

/// Outcome of asking for a problem set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProblemOrigin {
    Existing,
    Model,
    Fallback,
}

impl From<ContentSource> for ProblemOrigin {
    fn from(source: ContentSource) -> Self {
        match source {
            ContentSource::Model => ProblemOrigin::Model,
            ContentSource::Fallback => ProblemOrigin::Fallback,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemBatch {
    pub message: String,
    pub origin: ProblemOrigin,
    pub problems: Vec<Problem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedRoadmap {
    pub roadmap: Roadmap,
    pub source: ContentSource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedQuiz {
    pub questions: Vec<QuizQuestion>,
    pub source: ContentSource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explanation {
    pub course_title: String,
    pub module_title: String,
    pub subtopic: String,
    pub explanation: String,
}

/// Result of toggling a problem's solved flag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleOutcome {
    pub message: String,
    pub problem: Problem,
    pub is_correct: Option<bool>,
    pub analysis: String,
    pub feedback: String,
    pub suggestions: String,
    pub full_evaluation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationPreview {
    pub problem_title: String,
    pub problem_description: String,
    pub user_solution: String,
    pub raw_response: String,
    pub verdict: Verdict,
    pub examples: Vec<Example>,
}

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub interest: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaveQuizRequest {
    pub email: Option<String>,
    #[serde(alias = "quizTitle")]
    pub quiz_title: Option<String>,
    pub score: Option<String>,
}

/// Query string or body carrying only the owner's email
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmailQuery {
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateRoadmapRequest {
    pub email: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateModuleRequest {
    #[serde(alias = "sectionIndex")]
    pub section_index: Option<i64>,
    #[serde(alias = "moduleIndex")]
    pub module_index: Option<i64>,
    pub completed: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoadmapProgressRequest {
    pub email: Option<String>,
    #[serde(alias = "sectionIndex")]
    pub section_index: Option<i64>,
    #[serde(alias = "moduleIndex")]
    pub module_index: Option<i64>,
    pub course: Option<String>,
    pub module: Option<String>,
    pub lesson: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExplanationQuery {
    pub course_title: Option<String>,
    pub module_title: Option<String>,
    pub subtopic: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToggleProblemRequest {
    pub email: Option<String>,
    #[serde(alias = "userSolution")]
    pub user_solution: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValidateSolutionRequest {
    pub email: Option<String>,
    #[serde(alias = "userSolution")]
    pub user_solution: Option<String>,
}
