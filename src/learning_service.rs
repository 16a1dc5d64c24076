use chrono::Utc;
use uuid::Uuid;

use crate::auth::{hash_password, verify_password};
use crate::database::Database;
use crate::errors::{ApiError, classify_database_error};
use crate::llm_service::LLMService;
use crate::models::*;
use crate::{log_llm_operation, log_service_start, log_service_warn};

const SERVICE: &str = "learning_service";

/// Longest model evaluation echoed back after a toggle, in characters
pub const MAX_EVALUATION_CHARS: usize = 1000;

/// Treats absent and empty values alike
fn required(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn llm_error(operation: &str, provider: &str, err: anyhow::Error) -> ApiError {
    log_llm_operation!(error, operation, provider = provider, error = err);
    ApiError::LLMError(err.to_string())
}

/// Section titles followed by their module names, oldest roadmap first.
///
/// `roadmaps` is expected newest first, as listed from the database.
pub fn collect_topics(roadmaps: &[Roadmap]) -> Vec<String> {
    roadmaps
        .iter()
        .rev()
        .flat_map(|r| r.roadmap.iter())
        .flat_map(|section| {
            std::iter::once(section.title.clone())
                .chain(section.modules.iter().map(|m| m.name.clone()))
        })
        .collect()
}

#[derive(Clone)]
pub struct LearningService {
    db: Database,
    llm: LLMService,
}

impl LearningService {
    pub fn new(db: Database, llm: LLMService) -> Self {
        Self { db, llm }
    }

    async fn require_user(&self, email: &str) -> Result<User, ApiError> {
        self.db
            .find_user_by_email(email)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }

    // User operations
    pub async fn create_user(&self, request: SignupRequest) -> Result<UserProfile, ApiError> {
        let (Some(name), Some(email), Some(password)) = (
            required(&request.name),
            required(&request.email),
            required(&request.password),
        ) else {
            return Err(ApiError::ValidationError(
                "Name, email and password are required".to_string(),
            ));
        };
        log_service_start!(SERVICE, "create_user", user_email = email);

        if self.db.find_user_by_email(email).await?.is_some() {
            return Err(ApiError::DuplicateResource(
                "User with this email already exists".to_string(),
            ));
        }

        let user = self
            .db
            .create_user(name, email, &hash_password(password), required(&request.interest))
            .await
            .map_err(|e| classify_database_error(&e))?;

        Ok(UserProfile::from(&user))
    }

    pub async fn authenticate(&self, request: LoginRequest) -> Result<UserProfile, ApiError> {
        let (Some(email), Some(password)) = (required(&request.email), required(&request.password))
        else {
            return Err(ApiError::ValidationError(
                "Email and password are required".to_string(),
            ));
        };
        log_service_start!(SERVICE, "authenticate", user_email = email);

        match self.db.find_user_by_email(email).await? {
            Some(user) if verify_password(password, &user.password_hash) => {
                Ok(UserProfile::from(&user))
            }
            _ => Err(ApiError::Unauthorized("Invalid email or password".to_string())),
        }
    }

    // Quiz operations
    pub async fn save_quiz(&self, request: SaveQuizRequest) -> Result<QuizRecord, ApiError> {
        let (Some(email), Some(title), Some(score)) = (
            required(&request.email),
            required(&request.quiz_title),
            required(&request.score),
        ) else {
            return Err(ApiError::ValidationError(
                "Email, quiz title and score are required".to_string(),
            ));
        };
        log_service_start!(SERVICE, "save_quiz", user_email = email);

        let user = self.require_user(email).await?;
        Ok(self.db.create_quiz_record(user.id, title, score).await?)
    }

    pub async fn list_quizzes(&self, query: EmailQuery) -> Result<Vec<QuizSummary>, ApiError> {
        let email = required(&query.email)
            .ok_or_else(|| ApiError::ValidationError("Email is required".to_string()))?;

        let user = self.require_user(email).await?;
        let now = Utc::now();
        let records = self.db.list_quiz_records_by_user(user.id).await?;

        Ok(records.iter().map(|r| r.summary(now)).collect())
    }

    pub async fn generate_quiz(&self) -> Result<GeneratedQuiz, ApiError> {
        log_service_start!(SERVICE, "generate_quiz");
        log_llm_operation!(start, "generate_quiz", provider = self.llm.provider_name());

        let generated = self
            .llm
            .generate_quiz()
            .await
            .map_err(|e| llm_error("generate_quiz", self.llm.provider_name(), e))?;

        Ok(GeneratedQuiz {
            questions: generated.value,
            source: generated.source,
        })
    }

    // Roadmap operations
    pub async fn generate_roadmap(
        &self,
        request: GenerateRoadmapRequest,
    ) -> Result<GeneratedRoadmap, ApiError> {
        let (Some(email), Some(language)) = (required(&request.email), required(&request.language))
        else {
            return Err(ApiError::ValidationError(
                "Email and language are required".to_string(),
            ));
        };
        log_service_start!(SERVICE, "generate_roadmap", user_email = email);

        let user = self.require_user(email).await?;

        log_llm_operation!(start, "generate_roadmap", provider = self.llm.provider_name());
        let generated = self
            .llm
            .generate_roadmap(language)
            .await
            .map_err(|e| llm_error("generate_roadmap", self.llm.provider_name(), e))?;

        if generated.source == ContentSource::Fallback {
            log_service_warn!(SERVICE, "generate_roadmap", "stored fallback roadmap");
        }

        let roadmap = self.db.create_roadmap_record(&user, &generated.value).await?;
        Ok(GeneratedRoadmap {
            roadmap,
            source: generated.source,
        })
    }

    pub async fn list_roadmaps(&self, query: EmailQuery) -> Result<Vec<Roadmap>, ApiError> {
        let email = required(&query.email)
            .ok_or_else(|| ApiError::ValidationError("Email is required".to_string()))?;

        let user = self.require_user(email).await?;
        Ok(self.db.list_roadmaps_by_user(user.id).await?)
    }

    pub async fn get_roadmap(&self, roadmap_id: Uuid) -> Result<Roadmap, ApiError> {
        self.db
            .get_roadmap_by_id(roadmap_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Roadmap not found".to_string()))
    }

    /// Sets one module's flag and re-derives the roadmap counters
    pub async fn update_module_status(
        &self,
        roadmap_id: Uuid,
        request: UpdateModuleRequest,
    ) -> Result<Roadmap, ApiError> {
        let (Some(section_index), Some(module_index), Some(completed)) =
            (request.section_index, request.module_index, request.completed)
        else {
            return Err(ApiError::ValidationError(
                "Section index, module index and completed status are required".to_string(),
            ));
        };
        log_service_start!(SERVICE, "update_module_status", roadmap_id = roadmap_id);

        let mut roadmap = self.get_roadmap(roadmap_id).await?;
        roadmap.set_module_completed(section_index, module_index, completed)?;
        self.db.update_roadmap_record(&roadmap).await?;

        Ok(roadmap)
    }

    pub async fn record_roadmap_progress(
        &self,
        roadmap_id: Uuid,
        request: RoadmapProgressRequest,
    ) -> Result<RoadmapProgressUpdate, ApiError> {
        let (Some(email), Some(section_index), Some(module_index)) = (
            required(&request.email),
            request.section_index,
            request.module_index,
        ) else {
            return Err(ApiError::ValidationError(
                "Email, section index and module index are required".to_string(),
            ));
        };
        log_service_start!(SERVICE, "record_roadmap_progress", roadmap_id = roadmap_id);

        let user = self.require_user(email).await?;
        let mut roadmap = self.get_roadmap(roadmap_id).await?;
        if roadmap.user_id != user.id {
            return Err(ApiError::Forbidden(
                "Roadmap does not belong to this user".to_string(),
            ));
        }

        roadmap.set_module_completed(section_index, module_index, true)?;
        self.db.update_roadmap_record(&roadmap).await?;

        Ok(RoadmapProgressUpdate {
            id: roadmap.id,
            name: roadmap.name,
            progress: roadmap.progress,
            completed: roadmap.completed,
            lessons: roadmap.lessons,
            course: request.course,
            module: request.module,
            lesson: request.lesson,
            updated_section_index: section_index,
            updated_module_index: module_index,
        })
    }

    pub async fn explain_subtopic(&self, query: ExplanationQuery) -> Result<Explanation, ApiError> {
        let (Some(course_title), Some(module_title), Some(subtopic)) = (
            required(&query.course_title),
            required(&query.module_title),
            required(&query.subtopic),
        ) else {
            return Err(ApiError::ValidationError(
                "Course title, module title and subtopic are required".to_string(),
            ));
        };
        log_service_start!(SERVICE, "explain_subtopic");

        let explanation = self
            .llm
            .explain_subtopic(course_title, module_title, subtopic)
            .await
            .map_err(|e| llm_error("explain_subtopic", self.llm.provider_name(), e))?;

        Ok(Explanation {
            course_title: course_title.to_string(),
            module_title: module_title.to_string(),
            subtopic: subtopic.to_string(),
            explanation,
        })
    }

    // Problem operations
    pub async fn generate_problems(&self, request: EmailQuery) -> Result<ProblemBatch, ApiError> {
        let email = required(&request.email)
            .ok_or_else(|| ApiError::ValidationError("Email is required".to_string()))?;
        log_service_start!(SERVICE, "generate_problems", user_email = email);

        let user = self.require_user(email).await?;

        let existing = self.db.list_problems_by_user(user.id).await?;
        if !existing.is_empty() {
            return Ok(ProblemBatch {
                message: "Found existing problems".to_string(),
                origin: ProblemOrigin::Existing,
                problems: existing,
            });
        }

        let roadmaps = self.db.list_roadmaps_by_user(user.id).await?;
        if roadmaps.is_empty() {
            return Err(ApiError::NotFound(
                "No roadmaps found for this user".to_string(),
            ));
        }

        let topics = collect_topics(&roadmaps);
        log_llm_operation!(start, "generate_problems", provider = self.llm.provider_name());
        let generated = self
            .llm
            .generate_problems(&topics)
            .await
            .map_err(|e| llm_error("generate_problems", self.llm.provider_name(), e))?;

        let problems = self
            .db
            .create_problem_records(user.id, &generated.value)
            .await?;

        let message = match generated.source {
            ContentSource::Model => "Problems generated successfully",
            ContentSource::Fallback => {
                log_service_warn!(SERVICE, "generate_problems", "stored fallback problems");
                "Generated default problems due to JSON parsing error"
            }
        };

        Ok(ProblemBatch {
            message: message.to_string(),
            origin: generated.source.into(),
            problems,
        })
    }

    pub async fn list_problems(&self, query: EmailQuery) -> Result<Vec<Problem>, ApiError> {
        let email = required(&query.email)
            .ok_or_else(|| ApiError::ValidationError("Email is required".to_string()))?;

        let user = self.require_user(email).await?;
        Ok(self.db.list_problems_by_user(user.id).await?)
    }

    async fn require_owned_problem(&self, email: &str, problem_id: Uuid) -> Result<Problem, ApiError> {
        let user = self.require_user(email).await?;
        self.db
            .get_problem_by_id(problem_id, user.id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Problem not found for this user".to_string()))
    }

    /// Unsolve without a solution, otherwise grade the solution and store the verdict
    pub async fn toggle_problem_status(
        &self,
        problem_id: Uuid,
        request: ToggleProblemRequest,
    ) -> Result<ToggleOutcome, ApiError> {
        let email = required(&request.email)
            .ok_or_else(|| ApiError::ValidationError("Email is required".to_string()))?;
        log_service_start!(SERVICE, "toggle_problem_status", problem_id = problem_id);

        let mut problem = self.require_owned_problem(email, problem_id).await?;

        let Some(user_solution) = required(&request.user_solution) else {
            if !problem.solved {
                return Err(ApiError::ValidationError(
                    "Please provide a solution to validate".to_string(),
                ));
            }

            problem.solved = false;
            self.db.update_problem_record(&problem).await?;
            return Ok(ToggleOutcome {
                message: "Problem marked as unsolved".to_string(),
                problem,
                is_correct: None,
                analysis: String::new(),
                feedback: "Status updated without solution validation".to_string(),
                suggestions: String::new(),
                full_evaluation: None,
            });
        };

        log_llm_operation!(start, "validate_solution", provider = self.llm.provider_name());
        let result = self
            .llm
            .validate_solution(&problem, user_solution)
            .await
            .map_err(|e| llm_error("validate_solution", self.llm.provider_name(), e))?;

        problem.solved = result.is_correct();
        self.db.update_problem_record(&problem).await?;

        let message = if result.is_correct() {
            "Problem marked as solved"
        } else {
            "Solution is incorrect"
        };

        Ok(ToggleOutcome {
            message: message.to_string(),
            problem,
            is_correct: Some(result.is_correct()),
            full_evaluation: Some(result.raw_text.chars().take(MAX_EVALUATION_CHARS).collect()),
            analysis: result.analysis,
            feedback: result.feedback,
            suggestions: result.suggestions,
        })
    }

    /// Grade a solution without touching the stored solved flag
    pub async fn preview_solution_validation(
        &self,
        problem_id: Uuid,
        request: ValidateSolutionRequest,
    ) -> Result<ValidationPreview, ApiError> {
        let (Some(email), Some(user_solution)) =
            (required(&request.email), required(&request.user_solution))
        else {
            return Err(ApiError::ValidationError(
                "Email and user solution are required".to_string(),
            ));
        };
        log_service_start!(SERVICE, "preview_solution_validation", problem_id = problem_id);

        let problem = self.require_owned_problem(email, problem_id).await?;

        log_llm_operation!(start, "validate_solution", provider = self.llm.provider_name());
        let result = self
            .llm
            .validate_solution(&problem, user_solution)
            .await
            .map_err(|e| llm_error("validate_solution", self.llm.provider_name(), e))?;

        Ok(ValidationPreview {
            problem_title: problem.title,
            problem_description: problem.solution,
            user_solution: user_solution.to_string(),
            raw_response: result.raw_text,
            verdict: result.verdict,
            examples: problem.examples,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roadmap(sections: Vec<Section>) -> Roadmap {
        Roadmap {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            email: "learner@example.com".to_string(),
            name: "Go Fundamentals".to_string(),
            icon: "💻".to_string(),
            color: "#00ADD8".to_string(),
            progress: 0,
            completed: 0,
            lessons: 0,
            description: String::new(),
            roadmap: sections,
            created_at: Utc::now(),
        }
    }

    fn section(title: &str, modules: &[&str]) -> Section {
        Section {
            title: title.to_string(),
            description: String::new(),
            modules: modules
                .iter()
                .map(|name| Module {
                    name: name.to_string(),
                    completed: false,
                    description: String::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_collect_topics_starts_with_oldest_roadmap() {
        // Newest first, as the database lists them
        let roadmaps = vec![
            roadmap(vec![section("Tooling", &[])]),
            roadmap(vec![
                section("Basics", &["Syntax", "Types"]),
                section("Concurrency", &["Goroutines"]),
            ]),
        ];

        assert_eq!(
            collect_topics(&roadmaps),
            vec!["Basics", "Syntax", "Types", "Concurrency", "Goroutines", "Tooling"]
        );
    }

    #[test]
    fn test_required_treats_empty_as_missing() {
        assert_eq!(required(&None), None);
        assert_eq!(required(&Some(String::new())), None);
        assert_eq!(required(&Some("x".to_string())), Some("x"));
    }
}
