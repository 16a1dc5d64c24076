use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    errors::{ApiError, ErrorContext},
    learning_service::LearningService,
    models::*,
};

// Import logging macros
use crate::{log_api_start, log_api_success};

#[derive(Clone)]
pub struct AppState {
    pub learning_service: LearningService,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

type ErrorResponse = (StatusCode, Json<ApiResponse<()>>);

fn parse_id(raw: &str, operation: &str, resource_type: &str) -> Result<Uuid, ErrorResponse> {
    Uuid::parse_str(raw).map_err(|_| {
        ApiError::BadRequest(format!("Invalid {} id '{}'", resource_type, raw))
            .to_response_with_context(ErrorContext::new(operation, resource_type).with_id(raw))
    })
}

// User endpoints
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserProfile>>), ErrorResponse> {
    log_api_start!("signup");

    match state.learning_service.create_user(request).await {
        Ok(profile) => {
            log_api_success!("signup", user_email = profile.email, "user registered");
            Ok((StatusCode::CREATED, Json(ApiResponse::success(profile))))
        }
        Err(e) => Err(e.to_response_with_context(ErrorContext::new("signup", "user"))),
    }
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<UserProfile>>, ErrorResponse> {
    log_api_start!("login");

    match state.learning_service.authenticate(request).await {
        Ok(profile) => {
            log_api_success!("login", user_email = profile.email, "user authenticated");
            Ok(Json(ApiResponse::success(profile)))
        }
        Err(e) => Err(e.to_response_with_context(ErrorContext::new("login", "user"))),
    }
}

// Quiz endpoints
pub async fn save_quiz(
    State(state): State<AppState>,
    Json(request): Json<SaveQuizRequest>,
) -> Result<(StatusCode, Json<ApiResponse<QuizRecord>>), ErrorResponse> {
    log_api_start!("save_quiz");

    match state.learning_service.save_quiz(request).await {
        Ok(record) => {
            log_api_success!("save_quiz", "quiz score saved");
            Ok((StatusCode::CREATED, Json(ApiResponse::success(record))))
        }
        Err(e) => Err(e.to_response_with_context(ErrorContext::new("save_quiz", "quiz"))),
    }
}

pub async fn list_quizzes(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> Result<Json<ApiResponse<Vec<QuizSummary>>>, ErrorResponse> {
    log_api_start!("list_quizzes");

    match state.learning_service.list_quizzes(query).await {
        Ok(quizzes) => {
            log_api_success!("list_quizzes", count = quizzes.len(), "quizzes retrieved");
            Ok(Json(ApiResponse::success(quizzes)))
        }
        Err(e) => Err(e.to_response_with_context(ErrorContext::new("list_quizzes", "quiz"))),
    }
}

pub async fn generate_quiz(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<GeneratedQuiz>>, ErrorResponse> {
    log_api_start!("generate_quiz");

    match state.learning_service.generate_quiz().await {
        Ok(quiz) => {
            log_api_success!("generate_quiz", count = quiz.questions.len(), "quiz generated");
            Ok(Json(ApiResponse::success(quiz)))
        }
        Err(e) => Err(e.to_response_with_context(ErrorContext::new("generate_quiz", "quiz"))),
    }
}

// Roadmap endpoints
pub async fn generate_roadmap(
    State(state): State<AppState>,
    Json(request): Json<GenerateRoadmapRequest>,
) -> Result<(StatusCode, Json<ApiResponse<GeneratedRoadmap>>), ErrorResponse> {
    log_api_start!("generate_roadmap");

    match state.learning_service.generate_roadmap(request).await {
        Ok(generated) => {
            log_api_success!(
                "generate_roadmap",
                roadmap_id = generated.roadmap.id,
                "roadmap created"
            );
            Ok((StatusCode::CREATED, Json(ApiResponse::success(generated))))
        }
        Err(e) => Err(e.to_response_with_context(ErrorContext::new(
            "generate_roadmap",
            "roadmap",
        ))),
    }
}

pub async fn list_roadmaps(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> Result<Json<ApiResponse<Vec<Roadmap>>>, ErrorResponse> {
    log_api_start!("list_roadmaps");

    match state.learning_service.list_roadmaps(query).await {
        Ok(roadmaps) => {
            log_api_success!("list_roadmaps", count = roadmaps.len(), "roadmaps retrieved");
            Ok(Json(ApiResponse::success(roadmaps)))
        }
        Err(e) => Err(e.to_response_with_context(ErrorContext::new("list_roadmaps", "roadmap"))),
    }
}

pub async fn get_roadmap(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Roadmap>>, ErrorResponse> {
    let roadmap_id = parse_id(&id, "get_roadmap", "roadmap")?;
    log_api_start!("get_roadmap", roadmap_id = roadmap_id);

    match state.learning_service.get_roadmap(roadmap_id).await {
        Ok(roadmap) => Ok(Json(ApiResponse::success(roadmap))),
        Err(e) => Err(e.to_response_with_context(
            ErrorContext::new("get_roadmap", "roadmap").with_id(&id),
        )),
    }
}

pub async fn update_module_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateModuleRequest>,
) -> Result<Json<ApiResponse<Roadmap>>, ErrorResponse> {
    let roadmap_id = parse_id(&id, "update_module_status", "roadmap")?;
    log_api_start!("update_module_status", roadmap_id = roadmap_id);

    match state
        .learning_service
        .update_module_status(roadmap_id, request)
        .await
    {
        Ok(roadmap) => {
            log_api_success!(
                "update_module_status",
                roadmap_id = roadmap_id,
                format!("progress now {}%", roadmap.progress)
            );
            Ok(Json(ApiResponse::success(roadmap)))
        }
        Err(e) => Err(e.to_response_with_context(
            ErrorContext::new("update_module_status", "roadmap").with_id(&id),
        )),
    }
}

pub async fn record_roadmap_progress(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<RoadmapProgressRequest>,
) -> Result<Json<ApiResponse<RoadmapProgressUpdate>>, ErrorResponse> {
    let roadmap_id = parse_id(&id, "record_roadmap_progress", "roadmap")?;
    log_api_start!("record_roadmap_progress", roadmap_id = roadmap_id);

    match state
        .learning_service
        .record_roadmap_progress(roadmap_id, request)
        .await
    {
        Ok(update) => {
            log_api_success!(
                "record_roadmap_progress",
                roadmap_id = roadmap_id,
                format!("progress now {}%", update.progress)
            );
            Ok(Json(ApiResponse::success(update)))
        }
        Err(e) => Err(e.to_response_with_context(
            ErrorContext::new("record_roadmap_progress", "roadmap").with_id(&id),
        )),
    }
}

// Explanation endpoint
pub async fn get_explanation(
    State(state): State<AppState>,
    Query(query): Query<ExplanationQuery>,
) -> Result<Json<ApiResponse<Explanation>>, ErrorResponse> {
    log_api_start!("get_explanation");

    match state.learning_service.explain_subtopic(query).await {
        Ok(explanation) => Ok(Json(ApiResponse::success(explanation))),
        Err(e) => Err(e.to_response_with_context(ErrorContext::new(
            "get_explanation",
            "explanation",
        ))),
    }
}

// Problem endpoints
pub async fn generate_problems(
    State(state): State<AppState>,
    Json(request): Json<EmailQuery>,
) -> Result<Json<ApiResponse<ProblemBatch>>, ErrorResponse> {
    log_api_start!("generate_problems");

    match state.learning_service.generate_problems(request).await {
        Ok(batch) => {
            log_api_success!("generate_problems", count = batch.problems.len(), batch.message);
            Ok(Json(ApiResponse::success(batch)))
        }
        Err(e) => Err(e.to_response_with_context(ErrorContext::new(
            "generate_problems",
            "problem",
        ))),
    }
}

pub async fn list_problems(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> Result<Json<ApiResponse<Vec<Problem>>>, ErrorResponse> {
    log_api_start!("list_problems");

    match state.learning_service.list_problems(query).await {
        Ok(problems) => {
            log_api_success!("list_problems", count = problems.len(), "problems retrieved");
            Ok(Json(ApiResponse::success(problems)))
        }
        Err(e) => Err(e.to_response_with_context(ErrorContext::new("list_problems", "problem"))),
    }
}

pub async fn toggle_problem_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ToggleProblemRequest>,
) -> Result<Json<ApiResponse<ToggleOutcome>>, ErrorResponse> {
    let problem_id = parse_id(&id, "toggle_problem_status", "problem")?;
    log_api_start!("toggle_problem_status", problem_id = problem_id);

    match state
        .learning_service
        .toggle_problem_status(problem_id, request)
        .await
    {
        Ok(outcome) => {
            log_api_success!("toggle_problem_status", problem_id = problem_id, outcome.message);
            Ok(Json(ApiResponse::success(outcome)))
        }
        Err(e) => Err(e.to_response_with_context(
            ErrorContext::new("toggle_problem_status", "problem").with_id(&id),
        )),
    }
}

pub async fn preview_solution_validation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ValidateSolutionRequest>,
) -> Result<Json<ApiResponse<ValidationPreview>>, ErrorResponse> {
    let problem_id = parse_id(&id, "preview_solution_validation", "problem")?;
    log_api_start!("preview_solution_validation", problem_id = problem_id);

    match state
        .learning_service
        .preview_solution_validation(problem_id, request)
        .await
    {
        Ok(preview) => Ok(Json(ApiResponse::success(preview))),
        Err(e) => Err(e.to_response_with_context(
            ErrorContext::new("preview_solution_validation", "problem").with_id(&id),
        )),
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // User routes
        .route("/api/users/signup", post(signup))
        .route("/api/users/login", post(login))

        // Quiz routes
        .route("/api/quizzes", post(save_quiz))
        .route("/api/quizzes", get(list_quizzes))
        .route("/api/quiz/generate", get(generate_quiz))

        // Roadmap routes
        .route("/api/roadmaps/generate", post(generate_roadmap))
        .route("/api/roadmaps", get(list_roadmaps))
        .route("/api/roadmaps/:id", get(get_roadmap))
        .route("/api/roadmaps/:id/modules", put(update_module_status))
        .route("/api/roadmaps/:id/progress", post(record_roadmap_progress))

        // Explanation routes
        .route("/api/explanations", get(get_explanation))

        // Problem routes
        .route("/api/problems/generate", post(generate_problems))
        .route("/api/problems", get(list_problems))
        .route("/api/problems/:id/toggle", post(toggle_problem_status))
        .route("/api/problems/:id/validate", post(preview_solution_validation))

        .with_state(state)
}
