//! # API Server Module
//!
//! ## Purpose
//! REST surface consumed by the client UI. Every analysis section is
//! exposed independently: a client polls an analysis and renders each
//! section as its result, a loading indicator or a section-local error,
//! never an all-or-nothing failure screen.
//!
//! ## Input/Output Specification
//! - **Input**: HTTP requests with exercise text, search terms, analysis ids
//! - **Output**: JSON responses with per-section status/result/error
//! - **Endpoints**: exercise submission and refresh, analysis polling,
//!   interactive search, single-word lookup, health, stats
//!
//! ## Key Features
//! - Submitting an exercise launches all analyses and returns immediately
//! - Polling never blocks on a network round trip
//! - CORS support for web frontends

use crate::analysis::ExerciseAnalysisCoordinator;
use crate::errors::{AnalysisError, Result};
use crate::exercise::EssayExercise;
use crate::search_model::SearchDataModel;
use crate::task::{AnalysisTask, TaskStatus};
use crate::utils::{TextUtils, Timer};
use crate::{AnalysisId, AppState, CefrLevel, Language, PartOfSpeech, WordSense};
use actix_cors::Cors;
use actix_web::middleware::Condition;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// API server wrapping the shared application state
pub struct ApiServer {
    app_state: AppState,
}

/// Exercise submission payload
#[derive(Debug, Deserialize)]
pub struct CreateExerciseRequest {
    /// Client-supplied exercise id; re-submitting the same id replaces the
    /// previous analysis
    #[serde(default)]
    pub exercise_id: Option<AnalysisId>,
    pub language: Language,
    pub target_level: CefrLevel,
    #[serde(default)]
    pub min_words: usize,
    #[serde(default = "default_max_words")]
    pub max_words: usize,
    pub text: String,
}

fn default_max_words() -> usize {
    10_000
}

/// Text replacement payload
#[derive(Debug, Deserialize)]
pub struct UpdateTextRequest {
    pub text: String,
}

/// Interactive search payload
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub term: String,
    #[serde(default = "default_language")]
    pub language: Language,
}

/// Single-word lookup query parameters
#[derive(Debug, Deserialize)]
pub struct WordQuery {
    #[serde(default = "default_language")]
    pub language: Language,
}

fn default_language() -> Language {
    Language::English
}

/// One observable analysis section: result, still loading, or its own error
#[derive(Debug, Serialize)]
pub struct SectionView<T: Serialize> {
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> SectionView<T>
where
    T: Serialize + Clone + Send + Sync + 'static,
{
    fn from_task(task: &AnalysisTask<T>) -> Self {
        Self {
            status: task.status(),
            result: task.result().map(|value| (*value).clone()),
            error: task.error().map(|err| err.to_string()),
        }
    }
}

/// Full polling view of one exercise analysis
#[derive(Debug, Serialize)]
pub struct AnalysisView {
    pub exercise_id: AnalysisId,
    pub generation: u64,
    pub levels: SectionView<crate::analysis::LevelAnalysis>,
    pub frequency: SectionView<crate::sources::FrequencyReport>,
    pub parts_of_speech: SectionView<crate::analysis::PosAnalysis>,
}

/// Per-source section of an interactive search response
#[derive(Debug, Serialize)]
pub struct SearchSectionView {
    pub source: String,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub senses: Option<Vec<WordSense>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Resolved single-word response
#[derive(Debug, Serialize)]
pub struct WordView {
    pub term: String,
    pub language: Language,
    pub part_of_speech: Option<PartOfSpeech>,
    pub level: Option<CefrLevel>,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
}

impl ApiServer {
    /// Create new API server
    pub fn new(app_state: AppState) -> Self {
        Self { app_state }
    }

    /// Run the API server
    pub async fn run(self) -> Result<()> {
        let bind_addr = format!(
            "{}:{}",
            self.app_state.config.server.host, self.app_state.config.server.port
        );
        let enable_cors = self.app_state.config.server.enable_cors;

        tracing::info!("starting API server on {}", bind_addr);

        HttpServer::new(move || {
            App::new()
                .app_data(web::Data::new(self.app_state.clone()))
                .wrap(Condition::new(enable_cors, Cors::permissive()))
                .route("/exercises", web::post().to(create_exercise_handler))
                .route("/exercises/{id}/text", web::put().to(update_text_handler))
                .route("/exercises/{id}/refresh", web::post().to(refresh_handler))
                .route("/exercises/{id}/submit", web::post().to(submit_handler))
                .route("/analyses/{id}", web::get().to(analysis_handler))
                .route("/search", web::post().to(search_handler))
                .route("/words/{term}", web::get().to(word_handler))
                .route("/cache/failures", web::delete().to(invalidate_failures_handler))
                .route("/health", web::get().to(health_handler))
                .route("/stats", web::get().to(stats_handler))
        })
        .bind(&bind_addr)
        .map_err(|e| AnalysisError::Internal {
            message: format!("failed to bind server to {}: {}", bind_addr, e),
        })?
        .run()
        .await
        .map_err(|e| AnalysisError::Internal {
            message: format!("server error: {}", e),
        })?;

        Ok(())
    }
}

fn error_response(err: &AnalysisError) -> HttpResponse {
    let body = serde_json::json!({
        "error": err.category(),
        "message": err.to_string(),
    });
    match err {
        AnalysisError::InvalidExercise { .. } | AnalysisError::Config { .. } => {
            HttpResponse::BadRequest().json(body)
        }
        AnalysisError::WordNotFound { .. } => HttpResponse::NotFound().json(body),
        _ => HttpResponse::BadGateway().json(body),
    }
}

/// Submit an exercise for analysis. Launches all analyses and returns the
/// analysis id immediately; results are polled via `GET /analyses/{id}`.
async fn create_exercise_handler(
    app_state: web::Data<AppState>,
    request: web::Json<CreateExerciseRequest>,
) -> ActixResult<HttpResponse> {
    let request = request.into_inner();

    if request.text.len() > app_state.config.analysis.max_text_length {
        return Ok(error_response(&AnalysisError::InvalidExercise {
            field: "text".to_string(),
            reason: format!(
                "text exceeds the configured maximum of {} characters",
                app_state.config.analysis.max_text_length
            ),
        }));
    }

    let mut exercise = EssayExercise::new(
        request.language,
        request.target_level,
        request.min_words,
        request.max_words,
    )
    .with_text(request.text);
    if let Some(id) = request.exercise_id {
        exercise.id = id;
    }

    let coordinator =
        ExerciseAnalysisCoordinator::new(Arc::clone(&app_state.deps), exercise);
    let id = app_state.registry.insert(coordinator);

    tracing::info!(analysis = %id, "exercise accepted for analysis");
    Ok(HttpResponse::Accepted().json(serde_json::json!({ "analysis_id": id })))
}

/// Replace the exercise text; all analyses relaunch
async fn update_text_handler(
    app_state: web::Data<AppState>,
    path: web::Path<AnalysisId>,
    request: web::Json<UpdateTextRequest>,
) -> ActixResult<HttpResponse> {
    let id = path.into_inner();
    match app_state.registry.get(&id) {
        Some(coordinator) => {
            let generation = {
                let mut coordinator = coordinator.lock();
                coordinator.update_text(request.into_inner().text);
                coordinator.generation()
            };
            Ok(HttpResponse::Ok().json(serde_json::json!({
                "analysis_id": id,
                "generation": generation,
            })))
        }
        None => Ok(HttpResponse::NotFound().finish()),
    }
}

/// Relaunch all analyses over the current text
async fn refresh_handler(
    app_state: web::Data<AppState>,
    path: web::Path<AnalysisId>,
) -> ActixResult<HttpResponse> {
    let id = path.into_inner();
    match app_state.registry.get(&id) {
        Some(coordinator) => {
            let generation = {
                let mut coordinator = coordinator.lock();
                coordinator.refresh();
                coordinator.generation()
            };
            Ok(HttpResponse::Ok().json(serde_json::json!({
                "analysis_id": id,
                "generation": generation,
            })))
        }
        None => Ok(HttpResponse::NotFound().finish()),
    }
}

/// Validate the exercise against its word-count bounds
async fn submit_handler(
    app_state: web::Data<AppState>,
    path: web::Path<AnalysisId>,
) -> ActixResult<HttpResponse> {
    let id = path.into_inner();
    match app_state.registry.get(&id) {
        Some(coordinator) => {
            let validation = {
                let coordinator = coordinator.lock();
                coordinator
                    .exercise()
                    .validate(&app_state.deps.tokenizer)
            };
            match validation {
                Ok(()) => Ok(HttpResponse::Ok().json(serde_json::json!({ "valid": true }))),
                Err(err) => Ok(error_response(&err)),
            }
        }
        None => Ok(HttpResponse::NotFound().finish()),
    }
}

/// Poll the per-section state of one analysis
async fn analysis_handler(
    app_state: web::Data<AppState>,
    path: web::Path<AnalysisId>,
) -> ActixResult<HttpResponse> {
    let id = path.into_inner();
    match app_state.registry.get(&id) {
        Some(coordinator) => {
            let coordinator = coordinator.lock();
            let view = AnalysisView {
                exercise_id: coordinator.exercise().id,
                generation: coordinator.generation(),
                levels: SectionView::from_task(coordinator.level_task()),
                frequency: SectionView::from_task(coordinator.frequency_task()),
                parts_of_speech: SectionView::from_task(coordinator.pos_task()),
            };
            Ok(HttpResponse::Ok().json(view))
        }
        None => Ok(HttpResponse::NotFound().finish()),
    }
}

/// Interactive multi-source search; waits for every section and returns all
/// per-source outcomes
async fn search_handler(
    app_state: web::Data<AppState>,
    request: web::Json<SearchRequest>,
) -> ActixResult<HttpResponse> {
    let request = request.into_inner();
    let timer = Timer::new("interactive-search");
    tracing::debug!(
        term = %TextUtils::truncate(&request.term, 40),
        language = %request.language,
        "interactive search"
    );

    let mut model = SearchDataModel::new(
        app_state.deps.resolver.sources().to_vec(),
        app_state.deps.session.clone(),
    );
    model.submit_query(&request.term, request.language);
    model.wait_all().await;

    let sections: Vec<SearchSectionView> = model
        .tasks()
        .iter()
        .map(|(source, task)| SearchSectionView {
            source: source.clone(),
            status: task.status(),
            senses: task.result().map(|senses| (*senses).clone()),
            error: task.error().map(|err| err.to_string()),
        })
        .collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "term": model.query().map(|(term, _)| term.clone()),
        "sections": sections,
        "query_time_ms": timer.stop(),
    })))
}

/// Resolve one word to its most probable sense and level
async fn word_handler(
    app_state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<WordQuery>,
) -> ActixResult<HttpResponse> {
    let term = path.into_inner();
    let language = query.language;

    let task = AnalysisTask::spawn({
        let deps = Arc::clone(&app_state.deps);
        let term = term.clone();
        async move {
            let word = deps.resolver.resolve_most_probable(&term, language).await?;
            let level = word.cefr_level(&deps.word_store).await?;
            Ok(WordView {
                term: word.term().to_string(),
                language,
                part_of_speech: word.part_of_speech(),
                level,
                source: word.sense().source.clone(),
                definition: word.sense().definition.clone(),
            })
        }
    });

    task.wait().await;
    match (task.result(), task.error()) {
        (Some(view), _) => Ok(HttpResponse::Ok().json(&*view)),
        (None, Some(err)) => Ok(error_response(&err)),
        (None, None) => Ok(HttpResponse::InternalServerError().finish()),
    }
}

/// Drop cached lookup failures so transiently broken words recover
async fn invalidate_failures_handler(
    app_state: web::Data<AppState>,
) -> ActixResult<HttpResponse> {
    let removed = app_state.deps.resolver.cache().invalidate_failures();
    tracing::info!(removed, "invalidated cached lookup failures");
    Ok(HttpResponse::Ok().json(serde_json::json!({ "invalidated": removed })))
}

/// Health check endpoint handler
async fn health_handler(app_state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    let mut source_health = Vec::new();
    for source in app_state.deps.resolver.sources() {
        source_health.push(source.health_check().await);
    }
    let frequency_health = app_state.deps.frequency.health_check().await;
    let store_healthy = app_state.word_store.health_check().await.is_ok();

    let healthy =
        store_healthy && source_health.iter().all(|h| h.healthy) && frequency_health.healthy;

    let response = serde_json::json!({
        "status": if healthy { "healthy" } else { "degraded" },
        "word_store": if store_healthy { "healthy" } else { "unhealthy" },
        "sources": source_health,
        "frequency": frequency_health,
    });

    Ok(HttpResponse::Ok().json(response))
}

/// Statistics endpoint handler
async fn stats_handler(app_state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    let source_stats: Vec<_> = app_state
        .deps
        .resolver
        .sources()
        .iter()
        .map(|source| source.stats())
        .collect();

    let uptime_seconds = (chrono::Utc::now() - app_state.started_at).num_seconds();

    let response = serde_json::json!({
        "uptime_seconds": uptime_seconds,
        "cache": app_state.deps.resolver.cache().stats(),
        "sources": source_stats,
        "word_store": app_state.word_store.stats(),
        "active_analyses": app_state.registry.len(),
    });

    Ok(HttpResponse::Ok().json(response))
}
