use super::{handlers, state::AppState};
use axum::extract::DefaultBodyLimit;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

/// Creates the Axum router with all the application routes.
pub fn create_router(app_state: AppState) -> Router {
    let uploads_dir = ServeDir::new(app_state.uploads.root());
    let max_upload_bytes = app_state.config.max_upload_bytes;

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/test-db", get(handlers::test_db_handler))
        // --- Accounts ---
        .route("/api/usuarios", post(handlers::register_handler))
        .route("/api/login", post(handlers::login_handler))
        .route("/api/me", get(handlers::get_me_handler))
        // --- Patients ---
        .route(
            "/api/usuarios/psicologia",
            post(handlers::create_patient_handler).get(handlers::list_patients_handler),
        )
        .route(
            "/api/usuarios/psicologia/{id}",
            get(handlers::get_patient_handler).delete(handlers::delete_patient_handler),
        )
        // --- Appointments ---
        .route(
            "/api/citas",
            post(handlers::create_appointment_handler).get(handlers::list_appointments_handler),
        )
        .route(
            "/api/citas/{id}",
            get(handlers::get_appointment_handler)
                .put(handlers::update_appointment_handler)
                .delete(handlers::delete_appointment_handler),
        )
        // --- Custom questions ---
        .route(
            "/api/preguntas",
            post(handlers::create_custom_question_handler)
                .get(handlers::list_custom_questions_handler),
        )
        .route(
            "/api/preguntas/{id}",
            delete(handlers::delete_custom_question_handler),
        )
        // --- Questionnaires ---
        .route(
            "/api/cuestionarios",
            post(handlers::create_questionnaire_handler)
                .get(handlers::list_questionnaires_handler),
        )
        .route(
            "/api/cuestionarios/{id}",
            get(handlers::get_questionnaire_handler).delete(handlers::delete_questionnaire_handler),
        )
        // --- Questionnaire responses ---
        .route(
            "/api/cuestionarios-resueltos",
            post(handlers::create_response_handler).get(handlers::list_responses_handler),
        )
        .route(
            "/api/cuestionarios-resueltos/{id}",
            get(handlers::get_response_handler).delete(handlers::delete_response_handler),
        )
        // --- Documents ---
        .route(
            "/api/documentos",
            post(handlers::upload_document_handler)
                .layer(DefaultBodyLimit::max(max_upload_bytes))
                .get(handlers::list_documents_handler),
        )
        .route(
            "/api/documentos/{id}",
            get(handlers::get_document_handler).delete(handlers::delete_document_handler),
        )
        .nest_service("/uploads", uploads_dir)
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
