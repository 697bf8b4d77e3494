mod auth;
mod config;
mod errors;
mod middleware;
mod models;
mod openai;
mod prompts;
mod reminders;
mod routes;
mod storage;
mod types;

use std::collections::HashMap;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{get, web, App, HttpServer};
use async_openai::{config::OpenAIConfig, Client};
use moka::future::Cache;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use crate::config::AppConfig;

use crate::middleware::auth::Authentication;
use crate::models::CalendarEvent;
use crate::reminders::ReminderNotification;
use crate::storage::ObjectStorage;

pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
    pub oai_client: Option<Client<OpenAIConfig>>,
    pub storage: ObjectStorage,
    /// Per-user incomplete-event list views. Invalidated, never merged,
    /// after a successful event mutation.
    pub events_cache: Cache<String, Vec<CalendarEvent>>,
    /// Reminders queued by the poll job, drained by GET /notifications.
    pub reminder_queue: Mutex<HashMap<String, Vec<ReminderNotification>>>,
}

#[derive(OpenApi)]
#[openapi(components(schemas(
    models::Profile,
    models::NotificationPreferences,
    models::NotificationStyle,
    models::CalendarEvent,
    models::EventKind,
    models::Resource,
    models::ResourceKind,
    models::Quiz,
    models::QuizQuestion,
    models::Difficulty,
    ReminderNotification,
)))]
struct ApiDoc;

#[get("/health")]
async fn health_check() -> &'static str {
    "OK"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let app_config = Arc::new(AppConfig::from_env()?);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&app_config.log_level));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting TeachAssist backend");
    tracing::info!("Bind address: {}", app_config.bind_addr);

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&app_config.database_url)
        .await?;
    sqlx::migrate!().run(&pool).await?;

    let oai_client = match &app_config.openai_api_key {
        Some(api_key) => Some(Client::with_config(
            OpenAIConfig::new().with_api_key(api_key),
        )),
        None => {
            tracing::warn!("No OpenAI API key configured (OPENAI_API_KEY). Quiz generation is disabled!");
            None
        }
    };

    let storage = ObjectStorage::new(&app_config).await;

    let app_state = Arc::new(AppState {
        pool,
        config: app_config.clone(),
        oai_client,
        storage,
        events_cache: Cache::new(10_000),
        reminder_queue: Mutex::new(HashMap::new()),
    });

    // Keep the handle alive for the lifetime of the server.
    let _scheduler = reminders::start(app_state.clone()).await?;

    let bind_addr = app_config.bind_addr;
    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(Authentication {
                app_config: app_config.clone(),
            })
            .wrap(cors)
            .service(
                web::scope("/auth")
                    .service(routes::auth::register)
                    .service(routes::auth::login)
                    .service(routes::auth::session)
                    .service(routes::auth::change_password)
                    .service(routes::auth::delete_account),
            )
            .service(
                web::scope("/profile")
                    .service(routes::profile::get_profile)
                    .service(routes::profile::update_profile)
                    .service(routes::profile::complete_onboarding),
            )
            .service(
                web::scope("/events")
                    .service(routes::events::upcoming_events)
                    .service(routes::events::list_events)
                    .service(routes::events::create_event)
                    .service(routes::events::update_event)
                    .service(routes::events::complete_event)
                    .service(routes::events::delete_event),
            )
            .service(
                web::scope("/resources")
                    .service(routes::resources::upload_resource)
                    .service(routes::resources::list_resources)
                    .service(routes::resources::create_resource)
                    .service(routes::resources::download_resource)
                    .service(routes::resources::delete_resource),
            )
            .service(
                web::scope("/quizzes")
                    .service(routes::quizzes::generate_quiz)
                    .service(routes::quizzes::list_quizzes)
                    .service(routes::quizzes::quiz_document),
            )
            .service(web::scope("/dashboard").service(routes::dashboard::dashboard))
            .service(web::scope("/notifications").service(routes::notifications::pending_notifications))
            .service(health_check)
            .service(Scalar::with_url("/docs", ApiDoc::openapi()))
    })
    .bind(bind_addr)?
    .run()
    .await?;

    Ok(())
}
