pub mod auth;
pub mod dashboard;
pub mod events;
pub mod notifications;
pub mod profile;
pub mod quizzes;
pub mod resources;
