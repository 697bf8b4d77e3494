mod auth;
mod events;
mod profile;
mod quizzes;
mod resources;

pub use auth::*;
pub use events::*;
pub use profile::*;
pub use quizzes::*;
pub use resources::*;
