pub mod event;
pub mod identity;
pub mod profile;
pub mod quiz;
pub mod resource;

pub use event::{CalendarEvent, EventKind};
pub use identity::Identity;
pub use profile::{NotificationPreferences, NotificationStyle, Profile};
pub use quiz::{Difficulty, DocumentVariant, Quiz, QuizQuestion};
pub use resource::{Resource, ResourceKind};
