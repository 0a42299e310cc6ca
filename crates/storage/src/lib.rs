#![forbid(unsafe_code)]

pub mod json;
pub mod preferences;
pub mod repository;

pub use json::JsonQuestionRepository;
pub use preferences::TomlPreferencesStore;
pub use repository::{InMemoryRepository, PreferencesRepository, QuestionRepository, StorageError};
