mod engine;
mod error;
mod types;

pub use engine::{Engine, EngineConfig, Session};
pub use error::{CoreError, CoreErrorCode};
pub use types::{CharacterSummary, CloseOutcome, SwitchOutcome, UnsavedChangesDecision};
