pub mod character;
pub mod coins;
pub mod core_api;
pub mod database;
pub mod dirty;
pub mod form;
pub mod gender;
pub mod index;
pub mod pet_name;
pub mod sync;
pub mod tables;

pub use character::Character;
pub use core_api::{CoreError, CoreErrorCode, Engine, EngineConfig, Session};
pub use database::{Database, JsonDatabase, MemoryDatabase};
pub use dirty::{DirtyFlag, DirtyState, DirtyWatcher};
pub use form::{EditorForm, ItemRef};
pub use sync::SyncEngine;
