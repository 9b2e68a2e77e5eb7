//! Client application state.
//!
//! DESIGN
//! ======
//! State objects are plain structs passed explicitly; anything that
//! outlives a session goes through a [`storage::StorageAdapter`].

pub mod auth;
pub mod prefs;
pub mod storage;
pub mod view;

pub use auth::AuthSession;
pub use prefs::{Preferences, ProjectListMode};
pub use storage::{FileStorage, MemoryStorage, StorageAdapter, StorageError};
pub use view::ViewState;
