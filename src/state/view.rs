//! Loading/error/loaded view state for anything fetched asynchronously.

use std::fmt::Display;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ViewState<T> {
    #[default]
    Loading,
    Failed(String),
    Loaded(T),
}

impl<T> ViewState<T> {
    #[must_use]
    pub fn from_result<E: Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Loaded(value),
            Err(e) => Self::Failed(e.to_string()),
        }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    #[must_use]
    pub fn loaded(&self) -> Option<&T> {
        match self {
            Self::Loaded(value) => Some(value),
            Self::Loading | Self::Failed(_) => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            Self::Loading | Self::Loaded(_) => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> ViewState<U> {
        match self {
            Self::Loading => ViewState::Loading,
            Self::Failed(message) => ViewState::Failed(message),
            Self::Loaded(value) => ViewState::Loaded(f(value)),
        }
    }
}

#[cfg(test)]
#[path = "view_test.rs"]
mod view_test;
