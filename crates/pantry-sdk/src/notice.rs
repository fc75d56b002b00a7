use std::fmt;

use serde::Serialize;

use crate::error::SdkError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
}

/// A catalog mutation the user can be told about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CatalogAction {
    Add,
    Update,
    Delete,
}

impl CatalogAction {
    fn success_message(self) -> &'static str {
        match self {
            Self::Add => "Recipe added successfully!",
            Self::Update => "Recipe updated successfully!",
            Self::Delete => "Recipe deleted successfully!",
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            Self::Add => "Failed to add recipe. Please try again.",
            Self::Update => "Failed to update recipe.",
            Self::Delete => "Failed to delete recipe.",
        }
    }
}

/// Short user-facing message about the outcome of an action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    /// The notice for `action` finishing with `outcome`.
    ///
    /// Validation failures carry their own message. Every other failure gets
    /// the action's generic "failed" wording; retrying is left to the user.
    pub fn for_outcome<T>(action: CatalogAction, outcome: &Result<T, SdkError>) -> Self {
        match outcome {
            Ok(_) => Self::success(action.success_message()),
            Err(SdkError::Validation(e)) => Self::error(e.to_string()),
            Err(_) => Self::error(action.failure_message()),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
