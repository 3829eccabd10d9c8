//! # Actions
//!
//! Operations the article policy decides on.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Actions an actor can attempt on an article.
///
/// - **View / Create / Update / Delete**: content access
/// - **Submit**: author hands the article to review
/// - **ReviewAsEditor / Approve / RequestRevision**: editor stage
/// - **ReviewAsAdmin / Publish / Reject**: admin stage
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ArticleAction {
    /// See the article.
    View,

    /// Draft a new article.
    Create,

    /// Edit content fields.
    Update,

    /// Hard-delete the article.
    Delete,

    /// Send the article into review.
    Submit,

    /// Take the article into editor review.
    ReviewAsEditor,

    /// Approve for the admin stage.
    Approve,

    /// Send back to the author.
    RequestRevision,

    /// Take the article into admin review.
    ReviewAsAdmin,

    /// Publish.
    Publish,

    /// Reject at the admin stage.
    Reject,
}

impl ArticleAction {
    /// Get the string representation of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleAction::View => "view",
            ArticleAction::Create => "create",
            ArticleAction::Update => "update",
            ArticleAction::Delete => "delete",
            ArticleAction::Submit => "submit",
            ArticleAction::ReviewAsEditor => "reviewAsEditor",
            ArticleAction::Approve => "approve",
            ArticleAction::RequestRevision => "requestRevision",
            ArticleAction::ReviewAsAdmin => "reviewAsAdmin",
            ArticleAction::Publish => "publish",
            ArticleAction::Reject => "reject",
        }
    }

    /// Parse action from string representation.
    ///
    /// # Arguments
    ///
    /// * `s` - String to parse (case-insensitive, `_`/`-` separators allowed)
    ///
    /// # Example
    ///
    /// ```
    /// use editorial_rbac::ArticleAction;
    ///
    /// assert_eq!(ArticleAction::parse("reviewAsEditor"), Some(ArticleAction::ReviewAsEditor));
    /// assert_eq!(ArticleAction::parse("request_revision"), Some(ArticleAction::RequestRevision));
    /// assert_eq!(ArticleAction::parse("archive"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        Self::all()
            .into_iter()
            .find(|action| action.as_str().to_lowercase() == normalized)
    }

    /// Get all actions.
    pub fn all() -> Vec<Self> {
        vec![
            ArticleAction::View,
            ArticleAction::Create,
            ArticleAction::Update,
            ArticleAction::Delete,
            ArticleAction::Submit,
            ArticleAction::ReviewAsEditor,
            ArticleAction::Approve,
            ArticleAction::RequestRevision,
            ArticleAction::ReviewAsAdmin,
            ArticleAction::Publish,
            ArticleAction::Reject,
        ]
    }
}

impl fmt::Display for ArticleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_parsing() {
        assert_eq!(ArticleAction::parse("view"), Some(ArticleAction::View));
        assert_eq!(ArticleAction::parse("VIEW"), Some(ArticleAction::View));
        assert_eq!(ArticleAction::parse("review-as-admin"), Some(ArticleAction::ReviewAsAdmin));
        assert_eq!(ArticleAction::parse("reviewasadmin"), Some(ArticleAction::ReviewAsAdmin));
        assert_eq!(ArticleAction::parse("publish"), Some(ArticleAction::Publish));
        assert_eq!(ArticleAction::parse("unpublish"), None);
    }

    #[test]
    fn test_action_names_round_trip() {
        for action in ArticleAction::all() {
            assert_eq!(ArticleAction::parse(action.as_str()), Some(action));
        }
    }

    #[test]
    fn test_action_serde_uses_camel_case() {
        let json = serde_json::to_string(&ArticleAction::RequestRevision).unwrap();
        assert_eq!(json, "\"requestRevision\"");
    }
}
