//! Activity around a snippet: comments, shares and code runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use super::snippet::ParseEnumError;

/// A comment on a snippet. Replies carry the parent's id.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub user_id: i64,
    pub snippet_id: Uuid,
    pub parent_id: Option<i64>,
    pub text: String,
    pub is_resolved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub user_id: i64,
    pub snippet_id: Uuid,
    pub parent_id: Option<i64>,
    pub text: String,
}

#[derive(Debug, Clone, Default)]
pub struct CommentPatch {
    pub text: Option<String>,
    pub is_resolved: Option<bool>,
}

/// A top-level comment with its direct replies, oldest reply first.
#[derive(Debug, Clone, Serialize)]
pub struct CommentThread {
    #[serde(flatten)]
    pub comment: Comment,
    pub replies: Vec<Comment>,
}

/// Channel a snippet was shared through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ShareMethod {
    #[default]
    Link,
    Email,
    Social,
}

impl ShareMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShareMethod::Link => "link",
            ShareMethod::Email => "email",
            ShareMethod::Social => "social",
        }
    }
}

impl FromStr for ShareMethod {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "link" => Ok(ShareMethod::Link),
            "email" => Ok(ShareMethod::Email),
            "social" => Ok(ShareMethod::Social),
            _ => Err(ParseEnumError {
                kind: "share method",
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for ShareMethod {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A logged share of a snippet.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Share {
    pub id: i64,
    pub user_id: Option<i64>,
    pub snippet_id: Uuid,
    #[sqlx(try_from = "String")]
    pub share_method: ShareMethod,
    pub shared_to: Option<String>,
    pub shared_at: DateTime<Utc>,
    pub ip_address: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewShare {
    pub user_id: Option<i64>,
    pub snippet_id: Uuid,
    pub share_method: ShareMethod,
    pub shared_to: Option<String>,
    pub ip_address: Option<String>,
}

/// A logged execution of a snippet.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct CodeRun {
    pub id: i64,
    pub user_id: Option<i64>,
    pub snippet_id: Uuid,
    pub run_at: DateTime<Utc>,
    pub was_modified: bool,
    pub execution_time_ms: Option<f64>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewCodeRun {
    pub user_id: Option<i64>,
    pub snippet_id: Uuid,
    pub was_modified: bool,
    pub execution_time_ms: Option<f64>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_method_parse() {
        assert_eq!("email".parse::<ShareMethod>().unwrap(), ShareMethod::Email);
        assert_eq!(ShareMethod::default(), ShareMethod::Link);
        assert!("fax".parse::<ShareMethod>().is_err());
    }

    #[test]
    fn test_comment_thread_flattens_comment() {
        let now = Utc::now();
        let comment = Comment {
            id: 1,
            user_id: 2,
            snippet_id: Uuid::new_v4(),
            parent_id: None,
            text: "nice".to_string(),
            is_resolved: false,
            created_at: now,
            updated_at: now,
        };
        let thread = CommentThread {
            comment,
            replies: vec![],
        };

        let value = serde_json::to_value(&thread).unwrap();
        assert_eq!(value["id"], 1);
        assert_eq!(value["text"], "nice");
        assert!(value["replies"].as_array().unwrap().is_empty());
    }
}
