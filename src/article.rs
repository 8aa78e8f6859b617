//! Sports article model, GraphQL object and input validation

use async_graphql::{InputObject, Object, ID};
use chrono::{DateTime, DurationRound, SecondsFormat, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::pagination::ArticleCursor;

/// A stored sports article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// Soft-deletion marker
    pub deleted_at: Option<DateTime<Utc>>,
    pub image_url: Option<String>,
}

impl Article {
    /// Keyset position of this article
    pub fn cursor(&self) -> ArticleCursor {
        ArticleCursor::new(self.created_at, self.id.clone())
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[Object(name = "SportsArticle")]
impl Article {
    async fn id(&self) -> ID {
        ID(self.id.clone())
    }

    async fn title(&self) -> &str {
        &self.title
    }

    async fn content(&self) -> &str {
        &self.content
    }

    async fn created_at(&self) -> Option<String> {
        Some(format_timestamp(&self.created_at))
    }

    async fn deleted_at(&self) -> Option<String> {
        self.deleted_at.as_ref().map(format_timestamp)
    }

    async fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }
}

/// RFC 3339, UTC, millisecond precision (`2024-05-01T12:00:00.123Z`)
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Truncate to the millisecond precision the store keeps
pub fn truncate_to_millis(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.duration_trunc(TimeDelta::milliseconds(1)).unwrap_or(ts)
}

/// Article fields as submitted by a client
#[derive(InputObject, Debug, Clone, Default)]
pub struct ArticleInput {
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
}

/// Validated, trimmed article fields ready for the store
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct ArticleDraft {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "content is required"))]
    pub content: String,
    #[validate(url(message = "imageUrl must be a valid URL"))]
    pub image_url: Option<String>,
}

impl ArticleDraft {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        image_url: Option<String>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            image_url,
        }
    }
}

impl TryFrom<ArticleInput> for ArticleDraft {
    type Error = crate::Error;

    /// Trim every field, treat a blank `imageUrl` as absent, then validate.
    fn try_from(input: ArticleInput) -> crate::Result<Self> {
        let draft = ArticleDraft {
            title: input.title.trim().to_string(),
            content: input.content.trim().to_string(),
            image_url: input
                .image_url
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty()),
        };
        draft.validate().map_err(validation_error)?;
        Ok(draft)
    }
}

fn validation_error(errors: ValidationErrors) -> crate::Error {
    let mut details: Vec<(String, String)> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = wire_field_name(&field.to_string());
            errs.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                (field.clone(), message)
            })
        })
        .collect();
    details.sort();

    crate::Error::Validation {
        message: "Validation error".to_string(),
        details,
    }
}

fn wire_field_name(field: &str) -> String {
    match field {
        "image_url" => "imageUrl".to_string(),
        other => other.to_string(),
    }
}
