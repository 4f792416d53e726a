use async_trait::async_trait;
use mention_core::{Message, MessageBatch, MessageId, MessageSource, MentionResult};
use std::collections::HashMap;

use crate::{TimelinePage, TwitterClient, TwitterConfig, TwitterError};

/// Which timeline to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Timeline {
    /// Reverse-chronological home timeline of the authenticated account
    Home { user_id: String },
    /// A single user's own tweets
    User { user_id: String, screen_name: String },
}

impl Timeline {
    fn path(&self) -> String {
        match self {
            Timeline::Home { user_id } => format!("/2/users/{}/timelines/reverse_chronological", user_id),
            Timeline::User { user_id, .. } => format!("/2/users/{}/tweets", user_id),
        }
    }
}

/// Message source over a Twitter timeline.
pub struct TimelineSource {
    client: TwitterClient,
    timeline: Timeline,
}

impl TimelineSource {
    pub fn new(client: TwitterClient, timeline: Timeline) -> Self {
        Self { client, timeline }
    }

    /// Build from config, resolving the screen name (if any) once up front.
    pub async fn connect(config: &TwitterConfig) -> Result<Self, TwitterError> {
        let client = TwitterClient::new(config);
        let timeline = match &config.screen_name {
            Some(name) => {
                let user_id = client.user_id_for(name).await?;
                tracing::info!("Reading tweets from @{} ({})", name, user_id);
                Timeline::User {
                    user_id,
                    screen_name: name.clone(),
                }
            }
            None => {
                let user_id = config.user_id.clone().ok_or_else(|| {
                    TwitterError::Config("TWITTER_USER_ID not set for the home timeline".into())
                })?;
                tracing::info!("Reading home timeline of user {}", user_id);
                Timeline::Home { user_id }
            }
        };
        Ok(Self::new(client, timeline))
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }
}

#[async_trait]
impl MessageSource for TimelineSource {
    async fn fetch(&self, cursor: Option<MessageId>) -> MentionResult<MessageBatch> {
        let page = self.client.timeline_since(&self.timeline.path(), cursor).await?;
        let batch = page_to_batch(page, cursor, &self.timeline)?;
        tracing::info!(
            "Fetched {} new tweets (cursor {:?} -> {:?})",
            batch.messages.len(),
            cursor,
            batch.cursor
        );
        Ok(batch)
    }
}

/// Convert a newest-first API page into an oldest-first batch, dropping
/// anything at or below the cursor and advancing the high-water mark.
fn page_to_batch(
    page: TimelinePage,
    cursor: Option<MessageId>,
    timeline: &Timeline,
) -> Result<MessageBatch, TwitterError> {
    let authors: HashMap<&str, &str> = page
        .includes
        .users
        .iter()
        .map(|u| (u.id.as_str(), u.username.as_str()))
        .collect();

    let mut messages = Vec::with_capacity(page.data.len());
    for tweet in &page.data {
        let id: u64 = tweet
            .id
            .parse()
            .map_err(|_| TwitterError::InvalidResponse(format!("non-numeric tweet id {}", tweet.id)))?;
        let id = MessageId(id);
        if cursor.is_some_and(|c| id <= c) {
            continue;
        }

        let author = tweet
            .author_id
            .as_deref()
            .and_then(|a| authors.get(a).copied())
            .map(str::to_string)
            .or_else(|| match timeline {
                Timeline::User { screen_name, .. } => Some(screen_name.clone()),
                Timeline::Home { .. } => None,
            })
            .unwrap_or_default();

        messages.push(Message {
            id,
            author,
            text: tweet.text.clone(),
            created_at: tweet.created_at,
        });
    }

    messages.sort_by_key(|m| m.id);
    let newest = messages.last().map(|m| m.id);

    Ok(MessageBatch {
        messages,
        cursor: newest.or(cursor),
    })
}
