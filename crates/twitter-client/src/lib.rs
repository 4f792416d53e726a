use mention_core::{MentionError, MessageId};
use reqwest::Client;
use serde::Deserialize;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

pub mod timeline;
pub use timeline::{Timeline, TimelineSource};

const BASE_URL: &str = "https://api.twitter.com";

/// Twitter API v2 allows most timeline endpoints 180 requests per 15 minutes.
const DEFAULT_RATE_LIMIT: usize = 180;
const RATE_WINDOW: Duration = Duration::from_secs(15 * 60);

/// Timeline endpoints cap at 100 tweets per page.
const PAGE_SIZE: usize = 100;
/// User timelines only reach back 3200 tweets.
const MAX_PAGES: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum TwitterError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {0}")]
    Api(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<TwitterError> for MentionError {
    fn from(e: TwitterError) -> Self {
        MentionError::Source(e.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct TwitterConfig {
    pub bearer_token: String,
    /// Account whose home timeline is read; only needed without `screen_name`
    pub user_id: Option<String>,
    /// When set, read this user's own tweets instead of the home timeline
    pub screen_name: Option<String>,
    /// Requests per 15-minute window
    pub rate_limit: usize,
}

impl TwitterConfig {
    /// Load from environment variables.
    pub fn from_env() -> Result<Self, TwitterError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, TwitterError> {
        let non_empty = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());

        let bearer_token = non_empty("TWITTER_BEARER_TOKEN")
            .ok_or_else(|| TwitterError::Config("TWITTER_BEARER_TOKEN not set".into()))?;
        let screen_name = non_empty("TWITTER_SCREEN_NAME")
            .map(|s| s.trim().trim_start_matches('@').to_string())
            .filter(|s| !s.is_empty());
        let user_id = non_empty("TWITTER_USER_ID");

        if screen_name.is_none() && user_id.is_none() {
            return Err(TwitterError::Config(
                "TWITTER_USER_ID is required to read the home timeline (or set TWITTER_SCREEN_NAME)"
                    .into(),
            ));
        }

        Ok(Self {
            bearer_token,
            user_id,
            screen_name,
            rate_limit: lookup("TWITTER_RATE_LIMIT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_RATE_LIMIT),
        })
    }
}

/// Sliding-window rate limiter: at most `max_requests` per `window` duration.
#[derive(Clone)]
struct RateLimiter {
    timestamps: Arc<Mutex<VecDeque<Instant>>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            timestamps: Arc::new(Mutex::new(VecDeque::new())),
            max_requests: max_requests.max(1),
            window,
        }
    }

    async fn acquire(&self) {
        loop {
            let mut ts = self.timestamps.lock().await;
            let now = Instant::now();

            while let Some(&front) = ts.front() {
                if now.duration_since(front) >= self.window {
                    ts.pop_front();
                } else {
                    break;
                }
            }

            if ts.len() < self.max_requests {
                ts.push_back(now);
                return;
            }

            // Wait until the oldest request falls out of the window
            let sleep_dur = match ts.front() {
                Some(&oldest) => (oldest + self.window).duration_since(now) + Duration::from_millis(50),
                None => Duration::from_millis(50),
            };
            drop(ts);
            tracing::debug!("Rate limiter: waiting {:.1}s for Twitter API slot", sleep_dur.as_secs_f64());
            tokio::time::sleep(sleep_dur).await;
        }
    }
}

#[derive(Clone)]
pub struct TwitterClient {
    bearer_token: String,
    base_url: String,
    client: Client,
    rate_limiter: RateLimiter,
}

impl TwitterClient {
    pub fn new(config: &TwitterConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            bearer_token: config.bearer_token.clone(),
            base_url: BASE_URL.to_string(),
            client,
            rate_limiter: RateLimiter::new(config.rate_limit, RATE_WINDOW),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Send a request with rate limiting and automatic 429 retry.
    async fn send_request(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, TwitterError> {
        let request = builder.bearer_auth(&self.bearer_token).build()?;

        for attempt in 0..3u32 {
            self.rate_limiter.acquire().await;
            let req_clone = request
                .try_clone()
                .ok_or_else(|| TwitterError::Api("Cannot clone request".to_string()))?;
            let response = self.client.execute(req_clone).await?;

            if response.status().as_u16() != 429 {
                return Ok(response);
            }

            let wait_secs = 15u64;
            tracing::warn!("Twitter 429 rate limited, waiting {}s before retry {}/3", wait_secs, attempt + 1);
            tokio::time::sleep(Duration::from_secs(wait_secs)).await;
        }

        Err(TwitterError::Api("Rate limited by Twitter after 3 retries".to_string()))
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, TwitterError> {
        let response = self.send_request(self.client.get(url).query(query)).await?;

        if !response.status().is_success() {
            return Err(TwitterError::Api(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| TwitterError::InvalidResponse(e.to_string()))
    }

    /// Resolve a screen name to its numeric user id.
    pub async fn user_id_for(&self, screen_name: &str) -> Result<String, TwitterError> {
        let url = format!("{}/2/users/by/username/{}", self.base_url, screen_name);
        let response: UserLookupResponse = self.get_json(&url, &[]).await?;
        response
            .data
            .map(|u| u.id)
            .ok_or_else(|| TwitterError::InvalidResponse(format!("unknown user @{}", screen_name)))
    }

    /// One page of tweets from `path` (a timeline endpoint), newest first,
    /// strictly newer than `since_id` when given.
    pub async fn timeline_page(
        &self,
        path: &str,
        since_id: Option<MessageId>,
        pagination_token: Option<&str>,
    ) -> Result<TimelinePage, TwitterError> {
        let url = format!("{}{}", self.base_url, path);
        let mut query = vec![
            ("max_results", PAGE_SIZE.to_string()),
            ("expansions", "author_id".to_string()),
            ("user.fields", "username".to_string()),
            ("tweet.fields", "created_at".to_string()),
        ];
        if let Some(id) = since_id {
            query.push(("since_id", id.to_string()));
        }
        if let Some(token) = pagination_token {
            query.push(("pagination_token", token.to_string()));
        }
        self.get_json(&url, &query).await
    }

    /// Every tweet newer than `since_id`, following `next_token` across pages
    /// so a backlog larger than one page is not skipped. Without a cursor
    /// only the first page is read.
    pub async fn timeline_since(
        &self,
        path: &str,
        since_id: Option<MessageId>,
    ) -> Result<TimelinePage, TwitterError> {
        let mut page = self.timeline_page(path, since_id, None).await?;
        if since_id.is_none() {
            return Ok(page);
        }

        let mut pages = 1;
        while let Some(token) = page.meta.next_token.take() {
            if pages >= MAX_PAGES {
                tracing::warn!(
                    "Stopped paging after {} pages; older tweets since {:?} are skipped",
                    pages,
                    since_id
                );
                break;
            }
            let next = self.timeline_page(path, since_id, Some(&token)).await?;
            page.merge(next);
            pages += 1;
        }
        Ok(page)
    }
}

// Wire types

#[derive(Debug, Deserialize)]
struct UserLookupResponse {
    #[serde(default)]
    data: Option<TwitterUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TwitterUser {
    pub id: String,
    pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tweet {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimelineIncludes {
    #[serde(default)]
    pub users: Vec<TwitterUser>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimelineMeta {
    #[serde(default)]
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimelinePage {
    #[serde(default)]
    pub data: Vec<Tweet>,
    #[serde(default)]
    pub includes: TimelineIncludes,
    #[serde(default)]
    pub meta: TimelineMeta,
}

impl TimelinePage {
    /// Append an older page, carrying its continuation token forward.
    pub fn merge(&mut self, older: TimelinePage) {
        self.data.extend(older.data);
        for user in older.includes.users {
            if !self.includes.users.iter().any(|u| u.id == user.id) {
                self.includes.users.push(user);
            }
        }
        self.meta = older.meta;
    }
}
