use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::models::{Article, Category, Comment, NewComment, TokenResponse};
use crate::session::Session;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{path} returned {status}")]
    Status { path: String, status: StatusCode },
}

/// Client for the article backend. Every call except [`ApiClient::login`]
/// takes the caller's [`Session`] and sends its token as a bearer credential.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut builder = Client::builder().user_agent("ArticleFeed/1.0");
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(ApiError::Build)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, session: &Session, path: &str) -> RequestBuilder {
        self.client
            .get(self.url(path))
            .bearer_auth(session.token())
    }

    fn post(&self, session: &Session, path: &str) -> RequestBuilder {
        self.client
            .post(self.url(path))
            .bearer_auth(session.token())
    }

    async fn send(path: &str, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        debug!(%path, %status, "backend responded");

        if !status.is_success() {
            return Err(ApiError::Status {
                path: path.to_string(),
                status,
            });
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        session: &Session,
        path: &str,
    ) -> Result<T, ApiError> {
        let response = Self::send(path, self.get(session, path)).await?;
        Ok(response.json().await?)
    }

    /// The backend answers an empty article list with 404, which reads as no articles
    async fn get_articles(
        &self,
        path: &str,
        request: RequestBuilder,
    ) -> Result<Vec<Article>, ApiError> {
        match Self::send(path, request).await {
            Ok(response) => Ok(response.json().await?),
            Err(ApiError::Status {
                status: StatusCode::NOT_FOUND,
                ..
            }) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    pub async fn categories(&self, session: &Session) -> Result<Vec<Category>, ApiError> {
        self.get_json(session, "/categories").await
    }

    pub async fn all_articles(&self, session: &Session) -> Result<Vec<Article>, ApiError> {
        let path = "/search/articles";
        self.get_articles(path, self.get(session, path)).await
    }

    pub async fn search_articles(
        &self,
        session: &Session,
        query: &str,
    ) -> Result<Vec<Article>, ApiError> {
        let path = "/search/articles";
        let request = self.get(session, path).query(&[("search", query)]);
        self.get_articles(path, request).await
    }

    pub async fn articles_by_category(
        &self,
        session: &Session,
        category_id: i64,
    ) -> Result<Vec<Article>, ApiError> {
        let path = "/articles/all";
        let request = self
            .get(session, path)
            .query(&[("category_id", category_id)]);
        self.get_articles(path, request).await
    }

    pub async fn like_article(&self, session: &Session, article_id: i64) -> Result<(), ApiError> {
        let path = format!("/like/articles/{}/likes", article_id);
        Self::send(&path, self.post(session, &path)).await?;
        Ok(())
    }

    pub async fn comments(
        &self,
        session: &Session,
        article_id: i64,
    ) -> Result<Vec<Comment>, ApiError> {
        let path = format!("/comment/articles/{}/comments", article_id);
        self.get_json(session, &path).await
    }

    pub async fn add_comment(
        &self,
        session: &Session,
        article_id: i64,
        content: &str,
    ) -> Result<(), ApiError> {
        let path = format!("/comment/articles/{}/comments", article_id);
        let request = self.post(session, &path).json(&NewComment { content });
        Self::send(&path, request).await?;
        Ok(())
    }

    /// Trade credentials for a bearer token using the backend's OAuth2 password form
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse, ApiError> {
        let path = "/token";
        let request = self
            .client
            .post(self.url(path))
            .form(&[("username", email), ("password", password)]);
        let response = Self::send(path, request).await?;
        let token: TokenResponse = response.json().await?;
        debug!("login accepted");
        Ok(token)
    }
}
