use std::sync::Arc;

use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::{header::SET_COOKIE, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::{Article, Category, Comment};
use crate::session::{self, navigate, navigate_signed_out, Session, LOGIN_PATH};

pub struct AppState {
    pub api: ApiClient,
    /// Mark the session cookie `Secure`
    pub secure_cookies: bool,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/login", get(login_page).post(login))
        .route("/logout", post(logout))
        .route("/categories", get(categories))
        .route("/articles", get(articles))
        .route("/articles/search", get(search_articles))
        .route("/articles/category/:id", get(articles_by_category))
        .route("/articles/:id/like", post(like_article))
        .route("/articles/:id/comments", get(comments).post(add_comment))
        .route("/health", get(health))
        .with_state(state)
}

// Template structs
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate;

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub email: String,
}

#[derive(Template)]
#[template(path = "categories.html")]
pub struct CategoriesTemplate {
    pub categories: Vec<Category>,
}

#[derive(Template)]
#[template(path = "articles.html")]
pub struct ArticlesTemplate {
    pub articles: Vec<Article>,
}

#[derive(Template)]
#[template(path = "comments.html")]
pub struct CommentsTemplate {
    pub article_id: i64,
    pub comments: Vec<Comment>,
}

#[derive(Template)]
#[template(path = "alert.html")]
pub struct AlertTemplate {
    pub success: bool,
    pub message: String,
}

// Wrapper for HTML responses
struct HtmlTemplate<T>(T);

impl<T: Template> IntoResponse for HtmlTemplate<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render template: {}", err),
            )
                .into_response(),
        }
    }
}

/// Swap an alert into `#alerts`, whatever the triggering control targeted
fn alert(success: bool, message: &str) -> Response {
    let mut response = HtmlTemplate(AlertTemplate {
        success,
        message: message.to_string(),
    })
    .into_response();
    let headers = response.headers_mut();
    headers.insert("hx-retarget", HeaderValue::from_static("#alerts"));
    headers.insert("hx-reswap", HeaderValue::from_static("innerHTML"));
    response
}

/// How a failed backend call surfaces to the user
enum Failure {
    /// Background load: log it and leave the container as it was
    Log(&'static str),
    /// User action: log it and raise an alert
    Alert(&'static str),
}

impl Failure {
    fn respond(self, err: ApiError) -> Response {
        match self {
            Failure::Log(what) => {
                error!("Failed to {}: {}", what, err);
                StatusCode::NO_CONTENT.into_response()
            }
            Failure::Alert(message) => {
                warn!("{} {}", message, err);
                alert(false, message)
            }
        }
    }
}

fn render_articles(result: Result<Vec<Article>, ApiError>, failure: Failure) -> Response {
    match result {
        Ok(articles) => HtmlTemplate(ArticlesTemplate { articles }).into_response(),
        Err(err) => failure.respond(err),
    }
}

// Route handlers
pub async fn index(_session: Session) -> impl IntoResponse {
    HtmlTemplate(IndexTemplate)
}

pub async fn login_page() -> impl IntoResponse {
    HtmlTemplate(LoginTemplate {
        error: None,
        email: String::new(),
    })
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Response {
    let cookie = match state.api.login(&form.email, &form.password).await {
        Ok(token) => {
            let cookie = session::token_cookie(&token.access_token, state.secure_cookies);
            if cookie.is_none() {
                warn!("Login succeeded but the returned token cannot be stored in a cookie");
            }
            cookie
        }
        Err(err) => {
            warn!("Login failed: {}", err);
            None
        }
    };

    match cookie {
        Some(cookie) => {
            let mut response = navigate(&headers, "/");
            response.headers_mut().append(SET_COOKIE, cookie);
            response
        }
        None => (
            StatusCode::UNAUTHORIZED,
            HtmlTemplate(LoginTemplate {
                error: Some("Incorrect email or password".to_string()),
                email: form.email,
            }),
        )
            .into_response(),
    }
}

pub async fn logout(headers: HeaderMap) -> Response {
    info!("Signing out");
    navigate_signed_out(&headers, LOGIN_PATH)
}

pub async fn categories(State(state): State<Arc<AppState>>, session: Session) -> Response {
    match state.api.categories(&session).await {
        Ok(categories) => HtmlTemplate(CategoriesTemplate { categories }).into_response(),
        Err(err) => Failure::Log("load categories").respond(err),
    }
}

pub async fn articles(State(state): State<Arc<AppState>>, session: Session) -> Response {
    render_articles(
        state.api.all_articles(&session).await,
        Failure::Log("load articles"),
    )
}

pub async fn articles_by_category(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(category_id): Path<i64>,
) -> Response {
    render_articles(
        state.api.articles_by_category(&session, category_id).await,
        Failure::Log("load articles by category"),
    )
}

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub search: String,
}

pub async fn search_articles(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(query): Query<SearchQuery>,
) -> Response {
    render_articles(
        state.api.search_articles(&session, &query.search).await,
        Failure::Alert("Failed to search articles."),
    )
}

pub async fn like_article(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(article_id): Path<i64>,
) -> Response {
    match state.api.like_article(&session, article_id).await {
        Ok(()) => alert(true, "Article liked successfully!"),
        Err(err) => Failure::Alert("Failed to like article.").respond(err),
    }
}

async fn render_comments(state: &AppState, session: &Session, article_id: i64) -> Response {
    match state.api.comments(session, article_id).await {
        Ok(comments) => HtmlTemplate(CommentsTemplate {
            article_id,
            comments,
        })
        .into_response(),
        Err(err) => Failure::Alert("Failed to load comments.").respond(err),
    }
}

pub async fn comments(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(article_id): Path<i64>,
) -> Response {
    render_comments(&state, &session, article_id).await
}

#[derive(Deserialize)]
pub struct CommentForm {
    pub content: String,
}

pub async fn add_comment(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(article_id): Path<i64>,
    Form(form): Form<CommentForm>,
) -> Response {
    match state
        .api
        .add_comment(&session, article_id, &form.content)
        .await
    {
        Ok(()) => render_comments(&state, &session, article_id).await,
        Err(err) => Failure::Alert("Failed to add comment.").respond(err),
    }
}

pub async fn health() -> impl IntoResponse {
    Html("OK")
}
