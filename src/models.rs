use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub text: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category_id: Option<i64>,
    /// Estimated reading time in minutes
    #[serde(default)]
    pub read_time: Option<i32>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

impl Article {
    /// Image URL, only when it is a plain http(s) link
    pub fn image(&self) -> Option<&str> {
        let url = self.image_url.as_deref()?.trim();
        let parsed = reqwest::Url::parse(url).ok()?;
        matches!(parsed.scheme(), "http" | "https").then_some(url)
    }

    pub fn published(&self) -> Option<String> {
        self.created_at
            .map(|at| at.format("%Y-%m-%d").to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(alias = "text")]
    pub content: String,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

impl Comment {
    pub fn posted(&self) -> Option<String> {
        self.created_at
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewComment<'a> {
    pub content: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article_with_image(image_url: Option<&str>) -> Article {
        Article {
            id: 1,
            title: "Title".to_string(),
            text: "Body".to_string(),
            image_url: image_url.map(|u| u.to_string()),
            category_id: None,
            read_time: None,
            created_at: None,
        }
    }

    #[test]
    fn test_article_from_backend_json() {
        let json = r#"{
            "id": 7,
            "title": "Rust in production",
            "text": "Body text",
            "image_url": "https://img.example.com/a.png",
            "category_id": 2,
            "is_published": true,
            "read_time": 5,
            "author_id": 3,
            "created_at": "2024-05-01T10:30:00.123456",
            "updated_at": "2024-05-01T10:30:00.123456",
            "views": 0
        }"#;

        let article: Article = serde_json::from_str(json).unwrap();
        assert_eq!(article.id, 7);
        assert_eq!(article.category_id, Some(2));
        assert_eq!(article.read_time, Some(5));
        assert_eq!(article.published(), Some("2024-05-01".to_string()));
    }

    #[test]
    fn test_article_minimal_json() {
        let json = r#"{"id": 1, "title": "T", "text": "B", "image_url": null}"#;
        let article: Article = serde_json::from_str(json).unwrap();
        assert!(article.image().is_none());
        assert!(article.published().is_none());
    }

    #[test]
    fn test_image_accepts_http_links() {
        let article = article_with_image(Some("https://img.example.com/a.png"));
        assert_eq!(article.image(), Some("https://img.example.com/a.png"));

        let article = article_with_image(Some("http://img.example.com/a.png"));
        assert_eq!(article.image(), Some("http://img.example.com/a.png"));
    }

    #[test]
    fn test_image_scheme_is_case_insensitive() {
        let article = article_with_image(Some("HTTPS://img.example.com/a.png"));
        assert_eq!(article.image(), Some("HTTPS://img.example.com/a.png"));
    }

    #[test]
    fn test_image_rejects_unparseable_links() {
        let article = article_with_image(Some("not a url"));
        assert_eq!(article.image(), None);
    }

    #[test]
    fn test_image_rejects_script_links() {
        let article = article_with_image(Some("javascript:alert(1)"));
        assert_eq!(article.image(), None);

        let article = article_with_image(Some("data:text/html,<b>x</b>"));
        assert_eq!(article.image(), None);
    }

    #[test]
    fn test_comment_accepts_text_field() {
        let comment: Comment = serde_json::from_str(
            r#"{"id": 1, "text": "Nice post", "article_id": 2, "user_id": 3, "created_at": "2024-05-01T10:30:00"}"#,
        )
        .unwrap();
        assert_eq!(comment.content, "Nice post");
        assert_eq!(comment.posted(), Some("2024-05-01 10:30".to_string()));
    }

    #[test]
    fn test_comment_accepts_content_field() {
        let comment: Comment = serde_json::from_str(r#"{"content": "Hello"}"#).unwrap();
        assert_eq!(comment.content, "Hello");
        assert!(comment.id.is_none());
    }

    #[test]
    fn test_new_comment_body() {
        let body = serde_json::to_value(NewComment { content: "hi" }).unwrap();
        assert_eq!(body, serde_json::json!({ "content": "hi" }));
    }
}
