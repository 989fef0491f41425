//! Post model and its embedded author summary

use chrono::{DateTime, Utc};

/// Author summary embedded in every post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    /// Numeric user id
    pub id: i64,
    /// Username (unique handle)
    pub username: String,
    /// Display name
    pub display_name: String,
    /// Avatar reference (URL or data URI)
    pub avatar: Option<String>,
}

impl Author {
    /// Handle form for display (e.g., "@ada")
    pub fn handle(&self) -> String {
        format!("@{}", self.username)
    }
}

/// A post as rendered in the feed or on a profile
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    /// Numeric post id
    pub id: i64,
    /// Author of the post
    pub author: Author,
    /// Post content (plain text)
    pub content: String,
    /// Attached image reference (URL or data URI)
    pub image_url: Option<String>,
    /// Optional location string
    pub location: Option<String>,
    /// Number of likes
    pub like_count: u32,
    /// Number of comments
    pub comment_count: u32,
    /// Whether the viewer has liked this post
    pub liked_by_me: bool,
    /// When the post was created
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Get a short preview of the content (for list display)
    pub fn preview(&self, max_len: usize) -> String {
        let content = self.content.replace('\n', " ");
        if content.chars().count() <= max_len {
            content
        } else {
            let cut: String = content.chars().take(max_len.saturating_sub(3)).collect();
            format!("{}...", cut)
        }
    }

    /// Get relative time string (e.g., "now", "5m", "2h", "3d")
    pub fn relative_time(&self) -> String {
        let now = Utc::now();
        let duration = now.signed_duration_since(self.created_at);

        if duration.num_seconds() < 60 {
            "now".to_string()
        } else if duration.num_minutes() < 60 {
            format!("{}m", duration.num_minutes())
        } else if duration.num_hours() < 24 {
            format!("{}h", duration.num_hours())
        } else if duration.num_days() < 7 {
            format!("{}d", duration.num_days())
        } else {
            self.created_at.format("%b %d").to_string()
        }
    }

    /// Whether the post has any visible body (text or image)
    pub fn has_content(&self) -> bool {
        !self.content.trim().is_empty() || self.image_url.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_post(content: &str) -> Post {
        Post {
            id: 1,
            author: Author {
                id: 7,
                username: "ada".to_string(),
                display_name: "Ada Lovelace".to_string(),
                avatar: None,
            },
            content: content.to_string(),
            image_url: None,
            location: None,
            like_count: 0,
            comment_count: 0,
            liked_by_me: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_preview_short_content() {
        let post = sample_post("hello");
        assert_eq!(post.preview(10), "hello");
    }

    #[test]
    fn test_preview_truncates() {
        let post = sample_post("this is a longer post body");
        let preview = post.preview(10);
        assert_eq!(preview, "this is...");
        assert_eq!(preview.chars().count(), 10);
    }

    #[test]
    fn test_preview_flattens_newlines() {
        let post = sample_post("line one\nline two");
        assert_eq!(post.preview(50), "line one line two");
    }

    #[test]
    fn test_preview_multibyte_safe() {
        let post = sample_post("çok güzel bir gün çok güzel bir gün");
        let preview = post.preview(10);
        assert_eq!(preview.chars().count(), 10);
    }

    #[test]
    fn test_relative_time_buckets() {
        let mut post = sample_post("x");

        post.created_at = Utc::now() - Duration::seconds(10);
        assert_eq!(post.relative_time(), "now");

        post.created_at = Utc::now() - Duration::minutes(5);
        assert_eq!(post.relative_time(), "5m");

        post.created_at = Utc::now() - Duration::hours(3);
        assert_eq!(post.relative_time(), "3h");

        post.created_at = Utc::now() - Duration::days(2);
        assert_eq!(post.relative_time(), "2d");

        post.created_at = Utc::now() - Duration::days(30);
        let formatted = post.relative_time();
        assert!(formatted.contains(' '), "expected a date, got {formatted}");
    }

    #[test]
    fn test_has_content() {
        let mut post = sample_post("  ");
        assert!(!post.has_content());

        post.image_url = Some("data:image/png;base64,AAAA".to_string());
        assert!(post.has_content());

        post.image_url = None;
        post.content = "words".to_string();
        assert!(post.has_content());
    }

    #[test]
    fn test_author_handle() {
        let post = sample_post("x");
        assert_eq!(post.author.handle(), "@ada");
    }
}
