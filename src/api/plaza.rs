//! Plaza REST API client
//!
//! Plaza authenticates with a token passed as a query or form parameter,
//! not an Authorization header. Mutating endpoints answer 204 on success;
//! surplus likes/follows answer 409.

use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::multipart;
use reqwest::{Client, Response};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::models::{Author, Post, Profile};

use super::ApiError;

/// Client for one Plaza server, bound to one session token
pub struct PlazaClient {
    client: Client,
    base_url: String,
    token: String,
}

impl PlazaClient {
    /// Create a new client for a server and access token
    pub fn new(server: &str, token: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: server.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    /// Build API URL
    fn api_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Fetch a page of the feed, optionally filtered by hashtag
    pub async fn feed(
        &self,
        page: usize,
        limit: usize,
        hashtag: Option<&str>,
    ) -> Result<Vec<Post>, ApiError> {
        let mut query = vec![
            ("token", self.token.clone()),
            ("page", page.to_string()),
            ("limit", limit.to_string()),
        ];
        if let Some(tag) = hashtag {
            query.push(("hashtag", tag.to_string()));
        }

        let response = self
            .client
            .get(self.api_url("/posts/feed"))
            .query(&query)
            .send()
            .await?;

        let posts: Vec<PostDto> = check(response).await?.json().await?;
        Ok(posts.into_iter().map(PostDto::into_post).collect())
    }

    /// Fetch a page of one user's posts
    pub async fn user_posts(
        &self,
        username: &str,
        page: usize,
        limit: usize,
    ) -> Result<Vec<Post>, ApiError> {
        let url = self.api_url(&format!("/posts/user/{}", urlencoding::encode(username)));

        let response = self
            .client
            .get(url)
            .query(&[
                ("token", self.token.clone()),
                ("page", page.to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await?;

        let posts: Vec<PostDto> = check(response).await?.json().await?;
        Ok(posts.into_iter().map(PostDto::into_post).collect())
    }

    /// Like a post (409 if already liked)
    pub async fn like(&self, post_id: i64) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.api_url("/posts/like"))
            .query(&[
                ("post_id", post_id.to_string()),
                ("token", self.token.clone()),
            ])
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }

    /// Unlike a post (409 if not liked)
    pub async fn unlike(&self, post_id: i64) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.api_url("/posts/unlike"))
            .query(&[
                ("post_id", post_id.to_string()),
                ("token", self.token.clone()),
            ])
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }

    /// Delete an own post (401 if not the owner)
    pub async fn delete_post(&self, post_id: i64) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(self.api_url("/posts/"))
            .query(&[
                ("token", self.token.clone()),
                ("post_id", post_id.to_string()),
            ])
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }

    /// Create a post with optional location and image attachment.
    ///
    /// The image is read from disk before any request is sent, so a bad
    /// path fails locally. The created post is not returned; callers
    /// reload the feed to see it.
    pub async fn create_post(
        &self,
        content: &str,
        location: Option<&str>,
        image_path: Option<&Path>,
    ) -> Result<(), ApiError> {
        let mut form = multipart::Form::new()
            .text("content", content.to_string())
            .text("token", self.token.clone());
        if let Some(location) = location {
            form = form.text("location", location.to_string());
        }
        if let Some(path) = image_path {
            form = form.part("image_file", file_part(path).await?);
        }

        let response = self
            .client
            .post(self.api_url("/posts/"))
            .multipart(form)
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }

    /// Fetch a profile by username (404 if unknown)
    pub async fn profile(&self, username: &str) -> Result<Profile, ApiError> {
        let url = self.api_url(&format!("/profile/user/{}", urlencoding::encode(username)));

        let response = self
            .client
            .get(url)
            .query(&[("token", self.token.clone())])
            .send()
            .await?;

        let profile: ProfileDto = check(response).await?.json().await?;
        Ok(profile.into_profile())
    }

    /// Follow a user (409 if already following)
    pub async fn follow(&self, username: &str) -> Result<(), ApiError> {
        let url = self.api_url(&format!("/profile/follow/{}", urlencoding::encode(username)));

        let response = self
            .client
            .post(url)
            .query(&[("token", self.token.clone())])
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }

    /// Unfollow a user (409 if not following)
    pub async fn unfollow(&self, username: &str) -> Result<(), ApiError> {
        let url = self.api_url(&format!(
            "/profile/unfollow/{}",
            urlencoding::encode(username)
        ));

        let response = self
            .client
            .post(url)
            .query(&[("token", self.token.clone())])
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }

    /// Update the authenticated user's profile (403 for anyone else).
    ///
    /// The endpoint is declared 204 but some server versions answer with a
    /// body; any 2xx counts as success.
    pub async fn update_profile(
        &self,
        username: &str,
        update: &ProfileUpdate,
    ) -> Result<(), ApiError> {
        let url = self.api_url(&format!("/auth/{}", urlencoding::encode(username)));

        let mut form = multipart::Form::new().text("token", self.token.clone());
        if let Some(name) = &update.name {
            form = form.text("name", name.clone());
        }
        if let Some(biography) = &update.biography {
            form = form.text("biography", biography.clone());
        }
        if let Some(location) = &update.location {
            form = form.text("location", location.clone());
        }
        if let Some(path) = &update.avatar_path {
            form = form.part("profile_pic_file", file_part(path).await?);
        }

        let response = self.client.put(url).multipart(form).send().await?;

        check(response).await?;
        Ok(())
    }

    /// Delete the authenticated user's account (403 for anyone else)
    pub async fn delete_account(&self, username: &str) -> Result<(), ApiError> {
        let url = self.api_url(&format!("/auth/{}", urlencoding::encode(username)));

        let response = self
            .client
            .delete(url)
            .query(&[("token", self.token.clone())])
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }

    /// Fetch the user this token belongs to (401 if the token is stale)
    pub async fn current_user(&self) -> Result<CurrentUser, ApiError> {
        let response = self
            .client
            .get(self.api_url("/auth/profile"))
            .query(&[("token", self.token.clone())])
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }
}

/// Exchange username and password for an access token.
///
/// Stands alone because it runs before any client exists; Plaza expects
/// an OAuth2 password form and answers 401 on bad credentials.
pub async fn login(
    server: &str,
    username: &str,
    password: &str,
) -> Result<LoginResponse, ApiError> {
    let client = Client::new();
    let url = format!("{}/auth/login", server.trim_end_matches('/'));

    let params = [("username", username), ("password", password)];

    let response = client.post(&url).form(&params).send().await?;
    Ok(check(response).await?.json().await?)
}

/// Fields accepted by the profile update endpoint
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    /// New display name
    pub name: Option<String>,
    /// New biography
    pub biography: Option<String>,
    /// New location
    pub location: Option<String>,
    /// Local path of a new avatar image
    pub avatar_path: Option<PathBuf>,
}

/// Successful login payload
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    /// Token sent with every subsequent request
    pub access_token: String,
    /// Token type (always "bearer")
    pub token_type: String,
}

/// The user a token belongs to, as answered by `/auth/profile`
#[derive(Debug, Deserialize)]
pub struct CurrentUser {
    /// Numeric user id
    pub id: i64,
    /// Username
    pub username: String,
}

/// Map non-success responses to `ApiError::Rejected`
async fn check(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::rejected(status.as_u16(), &body))
    }
}

/// Read a local file into a multipart part, failing before any request
async fn file_part(path: &Path) -> Result<multipart::Part, ApiError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| ApiError::Upload {
            path: path.display().to_string(),
            source,
        })?;

    let file_name = path.file_name().map_or_else(
        || "upload".to_string(),
        |name| name.to_string_lossy().to_string(),
    );

    Ok(multipart::Part::bytes(bytes).file_name(file_name))
}

// ==================== API Types ====================

#[derive(Debug, Deserialize)]
struct UserSummaryDto {
    id: i64,
    username: String,
    full_name: Option<String>,
    profile_pic: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PostDto {
    id: i64,
    content: Option<String>,
    image_url: Option<String>,
    location: Option<String>,
    created_at: Option<String>,
    #[serde(default)]
    likes_count: u32,
    #[serde(default)]
    comments_count: u32,
    #[serde(default)]
    is_liked: bool,
    user: UserSummaryDto,
}

impl PostDto {
    fn into_post(self) -> Post {
        // Older servers emit naive timestamps without an offset
        let created_at = self
            .created_at
            .as_deref()
            .and_then(parse_timestamp)
            .unwrap_or_else(Utc::now);

        let display_name = self
            .user
            .full_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| self.user.username.clone());

        Post {
            id: self.id,
            author: Author {
                id: self.user.id,
                username: self.user.username,
                display_name,
                avatar: self.user.profile_pic,
            },
            content: self.content.unwrap_or_default(),
            image_url: self.image_url,
            location: self.location,
            like_count: self.likes_count,
            comment_count: self.comments_count,
            liked_by_me: self.is_liked,
            created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProfileDto {
    id: i64,
    username: String,
    name: Option<String>,
    email: Option<String>,
    profile_pic: Option<String>,
    biography: Option<String>,
    location: Option<String>,
    birth_date: Option<String>,
    gender: Option<String>,
    #[serde(default)]
    followers_count: u32,
    #[serde(default)]
    following_count: u32,
    #[serde(default)]
    posts_count: u32,
    #[serde(default)]
    is_following: bool,
}

impl ProfileDto {
    fn into_profile(self) -> Profile {
        Profile {
            id: self.id,
            username: self.username,
            name: self.name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            avatar: self.profile_pic,
            biography: self.biography,
            location: self.location,
            birth_date: self.birth_date,
            gender: self.gender,
            followers_count: self.followers_count,
            following_count: self.following_count,
            posts_count: self.posts_count,
            followed_by_me: self.is_following,
        }
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| s.parse::<NaiveDateTime>().ok().map(|naive| naive.and_utc()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED_ITEM: &str = r#"{
        "id": 42,
        "content": "merhaba #plaza",
        "image_url": null,
        "location": "Istanbul",
        "created_at": "2024-05-01T09:30:00",
        "author_id": 7,
        "likes_count": 3,
        "comments_count": 0,
        "is_liked": true,
        "user": {
            "id": 7,
            "username": "ada",
            "full_name": "Ada Lovelace",
            "profile_pic": null
        }
    }"#;

    #[test]
    fn test_post_dto_decodes_and_converts() {
        let dto: PostDto = serde_json::from_str(FEED_ITEM).unwrap();
        let post = dto.into_post();

        assert_eq!(post.id, 42);
        assert_eq!(post.author.id, 7);
        assert_eq!(post.author.username, "ada");
        assert_eq!(post.author.display_name, "Ada Lovelace");
        assert_eq!(post.content, "merhaba #plaza");
        assert_eq!(post.location.as_deref(), Some("Istanbul"));
        assert_eq!(post.like_count, 3);
        assert!(post.liked_by_me);
        assert_eq!(post.created_at.format("%Y-%m-%d").to_string(), "2024-05-01");
    }

    #[test]
    fn test_post_dto_null_optionals() {
        let json = r#"{
            "id": 1,
            "content": null,
            "image_url": null,
            "location": null,
            "created_at": null,
            "author_id": 2,
            "likes_count": 0,
            "comments_count": 0,
            "is_liked": false,
            "user": {"id": 2, "username": "grace", "full_name": null, "profile_pic": null}
        }"#;

        let dto: PostDto = serde_json::from_str(json).unwrap();
        let post = dto.into_post();

        assert_eq!(post.content, "");
        assert!(post.image_url.is_none());
        // Blank display name falls back to the username
        assert_eq!(post.author.display_name, "grace");
    }

    #[test]
    fn test_profile_dto_decodes_and_converts() {
        let json = r#"{
            "id": 7,
            "username": "ada",
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "profile_pic": "data:image/png;base64,AAAA",
            "biography": "first programmer",
            "location": null,
            "birth_date": null,
            "gender": null,
            "followers_count": 12,
            "following_count": 3,
            "posts_count": 5,
            "is_following": true
        }"#;

        let dto: ProfileDto = serde_json::from_str(json).unwrap();
        let profile = dto.into_profile();

        assert_eq!(profile.id, 7);
        assert_eq!(profile.name, "Ada Lovelace");
        assert!(profile.followed_by_me);
        assert_eq!(profile.posts_count, 5);
        assert!(profile.avatar.as_deref().unwrap().starts_with("data:image/"));
    }

    #[test]
    fn test_login_response_decodes() {
        let json = r#"{"access_token": "tok-1", "token_type": "bearer"}"#;
        let login: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(login.access_token, "tok-1");
        assert_eq!(login.token_type, "bearer");
    }

    #[test]
    fn test_current_user_ignores_extra_fields() {
        let json = r#"{"id": 7, "username": "ada", "email": "ada@example.com", "gender": null}"#;
        let user: CurrentUser = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, 7);
        assert_eq!(user.username, "ada");
    }

    #[test]
    fn test_parse_timestamp_naive_and_rfc3339() {
        let naive = parse_timestamp("2024-05-01T09:30:00").unwrap();
        assert_eq!(naive.format("%H:%M").to_string(), "09:30");

        let offset = parse_timestamp("2024-05-01T09:30:00+03:00").unwrap();
        assert_eq!(offset.format("%H:%M").to_string(), "06:30");

        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_api_url_joins_cleanly() {
        let client = PlazaClient::new("https://plaza.example.com/", "tok");
        assert_eq!(
            client.api_url("/posts/feed"),
            "https://plaza.example.com/posts/feed"
        );
    }
}
