//! Profile model

/// A user profile as rendered on the profile screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// Numeric user id
    pub id: i64,
    /// Username (unique handle)
    pub username: String,
    /// Display name
    pub name: String,
    /// Account email
    pub email: String,
    /// Avatar reference (URL or data URI)
    pub avatar: Option<String>,
    /// Biography text
    pub biography: Option<String>,
    /// Location string
    pub location: Option<String>,
    /// Birth date as sent by the server
    pub birth_date: Option<String>,
    /// Gender as sent by the server
    pub gender: Option<String>,
    /// Number of followers
    pub followers_count: u32,
    /// Number of accounts this user follows
    pub following_count: u32,
    /// Number of posts
    pub posts_count: u32,
    /// Whether the viewer follows this user
    pub followed_by_me: bool,
}

impl Profile {
    /// Handle form for display (e.g., "@ada")
    pub fn handle(&self) -> String {
        format!("@{}", self.username)
    }

    /// Display name, falling back to the username when blank
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.username
        } else {
            &self.name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_profile() -> Profile {
        Profile {
            id: 7,
            username: "ada".to_string(),
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            avatar: None,
            biography: None,
            location: None,
            birth_date: None,
            gender: None,
            followers_count: 2,
            following_count: 3,
            posts_count: 5,
            followed_by_me: false,
        }
    }

    #[test]
    fn test_handle() {
        assert_eq!(sample_profile().handle(), "@ada");
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        let mut profile = sample_profile();
        assert_eq!(profile.display_name(), "Ada Lovelace");

        profile.name = "   ".to_string();
        assert_eq!(profile.display_name(), "ada");
    }
}
