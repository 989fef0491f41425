//! Event handling

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::async_ops::AsyncCommand;
use super::state::{AppState, Mode, Screen};
use crate::api::ProfileUpdate;
use crate::session;

/// Handle key events, returning an optional async command
pub fn handle_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    // Handle mode-specific input first
    match state.mode {
        Mode::Alert => {
            state.dismiss_alert();
            return None;
        }
        Mode::Help => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Enter) {
                state.mode = Mode::Normal;
            }
            return None;
        }
        Mode::ConfirmDeletePost => {
            return handle_confirm_delete_post_key(state, key);
        }
        Mode::ConfirmDeleteAccount => {
            return handle_confirm_delete_account_key(state, key);
        }
        Mode::Compose => {
            return handle_compose_key(state, key);
        }
        Mode::EditProfile => {
            return handle_edit_profile_key(state, key);
        }
        Mode::Search => {
            return handle_search_key(state, key);
        }
        Mode::Normal => {}
    }

    // Screen-specific handling
    match state.screen {
        Screen::Login => handle_login_key(state, key),
        Screen::Feed => handle_feed_key(state, key),
        Screen::Profile => handle_profile_key(state, key),
    }
}

fn handle_login_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) | (_, KeyCode::Esc) => {
            state.should_quit = true;
            None
        }
        (_, KeyCode::Tab | KeyCode::Down | KeyCode::Up | KeyCode::BackTab) => {
            // Two fields, so next and prev coincide
            state.login_form.focus = state.login_form.focus.next();
            None
        }
        (_, KeyCode::Enter) => {
            if state.login_form.can_submit() {
                state.login_form.submitting = true;
                state.login_form.error = None;
                state.set_status("Logging in...");
                Some(AsyncCommand::Login {
                    username: state.login_form.username.trim().to_string(),
                    password: state.login_form.password.clone(),
                })
            } else {
                None
            }
        }
        (_, KeyCode::Char(c)) => {
            state.login_form.focused_value_mut().push(c);
            None
        }
        (_, KeyCode::Backspace) => {
            state.login_form.focused_value_mut().pop();
            None
        }
        _ => None,
    }
}

fn handle_feed_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) | (_, KeyCode::Char('q')) => {
            state.should_quit = true;
            None
        }
        (_, KeyCode::Char('?')) | (_, KeyCode::F(1)) => {
            state.mode = Mode::Help;
            None
        }

        // Navigation
        (_, KeyCode::Char('j') | KeyCode::Down) => {
            state.select_next();
            None
        }
        (_, KeyCode::Char('k') | KeyCode::Up) => {
            state.select_prev();
            None
        }
        (_, KeyCode::Char('g')) => {
            state.selected_post = 0;
            None
        }
        (_, KeyCode::Char('G')) => {
            if !state.posts.is_empty() {
                state.selected_post = state.posts.len() - 1;
            }
            None
        }

        // Refresh, keeping the active hashtag filter
        (_, KeyCode::Char('r')) => {
            if state.loading {
                None
            } else {
                state.loading = true;
                state.set_status("Refreshing...");
                Some(AsyncCommand::LoadFeed {
                    page: 1,
                    limit: state.config.page_size,
                    hashtag: state.active_search.clone(),
                })
            }
        }

        // Compose a new post
        (_, KeyCode::Char('n')) => {
            state.compose.clear();
            state.mode = Mode::Compose;
            None
        }

        // Like toggle on the selected post
        (_, KeyCode::Char('l')) => {
            if let Some(post) = state.selected_post() {
                let post_id = post.id;
                if post.liked_by_me {
                    state.set_status("Unliking...");
                    Some(AsyncCommand::UnlikePost { post_id })
                } else {
                    state.set_status("Liking...");
                    Some(AsyncCommand::LikePost { post_id })
                }
            } else {
                None
            }
        }

        // Delete own post (asks for confirmation)
        (_, KeyCode::Char('d')) => {
            if let Some(post) = state.selected_post() {
                if state.owns_post(post) {
                    state.pending_delete = Some(post.id);
                    state.mode = Mode::ConfirmDeletePost;
                } else {
                    state.set_status("You can only delete your own posts");
                }
            }
            None
        }

        // Hashtag search, prefilled with the active filter
        (_, KeyCode::Char('/')) => {
            state.search_input = state.active_search.clone().unwrap_or_default();
            state.mode = Mode::Search;
            None
        }

        // Open the selected post's author profile
        (_, KeyCode::Char('p')) => {
            if let Some(post) = state.selected_post() {
                let username = post.author.username.clone();
                state.open_profile(&username);
                state.loading = true;
                return Some(AsyncCommand::LoadProfile {
                    username,
                    page: 1,
                    limit: state.config.page_size,
                });
            }
            None
        }

        // Open own profile
        (_, KeyCode::Char('P')) => {
            if let Some(session) = &state.session {
                let username = session.username.clone();
                state.open_profile(&username);
                state.loading = true;
                return Some(AsyncCommand::LoadProfile {
                    username,
                    page: 1,
                    limit: state.config.page_size,
                });
            }
            None
        }

        (_, KeyCode::Char('t')) => {
            state.next_theme();
            None
        }

        // Clear the hashtag filter
        (_, KeyCode::Esc) => {
            if state.active_search.take().is_some() {
                state.selected_post = 0;
                state.loading = true;
                state.set_status("Filter cleared");
                Some(AsyncCommand::LoadFeed {
                    page: 1,
                    limit: state.config.page_size,
                    hashtag: None,
                })
            } else {
                None
            }
        }

        _ => None,
    }
}

fn handle_profile_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) | (_, KeyCode::Char('q')) => {
            state.should_quit = true;
            None
        }
        (_, KeyCode::Char('?')) | (_, KeyCode::F(1)) => {
            state.mode = Mode::Help;
            None
        }

        // Navigation
        (_, KeyCode::Char('j') | KeyCode::Down) => {
            state.select_next();
            None
        }
        (_, KeyCode::Char('k') | KeyCode::Up) => {
            state.select_prev();
            None
        }
        (_, KeyCode::Char('g')) => {
            state.selected_profile_post = 0;
            None
        }
        (_, KeyCode::Char('G')) => {
            if !state.profile_posts.is_empty() {
                state.selected_profile_post = state.profile_posts.len() - 1;
            }
            None
        }

        // Refresh the open profile
        (_, KeyCode::Char('r')) => {
            if state.loading {
                return None;
            }
            if let Some(username) = state.profile_username.clone() {
                state.loading = true;
                state.set_status("Refreshing...");
                return Some(AsyncCommand::LoadProfile {
                    username,
                    page: 1,
                    limit: state.config.page_size,
                });
            }
            None
        }

        // Back to the feed, which is re-fetched on return
        (_, KeyCode::Esc | KeyCode::Char('b')) => {
            state.screen = Screen::Feed;
            state.loading = true;
            Some(AsyncCommand::LoadFeed {
                page: 1,
                limit: state.config.page_size,
                hashtag: state.active_search.clone(),
            })
        }

        // Follow toggle (not on own profile)
        (_, KeyCode::Char('f')) => {
            if state.viewing_own_profile() {
                state.set_status("You cannot follow yourself");
                return None;
            }
            if let Some(profile) = &state.profile {
                let username = profile.username.clone();
                if profile.followed_by_me {
                    state.set_status("Unfollowing...");
                    return Some(AsyncCommand::Unfollow { username });
                }
                state.set_status("Following...");
                return Some(AsyncCommand::Follow { username });
            }
            None
        }

        // Edit own profile
        (_, KeyCode::Char('e')) => {
            if state.viewing_own_profile()
                && let Some(profile) = &state.profile
            {
                let profile = profile.clone();
                state.edit_profile.prefill(&profile);
                state.mode = Mode::EditProfile;
            }
            None
        }

        // Log out (drops the stored session)
        (_, KeyCode::Char('o')) => {
            if state.viewing_own_profile() {
                if let Err(e) = session::delete() {
                    tracing::warn!("could not remove session file: {e}");
                }
                state.reset_to_login();
                state.set_status("Logged out");
                return Some(AsyncCommand::Logout);
            }
            None
        }

        // Delete own account (asks for confirmation)
        (_, KeyCode::Char('x')) => {
            if state.viewing_own_profile() {
                state.mode = Mode::ConfirmDeleteAccount;
            }
            None
        }

        (_, KeyCode::Char('t')) => {
            state.next_theme();
            None
        }

        _ => None,
    }
}

fn handle_compose_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    match (key.modifiers, key.code) {
        (_, KeyCode::Esc) => {
            // Discard the draft
            state.compose.clear();
            state.mode = Mode::Normal;
            None
        }
        (KeyModifiers::CONTROL, KeyCode::Char('s')) => {
            if !state.compose.can_submit() {
                if !state.compose.submitting {
                    state.set_status("Write something or attach an image");
                }
                return None;
            }
            state.compose.submitting = true;
            state.loading = true;
            state.set_status("Posting...");

            let location = state.compose.location.trim();
            let image_path = state.compose.image_path.trim();
            Some(AsyncCommand::CreatePost {
                content: state.compose.content.trim().to_string(),
                location: (!location.is_empty()).then(|| location.to_string()),
                image_path: (!image_path.is_empty()).then(|| PathBuf::from(image_path)),
            })
        }
        (_, KeyCode::Tab) => {
            state.compose.focus = state.compose.focus.next();
            None
        }
        (_, KeyCode::Enter) => {
            // Newline in the text body, next field elsewhere
            if state.compose.focus == super::state::ComposeField::Content {
                state.compose.content.push('\n');
            } else {
                state.compose.focus = state.compose.focus.next();
            }
            None
        }
        (_, KeyCode::Char(c)) => {
            state.compose.focused_value_mut().push(c);
            None
        }
        (_, KeyCode::Backspace) => {
            state.compose.focused_value_mut().pop();
            None
        }
        _ => None,
    }
}

fn handle_edit_profile_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    match (key.modifiers, key.code) {
        (_, KeyCode::Esc) => {
            // Discard the edits
            state.mode = Mode::Normal;
            None
        }
        (KeyModifiers::CONTROL, KeyCode::Char('s')) => {
            if !state.edit_profile.can_submit() {
                if !state.edit_profile.submitting {
                    state.set_status("Name cannot be empty");
                }
                return None;
            }
            let Some(username) = state.session.as_ref().map(|s| s.username.clone()) else {
                return None;
            };
            state.edit_profile.submitting = true;
            state.loading = true;
            state.set_status("Saving profile...");

            let avatar_path = state.edit_profile.avatar_path.trim();
            // Text fields are sent as they stand, so blanking one clears it
            Some(AsyncCommand::UpdateProfile {
                username,
                update: ProfileUpdate {
                    name: Some(state.edit_profile.name.trim().to_string()),
                    biography: Some(state.edit_profile.biography.trim().to_string()),
                    location: Some(state.edit_profile.location.trim().to_string()),
                    avatar_path: (!avatar_path.is_empty()).then(|| PathBuf::from(avatar_path)),
                },
            })
        }
        (_, KeyCode::Tab | KeyCode::Enter) => {
            state.edit_profile.focus = state.edit_profile.focus.next();
            None
        }
        (_, KeyCode::Char(c)) => {
            state.edit_profile.focused_value_mut().push(c);
            None
        }
        (_, KeyCode::Backspace) => {
            state.edit_profile.focused_value_mut().pop();
            None
        }
        _ => None,
    }
}

fn handle_search_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    match key.code {
        KeyCode::Esc => {
            state.search_input.clear();
            state.mode = Mode::Normal;
            None
        }
        KeyCode::Enter => {
            let query = state.search_input.trim();
            // A single leading '#' is tolerated; a blank query clears the filter
            let tag = query.strip_prefix('#').unwrap_or(query);
            state.active_search = (!tag.is_empty()).then(|| tag.to_string());
            state.search_input.clear();
            state.mode = Mode::Normal;
            state.selected_post = 0;
            state.loading = true;
            state.set_status(match &state.active_search {
                Some(tag) => format!("Searching #{tag}..."),
                None => "Filter cleared".to_string(),
            });
            Some(AsyncCommand::LoadFeed {
                page: 1,
                limit: state.config.page_size,
                hashtag: state.active_search.clone(),
            })
        }
        KeyCode::Char(c) => {
            state.search_input.push(c);
            None
        }
        KeyCode::Backspace => {
            state.search_input.pop();
            None
        }
        _ => None,
    }
}

fn handle_confirm_delete_post_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            state.mode = Mode::Normal;
            if let Some(post_id) = state.pending_delete.take() {
                state.loading = true;
                state.set_status("Deleting post...");
                return Some(AsyncCommand::DeletePost { post_id });
            }
            None
        }
        KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
            state.pending_delete = None;
            state.mode = Mode::Normal;
            None
        }
        _ => None,
    }
}

fn handle_confirm_delete_account_key(state: &mut AppState, key: KeyEvent) -> Option<AsyncCommand> {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            state.mode = Mode::Normal;
            if let Some(username) = state.session.as_ref().map(|s| s.username.clone()) {
                state.loading = true;
                state.set_status("Deleting account...");
                return Some(AsyncCommand::DeleteAccount { username });
            }
            None
        }
        KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
            state.mode = Mode::Normal;
            None
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::{Author, Post, Profile};
    use crate::session::Session;
    use chrono::Utc;

    fn state_with_session() -> AppState {
        AppState::new(
            Config::default(),
            Some(Session {
                token: "tok".to_string(),
                user_id: 1,
                username: "ada".to_string(),
            }),
        )
    }

    fn post(id: i64, author_id: i64, liked: bool) -> Post {
        Post {
            id,
            author: Author {
                id: author_id,
                username: format!("user{author_id}"),
                display_name: format!("User {author_id}"),
                avatar: None,
            },
            content: "hello".to_string(),
            image_url: None,
            location: None,
            like_count: 0,
            comment_count: 0,
            liked_by_me: liked,
            created_at: Utc::now(),
        }
    }

    fn profile(username: &str, followed: bool) -> Profile {
        Profile {
            id: 7,
            username: username.to_string(),
            name: username.to_string(),
            email: String::new(),
            avatar: None,
            biography: None,
            location: None,
            birth_date: None,
            gender: None,
            followers_count: 0,
            following_count: 0,
            posts_count: 0,
            followed_by_me: followed,
        }
    }

    fn press(state: &mut AppState, code: KeyCode) -> Option<AsyncCommand> {
        handle_key(state, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn press_ctrl(state: &mut AppState, c: char) -> Option<AsyncCommand> {
        handle_key(
            state,
            KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL),
        )
    }

    #[test]
    fn test_quit_from_feed() {
        let mut state = state_with_session();
        press(&mut state, KeyCode::Char('q'));
        assert!(state.should_quit);
    }

    #[test]
    fn test_like_toggles_by_current_flag() {
        let mut state = state_with_session();
        state.posts = vec![post(5, 2, false)];

        match press(&mut state, KeyCode::Char('l')) {
            Some(AsyncCommand::LikePost { post_id }) => assert_eq!(post_id, 5),
            other => panic!("unexpected command: {other:?}"),
        }

        state.posts[0].liked_by_me = true;
        match press(&mut state, KeyCode::Char('l')) {
            Some(AsyncCommand::UnlikePost { post_id }) => assert_eq!(post_id, 5),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_delete_requires_ownership() {
        let mut state = state_with_session();
        state.posts = vec![post(5, 2, false)];

        assert!(press(&mut state, KeyCode::Char('d')).is_none());
        assert_eq!(state.mode, Mode::Normal);
        assert!(state.pending_delete.is_none());
        assert_eq!(state.status, "You can only delete your own posts");
    }

    #[test]
    fn test_delete_own_post_asks_for_confirmation() {
        let mut state = state_with_session();
        state.posts = vec![post(5, 1, false)];

        assert!(press(&mut state, KeyCode::Char('d')).is_none());
        assert_eq!(state.mode, Mode::ConfirmDeletePost);
        assert_eq!(state.pending_delete, Some(5));

        match press(&mut state, KeyCode::Char('y')) {
            Some(AsyncCommand::DeletePost { post_id }) => assert_eq!(post_id, 5),
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(state.pending_delete.is_none());
        assert_eq!(state.mode, Mode::Normal);
    }

    #[test]
    fn test_delete_confirmation_can_be_cancelled() {
        let mut state = state_with_session();
        state.posts = vec![post(5, 1, false)];
        press(&mut state, KeyCode::Char('d'));

        assert!(press(&mut state, KeyCode::Esc).is_none());
        assert!(state.pending_delete.is_none());
        assert_eq!(state.mode, Mode::Normal);
    }

    #[test]
    fn test_search_strips_one_leading_hash() {
        let mut state = state_with_session();
        press(&mut state, KeyCode::Char('/'));
        assert_eq!(state.mode, Mode::Search);

        for c in "#rust".chars() {
            press(&mut state, KeyCode::Char(c));
        }
        match press(&mut state, KeyCode::Enter) {
            Some(AsyncCommand::LoadFeed { hashtag, page, .. }) => {
                assert_eq!(hashtag.as_deref(), Some("rust"));
                assert_eq!(page, 1);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(state.active_search.as_deref(), Some("rust"));
        assert_eq!(state.mode, Mode::Normal);
    }

    #[test]
    fn test_blank_search_clears_filter() {
        let mut state = state_with_session();
        state.active_search = Some("rust".to_string());
        press(&mut state, KeyCode::Char('/'));
        // Prefilled with the active filter; erase it
        for _ in 0..state.search_input.len() {
            press(&mut state, KeyCode::Backspace);
        }

        match press(&mut state, KeyCode::Enter) {
            Some(AsyncCommand::LoadFeed { hashtag, .. }) => assert!(hashtag.is_none()),
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(state.active_search.is_none());
    }

    #[test]
    fn test_escape_clears_active_filter() {
        let mut state = state_with_session();
        state.active_search = Some("rust".to_string());

        match press(&mut state, KeyCode::Esc) {
            Some(AsyncCommand::LoadFeed { hashtag, .. }) => assert!(hashtag.is_none()),
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(state.active_search.is_none());

        // No filter, no reload
        assert!(press(&mut state, KeyCode::Esc).is_none());
    }

    #[test]
    fn test_compose_submit_needs_content_or_image() {
        let mut state = state_with_session();
        press(&mut state, KeyCode::Char('n'));
        assert_eq!(state.mode, Mode::Compose);

        assert!(press_ctrl(&mut state, 's').is_none());
        assert_eq!(state.mode, Mode::Compose);
        assert!(!state.compose.submitting);
    }

    #[test]
    fn test_compose_submit_trims_and_maps_optionals() {
        let mut state = state_with_session();
        press(&mut state, KeyCode::Char('n'));
        state.compose.content = "  hi there \n".to_string();
        state.compose.location = "   ".to_string();
        state.compose.image_path = " /tmp/cat.png ".to_string();

        match press_ctrl(&mut state, 's') {
            Some(AsyncCommand::CreatePost {
                content,
                location,
                image_path,
            }) => {
                assert_eq!(content, "hi there");
                assert!(location.is_none());
                assert_eq!(image_path, Some(PathBuf::from("/tmp/cat.png")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(state.compose.submitting);
        assert!(state.loading);
    }

    #[test]
    fn test_compose_escape_discards_draft() {
        let mut state = state_with_session();
        press(&mut state, KeyCode::Char('n'));
        state.compose.content = "draft".to_string();

        press(&mut state, KeyCode::Esc);
        assert_eq!(state.mode, Mode::Normal);
        assert!(state.compose.content.is_empty());
    }

    #[test]
    fn test_compose_enter_is_newline_in_content() {
        let mut state = state_with_session();
        press(&mut state, KeyCode::Char('n'));
        press(&mut state, KeyCode::Char('a'));
        press(&mut state, KeyCode::Enter);
        press(&mut state, KeyCode::Char('b'));
        assert_eq!(state.compose.content, "a\nb");
    }

    #[test]
    fn test_login_enter_requires_both_fields() {
        let mut state = AppState::new(Config::default(), None);
        assert!(press(&mut state, KeyCode::Enter).is_none());

        for c in "ada".chars() {
            press(&mut state, KeyCode::Char(c));
        }
        press(&mut state, KeyCode::Tab);
        for c in "secret".chars() {
            press(&mut state, KeyCode::Char(c));
        }

        match press(&mut state, KeyCode::Enter) {
            Some(AsyncCommand::Login { username, password }) => {
                assert_eq!(username, "ada");
                assert_eq!(password, "secret");
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(state.login_form.submitting);
    }

    #[test]
    fn test_follow_toggles_by_current_flag() {
        let mut state = state_with_session();
        state.open_profile("grace");
        state.profile = Some(profile("grace", false));

        match press(&mut state, KeyCode::Char('f')) {
            Some(AsyncCommand::Follow { username }) => assert_eq!(username, "grace"),
            other => panic!("unexpected command: {other:?}"),
        }

        state.profile.as_mut().unwrap().followed_by_me = true;
        match press(&mut state, KeyCode::Char('f')) {
            Some(AsyncCommand::Unfollow { username }) => assert_eq!(username, "grace"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_follow_rejected_on_own_profile() {
        let mut state = state_with_session();
        state.open_profile("ada");
        state.profile = Some(profile("ada", false));

        assert!(press(&mut state, KeyCode::Char('f')).is_none());
        assert_eq!(state.status, "You cannot follow yourself");
    }

    #[test]
    fn test_edit_profile_only_on_own_profile() {
        let mut state = state_with_session();
        state.open_profile("grace");
        state.profile = Some(profile("grace", false));

        press(&mut state, KeyCode::Char('e'));
        assert_eq!(state.mode, Mode::Normal);

        state.open_profile("ada");
        state.profile = Some(profile("ada", false));
        press(&mut state, KeyCode::Char('e'));
        assert_eq!(state.mode, Mode::EditProfile);
        assert_eq!(state.edit_profile.name, "ada");
    }

    #[test]
    fn test_edit_profile_submit_blocked_without_name() {
        let mut state = state_with_session();
        state.open_profile("ada");
        state.profile = Some(profile("ada", false));
        press(&mut state, KeyCode::Char('e'));
        state.edit_profile.name.clear();

        assert!(press_ctrl(&mut state, 's').is_none());
        assert_eq!(state.status, "Name cannot be empty");
        assert_eq!(state.mode, Mode::EditProfile);
    }

    #[test]
    fn test_edit_profile_submit_sends_all_text_fields() {
        let mut state = state_with_session();
        state.open_profile("ada");
        state.profile = Some(profile("ada", false));
        press(&mut state, KeyCode::Char('e'));
        state.edit_profile.biography = "new bio".to_string();

        match press_ctrl(&mut state, 's') {
            Some(AsyncCommand::UpdateProfile { username, update }) => {
                assert_eq!(username, "ada");
                assert_eq!(update.name.as_deref(), Some("ada"));
                assert_eq!(update.biography.as_deref(), Some("new bio"));
                assert_eq!(update.location.as_deref(), Some(""));
                assert!(update.avatar_path.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(state.edit_profile.submitting);
    }

    #[test]
    fn test_profile_from_feed_post() {
        let mut state = state_with_session();
        state.posts = vec![post(5, 2, false)];

        match press(&mut state, KeyCode::Char('p')) {
            Some(AsyncCommand::LoadProfile { username, .. }) => assert_eq!(username, "user2"),
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(state.screen, Screen::Profile);
        assert!(state.loading);
    }

    #[test]
    fn test_back_from_profile_reloads_feed() {
        let mut state = state_with_session();
        state.active_search = Some("rust".to_string());
        state.open_profile("grace");

        match press(&mut state, KeyCode::Esc) {
            Some(AsyncCommand::LoadFeed { hashtag, .. }) => {
                assert_eq!(hashtag.as_deref(), Some("rust"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(state.screen, Screen::Feed);
    }

    #[test]
    fn test_account_deletion_needs_confirmation() {
        let mut state = state_with_session();
        state.open_profile("ada");
        state.profile = Some(profile("ada", false));

        press(&mut state, KeyCode::Char('x'));
        assert_eq!(state.mode, Mode::ConfirmDeleteAccount);

        match press(&mut state, KeyCode::Char('y')) {
            Some(AsyncCommand::DeleteAccount { username }) => assert_eq!(username, "ada"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_account_deletion_hidden_on_other_profiles() {
        let mut state = state_with_session();
        state.open_profile("grace");
        state.profile = Some(profile("grace", false));

        press(&mut state, KeyCode::Char('x'));
        assert_eq!(state.mode, Mode::Normal);
    }

    #[test]
    fn test_alert_dismissed_by_any_key() {
        let mut state = state_with_session();
        state.open_alert("boom");

        assert!(press(&mut state, KeyCode::Char('z')).is_none());
        assert_eq!(state.mode, Mode::Normal);
        assert!(state.alert.is_none());
    }

    #[test]
    fn test_help_open_and_close() {
        let mut state = state_with_session();
        press(&mut state, KeyCode::Char('?'));
        assert_eq!(state.mode, Mode::Help);

        press(&mut state, KeyCode::Esc);
        assert_eq!(state.mode, Mode::Normal);
    }

    #[test]
    fn test_refresh_blocked_while_loading() {
        let mut state = state_with_session();
        state.loading = true;
        assert!(press(&mut state, KeyCode::Char('r')).is_none());

        state.loading = false;
        assert!(matches!(
            press(&mut state, KeyCode::Char('r')),
            Some(AsyncCommand::LoadFeed { .. })
        ));
    }
}
