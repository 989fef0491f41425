//! TUI Application module

mod async_ops;
mod events;
mod state;
mod ui;

pub use state::AppState;

use anyhow::Result;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use std::io::stdout;
use std::time::Duration;
use tokio::runtime::Runtime;

use crate::config::Config;
use crate::images::{self, ImageLoader, LoadResult};
use crate::session;

use async_ops::{AsyncCommand, AsyncHandle, AsyncResult, Mutation, spawn_worker};
use state::{LoginForm, Mode, Screen};

/// Run the TUI application
pub fn run(server_override: Option<String>) -> Result<()> {
    // Create tokio runtime
    let rt = Runtime::new()?;

    // Load config
    let mut config = Config::load()?;
    if let Some(server) = server_override {
        config.server_url = server;
    }

    // A broken session file is treated as no session
    let stored_session = match session::load() {
        Ok(stored_session) => stored_session,
        Err(e) => {
            tracing::warn!("could not read stored session: {e}");
            None
        }
    };

    // Query terminal graphics support before raw mode
    images::init_picker();

    let server = config.server_base().to_string();
    let token = stored_session.as_ref().map(|s| s.token.clone());

    // Create app state
    let mut state = AppState::new(config, stored_session);

    // Spawn the async worker and the image loader on the runtime
    let (async_handle, image_loader) = rt.block_on(async {
        (
            spawn_worker(server, token),
            ImageLoader::new(state.image_cache.clone()),
        )
    });

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // A stored session is checked against the server before the feed loads
    if state.session.is_some() {
        state.loading = true;
        state.set_status("Checking session...");
        let _ = async_handle
            .cmd_tx
            .blocking_send(AsyncCommand::ValidateSession);
    }

    // Main loop
    let result = run_app(&mut terminal, &mut state, async_handle, image_loader);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut AppState,
    mut async_handle: AsyncHandle,
    mut image_loader: ImageLoader,
) -> Result<()> {
    loop {
        // Process any async results
        while let Ok(result) = async_handle.result_rx.try_recv() {
            if let Some(cmd) = handle_async_result(state, result) {
                let _ = async_handle.cmd_tx.blocking_send(cmd);
            }
        }

        // Answers from the image loader; decoded images are already cached
        for result in image_loader.poll_results() {
            match result {
                LoadResult::Success { reference } => state.image_load_finished(&reference),
                LoadResult::Failed { reference, error } => {
                    state.image_load_finished(&reference);
                    tracing::warn!("Failed to load image {reference}: {error}");
                }
            }
        }

        // Draw UI
        terminal.draw(|frame| ui::render(frame, state))?;

        // Handle events
        if event::poll(Duration::from_millis(50))?
            && let Event::Key(key) = event::read()?
            && let Some(cmd) = events::handle_key(state, key)
        {
            let _ = async_handle.cmd_tx.blocking_send(cmd);
        }

        // Queue image loading for what is on screen
        let images_to_load = state.get_images_to_load();
        if !images_to_load.is_empty() {
            state.mark_images_loading(&images_to_load);
            for reference in images_to_load {
                image_loader.load(&reference);
            }
        }

        // Tick for animations
        state.tick();

        if state.should_quit {
            // Shutdown async worker and image loader
            let _ = async_handle.cmd_tx.blocking_send(AsyncCommand::Shutdown);
            image_loader.shutdown();
            break;
        }
    }

    // Save config on exit (persists theme changes)
    state.config.save()?;

    Ok(())
}

/// Apply one worker answer to the state.
///
/// Mutations never patch lists in place; a successful one chains a reload
/// of whichever screen is showing, so counts and flags always come from
/// the server.
fn handle_async_result(state: &mut AppState, result: AsyncResult) -> Option<AsyncCommand> {
    match result {
        AsyncResult::LoggedIn { session } => {
            if let Err(e) = session::save(&session) {
                tracing::warn!("could not persist session: {e}");
            }
            state.session = Some(session);
            state.login_form = LoginForm::default();
            state.screen = Screen::Feed;
            state.loading = true;
            state.set_status("Logged in");
            Some(AsyncCommand::LoadFeed {
                page: 1,
                limit: state.config.page_size,
                hashtag: None,
            })
        }
        AsyncResult::LoginFailed { message } => {
            state.login_form.submitting = false;
            state.login_form.password.clear();
            state.login_form.error = Some(message);
            state.loading = false;
            None
        }
        AsyncResult::SessionValidated => {
            state.loading = true;
            Some(AsyncCommand::LoadFeed {
                page: 1,
                limit: state.config.page_size,
                hashtag: None,
            })
        }
        AsyncResult::SessionInvalid => {
            if let Err(e) = session::delete() {
                tracing::warn!("could not remove session file: {e}");
            }
            state.reset_to_login();
            state.set_status("Session expired, please log in again");
            Some(AsyncCommand::Logout)
        }
        AsyncResult::FeedLoaded { posts } => {
            state.posts = posts;
            state.selected_post = 0;
            state.loading = false;
            state.set_status(format!("Loaded {} posts", state.posts.len()));
            None
        }
        AsyncResult::FeedFailed { message } => {
            state.loading = false;
            tracing::warn!("feed load failed: {message}");
            state.set_status(format!("✗ {message}"));
            None
        }
        AsyncResult::ProfileLoaded { profile, posts } => {
            state.profile = Some(*profile);
            state.profile_posts = posts;
            state.selected_profile_post = 0;
            state.profile_not_found = false;
            state.loading = false;
            None
        }
        AsyncResult::ProfileNotFound { username } => {
            state.profile = None;
            state.profile_posts.clear();
            state.profile_not_found = true;
            state.loading = false;
            state.set_status(format!("User @{username} was not found"));
            None
        }
        AsyncResult::ProfileFailed { message } => {
            state.loading = false;
            tracing::warn!("profile load failed: {message}");
            state.set_status(format!("✗ {message}"));
            None
        }
        AsyncResult::MutationOk { mutation } => handle_mutation_ok(state, mutation),
        AsyncResult::MutationFailed { mutation, message } => {
            handle_mutation_failed(state, mutation, message);
            None
        }
        AsyncResult::Status { message } => {
            state.set_status(message);
            None
        }
    }
}

fn handle_mutation_ok(state: &mut AppState, mutation: Mutation) -> Option<AsyncCommand> {
    state.loading = false;
    match mutation {
        Mutation::Like => {
            state.set_status("♥ Liked");
            reload_feed(state)
        }
        Mutation::Unlike => {
            state.set_status("Unliked");
            reload_feed(state)
        }
        Mutation::DeletePost => {
            state.set_status("Post deleted");
            reload_feed(state)
        }
        Mutation::CreatePost => {
            state.compose.clear();
            state.mode = Mode::Normal;
            state.set_status("Posted");
            reload_feed(state)
        }
        Mutation::Follow => {
            state.set_status("Followed");
            reload_profile(state)
        }
        Mutation::Unfollow => {
            state.set_status("Unfollowed");
            reload_profile(state)
        }
        Mutation::UpdateProfile => {
            state.edit_profile.submitting = false;
            state.mode = Mode::Normal;
            state.set_status("Profile updated");
            reload_profile(state)
        }
        Mutation::DeleteAccount => {
            if let Err(e) = session::delete() {
                tracing::warn!("could not remove session file: {e}");
            }
            state.reset_to_login();
            state.set_status("Account deleted");
            Some(AsyncCommand::Logout)
        }
    }
}

fn handle_mutation_failed(state: &mut AppState, mutation: Mutation, message: String) {
    state.loading = false;
    match mutation {
        // Toggles fail quietly; a status note is enough
        Mutation::Like | Mutation::Unlike | Mutation::Follow | Mutation::Unfollow => {
            tracing::warn!("{} failed: {message}", mutation.label());
            state.set_status(format!("✗ Could not {}: {message}", mutation.label()));
        }
        // The modal stays open underneath so the draft survives
        Mutation::CreatePost => {
            state.compose.submitting = false;
            tracing::error!("create post failed: {message}");
            state.open_alert(format!("Could not create post: {message}"));
        }
        Mutation::UpdateProfile => {
            state.edit_profile.submitting = false;
            tracing::error!("profile update failed: {message}");
            state.open_alert(format!("Could not update profile: {message}"));
        }
        Mutation::DeletePost => {
            tracing::error!("delete post failed: {message}");
            state.open_alert(format!("Could not delete post: {message}"));
        }
        Mutation::DeleteAccount => {
            tracing::error!("account deletion failed: {message}");
            state.open_alert(format!("Could not delete account: {message}"));
        }
    }
}

/// Reload the feed, keeping the active hashtag filter; a no-op when the
/// user has navigated elsewhere
fn reload_feed(state: &mut AppState) -> Option<AsyncCommand> {
    if state.screen != Screen::Feed {
        return None;
    }
    state.loading = true;
    Some(AsyncCommand::LoadFeed {
        page: 1,
        limit: state.config.page_size,
        hashtag: state.active_search.clone(),
    })
}

/// Reload the open profile; a no-op when the user has navigated elsewhere
fn reload_profile(state: &mut AppState) -> Option<AsyncCommand> {
    if state.screen != Screen::Profile {
        return None;
    }
    let username = state.profile_username.clone()?;
    state.loading = true;
    Some(AsyncCommand::LoadProfile {
        username,
        page: 1,
        limit: state.config.page_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Author, Post};
    use crate::session::Session;
    use chrono::Utc;

    fn test_state() -> AppState {
        AppState::new(
            Config::default(),
            Some(Session {
                token: "tok".to_string(),
                user_id: 1,
                username: "ada".to_string(),
            }),
        )
    }

    fn post(id: i64) -> Post {
        Post {
            id,
            author: Author {
                id: 2,
                username: "grace".to_string(),
                display_name: "Grace".to_string(),
                avatar: None,
            },
            content: "hello".to_string(),
            image_url: None,
            location: None,
            like_count: 3,
            comment_count: 0,
            liked_by_me: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_like_success_reloads_instead_of_patching() {
        let mut state = test_state();
        state.posts = vec![post(5)];

        let cmd = handle_async_result(
            &mut state,
            AsyncResult::MutationOk {
                mutation: Mutation::Like,
            },
        );

        assert!(matches!(cmd, Some(AsyncCommand::LoadFeed { .. })));
        // The list is untouched until the reload lands
        assert_eq!(state.posts[0].like_count, 3);
        assert!(!state.posts[0].liked_by_me);
        assert!(state.loading);
    }

    #[test]
    fn test_delete_success_reloads_instead_of_removing() {
        let mut state = test_state();
        state.posts = vec![post(5), post(6)];

        let cmd = handle_async_result(
            &mut state,
            AsyncResult::MutationOk {
                mutation: Mutation::DeletePost,
            },
        );

        assert!(matches!(cmd, Some(AsyncCommand::LoadFeed { .. })));
        assert_eq!(state.posts.len(), 2);
    }

    #[test]
    fn test_feed_reload_keeps_active_filter() {
        let mut state = test_state();
        state.active_search = Some("rust".to_string());

        match handle_async_result(
            &mut state,
            AsyncResult::MutationOk {
                mutation: Mutation::Like,
            },
        ) {
            Some(AsyncCommand::LoadFeed { hashtag, .. }) => {
                assert_eq!(hashtag.as_deref(), Some("rust"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_mutation_after_navigating_away_chains_nothing() {
        let mut state = test_state();
        state.open_profile("grace");

        let cmd = handle_async_result(
            &mut state,
            AsyncResult::MutationOk {
                mutation: Mutation::Like,
            },
        );
        assert!(cmd.is_none());
    }

    #[test]
    fn test_create_post_success_closes_modal_and_reloads() {
        let mut state = test_state();
        state.mode = Mode::Compose;
        state.compose.content = "draft".to_string();
        state.compose.submitting = true;

        let cmd = handle_async_result(
            &mut state,
            AsyncResult::MutationOk {
                mutation: Mutation::CreatePost,
            },
        );

        assert!(matches!(cmd, Some(AsyncCommand::LoadFeed { .. })));
        assert_eq!(state.mode, Mode::Normal);
        assert!(state.compose.content.is_empty());
        assert!(!state.compose.submitting);
    }

    #[test]
    fn test_create_post_failure_keeps_draft_under_alert() {
        let mut state = test_state();
        state.mode = Mode::Compose;
        state.compose.content = "draft".to_string();
        state.compose.submitting = true;

        let cmd = handle_async_result(
            &mut state,
            AsyncResult::MutationFailed {
                mutation: Mutation::CreatePost,
                message: "boom".to_string(),
            },
        );

        assert!(cmd.is_none());
        assert_eq!(state.mode, Mode::Alert);
        assert_eq!(state.compose.content, "draft");
        assert!(!state.compose.submitting);

        state.dismiss_alert();
        assert_eq!(state.mode, Mode::Compose);
    }

    #[test]
    fn test_follow_success_reloads_profile() {
        let mut state = test_state();
        state.open_profile("grace");

        match handle_async_result(
            &mut state,
            AsyncResult::MutationOk {
                mutation: Mutation::Follow,
            },
        ) {
            Some(AsyncCommand::LoadProfile { username, .. }) => assert_eq!(username, "grace"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_like_failure_is_a_status_note() {
        let mut state = test_state();

        let cmd = handle_async_result(
            &mut state,
            AsyncResult::MutationFailed {
                mutation: Mutation::Like,
                message: "you already liked this post".to_string(),
            },
        );

        assert!(cmd.is_none());
        assert_eq!(state.mode, Mode::Normal);
        assert!(state.status.contains("Could not like"));
        assert!(!state.loading);
    }

    #[test]
    fn test_login_failure_clears_password_keeps_username() {
        let mut state = AppState::new(Config::default(), None);
        state.login_form.username = "ada".to_string();
        state.login_form.password = "secret".to_string();
        state.login_form.submitting = true;

        let cmd = handle_async_result(
            &mut state,
            AsyncResult::LoginFailed {
                message: "Incorrect username or password".to_string(),
            },
        );

        assert!(cmd.is_none());
        assert_eq!(state.login_form.username, "ada");
        assert!(state.login_form.password.is_empty());
        assert!(!state.login_form.submitting);
        assert_eq!(
            state.login_form.error.as_deref(),
            Some("Incorrect username or password")
        );
    }

    #[test]
    fn test_feed_loaded_resets_selection() {
        let mut state = test_state();
        state.selected_post = 7;
        state.loading = true;

        handle_async_result(
            &mut state,
            AsyncResult::FeedLoaded {
                posts: vec![post(1), post(2)],
            },
        );

        assert_eq!(state.selected_post, 0);
        assert_eq!(state.posts.len(), 2);
        assert!(!state.loading);
        assert_eq!(state.status, "Loaded 2 posts");
    }

    #[test]
    fn test_profile_not_found_chains_nothing() {
        let mut state = test_state();
        state.open_profile("nobody");
        state.loading = true;

        let cmd = handle_async_result(
            &mut state,
            AsyncResult::ProfileNotFound {
                username: "nobody".to_string(),
            },
        );

        assert!(cmd.is_none());
        assert!(state.profile_not_found);
        assert!(!state.loading);
    }

    #[test]
    fn test_validated_session_loads_feed() {
        let mut state = test_state();

        match handle_async_result(&mut state, AsyncResult::SessionValidated) {
            Some(AsyncCommand::LoadFeed { page, hashtag, .. }) => {
                assert_eq!(page, 1);
                assert!(hashtag.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
