//! Async operations for the TUI
//!
//! Uses channels to communicate between the sync TUI loop and the async
//! worker. Commands run sequentially; the one exception is the profile
//! load, which fetches the profile and its posts concurrently and joins
//! them before answering.

use std::path::PathBuf;
use tokio::sync::mpsc;

use crate::api::{self, ApiError, PlazaClient, ProfileUpdate};
use crate::models::{Post, Profile};
use crate::session::Session;

/// Commands sent from the TUI to the async worker
#[derive(Debug, Clone)]
pub enum AsyncCommand {
    /// Exchange credentials for a session
    Login {
        /// Username to log in as
        username: String,
        /// Password
        password: String,
    },
    /// Drop the worker's client after a local logout
    Logout,
    /// Check the stored token against the server
    ValidateSession,
    /// Fetch a page of the feed
    LoadFeed {
        /// Page number (1-based)
        page: usize,
        /// Posts per page
        limit: usize,
        /// Active hashtag filter
        hashtag: Option<String>,
    },
    /// Fetch a profile and its posts concurrently
    LoadProfile {
        /// Whose profile
        username: String,
        /// Page number for the posts (1-based)
        page: usize,
        /// Posts per page
        limit: usize,
    },
    /// Like a post
    LikePost {
        /// Post id
        post_id: i64,
    },
    /// Unlike a post
    UnlikePost {
        /// Post id
        post_id: i64,
    },
    /// Delete an own post
    DeletePost {
        /// Post id
        post_id: i64,
    },
    /// Create a post
    CreatePost {
        /// Post text
        content: String,
        /// Optional location
        location: Option<String>,
        /// Optional local image to attach
        image_path: Option<PathBuf>,
    },
    /// Follow a user
    Follow {
        /// Username to follow
        username: String,
    },
    /// Unfollow a user
    Unfollow {
        /// Username to unfollow
        username: String,
    },
    /// Update the session user's profile
    UpdateProfile {
        /// Username (must be the session user)
        username: String,
        /// Changed fields
        update: ProfileUpdate,
    },
    /// Delete the session user's account
    DeleteAccount {
        /// Username (must be the session user)
        username: String,
    },
    /// Shutdown the worker
    Shutdown,
}

/// A mutating action; its success triggers a full reload, never a local patch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    /// Like a post
    Like,
    /// Unlike a post
    Unlike,
    /// Delete a post
    DeletePost,
    /// Create a post
    CreatePost,
    /// Follow a user
    Follow,
    /// Unfollow a user
    Unfollow,
    /// Update the profile
    UpdateProfile,
    /// Delete the account
    DeleteAccount,
}

impl Mutation {
    /// Short label for status notes and logs
    pub fn label(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Unlike => "unlike",
            Self::DeletePost => "delete post",
            Self::CreatePost => "create post",
            Self::Follow => "follow",
            Self::Unfollow => "unfollow",
            Self::UpdateProfile => "update profile",
            Self::DeleteAccount => "delete account",
        }
    }
}

/// Results sent back from the async worker to the TUI
#[derive(Debug)]
pub enum AsyncResult {
    /// Login succeeded; the session has not been persisted yet
    LoggedIn {
        /// The fresh session
        session: Session,
    },
    /// Login was rejected
    LoginFailed {
        /// Server-provided or transport message
        message: String,
    },
    /// The stored token is still good
    SessionValidated,
    /// The stored token was rejected
    SessionInvalid,
    /// Feed page arrived
    FeedLoaded {
        /// Posts, newest first
        posts: Vec<Post>,
    },
    /// Feed fetch failed
    FeedFailed {
        /// What went wrong
        message: String,
    },
    /// Profile and posts arrived
    ProfileLoaded {
        /// The profile
        profile: Box<Profile>,
        /// That user's posts
        posts: Vec<Post>,
    },
    /// No such user
    ProfileNotFound {
        /// The username that was requested
        username: String,
    },
    /// Profile fetch failed for another reason
    ProfileFailed {
        /// What went wrong
        message: String,
    },
    /// A mutation succeeded
    MutationOk {
        /// Which mutation
        mutation: Mutation,
    },
    /// A mutation failed
    MutationFailed {
        /// Which mutation
        mutation: Mutation,
        /// Server-provided or transport message
        message: String,
    },
    /// Progress or side-channel note
    Status {
        /// Text for the status line
        message: String,
    },
}

/// Channel handles for communicating with the async worker
pub struct AsyncHandle {
    /// Send commands to the worker
    pub cmd_tx: mpsc::Sender<AsyncCommand>,
    /// Receive results from the worker
    pub result_rx: mpsc::Receiver<AsyncResult>,
}

/// Spawn the async worker and return handles.
///
/// The worker holds the HTTP client; it starts with one when a stored
/// session exists and swaps it on login/logout.
pub fn spawn_worker(server: String, token: Option<String>) -> AsyncHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<AsyncCommand>(32);
    let (result_tx, result_rx) = mpsc::channel::<AsyncResult>(32);

    tokio::spawn(async move {
        let mut client = token.map(|t| PlazaClient::new(&server, &t));

        while let Some(cmd) = cmd_rx.recv().await {
            match cmd {
                AsyncCommand::Shutdown => break,
                AsyncCommand::Logout => client = None,
                AsyncCommand::Login { username, password } => {
                    client = handle_login(&result_tx, &server, &username, &password).await;
                }
                cmd => {
                    let Some(client) = client.as_ref() else {
                        let _ = result_tx
                            .send(AsyncResult::Status {
                                message: "Not logged in".to_string(),
                            })
                            .await;
                        continue;
                    };
                    dispatch(client, &result_tx, cmd).await;
                }
            }
        }
    });

    AsyncHandle { cmd_tx, result_rx }
}

/// Route one authenticated command to its handler
async fn dispatch(client: &PlazaClient, result_tx: &mpsc::Sender<AsyncResult>, cmd: AsyncCommand) {
    match cmd {
        AsyncCommand::ValidateSession => handle_validate_session(client, result_tx).await,
        AsyncCommand::LoadFeed {
            page,
            limit,
            hashtag,
        } => handle_load_feed(client, result_tx, page, limit, hashtag).await,
        AsyncCommand::LoadProfile {
            username,
            page,
            limit,
        } => handle_load_profile(client, result_tx, username, page, limit).await,
        AsyncCommand::LikePost { post_id } => {
            send_mutation(result_tx, Mutation::Like, client.like(post_id).await).await;
        }
        AsyncCommand::UnlikePost { post_id } => {
            send_mutation(result_tx, Mutation::Unlike, client.unlike(post_id).await).await;
        }
        AsyncCommand::DeletePost { post_id } => {
            send_mutation(
                result_tx,
                Mutation::DeletePost,
                client.delete_post(post_id).await,
            )
            .await;
        }
        AsyncCommand::CreatePost {
            content,
            location,
            image_path,
        } => {
            let outcome = client
                .create_post(&content, location.as_deref(), image_path.as_deref())
                .await;
            send_mutation(result_tx, Mutation::CreatePost, outcome).await;
        }
        AsyncCommand::Follow { username } => {
            send_mutation(result_tx, Mutation::Follow, client.follow(&username).await).await;
        }
        AsyncCommand::Unfollow { username } => {
            send_mutation(
                result_tx,
                Mutation::Unfollow,
                client.unfollow(&username).await,
            )
            .await;
        }
        AsyncCommand::UpdateProfile { username, update } => {
            send_mutation(
                result_tx,
                Mutation::UpdateProfile,
                client.update_profile(&username, &update).await,
            )
            .await;
        }
        AsyncCommand::DeleteAccount { username } => {
            send_mutation(
                result_tx,
                Mutation::DeleteAccount,
                client.delete_account(&username).await,
            )
            .await;
        }
        // Handled by the worker loop before dispatch
        AsyncCommand::Login { .. } | AsyncCommand::Logout | AsyncCommand::Shutdown => {}
    }
}

/// Log in, then fetch the current user to complete the session triple
async fn handle_login(
    result_tx: &mpsc::Sender<AsyncResult>,
    server: &str,
    username: &str,
    password: &str,
) -> Option<PlazaClient> {
    let response = match api::login(server, username, password).await {
        Ok(response) => response,
        Err(e) => {
            let _ = result_tx
                .send(AsyncResult::LoginFailed {
                    message: e.to_string(),
                })
                .await;
            return None;
        }
    };

    let client = PlazaClient::new(server, &response.access_token);

    match client.current_user().await {
        Ok(user) => {
            let session = Session {
                token: response.access_token,
                user_id: user.id,
                username: user.username,
            };
            let _ = result_tx.send(AsyncResult::LoggedIn { session }).await;
            Some(client)
        }
        Err(e) => {
            let _ = result_tx
                .send(AsyncResult::LoginFailed {
                    message: format!("Logged in but could not fetch the profile: {e}"),
                })
                .await;
            None
        }
    }
}

/// Check the stored token; only a 401 invalidates it
async fn handle_validate_session(client: &PlazaClient, result_tx: &mpsc::Sender<AsyncResult>) {
    match client.current_user().await {
        Ok(_) => {
            let _ = result_tx.send(AsyncResult::SessionValidated).await;
        }
        Err(e) if e.is_unauthorized() => {
            let _ = result_tx.send(AsyncResult::SessionInvalid).await;
        }
        Err(e) => {
            // Server unreachable; keep the session and let the feed retry
            let _ = result_tx
                .send(AsyncResult::FeedFailed {
                    message: format!("Could not reach the server: {e}"),
                })
                .await;
        }
    }
}

async fn handle_load_feed(
    client: &PlazaClient,
    result_tx: &mpsc::Sender<AsyncResult>,
    page: usize,
    limit: usize,
    hashtag: Option<String>,
) {
    match client.feed(page, limit, hashtag.as_deref()).await {
        Ok(posts) => {
            let _ = result_tx.send(AsyncResult::FeedLoaded { posts }).await;
        }
        Err(e) => {
            let _ = result_tx
                .send(AsyncResult::FeedFailed {
                    message: e.to_string(),
                })
                .await;
        }
    }
}

/// Fetch profile and posts together; both must resolve before rendering
async fn handle_load_profile(
    client: &PlazaClient,
    result_tx: &mpsc::Sender<AsyncResult>,
    username: String,
    page: usize,
    limit: usize,
) {
    let (profile, posts) = tokio::join!(
        client.profile(&username),
        client.user_posts(&username, page, limit)
    );

    match profile {
        Ok(profile) => match posts {
            Ok(posts) => {
                let _ = result_tx
                    .send(AsyncResult::ProfileLoaded {
                        profile: Box::new(profile),
                        posts,
                    })
                    .await;
            }
            Err(e) => {
                // Render the profile anyway; the post list just stays empty
                let _ = result_tx
                    .send(AsyncResult::ProfileLoaded {
                        profile: Box::new(profile),
                        posts: Vec::new(),
                    })
                    .await;
                let _ = result_tx
                    .send(AsyncResult::Status {
                        message: format!("Could not load posts: {e}"),
                    })
                    .await;
            }
        },
        Err(e) if e.is_not_found() => {
            let _ = result_tx.send(AsyncResult::ProfileNotFound { username }).await;
        }
        Err(e) => {
            let _ = result_tx
                .send(AsyncResult::ProfileFailed {
                    message: e.to_string(),
                })
                .await;
        }
    }
}

/// Forward a mutation outcome; the UI layer owns the reload policy
async fn send_mutation(
    result_tx: &mpsc::Sender<AsyncResult>,
    mutation: Mutation,
    outcome: Result<(), ApiError>,
) {
    let result = match outcome {
        Ok(()) => AsyncResult::MutationOk { mutation },
        Err(e) => AsyncResult::MutationFailed {
            mutation,
            message: e.to_string(),
        },
    };
    let _ = result_tx.send(result).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutation_labels() {
        assert_eq!(Mutation::Like.label(), "like");
        assert_eq!(Mutation::DeleteAccount.label(), "delete account");
    }

    #[tokio::test]
    async fn test_worker_without_session_rejects_authenticated_commands() {
        let mut handle = spawn_worker("http://localhost:8000".to_string(), None);

        handle
            .cmd_tx
            .send(AsyncCommand::LoadFeed {
                page: 1,
                limit: 20,
                hashtag: None,
            })
            .await
            .unwrap();

        match handle.result_rx.recv().await {
            Some(AsyncResult::Status { message }) => assert_eq!(message, "Not logged in"),
            other => panic!("unexpected result: {other:?}"),
        }

        handle.cmd_tx.send(AsyncCommand::Shutdown).await.unwrap();
    }
}
