//! Application state

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use ratatui_image::protocol::StatefulProtocol;

use crate::config::Config;
use crate::images::ImageCache;
use crate::models::{Post, Profile};
use crate::session::Session;
use crate::theme::Theme;

/// How long a transient status note stays visible
const STATUS_TIMEOUT: Duration = Duration::from_secs(6);

/// Protocol cache cap; encoded images are rebuilt from the image cache on demand
const MAX_PROTOCOLS: usize = 50;

/// Which screen is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    /// Username/password entry, shown when no session exists
    #[default]
    Login,
    /// The main feed of posts
    Feed,
    /// One user's profile and posts
    Profile,
}

/// Input mode layered over the current screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Plain navigation
    #[default]
    Normal,
    /// Compose-post modal
    Compose,
    /// Edit-profile modal (owner only)
    EditProfile,
    /// Hashtag search input
    Search,
    /// Confirm deleting the selected post
    ConfirmDeletePost,
    /// Confirm deleting the account
    ConfirmDeleteAccount,
    /// Blocking message, dismissed by any key
    Alert,
    /// Key bindings overlay
    Help,
}

/// Focusable fields of the login form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    /// Username entry
    #[default]
    Username,
    /// Password entry (masked)
    Password,
}

impl LoginField {
    /// Cycle to the other field
    pub fn next(self) -> Self {
        match self {
            Self::Username => Self::Password,
            Self::Password => Self::Username,
        }
    }
}

/// Login screen state
#[derive(Debug, Default)]
pub struct LoginForm {
    /// Username entry
    pub username: String,
    /// Password entry
    pub password: String,
    /// Focused field
    pub focus: LoginField,
    /// Inline error from the last attempt
    pub error: Option<String>,
    /// A login request is in flight
    pub submitting: bool,
}

impl LoginForm {
    /// Mutable access to the focused field's buffer
    pub fn focused_value_mut(&mut self) -> &mut String {
        match self.focus {
            LoginField::Username => &mut self.username,
            LoginField::Password => &mut self.password,
        }
    }

    /// Both fields filled and nothing in flight
    pub fn can_submit(&self) -> bool {
        !self.submitting
            && !self.username.trim().is_empty()
            && !self.password.is_empty()
    }
}

/// Focusable fields of the compose modal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComposeField {
    /// Post text (multi-line)
    #[default]
    Content,
    /// Optional location
    Location,
    /// Optional local image path
    ImagePath,
}

impl ComposeField {
    /// Cycle to the next field
    pub fn next(self) -> Self {
        match self {
            Self::Content => Self::Location,
            Self::Location => Self::ImagePath,
            Self::ImagePath => Self::Content,
        }
    }
}

/// Compose-post modal state
#[derive(Debug, Default)]
pub struct ComposeForm {
    /// Post text
    pub content: String,
    /// Optional location
    pub location: String,
    /// Optional local image path
    pub image_path: String,
    /// Focused field
    pub focus: ComposeField,
    /// A create request is in flight
    pub submitting: bool,
}

impl ComposeForm {
    /// Mutable access to the focused field's buffer
    pub fn focused_value_mut(&mut self) -> &mut String {
        match self.focus {
            ComposeField::Content => &mut self.content,
            ComposeField::Location => &mut self.location,
            ComposeField::ImagePath => &mut self.image_path,
        }
    }

    /// Submittable: nothing in flight, and there is text or an image
    pub fn can_submit(&self) -> bool {
        !self.submitting
            && (!self.content.trim().is_empty() || !self.image_path.trim().is_empty())
    }

    /// Reset to an empty form
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Focusable fields of the edit-profile modal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditField {
    /// Display name (required)
    #[default]
    Name,
    /// Biography
    Biography,
    /// Location
    Location,
    /// Local path of a new avatar image
    AvatarPath,
}

impl EditField {
    /// Cycle to the next field
    pub fn next(self) -> Self {
        match self {
            Self::Name => Self::Biography,
            Self::Biography => Self::Location,
            Self::Location => Self::AvatarPath,
            Self::AvatarPath => Self::Name,
        }
    }
}

/// Edit-profile modal state
#[derive(Debug, Default)]
pub struct EditProfileForm {
    /// Display name
    pub name: String,
    /// Biography
    pub biography: String,
    /// Location
    pub location: String,
    /// Local path of a new avatar image
    pub avatar_path: String,
    /// Focused field
    pub focus: EditField,
    /// An update request is in flight
    pub submitting: bool,
}

impl EditProfileForm {
    /// Prefill from the loaded profile
    pub fn prefill(&mut self, profile: &Profile) {
        self.name = profile.name.clone();
        self.biography = profile.biography.clone().unwrap_or_default();
        self.location = profile.location.clone().unwrap_or_default();
        self.avatar_path.clear();
        self.focus = EditField::Name;
        self.submitting = false;
    }

    /// Mutable access to the focused field's buffer
    pub fn focused_value_mut(&mut self) -> &mut String {
        match self.focus {
            EditField::Name => &mut self.name,
            EditField::Biography => &mut self.biography,
            EditField::Location => &mut self.location,
            EditField::AvatarPath => &mut self.avatar_path,
        }
    }

    /// Submittable: nothing in flight and the name is not blank
    pub fn can_submit(&self) -> bool {
        !self.submitting && !self.name.trim().is_empty()
    }
}

/// Application state
pub struct AppState {
    /// Configuration
    pub config: Config,
    /// Current theme
    pub theme: Theme,
    /// Authenticated session, if any
    pub session: Option<Session>,
    /// Whether to quit
    pub should_quit: bool,
    /// Current screen
    pub screen: Screen,
    /// Current input mode
    pub mode: Mode,
    /// A data request is in flight
    pub loading: bool,

    /// Posts in the feed
    pub posts: Vec<Post>,
    /// Selected feed post index
    pub selected_post: usize,
    /// Search input buffer (while typing)
    pub search_input: String,
    /// Submitted hashtag filter, if any
    pub active_search: Option<String>,

    /// Username whose profile is open
    pub profile_username: Option<String>,
    /// Loaded profile, if the fetch succeeded
    pub profile: Option<Profile>,
    /// That user's posts
    pub profile_posts: Vec<Post>,
    /// Selected profile post index
    pub selected_profile_post: usize,
    /// The requested username does not exist
    pub profile_not_found: bool,

    /// Login screen state
    pub login_form: LoginForm,
    /// Compose modal state
    pub compose: ComposeForm,
    /// Edit-profile modal state
    pub edit_profile: EditProfileForm,

    /// Blocking alert text
    pub alert: Option<String>,
    /// Mode to restore when the alert is dismissed
    alert_return: Mode,
    /// Post id awaiting delete confirmation
    pub pending_delete: Option<i64>,

    /// Status message (bottom bar)
    pub status: String,
    status_set_at: Option<Instant>,

    /// Decoded images shared with the loader task
    pub image_cache: ImageCache,
    /// References currently being loaded
    pub loading_images: HashSet<String>,
    /// Terminal-encoded images ready to render
    image_protocols: HashMap<String, StatefulProtocol>,

    /// Tick counter for animations
    tick: u64,
}

impl AppState {
    /// Create a new app state; lands on the feed when a session exists
    pub fn new(config: Config, session: Option<Session>) -> Self {
        let theme = config.theme;
        let screen = if session.is_some() {
            Screen::Feed
        } else {
            Screen::Login
        };

        Self {
            config,
            theme,
            session,
            should_quit: false,
            screen,
            mode: Mode::Normal,
            loading: false,
            posts: Vec::new(),
            selected_post: 0,
            search_input: String::new(),
            active_search: None,
            profile_username: None,
            profile: None,
            profile_posts: Vec::new(),
            selected_profile_post: 0,
            profile_not_found: false,
            login_form: LoginForm::default(),
            compose: ComposeForm::default(),
            edit_profile: EditProfileForm::default(),
            alert: None,
            alert_return: Mode::Normal,
            pending_delete: None,
            status: String::new(),
            status_set_at: None,
            image_cache: ImageCache::new(),
            loading_images: HashSet::new(),
            image_protocols: HashMap::new(),
            tick: 0,
        }
    }

    /// Tick for animations; expires stale status notes
    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
        if let Some(set_at) = self.status_set_at
            && set_at.elapsed() > STATUS_TIMEOUT
        {
            self.status.clear();
            self.status_set_at = None;
        }
    }

    /// Get current tick
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Set a transient status message
    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = msg.into();
        self.status_set_at = Some(Instant::now());
    }

    /// Get the currently selected feed post
    pub fn selected_post(&self) -> Option<&Post> {
        self.posts.get(self.selected_post)
    }

    /// Get the currently selected profile post
    pub fn selected_profile_post(&self) -> Option<&Post> {
        self.profile_posts.get(self.selected_profile_post)
    }

    /// Move selection down in the active list
    pub fn select_next(&mut self) {
        match self.screen {
            Screen::Feed => {
                if !self.posts.is_empty() {
                    self.selected_post = (self.selected_post + 1).min(self.posts.len() - 1);
                }
            }
            Screen::Profile => {
                if !self.profile_posts.is_empty() {
                    self.selected_profile_post =
                        (self.selected_profile_post + 1).min(self.profile_posts.len() - 1);
                }
            }
            Screen::Login => {}
        }
    }

    /// Move selection up in the active list
    pub fn select_prev(&mut self) {
        match self.screen {
            Screen::Feed => self.selected_post = self.selected_post.saturating_sub(1),
            Screen::Profile => {
                self.selected_profile_post = self.selected_profile_post.saturating_sub(1);
            }
            Screen::Login => {}
        }
    }

    /// Whether the open profile belongs to the session user
    pub fn viewing_own_profile(&self) -> bool {
        match (&self.session, &self.profile_username) {
            (Some(session), Some(username)) => session.is_owner(username),
            _ => false,
        }
    }

    /// Whether the session user authored the given post
    pub fn owns_post(&self, post: &Post) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.user_id == post.author.id)
    }

    /// Switch to a profile and reset its view state
    pub fn open_profile(&mut self, username: &str) {
        self.screen = Screen::Profile;
        self.profile_username = Some(username.to_string());
        self.profile = None;
        self.profile_posts.clear();
        self.selected_profile_post = 0;
        self.profile_not_found = false;
    }

    /// Drop everything tied to the session and return to the login screen
    pub fn reset_to_login(&mut self) {
        self.session = None;
        self.screen = Screen::Login;
        self.mode = Mode::Normal;
        self.loading = false;
        self.posts.clear();
        self.selected_post = 0;
        self.active_search = None;
        self.search_input.clear();
        self.profile_username = None;
        self.profile = None;
        self.profile_posts.clear();
        self.selected_profile_post = 0;
        self.profile_not_found = false;
        self.login_form = LoginForm::default();
        self.compose.clear();
        self.pending_delete = None;
    }

    /// Cycle to the next theme and persist the choice in config
    pub fn next_theme(&mut self) {
        self.theme = self.theme.next();
        self.config.theme = self.theme;
        self.set_status(format!("✓ Theme set to {}", self.theme.name()));
    }

    /// Show a blocking alert, remembering the mode to restore on dismiss
    pub fn open_alert(&mut self, message: impl Into<String>) {
        self.alert = Some(message.into());
        self.alert_return = match self.mode {
            // Failed modal submits keep their modal open underneath
            Mode::Compose | Mode::EditProfile => self.mode,
            _ => Mode::Normal,
        };
        self.mode = Mode::Alert;
    }

    /// Dismiss the alert and restore the previous mode
    pub fn dismiss_alert(&mut self) {
        self.alert = None;
        self.mode = self.alert_return;
        self.alert_return = Mode::Normal;
    }

    /// Feed panel title, showing the active hashtag filter
    pub fn feed_title(&self) -> String {
        match &self.active_search {
            Some(tag) => format!(" Feed: #{tag} "),
            None => " Feed ".to_string(),
        }
    }

    /// Image references visible right now that still need loading
    pub fn get_images_to_load(&self) -> Vec<String> {
        let mut wanted = Vec::new();

        match self.screen {
            Screen::Feed => {
                if let Some(post) = self.selected_post() {
                    wanted.extend(post.image_url.clone());
                    wanted.extend(post.author.avatar.clone());
                }
            }
            Screen::Profile => {
                if let Some(profile) = &self.profile {
                    wanted.extend(profile.avatar.clone());
                }
                if let Some(post) = self.selected_profile_post() {
                    wanted.extend(post.image_url.clone());
                }
            }
            Screen::Login => {}
        }

        wanted
            .into_iter()
            .filter(|r| !self.image_cache.contains(r) && !self.loading_images.contains(r))
            .collect()
    }

    /// Record references as in flight so they are not requested twice
    pub fn mark_images_loading(&mut self, references: &[String]) {
        for reference in references {
            self.loading_images.insert(reference.clone());
        }
    }

    /// Forget an in-flight reference once the loader answered
    pub fn image_load_finished(&mut self, reference: &str) {
        self.loading_images.remove(reference);
    }

    /// Terminal-encoded protocol for a cached image, built lazily
    pub fn image_protocol(&mut self, reference: &str) -> Option<&mut StatefulProtocol> {
        if !self.image_protocols.contains_key(reference) {
            let image = self.image_cache.get(reference)?;
            let picker = crate::images::picker()?;
            if self.image_protocols.len() >= MAX_PROTOCOLS {
                self.image_protocols.clear();
            }
            let protocol = picker.new_resize_protocol((*image).clone());
            self.image_protocols.insert(reference.to_string(), protocol);
        }
        self.image_protocols.get_mut(reference)
    }
}
