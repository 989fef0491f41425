//! Color themes for the terminal UI.
//!
//! Palettes come from the `ratatui-themes` crate; this module narrows each
//! palette down to the handful of styles the screens actually draw with.
//! The active theme is stored in the config file by name and can be cycled
//! at runtime.

use ratatui::style::{Color, Modifier, Style};
use ratatui_themes::{ThemeName, ThemePalette};
use serde::{Deserialize, Serialize};

/// A selectable color scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Theme(pub ThemeName);

impl Theme {
    /// Display name, e.g. `"Dracula"`.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.0.display_name()
    }

    /// The theme after this one in the rotation, wrapping at the end.
    #[must_use]
    pub fn next(&self) -> Self {
        Self(self.0.next())
    }

    /// Resolve the palette into the styles the screens draw with.
    #[must_use]
    pub fn colors(&self) -> ThemeColors {
        ThemeColors::resolve(self.0.palette())
    }
}

impl From<ThemeName> for Theme {
    fn from(name: ThemeName) -> Self {
        Self(name)
    }
}

/// Styles and colors resolved from a theme palette.
///
/// Text goes through the style helpers; the public color fields are for
/// backgrounds and dialog borders, which widgets set directly.
#[derive(Debug, Clone, Copy)]
pub struct ThemeColors {
    /// Base screen background
    pub bg: Color,
    /// Slightly lifted background for the status bar and popups
    pub bg_secondary: Color,
    /// Confirmation accents in destructive prompts
    pub success: Color,
    /// Border for the delete-post prompt
    pub warning: Color,
    /// Border for alerts and the account-deletion prompt
    pub error: Color,

    fg: Color,
    muted: Color,
    accent: Color,
    secondary: Color,
    info: Color,
    selection: Color,
}

impl ThemeColors {
    fn resolve(p: ThemePalette) -> Self {
        Self {
            bg: p.bg,
            bg_secondary: lift(p.bg, 10),
            success: p.success,
            warning: p.warning,
            error: p.error,
            fg: p.fg,
            muted: p.muted,
            accent: p.accent,
            secondary: p.secondary,
            info: p.info,
            selection: p.selection,
        }
    }

    /// Body text
    #[must_use]
    pub fn text(&self) -> Style {
        fg(self.fg)
    }

    /// De-emphasized text (timestamps, counts, separators)
    #[must_use]
    pub fn text_dim(&self) -> Style {
        fg(self.muted)
    }

    /// Chrome text (labels, hint lines); same weight as [`Self::text_dim`]
    #[must_use]
    pub fn text_muted(&self) -> Style {
        self.text_dim()
    }

    /// Primary accent, used for authors and titles
    #[must_use]
    pub fn text_primary(&self) -> Style {
        fg(self.accent)
    }

    /// Secondary accent, used for handles and hashtags
    #[must_use]
    pub fn text_secondary(&self) -> Style {
        fg(self.secondary)
    }

    /// Success notes in the status bar
    #[must_use]
    pub fn text_success(&self) -> Style {
        fg(self.success)
    }

    /// Pending destructive actions
    #[must_use]
    pub fn text_warning(&self) -> Style {
        fg(self.warning)
    }

    /// Error text in forms and the status bar
    #[must_use]
    pub fn text_error(&self) -> Style {
        fg(self.error)
    }

    /// Informational callouts
    #[must_use]
    pub fn text_info(&self) -> Style {
        fg(self.info)
    }

    /// Border for panels that do not own focus
    #[must_use]
    pub fn block(&self) -> Style {
        fg(self.muted)
    }

    /// Border for the focused panel or input field
    #[must_use]
    pub fn block_focus(&self) -> Style {
        fg(self.accent)
    }

    /// List row under the cursor
    #[must_use]
    pub fn selected(&self) -> Style {
        fg(self.fg)
            .bg(self.selection)
            .add_modifier(Modifier::BOLD)
    }

    /// Keyboard shortcut markers in hint lines
    #[must_use]
    pub fn key_hint(&self) -> Style {
        fg(self.secondary).add_modifier(Modifier::BOLD)
    }

    /// The logo banner and header title
    #[must_use]
    pub fn logo(&self) -> Style {
        fg(self.accent).add_modifier(Modifier::BOLD)
    }
}

fn fg(color: Color) -> Style {
    Style::default().fg(color)
}

/// Nudge an RGB color toward white. Indexed and ANSI colors pass through
/// unchanged.
fn lift(color: Color, amount: u8) -> Color {
    match color {
        Color::Rgb(r, g, b) => Color::Rgb(
            r.saturating_add(amount),
            g.saturating_add(amount),
            b.saturating_add(amount),
        ),
        other => other,
    }
}
