//! UI rendering for the TUI

use std::sync::OnceLock;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, Paragraph, Wrap},
};
use ratatui_image::StatefulImage;
use regex_lite::Regex;
use unicode_width::UnicodeWidthStr;

use super::state::{AppState, ComposeField, EditField, LoginField, Mode, Screen};
use crate::models::Post;
use crate::theme::ThemeColors;

/// Parlor icon
const ICON: &str = "💬";

/// Main render function
pub fn render(frame: &mut Frame, state: &mut AppState) {
    let colors = state.theme.colors();

    // Set background
    let area = frame.area();
    let bg_block = Block::default().style(Style::default().bg(colors.bg));
    frame.render_widget(bg_block, area);

    match state.screen {
        Screen::Login => render_login(frame, state, area),
        Screen::Feed | Screen::Profile => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3), // Header
                    Constraint::Min(0),    // Main content
                    Constraint::Length(1), // Status bar
                ])
                .split(area);

            render_header(frame, state, chunks[0]);
            if state.screen == Screen::Feed {
                render_feed(frame, state, chunks[1]);
            } else {
                render_profile(frame, state, chunks[1]);
            }
            render_status_bar(frame, state, chunks[2]);
        }
    }

    // Render modal dialogs
    match state.mode {
        Mode::Help => render_help_popup(frame, state),
        Mode::Compose => render_compose_popup(frame, state),
        Mode::EditProfile => render_edit_profile_popup(frame, state),
        Mode::Search => render_search_popup(frame, state),
        Mode::ConfirmDeletePost => render_confirm_delete_post(frame, state),
        Mode::ConfirmDeleteAccount => render_confirm_delete_account(frame, state),
        Mode::Alert => render_alert_popup(frame, state),
        Mode::Normal => {}
    }
}

fn render_header(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.colors();

    let user = state
        .session
        .as_ref()
        .map(|s| format!("@{}", s.username))
        .unwrap_or_default();

    let header = Paragraph::new(Line::from(vec![
        Span::styled(format!(" {user}"), colors.text_primary()),
        Span::styled(
            format!("  ·  {}", state.config.server_base()),
            colors.text_muted(),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(colors.block())
            .title(format!(" {ICON} Parlor "))
            .title_style(colors.logo()),
    );

    frame.render_widget(header, area);
}

fn render_login(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.colors();

    let popup_area = centered_rect(60, 80, area);
    let outer = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(colors.block_focus())
        .title(" Log in ")
        .title_style(colors.text_primary());
    let inner = outer.inner(popup_area);
    frame.render_widget(outer, popup_area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8), // Logo and server
            Constraint::Length(3), // Username
            Constraint::Length(3), // Password
            Constraint::Length(2), // Error or progress
            Constraint::Length(1), // Hints
            Constraint::Min(0),
        ])
        .split(inner);

    let mut banner: Vec<Line> = crate::LOGO
        .lines()
        .skip(1)
        .map(|line| Line::styled(line.to_string(), colors.logo()))
        .collect();
    banner.push(Line::from(""));
    banner.push(Line::from(vec![
        Span::styled("Server: ", colors.text_muted()),
        Span::styled(state.config.server_base().to_string(), colors.text()),
    ]));
    frame.render_widget(Paragraph::new(banner).alignment(Alignment::Center), rows[0]);

    render_input_field(
        frame,
        &colors,
        rows[1],
        " Username ",
        &state.login_form.username,
        state.login_form.focus == LoginField::Username,
        false,
        false,
    );
    render_input_field(
        frame,
        &colors,
        rows[2],
        " Password ",
        &state.login_form.password,
        state.login_form.focus == LoginField::Password,
        false,
        true,
    );

    let feedback = if state.login_form.submitting {
        Line::from(vec![Span::styled("Logging in...", colors.text_muted())])
    } else if let Some(error) = &state.login_form.error {
        Line::from(vec![Span::styled(format!("✗ {error}"), colors.text_error())])
    } else {
        Line::from("")
    };
    frame.render_widget(Paragraph::new(feedback).alignment(Alignment::Center), rows[3]);

    let hints = Line::from(vec![
        Span::styled("Tab", colors.key_hint()),
        Span::styled(" field  ", colors.text_dim()),
        Span::styled("Enter", colors.key_hint()),
        Span::styled(" log in  ", colors.text_dim()),
        Span::styled("Esc", colors.key_hint()),
        Span::styled(" quit", colors.text_dim()),
    ]);
    frame.render_widget(
        Paragraph::new(hints).alignment(Alignment::Center),
        rows[4],
    );
}

fn render_feed(frame: &mut Frame, state: &mut AppState, area: Rect) {
    let colors = state.theme.colors();

    // Layout: [List 40%] [Detail 60%]
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let list_block = Block::default()
        .title(state.feed_title())
        .title_style(colors.text_primary())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(colors.block_focus());

    let items = if state.loading && state.posts.is_empty() {
        loading_items(&colors)
    } else if state.posts.is_empty() {
        let message = if state.active_search.is_some() {
            "No posts match your search"
        } else {
            "No posts yet"
        };
        empty_items(&colors, message)
    } else {
        post_list_items(
            &colors,
            &state.posts,
            state.selected_post,
            horizontal[0].width,
        )
    };

    let list = List::new(items)
        .block(list_block)
        .highlight_style(colors.selected());
    let mut list_state = ratatui::widgets::ListState::default();
    list_state.select(Some(state.selected_post));
    frame.render_stateful_widget(list, horizontal[0], &mut list_state);

    if let Some(post) = state.selected_post().cloned() {
        render_post_detail(frame, state, &post, horizontal[1]);
    } else {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::styled("  Select a post", colors.text_muted()),
        ])
        .block(post_detail_block(&colors));
        frame.render_widget(empty, horizontal[1]);
    }
}

fn render_profile(frame: &mut Frame, state: &mut AppState, area: Rect) {
    let colors = state.theme.colors();

    if state.profile_not_found {
        let username = state.profile_username.clone().unwrap_or_default();
        let message = Paragraph::new(vec![
            Line::from(""),
            Line::from(""),
            Line::from(Span::styled(
                format!("User @{username} was not found"),
                colors.text_warning(),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("Press ", colors.text_dim()),
                Span::styled("Esc", colors.key_hint()),
                Span::styled(" to go back", colors.text_dim()),
            ]),
        ])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(colors.block())
                .title(" Profile ")
                .title_style(colors.text_primary()),
        );
        frame.render_widget(message, area);
        return;
    }

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(10), Constraint::Min(0)])
        .split(area);

    render_profile_card(frame, state, vertical[0]);

    // Posts: same split as the feed
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(vertical[1]);

    let list_block = Block::default()
        .title(" Posts ")
        .title_style(colors.text_primary())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(colors.block_focus());

    let items = if state.loading && state.profile_posts.is_empty() {
        loading_items(&colors)
    } else if state.profile_posts.is_empty() {
        empty_items(&colors, "No posts yet")
    } else {
        post_list_items(
            &colors,
            &state.profile_posts,
            state.selected_profile_post,
            horizontal[0].width,
        )
    };

    let list = List::new(items)
        .block(list_block)
        .highlight_style(colors.selected());
    let mut list_state = ratatui::widgets::ListState::default();
    list_state.select(Some(state.selected_profile_post));
    frame.render_stateful_widget(list, horizontal[0], &mut list_state);

    if let Some(post) = state.selected_profile_post().cloned() {
        render_post_detail(frame, state, &post, horizontal[1]);
    } else {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::styled("  Select a post", colors.text_muted()),
        ])
        .block(post_detail_block(&colors));
        frame.render_widget(empty, horizontal[1]);
    }
}

fn render_profile_card(frame: &mut Frame, state: &mut AppState, area: Rect) {
    let colors = state.theme.colors();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(colors.block())
        .title(" Profile ")
        .title_style(colors.text_primary());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(profile) = state.profile.clone() else {
        let loading = Paragraph::new(vec![
            Line::from(""),
            Line::styled("  ⏳ Loading profile...", colors.text_muted()),
        ]);
        frame.render_widget(loading, inner);
        return;
    };

    // Avatar strip on the left once the image is decoded
    let avatar_ref = profile
        .avatar
        .as_ref()
        .filter(|r| state.image_cache.contains(r))
        .cloned();

    let (avatar_area, info_area) = if avatar_ref.is_some() {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(18), Constraint::Min(0)])
            .split(inner);
        (Some(columns[0]), columns[1])
    } else {
        (None, inner)
    };

    let is_own = state.viewing_own_profile();
    let info_width = info_area.width.saturating_sub(2) as usize;

    let mut name_spans = vec![
        Span::styled(" ", Style::default()),
        Span::styled(
            profile.display_name().to_string(),
            colors.text_primary().add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" {}", profile.handle()), colors.text_muted()),
    ];
    if is_own {
        name_spans.push(Span::styled(" (you)", colors.text_dim()));
    } else if profile.followed_by_me {
        name_spans.push(Span::styled(" ✓ Following", colors.text_success()));
    }

    let mut lines = vec![Line::from(name_spans)];

    if let Some(bio) = profile.biography.as_deref().filter(|b| !b.trim().is_empty()) {
        lines.push(Line::from(""));
        for wrapped in textwrap::wrap(bio, info_width.max(10)) {
            lines.push(Line::from(vec![
                Span::styled(" ", Style::default()),
                Span::styled(wrapped.to_string(), colors.text()),
            ]));
        }
    }

    let mut meta = Vec::new();
    if let Some(location) = profile.location.as_deref().filter(|l| !l.is_empty()) {
        meta.push(format!("📍 {location}"));
    }
    if let Some(birth_date) = profile.birth_date.as_deref().filter(|b| !b.is_empty()) {
        meta.push(format!("🎂 {birth_date}"));
    }
    if let Some(gender) = profile.gender.as_deref().filter(|g| !g.is_empty()) {
        meta.push(gender.to_string());
    }
    if is_own && !profile.email.is_empty() {
        meta.push(format!("📧 {}", profile.email));
    }
    if !meta.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled(" ", Style::default()),
            Span::styled(meta.join("  ·  "), colors.text_dim()),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(" ", Style::default()),
        Span::styled(format!("{}", profile.posts_count), colors.text_primary()),
        Span::styled(" posts  ·  ", colors.text_muted()),
        Span::styled(format!("{}", profile.followers_count), colors.text_primary()),
        Span::styled(" followers  ·  ", colors.text_muted()),
        Span::styled(format!("{}", profile.following_count), colors.text_primary()),
        Span::styled(" following", colors.text_muted()),
    ]));

    lines.push(Line::from(""));
    let hint_spans = if is_own {
        vec![
            Span::styled(" ", Style::default()),
            Span::styled("[e]", colors.key_hint()),
            Span::styled(" edit  ", colors.text_dim()),
            Span::styled("[o]", colors.key_hint()),
            Span::styled(" log out  ", colors.text_dim()),
            Span::styled("[x]", colors.key_hint()),
            Span::styled(" delete account", colors.text_dim()),
        ]
    } else {
        vec![
            Span::styled(" ", Style::default()),
            Span::styled("[f]", colors.key_hint()),
            Span::styled(
                if profile.followed_by_me {
                    " unfollow"
                } else {
                    " follow"
                },
                colors.text_dim(),
            ),
        ]
    };
    lines.push(Line::from(hint_spans));

    frame.render_widget(Paragraph::new(lines), info_area);

    if let (Some(reference), Some(img_area)) = (avatar_ref, avatar_area) {
        let padded = Rect {
            x: img_area.x + 1,
            y: img_area.y,
            width: img_area.width.saturating_sub(2),
            height: img_area.height,
        };
        if let Some(protocol) = state.image_protocol(&reference) {
            frame.render_stateful_widget(StatefulImage::new(), padded, protocol);
        }
    }
}

fn render_post_detail(frame: &mut Frame, state: &mut AppState, post: &Post, area: Rect) {
    let colors = state.theme.colors();
    let text_width = area.width.saturating_sub(4) as usize;

    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  ", Style::default()),
            Span::styled(
                post.author.display_name.clone(),
                colors.text_primary().add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!(" {}", post.author.handle()), colors.text_muted()),
        ]),
        Line::from(vec![Span::styled(
            format!("  {}", post.relative_time()),
            colors.text_muted(),
        )]),
        Line::from(""),
    ];

    lines.extend(content_lines(&colors, &post.content, text_width));

    if let Some(location) = &post.location {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("  📍 ", Style::default()),
            Span::styled(location.clone(), colors.text_dim()),
        ]));
    }

    if let Some(reference) = &post.image_url {
        let status = if state.image_cache.contains(reference) {
            ""
        } else if state.loading_images.contains(reference) {
            " ⏳"
        } else {
            " ✗"
        };
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("  ", Style::default()),
            Span::styled(format!("[🖼 Image{status}]"), colors.text_secondary()),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from("  ─────────────────────────────────"));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("  ", Style::default()),
        Span::styled(
            format!(
                "{} {}",
                if post.liked_by_me { "♥" } else { "♡" },
                post.like_count
            ),
            if post.liked_by_me {
                colors.text_error()
            } else {
                colors.text_muted()
            },
        ),
        Span::styled("   ", Style::default()),
        Span::styled(format!("💬 {}", post.comment_count), colors.text_muted()),
    ]));

    // Split off an image strip only once the image is decoded
    let image_ref = post
        .image_url
        .as_ref()
        .filter(|r| state.image_cache.contains(r))
        .cloned();

    let (text_area, image_area) = if image_ref.is_some() {
        let areas = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(10), Constraint::Length(12)])
            .split(area);
        (areas[0], Some(areas[1]))
    } else {
        (area, None)
    };

    let detail = Paragraph::new(lines)
        .block(post_detail_block(&colors))
        .wrap(Wrap { trim: false });
    frame.render_widget(detail, text_area);

    if let (Some(reference), Some(img_area)) = (image_ref, image_area) {
        let padded = Rect {
            x: img_area.x + 2,
            y: img_area.y,
            width: img_area.width.saturating_sub(4),
            height: img_area.height,
        };
        if let Some(protocol) = state.image_protocol(&reference) {
            frame.render_stateful_widget(StatefulImage::new(), padded, protocol);
        }
    }
}

fn post_detail_block(colors: &ThemeColors) -> Block<'static> {
    Block::default()
        .title(" Post ")
        .title_style(colors.text_primary())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(colors.block())
}

fn loading_items(colors: &ThemeColors) -> Vec<ListItem<'static>> {
    vec![ListItem::new(Line::from(vec![
        Span::styled("  ", Style::default()),
        Span::styled("⏳ Loading...", colors.text_muted()),
    ]))]
}

fn empty_items(colors: &ThemeColors, message: &str) -> Vec<ListItem<'static>> {
    vec![
        ListItem::new(Line::from("")),
        ListItem::new(Line::from(vec![
            Span::styled("  ℹ ", colors.text_info()),
            Span::styled(message.to_string(), colors.text_muted()),
        ])),
        ListItem::new(Line::from("")),
        ListItem::new(Line::from(vec![
            Span::styled("  Press ", colors.text_dim()),
            Span::styled("[r]", colors.key_hint()),
            Span::styled(" to refresh", colors.text_dim()),
        ])),
    ]
}

fn post_list_items(
    colors: &ThemeColors,
    posts: &[Post],
    selected: usize,
    panel_width: u16,
) -> Vec<ListItem<'static>> {
    let width = panel_width.saturating_sub(3) as usize;

    posts
        .iter()
        .enumerate()
        .map(|(i, post)| {
            let is_selected = i == selected;
            let base_style = if is_selected {
                colors.selected()
            } else {
                Style::default()
            };

            let mut indicators = String::new();
            if post.liked_by_me {
                indicators.push_str(" ♥");
            }
            if post.image_url.is_some() {
                indicators.push_str(" 🖼");
            }

            let author_text = format!(
                " {} {} · {}{}",
                post.author.display_name,
                post.author.handle(),
                post.relative_time(),
                indicators
            );
            let author_padded = format!("{author_text:<width$}");

            let preview_text = format!("   {}", post.preview(width.saturating_sub(4)));
            let preview_padded = format!("{preview_text:<width$}");
            let spacer = format!("{:<width$}", "");

            ListItem::new(vec![
                Line::styled(author_padded, base_style.patch(colors.text_primary())),
                Line::styled(preview_padded, base_style.patch(colors.text())),
                Line::styled(spacer, Style::default()),
            ])
        })
        .collect()
}

/// Body text wrapped to the panel width, with hashtags picked out
fn content_lines(colors: &ThemeColors, content: &str, width: usize) -> Vec<Line<'static>> {
    let width = width.max(10);
    let mut lines = Vec::new();

    for raw in content.lines() {
        if raw.is_empty() {
            lines.push(Line::from(""));
            continue;
        }
        for wrapped in textwrap::wrap(raw, width) {
            let mut spans = vec![Span::styled("  ", Style::default())];
            spans.extend(hashtag_spans(colors, &wrapped));
            lines.push(Line::from(spans));
        }
    }

    if lines.is_empty() {
        lines.push(Line::from(""));
    }
    lines
}

fn hashtag_regex() -> &'static Regex {
    static HASHTAG: OnceLock<Regex> = OnceLock::new();
    HASHTAG.get_or_init(|| Regex::new(r"#\w+").expect("hashtag pattern is valid"))
}

fn hashtag_spans(colors: &ThemeColors, text: &str) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let mut last = 0;

    for m in hashtag_regex().find_iter(text) {
        if m.start() > last {
            spans.push(Span::styled(
                text[last..m.start()].to_string(),
                colors.text(),
            ));
        }
        spans.push(Span::styled(m.as_str().to_string(), colors.text_primary()));
        last = m.end();
    }
    if last < text.len() {
        spans.push(Span::styled(text[last..].to_string(), colors.text()));
    }
    if spans.is_empty() {
        spans.push(Span::styled(text.to_string(), colors.text()));
    }
    spans
}

fn render_status_bar(frame: &mut Frame, state: &AppState, area: Rect) {
    let colors = state.theme.colors();

    // Spinner animation frames
    const SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

    let loading_indicator = if state.loading {
        let frame_idx = (state.current_tick() / 2) as usize % SPINNER.len();
        format!("{} ", SPINNER[frame_idx])
    } else {
        String::new()
    };

    let content = if !state.status.is_empty() {
        vec![
            Span::styled(" ", Style::default()),
            Span::styled(loading_indicator, colors.text_secondary()),
            Span::styled(&state.status, colors.text_secondary()),
        ]
    } else {
        let mut spans = vec![
            Span::styled(" ", Style::default()),
            Span::styled(loading_indicator, colors.text_secondary()),
        ];
        let hints: &[(&str, &str)] = match state.screen {
            Screen::Feed => &[
                ("j/k", "navigate"),
                ("r", "refresh"),
                ("n", "new post"),
                ("l", "like"),
                ("/", "search"),
                ("p", "profile"),
                ("?", "help"),
                ("q", "quit"),
            ],
            Screen::Profile => &[
                ("j/k", "navigate"),
                ("r", "refresh"),
                ("f", "follow"),
                ("Esc", "back"),
                ("?", "help"),
                ("q", "quit"),
            ],
            Screen::Login => &[],
        };
        for (key, action) in hints {
            spans.push(Span::styled(*key, colors.key_hint()));
            spans.push(Span::styled(format!(": {action}  "), colors.text_muted()));
        }
        spans
    };

    let status =
        Paragraph::new(Line::from(content)).style(Style::default().bg(colors.bg_secondary));
    frame.render_widget(status, area);
}

fn render_compose_popup(frame: &mut Frame, state: &AppState) {
    let colors = state.theme.colors();
    let area = frame.area();

    let popup_area = centered_rect(60, 60, area);
    let bg_block = Block::default().style(Style::default().bg(colors.bg));
    frame.render_widget(Clear, popup_area);
    frame.render_widget(bg_block, popup_area);

    let outer = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(colors.block_focus())
        .style(Style::default().bg(colors.bg))
        .title(" 📝 New Post ")
        .title_style(colors.text_primary());
    let inner = outer.inner(popup_area);
    frame.render_widget(outer, popup_area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),    // Text
            Constraint::Length(3), // Location
            Constraint::Length(3), // Image path
            Constraint::Length(1), // Hints
        ])
        .split(inner);

    render_input_field(
        frame,
        &colors,
        rows[0],
        " Text ",
        &state.compose.content,
        state.compose.focus == ComposeField::Content,
        true,
        false,
    );
    render_input_field(
        frame,
        &colors,
        rows[1],
        " Location (optional) ",
        &state.compose.location,
        state.compose.focus == ComposeField::Location,
        false,
        false,
    );
    render_input_field(
        frame,
        &colors,
        rows[2],
        " Image path (optional) ",
        &state.compose.image_path,
        state.compose.focus == ComposeField::ImagePath,
        false,
        false,
    );

    let hints = Line::from(vec![
        Span::styled(" ", Style::default()),
        Span::styled("Tab", colors.key_hint()),
        Span::styled(" field  ", colors.text_dim()),
        Span::styled("Ctrl+S", colors.key_hint()),
        Span::styled(" post  ", colors.text_dim()),
        Span::styled("Esc", colors.key_hint()),
        Span::styled(" cancel", colors.text_dim()),
    ]);
    frame.render_widget(Paragraph::new(hints), rows[3]);
}

fn render_edit_profile_popup(frame: &mut Frame, state: &AppState) {
    let colors = state.theme.colors();
    let area = frame.area();

    let popup_area = centered_rect(60, 70, area);
    let bg_block = Block::default().style(Style::default().bg(colors.bg));
    frame.render_widget(Clear, popup_area);
    frame.render_widget(bg_block, popup_area);

    let outer = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(colors.block_focus())
        .style(Style::default().bg(colors.bg))
        .title(" ✏ Edit Profile ")
        .title_style(colors.text_primary());
    let inner = outer.inner(popup_area);
    frame.render_widget(outer, popup_area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Name
            Constraint::Min(4),    // Biography
            Constraint::Length(3), // Location
            Constraint::Length(3), // Avatar path
            Constraint::Length(1), // Hints
        ])
        .split(inner);

    render_input_field(
        frame,
        &colors,
        rows[0],
        " Name ",
        &state.edit_profile.name,
        state.edit_profile.focus == EditField::Name,
        false,
        false,
    );
    render_input_field(
        frame,
        &colors,
        rows[1],
        " Biography ",
        &state.edit_profile.biography,
        state.edit_profile.focus == EditField::Biography,
        true,
        false,
    );
    render_input_field(
        frame,
        &colors,
        rows[2],
        " Location ",
        &state.edit_profile.location,
        state.edit_profile.focus == EditField::Location,
        false,
        false,
    );
    render_input_field(
        frame,
        &colors,
        rows[3],
        " Avatar path ",
        &state.edit_profile.avatar_path,
        state.edit_profile.focus == EditField::AvatarPath,
        false,
        false,
    );

    let hints = Line::from(vec![
        Span::styled(" ", Style::default()),
        Span::styled("Tab", colors.key_hint()),
        Span::styled(" field  ", colors.text_dim()),
        Span::styled("Ctrl+S", colors.key_hint()),
        Span::styled(" save  ", colors.text_dim()),
        Span::styled("Esc", colors.key_hint()),
        Span::styled(" cancel", colors.text_dim()),
    ]);
    frame.render_widget(Paragraph::new(hints), rows[4]);
}

/// One bordered input; multiline fields render every line and put the
/// cursor after the last one
#[allow(clippy::too_many_arguments)]
fn render_input_field(
    frame: &mut Frame,
    colors: &ThemeColors,
    area: Rect,
    title: &str,
    value: &str,
    focused: bool,
    multiline: bool,
    mask: bool,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(if focused {
            colors.block_focus()
        } else {
            colors.block()
        })
        .title(title.to_string())
        .title_style(if focused {
            colors.text_primary()
        } else {
            colors.text_muted()
        });
    let inner = block.inner(area);

    let shown: String = if mask {
        "•".repeat(value.chars().count())
    } else {
        value.to_string()
    };

    let lines: Vec<Line> = if multiline {
        shown
            .split('\n')
            .map(|l| Line::styled(l.to_string(), colors.text()))
            .collect()
    } else {
        vec![Line::styled(shown.clone(), colors.text())]
    };

    frame.render_widget(Paragraph::new(lines).block(block), area);

    if focused {
        let last = shown.split('\n').next_back().unwrap_or("");
        let line_count = shown.split('\n').count() as u16;
        let x = inner.x + last.width() as u16;
        let y = inner.y + line_count.saturating_sub(1);
        if x < inner.x + inner.width && y < inner.y + inner.height {
            frame.set_cursor_position((x, y));
        }
    }
}

fn render_search_popup(frame: &mut Frame, state: &AppState) {
    let colors = state.theme.colors();
    let area = frame.area();

    let popup_area = centered_rect(50, 20, area);
    frame.render_widget(Clear, popup_area);

    let content = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  ", Style::default()),
            Span::styled("#", colors.text_muted()),
            Span::styled(
                if state.search_input.is_empty() {
                    "type a hashtag..."
                } else {
                    &state.search_input
                },
                if state.search_input.is_empty() {
                    colors.text_muted()
                } else {
                    colors.text()
                },
            ),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  ", Style::default()),
            Span::styled("Enter", colors.key_hint()),
            Span::styled(" search (blank clears)  ", colors.text_muted()),
            Span::styled("Esc", colors.key_hint()),
            Span::styled(" cancel", colors.text_muted()),
        ]),
    ];

    let search = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(colors.block_focus())
            .style(Style::default().bg(colors.bg))
            .title(" 🔍 Hashtag Search ")
            .title_style(colors.text_primary()),
    );
    frame.render_widget(search, popup_area);

    let cursor_x = popup_area.x + 4 + state.search_input.width() as u16;
    let cursor_y = popup_area.y + 2;
    if cursor_x < popup_area.x + popup_area.width.saturating_sub(1) {
        frame.set_cursor_position((cursor_x, cursor_y));
    }
}

fn render_confirm_delete_post(frame: &mut Frame, state: &AppState) {
    let colors = state.theme.colors();

    render_confirm_dialog(
        frame,
        &colors,
        " Delete Post ",
        vec![
            Line::from(""),
            Line::from(Span::styled("Delete this post?", colors.text())),
            Line::from(""),
            Line::from(Span::styled("This cannot be undone", colors.text_muted())),
        ],
        colors.warning,
    );
}

fn render_confirm_delete_account(frame: &mut Frame, state: &AppState) {
    let colors = state.theme.colors();

    render_confirm_dialog(
        frame,
        &colors,
        " Delete Account ",
        vec![
            Line::from(""),
            Line::from(Span::styled("Delete your account?", colors.text())),
            Line::from(""),
            Line::from(Span::styled(
                "All of your posts will be removed",
                colors.text_warning(),
            )),
            Line::from(Span::styled("This cannot be undone", colors.text_muted())),
        ],
        colors.error,
    );
}

fn render_confirm_dialog(
    frame: &mut Frame,
    colors: &ThemeColors,
    title: &str,
    mut lines: Vec<Line<'static>>,
    border: ratatui::style::Color,
) {
    let area = frame.area();
    let popup_width = 46u16.min(area.width);
    let popup_height = (lines.len() as u16 + 4).min(area.height);
    let popup_area = Rect {
        x: area.x + area.width.saturating_sub(popup_width) / 2,
        y: area.y + area.height.saturating_sub(popup_height) / 2,
        width: popup_width,
        height: popup_height,
    };

    frame.render_widget(Clear, popup_area);

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(
            " [y] ",
            Style::default().fg(colors.success).add_modifier(Modifier::BOLD),
        ),
        Span::styled("Yes", colors.text()),
        Span::styled("    ", Style::default()),
        Span::styled(" [n/Esc] ", colors.text_muted()),
        Span::styled("Cancel", colors.text()),
    ]));

    let dialog = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(colors.bg))
            .title(title.to_string())
            .title_style(Style::default().fg(border).add_modifier(Modifier::BOLD)),
    );
    frame.render_widget(dialog, popup_area);
}

fn render_alert_popup(frame: &mut Frame, state: &AppState) {
    let colors = state.theme.colors();
    let area = frame.area();

    let popup_area = centered_rect(50, 30, area);
    let bg_block = Block::default().style(Style::default().bg(colors.bg));
    frame.render_widget(Clear, popup_area);
    frame.render_widget(bg_block, popup_area);

    let message = state.alert.clone().unwrap_or_default();
    let width = popup_area.width.saturating_sub(6) as usize;

    let mut lines = vec![Line::from("")];
    for wrapped in textwrap::wrap(&message, width.max(10)) {
        lines.push(Line::from(Span::styled(
            wrapped.to_string(),
            colors.text(),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Press any key to continue",
        colors.text_muted(),
    )));

    let alert = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(colors.error))
            .style(Style::default().bg(colors.bg))
            .title(" ⚠ Error ")
            .title_style(Style::default().fg(colors.error).add_modifier(Modifier::BOLD)),
    );
    frame.render_widget(alert, popup_area);
}

fn render_help_popup(frame: &mut Frame, state: &AppState) {
    let colors = state.theme.colors();
    let area = frame.area();

    let popup_area = centered_rect(50, 80, area);

    let bg_block = Block::default().style(Style::default().bg(colors.bg_secondary));
    frame.render_widget(Clear, popup_area);
    frame.render_widget(bg_block, popup_area);

    let section = |title: &'static str| {
        Line::from(vec![Span::styled(
            format!("  {title}"),
            colors.text_primary().add_modifier(Modifier::BOLD),
        )])
    };
    let entry = |key: &'static str, action: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {key:<16} "), colors.key_hint()),
            Span::styled(action, colors.text()),
        ])
    };

    let help_content = vec![
        Line::from(""),
        section("Navigation"),
        entry("j/k or ↑/↓", "Move through posts"),
        entry("g/G", "Go to first/last post"),
        Line::from(""),
        section("Feed"),
        entry("r", "Refresh"),
        entry("n", "Compose new post"),
        entry("l", "Like/unlike post"),
        entry("d", "Delete own post"),
        entry("/", "Hashtag search"),
        entry("Esc", "Clear hashtag filter"),
        entry("p", "Open author's profile"),
        entry("P", "Open your profile"),
        Line::from(""),
        section("Profile"),
        entry("f", "Follow/unfollow"),
        entry("e", "Edit profile (yours)"),
        entry("o", "Log out (yours)"),
        entry("x", "Delete account (yours)"),
        entry("b or Esc", "Back to feed"),
        Line::from(""),
        section("Compose / Edit"),
        entry("Tab", "Next field"),
        entry("Enter", "Newline in text / next field"),
        entry("Ctrl+S", "Submit"),
        entry("Esc", "Cancel"),
        Line::from(""),
        section("General"),
        entry("t", "Cycle theme"),
        entry("?", "Toggle this help"),
        entry("q", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", colors.text_muted()),
            Span::styled("Esc", colors.key_hint()),
            Span::styled(" or ", colors.text_muted()),
            Span::styled("?", colors.key_hint()),
            Span::styled(" to close", colors.text_muted()),
        ]),
    ];

    let help = Paragraph::new(help_content)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(colors.block_focus())
                .style(Style::default().bg(colors.bg_secondary))
                .title(" ⌨ Keyboard Shortcuts ")
                .title_style(colors.text_primary()),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(help, popup_area);
}

/// Helper function to create a centered rect
const fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_width = r.width * percent_x / 100;
    let popup_height = r.height * percent_y / 100;
    Rect {
        x: r.x + (r.width.saturating_sub(popup_width)) / 2,
        y: r.y + (r.height.saturating_sub(popup_height)) / 2,
        width: popup_width,
        height: popup_height,
    }
}
