//! Image loading and caching for terminal display.
//!
//! Post images and avatars arrive either as HTTP(S) URLs or as
//! `data:image/...;base64,` URIs (Plaza stores uploads inline). Both are
//! decoded off the event loop and rendered with whatever graphics protocol
//! the terminal supports (Sixel, Kitty, iTerm2), falling back to Unicode
//! halfblocks.

mod cache;
mod loader;

pub use cache::ImageCache;
pub use loader::{ImageLoader, LoadResult};

use ratatui_image::picker::{Picker, ProtocolType};
use std::sync::OnceLock;

static PICKER: OnceLock<Picker> = OnceLock::new();

/// Query the terminal for its graphics protocol.
///
/// Must run once at startup, before raw mode takes over stdio. Terminals
/// without a native protocol fall back to Unicode halfblocks.
pub fn init_picker() {
    let picker = PICKER.get_or_init(|| {
        Picker::from_query_stdio().unwrap_or_else(|e| {
            tracing::debug!("terminal graphics query failed: {e}");
            Picker::halfblocks()
        })
    });
    match picker.protocol_type() {
        ProtocolType::Halfblocks => tracing::debug!("rendering images as halfblocks"),
        protocol => tracing::info!("image protocol detected: {protocol:?}"),
    }
}

/// The picker, if [`init_picker`] has run.
pub fn picker() -> Option<&'static Picker> {
    PICKER.get()
}
