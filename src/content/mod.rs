//! Content transformation module
//!
//! Turns raw user input into the stored message text: sanitize first, then
//! rewrite media links.

pub mod media;
pub mod sanitize;

/// Sanitize `raw` and rewrite its media links
pub fn prepare(raw: &str) -> String {
    media::insert_media_tags(&sanitize::clean(raw))
}
