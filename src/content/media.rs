//! Media link rewriting
//!
//! Recognized image, video and audio links in sanitized text are rewritten
//! into embeddable markup. The passes run in a fixed order and each sees the
//! output of the previous one, so the result is not idempotent: an `.ogg`
//! link becomes a `<video>` source and is then wrapped again as `<audio>`.

use regex::Regex;
use std::sync::OnceLock;

struct MediaPass {
    pattern: Regex,
    replacement: &'static str,
}

/// (pattern, replacement) in application order
const PASSES: &[(&str, &str)] = &[
    // Image markdown written without the `(` between caption and URL.
    (
        r"((?:!\[.*\])https?://\S+\.(png|jpg|gif))",
        r#"<img src="${1}" alt="${1}" >"#,
    ),
    // Image markdown: ![caption](url)
    (
        r"!\[(.*)\]\((https?://\S+\.(png|jpg|gif))\)",
        r#"<figure> <img src="${2}" alt="${2}"><figcaption> ${1} </figcaption></figure>"#,
    ),
    // Bare video links
    (
        r"(https?://\S+\.(mp4|webm|ogg))",
        r#"<video controls> <source src="${1}"> </video>"#,
    ),
    // Bare audio links
    (
        r"(https?://\S+\.(mp3|wav|ogg))",
        r#"<audio controls> <source src="${1}"> </audio>"#,
    ),
];

fn passes() -> &'static [MediaPass] {
    static COMPILED: OnceLock<Vec<MediaPass>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        PASSES
            .iter()
            .map(|(pattern, replacement)| MediaPass {
                pattern: Regex::new(pattern).expect("media pattern is a valid regex"),
                replacement,
            })
            .collect()
    })
}

/// Rewrite recognized media links in `content` into markup
pub fn insert_media_tags(content: &str) -> String {
    passes().iter().fold(content.to_string(), |text, pass| {
        pass.pattern.replace_all(&text, pass.replacement).into_owned()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_markdown_becomes_figure() {
        let out = insert_media_tags("look ![my cat](http://x.com/a.png) here");
        assert_eq!(
            out,
            r#"look <figure> <img src="http://x.com/a.png" alt="http://x.com/a.png"><figcaption> my cat </figcaption></figure> here"#
        );
    }

    #[test]
    fn test_image_markdown_https_jpg() {
        let out = insert_media_tags("![x](https://cdn.example.com/p/1.jpg)");
        assert!(out.contains(r#"<img src="https://cdn.example.com/p/1.jpg""#));
        assert!(out.contains("<figcaption> x </figcaption>"));
    }

    #[test]
    fn test_image_without_paren_uses_first_pass() {
        let out = insert_media_tags("![cap]http://x.com/a.gif");
        assert_eq!(
            out,
            r#"<img src="![cap]http://x.com/a.gif" alt="![cap]http://x.com/a.gif" >"#
        );
    }

    #[test]
    fn test_bare_video_link() {
        let out = insert_media_tags("watch http://x.com/v.mp4 now");
        assert_eq!(
            out,
            r#"watch <video controls> <source src="http://x.com/v.mp4"> </video> now"#
        );
    }

    #[test]
    fn test_bare_audio_link() {
        let out = insert_media_tags("https://x.com/song.mp3");
        assert_eq!(
            out,
            r#"<audio controls> <source src="https://x.com/song.mp3"> </audio>"#
        );
    }

    #[test]
    fn test_ogg_wrapped_twice() {
        let out = insert_media_tags("http://x.com/a.ogg");
        assert!(out.starts_with("<video controls>"));
        assert!(out.contains(r#"<audio controls> <source src="http://x.com/a.ogg"> </audio>"#));
    }

    #[test]
    fn test_multiple_links() {
        let out = insert_media_tags("http://x.com/a.webm and http://x.com/b.wav");
        assert!(out.contains(r#"<video controls> <source src="http://x.com/a.webm"> </video>"#));
        assert!(out.contains(r#"<audio controls> <source src="http://x.com/b.wav"> </audio>"#));
    }

    #[test]
    fn test_unrecognized_links_untouched() {
        let text = "see http://x.com/page.html or ftp://x.com/a.mp4";
        assert_eq!(insert_media_tags(text), text);
    }
}
