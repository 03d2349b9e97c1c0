//! Markdown assembly: extracted text followed by image references.

use std::path::{Path, PathBuf};

/// Inserted between the text and the first image reference.
pub const IMAGE_SEPARATOR: &str = "\n\n---\n\n";

/// Build the final document.
///
/// `text` is copied verbatim. When `images` is non-empty it is followed by
/// [`IMAGE_SEPARATOR`] and one `![Image n](…)` line per image, numbered from
/// 1 in slice order. Each link points at the image's file name under
/// `assets_dir`, so it stays relative to the Markdown file no matter where
/// the image was written.
pub fn assemble_markdown(text: &str, images: &[PathBuf], assets_dir: &Path) -> String {
    let mut md = String::with_capacity(text.len() + IMAGE_SEPARATOR.len() + images.len() * 40);
    md.push_str(text);

    if images.is_empty() {
        return md;
    }

    md.push_str(IMAGE_SEPARATOR);
    let prefix = link_prefix(assets_dir);
    for (i, image) in images.iter().enumerate() {
        let name = image
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| image.to_string_lossy());
        let target = format!("{prefix}/{name}");
        md.push_str(&format!("![Image {}]({})\n", i + 1, link_target(&target)));
    }

    md
}

/// The assets path as a Markdown link prefix: `/`-separated, no trailing slash.
fn link_prefix(assets_dir: &Path) -> String {
    let mut raw = assets_dir.to_string_lossy().into_owned();
    if cfg!(windows) {
        raw = raw.replace('\\', "/");
    }
    raw.trim_end_matches('/').to_string()
}

/// CommonMark link destinations may not contain spaces or unbalanced
/// parentheses unless wrapped in angle brackets.
fn link_target(target: &str) -> String {
    if target.contains(|c: char| c.is_whitespace() || c == '(' || c == ')') {
        format!("<{target}>")
    } else {
        target.to_string()
    }
}
