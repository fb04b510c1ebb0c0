// src/utils/html.rs

use std::collections::HashSet;

/// Clean HTML content using the ammonia library.
///
/// Question and answer content arrives from a rich-text editor, so it may
/// carry markup. Whitelist-based sanitization keeps safe tags (like <b>, <p>)
/// while stripping dangerous tags (like <script>, <iframe>) and malicious
/// attributes (like onclick). This serves as a fail-safe against Stored XSS
/// in the teacher dashboard and the student exam view.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

/// Strips all tags, keeping only text content. Used for plain-text blurbs
/// such as dashboard activity descriptions.
pub fn strip_tags(input: &str) -> String {
    ammonia::Builder::new()
        .tags(HashSet::new())
        .clean(input)
        .to_string()
}
