//! Output filename derivation.

use url::Url;

/// Default filename when the source yields nothing usable.
const DEFAULT_FILENAME: &str = "download.bin";

/// Linux NAME_MAX.
const NAME_MAX: usize = 255;

/// Last non-empty path segment of a URL (query and fragment excluded).
pub(super) fn last_url_segment(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.filter(|s| !s.is_empty()).last()?;
    Some(segment.to_string())
}

/// Sanitize a candidate, falling back to the default name.
pub(super) fn finish(raw: Option<String>) -> String {
    let Some(raw) = raw else {
        return DEFAULT_FILENAME.to_string();
    };
    let sanitized = sanitize_filename_for_linux(&raw);
    if sanitized.is_empty() || sanitized == "." || sanitized == ".." {
        DEFAULT_FILENAME.to_string()
    } else {
        sanitized
    }
}

/// Sanitizes a candidate filename for safe use on Linux.
///
/// Path separators, NUL, whitespace and control characters become `_`
/// (collapsed), leading/trailing dots and underscores are trimmed, and the
/// result is cut to NAME_MAX bytes on a char boundary.
pub fn sanitize_filename_for_linux(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_underscore = false;

    for c in name.chars() {
        let c = if c == '/' || c == '\\' || c.is_control() || c.is_whitespace() {
            '_'
        } else {
            c
        };
        if c == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(c);
            prev_underscore = false;
        }
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == '_');
    let mut take = trimmed.len().min(NAME_MAX);
    while !trimmed.is_char_boundary(take) {
        take -= 1;
    }
    trimmed[..take].to_string()
}
