#![forbid(unsafe_code)]

//! Boundary-safe text surgery for bulk tag rewrites.
//!
//! All ranges are byte offsets; [`splice`] refuses anything that is not a
//! `char` boundary instead of panicking mid-rewrite.

/// Replaces `start..end` of `text` with `replacement`. Returns the text
/// unchanged when the range is out of bounds or splits a multi-byte
/// character.
pub fn splice(text: &str, start: usize, end: usize, replacement: &str) -> String {
    if start > end
        || end > text.len()
        || !text.is_char_boundary(start)
        || !text.is_char_boundary(end)
    {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() - (end - start) + replacement.len());
    out.push_str(&text[..start]);
    out.push_str(replacement);
    out.push_str(&text[end..]);
    out
}

/// Deletes every literal occurrence of `key` plus any immediately trailing
/// run of spaces/tabs (newlines untouched), then collapses runs of multiple
/// spaces to one and trims outer spaces.
pub fn remove_tag_completely(content: &str, key: &str) -> String {
    if key.is_empty() {
        return content.to_string();
    }
    let mut out = content.to_string();
    while let Some(at) = out.find(key) {
        let mut end = at + key.len();
        while matches!(out.as_bytes().get(end), Some(b' ' | b'\t')) {
            end += 1;
        }
        out = splice(&out, at, end, "");
    }
    collapse_spaces(&out)
}

/// Replaces every literal occurrence of `key` with `key` minus its leading
/// `#`. Surrounding whitespace is untouched, so the bare word stays readable
/// in place.
pub fn strip_hash_marker(content: &str, key: &str) -> String {
    match key.strip_prefix('#') {
        Some(bare) if !bare.is_empty() => content.replace(key, bare),
        _ => content.to_string(),
    }
}

fn collapse_spaces(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_space = false;
    for ch in text.chars() {
        if ch == ' ' {
            if prev_space {
                continue;
            }
            prev_space = true;
        } else {
            prev_space = false;
        }
        out.push(ch);
    }
    out.trim_matches(' ').to_string()
}
