#![forbid(unsafe_code)]

//! Hashtag grammar over task text.
//!
//! A candidate token is `#`, then 1..=20 non-whitespace characters, then one
//! whitespace character that is not a newline. A hashtag at end-of-line or
//! end-of-text is not a token. Matching is left-to-right and non-overlapping:
//! once a token is consumed, scanning resumes after its trailing whitespace.
//!
//! Offsets are byte offsets into the original text and always land on `char`
//! boundaries, so multi-byte content (emoji, CJK) never desynchronizes a
//! token range from the text it came from.

pub const MAX_TAG_CHARS: usize = 20;

/// One literal hashtag match. `text` is the `#`-prefixed run with the
/// trailing whitespace trimmed; `start..end` is its byte range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagToken {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// Extracts every hashtag token in order, duplicates preserved. Pure and
/// deterministic; callers that need the first literal match (display,
/// selection) use this directly, the indexer works from [`unique_keys`].
pub fn extract(content: &str) -> Vec<TagToken> {
    let mut tokens = Vec::new();
    let mut pos = 0usize;
    while let Some(found) = content[pos..].find('#') {
        let start = pos + found;
        let after_hash = start + 1;
        let mut end = after_hash;
        let mut run_chars = 0usize;
        let mut terminator: Option<char> = None;
        for ch in content[after_hash..].chars() {
            if ch.is_whitespace() {
                terminator = Some(ch);
                break;
            }
            run_chars += 1;
            end += ch.len_utf8();
            if run_chars > MAX_TAG_CHARS {
                break;
            }
        }
        match terminator {
            Some(ws) if ws != '\n' && (1..=MAX_TAG_CHARS).contains(&run_chars) => {
                tokens.push(TagToken {
                    text: content[start..end].to_string(),
                    start,
                    end,
                });
                pos = end + ws.len_utf8();
            }
            _ => pos = after_hash,
        }
    }
    tokens
}

/// Distinct tag keys in first-occurrence order. This is the set the
/// incremental indexer diffs against stored relations.
pub fn unique_keys(content: &str) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for token in extract(content) {
        if !keys.iter().any(|key| key == &token.text) {
            keys.push(token.text);
        }
    }
    keys
}
