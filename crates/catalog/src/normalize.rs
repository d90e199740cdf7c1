use std::borrow::Cow;

use crate::config::ShareLayout;

pub const ALBUMS_ANCHOR: &str = "Albums";

// Minimum lowercase run before an uppercase letter is read as a lost separator, so names like
// "McCartney" or "DeVito" stay intact.
const MIN_WORD_RUN: usize = 3;

/// Percent-decodes `raw`, returning it unchanged when the escapes do not form valid UTF-8.
pub fn percent_decode(raw: &str) -> Cow<'_, str> {
    match urlencoding::decode(raw) {
        Ok(decoded) => decoded,
        Err(_) => Cow::Borrowed(raw),
    }
}

/// Rewrites the two known separator-stripped shapes into a UNC path anchored at `Albums`.
/// Anything else passes through untouched.
///
/// 1. `host` + `share` + `Albums` with no delimiters, possibly percent-encoded.
/// 2. `\host...Albums...` with no `\Albums` delimiter, not encoded.
pub fn repair<'a>(raw: &'a str, share: &ShareLayout) -> Cow<'a, str> {
    let decoded = percent_decode(raw);
    if let Some(fixed) = rebuild_joined_prefix(&decoded, share) {
        return Cow::Owned(fixed);
    }
    if let Some(fixed) = rebuild_missing_separators(raw, share) {
        return Cow::Owned(fixed);
    }
    Cow::Borrowed(raw)
}

/// Same rules as [`repair`] for input that has already been percent-decoded once.
pub fn repair_decoded<'a>(decoded: &'a str, share: &ShareLayout) -> Cow<'a, str> {
    if let Some(fixed) = rebuild_joined_prefix(decoded, share) {
        return Cow::Owned(fixed);
    }
    if let Some(fixed) = rebuild_missing_separators(decoded, share) {
        return Cow::Owned(fixed);
    }
    Cow::Borrowed(decoded)
}

/// Forward-slash path fragment after the first `Albums/` anchor, or after a bare `Albums` with
/// leading delimiters trimmed. `None` when the path has no anchor at all.
pub fn canonical_suffix(path: &str) -> Option<String> {
    // Backslash anchors are covered by slashing first.
    let slashed = path.replace('\\', "/");
    let marker = format!("{}/", ALBUMS_ANCHOR);
    if let Some(pos) = slashed.find(&marker) {
        let rest = &slashed[pos + marker.len()..];
        return Some(rest.trim_start_matches('/').to_string());
    }
    let pos = slashed.find(ALBUMS_ANCHOR)?;
    let rest = &slashed[pos + ALBUMS_ANCHOR.len()..];
    Some(rest.trim_start_matches(['/', ' ']).to_string())
}

pub fn normalize(raw: &str, share: &ShareLayout) -> Option<String> {
    canonical_suffix(&repair(raw, share))
}

fn rebuild_joined_prefix(decoded: &str, share: &ShareLayout) -> Option<String> {
    if share.host.is_empty() {
        return None;
    }
    let joined = format!("{}{}{}", share.host, share.share, ALBUMS_ANCHOR);
    if !decoded.starts_with(&joined) {
        return None;
    }
    let (_, rest) = decoded.split_once(ALBUMS_ANCHOR)?;
    Some(unc_albums_path(&share.host, &share.share, &restore_separators(rest)))
}

fn rebuild_missing_separators(raw: &str, share: &ShareLayout) -> Option<String> {
    if share.host.is_empty() {
        return None;
    }
    let lead = format!("\\{}", share.host);
    if !raw.starts_with(&lead) || raw.contains("\\Albums") {
        return None;
    }
    let (head, rest) = raw.split_once(ALBUMS_ANCHOR)?;
    let share_name = head[lead.len()..].trim_matches(['\\', '/']);
    Some(unc_albums_path(
        &share.host,
        share_name,
        &restore_separators(rest),
    ))
}

fn unc_albums_path(host: &str, share: &str, rest: &str) -> String {
    if share.is_empty() {
        format!("\\\\{}\\{}\\{}", host, ALBUMS_ANCHOR, rest)
    } else {
        format!("\\\\{}\\{}\\{}\\{}", host, share, ALBUMS_ANCHOR, rest)
    }
}

/// Re-inserts a backslash wherever a lowercase word runs straight into an uppercase letter,
/// which is where a folder boundary was dropped ("SoulsPulse" -> "Souls\Pulse").
fn restore_separators(rest: &str) -> String {
    let rest = rest.trim_start_matches(['\\', '/']);
    let mut out = String::with_capacity(rest.len() + 4);
    let mut lower_run = 0usize;
    for ch in rest.chars() {
        if ch.is_uppercase() && lower_run >= MIN_WORD_RUN {
            out.push('\\');
        }
        if ch.is_lowercase() {
            lower_run += 1;
        } else {
            lower_run = 0;
        }
        out.push(ch);
    }
    out
}
