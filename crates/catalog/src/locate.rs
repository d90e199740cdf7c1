use std::path::{Path, PathBuf};

use common::{file_name_of, join_relpath, path_segments};
use tracing::debug;

/// Ordered list of filesystem paths worth probing for a recorded path:
/// the path as given, the path re-anchored under any root it was recorded beneath, then
/// each root joined with the file name and finally with the last two segments.
pub fn candidate_paths(candidate: &str, roots: &[String]) -> Vec<PathBuf> {
    let mut out = vec![PathBuf::from(candidate)];

    let wanted = comparable(candidate);
    for root in roots {
        let prefix = comparable(root);
        if prefix.is_empty() {
            continue;
        }
        let prefix = prefix.trim_end_matches('/');
        if let Some(rest) = wanted.strip_prefix(prefix) {
            if rest.starts_with('/') {
                out.push(join_relpath(Path::new(root), rest));
            }
        }
    }

    let name = file_name_of(candidate);
    if !name.is_empty() {
        for root in roots {
            out.push(join_relpath(Path::new(root), name));
        }
    }

    let segments = path_segments(candidate);
    if segments.len() >= 2 {
        let tail = segments[segments.len() - 2..].join("/");
        for root in roots {
            out.push(join_relpath(Path::new(root), &tail));
        }
    }

    out.dedup();
    out
}

/// First candidate that is an existing regular file.
pub fn locate(candidate: &str, roots: &[String]) -> Option<PathBuf> {
    if candidate.trim().is_empty() {
        return None;
    }
    let found = candidate_paths(candidate, roots)
        .into_iter()
        .find(|path| path.is_file());
    if found.is_none() {
        debug!(candidate, "no readable file for recorded path");
    }
    found
}

fn comparable(raw: &str) -> String {
    raw.replace('\\', "/")
}
