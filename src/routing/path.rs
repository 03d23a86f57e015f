//! Slash-separated path joining for route patterns.
//!
//! # Design Decisions
//! - Lexical only: never touches the filesystem
//! - `.` segments dropped, `..` pops the previous segment, repeated
//!   slashes collapse, trailing slashes are removed
//! - `..` never climbs above the root of a rooted path

/// Join two path elements and clean the result.
///
/// Empty elements are ignored; joining two empty elements yields `""`.
pub fn join(base: &str, elem: &str) -> String {
    let joined = match (base.is_empty(), elem.is_empty()) {
        (true, true) => return String::new(),
        (true, false) => elem.to_string(),
        (false, true) => base.to_string(),
        (false, false) => format!("{base}/{elem}"),
    };
    clean(&joined)
}

/// Lexically normalize a path.
pub fn clean(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let rooted = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|s| *s != "..") {
                    segments.pop();
                } else if !rooted {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }

    let body = segments.join("/");
    match (rooted, body.is_empty()) {
        (true, _) => format!("/{body}"),
        (false, true) => ".".to_string(),
        (false, false) => body,
    }
}

/// Route prefix for a configured base path: always rooted, never trailing `/`
/// except for the root itself.
pub fn route_prefix(basepath: &str) -> String {
    join("/", basepath)
}

/// First segment of `path` that axum would read as a capture or wildcard.
///
/// axum 0.8 captures `{name}` and refuses segments starting with `:` or `*`.
pub fn capture_segment(path: &str) -> Option<&str> {
    path.split('/').find(|segment| {
        segment.contains(['{', '}']) || segment.starts_with([':', '*'])
    })
}

/// Escape `{` and `}` so axum matches them literally.
pub fn literal_route(path: &str) -> String {
    path.replace('{', "{{").replace('}', "}}")
}
