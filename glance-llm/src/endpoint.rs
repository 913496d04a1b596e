use url::Url;

/// Resolves a request URL against a configured base. A base that already ends
/// with the full endpoint path is used verbatim, a base ending with the bare
/// version segment gets the remainder appended, anything else gets the full
/// versioned path. The comparison is case-insensitive and tolerates a
/// trailing slash.
pub(crate) fn resolve_endpoint(base: &Url, version_segment: &str, full_path: &str) -> Url {
    let normalized = base.path().trim_end_matches('/').to_ascii_lowercase();
    if normalized.ends_with(full_path) {
        return base.clone();
    }

    let suffix = if normalized.ends_with(version_segment) {
        full_path.strip_prefix(version_segment).unwrap_or(full_path)
    } else {
        full_path
    };
    append_path(base, suffix)
}

fn append_path(base: &Url, suffix: &str) -> Url {
    let mut resolved = base.clone();
    let path = format!(
        "{}/{}",
        base.path().trim_end_matches('/'),
        suffix.trim_start_matches('/')
    );
    resolved.set_path(&path);
    resolved
}
