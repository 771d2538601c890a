use std::{cmp::Reverse, path::Path, path::MAIN_SEPARATOR};

use tracing::debug;

/// Where a request under a static resource prefix points on disk.
///
/// Nothing here checks that the file exists.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct StaticFile {
    pub path: String,
    pub content_type: &'static str,
    /// The mapped directory `path` was built from.
    pub root: String,
    /// The request path below the prefix, still percent-encoded.
    pub rest: String,
}

/// URL prefix to directory mappings, longest prefix first.
#[derive(Default, Debug)]
pub struct Resources(Vec<(String, String)>);

impl Resources {
    pub fn new() -> Self {
        Self(vec![])
    }

    /// Maps `prefix` to `directory`.
    ///
    /// A leading `/` is dropped from the prefix, a trailing `/*` or `/**` is
    /// trimmed to `/` and any other prefix gets a trailing `/`. An empty prefix
    /// (`""`, `"/"`, `"/*"`, `"/**"`) maps every path.
    pub fn add_resource(&mut self, prefix: &str, directory: &str) {
        let key = normalize_prefix(prefix);
        let mut dir = directory.to_owned();
        if !dir.ends_with(MAIN_SEPARATOR) {
            dir.push(MAIN_SEPARATOR);
        }
        debug!(prefix, key = key.as_str(), dir = dir.as_str(), "map resource");
        self.0.push((key, dir));
        // stable, so equal lengths keep registration order
        self.0.sort_by_key(|(key, _)| Reverse(key.len()));
    }

    pub fn add_resources<'a>(&mut self, mappings: impl IntoIterator<Item = (&'a str, &'a str)>) {
        for (prefix, directory) in mappings {
            self.add_resource(prefix, directory);
        }
    }

    /// Replaces every mapping.
    pub fn set_resources<'a>(&mut self, mappings: impl IntoIterator<Item = (&'a str, &'a str)>) {
        self.0.clear();
        self.add_resources(mappings);
    }

    pub fn mappings(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn resolve(&self, path: &str) -> Option<StaticFile> {
        let path = path.strip_prefix('/').unwrap_or(path);
        self.0.iter().find_map(|(key, dir)| {
            let rest = path.strip_prefix(key.as_str())?;
            let file = static_file(rest, dir);
            debug!(path, key = key.as_str(), file = file.path.as_str(), "static file");
            Some(file)
        })
    }
}

// Root prefixes map to "" so they match every path, unlike a literal
// strip-then-trim which would leave "/" or "*/".
fn normalize_prefix(prefix: &str) -> String {
    let key = prefix.strip_prefix('/').unwrap_or(prefix);
    let key = key
        .strip_suffix("**")
        .or_else(|| key.strip_suffix('*'))
        .filter(|k| k.is_empty() || k.ends_with('/'))
        .unwrap_or(key);
    if key.is_empty() || key.ends_with('/') {
        key.to_owned()
    } else {
        format!("{}/", key)
    }
}

fn static_file(rest: &str, dir: &str) -> StaticFile {
    let path = format!("{}{}", dir, rest);
    StaticFile {
        content_type: content_type(&path),
        path,
        root: dir.to_owned(),
        rest: rest.to_owned(),
    }
}

pub fn content_type(path: impl AsRef<Path>) -> &'static str {
    let ext = path
        .as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("html" | "htm" | "xhtml") => "text/html",
        Some("xml") => "text/xml",
        Some("css") => "text/css",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("js") => "text/javascript",
        Some("pdf") => "application/pdf",
        Some("mp4") => "video/mp4",
        Some("mp3") => "audio/mp3",
        _ => "application/octet-stream",
    }
}
