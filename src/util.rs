// chrono and filename util functions.

/// Current UTC time, without timezone, as stored in the db.
pub fn now() -> chrono::NaiveDateTime {
  chrono::Utc::now().naive_utc()
}

/// Reduce an uploaded filename to a flat, shell/URL safe name.
///
/// Path separators and whitespace become `_`, anything outside
/// `[A-Za-z0-9._-]` is dropped and leading/trailing dots and underscores
/// are stripped, so `../../etc/passwd` ends up as `etc_passwd`.
pub fn secure_filename(filename: &str) -> String {
  let filename = filename.replace(|c| c == '/' || c == '\\', " ");
  let joined = filename.split_whitespace().collect::<Vec<&str>>().join("_");
  let cleaned: String = joined.chars()
    .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    .collect();
  cleaned.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Lower-cased extension of `filename`, if it has one.
pub fn file_extension(filename: &str) -> Option<String> {
  match filename.rsplit_once('.') {
    Some((_, ext)) if !ext.is_empty() => Some(ext.to_lowercase()),
    _ => None,
  }
}

/// Last path segment of a URL or path.
pub fn basename(url: &str) -> &str {
  url.rsplit(|c| c == '/' || c == '\\').next().unwrap_or(url)
}
