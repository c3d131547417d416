//! Small utility helpers used across modules.

/// Append the viewer's page fragment (`#page=N`) to a document URL, replacing
/// any fragment already present.
pub fn page_locator(url: &str, page: u32) -> String {
  let base = url.split('#').next().unwrap_or(url);
  format!("{base}#page={page}")
}

/// Media type without parameters, lowercased: `Application/PDF; x=y` -> `application/pdf`.
pub fn essence(media_type: &str) -> String {
  media_type.split(';').next().unwrap_or("").trim().to_ascii_lowercase()
}

/// Log-safe truncation for user-provided strings (file names, ids).
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.chars().count() <= max {
    s.to_string()
  } else {
    let head: String = s.chars().take(max).collect();
    format!("{head}… ({} bytes total)", s.len())
  }
}
