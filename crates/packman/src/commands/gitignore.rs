//! `.gitignore` maintenance

use crate::path::{CACHE_DIR, SCRATCH_DIR, STAGE_DIR};
use std::path::Path;

/// Header written above the patterns
pub const GITIGNORE_HEADER: &str = "# packman";

/// Patterns for every directory an install creates
pub fn ignore_patterns() -> [String; 3] {
    [
        format!("{}/", CACHE_DIR),
        format!("{}/", SCRATCH_DIR),
        format!("{}/", STAGE_DIR),
    ]
}

/// Append missing ignore patterns to `<dir>/.gitignore`
///
/// Returns the patterns that were added; running it twice adds nothing.
pub fn update_gitignore(dir: &Path) -> std::io::Result<Vec<String>> {
    let path = dir.join(".gitignore");
    let existing = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e),
    };

    let present: Vec<&str> = existing.lines().map(str::trim).collect();
    let missing: Vec<String> = ignore_patterns()
        .into_iter()
        .filter(|pattern| !present.contains(&pattern.as_str()))
        .collect();
    if missing.is_empty() {
        return Ok(missing);
    }

    let mut content = existing.clone();
    if !content.is_empty() {
        if !content.ends_with('\n') {
            content.push('\n');
        }
        content.push('\n');
    }
    if !present.contains(&GITIGNORE_HEADER) {
        content.push_str(GITIGNORE_HEADER);
        content.push('\n');
    }
    for pattern in &missing {
        content.push_str(pattern);
        content.push('\n');
    }

    std::fs::write(&path, content)?;
    Ok(missing)
}
