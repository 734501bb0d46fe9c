//! Filesystem store behind the upload relay. Files land in the configured
//! upload directory under a timestamped name and are served back from
//! `/uploads/`.

use std::path::Path;

use chrono::Utc;

/// Strip anything that could escape the upload directory or confuse a URL.
/// Keeps ASCII alphanumerics, dots, dashes, and underscores.
pub fn sanitize_filename(name: &str) -> String {
    // Take only the final path component of whatever the client sent.
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name);

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = cleaned.trim_matches(['.', '_']).to_string();
    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed
    }
}

/// Write the bytes under a unique timestamped name and return the public
/// `/uploads/...` path.
pub async fn save_upload(dir: &Path, original_name: &str, bytes: &[u8]) -> std::io::Result<String> {
    let filename = format!(
        "{}-{}",
        Utc::now().timestamp_millis(),
        sanitize_filename(original_name)
    );

    tokio::fs::create_dir_all(dir).await?;
    tokio::fs::write(dir.join(&filename), bytes).await?;

    Ok(format!("/uploads/{filename}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_ordinary_names() {
        assert_eq!(sanitize_filename("clip.mp4"), "clip.mp4");
        assert_eq!(sanitize_filename("My-Video_2.webm"), "My-Video_2.webm");
    }

    #[test]
    fn test_sanitize_blocks_path_traversal() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("..\\..\\evil.mp4"), "evil.mp4");
        assert_eq!(sanitize_filename("a/b/c.mp4"), "c.mp4");
    }

    #[test]
    fn test_sanitize_replaces_oddities() {
        assert_eq!(sanitize_filename("my clip (1).mp4"), "my_clip__1_.mp4");
        assert_eq!(sanitize_filename("...."), "upload");
        assert_eq!(sanitize_filename(""), "upload");
    }

    #[tokio::test]
    async fn test_save_upload_writes_and_names() {
        let dir = std::env::temp_dir().join(format!("glimpse-store-{}", std::process::id()));
        let url = save_upload(&dir, "clip.mp4", b"bytes").await.unwrap();
        assert!(url.starts_with("/uploads/"));
        assert!(url.ends_with("-clip.mp4"));

        let on_disk = dir.join(url.trim_start_matches("/uploads/"));
        assert_eq!(tokio::fs::read(&on_disk).await.unwrap(), b"bytes");
        tokio::fs::remove_dir_all(&dir).await.ok();
    }
}
