use tokio::process::Command;

/// Check if the current environment has required tools
pub async fn check_dependencies(yt_dlp_path: &str) -> Vec<String> {
    let mut missing = Vec::new();

    if !check_command_available(yt_dlp_path).await {
        missing.push(format!("{} - required to list YouTube caption tracks", yt_dlp_path));
    }

    missing
}

/// Make a configured name safe to use as a single file name.
///
/// Path separators and other special characters become underscores. Names
/// made only of dots are rejected since they resolve to directories.
pub fn sanitize_filename(filename: &str) -> Option<String> {
    let sanitized = filename
        .chars()
        .map(|c| match c {
            c if c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' || c == '.' => c,
            _ => '_',
        })
        .collect::<String>()
        .trim()
        .to_string();

    (!sanitized.chars().all(|c| c == '.')).then_some(sanitized)
}

/// Check if a command is available in PATH
async fn check_command_available(command: &str) -> bool {
    Command::new(command)
        .arg("--version")
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("transcription.txt").as_deref(), Some("transcription.txt"));
        assert_eq!(sanitize_filename("../notes/out.txt").as_deref(), Some(".._notes_out.txt"));
        assert_eq!(sanitize_filename(" my: file? ").as_deref(), Some("my_ file_"));
        assert_eq!(sanitize_filename(".."), None);
        assert_eq!(sanitize_filename("   "), None);
    }

    #[tokio::test]
    async fn test_missing_command_is_reported() {
        let missing = check_dependencies("definitely-not-a-real-yt-dlp").await;
        assert_eq!(missing.len(), 1);
        assert!(missing[0].starts_with("definitely-not-a-real-yt-dlp"));
    }
}
