use std::path::{Path, PathBuf};

/// Resolve a user-supplied path.
///
/// Expands a leading `~` to the home directory and makes relative paths
/// absolute against the current working directory.
pub fn sanitize_path(path: &str) -> PathBuf {
    let path = path.trim();

    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }

    let path_buf = Path::new(path);
    if path_buf.is_relative() {
        if let Ok(current_dir) = std::env::current_dir() {
            return current_dir.join(path_buf);
        }
    }

    path_buf.to_path_buf()
}

/// Show `path` relative to `base_dir` when it lives underneath it.
pub fn format_path(base_dir: &Path, path: &Path) -> String {
    if let Ok(relative) = path.strip_prefix(base_dir) {
        if relative.components().count() == 0 {
            return ".".to_string();
        }
        return relative.to_string_lossy().to_string();
    }
    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_path_is_kept() {
        assert_eq!(sanitize_path("  /tmp/a.pdf "), PathBuf::from("/tmp/a.pdf"));
    }

    #[test]
    fn test_relative_path_joins_cwd() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(sanitize_path("notes.pdf"), cwd.join("notes.pdf"));
    }

    #[test]
    fn test_home_is_expanded() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(sanitize_path("~/docs/a.pdf"), home.join("docs/a.pdf"));
            assert_eq!(sanitize_path("~"), home);
        }
    }

    #[test]
    fn test_format_path_relative_to_base() {
        let base = Path::new("/work");
        assert_eq!(format_path(base, Path::new("/work/papers/a.pdf")), "papers/a.pdf");
        assert_eq!(format_path(base, Path::new("/work")), ".");
        assert_eq!(format_path(base, Path::new("/other/a.pdf")), "/other/a.pdf");
    }
}
