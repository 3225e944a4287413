use anyhow::{Context, Result};
use std::path::PathBuf;

/// Resolve the server home directory.
///
/// - `explicit`: value from configuration, may start with `~`.
/// - `default_subdir`: directory name used under the platform home when no
///   explicit value is given (e.g. `.classgrid`).
/// - `create`: create the directory if it does not exist.
pub fn resolve_home_dir(
    explicit: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf> {
    let resolved = match explicit {
        Some(raw) => expand_tilde(&raw)?,
        None => platform_home()?.join(default_subdir),
    };

    if create {
        std::fs::create_dir_all(&resolved)
            .with_context(|| format!("Failed to create home dir {}", resolved.display()))?;
    }

    Ok(resolved)
}

/// Expand a leading `~` against the platform home directory.
fn expand_tilde(raw: &str) -> Result<PathBuf> {
    if raw == "~" {
        return platform_home();
    }
    if let Some(rest) = raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        return Ok(platform_home()?.join(rest));
    }
    let p = PathBuf::from(raw);
    if p.is_relative() {
        let cwd = std::env::current_dir().context("Failed to resolve current directory")?;
        return Ok(cwd.join(p));
    }
    Ok(p)
}

#[cfg(target_os = "windows")]
fn platform_home() -> Result<PathBuf> {
    std::env::var_os("APPDATA")
        .map(PathBuf::from)
        .context("APPDATA is not set")
}

#[cfg(not(target_os = "windows"))]
fn platform_home() -> Result<PathBuf> {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .context("HOME is not set")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_absolute_path_is_kept() {
        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join("srv");
        let resolved =
            resolve_home_dir(Some(p.to_string_lossy().into_owned()), ".classgrid", true).unwrap();
        assert_eq!(resolved, p);
        assert!(p.exists());
    }

    #[test]
    fn tilde_and_default_resolve_against_home() {
        let tmp = tempfile::tempdir().unwrap();
        std::env::set_var("HOME", tmp.path());

        let resolved = resolve_home_dir(Some("~/.cg_test".into()), ".classgrid", false).unwrap();
        assert!(resolved.ends_with(".cg_test"));

        let resolved = resolve_home_dir(None, ".classgrid", false).unwrap();
        assert!(resolved.ends_with(".classgrid"));
    }
}
