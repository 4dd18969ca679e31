use std::path::{Path, PathBuf};

/// Expand `~`, `$VAR` and `${VAR}`; unresolvable input is returned unchanged.
pub fn expand_env_vars(raw: &str) -> String {
    shellexpand::full(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

pub trait PathExt {
    fn expand(&self) -> PathBuf;
}

impl PathExt for Path {
    fn expand(&self) -> PathBuf {
        PathBuf::from(expand_env_vars(self.to_string_lossy().as_ref()))
    }
}
