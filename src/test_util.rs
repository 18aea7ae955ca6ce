use std::fs;
use std::path::{Path, PathBuf};

/// Run `func` with `HOME` pointing at a fresh directory.
///
/// The closure receives the per-user settings directory
/// (`$HOME/.deeplx-availability-check`), already created.
pub(crate) fn with_settings_home<F, R>(func: F) -> R
where
    F: FnOnce(&Path) -> R,
{
    static HOME_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
    let _guard = HOME_MUTEX.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let home = tempfile::tempdir().expect("tempdir");
    let settings_dir = home.path().join(".deeplx-availability-check");
    fs::create_dir_all(&settings_dir).expect("create settings dir");

    let old_home = std::env::var_os("HOME");
    // SAFETY: HOME is only touched by tests holding HOME_MUTEX.
    unsafe { std::env::set_var("HOME", home.path()) };
    let result = func(&settings_dir);
    match old_home {
        Some(old) => unsafe { std::env::set_var("HOME", old) },
        None => unsafe { std::env::remove_var("HOME") },
    }
    result
}

/// Write a `[check]` settings table into `dir/name`.
pub(crate) fn write_check_settings(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("[check]\n{}", body)).expect("write settings");
    path
}
