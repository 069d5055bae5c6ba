use std::fs;
use std::path::PathBuf;
use tauri::{AppHandle, Manager};

pub(crate) fn resolve_config_path(app: &AppHandle, filename: &str) -> PathBuf {
  let base = app
    .path()
    .app_config_dir()
    .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
  let _ = fs::create_dir_all(&base);
  base.join(filename)
}

pub(crate) fn resolve_export_dir(app: &AppHandle) -> PathBuf {
  let base = app
    .path()
    .picture_dir()
    .or_else(|_| app.path().app_data_dir())
    .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
  let dir = base.join("MathBoard");
  let _ = fs::create_dir_all(&dir);
  dir
}
