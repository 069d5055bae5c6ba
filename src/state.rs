use crate::applet::AppletLifecycle;
use crate::constants::{DEFAULT_APP_NAME, DEFAULT_LANGUAGE, KNOWN_APP_NAMES};
use crate::latex;
use crate::latex::EditorMode;
use crate::paths::resolve_config_path;
use crate::snippets::SnippetStore;
use serde::{Deserialize, Serialize};
use std::fs;
use std::sync::Mutex;
use tauri::AppHandle;

/// Configuration of the embedded geometry applet. Persisted as JSON; field
/// names match the applet runtime's injection parameters, so the same record
/// round-trips between the settings form, disk and the init payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct AppletSettings {
  pub(crate) app_name: String,
  pub(crate) show_tool_bar: bool,
  pub(crate) show_menu_bar: bool,
  pub(crate) show_algebra_input: bool,
  pub(crate) show_tool_bar_help: bool,
  pub(crate) show_reset_icon: bool,
  pub(crate) show_animation_button: bool,
  pub(crate) show_fullscreen_button: bool,
  pub(crate) language: String,
  pub(crate) enable_label_drags: bool,
  pub(crate) enable_shift_drag_zoom: bool,
  pub(crate) enable_right_click: bool,
}

impl Default for AppletSettings {
  fn default() -> Self {
    Self {
      app_name: DEFAULT_APP_NAME.to_string(),
      show_tool_bar: true,
      show_menu_bar: true,
      show_algebra_input: true,
      show_tool_bar_help: true,
      show_reset_icon: true,
      show_animation_button: true,
      show_fullscreen_button: false,
      language: DEFAULT_LANGUAGE.to_string(),
      enable_label_drags: true,
      enable_shift_drag_zoom: true,
      enable_right_click: true,
    }
  }
}

/// Replaces values the applet runtime would reject with their defaults.
pub(crate) fn sanitize_settings(mut settings: AppletSettings) -> AppletSettings {
  if !KNOWN_APP_NAMES.contains(&settings.app_name.as_str()) {
    settings.app_name = DEFAULT_APP_NAME.to_string();
  }
  if settings.language.trim().is_empty() {
    settings.language = DEFAULT_LANGUAGE.to_string();
  }
  settings
}

/// Missing keys and corrupt blobs both fall back to defaults; a persisted
/// record never produces an error outward.
pub(crate) fn parse_settings(raw: &str) -> AppletSettings {
  let settings: AppletSettings = serde_json::from_str(raw).unwrap_or_default();
  sanitize_settings(settings)
}

pub(crate) fn load_settings(app: &AppHandle) -> AppletSettings {
  let path = resolve_config_path(app, "settings.json");
  match fs::read_to_string(path) {
    Ok(raw) => parse_settings(&raw),
    Err(_) => AppletSettings::default(),
  }
}

pub(crate) fn save_settings_file(app: &AppHandle, settings: &AppletSettings) -> Result<(), String> {
  let path = resolve_config_path(app, "settings.json");
  let raw = serde_json::to_string_pretty(settings).map_err(|e| e.to_string())?;
  fs::write(path, raw).map_err(|e| e.to_string())?;
  Ok(())
}

/// Mirror of the math widget's value plus the derived outputs the page
/// displays next to it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EditorState {
  pub(crate) latex_value: String,
  pub(crate) math_json: String,
  pub(crate) is_valid: bool,
  pub(crate) mode: EditorMode,
}

impl EditorState {
  pub(crate) fn new(initial: &str) -> Self {
    let mut state = Self {
      latex_value: String::new(),
      math_json: String::new(),
      is_valid: true,
      mode: EditorMode::Math,
    };
    state.set_value(initial);
    state
  }

  pub(crate) fn set_value(&mut self, raw: &str) {
    self.latex_value = latex::convert_raw_latex(raw);
    let (math_json, is_valid) = latex::math_json_echo(&self.latex_value);
    self.math_json = math_json;
    self.is_valid = is_valid;
  }
}

pub(crate) struct AppState {
  pub(crate) settings: Mutex<AppletSettings>,
  pub(crate) lifecycle: Mutex<AppletLifecycle>,
  pub(crate) editor: Mutex<EditorState>,
  pub(crate) snippets: Mutex<SnippetStore>,
}

impl AppState {
  pub(crate) fn new(settings: AppletSettings) -> Self {
    Self {
      settings: Mutex::new(settings),
      lifecycle: Mutex::new(AppletLifecycle::new()),
      editor: Mutex::new(EditorState::new(crate::snippets::INITIAL_EXPRESSION)),
      snippets: Mutex::new(SnippetStore::new()),
    }
  }
}
