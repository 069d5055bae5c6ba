// Geometry applet lifecycle
//
// The webview injects the applet runtime; this module owns everything the
// injection needs and the state machine the completion callbacks drive:
// - parameter object built from the settings record and the measured container
// - Unloaded -> Loading -> Ready | Failed phases, keyed by an attempt id so
//   completions from a superseded initialization are discarded
// - viewport and pointer bookkeeping for resize and the status line

use crate::constants::{MIN_APPLET_HEIGHT, MIN_APPLET_WIDTH};
use crate::state::AppletSettings;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum LifecyclePhase {
  Unloaded,
  Loading,
  Ready,
  Failed,
}

#[derive(Debug)]
pub(crate) struct AppletLifecycle {
  phase: LifecyclePhase,
  attempt: u64,
  viewport: (f64, f64),
  pointer: (f64, f64),
}

impl AppletLifecycle {
  pub(crate) fn new() -> Self {
    Self {
      phase: LifecyclePhase::Unloaded,
      attempt: 0,
      viewport: (0.0, 0.0),
      pointer: (0.0, 0.0),
    }
  }

  pub(crate) fn phase(&self) -> LifecyclePhase {
    self.phase
  }

  pub(crate) fn attempt(&self) -> u64 {
    self.attempt
  }

  /// Starts a new initialization attempt and enters `Loading`. The returned
  /// id tags the injection; completion callbacks must echo it back.
  pub(crate) fn begin_attempt(&mut self) -> u64 {
    self.attempt += 1;
    self.phase = LifecyclePhase::Loading;
    self.attempt
  }

  /// Success callback. Returns whether the transition was applied; a stale
  /// attempt id or a phase other than `Loading` leaves the machine untouched.
  pub(crate) fn mark_ready(&mut self, attempt: u64) -> bool {
    if attempt != self.attempt || self.phase != LifecyclePhase::Loading {
      return false;
    }
    self.phase = LifecyclePhase::Ready;
    true
  }

  /// Failure callback. `Failed` is terminal until an explicit restart.
  pub(crate) fn mark_failed(&mut self, attempt: u64) -> bool {
    if attempt != self.attempt || self.phase != LifecyclePhase::Loading {
      return false;
    }
    self.phase = LifecyclePhase::Failed;
    true
  }

  pub(crate) fn set_viewport(&mut self, width: f64, height: f64) {
    self.viewport = (width, height);
  }

  pub(crate) fn viewport(&self) -> (f64, f64) {
    self.viewport
  }

  pub(crate) fn set_pointer(&mut self, x: f64, y: f64) {
    self.pointer = (x, y);
  }

  pub(crate) fn pointer(&self) -> (f64, f64) {
    self.pointer
  }
}

/// Widens a measured container to the applet's minimum surface.
pub(crate) fn floor_dimensions(width: f64, height: f64) -> (u32, u32) {
  let floor = |measured: f64, min: u32| -> u32 {
    if measured.is_finite() && measured > min as f64 {
      measured.round() as u32
    } else {
      min
    }
  };
  (
    floor(width, MIN_APPLET_WIDTH),
    floor(height, MIN_APPLET_HEIGHT),
  )
}

/// Status-line coordinate display, rounded the way the page shows it.
pub(crate) fn format_coordinates(x: f64, y: f64) -> String {
  format!("({}, {})", x.round() as i64, y.round() as i64)
}

/// Parameter object for the applet runtime's injection entry point. The
/// runtime wants dimensions as strings; the attempt id rides along so the
/// page can echo it from both completion callbacks.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AppletParams {
  pub(crate) app_name: String,
  pub(crate) width: String,
  pub(crate) height: String,
  pub(crate) show_tool_bar: bool,
  pub(crate) show_menu_bar: bool,
  pub(crate) show_algebra_input: bool,
  pub(crate) show_tool_bar_help: bool,
  pub(crate) show_reset_icon: bool,
  pub(crate) show_animation_button: bool,
  pub(crate) show_fullscreen_button: bool,
  pub(crate) show_grid: bool,
  pub(crate) show_axes: bool,
  pub(crate) show_coordinates: bool,
  pub(crate) enable_label_drags: bool,
  pub(crate) enable_shift_drag_zoom: bool,
  pub(crate) enable_right_click: bool,
  pub(crate) language: String,
  pub(crate) attempt: u64,
}

pub(crate) fn build_applet_params(
  settings: &AppletSettings,
  viewport: (f64, f64),
  attempt: u64,
) -> AppletParams {
  let (width, height) = floor_dimensions(viewport.0, viewport.1);
  AppletParams {
    app_name: settings.app_name.clone(),
    width: width.to_string(),
    height: height.to_string(),
    show_tool_bar: settings.show_tool_bar,
    show_menu_bar: settings.show_menu_bar,
    show_algebra_input: settings.show_algebra_input,
    show_tool_bar_help: settings.show_tool_bar_help,
    show_reset_icon: settings.show_reset_icon,
    show_animation_button: settings.show_animation_button,
    show_fullscreen_button: settings.show_fullscreen_button,
    // Board chrome is fixed regardless of the settings record.
    show_grid: false,
    show_axes: false,
    show_coordinates: false,
    enable_label_drags: settings.enable_label_drags,
    enable_shift_drag_zoom: settings.enable_shift_drag_zoom,
    enable_right_click: settings.enable_right_click,
    language: settings.language.clone(),
    attempt,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ready_transition_applies_once_per_attempt() {
    let mut lifecycle = AppletLifecycle::new();
    assert_eq!(lifecycle.phase(), LifecyclePhase::Unloaded);

    let attempt = lifecycle.begin_attempt();
    assert_eq!(lifecycle.phase(), LifecyclePhase::Loading);
    assert!(lifecycle.mark_ready(attempt));
    assert_eq!(lifecycle.phase(), LifecyclePhase::Ready);

    // A duplicate callback for the same attempt is a no-op.
    assert!(!lifecycle.mark_ready(attempt));
    assert_eq!(lifecycle.phase(), LifecyclePhase::Ready);
  }

  #[test]
  fn failed_is_terminal_until_restart() {
    let mut lifecycle = AppletLifecycle::new();
    let attempt = lifecycle.begin_attempt();
    assert!(lifecycle.mark_failed(attempt));
    assert_eq!(lifecycle.phase(), LifecyclePhase::Failed);

    assert!(!lifecycle.mark_ready(attempt));
    assert!(!lifecycle.mark_failed(attempt));
    assert_eq!(lifecycle.phase(), LifecyclePhase::Failed);

    let next = lifecycle.begin_attempt();
    assert_eq!(lifecycle.phase(), LifecyclePhase::Loading);
    assert!(lifecycle.mark_ready(next));
  }

  #[test]
  fn stale_attempt_callbacks_are_discarded() {
    let mut lifecycle = AppletLifecycle::new();
    let first = lifecycle.begin_attempt();
    // Restart issued before the first initialization completed.
    let second = lifecycle.begin_attempt();
    assert_ne!(first, second);

    assert!(!lifecycle.mark_ready(first));
    assert_eq!(lifecycle.phase(), LifecyclePhase::Loading);
    assert!(!lifecycle.mark_failed(first));
    assert_eq!(lifecycle.phase(), LifecyclePhase::Loading);

    assert!(lifecycle.mark_ready(second));
    assert_eq!(lifecycle.phase(), LifecyclePhase::Ready);
  }

  #[test]
  fn attempt_ids_are_monotonic() {
    let mut lifecycle = AppletLifecycle::new();
    let a = lifecycle.begin_attempt();
    let b = lifecycle.begin_attempt();
    let c = lifecycle.begin_attempt();
    assert!(a < b && b < c);
  }

  #[test]
  fn small_containers_are_widened_to_the_floor() {
    assert_eq!(floor_dimensions(400.0, 300.0), (800, 600));
    assert_eq!(floor_dimensions(1000.0, 900.0), (1000, 900));
    assert_eq!(floor_dimensions(0.0, 0.0), (800, 600));
    assert_eq!(floor_dimensions(f64::NAN, 700.0), (800, 700));
  }

  #[test]
  fn params_force_board_chrome_off() {
    let mut settings = AppletSettings::default();
    settings.show_tool_bar = false;
    let params = build_applet_params(&settings, (1200.0, 700.0), 3);

    assert!(!params.show_grid);
    assert!(!params.show_axes);
    assert!(!params.show_coordinates);
    assert!(!params.show_tool_bar);
    assert_eq!(params.attempt, 3);
  }

  #[test]
  fn params_serialize_dimensions_as_strings() {
    let params = build_applet_params(&AppletSettings::default(), (400.0, 300.0), 1);
    assert_eq!(params.width, "800");
    assert_eq!(params.height, "600");

    let json = serde_json::to_string(&params).unwrap();
    assert!(json.contains("\"width\":\"800\""));
    assert!(json.contains("\"appName\":\"geometry\""));
    assert!(json.contains("\"showGrid\":false"));
  }

  #[test]
  fn coordinates_are_rounded_for_display() {
    assert_eq!(format_coordinates(12.4, 99.6), "(12, 100)");
    assert_eq!(format_coordinates(-3.5, 0.0), "(-4, 0)");
  }
}
