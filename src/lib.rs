// MathBoard - core app runtime

mod applet;
mod catalog;
mod constants;
mod errors;
mod export;
mod latex;
mod paths;
mod snippets;
mod state;
mod util;

use applet::{build_applet_params, AppletParams, LifecyclePhase};
use catalog::FormulaCategory;
use errors::{AppError, ErrorEvent};
use latex::{EditorMode, MathFieldOptions, RenderRequest};
use serde::Serialize;
use snippets::ExampleSnippet;
use state::{AppState, AppletSettings, EditorState};
use std::thread;
use std::time::Duration;
use tauri::{AppHandle, Emitter, Manager, State, Wry};
use tracing::{error, info, warn};

use crate::constants::{EXPORT_RENDER_SETTLE_MS, LOADING_FADE_MS, RESTART_DELAY_MS};
use crate::state::{load_settings, sanitize_settings, save_settings_file};

/// Timing constants the page mirrors; owned here so the deferrals stay in
/// lockstep with the backend's sequencing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct UiConstants {
    restart_delay_ms: u64,
    loading_fade_ms: u64,
    export_render_settle_ms: u64,
}

#[tauri::command]
fn get_ui_constants() -> UiConstants {
    UiConstants {
        restart_delay_ms: RESTART_DELAY_MS,
        loading_fade_ms: LOADING_FADE_MS,
        export_render_settle_ms: EXPORT_RENDER_SETTLE_MS,
    }
}

/// Everything the page needs to refresh the editor pane after a change:
/// the mirrored state, the render call for the preview, and the markup to
/// fall back to when the renderer is absent or rejects the input.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct EditorSnapshot {
    latex_value: String,
    math_json: String,
    is_valid: bool,
    mode: EditorMode,
    render: Option<RenderRequest>,
    empty_markup: String,
    fallback_markup: String,
    error_markup: String,
}

fn editor_snapshot(editor: &EditorState) -> EditorSnapshot {
    let render = if editor.latex_value.trim().is_empty() {
        None
    } else {
        Some(latex::render_request(&editor.latex_value))
    };
    EditorSnapshot {
        latex_value: editor.latex_value.clone(),
        math_json: editor.math_json.clone(),
        is_valid: editor.is_valid,
        mode: editor.mode,
        render,
        empty_markup: latex::empty_preview_markup(),
        fallback_markup: latex::renderer_missing_markup(&editor.latex_value),
        error_markup: latex::render_error_markup(&editor.latex_value),
    }
}

// ============================================================================
// Settings & applet lifecycle commands
// ============================================================================

#[tauri::command]
fn get_settings(state: State<'_, AppState>) -> AppletSettings {
    state.settings.lock().unwrap().clone()
}

#[tauri::command]
fn default_settings() -> AppletSettings {
    AppletSettings::default()
}

/// Replaces the authoritative settings record, persists it, and restarts the
/// applet. The record is swapped and saved in one synchronous pass; only the
/// re-initialization is deferred, so a concurrent command never observes a
/// half-applied record.
#[tauri::command]
fn apply_settings(
    app: AppHandle,
    state: State<'_, AppState>,
    settings: AppletSettings,
) -> Result<(), String> {
    let settings = sanitize_settings(settings);
    {
        let mut current = state.settings.lock().unwrap();
        *current = settings.clone();
    }
    save_settings_file(&app, &settings)?;

    info!(
        "Settings applied (app={}, language={}); restarting applet in {}ms",
        settings.app_name, settings.language, RESTART_DELAY_MS
    );
    let _ = app.emit("settings-changed", settings);
    let _ = app.emit("applet:teardown", ());
    let _ = app.emit("app:notify", "Settings applied! Restarting the board...");

    schedule_applet_restart(app);
    Ok(())
}

/// Re-initializes the applet after the teardown delay. The fresh attempt id
/// is allocated inside the deferred step, so a ready/error callback from the
/// torn-down instance can no longer match.
fn schedule_applet_restart(app: AppHandle) {
    thread::spawn(move || {
        thread::sleep(Duration::from_millis(RESTART_DELAY_MS));

        let state = app.state::<AppState>();
        let params = {
            let settings = state.settings.lock().unwrap();
            let mut lifecycle = state.lifecycle.lock().unwrap();
            let attempt = lifecycle.begin_attempt();
            build_applet_params(&settings, lifecycle.viewport(), attempt)
        };

        let _ = app.emit("applet:state", LifecyclePhase::Loading);
        let _ = app.emit("applet:init", params);
    });
}

/// First initialization, called by the page once the host element exists.
/// Returns the parameter object for the runtime's injection entry point.
#[tauri::command]
fn start_applet(state: State<'_, AppState>) -> AppletParams {
    let settings = state.settings.lock().unwrap().clone();
    let mut lifecycle = state.lifecycle.lock().unwrap();
    let attempt = lifecycle.begin_attempt();
    info!("Starting applet (attempt {})", attempt);
    build_applet_params(&settings, lifecycle.viewport(), attempt)
}

/// Success callback from the applet runtime. Stale attempts are discarded.
#[tauri::command]
fn applet_ready(app: AppHandle, state: State<'_, AppState>, attempt: u64) {
    let applied = state.lifecycle.lock().unwrap().mark_ready(attempt);
    if !applied {
        warn!("Discarding stale ready callback (attempt {})", attempt);
        return;
    }
    info!("Applet ready (attempt {})", attempt);
    let _ = app.emit("applet:state", LifecyclePhase::Ready);
}

/// Failure callback from the applet runtime (script load or injection).
/// Terminal until the user changes settings and triggers a restart.
#[tauri::command]
fn applet_load_failed(app: AppHandle, state: State<'_, AppState>, attempt: u64, message: String) {
    let applied = state.lifecycle.lock().unwrap().mark_failed(attempt);
    if !applied {
        warn!(
            "Discarding stale failure callback (attempt {}): {}",
            attempt, message
        );
        return;
    }
    emit_error(&app, AppError::Applet(message), Some("Applet initialization"));
    let _ = app.emit("applet:state", LifecyclePhase::Failed);
}

/// Container measurement from the page. Returns the floored size the applet
/// should be resized to while it is running.
#[tauri::command]
fn report_viewport(state: State<'_, AppState>, width: f64, height: f64) -> Option<(u32, u32)> {
    let mut lifecycle = state.lifecycle.lock().unwrap();
    lifecycle.set_viewport(width, height);
    if lifecycle.phase() == LifecyclePhase::Ready {
        Some(applet::floor_dimensions(width, height))
    } else {
        None
    }
}

/// Pointer position over the board; returns the status-line text.
#[tauri::command]
fn report_pointer(state: State<'_, AppState>, x: f64, y: f64) -> String {
    let mut lifecycle = state.lifecycle.lock().unwrap();
    lifecycle.set_pointer(x, y);
    applet::format_coordinates(x, y)
}

// ============================================================================
// Expression editor commands
// ============================================================================

#[tauri::command]
fn get_editor(state: State<'_, AppState>) -> EditorSnapshot {
    editor_snapshot(&state.editor.lock().unwrap())
}

/// Mirrors the widget's value (or the raw textarea) into the editor state.
#[tauri::command]
fn set_latex(state: State<'_, AppState>, raw: String) -> EditorSnapshot {
    let mut editor = state.editor.lock().unwrap();
    editor.set_value(&raw);
    editor_snapshot(&editor)
}

/// Input-mode switch; returns the option set for the widget's `setOptions`.
#[tauri::command]
fn set_mode(
    state: State<'_, AppState>,
    mode: EditorMode,
    touch_device: bool,
) -> MathFieldOptions {
    state.editor.lock().unwrap().mode = mode;
    latex::math_field_options(mode, touch_device)
}

/// The page reports a renderer failure for the current input; returns the
/// inline error block echoing the offending markup. Editor state is not
/// touched, so the next keystroke renders normally again.
#[tauri::command]
fn report_render_error(app: AppHandle, raw: String, message: String) -> String {
    emit_error(&app, AppError::Render(message), Some("Preview render"));
    latex::render_error_markup(&raw)
}

// ============================================================================
// Snippet & catalog commands
// ============================================================================

#[tauri::command]
fn list_examples(state: State<'_, AppState>) -> Vec<ExampleSnippet> {
    state.snippets.lock().unwrap().all()
}

/// Saves the current expression under a label; returns the refreshed list.
#[tauri::command]
fn save_example(state: State<'_, AppState>, name: String) -> Result<Vec<ExampleSnippet>, String> {
    let latex_value = state.editor.lock().unwrap().latex_value.clone();
    let mut snippets = state.snippets.lock().unwrap();
    let snippet = snippets.save(&name, &latex_value, util::now_ms())?;
    info!("Saved example {} ({})", snippet.id, snippet.name);
    Ok(snippets.all())
}

#[tauri::command]
fn delete_example(state: State<'_, AppState>, id: String) -> Vec<ExampleSnippet> {
    let mut snippets = state.snippets.lock().unwrap();
    if !snippets.delete(&id) {
        warn!("Delete ignored for unknown example id {}", id);
    }
    snippets.all()
}

/// Loads a snippet into the editor and returns the refreshed snapshot.
#[tauri::command]
fn select_example(state: State<'_, AppState>, id: String) -> Result<EditorSnapshot, String> {
    let latex_value = {
        let snippets = state.snippets.lock().unwrap();
        snippets
            .find(&id)
            .map(|snippet| snippet.latex.clone())
            .ok_or_else(|| format!("No example with id {}", id))?
    };
    let mut editor = state.editor.lock().unwrap();
    editor.set_value(&latex_value);
    Ok(editor_snapshot(&editor))
}

#[tauri::command]
fn get_formula_catalog() -> Vec<FormulaCategory> {
    catalog::formula_catalog()
}

// ============================================================================
// Export commands
// ============================================================================

/// Builds the off-screen render for an export. Math-only export strips the
/// inline text regions first.
#[tauri::command]
fn prepare_export(
    app: AppHandle,
    state: State<'_, AppState>,
    math_only: bool,
) -> Result<RenderRequest, String> {
    let latex_value = state.editor.lock().unwrap().latex_value.clone();
    match export::export_content(&latex_value, math_only) {
        Ok(content) => Ok(latex::render_request(&content)),
        Err(message) => {
            emit_error(&app, AppError::Export(message.clone()), Some("PNG export"));
            Err(message)
        }
    }
}

/// Receives the rasterized capture and writes the PNG. A cancelled save
/// dialog aborts quietly; anything else surfaces as an export error.
#[tauri::command]
fn save_export_png(app: AppHandle, data_url: String, math_only: bool) -> Result<String, String> {
    match export::save_export(&app, &data_url, math_only) {
        Ok(path) => {
            let _ = app.emit("app:notify", format!("Saved {}", path.display()));
            Ok(path.display().to_string())
        }
        Err(message) => {
            if message != "Export cancelled" {
                emit_error(&app, AppError::Export(message.clone()), Some("PNG export"));
            }
            Err(message)
        }
    }
}

// ============================================================================
// Runtime
// ============================================================================

fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    info!("MathBoard starting up");
}

pub(crate) fn emit_error(app: &AppHandle, error: AppError, context: Option<&str>) {
    let event = if let Some(ctx) = context {
        ErrorEvent::new(error.clone()).with_context(ctx)
    } else {
        ErrorEvent::new(error.clone())
    };

    error!("{}: {}", error.title(), error.message());

    let _ = app.emit("app:error", event);
}

fn with_dialog_plugin(builder: tauri::Builder<Wry>) -> tauri::Builder<Wry> {
    #[cfg(test)]
    {
        builder
    }

    #[cfg(not(test))]
    {
        builder.plugin(tauri_plugin_dialog::init())
    }
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    init_logging();

    let builder = tauri::Builder::default();
    with_dialog_plugin(builder)
        .setup(|app| {
            let settings = load_settings(app.handle());
            info!(
                "Loaded settings: app={}, language={}",
                settings.app_name, settings.language
            );
            app.manage(AppState::new(settings));
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            get_ui_constants,
            get_settings,
            default_settings,
            apply_settings,
            start_applet,
            applet_ready,
            applet_load_failed,
            report_viewport,
            report_pointer,
            get_editor,
            set_latex,
            set_mode,
            report_render_error,
            list_examples,
            save_example,
            delete_example,
            select_example,
            get_formula_catalog,
            prepare_export,
            save_export_png,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
