/// Minimum applet surface; smaller containers are widened to the floor.
pub const MIN_APPLET_WIDTH: u32 = 800;
pub const MIN_APPLET_HEIGHT: u32 = 600;

/// Delay between applet teardown and re-initialization. The webview needs
/// the gap to finish clearing the mount point before a new inject runs.
pub const RESTART_DELAY_MS: u64 = 500;

/// Loading screen fade-out duration used by the page.
pub const LOADING_FADE_MS: u64 = 300;

/// Settle time between a preview render and the rasterizer capture.
pub const EXPORT_RENDER_SETTLE_MS: u64 = 500;

pub const DEFAULT_APP_NAME: &str = "geometry";
pub const DEFAULT_LANGUAGE: &str = "tr";

/// Applet variants accepted by the runtime's injection entry point.
pub const KNOWN_APP_NAMES: [&str; 5] = ["geometry", "graphing", "classic", "3d", "suite"];
