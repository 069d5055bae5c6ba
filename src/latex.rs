// LaTeX handling for the expression editor
//
// Everything the editor derives from the raw expression lives here:
// - normalization of pasted/typed markup
// - text/math segmentation for math-only export
// - render requests handed to the formula renderer, plus the fallback
//   markup used when the renderer is absent or rejects the input
// - the math widget option set per input mode

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Marker opening an inline text region inside a raw expression.
const TEXT_MARKER: [char; 6] = ['\\', 't', 'e', 'x', 't', '{'];

/// Normalize a raw expression coming from the markup textarea: display-math
/// delimiters are dropped and surrounding whitespace trimmed.
pub(crate) fn convert_raw_latex(raw: &str) -> String {
    raw.replace("$$", "").trim().to_string()
}

/// Extracts the mathematical content of a raw expression, dropping inline
/// text regions.
///
/// Single left-to-right scan. Outside a text region characters accumulate
/// into the current segment; a space flushes the segment when it is
/// non-empty after trimming. `\text{` flushes the pending segment and opens
/// a region; ordinary braces nest inside it and the matching close brace
/// ends it without contributing anything to the output. Segments are
/// rejoined with single spaces in their original order.
///
/// A region whose braces never close absorbs the rest of the input; the
/// output then stops at the last segment flushed before the marker.
pub(crate) fn extract_math_segments(latex: &str) -> String {
    let chars: Vec<char> = latex.chars().collect();
    let mut segments: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_text = false;
    let mut depth: usize = 0;

    let flush = |current: &mut String, segments: &mut Vec<String>| {
        let trimmed = current.trim();
        if !trimmed.is_empty() {
            segments.push(trimmed.to_string());
        }
        current.clear();
    };

    let mut i = 0;
    while i < chars.len() {
        if !in_text && marker_at(&chars, i) {
            flush(&mut current, &mut segments);
            in_text = true;
            depth = 1;
            i += TEXT_MARKER.len();
            continue;
        }

        let c = chars[i];
        i += 1;

        if in_text {
            if c == '{' {
                depth += 1;
            } else if c == '}' {
                depth -= 1;
                if depth == 0 {
                    in_text = false;
                    flush(&mut current, &mut segments);
                }
            }
            continue;
        }

        current.push(c);
        if c == ' ' && !current.trim().is_empty() {
            flush(&mut current, &mut segments);
        }
    }

    flush(&mut current, &mut segments);
    segments.join(" ")
}

fn marker_at(chars: &[char], at: usize) -> bool {
    chars[at..].starts_with(&TEXT_MARKER)
}

/// Prepares an expression for the renderer: empty placeholder boxes become
/// a visible rule so they survive rasterization.
pub(crate) fn prepare_render_latex(latex: &str) -> String {
    latex.replace("\\placeholder{}", "\\rule{1em}{1em}")
}

/// Input modes of the math widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum EditorMode {
    Math,
    Text,
    Latex,
}

/// Option set handed to the math widget when the mode changes. Field names
/// match the widget's `setOptions` API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MathFieldOptions {
    pub(crate) default_mode: &'static str,
    pub(crate) smart_fence: bool,
    pub(crate) smart_mode: bool,
    pub(crate) virtual_keyboard_mode: &'static str,
}

/// Smart fencing and smart mode only help while typing mathematics; plain
/// text input turns them off. Touch devices get the virtual keyboard on
/// focus, desktops keep it manual.
pub(crate) fn math_field_options(mode: EditorMode, touch_device: bool) -> MathFieldOptions {
    let virtual_keyboard_mode = if touch_device { "onfocus" } else { "manual" };
    match mode {
        EditorMode::Text => MathFieldOptions {
            default_mode: "text",
            smart_fence: false,
            smart_mode: false,
            virtual_keyboard_mode,
        },
        EditorMode::Math | EditorMode::Latex => MathFieldOptions {
            default_mode: "math",
            smart_fence: true,
            smart_mode: true,
            virtual_keyboard_mode,
        },
    }
}

/// The MathJSON echo shown beside the editor. The widget has no real
/// MathJSON pipeline here; the echo wraps the raw expression the same way
/// the page always has.
pub(crate) fn math_json_echo(latex: &str) -> (String, bool) {
    match serde_json::to_string(&[format!("'{}'", latex)]) {
        Ok(echo) => (echo, true),
        Err(_) => ("Invalid LaTeX expression".to_string(), false),
    }
}

/// Macro substitutions applied on every render.
pub(crate) fn render_macros() -> BTreeMap<String, String> {
    let mut macros = BTreeMap::new();
    macros.insert("\\RR".to_string(), "\\mathbb{R}".to_string());
    macros.insert("\\NN".to_string(), "\\mathbb{N}".to_string());
    macros.insert("\\ZZ".to_string(), "\\mathbb{Z}".to_string());
    macros.insert("\\CC".to_string(), "\\mathbb{C}".to_string());
    macros.insert("\\QQ".to_string(), "\\mathbb{Q}".to_string());
    macros
}

/// Options object for the renderer call. Rendering must tolerate malformed
/// input, so errors are reported inline rather than thrown.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RenderOptions {
    pub(crate) throw_on_error: bool,
    pub(crate) output: &'static str,
    pub(crate) trust: bool,
    pub(crate) strict: bool,
    pub(crate) macros: BTreeMap<String, String>,
}

/// One render call: processed markup, display flag and options.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RenderRequest {
    pub(crate) latex: String,
    pub(crate) display_mode: bool,
    pub(crate) options: RenderOptions,
}

pub(crate) fn render_request(latex: &str) -> RenderRequest {
    RenderRequest {
        latex: prepare_render_latex(latex),
        display_mode: true,
        options: RenderOptions {
            throw_on_error: false,
            output: "html",
            trust: true,
            strict: false,
            macros: render_macros(),
        },
    }
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Placeholder shown while the expression is empty.
pub(crate) fn empty_preview_markup() -> String {
    "<div class=\"preview-empty\">LaTeX expression will appear here...</div>".to_string()
}

/// Fallback when the renderer is not loaded at all: the raw markup is shown
/// as-is so the editor stays usable.
pub(crate) fn renderer_missing_markup(latex: &str) -> String {
    format!(
        "<div class=\"preview-fallback\">Renderer not loaded: {}</div>",
        escape_html(latex)
    )
}

/// Inline error block echoing the offending raw input.
pub(crate) fn render_error_markup(latex: &str) -> String {
    format!(
        "<div class=\"preview-error\"><div class=\"preview-error-label\">Render Error:</div>{}</div>",
        escape_html(latex)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========== Segmentation Tests ==========

    #[test]
    fn test_segments_drop_text_regions() {
        let input = r"\text{a} b c \text{d} e";
        assert_eq!(extract_math_segments(input), "b c e");
    }

    #[test]
    fn test_segments_empty_input() {
        assert_eq!(extract_math_segments(""), "");
    }

    #[test]
    fn test_segments_without_text_regions_collapse_whitespace() {
        assert_eq!(extract_math_segments("a   b    c"), "a b c");
        assert_eq!(extract_math_segments("x=1"), "x=1");
    }

    #[test]
    fn test_segments_nested_braces_stay_inside_region() {
        let input = r"x^2 \text{note \underline{with braces}} y^2";
        assert_eq!(extract_math_segments(input), "x^2 y^2");
    }

    #[test]
    fn test_segments_flush_before_region() {
        let input = r"a+b\text{ tail}";
        assert_eq!(extract_math_segments(input), "a+b");
    }

    #[test]
    fn test_segments_unbalanced_region_does_not_panic() {
        assert_eq!(extract_math_segments(r"\text{a"), "");
        assert_eq!(extract_math_segments(r"x \text{a"), "x");
    }

    #[test]
    fn test_segments_region_only_input() {
        assert_eq!(extract_math_segments(r"\text{sadece metin}"), "");
    }

    #[test]
    fn test_segments_full_question() {
        let input = r"\sum_{n=1}^{\infty}\frac{1}{n^2}=\frac{\pi^2}{6}\text{ değerinin son değeri nedir?}";
        assert_eq!(
            extract_math_segments(input),
            r"\sum_{n=1}^{\infty}\frac{1}{n^2}=\frac{\pi^2}{6}"
        );
    }

    #[test]
    fn test_segments_marker_chars_inside_region_are_absorbed() {
        // A second marker inside an open region must not reset the depth;
        // its brace nests and the region closes at the matching outer brace.
        let input = r"\text{one \text{two}} z";
        assert_eq!(extract_math_segments(input), "z");
    }

    // ========== Normalization Tests ==========

    #[test]
    fn test_convert_strips_display_delimiters() {
        assert_eq!(convert_raw_latex("$$x^2$$"), "x^2");
        assert_eq!(convert_raw_latex("  a+b  "), "a+b");
        assert_eq!(convert_raw_latex("a$$b"), "ab");
    }

    #[test]
    fn test_placeholder_substitution() {
        assert_eq!(
            prepare_render_latex(r"x=\placeholder{}+1"),
            r"x=\rule{1em}{1em}+1"
        );
        assert_eq!(prepare_render_latex("x+y"), "x+y");
    }

    #[test]
    fn test_math_json_echo() {
        let (echo, valid) = math_json_echo("x^2");
        assert!(valid);
        assert_eq!(echo, "[\"'x^2'\"]");
    }

    // ========== Widget Option Tests ==========

    #[test]
    fn test_text_mode_disables_smart_input() {
        let opts = math_field_options(EditorMode::Text, false);
        assert_eq!(opts.default_mode, "text");
        assert!(!opts.smart_fence);
        assert!(!opts.smart_mode);
        assert_eq!(opts.virtual_keyboard_mode, "manual");
    }

    #[test]
    fn test_math_and_latex_modes_share_options() {
        assert_eq!(
            math_field_options(EditorMode::Math, true),
            math_field_options(EditorMode::Latex, true)
        );
        let opts = math_field_options(EditorMode::Math, true);
        assert_eq!(opts.default_mode, "math");
        assert!(opts.smart_fence);
        assert_eq!(opts.virtual_keyboard_mode, "onfocus");
    }

    // ========== Render Payload Tests ==========

    #[test]
    fn test_render_request_is_error_tolerant() {
        let request = render_request(r"\frac{1}{2}");
        assert!(request.display_mode);
        assert!(!request.options.throw_on_error);
        assert!(!request.options.strict);
        assert!(request.options.trust);
        assert_eq!(request.options.output, "html");
    }

    #[test]
    fn test_render_request_applies_placeholder_substitution() {
        let request = render_request(r"\placeholder{}");
        assert_eq!(request.latex, r"\rule{1em}{1em}");
    }

    #[test]
    fn test_render_macros_cover_number_sets() {
        let macros = render_macros();
        assert_eq!(macros.len(), 5);
        assert_eq!(macros["\\RR"], "\\mathbb{R}");
        assert_eq!(macros["\\QQ"], "\\mathbb{Q}");
    }

    #[test]
    fn test_render_payload_field_names() {
        let json = serde_json::to_string(&render_request("x")).unwrap();
        assert!(json.contains("\"displayMode\":true"));
        assert!(json.contains("\"throwOnError\":false"));
    }

    #[test]
    fn test_error_markup_echoes_raw_input() {
        let markup = render_error_markup(r"\frac{1}{");
        assert!(markup.contains("Render Error:"));
        assert!(markup.contains(r"\frac{1}{"));
    }

    #[test]
    fn test_fallback_markup_escapes_html() {
        let markup = renderer_missing_markup("<script>");
        assert!(!markup.contains("<script>"));
        assert!(markup.contains("&lt;script&gt;"));
    }
}
