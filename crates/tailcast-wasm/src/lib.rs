use wasm_bindgen::prelude::*;

use tailcast_core::models::{FigmaFile, FigmaPayload};
use tailcast_jsx::PreviewHost;

/// Run the preview pipeline and return the report as JSON.
#[wasm_bindgen]
pub fn preview(source: &str) -> String {
    let mut host = PreviewHost::default();
    let _ = host.run(source);
    serde_json::to_string(&host.report()).unwrap_or_else(|_| "{}".to_string())
}

/// Project the first frame of a raw Figma file response into `{"figmaJson": ...}`.
#[wasm_bindgen]
pub fn project_figma(file_json: &str) -> String {
    let file: FigmaFile = match tailcast_core::json::decode_deep(file_json.as_bytes()) {
        Ok(file) => file,
        Err(e) => return error_json(&e.to_string()),
    };
    let Some(frame) = file.first_frame() else {
        return error_json("first page has no frame");
    };
    let payload = FigmaPayload {
        figma_json: tailcast_core::projection::project_node(frame),
    };
    serde_json::to_string(&payload).unwrap_or_else(|_| "{}".to_string())
}

#[wasm_bindgen]
pub fn resolve_file_key(raw_key: &str) -> String {
    tailcast_core::file_key::resolve(raw_key)
}

fn error_json(message: &str) -> String {
    serde_json::json!({ "error": message }).to_string()
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;

    #[test]
    fn test_preview_report() {
        let report: Value =
            serde_json::from_str(&preview("<p className=\"text-sm\">Hello</p>")).unwrap();
        assert_eq!(report["ok"], true);
        assert_eq!(report["component"], "GeneratedComponent");
        assert_eq!(report["html"], "<p class=\"text-sm\">Hello</p>");
    }

    #[test]
    fn test_preview_error_kind() {
        let report: Value = serde_json::from_str(&preview("")).unwrap();
        assert_eq!(report["ok"], false);
        assert_eq!(report["kind"], "empty");
    }

    #[test]
    fn test_project_figma() {
        let raw = r#"{"document":{"children":[{"children":[{"name":"Hero","type":"FRAME","absoluteBoundingBox":{"x":0,"y":0,"width":320.4,"height":200}}]}]}}"#;
        let out: Value = serde_json::from_str(&project_figma(raw)).unwrap();
        assert_eq!(out["figmaJson"]["name"], "Hero");
        assert_eq!(out["figmaJson"]["width"], 320);

        let out: Value = serde_json::from_str(&project_figma("not json")).unwrap();
        assert!(out["error"].is_string());
    }

    #[test]
    fn test_project_figma_deep_tree() {
        let mut node = r#"{"name":"Leaf","type":"TEXT"}"#.to_string();
        for _ in 0..70 {
            node = format!(r#"{{"type":"FRAME","children":[{node}]}}"#);
        }
        let raw = format!(r#"{{"document":{{"children":[{{"children":[{node}]}}]}}}}"#);
        let out = project_figma(&raw);
        assert!(out.starts_with(r#"{"figmaJson":{"type":"FRAME""#));
        assert!(out.contains(r#""name":"Leaf""#));

        let raw = "[".repeat(5000);
        let out: Value = serde_json::from_str(&project_figma(&raw)).unwrap();
        assert_eq!(out["error"], "document nests deeper than 1024 levels");
    }
}
