use crate::model::Package;
use crate::stylesheet::selector;
use serde_json::{Value, json};
use tracing::warn;

/// Sprite metadata keyed by selector, for tooling that does not read CSS.
/// Shape: `{ frames: { selector: { file, frame: {x, y, w, h} } }, meta: { sheet, namespace, size } }`.
pub fn to_json(package: &Package, sheet_name: &str) -> Value {
    let mut frames = serde_json::Map::new();
    for entry in &package.images {
        let r = entry.rect();
        let key = selector(package, entry);
        let frame = json!({
            "file": entry.file_name,
            "frame": {"x": r.x, "y": r.y, "w": r.w, "h": r.h},
        });
        if let Some(prev) = frames.insert(key.clone(), frame) {
            warn!(
                selector = %key,
                replaced = %prev["file"],
                by = %entry.file_name,
                "duplicate selector in metadata; keeping the later frame"
            );
        }
    }
    let size = package
        .size
        .map(|s| json!({"w": s.width, "h": s.height}))
        .unwrap_or(Value::Null);
    json!({
        "frames": frames,
        "meta": {
            "app": "spritegen",
            "version": env!("CARGO_PKG_VERSION"),
            "sheet": sheet_name,
            "namespace": package.namespace,
            "size": size,
        }
    })
}
