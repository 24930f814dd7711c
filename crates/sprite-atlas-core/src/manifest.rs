use crate::error::{AtlasError, Result};
use crate::model::{Layout, Manifest, Placement};
use serde_json::Value;

/// Builds the name -> placement map from the same layout walk the compositor draws.
pub fn build_manifest(layout: &Layout) -> Manifest {
    layout
        .placed
        .iter()
        .map(|p| {
            (
                p.image.name.clone(),
                Placement::new(p.x, p.y, p.image.width, p.image.height),
            )
        })
        .collect()
}

/// Shape: `{ name: { x, y, width, height, pixelRatio, visible } }`.
pub fn to_json(manifest: &Manifest) -> Value {
    let mut map = serde_json::Map::new();
    for (name, p) in manifest {
        map.insert(
            name.clone(),
            serde_json::json!({
                "x": p.x,
                "y": p.y,
                "width": p.width,
                "height": p.height,
                "pixelRatio": p.pixel_ratio,
                "visible": p.visible,
            }),
        );
    }
    Value::Object(map)
}

/// Pretty-printed manifest text with a trailing newline.
pub fn to_json_string(manifest: &Manifest) -> Result<String> {
    let mut s = serde_json::to_string_pretty(&to_json(manifest))
        .map_err(|e| AtlasError::Encode(e.to_string()))?;
    s.push('\n');
    Ok(s)
}
