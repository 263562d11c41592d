//! Options normalisation applied before anything reaches the native layer.
//!
//! Color-valued keys (`color`, `backgroundColor`, `selectedIconColor`, ...) are
//! converted from CSS-style strings into packed `0xAARRGGBB` integers, which is
//! what the native side consumes.

use serde_json::Value;

use crate::error::{NavigationError, Result};

const NAMED_COLORS: &[(&str, u32)] = &[
    ("transparent", 0x0000_0000),
    ("black", 0xFF00_0000),
    ("white", 0xFFFF_FFFF),
    ("red", 0xFFFF_0000),
    ("green", 0xFF00_8000),
    ("blue", 0xFF00_00FF),
    ("yellow", 0xFFFF_FF00),
    ("gray", 0xFF80_8080),
    ("grey", 0xFF80_8080),
];

/// Walk an options value in place, normalising every color key.
pub fn process_options(options: &mut Value) -> Result<()> {
    walk(options, "")
}

fn walk(value: &mut Value, path: &str) -> Result<()> {
    match value {
        Value::Object(map) => {
            for (key, entry) in map.iter_mut() {
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                if is_color_key(key) {
                    if let Value::String(raw) = entry {
                        let argb = parse_color(raw).ok_or_else(|| {
                            NavigationError::transform(format!(
                                "invalid color `{raw}` at `{child_path}`"
                            ))
                        })?;
                        *entry = Value::from(argb);
                        continue;
                    }
                }
                walk(entry, &child_path)?;
            }
            Ok(())
        }
        Value::Array(items) => {
            for (idx, item) in items.iter_mut().enumerate() {
                walk(item, &format!("{path}[{idx}]"))?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn is_color_key(key: &str) -> bool {
    key == "color" || key.ends_with("Color")
}

/// Parse `#RGB`, `#RRGGBB`, `#RRGGBBAA` or a named color into `0xAARRGGBB`.
pub fn parse_color(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    if let Some(hex) = trimmed.strip_prefix('#') {
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        return match hex.len() {
            3 => {
                let expanded: String = hex.chars().flat_map(|c| [c, c]).collect();
                u32::from_str_radix(&expanded, 16).ok().map(|rgb| 0xFF00_0000 | rgb)
            }
            6 => u32::from_str_radix(hex, 16).ok().map(|rgb| 0xFF00_0000 | rgb),
            8 => u32::from_str_radix(hex, 16)
                .ok()
                .map(|rgba| (rgba >> 8) | ((rgba & 0xFF) << 24)),
            _ => None,
        };
    }

    let lower = trimmed.to_ascii_lowercase();
    NAMED_COLORS
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, argb)| *argb)
}
