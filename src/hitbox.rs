//! Hitbox definition files written by the hitbox editor.
//!
//! A missing or malformed file degrades to an empty shape list; the entity
//! then simply never collides.

use std::fs;
use std::path::Path;

use crate::components::ShapeDef;

pub fn parse_hitbox(text: &str) -> Result<Vec<ShapeDef>, serde_json::Error> {
    serde_json::from_str(text)
}

pub fn load_hitbox(path: impl AsRef<Path>) -> Vec<ShapeDef> {
    let path = path.as_ref();
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            log::warn!("hitbox file {} unreadable: {err}", path.display());
            return Vec::new();
        }
    };
    match parse_hitbox(&text) {
        Ok(shapes) => shapes,
        Err(err) => {
            log::warn!("hitbox file {} is invalid: {err}", path.display());
            Vec::new()
        }
    }
}
