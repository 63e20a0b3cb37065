use serde::Deserialize;
use serde::Serialize;

/// Named field rectangle. Presets are seeded at migration and never change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPreset {
    pub name: String,
    pub width: i32,
    pub height: i32,
}

impl std::fmt::Display for FieldPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}x{})", self.name, self.width, self.height)
    }
}
