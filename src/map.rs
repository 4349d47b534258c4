use crate::brush::Brush;

/// A bicubic patch primitive. Only its identity is carried through the
/// portable format, but the shader and control dimensions are kept so a
/// native-format exporter can be fed from the same scene.
#[derive(Clone, Debug, PartialEq)]
pub struct Patch {
    pub shader: String,
    pub width: usize,
    pub height: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    Brush(Brush),
    Patch(Patch),
}

/// A map entity: an ordered key/value store plus the primitives it owns.
/// Key order is first-insertion order and is preserved through export.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Entity {
    key_values: Vec<(String, String)>,
    pub primitives: Vec<Primitive>,
}

impl Entity {
    pub fn new() -> Entity {
        Entity::default()
    }

    /// Set a key, updating in place if it already exists.
    pub fn set_key_value(&mut self, key: &str, value: &str) {
        for (existing, existing_value) in &mut self.key_values {
            if existing == key {
                *existing_value = value.to_owned();
                return;
            }
        }
        self.key_values.push((key.to_owned(), value.to_owned()));
    }

    pub fn key_value(&self, key: &str) -> Option<&str> {
        self.key_values
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn key_values(&self) -> &[(String, String)] {
        &self.key_values
    }

    pub fn for_each_key_value(&self, mut callback: impl FnMut(&str, &str)) {
        for (key, value) in &self.key_values {
            callback(key, value);
        }
    }

    pub fn classname(&self) -> &str {
        self.key_value("classname").unwrap_or("")
    }
}

/// An in-memory scene: entities in document order, each owning its
/// primitives in traversal order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MapFile {
    pub entities: Vec<Entity>,
}

impl MapFile {
    pub fn new() -> MapFile {
        MapFile::default()
    }
}
