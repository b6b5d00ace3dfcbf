use std::collections::HashMap;

use serde::Serialize;

pub const GENERATED_IMAGE_ELEMENT: &str = "GeneratedImage";
pub const GENERATED_IMAGE_SIZE: u32 = 512;

/// Source of the named text inputs the generator reads.
///
/// `None` means the field does not exist at all, which is different from a
/// field holding the empty string.
pub trait FormFields {
    fn field_value(&self, name: &str) -> Option<String>;
}

impl FormFields for HashMap<String, String> {
    fn field_value(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Element that renders the fetched image. The generator only ever writes
/// these three properties and never reads them back.
pub trait DisplaySurface {
    fn set_source(&mut self, source: String);
    fn set_height(&mut self, height: u32);
    fn set_width(&mut self, width: u32);
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GeneratedImage {
    pub source: Option<String>,
    pub height: u32,
    pub width: u32,
}

impl GeneratedImage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DisplaySurface for GeneratedImage {
    fn set_source(&mut self, source: String) {
        self.source = Some(source);
    }

    fn set_height(&mut self, height: u32) {
        self.height = height;
    }

    fn set_width(&mut self, width: u32) {
        self.width = width;
    }
}
