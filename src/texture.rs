use std::collections::HashMap;
use std::rc::{Rc, Weak};

/// Placeholder texture shown for material definitions whose image could
/// not be loaded.
pub const SHADER_NOT_FOUND: &str = "shadernotex";
/// Placeholder for plain textures without a material definition.
pub const TEXTURE_NOT_FOUND: &str = "notex";

/// Side length of the synthesized placeholder image.
const PLACEHOLDER_SIZE: u32 = 64;

/// Decoded RGBA image data handed over by an [`ImageLoader`].
pub struct Image {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Loads raw images by texture name. The GPU upload itself lives outside
/// this crate; editors plug their VFS and decoders in here.
pub trait ImageLoader {
    fn load(&self, name: &str) -> Option<Image>;
}

/// A loader with no images; every capture falls back to placeholders.
pub struct NullImageLoader;

impl ImageLoader for NullImageLoader {
    fn load(&self, _name: &str) -> Option<Image> {
        None
    }
}

/// A captured texture. Handles are reference counted; dropping the last
/// one releases the underlying resource.
#[derive(Debug)]
pub struct Texture {
    name: String,
    width: u32,
    height: u32,
    /// False when this entry stands in for an image that failed to load.
    resident: bool,
}

impl Texture {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_resident(&self) -> bool {
        self.resident
    }
}

/// Caches captured textures by name. The cache holds weak references
/// only, so a texture is released as soon as the last shader using it
/// lets go; a later capture loads it again.
pub struct TextureCache {
    loader: Box<dyn ImageLoader>,
    textures: HashMap<String, Weak<Texture>>,
}

impl TextureCache {
    pub fn new(loader: Box<dyn ImageLoader>) -> TextureCache {
        TextureCache {
            loader,
            textures: HashMap::new(),
        }
    }

    /// Capture the named texture, loading it if no live handle exists.
    /// A failed load yields a non-resident placeholder entry instead of
    /// an error.
    pub fn capture(&mut self, name: &str) -> Rc<Texture> {
        if let Some(texture) = self.textures.get(name).and_then(Weak::upgrade) {
            return texture;
        }

        let texture = match self.loader.load(name) {
            Some(image) => Rc::new(Texture {
                name: name.to_owned(),
                width: image.width,
                height: image.height,
                resident: true,
            }),
            None => Rc::new(Texture {
                name: name.to_owned(),
                width: PLACEHOLDER_SIZE,
                height: PLACEHOLDER_SIZE,
                resident: false,
            }),
        };

        self.textures.insert(name.to_owned(), Rc::downgrade(&texture));
        texture
    }

    /// Number of textures currently held alive by at least one handle.
    pub fn active_count(&self) -> usize {
        self.textures
            .values()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    /// Drop cache entries whose textures have been released.
    pub fn prune(&mut self) {
        self.textures.retain(|_, weak| weak.strong_count() > 0);
    }
}
