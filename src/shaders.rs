use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::rc::{Rc, Weak};

use crate::errors::Result;
use crate::material::{parse_material_file, CullMode, LayerTemplate, ShaderTemplate};
use crate::registry::Registry;
use crate::texture::{ImageLoader, Texture, TextureCache, SHADER_NOT_FOUND, TEXTURE_NOT_FOUND};

/// Registry paths configuring where material files live.
const RKEY_SHADER_BASEPATH: &str = "game/filesystem/shaders/basepath";
const RKEY_SHADER_EXTENSION: &str = "game/filesystem/shaders/extension";

/// Built-in stand-in images for missing bump/specular stages.
const FLAT_IMAGE: &str = "_flat";
const BLACK_IMAGE: &str = "_black";

/// OpenGL blend factors a material stage may name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColour,
    OneMinusSrcColour,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstColour,
    OneMinusDstColour,
    DstAlpha,
    OneMinusDstAlpha,
    SrcAlphaSaturate,
}

static BLEND_FACTORS: phf::Map<&'static str, BlendFactor> = phf::phf_map! {
    "gl_zero" => BlendFactor::Zero,
    "gl_one" => BlendFactor::One,
    "gl_src_color" => BlendFactor::SrcColour,
    "gl_one_minus_src_color" => BlendFactor::OneMinusSrcColour,
    "gl_src_alpha" => BlendFactor::SrcAlpha,
    "gl_one_minus_src_alpha" => BlendFactor::OneMinusSrcAlpha,
    "gl_dst_color" => BlendFactor::DstColour,
    "gl_one_minus_dst_color" => BlendFactor::OneMinusDstColour,
    "gl_dst_alpha" => BlendFactor::DstAlpha,
    "gl_one_minus_dst_alpha" => BlendFactor::OneMinusDstAlpha,
    "gl_src_alpha_saturate" => BlendFactor::SrcAlphaSaturate,
};

/// Map a textual blend factor to its enum value. Unrecognized tokens
/// blend to zero.
pub fn blend_factor_for_token(token: &str) -> BlendFactor {
    BLEND_FACTORS.get(token).copied().unwrap_or(BlendFactor::Zero)
}

/// A source/destination blend factor pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlendFunc {
    pub src: BlendFactor,
    pub dst: BlendFactor,
}

impl BlendFunc {
    pub fn new(src: BlendFactor, dst: BlendFactor) -> BlendFunc {
        BlendFunc { src, dst }
    }
}

impl Default for BlendFunc {
    fn default() -> BlendFunc {
        BlendFunc::new(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha)
    }
}

/// Resolve a stage's textual blend expression to GL factors.
pub fn evaluate_blend_func(expr: &(String, String)) -> BlendFunc {
    if !expr.1.is_empty() {
        return BlendFunc::new(
            blend_factor_for_token(&expr.0),
            blend_factor_for_token(&expr.1),
        );
    }
    match expr.0.as_str() {
        "add" => BlendFunc::new(BlendFactor::One, BlendFactor::One),
        "filter" => BlendFunc::new(BlendFactor::DstColour, BlendFactor::Zero),
        "blend" => BlendFunc::new(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha),
        _ => BlendFunc::new(BlendFactor::One, BlendFactor::Zero),
    }
}

/// One evaluated stage of a realised shader.
pub struct MapLayer {
    texture: Rc<Texture>,
    blend: BlendFunc,
    clamp_to_border: bool,
    alpha_test: f32,
}

impl MapLayer {
    pub fn texture(&self) -> &Rc<Texture> {
        &self.texture
    }

    pub fn blend_func(&self) -> BlendFunc {
        self.blend
    }

    pub fn clamp_to_border(&self) -> bool {
        self.clamp_to_border
    }

    pub fn alpha_test(&self) -> f32 {
        self.alpha_test
    }
}

/// A template together with the file it was parsed from. Synthesized
/// fallback definitions carry no filename.
pub struct ShaderDefinition {
    pub template: Rc<ShaderTemplate>,
    pub filename: Option<String>,
}

/// A realised material: its template bound to captured textures.
/// Dropping the last handle releases every capture.
pub struct Shader {
    name: String,
    template: Rc<ShaderTemplate>,
    filename: Option<String>,
    texture: Rc<Texture>,
    /// The failed capture kept alongside its placeholder substitute.
    not_found: Option<Rc<Texture>>,
    diffuse: Rc<Texture>,
    bump: Rc<Texture>,
    specular: Rc<Texture>,
    light_falloff: Rc<Texture>,
    layers: Vec<MapLayer>,
    blend: BlendFunc,
}

impl Shader {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True for shaders synthesized to wrap a plain texture.
    pub fn is_default(&self) -> bool {
        self.filename.is_none()
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// The editor display texture (placeholder when the real image is
    /// missing).
    pub fn texture(&self) -> &Rc<Texture> {
        &self.texture
    }

    pub fn not_found(&self) -> Option<&Rc<Texture>> {
        self.not_found.as_ref()
    }

    pub fn diffuse(&self) -> &Rc<Texture> {
        &self.diffuse
    }

    pub fn bump(&self) -> &Rc<Texture> {
        &self.bump
    }

    pub fn specular(&self) -> &Rc<Texture> {
        &self.specular
    }

    /// The light falloff texture, if the material defines one.
    pub fn light_falloff_image(&self) -> Option<&Rc<Texture>> {
        if self.template.light_falloff.is_empty() {
            None
        } else {
            Some(&self.light_falloff)
        }
    }

    pub fn layers(&self) -> &[MapLayer] {
        &self.layers
    }

    pub fn first_layer(&self) -> Option<&MapLayer> {
        self.layers.first()
    }

    pub fn blend_func(&self) -> BlendFunc {
        self.blend
    }

    pub fn cull(&self) -> CullMode {
        self.template.cull
    }

    pub fn is_translucent(&self) -> bool {
        self.template.translucent
    }

    pub fn trans(&self) -> f32 {
        self.template.trans
    }

    pub fn is_ambient_light(&self) -> bool {
        self.template.ambient_light
    }

    pub fn is_blend_light(&self) -> bool {
        self.template.blend_light
    }

    pub fn is_fog_light(&self) -> bool {
        self.template.fog_light
    }
}

/// Maps material names to definitions and realises them into shaders
/// with reference-counted texture ownership. Owns the texture cache;
/// construct one at startup and drop it at shutdown.
pub struct ShaderRegistry {
    definitions: BTreeMap<String, ShaderDefinition>,
    active: BTreeMap<String, Weak<Shader>>,
    textures: TextureCache,
    notify: Option<Box<dyn Fn()>>,
}

impl ShaderRegistry {
    pub fn new(loader: Box<dyn ImageLoader>) -> ShaderRegistry {
        ShaderRegistry {
            definitions: BTreeMap::new(),
            active: BTreeMap::new(),
            textures: TextureCache::new(loader),
            notify: None,
        }
    }

    /// Callback invoked whenever the active shader set changes. UI
    /// refresh only; nothing depends on it for correctness.
    pub fn set_active_changed_notify(&mut self, notify: Box<dyn Fn()>) {
        self.notify = Some(notify);
    }

    fn active_changed(&self) {
        if let Some(notify) = &self.notify {
            notify();
        }
    }

    /// Load every material file named by the game descriptor: the base
    /// path and extension are read from the registry, then each matching
    /// file under `fs_root` is parsed. Returns the number of templates
    /// parsed (duplicates included; they are discarded with a warning).
    pub fn load(&mut self, game: &Registry, fs_root: &Path) -> Result<usize> {
        let basepath = game.require(RKEY_SHADER_BASEPATH)?.content().to_owned();
        let extension = game.require(RKEY_SHADER_EXTENSION)?.content().to_owned();

        let dir = fs_root.join(basepath.trim_matches('/'));

        let mut files = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some(extension.as_str()) {
                files.push(path);
            }
        }
        files.sort();

        let mut defined = 0;
        for path in files {
            let file = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_owned();
            let source = fs::read_to_string(&path)?;

            // A malformed file loses its definitions but does not stop
            // the load.
            match parse_material_file(&file, &source) {
                Ok(templates) => {
                    for template in templates {
                        self.define(&file, template);
                        defined += 1;
                    }
                }
                Err(err) => log::error!("[shaders] {}", err),
            }
        }

        log::info!("[shaders] loaded {} definitions from {:?}", defined, dir);
        Ok(defined)
    }

    /// Insert a parsed definition. A name seen before keeps its first
    /// definition; the duplicate is logged and discarded.
    pub fn define(&mut self, filename: &str, template: ShaderTemplate) {
        let name = template.name.clone();
        if self.definitions.contains_key(&name) {
            log::warn!("[shaders] {}: shader {} already defined", filename, name);
            return;
        }
        self.definitions.insert(
            name,
            ShaderDefinition {
                template: Rc::new(template),
                filename: Some(filename.to_owned()),
            },
        );
    }

    pub fn definition_count(&self) -> usize {
        self.definitions.len()
    }

    pub fn for_each_name(&self, mut callback: impl FnMut(&str)) {
        for name in self.definitions.keys() {
            callback(name);
        }
    }

    /// Capture the named shader, realising it if it is not active.
    /// Unknown names get a synthesized texture-only definition rather
    /// than an error.
    pub fn capture(&mut self, name: &str) -> Rc<Shader> {
        if let Some(shader) = self.active.get(name).and_then(Weak::upgrade) {
            return shader;
        }

        let definition = self
            .definitions
            .entry(name.to_owned())
            .or_insert_with(|| ShaderDefinition {
                template: Rc::new(ShaderTemplate::default_for_texture(name)),
                filename: None,
            });

        let shader = Rc::new(realise(name, definition, &mut self.textures));
        self.active.insert(name.to_owned(), Rc::downgrade(&shader));
        self.active_changed();
        shader
    }

    /// Number of shaders currently held alive by at least one handle.
    pub fn active_count(&self) -> usize {
        self.active
            .values()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    pub fn texture_cache(&self) -> &TextureCache {
        &self.textures
    }

    /// Forget all definitions and active shaders, warning about any
    /// shader still referenced from outside.
    pub fn free_all(&mut self) {
        for (name, weak) in &self.active {
            if weak.strong_count() > 0 {
                log::warn!("shader \"{}\" still referenced", name);
            }
        }
        self.active.clear();
        self.definitions.clear();
        self.textures.prune();
        self.active_changed();
    }
}

/// Bind a definition's textures and resolve its blend state.
fn realise(name: &str, definition: &ShaderDefinition, cache: &mut TextureCache) -> Shader {
    let template = Rc::clone(&definition.template);
    let is_default = definition.filename.is_none();

    // Editor display texture; a failed load is replaced by the matching
    // "not found" placeholder and the failed capture is kept around.
    let editor = cache.capture(&template.editor_image);
    let (texture, not_found) = if editor.is_resident() {
        (editor, None)
    } else {
        let placeholder = cache.capture(if is_default {
            TEXTURE_NOT_FOUND
        } else {
            SHADER_NOT_FOUND
        });
        (placeholder, Some(editor))
    };

    let diffuse = cache.capture(&template.diffuse);

    let bump = cache.capture(&template.bump);
    let bump = if bump.is_resident() {
        bump
    } else {
        cache.capture(FLAT_IMAGE)
    };

    let specular = cache.capture(&template.specular);
    let specular = if specular.is_resident() {
        specular
    } else {
        cache.capture(BLACK_IMAGE)
    };

    let light_falloff = cache.capture(&template.light_falloff);
    if !template.light_falloff.is_empty() && !light_falloff.is_resident() {
        log::error!(
            "[shaders] {} : defines invalid lightfalloff \"{}\"",
            name,
            template.light_falloff
        );
    }

    let layers: Vec<MapLayer> = template
        .layers
        .iter()
        .map(|layer| evaluate_layer(layer, cache))
        .collect();

    let mut blend = BlendFunc::default();
    if let [layer] = template.layers.as_slice() {
        blend = single_layer_blend(&layer.blend, blend);
    }

    Shader {
        name: name.to_owned(),
        filename: definition.filename.clone(),
        template,
        texture,
        not_found,
        diffuse,
        bump,
        specular,
        light_falloff,
        layers,
        blend,
    }
}

fn evaluate_layer(template: &LayerTemplate, cache: &mut TextureCache) -> MapLayer {
    MapLayer {
        texture: cache.capture(&template.map),
        blend: evaluate_blend_func(&template.blend),
        clamp_to_border: template.clamp_to_border,
        alpha_test: template.alpha_test,
    }
}

/// Blend state for a single-layer shader: an explicit factor pair wins,
/// a preset keyword resolves to its pair, anything else keeps the
/// standard alpha blend.
fn single_layer_blend(expr: &(String, String), default: BlendFunc) -> BlendFunc {
    if !expr.1.is_empty() {
        return BlendFunc::new(
            blend_factor_for_token(&expr.0),
            blend_factor_for_token(&expr.1),
        );
    }
    match expr.0.as_str() {
        "add" => BlendFunc::new(BlendFactor::One, BlendFactor::One),
        "filter" => BlendFunc::new(BlendFactor::DstColour, BlendFactor::Zero),
        "blend" => BlendFunc::new(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha),
        _ => default,
    }
}
