use std::cell::Cell;
use std::collections::HashSet;
use std::fs;
use std::rc::Rc;

use brushwork::material::{LayerTemplate, ShaderTemplate};
use brushwork::registry::Registry;
use brushwork::shaders::{blend_factor_for_token, BlendFactor, BlendFunc, ShaderRegistry};
use brushwork::texture::{Image, ImageLoader, NullImageLoader, SHADER_NOT_FOUND, TEXTURE_NOT_FOUND};
use brushwork::Error;

/// Loader that only knows a fixed set of names.
struct FixedLoader {
    names: HashSet<String>,
}

impl FixedLoader {
    fn new(names: &[&str]) -> Box<FixedLoader> {
        Box::new(FixedLoader {
            names: names.iter().map(|n| (*n).to_owned()).collect(),
        })
    }
}

impl ImageLoader for FixedLoader {
    fn load(&self, name: &str) -> Option<Image> {
        self.names.contains(name).then(|| Image {
            width: 128,
            height: 128,
            pixels: vec![0; 128 * 128 * 4],
        })
    }
}

#[test]
fn blend_factor_tokens_test() {
    assert_eq!(blend_factor_for_token("gl_zero"), BlendFactor::Zero);
    assert_eq!(blend_factor_for_token("gl_one"), BlendFactor::One);
    assert_eq!(blend_factor_for_token("gl_src_color"), BlendFactor::SrcColour);
    assert_eq!(
        blend_factor_for_token("gl_one_minus_src_color"),
        BlendFactor::OneMinusSrcColour
    );
    assert_eq!(blend_factor_for_token("gl_src_alpha"), BlendFactor::SrcAlpha);
    assert_eq!(
        blend_factor_for_token("gl_one_minus_src_alpha"),
        BlendFactor::OneMinusSrcAlpha
    );
    assert_eq!(blend_factor_for_token("gl_dst_color"), BlendFactor::DstColour);
    assert_eq!(
        blend_factor_for_token("gl_one_minus_dst_color"),
        BlendFactor::OneMinusDstColour
    );
    assert_eq!(blend_factor_for_token("gl_dst_alpha"), BlendFactor::DstAlpha);
    assert_eq!(
        blend_factor_for_token("gl_one_minus_dst_alpha"),
        BlendFactor::OneMinusDstAlpha
    );
    assert_eq!(
        blend_factor_for_token("gl_src_alpha_saturate"),
        BlendFactor::SrcAlphaSaturate
    );
}

#[test]
fn blend_factor_unknown_token_test() {
    assert_eq!(blend_factor_for_token("gl_bogus"), BlendFactor::Zero);
    assert_eq!(blend_factor_for_token(""), BlendFactor::Zero);
}

#[test]
fn capture_unknown_name_test() {
    // An unknown name synthesizes a texture-backed default definition.
    let mut registry = ShaderRegistry::new(Box::new(NullImageLoader));
    let shader = registry.capture("textures/missing");

    assert_eq!(shader.name(), "textures/missing");
    assert!(shader.is_default());
    assert_eq!(shader.filename(), None);
    // Nothing loads, so the plain-texture placeholder stands in.
    assert_eq!(shader.texture().name(), TEXTURE_NOT_FOUND);
    assert!(shader.not_found().is_some());
}

#[test]
fn capture_defined_shader_missing_image_test() {
    let mut registry = ShaderRegistry::new(Box::new(NullImageLoader));
    registry.define(
        "walls.mtr",
        ShaderTemplate {
            name: "textures/wall".to_owned(),
            editor_image: "textures/wall_ed".to_owned(),
            ..Default::default()
        },
    );

    let shader = registry.capture("textures/wall");
    assert!(!shader.is_default());
    assert_eq!(shader.filename(), Some("walls.mtr"));
    // Defined materials fall back to the shader placeholder.
    assert_eq!(shader.texture().name(), SHADER_NOT_FOUND);
}

#[test]
fn capture_resident_texture_test() {
    let mut registry = ShaderRegistry::new(FixedLoader::new(&["textures/wall_ed"]));
    registry.define(
        "walls.mtr",
        ShaderTemplate {
            name: "textures/wall".to_owned(),
            editor_image: "textures/wall_ed".to_owned(),
            ..Default::default()
        },
    );

    let shader = registry.capture("textures/wall");
    assert_eq!(shader.texture().name(), "textures/wall_ed");
    assert!(shader.texture().is_resident());
    assert_eq!(shader.texture().width(), 128);
    assert!(shader.not_found().is_none());
}

#[test]
fn bump_and_specular_fallback_test() {
    let mut registry = ShaderRegistry::new(Box::new(NullImageLoader));
    registry.define(
        "walls.mtr",
        ShaderTemplate {
            name: "textures/wall".to_owned(),
            bump: "textures/wall_local".to_owned(),
            specular: "textures/wall_s".to_owned(),
            ..Default::default()
        },
    );

    let shader = registry.capture("textures/wall");
    assert_eq!(shader.bump().name(), "_flat");
    assert_eq!(shader.specular().name(), "_black");
}

#[test]
fn light_falloff_accessor_test() {
    let mut registry = ShaderRegistry::new(Box::new(NullImageLoader));
    registry.define(
        "lights.mtr",
        ShaderTemplate {
            name: "lights/spot".to_owned(),
            light_falloff: "lights/spot_falloff".to_owned(),
            ..Default::default()
        },
    );

    let spot = registry.capture("lights/spot");
    assert!(spot.light_falloff_image().is_some());

    let plain = registry.capture("textures/plain");
    assert!(plain.light_falloff_image().is_none());
}

#[test]
fn default_blend_func_test() {
    let mut registry = ShaderRegistry::new(Box::new(NullImageLoader));
    let shader = registry.capture("textures/plain");
    assert_eq!(
        shader.blend_func(),
        BlendFunc::new(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha)
    );
}

fn single_layer_template(name: &str, blend: (&str, &str)) -> ShaderTemplate {
    ShaderTemplate {
        name: name.to_owned(),
        layers: vec![LayerTemplate {
            blend: (blend.0.to_owned(), blend.1.to_owned()),
            map: "textures/layer".to_owned(),
            ..Default::default()
        }],
        ..Default::default()
    }
}

#[test]
fn single_layer_blend_presets_test() {
    let mut registry = ShaderRegistry::new(Box::new(NullImageLoader));
    registry.define("fx.mtr", single_layer_template("fx/add", ("add", "")));
    registry.define("fx.mtr", single_layer_template("fx/filter", ("filter", "")));
    registry.define("fx.mtr", single_layer_template("fx/blend", ("blend", "")));
    registry.define("fx.mtr", single_layer_template("fx/other", ("bumpmap", "")));

    assert_eq!(
        registry.capture("fx/add").blend_func(),
        BlendFunc::new(BlendFactor::One, BlendFactor::One)
    );
    assert_eq!(
        registry.capture("fx/filter").blend_func(),
        BlendFunc::new(BlendFactor::DstColour, BlendFactor::Zero)
    );
    assert_eq!(
        registry.capture("fx/blend").blend_func(),
        BlendFunc::new(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha)
    );
    // Unrecognized single expressions keep the standard alpha blend.
    assert_eq!(
        registry.capture("fx/other").blend_func(),
        BlendFunc::new(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha)
    );
}

#[test]
fn single_layer_explicit_blend_test() {
    let mut registry = ShaderRegistry::new(Box::new(NullImageLoader));
    registry.define(
        "fx.mtr",
        single_layer_template("fx/explicit", ("gl_one", "gl_src_alpha")),
    );

    let shader = registry.capture("fx/explicit");
    assert_eq!(
        shader.blend_func(),
        BlendFunc::new(BlendFactor::One, BlendFactor::SrcAlpha)
    );
    assert_eq!(shader.layers().len(), 1);
    assert_eq!(
        shader.layers()[0].blend_func(),
        BlendFunc::new(BlendFactor::One, BlendFactor::SrcAlpha)
    );
}

#[test]
fn capture_returns_same_shader_test() {
    let mut registry = ShaderRegistry::new(Box::new(NullImageLoader));
    let first = registry.capture("textures/wall");
    let second = registry.capture("textures/wall");
    assert!(Rc::ptr_eq(&first, &second));
    assert_eq!(registry.active_count(), 1);
}

#[test]
fn release_on_zero_test() {
    let mut registry = ShaderRegistry::new(Box::new(NullImageLoader));
    let shader = registry.capture("textures/wall");
    assert_eq!(registry.active_count(), 1);

    drop(shader);
    assert_eq!(registry.active_count(), 0);

    // A fresh capture realises a new instance.
    let again = registry.capture("textures/wall");
    assert_eq!(registry.active_count(), 1);
    drop(again);
}

#[test]
fn shared_texture_capture_test() {
    let mut registry = ShaderRegistry::new(FixedLoader::new(&["textures/shared_d"]));
    registry.define(
        "a.mtr",
        ShaderTemplate {
            name: "textures/a".to_owned(),
            diffuse: "textures/shared_d".to_owned(),
            ..Default::default()
        },
    );
    registry.define(
        "b.mtr",
        ShaderTemplate {
            name: "textures/b".to_owned(),
            diffuse: "textures/shared_d".to_owned(),
            ..Default::default()
        },
    );

    let a = registry.capture("textures/a");
    let b = registry.capture("textures/b");
    assert!(Rc::ptr_eq(a.diffuse(), b.diffuse()));
}

#[test]
fn duplicate_definition_first_wins_test() {
    let mut registry = ShaderRegistry::new(Box::new(NullImageLoader));
    registry.define(
        "first.mtr",
        ShaderTemplate {
            name: "textures/dup".to_owned(),
            diffuse: "textures/first_d".to_owned(),
            ..Default::default()
        },
    );
    registry.define(
        "second.mtr",
        ShaderTemplate {
            name: "textures/dup".to_owned(),
            diffuse: "textures/second_d".to_owned(),
            ..Default::default()
        },
    );

    assert_eq!(registry.definition_count(), 1);
    let shader = registry.capture("textures/dup");
    assert_eq!(shader.filename(), Some("first.mtr"));
    assert_eq!(shader.diffuse().name(), "textures/first_d");
}

#[test]
fn active_changed_notify_test() {
    let mut registry = ShaderRegistry::new(Box::new(NullImageLoader));
    let count = Rc::new(Cell::new(0));
    let observed = Rc::clone(&count);
    registry.set_active_changed_notify(Box::new(move || observed.set(observed.get() + 1)));

    let shader = registry.capture("textures/one");
    assert_eq!(count.get(), 1);

    // A repeat capture of a live shader does not mutate the active set.
    let _again = registry.capture("textures/one");
    assert_eq!(count.get(), 1);

    drop(shader);
    drop(_again);
    registry.free_all();
    assert_eq!(count.get(), 2);
}

#[test]
fn free_all_test() {
    let mut registry = ShaderRegistry::new(Box::new(NullImageLoader));
    registry.define(
        "walls.mtr",
        ShaderTemplate {
            name: "textures/wall".to_owned(),
            ..Default::default()
        },
    );

    // Holding a reference across free_all is legal; the handle keeps the
    // shader alive, the registry merely forgets it.
    let shader = registry.capture("textures/wall");
    registry.free_all();

    assert_eq!(registry.definition_count(), 0);
    assert_eq!(registry.active_count(), 0);
    assert_eq!(shader.name(), "textures/wall");
}

#[test]
fn for_each_name_test() {
    let mut registry = ShaderRegistry::new(Box::new(NullImageLoader));
    for name in ["textures/b", "textures/a", "textures/c"] {
        registry.define(
            "walls.mtr",
            ShaderTemplate {
                name: name.to_owned(),
                ..Default::default()
            },
        );
    }

    let mut names = Vec::new();
    registry.for_each_name(|name| names.push(name.to_owned()));
    assert_eq!(names, vec!["textures/a", "textures/b", "textures/c"]);
}

#[test]
fn load_from_game_descriptor_test() {
    let dir = std::env::temp_dir().join(format!("brushwork_shaders_{}", std::process::id()));
    let materials = dir.join("materials");
    fs::create_dir_all(&materials).unwrap();
    fs::write(
        materials.join("a.mtr"),
        "textures/a { diffusemap textures/a_d.tga }\ntextures/dup { diffusemap textures/a_dup.tga }\n",
    )
    .unwrap();
    fs::write(
        materials.join("b.mtr"),
        "textures/b { diffusemap textures/b_d.tga }\ntextures/dup { diffusemap textures/b_dup.tga }\n",
    )
    .unwrap();
    // Files with other extensions are ignored.
    fs::write(materials.join("readme.txt"), "not a material file").unwrap();

    let game = Registry::from_str(
        "<game><filesystem><shaders>\
         <basepath>materials</basepath>\
         <extension>mtr</extension>\
         </shaders></filesystem></game>",
    )
    .unwrap();

    let mut registry = ShaderRegistry::new(Box::new(NullImageLoader));
    registry.load(&game, &dir).unwrap();

    assert_eq!(registry.definition_count(), 3);
    // Files parse in name order, so a.mtr's duplicate wins.
    let dup = registry.capture("textures/dup");
    assert_eq!(dup.diffuse().name(), "textures/a_dup.tga");

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn load_missing_config_node_test() {
    let game = Registry::from_str(
        "<game><filesystem><shaders><basepath>materials</basepath></shaders></filesystem></game>",
    )
    .unwrap();

    let mut registry = ShaderRegistry::new(Box::new(NullImageLoader));
    let err = registry.load(&game, std::env::temp_dir().as_path()).unwrap_err();
    assert!(matches!(err, Error::MissingGameNode { .. }));
}
