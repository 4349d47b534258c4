use brushwork::material::{parse_material_file, CullMode};
use brushwork::tokeniser::DefTokeniser;

#[test]
fn tokeniser_basic_test() {
    let tokens: Vec<&str> = DefTokeniser::new("one two\tthree\n four").collect();
    assert_eq!(tokens, vec!["one", "two", "three", "four"]);
}

#[test]
fn tokeniser_braces_test() {
    // Braces delimit tokens even without surrounding whitespace.
    let tokens: Vec<&str> = DefTokeniser::new("name{key value}next").collect();
    assert_eq!(tokens, vec!["name", "{", "key", "value", "}", "next"]);
}

#[test]
fn tokeniser_comments_test() {
    let source = "a // line comment\nb /* block\ncomment */ c";
    let tokens: Vec<&str> = DefTokeniser::new(source).collect();
    assert_eq!(tokens, vec!["a", "b", "c"]);
}

#[test]
fn tokeniser_quoted_string_test() {
    let tokens: Vec<&str> = DefTokeniser::new("key \"a value with spaces\" next").collect();
    assert_eq!(tokens, vec!["key", "a value with spaces", "next"]);
}

#[test]
fn tokeniser_empty_input_test() {
    assert_eq!(DefTokeniser::new("  // nothing\n").next(), None);
}

#[test]
fn parse_single_material_test() {
    let source = r#"
textures/base_wall/concrete
{
    qer_editorimage textures/base_wall/concrete_ed.tga
    diffusemap      textures/base_wall/concrete_d.tga
    bumpmap         textures/base_wall/concrete_local.tga
    specularmap     textures/base_wall/concrete_s.tga
}
"#;
    let templates = parse_material_file("test.mtr", source).unwrap();
    assert_eq!(templates.len(), 1);

    let t = &templates[0];
    assert_eq!(t.name, "textures/base_wall/concrete");
    assert_eq!(t.editor_image, "textures/base_wall/concrete_ed.tga");
    assert_eq!(t.diffuse, "textures/base_wall/concrete_d.tga");
    assert_eq!(t.bump, "textures/base_wall/concrete_local.tga");
    assert_eq!(t.specular, "textures/base_wall/concrete_s.tga");
    assert_eq!(t.cull, CullMode::Back);
    assert!(!t.translucent);
    assert!(t.layers.is_empty());
}

#[test]
fn parse_material_flags_test() {
    let source = r#"
lights/spark
{
    lightFalloffImage makeintensity(lights/spark_falloff.tga)
    qer_trans 0.5
    twosided
    fogLight
}
"#;
    let templates = parse_material_file("lights.mtr", source).unwrap();
    let t = &templates[0];
    assert_eq!(t.light_falloff, "makeintensity(lights/spark_falloff.tga)");
    assert_eq!(t.trans, 0.5);
    assert!(t.translucent);
    assert_eq!(t.cull, CullMode::None);
    assert!(t.fog_light);
    assert!(!t.ambient_light);
    assert!(!t.blend_light);
}

#[test]
fn parse_layers_test() {
    let source = r#"
textures/sfx/glowing
{
    diffusemap textures/sfx/glowing_d.tga
    {
        blend add
        map textures/sfx/glow.tga
    }
    {
        blend gl_dst_color, gl_zero
        map textures/sfx/dirt.tga
        alphatest 0.25
        zeroclamp
    }
}
"#;
    let templates = parse_material_file("sfx.mtr", source).unwrap();
    let t = &templates[0];
    assert_eq!(t.layers.len(), 2);

    assert_eq!(t.layers[0].blend, ("add".to_owned(), String::new()));
    assert_eq!(t.layers[0].map, "textures/sfx/glow.tga");
    assert_eq!(t.layers[0].alpha_test, -1.0);
    assert!(!t.layers[0].clamp_to_border);

    assert_eq!(
        t.layers[1].blend,
        ("gl_dst_color".to_owned(), "gl_zero".to_owned())
    );
    assert_eq!(t.layers[1].map, "textures/sfx/dirt.tga");
    assert_eq!(t.layers[1].alpha_test, 0.25);
    assert!(t.layers[1].clamp_to_border);
}

#[test]
fn parse_skips_unknown_keywords_and_blocks_test() {
    let source = r#"
textures/base_wall/panel
{
    description "a wall panel"
    noFragment
    diffusemap textures/base_wall/panel_d.tga
    {
        if parm11
        blend blend
        map textures/base_wall/panel_spec.tga
        {
            vertexProgram heatHaze.vfp
        }
    }
}
"#;
    let templates = parse_material_file("walls.mtr", source).unwrap();
    let t = &templates[0];
    assert_eq!(t.diffuse, "textures/base_wall/panel_d.tga");
    assert_eq!(t.layers.len(), 1);
    assert_eq!(t.layers[0].blend.0, "blend");
}

#[test]
fn parse_multiple_materials_test() {
    let source = r#"
textures/a { diffusemap textures/a_d.tga }
textures/b { diffusemap textures/b_d.tga }
"#;
    let templates = parse_material_file("two.mtr", source).unwrap();
    assert_eq!(templates.len(), 2);
    assert_eq!(templates[0].name, "textures/a");
    assert_eq!(templates[1].name, "textures/b");
}

#[test]
fn parse_skips_tables_test() {
    let source = r#"
table sinTable { { 0, 0.5, 1, 0.5 } }
textures/c { diffusemap textures/c_d.tga }
"#;
    let templates = parse_material_file("tables.mtr", source).unwrap();
    assert_eq!(templates.len(), 1);
    assert_eq!(templates[0].name, "textures/c");
}

#[test]
fn parse_unterminated_block_test() {
    assert!(parse_material_file("bad.mtr", "textures/bad {").is_err());
}

#[test]
fn parse_missing_brace_test() {
    assert!(parse_material_file("bad.mtr", "textures/bad diffusemap x").is_err());
}
