use crate::errors::{Error, Result};
use crate::tokeniser::DefTokeniser;

/// Face culling mode of a material.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CullMode {
    /// Cull back faces (the idTech default).
    #[default]
    Back,
    Front,
    /// Draw both sides.
    None,
}

/// One blended texture stage of a material, as written in the source.
/// The blend expression keeps its textual form; it is resolved to GL
/// factors when the shader is realised.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerTemplate {
    /// Either a preset keyword with an empty second component, or an
    /// explicit source/destination factor pair.
    pub blend: (String, String),
    pub map: String,
    pub clamp_to_border: bool,
    /// Alpha test reference value; negative when disabled.
    pub alpha_test: f32,
}

impl Default for LayerTemplate {
    fn default() -> LayerTemplate {
        LayerTemplate {
            blend: (String::new(), String::new()),
            map: String::new(),
            clamp_to_border: false,
            alpha_test: -1.0,
        }
    }
}

/// A named material definition parsed from a definition file, or
/// synthesized for a texture that has none.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShaderTemplate {
    pub name: String,
    /// Texture shown in the editor viewports (qer_editorimage).
    pub editor_image: String,
    pub diffuse: String,
    pub bump: String,
    pub specular: String,
    pub light_falloff: String,
    pub layers: Vec<LayerTemplate>,
    pub cull: CullMode,
    pub translucent: bool,
    pub trans: f32,
    pub ambient_light: bool,
    pub blend_light: bool,
    pub fog_light: bool,
}

impl ShaderTemplate {
    /// The fallback definition for a name no material file mentions:
    /// display the texture of the same name.
    pub fn default_for_texture(name: &str) -> ShaderTemplate {
        ShaderTemplate {
            name: name.to_owned(),
            editor_image: name.to_owned(),
            diffuse: name.to_owned(),
            ..Default::default()
        }
    }

    /// Parse the body of a material block. The name and opening brace
    /// have already been consumed.
    pub fn parse(name: &str, tok: &mut DefTokeniser) -> Result<ShaderTemplate> {
        let mut template = ShaderTemplate {
            name: name.to_owned(),
            ..Default::default()
        };

        loop {
            let token = next_token(name, tok)?;
            match token.to_ascii_lowercase().as_str() {
                "}" => break,
                "{" => {
                    let layer = parse_layer(name, tok)?;
                    template.layers.push(layer);
                }
                "qer_editorimage" => template.editor_image = next_token(name, tok)?.to_owned(),
                "diffusemap" => template.diffuse = next_token(name, tok)?.to_owned(),
                "bumpmap" => template.bump = next_token(name, tok)?.to_owned(),
                "specularmap" => template.specular = next_token(name, tok)?.to_owned(),
                "lightfalloffimage" => {
                    template.light_falloff = next_token(name, tok)?.to_owned()
                }
                "qer_trans" => {
                    template.trans = parse_float(name, next_token(name, tok)?)?;
                    template.translucent = true;
                }
                "translucent" => template.translucent = true,
                "twosided" => template.cull = CullMode::None,
                "cull" => {
                    template.cull = match next_token(name, tok)?.to_ascii_lowercase().as_str() {
                        "none" | "twosided" | "disable" => CullMode::None,
                        "front" | "frontsided" => CullMode::Front,
                        _ => CullMode::Back,
                    }
                }
                "ambientlight" => template.ambient_light = true,
                "blendlight" => template.blend_light = true,
                "foglight" => template.fog_light = true,
                // Anything else is a keyword this editor doesn't care
                // about; material files carry plenty of them.
                _ => {}
            }
        }

        Ok(template)
    }
}

fn next_token<'a>(name: &str, tok: &mut DefTokeniser<'a>) -> Result<&'a str> {
    tok.next()
        .ok_or_else(|| Error::parse(name, "unexpected end of material definition"))
}

fn parse_float(name: &str, token: &str) -> Result<f32> {
    token
        .parse::<f32>()
        .map_err(|_| Error::parse(name, format!("expected a number, found \"{}\"", token)))
}

fn parse_layer(name: &str, tok: &mut DefTokeniser) -> Result<LayerTemplate> {
    let mut layer = LayerTemplate::default();

    loop {
        let token = next_token(name, tok)?;
        match token.to_ascii_lowercase().as_str() {
            "}" => break,
            "{" => skip_block(name, tok)?,
            "blend" => {
                let first = next_token(name, tok)?.to_ascii_lowercase();
                // A two-factor expression is written "src, dst"; the
                // comma travels with the first token.
                if let Some(src) = first.strip_suffix(',') {
                    let dst = next_token(name, tok)?.to_ascii_lowercase();
                    layer.blend = (src.to_owned(), dst);
                } else {
                    layer.blend = (first, String::new());
                }
            }
            "map" => layer.map = next_token(name, tok)?.to_owned(),
            "alphatest" => layer.alpha_test = parse_float(name, next_token(name, tok)?)?,
            "zeroclamp" | "clamp" => layer.clamp_to_border = true,
            _ => {}
        }
    }

    Ok(layer)
}

/// Consume a balanced `{ ... }` block whose opening brace has been read.
fn skip_block(name: &str, tok: &mut DefTokeniser) -> Result<()> {
    let mut depth = 1;
    while depth > 0 {
        match next_token(name, tok)? {
            "{" => depth += 1,
            "}" => depth -= 1,
            _ => {}
        }
    }
    Ok(())
}

/// Parse a whole material file: a sequence of `name { ... }` blocks.
/// `table` blocks are recognized and skipped.
pub fn parse_material_file(file: &str, source: &str) -> Result<Vec<ShaderTemplate>> {
    let mut tok = DefTokeniser::new(source);
    let mut templates = Vec::new();

    while let Some(token) = tok.next() {
        if token.eq_ignore_ascii_case("table") {
            // table <name> { ... }
            let name = next_token(file, &mut tok)?;
            match next_token(file, &mut tok)? {
                "{" => skip_block(file, &mut tok)?,
                other => {
                    return Err(Error::parse(
                        file,
                        format!("expected \"{{\" after table {}, found \"{}\"", name, other),
                    ))
                }
            }
            continue;
        }

        match next_token(file, &mut tok)? {
            "{" => templates.push(ShaderTemplate::parse(token, &mut tok)?),
            other => {
                return Err(Error::parse(
                    file,
                    format!("expected \"{{\" after {}, found \"{}\"", token, other),
                ))
            }
        }
    }

    Ok(templates)
}
