use std::io;

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use crate::brush::Brush;
use crate::errors::Result;
use crate::map::{Entity, MapFile, Patch, Primitive};

/// Sanitize a float for export: NaN, the infinities and negative zero
/// all become the literal "0" so the document always parses back.
pub fn safe_double(d: f64) -> String {
    if !d.is_finite() {
        return "0".to_owned();
    }
    if d == 0.0 {
        // Covers -0.0 as well.
        return "0".to_owned();
    }
    d.to_string()
}

/// Serializes a scene into the portable XML map format. Entities and
/// primitives are numbered positionally: a per-document entity counter
/// and a per-entity primitive counter, both starting at zero. Numbers
/// are not stable across re-saves of an edited map.
pub struct PortableMapWriter {
    entity_count: usize,
    primitive_count: usize,
}

impl Default for PortableMapWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PortableMapWriter {
    pub fn new() -> PortableMapWriter {
        PortableMapWriter {
            entity_count: 0,
            primitive_count: 0,
        }
    }

    /// Write the document to a stream, indented two spaces per level.
    pub fn write(mut self, map: &MapFile, out: impl io::Write) -> Result<()> {
        let mut writer = Writer::new_with_indent(out, b' ', 2);

        writer.write_event(Event::Start(BytesStart::new("map")))?;
        for entity in &map.entities {
            self.write_entity(&mut writer, entity)?;
        }
        writer.write_event(Event::End(BytesEnd::new("map")))?;

        Ok(())
    }

    pub fn write_to_string(self, map: &MapFile) -> Result<String> {
        let mut buffer = Vec::new();
        self.write(map, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    fn write_entity(&mut self, w: &mut Writer<impl io::Write>, entity: &Entity) -> Result<()> {
        let mut tag = BytesStart::new("entity");
        tag.push_attribute(("number", self.entity_count.to_string().as_str()));
        self.entity_count += 1;

        w.write_event(Event::Start(tag))?;

        w.write_event(Event::Start(BytesStart::new("primitives")))?;
        for primitive in &entity.primitives {
            match primitive {
                Primitive::Brush(brush) => self.write_brush(w, brush)?,
                Primitive::Patch(patch) => self.write_patch(w, patch)?,
            }
        }
        w.write_event(Event::End(BytesEnd::new("primitives")))?;

        w.write_event(Event::Start(BytesStart::new("keyValues")))?;
        for (key, value) in entity.key_values() {
            let mut kv = BytesStart::new("keyValue");
            kv.push_attribute(("key", key.as_str()));
            kv.push_attribute(("value", value.as_str()));
            w.write_event(Event::Empty(kv))?;
        }
        w.write_event(Event::End(BytesEnd::new("keyValues")))?;

        w.write_event(Event::End(BytesEnd::new("entity")))?;

        // Primitive numbering restarts with every entity.
        self.primitive_count = 0;
        Ok(())
    }

    fn write_brush(&mut self, w: &mut Writer<impl io::Write>, brush: &Brush) -> Result<()> {
        let mut tag = BytesStart::new("brush");
        tag.push_attribute(("number", self.primitive_count.to_string().as_str()));
        self.primitive_count += 1;

        w.write_event(Event::Start(tag))?;

        for (i, face) in brush.faces().iter().enumerate() {
            // Faces with degenerate or empty windings are
            // non-contributing and are left out of the document.
            if brush.winding(i).point_count() <= 2 {
                continue;
            }

            w.write_event(Event::Start(BytesStart::new("face")))?;

            let plane = &face.plane;
            let mut plane_tag = BytesStart::new("plane");
            plane_tag.push_attribute(("x", safe_double(f64::from(plane.normal.x)).as_str()));
            plane_tag.push_attribute(("y", safe_double(f64::from(plane.normal.y)).as_str()));
            plane_tag.push_attribute(("z", safe_double(f64::from(plane.normal.z)).as_str()));
            plane_tag.push_attribute(("d", safe_double(f64::from(-plane.dist)).as_str()));
            w.write_event(Event::Empty(plane_tag))?;

            let texdef = &face.projection;
            let mut tex_tag = BytesStart::new("textureProjection");
            tex_tag.push_attribute(("xx", safe_double(f64::from(texdef.xx)).as_str()));
            tex_tag.push_attribute(("yx", safe_double(f64::from(texdef.yx)).as_str()));
            tex_tag.push_attribute(("tx", safe_double(f64::from(texdef.tx)).as_str()));
            tex_tag.push_attribute(("xy", safe_double(f64::from(texdef.xy)).as_str()));
            tex_tag.push_attribute(("yy", safe_double(f64::from(texdef.yy)).as_str()));
            tex_tag.push_attribute(("ty", safe_double(f64::from(texdef.ty)).as_str()));
            w.write_event(Event::Empty(tex_tag))?;

            let mut shader_tag = BytesStart::new("material");
            shader_tag.push_attribute(("name", face.shader.as_str()));
            w.write_event(Event::Empty(shader_tag))?;

            let mut detail_tag = BytesStart::new("contentFlag");
            detail_tag.push_attribute(("value", brush.detail_flag().to_string().as_str()));
            w.write_event(Event::Empty(detail_tag))?;

            w.write_event(Event::End(BytesEnd::new("face")))?;
        }

        w.write_event(Event::End(BytesEnd::new("brush")))?;
        Ok(())
    }

    fn write_patch(&mut self, w: &mut Writer<impl io::Write>, _patch: &Patch) -> Result<()> {
        let mut tag = BytesStart::new("patch");
        tag.push_attribute(("number", self.primitive_count.to_string().as_str()));
        self.primitive_count += 1;

        w.write_event(Event::Empty(tag))?;
        Ok(())
    }
}
