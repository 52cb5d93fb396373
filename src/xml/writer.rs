use quick_xml::Writer;
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use std::io::Cursor;

use crate::core::VerifactuError;

fn xml_io(e: std::io::Error) -> VerifactuError {
    VerifactuError::Xml(format!("XML write error: {e}"))
}

/// Escape character data the way canonical XML does: `&`, `<`, `>` and
/// carriage return only.
pub fn escape_text(text: &str) -> String {
    partial_escape(text).replace('\r', "&#xD;")
}

/// Streaming writer that emits canonical XML directly: no declaration, no
/// indentation, explicit start/end tags for empty elements.
pub struct XmlWriter {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl XmlWriter {
    pub fn new() -> Self {
        Self {
            writer: Writer::new(Cursor::new(Vec::new())),
        }
    }

    pub fn into_string(self) -> Result<String, VerifactuError> {
        let buf = self.writer.into_inner().into_inner();
        String::from_utf8(buf).map_err(|e| VerifactuError::Xml(format!("XML UTF-8 error: {e}")))
    }

    pub fn start_element(&mut self, name: &str) -> Result<&mut Self, VerifactuError> {
        self.writer
            .write_event(Event::Start(BytesStart::new(name)))
            .map_err(xml_io)?;
        Ok(self)
    }

    /// Attributes are written in the given order; callers pass them sorted.
    pub fn start_element_with_attrs(
        &mut self,
        name: &str,
        attrs: &[(&str, &str)],
    ) -> Result<&mut Self, VerifactuError> {
        let mut elem = BytesStart::new(name);
        for (k, v) in attrs {
            elem.push_attribute((*k, *v));
        }
        self.writer
            .write_event(Event::Start(elem))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn end_element(&mut self, name: &str) -> Result<&mut Self, VerifactuError> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn text(&mut self, text: &str) -> Result<&mut Self, VerifactuError> {
        let escaped = escape_text(text);
        self.writer
            .write_event(Event::Text(BytesText::from_escaped(escaped.as_str())))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn text_element(&mut self, name: &str, text: &str) -> Result<&mut Self, VerifactuError> {
        self.start_element(name)?;
        self.text(text)?;
        self.end_element(name)
    }

    /// Element with attributes and no content, as `<a x="1"></a>`.
    pub fn empty_element_with_attrs(
        &mut self,
        name: &str,
        attrs: &[(&str, &str)],
    ) -> Result<&mut Self, VerifactuError> {
        self.start_element_with_attrs(name, attrs)?;
        self.end_element(name)
    }

    /// Insert an already serialized fragment verbatim.
    pub fn raw(&mut self, fragment: &str) -> Result<&mut Self, VerifactuError> {
        self.writer
            .write_event(Event::Text(BytesText::from_escaped(fragment)))
            .map_err(xml_io)?;
        Ok(self)
    }
}

impl Default for XmlWriter {
    fn default() -> Self {
        Self::new()
    }
}
