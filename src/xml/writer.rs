use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::Cursor;

use crate::core::Pain001Error;

fn xml_io(e: std::io::Error) -> Pain001Error {
    Pain001Error::Xml(format!("XML write error: {e}"))
}

/// Indented UTF-8 writer with the XML declaration already emitted.
pub struct XmlWriter {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl XmlWriter {
    pub fn new() -> Result<Self, Pain001Error> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_io)?;
        Ok(Self { writer })
    }

    /// Finish the document: the buffer plus a trailing newline.
    pub fn into_bytes(self) -> Vec<u8> {
        let mut buf = self.writer.into_inner().into_inner();
        buf.push(b'\n');
        buf
    }

    pub fn start_element_with_attrs(
        &mut self,
        name: &str,
        attrs: &[(&str, &str)],
    ) -> Result<&mut Self, Pain001Error> {
        let mut elem = BytesStart::new(name);
        for (k, v) in attrs {
            elem.push_attribute((*k, *v));
        }
        self.writer
            .write_event(Event::Start(elem))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn end_element(&mut self, name: &str) -> Result<&mut Self, Pain001Error> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn text_element_with_attrs(
        &mut self,
        name: &str,
        text: &str,
        attrs: &[(&str, &str)],
    ) -> Result<&mut Self, Pain001Error> {
        self.start_element_with_attrs(name, attrs)?;
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(xml_io)?;
        self.end_element(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_declaration_and_indent() {
        let mut w = XmlWriter::new().unwrap();
        w.start_element_with_attrs("Document", &[("xmlns", "urn:x")])
            .unwrap();
        w.text_element_with_attrs("InstdAmt", "1.00", &[("Ccy", "EUR")])
            .unwrap();
        w.end_element("Document").unwrap();
        let xml = String::from_utf8(w.into_bytes()).unwrap();
        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <Document xmlns=\"urn:x\">\n  <InstdAmt Ccy=\"EUR\">1.00</InstdAmt>\n</Document>\n"
        );
    }

    #[test]
    fn escapes_text() {
        let mut w = XmlWriter::new().unwrap();
        w.text_element_with_attrs("Ustrd", "a<b", &[]).unwrap();
        let xml = String::from_utf8(w.into_bytes()).unwrap();
        assert!(xml.contains("<Ustrd>a&lt;b</Ustrd>"));
    }
}
