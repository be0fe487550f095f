//! Tree to bytes.

use super::tree::{Element, Node};
use super::writer::XmlWriter;
use crate::core::Pain001Error;

/// Serialize `root` with an XML declaration, two-space indentation and a
/// trailing newline. Elements and attributes keep the builder's order.
/// No pain.001 element written here is empty, so a childless element is an
/// internal error.
pub fn serialize(root: &Element) -> Result<Vec<u8>, Pain001Error> {
    let mut w = XmlWriter::new()?;
    write_element(&mut w, root)?;
    Ok(w.into_bytes())
}

fn write_element(w: &mut XmlWriter, element: &Element) -> Result<(), Pain001Error> {
    let attrs: Vec<(&str, &str)> = element
        .attrs
        .iter()
        .map(|(k, v)| (*k, v.as_str()))
        .collect();

    match element.children.as_slice() {
        [] => {
            return Err(Pain001Error::Internal(format!(
                "<{}> has no content",
                element.name
            )));
        }
        [Node::Text(text)] => {
            w.text_element_with_attrs(element.name, text, &attrs)?;
        }
        children => {
            w.start_element_with_attrs(element.name, &attrs)?;
            for child in children {
                match child {
                    Node::Element(e) => write_element(w, e)?,
                    Node::Text(_) => {
                        return Err(Pain001Error::Internal(format!(
                            "mixed content under <{}>",
                            element.name
                        )));
                    }
                }
            }
            w.end_element(element.name)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_output() {
        let root = Element::new("Document")
            .attr("xmlns", "urn:x")
            .child(Element::wrap("GrpHdr", Element::text("MsgId", "M1")));
        let xml = String::from_utf8(serialize(&root).unwrap()).unwrap();
        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <Document xmlns=\"urn:x\">\n  <GrpHdr>\n    <MsgId>M1</MsgId>\n  </GrpHdr>\n</Document>\n"
        );
    }

    #[test]
    fn rejects_mixed_content() {
        let mut root = Element::text("A", "t");
        root.push(Element::new("B"));
        assert!(matches!(serialize(&root), Err(Pain001Error::Internal(_))));
    }

    #[test]
    fn rejects_empty_elements() {
        let root = Element::new("PmtInf").child(Element::new("PmtTpInf"));
        assert!(matches!(serialize(&root), Err(Pain001Error::Internal(_))));
    }

    #[test]
    fn deterministic() {
        let root = Element::new("R").child(Element::text("X", "1").attr("b", "2").attr("a", "1"));
        assert_eq!(serialize(&root).unwrap(), serialize(&root).unwrap());
        let xml = String::from_utf8(serialize(&root).unwrap()).unwrap();
        assert!(xml.contains("<X b=\"2\" a=\"1\">1</X>"));
    }
}
