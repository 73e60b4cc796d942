//! SVG parsing from XML.

use std::fs;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::ast::*;
use crate::error::MsvgError;

/// Read and parse an SVG file.
pub fn read_svg(path: &Path) -> Result<Document, MsvgError> {
    let source = fs::read_to_string(path).map_err(|e| MsvgError::io(path, e))?;
    parse_svg(&source)
}

/// Parse an SVG string into a Document.
pub fn parse_svg(svg: &str) -> Result<Document, MsvgError> {
    let mut reader = Reader::from_str(svg);

    let mut xml_declaration = None;
    let mut doctype = None;
    let mut prolog = Vec::new();
    let mut root = None;

    loop {
        match reader.read_event()? {
            Event::Decl(decl) => {
                xml_declaration = Some(XmlDeclaration {
                    version: String::from_utf8_lossy(decl.version()?.as_ref()).into_owned(),
                    encoding: decl
                        .encoding()
                        .transpose()
                        .ok()
                        .flatten()
                        .map(|e| String::from_utf8_lossy(e.as_ref()).into_owned()),
                    standalone: decl.standalone().transpose().ok().flatten().map(|s| {
                        let s = String::from_utf8_lossy(s.as_ref());
                        s == "yes"
                    }),
                });
            }
            Event::DocType(dt) => {
                doctype = Some(String::from_utf8_lossy(&dt).trim().to_string());
            }
            Event::Start(start) => {
                root = Some(parse_element(&mut reader, &start)?);
                break;
            }
            Event::Empty(start) => {
                root = Some(parse_element_start(&start)?);
                break;
            }
            Event::Comment(comment) => {
                prolog.push(Node::Comment(String::from_utf8_lossy(&comment).into_owned()));
            }
            Event::PI(pi) => prolog.push(processing_instruction(&pi)),
            Event::Eof => break,
            _ => {}
        }
    }

    let root = root.ok_or_else(|| MsvgError::InvalidSvg("No root element found".into()))?;

    Ok(Document {
        xml_declaration,
        doctype,
        prolog,
        root,
    })
}

fn processing_instruction(pi: &[u8]) -> Node {
    let content = String::from_utf8_lossy(pi);
    let (target, content) = match content.split_once(char::is_whitespace) {
        Some((target, rest)) => (target.to_string(), Some(rest.to_string())),
        None => (content.to_string(), None),
    };
    Node::ProcessingInstruction { target, content }
}

fn parse_element(reader: &mut Reader<&[u8]>, start: &BytesStart) -> Result<Element, MsvgError> {
    let mut element = parse_element_start(start)?;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                element
                    .children
                    .push(Node::Element(parse_element(reader, &start)?));
            }
            Event::Empty(start) => {
                element
                    .children
                    .push(Node::Element(parse_element_start(&start)?));
            }
            Event::End(_) => break,
            Event::Text(text) => {
                element
                    .children
                    .push(Node::Text(text.unescape()?.into_owned()));
            }
            Event::Comment(comment) => {
                element
                    .children
                    .push(Node::Comment(String::from_utf8_lossy(&comment).into_owned()));
            }
            Event::CData(cdata) => {
                element
                    .children
                    .push(Node::CData(String::from_utf8_lossy(&cdata).into_owned()));
            }
            Event::PI(pi) => element.children.push(processing_instruction(&pi)),
            Event::Eof => {
                return Err(MsvgError::InvalidSvg(format!(
                    "Unexpected end of file inside <{}>",
                    element.name.full_name()
                )));
            }
            _ => {}
        }
    }

    Ok(element)
}

fn parse_element_start(start: &BytesStart) -> Result<Element, MsvgError> {
    let name_bytes = start.name();
    let name = std::str::from_utf8(name_bytes.as_ref())?;

    let mut element = Element {
        name: QName::parse(name),
        attributes: Vec::new(),
        children: Vec::new(),
    };

    for attr in start.attributes() {
        let attr = attr.map_err(|e| MsvgError::InvalidSvg(format!("Invalid attribute: {}", e)))?;
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = attr.unescape_value()?;
        element.attributes.push(Attribute {
            name: QName::parse(key),
            value: value.into_owned(),
        });
    }

    Ok(element)
}
