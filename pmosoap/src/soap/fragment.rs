//! Reconstruction du sous-arbre de la charge utile
//!
//! Le désérialiseur serde de quick-xml lit un document complet ; l'élément
//! reconnu dans `Body` est donc réécrit comme fragment autonome. Les noms
//! d'éléments perdent leur préfixe (le namespace a déjà été vérifié) et les
//! déclarations `xmlns` sont retirées.

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use super::constants::XMLNS;
use super::events::ElementStart;
use crate::errors::SoapError;

pub struct FragmentBuilder {
    writer: Writer<Vec<u8>>,
    open: Vec<String>,
}

impl Default for FragmentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FragmentBuilder {
    pub fn new() -> Self {
        Self {
            writer: Writer::new(Vec::new()),
            open: Vec::new(),
        }
    }

    pub fn depth(&self) -> usize {
        self.open.len()
    }

    pub fn start(&mut self, element: &ElementStart) -> Result<(), SoapError> {
        let mut start = BytesStart::new(element.local_name.as_str());
        for (key, value) in &element.attributes {
            if is_namespace_declaration(key) {
                continue;
            }
            start.push_attribute((key.as_str(), value.as_str()));
        }
        self.writer.write_event(Event::Start(start))?;
        self.open.push(element.local_name.clone());
        Ok(())
    }

    /// Ferme l'élément courant ; `true` quand la racine du fragment est fermée
    pub fn end(&mut self) -> Result<bool, SoapError> {
        if let Some(name) = self.open.pop() {
            self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        }
        Ok(self.open.is_empty())
    }

    pub fn text(&mut self, text: &str) -> Result<(), SoapError> {
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        Ok(())
    }

    pub fn finish(self) -> Result<String, SoapError> {
        String::from_utf8(self.writer.into_inner())
            .map_err(|e| SoapError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
    }
}

fn is_namespace_declaration(key: &str) -> bool {
    key == XMLNS || key.starts_with("xmlns:")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rebuild_strips_prefixes_and_xmlns() {
        let mut builder = FragmentBuilder::new();
        let root = ElementStart::new("Point", Some("http://tempuri.org/"))
            .with_prefix("tns")
            .with_attribute("xmlns:tns", "http://tempuri.org/")
            .with_attribute("unit", "cm & mm");

        builder.start(&root).unwrap();
        builder
            .start(&ElementStart::new("X", Some("http://tempuri.org/")).with_prefix("tns"))
            .unwrap();
        builder.text("9.6 < 10").unwrap();
        assert!(!builder.end().unwrap());
        assert_eq!(builder.depth(), 1);
        assert!(builder.end().unwrap());

        assert_eq!(
            builder.finish().unwrap(),
            r#"<Point unit="cm &amp; mm"><X>9.6 &lt; 10</X></Point>"#
        );
    }
}
