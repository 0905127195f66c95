//! Écriture d'enveloppes SOAP
//!
//! Émission linéaire : déclaration, `Envelope`, `Header` vide, `Body`,
//! charge utile ou `Fault`, puis fermeture de `Body` et `Envelope`.

use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use serde::Serialize;
use tracing::debug;

use super::constants::{
    BODY, ENVELOPE, FAULT, FAULT_CODE, FAULT_STRING, HEADER, SOAP_NAMESPACE, XML_ENCODING,
    XML_VERSION, XMLNS,
};
use super::fault::SoapFault;
use super::namespaces::NamespaceTable;
use super::root::{RootIdentity, SoapRoot};
use crate::config::FormatOptions;
use crate::errors::SoapError;
use crate::value::write_value;

fn qualified(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}:{}", prefix, name)
    }
}

fn xmlns_attribute(prefix: &str) -> String {
    format!("{}:{}", XMLNS, prefix)
}

/// Nom de l'élément racine de la charge utile et binding supplémentaire
/// éventuel à déclarer sur `Envelope`
fn payload_tag(root: &RootIdentity, namespaces: &NamespaceTable) -> (String, Option<(String, String)>) {
    match root.namespace.as_deref() {
        None => (root.name.clone(), None),
        Some(ns) => match namespaces.prefix_for(ns) {
            Some(prefix) => (qualified(prefix, &root.name), None),
            None => {
                let prefix = namespaces.free_prefix();
                (qualified(&prefix, &root.name), Some((prefix, ns.to_string())))
            }
        },
    }
}

/// Écrivain d'enveloppe, consommé par une écriture complète
pub struct EnvelopeWriter<'a, W: Write> {
    writer: Writer<W>,
    options: &'a FormatOptions,
    namespaces: &'a NamespaceTable,
}

impl<'a, W: Write> EnvelopeWriter<'a, W> {
    pub fn new(sink: W, options: &'a FormatOptions, namespaces: &'a NamespaceTable) -> Self {
        let writer = if options.indent {
            Writer::new_with_indent(sink, b' ', options.indent_size)
        } else {
            Writer::new(sink)
        };
        Self {
            writer,
            options,
            namespaces,
        }
    }

    /// Enveloppe contenant `value`, ou un `Body` vide pour `None`
    pub fn write_payload<T>(mut self, value: Option<&T>) -> Result<W, SoapError>
    where
        T: Serialize + SoapRoot,
    {
        let root = T::describe_root();
        let (tag, extra) = payload_tag(&root, self.namespaces);
        debug!(root = %root, tag = %tag, "Writing SOAP envelope");

        self.write_top(extra.as_ref())?;
        if let Some(value) = value {
            write_value(&mut self.writer, &tag, value)?;
        }
        self.write_bottom()?;
        Ok(self.writer.into_inner())
    }

    /// Enveloppe au `Body` vide
    pub fn write_empty(mut self) -> Result<W, SoapError> {
        self.write_top(None)?;
        self.write_bottom()?;
        Ok(self.writer.into_inner())
    }

    pub fn write_fault(mut self, fault: &SoapFault) -> Result<W, SoapError> {
        debug!(code = %fault.code, "Writing SOAP fault");
        let fault_tag = qualified(&self.options.soap_prefix, FAULT);

        self.write_top(None)?;
        self.writer
            .write_event(Event::Start(BytesStart::new(fault_tag.as_str())))?;
        self.writer
            .create_element(FAULT_CODE)
            .write_text_content(BytesText::new(&fault.code))?;
        self.writer
            .create_element(FAULT_STRING)
            .write_text_content(BytesText::new(&fault.message))?;
        self.writer
            .write_event(Event::End(BytesEnd::new(fault_tag.as_str())))?;
        self.write_bottom()?;
        Ok(self.writer.into_inner())
    }

    fn write_top(&mut self, extra: Option<&(String, String)>) -> Result<(), SoapError> {
        let soap = self.options.soap_prefix.as_str();

        self.writer.write_event(Event::Decl(BytesDecl::new(
            XML_VERSION,
            Some(XML_ENCODING),
            None,
        )))?;

        let mut envelope = BytesStart::new(qualified(soap, ENVELOPE));
        envelope.push_attribute((xmlns_attribute(soap).as_str(), SOAP_NAMESPACE));
        for (prefix, namespace) in self.namespaces.iter() {
            envelope.push_attribute((xmlns_attribute(prefix).as_str(), namespace.unwrap_or("")));
        }
        if let Some((prefix, namespace)) = extra {
            envelope.push_attribute((xmlns_attribute(prefix).as_str(), namespace.as_str()));
        }
        self.writer.write_event(Event::Start(envelope))?;

        self.writer
            .create_element(qualified(soap, HEADER))
            .write_empty()?;
        self.writer
            .write_event(Event::Start(BytesStart::new(qualified(soap, BODY))))?;
        Ok(())
    }

    fn write_bottom(&mut self) -> Result<(), SoapError> {
        let soap = self.options.soap_prefix.as_str();
        self.writer
            .write_event(Event::End(BytesEnd::new(qualified(soap, BODY))))?;
        self.writer
            .write_event(Event::End(BytesEnd::new(qualified(soap, ENVELOPE))))?;
        Ok(())
    }
}
