//! Événements structurels consommés par le lecteur d'enveloppes
//!
//! [`SoapEvent`] isole la machine à états du transport : elle ne voit qu'une
//! suite d'événements, produite soit par un [`XmlEventSource`] (lecture
//! synchrone via `quick_xml::NsReader`), soit par un [`AsyncXmlEventSource`]
//! (lecture `tokio`), soit par un [`EventReplay`] en mémoire.

use std::collections::VecDeque;
use std::io::BufRead;

use async_trait::async_trait;
use quick_xml::encoding::Decoder;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use tokio::io::AsyncBufRead;
use tracing::warn;

use crate::errors::SoapError;

/// Balise ouvrante, avec son namespace résolu
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementStart {
    pub local_name: String,
    pub namespace: Option<String>,
    pub prefix: Option<String>,
    /// Attributs bruts (nom qualifié, valeur déséchappée)
    pub attributes: Vec<(String, String)>,
}

impl ElementStart {
    pub fn new(local_name: &str, namespace: Option<&str>) -> Self {
        Self {
            local_name: local_name.to_string(),
            namespace: namespace.map(str::to_string),
            prefix: None,
            attributes: Vec::new(),
        }
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_string());
        self
    }

    pub fn with_attribute(mut self, key: &str, value: &str) -> Self {
        self.attributes.push((key.to_string(), value.to_string()));
        self
    }

    pub fn is(&self, local_name: &str, namespace: &str) -> bool {
        self.local_name == local_name && self.namespace.as_deref() == Some(namespace)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoapEvent {
    StartDocument,
    Declaration,
    Start(ElementStart),
    End,
    Text(String),
    Eof,
}

/// Source synchrone d'événements structurels
pub trait EventSource {
    fn next_event(&mut self) -> Result<SoapEvent, SoapError>;
}

/// Source asynchrone : `next_event` est l'unique point de suspension
#[async_trait]
pub trait AsyncEventSource {
    async fn next_event(&mut self) -> Result<SoapEvent, SoapError>;
}

/// Événements rejoués depuis la mémoire, `Eof` une fois épuisés
#[derive(Debug, Clone, Default)]
pub struct EventReplay {
    events: VecDeque<SoapEvent>,
}

impl EventReplay {
    pub fn new(events: impl IntoIterator<Item = SoapEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }
}

impl EventSource for EventReplay {
    fn next_event(&mut self) -> Result<SoapEvent, SoapError> {
        Ok(self.events.pop_front().unwrap_or(SoapEvent::Eof))
    }
}

#[async_trait]
impl AsyncEventSource for EventReplay {
    async fn next_event(&mut self) -> Result<SoapEvent, SoapError> {
        EventSource::next_event(self)
    }
}

/// Source adossée à un `quick_xml::NsReader` synchrone
pub struct XmlEventSource<R> {
    reader: NsReader<R>,
    buf: Vec<u8>,
    started: bool,
}

impl<R: BufRead> XmlEventSource<R> {
    pub fn new(inner: R) -> Self {
        let mut reader = NsReader::from_reader(inner);
        reader.config_mut().expand_empty_elements = true;
        Self {
            reader,
            buf: Vec::new(),
            started: false,
        }
    }
}

impl<'a> XmlEventSource<&'a [u8]> {
    pub fn from_xml(xml: &'a str) -> Self {
        Self::new(xml.as_bytes())
    }
}

impl<R: BufRead> EventSource for XmlEventSource<R> {
    fn next_event(&mut self) -> Result<SoapEvent, SoapError> {
        if !self.started {
            self.started = true;
            return Ok(SoapEvent::StartDocument);
        }

        loop {
            self.buf.clear();
            let (ns, event) = self.reader.read_resolved_event_into(&mut self.buf)?;
            let namespace = resolved_namespace(ns);
            if let Some(converted) = convert_event(namespace, event, self.reader.decoder())? {
                return Ok(converted);
            }
        }
    }
}

/// Source adossée à un `quick_xml::NsReader` sur un `tokio::io::AsyncBufRead`
pub struct AsyncXmlEventSource<R> {
    reader: NsReader<R>,
    buf: Vec<u8>,
    started: bool,
}

impl<R: AsyncBufRead + Unpin> AsyncXmlEventSource<R> {
    pub fn new(inner: R) -> Self {
        let mut reader = NsReader::from_reader(inner);
        reader.config_mut().expand_empty_elements = true;
        Self {
            reader,
            buf: Vec::new(),
            started: false,
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> AsyncEventSource for AsyncXmlEventSource<R> {
    async fn next_event(&mut self) -> Result<SoapEvent, SoapError> {
        if !self.started {
            self.started = true;
            return Ok(SoapEvent::StartDocument);
        }

        loop {
            self.buf.clear();
            let (ns, event) = self
                .reader
                .read_resolved_event_into_async(&mut self.buf)
                .await?;
            let namespace = resolved_namespace(ns);
            if let Some(converted) = convert_event(namespace, event, self.reader.decoder())? {
                return Ok(converted);
            }
        }
    }
}

fn resolved_namespace(ns: ResolveResult<'_>) -> Option<String> {
    match ns {
        ResolveResult::Bound(Namespace(uri)) => Some(String::from_utf8_lossy(uri).into_owned()),
        ResolveResult::Unbound => None,
        ResolveResult::Unknown(prefix) => {
            warn!(
                prefix = %String::from_utf8_lossy(&prefix),
                "Undeclared namespace prefix, element treated as unqualified"
            );
            None
        }
    }
}

/// Convertit un événement quick-xml ; `None` pour ce que le lecteur ignore
/// (commentaires, instructions de traitement, DOCTYPE).
fn convert_event(
    namespace: Option<String>,
    event: Event<'_>,
    decoder: Decoder,
) -> Result<Option<SoapEvent>, SoapError> {
    let converted = match event {
        Event::Decl(_) => SoapEvent::Declaration,
        // expand_empty_elements est actif : Empty n'est jamais produit
        Event::Start(e) | Event::Empty(e) => {
            SoapEvent::Start(element_start(&e, namespace, decoder)?)
        }
        Event::End(_) => SoapEvent::End,
        Event::Text(e) => SoapEvent::Text(e.decode()?.into_owned()),
        Event::CData(e) => SoapEvent::Text(decoder.decode(&e)?.into_owned()),
        Event::GeneralRef(e) => {
            let text = match e.resolve_char_ref()? {
                Some(ch) => ch.to_string(),
                None => {
                    let name = e.decode()?;
                    match resolve_predefined_entity(&name) {
                        Some(resolved) => resolved.to_string(),
                        None => {
                            warn!(entity = %name, "Unknown entity reference kept verbatim");
                            format!("&{};", name)
                        }
                    }
                }
            };
            SoapEvent::Text(text)
        }
        Event::Eof => SoapEvent::Eof,
        Event::Comment(_) | Event::PI(_) | Event::DocType(_) => return Ok(None),
    };
    Ok(Some(converted))
}

fn element_start(
    e: &BytesStart<'_>,
    namespace: Option<String>,
    decoder: Decoder,
) -> Result<ElementStart, SoapError> {
    let name = e.name();
    let local_name = decoder.decode(name.local_name().as_ref())?.into_owned();
    let prefix = match name.prefix() {
        Some(p) => Some(decoder.decode(p.as_ref())?.into_owned()),
        None => None,
    };

    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = decoder.decode(attr.key.as_ref())?.into_owned();
        let value = attr.decode_and_unescape_value(decoder)?.into_owned();
        attributes.push((key, value));
    }

    Ok(ElementStart {
        local_name,
        namespace,
        prefix,
        attributes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOAP_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

    fn collect(xml: &str) -> Vec<SoapEvent> {
        let mut source = XmlEventSource::from_xml(xml);
        let mut events = Vec::new();
        loop {
            let event = source.next_event().unwrap();
            let done = event == SoapEvent::Eof;
            events.push(event);
            if done {
                return events;
            }
        }
    }

    #[test]
    fn test_resolves_namespaces() {
        let events = collect(
            r#"<?xml version="1.0"?><s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body/></s:Envelope>"#,
        );

        assert_eq!(events[0], SoapEvent::StartDocument);
        assert_eq!(events[1], SoapEvent::Declaration);
        match &events[2] {
            SoapEvent::Start(start) => {
                assert!(start.is("Envelope", SOAP_NS));
                assert_eq!(start.prefix.as_deref(), Some("s"));
                assert_eq!(start.attributes, vec![("xmlns:s".to_string(), SOAP_NS.to_string())]);
            }
            other => panic!("unexpected event {:?}", other),
        }
        match &events[3] {
            SoapEvent::Start(start) => assert!(start.is("Body", SOAP_NS)),
            other => panic!("unexpected event {:?}", other),
        }
        // <s:Body/> est développé en Start + End
        assert_eq!(events[4], SoapEvent::End);
        assert_eq!(events[5], SoapEvent::End);
        assert_eq!(events[6], SoapEvent::Eof);
    }

    #[test]
    fn test_text_pieces_are_resolved() {
        let events = collect(r#"<?xml version="1.0"?><a>x &amp; y&#33;<![CDATA[<z>]]></a>"#);

        let text: String = events
            .iter()
            .filter_map(|e| match e {
                SoapEvent::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(text, "x & y!<z>");
    }

    #[test]
    fn test_comments_are_skipped() {
        let events = collect(r#"<?xml version="1.0"?><!-- hello --><a/>"#);

        assert_eq!(events[1], SoapEvent::Declaration);
        assert!(matches!(&events[2], SoapEvent::Start(s) if s.local_name == "a"));
    }

    #[test]
    fn test_replay_ends_with_eof() {
        let mut replay = EventReplay::new([SoapEvent::Declaration]);

        assert_eq!(EventSource::next_event(&mut replay).unwrap(), SoapEvent::Declaration);
        assert_eq!(EventSource::next_event(&mut replay).unwrap(), SoapEvent::Eof);
        assert_eq!(EventSource::next_event(&mut replay).unwrap(), SoapEvent::Eof);
    }
}
