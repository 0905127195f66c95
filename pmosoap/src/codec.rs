//! Codec SOAP : API publique de sérialisation et de désérialisation

use std::io::{BufRead, Write};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::{AsyncBufRead, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::config::{FormatOptions, SoapConfig};
use crate::errors::SoapError;
use crate::soap::{
    AsyncEventSource, AsyncXmlEventSource, EnvelopeWriter, EventSource, NamespaceTable,
    SoapFault, SoapRoot, XmlEventSource, read_envelope, read_envelope_async,
};
use crate::value::read_value;

/// Codec SOAP 1.1 lié à un namespace cible
///
/// Le codec ne contient que le binding du namespace cible et les options de
/// présentation ; il peut être partagé entre tâches une fois configuré. Les
/// modifications demandent `&mut self` et reconstruisent la table des
/// namespaces.
#[derive(Debug, Clone)]
pub struct SoapCodec {
    target_namespace: Option<String>,
    options: FormatOptions,
    namespaces: NamespaceTable,
}

impl Default for SoapCodec {
    fn default() -> Self {
        Self::with_options(None, FormatOptions::default())
    }
}

impl SoapCodec {
    pub fn new(target_namespace: impl Into<String>) -> Self {
        Self::with_options(Some(target_namespace.into()), FormatOptions::default())
    }

    pub fn with_options(target_namespace: Option<String>, options: FormatOptions) -> Self {
        let namespaces =
            NamespaceTable::with_target(&options.target_prefix, target_namespace.as_deref());
        Self {
            target_namespace,
            options,
            namespaces,
        }
    }

    pub fn from_config(config: &SoapConfig) -> Result<Self, SoapError> {
        config.format.validate()?;
        Ok(Self::with_options(
            config.target_namespace.clone(),
            config.format.clone(),
        ))
    }

    pub fn with_indent(mut self, indent: bool) -> Self {
        self.options.indent = indent;
        self
    }

    pub fn target_namespace(&self) -> Option<&str> {
        self.target_namespace.as_deref()
    }

    /// Change le namespace cible et réinitialise la table des namespaces
    pub fn set_target_namespace(&mut self, target_namespace: Option<String>) {
        self.target_namespace = target_namespace;
        self.rebind();
    }

    pub fn set_target_prefix(&mut self, prefix: impl Into<String>) {
        self.options.target_prefix = prefix.into();
        self.rebind();
    }

    pub fn set_soap_prefix(&mut self, prefix: impl Into<String>) {
        self.options.soap_prefix = prefix.into();
    }

    pub fn set_indent(&mut self, indent: bool) {
        self.options.indent = indent;
    }

    pub fn options(&self) -> &FormatOptions {
        &self.options
    }

    pub fn namespaces(&self) -> &NamespaceTable {
        &self.namespaces
    }

    fn rebind(&mut self) {
        self.namespaces = NamespaceTable::with_target(
            &self.options.target_prefix,
            self.target_namespace.as_deref(),
        );
    }

    fn writer<W: Write>(&self, sink: W) -> EnvelopeWriter<'_, W> {
        EnvelopeWriter::new(sink, &self.options, &self.namespaces)
    }

    // ============= Sérialisation =============

    pub fn serialize<T>(&self, value: &T) -> Result<String, SoapError>
    where
        T: Serialize + SoapRoot,
    {
        into_string(self.serialize_to(Vec::new(), Some(value))?)
    }

    /// Écrit l'enveloppe dans `sink` ; `None` produit un `Body` vide
    pub fn serialize_to<W, T>(&self, sink: W, value: Option<&T>) -> Result<W, SoapError>
    where
        W: Write,
        T: Serialize + SoapRoot,
    {
        self.writer(sink).write_payload(value)
    }

    pub fn serialize_empty(&self) -> Result<String, SoapError> {
        into_string(self.writer(Vec::new()).write_empty()?)
    }

    pub fn serialize_fault(&self, fault: &SoapFault) -> Result<String, SoapError> {
        into_string(self.serialize_fault_to(Vec::new(), fault)?)
    }

    pub fn serialize_fault_to<W: Write>(&self, sink: W, fault: &SoapFault) -> Result<W, SoapError> {
        self.writer(sink).write_fault(fault)
    }

    /// `Fault` dont le code est le type de l'erreur et le message son `Display`
    pub fn serialize_error<E>(&self, error: &E) -> Result<String, SoapError>
    where
        E: std::error::Error,
    {
        self.serialize_fault(&SoapFault::from_error(error))
    }

    /// L'enveloppe est construite en mémoire puis écrite d'un bloc
    pub async fn serialize_async<W, T>(&self, sink: &mut W, value: &T) -> Result<(), SoapError>
    where
        W: AsyncWrite + Unpin,
        T: Serialize + SoapRoot,
    {
        let buf = self.serialize_to(Vec::new(), Some(value))?;
        sink.write_all(&buf).await?;
        sink.flush().await?;
        Ok(())
    }

    // ============= Désérialisation =============

    pub fn deserialize<T>(&self, xml: &str) -> Result<T, SoapError>
    where
        T: DeserializeOwned + SoapRoot,
    {
        self.deserialize_from(xml.as_bytes())
    }

    pub fn deserialize_from<T, R>(&self, reader: R) -> Result<T, SoapError>
    where
        T: DeserializeOwned + SoapRoot,
        R: BufRead,
    {
        self.deserialize_events(&mut XmlEventSource::new(reader))
    }

    /// Désérialise depuis une source d'événements quelconque
    pub fn deserialize_events<T, S>(&self, source: &mut S) -> Result<T, SoapError>
    where
        T: DeserializeOwned + SoapRoot,
        S: EventSource + ?Sized,
    {
        let root = T::describe_root();
        let fragment = read_envelope(source, &root)?;
        debug!(root = %root, bytes = fragment.len(), "Decoding SOAP payload");
        read_value(&fragment, &root)
    }

    pub async fn deserialize_async<T, R>(&self, reader: R) -> Result<T, SoapError>
    where
        T: DeserializeOwned + SoapRoot,
        R: AsyncBufRead + Unpin + Send,
    {
        self.deserialize_events_async(&mut AsyncXmlEventSource::new(reader))
            .await
    }

    pub async fn deserialize_events_async<T, S>(&self, source: &mut S) -> Result<T, SoapError>
    where
        T: DeserializeOwned + SoapRoot,
        S: AsyncEventSource + ?Sized + Send,
    {
        let root = T::describe_root();
        let fragment = read_envelope_async(source, &root).await?;
        debug!(root = %root, bytes = fragment.len(), "Decoding SOAP payload");
        read_value(&fragment, &root)
    }
}

fn into_string(buf: Vec<u8>) -> Result<String, SoapError> {
    String::from_utf8(buf)
        .map_err(|e| SoapError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Volume {
        #[serde(rename = "Channel")]
        channel: String,
        #[serde(rename = "CurrentVolume")]
        current: u16,
    }
    crate::soap_root!(Volume, "GetVolumeResponse", "urn:schemas-upnp-org:service:RenderingControl:1");

    #[test]
    fn test_rebinding_resets_namespace_table() {
        let mut codec = SoapCodec::new("http://tempuri.org/");
        assert_eq!(codec.namespaces().len(), 1);

        codec.set_target_namespace(Some("urn:other".to_string()));
        assert_eq!(codec.namespaces().len(), 1);
        assert_eq!(codec.namespaces().namespace_of("tns"), Some("urn:other"));

        codec.set_target_prefix("u");
        assert_eq!(codec.namespaces().len(), 1);
        assert_eq!(codec.namespaces().prefix_for("urn:other"), Some("u"));
        assert_eq!(codec.namespaces().namespace_of("tns"), None);
    }

    #[test]
    fn test_roundtrip_with_upnp_namespace() {
        let codec = SoapCodec::new("urn:schemas-upnp-org:service:RenderingControl:1");
        let volume = Volume {
            channel: "Master".to_string(),
            current: 42,
        };

        let xml = codec.serialize(&volume).unwrap();
        assert!(xml.contains("<tns:GetVolumeResponse>"));

        let decoded: Volume = codec.deserialize(&xml).unwrap();
        assert_eq!(decoded, volume);
    }

    #[test]
    fn test_from_config() {
        let config = SoapConfig::from_yaml_str(
            "target_namespace: urn:music\nformat:\n  target_prefix: m\n",
        )
        .unwrap();
        let codec = SoapCodec::from_config(&config).unwrap();

        assert_eq!(codec.target_namespace(), Some("urn:music"));
        assert_eq!(codec.namespaces().prefix_for("urn:music"), Some("m"));
    }

    #[test]
    fn test_serialize_empty() {
        let codec = SoapCodec::new("http://tempuri.org/");
        let xml = codec.serialize_empty().unwrap();

        assert!(xml.contains("<soap:Body></soap:Body>"));
        let err = codec.deserialize::<Volume>(&xml).unwrap_err();
        assert!(err.is_malformed());
    }
}
