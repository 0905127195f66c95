//! Noms partagés entre l'écriture et la lecture des enveloppes

/// Namespace SOAP 1.1
pub const SOAP_NAMESPACE: &str = "http://schemas.xmlsoap.org/soap/envelope/";

pub const XMLNS: &str = "xmlns";

pub const ENVELOPE: &str = "Envelope";
pub const HEADER: &str = "Header";
pub const BODY: &str = "Body";
pub const FAULT: &str = "Fault";
pub const FAULT_CODE: &str = "faultcode";
pub const FAULT_STRING: &str = "faultstring";

pub const DEFAULT_TARGET_PREFIX: &str = "tns";
pub const DEFAULT_SOAP_PREFIX: &str = "soap";

pub const XML_VERSION: &str = "1.0";
pub const XML_ENCODING: &str = "utf-8";

/// Préfixe des bindings générés pour les namespaces non déclarés
pub const GENERATED_PREFIX: &str = "ns";
