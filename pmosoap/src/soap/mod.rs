//! # Module SOAP - Enveloppes SOAP 1.1
//!
//! ## Architecture
//!
//! - [`EnvelopeWriter`] : émission de l'enveloppe (charge utile ou `Fault`)
//! - [`EnvelopeScanner`] : machine à états du lecteur d'enveloppes
//! - [`SoapEvent`] / [`EventSource`] : événements structurels, indépendants du transport
//! - [`SoapFault`] : erreur SOAP
//! - [`SoapRoot`] / [`RootIdentity`] : élément racine d'une charge utile
//!
//! ## Example
//!
//! ```
//! use pmosoap::soap::{EventReplay, ElementStart, RootIdentity, SoapEvent, read_envelope};
//! use pmosoap::soap::constants::SOAP_NAMESPACE;
//!
//! let mut events = EventReplay::new([
//!     SoapEvent::Declaration,
//!     SoapEvent::Start(ElementStart::new("Envelope", Some(SOAP_NAMESPACE))),
//!     SoapEvent::Start(ElementStart::new("Body", Some(SOAP_NAMESPACE))),
//!     SoapEvent::Start(ElementStart::new("Ping", None)),
//!     SoapEvent::End,
//! ]);
//!
//! let fragment = read_envelope(&mut events, &RootIdentity::unqualified("Ping")).unwrap();
//! assert_eq!(fragment, "<Ping></Ping>");
//! ```

pub mod constants;
mod events;
mod fault;
mod fragment;
mod namespaces;
mod root;
mod scanner;
mod writer;

pub use events::{
    AsyncEventSource, AsyncXmlEventSource, ElementStart, EventReplay, EventSource, SoapEvent,
    XmlEventSource,
};
pub use fault::SoapFault;
pub use fragment::FragmentBuilder;
pub use namespaces::NamespaceTable;
pub use root::{RootIdentity, SoapRoot, short_type_name};
pub use scanner::{EnvelopeScanner, Scan, read_envelope, read_envelope_async};
pub use writer::EnvelopeWriter;
