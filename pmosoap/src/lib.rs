//! # pmosoap - Codec d'enveloppes SOAP 1.1
//!
//! Ce crate convertit des valeurs typées (serde) en enveloppes SOAP 1.1 et
//! inversement, en distinguant une charge utile d'un `Fault` renvoyé par le
//! serveur.
//!
//! ## Fonctionnalités
//!
//! - ✅ Sérialisation `Envelope/Header/Body` sous un namespace cible
//! - ✅ Sérialisation d'erreurs en `soap:Fault`
//! - ✅ Lecture en un seul passage (sans DOM) par machine à états
//! - ✅ Lecture synchrone (`BufRead`) et asynchrone (`AsyncBufRead`)
//! - ✅ Configuration YAML avec surcharges par variables d'environnement
//!
//! ## Example
//!
//! ```
//! use pmosoap::{SoapCodec, soap_root};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Point {
//!     #[serde(rename = "X")]
//!     x: f64,
//!     #[serde(rename = "Y")]
//!     y: f64,
//! }
//!
//! soap_root!(Point, "Point", "http://tempuri.org/");
//!
//! let codec = SoapCodec::new("http://tempuri.org/");
//! let xml = codec.serialize(&Point { x: 9.6, y: 4.2 })?;
//! assert!(xml.contains("<tns:Point><X>9.6</X><Y>4.2</Y></tns:Point>"));
//!
//! let point: Point = codec.deserialize(&xml)?;
//! assert_eq!(point, Point { x: 9.6, y: 4.2 });
//! # Ok::<(), pmosoap::SoapError>(())
//! ```

pub mod codec;
pub mod config;
pub mod errors;
pub mod soap;
pub mod value;

pub use codec::SoapCodec;
pub use config::{FormatOptions, SoapConfig};
pub use errors::{Malformed, SoapError};
pub use soap::{RootIdentity, SoapFault, SoapRoot};

pub type Result<T> = std::result::Result<T, SoapError>;
