use thiserror::Error;

use crate::soap::SoapFault;

/// Structural prerequisite missing from an incoming document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Malformed {
    MissingDeclaration,
    MissingEnvelope,
    MissingBody,
    EmptyBody,
    FaultMissingString,
    TruncatedPayload,
}

impl Malformed {
    pub fn reason(&self) -> &'static str {
        match self {
            Malformed::MissingDeclaration => "missing XML declaration",
            Malformed::MissingEnvelope => "missing envelope element",
            Malformed::MissingBody => "missing body element",
            Malformed::EmptyBody => "invalid or empty body content",
            Malformed::FaultMissingString => "fault missing faultstring",
            Malformed::TruncatedPayload => "truncated payload element",
        }
    }
}

impl std::fmt::Display for Malformed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.reason())
    }
}

#[derive(Error, Debug)]
pub enum SoapError {
    #[error("Malformed SOAP document: {0}")]
    MalformedDocument(Malformed),

    #[error("The following error was returned from the server: {0}")]
    RemoteFault(SoapFault),

    #[error("Cannot decode <{root}> element: {source}")]
    ValueDecodeFailure {
        root: String,
        #[source]
        source: quick_xml::DeError,
    },

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML serialization error: {0}")]
    Serialize(#[from] quick_xml::SeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Envelope scan already finished")]
    ScanFinished,
}

impl From<Malformed> for SoapError {
    fn from(reason: Malformed) -> Self {
        SoapError::MalformedDocument(reason)
    }
}

impl From<quick_xml::encoding::EncodingError> for SoapError {
    fn from(err: quick_xml::encoding::EncodingError) -> Self {
        SoapError::Xml(quick_xml::Error::Encoding(err))
    }
}

impl SoapError {
    /// The remote side answered with a `Fault`.
    pub fn is_remote_fault(&self) -> bool {
        matches!(self, SoapError::RemoteFault(_))
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, SoapError::MalformedDocument(_))
    }

    pub fn fault(&self) -> Option<&SoapFault> {
        match self {
            SoapError::RemoteFault(fault) => Some(fault),
            _ => None,
        }
    }

    pub fn malformed_reason(&self) -> Option<Malformed> {
        match self {
            SoapError::MalformedDocument(reason) => Some(*reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_display() {
        let err = SoapError::from(Malformed::MissingBody);
        assert!(err.is_malformed());
        assert_eq!(err.malformed_reason(), Some(Malformed::MissingBody));
        assert_eq!(err.to_string(), "Malformed SOAP document: missing body element");
    }

    #[test]
    fn test_remote_fault_display() {
        let err = SoapError::RemoteFault(SoapFault::new(
            "System.IO.DirectoryNotFoundException",
            "The directory was not found.",
        ));
        assert!(err.is_remote_fault());
        assert!(!err.is_malformed());
        assert_eq!(
            err.to_string(),
            "The following error was returned from the server: \
             System.IO.DirectoryNotFoundException: The directory was not found."
        );
    }

    #[test]
    fn test_remote_fault_without_code_display() {
        let err = SoapError::RemoteFault(SoapFault::message_only("Boom"));
        assert_eq!(
            err.to_string(),
            "The following error was returned from the server: Boom"
        );
    }
}
