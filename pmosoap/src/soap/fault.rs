//! SOAP Faults

use std::fmt;

/// Erreur SOAP (Fault)
///
/// Enregistrement transitoire : construit pendant l'écriture d'un `Fault`
/// ou pendant la lecture d'un `Fault` reçu, puis replié dans une
/// [`SoapError::RemoteFault`](crate::SoapError::RemoteFault).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SoapFault {
    /// Code d'erreur (ex: "System.IO.DirectoryNotFoundException"), vide si absent
    pub code: String,

    /// Description de l'erreur
    pub message: String,
}

impl SoapFault {
    /// Crée un fault SOAP simple
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Crée un fault sans `faultcode`
    pub fn message_only(message: impl Into<String>) -> Self {
        Self::new(String::new(), message)
    }

    /// Crée un fault à partir d'une erreur Rust
    ///
    /// Le code est le nom complet du type de l'erreur, le message est son
    /// `Display`. Le nom vient du type statique : une erreur effacée
    /// (`dyn Error`) n'a pas de nom utile et n'est donc pas acceptée.
    pub fn from_error<E>(error: &E) -> Self
    where
        E: std::error::Error,
    {
        Self::new(std::any::type_name::<E>(), error.to_string())
    }

    pub fn has_code(&self) -> bool {
        !self.code.is_empty()
    }
}

impl fmt::Display for SoapFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_code() {
            write!(f, "{}: {}", self.code, self.message)
        } else {
            f.write_str(&self.message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("The directory was not found.")]
    struct DirectoryNotFoundException;

    #[test]
    fn test_fault_from_error() {
        let fault = SoapFault::from_error(&DirectoryNotFoundException);

        assert!(fault.code.ends_with("DirectoryNotFoundException"));
        assert_eq!(fault.message, "The directory was not found.");
    }

    #[test]
    fn test_fault_from_io_error() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let fault = SoapFault::from_error(&err);

        assert!(fault.code.starts_with("std::io::"));
        assert_eq!(fault.message, "gone");
    }

    #[test]
    fn test_fault_from_boxed_error_uses_concrete_type() {
        let boxed = Box::new(DirectoryNotFoundException);
        let fault = SoapFault::from_error(boxed.as_ref());

        assert!(fault.code.ends_with("::DirectoryNotFoundException"));
        assert!(!fault.code.contains("dyn"));
    }

    #[test]
    fn test_message_only() {
        let fault = SoapFault::message_only("Invalid Action");

        assert!(!fault.has_code());
        assert_eq!(fault.to_string(), "Invalid Action");
    }
}
