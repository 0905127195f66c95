//! Identité de l'élément racine d'une charge utile

use std::fmt;

/// Nom et namespace de l'élément racine attendu dans `Body`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RootIdentity {
    pub name: String,
    pub namespace: Option<String>,
}

impl RootIdentity {
    pub fn new(name: impl Into<String>, namespace: Option<&str>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.map(str::to_string),
        }
    }

    /// Racine sans namespace
    pub fn unqualified(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
        }
    }

    pub fn matches(&self, local_name: &str, namespace: Option<&str>) -> bool {
        self.name == local_name && self.namespace.as_deref() == namespace
    }
}

impl fmt::Display for RootIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Type pouvant servir de charge utile d'une enveloppe SOAP
///
/// L'implémentation par défaut utilise le nom court du type, sans namespace.
/// La macro [`soap_root!`](crate::soap_root) déclare un nom et un namespace
/// explicites.
///
/// Pour relire ce qui a été écrit, les champs `Option` doivent être marqués
/// `#[serde(skip_serializing_if = "Option::is_none")]` (voir
/// [`write_value`](crate::value::write_value)).
pub trait SoapRoot {
    fn describe_root() -> RootIdentity {
        RootIdentity::unqualified(short_type_name::<Self>())
    }
}

/// Nom du type sans chemin de module ni paramètres génériques
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Déclare l'élément racine SOAP d'un type
///
/// ```
/// use pmosoap::{SoapRoot, soap_root};
///
/// struct Vector;
/// soap_root!(Vector, "Point", "http://tempuri.org/");
///
/// struct Plain;
/// soap_root!(Plain, "PlainRoot");
///
/// assert_eq!(Vector::describe_root().name, "Point");
/// assert_eq!(Plain::describe_root().namespace, None);
/// ```
#[macro_export]
macro_rules! soap_root {
    ($ty:ty, $name:expr) => {
        impl $crate::SoapRoot for $ty {
            fn describe_root() -> $crate::RootIdentity {
                $crate::RootIdentity::unqualified($name)
            }
        }
    };
    ($ty:ty, $name:expr, $namespace:expr) => {
        impl $crate::SoapRoot for $ty {
            fn describe_root() -> $crate::RootIdentity {
                $crate::RootIdentity::new($name, Some($namespace))
            }
        }
    };
}
