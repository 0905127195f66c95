//! Conversion valeur ⇄ fragment XML, déléguée à serde et quick-xml
//!
//! Les noms des champs suivent les attributs serde du type (`rename`,
//! `@attribut`, `$text`), comme pour les structures DIDL-Lite de `pmodidl`.

use std::io::Write;

use quick_xml::Writer;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::errors::SoapError;
use crate::soap::RootIdentity;

/// Écrit `value` comme élément `tag` dans `writer`
///
/// quick-xml écrit un `Option` à `None` comme élément vide (`<X/>`), que la
/// lecture ne sait pas relire comme `None` pour un champ non textuel. Les
/// champs optionnels portent donc
/// `#[serde(skip_serializing_if = "Option::is_none")]`.
pub fn write_value<W, T>(writer: &mut Writer<W>, tag: &str, value: &T) -> Result<(), SoapError>
where
    W: Write,
    T: Serialize,
{
    writer.write_serializable(tag, value)?;
    Ok(())
}

/// Décode un fragment produit par le lecteur d'enveloppes
pub fn read_value<T>(fragment: &str, root: &RootIdentity) -> Result<T, SoapError>
where
    T: DeserializeOwned,
{
    quick_xml::de::from_str(fragment).map_err(|source| SoapError::ValueDecodeFailure {
        root: root.to_string(),
        source,
    })
}
