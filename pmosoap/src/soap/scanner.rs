//! Lecteur d'enveloppes SOAP : machine à états en un seul passage
//!
//! Les événements sont consommés dans l'ordre, sans retour arrière ni DOM.
//! La machine vérifie les repères structurels (déclaration, `Envelope`,
//! `Body`) puis décide, dans `Body`, entre la charge utile attendue et un
//! `Fault`. Les autres éléments de `Body` sont tolérés.
//!
//! ```text
//! Start -> SeekEnvelope -> SeekBody -> SeekContent -+-> Decode    (succès)
//!                                                   +-> FaultScan (RemoteFault)
//! ```

use tracing::{debug, trace};

use super::constants::{BODY, ENVELOPE, FAULT, FAULT_CODE, FAULT_STRING, SOAP_NAMESPACE};
use super::events::{AsyncEventSource, EventSource, SoapEvent};
use super::fault::SoapFault;
use super::fragment::FragmentBuilder;
use super::root::RootIdentity;
use crate::errors::{Malformed, SoapError};

/// Résultat d'une étape de la machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scan {
    Pending,
    /// Fragment XML autonome de l'élément racine reconnu
    Payload(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FaultField {
    Code,
    String,
}

enum ScanState {
    Start,
    SeekEnvelope,
    /// `depth` : éléments ouverts sous `Envelope`
    SeekBody { depth: usize },
    /// `depth` : éléments ouverts sous `Body`
    SeekContent { depth: usize },
    /// `depth` : éléments ouverts sous `Fault`
    FaultScan { depth: usize, code: Option<String> },
    FaultText {
        field: FaultField,
        nested: usize,
        fault_depth: usize,
        code: Option<String>,
        text: String,
    },
    Decode(FragmentBuilder),
    Finished,
}

impl ScanState {
    fn name(&self) -> &'static str {
        match self {
            ScanState::Start => "Start",
            ScanState::SeekEnvelope => "SeekEnvelope",
            ScanState::SeekBody { .. } => "SeekBody",
            ScanState::SeekContent { .. } => "SeekContent",
            ScanState::FaultScan { .. } => "FaultScan",
            ScanState::FaultText { .. } => "FaultText",
            ScanState::Decode(_) => "Decode",
            ScanState::Finished => "Finished",
        }
    }
}

/// Machine à états du lecteur d'enveloppes
///
/// Une instance sert pour un seul document. Toute erreur est terminale ;
/// après un succès ou une erreur, `feed` renvoie [`SoapError::ScanFinished`].
pub struct EnvelopeScanner {
    root: RootIdentity,
    state: ScanState,
}

impl EnvelopeScanner {
    pub fn new(root: RootIdentity) -> Self {
        Self {
            root,
            state: ScanState::Start,
        }
    }

    pub fn root(&self) -> &RootIdentity {
        &self.root
    }

    pub fn state_name(&self) -> &'static str {
        self.state.name()
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, ScanState::Finished)
    }

    /// Consomme un événement
    pub fn feed(&mut self, event: SoapEvent) -> Result<Scan, SoapError> {
        let state = std::mem::replace(&mut self.state, ScanState::Finished);
        let previous = state.name();
        let (next, scan) = step(&self.root, state, event)?;
        if next.name() != previous {
            trace!(state = next.name(), "Envelope scanner transition");
        }
        self.state = next;
        Ok(scan)
    }
}

fn step(
    root: &RootIdentity,
    state: ScanState,
    event: SoapEvent,
) -> Result<(ScanState, Scan), SoapError> {
    let next = match state {
        ScanState::Start => match event {
            SoapEvent::StartDocument => ScanState::Start,
            SoapEvent::Declaration => ScanState::SeekEnvelope,
            _ => return Err(Malformed::MissingDeclaration.into()),
        },

        ScanState::SeekEnvelope => match event {
            SoapEvent::Start(e) if e.is(ENVELOPE, SOAP_NAMESPACE) => {
                debug!("Found SOAP envelope");
                ScanState::SeekBody { depth: 0 }
            }
            SoapEvent::Eof => return Err(Malformed::MissingEnvelope.into()),
            _ => ScanState::SeekEnvelope,
        },

        ScanState::SeekBody { depth } => match event {
            SoapEvent::Start(e) if depth == 0 && e.is(BODY, SOAP_NAMESPACE) => {
                debug!("Found SOAP body");
                ScanState::SeekContent { depth: 0 }
            }
            SoapEvent::Start(_) => ScanState::SeekBody { depth: depth + 1 },
            SoapEvent::End if depth == 0 => return Err(Malformed::MissingBody.into()),
            SoapEvent::End => ScanState::SeekBody { depth: depth - 1 },
            SoapEvent::Eof => return Err(Malformed::MissingBody.into()),
            _ => ScanState::SeekBody { depth },
        },

        ScanState::SeekContent { depth } => match event {
            SoapEvent::Start(e) if root.matches(&e.local_name, e.namespace.as_deref()) => {
                debug!(root = %root, "Found payload element");
                let mut builder = FragmentBuilder::new();
                builder.start(&e)?;
                ScanState::Decode(builder)
            }
            SoapEvent::Start(e) if e.is(FAULT, SOAP_NAMESPACE) => {
                debug!("Found SOAP fault");
                ScanState::FaultScan {
                    depth: 0,
                    code: None,
                }
            }
            SoapEvent::Start(e) => {
                trace!(element = %e.local_name, "Ignoring unknown body element");
                ScanState::SeekContent { depth: depth + 1 }
            }
            SoapEvent::End if depth == 0 => return Err(Malformed::EmptyBody.into()),
            SoapEvent::End => ScanState::SeekContent { depth: depth - 1 },
            SoapEvent::Eof => return Err(Malformed::EmptyBody.into()),
            _ => ScanState::SeekContent { depth },
        },

        ScanState::FaultScan { depth, code } => match event {
            SoapEvent::Start(e) if e.local_name == FAULT_CODE || e.local_name == FAULT_STRING => {
                let field = if e.local_name == FAULT_CODE {
                    FaultField::Code
                } else {
                    FaultField::String
                };
                ScanState::FaultText {
                    field,
                    nested: 0,
                    fault_depth: depth,
                    code,
                    text: String::new(),
                }
            }
            SoapEvent::Start(_) => ScanState::FaultScan {
                depth: depth + 1,
                code,
            },
            SoapEvent::End if depth == 0 => return Err(Malformed::FaultMissingString.into()),
            SoapEvent::End => ScanState::FaultScan {
                depth: depth - 1,
                code,
            },
            SoapEvent::Eof => return Err(Malformed::FaultMissingString.into()),
            _ => ScanState::FaultScan { depth, code },
        },

        ScanState::FaultText {
            field,
            nested,
            fault_depth,
            code,
            mut text,
        } => match event {
            SoapEvent::Text(t) => {
                text.push_str(&t);
                ScanState::FaultText {
                    field,
                    nested,
                    fault_depth,
                    code,
                    text,
                }
            }
            SoapEvent::Start(_) => ScanState::FaultText {
                field,
                nested: nested + 1,
                fault_depth,
                code,
                text,
            },
            SoapEvent::End if nested > 0 => ScanState::FaultText {
                field,
                nested: nested - 1,
                fault_depth,
                code,
                text,
            },
            SoapEvent::End => match field {
                FaultField::Code => {
                    let code = text.trim().to_string();
                    debug!(code = %code, "Read SOAP fault code");
                    ScanState::FaultScan {
                        depth: fault_depth,
                        code: Some(code),
                    }
                }
                FaultField::String => return Err(remote_fault(code, &text)),
            },
            // faultstring suffit à déclencher le fault, même tronqué
            SoapEvent::Eof if field == FaultField::String => {
                return Err(remote_fault(code, &text));
            }
            SoapEvent::Eof => return Err(Malformed::FaultMissingString.into()),
            _ => ScanState::FaultText {
                field,
                nested,
                fault_depth,
                code,
                text,
            },
        },

        ScanState::Decode(mut builder) => match event {
            SoapEvent::Start(e) => {
                builder.start(&e)?;
                ScanState::Decode(builder)
            }
            SoapEvent::Text(t) => {
                builder.text(&t)?;
                ScanState::Decode(builder)
            }
            SoapEvent::End => {
                if builder.end()? {
                    return Ok((ScanState::Finished, Scan::Payload(builder.finish()?)));
                }
                ScanState::Decode(builder)
            }
            SoapEvent::Eof => return Err(Malformed::TruncatedPayload.into()),
            _ => ScanState::Decode(builder),
        },

        ScanState::Finished => return Err(SoapError::ScanFinished),
    };

    Ok((next, Scan::Pending))
}

fn remote_fault(code: Option<String>, text: &str) -> SoapError {
    let fault = SoapFault::new(code.unwrap_or_default(), text.trim());
    debug!(code = %fault.code, message = %fault.message, "SOAP fault returned by server");
    SoapError::RemoteFault(fault)
}

/// Lit une enveloppe et renvoie le fragment XML de la charge utile
pub fn read_envelope<S>(source: &mut S, root: &RootIdentity) -> Result<String, SoapError>
where
    S: EventSource + ?Sized,
{
    let mut scanner = EnvelopeScanner::new(root.clone());
    loop {
        if let Scan::Payload(fragment) = scanner.feed(source.next_event()?)? {
            return Ok(fragment);
        }
    }
}

/// Variante asynchrone de [`read_envelope`] ; une seule lecture en cours
pub async fn read_envelope_async<S>(source: &mut S, root: &RootIdentity) -> Result<String, SoapError>
where
    S: AsyncEventSource + ?Sized + Send,
{
    let mut scanner = EnvelopeScanner::new(root.clone());
    loop {
        let event = source.next_event().await?;
        if let Scan::Payload(fragment) = scanner.feed(event)? {
            return Ok(fragment);
        }
    }
}
