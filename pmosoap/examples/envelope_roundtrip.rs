use anyhow::Result;
use pmosoap::{SoapCodec, SoapConfig, SoapFault, soap_root};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Vector {
    #[serde(rename = "X")]
    x: f64,
    #[serde(rename = "Y")]
    y: f64,
}

soap_root!(Vector, "Point", "http://tempuri.org/");

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pmosoap=debug")),
        )
        .init();

    // PMOSOAP__FORMAT__INDENT=true pour une sortie indentée
    let mut config = SoapConfig::load(None)?;
    config.target_namespace = Some("http://tempuri.org/".to_string());
    let codec = SoapCodec::from_config(&config)?;

    let xml = codec.serialize(&Vector { x: 9.6, y: 4.2 })?;
    println!("=== Envelope ===");
    println!("{}", xml);

    let point: Vector = codec.deserialize(&xml)?;
    println!("\n=== Decoded: {{{}|{}}} ===", point.x, point.y);

    let fault = codec.serialize_fault(&SoapFault::new(
        "System.IO.DirectoryNotFoundException",
        "The directory was not found.",
    ))?;
    println!("\n=== Fault ===");
    println!("{}", fault);

    match codec.deserialize::<Vector>(&fault) {
        Err(err) if err.is_remote_fault() => println!("\n=== Server said no: {} ===", err),
        other => println!("\n=== Unexpected: {:?} ===", other),
    }

    Ok(())
}
