use pmosoap::soap::{ElementStart, EventReplay, SoapEvent};
use pmosoap::soap::constants::SOAP_NAMESPACE;
use pmosoap::{Malformed, SoapCodec, SoapFault, soap_root};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncReadExt, BufReader};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct TransportInfo {
    #[serde(rename = "CurrentTransportState")]
    state: String,
    #[serde(rename = "CurrentSpeed")]
    speed: String,
}

soap_root!(
    TransportInfo,
    "GetTransportInfoResponse",
    "urn:schemas-upnp-org:service:AVTransport:1"
);

fn codec() -> SoapCodec {
    SoapCodec::new("urn:schemas-upnp-org:service:AVTransport:1")
}

fn playing() -> TransportInfo {
    TransportInfo {
        state: "PLAYING".to_string(),
        speed: "1".to_string(),
    }
}

#[tokio::test]
async fn test_async_roundtrip() {
    let codec = codec();
    let info = playing();

    let (mut client, server) = tokio::io::duplex(64);
    let writer = {
        let codec = codec.clone();
        let info = info.clone();
        tokio::spawn(async move {
            let mut server = server;
            codec.serialize_async(&mut server, &info).await.unwrap();
        })
    };

    let mut received = Vec::new();
    client.read_to_end(&mut received).await.unwrap();
    writer.await.unwrap();

    let decoded: TransportInfo = codec
        .deserialize_async(BufReader::new(received.as_slice()))
        .await
        .unwrap();
    assert_eq!(decoded, info);
}

#[tokio::test]
async fn test_async_matches_sync() {
    let codec = codec().with_indent(true);
    let xml = codec.serialize(&playing()).unwrap();

    let sync: TransportInfo = codec.deserialize(&xml).unwrap();
    let asynchronous: TransportInfo = codec
        .deserialize_async(BufReader::new(xml.as_bytes()))
        .await
        .unwrap();

    assert_eq!(sync, asynchronous);
}

#[tokio::test]
async fn test_async_fault() {
    let codec = codec();
    let xml = codec
        .serialize_fault(&SoapFault::new("s:Client", "UPnP Error"))
        .unwrap();

    let err = codec
        .deserialize_async::<TransportInfo, _>(BufReader::new(xml.as_bytes()))
        .await
        .unwrap_err();

    assert!(err.is_remote_fault());
    assert_eq!(err.fault().unwrap().code, "s:Client");
    assert_eq!(err.fault().unwrap().message, "UPnP Error");
}

#[tokio::test]
async fn test_async_missing_body() {
    let xml = r#"<?xml version="1.0"?><s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Header/></s:Envelope>"#;

    let err = codec()
        .deserialize_async::<TransportInfo, _>(BufReader::new(xml.as_bytes()))
        .await
        .unwrap_err();

    assert_eq!(err.malformed_reason(), Some(Malformed::MissingBody));
}

#[tokio::test]
async fn test_async_replayed_events() {
    let mut events = EventReplay::new([
        SoapEvent::StartDocument,
        SoapEvent::Declaration,
        SoapEvent::Start(ElementStart::new("Envelope", Some(SOAP_NAMESPACE))),
        SoapEvent::Start(ElementStart::new("Body", Some(SOAP_NAMESPACE))),
        SoapEvent::Start(ElementStart::new(
            "GetTransportInfoResponse",
            Some("urn:schemas-upnp-org:service:AVTransport:1"),
        )),
        SoapEvent::Start(ElementStart::new("CurrentTransportState", None)),
        SoapEvent::Text("STOPPED".to_string()),
        SoapEvent::End,
        SoapEvent::Start(ElementStart::new("CurrentSpeed", None)),
        SoapEvent::Text("1".to_string()),
        SoapEvent::End,
        SoapEvent::End,
    ]);

    let info: TransportInfo = codec().deserialize_events_async(&mut events).await.unwrap();
    assert_eq!(info.state, "STOPPED");
}
