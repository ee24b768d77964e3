//! Shared travel-booking knowledge base for the integration tests.

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::io::Write;
use std::sync::Arc;

use semdisc::{InMemoryKnowledgeBase, Iri, KnowledgeBaseSnapshot};
use tempfile::NamedTempFile;

pub const TRAVEL_YAML: &str = r#"
concepts:
  - iri: "urn:Town"
    equivalent_to: ["urn:City"]
  - iri: "urn:City"
    subclass_of: ["urn:Location"]
  - iri: "urn:Airport"
    subclass_of: ["urn:Location"]
  - iri: "urn:FlightBooking"
    subclass_of: ["urn:Booking"]
  - iri: "urn:HotelBooking"
    subclass_of: ["urn:Booking"]
  - iri: "urn:CreditCard"
    subclass_of: ["urn:PaymentMethod"]
  - iri: "urn:cat/Flights"
    subclass_of: ["urn:cat/Travel"]
  - iri: "urn:cat/Lodging"
    subclass_of: ["urn:cat/Travel"]
services:
  - iri: "urn:svc/Airline"
    label: "Airline"
    classification: ["urn:cat/Flights"]
    operations:
      - iri: "urn:op/findAirport"
        inputs: ["urn:City"]
        outputs: ["urn:Airport"]
      - iri: "urn:op/bookFlight"
        inputs: ["urn:Airport", "urn:Date", "urn:PaymentMethod"]
        outputs: ["urn:FlightBooking"]
        classification: ["urn:cat/Flights"]
  - iri: "urn:svc/Hotel"
    classification: ["urn:cat/Lodging"]
    operations:
      - iri: "urn:op/bookHotel"
        inputs: ["urn:City", "urn:Date", "urn:CreditCard"]
        outputs: ["urn:HotelBooking"]
        classification: ["urn:cat/Lodging"]
  - iri: "urn:svc/Planner"
    classification: ["urn:cat/Travel"]
    operations:
      - iri: "urn:op/plan"
        inputs: ["urn:FlightBooking", "urn:HotelBooking"]
        outputs: ["urn:Itinerary"]
operations:
  - iri: "urn:op/pay"
    inputs: ["urn:Booking", "urn:CreditCard"]
    outputs: ["urn:Receipt"]
"#;

pub fn travel() -> Arc<InMemoryKnowledgeBase> {
    let kb = KnowledgeBaseSnapshot::from_yaml(TRAVEL_YAML)
        .and_then(KnowledgeBaseSnapshot::into_knowledge_base)
        .expect("travel snapshot");
    Arc::new(kb)
}

pub fn iris(items: &[&str]) -> BTreeSet<Iri> {
    items.iter().map(|s| Iri::new(*s)).collect()
}

/// Writes the travel snapshot and a config pointing at it. Both files live
/// as long as the returned handles.
pub fn travel_config_files(extra: &str) -> (NamedTempFile, NamedTempFile) {
    let mut snapshot = tempfile::Builder::new()
        .suffix(".yaml")
        .tempfile()
        .expect("snapshot file");
    snapshot.write_all(TRAVEL_YAML.as_bytes()).expect("write snapshot");

    let mut config = NamedTempFile::new().expect("config file");
    let yaml = format!(
        "version: \"1.0\"\nknowledge_base:\n  kind: snapshot\n  path: \"{}\"\n{extra}",
        snapshot.path().display()
    );
    config.write_all(yaml.as_bytes()).expect("write config");
    (snapshot, config)
}
