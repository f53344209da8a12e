//! End-to-end classification: failures raised from a catalog, classified and
//! serialized to the wire shape analytics backends receive.

use serde_json::json;
use smelter_core::{
    CatalogError, ErrorCatalog, ErrorCategory, ErrorDescriptor, Failure, TemplateArgs,
};
use smelter_telemetry::{
    Analytics, AnalyticsClient, AnalyticsEvent, ErrorClassifier, ErrorType, MemoryTransport,
    TaskKind, UserType,
};
use std::sync::Arc;

/// A catalog shaped like the one the scenarios describe.
fn scenario_catalog() -> Arc<ErrorCatalog> {
    Arc::new(
        ErrorCatalog::builder()
            .category(ErrorCategory::new("Network", "NETWORK", 100, 199))
            .category(ErrorCategory::new("Arguments", "ARGUMENTS", 300, 399))
            .error(
                "NETWORK",
                "INVALID_RPC_URL",
                ErrorDescriptor::new(
                    104,
                    "Invalid RPC URL",
                    "Invalid URL %url% for network %network%",
                    "The url of a network config must be a valid http(s) url.",
                ),
            )
            .error(
                "ARGUMENTS",
                "INVALID_VALUE_FOR_TYPE",
                ErrorDescriptor::new(
                    301,
                    "Invalid argument type",
                    "Invalid value %value% for argument %name% of type %type%",
                    "The value passed doesn't match the declared type.",
                ),
            )
            .build()
            .expect("scenario catalog is valid"),
    )
}

fn args(pairs: &[(&str, &str)]) -> TemplateArgs {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn scenario_a_generic_error() {
    let classifier = ErrorClassifier::new(scenario_catalog());
    let context = classifier.contextualize(&Failure::generic("disk full"));

    assert_eq!(
        serde_json::to_value(&context).unwrap(),
        json!({ "errorType": "generic", "isCataloged": false, "message": "disk full" })
    );
}

#[test]
fn scenario_b_plugin_error() {
    let catalog = scenario_catalog();
    let classifier = ErrorClassifier::new(Arc::clone(&catalog));
    let failure: Failure = CatalogError::new(
        catalog.lookup(301).unwrap(),
        &args(&[("value", "abc"), ("name", "runs"), ("type", "int")]),
    )
    .unwrap()
    .in_plugin("solidity-coverage")
    .into();

    let value = serde_json::to_value(classifier.contextualize(&failure)).unwrap();
    assert_eq!(
        value,
        json!({
            "errorType": "plugin",
            "isCataloged": true,
            "message": "Invalid value abc for argument runs of type int",
            "pluginName": "solidity-coverage"
        })
    );
    for field in ["id", "category", "name", "title", "contextMessage", "description"] {
        assert!(value.get(field).is_none(), "unexpected field {field}");
    }
}

#[test]
fn scenario_c_catalog_error() {
    let catalog = scenario_catalog();
    let classifier = ErrorClassifier::new(Arc::clone(&catalog));
    let failure: Failure = CatalogError::new(
        catalog.lookup(104).unwrap(),
        &args(&[("url", "localhost:8545"), ("network", "dev")]),
    )
    .unwrap()
    .into();

    let value = serde_json::to_value(classifier.contextualize(&failure)).unwrap();
    assert_eq!(
        value,
        json!({
            "errorType": "catalog",
            "isCataloged": true,
            "message": "Invalid URL localhost:8545 for network dev",
            "id": 104,
            "contextMessage": "Invalid URL %url% for network %network%",
            "description": "The url of a network config must be a valid http(s) url.",
            "category": { "title": "Network", "name": "NETWORK", "min": 100, "max": 199 },
            "title": "Invalid RPC URL",
            "name": "INVALID_RPC_URL"
        })
    );
}

#[test]
fn every_default_entry_classifies_as_catalog() {
    let catalog = Arc::new(ErrorCatalog::with_defaults());
    let classifier = ErrorClassifier::new(Arc::clone(&catalog));

    for entry in catalog.iter() {
        let failure: Failure = CatalogError::raw(entry).into();
        let record = classifier.contextualize(&failure).to_record();
        assert_eq!(record.error_type, ErrorType::Catalog);
        assert!(record.is_cataloged);
        assert_eq!(record.id, Some(entry.number()));
        assert_eq!(record.name.as_deref(), Some(entry.name.as_str()));
        assert_eq!(record.category.as_ref(), Some(&entry.category));
        assert!(record.plugin_name.is_none());
    }
}

#[test]
fn contextualize_twice_yields_identical_records() {
    let catalog = scenario_catalog();
    let classifier = ErrorClassifier::new(Arc::clone(&catalog));
    let failures: Vec<Failure> = vec![
        Failure::generic("disk full"),
        CatalogError::raw(catalog.lookup(104).unwrap()).into(),
        CatalogError::raw(catalog.lookup(301).unwrap())
            .in_plugin("p")
            .into(),
    ];

    for failure in &failures {
        assert_eq!(
            classifier.contextualize(failure).to_record(),
            classifier.contextualize(failure).to_record()
        );
    }
}

#[tokio::test]
async fn client_delivers_hits_and_reports() {
    let catalog = scenario_catalog();
    let transport = Arc::new(MemoryTransport::new());
    let analytics = Analytics::new("cid", "1.2.3", Arc::clone(&catalog), Arc::clone(&transport))
        .with_user_type(UserType::Ci);

    let (_abort, pending) = analytics.send_task_hit(TaskKind::Custom, "deploy");
    pending.await.unwrap();
    analytics
        .send_error_report(&Failure::generic("disk full"))
        .await
        .unwrap();

    let events = transport.events().await;
    assert_eq!(events.len(), 2);
    assert!(matches!(&events[0], AnalyticsEvent::TaskHit(h) if h.name == "deploy"));
    match &events[1] {
        AnalyticsEvent::ErrorReport(report) => {
            assert_eq!(report.user_type, UserType::Ci);
            assert_eq!(report.tool_version, "1.2.3");
            assert_eq!(report.context.message, "disk full");
        }
        other => panic!("expected error report, got {other:?}"),
    }
}
