use openapi_types::{
    Cancellation, ErrorKind, Example, HttpMethod, Info, MediaType, OpenApi, OpenApiError,
    Operation, Parameter, ReferenceOr, Response, Responses, Schema, Server, ServerVariable,
    ValidationOption, ValidationOptions, Versioned, codec,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::path::Path;

fn load(name: &str) -> OpenApi {
    let path = Path::new("tests/fixtures").join(name);
    let bytes = std::fs::read(&path).expect("fixture should be readable");
    codec::decode(&bytes).expect("fixture should decode")
}

fn petstore() -> OpenApi {
    load("petstore.yaml")
}

#[test]
fn test_petstore_is_valid() {
    let doc = petstore();
    assert_eq!(doc.minor_version(), 0);
    assert_eq!(doc.validate(), Ok(()));

    let paths = doc.paths.as_ref().unwrap();
    assert_eq!(paths.len(), 2);
    assert_eq!(paths.operations().count(), 3);
}

#[test]
fn test_extended_document_is_valid() {
    let doc = load("extended.json");
    assert_eq!(doc.minor_version(), 1);
    assert_eq!(doc.validate(), Ok(()));
}

#[test]
fn test_missing_responses_reported_with_full_chain() {
    let mut doc = petstore();
    doc.add_operation("/pets", HttpMethod::Delete, Operation::new());

    let err = doc.validate().unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid paths: invalid operation delete /pets: missing field 'responses'"
    );
    assert_eq!(err.attribution(), vec!["paths", "operation delete /pets"]);
    assert_eq!(err.kind(), ErrorKind::MissingField);
}

#[test]
fn test_undeclared_path_parameter() {
    let mut doc = petstore();
    doc.add_operation(
        "/pets/{petId}/toys/{toyId}",
        HttpMethod::Get,
        Operation::new()
            .with_parameter(Parameter::path("petId"))
            .with_responses(Responses::new().with_response("200", Response::new("Toys"))),
    );

    let err = doc.validate().unwrap_err();
    assert_eq!(
        err.attribution(),
        vec!["paths", "operation get /pets/{petId}/toys/{toyId}"]
    );
    assert_eq!(
        err.root_cause(),
        &OpenApiError::structural("path parameter 'toyId' is not declared")
    );
}

#[test]
fn test_conflicting_path_templates() {
    let mut doc = petstore();
    let mut item = doc.paths.as_ref().unwrap().get("/pets/{petId}").unwrap().clone();
    item.parameters = Some(vec![ReferenceOr::Item(Parameter::path("id"))]);
    doc.paths.as_mut().unwrap().insert("/pets/{id}", item);

    let err = doc.validate().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StructuralViolation);
    assert_eq!(
        err.to_string(),
        "invalid paths: conflicting paths '/pets/{petId}' and '/pets/{id}'"
    );
}

#[test]
fn test_duplicate_operation_id() {
    let mut doc = petstore();
    doc.add_operation(
        "/owners",
        HttpMethod::Get,
        Operation::new()
            .with_operation_id("listPets")
            .with_responses(Responses::new().with_response("200", Response::new("Owners"))),
    );

    assert_eq!(
        doc.validate(),
        Err(OpenApiError::structural("duplicate operationId 'listPets'").within("paths"))
    );
}

#[test]
fn test_info_failure_hides_later_failures() {
    let mut doc = petstore();
    if let Some(info) = doc.info.as_mut() {
        info.version.clear();
    }
    doc.add_operation("/broken", HttpMethod::Get, Operation::new());

    assert_eq!(
        doc.validate(),
        Err(OpenApiError::missing_field("version").within("info"))
    );
}

#[test]
fn test_accumulating_mode_reports_every_step() {
    let mut doc = petstore();
    if let Some(info) = doc.info.as_mut() {
        info.version.clear();
    }
    doc.add_operation("/broken", HttpMethod::Get, Operation::new());
    doc.add_server(Server::new("https://{region}.example.com"));

    let options: ValidationOptions = [ValidationOption::AccumulateErrors].into_iter().collect();
    let err = doc.validate_with(&options).unwrap_err();

    let OpenApiError::Multiple(ref failures) = err else {
        panic!("expected accumulated failures, got {err}");
    };
    let steps: Vec<&str> = failures.iter().map(|e| e.attribution()[0]).collect();
    assert_eq!(steps, ["info", "paths", "servers"]);
    assert_eq!(err.kind(), ErrorKind::Multiple);
    assert!(err.to_string().contains("; invalid paths: "));
}

#[test]
fn test_example_checks_can_be_skipped() {
    let media = MediaType::new(Schema::object())
        .with_example(json!({"id": 1, "name": "Tom"}))
        .with_named_example("other", Example::new(json!({"id": 2, "name": "Rex"})));
    let operation = Operation::new()
        .with_operation_id("showPetTwin")
        .with_parameter(Parameter::path("petId"))
        .with_responses(
            Responses::new().with_response("200", Response::new("A twin").with_content("application/json", media)),
        );

    let mut doc = petstore();
    doc.add_operation("/pets/{petId}/twin", HttpMethod::Get, operation);

    let err = doc.validate().unwrap_err();
    assert_eq!(
        err.root_cause(),
        &OpenApiError::structural("example and examples are mutually exclusive")
    );

    let relaxed = ValidationOptions::from_toml_str("skip_examples_validation = true").unwrap();
    assert_eq!(doc.validate_with(&relaxed), Ok(()));
}

#[test]
fn test_schema_strictness_is_configurable() {
    let mut doc = petstore();
    doc.components = doc
        .components
        .clone()
        .with_schema("Loose", Schema::new(json!({"type": "object", "propertiesOrder": ["a"]})));

    let err = doc.validate().unwrap_err();
    assert_eq!(err.attribution(), vec!["components", "schema Loose"]);

    let options = ValidationOptions::builder()
        .allow_extra_properties_in_schemas(true)
        .build();
    assert_eq!(doc.validate_with(&options), Ok(()));
}

#[test]
fn test_server_variables_checked_at_document_level() {
    let doc = petstore().with_server(
        Server::new("https://{env}.example.com")
            .with_variable("env", ServerVariable::new("qa").with_enum(vec!["prod".into()])),
    );

    let err = doc.validate().unwrap_err();
    assert_eq!(err.attribution(), vec!["servers", "server 1", "variable 'env'"]);
    assert_eq!(err.kind(), ErrorKind::InvalidValue);
}

#[test]
fn test_cancellation_stops_validation() {
    let cancellation = Cancellation::new();
    let options: ValidationOptions = [ValidationOption::CancelWith(cancellation.clone())]
        .into_iter()
        .collect();

    let doc = petstore();
    assert_eq!(doc.validate_with(&options), Ok(()));

    cancellation.cancel();
    assert_eq!(doc.validate_with(&options), Err(OpenApiError::Cancelled));
}

#[test]
fn test_same_options_across_documents() {
    let options = ValidationOptions::default();
    let valid = petstore();
    let invalid = OpenApi::new("3.0.3").with_info(Info::new("Empty", "0.1.0"));

    assert!(valid.validate_with(&options).is_ok());
    assert!(invalid.validate_with(&options).is_err());
    assert!(valid.validate_with(&options).is_ok());
}
