use indexmap::IndexMap;
use oac_core::registry::OperationRegistry;
use oac_core::request::{self, Body};
use oac_core::spec;
use serde_json::json;

const PETSTORE_JSON: &str = include_str!("fixtures/petstore.json");

fn registry() -> OperationRegistry {
    let tree = spec::from_json(PETSTORE_JSON).unwrap();
    OperationRegistry::collect(&tree).unwrap()
}

#[test]
fn builds_get_request_from_fixture_operation() {
    let registry = registry();
    let op = registry.get("getPet").unwrap();

    let descriptor = request::build(
        "http://petstore.example",
        op,
        &["42".to_string()],
        IndexMap::new(),
        None,
        IndexMap::new(),
    )
    .unwrap();

    assert_eq!(descriptor.method, "get");
    assert_eq!(descriptor.url, "http://petstore.example/pets/42");
    assert!(descriptor.body.is_none());
}

#[test]
fn arity_error_for_missing_path_argument() {
    let registry = registry();
    let op = registry.get("getPet").unwrap();

    let error = request::build(
        "http://petstore.example",
        op,
        &[],
        IndexMap::new(),
        None,
        IndexMap::new(),
    )
    .unwrap_err();

    assert_eq!(
        error.to_string(),
        "Incorrect arguments: getPet accepts 1 positional argument: petId"
    );
}

#[test]
fn arity_error_for_unexpected_path_argument() {
    let registry = registry();
    let op = registry.get("listPets").unwrap();

    let error = request::build(
        "http://petstore.example",
        op,
        &["42".to_string()],
        IndexMap::new(),
        None,
        IndexMap::new(),
    )
    .unwrap_err();

    assert_eq!(
        error.to_string(),
        "Incorrect arguments: listPets accepts no positional arguments"
    );
}

#[test]
fn query_parameters_land_in_the_url() {
    let registry = registry();
    let op = registry.get("searchPets").unwrap();

    let mut query = IndexMap::new();
    query.insert("q".to_string(), json!("terrier"));
    let descriptor = request::build(
        "http://petstore.example",
        op,
        &[],
        query,
        None,
        IndexMap::new(),
    )
    .unwrap();

    assert_eq!(descriptor.url, "http://petstore.example/search?q=terrier");
}

#[test]
fn non_json_request_body_negotiates_declared_type() {
    let registry = registry();
    let op = registry.get("uploadBlob").unwrap();

    let descriptor = request::build(
        "http://petstore.example",
        op,
        &[],
        IndexMap::new(),
        Some(json!({ "a": 1 })),
        IndexMap::new(),
    )
    .unwrap();

    assert_eq!(descriptor.mimetype, "application/xml");
    assert_eq!(descriptor.body, Some(Body::Form(json!({ "a": 1 }))));
}

#[test]
fn json_request_body_stays_structured() {
    let registry = registry();
    let op = registry.get("createPet").unwrap();

    let descriptor = request::build(
        "http://petstore.example",
        op,
        &[],
        IndexMap::new(),
        Some(json!({ "name": "rex" })),
        IndexMap::new(),
    )
    .unwrap();

    assert_eq!(descriptor.mimetype, "application/json");
    assert_eq!(descriptor.body, Some(Body::Json(json!({ "name": "rex" }))));
}
