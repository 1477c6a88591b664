//! Integration tests for lazy, paginated query execution.

use std::sync::Arc;

use odata_lib::ODataService;
use odata_lib::api::query::Filter;
use odata_lib::api::query::QueryState;
use odata_lib::error::ApiError;
use odata_lib::error::Error;
use odata_lib::error::MaterializeError;
use odata_lib::error::QueryError;
use odata_lib::model::Value;
use odata_lib::transport::StaticTransport;
use odata_lib::transport::TransportResponse;
use pretty_assertions::assert_eq;
use uuid::Uuid;

const ROOT: &str = "http://example.org/kennel/";

const PAGE_1: &str = "http://example.org/kennel/Dogs?$inlinecount=allpages";
const PAGE_2: &str = "http://example.org/kennel/Dogs?$inlinecount=allpages&$skiptoken=2";

fn transport() -> Arc<StaticTransport> {
    Arc::new(
        StaticTransport::new()
            .with_ok(
                format!("{}$metadata", ROOT),
                include_str!("fixtures/kennel/metadata.xml"),
            )
            .with_ok(PAGE_1, include_str!("fixtures/kennel/dogs_page_1.xml"))
            .with_ok(PAGE_2, include_str!("fixtures/kennel/dogs_page_2.xml")),
    )
}

fn service(transport: &Arc<StaticTransport>) -> ODataService {
    ODataService::builder()
        .url(ROOT)
        .transport(Arc::clone(transport))
        .build()
        .unwrap()
}

fn names(entities: &[odata_lib::model::Entity]) -> Vec<String> {
    entities
        .iter()
        .map(|dog| dog.get_string("Name").unwrap().unwrap_or_default())
        .collect()
}

#[tokio::test]
async fn test_follows_next_links_once_per_page() {
    let transport = transport();
    let service = service(&transport);

    let mut dogs = service.collection("Dogs").inline_count().build();
    assert_eq!(dogs.state(), QueryState::Built);
    assert!(transport.requests().is_empty());

    assert_eq!(dogs.len().await.unwrap(), 3);
    assert_eq!(dogs.len().await.unwrap(), 3);
    assert_eq!(names(dogs.entities().await.unwrap()), vec!["Rex", "Bob", "Fido"]);
    assert_eq!(
        dogs.first().await.unwrap().and_then(|d| d.get("Id")),
        Some(Value::Int(1))
    );
    assert_eq!(
        dogs.last().await.unwrap().and_then(|d| d.get("Id")),
        Some(Value::Int(3))
    );
    assert_eq!(
        dogs.get(1).await.unwrap().and_then(|d| d.get("Name")),
        Some(Value::from("Bob"))
    );
    assert!(dogs.get(3).await.unwrap().is_none());
    assert!(!dogs.is_empty().await.unwrap());

    assert_eq!(dogs.state(), QueryState::Done);
    assert_eq!(dogs.pages_fetched(), 2);
    assert_eq!(dogs.total_count(), Some(3));
    assert_eq!(transport.request_count(PAGE_1), 1);
    assert_eq!(transport.request_count(PAGE_2), 1);
    assert_eq!(transport.request_count(&format!("{}$metadata", ROOT)), 1);
}

#[tokio::test]
async fn test_page_cap() {
    let transport = transport();
    let service = service(&transport);

    let mut dogs = service.collection("Dogs").inline_count().max_pages(1).build();

    assert_eq!(dogs.len().await.unwrap(), 2);
    assert_eq!(dogs.state(), QueryState::Done);
    assert_eq!(transport.request_count(PAGE_1), 1);
    assert_eq!(transport.request_count(PAGE_2), 0);
}

#[tokio::test]
async fn test_failed_page_keeps_earlier_entities() {
    let transport = transport();
    transport.insert(PAGE_2, TransportResponse::new(500, "boom"));
    let service = service(&transport);

    let mut dogs = service.collection("Dogs").inline_count().build();

    let err = dogs.len().await.unwrap_err();
    assert!(matches!(err, Error::Api(ApiError::Http { status: 500, .. })));
    assert_eq!(dogs.state(), QueryState::Failed);
    assert_eq!(names(dogs.materialized()), vec!["Rex", "Bob"]);

    let again = dogs.entities().await.unwrap_err();
    assert!(matches!(again, Error::Query(QueryError::Failed { .. })));
    assert_eq!(transport.request_count(PAGE_2), 1);
}

#[tokio::test]
async fn test_absolute_next_link() {
    let transport = transport();
    transport.insert(
        format!("{}Dogs?$skip=3", ROOT),
        TransportResponse::ok(include_str!("fixtures/kennel/dogs_absolute_next.xml")),
    );
    transport.insert(
        "http://example.org/kennel/Dogs?$skiptoken=4",
        TransportResponse::ok(include_str!("fixtures/kennel/dogs_page_2.xml")),
    );
    let service = service(&transport);

    let dogs = service.collection("Dogs").skip(3).execute().await.unwrap();
    assert_eq!(names(&dogs), vec!["Lassie", "Fido"]);
}

#[tokio::test]
async fn test_pages_iterator() {
    let transport = transport();
    let service = service(&transport);

    let mut pages = service.collection("Dogs").inline_count().pages();

    let first = pages.next().await.unwrap().unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(first.total_count(), Some(3));
    assert_eq!(first.next_link(), Some("Dogs?$inlinecount=allpages&$skiptoken=2"));

    let second = pages.next().await.unwrap().unwrap();
    assert_eq!(names(second.entities()), vec!["Fido"]);
    assert!(!second.has_more());

    assert!(pages.next().await.is_none());
    assert_eq!(pages.fetched(), 2);
}

#[tokio::test]
async fn test_filtered_query_path() {
    let transport = transport();
    transport.insert(
        format!("{}Dogs?$filter=Name%20eq%20%27Bob%27%20and%20Id%20ne%205", ROOT),
        TransportResponse::ok(include_str!("fixtures/kennel/dogs_page_2.xml")),
    );
    let service = service(&transport);

    let dog = service
        .collection("Dogs")
        .filter(Filter::eq("Name", "Bob"))
        .and(Filter::ne("Id", 5))
        .first()
        .await;

    // `first` adds `$top=1`, which this transport doesn't serve
    assert!(matches!(dog, Err(Error::Api(ApiError::Transport(_)))));

    let dogs = service
        .collection("Dogs")
        .filter(Filter::eq("Name", "Bob"))
        .and(Filter::ne("Id", 5))
        .execute()
        .await
        .unwrap();
    assert_eq!(names(&dogs), vec!["Fido"]);
}

#[tokio::test]
async fn test_coerced_values() {
    let service = service(&transport());

    let mut dogs = service.collection("Dogs").inline_count().build();
    let bob = dogs.get(1).await.unwrap().unwrap();

    assert_eq!(
        bob.get_guid("Chip").unwrap(),
        Some(Uuid::parse_str("3f75a1fa-dc6a-4a4c-8936-516307cb78ba").unwrap())
    );
    assert_eq!(bob.get_float("Weight").unwrap(), Some(12.5));
    // No coercion registered for Edm.Time: the raw text comes back
    assert_eq!(bob.get("Walked"), Some(Value::from("PT1H30M")));
    assert_eq!(bob.entity_type().base_type().map(|b| b.name()), Some("Animal"));
}

#[tokio::test]
async fn test_registered_coercion() {
    let transport = transport();
    let service = ODataService::builder()
        .url(ROOT)
        .transport(Arc::clone(&transport))
        .coercion("Edm.Time", |raw| raw.strip_prefix("PT").map(Value::from))
        .build()
        .unwrap();

    let dogs = service.collection("Dogs").inline_count().execute().await.unwrap();
    assert_eq!(dogs[0].get("Walked"), Some(Value::from("1H30M")));
}

#[tokio::test]
async fn test_unknown_entity_type() {
    let transport = transport();
    transport.insert(
        format!("{}Dogs", ROOT),
        TransportResponse::ok(include_str!("fixtures/kennel/dogs_unknown_type.xml")),
    );
    let service = service(&transport);

    let mut dogs = service.collection("Dogs").query().build();
    let err = dogs.len().await.unwrap_err();

    assert!(matches!(
        err,
        Error::Materialize(MaterializeError::UnknownEntityType { ref type_name }) if type_name == "Kennel.Cat"
    ));
    assert_eq!(dogs.state(), QueryState::Failed);
}

#[tokio::test]
async fn test_unknown_property() {
    let transport = transport();
    transport.insert(
        format!("{}Dogs", ROOT),
        TransportResponse::ok(include_str!("fixtures/kennel/dogs_unknown_property.xml")),
    );
    let service = service(&transport);

    let err = service.collection("Dogs").query().execute().await.unwrap_err();
    assert!(matches!(
        err,
        Error::Materialize(MaterializeError::UnknownProperty { ref property, .. }) if property == "Tail"
    ));
}
