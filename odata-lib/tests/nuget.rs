//! Integration tests against recorded responses of the NuGet v1 feed:
//! service discovery, composite keys and value coercion.

use std::sync::Arc;

use chrono::TimeZone;
use chrono::Utc;
use odata_lib::ODataService;
use odata_lib::model::EntityKey;
use odata_lib::model::Value;
use odata_lib::transport::StaticTransport;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use serde::Serialize;

const ROOT: &str = "http://packages.nuget.org/v1/FeedService.svc/";

const NUNIT_URL: &str =
    "http://packages.nuget.org/v1/FeedService.svc/Packages(Id=NUnit,Version=2.5.7.10213)";

fn transport() -> Arc<StaticTransport> {
    Arc::new(
        StaticTransport::new()
            .with_ok(ROOT, include_str!("fixtures/nuget/root.xml"))
            .with_ok(
                format!("{}$metadata", ROOT),
                include_str!("fixtures/nuget/metadata.xml"),
            )
            .with_ok(NUNIT_URL, include_str!("fixtures/nuget/package_nunit.xml")),
    )
}

fn service(transport: &Arc<StaticTransport>) -> ODataService {
    ODataService::builder()
        .url(ROOT)
        .transport(Arc::clone(transport))
        .build()
        .unwrap()
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct PackageKey<'a> {
    id: &'a str,
    version: &'a str,
}

#[tokio::test]
async fn test_collection_names() {
    let service = service(&transport());

    let names = service.collection_names().await.unwrap();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"Packages".to_string()));
    assert!(names.contains(&"Screenshots".to_string()));
}

#[tokio::test]
async fn test_collections() {
    let service = service(&transport());

    let collections = service.collections().await.unwrap();
    assert_eq!(collections.len(), 2);
    assert_eq!(collections[0].name(), "Packages");
    assert_eq!(collections[0].href(), "Packages");
    assert_eq!(collections[1].name(), "Screenshots");
    assert_eq!(collections[1].href(), "Screenshots");
}

#[tokio::test]
async fn test_get_by_composite_key() {
    let transport = transport();
    let service = service(&transport);

    let key = EntityKey::composite([("Id", "NUnit"), ("Version", "2.5.7.10213")]);
    let package = service.collection("Packages").get(key).await.unwrap().unwrap();

    assert_eq!(package.get_string("Id").unwrap().as_deref(), Some("NUnit"));
    assert_eq!(
        package.key(),
        Some(EntityKey::composite([("Id", "NUnit"), ("Version", "2.5.7.10213")]))
    );
    assert_eq!(transport.request_count(NUNIT_URL), 1);
}

#[tokio::test]
async fn test_get_by_record_key() {
    let transport = transport();
    let service = service(&transport);

    let key = EntityKey::from_record(&PackageKey {
        id: "NUnit",
        version: "2.5.7.10213",
    })
    .unwrap();
    let package = service.collection("Packages").get(key).await.unwrap();

    assert!(package.is_some());
    assert_eq!(transport.request_count(NUNIT_URL), 1);
}

#[tokio::test]
async fn test_property_coercion() {
    let service = service(&transport());

    let key = EntityKey::composite([("Id", "NUnit"), ("Version", "2.5.7.10213")]);
    let package = service.collection("Packages").get(key).await.unwrap().unwrap();

    assert_eq!(package.entity_type().name(), "PublishedPackage");
    assert_eq!(package.get_int("DownloadCount").unwrap(), Some(27015));
    assert_eq!(package.get_long("PackageSize").unwrap(), Some(5_323_856_223));
    assert_eq!(package.get_decimal("Price").unwrap(), Some(Decimal::ZERO));
    assert_eq!(package.get_bool("IsLatestVersion").unwrap(), Some(false));
    assert_eq!(package.get_float("Rating").unwrap(), Some(4.5));
    assert_eq!(package.get_string("Title").unwrap(), None);
    assert_eq!(package.get("Title"), Some(Value::Null));

    let published = Utc.with_ymd_and_hms(2010, 10, 25, 22, 55, 16).unwrap()
        + chrono::Duration::milliseconds(287);
    assert_eq!(package.get_datetime("Published").unwrap(), Some(published));
}
