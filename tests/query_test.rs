use std::collections::HashSet;

use cloud_pricing_finder::{Filter, IndexDocument, IndexFormat, PricingError, ProductQuery, Selector, Settings};
use mockito::{Mock, Server, ServerGuard};

const INDEX_PATH: &str = "/offers/v1.0/aws/index.json";
const RDS_PATH: &str = "/offers/v1.0/aws/AmazonRDS/current/index.json";

const INDEX: &str = r#"{
    "formatVersion": "v1.0",
    "publicationDate": "2024-05-01T00:00:00Z",
    "offers": {
        "AmazonRDS": {
            "offerCode": "AmazonRDS",
            "currentVersionUrl": "/offers/v1.0/aws/AmazonRDS/current/index.json"
        },
        "AmazonEC2": {
            "offerCode": "AmazonEC2",
            "currentVersionUrl": "/offers/v1.0/aws/AmazonEC2/current/index.json"
        },
        "Broken": { "offerCode": "Broken" }
    }
}"#;

const RDS_CATALOG: &str = r#"{
    "formatVersion": "v1.0",
    "offerCode": "AmazonRDS",
    "products": {
        "A1": {
            "sku": "A1",
            "productFamily": "Database Instance",
            "attributes": {
                "location": "US East (N. Virginia)",
                "instanceType": "db.m4.large",
                "databaseEngine": "PostgreSQL"
            }
        },
        "A2": {
            "sku": "A2",
            "productFamily": "Database Instance",
            "attributes": {
                "location": "US East (N. Virginia)",
                "instanceType": "db.m4.xlarge",
                "databaseEngine": "PostgreSQL"
            }
        },
        "A3": {
            "sku": "A3",
            "productFamily": "Database Instance",
            "attributes": {
                "location": "EU (Ireland)",
                "instanceType": "db.r5.large",
                "databaseEngine": "MySQL"
            }
        },
        "CORRUPT": { "sku": "CORRUPT", "attributes": ["not", "an", "object"] }
    },
    "terms": { "OnDemand": {} }
}"#;

async fn mock_json(server: &mut ServerGuard, path: &str, body: &str) -> Mock {
    server
        .mock("GET", path)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

fn query_for(server: &ServerGuard) -> ProductQuery {
    ProductQuery::new(Settings::default().with_base_url(server.url())).unwrap()
}

fn skus(records: &[cloud_pricing_finder::ProductRecord]) -> HashSet<String> {
    records.iter().map(|r| r.sku().to_string()).collect()
}

#[tokio::test]
async fn product_name_query_returns_exact_match() {
    let mut server = Server::new_async().await;
    let index = mock_json(&mut server, INDEX_PATH, INDEX).await;
    let catalog = mock_json(&mut server, RDS_PATH, RDS_CATALOG).await;

    let filter = Filter::from_pairs([("instanceType", "db.m4.large")]).unwrap();
    let records = query_for(&server)
        .query_products(&Selector::ProductName("AmazonRDS".into()), &filter)
        .await
        .unwrap();

    index.assert_async().await;
    catalog.assert_async().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].sku(), "A1");
    assert_eq!(records[0].attribute("databaseEngine"), Some("PostgreSQL"));
}

#[tokio::test]
async fn wildcard_and_case_insensitive_filters() {
    let mut server = Server::new_async().await;
    let _mock = mock_json(&mut server, RDS_PATH, RDS_CATALOG).await;
    let selector = Selector::Url(format!("{}{RDS_PATH}", server.url()));
    let query = query_for(&server);

    let large = Filter::from_pairs([("instanceType", "db.*.large")]).unwrap();
    let records = query.query_products(&selector, &large).await.unwrap();
    assert_eq!(skus(&records), HashSet::from(["A1".to_string(), "A3".to_string()]));

    let us_east = Filter::from_pairs([("location", "us east*")]).unwrap();
    let records = query.query_products(&selector, &us_east).await.unwrap();
    assert_eq!(skus(&records), HashSet::from(["A1".to_string(), "A2".to_string()]));
}

#[tokio::test]
async fn empty_filter_returns_every_well_formed_record() {
    let mut server = Server::new_async().await;
    let _mock = mock_json(&mut server, RDS_PATH, RDS_CATALOG).await;
    let selector = Selector::Url(format!("{}{RDS_PATH}", server.url()));

    let catalog = query_for(&server)
        .query_catalog(&selector, &Filter::new())
        .await
        .unwrap();

    let all: HashSet<&str> = catalog.products().iter().map(|r| r.sku()).collect();
    assert_eq!(all, HashSet::from(["A1", "A2", "A3"]));
    assert_eq!(catalog.skipped().len(), 1);
    assert_eq!(catalog.skipped()[0].key(), "CORRUPT");
}

#[tokio::test]
async fn no_match_is_an_empty_success() {
    let mut server = Server::new_async().await;
    let _mock = mock_json(&mut server, RDS_PATH, RDS_CATALOG).await;
    let selector = Selector::Url(format!("{}{RDS_PATH}", server.url()));

    let filter = Filter::from_pairs([("instanceType", "db.x1e.*")]).unwrap();
    let records = query_for(&server).query_products(&selector, &filter).await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn repeated_queries_are_idempotent() {
    let mut server = Server::new_async().await;
    let catalog = server
        .mock("GET", RDS_PATH)
        .with_status(200)
        .with_body(RDS_CATALOG)
        .expect(2)
        .create_async()
        .await;
    let selector = Selector::Url(format!("{}{RDS_PATH}", server.url()));
    let query = query_for(&server);
    let filter = Filter::from_pairs([("databaseEngine", "postgresql")]).unwrap();

    let first: HashSet<_> = query.query_products(&selector, &filter).await.unwrap().into_iter().collect();
    let second: HashSet<_> = query.query_products(&selector, &filter).await.unwrap().into_iter().collect();

    catalog.assert_async().await;
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}

#[tokio::test]
async fn unknown_product_fails_before_fetching_a_catalog() {
    let mut server = Server::new_async().await;
    let _mock = mock_json(&mut server, INDEX_PATH, INDEX).await;
    let catalog = server.mock("GET", RDS_PATH).expect(0).create_async().await;

    let err = query_for(&server)
        .query_products(&Selector::ProductName("NotARealProduct".into()), &Filter::new())
        .await
        .unwrap_err();

    catalog.assert_async().await;
    assert!(matches!(err, PricingError::UnknownProduct(ref name) if name == "NotARealProduct"));
}

#[tokio::test]
async fn missing_local_file_is_not_found() {
    let server = Server::new_async().await;

    let err = query_for(&server)
        .query_products(&Selector::Path("/no/such/file.json".into()), &Filter::new())
        .await
        .unwrap_err();

    assert!(matches!(err, PricingError::NotFound(_)));
}

#[tokio::test]
async fn local_file_query_matches_like_remote() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rds.json");
    std::fs::write(&path, RDS_CATALOG).unwrap();
    let server = Server::new_async().await;

    let filter = Filter::from_pairs([("instanceType", "db.m4.large")]).unwrap();
    let records = query_for(&server)
        .query_products(&Selector::Path(path), &filter)
        .await
        .unwrap();

    assert_eq!(skus(&records), HashSet::from(["A1".to_string()]));
}

#[tokio::test]
async fn malformed_local_file_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, r#"{"offerCode": "AmazonRDS"}"#).unwrap();
    let server = Server::new_async().await;

    let err = query_for(&server)
        .query_products(&Selector::Path(path), &Filter::new())
        .await
        .unwrap_err();

    assert!(matches!(err, PricingError::Parse { .. }));
}

#[tokio::test]
async fn non_success_status_is_a_retrieval_error() {
    let mut server = Server::new_async().await;
    let _mock = server.mock("GET", RDS_PATH).with_status(500).create_async().await;
    let selector = Selector::Url(format!("{}{RDS_PATH}", server.url()));

    let err = query_for(&server)
        .query_products(&selector, &Filter::new())
        .await
        .unwrap_err();

    match err {
        PricingError::Retrieval { reason, .. } => assert!(reason.contains("500")),
        other => panic!("expected retrieval error, got {other:?}"),
    }
}

#[tokio::test]
async fn non_utf8_body_is_a_parse_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", RDS_PATH)
        .with_status(200)
        .with_body([0xff_u8, 0xfe, b'{', b'}'])
        .create_async()
        .await;
    let selector = Selector::Url(format!("{}{RDS_PATH}", server.url()));

    let err = query_for(&server)
        .query_products(&selector, &Filter::new())
        .await
        .unwrap_err();

    assert!(matches!(err, PricingError::Parse { .. }));
}

#[tokio::test]
async fn index_without_offers_is_a_parse_error() {
    let mut server = Server::new_async().await;
    let _mock = mock_json(&mut server, INDEX_PATH, r#"{"formatVersion": "v1.0"}"#).await;

    let err = query_for(&server).list_services().await.unwrap_err();
    assert!(matches!(err, PricingError::Parse { .. }));
}

#[tokio::test]
async fn list_services_skips_malformed_entries() {
    let mut server = Server::new_async().await;
    let _mock = mock_json(&mut server, INDEX_PATH, INDEX).await;

    let services = query_for(&server).list_services().await.unwrap();
    assert_eq!(services, vec!["AmazonEC2", "AmazonRDS"]);
}

#[tokio::test]
async fn list_catalog_urls_are_fully_qualified() {
    let mut server = Server::new_async().await;
    let _mock = mock_json(&mut server, INDEX_PATH, INDEX).await;
    let base = server.url();

    let urls = query_for(&server).list_catalog_urls().await.unwrap();
    assert_eq!(
        urls,
        vec![
            format!("{base}/offers/v1.0/aws/AmazonEC2/current/index.json"),
            format!("{base}/offers/v1.0/aws/AmazonRDS/current/index.json"),
        ]
    );
}

#[tokio::test]
async fn fetch_index_raw_and_structured() {
    let mut server = Server::new_async().await;
    let index = server
        .mock("GET", INDEX_PATH)
        .with_status(200)
        .with_body(INDEX)
        .expect(2)
        .create_async()
        .await;
    let query = query_for(&server);

    let raw = query.fetch_index(IndexFormat::Raw).await.unwrap();
    assert_eq!(raw, IndexDocument::Raw(INDEX.to_string()));

    match query.fetch_index(IndexFormat::Structured).await.unwrap() {
        IndexDocument::Structured(doc) => {
            assert_eq!(doc["formatVersion"], "v1.0");
            assert!(doc["offers"]["AmazonRDS"].is_object());
        }
        other => panic!("expected structured index, got {other:?}"),
    }
    index.assert_async().await;
}
