//! Integration tests for `SqliteStore` against an in-memory database.

use ecoprint_core::{
  Document, Namespace,
  index::{IndexModel, SortOrder},
  schema::{self, JsonSchema, Validator},
  store::{DocumentStore, FindOptions, StoreError},
  validate::ViolationKind,
};
use serde_json::{Value, json};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn ns(collection: &str) -> Namespace { Namespace::new("testdb", collection) }

fn doc(v: Value) -> Document {
  match v {
    Value::Object(m) => m,
    _ => panic!("not an object"),
  }
}

fn metric(kind: &str, at: &str) -> Document {
  doc(json!({
    "metric_type": kind,
    "timestamp":   { "$date": at },
  }))
}

async fn metrics_store() -> SqliteStore {
  let s = store().await;
  s.create_collection(ns("metrics"), Some(schema::metrics().validator))
    .await
    .unwrap();
  s
}

// ─── Collections ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_list_collections() {
  let s = store().await;
  s.create_collection(ns("metrics"), None).await.unwrap();
  s.create_collection(ns("feedback"), None).await.unwrap();
  s.create_collection(Namespace::new("other", "metrics"), None)
    .await
    .unwrap();

  let names = s.list_collections("testdb".into()).await.unwrap();
  assert_eq!(names, ["feedback", "metrics"]);

  let other = s.list_collections("other".into()).await.unwrap();
  assert_eq!(other, ["metrics"]);
}

#[tokio::test]
async fn create_collection_twice_conflicts() {
  let s = metrics_store().await;
  let err = s
    .create_collection(ns("metrics"), Some(schema::metrics().validator))
    .await
    .unwrap_err();

  assert!(matches!(err, Error::CollectionExists(ref n) if *n == ns("metrics")));
  assert!(err.is_collection_conflict());
}

#[tokio::test]
async fn validator_is_persisted() {
  let s = metrics_store().await;
  let v = s.collection_validator(ns("metrics")).await.unwrap();
  assert_eq!(v, Some(schema::metrics().validator));

  s.create_collection(ns("raw"), None).await.unwrap();
  assert_eq!(s.collection_validator(ns("raw")).await.unwrap(), None);
}

#[tokio::test]
async fn validator_of_missing_collection_is_not_found() {
  let s = store().await;
  let err = s.collection_validator(ns("nope")).await.unwrap_err();
  assert!(matches!(err, Error::CollectionNotFound(_)));
  assert!(!err.is_collection_conflict());
}

#[tokio::test]
async fn invalid_collection_name_is_rejected() {
  let s = store().await;
  let err = s
    .create_collection(Namespace::new("testdb", "bad\"name"), None)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::InvalidName(_)));
}

// ─── Indexes ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn new_collection_has_primary_index() {
  let s = metrics_store().await;
  let indexes = s.list_indexes(ns("metrics")).await.unwrap();
  assert_eq!(indexes, [IndexModel::primary()]);
}

#[tokio::test]
async fn create_index_is_listed_and_idempotent() {
  let s = metrics_store().await;

  let name = s
    .create_index(ns("metrics"), IndexModel::descending("timestamp"))
    .await
    .unwrap();
  assert_eq!(name, "timestamp_-1");

  s.create_index(ns("metrics"), IndexModel::descending("timestamp"))
    .await
    .unwrap();
  s.create_index(ns("metrics"), IndexModel::ascending("metric_type"))
    .await
    .unwrap();

  let names: Vec<String> = s
    .list_indexes(ns("metrics"))
    .await
    .unwrap()
    .into_iter()
    .map(|i| i.name)
    .collect();
  assert_eq!(names, ["_id_", "timestamp_-1", "metric_type_1"]);
}

#[tokio::test]
async fn index_is_a_sqlite_expression_index() {
  let s = metrics_store().await;
  s.create_index(ns("metrics"), IndexModel::descending("timestamp"))
    .await
    .unwrap();

  let sql: String = s
    .conn
    .call(|conn| {
      Ok(conn.query_row(
        "SELECT sql FROM sqlite_master WHERE type = 'index' AND name = ?1",
        ["testdb.metrics.timestamp_-1"],
        |row| row.get(0),
      )?)
    })
    .await
    .unwrap();
  assert!(sql.contains("json_extract(doc, '$.timestamp') DESC"), "{sql}");
}

#[tokio::test]
async fn create_index_on_missing_collection_fails() {
  let s = store().await;
  let err = s
    .create_index(ns("ghost"), IndexModel::ascending("x"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::CollectionNotFound(_)));
}

#[tokio::test]
async fn create_index_rejects_unsafe_field() {
  let s = metrics_store().await;
  let err = s
    .create_index(ns("metrics"), IndexModel::ascending("a'); DROP TABLE x; --"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::InvalidName(_)));
}

#[tokio::test]
async fn create_index_rejects_empty_key_list() {
  let s = metrics_store().await;
  let err = s
    .create_index(ns("metrics"), IndexModel::new(vec![]))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::EmptyIndex(_)), "{err}");
  let indexes = s.list_indexes(ns("metrics")).await.unwrap();
  assert_eq!(indexes.len(), 1);
}

#[tokio::test]
async fn catalog_enforces_index_foreign_key() {
  let s = store().await;
  let res = s
    .conn
    .call(|conn| {
      Ok(conn.execute(
        "INSERT INTO indexes (database, collection, name, keys, created_at)
         VALUES ('testdb', 'ghost', 'x_1', '[]', '2024-01-01T00:00:00Z')",
        [],
      )?)
    })
    .await;
  assert!(res.is_err());
}

// ─── Inserts ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_assigns_id() {
  let s = metrics_store().await;
  let id = s
    .insert_one(ns("metrics"), metric("latency", "2024-01-01T00:00:00.000000Z"))
    .await
    .unwrap();
  assert!(uuid::Uuid::parse_str(&id).is_ok());

  let docs = s.find(ns("metrics"), &FindOptions::new()).await.unwrap();
  assert_eq!(docs.len(), 1);
  assert_eq!(docs[0]["_id"], Value::String(id));
  assert_eq!(docs[0]["metric_type"], "latency");
}

#[tokio::test]
async fn insert_keeps_caller_id_and_rejects_duplicates() {
  let s = metrics_store().await;
  let mut d = metric("latency", "2024-01-01T00:00:00.000000Z");
  d.insert("_id".into(), json!("m-1"));

  let id = s.insert_one(ns("metrics"), d.clone()).await.unwrap();
  assert_eq!(id, "m-1");

  let err = s.insert_one(ns("metrics"), d).await.unwrap_err();
  assert!(matches!(err, Error::DuplicateId { ref id, .. } if id == "m-1"));
  assert_eq!(s.count_documents(ns("metrics")).await.unwrap(), 1);
}

#[tokio::test]
async fn ids_of_different_types_do_not_collide() {
  let s = store().await;
  s.create_collection(ns("things"), None).await.unwrap();

  let number = s
    .insert_one(ns("things"), doc(json!({ "_id": 5, "kind": "number" })))
    .await
    .unwrap();
  let text = s
    .insert_one(ns("things"), doc(json!({ "_id": "5", "kind": "text" })))
    .await
    .unwrap();
  assert_eq!(number, "5");
  assert_eq!(text, "5");
  assert_eq!(s.count_documents(ns("things")).await.unwrap(), 2);

  let err = s
    .insert_one(ns("things"), doc(json!({ "_id": 5 })))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::DuplicateId { .. }));

  let opts = FindOptions::new().filter_eq("_id", json!(5));
  let found = s.find(ns("things"), &opts).await.unwrap();
  assert_eq!(found.len(), 1);
  assert_eq!(found[0]["kind"], "number");
}

#[tokio::test]
async fn insert_rejected_by_validator() {
  let s = metrics_store().await;
  let err = s
    .insert_one(ns("metrics"), doc(json!({ "metric_type": "latency" })))
    .await
    .unwrap_err();

  match err {
    Error::DocumentValidation { namespace, violations } => {
      assert_eq!(namespace, ns("metrics"));
      assert_eq!(violations.len(), 1);
      assert_eq!(violations[0].path, "timestamp");
      assert_eq!(violations[0].kind, ViolationKind::MissingRequired);
    }
    other => panic!("unexpected error: {other}"),
  }
  assert_eq!(s.count_documents(ns("metrics")).await.unwrap(), 0);
}

#[tokio::test]
async fn validation_error_message_lists_violations() {
  let s = metrics_store().await;
  let err = s
    .insert_one(ns("metrics"), doc(json!({ "timestamp": "now" })))
    .await
    .unwrap_err();
  let msg = err.to_string();
  assert!(msg.contains("testdb.metrics"), "{msg}");
  assert!(msg.contains("metric_type: required field is missing"), "{msg}");
  assert!(msg.contains("timestamp: expected date, found string"), "{msg}");
}

#[tokio::test]
async fn collection_without_validator_accepts_anything() {
  let s = store().await;
  s.create_collection(ns("raw"), None).await.unwrap();
  s.insert_one(ns("raw"), doc(json!({ "anything": [1, 2, 3] })))
    .await
    .unwrap();
  assert_eq!(s.count_documents(ns("raw")).await.unwrap(), 1);
}

#[tokio::test]
async fn custom_validator_is_enforced() {
  let s = store().await;
  let v: Validator = JsonSchema::object()
    .required(["n"])
    .property("n", JsonSchema::int().range(0.0, 10.0))
    .into();
  s.create_collection(ns("bounded"), Some(v)).await.unwrap();

  s.insert_one(ns("bounded"), doc(json!({ "n": 10 })))
    .await
    .unwrap();
  let err = s
    .insert_one(ns("bounded"), doc(json!({ "n": 11 })))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::DocumentValidation { .. }));
}

#[tokio::test]
async fn insert_into_missing_collection_fails() {
  let s = store().await;
  let err = s
    .insert_one(ns("ghost"), doc(json!({})))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::CollectionNotFound(_)));
}

// ─── Queries ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn find_sorts_by_timestamp_descending() {
  let s = metrics_store().await;
  s.create_index(ns("metrics"), IndexModel::descending("timestamp"))
    .await
    .unwrap();

  for (kind, at) in [
    ("b", "2024-01-02T00:00:00.000000Z"),
    ("c", "2024-01-03T00:00:00.000000Z"),
    ("a", "2024-01-01T00:00:00.000000Z"),
  ] {
    s.insert_one(ns("metrics"), metric(kind, at)).await.unwrap();
  }

  let opts = FindOptions::new().sort_by("timestamp", SortOrder::Descending);
  let kinds: Vec<Value> = s
    .find(ns("metrics"), &opts)
    .await
    .unwrap()
    .into_iter()
    .map(|d| d["metric_type"].clone())
    .collect();
  assert_eq!(kinds, [json!("c"), json!("b"), json!("a")]);
}

#[tokio::test]
async fn find_orders_dates_with_offsets_and_fractions() {
  let s = metrics_store().await;
  for (kind, at) in [
    ("earlier", "2031-01-01T00:00:00-05:00"),
    ("later_frac", "2031-01-01T01:00:00.5Z"),
    ("later", "2031-01-01T01:00:00Z"),
  ] {
    s.insert_one(ns("metrics"), metric(kind, at)).await.unwrap();
  }

  let opts = FindOptions::new().sort_by("timestamp", SortOrder::Descending);
  let docs = s.find(ns("metrics"), &opts).await.unwrap();
  let kinds: Vec<&Value> = docs.iter().map(|d| &d["metric_type"]).collect();
  assert_eq!(kinds, [&json!("later"), &json!("later_frac"), &json!("earlier")]);
  assert_eq!(
    docs[2]["timestamp"],
    json!({ "$date": "2031-01-01T05:00:00.000000Z" })
  );

  let opts = FindOptions::new()
    .filter_eq("timestamp", json!({ "$date": "2031-01-01T00:00:00-05:00" }));
  let found = s.find(ns("metrics"), &opts).await.unwrap();
  assert_eq!(found.len(), 1);
  assert_eq!(found[0]["metric_type"], "earlier");
}

#[tokio::test]
async fn find_filters_and_limits() {
  let s = metrics_store().await;
  for (kind, at) in [
    ("latency", "2024-01-01T00:00:00.000000Z"),
    ("drift", "2024-01-02T00:00:00.000000Z"),
    ("latency", "2024-01-03T00:00:00.000000Z"),
    ("latency", "2024-01-04T00:00:00.000000Z"),
  ] {
    s.insert_one(ns("metrics"), metric(kind, at)).await.unwrap();
  }

  let opts = FindOptions::new()
    .filter_eq("metric_type", "latency")
    .sort_by("timestamp", SortOrder::Ascending)
    .limit(2);
  let docs = s.find(ns("metrics"), &opts).await.unwrap();
  assert_eq!(docs.len(), 2);
  assert_eq!(
    docs[0]["timestamp"],
    json!({ "$date": "2024-01-01T00:00:00.000000Z" })
  );
  assert_eq!(
    docs[1]["timestamp"],
    json!({ "$date": "2024-01-03T00:00:00.000000Z" })
  );
}

#[tokio::test]
async fn find_filters_on_numbers_and_nested_fields() {
  let s = store().await;
  s.create_collection(ns("raw"), None).await.unwrap();
  s.insert_one(ns("raw"), doc(json!({ "n": 1, "loc": { "lat": 1.5 } })))
    .await
    .unwrap();
  s.insert_one(ns("raw"), doc(json!({ "n": 2, "loc": { "lat": 2.5 } })))
    .await
    .unwrap();

  let by_int = FindOptions::new().filter_eq("n", 2);
  let docs = s.find(ns("raw"), &by_int).await.unwrap();
  assert_eq!(docs.len(), 1);
  assert_eq!(docs[0]["loc"]["lat"], json!(2.5));

  let by_nested = FindOptions::new().filter_eq("loc.lat", 1.5);
  let docs = s.find(ns("raw"), &by_nested).await.unwrap();
  assert_eq!(docs.len(), 1);
  assert_eq!(docs[0]["n"], json!(1));
}

#[tokio::test]
async fn find_on_missing_collection_is_empty() {
  let s = store().await;
  let docs = s.find(ns("ghost"), &FindOptions::new()).await.unwrap();
  assert!(docs.is_empty());
  assert_eq!(s.count_documents(ns("ghost")).await.unwrap(), 0);
}

#[tokio::test]
async fn find_rejects_unsafe_sort_field() {
  let s = metrics_store().await;
  let opts = FindOptions::new().sort_by("x) --", SortOrder::Ascending);
  let err = s.find(ns("metrics"), &opts).await.unwrap_err();
  assert!(matches!(err, Error::InvalidName(_)));
}

#[tokio::test]
async fn store_persists_across_reopen() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("store.db");

  {
    let s = SqliteStore::open(&path).await.unwrap();
    s.create_collection(ns("metrics"), Some(schema::metrics().validator))
      .await
      .unwrap();
    s.insert_one(ns("metrics"), metric("latency", "2024-01-01T00:00:00.000000Z"))
      .await
      .unwrap();
  }

  let s = SqliteStore::open(&path).await.unwrap();
  assert_eq!(s.count_documents(ns("metrics")).await.unwrap(), 1);
  let err = s
    .create_collection(ns("metrics"), None)
    .await
    .unwrap_err();
  assert!(err.is_collection_conflict());
}
