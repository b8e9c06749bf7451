//! [`SqliteStore`] — the SQLite implementation of [`DocumentStore`].

use std::path::Path;

use chrono::Utc;
use ecoprint_core::{
  Document, Namespace, date,
  index::IndexModel,
  schema::Validator,
  store::{DocumentStore, FindOptions, ID_FIELD},
};
use rusqlite::OptionalExtension as _;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    RawIndex, check_name, check_namespace, create_index_sql, create_table_sql,
    decode_validator, display_id, encode_dt, encode_id, encode_keys, encode_validator,
    field_expr, key_expr, sql_value, table_name,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A document store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

/// Whether a row exists in the collection catalog.
fn collection_exists(
  conn: &rusqlite::Connection,
  database: &str,
  name: &str,
) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM collections WHERE database = ?1 AND name = ?2",
        rusqlite::params![database, name],
        |_| Ok(true),
      )
      .optional()?
      .unwrap_or(false),
  )
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run catalog initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Look up a collection's validator column.
  ///
  /// Outer `None`: no such collection. Inner `None`: no validator installed.
  async fn load_validator(&self, ns: &Namespace) -> Result<Option<Option<Validator>>> {
    let database = ns.database.clone();
    let name = ns.collection.clone();

    let raw: Option<Option<String>> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT validator FROM collections WHERE database = ?1 AND name = ?2",
              rusqlite::params![database, name],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    raw
      .map(|v| v.as_deref().map(decode_validator).transpose())
      .transpose()
  }
}

// ─── DocumentStore impl ──────────────────────────────────────────────────────

impl DocumentStore for SqliteStore {
  type Error = Error;

  // ── Collections ───────────────────────────────────────────────────────────

  async fn create_collection(
    &self,
    ns: Namespace,
    validator: Option<Validator>,
  ) -> Result<()> {
    check_namespace(&ns)?;

    let validator_str = validator.as_ref().map(encode_validator).transpose()?;
    let primary_keys  = encode_keys(&IndexModel::primary().keys)?;
    let primary_name  = IndexModel::primary().name;
    let table_sql     = create_table_sql(&ns);
    let at_str        = encode_dt(Utc::now());
    let database      = ns.database.clone();
    let name          = ns.collection.clone();

    let created: bool = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if collection_exists(&tx, &database, &name)? {
          return Ok(false);
        }
        tx.execute(
          "INSERT INTO collections (database, name, validator, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![database, name, validator_str, at_str],
        )?;
        tx.execute_batch(&table_sql)?;
        tx.execute(
          "INSERT INTO indexes (database, collection, name, keys, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![database, name, primary_name, primary_keys, at_str],
        )?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !created {
      return Err(Error::CollectionExists(ns));
    }
    debug!(collection = %ns, "collection table created");
    Ok(())
  }

  async fn list_collections(&self, database: String) -> Result<Vec<String>> {
    check_name(&database)?;

    let names = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT name FROM collections WHERE database = ?1 ORDER BY name",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![database], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(names)
  }

  async fn collection_validator(&self, ns: Namespace) -> Result<Option<Validator>> {
    check_namespace(&ns)?;
    match self.load_validator(&ns).await? {
      Some(validator) => Ok(validator),
      None => Err(Error::CollectionNotFound(ns)),
    }
  }

  // ── Indexes ───────────────────────────────────────────────────────────────

  async fn create_index(&self, ns: Namespace, model: IndexModel) -> Result<String> {
    check_namespace(&ns)?;

    let index_sql = create_index_sql(&ns, &model)?;
    let keys_str  = encode_keys(&model.keys)?;
    let at_str    = encode_dt(Utc::now());
    let database  = ns.database.clone();
    let name      = ns.collection.clone();
    let idx_name  = model.name.clone();

    let found: bool = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !collection_exists(&tx, &database, &name)? {
          return Ok(false);
        }
        tx.execute_batch(&index_sql)?;
        tx.execute(
          "INSERT OR IGNORE INTO indexes (database, collection, name, keys, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![database, name, idx_name, keys_str, at_str],
        )?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !found {
      return Err(Error::CollectionNotFound(ns));
    }
    debug!(collection = %ns, index = %model.name, "index ensured");
    Ok(model.name)
  }

  async fn list_indexes(&self, ns: Namespace) -> Result<Vec<IndexModel>> {
    check_namespace(&ns)?;

    let database = ns.database.clone();
    let name     = ns.collection.clone();

    let raws: Option<Vec<RawIndex>> = self
      .conn
      .call(move |conn| {
        if !collection_exists(conn, &database, &name)? {
          return Ok(None);
        }
        let mut stmt = conn.prepare(
          "SELECT name, keys FROM indexes
           WHERE database = ?1 AND collection = ?2
           ORDER BY rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![database, name], |row| {
            Ok(RawIndex { name: row.get(0)?, keys: row.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(Some(rows))
      })
      .await?;

    raws
      .ok_or(Error::CollectionNotFound(ns))?
      .into_iter()
      .map(RawIndex::into_model)
      .collect()
  }

  // ── Documents ─────────────────────────────────────────────────────────────

  async fn insert_one(&self, ns: Namespace, mut document: Document) -> Result<String> {
    check_namespace(&ns)?;

    let validator = self
      .load_validator(&ns)
      .await?
      .ok_or_else(|| Error::CollectionNotFound(ns.clone()))?;

    if let Some(validator) = &validator
      && let Err(violations) = validator.validate_document(&document)
    {
      return Err(Error::DocumentValidation { namespace: ns, violations });
    }

    document.values_mut().for_each(date::canonicalize);

    let id_value = document
      .entry(ID_FIELD)
      .or_insert_with(|| Value::String(Uuid::new_v4().hyphenated().to_string()))
      .clone();
    let id = display_id(&id_value);
    let id_param = encode_id(&id_value);

    let doc_str = Value::Object(document).to_string();
    let sql = format!("INSERT INTO {} (id, doc) VALUES (?1, ?2)", table_name(&ns));

    let inserted: bool = self
      .conn
      .call(move |conn| {
        match conn.execute(&sql, rusqlite::params![id_param, doc_str]) {
          Ok(_) => Ok(true),
          Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
          {
            Ok(false)
          }
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    if !inserted {
      return Err(Error::DuplicateId { namespace: ns, id });
    }
    Ok(id)
  }

  async fn find(&self, ns: Namespace, options: &FindOptions) -> Result<Vec<Document>> {
    check_namespace(&ns)?;

    let mut conds  = Vec::with_capacity(options.filter.len());
    let mut params = Vec::with_capacity(options.filter.len() + 1);
    for (field, value) in &options.filter {
      let mut value = value.clone();
      date::canonicalize(&mut value);
      conds.push(format!("{} IS ?{}", field_expr(field)?, params.len() + 1));
      params.push(sql_value(&value));
    }

    let mut order = options
      .sort
      .iter()
      .map(key_expr)
      .collect::<Result<Vec<_>>>()?;
    order.push("seq ASC".to_owned());

    let where_clause = if conds.is_empty() {
      String::new()
    } else {
      format!("WHERE {}", conds.join(" AND "))
    };

    // SQLite treats a negative LIMIT as "no limit".
    let limit = options
      .limit
      .map_or(-1, |n| i64::try_from(n).unwrap_or(i64::MAX));
    params.push(rusqlite::types::Value::Integer(limit));

    let sql = format!(
      "SELECT doc FROM {} {where_clause} ORDER BY {} LIMIT ?{}",
      table_name(&ns),
      order.join(", "),
      params.len()
    );
    let database = ns.database.clone();
    let name     = ns.collection.clone();

    let raws: Vec<String> = self
      .conn
      .call(move |conn| {
        if !collection_exists(conn, &database, &name)? {
          return Ok(Vec::new());
        }
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .iter()
      .map(|raw| serde_json::from_str::<Document>(raw).map_err(Error::from))
      .collect()
  }

  async fn count_documents(&self, ns: Namespace) -> Result<u64> {
    check_namespace(&ns)?;

    let sql      = format!("SELECT COUNT(*) FROM {}", table_name(&ns));
    let database = ns.database.clone();
    let name     = ns.collection.clone();

    let count: i64 = self
      .conn
      .call(move |conn| {
        if !collection_exists(conn, &database, &name)? {
          return Ok(0);
        }
        Ok(conn.query_row(&sql, [], |row| row.get(0))?)
      })
      .await?;

    Ok(count.max(0) as u64)
  }
}
