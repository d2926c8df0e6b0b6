//! Batch aggregation
//!
//! Batch actions run their Operation once per item of a collection field. Each
//! item gets its own transaction scope, so one failing item is rolled back on
//! its own and never stops the rest. Partial success is a normal outcome: the
//! envelope reports `success: true` with the per-item results split into a
//! succeeded list and a failed list.

use serde_json::{json, Map, Value};

use crate::descriptor::{BatchSpec, BatchStyle};
use crate::error::OperationError;
use crate::session::{invoke, OperationOutput, OperationResult, Session};

/// One element of a batch collection
#[derive(Debug, Clone, PartialEq)]
pub struct BatchItem {
    /// Stable name of the item (row name, actor label, or index)
    pub key: String,
    pub value: Value,
}

impl BatchItem {
    /// Split a collection value into items
    ///
    /// Objects yield one item per member, keyed by member name. Arrays yield one
    /// item per element, keyed by the element itself when it is a string, by
    /// its `key_field` member when it is an object carrying one, else by index.
    pub fn collect(collection: &Value, key_field: &str) -> Vec<Self> {
        match collection {
            Value::Object(members) => members
                .iter()
                .map(|(key, value)| Self {
                    key: key.clone(),
                    value: value.clone(),
                })
                .collect(),
            Value::Array(elements) => elements
                .iter()
                .enumerate()
                .map(|(index, value)| {
                    let key = match value {
                        Value::String(s) => s.clone(),
                        Value::Object(obj) => obj
                            .get(key_field)
                            .and_then(Value::as_str)
                            .map_or_else(|| index.to_string(), str::to_string),
                        _ => index.to_string(),
                    };
                    Self {
                        key,
                        value: value.clone(),
                    }
                })
                .collect(),
            Value::Null => Vec::new(),
            single => vec![Self {
                key: "0".to_string(),
                value: single.clone(),
            }],
        }
    }
}

/// Per-item outcomes of a batch run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub succeeded: Vec<(String, OperationOutput)>,
    pub failed: Vec<(String, OperationError)>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// Summary line for the envelope `message`
    pub fn message(&self, spec: &BatchSpec) -> String {
        format!(
            "Batch finished: {} {}, {} failed",
            self.succeeded.len(),
            spec.succeeded,
            self.failed.len()
        )
    }

    /// Lay the report out as envelope fields according to `spec`
    pub fn into_output(self, spec: &BatchSpec) -> OperationOutput {
        let mut out = Map::new();
        let succeeded_count = self.succeeded.len();
        let failed_count = self.failed.len();

        match spec.style {
            BatchStyle::Keyed => {
                let keys: Vec<Value> = self
                    .succeeded
                    .into_iter()
                    .map(|(key, _)| Value::String(key))
                    .collect();
                let failures: Map<String, Value> = self
                    .failed
                    .into_iter()
                    .map(|(key, err)| (key, Value::String(err.message)))
                    .collect();
                out.insert(spec.succeeded.clone(), Value::Array(keys));
                out.insert(spec.failed.clone(), Value::Object(failures));
            }
            BatchStyle::Listed => {
                let entries: Vec<Value> = self
                    .succeeded
                    .into_iter()
                    .map(|(key, output)| {
                        let mut entry = output;
                        entry.insert(spec.key_field.clone(), Value::String(key));
                        entry.insert("success".to_string(), Value::Bool(true));
                        Value::Object(entry)
                    })
                    .collect();
                let failures: Vec<Value> = self
                    .failed
                    .into_iter()
                    .map(|(key, err)| {
                        json!({
                            spec.key_field.clone(): key,
                            "success": false,
                            "error": err.message,
                            "error_code": err.code,
                        })
                    })
                    .collect();
                out.insert(spec.succeeded.clone(), Value::Array(entries));
                out.insert(spec.failed.clone(), Value::Array(failures));
            }
        }

        out.insert(format!("{}_count", spec.succeeded), json!(succeeded_count));
        out.insert(format!("{}_count", spec.failed), json!(failed_count));
        out
    }
}

/// Run `operation` once per item, each inside its own transaction
pub fn run_batch<S, F>(session: &mut S, label: &str, items: &[BatchItem], mut operation: F) -> BatchReport
where
    S: Session,
    F: FnMut(&mut S, &BatchItem) -> OperationResult,
{
    let mut report = BatchReport::default();

    for item in items {
        let scope = format!("{label}[{}]", item.key);
        match invoke(session, &scope, |s| operation(s, item)) {
            Ok(output) => report.succeeded.push((item.key.clone(), output)),
            Err(err) => {
                tracing::info!(item = %item.key, code = %err.code, "Batch item failed");
                report.failed.push((item.key.clone(), err));
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[derive(Default)]
    struct Rows {
        names: Vec<String>,
        snapshot: Option<Vec<String>>,
    }

    impl Session for Rows {
        fn begin_transaction(&mut self, _label: &str) {
            self.snapshot = Some(self.names.clone());
        }

        fn commit(&mut self) {
            self.snapshot = None;
        }

        fn rollback(&mut self) {
            if let Some(names) = self.snapshot.take() {
                self.names = names;
            }
        }
    }

    fn add_row(rows: &mut Rows, item: &BatchItem) -> OperationResult {
        if rows.names.contains(&item.key) {
            return Err(OperationError::already_exists("Row already exists"));
        }
        rows.names.push(item.key.clone());
        Ok(Map::new())
    }

    #[test]
    fn test_collect_object_and_array() {
        let from_object = BatchItem::collect(&json!({"A": {"x": 1}, "B": {"x": 2}}), "key");
        assert_eq!(from_object.len(), 2);
        assert_eq!(from_object[0].key, "A");

        let from_array = BatchItem::collect(&json!(["X", {"label": "Y"}, 3]), "label");
        let keys: Vec<&str> = from_array.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, vec!["X", "Y", "2"]);
    }

    #[test]
    fn test_partial_failure_continues() {
        let mut rows = Rows {
            names: vec!["A".to_string()],
            snapshot: None,
        };
        let items = BatchItem::collect(&json!({"A": {}, "B": {}, "C": {}}), "key");
        let report = run_batch(&mut rows, "add_rows", &items, add_row);

        assert_eq!(report.total(), 3);
        assert_eq!(report.succeeded.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].1.code, ErrorCode::AlreadyExists);
        assert_eq!(rows.names, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_keyed_layout() {
        let report = BatchReport {
            succeeded: vec![("B".to_string(), Map::new())],
            failed: vec![(
                "A".to_string(),
                OperationError::already_exists("Row already exists"),
            )],
        };
        let spec = BatchSpec::keyed("rows", "added_rows", "failed_rows");
        let out = Value::Object(report.into_output(&spec));
        assert_eq!(out["added_rows"], json!(["B"]));
        assert_eq!(out["failed_rows"], json!({"A": "Row already exists"}));
        assert_eq!(out["added_rows_count"], json!(1));
    }

    #[test]
    fn test_listed_layout() {
        let report = BatchReport {
            succeeded: vec![("X".to_string(), Map::new())],
            failed: vec![("Y".to_string(), OperationError::new(ErrorCode::ActorNotFound, "No actor 'Y'"))],
        };
        let spec = BatchSpec::listed("actor_labels", "removed", "label");
        let out = Value::Object(report.into_output(&spec));
        assert_eq!(out["removed"], json!([{"label": "X", "success": true}]));
        assert_eq!(out["failed"][0]["label"], json!("Y"));
        assert_eq!(out["failed"][0]["success"], json!(false));
        assert_eq!(out["failed"][0]["error_code"], json!("ACTOR_NOT_FOUND"));
        assert_eq!(out["removed_count"], json!(1));
        assert_eq!(out["failed_count"], json!(1));
    }
}
