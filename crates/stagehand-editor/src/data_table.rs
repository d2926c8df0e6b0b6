//! `manage_data_table`: data table assets and their rows

use serde_json::{Map, Value, json};
use stagehand_core::prelude::*;

use crate::document::EditorDocument;

/// Actions understood by `manage_data_table`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataTableAction {
    Create,
    ListRows,
    GetRow,
    AddRow,
    AddRows,
    UpdateRow,
    RenameRow,
    RemoveRow,
    RemoveRows,
    ClearRows,
}

impl ToolAction for DataTableAction {
    const ALL: &'static [Self] = &[
        Self::Create,
        Self::ListRows,
        Self::GetRow,
        Self::AddRow,
        Self::AddRows,
        Self::UpdateRow,
        Self::RenameRow,
        Self::RemoveRow,
        Self::RemoveRows,
        Self::ClearRows,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::ListRows => "list_rows",
            Self::GetRow => "get_row",
            Self::AddRow => "add_row",
            Self::AddRows => "add_rows",
            Self::UpdateRow => "update_row",
            Self::RenameRow => "rename_row",
            Self::RemoveRow => "remove_row",
            Self::RemoveRows => "remove_rows",
            Self::ClearRows => "clear_rows",
        }
    }
}

/// The `manage_data_table` tool
#[derive(Debug, Clone, Copy, Default)]
pub struct DataTableTool;

fn table_path() -> FieldSpec {
    FieldSpec::string("table_path")
        .aliases(["TablePath", "data_table", "DataTable", "path"])
        .required()
        .describe("Asset path of the data table, e.g. /Game/Data/DT_Items")
}

fn row_name() -> FieldSpec {
    FieldSpec::string("row_name")
        .aliases(["RowName", "name"])
        .required()
}

fn row_data() -> FieldSpec {
    FieldSpec::object("row_data")
        .aliases(["RowData", "data", "values"])
        .describe("Field values keyed by row struct field name")
}

fn row_json(name: &str, values: &Map<String, Value>) -> Value {
    json!({"row_name": name, "row_data": values})
}

impl Tool<EditorDocument> for DataTableTool {
    type Action = DataTableAction;

    fn name(&self) -> &'static str {
        "manage_data_table"
    }

    fn description(&self) -> &'static str {
        "Create data tables and list, add, update, rename or remove their rows"
    }

    fn describe(&self, action: DataTableAction) -> ActionDescriptor {
        let base = ActionDescriptor::new(self.name(), action.name()).field(table_path());
        match action {
            DataTableAction::Create => base
                .summary("Create an empty data table for a row struct")
                .field(
                    FieldSpec::string("row_struct")
                        .aliases(["RowStruct", "struct", "struct_path"])
                        .required(),
                ),
            DataTableAction::ListRows => base.summary("List row names"),
            DataTableAction::GetRow => base.summary("Read one row").field(row_name()),
            DataTableAction::AddRow => base
                .summary("Add one row; omitted fields take struct defaults")
                .field(row_name())
                .field(row_data().default_value(json!({}))),
            DataTableAction::AddRows => base
                .summary("Add many rows; existing rows are reported, not overwritten")
                .field(
                    FieldSpec::object("rows")
                        .required()
                        .describe("Row name -> row data"),
                )
                .batch(BatchSpec::keyed("rows", "added_rows", "failed_rows")),
            DataTableAction::UpdateRow => base
                .summary("Merge values into an existing row")
                .field(row_name())
                .field(row_data().required()),
            DataTableAction::RenameRow => base
                .summary("Rename a row")
                .field(row_name())
                .field(
                    FieldSpec::string("new_name")
                        .aliases(["NewName", "new_row_name"])
                        .required(),
                ),
            DataTableAction::RemoveRow => base.summary("Remove one row").field(row_name()),
            DataTableAction::RemoveRows => base
                .summary("Remove many rows by name")
                .field(FieldSpec::array("row_names").alias("RowNames").required())
                .batch(BatchSpec::listed("row_names", "removed", "row_name")),
            DataTableAction::ClearRows => base
                .summary("Remove every row; requires confirm=true")
                .requires_confirmation(),
        }
    }

    fn execute(
        &self,
        action: DataTableAction,
        doc: &mut EditorDocument,
        params: &ResolvedParameters,
    ) -> OperationResult {
        let path = params.require_str("table_path")?;
        let mut out = Map::new();

        match action {
            DataTableAction::Create => {
                let row_struct = params.require_str("row_struct")?;
                let table = doc.create_table(path, row_struct)?;
                out.insert("table_path".into(), json!(table.path));
                out.insert("row_struct".into(), json!(table.row_struct));
                out.insert("message".into(), json!(format!("Created data table '{path}'")));
            }
            DataTableAction::ListRows => {
                let table = doc.table(path)?;
                out.insert("row_struct".into(), json!(table.row_struct));
                out.insert("row_names".into(), json!(table.row_names()));
                out.insert("count".into(), json!(table.rows().len()));
            }
            DataTableAction::GetRow => {
                let name = params.require_str("row_name")?;
                let row = doc.table(path)?.find_row(name)?;
                out.insert("row".into(), row_json(&row.name, &row.values));
            }
            DataTableAction::AddRow => {
                let name = params.require_str("row_name")?;
                let data = params.object("row_data").cloned().unwrap_or_default();
                let row = doc.add_row(path, name, data)?;
                out.insert("row".into(), row_json(&row.name, &row.values));
                out.insert("message".into(), json!(format!("Added row '{name}'")));
            }
            DataTableAction::UpdateRow => {
                let name = params.require_str("row_name")?;
                let data = params.require_object("row_data")?;
                let row = doc.update_row(path, name, data)?;
                out.insert("row".into(), row_json(&row.name, &row.values));
                out.insert("message".into(), json!(format!("Updated row '{name}'")));
            }
            DataTableAction::RenameRow => {
                let name = params.require_str("row_name")?;
                let new_name = params.require_str("new_name")?;
                doc.rename_row(path, name, new_name)?;
                out.insert("previous_name".into(), json!(name));
                out.insert("row_name".into(), json!(new_name));
                out.insert("message".into(), json!(format!("Renamed row '{name}' to '{new_name}'")));
            }
            DataTableAction::RemoveRow => {
                let name = params.require_str("row_name")?;
                let row = doc.remove_row(path, name)?;
                out.insert("row_name".into(), json!(row.name));
                out.insert("message".into(), json!(format!("Removed row '{name}'")));
            }
            DataTableAction::ClearRows => {
                let cleared = doc.clear_rows(path)?;
                out.insert("cleared_count".into(), json!(cleared));
                out.insert("message".into(), json!(format!("Cleared {cleared} rows from '{path}'")));
            }
            DataTableAction::AddRows | DataTableAction::RemoveRows => {
                return Err(OperationError::new(
                    ErrorCode::OperationFailed,
                    format!("'{}' runs once per item", action.name()),
                ));
            }
        }

        Ok(out)
    }

    fn prepare_batch(
        &self,
        _action: DataTableAction,
        doc: &EditorDocument,
        params: &ResolvedParameters,
    ) -> Result<(), OperationError> {
        doc.table(params.require_str("table_path")?)?;
        Ok(())
    }

    fn execute_item(
        &self,
        action: DataTableAction,
        doc: &mut EditorDocument,
        params: &ResolvedParameters,
        item: &BatchItem,
    ) -> OperationResult {
        let path = params.require_str("table_path")?;

        match action {
            DataTableAction::AddRows => {
                let data = match &item.value {
                    Value::Object(values) => values.clone(),
                    Value::Null => Map::new(),
                    other => {
                        return Err(OperationError::invalid_value(format!(
                            "Row data must be an object, got {other}"
                        )));
                    }
                };
                doc.add_row(path, &item.key, data)?;
                Ok(Map::new())
            }
            DataTableAction::RemoveRows => {
                let name = item
                    .value
                    .as_str()
                    .ok_or_else(|| OperationError::invalid_value("Row names must be strings"))?;
                doc.remove_row(path, name)?;
                Ok(Map::new())
            }
            _ => Err(OperationError::new(
                ErrorCode::OperationFailed,
                format!("'{}' cannot run per item", action.name()),
            )),
        }
    }
}
