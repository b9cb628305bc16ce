use ferry_common::AdapterProperties;
use ferry_sql::types::DataType;
use ferry_sql::SqlNode;

/// A query fragment the host planner wants executed remotely.
#[derive(Debug, Clone)]
pub struct PushdownRequest {
    pub statement: SqlNode,
    /// Result types already known to the host, in select-list order.
    pub select_list_data_types: Option<Vec<DataType>>,
    pub properties: AdapterProperties,
    /// Schema adapter notes captured when the virtual schema was last read.
    pub adapter_notes: Option<String>,
    pub host_version: Option<String>,
}

impl PushdownRequest {
    pub fn new(statement: SqlNode, properties: AdapterProperties) -> Self {
        Self {
            statement,
            select_list_data_types: None,
            properties,
            adapter_notes: None,
            host_version: None,
        }
    }

    pub fn with_select_list_data_types(mut self, types: Vec<DataType>) -> Self {
        self.select_list_data_types = Some(types);
        self
    }

    pub fn with_adapter_notes(mut self, notes: impl Into<String>) -> Self {
        self.adapter_notes = Some(notes.into());
        self
    }

    pub fn with_host_version(mut self, version: impl Into<String>) -> Self {
        self.host_version = Some(version.into());
        self
    }
}
