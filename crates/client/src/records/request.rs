//! List-operation options and query building.

/// Options for listing records.
///
/// Every set field maps to a query parameter on the list endpoint;
/// unset fields are omitted from the request (and therefore from the
/// cache key).
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Name or id of the view to list from.
    pub view: Option<String>,

    /// Formula the server applies to filter rows.
    pub filter_by_formula: Option<String>,

    /// Server-side page size.
    pub page_size: Option<u16>,

    /// Cap on the number of records the server will return in total.
    pub max_records: Option<u32>,

    /// Continuation token returned with a previous page.
    pub offset: Option<String>,

    /// Force network access for this call without disabling caching
    /// for other calls.
    pub bypass_cache: bool,
}

impl ListOptions {
    /// Query pairs in wire order.
    pub(crate) fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(view) = &self.view {
            query.push(("view".to_string(), view.clone()));
        }
        if let Some(formula) = &self.filter_by_formula {
            query.push(("filterByFormula".to_string(), formula.clone()));
        }
        if let Some(size) = self.page_size {
            query.push(("pageSize".to_string(), size.to_string()));
        }
        if let Some(max) = self.max_records {
            query.push(("maxRecords".to_string(), max.to_string()));
        }
        if let Some(offset) = &self.offset {
            query.push(("offset".to_string(), offset.clone()));
        }
        query
    }
}
