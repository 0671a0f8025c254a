//! Stream node definition

use crate::api::ApiRequest;
use crate::config::TapConfig;
use crate::context::Context;
use crate::decode::SEARCH_RESULTS;
use crate::error::Result;
use crate::query::Report;
use crate::record::{self, Record, RowError};
use crate::types::{JsonObject, JsonValue};
use chrono::NaiveDate;
use std::fmt;

/// Index of a node inside its `Catalog`
pub type NodeId = usize;

/// Row hook run after flattening; `None` drops the row
pub type PostProcess = Box<dyn Fn(JsonObject, &Context) -> Option<JsonObject> + Send + Sync>;

/// Child context hook; `None` means no fan-out for this record
pub type ContextDeriver = Box<dyn Fn(&Record, &Context) -> Option<Context> + Send + Sync>;

/// Which API capability a node reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestSpec {
    /// List the accounts visible to the credential
    AccessibleCustomers,
    /// Run a report query against the configured account
    Search {
        /// Query template selector
        report: Report,
        /// Optional page size override
        page_size: Option<u32>,
    },
}

/// One unit of extraction producing one named record stream
///
/// Nodes are immutable once added to a catalog.
pub struct StreamNode {
    pub(crate) name: String,
    pub(crate) parent: Option<String>,
    pub(crate) request: RequestSpec,
    pub(crate) record_path: String,
    pub(crate) primary_key: Vec<String>,
    pub(crate) replication_key: Option<String>,
    pub(crate) schema_ref: String,
    post_process: Option<PostProcess>,
    context_deriver: Option<ContextDeriver>,
}

impl StreamNode {
    /// Create a root node with no key, no hooks and the search result locator
    pub fn new(name: impl Into<String>, request: RequestSpec) -> Self {
        let name = name.into();
        Self {
            schema_ref: format!("{name}.json"),
            name,
            parent: None,
            request,
            record_path: SEARCH_RESULTS.to_string(),
            primary_key: Vec::new(),
            replication_key: None,
            post_process: None,
            context_deriver: None,
        }
    }

    /// Search node for a report
    pub fn report(name: impl Into<String>, report: Report) -> Self {
        Self::new(
            name,
            RequestSpec::Search {
                report,
                page_size: None,
            },
        )
    }

    /// Attach to a parent node by name
    #[must_use]
    pub fn child_of(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Set the record locator
    #[must_use]
    pub fn record_path(mut self, path: impl Into<String>) -> Self {
        self.record_path = path.into();
        self
    }

    /// Set the ordered primary key fields
    #[must_use]
    pub fn primary_key<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Set the schema reference handed to the sink
    #[must_use]
    pub fn schema_ref(mut self, schema: impl Into<String>) -> Self {
        self.schema_ref = schema.into();
        self
    }

    /// Set the page size for search requests
    #[must_use]
    pub fn page_size(mut self, size: u32) -> Self {
        if let RequestSpec::Search { page_size, .. } = &mut self.request {
            *page_size = Some(size);
        }
        self
    }

    /// Set the row hook
    #[must_use]
    pub fn post_process(
        mut self,
        hook: impl Fn(JsonObject, &Context) -> Option<JsonObject> + Send + Sync + 'static,
    ) -> Self {
        self.post_process = Some(Box::new(hook));
        self
    }

    /// Set the child context hook
    #[must_use]
    pub fn derive_context(
        mut self,
        hook: impl Fn(&Record, &Context) -> Option<Context> + Send + Sync + 'static,
    ) -> Self {
        self.context_deriver = Some(Box::new(hook));
        self
    }

    /// Stream name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent stream name
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Ordered primary key fields
    pub fn key_fields(&self) -> &[String] {
        &self.primary_key
    }

    /// Replication key; always `None` for full-refresh streams
    pub fn replication_key(&self) -> Option<&str> {
        self.replication_key.as_deref()
    }

    /// Schema reference
    pub fn schema(&self) -> &str {
        &self.schema_ref
    }

    /// Request capability
    pub fn request_spec(&self) -> RequestSpec {
        self.request
    }

    /// Build the request for one invocation
    ///
    /// The account id is always taken from configuration. The context only
    /// decides whether the node runs, never what it asks for.
    pub fn request(
        &self,
        config: &TapConfig,
        _context: &Context,
        today: NaiveDate,
    ) -> Result<ApiRequest> {
        let request = match self.request {
            RequestSpec::AccessibleCustomers => ApiRequest::list_accessible_customers(),
            RequestSpec::Search { report, page_size } => {
                let query = report.template().render(config, today)?;
                ApiRequest::search(&config.customer_id, query).with_page_size(page_size)
            }
        };
        Ok(request.with_record_path(&self.record_path))
    }

    /// Turn one raw row into a record
    ///
    /// `Ok(None)` means the row hook dropped the row.
    pub fn to_record(
        &self,
        row: &JsonValue,
        context: &Context,
    ) -> std::result::Result<Option<Record>, RowError> {
        let fields = record::flatten(row)?;
        let fields = match &self.post_process {
            Some(hook) => match hook(fields, context) {
                Some(fields) => fields,
                None => return Ok(None),
            },
            None => fields,
        };
        Record::from_fields(fields, &self.primary_key).map(Some)
    }

    /// Context for children of this record, if any
    pub fn child_context(&self, record: &Record, context: &Context) -> Option<Context> {
        self.context_deriver
            .as_ref()
            .and_then(|derive| derive(record, context))
    }
}

impl fmt::Debug for StreamNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamNode")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("request", &self.request)
            .field("record_path", &self.record_path)
            .field("primary_key", &self.primary_key)
            .field("post_process", &self.post_process.is_some())
            .field("context_deriver", &self.context_deriver.is_some())
            .finish_non_exhaustive()
    }
}
