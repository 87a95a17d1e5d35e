//! Find and count queries assembled from query options

use bson::{doc, Bson, Document};

use sieve_odata::{CompileError, InlineCount, OrderDirection, QueryOptions};

use crate::compile::compile_with;
use crate::options::MongoOptions;

/// A compiled find request
#[derive(Debug, Clone, PartialEq)]
pub struct FindQuery {
    pub filter: Document,
    pub projection: Option<Document>,
    pub sort: Option<Document>,
    pub limit: Option<i64>,
    pub skip: Option<i64>,
    pub count: bool,
    pub inline_count: InlineCount,
}

/// A count request for the documents matched by a filter
#[derive(Debug, Clone, PartialEq)]
pub struct CountQuery {
    pub filter: Document,
}

impl FindQuery {
    pub fn from_options(
        options: &QueryOptions,
        mongo: &MongoOptions,
    ) -> Result<Self, CompileError> {
        let filter = match &options.filter {
            Some(node) => compile_with(node, mongo)?,
            None => Document::new(),
        };

        let projection = (!options.select.is_empty()).then(|| {
            options
                .select
                .iter()
                .map(|field| (field.clone(), Bson::Int32(1)))
                .collect::<Document>()
        });

        let sort = (!options.order_by.is_empty()).then(|| {
            options
                .order_by
                .iter()
                .map(|item| {
                    let direction = match item.direction {
                        OrderDirection::Asc => 1,
                        OrderDirection::Desc => -1,
                    };
                    (item.field.clone(), Bson::Int32(direction))
                })
                .collect::<Document>()
        });

        let query = Self {
            filter,
            projection,
            sort,
            limit: options.top.map(to_i64).transpose()?,
            skip: options.skip.map(to_i64).transpose()?,
            count: options.count,
            inline_count: options.inline_count,
        };
        tracing::debug!(filter = %query.filter, "compiled find query");
        Ok(query)
    }

    /// Count of everything this query matches, ignoring paging
    pub fn count_query(&self) -> CountQuery {
        CountQuery {
            filter: self.filter.clone(),
        }
    }

    /// Whether the caller asked for a total alongside (or instead of) results
    pub fn needs_total(&self) -> bool {
        self.count || self.inline_count == InlineCount::AllPages
    }

    /// Whether `$top=0` asked for no documents at all
    pub fn is_empty_page(&self) -> bool {
        self.limit == Some(0)
    }

    /// The `find` database command for `collection`.
    ///
    /// MongoDB reads `limit: 0` as no limit, so an empty page is sent as a
    /// filter that matches nothing instead.
    pub fn command(&self, collection: &str) -> Document {
        let filter = if self.is_empty_page() {
            doc! { "$expr": false }
        } else {
            self.filter.clone()
        };
        let mut command = doc! {
            "find": collection,
            "filter": filter,
        };
        if let Some(projection) = &self.projection {
            command.insert("projection", projection.clone());
        }
        if let Some(sort) = &self.sort {
            command.insert("sort", sort.clone());
        }
        if let Some(limit) = self.limit.filter(|&limit| limit > 0) {
            command.insert("limit", limit);
        }
        if let Some(skip) = self.skip {
            command.insert("skip", skip);
        }
        command
    }
}

impl CountQuery {
    /// Count of the whole collection
    pub fn collection() -> Self {
        Self {
            filter: Document::new(),
        }
    }

    /// The `count` database command for `collection`
    pub fn command(&self, collection: &str) -> Document {
        doc! {
            "count": collection,
            "query": self.filter.clone(),
        }
    }
}

fn to_i64(n: u64) -> Result<i64, CompileError> {
    i64::try_from(n).map_err(|_| CompileError::OutOfRange(n))
}
