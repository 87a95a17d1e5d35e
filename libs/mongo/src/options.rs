use serde::Deserialize;

/// Options for document-store compilation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MongoOptions {
    /// Field whose `gt` comparisons take a hex object id
    pub id_field: String,
    /// Compile string functions to case-insensitive regexes
    pub case_insensitive: bool,
}

impl Default for MongoOptions {
    fn default() -> Self {
        Self {
            id_field: "_id".to_string(),
            case_insensitive: true,
        }
    }
}
