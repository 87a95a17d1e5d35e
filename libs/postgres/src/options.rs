use serde::Deserialize;

/// How literal values reach the generated SQL
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterStyle {
    /// `$1, $2, ...` placeholders with the values returned alongside
    #[default]
    Bind,
    /// Values written into the SQL through literal quoting
    Inline,
}

/// Options for SQL compilation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SqlOptions {
    /// JSONB column holding the documents
    pub data_column: String,
    pub parameter_style: ParameterStyle,
    /// Use ILIKE for the string functions
    pub case_insensitive: bool,
}

impl Default for SqlOptions {
    fn default() -> Self {
        Self {
            data_column: "data".to_string(),
            parameter_style: ParameterStyle::Bind,
            case_insensitive: false,
        }
    }
}
