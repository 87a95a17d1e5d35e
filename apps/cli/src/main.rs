//! sieve - inspect and compile OData queries
//!
//! ```text
//! sieve tokens "name eq 'val'"
//! sieve tree "a eq 1 and b eq 2 or c eq 3"
//! sieve mongo '$filter=qty gt 3&$top=10' --collection items
//! sieve sql "\$filter=startswith(code, '456')" --table items --inline
//! ```

mod config;
mod logging;

use std::path::PathBuf;

use anyhow::Context;
use bson::Bson;
use clap::{Parser, Subcommand};
use serde_json::json;

use crate::config::Config;
use sieve_mongo::FindQuery;
use sieve_postgres::{count_statement, select_statement, ParameterStyle};

#[derive(Parser)]
#[command(name = "sieve", version, about = "Inspect and compile OData queries")]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, env = "SIEVE_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Log level for the sieve crates
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the tokens of a $filter expression
    Tokens { filter: String },

    /// Print the parse tree of a $filter expression
    Tree {
        filter: String,
        /// Print the tree as JSON instead of an s-expression
        #[arg(long)]
        json: bool,
    },

    /// Compile a query string into a MongoDB command
    Mongo {
        /// Query string, e.g. '$filter=a eq 1&$top=5'
        query: String,
        #[arg(long, default_value = "collection")]
        collection: String,
        /// Emit the count command for the filter instead of find
        #[arg(long)]
        count: bool,
        /// Match string functions case-sensitively
        #[arg(long)]
        case_sensitive: bool,
    },

    /// Compile a query string into a PostgreSQL statement
    Sql {
        /// Query string, e.g. '$filter=a eq 1&$top=5'
        query: String,
        #[arg(long, default_value = "items")]
        table: String,
        /// Emit SELECT count(*) for the filter
        #[arg(long)]
        count: bool,
        /// Inline values instead of $n parameters
        #[arg(long)]
        inline: bool,
        /// JSONB column holding the documents
        #[arg(long)]
        data_column: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    config.logging.json |= cli.json_logs;
    logging::init_logging(&config.logging).context("Failed to initialize logging")?;

    match cli.command {
        Command::Tokens { filter } => {
            let tokens = sieve_odata::lexer::tokenize(&filter)
                .map_err(sieve_odata::Error::from)
                .context("Failed to tokenize filter")?;
            println!("{}", serde_json::to_string_pretty(&tokens)?);
        }
        Command::Tree { filter, json } => {
            let tree = sieve_odata::parse_filter(&filter).context("Failed to parse filter")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&tree)?);
            } else {
                println!("{tree}");
            }
        }
        Command::Mongo {
            query,
            collection,
            count,
            case_sensitive,
        } => {
            let mut options = config.mongo;
            options.case_insensitive &= !case_sensitive;

            let parsed = sieve_odata::parse_query_string(&query)
                .map_err(sieve_odata::Error::from)
                .context("Failed to parse query")?;
            let find = FindQuery::from_options(&parsed, &options)
                .map_err(sieve_odata::Error::from)
                .context("Failed to compile query")?;
            tracing::debug!(needs_total = find.needs_total(), "compiled mongo query");

            let command = if count {
                find.count_query().command(&collection)
            } else {
                find.command(&collection)
            };
            let output = Bson::Document(command).into_relaxed_extjson();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Sql {
            query,
            table,
            count,
            inline,
            data_column,
        } => {
            let mut options = config.postgres;
            if inline {
                options.parameter_style = ParameterStyle::Inline;
            }
            if let Some(column) = data_column {
                options.data_column = column;
            }

            let parsed = sieve_odata::parse_query_string(&query)
                .map_err(sieve_odata::Error::from)
                .context("Failed to parse query")?;
            let statement = if count {
                count_statement(&table, parsed.filter.as_ref(), &options)
            } else {
                select_statement(&table, &parsed, &options)
            }
            .map_err(sieve_odata::Error::from)
            .context("Failed to compile query")?;

            let output = json!({ "sql": statement.sql, "binds": statement.binds });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
