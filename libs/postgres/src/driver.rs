//! `sqlx` binding for compiled statements

use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::Query;

use crate::bind::BindValue;
use crate::statement::SqlQuery;

impl SqlQuery {
    /// A `sqlx` query with every bind value attached in placeholder order.
    /// Nothing is executed.
    pub fn to_sqlx(&self) -> Query<'_, Postgres, PgArguments> {
        let mut query = sqlx::query(&self.sql);
        for value in &self.binds {
            query = match value {
                BindValue::Text(v) => query.bind(v.clone()),
                BindValue::Integer(v) => query.bind(*v),
                BindValue::Float(v) => query.bind(*v),
                BindValue::Boolean(v) => query.bind(*v),
                BindValue::Date(v) => query.bind(*v),
                BindValue::Time(v) => query.bind(*v),
                BindValue::DateTime(v) => query.bind(*v),
            };
        }
        query
    }
}
