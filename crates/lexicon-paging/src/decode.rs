//! Conversion between SQLite values and JSON.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value as JsonValue;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteRow, SqliteValueRef};
use sqlx::{Column, Row as _, Sqlite, TypeInfo, Value, ValueRef};

use crate::source::Row;
use crate::{Error, Result};

/// Decode one SQLite value into JSON.
///
/// BLOBs become standard base64 strings. REAL NaN becomes null since JSON has
/// no representation for it.
pub fn to_json(value: SqliteValueRef<'_>) -> Result<JsonValue> {
   if value.is_null() {
      return Ok(JsonValue::Null);
   }

   let type_name = value.type_info().name().to_string();
   let owned = value.to_owned();

   let json = match type_name.as_str() {
      "TEXT" | "DATE" | "TIME" | "DATETIME" => {
         JsonValue::String(owned.try_decode_unchecked::<String>()?)
      }
      "INTEGER" | "INT8" | "BOOLEAN" => JsonValue::from(owned.try_decode_unchecked::<i64>()?),
      "REAL" => real_to_json(owned.try_decode_unchecked::<f64>()?),
      "NUMERIC" => match owned.try_decode_unchecked::<i64>() {
         Ok(int) => JsonValue::from(int),
         Err(_) => real_to_json(owned.try_decode_unchecked::<f64>()?),
      },
      "BLOB" => JsonValue::String(STANDARD.encode(owned.try_decode_unchecked::<Vec<u8>>()?)),
      other => return Err(Error::UnsupportedDatatype(other.to_string())),
   };

   Ok(json)
}

fn real_to_json(real: f64) -> JsonValue {
   serde_json::Number::from_f64(real)
      .map(JsonValue::Number)
      .unwrap_or(JsonValue::Null)
}

/// Decode fetched rows, preserving column order.
pub fn decode_rows(rows: Vec<SqliteRow>) -> Result<Vec<Row>> {
   let mut decoded = Vec::with_capacity(rows.len());
   for row in rows {
      let mut value = Row::default();
      for (i, column) in row.columns().iter().enumerate() {
         let raw = row.try_get_raw(i)?;
         value.insert(column.name().to_string(), to_json(raw)?);
      }
      decoded.push(value);
   }
   Ok(decoded)
}

/// Bind a JSON value with its native SQLite type.
///
/// Booleans bind as 0/1. Arrays and objects bind as JSON text.
pub fn bind_value<'q>(
   query: Query<'q, Sqlite, SqliteArguments<'q>>,
   value: JsonValue,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
   match value {
      JsonValue::Null => query.bind(None::<String>),
      JsonValue::Bool(flag) => query.bind(i64::from(flag)),
      JsonValue::String(text) => query.bind(text),
      JsonValue::Number(number) => {
         // Preserve integer precision by binding as i64 when possible
         if let Some(int) = number.as_i64() {
            query.bind(int)
         } else {
            query.bind(number.as_f64().unwrap_or_default())
         }
      }
      other => query.bind(other),
   }
}
