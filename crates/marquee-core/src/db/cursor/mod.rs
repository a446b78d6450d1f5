//! Module: db::cursor
//! Responsibility: the opaque continuation-cursor wire token.
//! Does not own: predicate construction or query execution.
//! Boundary: untrusted tokens are fully validated here before any I/O.
//!
//! Wire format: standard base64 of
//! `{"values": {col: val, ...}, "order": ["col_DIR", ...]}`.

mod error;
mod values;


pub use error::CursorError;
pub use values::CursorValues;

use crate::{
    MAX_CURSOR_TOKEN_LEN,
    db::{order::OrderSpec, row::Row},
    model::EntityModel,
};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, Serialize};

///
/// CursorWire
///

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CursorWire {
    values: CursorValues,
    order: Vec<String>,
}

#[derive(Serialize)]
struct CursorWireRef<'a> {
    values: &'a CursorValues,
    order: Vec<String>,
}

///
/// CursorToken
///
/// Decoded continuation cursor: the boundary row's ordering values plus the
/// ordering they were captured under. The embedded ordering is
/// authoritative for the next page, so a client cannot desynchronize a
/// traversal by changing its sort mid-way.
///

#[derive(Clone, Debug, PartialEq)]
pub struct CursorToken {
    values: CursorValues,
    order: OrderSpec,
}

impl CursorToken {
    pub fn new(values: CursorValues, order: OrderSpec) -> Result<Self, CursorError> {
        values.check_aligned(&order)?;

        Ok(Self { values, order })
    }

    /// Capture the boundary of `row` under `order`.
    pub fn from_row<R: Row + ?Sized>(row: &R, order: &OrderSpec) -> Result<Self, CursorError> {
        let values = order
            .fields()
            .map(|field| {
                row.field(field)
                    .into_value()
                    .map(|value| (field, value))
                    .ok_or_else(|| CursorError::MissingField {
                        field: field.to_string(),
                    })
            })
            .collect::<Result<CursorValues, _>>()?;

        Ok(Self {
            values,
            order: order.clone(),
        })
    }

    #[must_use]
    pub const fn values(&self) -> &CursorValues {
        &self.values
    }

    #[must_use]
    pub const fn order(&self) -> &OrderSpec {
        &self.order
    }

    #[must_use]
    pub fn into_parts(self) -> (CursorValues, OrderSpec) {
        (self.values, self.order)
    }

    pub fn encode(&self) -> Result<String, CursorError> {
        let wire = CursorWireRef {
            values: &self.values,
            order: self.order.to_entries(),
        };
        let json = serde_json::to_vec(&wire).map_err(|err| CursorError::Encode {
            reason: err.to_string(),
        })?;

        Ok(BASE64.encode(json))
    }

    /// Decode and validate an untrusted token.
    ///
    /// The token may include surrounding whitespace, which is trimmed. The
    /// embedded ordering is re-validated against `model`.
    pub fn decode(token: &str, model: &EntityModel) -> Result<Self, CursorError> {
        let token = token.trim();

        if token.is_empty() {
            return Err(CursorError::Empty);
        }
        if token.len() > MAX_CURSOR_TOKEN_LEN {
            return Err(CursorError::TooLong {
                len: token.len(),
                max: MAX_CURSOR_TOKEN_LEN,
            });
        }

        let bytes = BASE64.decode(token).map_err(|err| CursorError::Base64 {
            reason: err.to_string(),
        })?;
        let wire: CursorWire = serde_json::from_slice(&bytes).map_err(|err| CursorError::Payload {
            reason: err.to_string(),
        })?;
        let order = OrderSpec::parse(&wire.order, model).map_err(CursorError::Order)?;

        Self::new(wire.values, order)
    }
}

/// Continuation token for the page ending at the last of `rows`.
///
/// Returns `None` for an empty page: there is nothing to continue from.
pub fn next_cursor<R: Row>(rows: &[R], order: &OrderSpec) -> Result<Option<String>, CursorError> {
    let Some(last) = rows.last() else {
        return Ok(None);
    };

    CursorToken::from_row(last, order)?.encode().map(Some)
}
