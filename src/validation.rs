//! Request-body parsing. Every endpoint that takes a body declares a form
//! struct deriving `Deserialize` with one loosely-typed field per JSON key,
//! and implements [`Validate`] to turn it into the input the handler works
//! with. The [`Validated`] extractor runs both steps, so handlers only ever
//! see input that passed the field checks.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::util_resp::FailureResponse;

/// Checks a deserialized form field by field. The first failing field is
/// the one reported.
pub trait Validate: DeserializeOwned {
    type Output;

    fn validate(self) -> Result<Self::Output, FailureResponse>;
}

pub struct Validated<F: Validate>(pub F::Output);

#[async_trait]
impl<F, S> FromRequest<S> for Validated<F>
where
    F: Validate,
    S: Send + Sync,
{
    type Rejection = FailureResponse;

    async fn from_request(
        req: Request,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|e| {
            tracing::warn!("failed to read request body: {e}");
            FailureResponse::BadRequest(
                "Não foi possível ler o corpo da requisição".to_string(),
            )
        })?;

        match parse_form::<F>(&bytes).and_then(F::validate) {
            Ok(input) => Ok(Validated(input)),
            Err(e) => {
                tracing::warn!("rejected payload: {e}");
                Err(e)
            }
        }
    }
}

/// Only JSON objects are accepted; a form struct would otherwise also
/// deserialize from an array, field by field.
pub fn parse_form<F: DeserializeOwned>(
    bytes: &[u8],
) -> Result<F, FailureResponse> {
    let map = match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            return Err(FailureResponse::BadRequest(
                "O corpo da requisição deve ser um objeto JSON".to_string(),
            ));
        }
        Err(_) => {
            return Err(FailureResponse::BadRequest(
                "O corpo da requisição deve ser um JSON válido".to_string(),
            ));
        }
    };

    // With every field an `Option<Value>`, the only failure left is a field
    // sent under two of its aliases.
    serde_json::from_value(Value::Object(map)).map_err(|e| {
        tracing::debug!("form did not deserialize: {e}");
        FailureResponse::BadRequest(
            "O corpo da requisição contém campos duplicados".to_string(),
        )
    })
}

/// An integer id taken from the single path parameter of a route.
pub struct IdPath(pub i32);

#[async_trait]
impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = FailureResponse;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        match Path::<i32>::from_request_parts(parts, state).await {
            Ok(Path(id)) => Ok(IdPath(id)),
            Err(e) => {
                tracing::warn!("rejected path parameter: {e}");
                Err(FailureResponse::BadRequest(
                    "Identificador inválido na URL".to_string(),
                ))
            }
        }
    }
}

// Field checks. A JSON `null` deserializes to `None`, so it is treated the
// same as an absent field.

/// A string that must be present and not blank.
pub fn required_str(
    value: Option<Value>,
    field: &str,
) -> Result<String, FailureResponse> {
    match optional_str(value, field)? {
        Some(s) if !is_blank(&s) => Ok(s),
        _ => Err(missing(field)),
    }
}

pub fn optional_str(
    value: Option<Value>,
    field: &str,
) -> Result<Option<String>, FailureResponse> {
    match value {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(FailureResponse::BadRequest(format!(
            "O campo '{field}' deve ser um texto"
        ))),
    }
}

/// An optional string that is stored as `""` when absent.
pub fn str_or_empty(
    value: Option<Value>,
    field: &str,
) -> Result<String, FailureResponse> {
    Ok(optional_str(value, field)?.unwrap_or_default())
}

pub fn required_id(
    value: Option<Value>,
    field: &str,
) -> Result<i32, FailureResponse> {
    let value = value.ok_or_else(|| missing(field))?;

    as_id(&value).ok_or_else(|| {
        FailureResponse::BadRequest(format!(
            "O campo '{field}' deve ser um número inteiro"
        ))
    })
}

/// An optional list of ids. Entries which cannot be ids are skipped, in
/// the same way as ids that match no row.
pub fn id_list(
    value: Option<Value>,
    field: &str,
) -> Result<Vec<i32>, FailureResponse> {
    match value {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => {
            Ok(items.iter().filter_map(as_id).collect())
        }
        Some(_) => Err(FailureResponse::BadRequest(format!(
            "O campo '{field}' deve ser uma lista"
        ))),
    }
}

/// `avaliacao_1..=avaliacao_N`, all required, checked in order.
pub fn answers<const N: usize>(
    values: [Option<Value>; N],
) -> Result<[String; N], FailureResponse> {
    let answers = values
        .into_iter()
        .enumerate()
        .map(|(i, value)| required_str(value, &answer_field(i + 1)))
        .collect::<Result<Vec<_>, _>>()?;

    answers
        .try_into()
        .map_err(|_| FailureResponse::ServerError)
}

pub fn answer_field(i: usize) -> String {
    format!("avaliacao_{i}")
}

pub fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

fn missing(field: &str) -> FailureResponse {
    FailureResponse::BadRequest(format!("O campo '{field}' é obrigatório"))
}

/// Ids are accepted as JSON integers or as strings holding one.
fn as_id(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
