// src/common/forms.rs
//
// As rotas de processo aceitam tanto JSON puro quanto multipart/form-data
// (o formulário envia os campos como texto e os anexos no campo `files`).
// Este extractor unifica os dois caminhos num único payload tipado.

use axum::{
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Json,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Number, Value};

use crate::common::error::AppError;

/// Arquivo recebido no campo `files` de um formulário multipart.
pub struct IncomingFile {
    pub original_name: String,
    pub bytes: Vec<u8>,
}

/// Payload tipado + anexos, extraído de JSON ou multipart.
pub struct FormOrJson<T> {
    pub payload: T,
    pub files: Vec<IncomingFile>,
}

impl<S, T> FromRequest<S> for FormOrJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.starts_with("multipart/form-data"))
            .unwrap_or(false);

        if !is_multipart {
            let Json(value) = Json::<Value>::from_request(req, state)
                .await
                .map_err(|e| AppError::InvalidPayload(e.to_string()))?;
            let payload =
                serde_json::from_value(value).map_err(|e| AppError::InvalidPayload(e.to_string()))?;
            return Ok(Self { payload, files: Vec::new() });
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::InvalidPayload(e.to_string()))?;

        let mut fields = Map::new();
        let mut files = Vec::new();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::InvalidPayload(e.to_string()))?
        {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            if name == "files" {
                let original_name = field.file_name().unwrap_or("anexo").to_owned();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::InvalidPayload(e.to_string()))?;
                files.push(IncomingFile { original_name, bytes: bytes.to_vec() });
            } else {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::InvalidPayload(e.to_string()))?;
                fields.insert(name, Value::String(text));
            }
        }

        let payload = serde_json::from_value(Value::Object(coerce_form_fields(fields)))
            .map_err(|e| AppError::InvalidPayload(e.to_string()))?;

        Ok(Self { payload, files })
    }
}

/// Converte os campos textuais de um formulário para os tipos que o payload
/// espera: números enviados como string, flags `"true"`/`"false"`, e os
/// objetos `location`/`alertInfo` que o formulário manda como JSON embutido.
/// String vazia significa "campo ausente".
pub fn coerce_form_fields(fields: Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();

    for (key, value) in fields {
        let Value::String(text) = value else {
            out.insert(key, value);
            continue;
        };
        if text.is_empty() {
            continue;
        }

        let coerced = match key.as_str() {
            "value" | "purchasedValue" => text
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number),
            "planId" | "id" => text.parse::<u64>().ok().map(|n| Value::Number(n.into())),
            "isImportant" | "logHistory" => text.parse::<bool>().ok().map(Value::Bool),
            "location" | "alertInfo" => serde_json::from_str(&text).ok(),
            _ => None,
        };

        out.insert(key, coerced.unwrap_or(Value::String(text)));
    }

    out
}

/// Aceita `true`/`false` tanto como booleano quanto como string
/// (o flag `logHistory` chega como a string `"false"`).
pub fn flexible_bool_opt<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Bool(b)) => Ok(Some(b)),
        Some(Raw::Text(s)) => match s.as_str() {
            "true" => Ok(Some(true)),
            "false" => Ok(Some(false)),
            other => Err(serde::de::Error::custom(format!(
                "valor booleano inválido: {other}"
            ))),
        },
    }
}

/// Aceita valores monetários como número JSON ou como string decimal.
pub fn flexible_decimal_opt<'de, D>(
    deserializer: D,
) -> Result<Option<rust_decimal::Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    use rust_decimal::prelude::FromPrimitive;
    use rust_decimal::Decimal;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Num(n)) => Decimal::from_f64(n)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("valor numérico inválido: {n}"))),
        Some(Raw::Text(s)) if s.is_empty() => Ok(None),
        Some(Raw::Text(s)) => s
            .parse::<Decimal>()
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("valor decimal inválido: {e}"))),
    }
}

/// Distingue "campo ausente" (None) de "campo presente com null"
/// (Some(None)) — usado para limpar o alerta de um processo via PUT.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
