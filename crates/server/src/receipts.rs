//! Receipt API endpoints
//!
//! Receipts are bank transfer screenshots. The image goes to the OCR.space
//! API, then the recognized text is scanned for the amount, the date and the
//! payer name. Extraction is best effort; any field can come back empty and
//! the caller confirms the values before registering a payment.

use std::sync::OnceLock;

use api_types::receipt::{ReceiptParsed, ReceiptText, ReceiptUpload};
use axum::{Json, extract::State};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use regex::Regex;
use serde::Deserialize;

use crate::{ServerError, server::ServerState};

const DEFAULT_ENDPOINT: &str = "https://api.ocr.space/parse/image";

/// Client for the OCR.space image-to-text API.
pub struct OcrClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct OcrResponse {
    #[serde(rename = "OCRExitCode", default)]
    exit_code: i64,
    #[serde(rename = "ParsedResults", default)]
    parsed_results: Vec<OcrParsedResult>,
    #[serde(rename = "ErrorMessage", default)]
    error_message: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct OcrParsedResult {
    #[serde(rename = "ParsedText", default)]
    parsed_text: String,
}

impl OcrClient {
    pub fn new(endpoint: Option<String>, api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            api_key,
        }
    }

    /// Sends the image to the OCR provider and returns the recognized text.
    pub async fn recognize(
        &self,
        image: Vec<u8>,
        filetype: Option<&str>,
    ) -> Result<String, ServerError> {
        let filetype = filetype.unwrap_or("jpg").to_string();
        let form = reqwest::multipart::Form::new()
            .text("apikey", self.api_key.clone())
            .text("language", "por")
            .text("isOverlayRequired", "false")
            .text("filetype", filetype)
            .part(
                "file",
                reqwest::multipart::Part::bytes(image).file_name("receipt"),
            );

        let response = self
            .http
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|err| ServerError::Ocr(err.to_string()))?;
        let body: OcrResponse = response
            .json()
            .await
            .map_err(|err| ServerError::Ocr(err.to_string()))?;

        if body.exit_code != 1 {
            let detail = body
                .error_message
                .map(|msg| msg.to_string())
                .unwrap_or_else(|| format!("exit code {}", body.exit_code));
            return Err(ServerError::Ocr(detail));
        }

        Ok(body
            .parsed_results
            .into_iter()
            .next()
            .map(|result| result.parsed_text)
            .unwrap_or_default())
    }
}

// The patterns are literals, so compilation can not fail at runtime.
fn compiled(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(re) => re,
        Err(err) => unreachable!("invalid receipt pattern: {err}"),
    }
}

fn amount_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compiled(r"R?\$?\s?\d{1,3}(?:\.\d{3})*,\d{2}"))
}

fn date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compiled(r"\d{2}/\d{2}/\d{4}"))
}

fn name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        compiled(r"(?i)(?:Titular|Pagador|Quem pagou|Nome do titular)\s*[:\-]?\s*([A-Za-z\s]+)")
    })
}

fn name_fallback_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compiled(r"(?i)\bde\s([A-Za-z\s]+)"))
}

fn extract_amount(text: &str) -> Option<String> {
    amount_re().find(text).map(|m| m.as_str().to_string())
}

fn extract_date(text: &str) -> Option<String> {
    date_re().find(text).map(|m| m.as_str().to_string())
}

fn title_case(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn clean_name(raw: &str) -> Option<String> {
    // Receipts often run the holder name straight into a CPF line.
    let name = match raw.to_lowercase().find("cpf") {
        Some(idx) => &raw[..idx],
        None => raw,
    };
    let name = title_case(name.trim());
    (!name.is_empty()).then_some(name)
}

fn extract_payer_name(text: &str) -> Option<String> {
    if let Some(captures) = name_re().captures(text) {
        if let Some(name) = captures.get(1).and_then(|m| clean_name(m.as_str())) {
            return Some(name);
        }
    }
    name_fallback_re()
        .captures(text)
        .and_then(|captures| captures.get(1).and_then(|m| clean_name(m.as_str())))
}

fn parse(text: String) -> ReceiptParsed {
    ReceiptParsed {
        amount: extract_amount(&text),
        date: extract_date(&text),
        payer_name: extract_payer_name(&text),
        full_text: text,
    }
}

pub async fn process(
    State(state): State<ServerState>,
    Json(payload): Json<ReceiptUpload>,
) -> Result<Json<ReceiptParsed>, ServerError> {
    let image = BASE64
        .decode(payload.file_base64.as_bytes())
        .map_err(|err| ServerError::Generic(format!("invalid base64 payload: {err}")))?;

    let text = state
        .ocr
        .recognize(image, payload.filetype.as_deref())
        .await?;
    Ok(Json(parse(text)))
}

pub async fn parse_text(Json(payload): Json<ReceiptText>) -> Json<ReceiptParsed> {
    Json(parse(payload.text))
}
