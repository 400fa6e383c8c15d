use axum::http::HeaderMap;
use serde_json::Value;

use super::ContactForm;

/// Parse a request body into a contact form based on Content-Type.
pub fn parse_body(content_type: Option<&str>, body: &[u8]) -> Result<ContactForm, String> {
    let ct = content_type.unwrap_or("application/json");

    if ct.contains("application/json") {
        parse_json(body)
    } else if ct.contains("application/x-www-form-urlencoded") {
        parse_form_urlencoded(body)
    } else {
        // Try JSON first, then form-urlencoded
        parse_json(body)
            .or_else(|_| parse_form_urlencoded(body))
            .map_err(|e| format!("Unable to parse body: {e}"))
    }
}

fn parse_json(body: &[u8]) -> Result<ContactForm, String> {
    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(ContactForm::default());
    }

    let value: Value = serde_json::from_slice(body).map_err(|e| format!("Invalid JSON: {e}"))?;
    match value {
        Value::Null => Ok(ContactForm::default()),
        other => serde_json::from_value(other).map_err(|e| format!("Invalid JSON: {e}")),
    }
}

fn parse_form_urlencoded(body: &[u8]) -> Result<ContactForm, String> {
    std::str::from_utf8(body).map_err(|e| format!("Invalid UTF-8: {e}"))?;

    let mut form = ContactForm::default();
    for (k, v) in form_urlencoded::parse(body) {
        assign(&mut form, &k, v.into_owned());
    }
    Ok(form)
}

/// Parse multipart form data using multer.
pub async fn parse_multipart(headers: &HeaderMap, body: bytes::Bytes) -> Result<ContactForm, String> {
    let boundary = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| multer::parse_boundary(ct).ok())
        .ok_or_else(|| "Missing multipart boundary".to_string())?;

    let stream = futures_util::stream::once(async { Ok::<_, std::io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut form = ContactForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Multipart error: {e}"))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let value = field
            .text()
            .await
            .map_err(|e| format!("Field read error: {e}"))?;
        assign(&mut form, &name, value);
    }

    Ok(form)
}

fn assign(form: &mut ContactForm, key: &str, value: String) {
    let slot = match key {
        "name" => &mut form.name,
        "email" => &mut form.email,
        "company" => &mut form.company,
        "message" => &mut form.message,
        _ => return,
    };
    *slot = Some(value);
}
