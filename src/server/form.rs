//! Request form collection and the echo report.
//!
//! Form values come from the urlencoded body (POST/PUT/PATCH only) followed
//! by the query string, collected into an ordered multimap. Headers are
//! grouped the same way under their canonical MIME names.

use std::fmt::Write as _;

use indexmap::IndexMap;
use log::warn;
use rouille::Request;

/// Ordered string multimap: key -> values in arrival order.
pub type Multimap = IndexMap<String, Vec<String>>;

/// Form parsing failures. Logged by the handlers, never fatal.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("Invalid form body: {0}")]
    Body(String),
    #[error("Invalid percent escape in {0:?}")]
    InvalidEscape(String),
}

fn push(map: &mut Multimap, key: String, value: String) {
    map.entry(key).or_default().push(value);
}

fn hex_val(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Decode one `application/x-www-form-urlencoded` component.
fn unescape(input: &str) -> Result<String, FormError> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' => {
                let hi = bytes.get(i + 1).copied().and_then(hex_val);
                let lo = bytes.get(i + 2).copied().and_then(hex_val);
                match (hi, lo) {
                    (Some(hi), Some(lo)) => out.push(hi << 4 | lo),
                    _ => return Err(FormError::InvalidEscape(input.to_string())),
                }
                i += 2;
            }
            b => out.push(b),
        }
        i += 1;
    }
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Parse a query string (`a=1&b=2&a=3`) into key/value pairs.
pub fn parse_query(query: &str) -> Result<Vec<(String, String)>, FormError> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            Ok((unescape(key)?, unescape(value)?))
        })
        .collect()
}

fn has_form_body(request: &Request) -> bool {
    matches!(request.method(), "POST" | "PUT" | "PATCH")
        && request
            .header("Content-Type")
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
}

/// Collect body and query parameters. Body values come first.
pub fn parse_form(request: &Request) -> Result<Multimap, FormError> {
    let mut form = Multimap::new();

    if has_form_body(request) {
        let pairs = rouille::input::post::raw_urlencoded_post_input(request)
            .map_err(|e| FormError::Body(e.to_string()))?;
        for (k, v) in pairs {
            push(&mut form, k, v);
        }
    }

    for (k, v) in parse_query(request.raw_query_string())? {
        push(&mut form, k, v);
    }
    Ok(form)
}

/// Parse the form, logging failures and falling back to an empty form.
pub fn form_or_empty(request: &Request) -> Multimap {
    parse_form(request).unwrap_or_else(|e| {
        warn!("{} {}: {}", request.method(), request.raw_url(), e);
        Multimap::new()
    })
}

/// Canonical MIME header name: `accept-encoding` -> `Accept-Encoding`.
pub fn canonical_header_key(key: &str) -> String {
    let mut upper = true;
    key.chars()
        .map(|c| {
            let out = if upper { c.to_ascii_uppercase() } else { c.to_ascii_lowercase() };
            upper = c == '-';
            out
        })
        .collect()
}

/// Request headers grouped by canonical name. `Host` is reported separately.
pub fn header_map(request: &Request) -> Multimap {
    let mut headers = Multimap::new();
    for (k, v) in request.headers() {
        let key = canonical_header_key(k);
        if key == "Host" {
            continue;
        }
        push(&mut headers, key, v.to_string());
    }
    headers
}

/// `["a" "b"]`
fn quote_list(values: &[String]) -> String {
    let quoted: Vec<String> = values.iter().map(|v| format!("{:?}", v)).collect();
    format!("[{}]", quoted.join(" "))
}

/// Plain-text diagnostic dump of the request line, headers, host, peer and form.
pub fn echo_report(request: &Request, form: &Multimap) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {} HTTP/1.1", request.method(), request.raw_url());
    for (k, v) in &header_map(request) {
        let _ = writeln!(out, "Header[{:?}] = {}", k, quote_list(v));
    }
    let _ = writeln!(out, "Host = {:?}", request.header("Host").unwrap_or(""));
    let _ = writeln!(out, "RemoteAddr = {:?}", request.remote_addr().to_string());
    for (k, v) in form {
        let _ = writeln!(out, "Form[{:?}] = {}", k, quote_list(v));
    }
    out
}
