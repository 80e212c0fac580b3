use axum::http::{header, HeaderMap, Uri};

const FORWARDED_PROTO: &str = "x-forwarded-proto";
const FORWARDED_HOST: &str = "x-forwarded-host";

fn first_header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// `<scheme>://<host>` as seen by the client. Forwarded headers are only
/// honoured when the service sits behind a trusted proxy.
pub fn request_origin(headers: &HeaderMap, uri: &Uri, trust_forwarded: bool) -> String {
    let forwarded = |name| {
        if trust_forwarded {
            first_header_value(headers, name)
        } else {
            None
        }
    };

    let scheme = forwarded(FORWARDED_PROTO)
        .or_else(|| uri.scheme_str())
        .unwrap_or("http");

    let host = forwarded(FORWARDED_HOST)
        .or_else(|| first_header_value(headers, header::HOST.as_str()))
        .or_else(|| uri.authority().map(|a| a.as_str()))
        .unwrap_or("localhost");

    format!("{}://{}", scheme, host)
}

/// Absolute URL of a converted file under the public media prefix.
pub fn build_download_url(origin: &str, media_url: &str, docx_file: &str) -> String {
    let file = urlencoding::encode(docx_file);
    if media_url.starts_with("http://") || media_url.starts_with("https://") {
        format!("{}docx/{}", media_url, file)
    } else {
        format!("{}{}docx/{}", origin, media_url, file)
    }
}
