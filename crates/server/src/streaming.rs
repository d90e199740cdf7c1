use std::io::SeekFrom;
use std::path::Path;

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

use crate::range::{ByteRange, RangeError};
use crate::utils::json_error_response;

const ASSET_CACHE_CONTROL: &str = "public, max-age=3600";

/// Streams a located file, honouring a single byte range. Malformed ranges fall back to the
/// full body; ranges past the end get 416.
pub async fn file_response(path: &Path, content_type: &'static str, headers: &HeaderMap) -> Response {
    let mut file = match File::open(path).await {
        Ok(file) => file,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to open asset");
            return json_error_response(StatusCode::NOT_FOUND, "file not found");
        }
    };
    let size = match file.metadata().await {
        Ok(meta) => meta.len(),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to stat asset");
            return json_error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to read file");
        }
    };

    let requested = headers
        .get(header::RANGE)
        .and_then(|value| value.to_str().ok());
    let range = match requested.map(|value| ByteRange::parse(value, size)) {
        Some(Ok(range)) => Some(range),
        Some(Err(RangeError::Unsatisfiable)) => return unsatisfiable(size),
        Some(Err(RangeError::Invalid)) => {
            debug!(path = %path.display(), "ignoring malformed range header");
            None
        }
        None => None,
    };

    let (status, length, body) = match range {
        Some(range) => {
            if let Err(err) = file.seek(SeekFrom::Start(range.start)).await {
                warn!(path = %path.display(), error = %err, "failed to seek asset");
                return json_error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to read file");
            }
            let stream = ReaderStream::new(file.take(range.len()));
            (StatusCode::PARTIAL_CONTENT, range.len(), Body::from_stream(stream))
        }
        None => (StatusCode::OK, size, Body::from_stream(ReaderStream::new(file))),
    };

    let mut response = Response::new(body);
    *response.status_mut() = status;
    let out = response.headers_mut();
    out.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    out.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
    if let Some(range) = range {
        if let Ok(value) = HeaderValue::from_str(&range.content_range(size)) {
            out.insert(header::CONTENT_RANGE, value);
        }
    }
    insert_asset_headers(out);
    response
}

fn unsatisfiable(size: u64) -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::RANGE_NOT_SATISFIABLE;
    if let Ok(value) = HeaderValue::from_str(&format!("bytes */{}", size)) {
        response.headers_mut().insert(header::CONTENT_RANGE, value);
    }
    insert_asset_headers(response.headers_mut());
    response
}

fn insert_asset_headers(headers: &mut HeaderMap) {
    headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(ASSET_CACHE_CONTROL),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
}
