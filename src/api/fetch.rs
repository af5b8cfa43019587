//! Purpose: Blocking HTTP GET that decodes the response body as JSON.
//! Exports: `http_get_sync`, `http_get_object_sync`.
//! Role: Leaf of the fetch stack; the async adapter offloads these calls.
//! Invariants: Exactly one request per call; no retries, no shared agent.
//! Invariants: Status codes never fail a call; only transport or decode do.
//! Notes: URL validation is left to ureq and surfaces as a transport failure.
//! Notes: Bodies are read in full before decoding; no size cap beyond memory.
use std::io::Read;

use crate::core::error::{Error, ErrorKind};
use crate::core::json::{Json, JsonObject, into_object};

type ApiResult<T> = Result<T, Error>;

/// Issues one GET to `url` and decodes the body as JSON.
///
/// The root is returned as-is, even when it is not an object. Use
/// [`http_get_object_sync`] to reject non-object roots.
pub fn http_get_sync(url: &str) -> ApiResult<Json> {
    fetch_json(url).map(|(_status, value)| value)
}

/// Like [`http_get_sync`], but fails with [`ErrorKind::Shape`] unless the root is an object.
pub fn http_get_object_sync(url: &str) -> ApiResult<JsonObject> {
    let (status, value) = fetch_json(url)?;
    into_object(value).map_err(|err| err.with_url(url).with_status(status))
}

fn fetch_json(url: &str) -> ApiResult<(u16, Json)> {
    tracing::debug!(url, "http get");
    let agent = ureq::AgentBuilder::new().build();
    let response = agent.get(url).set("Accept", "application/json").call();

    let response = match response {
        Ok(resp) => resp,
        // ureq reports 4xx/5xx as errors; the body is still the payload.
        Err(ureq::Error::Status(_code, resp)) => resp,
        Err(ureq::Error::Transport(err)) => {
            return Err(Error::new(ErrorKind::Transport)
                .with_message("request failed")
                .with_url(url)
                .with_source(err));
        }
    };
    let status = response.status();
    tracing::debug!(url, status, "http response");

    let value =
        read_json_response(response).map_err(|err| err.with_url(url).with_status(status))?;
    Ok((status, value))
}

fn read_json_response(response: ureq::Response) -> ApiResult<Json> {
    let mut body = Vec::new();
    response
        .into_reader()
        .read_to_end(&mut body)
        .map_err(|err| {
            Error::new(ErrorKind::Transport)
                .with_message("failed to read response body")
                .with_source(err)
        })?;
    decode_body(&body)
}

fn decode_body(body: &[u8]) -> ApiResult<Json> {
    serde_json::from_slice(body).map_err(|err| {
        Error::new(ErrorKind::Decode)
            .with_message("invalid response json")
            .with_source(err)
    })
}
