//! Purpose: Async entry points that run the blocking fetch on a worker thread.
//! Exports: `http_get`, `http_get_object`.
//! Role: Keeps a cooperative tokio scheduler free while a request is in flight.
//! Invariants: Worker errors come back unchanged; worker panics are resumed.
//! Invariants: Dropping the future detaches; the request runs to completion.
//! Notes: Must be awaited inside a tokio runtime (current-thread is fine).
use tokio::task::JoinHandle;

use crate::core::error::{Error, ErrorKind};
use crate::core::json::{Json, JsonObject};

use super::fetch::{http_get_object_sync, http_get_sync};

type ApiResult<T> = Result<T, Error>;

/// Async counterpart of [`http_get_sync`].
pub async fn http_get(url: impl Into<String>) -> ApiResult<Json> {
    let url = url.into();
    offload(move || http_get_sync(&url)).await
}

/// Async counterpart of [`http_get_object_sync`].
pub async fn http_get_object(url: impl Into<String>) -> ApiResult<JsonObject> {
    let url = url.into();
    offload(move || http_get_object_sync(&url)).await
}

async fn offload<T, F>(work: F) -> ApiResult<T>
where
    F: FnOnce() -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    tracing::debug!("offloading blocking fetch");
    join_blocking(tokio::task::spawn_blocking(work)).await
}

async fn join_blocking<T>(task: JoinHandle<ApiResult<T>>) -> ApiResult<T> {
    match task.await {
        Ok(result) => result,
        Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
        Err(err) => Err(Error::new(ErrorKind::Internal)
            .with_message("blocking fetch was dropped before completion")
            .with_source(err)),
    }
}
