//! Purpose: Define the public Rust API boundary for reqjson.
//! Exports: Fetch entry points, JSON aliases, and the error model.
//! Role: Public, additive-only surface; hides internal module layout.
//! Invariants: Sync and async entry points share one contract and one error type.

mod fetch;
mod offload;

#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::json::{Json, JsonList, JsonObject, into_object, json_type_name};
pub use fetch::{http_get_object_sync, http_get_sync};
pub use offload::{http_get, http_get_object};
