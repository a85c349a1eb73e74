//! Maps core errors onto JSON-RPC error codes: validation failures to
//! `-32602`, everything else to `-32603`. Execution failures never reach
//! here — they surface as a `status=failed` receipt, not an RPC error.

use jsonrpsee::types::{ErrorCode, ErrorObjectOwned};

pub struct RpcErrorAdapter;

impl RpcErrorAdapter {
    pub fn into(error: anyhow::Error) -> ErrorObjectOwned {
        let msg = error.to_string();
        if msg.contains("missing parent")
            || msg.contains("duplicate")
            || msg.contains("invalid")
        {
            invalid_params(msg)
        } else {
            internal(msg)
        }
    }
}

fn internal(msg: String) -> ErrorObjectOwned {
    ErrorObjectOwned::owned(ErrorCode::InternalError.code(), msg, None::<()>)
}

fn invalid_params(msg: String) -> ErrorObjectOwned {
    ErrorObjectOwned::owned(ErrorCode::InvalidParams.code(), msg, None::<()>)
}
