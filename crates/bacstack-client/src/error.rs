use bacstack_core::types::{ErrorClass, ErrorCode};
use bacstack_datalink::DataLinkError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("datalink error: {0}")]
    DataLink(#[from] DataLinkError),
    #[error("encode error: {0}")]
    Encode(#[from] bacstack_core::EncodeError),
    #[error("decode error: {0}")]
    Decode(#[from] bacstack_core::DecodeError),
    #[error("request with invoke id {invoke_id} timed out")]
    Timeout { invoke_id: u8 },
    #[error("invoke id {invoke_id} is still outstanding")]
    InvokeIdInUse { invoke_id: u8 },
    #[error("remote service error for service choice {service_choice}")]
    RemoteServiceError {
        service_choice: u8,
        error_class_raw: u32,
        error_code_raw: u32,
        error_class: Option<ErrorClass>,
        error_code: Option<ErrorCode>,
    },
    #[error("remote reject reason {reason}")]
    RemoteReject { reason: u8 },
    #[error("remote abort reason {reason} (server={server})")]
    RemoteAbort { reason: u8, server: bool },
    #[error("response payload exceeded {limit} bytes")]
    ResponseTooLarge { limit: usize },
    #[error("unsupported response")]
    UnsupportedResponse,
    #[error("client engine stopped")]
    EngineStopped,
}
