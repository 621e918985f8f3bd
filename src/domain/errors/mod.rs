//! Domain error types.

mod fetch_error;

pub use fetch_error::{
    CANCELLED_CODE, CONTRACT_VIOLATION_CODE, FetchError, TRANSPORT_FAILURE_CODE,
    is_success_status, reason_phrase,
};
