//! HTTP access to the admin REST API

pub mod envelope;
pub mod http;

pub use envelope::{decode_ack, decode_list, decode_page};
pub use http::{HttpRecordApi, PROFILE_HEADER};
