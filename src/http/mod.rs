//! Minimal HTTP client with base-URL defaults and a uniform response wrapper.

mod client;
mod response;

pub use client::{
    CONNECT_TIMEOUT, ClientConfig, HttpClient, Method, READ_TIMEOUT, RequestOptions,
};
pub use response::HttpResponse;
