//! Endpoint methods of [`ApiClient`](crate::ApiClient), one module per resource.
//!
//! Each method is a single request/response round trip through the client
//! pipeline, returning the parsed body or the error.

mod auth;
mod devices;
mod media;
mod sites;
mod users;
