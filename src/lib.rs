//! # ODSS API client
//!
//! An async Rust client for the ODSS REST API (incidents, operations, logs,
//! personnel, and transports).
//!
//! ## Overview
//!
//! This crate provides:
//! - Client configuration via [`ClientConfig`] and [`ClientConfigBuilder`]
//! - URI template expansion for base URIs and paths ([`template`])
//! - A request composer that merges client defaults with per-call
//!   [`RequestOptions`] and dispatches through a pluggable [`Transport`]
//! - A data-driven accessor for every resource the API exposes ([`rest`])
//! - Request signing through the [`Signer`] hook
//! - OAuth2 token acquisition against Azure AD ([`auth::oauth2`])
//! - A typed registry for caller-supplied extensions ([`extensions`])
//!
//! ## Quick Start
//!
//! ```rust
//! use odss_client::{ClientConfig, OdssClient};
//!
//! let config = ClientConfig::builder()
//!     .header("X-Client", "dispatch-console")
//!     .build();
//!
//! let client = OdssClient::new(config).unwrap();
//! assert_eq!(client.incidents().path(), "/incidents");
//! ```
//!
//! ## Making Requests
//!
//! ```rust,ignore
//! use odss_client::{HttpMethod, OdssClient, RequestOptions};
//! use serde_json::json;
//!
//! let client = OdssClient::new(Default::default())?;
//!
//! // GET /incidents?status=open
//! let open = client
//!     .incidents()
//!     .get(Some("status=open".into()), RequestOptions::new())
//!     .await?;
//!
//! // PATCH /incidents/5/clues/2
//! client
//!     .incidents()
//!     .id(5)?
//!     .child("clues")?
//!     .id(2)?
//!     .patch(Some(json!({"description": "Footprints"}).into()), RequestOptions::new())
//!     .await?;
//!
//! // Arbitrary paths go through the composer directly
//! let response = client
//!     .custom_request(HttpMethod::Get, "/operations/2/affiliations", RequestOptions::new())
//!     .await?;
//! ```
//!
//! ## Authentication
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use odss_client::auth::oauth2::{oauth2_0, OAuth2Settings};
//! use odss_client::{ClientConfig, ClientId, ClientSecret, OdssClient};
//!
//! let oauth = oauth2_0(
//!     OAuth2Settings::builder()
//!         .client_id(ClientId::new("my-app")?)
//!         .client_secret(ClientSecret::new("s3cret")?),
//! )?;
//! let token = oauth.credentials().get_token().await?;
//!
//! let client = OdssClient::new(ClientConfig::builder().signer(Arc::new(token)).build())?;
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: every client is built from an explicit [`ClientConfig`]
//! - **Errors surface unchanged**: no retries and no error translation
//! - **Thread-safe**: all public types are `Send + Sync`
//! - **Async-first**: designed for use with the Tokio runtime

pub mod auth;
pub mod client;
pub mod clients;
pub mod config;
pub mod error;
pub mod extensions;
pub mod rest;
pub mod template;

// Re-export public types at crate root for convenience
pub use client::OdssClient;
pub use config::{
    BaseUri, ClientConfig, ClientConfigBuilder, ClientId, ClientSecret, API_VERSION,
    DEFAULT_BASE_URI,
};
pub use error::ConfigError;

// Re-export HTTP client types
pub use clients::{
    FormData, FormFile, FormValue, HeaderMapping, HttpError, HttpMethod, HttpResponseError,
    InvalidHttpRequestError, Query, QueryParams, RequestBody, RequestDescriptor, RequestOptions,
    ResponseEnvelope, ReqwestTransport, Signer, Transport, TransportOptions,
};

// Re-export resource and extension types
pub use extensions::{Extension, ExtensionError};
pub use rest::{Payload, Resource};
