//! Authentication for the ODSS API.
//!
//! Requests are authenticated by a [`Signer`](crate::Signer). The
//! [`oauth2`] module acquires tokens from Azure AD; the resulting
//! [`Token`](oauth2::Token) is a signer that adds a bearer header.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use odss_client::auth::oauth2::{oauth2_0, OAuth2Settings};
//! use odss_client::{ClientId, RequestOptions};
//!
//! let oauth = oauth2_0(OAuth2Settings::builder().client_id(ClientId::new("app")?))?;
//! let token = oauth.owner().get_token("user", "password").await?;
//!
//! // Sign a single call
//! let response = client
//!     .logs()
//!     .get(None, RequestOptions::new().signer(Arc::new(token)))
//!     .await?;
//! ```

pub mod oauth2;
