//! REST resource accessors for the ODSS API.
//!
//! The API is a fixed tree of paths. Rather than one type per path, the
//! tree is described once as data in [`routes`] and walked through a single
//! generic [`Resource`] accessor.
//!
//! # Overview
//!
//! - [`Resource`]: an accessor scoped to one path, exposing the methods
//!   valid on it
//! - [`Payload`]: the body or form data of a write call
//! - [`RouteNode`]: one node of the route tree
//!
//! # Example
//!
//! ```rust,ignore
//! use odss_client::OdssClient;
//! use odss_client::template::UriParameters;
//!
//! let client = OdssClient::new(Default::default())?;
//!
//! // GET /incidents/5
//! let incident = client
//!     .incidents()
//!     .member(&UriParameters::new().with("incidentId", 5))?
//!     .get(None, Default::default())
//!     .await?;
//!
//! // POST /operations/2/units/9/personnel/4
//! client
//!     .operations()
//!     .id(2)?
//!     .child("units")?
//!     .id(9)?
//!     .child("personnel")?
//!     .id(4)?
//!     .post(None, Default::default())
//!     .await?;
//! ```

mod resource;
pub mod routes;

pub use resource::{Payload, Resource};
pub use routes::RouteNode;
