//! # 1C OData Client
//!
//! Connection and entity containers for the standard OData interface of a
//! 1C:Enterprise infobase.
//!
//! ```no_run
//! use onec_odata_client::{Connection, SortDirection};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let mut connection = Connection::new("http://localhost/base/odata/standard.odata")?;
//! connection.set_auth("Администратор", "");
//!
//! let items = connection
//!     .container("Справочник/Номенклатура")?
//!     .select(["Ref_Key", "Description"])
//!     .filter(["DeletionMark eq false"])
//!     .order_by("Description", SortDirection::Asc)
//!     .top(10)
//!     .get(None)
//!     .await?;
//! # let _ = items;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error model
//!
//! Malformed keys and unresolvable paths are errors raised before any
//! request. HTTP error statuses are not: reads return `None`, writes return
//! `None` or `false`, and the status and 1C error details stay available on
//! the container until its next request.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod connection;
pub mod container;
pub mod transport;

pub use config::{ConnectionConfig, ProxyConfig};
pub use connection::{Connection, ConnectionError};
pub use container::{ContainerError, EntityContainer};
pub use onec_odata_core::{
    guid, resolve, Category, EntityName, EntityPathError, GuidError, HttpMethod, HttpRequest,
    HttpResponse, IntoFields, ODataResponse, Query, RequestOptions, SortDirection,
};
pub use transport::{ReqwestTransport, Transport, TransportError};
