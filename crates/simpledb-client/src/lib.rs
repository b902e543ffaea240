//! Async client for Amazon SimpleDB.
//!
//! Ties together request signing ([`simpledb_auth`]), the request model
//! ([`simpledb_model`]) and response decoding ([`simpledb_xml`]):
//!
//! 1. an input is marshalled into query parameters,
//! 2. the parameters are signed with SigV2 at the current time,
//! 3. a `GET` is sent to the configured endpoint,
//! 4. the body is returned raw, as a tree, or flattened, per [`ResultFormat`].
//!
//! # Example
//!
//! ```no_run
//! use simpledb_client::{ClientConfig, SimpleDbClient};
//! use simpledb_model::ListDomainsInput;
//!
//! # async fn run() -> simpledb_client::ClientResult<()> {
//! let client = SimpleDbClient::new(ClientConfig::from_env()?)?;
//! let response = client.list_domains(&ListDomainsInput::default()).await?;
//! println!("{:?}", response.into_flat()?);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;

pub use client::{Response, SimpleDbClient};
pub use config::{ClientConfig, DEFAULT_API_VERSION, DEFAULT_HOST, ResultFormat};
pub use error::{ClientError, ClientResult};
