//! The SimpleDB client.

use chrono::{DateTime, Utc};
use simpledb_auth::{RequestSigner, RequestSpec, SignedRequest};
use simpledb_model::{
    BatchPutAttributesInput, CreateDomainInput, DeleteAttributesInput, DeleteDomainInput,
    DomainMetadataInput, GetAttributesInput, ListDomainsInput, PutAttributesInput, SelectInput,
    SimpleDbRequest,
};
use simpledb_xml::{FlatValue, ParseNode, flatten_document, parse_document, read_object};
use tracing::{debug, warn};

use crate::config::{ClientConfig, ResultFormat};
use crate::error::ClientResult;

/// A decoded response body, shaped by the configured [`ResultFormat`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// The body text as received.
    Raw(String),
    /// The parsed element tree.
    Xml(ParseNode),
    /// The flattened document, without the root element wrapper.
    Json(FlatValue),
}

impl Response {
    /// Convert any variant into the flattened form.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Xml`](crate::ClientError::Xml) if a raw body
    /// does not parse or a tree is too deep to flatten.
    pub fn into_flat(self) -> ClientResult<FlatValue> {
        match self {
            Self::Raw(body) => Ok(read_object(body.as_bytes())?),
            Self::Xml(root) => Ok(flatten_document(&root)?),
            Self::Json(value) => Ok(value),
        }
    }
}

/// Async SimpleDB client.
///
/// Every call signs a fresh `GET` request with the current time, sends it and
/// decodes the body. HTTP status codes are not translated: an
/// `<ErrorResponse>` document comes back through the same decoding as a
/// successful answer.
#[derive(Debug, Clone)]
pub struct SimpleDbClient {
    config: ClientConfig,
    signer: RequestSigner,
    http: reqwest::Client,
}

impl SimpleDbClient {
    /// Create a client with its own connection pool.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`](crate::ClientError::Http) if the HTTP
    /// client cannot be built.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self::with_http_client(config, http))
    }

    /// Create a client on top of an existing HTTP client.
    ///
    /// The configured timeout is still applied to each request.
    #[must_use]
    pub fn with_http_client(config: ClientConfig, http: reqwest::Client) -> Self {
        let signer = RequestSigner::new(
            config.credentials(),
            RequestSpec::get(config.host.clone()),
            config.signature_method,
        );
        Self {
            config,
            signer,
            http,
        }
    }

    /// The client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Sign `input` at `timestamp`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Auth`](crate::ClientError::Auth) if the
    /// credentials are unusable.
    pub fn sign<R: SimpleDbRequest + ?Sized>(
        &self,
        input: &R,
        timestamp: DateTime<Utc>,
    ) -> ClientResult<SignedRequest> {
        let signed = self.signer.sign(
            input.operation().as_str(),
            &self.config.version,
            &input.to_params(),
            timestamp,
        )?;
        Ok(signed)
    }

    /// The signed URL for `input` at `timestamp`. No request is made.
    ///
    /// # Errors
    ///
    /// Same as [`SimpleDbClient::sign`].
    pub fn signed_url<R: SimpleDbRequest + ?Sized>(
        &self,
        input: &R,
        timestamp: DateTime<Utc>,
    ) -> ClientResult<String> {
        Ok(self.sign(input, timestamp)?.to_url(&self.config.scheme))
    }

    /// Sign `input` with the current time, send it and decode the body.
    ///
    /// # Errors
    ///
    /// Returns a signing error before any I/O, an HTTP error if the exchange
    /// fails or times out, or a decoding error if the body is not a
    /// well-formed document (unless the format is [`ResultFormat::Raw`]).
    pub async fn send<R: SimpleDbRequest + ?Sized>(&self, input: &R) -> ClientResult<Response> {
        let operation = input.operation();
        let signed = self.sign(input, Utc::now())?;
        let url = signed.to_url(&self.config.scheme);

        debug!(
            %operation,
            host = %self.config.host,
            query = %signed.canonical_query(),
            "Sending SimpleDB request"
        );

        let response = self
            .http
            .get(&url)
            .timeout(self.config.timeout())
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(%operation, %status, "SimpleDB returned a non-success status");
        }

        self.decode(body)
    }

    fn decode(&self, body: String) -> ClientResult<Response> {
        match self.config.result_format {
            ResultFormat::Raw => Ok(Response::Raw(body)),
            ResultFormat::Xml => Ok(Response::Xml(parse_document(body.as_bytes())?)),
            ResultFormat::Json => Ok(Response::Json(read_object(body.as_bytes())?)),
        }
    }

    // -----------------------------------------------------------------------
    // Domain management
    // -----------------------------------------------------------------------

    /// Create a domain.
    ///
    /// # Errors
    ///
    /// See [`SimpleDbClient::send`].
    pub async fn create_domain(&self, input: &CreateDomainInput) -> ClientResult<Response> {
        self.send(input).await
    }

    /// Delete a domain.
    ///
    /// # Errors
    ///
    /// See [`SimpleDbClient::send`].
    pub async fn delete_domain(&self, input: &DeleteDomainInput) -> ClientResult<Response> {
        self.send(input).await
    }

    /// List domains, one page at a time.
    ///
    /// # Errors
    ///
    /// See [`SimpleDbClient::send`].
    pub async fn list_domains(&self, input: &ListDomainsInput) -> ClientResult<Response> {
        self.send(input).await
    }

    /// Describe a domain.
    ///
    /// # Errors
    ///
    /// See [`SimpleDbClient::send`].
    pub async fn domain_metadata(&self, input: &DomainMetadataInput) -> ClientResult<Response> {
        self.send(input).await
    }

    // -----------------------------------------------------------------------
    // Query
    // -----------------------------------------------------------------------

    /// Run a select expression.
    ///
    /// # Errors
    ///
    /// See [`SimpleDbClient::send`].
    pub async fn select(&self, input: &SelectInput) -> ClientResult<Response> {
        self.send(input).await
    }

    // -----------------------------------------------------------------------
    // Item CRUD
    // -----------------------------------------------------------------------

    /// Write attributes of one item.
    ///
    /// # Errors
    ///
    /// See [`SimpleDbClient::send`].
    pub async fn put_attributes(&self, input: &PutAttributesInput) -> ClientResult<Response> {
        self.send(input).await
    }

    /// Write attributes of several items.
    ///
    /// # Errors
    ///
    /// See [`SimpleDbClient::send`].
    pub async fn batch_put_attributes(
        &self,
        input: &BatchPutAttributesInput,
    ) -> ClientResult<Response> {
        self.send(input).await
    }

    /// Read attributes of one item.
    ///
    /// # Errors
    ///
    /// See [`SimpleDbClient::send`].
    pub async fn get_attributes(&self, input: &GetAttributesInput) -> ClientResult<Response> {
        self.send(input).await
    }

    /// Delete attributes of one item, or the item itself.
    ///
    /// # Errors
    ///
    /// See [`SimpleDbClient::send`].
    pub async fn delete_attributes(&self, input: &DeleteAttributesInput) -> ClientResult<Response> {
        self.send(input).await
    }
}
