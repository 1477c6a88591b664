//! Main ODataService

use std::sync::Arc;
use std::time::Duration;

use log::debug;
use reqwest::Client;
use tokio::sync::OnceCell;

use crate::error::ApiError;
use crate::model::CoercionRegistry;
use crate::model::Value;
use crate::model::metadata::BaseTypePolicy;
use crate::model::metadata::Metadata;
use crate::transport::ReqwestTransport;
use crate::transport::Transport;
use crate::transport::TransportResponse;

/// A handle to one OData service root.
///
/// This handle is cheap to clone (uses `Arc` internally) and can be shared
/// across tasks safely. The service's `$metadata` document is fetched at
/// most once per handle (and its clones), on first need.
///
/// # Example
///
/// ```ignore
/// use odata_lib::ODataService;
///
/// let service = ODataService::builder()
///     .url("http://www.pluralsight-training.net/Odata/")
///     .timeout(Duration::from_secs(30))
///     .build()?;
///
/// println!("{:?}", service.collection_names().await?);
/// ```
#[derive(Clone)]
pub struct ODataService {
    pub(crate) inner: Arc<ODataServiceInner>,
}

pub(crate) struct ODataServiceInner {
    root: String,
    transport: Arc<dyn Transport>,
    pub(crate) metadata: OnceCell<Arc<Metadata>>,
    coercions: Arc<CoercionRegistry>,
    base_type_policy: BaseTypePolicy,
}

impl ODataService {
    /// Creates a new builder for constructing a service handle.
    pub fn builder() -> ServiceBuilder<Missing> {
        ServiceBuilder::new()
    }

    /// Returns the service root URL as given to the builder.
    pub fn root(&self) -> &str {
        &self.inner.root
    }

    /// Returns the coercion registry used for entity property values.
    pub fn coercions(&self) -> &Arc<CoercionRegistry> {
        &self.inner.coercions
    }

    /// Returns how unresolved base types are treated at metadata load.
    pub fn base_type_policy(&self) -> BaseTypePolicy {
        self.inner.base_type_policy
    }

    /// Resolves a path against the service root.
    ///
    /// Absolute URLs are returned unchanged; anything else is joined to the
    /// root with exactly one `/` between them.
    pub fn url_for(&self, path: &str) -> String {
        if url::Url::parse(path).is_ok() {
            return path.to_string();
        }
        combine_url(&self.inner.root, path)
    }

    /// Fetches a path and returns the response whatever its status.
    pub(crate) async fn fetch(&self, path: &str) -> Result<TransportResponse, ApiError> {
        let url = self.url_for(path);
        debug!("GET {}", url);

        let response = self.inner.transport.get(&url).await?;
        debug!("GET {} -> {}", url, response.status);
        Ok(response)
    }

    /// Fetches a path, failing on any non-success status.
    pub(crate) async fn fetch_document(&self, path: &str) -> Result<String, ApiError> {
        let response = self.fetch(path).await?;
        if response.is_success() {
            Ok(response.body)
        } else {
            Err(ApiError::http(response.status, response.body))
        }
    }
}

impl std::fmt::Debug for ODataService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ODataService")
            .field("root", &self.inner.root)
            .field("metadata_loaded", &self.inner.metadata.initialized())
            .field("base_type_policy", &self.inner.base_type_policy)
            .finish()
    }
}

/// Joins two URL parts with a single `/`.
pub(crate) fn combine_url(root: &str, path: &str) -> String {
    format!("{}/{}", root.trim_end_matches('/'), path.trim_start_matches('/'))
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing an [`ODataService`].
///
/// Uses the typestate pattern to ensure required fields are set at compile time.
///
/// # Required Fields
///
/// - `url` - The service root URL
///
/// # Example
///
/// ```ignore
/// let service = ODataService::builder()
///     .url("http://packages.nuget.org/v1/FeedService.svc/")
///     .timeout(Duration::from_secs(30))
///     .lenient_base_types(true)
///     .coercion("Edm.Time", |raw| Some(Value::from(raw)))
///     .build()?;
/// ```
pub struct ServiceBuilder<Url> {
    url: Url,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    http_client: Option<Client>,
    transport: Option<Arc<dyn Transport>>,
    base_type_policy: BaseTypePolicy,
    coercions: CoercionRegistry,
}

impl ServiceBuilder<Missing> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            url: Missing,
            timeout: None,
            connect_timeout: None,
            http_client: None,
            transport: None,
            base_type_policy: BaseTypePolicy::default(),
            coercions: CoercionRegistry::default(),
        }
    }

    /// Sets the service root URL.
    ///
    /// # Example
    ///
    /// ```ignore
    /// .url("http://www.pluralsight-training.net/Odata/")
    /// ```
    pub fn url(self, url: impl Into<String>) -> ServiceBuilder<Set<String>> {
        ServiceBuilder {
            url: Set(url.into()),
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
            transport: self.transport,
            base_type_policy: self.base_type_policy,
            coercions: self.coercions,
        }
    }
}

impl Default for ServiceBuilder<Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U> ServiceBuilder<U> {
    /// Sets the request timeout.
    ///
    /// Ignored when a custom transport is set.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout.
    ///
    /// This is applied when building the HTTP client.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets a custom HTTP client.
    ///
    /// If not set, a default client will be created.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets a custom transport, replacing the HTTP client entirely.
    pub fn transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Tolerates base type references that name no known entity type.
    ///
    /// By default such references fail metadata loading. When lenient, the
    /// type is treated as having no base type and a warning is logged.
    pub fn lenient_base_types(mut self, lenient: bool) -> Self {
        self.base_type_policy = if lenient {
            BaseTypePolicy::Lenient
        } else {
            BaseTypePolicy::Strict
        };
        self
    }

    /// Registers (or replaces) the coercion for a type tag.
    ///
    /// The handler returns `None` for text it cannot parse.
    pub fn coercion<F>(mut self, type_tag: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&str) -> Option<Value> + Send + Sync + 'static,
    {
        self.coercions.register(type_tag, handler);
        self
    }
}

impl ServiceBuilder<Set<String>> {
    /// Builds the [`ODataService`].
    ///
    /// This method is only available once `url` has been set.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if the root is not an absolute URL,
    /// or [`ApiError::Network`] if the HTTP client cannot be created.
    pub fn build(self) -> Result<ODataService, ApiError> {
        let root = self.url.0;
        url::Url::parse(&root).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", root, e)))?;

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => {
                let client = match self.http_client {
                    Some(client) => client,
                    None => {
                        let mut builder = Client::builder();
                        if let Some(timeout) = self.connect_timeout {
                            builder = builder.connect_timeout(timeout);
                        }
                        builder.build()?
                    }
                };
                let mut transport = ReqwestTransport::new(client);
                if let Some(timeout) = self.timeout {
                    transport = transport.with_timeout(timeout);
                }
                Arc::new(transport)
            }
        };

        Ok(ODataService {
            inner: Arc::new(ODataServiceInner {
                root,
                transport,
                metadata: OnceCell::new(),
                coercions: Arc::new(self.coercions),
                base_type_policy: self.base_type_policy,
            }),
        })
    }
}
