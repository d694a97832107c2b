//! Process-wide, one-time runtime setup.
//!
//! [`RuntimeBootstrap`] is constructed once at process start and handed by
//! reference to every consumer. The expensive part (opening the store,
//! building the cache, binding the listener) runs on first use, exactly once,
//! no matter how many tasks race to trigger it. A failed setup is not
//! remembered; the next caller tries again.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::OnceCell;
use tracing::info;

use crate::cache::MemoryCache;
use crate::consts::{DEFAULT_CONTAINER, DEFAULT_LISTEN_ADDR, ENV_CONTAINER, ENV_LISTEN, ENV_SERIALIZER};
use crate::context::ExecutionContextConfig;
use crate::platform::paths::store_dir;
use crate::serializer::Codec;
use crate::store::{LocalStore, Store, StoreError};
use crate::sync::AtomicCounter;

#[derive(Debug, Error)]
pub enum BootstrapError {
  #[error("invalid value {value:?} for {name}")]
  InvalidSetting { name: &'static str, value: String },

  #[error(transparent)]
  Store(#[from] StoreError),

  #[error("failed to bind listener on {addr}: {source}")]
  Listen {
    addr: SocketAddr,
    #[source]
    source: io::Error,
  },
}

/// Settings resolved before setup runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapSettings {
  /// Root directory of the local store.
  pub store_root: PathBuf,
  /// Listener address; port 0 picks an ephemeral port.
  pub listen: SocketAddr,
  /// Default codec for contexts built by this bootstrap.
  pub serializer: Codec,
  /// Default container for [`RuntimeBootstrap::default_config`].
  pub default_container: String,
}

impl BootstrapSettings {
  /// Settings for a store at `store_root`, everything else defaulted.
  pub fn new(store_root: impl Into<PathBuf>) -> Self {
    Self {
      store_root: store_root.into(),
      listen: SocketAddr::from(([127, 0, 0, 1], 0)),
      serializer: Codec::default(),
      default_container: DEFAULT_CONTAINER.to_string(),
    }
  }

  /// Resolves settings from `STOWAGE_*` environment variables.
  pub fn from_env() -> Result<Self, BootstrapError> {
    let listen_raw = std::env::var(ENV_LISTEN).unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_string());
    let listen = listen_raw.parse().map_err(|_| BootstrapError::InvalidSetting {
      name: ENV_LISTEN,
      value: listen_raw.clone(),
    })?;

    let serializer = match std::env::var(ENV_SERIALIZER) {
      Ok(raw) => raw
        .parse()
        .map_err(|_| BootstrapError::InvalidSetting {
          name: ENV_SERIALIZER,
          value: raw,
        })?,
      Err(_) => Codec::default(),
    };

    let default_container = match std::env::var(ENV_CONTAINER) {
      Ok(raw) if raw.trim().is_empty() => {
        return Err(BootstrapError::InvalidSetting {
          name: ENV_CONTAINER,
          value: raw,
        });
      }
      Ok(raw) => raw,
      Err(_) => DEFAULT_CONTAINER.to_string(),
    };

    Ok(Self {
      store_root: store_dir(),
      listen,
      serializer,
      default_container,
    })
  }
}

/// Everything setup produces, published all at once.
struct Services {
  store: Arc<LocalStore>,
  cache: Arc<MemoryCache>,
  listener: TcpListener,
  local_endpoint: SocketAddr,
  default_config: Arc<ExecutionContextConfig>,
}

pub struct RuntimeBootstrap {
  settings: BootstrapSettings,
  services: OnceCell<Services>,
  setup_runs: AtomicCounter,
}

impl RuntimeBootstrap {
  /// Creates the bootstrap without performing any setup.
  pub fn new(settings: BootstrapSettings) -> Self {
    Self {
      settings,
      services: OnceCell::new(),
      setup_runs: AtomicCounter::new(0),
    }
  }

  pub fn from_env() -> Result<Self, BootstrapError> {
    Ok(Self::new(BootstrapSettings::from_env()?))
  }

  pub fn settings(&self) -> &BootstrapSettings {
    &self.settings
  }

  pub fn is_initialized(&self) -> bool {
    self.services.initialized()
  }

  /// How many times setup has started, successful or not.
  pub fn setup_runs(&self) -> i64 {
    self.setup_runs.value()
  }

  async fn services(&self) -> Result<&Services, BootstrapError> {
    self.services.get_or_try_init(|| self.setup()).await
  }

  async fn setup(&self) -> Result<Services, BootstrapError> {
    let run = self.setup_runs.increment();
    info!(
      store = %self.settings.store_root.display(),
      listen = %self.settings.listen,
      run,
      "bootstrapping runtime"
    );

    let store = Arc::new(LocalStore::open(&self.settings.store_root)?);
    let cache = Arc::new(MemoryCache::new());

    let listener = TcpListener::bind(self.settings.listen)
      .await
      .map_err(|source| BootstrapError::Listen {
        addr: self.settings.listen,
        source,
      })?;
    let local_endpoint = listener.local_addr().map_err(|source| BootstrapError::Listen {
      addr: self.settings.listen,
      source,
    })?;

    let default_config = Arc::new(
      ExecutionContextConfig::new(
        store.clone(),
        self.settings.serializer,
        self.settings.default_container.clone(),
      )
      .with_cache(cache.clone()),
    );

    info!(endpoint = %local_endpoint, "runtime ready");
    Ok(Services {
      store,
      cache,
      listener,
      local_endpoint,
      default_config,
    })
  }

  /// A context bound to the process store, serializer, and cache, with
  /// `default_container` as its default directory.
  pub async fn config(&self, default_container: &str) -> Result<Arc<ExecutionContextConfig>, BootstrapError> {
    let services = self.services().await?;
    if default_container == services.default_config.default_directory() {
      return Ok(services.default_config.clone());
    }

    let config = ExecutionContextConfig::new(
      services.store.clone(),
      self.settings.serializer,
      default_container.to_string(),
    )
    .with_cache(services.cache.clone());
    Ok(Arc::new(config))
  }

  /// The context for the configured default container.
  pub async fn default_config(&self) -> Result<Arc<ExecutionContextConfig>, BootstrapError> {
    Ok(self.services().await?.default_config.clone())
  }

  pub async fn local_endpoint(&self) -> Result<SocketAddr, BootstrapError> {
    Ok(self.services().await?.local_endpoint)
  }

  /// The local endpoint as `host:port`, with IPv6 hosts bracketed.
  pub async fn address(&self) -> Result<String, BootstrapError> {
    Ok(self.local_endpoint().await?.to_string())
  }

  /// The bound listener, for the transport layer to accept on.
  pub async fn listener(&self) -> Result<&TcpListener, BootstrapError> {
    Ok(&self.services().await?.listener)
  }

  pub async fn create_unique_container_name(&self) -> Result<String, BootstrapError> {
    Ok(self.services().await?.store.create_unique_container_name())
  }
}
