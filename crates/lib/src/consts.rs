//! Process-wide constants.

/// Application name, used for platform directories.
pub const APP_NAME: &str = "stowage";

/// Overrides the root directory of the local store.
pub const ENV_STORE: &str = "STOWAGE_STORE";

/// Overrides the listener socket address bound at bootstrap.
pub const ENV_LISTEN: &str = "STOWAGE_LISTEN";

/// Selects the default codec (`json`, `json-pretty`, `cbor`).
pub const ENV_SERIALIZER: &str = "STOWAGE_SERIALIZER";

/// Overrides the default container used for new references.
pub const ENV_CONTAINER: &str = "STOWAGE_CONTAINER";

/// Loopback with an ephemeral port.
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:0";

pub const DEFAULT_CONTAINER: &str = "default";

/// Directory name of the store within the data directory.
pub const STORE_DIR_NAME: &str = "store";

/// Prefix of generated container names.
pub const CONTAINER_PREFIX: &str = "container-";
