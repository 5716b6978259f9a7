//! Constants used throughout the launcher library.

/// Number of account versions retained in the version chain.
pub const MAX_ACCOUNT_VERSIONS: usize = 20;

/// AES-256 key size in bytes.
pub const AES256_KEY_SIZE: usize = 32;

/// Initialisation vector size in bytes.
pub const AES256_IV_SIZE: usize = 16;

/// Combined key and IV size held by the account for the config file.
pub const KEY_AND_IV_SIZE: usize = AES256_KEY_SIZE + AES256_IV_SIZE;

/// Size of an [`Identity`](crate::Identity) in bytes (one SHA-512 digest).
pub const IDENTITY_SIZE: usize = 64;

/// Name of the drive directory granted through `Launcher::update_app_safe_drive_access`.
pub const SAFE_DRIVE_DIR_NAME: &str = "SafeDrive";

/// Default config file name inside the launcher's directory.
pub const CONFIG_FILE_NAME: &str = "config";

/// Default launcher directory, relative to `$HOME`.
pub const DEFAULT_LAUNCHER_DIR: &str = ".safe-launcher";

/// Environment variable overriding the config file location.
pub const CONFIG_FILE_ENV: &str = "SAFE_LAUNCHER_CONFIG_FILE";
