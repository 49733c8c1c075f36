use std::env;
use std::path::PathBuf;

/// Dictionary root used when the caller does not name one.
pub const DEFAULT_DICTIONARY_ROOT: &str = "/usr/local/morph/dicts";

/// Environment variable overriding [`DEFAULT_DICTIONARY_ROOT`].
pub const DICTIONARY_ROOT_ENV: &str = "ADMORPH_DICTS";

pub fn default_dictionary_root() -> PathBuf {
    match env::var_os(DICTIONARY_ROOT_ENV) {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => PathBuf::from(DEFAULT_DICTIONARY_ROOT),
    }
}
