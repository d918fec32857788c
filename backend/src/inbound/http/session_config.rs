//! Session cookie settings read from the environment.
//!
//! Debug builds fall back to development defaults with a warning; release
//! builds refuse to start on a missing or malformed toggle.
//!
//! | variable | values | debug default |
//! |---|---|---|
//! | `SESSION_KEY_FILE` | path to at least 64 key bytes | `/var/run/secrets/session_key` |
//! | `SESSION_COOKIE_SECURE` | `1`, `0`, `true`, `false`, `yes`, `no` | secure |
//! | `SESSION_SAMESITE` | `Strict`, `Lax`, `None` | `Lax` |
//! | `SESSION_ALLOW_EPHEMERAL` | boolean; must be off in release | off |

use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};
use mockable::Env;
use sha2::{Digest, Sha256};
use tracing::warn;
use zeroize::Zeroize;

pub const KEY_FILE_ENV: &str = "SESSION_KEY_FILE";
pub const COOKIE_SECURE_ENV: &str = "SESSION_COOKIE_SECURE";
pub const SAMESITE_ENV: &str = "SESSION_SAMESITE";
pub const ALLOW_EPHEMERAL_ENV: &str = "SESSION_ALLOW_EPHEMERAL";

const DEFAULT_KEY_PATH: &str = "/var/run/secrets/session_key";
const MIN_KEY_BYTES: usize = 64;
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";

/// How strictly toggles are validated.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    Debug,
    Release,
}

impl BuildMode {
    /// `Debug` when compiled with debug assertions.
    ///
    /// ```rust
    /// use design_desk::inbound::http::session_config::BuildMode;
    ///
    /// assert_eq!(
    ///     BuildMode::current() == BuildMode::Debug,
    ///     cfg!(debug_assertions)
    /// );
    /// ```
    #[must_use]
    pub fn current() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }
}

/// Cookie-session parameters for the `/api/v1` scope.
pub struct SessionSettings {
    pub key: Key,
    pub cookie_secure: bool,
    pub same_site: SameSite,
}

impl SessionSettings {
    /// Short hex fingerprint of the signing key, safe to log.
    pub fn key_fingerprint(&self) -> String {
        let digest = Sha256::digest(self.key.signing());
        hex::encode(&digest[..8])
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    #[error("SESSION_SAMESITE=None requires SESSION_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
    #[error("SESSION_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
}

/// Reads toggles, downgrading problems to warnings in debug builds.
struct Toggles<'a, E> {
    env: &'a E,
    mode: BuildMode,
}

impl<E: Env> Toggles<'_, E> {
    fn lenient(&self) -> bool {
        self.mode == BuildMode::Debug
    }

    /// Accept `fallback` in debug builds, fail with `error` otherwise.
    fn fallback<T>(&self, fallback: T, error: SessionConfigError) -> Result<T, SessionConfigError> {
        if self.lenient() {
            warn!(%error, "using development session default");
            Ok(fallback)
        } else {
            Err(error)
        }
    }

    fn flag(&self, name: &'static str, fallback: bool) -> Result<bool, SessionConfigError> {
        let Some(value) = self.env.string(name) else {
            return self.fallback(fallback, SessionConfigError::MissingEnv { name });
        };
        match parse_bool(&value) {
            Some(flag) => Ok(flag),
            None => self.fallback(
                fallback,
                SessionConfigError::InvalidEnv {
                    name,
                    value,
                    expected: BOOL_EXPECTED,
                },
            ),
        }
    }

    fn same_site(&self, cookie_secure: bool) -> Result<SameSite, SessionConfigError> {
        let default = if self.lenient() {
            SameSite::Lax
        } else {
            SameSite::Strict
        };
        let Some(value) = self.env.string(SAMESITE_ENV) else {
            return self.fallback(default, SessionConfigError::MissingEnv { name: SAMESITE_ENV });
        };
        match value.to_ascii_lowercase().as_str() {
            "lax" => Ok(SameSite::Lax),
            "strict" => Ok(SameSite::Strict),
            "none" if cookie_secure => Ok(SameSite::None),
            "none" => self.fallback(SameSite::None, SessionConfigError::InsecureSameSiteNone),
            _ => self.fallback(
                default,
                SessionConfigError::InvalidEnv {
                    name: SAMESITE_ENV,
                    value,
                    expected: SAMESITE_EXPECTED,
                },
            ),
        }
    }

    fn key(&self, allow_ephemeral: bool) -> Result<Key, SessionConfigError> {
        let path = PathBuf::from(
            self.env
                .string(KEY_FILE_ENV)
                .unwrap_or_else(|| DEFAULT_KEY_PATH.to_owned()),
        );
        let mut bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(source) if self.lenient() || allow_ephemeral => {
                warn!(path = %path.display(), error = %source, "using temporary session key");
                return Ok(Key::generate());
            }
            Err(source) => return Err(SessionConfigError::KeyRead { path, source }),
        };
        let length = bytes.len();
        if !self.lenient() && length < MIN_KEY_BYTES {
            bytes.zeroize();
            return Err(SessionConfigError::KeyTooShort {
                path,
                length,
                min_len: MIN_KEY_BYTES,
            });
        }
        let key = Key::derive_from(&bytes);
        bytes.zeroize();
        Ok(key)
    }
}

/// Build session settings from environment toggles.
///
/// ```rust
/// use design_desk::inbound::http::session_config::{BuildMode, session_settings_from_env};
/// use mockable::MockEnv;
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|_| None);
/// let settings = session_settings_from_env(&env, BuildMode::Debug).expect("debug defaults");
/// assert!(settings.cookie_secure);
/// ```
pub fn session_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let toggles = Toggles { env, mode };
    let cookie_secure = toggles.flag(COOKIE_SECURE_ENV, true)?;
    let same_site = toggles.same_site(cookie_secure)?;
    let allow_ephemeral = toggles.flag(ALLOW_EPHEMERAL_ENV, false)?;
    if allow_ephemeral && mode == BuildMode::Release {
        return Err(SessionConfigError::EphemeralNotAllowed);
    }
    let key = toggles.key(allow_ephemeral)?;
    Ok(SessionSettings {
        key,
        cookie_secure,
        same_site,
    })
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockable::MockEnv;
    use rstest::{fixture, rstest};
    use std::collections::HashMap;
    use tempfile::NamedTempFile;

    fn mock_env(vars: HashMap<&'static str, String>) -> MockEnv {
        let mut env = MockEnv::new();
        env.expect_string()
            .times(0..)
            .returning(move |key| vars.get(key).cloned());
        env
    }

    #[fixture]
    fn key_file() -> NamedTempFile {
        let file = NamedTempFile::new().expect("temp key file");
        std::fs::write(file.path(), vec![b'k'; MIN_KEY_BYTES]).expect("write key");
        file
    }

    fn release_vars(key_file: &NamedTempFile) -> HashMap<&'static str, String> {
        HashMap::from([
            (KEY_FILE_ENV, key_file.path().to_string_lossy().into_owned()),
            (COOKIE_SECURE_ENV, "1".to_owned()),
            (SAMESITE_ENV, "Strict".to_owned()),
            (ALLOW_EPHEMERAL_ENV, "0".to_owned()),
        ])
    }

    #[rstest]
    fn release_accepts_explicit_settings(key_file: NamedTempFile) {
        let env = mock_env(release_vars(&key_file));
        let settings = session_settings_from_env(&env, BuildMode::Release).expect("valid");
        assert!(settings.cookie_secure);
        assert_eq!(settings.same_site, SameSite::Strict);
        assert_eq!(settings.key_fingerprint().len(), 16);
    }

    #[rstest]
    #[case(COOKIE_SECURE_ENV)]
    #[case(SAMESITE_ENV)]
    #[case(ALLOW_EPHEMERAL_ENV)]
    fn release_requires_every_toggle(key_file: NamedTempFile, #[case] missing: &'static str) {
        let mut vars = release_vars(&key_file);
        vars.remove(missing);
        let err = session_settings_from_env(&mock_env(vars), BuildMode::Release)
            .err()
            .expect("missing toggle rejected");
        assert!(matches!(err, SessionConfigError::MissingEnv { name } if name == missing));
    }

    #[rstest]
    fn release_rejects_malformed_flags(key_file: NamedTempFile) {
        let mut vars = release_vars(&key_file);
        vars.insert(COOKIE_SECURE_ENV, "maybe".to_owned());
        let err = session_settings_from_env(&mock_env(vars), BuildMode::Release)
            .err()
            .expect("invalid flag rejected");
        assert!(matches!(err, SessionConfigError::InvalidEnv { .. }));
    }

    #[rstest]
    fn release_rejects_insecure_same_site_none(key_file: NamedTempFile) {
        let mut vars = release_vars(&key_file);
        vars.insert(COOKIE_SECURE_ENV, "0".to_owned());
        vars.insert(SAMESITE_ENV, "None".to_owned());
        let err = session_settings_from_env(&mock_env(vars), BuildMode::Release)
            .err()
            .expect("insecure None rejected");
        assert!(matches!(err, SessionConfigError::InsecureSameSiteNone));
    }

    #[rstest]
    fn release_rejects_ephemeral_keys(key_file: NamedTempFile) {
        let mut vars = release_vars(&key_file);
        vars.insert(ALLOW_EPHEMERAL_ENV, "1".to_owned());
        let err = session_settings_from_env(&mock_env(vars), BuildMode::Release)
            .err()
            .expect("ephemeral rejected");
        assert!(matches!(err, SessionConfigError::EphemeralNotAllowed));
    }

    #[rstest]
    fn release_rejects_short_keys() {
        let short = NamedTempFile::new().expect("temp key file");
        std::fs::write(short.path(), b"short").expect("write key");
        let err = session_settings_from_env(&mock_env(release_vars(&short)), BuildMode::Release)
            .err()
            .expect("short key rejected");
        assert!(matches!(
            err,
            SessionConfigError::KeyTooShort { length: 5, .. }
        ));
    }

    #[rstest]
    fn release_rejects_missing_key_file(key_file: NamedTempFile) {
        let mut vars = release_vars(&key_file);
        vars.insert(KEY_FILE_ENV, "/nonexistent/session_key".to_owned());
        let err = session_settings_from_env(&mock_env(vars), BuildMode::Release)
            .err()
            .expect("missing key rejected");
        assert!(matches!(err, SessionConfigError::KeyRead { .. }));
    }

    #[rstest]
    fn debug_falls_back_to_lenient_defaults() {
        let mut vars = HashMap::new();
        vars.insert(KEY_FILE_ENV, "/nonexistent/session_key".to_owned());
        vars.insert(SAMESITE_ENV, "sideways".to_owned());
        let settings = session_settings_from_env(&mock_env(vars), BuildMode::Debug)
            .expect("debug tolerates gaps");
        assert!(settings.cookie_secure);
        assert_eq!(settings.same_site, SameSite::Lax);
    }

    #[rstest]
    fn process_environment_is_read_through_default_env(key_file: NamedTempFile) {
        let _guard = env_lock::lock_env(
            release_vars(&key_file)
                .into_iter()
                .map(|(name, value)| (name, Some(value))),
        );

        let settings = session_settings_from_env(&mockable::DefaultEnv::new(), BuildMode::Release)
            .expect("release settings from the process environment");
        assert!(settings.cookie_secure);
        assert_eq!(settings.same_site, SameSite::Strict);
    }

    #[rstest]
    fn fingerprints_follow_the_key(key_file: NamedTempFile) {
        let env = mock_env(release_vars(&key_file));
        let first = session_settings_from_env(&env, BuildMode::Release).expect("valid");
        let second = session_settings_from_env(&env, BuildMode::Release).expect("valid");
        assert_eq!(first.key_fingerprint(), second.key_fingerprint());
    }
}
