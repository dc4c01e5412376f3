//! Unit tests for session configuration parsing.

use std::collections::HashMap;
use std::path::PathBuf;

use actix_web::cookie::SameSite;
use mockable::MockEnv;
use rstest::{fixture, rstest};
use uuid::Uuid;

use super::*;

/// Key file in the temp directory, removed on drop.
struct TempKeyFile {
    path: PathBuf,
}

impl TempKeyFile {
    fn new(len: usize) -> Self {
        let path = std::env::temp_dir().join(format!("portal-session-key-{}", Uuid::new_v4()));
        std::fs::write(&path, vec![b'k'; len]).expect("write key file");
        Self { path }
    }

    fn path_str(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

impl Drop for TempKeyFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

fn mock_env(vars: HashMap<&'static str, String>) -> MockEnv {
    let mut env = MockEnv::new();
    env.expect_string()
        .times(0..)
        .returning(move |key| vars.get(key).cloned());
    env
}

#[fixture]
fn key_file() -> TempKeyFile {
    TempKeyFile::new(SESSION_KEY_MIN_LEN)
}

fn release_vars(key_file: &TempKeyFile) -> HashMap<&'static str, String> {
    HashMap::from([
        (SESSION_KEY_FILE_ENV, key_file.path_str()),
        (SESSION_COOKIE_SECURE_ENV, "1".to_owned()),
        (SESSION_SAMESITE_ENV, "Strict".to_owned()),
        (SESSION_ALLOW_EPHEMERAL_ENV, "0".to_owned()),
    ])
}

#[rstest]
fn release_accepts_complete_settings(key_file: TempKeyFile) {
    let env = mock_env(release_vars(&key_file));
    let settings = session_settings_from_env(&env, BuildMode::Release).expect("valid settings");
    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Strict);
}

#[rstest]
#[case(SESSION_COOKIE_SECURE_ENV)]
#[case(SESSION_SAMESITE_ENV)]
#[case(SESSION_ALLOW_EPHEMERAL_ENV)]
fn release_requires_every_toggle(key_file: TempKeyFile, #[case] missing: &'static str) {
    let mut vars = release_vars(&key_file);
    vars.remove(missing);
    let env = mock_env(vars);

    let err = session_settings_from_env(&env, BuildMode::Release)
        .err()
        .expect("missing toggle rejected");
    assert!(matches!(err, SessionConfigError::Missing { name } if name == missing));
}

#[rstest]
#[case(SESSION_COOKIE_SECURE_ENV, "maybe")]
#[case(SESSION_ALLOW_EPHEMERAL_ENV, "")]
#[case(SESSION_SAMESITE_ENV, "sometimes")]
fn release_rejects_invalid_values(
    key_file: TempKeyFile,
    #[case] name: &'static str,
    #[case] value: &str,
) {
    let mut vars = release_vars(&key_file);
    vars.insert(name, value.to_owned());
    let env = mock_env(vars);

    let err = session_settings_from_env(&env, BuildMode::Release)
        .err()
        .expect("invalid value rejected");
    assert!(matches!(err, SessionConfigError::Invalid { name: rejected, .. } if rejected == name));
}

#[rstest]
fn release_refuses_ephemeral_keys(key_file: TempKeyFile) {
    let mut vars = release_vars(&key_file);
    vars.insert(SESSION_ALLOW_EPHEMERAL_ENV, "yes".to_owned());
    let env = mock_env(vars);

    assert!(matches!(
        session_settings_from_env(&env, BuildMode::Release),
        Err(SessionConfigError::EphemeralKeyInRelease)
    ));
}

#[rstest]
fn release_refuses_unreadable_key(key_file: TempKeyFile) {
    let mut vars = release_vars(&key_file);
    vars.insert(
        SESSION_KEY_FILE_ENV,
        format!("{}-missing", key_file.path_str()),
    );
    let env = mock_env(vars);

    assert!(matches!(
        session_settings_from_env(&env, BuildMode::Release),
        Err(SessionConfigError::KeyRead { .. })
    ));
}

#[rstest]
#[case(BuildMode::Release, 32)]
#[case(BuildMode::Debug, 16)]
fn short_keys_are_rejected(#[case] mode: BuildMode, #[case] len: usize) {
    let short = TempKeyFile::new(len);
    let env = mock_env(release_vars(&short));

    assert!(matches!(
        session_settings_from_env(&env, mode),
        Err(SessionConfigError::KeyTooShort { length, .. }) if length == len
    ));
}

#[rstest]
fn release_refuses_insecure_same_site_none(key_file: TempKeyFile) {
    let mut vars = release_vars(&key_file);
    vars.insert(SESSION_COOKIE_SECURE_ENV, "0".to_owned());
    vars.insert(SESSION_SAMESITE_ENV, "None".to_owned());
    let env = mock_env(vars);

    assert!(matches!(
        session_settings_from_env(&env, BuildMode::Release),
        Err(SessionConfigError::SameSiteNoneNeedsSecure)
    ));
}

#[rstest]
fn debug_starts_without_any_settings() {
    let mut vars = HashMap::new();
    vars.insert(
        SESSION_KEY_FILE_ENV,
        std::env::temp_dir()
            .join(format!("portal-absent-{}", Uuid::new_v4()))
            .to_string_lossy()
            .into_owned(),
    );
    let env = mock_env(vars);

    let settings = session_settings_from_env(&env, BuildMode::Debug).expect("debug defaults");
    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Lax);
}

#[rstest]
fn debug_falls_back_on_invalid_values(key_file: TempKeyFile) {
    let mut vars = release_vars(&key_file);
    vars.insert(SESSION_SAMESITE_ENV, "unexpected".to_owned());
    vars.insert(SESSION_COOKIE_SECURE_ENV, "perhaps".to_owned());
    let env = mock_env(vars);

    let settings = session_settings_from_env(&env, BuildMode::Debug).expect("debug fallback");
    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Lax);
}

#[rstest]
fn same_key_file_gives_same_fingerprint(key_file: TempKeyFile) {
    let env = mock_env(release_vars(&key_file));
    let first = session_settings_from_env(&env, BuildMode::Release).expect("settings");
    let second = session_settings_from_env(&env, BuildMode::Release).expect("settings");
    assert_eq!(
        fingerprint::key_fingerprint(&first.key),
        fingerprint::key_fingerprint(&second.key)
    );
}
