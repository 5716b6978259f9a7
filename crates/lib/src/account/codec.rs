//! Account blob encoding
//!
//! `Account -> postcard -> obfuscate -> AES-256-GCM`, all keyed from the user's
//! credentials. Apps are stored as `(name, permitted_dirs, icon)`; launch details stay
//! on the machine that registered them.

use std::{collections::BTreeSet, net::IpAddr};

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::{Account, AppDetails, DirectoryInfo};
use crate::{
    Clock, Identity, Result, UserCredentials,
    clock::{datetime_to_millis, millis_to_datetime},
    crypto::{self, CryptoError, KeyAndIv},
    passport::Passport,
};

#[derive(Serialize, Deserialize)]
struct SerialisedAccount {
    #[serde(with = "serde_bytes")]
    encrypted_identity: Vec<u8>,
    timestamp: u64,
    ip: IpAddr,
    port: u16,
    unique_user_id: Option<Identity>,
    root_parent_id: Option<Identity>,
    config_key_and_iv: KeyAndIv,
    apps: Vec<SerialisedApp>,
}

#[derive(Serialize, Deserialize)]
struct SerialisedApp {
    name: String,
    permitted_dirs: Vec<DirectoryInfo>,
    #[serde(with = "serde_bytes")]
    icon: Vec<u8>,
}

/// Encrypt `account` under `credentials`.
///
/// Stamps the account with the clock's current time, moved forward if needed so that
/// the timestamp strictly increases. The account is only touched once the blob has
/// been produced.
pub fn encrypt_account(
    credentials: &UserCredentials,
    account: &mut Account,
    clock: &dyn Clock,
) -> Result<Vec<u8>> {
    let secure_password = crypto::derive_secure_password(credentials)?;

    let previous = datetime_to_millis(&account.timestamp);
    let timestamp = clock.now_millis().max(previous.saturating_add(1));

    let serialised = SerialisedAccount {
        encrypted_identity: account.passport.encrypt(&secure_password)?,
        timestamp,
        ip: account.ip,
        port: account.port,
        unique_user_id: account.unique_user_id,
        root_parent_id: account.root_parent_id,
        config_key_and_iv: account.config_key_and_iv.clone(),
        apps: account
            .apps
            .iter()
            .map(|app| SerialisedApp {
                name: app.name.clone(),
                permitted_dirs: app.permitted_dirs.iter().cloned().collect(),
                icon: app.icon.clone(),
            })
            .collect(),
    };

    let plaintext = Zeroizing::new(postcard::to_stdvec(&serialised)?);
    let masked = Zeroizing::new(crypto::obfuscate(credentials, &plaintext));
    let blob = crypto::symm_encrypt(&secure_password.key_and_iv(), &masked)?;

    account.timestamp = millis_to_datetime(timestamp);
    tracing::debug!(
        timestamp,
        apps = account.apps.len(),
        bytes = blob.len(),
        "Encrypted account"
    );
    Ok(blob)
}

/// Decrypt a blob produced by [`encrypt_account`].
///
/// Wrong credentials and a corrupted blob both fail with
/// [`CryptoError::DecryptionFailed`].
pub fn decrypt_account(blob: &[u8], credentials: &UserCredentials) -> Result<Account> {
    let secure_password = crypto::derive_secure_password(credentials)?;

    let masked = Zeroizing::new(crypto::symm_decrypt(&secure_password.key_and_iv(), blob)?);
    let plaintext = Zeroizing::new(crypto::obfuscate(credentials, &masked));
    let serialised: SerialisedAccount =
        postcard::from_bytes(&plaintext).map_err(|e| CryptoError::MalformedData {
            reason: format!("account blob: {e}"),
        })?;

    let passport = Passport::decrypt(&serialised.encrypted_identity, &secure_password)?;

    let mut apps = BTreeSet::new();
    for app in serialised.apps {
        let name = app.name.clone();
        let record = AppDetails {
            name: app.name,
            permitted_dirs: app.permitted_dirs.into_iter().collect(),
            icon: app.icon,
            ..Default::default()
        };
        if !apps.insert(record) {
            return Err(CryptoError::MalformedData {
                reason: format!("account blob lists app '{name}' twice"),
            }
            .into());
        }
    }

    Ok(Account {
        passport,
        timestamp: millis_to_datetime(serialised.timestamp),
        ip: serialised.ip,
        port: serialised.port,
        unique_user_id: serialised.unique_user_id,
        root_parent_id: serialised.root_parent_id,
        config_key_and_iv: serialised.config_key_and_iv,
        apps,
    })
}
