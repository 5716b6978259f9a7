//! The user's account record
//!
//! An [`Account`] holds the user's identity keys, the set of registered apps, and the
//! key material that encrypts this machine's config file. It lives in memory behind the
//! session's mutex and on the network as an encrypted blob (see [`encrypt_account`]).

mod codec;
mod types;

use std::{
    collections::BTreeSet,
    net::{IpAddr, Ipv4Addr},
};

use chrono::{DateTime, Utc};

pub use codec::{decrypt_account, encrypt_account};
pub use types::{AccessRights, AppDetails, DirectoryInfo};

use crate::{Identity, crypto::KeyAndIv, passport::Passport};

/// The user's root record.
///
/// Not `Clone`: identity material has exactly one owner.
#[derive(Debug)]
pub struct Account {
    pub(crate) passport: Passport,
    pub(crate) timestamp: DateTime<Utc>,
    pub(crate) ip: IpAddr,
    pub(crate) port: u16,
    pub(crate) unique_user_id: Option<Identity>,
    pub(crate) root_parent_id: Option<Identity>,
    pub(crate) config_key_and_iv: KeyAndIv,
    pub(crate) apps: BTreeSet<AppDetails>,
}

impl Account {
    /// A fresh account: random user and root directory ids, random config key, no apps.
    pub fn new(passport: Passport) -> Self {
        Self {
            passport,
            timestamp: DateTime::<Utc>::UNIX_EPOCH,
            ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 0,
            unique_user_id: Some(Identity::random()),
            root_parent_id: Some(Identity::random()),
            config_key_and_iv: KeyAndIv::random(),
            apps: BTreeSet::new(),
        }
    }

    pub fn passport(&self) -> &Passport {
        &self.passport
    }

    /// Time of the last encryption; the epoch for an account never encrypted.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn ip(&self) -> IpAddr {
        self.ip
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Record where this user's launcher listens.
    pub fn set_endpoint(&mut self, ip: IpAddr, port: u16) {
        self.ip = ip;
        self.port = port;
    }

    pub fn unique_user_id(&self) -> Option<Identity> {
        self.unique_user_id
    }

    pub fn root_parent_id(&self) -> Option<Identity> {
        self.root_parent_id
    }

    pub fn config_key_and_iv(&self) -> &KeyAndIv {
        &self.config_key_and_iv
    }

    pub fn apps(&self) -> &BTreeSet<AppDetails> {
        &self.apps
    }
}
