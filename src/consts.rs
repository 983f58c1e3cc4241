// Copyright (c) 2016 Anatoly Ikorsky
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! Protocol constants.

use std::fmt;

pub use mysql_common::constants::{CapabilityFlags, StatusFlags, MAX_PAYLOAD_LEN};

/// The only protocol version this client speaks (`Protocol::HandshakeV10`).
pub const PROTOCOL_VERSION: u8 = 10;

/// Length of a `mysql_native_password` scramble and of its response.
pub const SCRAMBLE_LENGTH: usize = 20;

/// `max_packet_size` advertised in the handshake response.
pub const DEFAULT_MAX_PACKET_SIZE: u32 = 16_777_216;

/// Capabilities this client asks for. The handshake response carries their
/// intersection with the server's capabilities.
pub fn default_client_capabilities() -> CapabilityFlags {
    CapabilityFlags::CLIENT_PROTOCOL_41
        | CapabilityFlags::CLIENT_SECURE_CONNECTION
        | CapabilityFlags::CLIENT_LONG_PASSWORD
        | CapabilityFlags::CLIENT_LONG_FLAG
        | CapabilityFlags::CLIENT_TRANSACTIONS
        | CapabilityFlags::CLIENT_MULTI_RESULTS
        | CapabilityFlags::CLIENT_PLUGIN_AUTH
}

/// Authentication methods a server may advertise in its handshake.
///
/// Only [`AuthMethod::MysqlNativePassword`] is implemented. The rest are known
/// so that they are rejected with a precise error.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AuthMethod {
    /// `mysql_native_password`
    MysqlNativePassword,
    /// `mysql_old_password` (pre-4.1 hashing)
    MysqlOldPassword,
    /// `mysql_clear_password`
    MysqlClearPassword,
    /// `dialog` (interactive PAM dialog)
    Dialog,
    /// `auth_gssapi_client` (Kerberos)
    AuthGssapiClient,
    /// `caching_sha2_password`
    CachingSha2Password,
    /// `sha256_password`
    Sha256Password,
    /// Anything else.
    Other(String),
}

impl AuthMethod {
    pub const MYSQL_NATIVE_PASSWORD: &'static str = "mysql_native_password";
    pub const MYSQL_OLD_PASSWORD: &'static str = "mysql_old_password";
    pub const MYSQL_CLEAR_PASSWORD: &'static str = "mysql_clear_password";
    pub const DIALOG: &'static str = "dialog";
    pub const AUTH_GSSAPI_CLIENT: &'static str = "auth_gssapi_client";
    pub const CACHING_SHA2_PASSWORD: &'static str = "caching_sha2_password";
    pub const SHA256_PASSWORD: &'static str = "sha256_password";

    pub fn from_name(name: &str) -> Self {
        match name {
            Self::MYSQL_NATIVE_PASSWORD => AuthMethod::MysqlNativePassword,
            Self::MYSQL_OLD_PASSWORD => AuthMethod::MysqlOldPassword,
            Self::MYSQL_CLEAR_PASSWORD => AuthMethod::MysqlClearPassword,
            Self::DIALOG => AuthMethod::Dialog,
            Self::AUTH_GSSAPI_CLIENT => AuthMethod::AuthGssapiClient,
            Self::CACHING_SHA2_PASSWORD => AuthMethod::CachingSha2Password,
            Self::SHA256_PASSWORD => AuthMethod::Sha256Password,
            other => AuthMethod::Other(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            AuthMethod::MysqlNativePassword => Self::MYSQL_NATIVE_PASSWORD,
            AuthMethod::MysqlOldPassword => Self::MYSQL_OLD_PASSWORD,
            AuthMethod::MysqlClearPassword => Self::MYSQL_CLEAR_PASSWORD,
            AuthMethod::Dialog => Self::DIALOG,
            AuthMethod::AuthGssapiClient => Self::AUTH_GSSAPI_CLIENT,
            AuthMethod::CachingSha2Password => Self::CACHING_SHA2_PASSWORD,
            AuthMethod::Sha256Password => Self::SHA256_PASSWORD,
            AuthMethod::Other(name) => name,
        }
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
