// Copyright (c) 2016 Anatoly Ikorsky
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

use std::{
    fmt,
    net::{Ipv4Addr, SocketAddr},
};

use crate::{error::Result, opts::DEFAULT_PORT, Conn};

/// Default user name.
pub const DEFAULT_USER: &str = "root";

/// Credentials used to authenticate a connection.
///
/// Immutable and cheap to share. The same value may be used for any number of
/// independent connection attempts.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Credentials {
    /// User name only, no password material.
    Unsecured { username: String },
    /// User name and a plaintext password.
    Password { username: String, password: String },
}

impl Credentials {
    pub fn unsecured<T: Into<String>>(username: T) -> Self {
        Credentials::Unsecured {
            username: username.into(),
        }
    }

    pub fn with_password<T, U>(username: T, password: U) -> Self
    where
        T: Into<String>,
        U: Into<String>,
    {
        Credentials::Password {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        match self {
            Credentials::Unsecured { username } | Credentials::Password { username, .. } => {
                username
            }
        }
    }

    pub fn password(&self) -> Option<&str> {
        match self {
            Credentials::Unsecured { .. } => None,
            Credentials::Password { password, .. } => Some(password),
        }
    }

    /// Connects to `database` on `127.0.0.1:3306`.
    ///
    /// See [`Credentials::connect_to`].
    pub async fn connect(&self, database: &str) -> Result<Conn> {
        self.connect_to(
            database,
            SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
        )
        .await
    }

    /// Connects to `database` on `address` and authenticates as `self`.
    ///
    /// Either an authenticated connection is returned or the socket is shut down
    /// before the error is.
    pub async fn connect_to(&self, database: &str, address: SocketAddr) -> Result<Conn> {
        Conn::connect(address, database, self).await
    }
}

impl Default for Credentials {
    /// `root` without a password.
    fn default() -> Self {
        Credentials::unsecured(DEFAULT_USER)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Unsecured { username } => f
                .debug_struct("Unsecured")
                .field("username", username)
                .finish(),
            Credentials::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}
