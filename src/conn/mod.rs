// Copyright (c) 2016 Anatoly Ikorsky
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

use tokio::net::ToSocketAddrs;

use std::{fmt, net::SocketAddr};

use crate::{
    consts::{CapabilityFlags, StatusFlags},
    credentials::Credentials,
    error::*,
    io::Stream,
    opts::Opts,
};

pub use self::auth::{authenticate, ServerInfo};

pub mod auth;

/// Authenticated MySql connection.
pub struct Conn {
    stream: Stream,
    info: ServerInfo,
}

impl fmt::Debug for Conn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Conn")
            .field("connection id", &self.id())
            .field("server version", &self.server_version())
            .field("stream", &self.stream)
            .finish()
    }
}

impl Conn {
    /// Returns the server-side id of this connection.
    pub fn id(&self) -> u32 {
        self.info.connection_id
    }

    /// Returns the version string the server sent in its handshake.
    pub fn server_version(&self) -> &str {
        &self.info.server_version
    }

    /// Capabilities negotiated during the handshake.
    pub fn capabilities(&self) -> CapabilityFlags {
        self.info.capabilities
    }

    /// Status flags from the server acknowledgement.
    pub fn status(&self) -> StatusFlags {
        self.info.status_flags
    }

    pub fn server_info(&self) -> &ServerInfo {
        &self.info
    }

    pub(crate) fn stream_mut(&mut self) -> &mut Stream {
        &mut self.stream
    }

    /// Returns a future that resolves to an authenticated [`Conn`].
    pub async fn new<T: Into<Opts>>(opts: T) -> Result<Conn> {
        let opts = opts.into();
        let credentials = opts.credentials();
        let database = opts.db_name().unwrap_or_default();

        let fut = async {
            let stream = Stream::connect_tcp(
                (opts.ip_or_hostname(), opts.tcp_port()),
                opts.tcp_nodelay(),
                opts.tcp_keepalive(),
            )
            .await?;
            Conn::handshake(stream, database, &credentials).await
        };

        #[cfg(feature = "tracing")]
        let fut = instrument_result!(
            fut,
            create_span!(
                tracing::Level::INFO,
                "mysql_auth::connect",
                host = opts.ip_or_hostname(),
                port = opts.tcp_port(),
                user = credentials.username()
            )
        );

        fut.await
    }

    /// Connects to `addr` and authenticates as `credentials`.
    pub async fn connect<A>(addr: A, database: &str, credentials: &Credentials) -> Result<Conn>
    where
        A: ToSocketAddrs,
    {
        let fut = async {
            let stream = Stream::connect_tcp(addr, true, None).await?;
            Conn::handshake(stream, database, credentials).await
        };

        #[cfg(feature = "tracing")]
        let fut = instrument_result!(
            fut,
            create_span!(
                tracing::Level::INFO,
                "mysql_auth::connect",
                user = credentials.username(),
                database
            )
        );

        fut.await
    }

    /// Runs the authentication exchange over a freshly opened `stream`.
    ///
    /// On failure the stream is shut down before the error is returned.
    pub async fn handshake(
        mut stream: Stream,
        database: &str,
        credentials: &Credentials,
    ) -> Result<Conn> {
        match authenticate(&mut stream, database, credentials).await {
            Ok(info) => Ok(Conn { stream, info }),
            Err(err) => {
                // the original error is more useful than a failed shutdown
                let _ = stream.close().await;
                Err(err)
            }
        }
    }

    /// Address of the server.
    pub fn peer_addr(&self) -> std::io::Result<SocketAddr> {
        self.stream.peer_addr()
    }

    /// Shuts the connection down.
    pub async fn disconnect(mut self) -> Result<()> {
        self.stream.close().await?;
        Ok(())
    }
}
