// Copyright (c) 2016 Anatoly Ikorsky
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

use mysql_common::{
    io::ParseBuf,
    packets::{AuthPlugin, HandshakePacket},
    proto::MySerialize,
};

use super::{
    generic::{server_error, ERR_HEADER},
    ClientPacket, RawPacket, ServerPacket,
};
use crate::{
    consts::{
        self, AuthMethod, CapabilityFlags, StatusFlags, DEFAULT_MAX_PACKET_SIZE, PROTOCOL_VERSION,
    },
    error::{DriverError, Result},
};

/// Initial packet sent by the server (`Protocol::HandshakeV10`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handshake {
    pub sequence_id: u8,
    pub protocol_version: u8,
    pub server_version: String,
    pub connection_id: u32,
    pub capabilities: CapabilityFlags,
    pub character_set: u8,
    pub status_flags: StatusFlags,
    /// Both parts of the auth plugin data with the trailing NUL removed.
    pub scramble: Vec<u8>,
    /// Name of the authentication plugin if the server advertised one.
    pub auth_plugin: Option<String>,
    version: Option<(u16, u16, u16)>,
}

impl Handshake {
    /// Advertised authentication method. `None` if the server didn't name one.
    pub fn auth_method(&self) -> Option<AuthMethod> {
        self.auth_plugin.as_deref().map(AuthMethod::from_name)
    }

    /// Leading `major.minor.patch` of the server version string.
    pub fn server_version_parsed(&self) -> Option<(u16, u16, u16)> {
        self.version
    }
}

impl ServerPacket for Handshake {
    fn parse(packet: RawPacket) -> Result<Self> {
        match packet.header() {
            Some(ERR_HEADER) => return Err(server_error(&packet.payload)),
            Some(PROTOCOL_VERSION) | None => (),
            Some(version) => return Err(DriverError::UnsupportedProtocolVersion { version }.into()),
        }

        let handshake: HandshakePacket<'_> = ParseBuf(&packet.payload).parse(())?;

        let mut scramble = handshake.scramble_1_ref().to_vec();
        match handshake.scramble_2_ref() {
            Some([head @ .., 0]) | Some(head) => scramble.extend_from_slice(head),
            None => (),
        }

        let auth_plugin = handshake
            .auth_plugin_name_ref()
            .filter(|name| !name.is_empty())
            .map(|name| String::from_utf8_lossy(name).into_owned());

        Ok(Handshake {
            sequence_id: packet.seq_id,
            protocol_version: handshake.protocol_version(),
            server_version: handshake.server_version_str().into_owned(),
            connection_id: handshake.connection_id(),
            capabilities: handshake.capabilities(),
            character_set: handshake.default_collation(),
            status_flags: handshake.status_flags(),
            scramble,
            auth_plugin,
            version: handshake.server_version_parsed(),
        })
    }
}

/// Client reply to the [`Handshake`] (`Protocol::HandshakeResponse41`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeResponse<'a>(mysql_common::packets::HandshakeResponse<'a>);

impl<'a> HandshakeResponse<'a> {
    pub const SEQUENCE_ID: u8 = 1;

    /// Builds a response negotiated against `handshake`.
    ///
    /// Capabilities are the client defaults limited to what the server supports.
    /// `CLIENT_CONNECT_WITH_DB` is set for a non-empty database name.
    pub fn new(
        handshake: &Handshake,
        user: &'a [u8],
        auth_response: &'a [u8],
        database: &'a [u8],
        auth_method: &'a AuthMethod,
    ) -> Self {
        let mut capabilities = consts::default_client_capabilities();
        if !database.is_empty() {
            capabilities.insert(CapabilityFlags::CLIENT_CONNECT_WITH_DB);
        }
        let capabilities = capabilities & handshake.capabilities;

        let database = capabilities
            .contains(CapabilityFlags::CLIENT_CONNECT_WITH_DB)
            .then_some(database);
        let auth_plugin = capabilities
            .contains(CapabilityFlags::CLIENT_PLUGIN_AUTH)
            .then(|| AuthPlugin::from_bytes(auth_method.as_str().as_bytes()));

        // the collation is picked from the server version: utf8mb4 since 5.5.3
        Self(mysql_common::packets::HandshakeResponse::new(
            Some(auth_response),
            handshake.server_version_parsed().unwrap_or((0, 0, 0)),
            Some(user),
            database,
            auth_plugin,
            capabilities,
            None,
            DEFAULT_MAX_PACKET_SIZE,
        ))
    }

    pub fn capabilities(&self) -> CapabilityFlags {
        self.0.capabilities()
    }

    pub fn collation(&self) -> u8 {
        self.0.collation()
    }

    pub fn user(&self) -> &[u8] {
        self.0.user()
    }

    pub fn auth_response(&self) -> &[u8] {
        self.0.scramble_buf()
    }

    pub fn database(&self) -> Option<&[u8]> {
        self.0.db_name()
    }
}

impl ClientPacket for HandshakeResponse<'_> {
    fn sequence_id(&self) -> u8 {
        Self::SEQUENCE_ID
    }

    fn serialize(&self, buf: &mut Vec<u8>) {
        MySerialize::serialize(&self.0, buf);
    }
}
