// Copyright (c) 2016 Anatoly Ikorsky
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

use mysql_common::{
    io::ParseBuf,
    packets::{AuthSwitchRequest, CommonOkPacket, ErrPacket, OkPacketDeserializer},
};

use std::{borrow::Cow, io};

use super::{RawPacket, ServerPacket};
use crate::{
    consts::{AuthMethod, CapabilityFlags, StatusFlags},
    error::{DriverError, Error, Result},
};

pub(crate) const ERR_HEADER: u8 = 0xff;
pub(crate) const AUTH_SWITCH_HEADER: u8 = 0xfe;

/// Converts an `ERR_Packet` payload into [`Error::Server`].
///
/// Errors sent before the handshake completes may lack the `#` SQL state marker,
/// so the protocol 4.1 layout is only assumed when the marker is present.
pub(crate) fn server_error(payload: &[u8]) -> Error {
    let capabilities = match payload.get(3) {
        Some(b'#') => CapabilityFlags::CLIENT_PROTOCOL_41,
        _ => CapabilityFlags::empty(),
    };
    match ParseBuf(payload).parse::<ErrPacket<'_>>(capabilities) {
        Ok(ErrPacket::Error(err)) => err.into(),
        Ok(ErrPacket::Progress(_)) => {
            io::Error::new(io::ErrorKind::InvalidData, "unexpected progress report").into()
        }
        Err(err) => err.into(),
    }
}

/// Name of the method requested by an `AuthSwitchRequest` payload.
///
/// A bare `0xfe` is the old-style request for `mysql_old_password`.
fn requested_method(payload: &[u8]) -> Result<String> {
    if payload.len() == 1 {
        return Ok(AuthMethod::MYSQL_OLD_PASSWORD.to_owned());
    }
    let request: AuthSwitchRequest<'_> = ParseBuf(payload).parse(())?;
    Ok(String::from_utf8_lossy(request.auth_plugin().as_bytes()).into_owned())
}

/// Server acknowledgement (`OK_Packet`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OkPacket {
    pub sequence_id: u8,
    pub affected_rows: u64,
    pub last_insert_id: Option<u64>,
    pub status_flags: StatusFlags,
    pub warnings: u16,
    pub info: String,
}

impl ServerPacket for OkPacket {
    /// Besides `ERR`, an `AuthSwitchRequest` in place of `OK` is an error too:
    /// the server wants a method this client doesn't implement.
    fn parse(packet: RawPacket) -> Result<Self> {
        match packet.header() {
            Some(ERR_HEADER) => return Err(server_error(&packet.payload)),
            Some(AUTH_SWITCH_HEADER) => {
                return Err(DriverError::UnsupportedAuthMethod {
                    method: Some(requested_method(&packet.payload)?),
                }
                .into());
            }
            _ => (),
        }

        let ok = ParseBuf(&packet.payload)
            .parse::<OkPacketDeserializer<'_, CommonOkPacket>>(
                CapabilityFlags::CLIENT_PROTOCOL_41,
            )?
            .into_inner();

        Ok(OkPacket {
            sequence_id: packet.seq_id,
            affected_rows: ok.affected_rows(),
            last_insert_id: ok.last_insert_id(),
            status_flags: ok.status_flags(),
            warnings: ok.warnings(),
            info: ok.info_str().map(Cow::into_owned).unwrap_or_default(),
        })
    }
}
