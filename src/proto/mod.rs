// Copyright (c) 2016 Anatoly Ikorsky
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! Packets exchanged during the connection phase.

use bytes::Bytes;

use crate::error::Result;

mod generic;
mod handshake;

pub use self::generic::OkPacket;
pub use self::handshake::{Handshake, HandshakeResponse};
pub use mysql_common::packets::{AuthSwitchRequest, ErrPacket};

#[cfg(test)]
pub(crate) use self::handshake::test::handshake_payload;

/// Payload of a single logical packet together with its sequence id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPacket {
    pub seq_id: u8,
    pub payload: Bytes,
}

impl RawPacket {
    pub fn new(seq_id: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            seq_id,
            payload: payload.into(),
        }
    }

    /// First byte of the payload, if any.
    pub fn header(&self) -> Option<u8> {
        self.payload.first().copied()
    }
}

/// A packet sent by the server.
pub trait ServerPacket: Sized + Send + 'static {
    /// Parses a packet from its raw form.
    ///
    /// An `ERR` packet received in place of `Self` is returned as [`crate::Error::Server`].
    fn parse(packet: RawPacket) -> Result<Self>;
}

/// A packet sent by the client.
pub trait ClientPacket {
    /// Sequence id this packet occupies in the exchange.
    fn sequence_id(&self) -> u8;

    fn serialize(&self, buf: &mut Vec<u8>);

    fn to_raw(&self) -> RawPacket {
        let mut buf = Vec::new();
        self.serialize(&mut buf);
        RawPacket::new(self.sequence_id(), buf)
    }
}
