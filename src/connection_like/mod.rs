// Copyright (c) 2017 Anatoly Ikorsky
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

use futures_util::FutureExt;

use crate::{
    io::Stream,
    proto::{ClientPacket, RawPacket, ServerPacket},
    BoxFuture, Conn,
};

/// Packet transport the handshake runs over.
///
/// Implementors only move raw packets. Parsing and serialization are provided.
/// A connection must not be driven by more than one handshake at a time,
/// which `&mut self` on every method enforces.
pub trait Connection: Send {
    /// Reads the next packet.
    fn read_packet(&mut self) -> BoxFuture<'_, RawPacket>;

    /// Writes and flushes a packet.
    fn write_packet(&mut self, packet: RawPacket) -> BoxFuture<'_, ()>;

    /// Reads the next packet as `P`.
    ///
    /// Fails if the wire data isn't a `P`. An `ERR` packet becomes [`crate::Error::Server`].
    fn receive<P>(&mut self) -> BoxFuture<'_, P>
    where
        Self: Sized,
        P: ServerPacket,
    {
        async move {
            let packet = self.read_packet().await?;
            P::parse(packet)
        }
        .boxed()
    }

    /// Serializes and writes `packet` under its own sequence id.
    fn send<P>(&mut self, packet: &P) -> BoxFuture<'_, ()>
    where
        Self: Sized,
        P: ClientPacket + ?Sized,
    {
        self.write_packet(packet.to_raw())
    }
}

impl Connection for Stream {
    fn read_packet(&mut self) -> BoxFuture<'_, RawPacket> {
        async move {
            let packet = Stream::read_packet(self).await?;
            #[cfg(feature = "tracing")]
            tracing::trace!(seq_id = packet.seq_id, len = packet.payload.len(), "read packet");
            Ok(packet)
        }
        .boxed()
    }

    fn write_packet(&mut self, packet: RawPacket) -> BoxFuture<'_, ()> {
        async move {
            #[cfg(feature = "tracing")]
            tracing::trace!(seq_id = packet.seq_id, len = packet.payload.len(), "write packet");
            Stream::write_packet(self, packet).await?;
            Ok(())
        }
        .boxed()
    }
}

impl Connection for Conn {
    fn read_packet(&mut self) -> BoxFuture<'_, RawPacket> {
        Connection::read_packet(self.stream_mut())
    }

    fn write_packet(&mut self, packet: RawPacket) -> BoxFuture<'_, ()> {
        Connection::write_packet(self.stream_mut(), packet)
    }
}
