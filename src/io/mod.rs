// Copyright (c) 2016 Anatoly Ikorsky
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

use socket2::{SockRef, TcpKeepalive};
use tokio::{
    io::AsyncWriteExt,
    net::{TcpStream, ToSocketAddrs},
};
use tokio_util::codec::Framed;

use std::{fmt, io, net::SocketAddr, time::Duration};

pub use self::{packet_codec::PacketCodec, read_packet::ReadPacket, write_packet::WritePacket};

use crate::proto::RawPacket;

mod packet_codec;
mod read_packet;
mod write_packet;

/// Stream connected to MySql server.
pub struct Stream {
    closed: bool,
    codec: Box<Framed<TcpStream, PacketCodec>>,
}

impl fmt::Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream")
            .field("closed", &self.closed)
            .field("endpoint", self.codec.get_ref())
            .finish()
    }
}

impl Stream {
    pub fn new(tcp_stream: TcpStream) -> Self {
        Self {
            closed: false,
            codec: Box::new(Framed::new(tcp_stream, PacketCodec::new())),
        }
    }

    /// Opens a TCP connection and applies socket options.
    pub async fn connect_tcp<S>(
        addr: S,
        tcp_nodelay: bool,
        tcp_keepalive: Option<Duration>,
    ) -> io::Result<Stream>
    where
        S: ToSocketAddrs,
    {
        let tcp_stream = TcpStream::connect(addr).await?;

        if let Some(time) = tcp_keepalive {
            let keepalive = TcpKeepalive::new().with_time(time);
            SockRef::from(&tcp_stream).set_tcp_keepalive(&keepalive)?;
        }
        tcp_stream.set_nodelay(tcp_nodelay)?;

        Ok(Stream::new(tcp_stream))
    }

    pub fn read_packet(&mut self) -> ReadPacket<'_> {
        ReadPacket::new(self)
    }

    pub fn write_packet(&mut self, packet: RawPacket) -> WritePacket<'_> {
        WritePacket::new(self, packet)
    }

    pub fn peer_addr(&self) -> io::Result<SocketAddr> {
        self.codec.get_ref().peer_addr()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Shuts down the write half of the socket. Later reads report a closed connection.
    pub async fn close(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.codec.get_mut().shutdown().await
    }
}
