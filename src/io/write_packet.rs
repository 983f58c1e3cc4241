// Copyright (c) 2017 Anatoly Ikorsky
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

use futures_core::ready;
use futures_sink::Sink;

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use super::Stream;
use crate::{error::IoError, proto::RawPacket};

/// Writes and flushes a packet.
#[derive(Debug)]
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct WritePacket<'a> {
    stream: &'a mut Stream,
    packet: Option<RawPacket>,
}

impl<'a> WritePacket<'a> {
    pub(crate) fn new(stream: &'a mut Stream, packet: RawPacket) -> Self {
        Self {
            stream,
            packet: Some(packet),
        }
    }
}

impl Future for WritePacket<'_> {
    type Output = std::result::Result<(), IoError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.packet.is_some() {
            ready!(Pin::new(&mut *self.stream.codec).poll_ready(cx))?;
        }

        if let Some(packet) = self.packet.take() {
            // to get here, stream must be ready
            Pin::new(&mut *self.stream.codec).start_send(packet)?;
        }

        ready!(Pin::new(&mut *self.stream.codec).poll_flush(cx))?;

        Poll::Ready(Ok(()))
    }
}
