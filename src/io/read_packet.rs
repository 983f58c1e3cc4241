// Copyright (c) 2017 Anatoly Ikorsky
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

use futures_core::{ready, stream::Stream as _};

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use super::Stream;
use crate::{
    error::{DriverError, Result},
    proto::RawPacket,
};

/// Reads a packet.
#[derive(Debug)]
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct ReadPacket<'a> {
    stream: &'a mut Stream,
}

impl<'a> ReadPacket<'a> {
    pub(crate) fn new(stream: &'a mut Stream) -> Self {
        Self { stream }
    }
}

impl Future for ReadPacket<'_> {
    type Output = Result<RawPacket>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.stream.closed {
            return Poll::Ready(Err(DriverError::ConnectionClosed.into()));
        }

        let packet_opt = ready!(Pin::new(&mut *self.stream.codec).poll_next(cx)).transpose()?;

        match packet_opt {
            Some(packet) => Poll::Ready(Ok(packet)),
            None => {
                self.stream.closed = true;
                Poll::Ready(Err(DriverError::ConnectionClosed.into()))
            }
        }
    }
}
