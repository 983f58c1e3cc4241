// Copyright (c) 2017 Anatoly Ikorsky
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use std::io;

use crate::{consts::MAX_PAYLOAD_LEN, proto::RawPacket};

const HEADER_LEN: usize = 4;

/// MySql packet framing.
///
/// Sequence ids are reported as received and written as given, the protocol
/// layer is the one that validates them.
#[derive(Debug, Default)]
pub struct PacketCodec {
    packet_data: BytesMut,
    /// Sequence id of the first chunk of the packet being assembled.
    seq_id: Option<u8>,
}

impl PacketCodec {
    pub fn new() -> PacketCodec {
        PacketCodec {
            packet_data: BytesMut::with_capacity(256),
            seq_id: None,
        }
    }
}

impl Decoder for PacketCodec {
    type Item = RawPacket;
    type Error = io::Error;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<RawPacket>, io::Error> {
        loop {
            if buf.len() < HEADER_LEN {
                return Ok(None);
            }

            let chunk_len = usize::from(buf[0])
                | (usize::from(buf[1]) << 8)
                | (usize::from(buf[2]) << 16);
            if buf.len() < HEADER_LEN + chunk_len {
                buf.reserve(HEADER_LEN + chunk_len - buf.len());
                return Ok(None);
            }

            let seq_id = buf[3];
            buf.advance(HEADER_LEN);
            let chunk = buf.split_to(chunk_len);

            self.seq_id.get_or_insert(seq_id);
            self.packet_data.extend_from_slice(&chunk);

            if chunk_len < MAX_PAYLOAD_LEN {
                let payload = self.packet_data.split().freeze();
                let seq_id = self.seq_id.take().unwrap_or(seq_id);
                return Ok(Some(RawPacket { seq_id, payload }));
            }
        }
    }
}

impl Encoder<RawPacket> for PacketCodec {
    type Error = io::Error;

    fn encode(&mut self, packet: RawPacket, buf: &mut BytesMut) -> Result<(), io::Error> {
        let RawPacket {
            mut seq_id,
            payload,
        } = packet;
        let empty_chunk_required = payload.len() % MAX_PAYLOAD_LEN == 0;

        buf.reserve(
            payload.len()
                + (payload.len() / MAX_PAYLOAD_LEN) * HEADER_LEN
                + ((!empty_chunk_required as usize) << 2)
                + ((empty_chunk_required as usize) << 2),
        );

        for chunk in payload.chunks(MAX_PAYLOAD_LEN) {
            buf.put_u32_le(chunk.len() as u32 | (u32::from(seq_id) << 24));
            buf.put_slice(chunk);
            seq_id = seq_id.wrapping_add(1);
        }

        if empty_chunk_required {
            buf.put_u32_le(u32::from(seq_id) << 24);
        }

        Ok(())
    }
}
