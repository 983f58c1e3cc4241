// Copyright (c) 2016 Anatoly Ikorsky
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

use crate::{
    consts::SCRAMBLE_LENGTH,
    error::{DriverError, Result},
};

/// Computes the `mysql_native_password` response:
///
/// ```text
/// SHA1(password) XOR SHA1(scramble <concat> SHA1(SHA1(password)))
/// ```
///
/// Only the first [`SCRAMBLE_LENGTH`] bytes of `scramble` take part, as on the server.
/// A shorter scramble is rejected. An empty password has an empty response.
pub fn scramble_native(password: &[u8], scramble: &[u8]) -> Result<Option<[u8; SCRAMBLE_LENGTH]>> {
    if scramble.len() < SCRAMBLE_LENGTH {
        return Err(DriverError::MalformedScramble {
            len: scramble.len(),
            required: SCRAMBLE_LENGTH,
        }
        .into());
    }

    Ok(mysql_common::scramble::scramble_native(
        &scramble[..SCRAMBLE_LENGTH],
        password,
    ))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::Error;

    #[test]
    fn should_match_known_vector_for_zero_scramble() {
        let response = scramble_native(b"asynk", &[0u8; 20]).unwrap().unwrap();
        assert_eq!(
            response,
            [
                0x89, 0x97, 0x71, 0xbb, 0xe1, 0xcd, 0xcf, 0x15, 0x7b, 0x17, 0x42, 0xdd, 0x80, 0xaf,
                0x31, 0xd9, 0x1d, 0x64, 0xac, 0x2f,
            ]
        );
    }

    #[test]
    fn should_match_known_vector_for_counting_scramble() {
        let scramble: Vec<u8> = (1..=20).collect();
        let response = scramble_native(b"asynk", &scramble).unwrap().unwrap();
        assert_eq!(
            response,
            [
                0xa2, 0x29, 0x66, 0x51, 0x4a, 0x42, 0x9d, 0x7b, 0x97, 0xa3, 0x81, 0x3b, 0x78, 0x9d,
                0xb4, 0x94, 0x70, 0x1b, 0xd2, 0x97,
            ]
        );
    }

    #[test]
    fn should_be_deterministic() {
        let scramble = [
            0x3d, 0x4c, 0x5e, 0x2f, 0x1a, 0x0b, 0x7c, 0x8d, 0x9e, 0xaf, 0x10, 0x21, 0x32, 0x43,
            0x54, 0x65, 0x76, 0x87, 0x98, 0xa9,
        ];
        let first = scramble_native(b"password", &scramble).unwrap();
        let second = scramble_native(b"password", &scramble).unwrap();
        assert_eq!(first, second);
        assert_ne!(first, scramble_native(b"Password", &scramble).unwrap());
    }

    #[test]
    fn should_ignore_bytes_past_scramble_length() {
        let mut scramble = vec![0u8; 20];
        let expected = scramble_native(b"asynk", &scramble).unwrap();
        scramble.push(0);
        assert_eq!(scramble_native(b"asynk", &scramble).unwrap(), expected);
    }

    #[test]
    fn should_answer_empty_password_with_nothing() {
        assert_eq!(scramble_native(b"", &[0u8; 20]).unwrap(), None);
    }

    #[test]
    fn should_reject_short_scramble() {
        match scramble_native(b"asynk", &[0u8; 8]) {
            Err(Error::Driver(DriverError::MalformedScramble { len, required })) => {
                assert_eq!(len, 8);
                assert_eq!(required, 20);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
