// Copyright (c) 2016 Anatoly Ikorsky
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! Connection phase: `Handshake` -> `HandshakeResponse` -> `OK`.

use crate::{
    connection_like::Connection,
    consts::{AuthMethod, CapabilityFlags, StatusFlags},
    credentials::Credentials,
    error::{DriverError, Result},
    proto::{Handshake, HandshakeResponse, OkPacket},
    scramble::scramble_native,
};

/// Sequence id of the server greeting.
pub const HANDSHAKE_SEQUENCE_ID: u8 = 0;

/// Sequence id of the acknowledgement that ends the exchange.
pub const OK_SEQUENCE_ID: u8 = 2;

fn expect_sequence_id(expected: u8, actual: u8) -> Result<()> {
    if actual != expected {
        return Err(DriverError::ProtocolDesync { expected, actual }.into());
    }
    Ok(())
}

/// What the server told about itself during the handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    pub server_version: String,
    pub connection_id: u32,
    /// Capabilities negotiated in the handshake response.
    pub capabilities: CapabilityFlags,
    pub status_flags: StatusFlags,
}

/// Authenticates `conn` as `credentials` against `database`.
///
/// Reads exactly one `Handshake`, writes at most one `HandshakeResponse` and
/// reads at most one `OK`. Nothing is written once a local check fails.
pub async fn authenticate<C>(
    conn: &mut C,
    database: &str,
    credentials: &Credentials,
) -> Result<ServerInfo>
where
    C: Connection,
{
    let handshake: Handshake = conn.receive().await?;
    expect_sequence_id(HANDSHAKE_SEQUENCE_ID, handshake.sequence_id)?;

    #[cfg(feature = "tracing")]
    tracing::debug!(
        server_version = %handshake.server_version,
        connection_id = handshake.connection_id,
        auth_plugin = ?handshake.auth_plugin,
        "received handshake"
    );

    let method = match handshake.auth_method() {
        Some(method) => method,
        None => return Err(DriverError::UnsupportedAuthMethod { method: None }.into()),
    };

    let auth_response = match &method {
        AuthMethod::MysqlNativePassword => native_password_response(&handshake, credentials)?,
        AuthMethod::AuthGssapiClient => {
            return Err(DriverError::IncompatibleCredentials {
                method: method.to_string(),
            }
            .into());
        }
        AuthMethod::MysqlOldPassword
        | AuthMethod::MysqlClearPassword
        | AuthMethod::Dialog
        | AuthMethod::CachingSha2Password
        | AuthMethod::Sha256Password
        | AuthMethod::Other(_) => {
            return Err(DriverError::UnsupportedAuthMethod {
                method: Some(method.to_string()),
            }
            .into());
        }
    };

    let response = HandshakeResponse::new(
        &handshake,
        credentials.username().as_bytes(),
        &auth_response,
        database.as_bytes(),
        &method,
    );
    conn.send(&response).await?;

    #[cfg(feature = "tracing")]
    tracing::debug!(user = credentials.username(), database, "sent handshake response");

    let ok: OkPacket = conn.receive().await?;
    expect_sequence_id(OK_SEQUENCE_ID, ok.sequence_id)?;

    #[cfg(feature = "tracing")]
    tracing::debug!(connection_id = handshake.connection_id, "authenticated");

    Ok(ServerInfo {
        server_version: handshake.server_version,
        connection_id: handshake.connection_id,
        capabilities: response.capabilities(),
        status_flags: ok.status_flags,
    })
}

/// `mysql_native_password` response for `credentials`.
///
/// An empty password yields an empty response, which is what the server expects
/// for an account without a password.
fn native_password_response(handshake: &Handshake, credentials: &Credentials) -> Result<Vec<u8>> {
    let password = match credentials {
        Credentials::Password { password, .. } => password,
        Credentials::Unsecured { .. } => {
            return Err(DriverError::IncompatibleCredentials {
                method: AuthMethod::MYSQL_NATIVE_PASSWORD.to_owned(),
            }
            .into());
        }
    };

    // no scramble for an empty password: the server expects a zero-length response
    if password.is_empty() {
        return Ok(Vec::new());
    }

    Ok(scramble_native(password.as_bytes(), &handshake.scramble)?
        .map(Vec::from)
        .unwrap_or_default())
}

#[cfg(test)]
mod test {
    use futures_util::FutureExt;
    use mysql_common::{io::ParseBuf, packets::HandshakeResponse as SentResponse};

    use std::collections::VecDeque;

    use super::*;
    use crate::{
        error::Error,
        proto::{handshake_payload, RawPacket},
        BoxFuture,
    };

    /// Replays scripted server packets and records what the client writes.
    #[derive(Debug, Default)]
    struct MockConn {
        incoming: VecDeque<RawPacket>,
        sent: Vec<RawPacket>,
    }

    impl MockConn {
        fn new(packets: impl IntoIterator<Item = RawPacket>) -> Self {
            Self {
                incoming: packets.into_iter().collect(),
                sent: Vec::new(),
            }
        }
    }

    impl Connection for MockConn {
        fn read_packet(&mut self) -> BoxFuture<'_, RawPacket> {
            let packet = self.incoming.pop_front();
            async move { packet.ok_or_else(|| Error::from(DriverError::ConnectionClosed)) }.boxed()
        }

        fn write_packet(&mut self, packet: RawPacket) -> BoxFuture<'_, ()> {
            self.sent.push(packet);
            async { Ok(()) }.boxed()
        }
    }

    fn scramble() -> [u8; 20] {
        let mut scramble = [0u8; 20];
        for (i, byte) in scramble.iter_mut().enumerate() {
            *byte = i as u8 + 1;
        }
        scramble
    }

    fn handshake(plugin: &str) -> RawPacket {
        RawPacket::new(0, handshake_payload("8.0.36", &scramble(), plugin))
    }

    fn ok_packet(seq_id: u8) -> RawPacket {
        RawPacket::new(seq_id, vec![0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00])
    }

    fn asynk() -> Credentials {
        Credentials::with_password("test", "asynk")
    }

    async fn run(conn: &mut MockConn, credentials: &Credentials) -> Result<ServerInfo> {
        authenticate(conn, "world", credentials).await
    }

    #[tokio::test]
    async fn should_authenticate_with_native_password() {
        let mut conn = MockConn::new([handshake("mysql_native_password"), ok_packet(2)]);
        let info = run(&mut conn, &asynk()).await.unwrap();

        assert_eq!(info.server_version, "8.0.36");
        assert_eq!(info.connection_id, 42);
        assert!(info
            .capabilities
            .contains(CapabilityFlags::CLIENT_CONNECT_WITH_DB));
        assert!(info
            .status_flags
            .contains(StatusFlags::SERVER_STATUS_AUTOCOMMIT));

        assert_eq!(conn.sent.len(), 1);
        let sent = &conn.sent[0];
        assert_eq!(sent.seq_id, 1);

        let response: SentResponse<'_> = ParseBuf(&sent.payload).parse(()).unwrap();
        assert_eq!(response.user(), b"test");
        assert_eq!(
            response.scramble_buf(),
            &[
                0xa2, 0x29, 0x66, 0x51, 0x4a, 0x42, 0x9d, 0x7b, 0x97, 0xa3, 0x81, 0x3b, 0x78, 0x9d,
                0xb4, 0x94, 0x70, 0x1b, 0xd2, 0x97,
            ][..]
        );
        assert_eq!(response.db_name(), Some(&b"world"[..]));
        assert_eq!(
            response.auth_plugin().map(|plugin| plugin.as_bytes()),
            Some(&b"mysql_native_password"[..])
        );
        assert!(conn.incoming.is_empty());
    }

    #[tokio::test]
    async fn should_send_empty_response_for_empty_password() {
        let mut conn = MockConn::new([handshake("mysql_native_password"), ok_packet(2)]);
        run(&mut conn, &Credentials::with_password("root", ""))
            .await
            .unwrap();

        let response: SentResponse<'_> = ParseBuf(&conn.sent[0].payload).parse(()).unwrap();
        assert_eq!(response.user(), b"root");
        assert!(response.scramble_buf().is_empty());
    }

    #[tokio::test]
    async fn should_reject_missing_method_before_sending() {
        let mut conn = MockConn::new([handshake(""), ok_packet(2)]);
        match run(&mut conn, &asynk()).await {
            Err(Error::Driver(DriverError::UnsupportedAuthMethod { method: None })) => (),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(conn.sent.is_empty());
    }

    #[tokio::test]
    async fn should_name_unsupported_methods() {
        for name in [
            "mysql_clear_password",
            "dialog",
            "mysql_old_password",
            "caching_sha2_password",
            "client_ed25519",
        ] {
            let mut conn = MockConn::new([handshake(name), ok_packet(2)]);
            match run(&mut conn, &asynk()).await {
                Err(Error::Driver(DriverError::UnsupportedAuthMethod { method })) => {
                    assert_eq!(method.as_deref(), Some(name));
                }
                other => panic!("unexpected result for {}: {:?}", name, other),
            }
            assert!(conn.sent.is_empty(), "{} must not send a response", name);
        }
    }

    #[tokio::test]
    async fn should_reject_gssapi_as_incompatible() {
        let mut conn = MockConn::new([handshake("auth_gssapi_client"), ok_packet(2)]);
        match run(&mut conn, &asynk()).await {
            Err(Error::Driver(DriverError::IncompatibleCredentials { method })) => {
                assert_eq!(method, "auth_gssapi_client");
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(conn.sent.is_empty());
    }

    #[tokio::test]
    async fn should_reject_unsecured_credentials_for_native_password() {
        let mut conn = MockConn::new([handshake("mysql_native_password"), ok_packet(2)]);
        match run(&mut conn, &Credentials::unsecured("test")).await {
            Err(Error::Driver(DriverError::IncompatibleCredentials { method })) => {
                assert_eq!(method, "mysql_native_password");
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(conn.sent.is_empty());
    }

    #[tokio::test]
    async fn should_detect_desync_on_acknowledgement() {
        let mut conn = MockConn::new([handshake("mysql_native_password"), ok_packet(3)]);
        match run(&mut conn, &asynk()).await {
            Err(Error::Driver(DriverError::ProtocolDesync {
                expected: 2,
                actual: 3,
            })) => (),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(conn.sent.len(), 1);
    }

    #[tokio::test]
    async fn should_detect_desync_on_handshake() {
        let mut greeting = handshake("mysql_native_password");
        greeting.seq_id = 1;
        let mut conn = MockConn::new([greeting, ok_packet(2)]);
        match run(&mut conn, &asynk()).await {
            Err(Error::Driver(DriverError::ProtocolDesync {
                expected: 0,
                actual: 1,
            })) => (),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(conn.sent.is_empty());
    }

    #[tokio::test]
    async fn should_surface_access_denied() {
        let mut payload = vec![0xff, 0x15, 0x04, b'#'];
        payload.extend_from_slice(b"28000Access denied for user 'test'@'localhost'");
        let mut conn = MockConn::new([
            handshake("mysql_native_password"),
            RawPacket::new(2, payload),
        ]);
        match run(&mut conn, &asynk()).await {
            Err(Error::Server(err)) => {
                assert_eq!(err.code, 1045);
                assert_eq!(err.state, "28000");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn should_propagate_transport_errors() {
        let mut conn = MockConn::new([handshake("mysql_native_password")]);
        match run(&mut conn, &asynk()).await {
            Err(Error::Driver(DriverError::ConnectionClosed)) => (),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(conn.sent.len(), 1);
    }

    #[tokio::test]
    async fn should_report_closed_connection_before_greeting() {
        let mut conn = MockConn::default();
        match run(&mut conn, &asynk()).await {
            Err(Error::Driver(DriverError::ConnectionClosed)) => (),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(conn.sent.is_empty());
    }

    #[tokio::test]
    async fn should_reject_short_scramble_before_sending() {
        let mut payload = handshake_payload("8.0.36", &scramble(), "mysql_native_password");
        // pre-4.1 style scramble: no CLIENT_SECURE_CONNECTION and no second part
        let caps_at = 1 + "8.0.36".len() + 1 + 4 + 8 + 1;
        payload[caps_at + 1] &= !0x80;
        let part2_at = caps_at + 2 + 1 + 2 + 2 + 1 + 10;
        payload.drain(part2_at..part2_at + 13);
        let mut conn = MockConn::new([RawPacket::new(0, payload), ok_packet(2)]);
        match run(&mut conn, &asynk()).await {
            Err(Error::Driver(DriverError::MalformedScramble { len, .. })) => assert_eq!(len, 8),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(conn.sent.is_empty());
    }
}
