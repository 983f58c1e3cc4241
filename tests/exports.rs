#[allow(unused_imports)]
use mysql_auth::{
    authenticate,
    consts::{self, AuthMethod, CapabilityFlags, StatusFlags},
    error,
    prelude::{ClientPacket, Connection, ServerPacket},
    proto::{
        AuthSwitchRequest, ErrPacket, Handshake, HandshakeResponse, OkPacket, RawPacket,
    },
    scramble_native, BoxFuture, Conn, Credentials, DriverError, Error, IoError, Opts,
    OptsBuilder, Result, ServerError, ServerInfo, Stream, UrlError, DEFAULT_HOST, DEFAULT_PORT,
    DEFAULT_USER,
};
