// Copyright (c) 2019 Anatoly Ikorsky
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! Generic code driving the handshake through `Connection`, plus a run against
//! a live server when `DATABASE_URL` is set.

use mysql_auth::{prelude::*, Conn, Opts, Result, ServerInfo, Stream};
use tokio::net::TcpStream;

use std::env;

fn get_url() -> Option<String> {
    let url = env::var("DATABASE_URL").ok()?;
    let opts = Opts::from_url(&url).expect("DATABASE_URL invalid");
    if opts
        .db_name()
        .expect("a database name is required")
        .is_empty()
    {
        panic!("database name is empty");
    }
    Some(url)
}

pub async fn authenticate_generic<C>(conn: &mut C, opts: &Opts) -> Result<ServerInfo>
where
    C: Connection,
{
    mysql_auth::authenticate(conn, opts.db_name().unwrap_or_default(), &opts.credentials()).await
}

#[tokio::test]
async fn use_generic_code() {
    let url = match get_url() {
        Some(url) => url,
        None => return,
    };
    let opts = Opts::from_url(&url).unwrap();

    let tcp = TcpStream::connect((opts.ip_or_hostname(), opts.tcp_port()))
        .await
        .unwrap();
    let mut stream = Stream::new(tcp);
    let info = authenticate_generic(&mut stream, &opts).await.unwrap();
    assert!(!info.server_version.is_empty());
    stream.close().await.unwrap();
}

#[tokio::test]
async fn should_connect_to_live_server() {
    let url = match get_url() {
        Some(url) => url,
        None => return,
    };

    let conn = Conn::new(Opts::from_url(&url).unwrap()).await.unwrap();
    assert!(conn.id() > 0);
    conn.disconnect().await.unwrap();
}
