// Copyright (c) 2016 Anatoly Ikorsky
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

use percent_encoding::percent_decode;
use url::Url;

use std::{convert::TryFrom, fmt, str::FromStr, sync::Arc, time::Duration};

use crate::{
    credentials::{Credentials, DEFAULT_USER},
    error::UrlError,
};

/// Default server port.
pub const DEFAULT_PORT: u16 = 3306;

/// Default server address.
pub const DEFAULT_HOST: &str = "127.0.0.1";

#[derive(Clone, Eq, PartialEq)]
struct InnerOpts {
    /// Address of the server (defaults to `127.0.0.1`).
    ip_or_hostname: String,

    /// TCP port of the server (defaults to `3306`).
    tcp_port: u16,

    /// User (defaults to `None`).
    user: Option<String>,

    /// Password (defaults to `None`).
    pass: Option<String>,

    /// Database name (defaults to `None`).
    db_name: Option<String>,

    /// TCP keep alive interval (defaults to `None`).
    tcp_keepalive: Option<Duration>,

    /// Whether to enable `TCP_NODELAY` (defaults to `true`).
    tcp_nodelay: bool,
}

impl Default for InnerOpts {
    fn default() -> Self {
        InnerOpts {
            ip_or_hostname: DEFAULT_HOST.into(),
            tcp_port: DEFAULT_PORT,
            user: None,
            pass: None,
            db_name: None,
            tcp_keepalive: None,
            tcp_nodelay: true,
        }
    }
}

impl fmt::Debug for InnerOpts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Opts")
            .field("ip_or_hostname", &self.ip_or_hostname)
            .field("tcp_port", &self.tcp_port)
            .field("user", &self.user)
            .field("pass", &self.pass.as_ref().map(|_| "<redacted>"))
            .field("db_name", &self.db_name)
            .field("tcp_keepalive", &self.tcp_keepalive)
            .field("tcp_nodelay", &self.tcp_nodelay)
            .finish()
    }
}

/// Mysql connection options.
///
/// Build one with [`OptsBuilder`] or parse it from a `mysql://` url.
#[derive(Clone, Eq, PartialEq, Default)]
pub struct Opts {
    inner: Arc<InnerOpts>,
}

impl fmt::Debug for Opts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt(f)
    }
}

impl Opts {
    /// Parses options from a url of the form
    /// `mysql://[user[:pass]@]host[:port][/db][?tcp_nodelay=..&tcp_keepalive=..]`.
    pub fn from_url(url: &str) -> std::result::Result<Opts, UrlError> {
        let url = Url::parse(url)?;
        let inner = inner_opts_from_url(&url)?;
        Ok(Opts {
            inner: Arc::new(inner),
        })
    }

    /// Address of the mysql server (defaults to `127.0.0.1`).
    ///
    /// Hostnames are resolved when connecting.
    pub fn ip_or_hostname(&self) -> &str {
        &self.inner.ip_or_hostname
    }

    /// TCP port of the mysql server (defaults to `3306`).
    pub fn tcp_port(&self) -> u16 {
        self.inner.tcp_port
    }

    /// User (defaults to `None`).
    ///
    /// `root` is used to authenticate when it isn't set.
    pub fn user(&self) -> Option<&str> {
        self.inner.user.as_deref()
    }

    /// Password (defaults to `None`).
    pub fn pass(&self) -> Option<&str> {
        self.inner.pass.as_deref()
    }

    /// Database name (defaults to `None`).
    pub fn db_name(&self) -> Option<&str> {
        self.inner.db_name.as_deref()
    }

    /// TCP keep alive interval (defaults to `None`).
    ///
    /// # Connection URL
    ///
    /// Use the `tcp_keepalive` URL parameter to set this value in milliseconds.
    ///
    /// ```
    /// # use mysql_auth::*;
    /// # use std::time::Duration;
    /// # fn main() -> Result<()> {
    /// let opts = Opts::from_url("mysql://localhost/db?tcp_keepalive=10000")?;
    /// assert_eq!(opts.tcp_keepalive(), Some(Duration::from_millis(10_000)));
    /// # Ok(()) }
    /// ```
    pub fn tcp_keepalive(&self) -> Option<Duration> {
        self.inner.tcp_keepalive
    }

    /// Whether to set `TCP_NODELAY` on the socket (defaults to `true`).
    ///
    /// # Connection URL
    ///
    /// Use the `tcp_nodelay` URL parameter to set this value.
    ///
    /// ```
    /// # use mysql_auth::*;
    /// # fn main() -> Result<()> {
    /// let opts = Opts::from_url("mysql://localhost/db?tcp_nodelay=false")?;
    /// assert!(!opts.tcp_nodelay());
    /// # Ok(()) }
    /// ```
    pub fn tcp_nodelay(&self) -> bool {
        self.inner.tcp_nodelay
    }

    /// Credentials described by these options.
    ///
    /// Yields [`Credentials::Password`] if a password is set and
    /// [`Credentials::Unsecured`] otherwise.
    pub fn credentials(&self) -> Credentials {
        let username = self.user().unwrap_or(DEFAULT_USER);
        match self.pass() {
            Some(pass) => Credentials::with_password(username, pass),
            None => Credentials::unsecured(username),
        }
    }
}

/// Provides a way to build [`Opts`].
///
/// ```
/// # use mysql_auth::OptsBuilder;
/// let builder = OptsBuilder::default()
///     .ip_or_hostname("foo")
///     .db_name(Some("bar"))
///     .user(Some("baz"));
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct OptsBuilder {
    opts: InnerOpts,
}

impl OptsBuilder {
    /// Creates a builder prefilled with `opts`.
    pub fn from_opts(opts: Opts) -> Self {
        OptsBuilder {
            opts: (*opts.inner).clone(),
        }
    }

    /// Defines server IP or hostname. See [`Opts::ip_or_hostname`].
    pub fn ip_or_hostname<T: Into<String>>(mut self, ip_or_hostname: T) -> Self {
        self.opts.ip_or_hostname = ip_or_hostname.into();
        self
    }

    /// Defines TCP port. See [`Opts::tcp_port`].
    pub fn tcp_port(mut self, tcp_port: u16) -> Self {
        self.opts.tcp_port = tcp_port;
        self
    }

    /// Defines user name. See [`Opts::user`].
    pub fn user<T: Into<String>>(mut self, user: Option<T>) -> Self {
        self.opts.user = user.map(Into::into);
        self
    }

    /// Defines password. See [`Opts::pass`].
    pub fn pass<T: Into<String>>(mut self, pass: Option<T>) -> Self {
        self.opts.pass = pass.map(Into::into);
        self
    }

    /// Defines database name. See [`Opts::db_name`].
    pub fn db_name<T: Into<String>>(mut self, db_name: Option<T>) -> Self {
        self.opts.db_name = db_name.map(Into::into);
        self
    }

    /// Defines `tcp_keepalive` option. See [`Opts::tcp_keepalive`].
    pub fn tcp_keepalive(mut self, tcp_keepalive: Option<Duration>) -> Self {
        self.opts.tcp_keepalive = tcp_keepalive;
        self
    }

    /// Defines `tcp_nodelay` option. See [`Opts::tcp_nodelay`].
    pub fn tcp_nodelay(mut self, nodelay: bool) -> Self {
        self.opts.tcp_nodelay = nodelay;
        self
    }
}

impl From<OptsBuilder> for Opts {
    fn from(builder: OptsBuilder) -> Opts {
        Opts {
            inner: Arc::new(builder.opts),
        }
    }
}

impl From<Opts> for OptsBuilder {
    fn from(opts: Opts) -> OptsBuilder {
        OptsBuilder::from_opts(opts)
    }
}

fn decode_component(component: &str) -> String {
    percent_decode(component.as_bytes())
        .decode_utf8_lossy()
        .into_owned()
}

fn inner_opts_from_url(url: &Url) -> std::result::Result<InnerOpts, UrlError> {
    if url.scheme() != "mysql" {
        return Err(UrlError::UnsupportedScheme {
            scheme: url.scheme().to_string(),
        });
    }
    if url.cannot_be_a_base() {
        return Err(UrlError::Invalid);
    }
    let host = match url.host_str() {
        Some(host) if !host.is_empty() => host.to_string(),
        _ => return Err(UrlError::Invalid),
    };

    let mut opts = InnerOpts {
        ip_or_hostname: host,
        tcp_port: url.port().unwrap_or(DEFAULT_PORT),
        ..InnerOpts::default()
    };

    if !url.username().is_empty() {
        opts.user = Some(decode_component(url.username()));
    }
    opts.pass = url.password().map(decode_component);
    opts.db_name = url
        .path_segments()
        .and_then(|mut segments| segments.next())
        .filter(|db_name| !db_name.is_empty())
        .map(decode_component);

    for (key, value) in url.query_pairs().into_owned() {
        if key == "tcp_nodelay" {
            match bool::from_str(&value) {
                Ok(value) => opts.tcp_nodelay = value,
                _ => {
                    return Err(UrlError::InvalidParamValue {
                        param: "tcp_nodelay".into(),
                        value,
                    });
                }
            }
        } else if key == "tcp_keepalive" {
            match u64::from_str(&value) {
                Ok(value) => opts.tcp_keepalive = Some(Duration::from_millis(value)),
                _ => {
                    return Err(UrlError::InvalidParamValue {
                        param: "tcp_keepalive".into(),
                        value,
                    });
                }
            }
        } else {
            return Err(UrlError::UnknownParameter { param: key });
        }
    }

    Ok(opts)
}

impl FromStr for Opts {
    type Err = UrlError;

    fn from_str(s: &str) -> std::result::Result<Self, <Self as FromStr>::Err> {
        Opts::from_url(s)
    }
}

impl<'a> TryFrom<&'a str> for Opts {
    type Error = UrlError;

    fn try_from(s: &str) -> std::result::Result<Self, UrlError> {
        Opts::from_url(s)
    }
}
