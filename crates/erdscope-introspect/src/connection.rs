use std::fmt;

use erdscope_core::{Error, Result};

/// Database engines erdscope can introspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    Postgres,
    MySql,
}

impl Engine {
    pub fn as_str(self) -> &'static str {
        match self {
            Engine::Postgres => "postgres",
            Engine::MySql => "mysql",
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a connection URL says about the server, with secrets kept out of
/// anything that may be logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub engine: Engine,
    pub user: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    /// The URL with the password and sensitive query parameters replaced by `***`.
    pub redacted: String,
}

impl ConnectionInfo {
    pub fn parse(url: &str) -> Result<Self> {
        let (scheme, rest) = url
            .split_once("://")
            .ok_or_else(|| Error::Unsupported(format!("not a connection url: {}", redact(url))))?;
        let engine = match scheme {
            "postgres" | "postgresql" => Engine::Postgres,
            "mysql" => Engine::MySql,
            other => return Err(Error::Unsupported(format!("database engine `{other}`"))),
        };

        let (location, query) = match rest.split_once('?') {
            Some((location, query)) => (location, Some(query)),
            None => (rest, None),
        };
        let (authority, path) = location.split_once('/').unwrap_or((location, ""));
        let (credentials, host_port) = match authority.rsplit_once('@') {
            Some((credentials, host_port)) => (Some(credentials), host_port),
            None => (None, authority),
        };

        let (user, password) = match credentials {
            Some(credentials) => match credentials.split_once(':') {
                Some((user, password)) => (Some(user), Some(password)),
                None => (Some(credentials), None),
            },
            None => (None, None),
        };
        let (host, port) = match host_port.rsplit_once(':') {
            Some((host, port)) => (host, port.parse::<u16>().ok()),
            None => (host_port, None),
        };

        let mut redacted = format!("{scheme}://");
        if let Some(user) = user {
            redacted.push_str(user);
            if password.is_some() {
                redacted.push_str(":***");
            }
            redacted.push('@');
        }
        redacted.push_str(host_port);
        if !path.is_empty() {
            redacted.push('/');
            redacted.push_str(path);
        }
        if let Some(query) = query {
            redacted.push('?');
            redacted.push_str(&redact_query(query));
        }

        Ok(Self {
            engine,
            user: user.map(str::to_string),
            host: non_empty(host),
            port,
            database: non_empty(path),
            redacted,
        })
    }

    /// The database to show first when the configuration names none.
    ///
    /// MySQL databases map one to one onto the URL path. Postgres lists
    /// schemas of the connected database instead, starting with `public`.
    pub fn default_database(&self) -> Option<String> {
        match self.engine {
            Engine::MySql => self.database.clone(),
            Engine::Postgres => Some("public".to_string()),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Best-effort redaction for strings that failed to parse.
fn redact(url: &str) -> String {
    match url.rsplit_once('@') {
        Some((_, host)) => format!("***@{host}"),
        None => url.to_string(),
    }
}

fn redact_query(query: &str) -> String {
    query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if is_sensitive_key(key) => format!("{key}=***"),
            _ => pair.to_string(),
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn is_sensitive_key(key: &str) -> bool {
    matches!(
        key.to_ascii_lowercase().as_str(),
        "password" | "pass" | "token" | "sslpassword"
    )
}
