use crate::errors::*;
use crate::Settings;
use amiquip::Connection;
use log::info;
use snafu::ResultExt;

/// Opens the broker connection described by `settings`.
///
/// `amqp://` URLs connect over plain TCP. `amqps://` URLs need the `native-tls`
/// feature (on by default).
pub fn open(settings: &Settings) -> Result<Connection> {
    let tls = settings.validate()?.scheme() == "amqps";
    let url = settings.redacted_url();
    info!("connecting to {}", url);

    let connection = if tls {
        open_tls(settings)?
    } else {
        Connection::insecure_open(&settings.url)
    }
    .context(ConnectSnafu { url: url.as_str() })?;
    info!("Connected to RabbitMQ");
    Ok(connection)
}

#[cfg(feature = "native-tls")]
fn open_tls(settings: &Settings) -> Result<amiquip::Result<Connection>> {
    Ok(Connection::open(&settings.url))
}

#[cfg(not(feature = "native-tls"))]
fn open_tls(_settings: &Settings) -> Result<amiquip::Result<Connection>> {
    TlsUnavailableSnafu.fail()
}
