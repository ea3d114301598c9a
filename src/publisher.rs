use crate::errors::*;
use amiquip::{AmqpProperties, Channel, Publish};
use log::{debug, info};
use snafu::ResultExt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// How often the publisher sends a ping.
pub const PING_INTERVAL: Duration = Duration::from_secs(1);

/// The message the publisher sends on every tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ping {
    body: String,
}

impl Ping {
    pub const EXCHANGE: &'static str = "amq.topic";
    pub const ROUTING_KEY: &'static str = "ping";
    pub const CONTENT_TYPE: &'static str = "text/plain";

    /// AMQP delivery mode 2 asks the broker to persist the message.
    pub const PERSISTENT: u8 = 2;

    pub fn new(value: i64) -> Ping {
        Ping {
            body: value.to_string(),
        }
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Message properties for a ping sent at `at`.
    pub fn properties(&self, at: SystemTime) -> AmqpProperties {
        let timestamp = at
            .duration_since(UNIX_EPOCH)
            .map(|since| since.as_secs())
            .unwrap_or(0);
        AmqpProperties::default()
            .with_content_type(Self::CONTENT_TYPE.to_string())
            .with_delivery_mode(Self::PERSISTENT)
            .with_timestamp(timestamp)
    }

    pub fn publish_at(&self, at: SystemTime) -> Publish<'_> {
        Publish::with_properties(
            self.body.as_bytes(),
            Self::ROUTING_KEY,
            self.properties(at),
        )
    }
}

/// Publishes a [`Ping`] to `amq.topic` once per interval.
pub struct Publisher {
    channel: Channel,
    ping: Ping,
    interval: Duration,
}

impl Publisher {
    pub fn new(channel: Channel, ping: Ping) -> Publisher {
        Publisher {
            channel,
            ping,
            interval: PING_INTERVAL,
        }
    }

    pub fn with_interval(self, interval: Duration) -> Publisher {
        Publisher { interval, ..self }
    }

    /// Publishes forever; only returns if a publish fails.
    pub fn run(self) -> Result<()> {
        self.publish(None).map(|_| ())
    }

    /// Like [`run`](Self::run), but stops cleanly after `limit` publishes when a
    /// limit is given. Returns the number of messages sent.
    pub(crate) fn publish(self, limit: Option<usize>) -> Result<usize> {
        let Publisher {
            channel,
            ping,
            interval,
        } = self;
        let sent = publish_on_ticks(&channel, &ping, interval, limit)?;
        channel
            .close()
            .context(CloseChannelSnafu { role: "publisher" })?;
        Ok(sent)
    }
}

fn publish_on_ticks(
    channel: &Channel,
    ping: &Ping,
    interval: Duration,
    limit: Option<usize>,
) -> Result<usize> {
    let exchange = channel
        .exchange_declare_passive(Ping::EXCHANGE)
        .context(ExchangeLookupSnafu {
            exchange: Ping::EXCHANGE,
        })?;
    info!(
        "publishing {} to {} every {:?}",
        ping.body(),
        Ping::EXCHANGE,
        interval
    );

    let ticker = crossbeam_channel::tick(interval);
    let mut sent = 0;
    while limit.map_or(true, |max| sent < max) {
        // a ticker never disconnects
        if ticker.recv().is_err() {
            break;
        }
        exchange
            .publish(ping.publish_at(SystemTime::now()))
            .context(PublishSnafu {
                exchange: Ping::EXCHANGE,
                routing_key: Ping::ROUTING_KEY,
            })?;
        sent += 1;
        debug!("published ping #{}", sent);
    }
    Ok(sent)
}
