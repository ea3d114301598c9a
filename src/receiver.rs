use crate::errors::*;
use amiquip::{Channel, ConsumerMessage, ConsumerOptions, FieldTable, QueueDeclareOptions};
use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, info};
use snafu::ResultExt;
use std::convert::TryFrom;
use std::io::Write;

/// Where the receiver's queue lives and what it listens to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binding {
    pub queue: String,
    pub exchange: String,
    pub pattern: String,
    /// Drop the queue once its last consumer goes away.
    pub auto_delete: bool,
}

impl Default for Binding {
    /// Non-durable auto-delete queue `test` on `amq.topic`, matching every routing
    /// key.
    fn default() -> Self {
        Binding {
            queue: "test".to_string(),
            exchange: "amq.topic".to_string(),
            pattern: "#".to_string(),
            auto_delete: true,
        }
    }
}

/// Consumes everything routed to [`Binding::queue`], writing one line per message to
/// its output and acking each message after the line is written.
pub struct Receiver<W> {
    channel: Channel,
    binding: Binding,
    out: W,
}

impl<W: Write> Receiver<W> {
    pub fn new(channel: Channel, binding: Binding, out: W) -> Receiver<W> {
        Receiver {
            channel,
            binding,
            out,
        }
    }

    /// Runs until the consumer is cancelled or any broker call fails.
    pub fn run(self) -> Result<()> {
        self.receive(None).map(|_| ())
    }

    /// Like [`run`](Self::run), but stops cleanly after `limit` deliveries when a
    /// limit is given. Returns the number of deliveries handled.
    pub(crate) fn receive(self, limit: Option<usize>) -> Result<usize> {
        let Receiver {
            channel,
            binding,
            mut out,
        } = self;
        let handled = consume(&channel, &binding, &mut out, limit)?;
        channel
            .close()
            .context(CloseChannelSnafu { role: "receiver" })?;
        Ok(handled)
    }
}

fn consume<W: Write>(
    channel: &Channel,
    binding: &Binding,
    out: &mut W,
    limit: Option<usize>,
) -> Result<usize> {
    let queue = channel
        .queue_declare(
            binding.queue.as_str(),
            QueueDeclareOptions {
                durable: false,
                exclusive: false,
                auto_delete: binding.auto_delete,
                ..QueueDeclareOptions::default()
            },
        )
        .context(DeclareQueueSnafu {
            queue: binding.queue.as_str(),
        })?;

    // amq.* exchanges are built in and may only be declared passively
    let exchange = channel
        .exchange_declare_passive(binding.exchange.as_str())
        .context(ExchangeLookupSnafu {
            exchange: binding.exchange.as_str(),
        })?;

    queue
        .bind(&exchange, binding.pattern.as_str(), FieldTable::new())
        .context(BindQueueSnafu {
            queue: binding.queue.as_str(),
            exchange: binding.exchange.as_str(),
            pattern: binding.pattern.as_str(),
        })?;
    info!(
        "bound queue {} to {} with {:?}",
        binding.queue, binding.exchange, binding.pattern
    );

    let consumer = queue
        .consume(ConsumerOptions {
            no_ack: false,
            ..ConsumerOptions::default()
        })
        .context(ConsumeSnafu {
            queue: binding.queue.as_str(),
        })?;

    let mut handled = 0;
    if limit == Some(0) {
        return Ok(handled);
    }
    for message in consumer.receiver().iter() {
        match message {
            ConsumerMessage::Delivery(delivery) => {
                let timestamp = *delivery.properties.timestamp();
                let line = format_delivery(&delivery.body, timestamp);
                writeln!(out, "{}", line).context(OutputSnafu)?;
                out.flush().context(OutputSnafu)?;

                let delivery_tag = delivery.delivery_tag();
                consumer
                    .ack(delivery)
                    .context(AckSnafu { delivery_tag })?;
                debug!("acked delivery {}", delivery_tag);

                handled += 1;
                if limit.map_or(false, |max| handled >= max) {
                    return Ok(handled);
                }
            }
            other => {
                return ConsumerEndedSnafu {
                    queue: binding.queue.as_str(),
                    reason: format!("{:?}", other),
                }
                .fail();
            }
        }
    }

    ConsumerEndedSnafu {
        queue: binding.queue.as_str(),
        reason: "delivery stream closed",
    }
    .fail()
}

/// Renders one received message. `timestamp` is the AMQP timestamp property, in
/// seconds since the Unix epoch.
pub fn format_delivery(body: &[u8], timestamp: Option<u64>) -> String {
    let timestamp = timestamp
        .and_then(|secs| i64::try_from(secs).ok())
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(|at| at.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| "-".to_string());
    format!(
        "Body: {} Timestamp: {}",
        String::from_utf8_lossy(body),
        timestamp
    )
}
