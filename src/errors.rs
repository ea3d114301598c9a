use snafu::Snafu;
use std::{io, num, result};

/// A type alias for handling errors throughout amqp-ping.
pub type Result<T, E = Error> = result::Result<T, E>;

/// An error that can occur while running the ping demo.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    /// No integer was given on the command line.
    #[snafu(display("Please provide a number as an argument."))]
    MissingArgument,

    /// The command line argument is not an integer.
    #[snafu(display("The argument should be a number."))]
    InvalidArgument { arg: String, source: num::ParseIntError },

    /// The `.env` file exists but could not be loaded.
    #[snafu(display("could not load .env file"))]
    DotEnv { source: dotenvy::Error },

    #[snafu(display("invalid broker URL"))]
    InvalidUrl { source: url::ParseError },

    #[snafu(display("unsupported broker URL scheme {:?} (expected amqp or amqps)", scheme))]
    UnsupportedScheme { scheme: String },

    #[snafu(display("amqps URLs require the native-tls feature"))]
    TlsUnavailable,

    #[snafu(display("could not connect to {}", url))]
    Connect { url: String, source: amiquip::Error },

    #[snafu(display("could not open {} channel", role))]
    OpenChannel {
        role: &'static str,
        source: amiquip::Error,
    },

    #[snafu(display("could not close {} channel", role))]
    CloseChannel {
        role: &'static str,
        source: amiquip::Error,
    },

    #[snafu(display("exchange {} is not available", exchange))]
    ExchangeLookup {
        exchange: String,
        source: amiquip::Error,
    },

    #[snafu(display("could not declare queue {}", queue))]
    DeclareQueue {
        queue: String,
        source: amiquip::Error,
    },

    #[snafu(display(
        "could not bind queue {} to {} with pattern {:?}",
        queue,
        exchange,
        pattern
    ))]
    BindQueue {
        queue: String,
        exchange: String,
        pattern: String,
        source: amiquip::Error,
    },

    #[snafu(display("could not start consumer on queue {}", queue))]
    Consume {
        queue: String,
        source: amiquip::Error,
    },

    #[snafu(display("could not ack delivery {}", delivery_tag))]
    Ack {
        delivery_tag: u64,
        source: amiquip::Error,
    },

    #[snafu(display("consumer on queue {} ended: {}", queue, reason))]
    ConsumerEnded { queue: String, reason: String },

    #[snafu(display("could not publish to {} with routing key {}", exchange, routing_key))]
    Publish {
        exchange: String,
        routing_key: String,
        source: amiquip::Error,
    },

    #[snafu(display("could not write received message"))]
    Output { source: io::Error },

    #[snafu(display("could not spawn {} thread", role))]
    SpawnWorker {
        role: &'static str,
        source: io::Error,
    },

    #[snafu(display("{} thread panicked", role))]
    WorkerPanicked { role: &'static str },

    #[snafu(display("{} thread exited", role))]
    WorkerExited { role: &'static str },

    #[snafu(display("all worker threads went away without reporting"))]
    WorkersDisconnected,
}

impl Error {
    /// True for errors caused by a bad command line rather than by the broker.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            Error::MissingArgument | Error::InvalidArgument { .. }
        )
    }
}
