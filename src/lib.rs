//! Connects to an AMQP broker, prints everything published on `amq.topic`, and
//! publishes a fixed integer to `amq.topic` under the `ping` routing key once a
//! second.
//!
//! The broker URL comes from [`Settings`] and the integer from [`PingArgs`]; both are
//! read once at startup and handed to [`run`].

mod app;
mod args;
mod connect;
mod errors;
mod publisher;
mod receiver;
mod settings;

pub use app::run;
pub use args::PingArgs;
pub use connect::open as open_connection;
pub use errors::{Error, Result};
pub use publisher::{Ping, Publisher, PING_INTERVAL};
pub use receiver::{format_delivery, Binding, Receiver};
pub use settings::{Settings, DEFAULT_URL, URL_VAR};

#[allow(dead_code)]
mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

#[cfg(test)]
mod integration_tests;
