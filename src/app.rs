use crate::errors::*;
use crate::{built_info, connect, Binding, Ping, PingArgs, Publisher, Receiver, Settings};
use crossbeam_channel::Sender;
use log::{debug, info};
use snafu::ResultExt;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::thread;

type Outcome = (&'static str, Result<()>);

/// Connects to the broker and runs the receiver and the publisher side by side.
///
/// Blocks for as long as both workers run. The first worker to stop ends the run,
/// and its error (or [`Error::WorkerExited`]) is returned.
pub fn run(settings: &Settings, args: PingArgs) -> Result<()> {
    info!(
        "amqp-ping {} (built with {})",
        built_info::PKG_VERSION,
        built_info::RUSTC_VERSION
    );

    let mut connection = connect::open(settings)?;
    let receiver_channel = connection
        .open_channel(None)
        .context(OpenChannelSnafu { role: "receiver" })?;
    let publisher_channel = connection
        .open_channel(None)
        .context(OpenChannelSnafu { role: "publisher" })?;

    let (done_tx, done_rx) = crossbeam_channel::bounded(2);
    spawn_worker("receiver", done_tx.clone(), move || {
        Receiver::new(receiver_channel, Binding::default(), io::stdout()).run()
    })?;
    spawn_worker("publisher", done_tx, move || {
        Publisher::new(publisher_channel, Ping::new(args.value)).run()
    })?;

    let (role, outcome) = match done_rx.recv() {
        Ok(done) => done,
        Err(_) => return WorkersDisconnectedSnafu.fail(),
    };
    // connection stays open until a worker stops
    drop(connection);
    outcome.and_then(|()| WorkerExitedSnafu { role }.fail())
}

fn spawn_worker<F>(role: &'static str, done: Sender<Outcome>, work: F) -> Result<()>
where
    F: FnOnce() -> Result<()> + Send + 'static,
{
    thread::Builder::new()
        .name(role.to_string())
        .spawn(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(work))
                .unwrap_or_else(|_| WorkerPanickedSnafu { role }.fail());
            if let Err(err) = &outcome {
                debug!("{} stopped: {}", role, err);
            }
            // main may already have given up on us
            let _ = done.send((role, outcome));
        })
        .context(SpawnWorkerSnafu { role })?;
    Ok(())
}
