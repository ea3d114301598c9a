use amqp_ping::{PingArgs, Result, Settings};
use log::error;
use std::error::Error as StdError;
use std::{env, process};

fn main() {
    env_logger::init();

    if let Err(err) = try_main() {
        if err.is_usage() {
            eprintln!("{}", err);
        } else {
            error!("{}", error_chain(&err));
        }
        process::exit(1);
    }
}

fn try_main() -> Result<()> {
    // a bad command line fails before any settings or broker work
    let args = PingArgs::from_args(env::args())?;
    let settings = Settings::from_env()?;
    amqp_ping::run(&settings, args)
}

fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
