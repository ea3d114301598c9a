use crate::errors::*;
use snafu::{OptionExt, ResultExt};

/// Command line arguments: the single integer published on every tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PingArgs {
    pub value: i64,
}

impl PingArgs {
    /// Parses arguments as returned by [`std::env::args`]. The first item is the
    /// program name and anything after the number is ignored.
    pub fn from_args<I>(args: I) -> Result<PingArgs>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let arg: String = args
            .into_iter()
            .nth(1)
            .map(Into::into)
            .context(MissingArgumentSnafu)?;
        let value = arg.parse().context(InvalidArgumentSnafu { arg: arg.as_str() })?;
        Ok(PingArgs { value })
    }
}
