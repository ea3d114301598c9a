use crate::{open_connection, Settings};
use amiquip::{Channel, Connection};
use std::env;
use std::sync::Once;

mod ping;

static PRINT_WARNING: Once = Once::new();

fn with_test_url<F: FnOnce(&str)>(f: F) {
    match env::var("AMQP_PING_TEST_URL") {
        Ok(url) => f(&url),
        Err(env::VarError::NotPresent) => PRINT_WARNING.call_once(|| {
            println!("AMQP_PING_TEST_URL not defined - skipping integration tests");
        }),
        Err(env::VarError::NotUnicode(_)) => {
            panic!("AMQP_PING_TEST_URL exists but is not valid unicode")
        }
    }
}

fn with_conn<F: FnOnce(&mut Connection)>(f: F) {
    with_test_url(|url| {
        let settings = Settings::from_url(Some(url.to_string()));
        let mut conn = open_connection(&settings).unwrap();
        f(&mut conn);
        conn.close().unwrap();
    })
}

fn with_chans<F: FnOnce(Channel, Channel)>(f: F) {
    with_conn(|conn| {
        let first = conn.open_channel(None).unwrap();
        let second = conn.open_channel(None).unwrap();
        f(first, second)
    })
}
