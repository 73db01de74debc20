use std::{iter, time::Duration};

use mongodb::{Client, Database, bson::doc};
use tokio::time::sleep;
use tracing::debug;

use super::{
    config::MongoConfig,
    error::{MongoDaoError, MongoResult},
};

const PING_ATTEMPTS: usize = 10;
const FIRST_PING_DELAY: Duration = Duration::from_millis(250);
const MAX_PING_DELAY: Duration = Duration::from_secs(5);

/// Pauses between start-up pings, doubling up to [`MAX_PING_DELAY`].
fn ping_delays() -> impl Iterator<Item = Duration> {
    iter::successors(Some(FIRST_PING_DELAY), |delay| {
        Some((*delay * 2).min(MAX_PING_DELAY))
    })
    .take(PING_ATTEMPTS - 1)
}

/// Build a client for the configured database and wait until it answers a ping.
pub async fn establish_connection(config: &MongoConfig) -> MongoResult<(Client, Database)> {
    let client = Client::with_options(config.options.clone())
        .map_err(|source| MongoDaoError::ClientConstruction { source })?;
    let database = client.database(&config.database_name);

    let mut delays = ping_delays();
    let mut attempts = 0;
    loop {
        attempts += 1;
        let Err(source) = database.run_command(doc! { "ping": 1 }).await else {
            debug!(database = %config.database_name, attempts, "MongoDB answered ping");
            return Ok((client, database));
        };
        let Some(delay) = delays.next() else {
            return Err(MongoDaoError::InitialPing { attempts, source });
        };
        debug!(attempts, error = %source, "MongoDB not ready; retrying");
        sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ping_delays_double_and_cap() {
        let delays: Vec<_> = ping_delays().collect();
        assert_eq!(delays.len(), PING_ATTEMPTS - 1);
        assert_eq!(delays[0], FIRST_PING_DELAY);
        assert_eq!(delays[1], Duration::from_millis(500));
        assert_eq!(delays.last(), Some(&MAX_PING_DELAY));
    }
}
