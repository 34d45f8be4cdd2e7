//! Fixed-delay retry for startup steps such as the datastore connect.

use std::future::Future;
use std::time::Duration;

/// Run `f` until it succeeds or `attempts` runs have failed, sleeping `delay`
/// between runs. Returns the last error. `attempts == 0` still runs once.
pub async fn do_with_tries<T, E, F, Fut>(attempts: u32, delay: Duration, mut f: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;

    loop {
        match f().await {
            Ok(value) => return Ok(value),
            Err(error) if attempt >= attempts => return Err(error),
            Err(error) => {
                tracing::warn!(attempt, attempts, error = %error, "attempt failed, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
