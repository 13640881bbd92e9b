//! Deadline-bounded fetch
//!
//! Races a fetch against a timer. The losing future is dropped, which for
//! [`HttpClient`](crate::HttpClient) closes the socket and aborts the request.

use std::time::Duration;

use smol::Timer;

use crate::{Fetch, NetError, Request, Response};

/// Fetch `request`, giving up with [`NetError::Timeout`] after `timeout`
pub async fn fetch_with_timeout<F: Fetch>(
    fetcher: &F,
    request: &Request,
    timeout: Duration,
) -> Result<Response, NetError> {
    let deadline = async {
        Timer::after(timeout).await;
        tracing::debug!(url = %request.url, ?timeout, "aborting fetch at deadline");
        Err(NetError::Timeout(timeout))
    };

    smol::future::or(fetcher.fetch(request), deadline).await
}
