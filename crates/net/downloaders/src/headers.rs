//! A retrying downloader for a contiguous header sequence ending at a known
//! reference header.

use basalt_interfaces::p2p::{
    error::{DownloadError, DownloadResult},
    headers::{HeadersClient, HeadersRequest},
};
use basalt_primitives::{BlockHashFunction, HeadersDirection, PeerId, SealedHeader};
use std::{sync::Arc, time::Duration};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Downloads the `count` headers directly below a reference header.
///
/// The request is issued in reverse starting at `reference.number - 1` with
/// no skip. A response is accepted only when it carries the full range and
/// every header links to its neighbor by parent hash, anchored at the
/// reference. Anything else consumes a retry; once the retries are used up
/// the download fails with [`DownloadError::MaxRetriesReached`]. Every retry
/// asks the client to prefer a peer other than the one that served the
/// failed attempt.
#[derive(Debug)]
pub struct HeaderSequenceDownloader<H, F> {
    /// The headers client.
    client: Arc<H>,
    /// The chain-active hash function used to seal and link the headers.
    hash_fn: Arc<F>,
    /// A single request timeout.
    request_timeout: Duration,
    /// The number of peer requests to make before giving up.
    max_retries: usize,
    /// Cooperative cancellation: checked before every request and raced
    /// against the in-flight response.
    cancel: CancellationToken,
}

// === impl HeaderSequenceDownloader ===

impl<H, F> HeaderSequenceDownloader<H, F>
where
    H: HeadersClient,
    F: BlockHashFunction,
{
    /// Downloads the headers with numbers
    /// `reference.number - count ..= reference.number - 1`, returned in
    /// ascending order.
    ///
    /// `count` must be non-zero and no larger than `reference.number`.
    pub async fn download(
        &self,
        reference: &SealedHeader,
        count: u64,
    ) -> DownloadResult<Vec<SealedHeader>> {
        debug_assert!(count > 0 && count <= reference.number);

        let mut last_peer: Option<PeerId> = None;
        let mut attempts_remaining = self.max_retries;

        loop {
            if self.cancel.is_cancelled() {
                return Err(DownloadError::Cancelled)
            }
            if attempts_remaining == 0 {
                debug!(
                    target: "downloaders::headers",
                    reference = reference.number,
                    count,
                    "header download exhausted retries"
                );
                return Err(DownloadError::MaxRetriesReached)
            }
            attempts_remaining -= 1;

            match self.attempt(reference, count, &mut last_peer).await {
                Ok(headers) => return Ok(headers),
                Err(err) if err.is_retryable() => {
                    debug!(
                        target: "downloaders::headers",
                        reference = reference.number,
                        %err,
                        attempts_remaining,
                        "header download attempt failed"
                    );
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Issues a single request and validates the response.
    async fn attempt(
        &self,
        reference: &SealedHeader,
        count: u64,
        last_peer: &mut Option<PeerId>,
    ) -> DownloadResult<Vec<SealedHeader>> {
        let request = HeadersRequest {
            start: reference.number.saturating_sub(1).into(),
            limit: count,
            direction: HeadersDirection::Falling,
        };
        trace!(target: "downloaders::headers", ?request, avoid = ?last_peer, "requesting headers");

        let request_fut = self.client.get_headers(request, *last_peer);
        let response = tokio::select! {
            // A fired cancellation abandons the in-flight request; a late
            // response is dropped with it.
            _ = self.cancel.cancelled() => return Err(DownloadError::Cancelled),
            result = timeout(self.request_timeout, request_fut) => match result {
                Ok(Ok(response)) => response,
                Ok(Err(err)) => return Err(err.into()),
                Err(_) => return Err(DownloadError::Timeout),
            },
        };

        let (peer, headers) = response.split();
        *last_peer = Some(peer);
        self.assemble(reference, count, headers)
    }

    /// Seals the response and validates completeness and linkage.
    fn assemble(
        &self,
        reference: &SealedHeader,
        count: u64,
        headers: Vec<basalt_primitives::Header>,
    ) -> DownloadResult<Vec<SealedHeader>> {
        if headers.len() as u64 != count {
            return Err(DownloadError::IncompleteResponse {
                received: headers.len(),
                expected: count as usize,
            })
        }

        let mut headers: Vec<SealedHeader> =
            headers.into_iter().map(|header| self.hash_fn.seal(header)).collect();
        headers.sort_unstable_by_key(|header| header.number);

        // The newest downloaded header anchors the sequence to the
        // reference.
        let newest = &headers[headers.len() - 1];
        if reference.parent_hash != newest.hash() {
            return Err(DownloadError::LinkageViolation { number: newest.number })
        }
        for i in (1..headers.len()).rev() {
            if headers[i].parent_hash != headers[i - 1].hash() {
                return Err(DownloadError::LinkageViolation { number: headers[i - 1].number })
            }
        }

        Ok(headers)
    }
}

/// The builder for [`HeaderSequenceDownloader`] with some default settings.
#[derive(Debug)]
pub struct HeaderSequenceDownloaderBuilder {
    /// A single request timeout.
    request_timeout: Duration,
    /// The number of peer requests to make before giving up.
    max_retries: usize,
    /// The cancellation signal of the download task.
    cancel: CancellationToken,
}

impl Default for HeaderSequenceDownloaderBuilder {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_millis(8000),
            max_retries: 3,
            cancel: CancellationToken::new(),
        }
    }
}

// === impl HeaderSequenceDownloaderBuilder ===

impl HeaderSequenceDownloaderBuilder {
    /// Set the request timeout.
    pub fn request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Set the number of peer requests to make before giving up.
    pub fn max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the cancellation token the download task observes.
    pub fn cancellation_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Build a [`HeaderSequenceDownloader`] with the provided client and
    /// hash function.
    pub fn build<H, F>(self, client: Arc<H>, hash_fn: Arc<F>) -> HeaderSequenceDownloader<H, F>
    where
        H: HeadersClient,
        F: BlockHashFunction,
    {
        HeaderSequenceDownloader {
            client,
            hash_fn,
            request_timeout: self.request_timeout,
            max_retries: self.max_retries,
            cancel: self.cancel,
        }
    }
}
