//! HTTP transport trait for abstraction and testability
//!
//! The agent only needs one blocking GET with a streamed body. The real
//! transport (TCP, TLS, certificate verification) lives outside this crate and
//! is swapped with a mock for testing.

use crate::manifest::buffer::BodySink;
use crate::trust::TrustAnchor;
use core::future::Future;

/// Errors that prevent any HTTP response from being received
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// Host name could not be resolved
    Dns,
    /// TCP connection failed
    Connect,
    /// TLS handshake or certificate verification failed
    Tls,
    /// Connection dropped or timed out mid-exchange
    Io,
    /// URL could not be parsed
    InvalidUrl,
}

/// Status line and framing information of a completed response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Content-Length header, if present
    pub content_length: Option<usize>,
    /// Body used chunked transfer encoding
    pub chunked: bool,
}

/// Abstract HTTP client for testability
pub trait HttpTransport {
    /// Perform a GET request and stream the body into `body`
    ///
    /// The connection is verified against `trust_anchor` when the URL requires
    /// a secure channel. Returns once the whole response has been received.
    fn get<S: BodySink>(
        &mut self,
        url: &str,
        trust_anchor: TrustAnchor,
        body: &mut S,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>>;
}

#[cfg(test)]
pub mod mock {
    //! Mock HTTP transport for testing

    use super::*;
    use crate::trust::Endpoint;
    use core::cell::RefCell;
    use heapless::{String, Vec};

    /// Body bytes are delivered in chunks of this size
    const CHUNK_SIZE: usize = 64;

    /// Scripted outcome of one request
    #[derive(Debug, Clone)]
    pub enum MockReply {
        /// Complete response with the given body
        Response {
            status: u16,
            body: &'static [u8],
            chunked: bool,
        },
        /// No response at all
        Failure(TransportError),
    }

    impl MockReply {
        /// Plain (non-chunked) response
        pub fn status(status: u16, body: &'static [u8]) -> Self {
            Self::Response {
                status,
                body,
                chunked: false,
            }
        }
    }

    /// Request recorded by the mock
    #[derive(Debug, Clone)]
    pub struct RecordedRequest {
        pub url: String<256>,
        pub endpoint: Endpoint,
    }

    /// Mock HTTP transport for unit testing
    pub struct MockHttpTransport {
        /// Replies returned by get(), in order
        replies: RefCell<Vec<MockReply, 8>>,
        /// Requests seen so far
        requests: RefCell<Vec<RecordedRequest, 8>>,
    }

    impl MockHttpTransport {
        /// Create a new mock transport
        pub fn new() -> Self {
            Self {
                replies: RefCell::new(Vec::new()),
                requests: RefCell::new(Vec::new()),
            }
        }

        /// Queue the reply for an upcoming request
        pub fn queue_reply(&self, reply: MockReply) {
            let _ = self.replies.borrow_mut().push(reply);
        }

        /// Requests seen so far
        pub fn get_requests(&self) -> Vec<RecordedRequest, 8> {
            self.requests.borrow().clone()
        }
    }

    impl Default for MockHttpTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    impl HttpTransport for MockHttpTransport {
        async fn get<S: BodySink>(
            &mut self,
            url: &str,
            trust_anchor: TrustAnchor,
            body: &mut S,
        ) -> Result<HttpResponse, TransportError> {
            let mut recorded_url = String::new();
            recorded_url
                .push_str(url)
                .map_err(|_| TransportError::InvalidUrl)?;
            let _ = self.requests.borrow_mut().push(RecordedRequest {
                url: recorded_url,
                endpoint: trust_anchor.endpoint(),
            });

            let reply = {
                let mut replies = self.replies.borrow_mut();
                if replies.is_empty() {
                    return Err(TransportError::Connect);
                }
                replies.remove(0)
            };

            match reply {
                MockReply::Response {
                    status,
                    body: bytes,
                    chunked,
                } => {
                    for chunk in bytes.chunks(CHUNK_SIZE) {
                        body.on_data(chunk);
                    }
                    Ok(HttpResponse {
                        status,
                        content_length: if chunked { None } else { Some(bytes.len()) },
                        chunked,
                    })
                }
                MockReply::Failure(error) => Err(error),
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::manifest::buffer::ResponseBuffer;

        const ANCHOR: TrustAnchor = TrustAnchor::new(Endpoint::ManifestHost, "");
        static LARGE_BODY: [u8; 150] = [b'x'; 150];

        #[test]
        fn test_mock_streams_body() {
            let mut transport = MockHttpTransport::new();
            let mut buf: ResponseBuffer<256> = ResponseBuffer::new();

            futures::executor::block_on(async {
                transport.queue_reply(MockReply::status(200, &LARGE_BODY));

                let response = transport
                    .get("http://host/path", ANCHOR, &mut buf)
                    .await
                    .unwrap();

                assert_eq!(response.status, 200);
                assert_eq!(response.content_length, Some(150));
                assert_eq!(buf.len(), 150);
            });

            let requests = transport.get_requests();
            assert_eq!(requests.len(), 1);
            assert_eq!(requests[0].url.as_str(), "http://host/path");
            assert_eq!(requests[0].endpoint, Endpoint::ManifestHost);
        }

        #[test]
        fn test_mock_failure() {
            let mut transport = MockHttpTransport::new();
            let mut buf: ResponseBuffer<16> = ResponseBuffer::new();

            futures::executor::block_on(async {
                transport.queue_reply(MockReply::Failure(TransportError::Tls));

                let result = transport.get("https://host/", ANCHOR, &mut buf).await;
                assert_eq!(result, Err(TransportError::Tls));
            });
        }
    }
}
