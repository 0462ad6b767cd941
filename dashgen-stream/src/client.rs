//! Public entry points.

use std::sync::Arc;

use dashgen_types::{GenerationRequest, OptimizeRequest, StreamError, StreamObserver};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::session::{CancelHandle, Session};
use crate::transport::{Endpoint, HttpTransport, Transport};

/// Client for the dashboard streaming endpoints.
///
/// Each call starts an independent session on the current Tokio runtime and
/// returns its [`CancelHandle`] immediately. Sessions share nothing but the
/// transport.
///
/// # Example
///
/// ```no_run
/// use dashgen_stream::{ClientConfig, DashboardClient};
/// use dashgen_types::{FnObserver, GenerationRequest, ThemeConfig};
///
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let client = DashboardClient::http(ClientConfig::new().base_url("http://localhost:8080"))?;
/// let request = GenerationRequest::new("warehouse", "grid", ThemeConfig::named("Ocean"), vec!["kpi".into()]);
///
/// let handle = client.generate_dashboard_stream(request, FnObserver::new(|d| print!("{d}")));
/// let outcome = handle.join().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct DashboardClient<T = HttpTransport> {
    transport: Arc<T>,
}

impl<T> Clone for DashboardClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl DashboardClient<HttpTransport> {
    /// Client over HTTP with the given configuration.
    pub fn http(config: ClientConfig) -> Result<Self, StreamError> {
        Ok(Self::with_transport(HttpTransport::new(config)?))
    }
}

impl<T: Transport> DashboardClient<T> {
    /// Client over a custom transport.
    #[must_use]
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    /// The transport in use.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Stream a newly generated dashboard into `observer`.
    ///
    /// Invalid requests are reported through [`StreamObserver::on_error`],
    /// never by panicking or by withholding the handle.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime.
    pub fn generate_dashboard_stream<O: StreamObserver>(
        &self,
        request: GenerationRequest,
        observer: O,
    ) -> CancelHandle {
        let body = request.validate().and_then(|()| to_body(&request));
        self.spawn(Endpoint::Generate, body, observer)
    }

    /// Stream a refined version of an existing dashboard into `observer`.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime.
    pub fn optimize_dashboard_stream<O: StreamObserver>(
        &self,
        request: OptimizeRequest,
        observer: O,
    ) -> CancelHandle {
        let body = request.validate().and_then(|()| to_body(&request));
        self.spawn(Endpoint::Optimize, body, observer)
    }

    fn spawn<O: StreamObserver>(
        &self,
        endpoint: Endpoint,
        body: Result<serde_json::Value, StreamError>,
        observer: O,
    ) -> CancelHandle {
        let id = Uuid::new_v4().to_string();
        let token = CancellationToken::new();
        let transport = Arc::clone(&self.transport);

        let open = async move {
            let body = body?;
            transport.open(endpoint, body).await
        };
        let session = Session::new(observer, token.clone());
        let span = tracing::debug_span!("dashboard_session", session = %id, ?endpoint);
        let task = tokio::spawn(session.run(open).instrument(span));

        CancelHandle::new(id, token, task)
    }
}

fn to_body<R: Serialize>(request: &R) -> Result<serde_json::Value, StreamError> {
    serde_json::to_value(request)
        .map_err(|e| StreamError::InvalidRequest(format!("cannot serialize request: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{SessionOutcome, SessionState};
    use crate::transport::ByteStream;
    use bytes::Bytes;
    use dashgen_types::{FnObserver, ThemeConfig};
    use std::future::Future;
    use std::sync::Mutex;

    /// Replays canned chunks and records what was sent.
    #[derive(Default)]
    struct ScriptedTransport {
        chunks: Vec<&'static str>,
        sent: Mutex<Vec<(Endpoint, serde_json::Value)>>,
    }

    impl Transport for ScriptedTransport {
        fn open(
            &self,
            endpoint: Endpoint,
            body: serde_json::Value,
        ) -> impl Future<Output = Result<ByteStream, StreamError>> + Send {
            self.sent.lock().unwrap().push((endpoint, body));
            let items: Vec<Result<Bytes, StreamError>> = self
                .chunks
                .iter()
                .map(|c| Ok(Bytes::from_static(c.as_bytes())))
                .collect();
            async move { Ok(Box::pin(futures::stream::iter(items)) as ByteStream) }
        }
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new("ops", "grid", ThemeConfig::named("Ocean"), vec!["kpi".into()])
    }

    fn client(chunks: Vec<&'static str>) -> DashboardClient<ScriptedTransport> {
        DashboardClient::with_transport(ScriptedTransport {
            chunks,
            ..ScriptedTransport::default()
        })
    }

    #[tokio::test]
    async fn generate_posts_to_generate_endpoint() {
        let client = client(vec!["data:<html>\n\n"]);
        let handle = client.generate_dashboard_stream(request(), FnObserver::new(|_| {}));
        let outcome = handle.join().await.unwrap();

        assert_eq!(outcome.output(), Some("<html>"));
        let sent = client.transport().sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, Endpoint::Generate);
        assert_eq!(sent[0].1["purpose"], "ops");
    }

    #[tokio::test]
    async fn optimize_posts_to_optimize_endpoint() {
        let client = client(vec!["data:<body>"]);
        let req = OptimizeRequest::new("conv-1", "<html/>", "dark mode");
        let outcome = client
            .optimize_dashboard_stream(req, FnObserver::new(|_| {}))
            .join()
            .await
            .unwrap();

        assert_eq!(outcome.output(), Some("<body>"));
        let sent = client.transport().sent.lock().unwrap();
        assert_eq!(sent[0].0, Endpoint::Optimize);
        assert_eq!(sent[0].1["conversationId"], "conv-1");
    }

    #[tokio::test]
    async fn invalid_request_fails_without_sending() {
        let client = client(vec!["data:never\n\n"]);
        let errors = Arc::new(Mutex::new(Vec::new()));
        let sink = errors.clone();

        let mut req = request();
        req.components.clear();
        let observer = FnObserver::new(|_| panic!("no chunks expected"))
            .with_error(move |e| sink.lock().unwrap().push(e.to_string()));

        let outcome = client.generate_dashboard_stream(req, observer).join().await.unwrap();

        assert!(matches!(outcome, SessionOutcome::Failed(StreamError::InvalidRequest(_))));
        assert_eq!(errors.lock().unwrap().len(), 1);
        assert!(client.transport().sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn concurrent_sessions_are_independent() {
        let client = client(vec!["data:a\n\n", "data:b\n\n"]);
        let first = client.generate_dashboard_stream(request(), FnObserver::new(|_| {}));
        let second = client.generate_dashboard_stream(request(), FnObserver::new(|_| {}));
        assert_ne!(first.id(), second.id());

        second.cancel();
        let first = first.join().await.unwrap();
        let second = second.join().await.unwrap();

        assert_eq!(first.output(), Some("ab"));
        assert!(matches!(
            second.state(),
            SessionState::Cancelled | SessionState::Completed
        ));
    }
}
