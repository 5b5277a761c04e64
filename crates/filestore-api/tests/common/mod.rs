//! Test helpers: a real gRPC server on an ephemeral port.

use std::net::SocketAddr;
use std::time::Duration;

use filestore_api::proto::file_service_client::FileServiceClient;
use filestore_api::setup::{build_state, grpc_service, server};
use filestore_api::AppState;
use filestore_core::{AdmissionLimits, Config, OperationKind};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tonic::transport::Channel;

pub struct TestServer {
    pub addr: SocketAddr,
    pub state: AppState,
    pub storage_dir: TempDir,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<anyhow::Result<()>>>,
}

impl TestServer {
    pub async fn start(limits: AdmissionLimits) -> Self {
        let storage_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = Config::new(
            storage_dir.path().to_string_lossy(),
            limits,
            "127.0.0.1:0",
        );
        let state = build_state(config).await.expect("Failed to build state");

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind listener");
        let addr = listener.local_addr().expect("Failed to read local addr");

        let (tx, rx) = oneshot::channel::<()>();
        let service = grpc_service(state.clone());
        let handle = tokio::spawn(server::serve(listener, service, async {
            let _ = rx.await;
        }));

        Self {
            addr,
            state,
            storage_dir,
            shutdown: Some(tx),
            handle: Some(handle),
        }
    }

    pub async fn client(&self) -> FileServiceClient<Channel> {
        FileServiceClient::connect(format!("http://{}", self.addr))
            .await
            .expect("Failed to connect to test server")
    }

    /// Poll until `kind` has exactly `expected` slots held, or panic after 5 s.
    pub async fn wait_for_in_flight(&self, kind: OperationKind, expected: usize) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while self.state.admission.in_flight(kind) != expected {
            if tokio::time::Instant::now() > deadline {
                panic!(
                    "{} in-flight count stuck at {}, expected {}",
                    kind,
                    self.state.admission.in_flight(kind),
                    expected
                );
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle
                .await
                .expect("Server task panicked")
                .expect("Server returned an error");
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}
