//! Common test utilities and helpers

use std::path::{Path, PathBuf};
use std::time::Duration;

use zeebe::{Client, ClientConfig};
use zeebe_transport::testing::MockGateway;

/// Client over `gateway` with a jitter-free backoff of 100ms, 200ms, 400ms, ... capped at 1s
#[allow(dead_code)]
pub fn test_client(gateway: &MockGateway) -> Client {
    let config = ClientConfig::default()
        .with_backoff_delays(Duration::from_millis(100), Duration::from_secs(1))
        .with_backoff_factors(2.0, 0.0);

    Client::builder(gateway.clone())
        .config(config)
        .build()
        .expect("Failed to build test client")
}

/// Write a resource file into `dir`
#[allow(dead_code)]
pub fn write_resource(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content)
        .unwrap_or_else(|e| panic!("Failed to write resource {:?}: {}", path, e));
    path
}

/// Minimal process definition
#[allow(dead_code)]
pub const DEMO_PROCESS: &[u8] =
    br#"<bpmn:definitions><bpmn:process id="demo-process" isExecutable="true"/></bpmn:definitions>"#;
