//! Example: a job worker riding out an unavailable gateway
//!
//! This example demonstrates:
//! 1. Deploying a process
//! 2. A worker whose first polls hit an unavailable gateway
//! 3. Completing and failing jobs from the handler
//! 4. Closing the worker and the client
//!
//! Run with:
//! ```bash
//! RUST_LOG=zeebe=debug,zeebe_core=debug cargo run -p zeebe --example job_worker --features trace
//! ```

use std::time::Duration;

use zeebe::worker::HandlerResult;
use zeebe::{Client, ClientConfig, Code, TransportError};
use zeebe_transport::testing::{MockGateway, job};
use zeebe_transport::types::ActivatedJob;

const PROCESS: &[u8] = br#"<bpmn:definitions>
  <bpmn:process id="order-process" isExecutable="true">
    <bpmn:serviceTask id="charge"><zeebe:taskDefinition type="payment"/></bpmn:serviceTask>
  </bpmn:process>
</bpmn:definitions>"#;

async fn charge(job: ActivatedJob) -> HandlerResult {
    println!("  Handling job {} (retries left: {})", job.key, job.retries);
    if job.key % 3 == 0 {
        return Err(format!("card declined for job {}", job.key).into());
    }
    Ok(Some(format!(r#"{{"receipt":"R-{}"}}"#, job.key)))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    zeebe::observability::init()?;

    let gateway = MockGateway::new();
    for _ in 0..3 {
        gateway
            .push_activate_jobs(Err(TransportError::status(
                Code::Unavailable,
                "gateway restarting",
            )))
            .await;
    }
    gateway
        .push_jobs((1..=6).map(|key| job(key, "payment")).collect())
        .await;

    let config = ClientConfig::default()
        .with_default_job_worker_name("example-worker")
        .with_backoff_delays(Duration::from_millis(100), Duration::from_secs(2));
    let client = Client::builder(gateway.clone()).config(config).build()?;

    println!("=== Deploying ===");
    let deployment = client
        .new_deploy_resource_command()
        .add_resource(PROCESS, "order-process.bpmn")
        .send()
        .await?;
    println!("  Deployment key: {}", deployment.key);

    println!("\n=== Working on 'payment' jobs ===");
    let worker = client
        .new_worker()
        .job_type("payment")
        .handler(charge)
        .max_jobs_active(4)
        .poll_interval(Duration::from_millis(200))
        .open()?;

    tokio::time::sleep(Duration::from_secs(2)).await;
    worker.close().await?;

    let calls = gateway.calls().await;
    println!("\n=== Summary ===");
    println!("  Polls:     {}", calls.activate_jobs.len());
    println!("  Completed: {}", calls.complete_job.len());
    println!("  Failed:    {}", calls.fail_job.len());

    client.close();
    Ok(())
}
