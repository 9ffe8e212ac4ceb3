#![allow(dead_code)]

use spindle::std::testing::Recorder;
use spindle::std::transport::{ChannelHandle, ChannelTransport, channel_transport};
use spindle::{PluginRegistry, PluginRegistryBuilder, Worker, WorkerSettings};
use std::time::Duration;

// ============================================================================
// Settings
// ============================================================================

pub fn settings() -> WorkerSettings {
    WorkerSettings {
        command_prefix: ".".to_string(),
        timer_interval: Duration::from_secs(1),
        max_workers: 4,
    }
}

// ============================================================================
// Worker Setup
// ============================================================================

pub fn worker(registry: PluginRegistry) -> (Worker<ChannelTransport>, ChannelHandle) {
    let (transport, handle) = channel_transport();
    let worker = Worker::new(transport, registry, settings()).unwrap();
    (worker, handle)
}

pub async fn connected(builder: PluginRegistryBuilder) -> (Worker<ChannelTransport>, ChannelHandle) {
    let (mut worker, handle) = worker(builder.build().unwrap());
    worker.connect().await.unwrap();
    (worker, handle)
}

/// Run until the handle is dropped, then wait for offloaded commands.
pub async fn run_to_end(worker: &mut Worker<ChannelTransport>, handle: ChannelHandle) {
    drop(handle);
    worker.run().await.unwrap();
    worker.drain().await;
}

// ============================================================================
// Assertions
// ============================================================================

/// `(hook, tick)` pairs, in call order.
pub fn rounds(recorder: &Recorder) -> Vec<(String, Option<u64>)> {
    recorder
        .invocations()
        .into_iter()
        .map(|i| (i.hook, i.tick))
        .collect()
}
