//! Shared utilities for integration tests.

use std::time::{Duration, Instant};

use http_acceptor::config::AcceptorConfig;
use http_acceptor::{MemoryListener, RequestHandler, Server};

#[allow(dead_code)]
/// Config for an in-memory pool of `workers` threads.
pub fn pool_config(workers: usize) -> AcceptorConfig {
    let mut config = AcceptorConfig::default();
    config.workers.max_workers = workers;
    config.workers.thread_name = "test".into();
    config
}

#[allow(dead_code)]
/// Build and start a server over a fresh in-memory listener.
pub fn start_memory_server<H>(config: &AcceptorConfig, handler: H) -> Server<MemoryListener<u64>>
where
    H: RequestHandler<u64>,
{
    let mut server = Server::new(MemoryListener::new(), config, handler).unwrap();
    server.start().unwrap();
    server
}

#[allow(dead_code)]
/// Poll `condition` until it holds or `timeout` passes.
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    condition()
}
