//! Stand-in worker that paces through audio blocks without touching devices.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use hls_core::{Result, StopSignal, ThreadWorker, WorkerParameters};

const SAMPLE_RATE: u32 = 44_100;
const BLOCK_FRAMES: u32 = 256;
const BLOCKS_PER_REPORT: u64 = 500;

pub type DryRunFactory = fn(&WorkerParameters) -> Result<ThreadWorker>;

pub fn factory() -> DryRunFactory {
    build
}

fn build(params: &WorkerParameters) -> Result<ThreadWorker> {
    tracing::info!(
        input = ?params.devices.input_device,
        output = ?params.devices.output_device,
        gpu_platform = params.devices.gpu_platform,
        gpu_device = params.devices.gpu_device,
        bands = params.filter_bank.nfreq,
        "Building dry-run worker"
    );
    Ok(ThreadWorker::new(params.clone(), Arc::new(process)))
}

fn block_duration() -> Duration {
    Duration::from_secs_f64(f64::from(BLOCK_FRAMES) / f64::from(SAMPLE_RATE))
}

fn process(params: &WorkerParameters, stop: &StopSignal) {
    let mut blocks: u64 = 0;
    while !stop.is_stopped() {
        thread::sleep(block_duration());
        blocks += 1;
        if blocks % BLOCKS_PER_REPORT == 0 {
            tracing::debug!(blocks, calibration = params.calibration, "Dry-run worker alive");
        }
    }
    tracing::info!(blocks, "Dry-run worker exited");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_duration_is_a_few_milliseconds() {
        let millis = block_duration().as_secs_f64() * 1000.0;
        assert!((5.0..6.0).contains(&millis));
    }
}
