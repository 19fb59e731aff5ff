/*!
 * Traffic Kernel - Main Entry Point
 *
 * Runs the intersection simulation, then a fork/_exit/waitpid workload
 * against the process table, and prints both reports as JSON.
 */

use anyhow::{bail, Context};
use std::sync::Arc;
use tracing::{info, warn};

use traffic_kernel::{
    init_tracing, KernelConfig, KernelError, KernelResult, Pid, PidTable, ProcessSyscalls,
    SimulatedHost, Simulation, SyscallExecutor, WaitStatus,
};

type Executor = SyscallExecutor<SimulatedHost>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Traffic kernel starting...");
    let config = KernelConfig::load().context("Failed to load kernel configuration")?;
    info!(
        capacity = config.intersection.capacity,
        threads = config.simulation.threads,
        vehicles_per_thread = config.simulation.vehicles_per_thread,
        max_pid = config.pids.max_pid,
        "Configuration loaded"
    );

    tokio::select! {
        result = run(config) => result,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, shutting down");
            Ok(())
        }
    }
}

async fn run(config: KernelConfig) -> anyhow::Result<()> {
    let simulation = config.simulation.clone();
    let intersection = config.intersection;
    let report = tokio::task::spawn_blocking(move || Simulation::execute(simulation, &intersection))
        .await
        .context("Simulation task panicked")??;
    println!("{}", serde_json::to_string_pretty(&report)?);

    let table = Arc::new(PidTable::new(config.pids));
    let executor = Arc::new(SyscallExecutor::new(table, SimulatedHost::new()));
    let statuses = run_process_workload(executor.clone(), config.workload_children).await?;
    println!("{}", serde_json::to_string_pretty(&statuses)?);

    if !executor.table().is_empty() {
        bail!(
            "{} process records left after workload",
            executor.table().len()
        );
    }
    info!("Kernel shutting down cleanly");
    Ok(())
}

/// Fork `children` processes from an init process, let each exit with its
/// index as exit code, and collect them with waitpid
async fn run_process_workload(
    executor: Arc<Executor>,
    children: usize,
) -> KernelResult<Vec<(Pid, WaitStatus)>> {
    let init = executor.spawn_init()?;
    let pids = (0..children)
        .map(|_| executor.fork(init))
        .collect::<Result<Vec<_>, _>>()?;
    info!(init, children = pids.len(), "Workload processes forked");

    // The parent starts waiting before any child has exited
    let collector = {
        let executor = executor.clone();
        let pids = pids.clone();
        tokio::task::spawn_blocking(move || {
            pids.into_iter()
                .map(|pid| -> KernelResult<(Pid, WaitStatus)> {
                    let mut status = WaitStatus::default();
                    executor.waitpid(init, pid, Some(&mut status), 0)?;
                    Ok((pid, status))
                })
                .collect::<KernelResult<Vec<_>>>()
        })
    };

    let exits = pids.iter().enumerate().map(|(index, &pid)| {
        let executor = executor.clone();
        tokio::task::spawn_blocking(move || executor.exit(pid, index as i32))
    });
    for result in futures::future::join_all(exits).await {
        result.map_err(|e| KernelError::Internal(format!("exit task failed: {e}")))??;
    }

    let statuses = collector
        .await
        .map_err(|e| KernelError::Internal(format!("collector task failed: {e}")))??;
    executor.exit(init, 0)?;
    Ok(statuses)
}
