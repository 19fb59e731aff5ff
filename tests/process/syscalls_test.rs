/*!
 * Process Syscall Tests
 * fork, _exit and waitpid against the simulated host
 */

use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use traffic_kernel::{
    PidTable, PidTableConfig, ProcessSyscalls, SimulatedHost, SyscallError, SyscallExecutor,
    WaitStatus,
};

fn executor() -> Arc<SyscallExecutor<SimulatedHost>> {
    Arc::new(SyscallExecutor::new(
        Arc::new(PidTable::default()),
        SimulatedHost::new(),
    ))
}

#[test]
fn test_parent_collects_child_exit_code() {
    let exec = executor();
    let parent = exec.spawn_init().unwrap();
    let child = exec.fork(parent).unwrap();
    assert_eq!(exec.getpid(child), child);

    let exiting = {
        let exec = exec.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            exec.exit(child, 7)
        })
    };

    let mut status = WaitStatus::default();
    assert_eq!(exec.waitpid(parent, child, Some(&mut status), 0), Ok(child));
    exiting.join().unwrap().unwrap();

    assert!(status.is_exited());
    assert_eq!(status.exit_code(), Some(7));
    assert_eq!(status, WaitStatus::exited(7));
}

#[test]
fn test_waitpid_after_child_already_exited() {
    let exec = executor();
    let parent = exec.spawn_init().unwrap();
    let child = exec.fork(parent).unwrap();
    exec.exit(child, 255).unwrap();

    let mut status = WaitStatus::default();
    exec.waitpid(parent, child, Some(&mut status), 0).unwrap();
    assert_eq!(status.exit_code(), Some(255));

    // Collected children are gone
    assert_eq!(
        exec.waitpid(parent, child, Some(&mut status), 0),
        Err(SyscallError::NoSuchProcess(child))
    );
}

#[test]
fn test_waitpid_rejects_unknown_and_foreign_targets() {
    let exec = executor();
    let a = exec.spawn_init().unwrap();
    let b = exec.spawn_init().unwrap();
    let b_child = exec.fork(b).unwrap();
    let mut status = WaitStatus::default();

    let err = exec.waitpid(a, 4242, Some(&mut status), 0).unwrap_err();
    assert_eq!(err.errno(), 15);

    let err = exec.waitpid(a, b_child, Some(&mut status), 0).unwrap_err();
    assert_eq!(err, SyscallError::NotChild { caller: a, target: b_child });
    assert_eq!(err.errno(), 16);

    let err = exec.waitpid(b, b_child, None, 0).unwrap_err();
    assert_eq!(err.errno(), 6);

    let err = exec.waitpid(b, b_child, Some(&mut status), 1).unwrap_err();
    assert_eq!(err.errno(), 8);
}

#[test]
fn test_fork_hands_out_lowest_free_pid() {
    let exec = executor();
    let init = exec.spawn_init().unwrap();
    let first = exec.fork(init).unwrap();
    let second = exec.fork(init).unwrap();
    assert_eq!((init, first, second), (2, 3, 4));

    exec.exit(first, 0).unwrap();
    let mut status = WaitStatus::default();
    exec.waitpid(init, first, Some(&mut status), 0).unwrap();

    assert_eq!(exec.fork(init).unwrap(), first);
}

#[test]
fn test_fork_reports_enomem_when_table_is_full() {
    let exec = SyscallExecutor::new(
        Arc::new(PidTable::new(PidTableConfig::with_max_pid(3))),
        SimulatedHost::new(),
    );
    let init = exec.spawn_init().unwrap();
    exec.fork(init).unwrap();

    let err = exec.fork(init).unwrap_err();
    assert_eq!(err.errno(), 3);
    assert_eq!(exec.table().len(), 2);
}

#[test]
fn test_orphan_is_reaped_when_it_exits() {
    let exec = executor();
    let parent = exec.spawn_init().unwrap();
    let child = exec.fork(parent).unwrap();

    exec.exit(parent, 0).unwrap();
    assert!(!exec.table().exists(parent));
    assert_eq!(exec.table().get_parent(child).unwrap(), None);

    exec.exit(child, 1).unwrap();
    assert!(exec.table().is_empty());
    assert_eq!(exec.host().live_address_spaces(), 0);
    assert_eq!(exec.host().live_threads(), 0);
}

#[test]
fn test_exited_uncollected_child_is_reaped_with_parent() {
    let exec = executor();
    let parent = exec.spawn_init().unwrap();
    let child = exec.fork(parent).unwrap();

    exec.exit(child, 4).unwrap();
    assert!(exec.table().exists(child));

    exec.exit(parent, 0).unwrap();
    assert!(exec.table().is_empty());
}

#[test]
fn test_concurrent_children_are_all_collected() {
    let exec = executor();
    let init = exec.spawn_init().unwrap();
    let children: Vec<_> = (0..16).map(|_| exec.fork(init).unwrap()).collect();

    let exits: Vec<_> = children
        .iter()
        .enumerate()
        .map(|(code, &pid)| {
            let exec = exec.clone();
            thread::spawn(move || exec.exit(pid, code as i32).unwrap())
        })
        .collect();

    for (code, &pid) in children.iter().enumerate() {
        let mut status = WaitStatus::default();
        exec.waitpid(init, pid, Some(&mut status), 0).unwrap();
        assert_eq!(status.exit_code(), Some(code as i32));
    }
    for handle in exits {
        handle.join().unwrap();
    }

    exec.exit(init, 0).unwrap();
    assert!(exec.table().is_empty());
}
