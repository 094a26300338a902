//! The OpenCL functional-only entry point terminates the process.
//!
//! The test re-runs its own binary with a marker variable set; the
//! child calls the entry point and the parent checks its exit status
//! and output.

use std::env;
use std::process::Command;

use gpusim_core::{Dim3, KernelArg, KernelEntry};
use gpusim_engine::launch::FUNCTIONAL_ONLY_EXIT_STATUS;
use gpusim_engine::{opencl_functional_unimplemented, FUNCTIONAL_ONLY_UNIMPLEMENTED};

const CHILD_MARKER: &str = "GPUSIM_FUNCTIONAL_ONLY_CHILD";

#[test]
fn functional_only_prints_diagnostic_and_exits() {
    if env::var_os(CHILD_MARKER).is_some() {
        opencl_functional_unimplemented(
            KernelEntry::new("vadd"),
            Dim3::new(8, 1, 1),
            Dim3::new(64, 1, 1),
            vec![KernelArg::new(&[0u8; 8], 0)],
        );
    }

    let exe = env::current_exe().unwrap();
    let output = Command::new(exe)
        .args([
            "functional_only_prints_diagnostic_and_exits",
            "--exact",
            "--nocapture",
            "--test-threads=1",
        ])
        .env(CHILD_MARKER, "1")
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(FUNCTIONAL_ONLY_EXIT_STATUS));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains(FUNCTIONAL_ONLY_UNIMPLEMENTED),
        "child stdout: {stdout}"
    );
}
