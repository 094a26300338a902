//! OpenCL-style launch entry points.
//!
//! The CUDA-style path hands a ready [`GridDescriptor`] straight to
//! [`Session::launch_and_wait`](crate::Session::launch_and_wait). OpenCL
//! callers supply the entry, geometry and argument list separately; the
//! performance path builds the grid here and runs it through the same
//! rendezvous. Functional-only simulation has no OpenCL support and
//! terminates the process.

use std::io::{self, Write};
use std::process;
use std::sync::Arc;

use gpusim_core::{ArgList, Dim3, GridDescriptor, KernelEntry};
use tracing::error;

/// Diagnostic printed by [`opencl_functional_unimplemented`].
pub const FUNCTIONAL_ONLY_UNIMPLEMENTED: &str =
    "GPGPU-Sim PTX API: OpenCL functional-only simulation not yet implemented (use performance simulation)";

/// Exit status used by [`opencl_functional_unimplemented`].
pub const FUNCTIONAL_ONLY_EXIT_STATUS: i32 = 1;

/// Build a grid descriptor from an OpenCL-style launch.
pub fn opencl_grid(
    entry: Arc<KernelEntry>,
    grid_dim: Dim3,
    block_dim: Dim3,
    args: ArgList,
) -> GridDescriptor {
    GridDescriptor::new(entry, grid_dim, block_dim, args)
}

/// OpenCL functional-only simulation entry point. Never returns.
///
/// Prints [`FUNCTIONAL_ONLY_UNIMPLEMENTED`] and exits the process with
/// a non-zero status. No grid is built and no session is touched.
pub fn opencl_functional_unimplemented(
    entry: Arc<KernelEntry>,
    grid_dim: Dim3,
    block_dim: Dim3,
    args: ArgList,
) -> ! {
    error!(
        kernel = entry.name(),
        grid = %grid_dim,
        block = %block_dim,
        args = args.len(),
        "OpenCL functional-only simulation requested"
    );
    let mut out = io::stdout().lock();
    let _ = writeln!(out, "{FUNCTIONAL_ONLY_UNIMPLEMENTED}");
    let _ = out.flush();
    process::exit(FUNCTIONAL_ONLY_EXIT_STATUS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpusim_core::KernelArg;

    #[test]
    fn opencl_grid_keeps_geometry_and_args() {
        let args = vec![KernelArg::new(&7u32.to_le_bytes(), 0)];
        let grid = opencl_grid(
            KernelEntry::new("vadd"),
            Dim3::new(16, 1, 1),
            Dim3::new(256, 1, 1),
            args,
        );
        assert_eq!(grid.entry().name(), "vadd");
        assert_eq!(grid.num_blocks(), 16);
        assert_eq!(grid.threads_per_block(), 256);
        assert_eq!(grid.args().len(), 1);
        assert_eq!(grid.args()[0].len(), 4);
    }

    #[test]
    fn distinct_launches_get_distinct_ids() {
        let entry = KernelEntry::new("k");
        let a = opencl_grid(Arc::clone(&entry), Dim3::default(), Dim3::default(), vec![]);
        let b = opencl_grid(entry, Dim3::default(), Dim3::default(), vec![]);
        assert_ne!(a.id(), b.id());
    }
}
