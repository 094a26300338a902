//! Grid descriptors: kernel entry point, launch geometry, and arguments.

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::id::{EntryUid, GridId};

/// Three-component launch dimension (grid-of-blocks or block-of-threads).
///
/// # Examples
///
/// ```
/// use gpusim_core::Dim3;
///
/// let grid = Dim3::new(4, 2, 1);
/// assert_eq!(grid.volume(), 8);
/// assert_eq!(Dim3::from(32), Dim3::new(32, 1, 1));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Dim3 {
    /// Extent along x.
    pub x: u32,
    /// Extent along y.
    pub y: u32,
    /// Extent along z.
    pub z: u32,
}

impl Dim3 {
    /// Create a dimension from its three extents.
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// Number of elements covered (`x * y * z`), widened to avoid overflow.
    pub fn volume(&self) -> u64 {
        u64::from(self.x) * u64::from(self.y) * u64::from(self.z)
    }
}

impl Default for Dim3 {
    fn default() -> Self {
        Self::new(1, 1, 1)
    }
}

impl From<u32> for Dim3 {
    fn from(x: u32) -> Self {
        Self::new(x, 1, 1)
    }
}

impl From<(u32, u32, u32)> for Dim3 {
    fn from((x, y, z): (u32, u32, u32)) -> Self {
        Self::new(x, y, z)
    }
}

impl fmt::Display for Dim3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.x, self.y, self.z)
    }
}

/// One kernel argument: its raw bytes and its offset in the parameter buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KernelArg {
    /// Argument value as laid out in device memory.
    pub bytes: SmallVec<[u8; 8]>,
    /// Byte offset of the argument within the kernel parameter space.
    pub offset: usize,
}

impl KernelArg {
    /// Build an argument from a byte slice placed at `offset`.
    pub fn new(bytes: &[u8], offset: usize) -> Self {
        Self {
            bytes: SmallVec::from_slice(bytes),
            offset,
        }
    }

    /// Size of the argument in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the argument carries no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Ordered kernel argument list, as handed over by the API layer.
pub type ArgList = Vec<KernelArg>;

/// A kernel entry point known to the instruction interpreter.
///
/// Shared via `Arc` between the API layer, the grid descriptor, and the
/// timing model; the harness never looks inside beyond the name.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct KernelEntry {
    name: String,
    uid: EntryUid,
}

impl KernelEntry {
    /// Create a new entry with a freshly allocated uid.
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            uid: EntryUid::next(),
        })
    }

    /// Kernel name as it appears in the PTX source.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Process-unique identifier of this entry.
    pub fn uid(&self) -> EntryUid {
        self.uid
    }
}

/// A ready-to-run grid: entry point, geometry, and arguments.
///
/// Immutable once built. Ownership moves from the caller into the
/// harness at launch time and from there into the timing model; it is
/// never handed back.
#[derive(Debug)]
pub struct GridDescriptor {
    id: GridId,
    entry: Arc<KernelEntry>,
    grid_dim: Dim3,
    block_dim: Dim3,
    args: ArgList,
}

impl GridDescriptor {
    /// Build a grid descriptor and assign it a fresh [`GridId`].
    pub fn new(entry: Arc<KernelEntry>, grid_dim: Dim3, block_dim: Dim3, args: ArgList) -> Self {
        Self {
            id: GridId::next(),
            entry,
            grid_dim,
            block_dim,
            args,
        }
    }

    /// Unique id of this grid.
    pub fn id(&self) -> GridId {
        self.id
    }

    /// Kernel entry point.
    pub fn entry(&self) -> &Arc<KernelEntry> {
        &self.entry
    }

    /// Grid-of-blocks dimensions.
    pub fn grid_dim(&self) -> Dim3 {
        self.grid_dim
    }

    /// Block-of-threads dimensions.
    pub fn block_dim(&self) -> Dim3 {
        self.block_dim
    }

    /// Kernel arguments in declaration order.
    pub fn args(&self) -> &[KernelArg] {
        &self.args
    }

    /// Number of thread blocks (CTAs) in the grid.
    pub fn num_blocks(&self) -> u64 {
        self.grid_dim.volume()
    }

    /// Number of threads per block.
    pub fn threads_per_block(&self) -> u64 {
        self.block_dim.volume()
    }

    /// Total number of threads launched by the grid.
    pub fn total_threads(&self) -> u64 {
        self.num_blocks().saturating_mul(self.threads_per_block())
    }
}

impl fmt::Display for GridDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "grid {} '{}' grid={} block={}",
            self.id,
            self.entry.name(),
            self.grid_dim,
            self.block_dim
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_dim_is_unit() {
        assert_eq!(Dim3::default(), Dim3::new(1, 1, 1));
        assert_eq!(Dim3::default().volume(), 1);
    }

    #[test]
    fn volume_does_not_overflow_u32() {
        let d = Dim3::new(u32::MAX, 2, 1);
        assert_eq!(d.volume(), u64::from(u32::MAX) * 2);
    }

    #[test]
    fn descriptor_geometry() {
        let entry = KernelEntry::new("saxpy");
        let grid = GridDescriptor::new(
            Arc::clone(&entry),
            Dim3::new(4, 2, 1),
            Dim3::new(128, 1, 1),
            vec![KernelArg::new(&7u32.to_le_bytes(), 0)],
        );
        assert_eq!(grid.num_blocks(), 8);
        assert_eq!(grid.threads_per_block(), 128);
        assert_eq!(grid.total_threads(), 1024);
        assert_eq!(grid.entry().name(), "saxpy");
        assert_eq!(grid.args().len(), 1);
        assert_eq!(grid.args()[0].len(), 4);
    }

    #[test]
    fn descriptors_get_distinct_ids() {
        let entry = KernelEntry::new("k");
        let a = GridDescriptor::new(Arc::clone(&entry), Dim3::default(), Dim3::default(), vec![]);
        let b = GridDescriptor::new(entry, Dim3::default(), Dim3::default(), vec![]);
        assert!(b.id() > a.id());
    }

    #[test]
    fn display_names_entry_and_geometry() {
        let grid = GridDescriptor::new(
            KernelEntry::new("vecadd"),
            Dim3::from(16),
            Dim3::from(256),
            vec![],
        );
        let text = grid.to_string();
        assert!(text.contains("'vecadd'"));
        assert!(text.contains("grid=(16,1,1)"));
        assert!(text.contains("block=(256,1,1)"));
    }
}
