//! Options controlling the depot bridge.

/// Options for [`StoreRegistry::enable_sync`](crate::StoreRegistry::enable_sync).
#[derive(Clone, Debug, Default)]
pub struct SyncOptions {
    /// Keep every store local in release builds. Bridging is a development
    /// and tooling surface first; embedders that only want it there set
    /// this and ship the same call sites.
    pub disable_in_release: bool,
}
