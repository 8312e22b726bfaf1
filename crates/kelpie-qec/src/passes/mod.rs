//! Built-in QEC transformation passes.

pub mod decompose;
pub mod merge;

pub use decompose::{
    DecomposeConfig, DecomposeMethod, DecomposeNonCliffordPpr, DecomposePprRule, is_non_clifford,
};
pub use merge::{MergePprIntoPpm, MergePprRule};
