pub mod args;
pub mod op;
pub mod ops;

pub use ops::{Cids, Download, Info, Init, List, Tree, Upload, Version};
