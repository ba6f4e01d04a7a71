pub mod cids;
pub mod download;
pub mod info;
pub mod init;
pub mod list;
pub mod tree;
pub mod upload;
pub mod version;

pub use cids::Cids;
pub use download::Download;
pub use info::Info;
pub use init::Init;
pub use list::List;
pub use tree::Tree;
pub use upload::Upload;
pub use version::Version;
