pub mod client_ext;
pub mod fs;

pub use crate::client_ext::build_client;
pub use crate::client_ext::util::ClientUtilExt as Util;
pub use crate::fs::write_file;
