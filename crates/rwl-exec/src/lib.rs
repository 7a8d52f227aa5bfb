//! Remote commands on cluster nodes.
//!
//! Everything here runs over `ssh` as root, the way the cluster QA does:
//! joining and removing nodes, and reading the RAPI users file on the master.
mod error;
pub use error::ExecError;

mod remote;
pub use remote::{CommandRunner, SshRunner, shell_quote};

mod bootstrap;
pub use bootstrap::{ClusterBootstrap, SshBootstrap};

mod secret;
pub use secret::{RAPI_USERS_FILE, lookup_rapi_secret, parse_users_file};
