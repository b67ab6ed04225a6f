//! Unix primitives for the scored daemon (fork/session handling, privilege
//! manipulation, descriptor hygiene, privileged TCP listener setup, and
//! user-account resolution).

#[cfg(not(unix))]
compile_error!("scored-unix requires a unix target (fork, setsid, setuid, getpwnam)");

pub mod net;
pub mod process;
pub mod users;
