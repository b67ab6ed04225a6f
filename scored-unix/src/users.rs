//! User-account resolution and file-ownership handover for privilege dropping.

use std::io;
use std::path::Path;

/// A resolved system account the daemon drops privileges to.
#[derive(Debug, Clone)]
pub struct UserAccount {
    pub name: String,
    pub uid: u32,
    pub gid: u32,
}

/// Look up a user by name and return its uid/gid pair.
///
/// Resolution failure (unknown account, NSS error) is an error; the daemon
/// cannot run without a concrete identity to drop to.
pub fn resolve_account(name: &str) -> io::Result<UserAccount> {
    let user = nix::unistd::User::from_name(name)
        .map_err(|e| io::Error::other(format!("user lookup for '{}' failed: {}", name, e)))?
        .ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no such user: {}", name))
        })?;

    Ok(UserAccount {
        name: name.to_string(),
        uid: user.uid.as_raw(),
        gid: user.gid.as_raw(),
    })
}

/// Change ownership of `path` to the given account.
pub fn chown_path(path: &Path, account: &UserAccount) -> io::Result<()> {
    nix::unistd::chown(
        path,
        Some(nix::unistd::Uid::from_raw(account.uid)),
        Some(nix::unistd::Gid::from_raw(account.gid)),
    )
    .map_err(|e| io::Error::from_raw_os_error(e as i32))
}

/// Set the permission bits of `path`.
pub fn chmod_path(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
}
