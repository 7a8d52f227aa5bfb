use tracing::debug;

use crate::{ExecError, remote::CommandRunner};

/// RAPI users file on the master.
pub const RAPI_USERS_FILE: &str = "/var/lib/ganeti/rapi/users";

const CLEARTEXT_PREFIX: &str = "{CLEARTEXT}";

/// Finds the password of `user` in the contents of a RAPI users file.
///
/// Lines are `user password [options]`; blank lines and `#` comments are
/// skipped. A `{CLEARTEXT}` prefix is stripped. Hashed (`{HA1}`) passwords
/// cannot be used to authenticate and are reported as such.
pub fn parse_users_file(contents: &str, user: &str) -> Result<Option<String>, ExecError> {
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.split_whitespace();
        if fields.next() != Some(user) {
            continue;
        }
        let Some(secret) = fields.next() else {
            continue;
        };
        let upper = secret.to_ascii_uppercase();
        if upper.starts_with(CLEARTEXT_PREFIX) {
            return Ok(Some(secret[CLEARTEXT_PREFIX.len()..].to_string()));
        }
        if upper.starts_with('{') {
            return Err(ExecError::HashedSecret {
                user: user.to_string(),
            });
        }
        return Ok(Some(secret.to_string()));
    }
    Ok(None)
}

/// Reads the RAPI password of `user` from the users file on `master`.
pub async fn lookup_rapi_secret<R: CommandRunner + ?Sized>(
    runner: &R,
    master: &str,
    user: &str,
) -> Result<String, ExecError> {
    let cmd = vec!["cat".to_string(), RAPI_USERS_FILE.to_string()];
    let contents = runner.run(master, &cmd).await?;
    debug!(master, user, "read RAPI users file");

    parse_users_file(&contents, user)?.ok_or_else(|| ExecError::SecretNotFound {
        user: user.to_string(),
        path: RAPI_USERS_FILE.to_string(),
    })
}
