//! Identity resolution for Geoquest commands.
//!
//! Commands that act on someone's behalf (creating, starting, submitting,
//! moderating) need a username. It is resolved through a chain:
//!
//! 1. `--as <username>`: explicit per-command override
//! 2. `GEOQUEST_IDENTITY` env var: session level
//! 3. `identity` in `~/.geoquest/config.toml`: global default
//!
//! The username is then looked up in the user table by the CLI. Nothing
//! here authenticates anyone.

use std::env;

/// Error message shown when identity cannot be resolved.
pub const IDENTITY_REQUIRED: &str = "identity required: pass --as <username>, \
    set GEOQUEST_IDENTITY, or add `identity = \"...\"` to ~/.geoquest/config.toml";

/// Resolve the acting username from the tiered resolution chain.
pub fn resolve_identity(
    explicit: Option<&str>,
    configured: Option<&str>,
) -> Result<String, String> {
    resolve_with(explicit, env::var("GEOQUEST_IDENTITY").ok(), configured)
}

fn resolve_with(
    explicit: Option<&str>,
    from_env: Option<String>,
    configured: Option<&str>,
) -> Result<String, String> {
    if let Some(name) = explicit {
        return Ok(name.to_string());
    }

    if let Some(name) = from_env
        && !name.is_empty()
    {
        return Ok(name);
    }

    if let Some(name) = configured
        && !name.is_empty()
    {
        return Ok(name.to_string());
    }

    Err(IDENTITY_REQUIRED.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_wins() {
        let name = resolve_with(Some("hikerjoe"), Some("envuser".into()), Some("cfguser"));
        assert_eq!(name.unwrap(), "hikerjoe");
    }

    #[test]
    fn env_beats_config() {
        let name = resolve_with(None, Some("envuser".into()), Some("cfguser"));
        assert_eq!(name.unwrap(), "envuser");
    }

    #[test]
    fn empty_values_fall_through() {
        let name = resolve_with(None, Some(String::new()), Some("cfguser"));
        assert_eq!(name.unwrap(), "cfguser");

        let err = resolve_with(None, None, Some("")).unwrap_err();
        assert_eq!(err, IDENTITY_REQUIRED);
    }
}
