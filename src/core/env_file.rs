//! The `.env` file holding the session cookie and organization id.

use std::path::Path;

use crate::core::config::ConfigError;
use crate::core::models::credential::SessionCredential;

pub const SESSION_COOKIE_VAR: &str = "CLAUDE_SESSION_COOKIE";
pub const ORG_ID_VAR: &str = "CLAUDE_ORG_ID";

/// Everything needed to talk to the upstream API.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub session: SessionCredential,
    pub org_id: String,
}

/// Look a variable up in the process environment first, then in the env file.
fn lookup<E>(name: &'static str, process_env: &E, file_vars: &[(String, String)]) -> Option<String>
where
    E: Fn(&str) -> Option<String>,
{
    process_env(name)
        .or_else(|| {
            file_vars
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone())
        })
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn read_env_file(path: &Path) -> Result<Vec<(String, String)>, ConfigError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let iter = dotenvy::from_path_iter(path).map_err(|source| ConfigError::EnvFile {
        path: path.to_path_buf(),
        source,
    })?;
    iter.collect::<Result<Vec<_>, _>>()
        .map_err(|source| ConfigError::EnvFile {
            path: path.to_path_buf(),
            source,
        })
}

/// Load credentials. A missing cookie or org id is a startup error.
pub fn load_credentials(path: &Path) -> Result<Credentials, ConfigError> {
    load_credentials_with(path, |name| std::env::var(name).ok())
}

fn load_credentials_with<E>(path: &Path, process_env: E) -> Result<Credentials, ConfigError>
where
    E: Fn(&str) -> Option<String>,
{
    let vars = read_env_file(path)?;
    let cookie = lookup(SESSION_COOKIE_VAR, &process_env, &vars)
        .ok_or(ConfigError::MissingEnv(SESSION_COOKIE_VAR))?;
    let org_id =
        lookup(ORG_ID_VAR, &process_env, &vars).ok_or(ConfigError::MissingEnv(ORG_ID_VAR))?;
    let session = SessionCredential::parse(&cookie).ok_or(ConfigError::InvalidCookie)?;
    Ok(Credentials { session, org_id })
}

/// Replace the `CLAUDE_SESSION_COOKIE=...` line, leaving every other line as-is.
/// The line is appended when the file has none.
pub fn rewrite_session_cookie(contents: &str, cookie: &str) -> String {
    let new_line = format!("{}=\"{}\"", SESSION_COOKIE_VAR, cookie);
    let prefix = format!("{}=", SESSION_COOKIE_VAR);

    let mut replaced = false;
    let mut out: Vec<String> = Vec::new();
    for line in contents.split_inclusive('\n') {
        let (body, ending) = match line.strip_suffix("\r\n") {
            Some(body) => (body, "\r\n"),
            None => match line.strip_suffix('\n') {
                Some(body) => (body, "\n"),
                None => (line, ""),
            },
        };
        let trimmed = body.trim_start();
        let is_cookie_line = trimmed.starts_with(&prefix)
            || trimmed
                .strip_prefix("export ")
                .is_some_and(|rest| rest.trim_start().starts_with(&prefix));
        if is_cookie_line && !replaced {
            out.push(format!("{}{}", new_line, ending));
            replaced = true;
        } else {
            out.push(line.to_string());
        }
    }

    let mut result = out.concat();
    if !replaced {
        if !result.is_empty() && !result.ends_with('\n') {
            result.push('\n');
        }
        result.push_str(&new_line);
        result.push('\n');
    }
    result
}

/// Write a fresh cookie into the env file, creating the file if needed.
pub fn update_session_cookie(path: &Path, cookie: &str) -> std::io::Result<()> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e),
    };
    std::fs::write(path, rewrite_session_cookie(&contents, cookie))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn rewrite_replaces_only_the_cookie_line() {
        let before = "# claude\nCLAUDE_SESSION_COOKIE=\"sessionKey=old\"\nCLAUDE_ORG_ID=\"org-1\"\n\nOTHER=1";
        let after = rewrite_session_cookie(before, "sessionKey=new; cf_clearance=cf");
        assert_eq!(
            after,
            "# claude\nCLAUDE_SESSION_COOKIE=\"sessionKey=new; cf_clearance=cf\"\nCLAUDE_ORG_ID=\"org-1\"\n\nOTHER=1"
        );
    }

    #[test]
    fn rewrite_preserves_crlf_endings() {
        let before = "CLAUDE_ORG_ID=a\r\nCLAUDE_SESSION_COOKIE=old\r\n";
        let after = rewrite_session_cookie(before, "sessionKey=new");
        assert_eq!(after, "CLAUDE_ORG_ID=a\r\nCLAUDE_SESSION_COOKIE=\"sessionKey=new\"\r\n");
    }

    #[test]
    fn rewrite_appends_when_missing() {
        let after = rewrite_session_cookie("CLAUDE_ORG_ID=a", "sessionKey=new");
        assert_eq!(after, "CLAUDE_ORG_ID=a\nCLAUDE_SESSION_COOKIE=\"sessionKey=new\"\n");
        assert_eq!(
            rewrite_session_cookie("", "sessionKey=x"),
            "CLAUDE_SESSION_COOKIE=\"sessionKey=x\"\n"
        );
    }

    #[test]
    fn rewrite_ignores_similar_names() {
        let before = "CLAUDE_SESSION_COOKIE_BACKUP=keep\n";
        let after = rewrite_session_cookie(before, "sessionKey=new");
        assert!(after.starts_with("CLAUDE_SESSION_COOKIE_BACKUP=keep\n"));
        assert!(after.ends_with("CLAUDE_SESSION_COOKIE=\"sessionKey=new\"\n"));
    }

    #[test]
    fn update_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "CLAUDE_ORG_ID=\"org-uuid\"\n").unwrap();

        update_session_cookie(&path, "sessionKey=sk-ant-sid01-abc; cf_clearance=cf").unwrap();
        let vars = read_env_file(&path).unwrap();
        assert!(vars.iter().any(|(k, v)| k == SESSION_COOKIE_VAR
            && v == "sessionKey=sk-ant-sid01-abc; cf_clearance=cf"));
        assert!(vars.iter().any(|(k, v)| k == ORG_ID_VAR && v == "org-uuid"));
    }

    #[test]
    fn missing_file_has_no_vars() {
        let dir = tempfile::tempdir().unwrap();
        let vars = read_env_file(&dir.path().join("absent.env")).unwrap();
        assert!(vars.is_empty());
    }

    fn no_process_env(_: &str) -> Option<String> {
        None
    }

    fn env_file(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn load_reads_both_values_from_file() {
        let (_dir, path) = env_file(
            "CLAUDE_SESSION_COOKIE=\"sessionKey=sk-ant-sid01-abc; cf_clearance=cf\"\nCLAUDE_ORG_ID=\"org-uuid\"\n",
        );
        let credentials = load_credentials_with(&path, no_process_env).unwrap();
        assert_eq!(credentials.org_id, "org-uuid");
        assert_eq!(credentials.session.session_key, "sk-ant-sid01-abc");
        assert_eq!(credentials.session.cf_clearance.as_deref(), Some("cf"));
    }

    #[test]
    fn missing_cookie_is_a_startup_error() {
        let (_dir, path) = env_file("CLAUDE_ORG_ID=\"org-uuid\"\n");
        let err = load_credentials_with(&path, no_process_env).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnv(SESSION_COOKIE_VAR)));
        assert_eq!(err.to_string(), "Missing CLAUDE_SESSION_COOKIE in .env");
    }

    #[test]
    fn missing_org_id_is_a_startup_error() {
        let (_dir, path) = env_file("CLAUDE_SESSION_COOKIE=\"sessionKey=sk-ant-sid01-abc\"\n");
        let err = load_credentials_with(&path, no_process_env).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnv(ORG_ID_VAR)));
    }

    #[test]
    fn blank_values_count_as_missing() {
        let (_dir, path) = env_file("CLAUDE_SESSION_COOKIE=\"  \"\nCLAUDE_ORG_ID=org\n");
        let err = load_credentials_with(&path, no_process_env).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnv(SESSION_COOKIE_VAR)));
    }

    #[test]
    fn cookie_without_session_key_is_invalid() {
        let (_dir, path) = env_file("CLAUDE_SESSION_COOKIE=\"cf_clearance=cf\"\nCLAUDE_ORG_ID=org\n");
        let err = load_credentials_with(&path, no_process_env).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidCookie));
    }

    #[test]
    fn process_env_overrides_file() {
        let (_dir, path) = env_file(
            "CLAUDE_SESSION_COOKIE=\"sessionKey=from-file\"\nCLAUDE_ORG_ID=\"file-org\"\n",
        );
        let credentials = load_credentials_with(&path, |name| {
            (name == ORG_ID_VAR).then(|| "env-org".to_string())
        })
        .unwrap();
        assert_eq!(credentials.org_id, "env-org");
        assert_eq!(credentials.session.session_key, "from-file");
    }

    #[test]
    fn process_env_alone_is_enough() {
        let dir = tempfile::tempdir().unwrap();
        let credentials = load_credentials_with(&dir.path().join("absent.env"), |name| match name {
            SESSION_COOKIE_VAR => Some("sessionKey=from-env".to_string()),
            ORG_ID_VAR => Some("env-org".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(credentials.session.session_key, "from-env");
    }
}
