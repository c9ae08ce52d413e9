// prosody.rs — IdentityStore backed by prosodyctl inside the prosody container.

use jmp_stack::compose::XMPP_SERVICE;
use jmp_stack::{CommandOutput, ComposeProject, ContainerRuntime};

use crate::error::IdentityError;
use crate::store::{Account, IdentityStore};

const PROSODY_CONFIG: &str = "/config/prosody.cfg.lua";

/// Runs `prosodyctl` through the container runtime's `exec`.
pub struct ProsodyIdentity<'a> {
    runtime: &'a dyn ContainerRuntime,
    project: &'a ComposeProject,
    service: String,
}

impl<'a> ProsodyIdentity<'a> {
    pub fn new(runtime: &'a dyn ContainerRuntime, project: &'a ComposeProject) -> Self {
        Self {
            runtime,
            project,
            service: XMPP_SERVICE.to_string(),
        }
    }

    fn prosodyctl<I, S>(&self, args: I) -> Result<CommandOutput, IdentityError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut argv = vec![
            "prosodyctl".to_string(),
            "--config".to_string(),
            PROSODY_CONFIG.to_string(),
        ];
        argv.extend(args.into_iter().map(Into::into));
        Ok(self.runtime.exec(self.project, &self.service, &argv)?)
    }

    fn expect_success(
        output: CommandOutput,
        operation: &'static str,
        account: String,
    ) -> Result<CommandOutput, IdentityError> {
        if output.success && !shell_reported_error(&output.stdout) {
            return Ok(output);
        }
        let message = [output.stderr.trim(), output.stdout.trim()]
            .into_iter()
            .find(|s| !s.is_empty())
            .unwrap_or("exited unsuccessfully")
            .to_string();
        Err(IdentityError::Rejected {
            operation,
            account,
            message,
        })
    }
}

/// The prosody admin shell prints failures as `! message` and may still
/// exit 0.
fn shell_reported_error(stdout: &str) -> bool {
    stdout.lines().any(|line| line.trim_start().starts_with('!'))
}

/// Bare usernames from `shell user list` output.
fn parse_user_list(stdout: &str, domain: &str) -> Vec<String> {
    let suffix = format!("@{}", domain);
    stdout
        .lines()
        .map(str::trim)
        .filter_map(|line| line.strip_suffix(suffix.as_str()))
        .filter(|user| !user.is_empty() && !user.contains(char::is_whitespace))
        .map(str::to_string)
        .collect()
}

impl IdentityStore for ProsodyIdentity<'_> {
    fn set_password(&self, account: &Account) -> Result<(), IdentityError> {
        let output = self.prosodyctl([
            "shell".to_string(),
            "user".to_string(),
            "password".to_string(),
            account.jid(),
            account.password.clone(),
        ])?;
        Self::expect_success(output, "set-password", account.jid())?;
        tracing::debug!(jid = %account.jid(), "password updated");
        Ok(())
    }

    fn register(&self, account: &Account) -> Result<(), IdentityError> {
        let output = self.prosodyctl([
            "register".to_string(),
            account.username.clone(),
            account.domain.clone(),
            account.password.clone(),
        ])?;
        Self::expect_success(output, "register", account.jid())?;
        tracing::debug!(jid = %account.jid(), "user registered");
        Ok(())
    }

    fn delete_user(&self, username: &str, domain: &str) -> Result<(), IdentityError> {
        let jid = format!("{}@{}", username, domain);
        let output = self.prosodyctl(["deluser".to_string(), jid.clone()])?;
        Self::expect_success(output, "delete-user", jid)?;
        Ok(())
    }

    fn list_users(&self, domain: &str) -> Result<Vec<String>, IdentityError> {
        let output = self.prosodyctl(["shell", "user", "list", domain])?;
        let output = Self::expect_success(output, "list-users", domain.to_string())?;
        Ok(parse_user_list(&output.stdout, domain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jmp_stack::fake::FakeRuntime;

    fn project() -> ComposeProject {
        ComposeProject::new("/opt/jm", "docker-compose.yml", "jitsi")
    }

    #[test]
    fn set_password_runs_admin_shell() {
        let runtime = FakeRuntime::new();
        let project = project();
        let store = ProsodyIdentity::new(&runtime, &project);

        store
            .set_password(&Account::new("admin", "meet.jitsi", "s3cret"))
            .unwrap();

        assert_eq!(
            runtime.exec_calls(),
            vec![vec![
                "prosodyctl",
                "--config",
                "/config/prosody.cfg.lua",
                "shell",
                "user",
                "password",
                "admin@meet.jitsi",
                "s3cret",
            ]]
        );
    }

    #[test]
    fn register_passes_user_domain_password() {
        let runtime = FakeRuntime::new();
        let project = project();
        let store = ProsodyIdentity::new(&runtime, &project);

        store
            .register(&Account::new("admin", "guest.meet.jitsi", "pw"))
            .unwrap();

        let call = &runtime.exec_calls()[0];
        assert_eq!(&call[3..], ["register", "admin", "guest.meet.jitsi", "pw"]);
    }

    #[test]
    fn shell_error_line_is_a_failure_even_with_zero_exit() {
        let runtime = FakeRuntime::new();
        runtime.push_exec_response(CommandOutput::ok("! User admin@meet.jitsi does not exist\n"));
        let project = project();
        let store = ProsodyIdentity::new(&runtime, &project);

        let err = store
            .set_password(&Account::new("admin", "meet.jitsi", "pw"))
            .unwrap_err();
        assert!(matches!(
            err,
            IdentityError::Rejected { operation: "set-password", ref message, .. } if message.contains("does not exist")
        ));
    }

    #[test]
    fn runtime_failure_maps_to_runtime_error() {
        let runtime = FakeRuntime::new().failing("exec");
        let project = project();
        let store = ProsodyIdentity::new(&runtime, &project);
        assert!(matches!(
            store.delete_user("admin", "meet.jitsi"),
            Err(IdentityError::Runtime(_))
        ));
    }

    #[test]
    fn lists_users_on_domain() {
        let runtime = FakeRuntime::new();
        runtime.push_exec_response(CommandOutput::ok(
            "admin@meet.jitsi\nfocus@meet.jitsi\nOK: Showing all 2 users\n",
        ));
        let project = project();
        let store = ProsodyIdentity::new(&runtime, &project);

        assert_eq!(store.list_users("meet.jitsi").unwrap(), vec!["admin", "focus"]);
    }

    #[test]
    fn user_list_ignores_other_domains() {
        let users = parse_user_list("a@meet.jitsi\nb@auth.meet.jitsi\n", "meet.jitsi");
        assert_eq!(users, vec!["a"]);
    }
}
