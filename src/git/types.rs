use std::fmt;

/// One step of the local repository bootstrap, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapStep {
    Init,
    RemoteAdd,
    StageAll,
    Commit,
    Push,
}

impl BootstrapStep {
    pub const ALL: [BootstrapStep; 5] = [
        BootstrapStep::Init,
        BootstrapStep::RemoteAdd,
        BootstrapStep::StageAll,
        BootstrapStep::Commit,
        BootstrapStep::Push,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BootstrapStep::Init => "init",
            BootstrapStep::RemoteAdd => "remote-add",
            BootstrapStep::StageAll => "stage-all",
            BootstrapStep::Commit => "commit",
            BootstrapStep::Push => "push",
        }
    }
}

impl fmt::Display for BootstrapStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Steps that completed, in order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapResult {
    pub completed: Vec<BootstrapStep>,
}

impl BootstrapResult {
    pub fn contains(&self, step: BootstrapStep) -> bool {
        self.completed.contains(&step)
    }
}

impl fmt::Display for BootstrapResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.completed.is_empty() {
            return f.write_str("none");
        }
        let names: Vec<&str> = self.completed.iter().map(|s| s.name()).collect();
        f.write_str(&names.join(", "))
    }
}

#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    /// Name of the git executable
    pub git_program: String,
    pub remote_name: String,
    pub commit_message: String,
    pub author_email: String,
    /// Basic-auth username sent with the token on push
    pub push_username: String,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            git_program: "git".to_string(),
            remote_name: "origin".to_string(),
            commit_message: "Initial commit".to_string(),
            author_email: "create-app@users.noreply.github.com".to_string(),
            push_username: "Create-App".to_string(),
        }
    }
}
