//! Interactive questions asked before anything touches the network

use dialoguer::{Confirm, Input, MultiSelect, Select};
use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid name pattern"));

pub const NEXTJS_TECHS: [&str; 5] = ["TailwindCSS", "SASS", "Prettier", "ESLint", "FontAwesome"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framework {
    React,
    NextJs,
    NodeJs,
    DiscordJs,
}

impl Framework {
    pub const ALL: [Framework; 4] = [
        Framework::React,
        Framework::NextJs,
        Framework::NodeJs,
        Framework::DiscordJs,
    ];
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Framework::React => "React",
            Framework::NextJs => "NextJs",
            Framework::NodeJs => "NodeJs",
            Framework::DiscordJs => "DiscordJs",
        })
    }
}

/// Validated answers describing the project to scaffold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectAnswers {
    pub name: String,
    pub directory: String,
    pub framework: Framework,
    /// Extra tooling, only offered for NextJs
    pub techs: BTreeSet<String>,
}

/// Source of interactive answers
pub trait Prompter {
    fn project_answers(&self) -> Result<ProjectAnswers, dialoguer::Error>;

    fn confirm_create_repository(&self) -> Result<bool, dialoguer::Error>;

    fn repository_name(&self, default: &str) -> Result<String, dialoguer::Error>;

    /// `true` for a private repository
    fn repository_private(&self) -> Result<bool, dialoguer::Error>;
}

pub fn validate_name(input: &str) -> Result<(), String> {
    if NAME_PATTERN.is_match(input) {
        Ok(())
    } else {
        Err("the name may only contain letters, digits, '-' and '_'".to_string())
    }
}

/// Empty answers fall back to the current directory
pub fn normalize_directory(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        ".".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Prompts on the controlling terminal
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn project_answers(&self) -> Result<ProjectAnswers, dialoguer::Error> {
        let name: String = Input::new()
            .with_prompt("What's the name of your app?")
            .validate_with(|input: &String| validate_name(input))
            .interact_text()?;

        let directory: String = Input::new()
            .with_prompt("Where do you want to deploy your app? (default: \".\")")
            .allow_empty(true)
            .interact_text()?;

        let labels: Vec<String> = Framework::ALL.iter().map(|f| f.to_string()).collect();
        let choice = Select::new()
            .with_prompt("What framework do you want to use?")
            .items(&labels)
            .default(0)
            .interact()?;
        let framework = Framework::ALL[choice];

        let mut techs = BTreeSet::new();
        if framework == Framework::NextJs {
            let picked = MultiSelect::new()
                .with_prompt("What techs do you want to use?")
                .items(&NEXTJS_TECHS)
                .interact()?;
            techs.extend(picked.into_iter().map(|i| NEXTJS_TECHS[i].to_string()));
        }

        Ok(ProjectAnswers {
            name,
            directory: normalize_directory(&directory),
            framework,
            techs,
        })
    }

    fn confirm_create_repository(&self) -> Result<bool, dialoguer::Error> {
        Confirm::new()
            .with_prompt("Would you like to create a github repo?")
            .default(false)
            .interact()
    }

    fn repository_name(&self, default: &str) -> Result<String, dialoguer::Error> {
        Input::new()
            .with_prompt("Enter the name of the github repo")
            .default(default.to_string())
            .validate_with(|input: &String| validate_name(input))
            .interact_text()
    }

    fn repository_private(&self) -> Result<bool, dialoguer::Error> {
        let choice = Select::new()
            .with_prompt("Do you want your repo public or private?")
            .items(&["private", "public"])
            .default(0)
            .interact()?;
        Ok(choice == 0)
    }
}
