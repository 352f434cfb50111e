use crate::types::{PropertyArg, WorkflowArg};
use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Chat with the agent (interactive unless --prompt is given)")]
    Chat {
        /// Project id or unique prefix [default: most recent project]
        #[arg(long)]
        project: Option<String>,

        /// Send one prompt, print the reply and exit
        #[arg(long, conflicts_with = "example")]
        prompt: Option<String>,

        /// Send one of the example questions by number
        #[arg(long)]
        example: Option<usize>,

        /// Skill the agent should apply to the prompt
        #[arg(long)]
        skill: Option<String>,
    },

    #[command(about = "Run a guided workflow for an entity")]
    Workflow {
        workflow: WorkflowArg,

        /// Disease, target or compound of interest
        #[arg(required = true, num_args = 1..)]
        entity: Vec<String>,

        /// Attach the workflow's skill instead of the tool-directed prompt
        #[arg(long)]
        skills: bool,

        /// Compound property groups (ADME workflow without skills)
        #[arg(long = "property", value_delimiter = ',')]
        properties: Vec<PropertyArg>,

        #[arg(long)]
        project: Option<String>,

        /// Print the composed prompt without sending it
        #[arg(long)]
        dry_run: bool,
    },

    #[command(about = "Manage chat projects")]
    Project {
        #[command(subcommand)]
        command: ProjectCommand,
    },

    #[command(about = "Show tool calls and SQL queries of a project, newest first")]
    Activity {
        #[arg(long)]
        project: Option<String>,

        /// Number of turns to show
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    #[command(about = "Browse skills")]
    Skills {
        #[command(subcommand)]
        command: SkillsCommand,
    },

    #[command(about = "List the agent's tools grouped by provider")]
    Tools {
        /// Ask the backend instead of reading the local listing
        #[arg(long)]
        remote: bool,
    },

    #[command(about = "List example questions")]
    Examples,

    #[command(about = "Show the signed-in user reported by the backend")]
    User,

    #[command(about = "Check backend health and storage")]
    Health,

    #[command(about = "Inspect or create the configuration file")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand)]
pub enum ProjectCommand {
    #[command(about = "List projects, most recent first")]
    List,

    #[command(about = "Create an empty project")]
    Create {
        #[arg(default_value = "Untitled")]
        name: String,
    },

    #[command(about = "Print a project's transcript")]
    Show { id: String },

    #[command(about = "Rename a project")]
    Rename { id: String, name: String },

    #[command(about = "Delete a project")]
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum SkillsCommand {
    #[command(about = "List discovered skills")]
    List {
        /// Ask the backend instead of scanning the local skills directory
        #[arg(long)]
        remote: bool,
    },

    #[command(about = "Print a skill's instructions")]
    Show {
        name: String,

        /// Print the prompt the agent receives for this query
        #[arg(long)]
        wrap: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    #[command(about = "Print the effective configuration")]
    Show,

    #[command(about = "Write a default config.toml")]
    Init {
        #[arg(long)]
        force: bool,
    },
}
