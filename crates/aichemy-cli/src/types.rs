use clap::ValueEnum;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum OutputFormat {
    Plain,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Plain => write!(f, "plain"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum WorkflowArg {
    Target,
    Hit,
    Adme,
    Safety,
}

impl fmt::Display for WorkflowArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowArg::Target => write!(f, "target"),
            WorkflowArg::Hit => write!(f, "hit"),
            WorkflowArg::Adme => write!(f, "adme"),
            WorkflowArg::Safety => write!(f, "safety"),
        }
    }
}

impl From<WorkflowArg> for aichemy_runtime::Workflow {
    fn from(arg: WorkflowArg) -> Self {
        match arg {
            WorkflowArg::Target => aichemy_runtime::Workflow::TargetIdentification,
            WorkflowArg::Hit => aichemy_runtime::Workflow::HitIdentification,
            WorkflowArg::Adme => aichemy_runtime::Workflow::AdmeAssessment,
            WorkflowArg::Safety => aichemy_runtime::Workflow::SafetyAssessment,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum PropertyArg {
    Structure,
    Adme,
    Bioactivity,
    All,
}

impl fmt::Display for PropertyArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyArg::Structure => write!(f, "structure"),
            PropertyArg::Adme => write!(f, "adme"),
            PropertyArg::Bioactivity => write!(f, "bioactivity"),
            PropertyArg::All => write!(f, "all"),
        }
    }
}

impl From<PropertyArg> for aichemy_runtime::PropertySet {
    fn from(arg: PropertyArg) -> Self {
        match arg {
            PropertyArg::Structure => aichemy_runtime::PropertySet::Structure,
            PropertyArg::Adme => aichemy_runtime::PropertySet::Adme,
            PropertyArg::Bioactivity => aichemy_runtime::PropertySet::Bioactivity,
            PropertyArg::All => aichemy_runtime::PropertySet::All,
        }
    }
}
