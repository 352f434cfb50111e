//! Guided workflows: a workflow choice plus an entity become a prompt.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Workflow {
    TargetIdentification,
    HitIdentification,
    AdmeAssessment,
    SafetyAssessment,
}

impl Workflow {
    pub const ALL: [Workflow; 4] = [
        Workflow::TargetIdentification,
        Workflow::HitIdentification,
        Workflow::AdmeAssessment,
        Workflow::SafetyAssessment,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(&self) -> usize {
        match self {
            Workflow::TargetIdentification => 0,
            Workflow::HitIdentification => 1,
            Workflow::AdmeAssessment => 2,
            Workflow::SafetyAssessment => 3,
        }
    }

    /// Identifier of the skill folder the agent applies for this workflow
    pub fn skill_name(&self) -> &'static str {
        match self {
            Workflow::TargetIdentification => "target-identification",
            Workflow::HitIdentification => "hit-identification",
            Workflow::AdmeAssessment => "ADME-assessment",
            Workflow::SafetyAssessment => "safety-assessment",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Workflow::TargetIdentification => "🎯 Target Identification",
            Workflow::HitIdentification => "⌬ Hit Identification",
            Workflow::AdmeAssessment => "🧪 ADME Assessment",
            Workflow::SafetyAssessment => "☠️ Safety Assessment",
        }
    }

    /// What the entity input names
    pub fn entity_kind(&self) -> &'static str {
        match self {
            Workflow::TargetIdentification => "disease",
            Workflow::HitIdentification => "target",
            Workflow::AdmeAssessment | Workflow::SafetyAssessment => "compound",
        }
    }

    pub fn entity_example(&self) -> &'static str {
        match self {
            Workflow::TargetIdentification => "breast cancer, Alzheimer's disease",
            Workflow::HitIdentification => "BRCA1, GLP-1",
            Workflow::AdmeAssessment => "acetaminophen, semaglutide, CHEMBL25",
            Workflow::SafetyAssessment => "danuglipron, semaglutide",
        }
    }

    /// The plain request, also what a skill-tagged turn sends
    pub fn user_query(&self, entity: &str) -> String {
        match self {
            Workflow::TargetIdentification => format!("Find targets associated with {}.", entity),
            Workflow::HitIdentification => format!("Find drugs associated with {}.", entity),
            Workflow::AdmeAssessment => format!("Get properties of {}.", entity),
            Workflow::SafetyAssessment => format!(
                "Find safety profile of {}. If citing studies, please state the strength of the evidence based on the study design.",
                entity
            ),
        }
    }
}

impl fmt::Display for Workflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.skill_name())
    }
}

impl FromStr for Workflow {
    type Err = Error;

    /// Accepts an index, a skill name or a short alias ("target", "hit",
    /// "adme", "safety"), case-insensitively
    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim().to_ascii_lowercase();
        if let Ok(index) = needle.parse::<usize>() {
            return Self::from_index(index)
                .ok_or_else(|| Error::InvalidInput(format!("no workflow at index {}", index)));
        }
        Self::ALL
            .into_iter()
            .find(|w| {
                let skill = w.skill_name().to_ascii_lowercase();
                skill == needle || skill.split('-').next() == Some(needle.as_str())
            })
            .ok_or_else(|| Error::InvalidInput(format!("unknown workflow '{}'", s)))
    }
}

/// Compound property groups offered by the ADME workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertySet {
    Structure,
    Adme,
    Bioactivity,
    All,
}

impl PropertySet {
    pub const ALL: [PropertySet; 4] = [
        PropertySet::Structure,
        PropertySet::Adme,
        PropertySet::Bioactivity,
        PropertySet::All,
    ];

    pub fn description(&self) -> &'static str {
        match self {
            PropertySet::Structure => "Structure: SMILES, InChI, MW...",
            PropertySet::Adme => "ADME: LogP, Druglikeness, CYP3A4...",
            PropertySet::Bioactivity => "Bioactivity: IC50...",
            PropertySet::All => "All",
        }
    }
}

impl FromStr for PropertySet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "structure" => Ok(PropertySet::Structure),
            "adme" => Ok(PropertySet::Adme),
            "bioactivity" => Ok(PropertySet::Bioactivity),
            "all" => Ok(PropertySet::All),
            other => Err(Error::InvalidInput(format!("unknown property set '{}'", other))),
        }
    }
}

/// Everything the selector panel holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowSelection {
    pub workflow: Workflow,
    pub entity: String,
    pub skills_enabled: bool,
    /// Only consulted by the ADME workflow without skills
    pub properties: Vec<PropertySet>,
}

impl WorkflowSelection {
    pub fn new(workflow: Workflow, entity: impl Into<String>) -> Self {
        Self {
            workflow,
            entity: entity.into(),
            skills_enabled: false,
            properties: Vec::new(),
        }
    }

    pub fn with_skills(mut self, enabled: bool) -> Self {
        self.skills_enabled = enabled;
        self
    }

    pub fn with_properties(mut self, properties: Vec<PropertySet>) -> Self {
        self.properties = properties;
        self
    }

    /// Build the outgoing prompt.
    ///
    /// With skills enabled the prompt is the plain request and the
    /// workflow's skill identifier rides along; otherwise the request is
    /// embedded in the workflow's tool-directed template.
    pub fn compose(&self) -> Result<ComposedPrompt> {
        let entity = self.entity.trim();
        if entity.is_empty() {
            return Err(Error::InvalidInput(format!(
                "enter the {} of interest",
                self.workflow.entity_kind()
            )));
        }
        let user_query = self.workflow.user_query(entity);

        if self.skills_enabled {
            return Ok(ComposedPrompt {
                prompt: user_query,
                skill: Some(self.workflow.skill_name().to_string()),
            });
        }

        let prompt = match self.workflow {
            Workflow::TargetIdentification => {
                format!("Use OpenTargets and optionally PubChem to {}", user_query)
            }
            Workflow::HitIdentification => format!(
                "Use OpenTargets to {} Show their scores if any and rank in descending order of scores.",
                user_query
            ),
            Workflow::AdmeAssessment => {
                if self.properties.is_empty() {
                    return Err(Error::InvalidInput(
                        "select at least one compound property group".to_string(),
                    ));
                }
                let properties = self
                    .properties
                    .iter()
                    .map(PropertySet::description)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("Use PubChem to {} Properties include {}.", user_query, properties)
            }
            Workflow::SafetyAssessment => format!("Use PubChem and PubMed to {}", user_query),
        };
        Ok(ComposedPrompt {
            prompt,
            skill: None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComposedPrompt {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill: Option<String>,
}
