use serde::{Deserialize, Serialize};

use crate::risk::RiskLevel;


/// One submitted tree hazard observation, as stored and as served.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: i64,
    pub image_url: String,
    #[serde(default)]
    pub tree_id: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub problem_type: String,
    #[serde(default)]
    pub target_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default = "default_risk_level")]
    pub risk_level: String,
    #[serde(default)]
    pub root_heave_point: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReport {
    pub image_url: String,
    pub tree_id: String,
    pub location: String,
    pub problem_type: String,
    pub target_type: String,
    pub description: String,
    pub contact: String,
    pub risk_level: String,
    pub root_heave_point: String,
}

impl NewReport {
    pub fn into_report(self, id: i64, timestamp: i64) -> Report {
        Report {
            id,
            image_url: self.image_url,
            tree_id: self.tree_id,
            location: self.location,
            problem_type: self.problem_type,
            target_type: self.target_type,
            description: self.description,
            contact: self.contact,
            risk_level: self.risk_level,
            root_heave_point: self.root_heave_point,
            timestamp,
        }
    }
}


fn default_risk_level() -> String {
    RiskLevel::default().as_str().to_owned()
}
