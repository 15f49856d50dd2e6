use std::fmt;


const HIGH_RISK_PROBLEMS: [&str; 3] = ["嚴重傾斜", "主幹斷裂或裂縫", "根盤隆起或出土"];
const MEDIUM_RISK_PROBLEMS: [&str; 2] = ["大枝枯死", "樹冠壓到招牌或電線"];


/// Coarse severity label attached to a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    Unassessed,
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Unassessed => "未判定",
            RiskLevel::Low => "低風險",
            RiskLevel::Medium => "中風險",
            RiskLevel::High => "高風險",
        }
    }
}

impl Default for RiskLevel {
    fn default() -> Self {
        RiskLevel::Unassessed
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}


/// Rough level for a problem type picked on the report form.
pub fn assess(problem_type: &str) -> RiskLevel {
    if problem_type.is_empty() {
        RiskLevel::Unassessed
    }
    else if HIGH_RISK_PROBLEMS.contains(&problem_type) {
        RiskLevel::High
    }
    else if MEDIUM_RISK_PROBLEMS.contains(&problem_type) {
        RiskLevel::Medium
    }
    else {
        RiskLevel::Low
    }
}
