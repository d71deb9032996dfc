use serde::{Deserialize, Serialize};

use crate::models::RecordId;

/// A stored result of a past community-insight analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchRecord {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub urls: Vec<String>,
    #[serde(default)]
    pub community_analysis: CommunityAnalysis,
    #[serde(default)]
    pub market_analysis: MarketAnalysis,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommunityAnalysis {
    #[serde(default)]
    pub insights: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketAnalysis {
    #[serde(default)]
    pub opportunities: Vec<serde_json::Value>,
}

/// Outcome of a URL analysis request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub result: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_deserialize_full() {
        let json = r#"{
            "id": "r1",
            "name": "Runners on reddit",
            "source": "reddit",
            "created_at": "2024-05-01T10:00:00Z",
            "urls": ["https://reddit.com/r/running", "https://reddit.com/r/ultra"],
            "community_analysis": {"insights": ["shin splints", {"topic": "shoes"}]},
            "market_analysis": {"opportunities": ["recovery gear"]}
        }"#;
        let record: ResearchRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id.as_str(), "r1");
        assert_eq!(record.urls.len(), 2);
        assert_eq!(record.urls[0], "https://reddit.com/r/running");
        assert_eq!(record.community_analysis.insights.len(), 2);
        assert_eq!(record.market_analysis.opportunities.len(), 1);
    }

    #[test]
    fn test_record_deserialize_minimal() {
        let record: ResearchRecord = serde_json::from_str(r#"{"id": 7, "name": "n"}"#).unwrap();
        assert_eq!(record.id.as_str(), "7");
        assert!(record.urls.is_empty());
        assert!(record.community_analysis.insights.is_empty());
    }
}
