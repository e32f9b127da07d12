//! Research state shared by the pipeline nodes

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::config::SearchScope;
use crate::search::DocumentMap;

/// What the caller knows about the company before research starts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputState {
    pub company: String,
    #[serde(default)]
    pub company_url: Option<String>,
    #[serde(default)]
    pub hq_location: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub job_id: Option<String>,
}

impl InputState {
    pub fn new(company: impl Into<String>) -> Self {
        Self {
            company: company.into(),
            ..Self::default()
        }
    }

    pub fn with_url(mut self, url: Option<String>) -> Self {
        self.company_url = url;
        self
    }

    pub fn with_hq(mut self, hq: Option<String>) -> Self {
        self.hq_location = hq;
        self
    }

    pub fn with_industry(mut self, industry: Option<String>) -> Self {
        self.industry = industry;
        self
    }

    pub fn with_job_id(mut self, job_id: impl Into<String>) -> Self {
        self.job_id = Some(job_id.into());
        self
    }
}

/// Content extracted from the company website
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteScrape {
    pub title: String,
    pub raw_content: String,
}

/// State threaded through grounding, research, collection and editing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResearchState {
    pub company: String,
    pub company_url: Option<String>,
    pub hq_location: Option<String>,
    pub industry: Option<String>,
    pub job_id: Option<String>,
    /// Human-readable progress log, one entry per node
    pub messages: Vec<String>,
    pub site_scrape: Option<SiteScrape>,
    pub company_data: DocumentMap,
    pub industry_data: DocumentMap,
    pub financial_data: DocumentMap,
    pub news_data: DocumentMap,
    /// Category → briefing text
    pub briefings: BTreeMap<String, String>,
    pub report: Option<String>,
}

impl ResearchState {
    /// Start a state from the input fields
    pub fn from_input(input: InputState) -> Self {
        Self {
            company: input.company,
            company_url: input.company_url,
            hq_location: input.hq_location,
            industry: input.industry,
            job_id: input.job_id,
            ..Self::default()
        }
    }

    /// Names of the fields that currently hold a value
    pub fn state_keys(&self) -> Vec<&'static str> {
        let mut keys = vec!["company"];
        let optional = [
            ("company_url", self.company_url.is_some()),
            ("hq_location", self.hq_location.is_some()),
            ("industry", self.industry.is_some()),
            ("job_id", self.job_id.is_some()),
            ("messages", !self.messages.is_empty()),
            ("site_scrape", self.site_scrape.is_some()),
            ("company_data", !self.company_data.is_empty()),
            ("industry_data", !self.industry_data.is_empty()),
            ("financial_data", !self.financial_data.is_empty()),
            ("news_data", !self.news_data.is_empty()),
            ("briefings", !self.briefings.is_empty()),
            ("report", self.report.is_some()),
        ];
        keys.extend(optional.iter().filter(|(_, set)| *set).map(|(key, _)| *key));
        keys
    }

    /// Documents gathered by one analyst
    pub fn data(&self, analyst: Analyst) -> &DocumentMap {
        match analyst {
            Analyst::Company => &self.company_data,
            Analyst::Industry => &self.industry_data,
            Analyst::Financial => &self.financial_data,
            Analyst::News => &self.news_data,
        }
    }

    pub fn data_mut(&mut self, analyst: Analyst) -> &mut DocumentMap {
        match analyst {
            Analyst::Company => &mut self.company_data,
            Analyst::Industry => &mut self.industry_data,
            Analyst::Financial => &mut self.financial_data,
            Analyst::News => &mut self.news_data,
        }
    }
}

/// One research perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Analyst {
    Company,
    Industry,
    Financial,
    News,
}

impl Analyst {
    /// All analysts, in report section order
    pub const ALL: [Analyst; 4] = [
        Analyst::Company,
        Analyst::Industry,
        Analyst::Financial,
        Analyst::News,
    ];

    /// Category name, also the briefing key
    pub fn category(&self) -> &'static str {
        match self {
            Analyst::Company => "company",
            Analyst::Industry => "industry",
            Analyst::Financial => "financial",
            Analyst::News => "news",
        }
    }

    /// Tag used in status and analyst updates
    pub fn analyst_type(&self) -> &'static str {
        match self {
            Analyst::Company => "company_analyst",
            Analyst::Industry => "industry_analyst",
            Analyst::Financial => "financial_analyst",
            Analyst::News => "news_analyst",
        }
    }

    pub fn scope(&self) -> SearchScope {
        match self {
            Analyst::News => SearchScope::News,
            Analyst::Financial => SearchScope::Finance,
            Analyst::Company | Analyst::Industry => SearchScope::General,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Analyst::Company => "Company",
            Analyst::Industry => "Industry",
            Analyst::Financial => "Financial",
            Analyst::News => "News",
        }
    }

    /// Header of this analyst's section in the final report
    pub fn section_title(&self) -> &'static str {
        match self {
            Analyst::Company => "Company Overview",
            Analyst::Industry => "Industry Analysis",
            Analyst::Financial => "Financial Analysis",
            Analyst::News => "Recent Developments",
        }
    }

    /// Query-generation prompt for this perspective
    pub fn prompt(&self, company: &str) -> String {
        match self {
            Analyst::Company => format!(
                "Generate search queries about {company}'s core business: its products and \
                 services, leadership team, business model and history."
            ),
            Analyst::Industry => format!(
                "Generate search queries about the market {company} operates in: market \
                 position, main competitors, industry trends and regulation."
            ),
            Analyst::Financial => format!(
                "Generate search queries about {company}'s financial situation: revenue, \
                 funding rounds, valuation, earnings and key financial metrics."
            ),
            Analyst::News => format!(
                "Generate search queries about recent news on {company}: announcements, \
                 partnerships, product launches and press coverage."
            ),
        }
    }
}

impl fmt::Display for Analyst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.category())
    }
}

impl FromStr for Analyst {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.to_ascii_lowercase();
        let name = name.strip_suffix("_analyst").unwrap_or(&name);
        match name {
            "company" => Ok(Analyst::Company),
            "industry" => Ok(Analyst::Industry),
            "financial" | "finance" => Ok(Analyst::Financial),
            "news" => Ok(Analyst::News),
            other => Err(format!("Unknown analyst '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyst_scopes() {
        assert_eq!(Analyst::News.scope(), SearchScope::News);
        assert_eq!(Analyst::Financial.scope(), SearchScope::Finance);
        assert_eq!(Analyst::Company.scope(), SearchScope::General);
        assert_eq!(Analyst::Industry.scope(), SearchScope::General);
    }

    #[test]
    fn test_analyst_from_str() {
        assert_eq!("news".parse::<Analyst>().unwrap(), Analyst::News);
        assert_eq!("Financial_Analyst".parse::<Analyst>().unwrap(), Analyst::Financial);
        assert_eq!("finance".parse::<Analyst>().unwrap(), Analyst::Financial);
        assert!("legal".parse::<Analyst>().is_err());
    }

    #[test]
    fn test_prompt_mentions_company() {
        for analyst in Analyst::ALL {
            assert!(analyst.prompt("Acme Corp").contains("Acme Corp"));
        }
    }

    #[test]
    fn test_state_keys_list_populated_fields() {
        let input = InputState::new("Acme Corp")
            .with_hq(Some("Austin, TX".to_string()))
            .with_job_id("job-1");
        let mut state = ResearchState::from_input(input);
        assert_eq!(state.state_keys(), vec!["company", "hq_location", "job_id"]);

        state.messages.push("Initiating research".to_string());
        state.report = Some("# Acme Corp".to_string());
        assert_eq!(
            state.state_keys(),
            vec!["company", "hq_location", "job_id", "messages", "report"]
        );
    }

    #[test]
    fn test_state_slots() {
        let mut state = ResearchState::from_input(InputState::new("Acme Corp"));
        state.data_mut(Analyst::News).insert(
            "https://acme.com/press".to_string(),
            crate::search::SearchResult::new(
                "https://acme.com/press".to_string(),
                "Press".to_string(),
                "Acme launches".to_string(),
                "Acme Corp recent news".to_string(),
                0.4,
            ),
        );
        assert_eq!(state.data(Analyst::News).len(), 1);
        assert!(state.data(Analyst::Company).is_empty());
        assert_eq!(state.company, "Acme Corp");
    }
}
