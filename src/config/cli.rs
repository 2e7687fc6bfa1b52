use crate::domain::model::SearchCriteria;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "resume-scout")]
#[command(about = "Telegram bot that searches resumes on Work.ua and Robota.ua")]
pub struct BotArgs {
    /// Path to the TOML settings file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Load environment variables from this file instead of ./.env
    #[arg(long)]
    pub env_file: Option<PathBuf>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "resume-search")]
#[command(about = "Run one resume search from the command line")]
pub struct SearchArgs {
    /// Search query
    #[arg(default_value = "")]
    pub keywords: String,

    /// Site category slug (e.g. "it")
    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub region: Option<String>,

    #[arg(long)]
    pub salary_from: Option<u32>,

    #[arg(long)]
    pub salary_to: Option<u32>,

    /// Experience labels, comma separated
    #[arg(long, value_delimiter = ',')]
    pub experience: Vec<String>,

    /// Listings per site (defaults to search.per_site_limit)
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Print normalized resumes as JSON instead of chat messages
    #[arg(long)]
    pub json: bool,

    /// Path to the TOML settings file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl SearchArgs {
    pub fn criteria(&self) -> SearchCriteria {
        SearchCriteria {
            keywords: self.keywords.clone(),
            category: self.category.clone(),
            region: self.region.clone(),
            salary_from: self.salary_from,
            salary_to: self.salary_to,
            experience: self.experience.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_args_to_criteria() {
        let args = SearchArgs::parse_from([
            "resume-search",
            "rust developer",
            "--region",
            "Kyiv",
            "--experience",
            "1 to 2 years,2 to 5 years",
            "--limit",
            "3",
        ]);
        let criteria = args.criteria();
        assert_eq!(criteria.keywords, "rust developer");
        assert_eq!(criteria.region.as_deref(), Some("Kyiv"));
        assert_eq!(criteria.experience, vec!["1 to 2 years", "2 to 5 years"]);
        assert_eq!(args.limit, Some(3));
        assert!(!args.json);
    }
}
