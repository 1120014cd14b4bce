//! Configuration types for match play

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use jersi_core::{Algorithm, HumanSearcher, MinimaxSearcher, RandomSearcher, SearchConfig, Searcher};
use serde::{Deserialize, Serialize};

/// Rejected searcher description
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown searcher '{0}', expected random, human, abN, mmN or abN@MS")]
    UnknownSearcher(String),
    #[error("searcher '{0}' needs a depth of at least 1")]
    ZeroDepth(String),
    #[error("searcher '{0}' needs a time limit of at least 1 ms")]
    ZeroTimeLimit(String),
    #[error("human players cannot take part in automated matches")]
    HumanInMatch,
}

/// How to build one player
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SearcherConfig {
    /// Uniformly random legal moves
    Random { seed: Option<u64> },
    /// Minimax or alpha-beta search
    Search(SearchConfig),
    /// Moves typed in by a user
    Human,
}

impl Default for SearcherConfig {
    fn default() -> Self {
        SearcherConfig::Search(SearchConfig::default())
    }
}

impl SearcherConfig {
    /// Build the searcher described by this config
    pub fn build(&self, name: impl Into<String>) -> Box<dyn Searcher> {
        match self {
            SearcherConfig::Random { seed } => Box::new(RandomSearcher::new(name, *seed)),
            SearcherConfig::Search(config) => Box::new(MinimaxSearcher::new(name, config.clone())),
            SearcherConfig::Human => Box::new(HumanSearcher::new(name)),
        }
    }

    pub fn is_interactive(&self) -> bool {
        matches!(self, SearcherConfig::Human)
    }

    /// Same player with a fixed seed, for reproducible games
    pub fn with_seed(&self, seed: u64) -> Self {
        match self {
            SearcherConfig::Random { .. } => SearcherConfig::Random { seed: Some(seed) },
            SearcherConfig::Search(config) => SearcherConfig::Search(config.clone().with_seed(seed)),
            SearcherConfig::Human => SearcherConfig::Human,
        }
    }

    /// Reject search settings that could not produce a move
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let SearcherConfig::Search(config) = self {
            if config.depth == 0 {
                return Err(ConfigError::ZeroDepth(self.to_string()));
            }
            if config.time_limit_ms == Some(0) {
                return Err(ConfigError::ZeroTimeLimit(self.to_string()));
            }
        }
        Ok(())
    }

    /// Load from JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading searcher config {}", path.display()))?;
        let config: SearcherConfig = serde_json::from_str(&content)
            .with_context(|| format!("parsing searcher config {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid searcher config {}", path.display()))?;
        Ok(config)
    }

    /// Save to JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).with_context(|| format!("writing searcher config {}", path.display()))?;
        Ok(())
    }

    /// Accept either a short spec or a path to a JSON config
    pub fn resolve(spec: &str) -> anyhow::Result<Self> {
        match spec.parse::<SearcherConfig>() {
            Ok(config) => Ok(config),
            Err(e) if Path::new(spec).is_file() => {
                tracing::debug!(spec, error = %e, "loading searcher config from file");
                Self::load(Path::new(spec))
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl FromStr for SearcherConfig {
    type Err = ConfigError;

    /// Short specs: `random`, `human`, `ab3`, `mm2`, `ab6@2000`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let spec = s.trim().to_ascii_lowercase();
        match spec.as_str() {
            "random" => return Ok(SearcherConfig::Random { seed: None }),
            "human" => return Ok(SearcherConfig::Human),
            _ => {}
        }

        let unknown = || ConfigError::UnknownSearcher(s.to_string());
        let (algorithm, rest) = if let Some(rest) = spec.strip_prefix("ab") {
            (Algorithm::AlphaBeta, rest)
        } else if let Some(rest) = spec.strip_prefix("mm") {
            (Algorithm::Minimax, rest)
        } else {
            return Err(unknown());
        };

        let (depth, time_limit) = match rest.split_once('@') {
            Some((depth, ms)) => (depth, Some(ms.parse::<u64>().map_err(|_| unknown())?)),
            None => (rest, None),
        };
        let depth = depth.parse::<u32>().map_err(|_| unknown())?;

        let config = SearcherConfig::Search(SearchConfig {
            algorithm,
            depth,
            time_limit_ms: time_limit,
            ..Default::default()
        });
        config.validate()?;
        Ok(config)
    }
}

impl fmt::Display for SearcherConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearcherConfig::Random { .. } => f.write_str("random"),
            SearcherConfig::Search(config) => f.write_str(&config.label()),
            SearcherConfig::Human => f.write_str("human"),
        }
    }
}

/// Match configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Number of games (should be even for color alternation)
    pub games: usize,
    /// Stop a game after this many turns and score it as a draw
    pub max_turns: Option<u32>,
    /// Play games on the rayon pool
    pub parallel: bool,
    /// Base seed; game `i` seeds its players from `seed + i`
    pub seed: u64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            games: 2,
            max_turns: Some(200),
            parallel: true,
            seed: 42,
        }
    }
}

impl MatchConfig {
    pub fn with_games(mut self, games: usize) -> Self {
        self.games = games;
        self
    }

    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = Some(max_turns);
        self
    }

    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_short_specs() {
        assert_eq!("random".parse::<SearcherConfig>(), Ok(SearcherConfig::Random { seed: None }));
        assert_eq!("Human".parse::<SearcherConfig>(), Ok(SearcherConfig::Human));

        let ab3: SearcherConfig = "ab3".parse().unwrap();
        assert_eq!(ab3, SearcherConfig::Search(SearchConfig::alpha_beta(3)));

        let mm2: SearcherConfig = "mm2".parse().unwrap();
        assert_eq!(mm2, SearcherConfig::Search(SearchConfig::minimax(2)));

        let timed: SearcherConfig = "ab6@2000".parse().unwrap();
        assert_eq!(timed, SearcherConfig::Search(SearchConfig::alpha_beta(6).with_time_limit(2000)));
        assert_eq!(timed.to_string(), "ab6@2000");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("xy3".parse::<SearcherConfig>(), Err(ConfigError::UnknownSearcher("xy3".into())));
        assert_eq!("ab".parse::<SearcherConfig>(), Err(ConfigError::UnknownSearcher("ab".into())));
        assert_eq!("ab3@soon".parse::<SearcherConfig>(), Err(ConfigError::UnknownSearcher("ab3@soon".into())));
        assert_eq!("mm0".parse::<SearcherConfig>(), Err(ConfigError::ZeroDepth("mm0".into())));
        assert_eq!("ab3@0".parse::<SearcherConfig>(), Err(ConfigError::ZeroTimeLimit("ab3@0".into())));
    }

    #[test]
    fn test_with_seed() {
        let random = SearcherConfig::Random { seed: None }.with_seed(4);
        assert_eq!(random, SearcherConfig::Random { seed: Some(4) });
        match SearcherConfig::default().with_seed(9) {
            SearcherConfig::Search(config) => assert_eq!(config.seed, Some(9)),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_build() {
        let searcher = "ab2@100".parse::<SearcherConfig>().unwrap().build("white");
        assert_eq!(searcher.name(), "white");
        assert_eq!(searcher.time_limit(), Some(std::time::Duration::from_millis(100)));
        assert!(SearcherConfig::Human.build("me").is_interactive());
        assert!(!SearcherConfig::Random { seed: Some(1) }.build("r").is_interactive());
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("jersi-searcher-{}.json", std::process::id()));
        let config = SearcherConfig::Search(SearchConfig::minimax(2).with_seed(3));
        config.save(&path).unwrap();
        assert_eq!(SearcherConfig::load(&path).unwrap(), config);
        assert_eq!(SearcherConfig::resolve(path.to_str().unwrap()).unwrap(), config);
        let _ = std::fs::remove_file(&path);

        assert!(SearcherConfig::load(Path::new("/nonexistent/searcher.json")).is_err());
    }

    #[test]
    fn test_load_rejects_unusable_search() {
        let path = std::env::temp_dir().join(format!("jersi-searcher-bad-{}.json", std::process::id()));
        for json in [
            r#"{"kind":"search","depth":0}"#,
            r#"{"kind":"search","depth":3,"time_limit_ms":0}"#,
            r#"{"kind":"search","depth":0,"time_limit_ms":500}"#,
        ] {
            std::fs::write(&path, json).unwrap();
            assert!(SearcherConfig::load(&path).is_err(), "{}", json);
            assert!(SearcherConfig::resolve(path.to_str().unwrap()).is_err(), "{}", json);
        }
        let _ = std::fs::remove_file(&path);

        let zero: SearcherConfig = serde_json::from_str(r#"{"kind":"search","depth":0}"#).unwrap();
        assert_eq!(zero.validate(), Err(ConfigError::ZeroDepth("ab0".into())));
        assert_eq!(SearcherConfig::Random { seed: None }.validate(), Ok(()));
    }
}
