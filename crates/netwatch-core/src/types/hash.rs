use serde::{Deserialize, Serialize};

/// Hash digest families accepted for lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashKind {
    /// 32 hex characters
    Md5,
    /// 40 hex characters
    Sha1,
    /// 64 hex characters
    Sha256,
}

impl HashKind {
    /// Classify a lowercase hex digest by length.
    ///
    /// Returns `None` for anything that is not exactly 32, 40 or 64 hex
    /// characters.
    #[must_use]
    pub fn detect(hash: &str) -> Option<Self> {
        if !hash.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        match hash.len() {
            32 => Some(Self::Md5),
            40 => Some(Self::Sha1),
            64 => Some(Self::Sha256),
            _ => None,
        }
    }
}

/// A positive hit from one malware database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashMatch {
    /// Malware family, if the provider names one
    pub family: Option<String>,

    /// Provider-specific confidence (0-100)
    pub score: u8,

    /// Label the provider's engine attached to the sample
    pub result: String,

    /// Provider tags
    pub tags: Vec<String>,
}

/// Final classification of a hash
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashVerdict {
    /// At least one database lists the sample
    Malicious,
    /// Every database answered and none lists the sample
    #[serde(rename = "Clean / Unknown")]
    Clean,
    /// Some databases could not be queried and none lists the sample
    Unknown,
}

/// One engine's opinion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineResult {
    /// Engine (provider) name
    pub engine: String,
    /// Label reported by the engine
    pub result: String,
}

/// Detection summary across engines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSummary {
    /// Engines that flagged the sample
    pub detected: u32,
    /// Engines consulted
    pub total: u32,
    /// Per-engine breakdown, in provider order
    pub details: Vec<EngineResult>,
}

/// Normalized hash lookup result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashRecord {
    /// Listed by any database
    pub found: bool,

    /// Final classification
    pub verdict: HashVerdict,

    /// Malware family or a short explanation
    pub family: String,

    /// Risk score (0-100), always 0 when not found
    pub score: u8,

    /// Detection summary
    pub engines: EngineSummary,

    /// Tags
    pub tags: Vec<String>,

    /// Database that produced the verdict, when one did
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Databases that answered, in provider order
    pub sources_checked: Vec<String>,
}

impl HashRecord {
    /// Record for a positive hit from `source`
    #[must_use]
    pub fn malicious(source: &str, hit: HashMatch, sources_checked: Vec<String>) -> Self {
        Self {
            found: true,
            verdict: HashVerdict::Malicious,
            family: hit.family.unwrap_or_else(|| "Unknown Malware".to_string()),
            score: hit.score.min(100),
            engines: EngineSummary {
                detected: 1,
                total: 1,
                details: vec![EngineResult {
                    engine: source.to_string(),
                    result: hit.result,
                }],
            },
            tags: hit.tags,
            source: Some(source.to_string()),
            sources_checked,
        }
    }

    /// Record when every database explicitly reported no match
    #[must_use]
    pub fn clean(sources_checked: Vec<String>) -> Self {
        Self {
            found: false,
            verdict: HashVerdict::Clean,
            family: "No threats detected in threat databases".to_string(),
            score: 0,
            engines: EngineSummary {
                detected: 0,
                total: u32::try_from(sources_checked.len()).unwrap_or(u32::MAX),
                details: Vec::new(),
            },
            tags: vec!["Not in threat DBs".to_string()],
            source: None,
            sources_checked,
        }
    }

    /// Record when some databases could not be queried
    #[must_use]
    pub fn partial(sources_checked: Vec<String>) -> Self {
        Self {
            found: false,
            verdict: HashVerdict::Unknown,
            family: "Partial check completed".to_string(),
            score: 0,
            engines: EngineSummary {
                detected: 0,
                total: u32::try_from(sources_checked.len()).unwrap_or(u32::MAX),
                details: Vec::new(),
            },
            tags: vec!["Partial scan".to_string()],
            source: None,
            sources_checked,
        }
    }
}
