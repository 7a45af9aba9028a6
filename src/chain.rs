//! Chain allow-list for collection records.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Chain {
    Ethereum,
    #[serde(rename = "TON")]
    Ton,
    #[serde(rename = "NEW")]
    New,
    Polygon,
    Aptos,
    Base,
    Celo,
    Kroma,
    Arbitrum,
    Moonbeam,
    Palm,
    Lisk,
    #[serde(rename = "RARI Chain")]
    RariChain,
    #[serde(rename = "ImmutableX")]
    ImmutableX,
    #[serde(rename = "XAI")]
    Xai,
    Mantle,
    Sei,
    Bera,
}

pub const ALL_CHAINS: [Chain; 18] = [
    Chain::Ethereum,
    Chain::Ton,
    Chain::New,
    Chain::Polygon,
    Chain::Aptos,
    Chain::Base,
    Chain::Celo,
    Chain::Kroma,
    Chain::Arbitrum,
    Chain::Moonbeam,
    Chain::Palm,
    Chain::Lisk,
    Chain::RariChain,
    Chain::ImmutableX,
    Chain::Xai,
    Chain::Mantle,
    Chain::Sei,
    Chain::Bera,
];

pub const DEFAULT_CHAIN: Chain = Chain::Ethereum;

impl Chain {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ethereum => "Ethereum",
            Self::Ton => "TON",
            Self::New => "NEW",
            Self::Polygon => "Polygon",
            Self::Aptos => "Aptos",
            Self::Base => "Base",
            Self::Celo => "Celo",
            Self::Kroma => "Kroma",
            Self::Arbitrum => "Arbitrum",
            Self::Moonbeam => "Moonbeam",
            Self::Palm => "Palm",
            Self::Lisk => "Lisk",
            Self::RariChain => "RARI Chain",
            Self::ImmutableX => "ImmutableX",
            Self::Xai => "XAI",
            Self::Mantle => "Mantle",
            Self::Sei => "Sei",
            Self::Bera => "Bera",
        }
    }

    /// Lowercased label used as the `data-chain-type` badge attribute.
    pub fn badge_slug(self) -> String {
        self.as_str().to_lowercase()
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact, case-sensitive lookup against the allow-list.
pub fn parse_chain(input: &str) -> Option<Chain> {
    ALL_CHAINS.iter().copied().find(|chain| chain.as_str() == input)
}

pub fn normalize_chain(input: &str) -> Chain {
    parse_chain(input).unwrap_or(DEFAULT_CHAIN)
}
