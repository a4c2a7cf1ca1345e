//! Issuer desk - simulated minting and listing of real-world assets
//!
//! Nothing here touches a chain: a mint fabricates a random asset id
//! (`NFT-k3j9x0q2a`) and a listing is only validated. Every action requires
//! a ready wallet session.
//!
//! | Form | Steps | Produces |
//! |------|-------|----------|
//! | [`NftMintWizard`] | details → valuation | `NFT-xxxxxxxxx` |
//! | [`FtMintForm`] | single | `FT-xxxxxxxxx` |
//! | [`ListingForm`] | single | [`Listing`] |

use crate::error::{IssuerError, ParseError};
use crate::session::Session;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_LEN: usize = 9;
pub const DEFAULT_EARN_XP: u64 = 32_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AssetType {
    #[default]
    RealEstate,
    Invoice,
    Commodity,
}

impl AssetType {
    pub const ALL: [AssetType; 3] = [AssetType::RealEstate, AssetType::Invoice, AssetType::Commodity];

    pub fn label(&self) -> &'static str {
        match self {
            AssetType::RealEstate => "Real Estate",
            AssetType::Invoice => "Invoice",
            AssetType::Commodity => "Commodity",
        }
    }

    pub fn from_index(index: usize) -> Option<Self> { Self::ALL.get(index).copied() }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PriceToken {
    #[default]
    #[serde(rename = "USDC")]
    Usdc,
    #[serde(rename = "USDT")]
    Usdt,
}

impl PriceToken {
    pub fn as_str(&self) -> &'static str {
        match self { PriceToken::Usdc => "USDC", PriceToken::Usdt => "USDT" }
    }

}

impl FromStr for PriceToken {
    type Err = ParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "USDC" => Ok(PriceToken::Usdc),
            "USDT" => Ok(PriceToken::Usdt),
            _ => Err(ParseError::PriceToken(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Nft,
    Ft,
}

impl AssetKind {
    pub fn prefix(&self) -> &'static str {
        match self { AssetKind::Nft => "NFT", AssetKind::Ft => "FT" }
    }
}

/// Random stand-in for an on-chain object id.
pub fn mock_asset_id(kind: AssetKind) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("{}-{}", kind.prefix(), suffix)
}

fn require_ready(session: &Session) -> Result<(), IssuerError> {
    if session.is_ready() { Ok(()) } else { Err(IssuerError::NotReady) }
}

/// Parse a numeric form field; blank means "not provided".
fn parse_u64(field: &'static str, value: &str) -> Result<Option<u64>, IssuerError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<u64>()
        .map(Some)
        .map_err(|_| IssuerError::InvalidNumber { field, value: value.to_string() })
}

fn missing(fields: &[(&'static str, bool)]) -> Result<(), IssuerError> {
    let missing: Vec<&'static str> = fields.iter().filter(|(_, present)| !present).map(|(name, _)| *name).collect();
    if missing.is_empty() { Ok(()) } else { Err(IssuerError::MissingFields(missing)) }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintedAsset {
    pub id: String,
    pub kind: AssetKind,
    pub title: String,
    pub asset_type: AssetType,
    pub price_token: PriceToken,
    pub earn_xp: u64,
    pub owner: String,
    pub minted_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")] pub valuation: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")] pub maturity: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")] pub apy: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")] pub total_supply: Option<u64>,
}

// =============================================================================
// NFT WIZARD
// =============================================================================

/// Two-step NFT mint. Step 1 collects the description, step 2 the terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NftMintWizard {
    step: u8,
    pub title: String,
    pub description: String,
    /// File name of the uploaded image.
    pub image: Option<String>,
    pub asset_type: AssetType,
    pub price_token: PriceToken,
    pub earn_xp: String,
    pub valuation: String,
    pub maturity: Option<String>,
    pub apy: Option<String>,
}

impl Default for NftMintWizard {
    fn default() -> Self {
        Self {
            step: 1,
            title: String::new(),
            description: String::new(),
            image: None,
            asset_type: AssetType::default(),
            price_token: PriceToken::default(),
            earn_xp: DEFAULT_EARN_XP.to_string(),
            valuation: String::new(),
            maturity: None,
            apy: None,
        }
    }
}

impl NftMintWizard {
    pub fn new() -> Self { Self::default() }
    pub fn step(&self) -> u8 { self.step }

    /// Step 1 → 2. Title, description and image are required.
    pub fn next(&mut self) -> Result<(), IssuerError> {
        if self.step != 1 {
            return Err(IssuerError::WrongStep(self.step));
        }
        missing(&[
            ("title", !self.title.trim().is_empty()),
            ("description", !self.description.trim().is_empty()),
            ("image", self.image.is_some()),
        ])?;
        self.step = 2;
        Ok(())
    }

    /// Step 2 → 1, keeping every field.
    pub fn back(&mut self) {
        self.step = 1;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Fabricate the asset and reset the wizard.
    pub fn mint(&mut self, session: &Session) -> Result<MintedAsset, IssuerError> {
        require_ready(session)?;
        if self.step != 2 {
            return Err(IssuerError::WrongStep(self.step));
        }
        let earn_xp = parse_u64("earn_xp", &self.earn_xp)?.unwrap_or(DEFAULT_EARN_XP);
        let valuation = parse_u64("valuation", &self.valuation)?;
        let maturity = match &self.maturity { Some(v) => parse_u64("maturity", v)?, None => None };
        let apy = match &self.apy { Some(v) => parse_u64("apy", v)?, None => None };

        let asset = MintedAsset {
            id: mock_asset_id(AssetKind::Nft),
            kind: AssetKind::Nft,
            title: self.title.trim().to_string(),
            asset_type: self.asset_type,
            price_token: self.price_token,
            earn_xp,
            owner: session.account().map(|a| a.to_string()).unwrap_or_default(),
            minted_at: Utc::now(),
            valuation,
            maturity,
            apy,
            total_supply: None,
        };
        tracing::info!(id = %asset.id, title = %asset.title, "NFT minted");
        self.reset();
        Ok(asset)
    }
}

// =============================================================================
// FT FORM
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FtMintForm {
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub asset_type: AssetType,
    pub price_token: PriceToken,
    pub earn_xp: String,
    pub total_supply: String,
}

impl Default for FtMintForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            image: None,
            asset_type: AssetType::default(),
            price_token: PriceToken::default(),
            earn_xp: DEFAULT_EARN_XP.to_string(),
            total_supply: String::new(),
        }
    }
}

impl FtMintForm {
    pub fn new() -> Self { Self::default() }

    pub fn mint(&self, session: &Session) -> Result<MintedAsset, IssuerError> {
        require_ready(session)?;
        missing(&[
            ("title", !self.title.trim().is_empty()),
            ("description", !self.description.trim().is_empty()),
            ("total_supply", !self.total_supply.trim().is_empty()),
        ])?;
        let asset = MintedAsset {
            id: mock_asset_id(AssetKind::Ft),
            kind: AssetKind::Ft,
            title: self.title.trim().to_string(),
            asset_type: self.asset_type,
            price_token: self.price_token,
            earn_xp: parse_u64("earn_xp", &self.earn_xp)?.unwrap_or(DEFAULT_EARN_XP),
            owner: session.account().map(|a| a.to_string()).unwrap_or_default(),
            minted_at: Utc::now(),
            valuation: None,
            maturity: None,
            apy: None,
            total_supply: parse_u64("total_supply", &self.total_supply)?,
        };
        tracing::info!(id = %asset.id, title = %asset.title, "FT minted");
        Ok(asset)
    }
}

// =============================================================================
// LISTING
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub kind: AssetKind,
    pub asset_id: String,
    pub price: u64,
    pub seller: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingForm {
    pub kind: AssetKind,
    pub asset_id: String,
    pub price: String,
}

impl Default for ListingForm {
    fn default() -> Self {
        Self { kind: AssetKind::Nft, asset_id: String::new(), price: String::new() }
    }
}

impl ListingForm {
    pub fn new() -> Self { Self::default() }

    pub fn submit(&self, session: &Session) -> Result<Listing, IssuerError> {
        require_ready(session)?;
        missing(&[
            ("asset_id", !self.asset_id.trim().is_empty()),
            ("price", !self.price.trim().is_empty()),
        ])?;
        let price = parse_u64("price", &self.price)?.unwrap_or_default();
        let listing = Listing {
            kind: self.kind,
            asset_id: self.asset_id.trim().to_string(),
            price,
            seller: session.account().map(|a| a.to_string()).unwrap_or_default(),
        };
        tracing::info!(asset = %listing.asset_id, price, "asset listed");
        Ok(listing)
    }
}
