//! Asset descriptors and liquidity pool identifiers.
//!
//! Pool identifiers are a pure function of the ordered asset pair and the
//! fee rate. No registry lookup is needed to compute them client-side.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::cmp::Ordering;

/// Standard liquidity pool fee: 30 basis points.
pub const POOL_FEE_BPS: u32 = 30;

/// An asset on the ledger: the native token, or a custom token identified
/// by its (code, issuer) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Asset {
    Native,
    Issued { code: String, issuer: String },
}

impl Asset {
    /// Define a custom asset. Pure local computation, no network call.
    pub fn issued(code: impl Into<String>, issuer: impl Into<String>) -> Self {
        Asset::Issued {
            code: code.into(),
            issuer: issuer.into(),
        }
    }

    /// Asset codes are 1-12 alphanumeric characters.
    pub fn is_valid_code(code: &str) -> bool {
        !code.is_empty() && code.len() <= 12 && code.chars().all(|c| c.is_ascii_alphanumeric())
    }

    /// Hash the asset into a pool id preimage.
    fn hash_into(&self, hasher: &mut Sha256) {
        match self {
            Asset::Native => {
                hasher.update([0u8]);
            }
            Asset::Issued { code, issuer } => {
                hasher.update([1u8]);
                hasher.update((code.len() as u32).to_be_bytes());
                hasher.update(code.as_bytes());
                hasher.update(issuer.as_bytes());
            }
        }
    }
}

/// Canonical asset ordering: native first, then by code, then by issuer.
impl Ord for Asset {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Asset::Native, Asset::Native) => Ordering::Equal,
            (Asset::Native, Asset::Issued { .. }) => Ordering::Less,
            (Asset::Issued { .. }, Asset::Native) => Ordering::Greater,
            (
                Asset::Issued { code: ca, issuer: ia },
                Asset::Issued { code: cb, issuer: ib },
            ) => ca.cmp(cb).then_with(|| ia.cmp(ib)),
        }
    }
}

impl PartialOrd for Asset {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Asset::Native => write!(f, "native"),
            Asset::Issued { code, issuer } => write!(f, "{}:{}", code, issuer),
        }
    }
}

/// The target of a trust relationship: a custom asset, or the share token
/// of a liquidity pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustTarget {
    Asset(Asset),
    Pool(PoolId),
}

impl std::fmt::Display for TrustTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrustTarget::Asset(asset) => write!(f, "{}", asset),
            TrustTarget::Pool(pool_id) => write!(f, "pool:{}", pool_id),
        }
    }
}

/// What a trust-creating operation targets. A pool is specified by its
/// full parameters (the ledger derives the identifier), while existing
/// balances reference the identifier alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeTrustLine {
    Asset(Asset),
    Pool(LiquidityPool),
}

impl ChangeTrustLine {
    /// The balance line this trust relationship creates.
    pub fn target(&self) -> TrustTarget {
        match self {
            ChangeTrustLine::Asset(asset) => TrustTarget::Asset(asset.clone()),
            ChangeTrustLine::Pool(pool) => TrustTarget::Pool(pool.id()),
        }
    }
}

/// Identifier of a liquidity pool, derived deterministically from the pool
/// parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoolId(#[serde(with = "pool_id_hex")] pub [u8; 32]);

impl std::fmt::Display for PoolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

mod pool_id_hex {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 32], D::Error> {
        let text = String::deserialize(deserializer)?;
        let decoded = hex::decode(&text).map_err(serde::de::Error::custom)?;
        decoded
            .try_into()
            .map_err(|_| serde::de::Error::custom("pool id must be 32 bytes"))
    }
}

/// A liquidity pool over an ordered pair of assets plus a fee rate.
///
/// The constructor enforces canonical ordering, so the descriptor (and its
/// id) is identical regardless of the order the two assets are supplied in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityPool {
    pub asset_a: Asset,
    pub asset_b: Asset,
    pub fee_bps: u32,
}

impl LiquidityPool {
    pub fn new(first: Asset, second: Asset, fee_bps: u32) -> Self {
        let (asset_a, asset_b) = if first <= second {
            (first, second)
        } else {
            (second, first)
        };
        Self {
            asset_a,
            asset_b,
            fee_bps,
        }
    }

    /// Derive the pool identifier: SHA-256 over a domain-separated encoding
    /// of the ordered assets and the fee rate.
    pub fn id(&self) -> PoolId {
        let mut hasher = Sha256::new();
        hasher.update(b"liquidity_pool/constant_product");
        self.asset_a.hash_into(&mut hasher);
        self.asset_b.hash_into(&mut hasher);
        hasher.update(self.fee_bps.to_be_bytes());
        PoolId(hasher.finalize().into())
    }
}
