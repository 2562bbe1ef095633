//! Receipt assembly and the chain-wrapper seam.

use serde_json::Value;
use sha2::{Digest, Sha256};
use vantage_config::DEFAULT_CHAIN_NAME;
use vantage_types::{AuditAction, ChainInfo, PathSummary, Receipt, SessionId, VantageError};

use crate::Session;

/// Wraps a session snapshot into a verifiable chain.
///
/// The engine treats the returned [`ChainInfo`] as opaque and embeds it in
/// the receipt unchanged.
pub trait ChainWrapper: Send + Sync {
    fn wrap(&self, chain_name: &str, snapshot: &Value) -> Result<ChainInfo, VantageError>;
}

/// Chain name for a session: `vp_` plus the first 8 characters of its id.
#[must_use]
pub fn chain_name_for(id: &SessionId) -> String {
    format!("vp_{}", id.short())
}

/// In-process SHA-256 hash chain.
///
/// Links are the snapshot's audit entries in order followed by the snapshot
/// itself. Each link hashes the previous link's digest with the entry's
/// canonical JSON; the first link starts from the digest of the scoped chain
/// name `{namespace}/{chain_name}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalChain {
    namespace: String,
}

impl Default for LocalChain {
    fn default() -> Self {
        Self::new(DEFAULT_CHAIN_NAME)
    }
}

impl LocalChain {
    /// Chains are scoped under `namespace`, the configured `[chain] name`.
    #[must_use]
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    fn scoped(&self, chain_name: &str) -> String {
        format!("{}/{chain_name}", self.namespace)
    }

    fn links(snapshot: &Value) -> Result<Vec<Vec<u8>>, VantageError> {
        let mut links = Vec::new();
        if let Some(entries) = snapshot.get("audit_log").and_then(Value::as_array) {
            for entry in entries {
                links.push(encode(entry)?);
            }
        }
        links.push(encode(snapshot)?);
        Ok(links)
    }

    fn digest_chain(scoped: &str, links: &[Vec<u8>]) -> Vec<String> {
        let mut previous = hex_digest(scoped.as_bytes());
        let mut digests = Vec::with_capacity(links.len());
        for link in links {
            previous = link_digest(&previous, link);
            digests.push(previous.clone());
        }
        digests
    }

    /// Check `info` against `snapshot` from scratch.
    ///
    /// Rebuilds every link from the snapshot, then walks the digests recorded
    /// in `info.receipt`, confirming each follows from its predecessor and
    /// that the root, length and id match. Any tampering with the snapshot or
    /// the recorded chain yields `false`.
    #[must_use]
    pub fn verify(&self, chain_name: &str, snapshot: &Value, info: &ChainInfo) -> bool {
        let Ok(links) = Self::links(snapshot) else {
            return false;
        };
        let recorded: Vec<&str> = info.receipt.split(':').collect();
        if recorded.len() != links.len() || info.chain_length != links.len() {
            return false;
        }
        if recorded.last().copied() != Some(info.chain_root.as_str()) {
            return false;
        }

        let scoped = self.scoped(chain_name);
        let mut previous = hex_digest(scoped.as_bytes());
        for (link, digest) in links.iter().zip(&recorded) {
            if link_digest(&previous, link) != *digest {
                return false;
            }
            previous = (*digest).to_string();
        }
        info.chain_id == chain_id(&scoped, &info.chain_root)
    }
}

impl ChainWrapper for LocalChain {
    fn wrap(&self, chain_name: &str, snapshot: &Value) -> Result<ChainInfo, VantageError> {
        let scoped = self.scoped(chain_name);
        let digests = Self::digest_chain(&scoped, &Self::links(snapshot)?);
        let Some(root) = digests.last().cloned() else {
            return Err(VantageError::external("chain produced no links"));
        };
        let mut info = ChainInfo {
            chain_id: chain_id(&scoped, &root),
            chain_root: root,
            chain_length: digests.len(),
            chain_verified: false,
            receipt: digests.join(":"),
        };
        info.chain_verified = self.verify(chain_name, snapshot, &info);
        tracing::debug!(
            chain_id = %info.chain_id,
            chain_length = info.chain_length,
            chain_verified = info.chain_verified,
            "Snapshot wrapped"
        );
        Ok(info)
    }
}

fn chain_id(scoped: &str, root: &str) -> String {
    format!("{scoped}-{}", root.get(..16).unwrap_or(root))
}

fn encode(value: &Value) -> Result<Vec<u8>, VantageError> {
    serde_json::to_vec(value)
        .map_err(|e| VantageError::external(format!("failed to encode chain entry: {e}")))
}

fn link_digest(previous: &str, link: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(previous.as_bytes());
    hasher.update(link);
    to_hex(&hasher.finalize())
}

fn hex_digest(bytes: &[u8]) -> String {
    to_hex(&Sha256::digest(bytes))
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

impl Session {
    /// Wrap a snapshot of the session through `chain` and assemble the receipt.
    ///
    /// Allowed in any phase. The receipt's audit log is the history up to this
    /// call; the `receipt_generated` event is appended afterwards.
    pub fn generate_receipt(&mut self, chain: &dyn ChainWrapper) -> Result<Receipt, VantageError> {
        let snapshot = serde_json::to_value(&*self)
            .map_err(|e| VantageError::external(format!("failed to snapshot session: {e}")))?;
        let chain_info = chain.wrap(&chain_name_for(&self.id), &snapshot)?;

        let receipt = Receipt {
            session_id: self.id.clone(),
            mode: self.mode,
            created_at: self.created_at,
            friction: self.friction.clone(),
            friction_statement: self.friction_statement.clone(),
            territory: self.territory.counts(),
            discoveries: self.discoveries.clone(),
            assumptions: self.assumptions.clone(),
            goal: self.goal.clone(),
            paths: self
                .paths()
                .iter()
                .map(|p| PathSummary {
                    path_id: p.path_id,
                    label: p.label.clone(),
                    risk: p.risk,
                })
                .collect(),
            chosen_path: self.chosen_path.as_ref().map(|p| p.path_id),
            chain: chain_info,
            audit_log: self.audit_log.clone(),
        };

        self.audit_log.record(AuditAction::ReceiptGenerated {
            chain_id: receipt.chain.chain_id.clone(),
        });
        tracing::info!(
            session_id = %self.id,
            chain_id = %receipt.chain.chain_id,
            "Receipt generated"
        );
        Ok(receipt)
    }
}
