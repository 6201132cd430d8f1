use serde::{Deserialize, Serialize};
use std::fmt;

/// A market aggregation point over which flexibility is forecast, ordered and
/// settled. Identified by its unique address string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionGroup {
    /// A congestion point on the distribution grid, identified by an
    /// EAN-style entity address.
    CongestionPoint { entity_address: String },
    /// The connection portfolio of a balance responsible party, identified
    /// by its internet domain.
    BrpDomain { domain: String },
}

impl ConnectionGroup {
    pub fn congestion_point(entity_address: impl Into<String>) -> Self {
        Self::CongestionPoint { entity_address: entity_address.into() }
    }

    pub fn brp_domain(domain: impl Into<String>) -> Self {
        Self::BrpDomain { domain: domain.into() }
    }

    /// The unique address identifying this group.
    pub fn entity_address(&self) -> &str {
        match self {
            Self::CongestionPoint { entity_address } => entity_address,
            Self::BrpDomain { domain } => domain,
        }
    }
}

impl fmt::Display for ConnectionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CongestionPoint { entity_address } => {
                write!(f, "congestion point {entity_address}")
            }
            Self::BrpDomain { domain } => write!(f, "BRP domain {domain}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_address() {
        let cp = ConnectionGroup::congestion_point("ean.12340001");
        assert_eq!(cp.entity_address(), "ean.12340001");

        let brp = ConnectionGroup::brp_domain("brp.usef-example.com");
        assert_eq!(brp.entity_address(), "brp.usef-example.com");
    }

    #[test]
    fn test_display() {
        let cp = ConnectionGroup::congestion_point("ean.12340001");
        assert_eq!(cp.to_string(), "congestion point ean.12340001");
    }
}
