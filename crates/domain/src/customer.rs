//! Customer contact details and shipping addresses.

use serde::{Deserialize, Serialize};

/// Contact details captured at checkout time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Shipping address frozen into the reservation and the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub line1: String,
    #[serde(default)]
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, ", self.line1)?;
        if let Some(line2) = &self.line2 {
            write!(f, "{line2}, ")?;
        }
        write!(f, "{} {}, {}", self.city, self.state, self.postal_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_display() {
        let addr = Address {
            line1: "12 MG Road".to_string(),
            line2: None,
            city: "Bengaluru".to_string(),
            state: "KA".to_string(),
            postal_code: "560001".to_string(),
        };
        assert_eq!(addr.to_string(), "12 MG Road, Bengaluru KA, 560001");
    }
}
