// src/models/carrier.rs

//! Carrier guesses and the table of user-selectable carriers.

use serde::{Deserialize, Serialize};

/// Confidence assigned to a carrier the user picked by hand.
pub const MANUAL_CONFIDENCE: u8 = 5;

/// A carrier selectable by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownCarrier {
    pub code: &'static str,
    pub name: &'static str,
}

/// Carriers offered for manual selection.
pub const KNOWN_CARRIERS: &[KnownCarrier] = &[
    KnownCarrier { code: "dhl", name: "DHL" },
    KnownCarrier { code: "ups", name: "UPS" },
    KnownCarrier { code: "fedex", name: "FedEx" },
    KnownCarrier { code: "swisspost", name: "Swiss Post" },
    KnownCarrier { code: "chinapost", name: "China Post" },
    KnownCarrier { code: "tnt", name: "TNT" },
    KnownCarrier { code: "deutschepost", name: "Deutsche Post" },
    KnownCarrier { code: "hermes", name: "Hermes" },
    KnownCarrier { code: "dpd", name: "DPD" },
];

/// Look up the display name of a selectable carrier.
pub fn carrier_name(code: &str) -> Option<&'static str> {
    KNOWN_CARRIERS
        .iter()
        .find(|c| c.code == code)
        .map(|c| c.name)
}

/// A guess of which carrier issued a tracking number.
///
/// `confidence` is informational only; detection is first-match-wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarrierGuess {
    pub code: String,
    pub name: String,
    pub confidence: u8,
}

impl CarrierGuess {
    pub fn new(code: impl Into<String>, name: impl Into<String>, confidence: u8) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            confidence,
        }
    }

    /// Guess for a carrier chosen by the user.
    pub fn manual(code: &str) -> Self {
        let code = code.trim().to_lowercase();
        let name = carrier_name(&code)
            .map(str::to_string)
            .unwrap_or_else(|| code.to_uppercase());
        Self::new(code, name, MANUAL_CONFIDENCE)
    }
}
