/// Value objects for the settings domain
use serde::{Deserialize, Serialize};

/// Configuration category a setting belongs to
///
/// Stored as the SCREAMING string form in the `field` varchar column and
/// parsed on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SettingField {
    Payment,
    Logistics,
    Notification,
    Cdn,
    Company,
    Crm,
    Mail,
    Bucket,
}

impl SettingField {
    pub const ALL: [SettingField; 8] = [
        SettingField::Payment,
        SettingField::Logistics,
        SettingField::Notification,
        SettingField::Cdn,
        SettingField::Company,
        SettingField::Crm,
        SettingField::Mail,
        SettingField::Bucket,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SettingField::Payment => "PAYMENT",
            SettingField::Logistics => "LOGISTICS",
            SettingField::Notification => "NOTIFICATION",
            SettingField::Cdn => "CDN",
            SettingField::Company => "COMPANY",
            SettingField::Crm => "CRM",
            SettingField::Mail => "MAIL",
            SettingField::Bucket => "BUCKET",
        }
    }
}

impl std::fmt::Display for SettingField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SettingField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PAYMENT" => Ok(SettingField::Payment),
            "LOGISTICS" => Ok(SettingField::Logistics),
            "NOTIFICATION" => Ok(SettingField::Notification),
            "CDN" => Ok(SettingField::Cdn),
            "COMPANY" => Ok(SettingField::Company),
            "CRM" => Ok(SettingField::Crm),
            "MAIL" => Ok(SettingField::Mail),
            "BUCKET" => Ok(SettingField::Bucket),
            _ => Err(format!("Invalid settings field: {}", s)),
        }
    }
}

/// Where a resolved setting record came from
///
/// `EnvironmentDerived` records are synthesized from environment variables and
/// never persisted; callers branch on this instead of the `settings_id = 0`
/// sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingSource {
    Persisted,
    EnvironmentDerived,
}

/// Outcome of the decrypt-on-read step
///
/// Decryption failure is non-fatal: the stale plaintext `value` is kept and the
/// degraded path stays observable through this state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialState {
    /// `value` was replaced with the decrypted credentials payload
    Decrypted,
    /// Decryption or parsing failed; the stored plaintext `value` was kept
    KeptStale,
    /// The record carries no credentials
    Absent,
}
