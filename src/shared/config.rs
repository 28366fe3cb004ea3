/// Typed environment fallback configuration
///
/// When no setting row exists for a field, resolution falls back to a snapshot
/// of conventional environment variables. Each field category gets its own
/// statically-typed struct with named optional values; "is this fallback
/// usable" is a predicate over those named fields, never map introspection.
/// Identity attributes (provider) do not count towards usability.
use serde_json::{Map, Value};
use std::env;

/// Read an environment variable, treating empty strings as absent
fn env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

fn env_or(name: &str, default: &str) -> String {
    env_opt(name).unwrap_or_else(|| default.to_string())
}

fn insert_opt(map: &mut Map<String, Value>, key: &str, value: &Option<String>) {
    if let Some(v) = value {
        map.insert(key.to_string(), Value::String(v.clone()));
    }
}

/// Common surface over the per-field fallback structs
pub trait FallbackSource {
    /// Vendor name for the synthesized record
    fn provider(&self) -> &str;

    /// Non-identity values present in the environment
    fn value_map(&self) -> Map<String, Value>;

    /// Usable only if at least one non-identity value is set
    fn has_values(&self) -> bool {
        !self.value_map().is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PaymentFallback {
    pub provider: String,
    pub gateway_key: Option<String>,
    pub gateway_token: Option<String>,
    pub webhook_secret: Option<String>,
}

impl PaymentFallback {
    pub fn from_env() -> Self {
        Self {
            provider: env_or("PAYMENT_PROVIDER", "environment"),
            gateway_key: env_opt("PAYMENT_GATEWAY_KEY"),
            gateway_token: env_opt("PAYMENT_GATEWAY_TOKEN"),
            webhook_secret: env_opt("PAYMENT_WEBHOOK_SECRET"),
        }
    }
}

impl FallbackSource for PaymentFallback {
    fn provider(&self) -> &str {
        &self.provider
    }

    fn value_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        insert_opt(&mut map, "gateway_key", &self.gateway_key);
        insert_opt(&mut map, "gateway_token", &self.gateway_token);
        insert_opt(&mut map, "webhook_secret", &self.webhook_secret);
        map
    }
}

#[derive(Debug, Clone, Default)]
pub struct LogisticsFallback {
    pub provider: String,
    pub token: Option<String>,
    pub password: Option<String>,
    pub contract: Option<String>,
}

impl LogisticsFallback {
    pub fn from_env() -> Self {
        Self {
            provider: env_or("LOGISTICS_PROVIDER", "environment"),
            token: env_opt("LOGISTICS_TOKEN"),
            password: env_opt("LOGISTICS_PASSWORD"),
            contract: env_opt("LOGISTICS_CONTRACT"),
        }
    }
}

impl FallbackSource for LogisticsFallback {
    fn provider(&self) -> &str {
        &self.provider
    }

    fn value_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        insert_opt(&mut map, "token", &self.token);
        insert_opt(&mut map, "password", &self.password);
        insert_opt(&mut map, "contract", &self.contract);
        map
    }
}

#[derive(Debug, Clone, Default)]
pub struct NotificationFallback {
    pub provider: String,
    pub api_key: Option<String>,
    pub sender_id: Option<String>,
}

impl NotificationFallback {
    pub fn from_env() -> Self {
        Self {
            provider: env_or("NOTIFICATION_PROVIDER", "environment"),
            api_key: env_opt("NOTIFICATION_API_KEY"),
            sender_id: env_opt("NOTIFICATION_SENDER_ID"),
        }
    }
}

impl FallbackSource for NotificationFallback {
    fn provider(&self) -> &str {
        &self.provider
    }

    fn value_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        insert_opt(&mut map, "api_key", &self.api_key);
        insert_opt(&mut map, "sender_id", &self.sender_id);
        map
    }
}

#[derive(Debug, Clone, Default)]
pub struct CdnFallback {
    pub provider: String,
    pub base_url: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

impl CdnFallback {
    pub fn from_env() -> Self {
        Self {
            provider: env_or("CDN_PROVIDER", "environment"),
            base_url: env_opt("CDN_BASE_URL"),
            access_key: env_opt("CDN_ACCESS_KEY"),
            secret_key: env_opt("CDN_SECRET_KEY"),
        }
    }
}

impl FallbackSource for CdnFallback {
    fn provider(&self) -> &str {
        &self.provider
    }

    fn value_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        insert_opt(&mut map, "base_url", &self.base_url);
        insert_opt(&mut map, "access_key", &self.access_key);
        insert_opt(&mut map, "secret_key", &self.secret_key);
        map
    }
}

#[derive(Debug, Clone, Default)]
pub struct CompanyFallback {
    pub provider: String,
    pub name: Option<String>,
    pub trade_name: Option<String>,
    pub tax_id: Option<String>,
}

impl CompanyFallback {
    pub fn from_env() -> Self {
        Self {
            provider: env_or("COMPANY_PROVIDER", "environment"),
            name: env_opt("COMPANY_NAME"),
            trade_name: env_opt("COMPANY_TRADE_NAME"),
            tax_id: env_opt("COMPANY_TAX_ID"),
        }
    }
}

impl FallbackSource for CompanyFallback {
    fn provider(&self) -> &str {
        &self.provider
    }

    fn value_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        insert_opt(&mut map, "name", &self.name);
        insert_opt(&mut map, "trade_name", &self.trade_name);
        insert_opt(&mut map, "tax_id", &self.tax_id);
        map
    }
}

#[derive(Debug, Clone, Default)]
pub struct CrmFallback {
    pub provider: String,
    pub api_key: Option<String>,
    pub domain: Option<String>,
}

impl CrmFallback {
    pub fn from_env() -> Self {
        Self {
            provider: env_or("CRM_PROVIDER", "environment"),
            api_key: env_opt("CRM_API_KEY"),
            domain: env_opt("CRM_DOMAIN"),
        }
    }
}

impl FallbackSource for CrmFallback {
    fn provider(&self) -> &str {
        &self.provider
    }

    fn value_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        insert_opt(&mut map, "api_key", &self.api_key);
        insert_opt(&mut map, "domain", &self.domain);
        map
    }
}

#[derive(Debug, Clone, Default)]
pub struct MailFallback {
    pub provider: String,
    pub smtp_host: Option<String>,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
    pub api_key: Option<String>,
}

impl MailFallback {
    pub fn from_env() -> Self {
        Self {
            provider: env_or("MAIL_PROVIDER", "environment"),
            smtp_host: env_opt("MAIL_SMTP_HOST"),
            smtp_user: env_opt("MAIL_SMTP_USER"),
            smtp_password: env_opt("MAIL_SMTP_PASSWORD"),
            api_key: env_opt("MAIL_API_KEY"),
        }
    }
}

impl FallbackSource for MailFallback {
    fn provider(&self) -> &str {
        &self.provider
    }

    fn value_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        insert_opt(&mut map, "smtp_host", &self.smtp_host);
        insert_opt(&mut map, "smtp_user", &self.smtp_user);
        insert_opt(&mut map, "smtp_password", &self.smtp_password);
        insert_opt(&mut map, "api_key", &self.api_key);
        map
    }
}

#[derive(Debug, Clone, Default)]
pub struct BucketFallback {
    pub provider: String,
    pub bucket_name: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub region: Option<String>,
}

impl BucketFallback {
    pub fn from_env() -> Self {
        Self {
            provider: env_or("BUCKET_PROVIDER", "environment"),
            bucket_name: env_opt("BUCKET_NAME"),
            access_key_id: env_opt("BUCKET_ACCESS_KEY_ID"),
            secret_access_key: env_opt("BUCKET_SECRET_ACCESS_KEY"),
            region: env_opt("BUCKET_REGION"),
        }
    }
}

impl FallbackSource for BucketFallback {
    fn provider(&self) -> &str {
        &self.provider
    }

    fn value_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        insert_opt(&mut map, "bucket_name", &self.bucket_name);
        insert_opt(&mut map, "access_key_id", &self.access_key_id);
        insert_opt(&mut map, "secret_access_key", &self.secret_access_key);
        insert_opt(&mut map, "region", &self.region);
        map
    }
}

/// Snapshot of all per-field environment fallbacks, taken once at startup and
/// injected into the settings service
#[derive(Debug, Clone, Default)]
pub struct FallbackSettings {
    pub payment: PaymentFallback,
    pub logistics: LogisticsFallback,
    pub notification: NotificationFallback,
    pub cdn: CdnFallback,
    pub company: CompanyFallback,
    pub crm: CrmFallback,
    pub mail: MailFallback,
    pub bucket: BucketFallback,
}

impl FallbackSettings {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self {
            payment: PaymentFallback::from_env(),
            logistics: LogisticsFallback::from_env(),
            notification: NotificationFallback::from_env(),
            cdn: CdnFallback::from_env(),
            company: CompanyFallback::from_env(),
            crm: CrmFallback::from_env(),
            mail: MailFallback::from_env(),
            bucket: BucketFallback::from_env(),
        }
    }
}
