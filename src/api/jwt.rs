use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::AuthConfig;
use crate::errors::SnaplinkError;
use crate::utils::generate_random_code;

/// Access Token Claims
///
/// 外部认证服务签发的 token 不一定带 `jti` / `token_type`，所以两者可缺省。
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    /// 用户 id
    pub sub: String,
    #[serde(default)]
    pub iat: i64,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

/// JWT Service for generating and validating tokens
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_minutes: u64,
}

impl JwtService {
    pub fn new(secret: &str, access_token_minutes: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_minutes,
        }
    }

    /// Create JwtService from config
    ///
    /// 未配置密钥时生成随机值，此时任何外部 token 都无法通过校验。
    pub fn from_config(config: &AuthConfig) -> Self {
        let secret = if config.jwt_secret.is_empty() {
            warn!("JWT secret not configured, generating a random one; external tokens will be rejected");
            generate_random_code(48)
        } else {
            config.jwt_secret.clone()
        };

        Self::new(&secret, config.access_token_minutes)
    }

    /// 为指定用户签发 access token
    pub fn generate_access_token(
        &self,
        user_id: &str,
        minutes: Option<u64>,
    ) -> crate::errors::Result<String> {
        let now = Utc::now();
        let minutes = minutes.unwrap_or(self.access_token_minutes);
        let expires_at = i64::try_from(minutes)
            .ok()
            .and_then(Duration::try_minutes)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                SnaplinkError::validation(format!(
                    "Token lifetime out of range: {} minutes",
                    minutes
                ))
            })?;

        let claims = AccessClaims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Some(uuid::Uuid::new_v4().to_string()),
            token_type: Some("access".to_string()),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| SnaplinkError::server(format!("Failed to sign token: {}", e)))
    }

    /// Validate Access Token
    pub fn validate_access_token(
        &self,
        token: &str,
    ) -> Result<AccessClaims, jsonwebtoken::errors::Error> {
        let token_data = decode::<AccessClaims>(token, &self.decoding_key, &Validation::default())?;

        // refresh token 之类的其他类型不能当 access token 用
        if token_data
            .claims
            .token_type
            .as_deref()
            .is_some_and(|t| t != "access")
        {
            return Err(jsonwebtoken::errors::Error::from(
                jsonwebtoken::errors::ErrorKind::InvalidToken,
            ));
        }

        if token_data.claims.sub.is_empty() {
            return Err(jsonwebtoken::errors::Error::from(
                jsonwebtoken::errors::ErrorKind::InvalidSubject,
            ));
        }

        Ok(token_data.claims)
    }
}
