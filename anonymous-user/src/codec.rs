use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::errors::CodecError;

/// Serialises the anonymous identifier into a cookie-safe token and back.
///
/// Implementations must be stateless: a single instance is shared by every
/// in-flight request. Blank input (empty or whitespace only) is "no value" in
/// both directions and yields `Ok(None)`.
#[async_trait]
pub trait CookieCodec: Send + Sync {
    /// Turns a clear text identifier into a cookie value.
    async fn encode(&self, value: &str) -> Result<Option<String>, CodecError>;

    /// Turns a cookie value back into the clear text identifier.
    async fn decode(&self, encoded: &str) -> Result<Option<String>, CodecError>;
}

/// Standard padded base64 over the UTF-8 bytes of the identifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64CookieCodec;

#[async_trait]
impl CookieCodec for Base64CookieCodec {
    async fn encode(&self, value: &str) -> Result<Option<String>, CodecError> {
        if value.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(STANDARD.encode(value.as_bytes())))
    }

    async fn decode(&self, encoded: &str) -> Result<Option<String>, CodecError> {
        let encoded = encoded.trim();
        if encoded.is_empty() {
            return Ok(None);
        }

        let bytes = STANDARD.decode(encoded)?;
        Ok(Some(String::from_utf8(bytes)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip() {
        let codec = Base64CookieCodec;
        for value in ["RANDOM", "0f8fad5b-d9cb-469f-a165-70867728950e", "ünïcødé ☃", " padded "] {
            let encoded = codec.encode(value).await.unwrap().expect("encoded value");
            let decoded = codec.decode(&encoded).await.unwrap();
            assert_eq!(decoded.as_deref(), Some(value));
        }
    }

    #[tokio::test]
    async fn test_known_encoding() {
        let codec = Base64CookieCodec;
        assert_eq!(
            codec.encode("RANDOM").await.unwrap().as_deref(),
            Some("UkFORE9N")
        );
        // Padding is kept
        assert_eq!(codec.encode("ab").await.unwrap().as_deref(), Some("YWI="));
    }

    #[tokio::test]
    async fn test_blank_values() {
        let codec = Base64CookieCodec;
        for blank in ["", " ", "\t\n"] {
            assert!(codec.encode(blank).await.unwrap().is_none());
            assert!(codec.decode(blank).await.unwrap().is_none());
        }
    }

    #[tokio::test]
    async fn test_invalid_token() {
        let codec = Base64CookieCodec;
        assert!(matches!(
            codec.decode("not base64!").await,
            Err(CodecError::Base64(_))
        ));
        // 0xff 0xfe is not valid UTF-8
        assert!(matches!(
            codec.decode("//4=").await,
            Err(CodecError::Utf8(_))
        ));
    }
}
