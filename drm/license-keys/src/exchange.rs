use core::fmt;

use drm_core::ContentKey;
use drm_license_proto::SignedMessage;
use drm_license_proto::signed_message::MessageType;
use tracing::{debug, debug_span, info, trace, warn};

use crate::codec::{MessageCodec, ProstCodec};
use crate::derive::derive_enc_key;
use crate::error::{EntryUnwrapError, ExchangeError, KeyResult, MessageKind};
use crate::provisioning::{DeviceKeys, KeyMaterial, KeyPair};
use crate::unwrap::unwrap_content_keys;

/**
    Progress of one exchange evaluation, in the only order it can advance.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExchangeStage {
    Idle,
    KeysReady,
    RequestDecoded,
    ResponseDecoded,
    SignatureVerified,
    SessionKeyUnwrapped,
    KeyDerived,
    Complete,
}

impl ExchangeStage {
    pub const fn to_name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::KeysReady => "keys-ready",
            Self::RequestDecoded => "request-decoded",
            Self::ResponseDecoded => "response-decoded",
            Self::SignatureVerified => "signature-verified",
            Self::SessionKeyUnwrapped => "session-key-unwrapped",
            Self::KeyDerived => "key-derived",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for ExchangeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_name())
    }
}

/**
    What to do when a single CONTENT entry cannot be unwrapped.
*/
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnwrapPolicy {
    /// Fail the whole exchange; no partial key list is returned.
    #[default]
    Abort,
    /// Log the entry and continue with the rest.
    Skip,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeOptions {
    pub unwrap_policy: UnwrapPolicy,
}

impl ExchangeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unwrap_policy(mut self, policy: UnwrapPolicy) -> Self {
        self.unwrap_policy = policy;
        self
    }
}

/**
    Result of evaluating one request/response pair.

    Only the key material itself can make an evaluation fatal; that is
    reported as `Err` by [`LicenseExchange::extract`]. Every per-exchange
    outcome, including failures, is a value of this type.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeOutcome {
    /**
        Content keys in license order. May be empty.

        `skipped` lists the CONTENT entries dropped under
        [`UnwrapPolicy::Skip`]; it is always empty under
        [`UnwrapPolicy::Abort`].
    */
    Extracted {
        keys: Vec<ContentKey>,
        skipped: Vec<EntryUnwrapError>,
    },
    /// The request is not a license request; nothing to do.
    NotApplicable { message_type: Option<i32> },
    /// The exchange was evaluated and yielded no keys.
    Failed(ExchangeError),
}

impl ExchangeOutcome {
    pub fn is_extracted(&self) -> bool {
        matches!(self, Self::Extracted { .. })
    }

    pub fn keys(&self) -> &[ContentKey] {
        match self {
            Self::Extracted { keys, .. } => keys,
            _ => &[],
        }
    }

    pub fn into_keys(self) -> Vec<ContentKey> {
        match self {
            Self::Extracted { keys, .. } => keys,
            _ => Vec::new(),
        }
    }

    /**
        Entries that failed to unwrap and were skipped rather than failing
        the exchange.
    */
    pub fn skipped(&self) -> &[EntryUnwrapError] {
        match self {
            Self::Extracted { skipped, .. } => skipped,
            _ => &[],
        }
    }

    /**
        The first extracted key, for callers that only want one.
    */
    pub fn first_key(&self) -> Option<&ContentKey> {
        self.keys().first()
    }

    pub fn error(&self) -> Option<&ExchangeError> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/**
    Content key extraction for captured license exchanges.

    Holds the device keys (imported lazily, exactly once) and evaluates
    request/response pairs against them. Shareable across threads; each
    evaluation owns its transient session and derived keys.

    ```ignore
    let exchange = LicenseExchange::new(KeyMaterial::from_files("device.pub.pem", "device.key.pem")?);
    match exchange.extract(&request, &response)? {
        ExchangeOutcome::Extracted { keys, .. } => keys.iter().for_each(|k| println!("{k}")),
        other => eprintln!("no keys: {other:?}"),
    }
    ```
*/
pub struct LicenseExchange<C = ProstCodec> {
    keys: DeviceKeys,
    codec: C,
    options: ExchangeOptions,
}

impl LicenseExchange<ProstCodec> {
    pub fn new(material: KeyMaterial) -> Self {
        Self::with_codec(material, ProstCodec)
    }
}

impl<C: MessageCodec> LicenseExchange<C> {
    pub fn with_codec(material: KeyMaterial, codec: C) -> Self {
        Self {
            keys: DeviceKeys::new(material),
            codec,
            options: ExchangeOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ExchangeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ExchangeOptions {
        &self.options
    }

    pub fn keys(&self) -> &DeviceKeys {
        &self.keys
    }

    /**
        Import and self-test the device keys if that has not happened yet.
    */
    pub fn ensure_initialized(&self) -> KeyResult<&KeyPair> {
        self.keys.ensure_initialized()
    }

    /**
        Evaluate one captured exchange: the raw bytes of a signed license
        request and of the signed response that answered it.

        The caller is responsible for pairing the two messages (for example
        by session id). `Err` means the device key material is unusable and
        no exchange can succeed until it is replaced.
    */
    pub fn extract(&self, request: &[u8], response: &[u8]) -> KeyResult<ExchangeOutcome> {
        let span = debug_span!(
            "license_exchange",
            request_len = request.len(),
            response_len = response.len()
        );
        let _guard = span.enter();

        let pair = self.keys.ensure_initialized()?;
        debug!(stage = %ExchangeStage::KeysReady);

        let outcome = match self.evaluate(pair, request, response) {
            Ok(ExchangeOutcome::Extracted { keys, skipped }) => {
                for key in &keys {
                    info!(kid = %hex::encode(key.kid()), "content key extracted");
                    trace!(key = %key, "content key");
                }
                debug!(
                    stage = %ExchangeStage::Complete,
                    count = keys.len(),
                    skipped = skipped.len()
                );
                ExchangeOutcome::Extracted { keys, skipped }
            }
            Ok(other) => other,
            Err(e) => {
                warn!(reason = %e, stage = %e.stage(), "license exchange failed");
                ExchangeOutcome::Failed(e)
            }
        };
        Ok(outcome)
    }

    fn evaluate(
        &self,
        pair: &KeyPair,
        request: &[u8],
        response: &[u8],
    ) -> Result<ExchangeOutcome, ExchangeError> {
        let request = self.decode(request, MessageKind::Request)?;
        if request.message_type() != Some(MessageType::LicenseRequest) {
            debug!(message_type = ?request.r#type, "request is not a license request");
            return Ok(ExchangeOutcome::NotApplicable {
                message_type: request.r#type,
            });
        }
        let request_msg = required(request.msg.as_deref(), MessageKind::Request, "msg")?;
        let signature = required(request.signature.as_deref(), MessageKind::Request, "signature")?;
        debug!(stage = %ExchangeStage::RequestDecoded, msg_len = request_msg.len());

        let response = self.decode(response, MessageKind::Response)?;
        if let Some(t) = response.r#type.filter(|&t| t != MessageType::License as i32) {
            return Err(ExchangeError::UnexpectedResponseType(t));
        }
        let license_msg = required(response.msg.as_deref(), MessageKind::Response, "msg")?;
        let license = self
            .codec
            .decode_license(license_msg)
            .map_err(|source| ExchangeError::Decode {
                message: MessageKind::License,
                source,
            })?;
        debug!(stage = %ExchangeStage::ResponseDecoded, entries = license.key.len());

        if !pair.verify_signature(request_msg, signature) {
            return Err(ExchangeError::SignatureMismatch);
        }
        debug!(stage = %ExchangeStage::SignatureVerified);

        let wrapped = response
            .session_key
            .as_deref()
            .ok_or(ExchangeError::SessionKeyMissing)?;
        let session_key = pair
            .unwrap_session_key(wrapped)
            .map_err(ExchangeError::SessionKeyDecryption)?;
        let session_key: [u8; 16] = session_key
            .as_slice()
            .try_into()
            .map_err(|_| ExchangeError::SessionKeyLength(session_key.len()))?;
        debug!(stage = %ExchangeStage::SessionKeyUnwrapped);

        let enc_key = derive_enc_key(&session_key, request_msg);
        debug!(stage = %ExchangeStage::KeyDerived);

        let mut keys = Vec::new();
        let mut skipped = Vec::new();
        for result in unwrap_content_keys(&license.key, &enc_key) {
            match (result, self.options.unwrap_policy) {
                (Ok(key), _) => keys.push(key),
                (Err(e), UnwrapPolicy::Abort) => return Err(e.into()),
                (Err(e), UnwrapPolicy::Skip) => {
                    warn!(reason = %e, "skipping content key entry");
                    skipped.push(e);
                }
            }
        }
        Ok(ExchangeOutcome::Extracted { keys, skipped })
    }

    fn decode(&self, bytes: &[u8], message: MessageKind) -> Result<SignedMessage, ExchangeError> {
        self.codec
            .decode_signed_message(bytes)
            .map_err(|source| ExchangeError::Decode { message, source })
    }
}

impl<C> fmt::Debug for LicenseExchange<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LicenseExchange")
            .field("keys", &self.keys)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

fn required<'a>(
    field: Option<&'a [u8]>,
    message: MessageKind,
    name: &'static str,
) -> Result<&'a [u8], ExchangeError> {
    field.ok_or(ExchangeError::MissingField {
        message,
        field: name,
    })
}
