// Subset of license_protocol.proto (proto2). Field tags follow the upstream schema.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum LicenseType {
    Streaming = 1,
    Offline = 2,
    /// License type decision is left to provider.
    Automatic = 3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ProtocolVersion {
    Version20 = 20,
    Version21 = 21,
    Version22 = 22,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LicenseIdentification {
    #[prost(bytes = "vec", optional, tag = "1")]
    pub request_id: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub session_id: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "3")]
    pub purchase_id: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
    #[prost(enumeration = "LicenseType", optional, tag = "4")]
    pub r#type: ::core::option::Option<i32>,
    #[prost(int32, optional, tag = "5")]
    pub version: ::core::option::Option<i32>,
    #[prost(bytes = "vec", optional, tag = "6")]
    pub provider_session_token: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct License {
    #[prost(message, optional, tag = "1")]
    pub id: ::core::option::Option<LicenseIdentification>,
    #[prost(message, repeated, tag = "3")]
    pub key: ::prost::alloc::vec::Vec<license::KeyContainer>,
    #[prost(int64, optional, tag = "4")]
    pub license_start_time: ::core::option::Option<i64>,
    #[prost(bytes = "vec", optional, tag = "6")]
    pub provider_client_token: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
    #[prost(uint32, optional, tag = "7")]
    pub protection_scheme: ::core::option::Option<u32>,
}

/// Nested message and enum types in `License`.
pub mod license {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct KeyContainer {
        #[prost(bytes = "vec", optional, tag = "1")]
        pub id: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
        #[prost(bytes = "vec", optional, tag = "2")]
        pub iv: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
        #[prost(bytes = "vec", optional, tag = "3")]
        pub key: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
        #[prost(enumeration = "key_container::KeyType", optional, tag = "4")]
        pub r#type: ::core::option::Option<i32>,
        #[prost(enumeration = "key_container::SecurityLevel", optional, tag = "5")]
        pub level: ::core::option::Option<i32>,
        #[prost(message, optional, tag = "8")]
        pub key_control: ::core::option::Option<key_container::KeyControl>,
        #[prost(message, optional, tag = "9")]
        pub operator_session_key_permissions:
            ::core::option::Option<key_container::OperatorSessionKeyPermissions>,
        #[prost(string, optional, tag = "12")]
        pub track_label: ::core::option::Option<::prost::alloc::string::String>,
    }

    /// Nested message and enum types in `KeyContainer`.
    pub mod key_container {
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct KeyControl {
            #[prost(bytes = "vec", optional, tag = "1")]
            pub key_control_block: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
            #[prost(bytes = "vec", optional, tag = "2")]
            pub iv: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
        }

        #[derive(Clone, Copy, PartialEq, ::prost::Message)]
        pub struct OperatorSessionKeyPermissions {
            #[prost(bool, optional, tag = "1")]
            pub allow_encrypt: ::core::option::Option<bool>,
            #[prost(bool, optional, tag = "2")]
            pub allow_decrypt: ::core::option::Option<bool>,
            #[prost(bool, optional, tag = "3")]
            pub allow_sign: ::core::option::Option<bool>,
            #[prost(bool, optional, tag = "4")]
            pub allow_signature_verify: ::core::option::Option<bool>,
        }

        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration,
        )]
        #[repr(i32)]
        pub enum KeyType {
            /// Exactly one key of this type must appear.
            Signing = 1,
            /// Content key.
            Content = 2,
            /// Key control block for license renewals. No key.
            KeyControl = 3,
            /// wrapped keys for auxiliary crypto operations.
            OperatorSession = 4,
            /// Entitlement keys.
            Entitlement = 5,
            /// Partner-specific content key.
            OemContent = 6,
        }

        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration,
        )]
        #[repr(i32)]
        pub enum SecurityLevel {
            SwSecureCrypto = 1,
            SwSecureDecode = 2,
            HwSecureCrypto = 3,
            HwSecureDecode = 4,
            HwSecureAll = 5,
        }
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LicenseRequest {
    #[prost(enumeration = "license_request::RequestType", optional, tag = "3")]
    pub r#type: ::core::option::Option<i32>,
    #[prost(int64, optional, tag = "4")]
    pub request_time: ::core::option::Option<i64>,
    #[prost(bytes = "vec", optional, tag = "5")]
    pub key_control_nonce_deprecated: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
    #[prost(enumeration = "ProtocolVersion", optional, tag = "6")]
    pub protocol_version: ::core::option::Option<i32>,
    #[prost(uint32, optional, tag = "7")]
    pub key_control_nonce: ::core::option::Option<u32>,
}

/// Nested message and enum types in `LicenseRequest`.
pub mod license_request {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum RequestType {
        New = 1,
        Renewal = 2,
        Release = 3,
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SignedMessage {
    #[prost(enumeration = "signed_message::MessageType", optional, tag = "1")]
    pub r#type: ::core::option::Option<i32>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub msg: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "3")]
    pub signature: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "4")]
    pub session_key: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
    #[prost(bytes = "vec", optional, tag = "5")]
    pub remote_attestation: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
    #[prost(enumeration = "signed_message::SessionKeyType", optional, tag = "8")]
    pub session_key_type: ::core::option::Option<i32>,
    #[prost(bytes = "vec", optional, tag = "9")]
    pub oemcrypto_core_message: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
}

/// Nested message and enum types in `SignedMessage`.
pub mod signed_message {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum MessageType {
        LicenseRequest = 1,
        License = 2,
        ErrorResponse = 3,
        ServiceCertificateRequest = 4,
        ServiceCertificate = 5,
        SubLicense = 6,
        CasLicenseRequest = 7,
        CasLicense = 8,
        ExternalLicenseRequest = 9,
        ExternalLicense = 10,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum SessionKeyType {
        Undefined = 0,
        WrappedAesKey = 1,
        EphemeralEccPublicKey = 2,
    }
}
