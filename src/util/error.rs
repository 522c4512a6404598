//! Error types

use core::fmt;

/// Result type
pub type Result<T> = core::result::Result<T, Error>;

/// Status codes that describe the outcome of a certification path validation operation
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub enum PathValidationStatus {
    /// No errors were encountered while validating certification path
    Valid,
    /// NameChainingFailure occurs when a CertificationPath features certificates for which the subject
    /// name of a superior certificate does not match the issuer name of the immediately subordinate certificate.
    NameChainingFailure,
    /// SignatureVerificationFailure occurs when a CertificationPath features certificates for which the subject
    /// public key of a superior certificate does not verify the signature of the immediately subordinate certificate.
    SignatureVerificationFailure,
    /// InvalidNotBeforeDate occurs when a CertificationPath features a certificate that contains a notBefore
    /// date that is after the time of interest used for a certification path validation operation.
    InvalidNotBeforeDate,
    /// InvalidNotAfterDate occurs when a CertificationPath features a certificate that contains a notAfter
    /// date that is before the time of interest used for a certification path validation operation.
    InvalidNotAfterDate,
    /// MissingBasicConstraints occurs when a CertificationPath features an intermediate CA certificate that
    /// does not contain a basicConstraints extension.
    MissingBasicConstraints,
    /// InvalidBasicConstraints occurs when a CertificationPath features an intermediate CA certificate that
    /// contains a basicConstraints extension with the cA field set to false.
    InvalidBasicConstraints,
    /// InvalidPathLength occurs when a CertificationPath has more certificates than allowed by either an
    /// initial path length configuration or a constraint asserted in an intermediate CA certificate present
    /// in the certification path.
    InvalidPathLength,
    /// InvalidKeyUsage occurs when an intermediate CA certificate lacks keyCertSign (or cRLSign when processing
    /// CRLs) or when a target certificate does not include bits from the PS_KEY_USAGE value in a
    /// CertificationPathSettings instance.
    InvalidKeyUsage,
    /// NullPolicySet occurs when the valid_policy_tree becomes NULL when processing an intermediate CA
    /// certificate or when processing a target certificate and requireExplicitPolicy is operative.
    NullPolicySet,
    /// NameConstraintsViolation occurs when a name constraint is violated.
    NameConstraintsViolation,
    /// UnprocessedCriticalExtension occurs when a certificate features a critical extension that was not
    /// processed during certification path validation.
    UnprocessedCriticalExtension,
    /// MissingTrustAnchor occurs when a CertificationPath has no trust anchor.
    MissingTrustAnchor,
    /// MissingTrustAnchorName occurs when a TrustAnchorChoice object features a TaInfo field that has no
    /// CertPathControls or that has a CertPathControls that does not assert a name or wrap a Certificate.
    MissingTrustAnchorName,
    /// EncodingError occurs when an object cannot be parsed or re-encoded (though this is more likely to
    /// manifest as an Asn1Error).
    EncodingError,
    /// NoPathsFound occurs when the certification path builder fails to find any candidate paths.
    NoPathsFound,
    /// CertificateRevoked occurs when a CertificationPath contains a certificate that has been revoked.
    CertificateRevoked,
    /// CertificateRevokedEndEntity occurs when a CertificationPath contains an end entity certificate that has been revoked.
    CertificateRevokedEndEntity,
    /// CertificateRevokedIntermediateCa occurs when a CertificationPath contains an intermediate CA certificate that has been revoked.
    CertificateRevokedIntermediateCa,
    /// RevocationStatusNotDetermined occurs when a CertificationPath contains a certificate for which
    /// revocation status could not be determined.
    RevocationStatusNotDetermined,
    /// CertificateOnHold relates to use of the on hold revocation status, which is seldom used.
    CertificateOnHold,
    /// Misconfiguration indicates a configuration error was detected. See textual log output for more details.
    Misconfiguration,
}

/// Error type
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// PathValidation is used to propagate a status code from a failed certification path validation operation
    PathValidation(PathValidationStatus),
    /// NotFound occurs when an action failed because a necessary artifact was not found.
    NotFound,
    /// Unrecognized occurs when an error condition does not match anything else here.
    Unrecognized,
    /// An artifact did not conform to length requirements
    LengthError,
    /// An artifact could not be parsed
    ParseError,
    /// A CRL was found to be incompatible with the certificate whose revocation status is sought.
    CrlIncompatible,
    /// A CRL was ignored due to an invalid or unsupported extension.
    UnsupportedCrlExtension,
    /// A CRL entry was ignored due to an invalid or unsupported extension.
    UnsupportedCrlEntryExtension,
    /// Asn1Error is used to propagate error information from the der and x509-cert crates.
    Asn1Error(der::Error),
}

impl From<der::Error> for Error {
    fn from(err: der::Error) -> Error {
        Error::Asn1Error(err)
    }
}

impl fmt::Display for PathValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathValidationStatus::Valid => write!(f, "Valid"),
            PathValidationStatus::NameChainingFailure => write!(f, "Name chaining failure"),
            PathValidationStatus::SignatureVerificationFailure => {
                write!(f, "Signature verification failure")
            }
            PathValidationStatus::InvalidNotBeforeDate => write!(f, "InvalidNotBeforeDate"),
            PathValidationStatus::InvalidNotAfterDate => write!(f, "InvalidNotAfterDate"),
            PathValidationStatus::MissingBasicConstraints => write!(f, "MissingBasicConstraints"),
            PathValidationStatus::InvalidBasicConstraints => write!(f, "InvalidBasicConstraints"),
            PathValidationStatus::InvalidPathLength => write!(f, "InvalidPathLength"),
            PathValidationStatus::InvalidKeyUsage => write!(f, "InvalidKeyUsage"),
            PathValidationStatus::NullPolicySet => write!(f, "NullPolicySet"),
            PathValidationStatus::NameConstraintsViolation => write!(f, "NameConstraintsViolation"),
            PathValidationStatus::UnprocessedCriticalExtension => {
                write!(f, "UnprocessedCriticalExtension")
            }
            PathValidationStatus::MissingTrustAnchor => write!(f, "MissingTrustAnchor"),
            PathValidationStatus::MissingTrustAnchorName => write!(f, "MissingTrustAnchorName"),
            PathValidationStatus::EncodingError => write!(f, "EncodingError"),
            PathValidationStatus::NoPathsFound => write!(f, "NoPathsFound"),
            PathValidationStatus::CertificateRevoked => write!(f, "CertificateRevoked"),
            PathValidationStatus::CertificateRevokedEndEntity => {
                write!(f, "CertificateRevokedEndEntity")
            }
            PathValidationStatus::CertificateRevokedIntermediateCa => {
                write!(f, "CertificateRevokedIntermediateCa")
            }
            PathValidationStatus::RevocationStatusNotDetermined => {
                write!(f, "RevocationStatusNotDetermined")
            }
            PathValidationStatus::CertificateOnHold => write!(f, "CertificateOnHold"),
            PathValidationStatus::Misconfiguration => write!(f, "Misconfiguration"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::PathValidation(err) => write!(f, "PathValidationError: {}", err),
            Error::NotFound => write!(f, "NotFound"),
            Error::Unrecognized => write!(f, "Unrecognized"),
            Error::LengthError => write!(f, "LengthError"),
            Error::ParseError => write!(f, "ParseError"),
            Error::CrlIncompatible => write!(f, "CrlIncompatible"),
            Error::UnsupportedCrlExtension => write!(f, "UnsupportedCrlExtension"),
            Error::UnsupportedCrlEntryExtension => write!(f, "UnsupportedCrlEntryExtension"),
            Error::Asn1Error(err) => write!(f, "Asn1Error: {}", err),
        }
    }
}

#[test]
fn error_display_test() {
    let s = format!(
        "{}",
        Error::PathValidation(PathValidationStatus::NameChainingFailure)
    );
    assert_eq!("PathValidationError: Name chaining failure", s);
    let s = format!("{}", Error::CrlIncompatible);
    assert_eq!("CrlIncompatible", s);
    let s = format!("{}", PathValidationStatus::RevocationStatusNotDetermined);
    assert_eq!("RevocationStatusNotDetermined", s);
}
