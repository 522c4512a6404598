//! The pki_environment_traits module features trait definitions and type definitions that are used
//! by [`PkiEnvironment`] to provide functionality that supports building and/or validating X.509
//! certification paths.

use spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};
use x509_cert::crl::CertificateList;
use x509_cert::name::Name;

use crate::util::error::*;
use crate::validator::cert_path::CertificationPath;
use crate::validator::path_results::CertificationPathResults;
use crate::validator::path_settings::CertificationPathSettings;
use crate::validator::pdv_certificate::PDVCertificate;
use crate::validator::pdv_trust_anchor::PDVTrustAnchorChoice;
use crate::PkiEnvironment;

/// `ValidatePath` provides a function signature for implementations that perform certification path
/// validation or that provide functionality in support of certification path validation.
pub type ValidatePath = fn(
    &PkiEnvironment,
    &CertificationPathSettings,    // path settings to govern validation
    &mut CertificationPath,        // path to verify
    &mut CertificationPathResults, // path validation results
) -> Result<()>;

/// `CalculateHash` provides a function signature for implementations that perform hashing.
pub type CalculateHash = fn(
    &PkiEnvironment,
    &AlgorithmIdentifierOwned, // hash alg
    &[u8],                     // buffer to hash
) -> Result<Vec<u8>>;

/// `VerifySignatureMessage` provides a function signature for implementations that perform
/// signature verification over a message.
pub type VerifySignatureMessage = fn(
    &PkiEnvironment,
    &[u8],                      // message to hash and verify
    &[u8],                      // signature
    &AlgorithmIdentifierOwned,  // signature algorithm
    &SubjectPublicKeyInfoOwned, // public key
) -> Result<()>;

/// The [`TrustAnchorSource`] trait enables trait objects to provide access to trust anchors backed
/// via some means, i.e., hard-coded, in-memory, system store accessed via FFI, etc.
pub trait TrustAnchorSource {
    /// get_trust_anchors returns a vector with references to available trust anchors.
    fn get_trust_anchors(&'_ self) -> Result<Vec<&PDVTrustAnchorChoice>>;

    /// get_trust_anchor_by_skid returns a reference to a trust anchor corresponding to the
    /// presented key identifier.
    fn get_trust_anchor_by_skid(&self, skid: &[u8]) -> Result<&PDVTrustAnchorChoice>;

    /// get_trust_anchor_by_hex_skid returns a reference to a trust anchor corresponding to the
    /// presented hexadecimal key identifier.
    fn get_trust_anchor_by_hex_skid(&'_ self, hex_skid: &str) -> Result<&PDVTrustAnchorChoice>;

    /// get_trust_anchors_by_name returns references to all trust anchors whose name matches the
    /// presented name. More than one trust anchor may carry the same name with different keys, so
    /// all matches are returned.
    fn get_trust_anchors_by_name(&'_ self, name: &Name) -> Result<Vec<&PDVTrustAnchorChoice>>;

    /// get_trust_anchor_for_target returns a reference to a trust anchor corresponding to the AKID
    /// or issuer name from the presented target.
    fn get_trust_anchor_for_target(
        &'_ self,
        target: &'_ PDVCertificate,
    ) -> Result<&PDVTrustAnchorChoice>;

    /// is_trust_anchor returns Ok if the presented trust anchor object is a trust anchor.
    fn is_trust_anchor(&self, ta: &PDVTrustAnchorChoice) -> Result<()>;

    /// is_cert_a_trust_anchor returns Ok if the presented certificate object is a trust anchor.
    fn is_cert_a_trust_anchor(&self, cert: &PDVCertificate) -> Result<()>;
}

/// The [`CertificateSource`] trait enables trait objects to provide access to certificates backed
/// via some means, i.e., hard-coded, in-memory, system store accessed via FFI, etc.
pub trait CertificateSource {
    /// get_certificates returns a vector with references to available certificates.
    fn get_certificates(&'_ self) -> Result<Vec<&PDVCertificate>>;

    /// get_certificates_for_skid returns a vector of references to certificates corresponding to
    /// the presented key identifier.
    fn get_certificates_for_skid(&self, skid: &[u8]) -> Result<Vec<&PDVCertificate>>;

    /// get_certificates_for_name returns a vector of references to certificates corresponding to
    /// the presented subject name.
    fn get_certificates_for_name(&self, name: &Name) -> Result<Vec<&PDVCertificate>>;
}

/// The [`CrlSource`] trait defines the interface for storing and retrieving CRLs in support of
/// certification path validation.
pub trait CrlSource {
    /// Retrieves CRLs whose issuer matches the issuer of the given certificate or a CRL issuer
    /// named in the certificate's CRL distribution points extension.
    fn get_crls(&self, cert: &PDVCertificate) -> Result<Vec<Vec<u8>>>;

    /// Retrieves CRLs issued by the presented name. This supports indirect CRLs, where the CRL
    /// issuer differs from the certificate issuer.
    fn get_crls_for_name(&self, name: &Name) -> Result<Vec<Vec<u8>>>;

    /// Adds a CRL to the store.
    fn add_crl(&self, crl_buf: &[u8], crl: &CertificateList) -> Result<()>;
}

/// The [`RevocationStatusCache`] trait defines the interface for storing and retrieving cached
/// revocation status determinations in support of certification path validation.
pub trait RevocationStatusCache {
    /// Returns Valid if status is known to be good at the time of interest, CertificateRevoked if
    /// the certificate is known to be revoked and RevocationStatusNotDetermined otherwise.
    fn get_status(&self, cert: &PDVCertificate, time_of_interest: u64) -> PathValidationStatus;

    /// Sets status for a certificate to one of Valid or CertificateRevoked along with a next
    /// update value after which the determination is stale.
    fn add_status(&self, cert: &PDVCertificate, next_update: u64, status: PathValidationStatus);
}
