//! PkiEnvironment aggregates a set of function pointers and trait objects that supply functionality
//! useful when building and/or validating a certification path.
//!
//! The sample below illustrates preparation of a PkiEnvironment object for use in building and
//! validating certification paths.
//! ```
//! use certpath::PkiEnvironment;
//! use certpath::*;
//!
//! let mut pe = PkiEnvironment::default();
//!
//! // add basic hashing, signature verification and path validation capabilities
//! populate_5280_pki_environment(&mut pe);
//!
//! let mut ta_source = TaSource::new();
//! // populate the ta_source buffers then index the trust anchors
//! let _ = ta_source.initialize();
//!
//! let mut cert_source = CertSource::new();
//! // populate the cert_source buffers then index the certificates
//! let _ = cert_source.initialize();
//!
//! // add ta_source and cert_source to provide access to trust anchors and intermediate CA certs
//! pe.add_trust_anchor_source(Box::new(ta_source));
//! pe.add_certificate_source(Box::new(cert_source));
//! ```
//!
//! The aggregation of function pointers and trait objects allows implementations of features to
//! vary. For example, one app may desire path validation without certificate policy processing and
//! another may desire access to trust anchors via a system store (via an FFI implementation) or
//! much smaller sets of trust anchors for selected operations.

use spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};
use x509_cert::crl::CertificateList;
use x509_cert::name::Name;

use crate::environment::pki_environment_traits::*;
use crate::util::crypto::*;
use crate::util::error::*;
use crate::validator::cert_path::CertificationPath;
use crate::validator::path_results::CertificationPathResults;
use crate::validator::path_settings::CertificationPathSettings;
use crate::validator::path_validator::validate_path_rfc5280;
use crate::validator::pdv_certificate::PDVCertificate;
use crate::validator::pdv_trust_anchor::PDVTrustAnchorChoice;
use crate::PathValidationStatus::RevocationStatusNotDetermined;

/// [`PkiEnvironment`] provides a switchboard of callback functions and trait objects that allow
/// support to vary on different platforms or to allow support to be tailored for specific use
/// cases.
#[derive(Default)]
pub struct PkiEnvironment {
    //--------------------------------------------------------------------------
    //Crypto interfaces
    //--------------------------------------------------------------------------
    /// List of functions that provide message digest functionality
    calculate_hash_callbacks: Vec<CalculateHash>,

    /// List of functions that provide signature verification functionality given a message
    verify_signature_message_callbacks: Vec<VerifySignatureMessage>,

    //--------------------------------------------------------------------------
    //Certification path processing interfaces
    //--------------------------------------------------------------------------
    /// List of functions that provide certification path validation functionality
    validate_path_callbacks: Vec<ValidatePath>,

    //--------------------------------------------------------------------------
    //Storage and retrieval interfaces
    //--------------------------------------------------------------------------
    /// List of trait objects that provide access to trust anchors
    trust_anchor_sources: Vec<Box<(dyn TrustAnchorSource + Send + Sync)>>,

    /// List of trait objects that provide access to certificates
    certificate_sources: Vec<Box<(dyn CertificateSource + Send + Sync)>>,

    /// List of trait objects that provide access to CRLs
    crl_sources: Vec<Box<(dyn CrlSource + Send + Sync)>>,

    /// List of trait objects that provide access to cached revocation status determinations
    revocation_cache: Vec<Box<(dyn RevocationStatusCache + Send + Sync)>>,
}

impl PkiEnvironment {
    /// PkiEnvironment::new returns a new [`PkiEnvironment`] with empty callback vectors for each
    /// type of callback.
    pub fn new() -> PkiEnvironment {
        Default::default()
    }

    /// clear_all_callbacks clears the contents of all function pointer and trait object vectors
    /// associated with an instance of [`PkiEnvironment`].
    pub fn clear_all_callbacks(&mut self) {
        self.clear_crl_sources();
        self.clear_revocation_cache();
        self.clear_certificate_sources();
        self.clear_calculate_hash_callbacks();
        self.clear_trust_anchor_sources();
        self.clear_validate_path_callbacks();
        self.clear_verify_signature_message_callbacks();
    }

    /// add_validate_path_callback adds a [`ValidatePath`] callback to the list used by validate_path.
    pub fn add_validate_path_callback(&mut self, c: ValidatePath) {
        self.validate_path_callbacks.push(c);
    }

    /// clear_validate_path_callbacks clears the list of [`ValidatePath`] callbacks used by validate_path.
    pub fn clear_validate_path_callbacks(&mut self) {
        self.validate_path_callbacks.clear();
    }

    /// validate_path iterates over validate_path_callbacks until an authoritative answer is found
    /// or all options have been exhausted.
    pub fn validate_path(
        &self,
        pe: &PkiEnvironment,
        cps: &CertificationPathSettings,
        cp: &mut CertificationPath,
        cpr: &mut CertificationPathResults,
    ) -> Result<()> {
        let mut err = None;
        for f in &self.validate_path_callbacks {
            match f(pe, cps, cp, cpr) {
                Ok(r) => {
                    return Ok(r);
                }
                Err(e) => {
                    err = Some(e);
                }
            }
        }
        if let Some(e) = err {
            return Err(e);
        }
        Err(Error::Unrecognized)
    }

    /// add_calculate_hash_callback adds a [`CalculateHash`] callback to the list used by calculate_hash.
    pub fn add_calculate_hash_callback(&mut self, c: CalculateHash) {
        self.calculate_hash_callbacks.push(c);
    }

    /// clear_calculate_hash_callbacks clears the list of [`CalculateHash`] callbacks used by calculate_hash.
    pub fn clear_calculate_hash_callbacks(&mut self) {
        self.calculate_hash_callbacks.clear();
    }

    /// calculate_hash iterates over calculate_hash_callbacks until an authoritative answer is found
    /// or all options have been exhausted.
    pub fn calculate_hash(
        &self,
        pe: &PkiEnvironment,
        hash_alg: &AlgorithmIdentifierOwned,
        buffer_to_hash: &[u8],
    ) -> Result<Vec<u8>> {
        for f in &self.calculate_hash_callbacks {
            let r = f(pe, hash_alg, buffer_to_hash);
            if let Ok(r) = r {
                return Ok(r);
            }
        }
        Err(Error::Unrecognized)
    }

    /// add_verify_signature_message_callback adds a [`VerifySignatureMessage`] callback to the list
    /// used by verify_signature_message.
    pub fn add_verify_signature_message_callback(&mut self, c: VerifySignatureMessage) {
        self.verify_signature_message_callbacks.push(c);
    }

    /// clear_verify_signature_message_callbacks clears the list of [`VerifySignatureMessage`]
    /// callbacks used by verify_signature_message.
    pub fn clear_verify_signature_message_callbacks(&mut self) {
        self.verify_signature_message_callbacks.clear();
    }

    /// verify_signature_message iterates over verify_signature_message_callbacks until an
    /// authoritative answer is found or all options have been exhausted.
    pub fn verify_signature_message(
        &self,
        pe: &PkiEnvironment,
        message_to_verify: &[u8],                 // buffer to verify
        signature: &[u8],                         // signature
        signature_alg: &AlgorithmIdentifierOwned, // signature algorithm
        spki: &SubjectPublicKeyInfoOwned,         // public key
    ) -> Result<()> {
        let mut err = None;
        for f in &self.verify_signature_message_callbacks {
            match f(pe, message_to_verify, signature, signature_alg, spki) {
                Ok(r) => return Ok(r),
                Err(e) => err = Some(e),
            }
        }
        if let Some(e) = err {
            return Err(e);
        }
        Err(Error::Unrecognized)
    }

    /// add_trust_anchor_source adds a [`TrustAnchorSource`] object to the list used by trust anchor
    /// accessors.
    pub fn add_trust_anchor_source(&mut self, c: Box<(dyn TrustAnchorSource + Send + Sync)>) {
        self.trust_anchor_sources.push(c);
    }

    /// clear_trust_anchor_sources clears the list of [`TrustAnchorSource`] objects.
    pub fn clear_trust_anchor_sources(&mut self) {
        self.trust_anchor_sources.clear();
    }

    /// get_trust_anchors returns available trust anchors from the first source that returns any.
    pub fn get_trust_anchors(&self) -> Result<Vec<&PDVTrustAnchorChoice>> {
        for f in &self.trust_anchor_sources {
            let r = f.get_trust_anchors();
            if let Ok(r) = r {
                return Ok(r);
            }
        }
        Err(Error::Unrecognized)
    }

    /// get_trust_anchor iterates over trust_anchor_sources until an authoritative answer is found
    /// or all options have been exhausted.
    pub fn get_trust_anchor(&self, skid: &[u8]) -> Result<&PDVTrustAnchorChoice> {
        for f in &self.trust_anchor_sources {
            let r = f.get_trust_anchor_by_skid(skid);
            if let Ok(r) = r {
                return Ok(r);
            }
        }
        Err(Error::NotFound)
    }

    /// get_trust_anchor_by_hex_skid returns a reference to a trust anchor corresponding to the
    /// presented hexadecimal key identifier.
    pub fn get_trust_anchor_by_hex_skid(&'_ self, hex_skid: &str) -> Result<&PDVTrustAnchorChoice> {
        for f in &self.trust_anchor_sources {
            let r = f.get_trust_anchor_by_hex_skid(hex_skid);
            if let Ok(r) = r {
                return Ok(r);
            }
        }
        Err(Error::NotFound)
    }

    /// get_trust_anchors_by_name returns references to all trust anchors whose name matches the
    /// presented name, aggregated across all trust anchor sources.
    pub fn get_trust_anchors_by_name(&'_ self, name: &Name) -> Result<Vec<&PDVTrustAnchorChoice>> {
        let mut retval = vec![];
        for f in &self.trust_anchor_sources {
            if let Ok(tas) = f.get_trust_anchors_by_name(name) {
                for ta in tas {
                    retval.push(ta);
                }
            }
        }
        if !retval.is_empty() {
            return Ok(retval);
        }
        Err(Error::NotFound)
    }

    /// get_trust_anchor_for_target takes a target certificate and returns a trust anchor that may
    /// be useful in verifying the certificate.
    pub fn get_trust_anchor_for_target(
        &'_ self,
        target: &'_ PDVCertificate,
    ) -> Result<&PDVTrustAnchorChoice> {
        for f in &self.trust_anchor_sources {
            let r = f.get_trust_anchor_for_target(target);
            if let Ok(r) = r {
                return Ok(r);
            }
        }
        Err(Error::NotFound)
    }

    /// is_cert_a_trust_anchor takes a certificate and returns Ok if the certificate is a trust anchor.
    pub fn is_cert_a_trust_anchor(&'_ self, target: &'_ PDVCertificate) -> Result<()> {
        for f in &self.trust_anchor_sources {
            if f.is_cert_a_trust_anchor(target).is_ok() {
                return Ok(());
            }
        }
        Err(Error::NotFound)
    }

    /// is_trust_anchor takes a [`PDVTrustAnchorChoice`] and returns Ok if it is a trust anchor.
    pub fn is_trust_anchor(&'_ self, target: &'_ PDVTrustAnchorChoice) -> Result<()> {
        for f in &self.trust_anchor_sources {
            if f.is_trust_anchor(target).is_ok() {
                return Ok(());
            }
        }
        Err(Error::NotFound)
    }

    /// add_certificate_source adds a [`CertificateSource`] object to the list.
    pub fn add_certificate_source(&mut self, c: Box<(dyn CertificateSource + Send + Sync)>) {
        self.certificate_sources.push(c);
    }

    /// clear_certificate_sources clears the list of [`CertificateSource`] objects.
    pub fn clear_certificate_sources(&mut self) {
        self.certificate_sources.clear();
    }

    /// get_certificates_for_name returns certificates whose subject matches the presented name,
    /// aggregated across all certificate sources.
    pub fn get_certificates_for_name(&self, name: &Name) -> Result<Vec<&PDVCertificate>> {
        let mut retval = vec![];
        for f in &self.certificate_sources {
            if let Ok(certs) = f.get_certificates_for_name(name) {
                for cert in certs {
                    retval.push(cert);
                }
            }
        }
        Ok(retval)
    }

    /// get_certificates_for_skid returns certificates whose key identifier matches the presented
    /// value, aggregated across all certificate sources.
    pub fn get_certificates_for_skid(&self, skid: &[u8]) -> Result<Vec<&PDVCertificate>> {
        let mut retval = vec![];
        for f in &self.certificate_sources {
            if let Ok(certs) = f.get_certificates_for_skid(skid) {
                for cert in certs {
                    retval.push(cert);
                }
            }
        }
        Ok(retval)
    }

    /// add_crl_source adds a [`CrlSource`] object to the list.
    pub fn add_crl_source(&mut self, c: Box<(dyn CrlSource + Send + Sync)>) {
        self.crl_sources.push(c);
    }

    /// clear_crl_sources clears the list of [`CrlSource`] objects.
    pub fn clear_crl_sources(&mut self) {
        self.crl_sources.clear();
    }

    /// Retrieves CRLs for given certificate from store.
    pub fn get_crls(&self, cert: &PDVCertificate) -> Result<Vec<Vec<u8>>> {
        let mut retval = vec![];
        for f in &self.crl_sources {
            if let Ok(crls) = f.get_crls(cert) {
                for crl in crls {
                    retval.push(crl);
                }
            }
        }
        if !retval.is_empty() {
            return Ok(retval);
        }
        Err(Error::NotFound)
    }

    /// Retrieves CRLs issued by the presented name from store.
    pub fn get_crls_for_name(&self, name: &Name) -> Result<Vec<Vec<u8>>> {
        let mut retval = vec![];
        for f in &self.crl_sources {
            if let Ok(crls) = f.get_crls_for_name(name) {
                for crl in crls {
                    retval.push(crl);
                }
            }
        }
        if !retval.is_empty() {
            return Ok(retval);
        }
        Err(Error::NotFound)
    }

    /// Adds a CRL to the store.
    pub fn add_crl(&self, crl_buf: &[u8], crl: &CertificateList) -> Result<()> {
        let mut at_least_one_success = false;
        for f in &self.crl_sources {
            if f.add_crl(crl_buf, crl).is_ok() {
                at_least_one_success = true;
            }
        }
        if at_least_one_success {
            return Ok(());
        }
        Err(Error::NotFound)
    }

    /// add_revocation_cache adds a [`RevocationStatusCache`] object to the list.
    pub fn add_revocation_cache(&mut self, c: Box<(dyn RevocationStatusCache + Send + Sync)>) {
        self.revocation_cache.push(c);
    }

    /// clear_revocation_cache clears the list of [`RevocationStatusCache`] objects.
    pub fn clear_revocation_cache(&mut self) {
        self.revocation_cache.clear();
    }

    /// Retrieves cached revocation status determination for given certificate from store.
    pub fn get_status(&self, cert: &PDVCertificate, time_of_interest: u64) -> PathValidationStatus {
        for f in &self.revocation_cache {
            let status = f.get_status(cert, time_of_interest);
            if RevocationStatusNotDetermined != status {
                return status;
            }
        }
        RevocationStatusNotDetermined
    }

    /// Adds a cached revocation status determination to the store.
    pub fn add_status(
        &self,
        cert: &PDVCertificate,
        next_update: u64,
        status: PathValidationStatus,
    ) {
        for f in &self.revocation_cache {
            f.add_status(cert, next_update, status);
        }
    }
}

/// `populate_5280_pki_environment` populates a [`PkiEnvironment`] instance with a default set of
/// callback functions.
///
/// The following callbacks are added:
/// - [`validate_path_rfc5280`]
/// - [`calculate_hash_rust_crypto`]
/// - [`verify_signature_message_rust_crypto`]
pub fn populate_5280_pki_environment(pe: &mut PkiEnvironment) {
    pe.add_validate_path_callback(validate_path_rfc5280);
    pe.add_calculate_hash_callback(calculate_hash_rust_crypto);
    pe.add_verify_signature_message_callback(verify_signature_message_rust_crypto);
}
