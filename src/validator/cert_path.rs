//! Provides a structure that represents a certification path including target, optional
//! intermediate CA certificates, trust anchor and optional stapled revocation information.

use crate::validator::path_settings::CertificateChain;
use crate::validator::pdv_certificate::PDVCertificate;
use crate::validator::pdv_trust_anchor::PDVTrustAnchorChoice;

/// `CertificationPath` is used to represent the trust anchor, intermediate CA certificates and
/// target certificate that comprise a certification path.
#[derive(Clone)]
pub struct CertificationPath {
    /// `target` contains the target certificate for the certification path
    pub target: PDVCertificate,
    /// `intermediates` contains zero or more intermediate CA certificates, beginning with the
    /// certificate that was issued by `trust_anchor` and proceeding in order to a certificate that
    /// issued the target, i.e., `intermediates[0]` can be used to verify `intermediates[1]`,
    /// `intermediates[1]` can be used to verify `intermediates[2]`, etc. until
    /// `intermediates[intermediates.len() - 1]` can be used to verify `target`.
    pub intermediates: CertificateChain,
    /// `trust_anchor` contains the trust anchor for the certification path
    pub trust_anchor: PDVTrustAnchorChoice,

    /// crls is a vector of buffers of size intermediates.len() + 1, to allow for a stapled CRL for
    /// each intermediate CA and the target beginning with the intermediate CA issued by the trust
    /// anchor, if any, and proceeding through the target. Where no CRL is available when the path
    /// is constructed, None is present.
    pub crls: Vec<Option<Vec<u8>>>,
}

impl CertificationPath {
    /// instantiates a new CertificationPath
    pub fn new(
        trust_anchor: PDVTrustAnchorChoice,
        intermediates: CertificateChain,
        target: PDVCertificate,
    ) -> CertificationPath {
        let len = intermediates.len() + 1;
        CertificationPath {
            trust_anchor,
            intermediates,
            target,
            crls: vec![None; len],
        }
    }

    /// stapled_rev_info_available returns true if any caller-supplied CRLs are available and false
    /// otherwise.
    pub fn stapled_rev_info_available(&self) -> bool {
        self.crls.iter().any(|x| x.is_some())
    }
}
