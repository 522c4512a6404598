//! Value types that track revocation reason coverage and per-certificate revocation status

use x509_cert::ext::pkix::crl::dp::{ReasonFlags, Reasons};
use x509_cert::ext::pkix::CrlReason;

/// `ALL_REASONS` is the target coverage value for a [`ReasonsMask`]: every revocation reason a CRL
/// can attest to. The unused flag carries no meaning for coverage purposes and is excluded.
pub fn all_reasons() -> ReasonFlags {
    Reasons::KeyCompromise
        | Reasons::CaCompromise
        | Reasons::AffiliationChanged
        | Reasons::Superseded
        | Reasons::CessationOfOperation
        | Reasons::CertificateHold
        | Reasons::PrivilegeWithdrawn
        | Reasons::AaCompromise
}

/// `ReasonsMask` tracks which revocation reasons have been conclusively checked for one
/// certificate during one revocation status determination. The mask only grows (set union) as
/// CRLs are consulted; it never loses a previously-asserted reason.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ReasonsMask(ReasonFlags);

impl ReasonsMask {
    /// Returns a new, empty mask.
    pub fn new() -> Self {
        Default::default()
    }

    /// Unions the presented reasons into the mask.
    pub fn add_reasons(&mut self, reasons: ReasonFlags) {
        self.0 |= reasons;
    }

    /// Returns true if the presented reasons include at least one reason not already covered by
    /// the mask, i.e., if consulting a CRL scoped to these reasons would make progress.
    pub fn adds_new_reasons(&self, reasons: ReasonFlags) -> bool {
        !(reasons & !self.0).is_empty()
    }

    /// Returns true if every reason in [`all_reasons`] is covered.
    pub fn is_all_reasons(&self) -> bool {
        self.0.contains(all_reasons())
    }

    /// Returns the reasons covered so far.
    pub fn as_flags(&self) -> ReasonFlags {
        self.0
    }
}

/// `CertStatus` conveys the revocation status of one certificate as determined from CRLs. The
/// status is created fresh per (certificate, validation) pair and is terminal once set to Revoked.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CertStatus {
    /// Every applicable revocation reason was checked and the certificate was not found on any CRL.
    Unrevoked,
    /// The certificate was found on a CRL with the given reason code at the given time (expressed
    /// as seconds since Unix epoch).
    Revoked {
        /// Reason code from the CRL entry, or unspecified when the entry carries none
        reason: CrlReason,
        /// Revocation date from the CRL entry
        time: u64,
    },
    /// Status could not be determined, i.e., no CRL was available or the CRLs that were available
    /// did not cover every revocation reason. Callers treat this as a validation failure, never as
    /// an implicit pass.
    Undetermined,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reasons_mask_monotonicity() {
        let mut mask = ReasonsMask::new();
        assert!(!mask.is_all_reasons());
        assert!(mask.adds_new_reasons(Reasons::KeyCompromise.into()));

        mask.add_reasons(Reasons::KeyCompromise | Reasons::CaCompromise);
        assert!(!mask.adds_new_reasons(Reasons::KeyCompromise.into()));
        assert!(mask.adds_new_reasons(Reasons::Superseded.into()));

        let before = mask.as_flags();
        mask.add_reasons(Reasons::Superseded.into());
        assert!(mask.as_flags().contains(before));
        assert!(!mask.is_all_reasons());

        mask.add_reasons(all_reasons());
        assert!(mask.is_all_reasons());
        assert!(!mask.adds_new_reasons(all_reasons()));
    }
}
