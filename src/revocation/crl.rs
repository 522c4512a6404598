//! Structures and functions that classify CRLs and evaluate them against certificates, including
//! support for partitioned CRLs (issuing distribution points), delta CRLs and indirect CRLs

use flagset::{flags, FlagSet};
use lazy_static::lazy_static;
use ndarray::{arr2, ArrayBase, Dim, OwnedRepr};

use log::{error, info};

use const_oid::db::rfc5912::{
    ID_CE_AUTHORITY_KEY_IDENTIFIER, ID_CE_BASIC_CONSTRAINTS, ID_CE_CERTIFICATE_ISSUER,
    ID_CE_CRL_DISTRIBUTION_POINTS, ID_CE_CRL_NUMBER, ID_CE_CRL_REASONS, ID_CE_DELTA_CRL_INDICATOR,
    ID_CE_FRESHEST_CRL, ID_CE_HOLD_INSTRUCTION_CODE, ID_CE_INVALIDITY_DATE,
    ID_CE_ISSUING_DISTRIBUTION_POINT, ID_CE_KEY_USAGE,
};
use der::{Decode, Encode};
use x509_cert::crl::{CertificateList, RevokedCert};
use x509_cert::ext::pkix::crl::dp::ReasonFlags;
use x509_cert::ext::pkix::{
    crl::dp::DistributionPoint,
    name::{DistributionPointName, GeneralName, GeneralNames},
    AuthorityKeyIdentifier, CrlReason, IssuingDistributionPoint, KeyUsage, KeyUsages,
};
use x509_cert::ext::Extensions;
use x509_cert::name::Name;
use x509_cert::Certificate;

use crate::environment::pki_environment::PkiEnvironment;
use crate::revocation::status::all_reasons;
use crate::util::error::*;
use crate::util::pdv_utilities::{compare_names, name_to_string};
use crate::validator::pdv_certificate::{DeferDecodeSigned, PDVCertificate};
use crate::validator::pdv_extension::{ExtensionProcessing, PDVExtension};

// Certificates are classified based on the values found in the CRLDistributionPoints and
// BasicConstraints extensions, if present, without regard for criticality. Certificates with
// BasicConstraints present and the isCA field set to true are CA certificates. Certificates
// without BasicConstraints or with BasicConstraints present and the isCA field set to false are
// EE certificates. For either, if the CRLDistributionPoints extension is present, the certificate
// gets a DP classification.

lazy_static! {
    // Certificate types are rows, CRL scopes are columns.
    // enum CertRevType { EeDp, Ee, CaDp, Ca }
    // enum CrlScope { Complete, Dp, Delta, DeltaDp }
    static ref COMPATIBLE_SCOPE : ArrayBase<OwnedRepr<bool>, Dim<[usize; 2]>> = arr2(&[
        // Complete,     Dp,   Delta,  DeltaDp
        [        true,  true,    true,     true], // EeDp
        [        true, false,    true,    false], // Ee
        [        true,  true,    true,     true], // CaDp
        [        true, false,    true,    false]  // Ca
    ]);

    // Certificate types are rows, CRL coverages are columns.
    // enum CertRevType { EeDp, Ee, CaDp, Ca }
    // enum CrlCoverage { All, EeOnly, CaOnly }
    static ref COMPATIBLE_COVERAGE : ArrayBase<OwnedRepr<bool>, Dim<[usize; 2]>> = arr2(&[
        //  All, EeOnly, CaOnly
        [  true,   true,  false], // EeDp
        [  true,   true,  false], // Ee
        [  true,  false,   true], // CaDp
        [  true,  false,   true]  // Ca
    ]);
}

/// The CertRevType enum is used to classify a certificate with regard to the types of CRLs that
/// are applicable to it.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum CertRevType {
    /// Certificate features a distribution point name and either no basicConstraints or basicConstraints with isCA set to false
    EeDp,
    /// Certificate features no distribution point name and either no basicConstraints or basicConstraints with isCA set to false
    Ee,
    /// Certificate features a distribution point name and basicConstraints with isCA set to true
    CaDp,
    /// Certificate features no distribution point name and basicConstraints with isCA set to true
    Ca,
}

/// The CrlScope enum is used to identify CRL scope, i.e., whether the CRL is full, partitioned,
/// delta or delta partitioned. Partitioning is expressed using issuing distribution point
/// extensions.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum CrlScope {
    /// CRL is not limited in scope by issuing distribution point or delta CRL indicator
    Complete,
    /// CRL is limited in scope by issuing distribution point but not by delta CRL indicator
    Dp,
    /// CRL is not limited in scope by issuing distribution point but includes a delta CRL indicator
    Delta,
    /// CRL is limited in scope by issuing distribution point and delta CRL indicator
    DeltaDp,
}

/// The CrlCoverage enum is used to identify CRL coverage, i.e., whether the CRL features entries
/// for all types of entities, only for CA entities or only for end entities.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum CrlCoverage {
    /// CRL coverage is not limited by flags in issuing distribution point
    All,
    /// CRL coverage is limited to end entity certificates only by issuing distribution point
    EeOnly,
    /// CRL coverage is limited to CA certificates only by issuing distribution point
    CaOnly,
}

/// The CrlAuthority enum is used to identify CRL authority, i.e., whether a CRL is direct or
/// indirect.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum CrlAuthority {
    /// CRL only features entries that were issued by the CRL issuer
    Direct,
    /// CRL may feature entries that were issued by other than the CRL issuer
    Indirect,
}

/// The CrlReasons enum indicates whether the CRL covers all reason codes or a subset.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum CrlReasons {
    /// The CRL covers all CRL reasons
    AllReasons,
    /// The CRL covers only some CRL reasons
    SomeReasons,
}

/// CrlType features a set of enum values that determine the type of CRL based on evaluation of
/// extensions.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct CrlType {
    /// Indicates scope of CRL relative to distribution point and delta CRL indicator
    pub scope: CrlScope,
    /// Indicates if CRL is limited by IDP flags, i.e., end entity only, CA only
    pub coverage: CrlCoverage,
    /// Indicates if CRL only contains entries for certs issued by the CRL issuer or may contain entries from other issuers too
    pub authority: CrlAuthority,
    /// Indicates if CRL covers all CRL reasons or only some
    pub reasons: CrlReasons,
}

/// CrlInfo collects values harvested from a CRL during classification for use during processing
/// without re-parsing extensions.
#[derive(Clone, PartialEq, Eq)]
pub struct CrlInfo {
    /// Classification of the CRL per its extensions
    pub type_info: CrlType,
    /// thisUpdate expressed as seconds since Unix epoch
    pub this_update: u64,
    /// nextUpdate expressed as seconds since Unix epoch, if present
    pub next_update: Option<u64>,
    /// RFC 4514 representation of the CRL issuer name
    pub issuer_name: String,
    /// DER-encoded CRL issuer name
    pub issuer_name_blob: Vec<u8>,
    /// DER-encoded IssuingDistributionPoint extension value, if present
    pub idp_blob: Option<Vec<u8>>,
    /// onlySomeReasons value from the IssuingDistributionPoint extension, if present
    pub only_some_reasons: Option<ReasonFlags>,
    /// Key identifier from the authority key identifier extension, if present
    pub skid: Option<Vec<u8>>,
}

// Flag set used in get_crl_info to classify a CRL
flags! {
    enum CrlQuestions: u8 {
        EeOnly,
        CaOnly,
        AaOnly,
        Delta,
        Partitioned,
        Indirect,
        SomeReasons
    }
}
type CrlQuestionnaire = FlagSet<CrlQuestions>;

/// classify_certificate takes a certificate and returns a CertRevType value.
///  - CaDp is returned if basicConstraints is present and isCA is true AND a CRL DP extension is present.
///  - EeDp is returned if basicConstraints is absent or isCA is false AND a CRL DP extension is present.
///  - Ca is returned if basicConstraints is present and isCA is true AND a CRL DP extension is not present.
///  - Ee is returned if basicConstraints is absent or isCA is false AND a CRL DP extension is not present.
pub(crate) fn classify_certificate(cert: &PDVCertificate) -> CertRevType {
    let is_ca = if let Ok(Some(PDVExtension::BasicConstraints(bc))) =
        cert.get_extension(&ID_CE_BASIC_CONSTRAINTS)
    {
        bc.ca
    } else {
        false
    };

    let has_crldp = matches!(
        cert.get_extension(&ID_CE_CRL_DISTRIBUTION_POINTS),
        Ok(Some(PDVExtension::CrlDistributionPoints(_crldp)))
    );
    if is_ca && has_crldp {
        CertRevType::CaDp
    } else if !is_ca && has_crldp {
        CertRevType::EeDp
    } else if is_ca {
        CertRevType::Ca
    } else {
        CertRevType::Ee
    }
}

pub(crate) fn get_crl_info(crl: &CertificateList) -> Result<CrlInfo> {
    let this_update = crl.tbs_cert_list.this_update.to_unix_duration().as_secs();
    let next_update = crl
        .tbs_cert_list
        .next_update
        .map(|nu| nu.to_unix_duration().as_secs());
    let issuer_name_blob = match crl.tbs_cert_list.issuer.to_der() {
        Ok(enc) => enc,
        Err(_e) => return Err(Error::Unrecognized),
    };
    let issuer_name = name_to_string(&crl.tbs_cert_list.issuer);
    let mut idp_blob: Option<Vec<u8>> = None;
    let mut only_some_reasons: Option<ReasonFlags> = None;
    let mut skid: Option<Vec<u8>> = None;

    let mut questionnaire = CrlQuestionnaire::default();

    if let Some(exts) = &crl.tbs_cert_list.crl_extensions {
        for ext in exts.iter() {
            match ext.extn_id {
                ID_CE_ISSUING_DISTRIBUTION_POINT => {
                    idp_blob = Some(ext.extn_value.as_bytes().to_vec());
                    let idp = match IssuingDistributionPoint::from_der(ext.extn_value.as_bytes()) {
                        Ok(idp) => idp,
                        Err(e) => {
                            return Err(Error::Asn1Error(e));
                        }
                    };

                    match &idp.distribution_point {
                        Some(DistributionPointName::FullName(gns)) => {
                            let mut found_dn = false;
                            for gn in gns {
                                if let GeneralName::DirectoryName(_dn) = gn {
                                    found_dn = true;
                                    break;
                                }
                            }
                            if !found_dn {
                                // not supporting non-DN partitioned CRLs
                                return Err(Error::Unrecognized);
                            }
                        }
                        Some(DistributionPointName::NameRelativeToCRLIssuer(_unsupported)) => {
                            // not supporting name relative to issuer
                            return Err(Error::Unrecognized);
                        }
                        _ => {}
                    }

                    if idp.distribution_point.is_some() {
                        questionnaire |= CrlQuestions::Partitioned;
                    }

                    if idp.indirect_crl {
                        questionnaire |= CrlQuestions::Indirect;
                    }
                    if let Some(osr) = &idp.only_some_reasons {
                        questionnaire |= CrlQuestions::SomeReasons;
                        only_some_reasons = Some(*osr);
                    }
                    if idp.only_contains_user_certs {
                        questionnaire |= CrlQuestions::EeOnly;
                    }
                    if idp.only_contains_ca_certs {
                        questionnaire |= CrlQuestions::CaOnly;
                    }
                    if idp.only_contains_attribute_certs {
                        questionnaire |= CrlQuestions::AaOnly;
                    }
                }
                ID_CE_AUTHORITY_KEY_IDENTIFIER => {
                    if let Ok(akid) = AuthorityKeyIdentifier::from_der(ext.extn_value.as_bytes()) {
                        if let Some(kid) = akid.key_identifier {
                            skid = Some(kid.as_bytes().to_vec());
                        }
                    }
                }
                ID_CE_DELTA_CRL_INDICATOR => {
                    questionnaire |= CrlQuestions::Delta;
                }
                _ => {}
            }
        }
    }

    if questionnaire.contains(CrlQuestions::AaOnly) {
        // attribute certificate revocation lists are not processed
        return Err(Error::CrlIncompatible);
    }

    let coverage = if questionnaire.contains(CrlQuestions::EeOnly) {
        CrlCoverage::EeOnly
    } else if questionnaire.contains(CrlQuestions::CaOnly) {
        CrlCoverage::CaOnly
    } else {
        CrlCoverage::All
    };

    let authority = if questionnaire.contains(CrlQuestions::Indirect) {
        CrlAuthority::Indirect
    } else {
        CrlAuthority::Direct
    };

    let scope = if questionnaire.contains(CrlQuestions::Partitioned) {
        if questionnaire.contains(CrlQuestions::Delta) {
            CrlScope::DeltaDp
        } else {
            CrlScope::Dp
        }
    } else if questionnaire.contains(CrlQuestions::Delta) {
        CrlScope::Delta
    } else {
        CrlScope::Complete
    };

    let reasons = if questionnaire.contains(CrlQuestions::SomeReasons) {
        CrlReasons::SomeReasons
    } else {
        CrlReasons::AllReasons
    };

    let type_info = CrlType {
        scope,
        coverage,
        authority,
        reasons,
    };

    Ok(CrlInfo {
        type_info,
        skid,
        this_update,
        next_update,
        issuer_name,
        issuer_name_blob,
        idp_blob,
        only_some_reasons,
    })
}

/// is_delta returns true when the CRL carries a delta CRL indicator.
pub(crate) fn is_delta(crl_info: &CrlInfo) -> bool {
    CrlScope::Delta == crl_info.type_info.scope || CrlScope::DeltaDp == crl_info.type_info.scope
}

/// validate_crl_issuer_for_dp checks the CRL issuer against the operative distribution point per
/// RFC 5280 section 6.3.3 (b)(1): when the distribution point names a CRL issuer, the CRL must
/// have been issued by one of those names and must assert the indirect CRL flag; otherwise the CRL
/// issuer must match the certificate issuer exactly (DER-encoded name equality).
pub(crate) fn validate_crl_issuer_for_dp(
    cert: &PDVCertificate,
    dp: &DistributionPoint,
    crl_info: &CrlInfo,
) -> Result<()> {
    if let Some(crl_issuer) = &dp.crl_issuer {
        let mut name_matched = false;
        for gn in crl_issuer {
            if let GeneralName::DirectoryName(dn) = gn {
                if let Ok(enc_dn) = dn.to_der() {
                    if enc_dn == crl_info.issuer_name_blob {
                        name_matched = true;
                        break;
                    }
                }
            }
        }
        if !name_matched {
            return Err(Error::CrlIncompatible);
        }

        // an entry-issuer-bearing CRL obtained through a distinct CRL issuer must say so
        let enc_cert_issuer = match cert.decoded_cert.tbs_certificate.issuer.to_der() {
            Ok(enc) => enc,
            Err(_e) => return Err(Error::Unrecognized),
        };
        if enc_cert_issuer != crl_info.issuer_name_blob
            && CrlAuthority::Indirect != crl_info.type_info.authority
        {
            return Err(Error::CrlIncompatible);
        }
        Ok(())
    } else {
        let enc_cert_issuer = match cert.decoded_cert.tbs_certificate.issuer.to_der() {
            Ok(enc) => enc,
            Err(_e) => return Err(Error::Unrecognized),
        };
        if enc_cert_issuer != crl_info.issuer_name_blob {
            return Err(Error::CrlIncompatible);
        }
        Ok(())
    }
}

fn is_general_name_in_general_names(lhs: &GeneralNames, rhs: &GeneralName) -> bool {
    lhs.iter().any(|gn| gn == rhs)
}

fn at_least_one_general_name_in_common(
    gns_from_crl_dp: &GeneralNames,
    gns_from_idp: &GeneralNames,
) -> bool {
    gns_from_idp
        .iter()
        .any(|gn| is_general_name_in_general_names(gns_from_crl_dp, gn))
}

/// validate_distribution_point evaluates the operative distribution point against the CRL's
/// issuing distribution point extension and the certificate type, returning the subset of
/// revocation reasons this (distribution point, CRL) combination can attest to.
///
/// - When the CRL is partitioned, one of the names in the operative distribution point must match
///   one of the names in the issuing distribution point.
/// - CRLs scoped to only CA or only EE certificates must agree with the certificate type.
/// - The returned reasons are the intersection of the distribution point's reasons and the issuing
///   distribution point's onlySomeReasons, either of which defaults to all reasons when absent.
pub(crate) fn validate_distribution_point(
    dp: &DistributionPoint,
    crl_info: &CrlInfo,
    cert_type: CertRevType,
) -> Result<ReasonFlags> {
    if CrlScope::Dp == crl_info.type_info.scope || CrlScope::DeltaDp == crl_info.type_info.scope {
        let idp_blob = if let Some(idp_blob) = crl_info.idp_blob.as_ref() {
            idp_blob
        } else {
            return Err(Error::Unrecognized);
        };

        let idp = match IssuingDistributionPoint::from_der(idp_blob.as_slice()) {
            Ok(idp) => idp,
            Err(_e) => return Err(Error::Unrecognized),
        };

        let gns_from_idp = match idp.distribution_point {
            Some(DistributionPointName::FullName(gns)) => gns,
            Some(DistributionPointName::NameRelativeToCRLIssuer(_unsupported)) => {
                return Err(Error::Unrecognized)
            }
            _ => {
                // should not occur given the Dp or DeltaDp scope
                return Err(Error::Unrecognized);
            }
        };

        let found_match = match &dp.distribution_point {
            Some(DistributionPointName::FullName(gns_from_crl_dp)) => {
                at_least_one_general_name_in_common(gns_from_crl_dp, &gns_from_idp)
            }
            _ => {
                // when the distribution point carries no name, the CRL issuer name applies
                if let Some(crl_issuer) = &dp.crl_issuer {
                    at_least_one_general_name_in_common(crl_issuer, &gns_from_idp)
                } else {
                    false
                }
            }
        };

        if !found_match {
            return Err(Error::CrlIncompatible);
        }
    }

    if let Some(idp_blob) = &crl_info.idp_blob {
        let idp = match IssuingDistributionPoint::from_der(idp_blob.as_slice()) {
            Ok(idp) => idp,
            Err(e) => return Err(Error::Asn1Error(e)),
        };

        if idp.only_contains_attribute_certs {
            return Err(Error::CrlIncompatible);
        }

        if idp.only_contains_ca_certs
            && (CertRevType::Ee == cert_type || CertRevType::EeDp == cert_type)
        {
            return Err(Error::CrlIncompatible);
        }

        if idp.only_contains_user_certs
            && (CertRevType::Ca == cert_type || CertRevType::CaDp == cert_type)
        {
            return Err(Error::CrlIncompatible);
        }
    }

    let dp_reasons = dp.reasons.unwrap_or_else(all_reasons);
    let idp_reasons = crl_info.only_some_reasons.unwrap_or_else(all_reasons);
    let interim_reasons = dp_reasons & idp_reasons;
    if interim_reasons.is_empty() {
        return Err(Error::CrlIncompatible);
    }

    Ok(interim_reasons)
}

/// check_crl_cert_compatibility consults the scope and coverage compatibility tables to determine
/// whether a CRL is usable for a given certificate at all.
pub(crate) fn check_crl_cert_compatibility(
    cert_type: CertRevType,
    crl_info: &CrlInfo,
) -> Result<()> {
    if !COMPATIBLE_SCOPE[(cert_type as usize, crl_info.type_info.scope as usize)]
        || !COMPATIBLE_COVERAGE[(cert_type as usize, crl_info.type_info.coverage as usize)]
    {
        return Err(Error::CrlIncompatible);
    }
    Ok(())
}

/// verify_crl_signature verifies the signature on the presented encoded CRL using the presented
/// public key, deferring decoding so the signed bytes are verified exactly as conveyed.
pub(crate) fn verify_crl_signature(
    pe: &PkiEnvironment,
    crl_buf: &[u8],
    signer_spki: &spki::SubjectPublicKeyInfoOwned,
) -> Result<()> {
    let defer_crl = match DeferDecodeSigned::from_der(crl_buf) {
        Ok(crl) => crl,
        Err(_e) => return Err(Error::Unrecognized),
    };

    let r = pe.verify_signature_message(
        pe,
        &defer_crl.tbs_field,
        defer_crl.signature.raw_bytes(),
        &defer_crl.signature_algorithm,
        signer_spki,
    );
    if r.is_err() {
        return Err(Error::PathValidation(
            PathValidationStatus::SignatureVerificationFailure,
        ));
    }
    Ok(())
}

/// check_crl_sign affirms the presented certificate carries a key usage extension with the cRLSign
/// bit set, or carries no key usage extension at all.
pub(crate) fn check_crl_sign(cert: &Certificate) -> Result<()> {
    if let Some(exts) = &cert.tbs_certificate.extensions {
        for ext in exts {
            if ext.extn_id == ID_CE_KEY_USAGE {
                if let Ok(ku) = KeyUsage::from_der(ext.extn_value.as_bytes()) {
                    if !ku.0.contains(KeyUsages::CRLSign) {
                        error!("cRLSign is not set in key usage extension");
                        return Err(Error::PathValidation(PathValidationStatus::InvalidKeyUsage));
                    } else {
                        return Ok(());
                    }
                } else {
                    error!("key usage extension could not be parsed");
                    return Err(Error::PathValidation(PathValidationStatus::InvalidKeyUsage));
                }
            }
        }
    }
    Ok(())
}

/// check_entry_extensions inspects the extensions in a CRL entry. Invalidity date and reason codes
/// are informational, so presence is fine, as is the certificate issuer extension handled during
/// entry matching. Hold instruction is simply ignored with the corresponding certificate treated
/// as revoked. Presence of any other critical extension is cause to discard the CRL.
pub(crate) fn check_entry_extensions(rc: &RevokedCert) -> Result<()> {
    let exts_to_ignore = [
        ID_CE_INVALIDITY_DATE,
        ID_CE_CRL_REASONS,
        ID_CE_HOLD_INSTRUCTION_CODE,
        ID_CE_CERTIFICATE_ISSUER,
    ];
    if let Some(exts) = &rc.crl_entry_extensions {
        for e in exts {
            if e.critical && !exts_to_ignore.contains(&e.extn_id) {
                return Err(Error::UnsupportedCrlEntryExtension);
            }
        }
    }
    Ok(())
}

/// check_crl_extensions rejects CRLs bearing unrecognized critical extensions.
pub(crate) fn check_crl_extensions(exts: &Extensions) -> Result<()> {
    let exts_to_ignore = [
        ID_CE_ISSUING_DISTRIBUTION_POINT,
        ID_CE_DELTA_CRL_INDICATOR,
        ID_CE_FRESHEST_CRL,
        ID_CE_CRL_NUMBER,
        ID_CE_AUTHORITY_KEY_IDENTIFIER,
    ];
    for e in exts {
        if e.critical && !exts_to_ignore.contains(&e.extn_id) {
            return Err(Error::UnsupportedCrlExtension);
        }
    }
    Ok(())
}

/// check_crl_validity rejects CRLs whose currency window does not include the time of interest.
/// The comparison is inclusive on both ends; a time of interest of zero disables the check.
pub(crate) fn check_crl_validity(toi: u64, crl: &CertificateList) -> Result<()> {
    if 0 != toi {
        let tu = crl.tbs_cert_list.this_update.to_unix_duration().as_secs();
        if tu > toi {
            info!(
                "Discarding CRL from {} as having thisUpdate time ({}) later than time of interest ({})",
                name_to_string(&crl.tbs_cert_list.issuer),
                tu,
                toi
            );
            return Err(Error::CrlIncompatible);
        }
        if let Some(nu) = crl.tbs_cert_list.next_update {
            if nu.to_unix_duration().as_secs() < toi {
                info!(
                    "Discarding CRL from {} as having nextUpdate time earlier than time of interest ({})",
                    name_to_string(&crl.tbs_cert_list.issuer),
                    toi
                );
                return Err(Error::CrlIncompatible);
            }
        }
    }
    Ok(())
}

/// get_reason_from_entry returns the reason code conveyed in the entry's CRL reason extension, or
/// Unspecified when the entry carries none.
pub(crate) fn get_reason_from_entry(rc: &RevokedCert) -> CrlReason {
    if let Some(exts) = &rc.crl_entry_extensions {
        for e in exts {
            if e.extn_id == ID_CE_CRL_REASONS {
                if let Ok(reason) = CrlReason::from_der(e.extn_value.as_bytes()) {
                    return reason;
                }
            }
        }
    }
    CrlReason::Unspecified
}

/// entry_certificate_issuer returns the directory name from an entry's certificate issuer
/// extension, if present.
fn entry_certificate_issuer(rc: &RevokedCert) -> Option<Name> {
    if let Some(exts) = &rc.crl_entry_extensions {
        for e in exts {
            if e.extn_id == ID_CE_CERTIFICATE_ISSUER {
                if let Ok(gns) = GeneralNames::from_der(e.extn_value.as_bytes()) {
                    for gn in gns {
                        if let GeneralName::DirectoryName(dn) = gn {
                            return Some(dn);
                        }
                    }
                }
            }
        }
    }
    None
}

/// find_serial_in_crl searches the presented CRL for an entry matching the presented certificate,
/// honoring indirect CRL semantics: for an indirect CRL, entries apply to the CRL issuer until an
/// entry carries a certificate issuer extension, which switches the scope for that and subsequent
/// entries. Direct CRLs must not carry certificate issuer entry extensions.
pub(crate) fn find_serial_in_crl(
    crl: &CertificateList,
    cert: &PDVCertificate,
    crl_info: &CrlInfo,
) -> Result<Option<RevokedCert>> {
    let indirect = CrlAuthority::Indirect == crl_info.type_info.authority;
    let mut current_entry_issuer = crl.tbs_cert_list.issuer.clone();

    if let Some(revoked_certificates) = &crl.tbs_cert_list.revoked_certificates {
        for rc in revoked_certificates {
            if let Some(entry_issuer) = entry_certificate_issuer(rc) {
                if !indirect {
                    info!(
                        "Discarding CRL from {} due to presence of certificate issuer CRL entry extension on a direct CRL",
                        name_to_string(&crl.tbs_cert_list.issuer)
                    );
                    return Err(Error::UnsupportedCrlEntryExtension);
                }
                current_entry_issuer = entry_issuer;
            }

            if rc.serial_number == cert.decoded_cert.tbs_certificate.serial_number
                && compare_names(
                    &current_entry_issuer,
                    &cert.decoded_cert.tbs_certificate.issuer,
                )
            {
                check_entry_extensions(rc)?;
                return Ok(Some(rc.clone()));
            }
        }
    }
    Ok(None)
}

/// delta_matches_base determines whether a delta CRL can be combined with the presented complete
/// CRL: the issuer must match, the issuing distribution point must match, and when both carry an
/// authority key identifier those must match too.
pub(crate) fn delta_matches_base(delta_info: &CrlInfo, base_info: &CrlInfo) -> bool {
    if delta_info.issuer_name_blob != base_info.issuer_name_blob {
        return false;
    }
    if delta_info.idp_blob != base_info.idp_blob {
        return false;
    }
    if let (Some(delta_skid), Some(base_skid)) = (&delta_info.skid, &base_info.skid) {
        if delta_skid != base_skid {
            return false;
        }
    }
    true
}

/// synthesized_dp_for_issuer returns a distribution point naming the certificate's issuer for use
/// when a certificate carries no CRL distribution points extension.
pub(crate) fn synthesized_dp_for_issuer(cert: &PDVCertificate) -> DistributionPoint {
    DistributionPoint {
        distribution_point: Some(DistributionPointName::FullName(vec![
            GeneralName::DirectoryName(cert.decoded_cert.tbs_certificate.issuer.clone()),
        ])),
        reasons: None,
        crl_issuer: None,
    }
}

/// distribution_points_for_cert returns the distribution points from the certificate's CRL
/// distribution points extension, or a single synthesized distribution point naming the issuer
/// when the extension is absent.
pub(crate) fn distribution_points_for_cert(cert: &PDVCertificate) -> Vec<DistributionPoint> {
    if let Ok(Some(PDVExtension::CrlDistributionPoints(crl_dps))) =
        cert.get_extension(&ID_CE_CRL_DISTRIBUTION_POINTS)
    {
        if !crl_dps.0.is_empty() {
            return crl_dps.0.clone();
        }
    }
    vec![synthesized_dp_for_issuer(cert)]
}
