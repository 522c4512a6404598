//! High level revocation checking functionality
//!
//! The check_revocation module determines the revocation status of the certificates in a
//! certification path using CRLs. Several capabilities contribute:
//! - Cached revocation status (i.e., certificates whose "revoked" or "not revoked" status has been
//!   previously determined and saved in a cache that implements the
//!   [`RevocationStatusCache`](crate::RevocationStatusCache) trait)
//! - Stapled CRLs (i.e., provided by the application on the [`CertificationPath`] object)
//! - CRLs available via [`CrlSource`](crate::CrlSource) implementations
//!
//! For each certificate, CRLs are located per distribution point (or a synthesized distribution
//! point naming the certificate's issuer), each CRL's signer is resolved and verified (itself a
//! nested path building operation with revocation disabled for certificates already on the chain
//! under validation), delta CRL entries are reconciled when enabled, and the accumulated reasons
//! mask grows until either all reasons are accounted for or no more CRLs are available.

use log::{debug, info};

use const_oid::db::rfc5912::ID_CE_FRESHEST_CRL;
use der::{Decode, Encode};
use x509_cert::crl::CertificateList;
use x509_cert::ext::pkix::name::GeneralName;
use x509_cert::ext::pkix::{crl::dp::DistributionPoint, CrlReason};
use x509_cert::name::Name;
use x509_cert::Certificate;

use crate::builder::path_builder::build_path_for_target;
use crate::environment::pki_environment::PkiEnvironment;
use crate::revocation::crl::*;
use crate::revocation::status::{CertStatus, ReasonsMask};
use crate::source::ta_source::{buffer_to_hex, hex_skid_from_cert};
use crate::util::error::*;
use crate::util::pdv_utilities::name_to_string;
use crate::validator::cert_path::CertificationPath;
use crate::validator::path_results::*;
use crate::validator::path_settings::*;
use crate::validator::pdv_certificate::PDVCertificate;
use crate::validator::pdv_extension::{ExtensionProcessing, PDVExtension};
use crate::validator::pdv_trust_anchor::{
    get_certificate_from_trust_anchor, get_subject_public_key_info_from_trust_anchor,
    get_trust_anchor_name,
};

/// `check_revocation` is the top level revocation checking function. It determines the revocation
/// status of each certificate in the presented path, from the trust anchor end toward the target.
///
/// Ok is returned if status for all certificates can be determined and none were revoked. If a
/// certificate is found to be revoked,
/// Error::PathValidation(CertificateRevokedEndEntity) or
/// Error::PathValidation(CertificateRevokedIntermediateCa) is returned. If no certificates were
/// found to be revoked but status could not be determined for all certificates in the path,
/// Error::PathValidation(RevocationStatusNotDetermined) is returned; an unreachable or
/// unverifiable CRL is never silently treated as "unrevoked".
pub fn check_revocation(
    pe: &PkiEnvironment,
    cps: &CertificationPathSettings,
    cp: &mut CertificationPath,
    cpr: &mut CertificationPathResults,
) -> Result<()> {
    if !get_check_revocation_status(cps) {
        info!("Revocation checking disabled");
        return Ok(());
    }

    if pe.is_cert_a_trust_anchor(&cp.target).is_ok() {
        info!("Target is a trust anchor, revocation status determination not required");
        return Ok(());
    }

    let check_crls = get_check_crls(cps);
    let toi = get_time_of_interest(cps);

    // for convenience, combine target into array with the intermediate CA certs
    let mut v = cp.intermediates.clone();
    v.push(cp.target.clone());

    prepare_revocation_results(cpr, v.len())?;

    // the list of certificates under revocation check is threaded through cloned settings so that
    // nested path building operations (for CRL signers) disable revocation checking for any
    // certificate already on this chain, breaking recursion cycles without shared state
    let incoming_under_check = get_certs_under_revocation_check(cps);
    let mut nested_cps = cps.clone();
    let mut under_check = incoming_under_check.clone();
    for cert in &v {
        if !under_check.contains(&cert.encoded_cert) {
            under_check.push(cert.encoded_cert.clone());
        }
    }
    set_certs_under_revocation_check(&mut nested_cps, under_check);

    let mut issuer_name = get_trust_anchor_name(&cp.trust_anchor.decoded_ta)?.clone();
    let mut issuer_spki =
        get_subject_public_key_info_from_trust_anchor(&cp.trust_anchor.decoded_ta).clone();
    let mut issuer_cert: Option<Certificate> =
        get_certificate_from_trust_anchor(&cp.trust_anchor.decoded_ta).cloned();

    let max_index = v.len() - 1;

    // save up the statuses and return Ok only if none are Undetermined
    let mut statuses = vec![];
    for (pos, cur_cert) in v.iter().enumerate() {
        let cur_cert_subject = name_to_string(&cur_cert.decoded_cert.tbs_certificate.subject);
        let index_from_target = max_index - pos;
        let revoked_error = if pos == max_index {
            PathValidationStatus::CertificateRevokedEndEntity
        } else {
            PathValidationStatus::CertificateRevokedIntermediateCa
        };

        let mut cur_status = CertStatus::Undetermined;

        if incoming_under_check.contains(&cur_cert.encoded_cert) {
            // this certificate's status determination is already in progress in an enclosing
            // call; skipping here is what breaks the CRL signer dependency cycle
            info!(
                "Skipping revocation check for certificate issued to {} whose status determination is in progress",
                cur_cert_subject
            );
            cur_status = CertStatus::Unrevoked;
        }

        // check revocation status cache
        if CertStatus::Undetermined == cur_status {
            match pe.get_status(cur_cert, toi) {
                PathValidationStatus::Valid => {
                    info!("Determined revocation status (valid) using cached status for certificate issued to {}", cur_cert_subject);
                    cur_status = CertStatus::Unrevoked;
                }
                PathValidationStatus::CertificateRevoked => {
                    info!("Determined revocation status (revoked) using cached status for certificate issued to {}", cur_cert_subject);
                    set_validation_status(cpr, revoked_error);
                    set_failing_cert_index(cpr, index_from_target);
                    return Err(Error::PathValidation(revoked_error));
                }
                _ => {}
            }
        }

        if CertStatus::Undetermined == cur_status && check_crls {
            cur_status = check_revocation_for_cert(
                pe,
                cps,
                &nested_cps,
                cpr,
                cur_cert,
                &issuer_name,
                &issuer_spki,
                issuer_cert.as_ref(),
                pos,
                cp.crls[pos].as_deref(),
            );

            match &cur_status {
                CertStatus::Revoked { reason, time } => {
                    info!(
                        "Determined revocation status (revoked with reason {:?} at {}) using CRL for certificate issued to {}",
                        reason, time, cur_cert_subject
                    );
                    set_validation_status(cpr, revoked_error);
                    set_failing_cert_index(cpr, index_from_target);
                    return Err(Error::PathValidation(revoked_error));
                }
                CertStatus::Unrevoked => {
                    info!(
                        "Determined revocation status (valid) using CRLs for certificate issued to {}",
                        cur_cert_subject
                    );
                }
                CertStatus::Undetermined => {
                    info!(
                        "Failed to determine revocation status for certificate issued to {}",
                        cur_cert_subject
                    );
                }
            }
        }

        statuses.push((cur_status, index_from_target));

        issuer_name = cur_cert.decoded_cert.tbs_certificate.subject.clone();
        issuer_spki = cur_cert
            .decoded_cert
            .tbs_certificate
            .subject_public_key_info
            .clone();
        issuer_cert = Some(cur_cert.decoded_cert.clone());
    }

    if let Some((_, index)) = statuses
        .iter()
        .find(|(status, _)| CertStatus::Undetermined == *status)
    {
        set_validation_status(cpr, PathValidationStatus::RevocationStatusNotDetermined);
        set_failing_cert_index(cpr, *index);
        return Err(Error::PathValidation(
            PathValidationStatus::RevocationStatusNotDetermined,
        ));
    }
    Ok(())
}

/// `gather_crl_candidates` collects candidate CRL buffers for a (certificate, distribution point)
/// pair: a stapled CRL first, then store lookups keyed by the distribution point's CRL issuer
/// names or the certificate's issuer.
fn gather_crl_candidates(
    pe: &PkiEnvironment,
    dp: &DistributionPoint,
    target_cert: &PDVCertificate,
    stapled_crl: Option<&[u8]>,
) -> Vec<Vec<u8>> {
    let mut crl_bufs: Vec<Vec<u8>> = vec![];
    if let Some(stapled) = stapled_crl {
        crl_bufs.push(stapled.to_vec());
    }

    if let Some(crl_issuer) = &dp.crl_issuer {
        for gn in crl_issuer {
            if let GeneralName::DirectoryName(dn) = gn {
                if let Ok(crls) = pe.get_crls_for_name(dn) {
                    for crl in crls {
                        if !crl_bufs.contains(&crl) {
                            crl_bufs.push(crl);
                        }
                    }
                }
            }
        }
    }

    if let Ok(crls) = pe.get_crls(target_cert) {
        for crl in crls {
            if !crl_bufs.contains(&crl) {
                crl_bufs.push(crl);
            }
        }
    }

    crl_bufs
}

/// `gather_delta_candidates` collects candidate delta CRL buffers referenced by the certificate's
/// freshest CRL extension or issued under the same name as the presented complete CRL.
fn gather_delta_candidates(
    pe: &PkiEnvironment,
    target_cert: &PDVCertificate,
    base_info: &CrlInfo,
) -> Vec<Vec<u8>> {
    let mut delta_bufs: Vec<Vec<u8>> = vec![];

    if let Ok(Some(PDVExtension::FreshestCrl(fresh))) =
        target_cert.get_extension(&ID_CE_FRESHEST_CRL)
    {
        for dp in &fresh.0 {
            if let Some(crl_issuer) = &dp.crl_issuer {
                for gn in crl_issuer {
                    if let GeneralName::DirectoryName(dn) = gn {
                        if let Ok(crls) = pe.get_crls_for_name(dn) {
                            for crl in crls {
                                if !delta_bufs.contains(&crl) {
                                    delta_bufs.push(crl);
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    if let Ok(crl_issuer_name) = Name::from_der(&base_info.issuer_name_blob) {
        if let Ok(crls) = pe.get_crls_for_name(&crl_issuer_name) {
            for crl in crls {
                if !delta_bufs.contains(&crl) {
                    delta_bufs.push(crl);
                }
            }
        }
    }

    delta_bufs
}

/// `resolve_crl_signer` resolves the public key with which a CRL's signature should be verified.
///
/// The issuer certificate already trusted in the enclosing chain is preferred when its name
/// matches the CRL issuer, avoiding a nested path build entirely. Otherwise, candidate signer
/// certificates are collected by subject-name match (refined by the CRL's authority key
/// identifier when present), their cRLSign key usage bit is affirmed, and each candidate's own
/// certification path is built and validated using the presented settings, whose
/// certificates-under-revocation-check list disables revocation checking for certificates already
/// on the enclosing chain.
#[allow(clippy::too_many_arguments)]
fn resolve_crl_signer(
    pe: &PkiEnvironment,
    nested_cps: &CertificationPathSettings,
    crl_info: &CrlInfo,
    issuer_name: &Name,
    issuer_spki: &spki::SubjectPublicKeyInfoOwned,
    issuer_cert: Option<&Certificate>,
) -> Result<spki::SubjectPublicKeyInfoOwned> {
    if let Ok(enc_issuer_name) = issuer_name.to_der() {
        if enc_issuer_name == crl_info.issuer_name_blob {
            if let Some(cert) = issuer_cert {
                check_crl_sign(cert)?;
            }
            return Ok(issuer_spki.clone());
        }
    }

    let crl_issuer_name = Name::from_der(&crl_info.issuer_name_blob)?;
    let candidates = pe.get_certificates_for_name(&crl_issuer_name)?;
    let mut last_error = Error::NotFound;
    for cand in candidates {
        if let Some(crl_skid) = &crl_info.skid {
            let cand_skid = hex_skid_from_cert(cand);
            if !cand_skid.is_empty() && cand_skid != buffer_to_hex(crl_skid) {
                continue;
            }
        }
        if check_crl_sign(&cand.decoded_cert).is_err() {
            continue;
        }

        let cand_spki = cand
            .decoded_cert
            .tbs_certificate
            .subject_public_key_info
            .clone();

        if pe.is_cert_a_trust_anchor(cand).is_ok() {
            return Ok(cand_spki);
        }

        let mut nested_cpr = CertificationPathResults::new();
        match build_path_for_target(pe, cand, nested_cps, &mut nested_cpr) {
            Ok(_cp) => return Ok(cand_spki),
            Err(e) => {
                debug!(
                    "Failed to validate prospective CRL signer issued to {} with {}",
                    name_to_string(&cand.decoded_cert.tbs_certificate.subject),
                    e
                );
                last_error = e;
            }
        }
    }
    Err(last_error)
}

/// `check_revocation_for_cert` determines the revocation status of one certificate from CRLs per
/// RFC 5280 section 6.3.3, iterating the certificate's distribution points (or a synthesized
/// distribution point naming the issuer) and accumulating a reasons mask until the status is
/// resolved, all reasons are covered, or candidates are exhausted.
#[allow(clippy::too_many_arguments)]
fn check_revocation_for_cert(
    pe: &PkiEnvironment,
    cps: &CertificationPathSettings,
    nested_cps: &CertificationPathSettings,
    cpr: &mut CertificationPathResults,
    target_cert: &PDVCertificate,
    issuer_name: &Name,
    issuer_spki: &spki::SubjectPublicKeyInfoOwned,
    issuer_cert: Option<&Certificate>,
    pos: usize,
    stapled_crl: Option<&[u8]>,
) -> CertStatus {
    let toi = get_time_of_interest(cps);
    let use_deltas = get_use_deltas(cps);
    let cert_type = classify_certificate(target_cert);

    let mut reasons_mask = ReasonsMask::new();
    let mut revoked: Option<(CrlReason, u64)> = None;
    // smallest nextUpdate across contributing CRLs bounds how long a cached determination holds
    let mut cache_next_update: Option<u64> = None;

    let dps = distribution_points_for_cert(target_cert);
    for dp in &dps {
        if revoked.is_some() || reasons_mask.is_all_reasons() {
            break;
        }

        let crl_bufs = gather_crl_candidates(pe, dp, target_cert, stapled_crl);
        for crl_buf in &crl_bufs {
            if revoked.is_some() || reasons_mask.is_all_reasons() {
                break;
            }

            let crl = match CertificateList::from_der(crl_buf) {
                Ok(crl) => crl,
                Err(e) => {
                    debug!("Failed to parse candidate CRL with {}", e);
                    add_failed_crl(cpr, crl_buf, pos);
                    continue;
                }
            };
            let crl_info = match get_crl_info(&crl) {
                Ok(info) => info,
                Err(_e) => {
                    add_failed_crl(cpr, crl_buf, pos);
                    continue;
                }
            };

            // deltas are selected relative to a complete CRL below, never consumed directly
            if is_delta(&crl_info) {
                continue;
            }

            if check_crl_cert_compatibility(cert_type, &crl_info).is_err() {
                info!(
                    "Discarding CRL from {} as having incompatible scope or coverage for certificate issued to {}",
                    crl_info.issuer_name,
                    name_to_string(&target_cert.decoded_cert.tbs_certificate.subject)
                );
                continue;
            }

            if check_crl_validity(toi, &crl).is_err() {
                add_failed_crl(cpr, crl_buf, pos);
                continue;
            }

            if let Some(exts) = &crl.tbs_cert_list.crl_extensions {
                if check_crl_extensions(exts).is_err() {
                    info!(
                        "Discarding CRL from {} due to unrecognized critical extension",
                        crl_info.issuer_name
                    );
                    add_failed_crl(cpr, crl_buf, pos);
                    continue;
                }
            }

            if validate_crl_issuer_for_dp(target_cert, dp, &crl_info).is_err() {
                info!(
                    "Discarding CRL from {} as having incompatible issuer for certificate issued to {}",
                    crl_info.issuer_name,
                    name_to_string(&target_cert.decoded_cert.tbs_certificate.subject)
                );
                continue;
            }

            let interim_reasons = match validate_distribution_point(dp, &crl_info, cert_type) {
                Ok(reasons) => reasons,
                Err(_e) => {
                    info!(
                        "Discarding CRL from {} as having incompatible distribution point for certificate issued to {}",
                        crl_info.issuer_name,
                        name_to_string(&target_cert.decoded_cert.tbs_certificate.subject)
                    );
                    continue;
                }
            };

            // skip CRLs that cannot make progress against the accumulated mask
            if !reasons_mask.adds_new_reasons(interim_reasons) {
                continue;
            }

            let signer_spki = match resolve_crl_signer(
                pe,
                nested_cps,
                &crl_info,
                issuer_name,
                issuer_spki,
                issuer_cert,
            ) {
                Ok(spki) => spki,
                Err(e) => {
                    info!(
                        "Failed to resolve signer for CRL from {} with {}",
                        crl_info.issuer_name, e
                    );
                    add_failed_crl(cpr, crl_buf, pos);
                    continue;
                }
            };

            if verify_crl_signature(pe, crl_buf, &signer_spki).is_err() {
                info!(
                    "Discarding CRL from {} due to signature verification failure",
                    crl_info.issuer_name
                );
                add_failed_crl(cpr, crl_buf, pos);
                continue;
            }

            // select and verify a matching delta CRL, preferring the freshest acceptable one
            let mut delta: Option<(Vec<u8>, CertificateList, CrlInfo)> = None;
            if use_deltas {
                for delta_buf in gather_delta_candidates(pe, target_cert, &crl_info) {
                    let delta_crl = match CertificateList::from_der(&delta_buf) {
                        Ok(crl) => crl,
                        Err(_e) => continue,
                    };
                    let delta_info = match get_crl_info(&delta_crl) {
                        Ok(info) => info,
                        Err(_e) => continue,
                    };
                    if !is_delta(&delta_info) || !delta_matches_base(&delta_info, &crl_info) {
                        continue;
                    }
                    if check_crl_validity(toi, &delta_crl).is_err() {
                        continue;
                    }
                    if verify_crl_signature(pe, &delta_buf, &signer_spki).is_err() {
                        add_failed_crl(cpr, &delta_buf, pos);
                        continue;
                    }
                    let newer = match &delta {
                        Some((_, _, cur)) => delta_info.this_update > cur.this_update,
                        None => true,
                    };
                    if newer {
                        delta = Some((delta_buf, delta_crl, delta_info));
                    }
                }
            }

            // look up the certificate's serial number in the delta CRL first, then the complete CRL
            let mut entry = None;
            let mut entry_from_delta = false;
            if let Some((delta_buf, delta_crl, delta_info)) = &delta {
                match find_serial_in_crl(delta_crl, target_cert, delta_info) {
                    Ok(Some(rc)) => {
                        entry = Some(rc);
                        entry_from_delta = true;
                        add_crl(cpr, delta_buf, pos);
                    }
                    Ok(None) => {}
                    Err(_e) => {
                        add_failed_crl(cpr, delta_buf, pos);
                    }
                }
            }
            if entry.is_none() {
                match find_serial_in_crl(&crl, target_cert, &crl_info) {
                    Ok(Some(rc)) => {
                        entry = Some(rc);
                    }
                    Ok(None) => {}
                    Err(_e) => {
                        add_failed_crl(cpr, crl_buf, pos);
                        continue;
                    }
                }
            }

            if let Some(rc) = entry {
                let reason = get_reason_from_entry(&rc);
                let rev_time = rc.revocation_date.to_unix_duration().as_secs();
                if entry_from_delta && CrlReason::RemoveFromCRL == reason {
                    // the delta removed the entry from the base CRL; not revoked under this DP
                    info!(
                        "Entry for certificate issued to {} was removed by delta CRL from {}",
                        name_to_string(&target_cert.decoded_cert.tbs_certificate.subject),
                        crl_info.issuer_name
                    );
                } else if matches!(
                    reason,
                    CrlReason::Unspecified
                        | CrlReason::KeyCompromise
                        | CrlReason::CaCompromise
                        | CrlReason::AaCompromise
                ) || 0 == toi
                    || rev_time <= toi
                {
                    if let Ok(enc_entry) = rc.to_der() {
                        add_crl_entry(cpr, &enc_entry, pos);
                    }
                    add_crl(cpr, crl_buf, pos);
                    revoked = Some((reason, rev_time));
                }
            }

            if revoked.is_none() {
                add_crl(cpr, crl_buf, pos);
            }
            reasons_mask.add_reasons(interim_reasons);
            if let Some(nu) = crl_info.next_update {
                cache_next_update = Some(match cache_next_update {
                    Some(cur) => cur.min(nu),
                    None => nu,
                });
            }
        }
    }

    if let Some((reason, time)) = revoked {
        pe.add_status(
            target_cert,
            cache_next_update.unwrap_or(0),
            PathValidationStatus::CertificateRevoked,
        );
        return CertStatus::Revoked { reason, time };
    }
    if reasons_mask.is_all_reasons() {
        pe.add_status(
            target_cert,
            cache_next_update.unwrap_or(0),
            PathValidationStatus::Valid,
        );
        CertStatus::Unrevoked
    } else {
        CertStatus::Undetermined
    }
}
