//! Functions related to certification path building operations
//!
//! The path builder performs a depth-first backtracking search over the pool of candidate issuer
//! certificates available via the [`PkiEnvironment`]'s certificate sources, starting at the target
//! certificate. When the issuer of the certificate at the top of the growing chain matches one or
//! more trust anchors, a prospective certification path is assembled and handed to the validator.
//! The first chain that validates wins; validation failures abort only the branch that produced
//! them, with the most recent failure retained for diagnostics should the whole search fail.

use log::{debug, info};

use const_oid::db::rfc5912::ID_CE_AUTHORITY_KEY_IDENTIFIER;

use crate::environment::pki_environment::PkiEnvironment;
use crate::util::error::*;
use crate::util::pdv_utilities::{compare_names, is_self_issued, name_to_string, valid_at_time};
use crate::validator::cert_path::CertificationPath;
use crate::validator::path_results::CertificationPathResults;
use crate::validator::path_settings::*;
use crate::validator::pdv_certificate::PDVCertificate;
use crate::validator::pdv_extension::{ExtensionProcessing, PDVExtension};

/// `pub_key_in_chain` returns true if the public key of the prospective certificate already
/// appears in the chain under construction. Repeated keys add no value to a certification path and
/// typically indicate a cross-certified loop.
fn pub_key_in_chain(prospective_cert: &PDVCertificate, chain: &[PDVCertificate]) -> bool {
    let prospective_spki = &prospective_cert
        .decoded_cert
        .tbs_certificate
        .subject_public_key_info;
    chain.iter().any(|c| {
        &c.decoded_cert.tbs_certificate.subject_public_key_info == prospective_spki
    })
}

/// `cert_in_chain` returns true if the prospective certificate already appears in the chain under
/// construction, comparing encoded certificates.
fn cert_in_chain(prospective_cert: &PDVCertificate, chain: &[PDVCertificate]) -> bool {
    chain
        .iter()
        .any(|c| c.encoded_cert == prospective_cert.encoded_cert)
}

/// `non_self_issued_count` returns the number of certificates in the chain that are not
/// self-issued, not counting the target, i.e., the number of intermediate CA certificates that
/// consume path length budget.
fn non_self_issued_count(chain: &[PDVCertificate]) -> usize {
    chain
        .iter()
        .skip(1)
        .filter(|c| !is_self_issued(&c.decoded_cert))
        .count()
}

/// `find_prospective_issuers` gathers candidate issuer certificates for the presented certificate
/// from the environment's certificate sources. Candidates are collected by subject-name match
/// against the certificate's issuer field and refined by authority key identifier when one is
/// present. Candidate order follows store iteration order, which is implementation-defined.
fn find_prospective_issuers<'a>(
    pe: &'a PkiEnvironment,
    cert: &PDVCertificate,
) -> Vec<&'a PDVCertificate> {
    let mut retval: Vec<&PDVCertificate> = vec![];

    // AKID-keyed lookups are tried first so keyed matches are preferred over name-only matches
    if let Ok(Some(PDVExtension::AuthorityKeyIdentifier(akid))) =
        cert.get_extension(&ID_CE_AUTHORITY_KEY_IDENTIFIER)
    {
        if let Some(kid) = &akid.key_identifier {
            if let Ok(certs) = pe.get_certificates_for_skid(kid.as_bytes()) {
                for c in certs {
                    if compare_names(
                        &c.decoded_cert.tbs_certificate.subject,
                        &cert.decoded_cert.tbs_certificate.issuer,
                    ) && !retval.iter().any(|r| r.encoded_cert == c.encoded_cert)
                    {
                        retval.push(c);
                    }
                }
            }
        }
    }

    if let Ok(certs) = pe.get_certificates_for_name(&cert.decoded_cert.tbs_certificate.issuer) {
        for c in certs {
            if !retval.iter().any(|r| r.encoded_cert == c.encoded_cert) {
                retval.push(c);
            }
        }
    }

    retval
}

/// `validate_prospective_path` assembles a [`CertificationPath`] from the chain under construction
/// and the presented trust anchor then hands it to the environment's validator. The chain is
/// ordered from the target upward; intermediates in the assembled path run from the trust anchor
/// downward.
fn validate_prospective_path(
    pe: &PkiEnvironment,
    cps: &CertificationPathSettings,
    chain: &[PDVCertificate],
    ta: &crate::PDVTrustAnchorChoice,
    cpr: &mut CertificationPathResults,
) -> Result<CertificationPath> {
    let target = chain[0].clone();
    let intermediates: CertificateChain = chain[1..].iter().rev().cloned().collect();
    let mut cp = CertificationPath::new(ta.clone(), intermediates, target);
    pe.validate_path(pe, cps, &mut cp, cpr)?;
    Ok(cp)
}

#[allow(clippy::too_many_arguments)]
fn try_extend(
    pe: &PkiEnvironment,
    cps: &CertificationPathSettings,
    chain: &mut Vec<PDVCertificate>,
    excluded: &Buffers,
    max_path_length: u8,
    last_error: &mut Option<Error>,
    last_results: &mut Option<CertificationPathResults>,
) -> Option<CertificationPath> {
    let cand_issuer = chain[chain.len() - 1]
        .decoded_cert
        .tbs_certificate
        .issuer
        .clone();

    // trust anchor short-circuit: every anchor matching the issuer name is tried, as more than one
    // trust anchor may carry the same name with different keys
    if let Ok(tas) = pe.get_trust_anchors_by_name(&cand_issuer) {
        for ta in tas {
            let mut cpr = CertificationPathResults::new();
            match validate_prospective_path(pe, cps, chain, ta, &mut cpr) {
                Ok(cp) => {
                    *last_results = Some(cpr);
                    return Some(cp);
                }
                Err(e) => {
                    debug!(
                        "Abandoning prospective path anchored at {} with {}",
                        name_to_string(&cand_issuer),
                        e
                    );
                    *last_error = Some(e);
                    *last_results = Some(cpr);
                }
            }
        }
    }

    // no trust anchor produced a validated path; search for issuer certificates and recurse.
    // a self-signed, untrusted certificate at the top naturally terminates the branch here: its
    // only candidate issuer is itself, which the duplicate and repeated-key guards below reject,
    // while key-rollover certificates (same name, distinct key) remain expandable.
    let top = chain[chain.len() - 1].clone();
    let prospective_issuers = find_prospective_issuers(pe, &top);
    for issuer in prospective_issuers {
        if cert_in_chain(issuer, chain) || pub_key_in_chain(issuer, chain) {
            continue;
        }
        if excluded.contains(&issuer.encoded_cert) {
            continue;
        }

        // prune the branch when the non-self-issued intermediate count would exceed the bound
        let mut prospective_count = non_self_issued_count(chain);
        if !is_self_issued(&issuer.decoded_cert) {
            prospective_count += 1;
        }
        if prospective_count > max_path_length as usize {
            continue;
        }

        chain.push(issuer.clone());
        if let Some(cp) = try_extend(
            pe,
            cps,
            chain,
            excluded,
            max_path_length,
            last_error,
            last_results,
        ) {
            return Some(cp);
        }
        chain.pop();
    }

    None
}

/// `build_path_for_target` performs a depth-first backtracking search for a certification path
/// from the presented target certificate to a trust anchor available via the [`PkiEnvironment`].
///
/// Candidate issuers are drawn from the environment's certificate sources by subject-name match
/// refined by key identifiers; candidate order follows store iteration order and is
/// implementation-defined. Each prospective chain ending at a trust anchor is handed to the
/// environment's validator; the first chain that validates is returned along with the
/// corresponding [`CertificationPathResults`] contents in the cpr parameter. When no chain
/// validates, the most recent validation failure is returned, or NoPathsFound when the search
/// space was empty.
pub fn build_path_for_target(
    pe: &PkiEnvironment,
    target: &PDVCertificate,
    cps: &CertificationPathSettings,
    cpr: &mut CertificationPathResults,
) -> Result<CertificationPath> {
    let excluded = get_excluded_certificates(cps);
    if excluded.contains(&target.encoded_cert) {
        info!(
            "No paths found because target certificate issued to {} is excluded",
            name_to_string(&target.decoded_cert.tbs_certificate.subject)
        );
        return Err(Error::PathValidation(PathValidationStatus::NoPathsFound));
    }

    let toi = get_time_of_interest(cps);
    if valid_at_time(&target.decoded_cert.tbs_certificate, toi, true).is_err() {
        info!(
            "No paths found because target is not valid at the indicated time of interest ({})",
            toi
        );
        return Err(Error::PathValidation(PathValidationStatus::NoPathsFound));
    }

    let max_path_length = get_initial_path_length_constraint(cps);
    let mut chain = vec![target.clone()];
    let mut last_error: Option<Error> = None;
    let mut last_results: Option<CertificationPathResults> = None;

    let result = try_extend(
        pe,
        cps,
        &mut chain,
        &excluded,
        max_path_length,
        &mut last_error,
        &mut last_results,
    );

    if let Some(results) = last_results {
        *cpr = results;
    }

    match result {
        Some(cp) => Ok(cp),
        None => match last_error {
            Some(e) => Err(e),
            None => {
                info!(
                    "No prospective paths found for certificate issued to {}",
                    name_to_string(&target.decoded_cert.tbs_certificate.subject)
                );
                Err(Error::PathValidation(PathValidationStatus::NoPathsFound))
            }
        },
    }
}
