//! Utility functions that support certification path processing

use lazy_static::lazy_static;
use log::error;
use regex::Regex;

use const_oid::db::rfc3280::EMAIL_ADDRESS;
use const_oid::db::rfc5912::{ID_CE_BASIC_CONSTRAINTS, ID_CE_INHIBIT_ANY_POLICY, ID_CE_POLICY_CONSTRAINTS};
use der::asn1::{Ia5String, PrintableString};
use der::{Decode, Encode};
use spki::SubjectPublicKeyInfoOwned;
use x509_cert::anchor::{CertPolicies, TrustAnchorChoice};
use x509_cert::ext::pkix::constraints::{BasicConstraints, PolicyConstraints};
use x509_cert::ext::pkix::InhibitAnyPolicy;
use x509_cert::name::Name;
use x509_cert::{Certificate, TbsCertificate};

use crate::environment::pki_environment::PkiEnvironment;
use crate::util::error::*;
use crate::util::pdv_alg_oids::PKIXALG_DSA;
use crate::validator::pdv_certificate::{DeferDecodeSigned, PDVCertificate};
use crate::validator::path_settings::PS_MAX_PATH_LENGTH_CONSTRAINT;

/// `is_self_signed_with_buffer` returns true if the public key in the parsed certificate can be
/// used to verify the TBSCertificate field as parsed from the encoded certificate object.
pub fn is_self_signed_with_buffer(
    pe: &PkiEnvironment,
    cert: &Certificate,
    enc_cert: &[u8],
) -> bool {
    match DeferDecodeSigned::from_der(enc_cert) {
        Ok(defer_cert) => {
            let r = pe.verify_signature_message(
                pe,
                &defer_cert.tbs_field,
                cert.signature.raw_bytes(),
                &cert.tbs_certificate.signature,
                &cert.tbs_certificate.subject_public_key_info,
            );
            r.is_ok()
        }
        Err(e) => {
            error!(
                "Failed to defer decode certificate in is_self_signed with: {}",
                e
            );
            false
        }
    }
}

/// `is_self_signed` returns true if the public key in the certificate can be used to verify the
/// signature on the certificate.
pub fn is_self_signed(pe: &PkiEnvironment, cert: &PDVCertificate) -> bool {
    is_self_signed_with_buffer(pe, &cert.decoded_cert, cert.encoded_cert.as_slice())
}

/// `is_self_issued` returns true if the subject field in the certificate is the same as the issuer
/// field.
pub fn is_self_issued(cert: &Certificate) -> bool {
    compare_names(
        &cert.tbs_certificate.issuer,
        &cert.tbs_certificate.subject,
    )
}

/// `compare_names` compares two Name values, returning true if they match and false otherwise.
///
/// Matching is performed on the DER encoding of each name, i.e., no case folding or whitespace
/// normalization is performed.
pub fn compare_names(lhs: &Name, rhs: &Name) -> bool {
    if lhs == rhs {
        return true;
    }
    match (lhs.to_der(), rhs.to_der()) {
        (Ok(l), Ok(r)) => l == r,
        _ => false,
    }
}

/// `name_to_string` returns a string representation of the given Name per RFC 4514.
pub fn name_to_string(name: &Name) -> String {
    name.to_string()
}

/// `valid_at_time` evaluates the not_before and not_after fields of the given TBSCertificate instance
/// and provides an indication of validity relative to presented time of interest.
///
/// It returns the number of seconds left to live if the certificate is valid at the given time or
/// an error indicating which field failed if the certificate is not valid. The not_before field is
/// evaluated first. A time of interest value of zero disables the check.
///
/// To stifle logging output upon error, pass true for the stifle_log parameter.
pub fn valid_at_time(target: &TbsCertificate, toi: u64, stifle_log: bool) -> Result<u64> {
    if 0 == toi {
        // zero is used to disable validity check
        return Ok(0);
    }

    let nb = target.validity.not_before.to_unix_duration().as_secs();
    if nb > toi {
        if !stifle_log {
            log_error_for_name(
                &target.subject,
                "certificate is not yet valid relative to the configured time of interest",
            );
        }
        return Err(Error::PathValidation(
            PathValidationStatus::InvalidNotBeforeDate,
        ));
    }

    let na = target.validity.not_after.to_unix_duration().as_secs();
    if na < toi {
        if !stifle_log {
            log_error_for_name(
                &target.subject,
                format!(
                    "certificate is expired relative to the configured time of interest: {}",
                    target.validity.not_after
                )
                .as_str(),
            );
        }
        Err(Error::PathValidation(
            PathValidationStatus::InvalidNotAfterDate,
        ))
    } else {
        Ok(na - toi)
    }
}

/// `ta_valid_at_time` evaluates the validity of the certificate in a TrustAnchorChoice, if any,
/// relative to the presented time of interest. Trust anchors expressed as TrustAnchorInfo without
/// a wrapped certificate carry no validity period and pass unconditionally.
pub fn ta_valid_at_time(ta: &TrustAnchorChoice, toi: u64, stifle_log: bool) -> Result<u64> {
    match ta {
        TrustAnchorChoice::Certificate(cert) => {
            valid_at_time(&cert.tbs_certificate, toi, stifle_log)
        }
        TrustAnchorChoice::TaInfo(tai) => {
            if let Some(cert_path) = &tai.cert_path {
                if let Some(cert) = &cert_path.certificate {
                    return valid_at_time(&cert.tbs_certificate, toi, stifle_log);
                }
            }
            Ok(0)
        }
        _ => Ok(0),
    }
}

pub(crate) fn log_error_for_name(name: &Name, msg: &str) {
    error!("Encountered error processing {}: {}", name_to_string(name), msg);
}

pub(crate) fn log_error_for_ca(ca_cert: &PDVCertificate, msg: &str) {
    log_error_for_subject(&ca_cert.decoded_cert, msg);
}

pub(crate) fn log_error_for_subject(cert: &Certificate, msg: &str) {
    log_error_for_name(&cert.tbs_certificate.subject, msg);
}

/// `spki_with_inherited_parameters` supports DSA parameter inheritance. When the presented key is
/// a DSA key that omits domain parameters and the issuer's key is a DSA key that includes them,
/// a copy of the presented key carrying the issuer's parameters is returned. None is returned when
/// inheritance does not apply.
pub fn spki_with_inherited_parameters(
    spki: &SubjectPublicKeyInfoOwned,
    issuer_spki: &SubjectPublicKeyInfoOwned,
) -> Option<SubjectPublicKeyInfoOwned> {
    if spki.algorithm.oid != PKIXALG_DSA || spki.algorithm.parameters.is_some() {
        return None;
    }
    if issuer_spki.algorithm.oid != PKIXALG_DSA {
        return None;
    }
    issuer_spki.algorithm.parameters.as_ref().map(|params| {
        let mut inherited = spki.clone();
        inherited.algorithm.parameters = Some(params.clone());
        inherited
    })
}

/// `get_inhibit_any_policy_from_trust_anchor` returns true if the trust anchor inhibits the use of
/// anyPolicy during certification path processing.
///
/// True is returned if inhibit any policy is found in an extension in the TA certificate for the
/// Certificate CHOICE or the value from CertPathControls.PolicyFlags for the TrustAnchorInfo CHOICE.
pub(crate) fn get_inhibit_any_policy_from_trust_anchor(ta: &TrustAnchorChoice) -> Result<bool> {
    match ta {
        TrustAnchorChoice::Certificate(cert) => {
            if let Some(extensions) = &cert.tbs_certificate.extensions {
                for ext in extensions.iter() {
                    if ID_CE_INHIBIT_ANY_POLICY == ext.extn_id {
                        let iap_result = InhibitAnyPolicy::from_der(ext.extn_value.as_bytes());
                        if iap_result.is_ok() {
                            return Ok(true);
                        }
                    }
                }
            }
        }
        TrustAnchorChoice::TaInfo(tai) => {
            if let Some(cert_path) = &tai.cert_path {
                if let Some(pf) = cert_path.policy_flags {
                    if pf.contains(CertPolicies::InhibitAnyPolicy) {
                        return Ok(true);
                    }
                }
            }
        }
        _ => {
            return Err(Error::Unrecognized);
        }
    }
    Ok(false)
}

/// `get_require_explicit_policy_from_trust_anchor` returns true if the trust anchor requires all
/// paths to be valid under at least one policy during certification path processing.
pub(crate) fn get_require_explicit_policy_from_trust_anchor(
    ta: &TrustAnchorChoice,
) -> Result<bool> {
    match ta {
        TrustAnchorChoice::Certificate(cert) => {
            if let Some(extensions) = &cert.tbs_certificate.extensions {
                for ext in extensions.iter() {
                    if ID_CE_POLICY_CONSTRAINTS == ext.extn_id {
                        if let Ok(pc) = PolicyConstraints::from_der(ext.extn_value.as_bytes()) {
                            if pc.require_explicit_policy.is_some() {
                                return Ok(true);
                            }
                        }
                    }
                }
            }
        }
        TrustAnchorChoice::TaInfo(tai) => {
            if let Some(cert_path) = &tai.cert_path {
                if let Some(pf) = cert_path.policy_flags {
                    if pf.contains(CertPolicies::RequireExplicitPolicy) {
                        return Ok(true);
                    }
                }
            }
        }
        _ => {
            return Err(Error::Unrecognized);
        }
    }
    Ok(false)
}

/// `get_inhibit_policy_mapping_from_trust_anchor` returns true if the trust anchor inhibits the use
/// of policy mapping during certification path processing.
pub(crate) fn get_inhibit_policy_mapping_from_trust_anchor(ta: &TrustAnchorChoice) -> Result<bool> {
    match ta {
        TrustAnchorChoice::Certificate(cert) => {
            if let Some(extensions) = &cert.tbs_certificate.extensions {
                for ext in extensions.iter() {
                    if ID_CE_POLICY_CONSTRAINTS == ext.extn_id {
                        if let Ok(pc) = PolicyConstraints::from_der(ext.extn_value.as_bytes()) {
                            if pc.inhibit_policy_mapping.is_some() {
                                return Ok(true);
                            }
                        }
                    }
                }
            }
        }
        TrustAnchorChoice::TaInfo(tai) => {
            if let Some(cert_path) = &tai.cert_path {
                if let Some(pf) = cert_path.policy_flags {
                    if pf.contains(CertPolicies::InhibitPolicyMapping) {
                        return Ok(true);
                    }
                }
            }
        }
        _ => {
            return Err(Error::Unrecognized);
        }
    }
    Ok(false)
}

/// `get_path_length_constraint_from_trust_anchor` returns the value from a basic constraints
/// extension in the TA certificate for the Certificate CHOICE, the value from CertPathControls for
/// the TrustAnchorInfo CHOICE or [`PS_MAX_PATH_LENGTH_CONSTRAINT`] if no constraint is asserted.
pub(crate) fn get_path_length_constraint_from_trust_anchor(ta: &TrustAnchorChoice) -> Result<u8> {
    match ta {
        TrustAnchorChoice::Certificate(cert) => {
            if let Some(extensions) = &cert.tbs_certificate.extensions {
                for ext in extensions.iter() {
                    if ID_CE_BASIC_CONSTRAINTS == ext.extn_id {
                        if let Ok(bc) = BasicConstraints::from_der(ext.extn_value.as_bytes()) {
                            if let Some(pl) = bc.path_len_constraint {
                                return Ok(pl);
                            }
                        }
                    }
                }
            }
        }
        TrustAnchorChoice::TaInfo(tai) => {
            if let Some(cert_path) = &tai.cert_path {
                if let Some(len) = cert_path.path_len_constraint {
                    return Ok(len as u8);
                }
            }
        }
        _ => {
            return Err(Error::Unrecognized);
        }
    }
    Ok(PS_MAX_PATH_LENGTH_CONSTRAINT)
}

/// `get_email_addresses_from_rdn` harvests e-mail addresses conveyed via emailAddress attributes
/// in the presented name for evaluation against rfc822 name constraints.
pub(crate) fn get_email_addresses_from_rdn(name: &Name) -> Vec<Ia5String> {
    let mut retval = vec![];
    for rdn in &name.0 {
        for atv in rdn.0.iter() {
            if atv.oid == EMAIL_ADDRESS {
                if let Ok(ia5) = atv.value.decode_as::<Ia5String>() {
                    retval.push(ia5);
                } else if let Ok(ps) = atv.value.decode_as::<PrintableString>() {
                    if let Ok(ia5) = Ia5String::new(&ps.to_string()) {
                        retval.push(ia5);
                    }
                }
            }
        }
    }
    retval
}

/// `is_email` returns true if addr matches a simple e-mail address pattern.
pub(crate) fn is_email(addr: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(
            "^([a-z0-9_+]([a-z0-9_+.]*[a-z0-9_+])?)@([a-z0-9]+([-.]{1}[a-z0-9]+)*.[a-z]{2,6})"
        )
        .unwrap();
    }

    EMAIL_RE.captures(addr).is_some()
}

/// `descended_from_host` returns true if cand is equal to or descended from the host expressed in
/// prev_name and false otherwise. For URI constraints the base may match a host exactly or any
/// host within the domain when the base begins with a period.
pub(crate) fn descended_from_host(prev_name: &Ia5String, cand: &str, is_uri: bool) -> bool {
    let base = prev_name.to_string();

    let mut filter = regex::escape(base.as_str());
    filter.push('$');
    let filter_re = Regex::new(filter.as_str());
    if let Ok(fe) = filter_re {
        if let Some(parts) = fe.captures(cand) {
            if cand.len() == base.len() {
                return true;
            }

            let match_start = if let Some(part) = parts.get(0) {
                part.start()
            } else {
                return false;
            };

            if !is_uri {
                let cand_next_to_last_char = if match_start != 0 {
                    cand.chars().nth(match_start - 1).unwrap_or(' ')
                } else {
                    ' '
                };
                if cand_next_to_last_char == '.' {
                    return true;
                }
            } else {
                let cand_last_char = if match_start != 0 {
                    cand.chars().nth(match_start).unwrap_or(' ')
                } else {
                    ' '
                };
                if cand_last_char == '.' {
                    return true;
                }
            }
        }
    }
    false
}

/// `descended_from_rfc822` returns true if new_name is equal to or descended from prev_name and
/// false otherwise.
pub(crate) fn descended_from_rfc822(prev_name: &Ia5String, new_name: &Ia5String) -> bool {
    let cand = new_name.to_string();
    let base = prev_name.to_string();

    let mut filter = regex::escape(base.as_str());
    filter.push('$');
    let filter_re = Regex::new(filter.as_str());
    if let Ok(fe) = filter_re {
        if let Some(parts) = fe.captures(cand.as_str()) {
            if is_email(base.as_str()) && cand.len() == base.len() {
                return true;
            }

            let match_start = if let Some(part) = parts.get(0) {
                part.start()
            } else {
                return false;
            };

            let base_first_char = if let Some(part) = base.chars().next() {
                part
            } else {
                return false;
            };

            let cand_last_char = if match_start != 0 {
                cand.chars().nth(match_start - 1).unwrap_or(' ')
            } else {
                ' '
            };

            if base_first_char != '.' {
                if base_first_char == '@' {
                    return true;
                }

                if '@' == cand_last_char {
                    return true;
                }
            } else if '@' != cand_last_char {
                return true;
            }
        }
    }
    false
}

/// `descended_from_dn` returns true if name is equal to or descended from subtree and false
/// otherwise, subject to the minimum and maximum values from the governing GeneralSubtree.
pub(crate) fn descended_from_dn(subtree: &Name, name: &Name, min: u32, max: Option<u32>) -> bool {
    if name.0.len() < subtree.0.len() {
        return false;
    }

    for (i, rdn) in subtree.0.iter().enumerate() {
        if &name.0[i] != rdn {
            return false;
        }
    }

    let extra = (name.0.len() - subtree.0.len()) as u32;
    if extra < min {
        return false;
    }
    if let Some(max) = max {
        if extra > max {
            return false;
        }
    }
    true
}
