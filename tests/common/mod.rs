//! Shared helpers for integration tests: synthetic certificate and CRL fixtures plus a
//! PkiEnvironment wired with a test signature verifier so algorithm behavior can be exercised
//! without live key material.

#![allow(dead_code)]

use std::str::FromStr;
use std::time::Duration;

use certpath::*;
use der::asn1::{BitString, GeneralizedTime, OctetString, Uint};
use der::Encode;
use spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};
use x509_cert::crl::{CertificateList, RevokedCert, TbsCertList};
use x509_cert::ext::pkix::crl::dp::DistributionPoint;
use x509_cert::ext::pkix::crl::{BaseCrlNumber, IssuingDistributionPoint};
use x509_cert::ext::pkix::{CrlReason, KeyUsage, KeyUsages};
use x509_cert::ext::Extension;
use x509_cert::name::Name;
use x509_cert::serial_number::SerialNumber;
use x509_cert::time::{Time, Validity};
use x509_cert::{Certificate, TbsCertificate, Version};

use der::asn1::ObjectIdentifier;
use flagset::FlagSet;

/// Time of interest used throughout the tests.
pub const TOI: u64 = 1_700_000_000;
/// Default notBefore for fixtures.
pub const NOT_BEFORE: u64 = 1_600_000_000;
/// Default notAfter for fixtures.
pub const NOT_AFTER: u64 = 1_800_000_000;

pub const ID_CE_BASIC_CONSTRAINTS: ObjectIdentifier = const_oid::db::rfc5912::ID_CE_BASIC_CONSTRAINTS;
pub const ID_CE_KEY_USAGE: ObjectIdentifier = const_oid::db::rfc5912::ID_CE_KEY_USAGE;
pub const ID_CE_CERTIFICATE_POLICIES: ObjectIdentifier =
    const_oid::db::rfc5912::ID_CE_CERTIFICATE_POLICIES;
pub const ID_CE_POLICY_MAPPINGS: ObjectIdentifier = const_oid::db::rfc5912::ID_CE_POLICY_MAPPINGS;
pub const ID_CE_POLICY_CONSTRAINTS: ObjectIdentifier =
    const_oid::db::rfc5912::ID_CE_POLICY_CONSTRAINTS;
pub const ID_CE_NAME_CONSTRAINTS: ObjectIdentifier = const_oid::db::rfc5912::ID_CE_NAME_CONSTRAINTS;
pub const ID_CE_CRL_DISTRIBUTION_POINTS: ObjectIdentifier =
    const_oid::db::rfc5912::ID_CE_CRL_DISTRIBUTION_POINTS;
pub const ID_CE_CRL_REASONS: ObjectIdentifier = const_oid::db::rfc5912::ID_CE_CRL_REASONS;
pub const ID_CE_DELTA_CRL_INDICATOR: ObjectIdentifier =
    const_oid::db::rfc5912::ID_CE_DELTA_CRL_INDICATOR;
pub const ID_CE_ISSUING_DISTRIBUTION_POINT: ObjectIdentifier =
    const_oid::db::rfc5912::ID_CE_ISSUING_DISTRIBUTION_POINT;

/// Signature bytes the test verifier treats as invalid.
pub const BAD_SIGNATURE: &[u8] = b"bad";

/// Test implementation of the VerifySignatureMessage interface. Signatures whose raw bytes equal
/// [`BAD_SIGNATURE`] fail; everything else verifies.
pub fn verify_signature_message_test(
    _pe: &PkiEnvironment,
    _message_to_verify: &[u8],
    signature: &[u8],
    _signature_alg: &AlgorithmIdentifierOwned,
    _spki: &SubjectPublicKeyInfoOwned,
) -> certpath::Result<()> {
    if signature == BAD_SIGNATURE {
        Err(Error::PathValidation(
            PathValidationStatus::SignatureVerificationFailure,
        ))
    } else {
        Ok(())
    }
}

/// Returns a PkiEnvironment wired with the RFC 5280 validator and the test signature verifier.
pub fn test_environment() -> PkiEnvironment {
    let mut pe = PkiEnvironment::new();
    pe.add_validate_path_callback(validate_path_rfc5280);
    pe.add_verify_signature_message_callback(verify_signature_message_test);
    pe
}

pub fn test_name(s: &str) -> Name {
    Name::from_str(s).unwrap()
}

pub fn test_time(secs: u64) -> Time {
    Time::GeneralTime(GeneralizedTime::from_unix_duration(Duration::from_secs(secs)).unwrap())
}

fn test_alg() -> AlgorithmIdentifierOwned {
    AlgorithmIdentifierOwned {
        oid: PKIXALG_SHA256_WITH_RSA_ENCRYPTION,
        parameters: None,
    }
}

/// Each distinct key seed yields a distinct public key so key-based checks (cycle guards, trust
/// anchor matching) behave as they would with real key material.
fn test_spki(key_seed: &str) -> SubjectPublicKeyInfoOwned {
    SubjectPublicKeyInfoOwned {
        algorithm: AlgorithmIdentifierOwned {
            oid: PKIXALG_RSA_ENCRYPTION,
            parameters: None,
        },
        subject_public_key: BitString::from_bytes(key_seed.as_bytes()).unwrap(),
    }
}

pub fn make_extension(oid: ObjectIdentifier, critical: bool, value: &impl Encode) -> Extension {
    Extension {
        extn_id: oid,
        critical,
        extn_value: OctetString::new(value.to_der().unwrap()).unwrap(),
    }
}

pub fn bc_ext(ca: bool, path_len_constraint: Option<u8>) -> Extension {
    let bc = x509_cert::ext::pkix::BasicConstraints {
        ca,
        path_len_constraint,
    };
    make_extension(ID_CE_BASIC_CONSTRAINTS, true, &bc)
}

pub fn ku_ext(flags: FlagSet<KeyUsages>) -> Extension {
    make_extension(ID_CE_KEY_USAGE, true, &KeyUsage(flags))
}

pub fn policies_ext(oids: &[ObjectIdentifier]) -> Extension {
    let policies = x509_cert::ext::pkix::CertificatePolicies(
        oids.iter()
            .map(|oid| x509_cert::ext::pkix::certpolicy::PolicyInformation {
                policy_identifier: *oid,
                policy_qualifiers: None,
            })
            .collect(),
    );
    make_extension(ID_CE_CERTIFICATE_POLICIES, false, &policies)
}

pub fn policy_mappings_ext(mappings: &[(ObjectIdentifier, ObjectIdentifier)]) -> Extension {
    let pm = x509_cert::ext::pkix::PolicyMappings(
        mappings
            .iter()
            .map(|(idp, sdp)| x509_cert::ext::pkix::PolicyMapping {
                issuer_domain_policy: *idp,
                subject_domain_policy: *sdp,
            })
            .collect(),
    );
    make_extension(ID_CE_POLICY_MAPPINGS, false, &pm)
}

pub fn policy_constraints_ext(
    require_explicit_policy: Option<u32>,
    inhibit_policy_mapping: Option<u32>,
) -> Extension {
    let pc = x509_cert::ext::pkix::PolicyConstraints {
        require_explicit_policy,
        inhibit_policy_mapping,
    };
    make_extension(ID_CE_POLICY_CONSTRAINTS, true, &pc)
}

pub fn name_constraints_ext(
    permitted: Option<Vec<&str>>,
    excluded: Option<Vec<&str>>,
) -> Extension {
    use x509_cert::ext::pkix::constraints::name::GeneralSubtree;
    use x509_cert::ext::pkix::name::GeneralName;
    let to_subtrees = |names: Vec<&str>| {
        names
            .into_iter()
            .map(|n| GeneralSubtree {
                base: GeneralName::DirectoryName(test_name(n)),
                minimum: 0,
                maximum: None,
            })
            .collect()
    };
    let nc = x509_cert::ext::pkix::NameConstraints {
        permitted_subtrees: permitted.map(to_subtrees),
        excluded_subtrees: excluded.map(to_subtrees),
    };
    make_extension(ID_CE_NAME_CONSTRAINTS, true, &nc)
}

pub fn crldp_ext(dps: Vec<DistributionPoint>) -> Extension {
    let crldp = x509_cert::ext::pkix::crl::CrlDistributionPoints(dps);
    make_extension(ID_CE_CRL_DISTRIBUTION_POINTS, false, &crldp)
}

/// Builds a certificate with the presented names, serial, validity window and extensions. The key
/// seed determines the public key; the issuer key seed is unused here but callers pass it for
/// readability when describing the signing relationship.
pub fn make_cert(
    subject: &str,
    issuer: &str,
    serial: &[u8],
    key_seed: &str,
    not_before: u64,
    not_after: u64,
    exts: Vec<Extension>,
    good_signature: bool,
) -> Certificate {
    let tbs = TbsCertificate {
        version: Version::V3,
        serial_number: SerialNumber::new(serial).unwrap(),
        signature: test_alg(),
        issuer: test_name(issuer),
        validity: Validity {
            not_before: test_time(not_before),
            not_after: test_time(not_after),
        },
        subject: test_name(subject),
        subject_public_key_info: test_spki(key_seed),
        issuer_unique_id: None,
        subject_unique_id: None,
        extensions: if exts.is_empty() { None } else { Some(exts) },
    };
    let signature = if good_signature {
        BitString::from_bytes(b"sig").unwrap()
    } else {
        BitString::from_bytes(BAD_SIGNATURE).unwrap()
    };
    Certificate {
        tbs_certificate: tbs,
        signature_algorithm: test_alg(),
        signature,
    }
}

/// Builds a CA certificate with basicConstraints and keyCertSign/cRLSign key usage.
pub fn make_ca_cert(subject: &str, issuer: &str, serial: &[u8], key_seed: &str) -> Certificate {
    make_cert(
        subject,
        issuer,
        serial,
        key_seed,
        NOT_BEFORE,
        NOT_AFTER,
        vec![
            bc_ext(true, None),
            ku_ext(KeyUsages::KeyCertSign | KeyUsages::CRLSign),
        ],
        true,
    )
}

/// Builds an end entity certificate with no extensions.
pub fn make_ee_cert(subject: &str, issuer: &str, serial: &[u8], key_seed: &str) -> Certificate {
    make_cert(
        subject,
        issuer,
        serial,
        key_seed,
        NOT_BEFORE,
        NOT_AFTER,
        vec![],
        true,
    )
}

pub fn pdv_cert(cert: Certificate) -> PDVCertificate {
    PDVCertificate::try_from(cert).unwrap()
}

pub fn pdv_ta(cert: Certificate) -> PDVTrustAnchorChoice {
    PDVTrustAnchorChoice::try_from(cert).unwrap()
}

/// Describes one CRL entry for [`make_crl`].
pub struct CrlEntrySpec {
    pub serial: Vec<u8>,
    pub revocation_date: u64,
    pub reason: Option<CrlReason>,
}

pub fn crl_reason_entry_ext(reason: CrlReason) -> Extension {
    make_extension(ID_CE_CRL_REASONS, false, &reason)
}

pub fn delta_crl_indicator_ext() -> Extension {
    let base = BaseCrlNumber(Uint::new(&[0x01]).unwrap());
    make_extension(ID_CE_DELTA_CRL_INDICATOR, true, &base)
}

pub fn idp_ext(idp: &IssuingDistributionPoint) -> Extension {
    make_extension(ID_CE_ISSUING_DISTRIBUTION_POINT, true, idp)
}

/// Builds a CRL issued by the presented name covering the presented entries, returning both the
/// encoded and decoded forms.
pub fn make_crl(
    issuer: &str,
    this_update: u64,
    next_update: Option<u64>,
    entries: Vec<CrlEntrySpec>,
    crl_exts: Vec<Extension>,
) -> (Vec<u8>, CertificateList) {
    let revoked_certificates = if entries.is_empty() {
        None
    } else {
        Some(
            entries
                .into_iter()
                .map(|e| RevokedCert {
                    serial_number: SerialNumber::new(&e.serial).unwrap(),
                    revocation_date: test_time(e.revocation_date),
                    crl_entry_extensions: e.reason.map(|r| vec![crl_reason_entry_ext(r)]),
                })
                .collect(),
        )
    };
    let crl = CertificateList {
        tbs_cert_list: TbsCertList {
            version: Version::V2,
            signature: test_alg(),
            issuer: test_name(issuer),
            this_update: test_time(this_update),
            next_update: next_update.map(test_time),
            revoked_certificates,
            crl_extensions: if crl_exts.is_empty() {
                None
            } else {
                Some(crl_exts)
            },
        },
        signature_algorithm: test_alg(),
        signature: BitString::from_bytes(b"sig").unwrap(),
    };
    let enc = crl.to_der().unwrap();
    (enc, crl)
}

/// Builds a TaSource from the presented certificates.
pub fn ta_source_from_certs(certs: &[&Certificate]) -> TaSource {
    let mut ta_source = TaSource::new();
    for (i, cert) in certs.iter().enumerate() {
        ta_source.push(CertFile {
            filename: format!("ta-{}.der", i),
            bytes: cert.to_der().unwrap(),
        });
    }
    ta_source.initialize().unwrap();
    ta_source
}

/// Builds a CertSource from the presented certificates, preserving presentation order.
pub fn cert_source_from_certs(certs: &[&Certificate]) -> CertSource {
    let mut cert_source = CertSource::new();
    for (i, cert) in certs.iter().enumerate() {
        cert_source.push(CertFile {
            filename: format!("ca-{}.der", i),
            bytes: cert.to_der().unwrap(),
        });
    }
    cert_source.initialize().unwrap();
    cert_source
}

/// Builds a CrlSourceMemory from the presented encoded CRLs.
pub fn crl_source_from_crls(crls: &[&[u8]]) -> CrlSourceMemory {
    let source = CrlSourceMemory::new();
    for crl in crls {
        source.add_crl_buffer(crl).unwrap();
    }
    source
}

/// Returns settings with the test time of interest set and revocation checking disabled, the
/// baseline for validator and builder tests.
pub fn baseline_settings() -> CertificationPathSettings {
    let mut cps = CertificationPathSettings::new();
    set_time_of_interest(&mut cps, TOI);
    set_check_revocation_status(&mut cps, false);
    cps
}
