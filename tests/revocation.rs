//! Integration tests for CRL-based revocation status determination

mod common;

use common::*;

use certpath::*;
use x509_cert::ext::pkix::crl::dp::DistributionPoint;
use x509_cert::ext::pkix::crl::IssuingDistributionPoint;
use x509_cert::ext::pkix::name::GeneralName;
use x509_cert::ext::pkix::CrlReason;

fn revocation_settings() -> CertificationPathSettings {
    let mut cps = CertificationPathSettings::new();
    set_time_of_interest(&mut cps, TOI);
    set_check_revocation_status(&mut cps, true);
    cps
}

/// Returns a TA/CA/EE fixture where the TA signs a CRL covering the CA and the CA signs a CRL
/// covering the EE.
struct Fixture {
    pe: PkiEnvironment,
    ta_cert: x509_cert::Certificate,
    ca_cert: x509_cert::Certificate,
    ee_cert: x509_cert::Certificate,
}

fn fixture(crls: &[&[u8]]) -> Fixture {
    // the TA carries no key usage extension; CRL signing checks pass without one
    let ta_cert = make_cert(
        "CN=Root,O=Test,C=US",
        "CN=Root,O=Test,C=US",
        &[1],
        "root",
        NOT_BEFORE,
        NOT_AFTER,
        vec![bc_ext(true, None)],
        true,
    );
    let ca_cert = make_ca_cert("CN=CA,O=Test,C=US", "CN=Root,O=Test,C=US", &[2], "ca");
    let ee_cert = make_ee_cert("CN=Leaf,O=Test,C=US", "CN=CA,O=Test,C=US", &[3], "leaf");

    let mut pe = test_environment();
    pe.add_trust_anchor_source(Box::new(ta_source_from_certs(&[&ta_cert])));
    pe.add_certificate_source(Box::new(cert_source_from_certs(&[&ca_cert])));
    pe.add_crl_source(Box::new(crl_source_from_crls(crls)));

    Fixture {
        pe,
        ta_cert,
        ca_cert,
        ee_cert,
    }
}

fn path_for(f: &Fixture) -> CertificationPath {
    CertificationPath::new(
        pdv_ta(f.ta_cert.clone()),
        vec![pdv_cert(f.ca_cert.clone())],
        pdv_cert(f.ee_cert.clone()),
    )
}

#[test]
fn revoked_target_rejected() {
    // Scenario: a CRL lists the target's serial number with reason keyCompromise and a revocation
    // date before the time of interest
    let (ta_crl, _) = make_crl("CN=Root,O=Test,C=US", TOI - 100, Some(TOI + 100), vec![], vec![]);
    let (ca_crl, _) = make_crl(
        "CN=CA,O=Test,C=US",
        TOI - 100,
        Some(TOI + 100),
        vec![CrlEntrySpec {
            serial: vec![3],
            revocation_date: TOI - 50,
            reason: Some(CrlReason::KeyCompromise),
        }],
        vec![],
    );

    let f = fixture(&[&ta_crl, &ca_crl]);
    let mut cp = path_for(&f);
    let cps = revocation_settings();
    let mut cpr = CertificationPathResults::new();

    let r = f.pe.validate_path(&f.pe, &cps, &mut cp, &mut cpr);
    assert_eq!(
        Err(Error::PathValidation(
            PathValidationStatus::CertificateRevokedEndEntity
        )),
        r
    );
    assert_eq!(Some(0), get_failing_cert_index(&cpr));
    // the revoking CRL entry is retained in the results
    let entries = get_crl_entries(&cpr).unwrap();
    assert_eq!(1, entries[1].len());
}

#[test]
fn unrevoked_path_validates() {
    let (ta_crl, _) = make_crl("CN=Root,O=Test,C=US", TOI - 100, Some(TOI + 100), vec![], vec![]);
    let (ca_crl, _) = make_crl("CN=CA,O=Test,C=US", TOI - 100, Some(TOI + 100), vec![], vec![]);

    let f = fixture(&[&ta_crl, &ca_crl]);
    let mut cp = path_for(&f);
    let cps = revocation_settings();
    let mut cpr = CertificationPathResults::new();

    assert!(f.pe.validate_path(&f.pe, &cps, &mut cp, &mut cpr).is_ok());
    assert_eq!(Some(PathValidationStatus::Valid), get_validation_status(&cpr));
}

#[test]
fn missing_crls_yield_undetermined_not_pass() {
    let f = fixture(&[]);
    let mut cp = path_for(&f);
    let cps = revocation_settings();
    let mut cpr = CertificationPathResults::new();

    let r = f.pe.validate_path(&f.pe, &cps, &mut cp, &mut cpr);
    assert_eq!(
        Err(Error::PathValidation(
            PathValidationStatus::RevocationStatusNotDetermined
        )),
        r
    );
}

#[test]
fn stale_crl_yields_undetermined() {
    let (ta_crl, _) = make_crl("CN=Root,O=Test,C=US", TOI - 100, Some(TOI + 100), vec![], vec![]);
    // the CA's CRL expired before the time of interest
    let (ca_crl, _) = make_crl("CN=CA,O=Test,C=US", TOI - 200, Some(TOI - 100), vec![], vec![]);

    let f = fixture(&[&ta_crl, &ca_crl]);
    let mut cp = path_for(&f);
    let cps = revocation_settings();
    let mut cpr = CertificationPathResults::new();

    let r = f.pe.validate_path(&f.pe, &cps, &mut cp, &mut cpr);
    assert_eq!(
        Err(Error::PathValidation(
            PathValidationStatus::RevocationStatusNotDetermined
        )),
        r
    );
    assert_eq!(Some(0), get_failing_cert_index(&cpr));
}

#[test]
fn reason_partitioned_crls_accumulate_mask() {
    use x509_cert::ext::pkix::crl::dp::Reasons;

    // two CRLs from the CA each attest to a subset of reasons; only together do they cover all
    let idp_first = IssuingDistributionPoint {
        distribution_point: None,
        only_contains_user_certs: false,
        only_contains_ca_certs: false,
        only_some_reasons: Some(Reasons::KeyCompromise | Reasons::CaCompromise | Reasons::AaCompromise),
        indirect_crl: false,
        only_contains_attribute_certs: false,
    };
    let idp_second = IssuingDistributionPoint {
        distribution_point: None,
        only_contains_user_certs: false,
        only_contains_ca_certs: false,
        only_some_reasons: Some(
            Reasons::AffiliationChanged
                | Reasons::Superseded
                | Reasons::CessationOfOperation
                | Reasons::CertificateHold
                | Reasons::PrivilegeWithdrawn,
        ),
        indirect_crl: false,
        only_contains_attribute_certs: false,
    };

    let (ta_crl, _) = make_crl("CN=Root,O=Test,C=US", TOI - 100, Some(TOI + 100), vec![], vec![]);
    let (ca_crl_1, _) = make_crl(
        "CN=CA,O=Test,C=US",
        TOI - 100,
        Some(TOI + 100),
        vec![],
        vec![idp_ext(&idp_first)],
    );
    let (ca_crl_2, _) = make_crl(
        "CN=CA,O=Test,C=US",
        TOI - 100,
        Some(TOI + 100),
        vec![],
        vec![idp_ext(&idp_second)],
    );

    // with only the first partition available the status is undetermined
    let f = fixture(&[&ta_crl, &ca_crl_1]);
    let mut cp = path_for(&f);
    let cps = revocation_settings();
    let mut cpr = CertificationPathResults::new();
    let r = f.pe.validate_path(&f.pe, &cps, &mut cp, &mut cpr);
    assert_eq!(
        Err(Error::PathValidation(
            PathValidationStatus::RevocationStatusNotDetermined
        )),
        r
    );

    // with both partitions the accumulated mask reaches all reasons and the path validates
    let f = fixture(&[&ta_crl, &ca_crl_1, &ca_crl_2]);
    let mut cp = path_for(&f);
    let mut cpr = CertificationPathResults::new();
    assert!(f.pe.validate_path(&f.pe, &cps, &mut cp, &mut cpr).is_ok());
}

#[test]
fn delta_remove_from_crl_resets_status() {
    // the base CRL holds the target; the delta CRL removes the entry
    let (ta_crl, _) = make_crl("CN=Root,O=Test,C=US", TOI - 100, Some(TOI + 100), vec![], vec![]);
    let (ca_crl, _) = make_crl(
        "CN=CA,O=Test,C=US",
        TOI - 200,
        Some(TOI + 100),
        vec![CrlEntrySpec {
            serial: vec![3],
            revocation_date: TOI - 150,
            reason: Some(CrlReason::CertificateHold),
        }],
        vec![],
    );
    let (ca_delta, _) = make_crl(
        "CN=CA,O=Test,C=US",
        TOI - 50,
        Some(TOI + 100),
        vec![CrlEntrySpec {
            serial: vec![3],
            revocation_date: TOI - 50,
            reason: Some(CrlReason::RemoveFromCRL),
        }],
        vec![delta_crl_indicator_ext()],
    );

    // without the delta the target is revoked
    let f = fixture(&[&ta_crl, &ca_crl]);
    let mut cp = path_for(&f);
    let cps = revocation_settings();
    let mut cpr = CertificationPathResults::new();
    let r = f.pe.validate_path(&f.pe, &cps, &mut cp, &mut cpr);
    assert_eq!(
        Err(Error::PathValidation(
            PathValidationStatus::CertificateRevokedEndEntity
        )),
        r
    );

    // with the delta present and deltas enabled the hold has been released
    let f = fixture(&[&ta_crl, &ca_crl, &ca_delta]);
    let mut cp = path_for(&f);
    let mut cpr = CertificationPathResults::new();
    assert!(f.pe.validate_path(&f.pe, &cps, &mut cp, &mut cpr).is_ok());

    // with deltas disabled the base CRL governs again
    let f = fixture(&[&ta_crl, &ca_crl, &ca_delta]);
    let mut cp = path_for(&f);
    let mut cps_no_deltas = revocation_settings();
    set_use_deltas(&mut cps_no_deltas, false);
    let mut cpr = CertificationPathResults::new();
    let r = f.pe.validate_path(&f.pe, &cps_no_deltas, &mut cp, &mut cpr);
    assert_eq!(
        Err(Error::PathValidation(
            PathValidationStatus::CertificateRevokedEndEntity
        )),
        r
    );
}

#[test]
fn delta_new_revocation_applies() {
    // the base CRL is clean; the delta adds a revocation
    let (ta_crl, _) = make_crl("CN=Root,O=Test,C=US", TOI - 100, Some(TOI + 100), vec![], vec![]);
    let (ca_crl, _) = make_crl("CN=CA,O=Test,C=US", TOI - 200, Some(TOI + 100), vec![], vec![]);
    let (ca_delta, _) = make_crl(
        "CN=CA,O=Test,C=US",
        TOI - 50,
        Some(TOI + 100),
        vec![CrlEntrySpec {
            serial: vec![3],
            revocation_date: TOI - 50,
            reason: Some(CrlReason::KeyCompromise),
        }],
        vec![delta_crl_indicator_ext()],
    );

    let f = fixture(&[&ta_crl, &ca_crl, &ca_delta]);
    let mut cp = path_for(&f);
    let cps = revocation_settings();
    let mut cpr = CertificationPathResults::new();
    let r = f.pe.validate_path(&f.pe, &cps, &mut cp, &mut cpr);
    assert_eq!(
        Err(Error::PathValidation(
            PathValidationStatus::CertificateRevokedEndEntity
        )),
        r
    );
}

#[test]
fn bad_crl_signature_yields_undetermined() {
    use der::Encode;

    let (ta_crl, _) = make_crl("CN=Root,O=Test,C=US", TOI - 100, Some(TOI + 100), vec![], vec![]);
    let (_, mut ca_crl) = make_crl("CN=CA,O=Test,C=US", TOI - 100, Some(TOI + 100), vec![], vec![]);
    ca_crl.signature = der::asn1::BitString::from_bytes(BAD_SIGNATURE).unwrap();
    let ca_crl_bad = ca_crl.to_der().unwrap();

    let f = fixture(&[&ta_crl, &ca_crl_bad]);
    let mut cp = path_for(&f);
    let cps = revocation_settings();
    let mut cpr = CertificationPathResults::new();

    let r = f.pe.validate_path(&f.pe, &cps, &mut cp, &mut cpr);
    assert_eq!(
        Err(Error::PathValidation(
            PathValidationStatus::RevocationStatusNotDetermined
        )),
        r
    );
    // the unusable CRL lands in the failed CRL list for the target position
    let failed = get_failed_crls(&cpr).unwrap();
    assert_eq!(1, failed[1].len());
}

#[test]
fn self_referential_crl_signer_terminates() {
    // Scenario: the CA names itself as the CRL issuer for its own revocation information, so the
    // CRL signer's certification path covers the very certificate under validation. The nested
    // build must disable revocation for it and still reach a definite status.
    let ta_cert = make_cert(
        "CN=Root,O=Test,C=US",
        "CN=Root,O=Test,C=US",
        &[1],
        "root",
        NOT_BEFORE,
        NOT_AFTER,
        vec![bc_ext(true, None)],
        true,
    );
    let dp = DistributionPoint {
        distribution_point: None,
        reasons: None,
        crl_issuer: Some(vec![GeneralName::DirectoryName(test_name(
            "CN=CA,O=Test,C=US",
        ))]),
    };
    let ca_cert = make_cert(
        "CN=CA,O=Test,C=US",
        "CN=Root,O=Test,C=US",
        &[2],
        "ca",
        NOT_BEFORE,
        NOT_AFTER,
        vec![
            bc_ext(true, None),
            ku_ext(
                x509_cert::ext::pkix::KeyUsages::KeyCertSign
                    | x509_cert::ext::pkix::KeyUsages::CRLSign,
            ),
            crldp_ext(vec![dp]),
        ],
        true,
    );
    let ee_cert = make_ee_cert("CN=Leaf,O=Test,C=US", "CN=CA,O=Test,C=US", &[3], "leaf");

    // the CA's revocation information is carried on an indirect CRL issued under its own name
    let idp = IssuingDistributionPoint {
        distribution_point: None,
        only_contains_user_certs: false,
        only_contains_ca_certs: false,
        only_some_reasons: None,
        indirect_crl: true,
        only_contains_attribute_certs: false,
    };
    let (ca_self_crl, _) = make_crl(
        "CN=CA,O=Test,C=US",
        TOI - 100,
        Some(TOI + 100),
        vec![],
        vec![idp_ext(&idp)],
    );

    let mut pe = test_environment();
    pe.add_trust_anchor_source(Box::new(ta_source_from_certs(&[&ta_cert])));
    pe.add_certificate_source(Box::new(cert_source_from_certs(&[&ca_cert])));
    pe.add_crl_source(Box::new(crl_source_from_crls(&[&ca_self_crl])));

    let mut cp = CertificationPath::new(
        pdv_ta(ta_cert.clone()),
        vec![pdv_cert(ca_cert.clone())],
        pdv_cert(ee_cert),
    );
    let cps = revocation_settings();
    let mut cpr = CertificationPathResults::new();

    // must terminate with a definite status: the CA is covered by its self-issued indirect CRL
    // and the EE is covered by the same CA-signed CRL via the synthesized distribution point
    let r = pe.validate_path(&pe, &cps, &mut cp, &mut cpr);
    assert!(r.is_ok());
    assert_eq!(Some(PathValidationStatus::Valid), get_validation_status(&cpr));
}

#[test]
fn stapled_crl_consulted_before_store() {
    let (ta_crl, _) = make_crl("CN=Root,O=Test,C=US", TOI - 100, Some(TOI + 100), vec![], vec![]);
    let (ca_crl, _) = make_crl(
        "CN=CA,O=Test,C=US",
        TOI - 100,
        Some(TOI + 100),
        vec![CrlEntrySpec {
            serial: vec![3],
            revocation_date: TOI - 50,
            reason: Some(CrlReason::KeyCompromise),
        }],
        vec![],
    );

    // the store only has the TA's CRL; the CA's CRL arrives stapled on the path object
    let f = fixture(&[&ta_crl]);
    let mut cp = path_for(&f);
    cp.crls[1] = Some(ca_crl);
    let cps = revocation_settings();
    let mut cpr = CertificationPathResults::new();

    let r = f.pe.validate_path(&f.pe, &cps, &mut cp, &mut cpr);
    assert_eq!(
        Err(Error::PathValidation(
            PathValidationStatus::CertificateRevokedEndEntity
        )),
        r
    );
}
