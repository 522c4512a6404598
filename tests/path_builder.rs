//! Integration tests for certification path building

mod common;

use common::*;

use certpath::*;
use x509_cert::ext::pkix::KeyUsages;

#[test]
fn builds_path_through_intermediates() {
    let ta_cert = make_ca_cert("CN=Root,O=Test,C=US", "CN=Root,O=Test,C=US", &[1], "root");
    let ca1 = make_ca_cert("CN=CA1,O=Test,C=US", "CN=Root,O=Test,C=US", &[2], "ca1");
    let ca2 = make_ca_cert("CN=CA2,O=Test,C=US", "CN=CA1,O=Test,C=US", &[3], "ca2");
    let ee = make_ee_cert("CN=Leaf,O=Test,C=US", "CN=CA2,O=Test,C=US", &[4], "leaf");

    let mut pe = test_environment();
    pe.add_trust_anchor_source(Box::new(ta_source_from_certs(&[&ta_cert])));
    pe.add_certificate_source(Box::new(cert_source_from_certs(&[&ca1, &ca2])));

    let cps = baseline_settings();
    let mut cpr = CertificationPathResults::new();
    let target = pdv_cert(ee);
    let cp = build_path_for_target(&pe, &target, &cps, &mut cpr).unwrap();

    assert_eq!(2, cp.intermediates.len());
    // intermediates run from the trust anchor downward
    assert_eq!(
        "CN=CA1,O=Test,C=US",
        cp.intermediates[0]
            .decoded_cert
            .tbs_certificate
            .subject
            .to_string()
    );
    assert_eq!(
        "CN=CA2,O=Test,C=US",
        cp.intermediates[1]
            .decoded_cert
            .tbs_certificate
            .subject
            .to_string()
    );
    assert_eq!(Some(PathValidationStatus::Valid), get_validation_status(&cpr));

    // no certificate appears twice in the returned chain
    let mut encoded: Vec<&[u8]> = cp
        .intermediates
        .iter()
        .map(|c| c.encoded_cert.as_slice())
        .collect();
    encoded.push(cp.target.encoded_cert.as_slice());
    let count = encoded.len();
    encoded.sort();
    encoded.dedup();
    assert_eq!(count, encoded.len());
}

#[test]
fn backtracks_past_expired_issuer() {
    // Scenario: two candidate issuers share a subject name; one is expired and one is valid. The
    // expired one is indexed first, so the builder must abandon that branch and succeed via the
    // valid one.
    let ta_cert = make_ca_cert("CN=Root,O=Test,C=US", "CN=Root,O=Test,C=US", &[1], "root");
    let expired_ca = make_cert(
        "CN=CA,O=Test,C=US",
        "CN=Root,O=Test,C=US",
        &[2],
        "ca-old",
        NOT_BEFORE,
        TOI - 1000,
        vec![bc_ext(true, None), ku_ext(KeyUsages::KeyCertSign.into())],
        true,
    );
    let valid_ca = make_ca_cert("CN=CA,O=Test,C=US", "CN=Root,O=Test,C=US", &[3], "ca-new");
    let ee = make_ee_cert("CN=Leaf,O=Test,C=US", "CN=CA,O=Test,C=US", &[4], "leaf");

    let mut pe = test_environment();
    pe.add_trust_anchor_source(Box::new(ta_source_from_certs(&[&ta_cert])));
    pe.add_certificate_source(Box::new(cert_source_from_certs(&[&expired_ca, &valid_ca])));

    let cps = baseline_settings();
    let mut cpr = CertificationPathResults::new();
    let target = pdv_cert(ee);
    let cp = build_path_for_target(&pe, &target, &cps, &mut cpr).unwrap();

    assert_eq!(1, cp.intermediates.len());
    assert_eq!(
        SerialNumberBytes(&[3]),
        SerialNumberBytes(cp.intermediates[0].decoded_cert.tbs_certificate.serial_number.as_bytes())
    );
    assert_eq!(Some(PathValidationStatus::Valid), get_validation_status(&cpr));
}

// small helper for readable serial number assertions
#[derive(PartialEq, Debug)]
struct SerialNumberBytes<'a>(&'a [u8]);

#[test]
fn no_paths_found_for_unknown_issuer() {
    let ta_cert = make_ca_cert("CN=Root,O=Test,C=US", "CN=Root,O=Test,C=US", &[1], "root");
    let ee = make_ee_cert("CN=Leaf,O=Test,C=US", "CN=Unknown CA,O=Test,C=US", &[2], "leaf");

    let mut pe = test_environment();
    pe.add_trust_anchor_source(Box::new(ta_source_from_certs(&[&ta_cert])));
    pe.add_certificate_source(Box::new(cert_source_from_certs(&[])));

    let cps = baseline_settings();
    let mut cpr = CertificationPathResults::new();
    let target = pdv_cert(ee);
    let r = build_path_for_target(&pe, &target, &cps, &mut cpr);
    assert_eq!(
        Some(Error::PathValidation(PathValidationStatus::NoPathsFound)),
        r.err()
    );
}

#[test]
fn surfaces_last_validation_failure_when_search_exhausts() {
    // the only available branch fails validation (expired issuer); the builder reports that
    // failure rather than a generic no-paths error
    let ta_cert = make_ca_cert("CN=Root,O=Test,C=US", "CN=Root,O=Test,C=US", &[1], "root");
    let expired_ca = make_cert(
        "CN=CA,O=Test,C=US",
        "CN=Root,O=Test,C=US",
        &[2],
        "ca",
        NOT_BEFORE,
        TOI - 1000,
        vec![bc_ext(true, None), ku_ext(KeyUsages::KeyCertSign.into())],
        true,
    );
    let ee = make_ee_cert("CN=Leaf,O=Test,C=US", "CN=CA,O=Test,C=US", &[3], "leaf");

    let mut pe = test_environment();
    pe.add_trust_anchor_source(Box::new(ta_source_from_certs(&[&ta_cert])));
    pe.add_certificate_source(Box::new(cert_source_from_certs(&[&expired_ca])));

    let cps = baseline_settings();
    let mut cpr = CertificationPathResults::new();
    let target = pdv_cert(ee);
    let r = build_path_for_target(&pe, &target, &cps, &mut cpr);
    assert_eq!(
        Some(Error::PathValidation(
            PathValidationStatus::InvalidNotAfterDate
        )),
        r.err()
    );
    assert_eq!(
        Some(PathValidationStatus::InvalidNotAfterDate),
        get_validation_status(&cpr)
    );
}

#[test]
fn cross_certified_loop_terminates() {
    // A and B cross-certify each other with no reachable trust anchor; the cycle guard must
    // terminate the search with a failure rather than recursing forever
    let a = make_ca_cert("CN=A,O=Test,C=US", "CN=B,O=Test,C=US", &[1], "a");
    let b = make_ca_cert("CN=B,O=Test,C=US", "CN=A,O=Test,C=US", &[2], "b");
    let ee = make_ee_cert("CN=Leaf,O=Test,C=US", "CN=A,O=Test,C=US", &[3], "leaf");

    let mut pe = test_environment();
    pe.add_trust_anchor_source(Box::new(ta_source_from_certs(&[])));
    pe.add_certificate_source(Box::new(cert_source_from_certs(&[&a, &b])));

    let cps = baseline_settings();
    let mut cpr = CertificationPathResults::new();
    let target = pdv_cert(ee);
    let r = build_path_for_target(&pe, &target, &cps, &mut cpr);
    assert!(r.is_err());
}

#[test]
fn excluded_certificate_not_used() {
    let ta_cert = make_ca_cert("CN=Root,O=Test,C=US", "CN=Root,O=Test,C=US", &[1], "root");
    let ca = make_ca_cert("CN=CA,O=Test,C=US", "CN=Root,O=Test,C=US", &[2], "ca");
    let ee = make_ee_cert("CN=Leaf,O=Test,C=US", "CN=CA,O=Test,C=US", &[3], "leaf");

    let mut pe = test_environment();
    pe.add_trust_anchor_source(Box::new(ta_source_from_certs(&[&ta_cert])));
    pe.add_certificate_source(Box::new(cert_source_from_certs(&[&ca])));

    let mut cps = baseline_settings();
    set_excluded_certificates(&mut cps, vec![der::Encode::to_der(&ca).unwrap()]);

    let mut cpr = CertificationPathResults::new();
    let target = pdv_cert(ee);
    let r = build_path_for_target(&pe, &target, &cps, &mut cpr);
    assert_eq!(
        Some(Error::PathValidation(PathValidationStatus::NoPathsFound)),
        r.err()
    );
}

#[test]
fn path_length_bound_prunes_search() {
    let ta_cert = make_ca_cert("CN=Root,O=Test,C=US", "CN=Root,O=Test,C=US", &[1], "root");
    let ca1 = make_ca_cert("CN=CA1,O=Test,C=US", "CN=Root,O=Test,C=US", &[2], "ca1");
    let ca2 = make_ca_cert("CN=CA2,O=Test,C=US", "CN=CA1,O=Test,C=US", &[3], "ca2");
    let ee = make_ee_cert("CN=Leaf,O=Test,C=US", "CN=CA2,O=Test,C=US", &[4], "leaf");

    let mut pe = test_environment();
    pe.add_trust_anchor_source(Box::new(ta_source_from_certs(&[&ta_cert])));
    pe.add_certificate_source(Box::new(cert_source_from_certs(&[&ca1, &ca2])));

    // two non-self-issued intermediates are required but only one is allowed
    let mut cps = baseline_settings();
    set_initial_path_length_constraint(&mut cps, 1);

    let mut cpr = CertificationPathResults::new();
    let target = pdv_cert(ee.clone());
    let r = build_path_for_target(&pe, &target, &cps, &mut cpr);
    assert!(r.is_err());

    // raising the bound allows the same chain to build
    set_initial_path_length_constraint(&mut cps, 2);
    let mut cpr = CertificationPathResults::new();
    let cp = build_path_for_target(&pe, &target, &cps, &mut cpr).unwrap();
    assert_eq!(2, cp.intermediates.len());
}

#[test]
fn target_issued_by_trust_anchor_directly() {
    let ta_cert = make_ca_cert("CN=Root,O=Test,C=US", "CN=Root,O=Test,C=US", &[1], "root");
    let ee = make_ee_cert("CN=Leaf,O=Test,C=US", "CN=Root,O=Test,C=US", &[2], "leaf");

    let mut pe = test_environment();
    pe.add_trust_anchor_source(Box::new(ta_source_from_certs(&[&ta_cert])));
    pe.add_certificate_source(Box::new(cert_source_from_certs(&[])));

    let cps = baseline_settings();
    let mut cpr = CertificationPathResults::new();
    let target = pdv_cert(ee);
    let cp = build_path_for_target(&pe, &target, &cps, &mut cpr).unwrap();
    assert!(cp.intermediates.is_empty());
    assert_eq!(Some(PathValidationStatus::Valid), get_validation_status(&cpr));
}
