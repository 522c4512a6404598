//! Integration tests for certification path validation

mod common;

use common::*;

use certpath::*;
use const_oid::db::rfc5280::ANY_POLICY;
use der::asn1::ObjectIdentifier;
use der::Encode;
use x509_cert::ext::pkix::KeyUsages;

pub const TEST_POLICY_1: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.2.1.48.1");
pub const TEST_POLICY_2: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.2.1.48.2");

#[test]
fn direct_ta_issued_target_validates() {
    // Scenario: target issued directly by a trust anchor, valid at the time of interest, no CRL
    // distribution points, revocation disabled
    let pe = test_environment();
    let ta_cert = make_ca_cert("CN=Root,O=Test,C=US", "CN=Root,O=Test,C=US", &[1], "root");
    let mut ee = make_ee_cert("CN=Leaf,O=Test,C=US", "CN=Root,O=Test,C=US", &[2], "leaf");
    ee.tbs_certificate
        .extensions
        .get_or_insert_with(Vec::new)
        .push(policies_ext(&[ANY_POLICY]));

    let mut cp = CertificationPath::new(pdv_ta(ta_cert), vec![], pdv_cert(ee));
    let cps = baseline_settings();
    let mut cpr = CertificationPathResults::new();

    assert!(pe.validate_path(&pe, &cps, &mut cp, &mut cpr).is_ok());
    assert_eq!(Some(PathValidationStatus::Valid), get_validation_status(&cpr));

    let tree = get_final_valid_policy_tree(&cpr).unwrap();
    assert_eq!(2, tree.len());
    assert_eq!(1, tree[0].len());
    assert_eq!(ANY_POLICY, tree[0][0].valid_policy);
    assert!(tree[1].iter().any(|n| n.valid_policy == ANY_POLICY));
}

#[test]
fn expired_intermediate_rejected() {
    // Scenario: the target's issuer certificate is expired relative to the time of interest
    let pe = test_environment();
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

    let mut cp = CertificationPath::new(
        pdv_ta(ta_cert),
        vec![pdv_cert(expired_ca)],
        pdv_cert(ee),
    );
    let cps = baseline_settings();
    let mut cpr = CertificationPathResults::new();

    let r = pe.validate_path(&pe, &cps, &mut cp, &mut cpr);
    assert_eq!(
        Err(Error::PathValidation(
            PathValidationStatus::InvalidNotAfterDate
        )),
        r
    );
    assert_eq!(
        Some(PathValidationStatus::InvalidNotAfterDate),
        get_validation_status(&cpr)
    );
    assert_eq!(Some(1), get_failing_cert_index(&cpr));
}

#[test]
fn name_chaining_violation_rejected() {
    let pe = test_environment();
    let ta_cert = make_ca_cert("CN=Root,O=Test,C=US", "CN=Root,O=Test,C=US", &[1], "root");
    let ca = make_ca_cert("CN=CA,O=Test,C=US", "CN=Root,O=Test,C=US", &[2], "ca");
    // issuer does not match the CA's subject
    let ee = make_ee_cert("CN=Leaf,O=Test,C=US", "CN=Other CA,O=Test,C=US", &[3], "leaf");

    let mut cp = CertificationPath::new(pdv_ta(ta_cert), vec![pdv_cert(ca)], pdv_cert(ee));
    let cps = baseline_settings();
    let mut cpr = CertificationPathResults::new();

    let r = pe.validate_path(&pe, &cps, &mut cp, &mut cpr);
    assert_eq!(
        Err(Error::PathValidation(
            PathValidationStatus::NameChainingFailure
        )),
        r
    );
    assert_eq!(Some(0), get_failing_cert_index(&cpr));
}

#[test]
fn missing_basic_constraints_rejected() {
    let pe = test_environment();
    let ta_cert = make_ca_cert("CN=Root,O=Test,C=US", "CN=Root,O=Test,C=US", &[1], "root");
    // intermediate with no basicConstraints extension at all
    let ca = make_cert(
        "CN=CA,O=Test,C=US",
        "CN=Root,O=Test,C=US",
        &[2],
        "ca",
        NOT_BEFORE,
        NOT_AFTER,
        vec![ku_ext(KeyUsages::KeyCertSign.into())],
        true,
    );
    let ee = make_ee_cert("CN=Leaf,O=Test,C=US", "CN=CA,O=Test,C=US", &[3], "leaf");

    let mut cp = CertificationPath::new(pdv_ta(ta_cert), vec![pdv_cert(ca)], pdv_cert(ee));
    let cps = baseline_settings();
    let mut cpr = CertificationPathResults::new();

    let r = pe.validate_path(&pe, &cps, &mut cp, &mut cpr);
    assert_eq!(
        Err(Error::PathValidation(
            PathValidationStatus::MissingBasicConstraints
        )),
        r
    );
}

#[test]
fn path_length_constraint_enforced() {
    let pe = test_environment();
    let ta_cert = make_ca_cert("CN=Root,O=Test,C=US", "CN=Root,O=Test,C=US", &[1], "root");
    let ca1 = make_cert(
        "CN=CA1,O=Test,C=US",
        "CN=Root,O=Test,C=US",
        &[2],
        "ca1",
        NOT_BEFORE,
        NOT_AFTER,
        vec![bc_ext(true, Some(0)), ku_ext(KeyUsages::KeyCertSign.into())],
        true,
    );
    let ca2 = make_ca_cert("CN=CA2,O=Test,C=US", "CN=CA1,O=Test,C=US", &[3], "ca2");
    let ee = make_ee_cert("CN=Leaf,O=Test,C=US", "CN=CA2,O=Test,C=US", &[4], "leaf");

    let mut cp = CertificationPath::new(
        pdv_ta(ta_cert),
        vec![pdv_cert(ca1), pdv_cert(ca2)],
        pdv_cert(ee),
    );
    let cps = baseline_settings();
    let mut cpr = CertificationPathResults::new();

    let r = pe.validate_path(&pe, &cps, &mut cp, &mut cpr);
    assert_eq!(
        Err(Error::PathValidation(PathValidationStatus::InvalidPathLength)),
        r
    );
    assert_eq!(Some(1), get_failing_cert_index(&cpr));
}

#[test]
fn key_usage_without_keycertsign_rejected() {
    let pe = test_environment();
    let ta_cert = make_ca_cert("CN=Root,O=Test,C=US", "CN=Root,O=Test,C=US", &[1], "root");
    let ca = make_cert(
        "CN=CA,O=Test,C=US",
        "CN=Root,O=Test,C=US",
        &[2],
        "ca",
        NOT_BEFORE,
        NOT_AFTER,
        vec![bc_ext(true, None), ku_ext(KeyUsages::DigitalSignature.into())],
        true,
    );
    let ee = make_ee_cert("CN=Leaf,O=Test,C=US", "CN=CA,O=Test,C=US", &[3], "leaf");

    let mut cp = CertificationPath::new(pdv_ta(ta_cert), vec![pdv_cert(ca)], pdv_cert(ee));
    let cps = baseline_settings();
    let mut cpr = CertificationPathResults::new();

    let r = pe.validate_path(&pe, &cps, &mut cp, &mut cpr);
    assert_eq!(
        Err(Error::PathValidation(PathValidationStatus::InvalidKeyUsage)),
        r
    );
}

#[test]
fn require_explicit_policy_with_no_policy_rejected() {
    // Scenario: policy constraints set requireExplicitPolicy=0 on the trust-anchor-adjacent
    // certificate and the leaf asserts no policy
    let pe = test_environment();
    let ta_cert = make_ca_cert("CN=Root,O=Test,C=US", "CN=Root,O=Test,C=US", &[1], "root");
    let ca = make_cert(
        "CN=CA,O=Test,C=US",
        "CN=Root,O=Test,C=US",
        &[2],
        "ca",
        NOT_BEFORE,
        NOT_AFTER,
        vec![
            bc_ext(true, None),
            ku_ext(KeyUsages::KeyCertSign.into()),
            policies_ext(&[TEST_POLICY_1]),
            policy_constraints_ext(Some(0), None),
        ],
        true,
    );
    let ee = make_ee_cert("CN=Leaf,O=Test,C=US", "CN=CA,O=Test,C=US", &[3], "leaf");

    let mut cp = CertificationPath::new(pdv_ta(ta_cert), vec![pdv_cert(ca)], pdv_cert(ee));
    let cps = baseline_settings();
    let mut cpr = CertificationPathResults::new();

    let r = pe.validate_path(&pe, &cps, &mut cp, &mut cpr);
    assert_eq!(
        Err(Error::PathValidation(PathValidationStatus::NullPolicySet)),
        r
    );
    assert_eq!(Some(0), get_failing_cert_index(&cpr));
}

#[test]
fn unprocessed_critical_extension_rejected() {
    let pe = test_environment();
    let ta_cert = make_ca_cert("CN=Root,O=Test,C=US", "CN=Root,O=Test,C=US", &[1], "root");
    let unknown = make_extension(
        ObjectIdentifier::new_unwrap("1.2.3.4.5.6.7.8.9"),
        true,
        &x509_cert::ext::pkix::BasicConstraints {
            ca: false,
            path_len_constraint: None,
        },
    );
    let ee = make_cert(
        "CN=Leaf,O=Test,C=US",
        "CN=Root,O=Test,C=US",
        &[2],
        "leaf",
        NOT_BEFORE,
        NOT_AFTER,
        vec![unknown],
        true,
    );

    let mut cp = CertificationPath::new(pdv_ta(ta_cert), vec![], pdv_cert(ee));
    let cps = baseline_settings();
    let mut cpr = CertificationPathResults::new();

    let r = pe.validate_path(&pe, &cps, &mut cp, &mut cpr);
    assert_eq!(
        Err(Error::PathValidation(
            PathValidationStatus::UnprocessedCriticalExtension
        )),
        r
    );
    assert_eq!(Some(0), get_failing_cert_index(&cpr));
}

#[test]
fn bad_signature_rejected() {
    let pe = test_environment();
    let ta_cert = make_ca_cert("CN=Root,O=Test,C=US", "CN=Root,O=Test,C=US", &[1], "root");
    let ca = make_cert(
        "CN=CA,O=Test,C=US",
        "CN=Root,O=Test,C=US",
        &[2],
        "ca",
        NOT_BEFORE,
        NOT_AFTER,
        vec![bc_ext(true, None), ku_ext(KeyUsages::KeyCertSign.into())],
        false,
    );
    let ee = make_ee_cert("CN=Leaf,O=Test,C=US", "CN=CA,O=Test,C=US", &[3], "leaf");

    let mut cp = CertificationPath::new(pdv_ta(ta_cert), vec![pdv_cert(ca)], pdv_cert(ee));
    let cps = baseline_settings();
    let mut cpr = CertificationPathResults::new();

    let r = pe.validate_path(&pe, &cps, &mut cp, &mut cpr);
    assert_eq!(
        Err(Error::PathValidation(
            PathValidationStatus::SignatureVerificationFailure
        )),
        r
    );
    assert_eq!(Some(1), get_failing_cert_index(&cpr));
}

#[test]
fn excluded_subtree_violation_rejected() {
    let pe = test_environment();
    let ta_cert = make_ca_cert("CN=Root,O=Test,C=US", "CN=Root,O=Test,C=US", &[1], "root");
    let ca = make_cert(
        "CN=CA,O=Test,C=US",
        "CN=Root,O=Test,C=US",
        &[2],
        "ca",
        NOT_BEFORE,
        NOT_AFTER,
        vec![
            bc_ext(true, None),
            ku_ext(KeyUsages::KeyCertSign.into()),
            name_constraints_ext(None, Some(vec!["O=Evil,C=US"])),
        ],
        true,
    );
    let ee = make_ee_cert("CN=Leaf,O=Evil,C=US", "CN=CA,O=Test,C=US", &[3], "leaf");

    let mut cp = CertificationPath::new(pdv_ta(ta_cert), vec![pdv_cert(ca)], pdv_cert(ee));
    let cps = baseline_settings();
    let mut cpr = CertificationPathResults::new();

    let r = pe.validate_path(&pe, &cps, &mut cp, &mut cpr);
    assert_eq!(
        Err(Error::PathValidation(
            PathValidationStatus::NameConstraintsViolation
        )),
        r
    );
    assert_eq!(Some(0), get_failing_cert_index(&cpr));
}

#[test]
fn permitted_subtree_enforced() {
    let pe = test_environment();
    let ta_cert = make_ca_cert("CN=Root,O=Test,C=US", "CN=Root,O=Test,C=US", &[1], "root");
    let ca = make_cert(
        "CN=CA,O=Test,C=US",
        "CN=Root,O=Test,C=US",
        &[2],
        "ca",
        NOT_BEFORE,
        NOT_AFTER,
        vec![
            bc_ext(true, None),
            ku_ext(KeyUsages::KeyCertSign.into()),
            name_constraints_ext(Some(vec!["O=Test,C=US"]), None),
        ],
        true,
    );
    let good_ee = make_ee_cert("CN=Leaf,O=Test,C=US", "CN=CA,O=Test,C=US", &[3], "leaf");
    let bad_ee = make_ee_cert("CN=Leaf,O=Other,C=US", "CN=CA,O=Test,C=US", &[4], "leaf2");

    let cps = baseline_settings();

    let mut cp = CertificationPath::new(
        pdv_ta(ta_cert.clone()),
        vec![pdv_cert(ca.clone())],
        pdv_cert(good_ee),
    );
    let mut cpr = CertificationPathResults::new();
    assert!(pe.validate_path(&pe, &cps, &mut cp, &mut cpr).is_ok());

    let mut cp = CertificationPath::new(pdv_ta(ta_cert), vec![pdv_cert(ca)], pdv_cert(bad_ee));
    let mut cpr = CertificationPathResults::new();
    let r = pe.validate_path(&pe, &cps, &mut cp, &mut cpr);
    assert_eq!(
        Err(Error::PathValidation(
            PathValidationStatus::NameConstraintsViolation
        )),
        r
    );
}

#[test]
fn chain_validity_model_tolerates_expired_ca() {
    // the CA expired before the time of interest but was valid when it issued the leaf
    let pe = test_environment();
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
    let ca = make_cert(
        "CN=CA,O=Test,C=US",
        "CN=Root,O=Test,C=US",
        &[2],
        "ca",
        NOT_BEFORE,
        TOI - 1000,
        vec![bc_ext(true, None), ku_ext(KeyUsages::KeyCertSign.into())],
        true,
    );
    // leaf issued while the CA was still valid and itself valid at the time of interest
    let ee = make_cert(
        "CN=Leaf,O=Test,C=US",
        "CN=CA,O=Test,C=US",
        &[3],
        "leaf",
        TOI - 5000,
        NOT_AFTER,
        vec![],
        true,
    );

    let mut cps = baseline_settings();
    let mut cp = CertificationPath::new(
        pdv_ta(ta_cert.clone()),
        vec![pdv_cert(ca.clone())],
        pdv_cert(ee.clone()),
    );
    let mut cpr = CertificationPathResults::new();
    let r = pe.validate_path(&pe, &cps, &mut cp, &mut cpr);
    assert_eq!(
        Err(Error::PathValidation(
            PathValidationStatus::InvalidNotAfterDate
        )),
        r
    );

    set_validity_model(&mut cps, ValidityModel::Chain);
    let mut cp = CertificationPath::new(pdv_ta(ta_cert), vec![pdv_cert(ca)], pdv_cert(ee));
    let mut cpr = CertificationPathResults::new();
    assert!(pe.validate_path(&pe, &cps, &mut cp, &mut cpr).is_ok());
}

#[test]
fn policy_mapping_applied() {
    let pe = test_environment();
    let ta_cert = make_ca_cert("CN=Root,O=Test,C=US", "CN=Root,O=Test,C=US", &[1], "root");
    let ca = make_cert(
        "CN=CA,O=Test,C=US",
        "CN=Root,O=Test,C=US",
        &[2],
        "ca",
        NOT_BEFORE,
        NOT_AFTER,
        vec![
            bc_ext(true, None),
            ku_ext(KeyUsages::KeyCertSign.into()),
            policies_ext(&[TEST_POLICY_1]),
            policy_mappings_ext(&[(TEST_POLICY_1, TEST_POLICY_2)]),
        ],
        true,
    );
    let mut ee = make_ee_cert("CN=Leaf,O=Test,C=US", "CN=CA,O=Test,C=US", &[3], "leaf");
    ee.tbs_certificate
        .extensions
        .get_or_insert_with(Vec::new)
        .push(policies_ext(&[TEST_POLICY_2]));

    let mut cp = CertificationPath::new(pdv_ta(ta_cert), vec![pdv_cert(ca)], pdv_cert(ee));
    let cps = baseline_settings();
    let mut cpr = CertificationPathResults::new();

    assert!(pe.validate_path(&pe, &cps, &mut cp, &mut cpr).is_ok());
    let tree = get_final_valid_policy_tree(&cpr).unwrap();
    assert_eq!(3, tree.len());
    assert!(tree[2].iter().any(|n| n.valid_policy == TEST_POLICY_2));
}

#[test]
fn initial_policy_set_intersection_at_wrap_up() {
    let pe = test_environment();
    let ta_cert = make_ca_cert("CN=Root,O=Test,C=US", "CN=Root,O=Test,C=US", &[1], "root");
    let ca = make_cert(
        "CN=CA,O=Test,C=US",
        "CN=Root,O=Test,C=US",
        &[2],
        "ca",
        NOT_BEFORE,
        NOT_AFTER,
        vec![
            bc_ext(true, None),
            ku_ext(KeyUsages::KeyCertSign.into()),
            policies_ext(&[TEST_POLICY_1]),
        ],
        true,
    );
    let mut ee = make_ee_cert("CN=Leaf,O=Test,C=US", "CN=CA,O=Test,C=US", &[3], "leaf");
    ee.tbs_certificate
        .extensions
        .get_or_insert_with(Vec::new)
        .push(policies_ext(&[TEST_POLICY_1]));

    // caller requests a policy the chain does not assert; without requireExplicitPolicy the path
    // is acceptable with an empty policy tree
    let mut cps = baseline_settings();
    set_initial_policy_set(&mut cps, vec![TEST_POLICY_2.to_string()]);
    let mut cp = CertificationPath::new(
        pdv_ta(ta_cert.clone()),
        vec![pdv_cert(ca.clone())],
        pdv_cert(ee.clone()),
    );
    let mut cpr = CertificationPathResults::new();
    assert!(pe.validate_path(&pe, &cps, &mut cp, &mut cpr).is_ok());
    let tree = get_final_valid_policy_tree(&cpr).unwrap();
    assert!(tree.is_empty());

    // with the explicit policy indicator asserted the same mismatch is a hard failure
    set_initial_explicit_policy_indicator(&mut cps, true);
    let mut cp = CertificationPath::new(pdv_ta(ta_cert), vec![pdv_cert(ca)], pdv_cert(ee));
    let mut cpr = CertificationPathResults::new();
    let r = pe.validate_path(&pe, &cps, &mut cp, &mut cpr);
    assert_eq!(
        Err(Error::PathValidation(PathValidationStatus::NullPolicySet)),
        r
    );
}

#[test]
fn policy_processing_is_repeatable() {
    // running the policy algorithm twice over the same path yields the same final tree
    let pe = test_environment();
    let ta_cert = make_ca_cert("CN=Root,O=Test,C=US", "CN=Root,O=Test,C=US", &[1], "root");
    let ca = make_cert(
        "CN=CA,O=Test,C=US",
        "CN=Root,O=Test,C=US",
        &[2],
        "ca",
        NOT_BEFORE,
        NOT_AFTER,
        vec![
            bc_ext(true, None),
            ku_ext(KeyUsages::KeyCertSign.into()),
            policies_ext(&[TEST_POLICY_1, TEST_POLICY_2]),
        ],
        true,
    );
    let mut ee = make_ee_cert("CN=Leaf,O=Test,C=US", "CN=CA,O=Test,C=US", &[3], "leaf");
    ee.tbs_certificate
        .extensions
        .get_or_insert_with(Vec::new)
        .push(policies_ext(&[TEST_POLICY_1]));

    let mut cps = baseline_settings();
    set_initial_policy_set(&mut cps, vec![TEST_POLICY_1.to_string()]);

    let mut cp = CertificationPath::new(pdv_ta(ta_cert), vec![pdv_cert(ca)], pdv_cert(ee));

    let mut cpr1 = CertificationPathResults::new();
    check_certificate_policies(&pe, &cps, &mut cp, &mut cpr1).unwrap();
    let tree1 = get_final_valid_policy_tree(&cpr1).unwrap();

    let mut cpr2 = CertificationPathResults::new();
    check_certificate_policies(&pe, &cps, &mut cp, &mut cpr2).unwrap();
    let tree2 = get_final_valid_policy_tree(&cpr2).unwrap();

    assert_eq!(tree1.len(), tree2.len());
    for (row1, row2) in tree1.iter().zip(tree2.iter()) {
        let mut oids1: Vec<String> = row1.iter().map(|n| n.valid_policy.to_string()).collect();
        let mut oids2: Vec<String> = row2.iter().map(|n| n.valid_policy.to_string()).collect();
        oids1.sort();
        oids2.sort();
        assert_eq!(oids1, oids2);
    }
}

#[test]
fn policy_tree_has_no_childless_interior_nodes() {
    // after processing, every node above the final row must retain at least one child
    let pe = test_environment();
    let ta_cert = make_ca_cert("CN=Root,O=Test,C=US", "CN=Root,O=Test,C=US", &[1], "root");
    let ca = make_cert(
        "CN=CA,O=Test,C=US",
        "CN=Root,O=Test,C=US",
        &[2],
        "ca",
        NOT_BEFORE,
        NOT_AFTER,
        vec![
            bc_ext(true, None),
            ku_ext(KeyUsages::KeyCertSign.into()),
            policies_ext(&[TEST_POLICY_1, TEST_POLICY_2]),
        ],
        true,
    );
    // the leaf only continues one of the two CA policies; the other branch must be pruned
    let mut ee = make_ee_cert("CN=Leaf,O=Test,C=US", "CN=CA,O=Test,C=US", &[3], "leaf");
    ee.tbs_certificate
        .extensions
        .get_or_insert_with(Vec::new)
        .push(policies_ext(&[TEST_POLICY_1]));

    let mut cp = CertificationPath::new(pdv_ta(ta_cert), vec![pdv_cert(ca)], pdv_cert(ee));
    let cps = baseline_settings();
    let mut cpr = CertificationPathResults::new();
    check_certificate_policies(&pe, &cps, &mut cp, &mut cpr).unwrap();

    let tree = get_final_valid_policy_tree(&cpr).unwrap();
    assert_eq!(3, tree.len());
    // depth 1 retains only the policy with a child at depth 2
    assert_eq!(1, tree[1].len());
    assert_eq!(TEST_POLICY_1, tree[1][0].valid_policy);
    assert_eq!(1, tree[2].len());
    assert_eq!(TEST_POLICY_1, tree[2][0].valid_policy);
}

#[test]
fn settings_json_round_trip_preserves_validation_inputs() {
    let mut cps = baseline_settings();
    set_initial_policy_set(&mut cps, vec![TEST_POLICY_1.to_string()]);
    set_initial_explicit_policy_indicator(&mut cps, true);
    set_initial_path_length_constraint(&mut cps, 4);

    let json = serde_json::to_string(&cps).unwrap();
    let cps2: CertificationPathSettings = serde_json::from_str(&json).unwrap();
    assert_eq!(cps, cps2);
    assert_eq!(TOI, get_time_of_interest(&cps2));
    assert_eq!(4, get_initial_path_length_constraint(&cps2));
    assert!(get_initial_explicit_policy_indicator(&cps2));
}

#[test]
fn encoded_cert_round_trips_through_pdv_wrapper() {
    let ee = make_ee_cert("CN=Leaf,O=Test,C=US", "CN=Root,O=Test,C=US", &[9], "leaf");
    let enc = ee.to_der().unwrap();
    let pdv = PDVCertificate::try_from(enc.as_slice()).unwrap();
    assert_eq!(enc, pdv.encoded_cert);
    assert_eq!(ee, pdv.decoded_cert);
}
